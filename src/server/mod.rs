pub mod protocol;

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::RwLock;
use tracing::{error, info};

use crate::simulation::engine::{Engine, QueryArgumentError};
use protocol::{
    ConfigResponse, ErrorResponse, GameTimeResponse, TerrainResponse, ViewportResponse,
    WorldSizeResponse,
};

/// Shared engine handle: one writer (the tick driver), many HTTP readers.
pub type SharedEngine = Arc<RwLock<Engine>>;

/// Bind and serve the query surface of §6 on `addr` until the process exits.
pub async fn start_server(
    engine: SharedEngine,
    addr: SocketAddr,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let listener = TcpListener::bind(addr).await?;
    info!(%addr, "query server listening");

    loop {
        let (stream, peer) = listener.accept().await?;
        let engine = Arc::clone(&engine);
        tokio::spawn(async move {
            if let Err(e) = handle_connection(stream, engine).await {
                error!(%peer, "connection error: {}", e);
            }
        });
    }
}

/// One `GET` request, one response, connection closed — this adapter is
/// pull-based (§6), there is no persistent per-client state to stream to.
async fn handle_connection(
    mut stream: TcpStream,
    engine: SharedEngine,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let mut buf = vec![0u8; 8192];
    let n = stream.read(&mut buf).await?;
    let request = String::from_utf8_lossy(&buf[..n]);

    let Some(request_line) = request.lines().next() else {
        return write_response(&mut stream, 400, &ErrorResponse::new("empty request")).await;
    };

    let mut parts = request_line.split_whitespace();
    let method = parts.next().unwrap_or("");
    let target = parts.next().unwrap_or("");

    if method != "GET" {
        return write_response(&mut stream, 400, &ErrorResponse::new("only GET is supported")).await;
    }

    let (path, query) = match target.split_once('?') {
        Some((p, q)) => (p, parse_query(q)),
        None => (target, HashMap::new()),
    };

    match path {
        "/api/time" => {
            let time = engine.read().await.game_time();
            write_response(&mut stream, 200, &GameTimeResponse::from_game_time(time)).await
        }
        "/api/terrain" => {
            let guard = engine.read().await;
            write_response(&mut stream, 200, &TerrainResponse::from_engine(&guard)).await
        }
        "/api/config" => {
            let summary = engine.read().await.get_config();
            write_response(&mut stream, 200, &ConfigResponse::from_summary(summary)).await
        }
        "/api/worldsize" => {
            let world_size = engine.read().await.get_world_size();
            write_response(&mut stream, 200, &WorldSizeResponse { world_size }).await
        }
        "/api/viewport" => handle_viewport(&mut stream, &engine, &query).await,
        _ => write_response(&mut stream, 400, &ErrorResponse::new(format!("unknown route {}", path))).await,
    }
}

async fn handle_viewport(
    stream: &mut TcpStream,
    engine: &SharedEngine,
    query: &HashMap<String, String>,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let x = match parse_query_i64(query, "x") {
        Ok(v) => v,
        Err(e) => return write_response(stream, 400, &ErrorResponse::new(e)).await,
    };
    let y = match parse_query_i64(query, "y") {
        Ok(v) => v,
        Err(e) => return write_response(stream, 400, &ErrorResponse::new(e)).await,
    };
    let width = match parse_query_u32(query, "width") {
        Ok(v) => v,
        Err(e) => return write_response(stream, 400, &ErrorResponse::new(e)).await,
    };
    let height = match parse_query_u32(query, "height") {
        Ok(v) => v,
        Err(e) => return write_response(stream, 400, &ErrorResponse::new(e)).await,
    };

    let guard = engine.read().await;
    match guard.get_viewport(x, y, width, height) {
        Ok(viewport) => {
            let world_size = guard.get_world_size();
            let timestamp = SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .map(|d| d.as_secs())
                .unwrap_or(0);
            let body = ViewportResponse::from_viewport(viewport, world_size, timestamp);
            write_response(stream, 200, &body).await
        }
        Err(QueryArgumentError::ZeroSize) => {
            write_response(stream, 400, &ErrorResponse::new(QueryArgumentError::ZeroSize.to_string()))
                .await
        }
    }
}

fn parse_query(raw: &str) -> HashMap<String, String> {
    raw.split('&')
        .filter_map(|pair| pair.split_once('='))
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

fn parse_query_i64(query: &HashMap<String, String>, key: &'static str) -> Result<i64, String> {
    let raw = query.get(key).ok_or_else(|| format!("missing '{}'", key))?;
    raw.parse::<i64>()
        .map_err(|_| format!("'{}' must be an integer, got '{}'", key, raw))
}

fn parse_query_u32(query: &HashMap<String, String>, key: &'static str) -> Result<u32, String> {
    let raw = query.get(key).ok_or_else(|| format!("missing '{}'", key))?;
    raw.parse::<u32>()
        .map_err(|_| format!("'{}' must be a non-negative integer, got '{}'", key, raw))
}

async fn write_response<T: serde::Serialize>(
    stream: &mut TcpStream,
    status: u16,
    body: &T,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let reason = match status {
        200 => "OK",
        400 => "Bad Request",
        _ => "Internal Server Error",
    };
    let json = serde_json::to_string(body).unwrap_or_else(|_| "{}".to_string());
    let response = format!(
        "HTTP/1.1 {} {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        status,
        reason,
        json.len(),
        json
    );
    stream.write_all(response.as_bytes()).await?;
    stream.shutdown().await?;
    Ok(())
}
