use serde::Serialize;

use crate::simulation::engine::{ConfigSummary, Engine, Viewport};
use crate::simulation::GameTime;
use crate::world::Cell;

/// `GET /api/time` response.
#[derive(Debug, Clone, Serialize)]
pub struct GameTimeResponse {
    pub year: u32,
    pub month: u32,
    pub day: u32,
    pub hour: u32,
    pub minute: u32,
    pub is_day: bool,
    pub month_name: &'static str,
    pub daylight_hours: u32,
}

impl GameTimeResponse {
    pub fn from_game_time(time: GameTime) -> Self {
        GameTimeResponse {
            year: time.year,
            month: time.month,
            day: time.day,
            hour: time.hour,
            minute: time.minute,
            is_day: time.is_day,
            month_name: time.month_name(),
            daylight_hours: time.daylight_hours(),
        }
    }
}

/// `GET /api/terrain` response: the full grid, row-major.
#[derive(Debug, Clone, Serialize)]
pub struct TerrainResponse<'a> {
    pub width: u32,
    pub height: u32,
    pub cells: &'a [Cell],
}

impl<'a> TerrainResponse<'a> {
    pub fn from_engine(engine: &'a Engine) -> Self {
        TerrainResponse {
            width: engine.world().width(),
            height: engine.world().height(),
            cells: engine.get_terrain(),
        }
    }
}

/// `GET /api/viewport` response.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewportResponse {
    pub viewport: ViewportBody,
    pub world_size: u32,
    pub timestamp: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct ViewportBody {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
    pub cells: Vec<Cell>,
}

impl ViewportResponse {
    pub fn from_viewport(viewport: Viewport, world_size: u32, timestamp: u64) -> Self {
        ViewportResponse {
            viewport: ViewportBody {
                x: viewport.x,
                y: viewport.y,
                width: viewport.width,
                height: viewport.height,
                cells: viewport.cells,
            },
            world_size,
            timestamp,
        }
    }
}

/// `GET /api/config` response.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigResponse {
    pub update_interval: u64,
    pub world_size: u32,
}

impl ConfigResponse {
    pub fn from_summary(summary: ConfigSummary) -> Self {
        ConfigResponse {
            update_interval: summary.update_interval_ms,
            world_size: summary.world_size,
        }
    }
}

/// `GET /api/worldsize` response.
#[derive(Debug, Clone, Serialize)]
pub struct WorldSizeResponse {
    pub world_size: u32,
}

/// Body for every `400`/`500` response.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(message: impl Into<String>) -> Self {
        ErrorResponse {
            error: message.into(),
        }
    }
}
