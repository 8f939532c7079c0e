use serde::{Deserialize, Serialize};
use std::path::Path;

/// Parameters the terrain generator consumes to build a new world.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationConfig {
    #[serde(default = "default_grid_size")]
    pub grid_size: u32,
    #[serde(default = "default_noise_scale")]
    pub noise_scale: f64,
    #[serde(default = "default_min_height")]
    pub min_height: f32,
    #[serde(default = "default_max_height")]
    pub max_height: f32,
    #[serde(default = "default_spring_min_height")]
    pub spring_min_height: f32,
    #[serde(default = "default_spring_max_height")]
    pub spring_max_height: f32,
    #[serde(default = "default_number_of_springs")]
    pub number_of_springs: u32,
    /// RNG seed for terrain noise and spring sampling. `0` means "pick a
    /// process-entropy seed and log it" (see `world::generation::generate_world`).
    #[serde(default)]
    pub seed: u64,
}

fn default_grid_size() -> u32 {
    200
}
fn default_noise_scale() -> f64 {
    3.0
}
fn default_min_height() -> f32 {
    -200.0
}
fn default_max_height() -> f32 {
    2200.0
}
fn default_spring_min_height() -> f32 {
    800.0
}
fn default_spring_max_height() -> f32 {
    1800.0
}
fn default_number_of_springs() -> u32 {
    12
}

impl Default for GenerationConfig {
    fn default() -> Self {
        GenerationConfig {
            grid_size: default_grid_size(),
            noise_scale: default_noise_scale(),
            min_height: default_min_height(),
            max_height: default_max_height(),
            spring_min_height: default_spring_min_height(),
            spring_max_height: default_spring_max_height(),
            number_of_springs: default_number_of_springs(),
            seed: 0,
        }
    }
}

impl GenerationConfig {
    pub fn from_file(path: &Path) -> Result<Self, String> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| format!("Cannot read {}: {}", path.display(), e))?;
        let config: Self = toml::from_str(&content)
            .map_err(|e| format!("Invalid TOML in {}: {}", path.display(), e))?;
        config.validate()?;
        Ok(config)
    }

    /// Validate every field, collecting all violations into one message
    /// rather than stopping at the first (so a bad config file can be fixed
    /// in one edit-reload cycle instead of several).
    pub fn validate(&self) -> Result<(), String> {
        let mut errors = Vec::new();

        if !(100..=2000).contains(&self.grid_size) {
            errors.push(format!(
                "grid_size must be 100-2000, got {}",
                self.grid_size
            ));
        }
        if self.noise_scale <= 0.0 {
            errors.push(format!(
                "noise_scale must be > 0.0, got {}",
                self.noise_scale
            ));
        }
        if self.max_height <= self.min_height {
            errors.push(format!(
                "max_height ({}) must be greater than min_height ({})",
                self.max_height, self.min_height
            ));
        }
        if self.spring_min_height > self.spring_max_height {
            errors.push(format!(
                "spring_min_height ({}) must be <= spring_max_height ({})",
                self.spring_min_height, self.spring_max_height
            ));
        }
        if self.spring_min_height < self.min_height || self.spring_max_height > self.max_height {
            errors.push(format!(
                "spring height band [{}, {}] must lie within terrain band [{}, {}]",
                self.spring_min_height, self.spring_max_height, self.min_height, self.max_height
            ));
        }
        if self.number_of_springs == 0 {
            errors.push("number_of_springs must be > 0".to_string());
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors.join("\n"))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_are_internally_valid() {
        assert!(GenerationConfig::default().validate().is_ok());
    }

    #[test]
    fn rejects_grid_too_small() {
        let cfg = GenerationConfig {
            grid_size: 10,
            ..Default::default()
        };
        let err = cfg.validate().unwrap_err();
        assert!(err.contains("grid_size"));
    }

    #[test]
    fn rejects_inverted_height_band() {
        let cfg = GenerationConfig {
            min_height: 500.0,
            max_height: 100.0,
            ..Default::default()
        };
        let err = cfg.validate().unwrap_err();
        assert!(err.contains("max_height"));
    }

    #[test]
    fn rejects_inverted_spring_band() {
        let cfg = GenerationConfig {
            spring_min_height: 1500.0,
            spring_max_height: 800.0,
            ..Default::default()
        };
        let err = cfg.validate().unwrap_err();
        assert!(err.contains("spring_min_height"));
    }

    #[test]
    fn rejects_spring_band_outside_terrain_band() {
        let cfg = GenerationConfig {
            min_height: 0.0,
            max_height: 1000.0,
            spring_min_height: -50.0,
            spring_max_height: 500.0,
            ..Default::default()
        };
        let err = cfg.validate().unwrap_err();
        assert!(err.contains("spring height band"));
    }

    #[test]
    fn multiple_errors_joined() {
        let cfg = GenerationConfig {
            grid_size: 1,
            number_of_springs: 0,
            ..Default::default()
        };
        let err = cfg.validate().unwrap_err();
        assert!(err.contains("grid_size"));
        assert!(err.contains("number_of_springs"));
    }

    #[test]
    fn from_file_missing() {
        let err = GenerationConfig::from_file(Path::new("/nonexistent/gen.toml")).unwrap_err();
        assert!(err.contains("Cannot read"));
    }

    #[test]
    fn from_file_valid_round_trip() {
        let mut tmp = tempfile::NamedTempFile::new().unwrap();
        write!(
            tmp,
            r#"
grid_size = 150
noise_scale = 4.0
min_height = -100.0
max_height = 1500.0
spring_min_height = 600.0
spring_max_height = 1200.0
number_of_springs = 8
seed = 42
"#
        )
        .unwrap();
        let cfg = GenerationConfig::from_file(tmp.path()).unwrap();
        assert_eq!(cfg.grid_size, 150);
        assert_eq!(cfg.number_of_springs, 8);
        assert_eq!(cfg.seed, 42);
    }

    #[test]
    fn from_file_invalid_toml() {
        let mut tmp = tempfile::NamedTempFile::new().unwrap();
        write!(tmp, "not valid toml {{{{").unwrap();
        let err = GenerationConfig::from_file(tmp.path()).unwrap_err();
        assert!(err.contains("Invalid TOML"));
    }
}
