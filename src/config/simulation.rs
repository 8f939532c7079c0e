use serde::{Deserialize, Serialize};
use std::path::Path;

/// In-game calendar shape. Exists as config because the spec calls it out as
/// a recognized option, even though the defaults match the only values the
/// rest of the engine assumes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimeConfig {
    pub hours_per_day: u32,
    pub days_per_month: u32,
    pub months_per_year: u32,
}

impl Default for TimeConfig {
    fn default() -> Self {
        TimeConfig {
            hours_per_day: 24,
            days_per_month: 30,
            months_per_year: 12,
        }
    }
}

/// §4.D Temperature.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TemperatureConfig {
    pub t_warm_zone: f32,
    pub t_cold_zone: f32,
    pub lapse_rate: f32,
    pub seasonal_amplitude_min: f32,
    pub seasonal_amplitude_max: f32,
    /// Day/night base temperature per month (index 0 = January).
    pub day_temps: [f32; 12],
    pub night_temps: [f32; 12],
}

impl Default for TemperatureConfig {
    fn default() -> Self {
        TemperatureConfig {
            t_warm_zone: 25.0,
            t_cold_zone: -8.0,
            lapse_rate: -0.006,
            seasonal_amplitude_min: 2.0,
            seasonal_amplitude_max: 12.0,
            day_temps: [2.0, 4.0, 9.0, 14.0, 19.0, 23.0, 26.0, 25.0, 20.0, 14.0, 8.0, 3.0],
            night_temps: [-4.0, -3.0, 1.0, 5.0, 9.0, 13.0, 16.0, 15.0, 11.0, 6.0, 1.0, -3.0],
        }
    }
}

/// §4.E Weather (pressure + wind).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WeatherConfig {
    pub base_pressure: f32,
    pub pressure_lapse_rate: f32,
    pub temp_pressure_factor: f32,
    pub humidity_pressure_factor: f32,
    pub temp_reference: f32,
    pub humidity_reference: f32,
    pub wind_generation_factor: f32,
    pub max_wind_speed: f32,
    pub wind_smoothing_factor: f32,
}

impl Default for WeatherConfig {
    fn default() -> Self {
        WeatherConfig {
            base_pressure: 1013.25,
            pressure_lapse_rate: 0.12,
            temp_pressure_factor: 0.8,
            humidity_pressure_factor: 4.0,
            temp_reference: 15.0,
            humidity_reference: 0.3,
            wind_generation_factor: 6.0,
            max_wind_speed: 25.0,
            wind_smoothing_factor: 0.3,
        }
    }
}

/// §4.F Wind transport (humidity + heat advection).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindTransportConfig {
    pub min_wind_for_transport: f32,
    pub humidity_transfer_rate: f32,
    pub heat_transfer_rate: f32,
}

impl Default for WindTransportConfig {
    fn default() -> Self {
        WindTransportConfig {
            min_wind_for_transport: 0.5,
            humidity_transfer_rate: 0.3,
            heat_transfer_rate: 0.15,
        }
    }
}

/// §4.G Cloud formation & advection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CloudConfig {
    pub base_saturation: f32,
    pub altitude_saturation_factor: f32,
    pub cloud_formation_rate: f32,
    pub cloud_dissipation_rate: f32,
    pub cloud_advection_rate: f32,
    /// Terrain height at which `alt_norm` saturates to `1.0`; above this,
    /// the saturation threshold stops dropping any further with altitude.
    pub altitude_norm_reference: f32,
}

impl Default for CloudConfig {
    fn default() -> Self {
        CloudConfig {
            base_saturation: 0.75,
            altitude_saturation_factor: 0.4,
            cloud_formation_rate: 0.5,
            cloud_dissipation_rate: 0.1,
            cloud_advection_rate: 0.4,
            altitude_norm_reference: 3000.0,
        }
    }
}

/// §4.H Precipitation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PrecipitationConfig {
    pub precip_threshold: f32,
    pub precip_rate_factor: f32,
    pub precip_decay_rate: f32,
    pub cool_per_precip: f32,
}

impl Default for PrecipitationConfig {
    fn default() -> Self {
        PrecipitationConfig {
            precip_threshold: 0.5,
            precip_rate_factor: 0.6,
            precip_decay_rate: 0.2,
            cool_per_precip: 1.5,
        }
    }
}

/// §4.I Hydrology.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HydrologyConfig {
    pub erosion_rate_water: f32,
    pub pour_amount: f32,
    pub max_river_flow_iterations: u32,
    /// Matches `GenerationConfig::min_height`'s default; erosion never carves
    /// terrain below this floor.
    pub terrain_floor: f32,
    pub water_height_erosion_loss: f32,
}

impl Default for HydrologyConfig {
    fn default() -> Self {
        HydrologyConfig {
            erosion_rate_water: 0.002,
            pour_amount: 0.1,
            max_river_flow_iterations: 200_000,
            terrain_floor: -200.0,
            water_height_erosion_loss: 0.001,
        }
    }
}

/// §4.J Evaporation / evapotranspiration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EvaporationConfig {
    pub evap_temp_coeff: f32,
    pub max_evap_depth: f32,
    pub base_evap_rate: f32,
    pub water_to_humidity_factor: f32,
    pub min_ground_moisture: f32,
    pub base_evapotranspiration: f32,
}

impl Default for EvaporationConfig {
    fn default() -> Self {
        EvaporationConfig {
            evap_temp_coeff: 0.04,
            max_evap_depth: 2.0,
            base_evap_rate: 0.02,
            water_to_humidity_factor: 0.5,
            min_ground_moisture: 0.1,
            base_evapotranspiration: 0.01,
        }
    }
}

/// §4.K Humidity diffusion (saturation-aware).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiffusionConfig {
    pub temp_coefficient: f32,
    pub scale_height: f32,
    pub diffusion_iterations: u32,
    pub min_transfer_threshold: f32,
    pub humidity_diffusion_rate: f32,
    pub upward_bias_max: f32,
    pub upward_bias_coeff: f32,
    pub downward_penalty_max: f32,
    pub downward_penalty_coeff: f32,
    pub max_cells_processed_per_tick: u64,
}

impl Default for DiffusionConfig {
    fn default() -> Self {
        DiffusionConfig {
            temp_coefficient: 0.06,
            scale_height: 1500.0,
            diffusion_iterations: 2,
            min_transfer_threshold: 0.02,
            humidity_diffusion_rate: 0.15,
            upward_bias_max: 0.1,
            upward_bias_coeff: 0.001,
            downward_penalty_max: 0.1,
            downward_penalty_coeff: 0.0005,
            max_cells_processed_per_tick: 2_000_000,
        }
    }
}

/// §4.L Condensation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CondensationConfig {
    pub condensation_rate: f32,
    pub air_to_ground_factor: f32,
    pub dew_threshold: f32,
    pub dew_condensation_rate: f32,
}

impl Default for CondensationConfig {
    fn default() -> Self {
        CondensationConfig {
            condensation_rate: 0.4,
            air_to_ground_factor: 0.3,
            dew_threshold: 0.9,
            dew_condensation_rate: 0.02,
        }
    }
}

/// §4.M Ground moisture propagation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MoistureConfig {
    pub max_propagation_distance: u32,
    pub distance_decay_rate: f32,
    pub water_volume_boost_factor: f32,
    pub max_water_volume_boost: f32,
    pub transfer_rate: f32,
    pub min_transfer: f32,
    pub uphill_penalty_percent: f32,
    pub downhill_bonus_percent: f32,
    pub altitude_dryness_percent: f32,
    pub saturation_exponent: f32,
    pub base_decay: f32,
    pub smoothing_iterations: u32,
    pub max_cells_processed: u64,
    pub mud_threshold: f32,
    pub earth_threshold: f32,
}

impl Default for MoistureConfig {
    fn default() -> Self {
        MoistureConfig {
            max_propagation_distance: 60,
            distance_decay_rate: 0.12,
            water_volume_boost_factor: 0.3,
            max_water_volume_boost: 1.0,
            transfer_rate: 0.8,
            min_transfer: 1e-5,
            uphill_penalty_percent: 0.002,
            downhill_bonus_percent: 0.001,
            altitude_dryness_percent: 0.0003,
            saturation_exponent: 2.0,
            base_decay: 0.995,
            smoothing_iterations: 1,
            max_cells_processed: 2_000_000,
            mud_threshold: 0.78,
            earth_threshold: 0.22,
        }
    }
}

/// Per-tick physical constants for the whole pipeline, plus performance and
/// query-surface knobs. Generation parameters (§4.B) live separately in
/// [`crate::config::generation::GenerationConfig`] since they only apply at
/// world creation, not every tick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    pub max_land_moisture: f32,
    pub tick_time_warning_ms: u64,
    pub max_viewport_size: u32,
    pub enable_performance_logging: bool,
    pub time: TimeConfig,
    pub temperature: TemperatureConfig,
    pub weather: WeatherConfig,
    pub wind_transport: WindTransportConfig,
    pub cloud: CloudConfig,
    pub precipitation: PrecipitationConfig,
    pub hydrology: HydrologyConfig,
    pub evaporation: EvaporationConfig,
    pub diffusion: DiffusionConfig,
    pub condensation: CondensationConfig,
    pub moisture: MoistureConfig,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        SimulationConfig {
            max_land_moisture: 1.0,
            tick_time_warning_ms: 5_000,
            max_viewport_size: 256,
            enable_performance_logging: false,
            time: TimeConfig::default(),
            temperature: TemperatureConfig::default(),
            weather: WeatherConfig::default(),
            wind_transport: WindTransportConfig::default(),
            cloud: CloudConfig::default(),
            precipitation: PrecipitationConfig::default(),
            hydrology: HydrologyConfig::default(),
            evaporation: EvaporationConfig::default(),
            diffusion: DiffusionConfig::default(),
            condensation: CondensationConfig::default(),
            moisture: MoistureConfig::default(),
        }
    }
}

impl SimulationConfig {
    pub fn from_file(path: &Path) -> Result<Self, String> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| format!("Cannot read {}: {}", path.display(), e))?;
        Self::from_toml_str(&content, path)
    }

    pub fn from_toml_str(content: &str, source_path: &Path) -> Result<Self, String> {
        let config: SimulationConfig =
            toml::from_str(content).map_err(|e| format!("{}: {}", source_path.display(), e))?;
        config.validate()?;
        Ok(config)
    }

    /// Validate every recognized field, collecting all violations before
    /// returning (matches the ambient-stack convention used throughout this
    /// crate's config layer).
    pub fn validate(&self) -> Result<(), String> {
        let mut errors = Vec::new();

        if self.max_land_moisture <= 0.0 {
            errors.push(format!(
                "max_land_moisture must be > 0.0, got {}",
                self.max_land_moisture
            ));
        }
        if self.tick_time_warning_ms == 0 {
            errors.push("tick_time_warning_ms must be > 0".to_string());
        }
        if self.max_viewport_size == 0 {
            errors.push("max_viewport_size must be > 0".to_string());
        }
        if self.time.hours_per_day == 0 || self.time.days_per_month == 0 || self.time.months_per_year == 0
        {
            errors.push("time.hours_per_day, days_per_month, months_per_year must all be > 0".to_string());
        }
        if self.temperature.t_warm_zone <= self.temperature.t_cold_zone {
            errors.push(format!(
                "temperature.t_warm_zone ({}) must exceed t_cold_zone ({})",
                self.temperature.t_warm_zone, self.temperature.t_cold_zone
            ));
        }
        if self.weather.max_wind_speed <= 0.0 {
            errors.push("weather.max_wind_speed must be > 0.0".to_string());
        }
        if !(0.0..=1.0).contains(&self.weather.wind_smoothing_factor) {
            errors.push(format!(
                "weather.wind_smoothing_factor must be 0.0-1.0, got {}",
                self.weather.wind_smoothing_factor
            ));
        }
        if self.diffusion.diffusion_iterations == 0 {
            errors.push("diffusion.diffusion_iterations must be > 0".to_string());
        }
        if self.diffusion.scale_height <= 0.0 {
            errors.push("diffusion.scale_height must be > 0.0".to_string());
        }
        if self.moisture.mud_threshold <= self.moisture.earth_threshold {
            errors.push(format!(
                "moisture.mud_threshold ({}) must exceed earth_threshold ({})",
                self.moisture.mud_threshold, self.moisture.earth_threshold
            ));
        }
        if self.moisture.max_propagation_distance == 0 {
            errors.push("moisture.max_propagation_distance must be > 0".to_string());
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors.join("\n"))
        }
    }
}
