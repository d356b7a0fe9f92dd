//! TOML/JSON scenario configuration, validation, and presets.
//!
//! Grounded on the teacher's `config.rs`: nested `#[serde(default,
//! deny_unknown_fields)]` structs, a `.validate() -> Vec<ConfigError>`
//! method rather than failing fast on the first problem, and named presets
//! alongside `from_toml_file`/`from_toml_str`.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::model::{DemandCurve, StationConfig};

/// Top-level scenario configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ScenarioConfig {
    #[serde(default)]
    pub simulation: SimulationConfig,
    pub stations: Vec<StationConfig>,
    #[serde(default)]
    pub arrivals: ArrivalConfig,
    #[serde(default)]
    pub interventions: Vec<crate::intervention::ScenarioIntervention>,
}

/// Simulation timing and global parameters.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct SimulationConfig {
    pub duration_days: f64,
    pub seed: u64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            duration_days: 1.0,
            seed: 42,
        }
    }
}

/// Arrival-process parameters: either a synthetic demand curve or a
/// real-network mean arrival time (see SPEC_FULL.md §1.1 item 2).
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct ArrivalConfig {
    pub base_rate_per_hour: f64,
    pub demand_curve: DemandCurve,
    pub demand_multiplier: f64,
    pub jitter_std: Option<f64>,
    pub real_network_mean_arrival_min: Option<f64>,
    /// Per-hour scenario override, distinct from `demand_multiplier`: when
    /// present, `demand_adjustments[hour]` is applied multiplicatively on
    /// top of `demand_curve` and `demand_multiplier` (spec.md §4.5 step 2).
    /// Must have exactly 24 entries when set.
    pub demand_adjustments: Option<Vec<f64>>,
}

impl Default for ArrivalConfig {
    fn default() -> Self {
        Self {
            base_rate_per_hour: 60.0,
            demand_curve: DemandCurve::flat(),
            demand_multiplier: 1.0,
            jitter_std: None,
            real_network_mean_arrival_min: None,
            demand_adjustments: None,
        }
    }
}

impl ScenarioConfig {
    pub fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();
        if self.simulation.duration_days <= 0.0 {
            errors.push(ConfigError::new(
                "simulation.duration_days",
                "must be positive",
            ));
        }
        if self.stations.is_empty() {
            errors.push(ConfigError::new("stations", "must have at least one station"));
        }
        let mut seen_ids = std::collections::HashSet::new();
        for (i, station) in self.stations.iter().enumerate() {
            errors.extend(station.validate(&format!("stations[{i}]")));
            if !seen_ids.insert(station.id) {
                errors.push(ConfigError::new(
                    format!("stations[{i}].id"),
                    "duplicate station id",
                ));
            }
        }
        if self.arrivals.demand_curve.hourly_multiplier.len() != 24 {
            errors.push(ConfigError::new(
                "arrivals.demand_curve.hourly_multiplier",
                "must have exactly 24 entries",
            ));
        }
        if self.arrivals.base_rate_per_hour < 0.0 {
            errors.push(ConfigError::new(
                "arrivals.base_rate_per_hour",
                "must not be negative",
            ));
        }
        if let Some(mean) = self.arrivals.real_network_mean_arrival_min
            && mean <= 0.0
        {
            errors.push(ConfigError::new(
                "arrivals.real_network_mean_arrival_min",
                "must be positive",
            ));
        }
        if let Some(adjustments) = &self.arrivals.demand_adjustments
            && adjustments.len() != 24
        {
            errors.push(ConfigError::new(
                "arrivals.demand_adjustments",
                "must have exactly 24 entries",
            ));
        }
        errors
    }

    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        toml::from_str(text).map_err(|e| ConfigError::new("<toml>", e.to_string()))
    }

    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path.as_ref()).map_err(|e| {
            ConfigError::new(path.as_ref().display().to_string(), e.to_string())
        })?;
        Self::from_toml_str(&text)
    }

    pub fn from_json_str(text: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(text).map_err(|e| ConfigError::new("<json>", e.to_string()))
    }

    /// A small city: three stations of varying size, flat demand.
    pub fn baseline() -> Self {
        let station = |id: usize, chargers: u32, batteries: u32, location: (f64, f64)| StationConfig {
            id,
            name: format!("station-{id}"),
            location,
            charger_count: chargers,
            charge_power_kw: 60.0,
            swap_time_seconds: 90.0,
            total_batteries: batteries,
            battery_config: crate::model::BatteryConfig::default(),
            cooldown_seconds: 30.0,
            grid_power_limit_kw: None,
        };
        Self {
            simulation: SimulationConfig::default(),
            stations: vec![
                station(0, 4, 10, (37.77, -122.42)),
                station(1, 2, 6, (37.80, -122.27)),
                station(2, 6, 14, (37.34, -121.89)),
            ],
            arrivals: ArrivalConfig::default(),
            interventions: Vec::new(),
        }
    }

    /// A single heavily-loaded station, useful for stress scenarios.
    pub fn high_demand() -> Self {
        let mut cfg = Self::baseline();
        cfg.arrivals.base_rate_per_hour = 300.0;
        cfg
    }

    pub const PRESETS: &'static [&'static str] = &["baseline", "high_demand"];

    pub fn from_preset(name: &str) -> Option<Self> {
        match name {
            "baseline" => Some(Self::baseline()),
            "high_demand" => Some(Self::high_demand()),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn baseline_preset_validates_cleanly() {
        let cfg = ScenarioConfig::baseline();
        assert!(cfg.validate().is_empty());
    }

    #[test]
    fn empty_station_list_is_rejected() {
        let mut cfg = ScenarioConfig::baseline();
        cfg.stations.clear();
        let errors = cfg.validate();
        assert!(errors.iter().any(|e| e.field == "stations"));
    }

    #[test]
    fn duplicate_station_ids_are_rejected() {
        let mut cfg = ScenarioConfig::baseline();
        cfg.stations[1].id = cfg.stations[0].id;
        let errors = cfg.validate();
        assert!(errors.iter().any(|e| e.message == "duplicate station id"));
    }

    #[test]
    fn round_trips_through_toml() {
        let cfg = ScenarioConfig::baseline();
        let text = toml::to_string(&cfg).unwrap();
        let parsed = ScenarioConfig::from_toml_str(&text).unwrap();
        assert_eq!(parsed.stations.len(), cfg.stations.len());
    }

    #[test]
    fn from_preset_unknown_name_is_none() {
        assert!(ScenarioConfig::from_preset("nonexistent").is_none());
    }
}
