//! Shared test fixtures for integration tests.

use swap_sim::config::ScenarioConfig;
use swap_sim::model::StationConfig;

/// A single station with the given inventory, useful for isolating one
/// station's behavior from city-wide dynamics.
pub fn single_station_config(charger_count: u32, total_batteries: u32) -> ScenarioConfig {
    let mut cfg = ScenarioConfig::baseline();
    cfg.stations = vec![StationConfig {
        id: 0,
        name: "solo".into(),
        location: (0.0, 0.0),
        charger_count,
        charge_power_kw: 60.0,
        swap_time_seconds: 90.0,
        total_batteries,
        battery_config: swap_sim::model::BatteryConfig::default(),
        cooldown_seconds: 0.0,
        grid_power_limit_kw: None,
    }];
    cfg
}
