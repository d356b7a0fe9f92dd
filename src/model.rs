//! Core data model: batteries, vehicles, station configuration, and demand curves.

use serde::{Deserialize, Serialize};

pub type StationId = usize;
pub type BatteryId = usize;
pub type VehicleId = u64;

/// Lifecycle state of a single battery, per the swap/charge cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BatteryStatus {
    Available,
    InSwap,
    Depleted,
    Cooling,
    Charging,
}

/// SoC is tracked on the spec's native 0-100 scale throughout, not a 0-1
/// fraction, so it can be compared directly against `min_swap_soc` and the
/// charge-curve breakpoints without an implicit rescale.
#[derive(Debug, Clone)]
pub struct Battery {
    pub id: BatteryId,
    pub status: BatteryStatus,
    pub soc: f64,
    pub capacity_kwh: f64,
    pub min_swap_soc: f64,
    pub cycle_count: u32,
}

impl Battery {
    pub fn new(id: BatteryId, capacity_kwh: f64, soc: f64, min_swap_soc: f64) -> Self {
        Self {
            id,
            status: BatteryStatus::Available,
            soc,
            capacity_kwh,
            min_swap_soc,
            cycle_count: 0,
        }
    }

    /// A battery is swappable onto a vehicle only once it is available and
    /// charged at least to its own `min_swap_soc` threshold.
    pub fn is_swappable(&self) -> bool {
        matches!(self.status, BatteryStatus::Available) && self.soc >= self.min_swap_soc
    }
}

#[derive(Debug, Clone)]
pub struct Vehicle {
    pub id: VehicleId,
    pub arrived_at: f64,
    pub patience_seconds: f64,
    pub urgency: f64,
}

/// Hourly demand multipliers, one entry per hour-of-day (length 24).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DemandCurve {
    pub hourly_multiplier: Vec<f64>,
}

impl DemandCurve {
    pub fn flat() -> Self {
        Self {
            hourly_multiplier: vec![1.0; 24],
        }
    }

    pub fn multiplier_at(&self, sim_seconds: f64) -> f64 {
        let hour = ((sim_seconds / 3600.0) as i64).rem_euclid(24) as usize;
        self.hourly_multiplier
            .get(hour)
            .copied()
            .unwrap_or(1.0)
    }
}

/// Per-battery physical parameters shared by every battery a station owns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BatteryConfig {
    pub capacity_kwh: f64,
    /// SoC, on the 0-100 scale, at or above which an Available battery is
    /// swappable. Typically 95.
    pub min_swap_soc: f64,
}

impl Default for BatteryConfig {
    fn default() -> Self {
        Self {
            capacity_kwh: 60.0,
            min_swap_soc: 95.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StationConfig {
    pub id: StationId,
    pub name: String,
    /// (latitude, longitude) — station identity, per spec.md §3.
    pub location: (f64, f64),
    pub charger_count: u32,
    pub charge_power_kw: f64,
    pub swap_time_seconds: f64,
    pub total_batteries: u32,
    pub battery_config: BatteryConfig,
    pub cooldown_seconds: f64,
    pub grid_power_limit_kw: Option<f64>,
}

impl StationConfig {
    pub fn validate(&self, field_prefix: &str) -> Vec<crate::error::ConfigError> {
        use crate::error::ConfigError;
        let mut errors = Vec::new();
        if self.charger_count == 0 {
            errors.push(ConfigError::new(
                format!("{field_prefix}.charger_count"),
                "must be at least 1",
            ));
        }
        if self.charge_power_kw <= 0.0 {
            errors.push(ConfigError::new(
                format!("{field_prefix}.charge_power_kw"),
                "must be positive",
            ));
        }
        if self.swap_time_seconds < 30.0 {
            errors.push(ConfigError::new(
                format!("{field_prefix}.swap_time_seconds"),
                "must be at least 30 seconds",
            ));
        }
        if self.total_batteries < 1 {
            errors.push(ConfigError::new(
                format!("{field_prefix}.total_batteries"),
                "must be at least 1",
            ));
        }
        if self.battery_config.capacity_kwh <= 0.0 {
            errors.push(ConfigError::new(
                format!("{field_prefix}.battery_config.capacity_kwh"),
                "must be positive",
            ));
        }
        errors
    }
}

#[derive(Debug, Clone, Default)]
pub struct StationStats {
    pub swaps_completed: u64,
    pub swaps_lost: u64,
    pub total_wait_seconds: f64,
    pub max_wait_seconds: f64,
    pub charger_busy_seconds: f64,
    pub total_charge_time_seconds: f64,
    pub peak_queue_length: u64,
    pub grid_limit_hits: u64,
    pub energy_delivered_kwh: f64,
}

impl StationStats {
    pub fn record_wait(&mut self, wait_seconds: f64) {
        self.total_wait_seconds += wait_seconds;
        if wait_seconds > self.max_wait_seconds {
            self.max_wait_seconds = wait_seconds;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn battery_is_swappable_only_when_available_and_full() {
        let mut b = Battery::new(0, 60.0, 100.0, 95.0);
        assert!(b.is_swappable());
        b.status = BatteryStatus::Charging;
        assert!(!b.is_swappable());
        b.status = BatteryStatus::Available;
        b.soc = 50.0;
        assert!(!b.is_swappable());
    }

    #[test]
    fn demand_curve_wraps_hour_of_day() {
        let mut curve = DemandCurve::flat();
        curve.hourly_multiplier[0] = 2.0;
        assert_eq!(curve.multiplier_at(0.0), 2.0);
        assert_eq!(curve.multiplier_at(24.0 * 3600.0), 2.0);
    }

    #[test]
    fn station_config_validate_catches_zero_chargers() {
        let cfg = StationConfig {
            id: 0,
            name: "s".into(),
            location: (0.0, 0.0),
            charger_count: 0,
            charge_power_kw: 60.0,
            swap_time_seconds: 90.0,
            total_batteries: 5,
            battery_config: BatteryConfig::default(),
            cooldown_seconds: 0.0,
            grid_power_limit_kw: None,
        };
        let errors = cfg.validate("stations[0]");
        assert!(errors.iter().any(|e| e.field.contains("charger_count")));
    }

    #[test]
    fn station_config_validate_catches_short_swap_time_and_no_inventory() {
        let cfg = StationConfig {
            id: 0,
            name: "s".into(),
            location: (0.0, 0.0),
            charger_count: 1,
            charge_power_kw: 60.0,
            swap_time_seconds: 10.0,
            total_batteries: 0,
            battery_config: BatteryConfig::default(),
            cooldown_seconds: 0.0,
            grid_power_limit_kw: None,
        };
        let errors = cfg.validate("stations[0]");
        assert!(errors.iter().any(|e| e.field.contains("swap_time_seconds")));
        assert!(errors.iter().any(|e| e.field.contains("total_batteries")));
    }
}
