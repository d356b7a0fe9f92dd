//! KPI aggregation: per-station stats -> station KPIs -> city aggregates ->
//! opex breakdown -> baseline-vs-scenario deltas. Grounded on the original
//! orchestrator's `_aggregate_results` / `compare_results`, whose opex
//! constants are carried over verbatim.

use std::collections::HashMap;
use std::fmt;

use serde::Serialize;

use crate::model::{StationConfig, StationStats};

const ENERGY_RATE_PER_KWH: f64 = 8.0;
const BATTERY_COST: f64 = 250_000.0;
const DEGRADATION_PER_CYCLE: f64 = 0.0001;
const FIXED_COST_PER_STATION_DAY: f64 = 500.0;

#[derive(Debug, Clone, Serialize)]
pub struct StationKpi {
    pub station_id: usize,
    pub name: String,
    pub swaps_completed: u64,
    pub swaps_lost: u64,
    pub avg_wait_seconds: f64,
    pub max_wait_seconds: f64,
    pub charger_utilization: f64,
    /// End-of-run snapshot, not time-averaged -- a known simplification.
    pub idle_inventory_pct: f64,
    pub grid_limit_hits: u64,
    pub peak_queue_length: u64,
}

impl StationKpi {
    pub fn compute(
        config: &StationConfig,
        stats: &StationStats,
        available_at_end: usize,
        duration_seconds: f64,
    ) -> Self {
        let max_charger_seconds = config.charger_count as f64 * duration_seconds;
        let charger_utilization = if max_charger_seconds > 0.0 {
            (stats.charger_busy_seconds / max_charger_seconds).min(1.0)
        } else {
            0.0
        };
        let avg_wait_seconds = if stats.swaps_completed > 0 {
            stats.total_wait_seconds / stats.swaps_completed as f64
        } else {
            0.0
        };
        let idle_inventory_pct = if config.total_batteries > 0 {
            available_at_end as f64 / config.total_batteries as f64 * 100.0
        } else {
            0.0
        };
        Self {
            station_id: config.id,
            name: config.name.clone(),
            swaps_completed: stats.swaps_completed,
            swaps_lost: stats.swaps_lost,
            avg_wait_seconds,
            max_wait_seconds: stats.max_wait_seconds,
            charger_utilization,
            idle_inventory_pct,
            grid_limit_hits: stats.grid_limit_hits,
            peak_queue_length: stats.peak_queue_length,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct OpexBreakdown {
    pub energy_cost: f64,
    pub depreciation_cost: f64,
    pub logistics_cost: f64,
    pub total: f64,
}

impl OpexBreakdown {
    pub fn compute(
        energy_delivered_kwh: f64,
        total_swaps: u64,
        num_stations: usize,
        duration_days: f64,
    ) -> Self {
        let energy_cost = energy_delivered_kwh * ENERGY_RATE_PER_KWH;
        let depreciation_cost = total_swaps as f64 * BATTERY_COST * DEGRADATION_PER_CYCLE;
        let logistics_cost = num_stations as f64 * duration_days * FIXED_COST_PER_STATION_DAY;
        Self {
            energy_cost,
            depreciation_cost,
            logistics_cost,
            total: energy_cost + depreciation_cost + logistics_cost,
        }
    }

    pub fn as_map(&self) -> HashMap<&'static str, f64> {
        HashMap::from([
            ("energy_cost", self.energy_cost),
            ("depreciation_cost", self.depreciation_cost),
            ("logistics_cost", self.logistics_cost),
            ("total", self.total),
        ])
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CityAggregates {
    pub city_avg_wait_seconds: f64,
    pub city_throughput_per_hour: f64,
    pub avg_utilization: f64,
    pub avg_idle_inventory_pct: f64,
    pub total_swaps: u64,
    pub total_lost: u64,
    pub opex: OpexBreakdown,
}

impl CityAggregates {
    pub fn compute(stations: &[StationKpi], opex: OpexBreakdown, duration_hours: f64) -> Self {
        let total_swaps: u64 = stations.iter().map(|s| s.swaps_completed).sum();
        let total_lost: u64 = stations.iter().map(|s| s.swaps_lost).sum();
        let n = stations.len().max(1) as f64;
        let city_avg_wait_seconds = if total_swaps > 0 {
            stations
                .iter()
                .map(|s| s.avg_wait_seconds * s.swaps_completed as f64)
                .sum::<f64>()
                / total_swaps as f64
        } else {
            0.0
        };
        let city_throughput_per_hour = if duration_hours > 0.0 {
            total_swaps as f64 / duration_hours
        } else {
            0.0
        };
        let avg_utilization = stations.iter().map(|s| s.charger_utilization).sum::<f64>() / n;
        let avg_idle_inventory_pct =
            stations.iter().map(|s| s.idle_inventory_pct).sum::<f64>() / n;
        Self {
            city_avg_wait_seconds,
            city_throughput_per_hour,
            avg_utilization,
            avg_idle_inventory_pct,
            total_swaps,
            total_lost,
            opex,
        }
    }
}

impl fmt::Display for CityAggregates {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "swaps completed: {}", self.total_swaps)?;
        writeln!(f, "swaps lost: {}", self.total_lost)?;
        writeln!(f, "avg wait: {:.1}s", self.city_avg_wait_seconds)?;
        writeln!(f, "throughput: {:.2}/hr", self.city_throughput_per_hour)?;
        writeln!(f, "avg utilization: {:.1}%", self.avg_utilization * 100.0)?;
        writeln!(f, "avg idle inventory: {:.1}%", self.avg_idle_inventory_pct)?;
        write!(f, "opex total: {:.2} INR", self.opex.total)
    }
}

/// Percentage and raw deltas of a scenario run against a baseline run.
/// Percentages are 0 whenever the baseline denominator is 0, matching the
/// original `compare_results`.
#[derive(Debug, Clone, Serialize)]
pub struct BaselineComparison {
    pub wait_time_delta_pct: f64,
    pub throughput_delta_pct: f64,
    pub utilization_delta_pct: f64,
    pub lost_swaps_delta: i64,
    pub opex_delta: f64,
}

fn pct_delta(baseline: f64, scenario: f64) -> f64 {
    if baseline == 0.0 {
        0.0
    } else {
        (((scenario - baseline) / baseline) * 100.0 * 100.0).round() / 100.0
    }
}

impl BaselineComparison {
    pub fn compute(baseline: &CityAggregates, scenario: &CityAggregates) -> Self {
        Self {
            wait_time_delta_pct: pct_delta(
                baseline.city_avg_wait_seconds,
                scenario.city_avg_wait_seconds,
            ),
            throughput_delta_pct: pct_delta(
                baseline.city_throughput_per_hour,
                scenario.city_throughput_per_hour,
            ),
            utilization_delta_pct: pct_delta(
                baseline.avg_utilization,
                scenario.avg_utilization,
            ),
            lost_swaps_delta: scenario.total_lost as i64 - baseline.total_lost as i64,
            opex_delta: scenario.opex.total - baseline.opex.total,
        }
    }
}
