//! The pure `run(config) -> SimulationResult` entry point: validates the
//! config, applies interventions, builds the station network, drives the
//! event-driven simulation to its horizon, and aggregates KPIs. Grounded on
//! `SimulationOrchestrator` in the original implementation.

use serde::Serialize;

use crate::config::ScenarioConfig;
use crate::error::SimError;
use crate::intervention::apply_interventions;
use crate::kpi::{BaselineComparison, CityAggregates, OpexBreakdown, StationKpi};
use crate::process::{ArrivalModel, World};
use crate::station::Station;
use crate::telemetry::EventRecord;

#[derive(Debug, Clone, Serialize)]
pub struct SimulationResult {
    pub station_kpis: Vec<StationKpi>,
    pub city: CityAggregates,
    #[serde(skip)]
    pub events: Vec<EventRecord>,
}

pub fn run(config: &ScenarioConfig) -> Result<SimulationResult, SimError> {
    let errors = config.validate();
    if !errors.is_empty() {
        return Err(SimError::InvalidConfig(errors));
    }

    let (stations_config, demand_multiplier) =
        apply_interventions(&config.stations, &config.interventions)?;

    let arrival_model = match config.arrivals.real_network_mean_arrival_min {
        Some(mean_interval_minutes) => ArrivalModel::RealNetwork {
            mean_interval_minutes,
        },
        None => ArrivalModel::Synthetic {
            base_rate_per_hour: config.arrivals.base_rate_per_hour,
            demand_curve: config.arrivals.demand_curve.clone(),
            demand_multiplier: config.arrivals.demand_multiplier * demand_multiplier,
            demand_adjustments: config.arrivals.demand_adjustments.clone(),
        },
    };

    let stations: Vec<Station> = stations_config.into_iter().map(Station::new).collect();
    let num_stations = stations.len();
    let mut world = World::new(
        stations,
        arrival_model,
        config.arrivals.jitter_std,
        config.simulation.seed,
    );
    world.start_arrivals();
    world.start_charging_loops();

    let duration_seconds = config.simulation.duration_days * 24.0 * 3600.0;
    world.run_until(duration_seconds);

    let station_kpis: Vec<StationKpi> = world
        .stations
        .iter()
        .map(|s| {
            StationKpi::compute(
                &s.config,
                &s.stats,
                s.available_battery_count(),
                duration_seconds,
            )
        })
        .collect();

    let total_swaps: u64 = station_kpis.iter().map(|k| k.swaps_completed).sum();
    let energy_delivered: f64 = world.stations.iter().map(|s| s.stats.energy_delivered_kwh).sum();
    let opex = OpexBreakdown::compute(
        energy_delivered,
        total_swaps,
        num_stations,
        config.simulation.duration_days,
    );
    let city = CityAggregates::compute(&station_kpis, opex, duration_seconds / 3600.0);

    Ok(SimulationResult {
        station_kpis,
        city,
        events: world.telemetry.events().to_vec(),
    })
}

/// Runs a baseline config and a scenario config (baseline + interventions
/// already folded in, or a separately constructed config) and computes the
/// percentage/raw deltas between them.
pub fn compare(
    baseline: &ScenarioConfig,
    scenario: &ScenarioConfig,
) -> Result<(SimulationResult, SimulationResult, BaselineComparison), SimError> {
    let baseline_result = run(baseline)?;
    let scenario_result = run(scenario)?;
    let comparison = BaselineComparison::compute(&baseline_result.city, &scenario_result.city);
    Ok((baseline_result, scenario_result, comparison))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::intervention::ScenarioIntervention;

    #[test]
    fn baseline_run_produces_finite_kpis() {
        let mut cfg = ScenarioConfig::baseline();
        cfg.simulation.duration_days = 1.0;
        let result = run(&cfg).unwrap();
        assert!(!result.station_kpis.is_empty());
        for kpi in &result.station_kpis {
            assert!(kpi.avg_wait_seconds.is_finite());
            assert!(kpi.charger_utilization.is_finite());
        }
        assert!(result.city.opex.total.is_finite());
    }

    #[test]
    fn invalid_config_is_rejected_before_running() {
        let mut cfg = ScenarioConfig::baseline();
        cfg.stations.clear();
        let err = run(&cfg).unwrap_err();
        matches!(err, SimError::InvalidConfig(_));
    }

    #[test]
    fn same_seed_is_reproducible() {
        let cfg = ScenarioConfig::baseline();
        let a = run(&cfg).unwrap();
        let b = run(&cfg).unwrap();
        assert_eq!(a.city.total_swaps, b.city.total_swaps);
        assert_eq!(a.city.total_lost, b.city.total_lost);
    }

    #[test]
    fn removing_a_station_reduces_capacity() {
        let baseline = ScenarioConfig::baseline();
        let mut scenario = baseline.clone();
        scenario.interventions.push(ScenarioIntervention::RemoveStation { station_id: 0 });
        let (_, scenario_result, _) = compare(&baseline, &scenario).unwrap();
        assert_eq!(scenario_result.station_kpis.len(), baseline.stations.len() - 1);
    }
}
