//! Scenario interventions: a pure function from a baseline station list plus
//! a list of interventions to a modified station list, applied in order.
//! Grounded on the original orchestrator's `_apply_interventions` /
//! `_apply_single_intervention`.

use serde::{Deserialize, Serialize};

use crate::error::SimError;
use crate::model::{BatteryConfig, StationConfig};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ScenarioIntervention {
    AddStation {
        station: StationConfigDelta,
    },
    RemoveStation {
        station_id: usize,
    },
    ModifyChargers {
        station_id: usize,
        charger_count: u32,
    },
    ModifyInventory {
        station_id: usize,
        delta: i64,
    },
    DemandMultiplier {
        multiplier: f64,
    },
    PolicyChange {
        policy: String,
    },
    InjectFault {
        description: String,
    },
}

/// A partially-specified station, used by `AddStation`. Per spec.md §4.6,
/// `total_batteries`, `charger_count`, and `location` are required — there
/// is no sensible default for a station's identity or inventory size, so
/// omitting them is an `InvalidConfig`, not a silent fallback. Only the
/// charge rate and swap duration have defaults worth assuming.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StationConfigDelta {
    pub id: usize,
    pub name: Option<String>,
    pub location: Option<(f64, f64)>,
    pub charger_count: Option<u32>,
    pub charge_power_kw: Option<f64>,
    pub swap_time_seconds: Option<f64>,
    pub total_batteries: Option<u32>,
    pub battery_config: Option<BatteryConfig>,
    pub cooldown_seconds: Option<f64>,
}

const DEFAULT_CHARGE_POWER_KW: f64 = 60.0;
const DEFAULT_SWAP_TIME_SECONDS: f64 = 90.0;

impl StationConfigDelta {
    /// Builds a `StationConfig`, or fails with the name of the first
    /// missing required field — per spec.md §8 boundary scenario S6, this
    /// must happen before any event is scheduled for the new station.
    fn try_into_config(self) -> Result<StationConfig, String> {
        let total_batteries = self
            .total_batteries
            .ok_or("station.total_batteries is required")?;
        let charger_count = self
            .charger_count
            .ok_or("station.charger_count is required")?;
        let location = self.location.ok_or("station.location is required")?;
        Ok(StationConfig {
            id: self.id,
            name: self.name.unwrap_or_else(|| format!("station-{}", self.id)),
            location,
            charger_count,
            charge_power_kw: self.charge_power_kw.unwrap_or(DEFAULT_CHARGE_POWER_KW),
            swap_time_seconds: self
                .swap_time_seconds
                .unwrap_or(DEFAULT_SWAP_TIME_SECONDS),
            total_batteries,
            battery_config: self.battery_config.unwrap_or_default(),
            cooldown_seconds: self.cooldown_seconds.unwrap_or(0.0),
            grid_power_limit_kw: None,
        })
    }
}

/// Applies every intervention in order to `baseline`, returning the
/// resulting station list. Unknown station ids on `Remove`/`Modify*` are a
/// silent no-op, matching the original's tolerant behavior; `DemandMultiplier`
/// is returned separately since it scales the arrival process, not a station.
pub fn apply_interventions(
    baseline: &[StationConfig],
    interventions: &[ScenarioIntervention],
) -> Result<(Vec<StationConfig>, f64), SimError> {
    let mut stations = baseline.to_vec();
    let mut demand_multiplier = 1.0;

    for (index, intervention) in interventions.iter().enumerate() {
        match intervention {
            ScenarioIntervention::AddStation { station } => {
                if stations.iter().any(|s| s.id == station.id) {
                    return Err(SimError::InvalidIntervention {
                        index,
                        message: format!("station id {} already exists", station.id),
                    });
                }
                let config = station.clone().try_into_config().map_err(|message| {
                    SimError::InvalidIntervention { index, message }
                })?;
                stations.push(config);
            }
            ScenarioIntervention::RemoveStation { station_id } => {
                stations.retain(|s| s.id != *station_id);
            }
            ScenarioIntervention::ModifyChargers {
                station_id,
                charger_count,
            } => {
                if *charger_count < 1 {
                    return Err(SimError::InvalidIntervention {
                        index,
                        message: "charger_count must be at least 1".into(),
                    });
                }
                if let Some(s) = stations.iter_mut().find(|s| s.id == *station_id) {
                    s.charger_count = *charger_count;
                }
            }
            ScenarioIntervention::ModifyInventory { station_id, delta } => {
                if let Some(s) = stations.iter_mut().find(|s| s.id == *station_id) {
                    let updated = s.total_batteries as i64 + delta;
                    s.total_batteries = updated.max(1) as u32;
                }
            }
            ScenarioIntervention::DemandMultiplier { multiplier } => {
                if *multiplier < 0.0 {
                    return Err(SimError::InvalidIntervention {
                        index,
                        message: "demand multiplier must not be negative".into(),
                    });
                }
                demand_multiplier *= multiplier;
            }
            // Recognized but intentionally inert: neither mutates the
            // station set nor the arrival process.
            ScenarioIntervention::PolicyChange { .. } | ScenarioIntervention::InjectFault { .. } => {}
        }
    }

    Ok((stations, demand_multiplier))
}
