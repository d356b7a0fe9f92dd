//! Per-station runtime state: the charger-bay `Resource`, the swappable
//! battery pool (`FilterStore`), the depleted-battery charge queue
//! (`Store`), the `current_queue_length` counter, and accumulated stats.

use crate::model::{Battery, BatteryStatus, StationConfig, StationStats};
use crate::resource::{FilterStore, Resource, Store};

pub struct Station {
    pub config: StationConfig,
    pub stats: StationStats,
    /// A vehicle that finds the pool empty of swappable batteries leaves
    /// immediately (spec.md §4.3 step 2), so the pool never actually queues
    /// a waiter; `()` documents that the waiter slot is structural, not used.
    pub pool: FilterStore<Battery, ()>,
    pub charge_queue: Store<Battery, usize>,
    pub chargers: Resource<Battery>,
    /// Vehicles currently between arrival and swap completion (or stockout),
    /// per spec.md §4.3 step 1/6 — incremented on arrival, decremented only
    /// on a lost swap or a completed swap.
    pub current_queue_length: usize,
}

/// A battery is discharged back to this SoC (0-100 scale) by the time it
/// comes off a vehicle and re-enters the charge queue.
pub const RETURNED_SOC: f64 = 20.0;
/// Below this SoC a battery charges at full power; above it the curve
/// tapers to half power, mirroring a CC/CV charge profile.
const FAST_CHARGE_THRESHOLD: f64 = 80.0;
/// Fraction of `total_batteries` that starts AVAILABLE and full at station
/// startup; the remainder starts at a partial SoC per spec.md §4.2.
const WARM_START_FULL_FRACTION: f64 = 0.8;
/// Warm-start SoC for batteries beyond the full fraction cycles through
/// these five values by battery index, per spec.md §4.2's worked formula.
const WARM_START_SOC_STEP: f64 = 10.0;
const WARM_START_SOC_BASE: f64 = 50.0;
const WARM_START_SOC_CYCLE: u32 = 5;

impl Station {
    /// Builds a station's initial battery population per spec.md §4.2: the
    /// first `floor(0.8 * total_batteries)` batteries are full and sit in
    /// the pool; the remainder start at `50 + (i mod 5)*10`, which (50, 60,
    /// 70, 80, 90) are all below a typical 95 `min_swap_soc` and so are
    /// placed DEPLETED on the charge queue instead.
    pub fn new(config: StationConfig) -> Self {
        let mut pool = FilterStore::new();
        let mut charge_queue = Store::new();
        let total = config.total_batteries as usize;
        let full_count = (WARM_START_FULL_FRACTION * total as f64).floor() as usize;
        let cap = config.battery_config.capacity_kwh;
        let min_swap_soc = config.battery_config.min_swap_soc;

        for id in 0..full_count {
            pool.items_mut().push(Battery::new(id, cap, 100.0, min_swap_soc));
        }
        for id in full_count..total {
            let soc = WARM_START_SOC_BASE + ((id as u32 % WARM_START_SOC_CYCLE) as f64) * WARM_START_SOC_STEP;
            let mut battery = Battery::new(id, cap, soc, min_swap_soc);
            if soc < min_swap_soc {
                battery.status = BatteryStatus::Depleted;
                charge_queue
                    .put(battery)
                    .expect("charge queue has no waiters at station construction");
            } else {
                pool.items_mut().push(battery);
            }
        }

        Self {
            chargers: Resource::new(config.charger_count),
            charge_queue,
            pool,
            stats: StationStats::default(),
            current_queue_length: 0,
            config,
        }
    }

    pub fn available_battery_count(&self) -> usize {
        self.pool.items().iter().filter(|b| b.is_swappable()).count()
    }

    /// Seconds to charge from `RETURNED_SOC` to full, and the energy (kWh)
    /// delivered in that time, under the two-segment charge curve
    /// (spec.md §4.4.1) and the decoupled energy-accounting formula
    /// (§4.4.2).
    pub fn charge_profile(&self) -> (f64, f64) {
        let cap = self.config.battery_config.capacity_kwh;
        let power = self.config.charge_power_kw;
        let s0 = RETURNED_SOC;

        let fast_kwh = (FAST_CHARGE_THRESHOLD - s0).max(0.0) / 100.0 * cap;
        let slow_kwh = (100.0 - FAST_CHARGE_THRESHOLD.max(s0)).max(0.0) / 100.0 * cap;
        let fast_seconds = fast_kwh / power * 3600.0;
        let slow_seconds = slow_kwh / (power * 0.5) * 3600.0;
        let duration = fast_seconds + slow_seconds;

        let energy_kwh = power * 0.75 * (duration / 3600.0);
        (duration, energy_kwh)
    }
}
