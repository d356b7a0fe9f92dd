//! Event dispatch: the arrival generator, swap handler, and charging loop,
//! all driven as tagged events through the shared `Scheduler`. Grounded on
//! the original orchestrator's `_vehicle_arrival_generator` for the arrival
//! process and on the standard get-then-spawn-worker pattern for the
//! charging loop (see SPEC_FULL.md §1.1 item 6).

use crate::model::{Battery, BatteryStatus, DemandCurve, StationId, Vehicle, VehicleId};
use crate::rng::{RngStreams, exponential_draw, gaussian_noise};
use crate::scheduler::Scheduler;
use crate::station::{RETURNED_SOC, Station};
use crate::telemetry::{EventRecord, EventType, TelemetrySink};

const BASE_PATIENCE_SECONDS: f64 = 600.0;
const URGENCY_MIN: f64 = 0.8;
const URGENCY_MAX: f64 = 1.2;
/// SoC a battery is set to on CHARGE_COMPLETE (spec.md §4.2/§4.4 step 7).
const FULL_SOC: f64 = 100.0;

#[derive(Debug)]
pub enum Event {
    ArrivalTick {
        station: StationId,
    },
    VehicleArrival {
        station: StationId,
        vehicle: Vehicle,
    },
    ChargerAcquired {
        station: StationId,
        battery: Battery,
        acquired_at: f64,
    },
    CooldownDone {
        station: StationId,
        battery: Battery,
        acquired_at: f64,
    },
    ChargeComplete {
        station: StationId,
        battery: Battery,
        acquired_at: f64,
        energy_kwh: f64,
    },
    SwapComplete {
        station: StationId,
        vehicle: Vehicle,
        battery: Battery,
    },
}

/// Demand model driving the arrival generator: either a real-network
/// average arrival interval (applied directly, per-station, no division by
/// station count) or a synthetic city-wide rate shaped by an hourly curve,
/// a global multiplier, and an optional per-hour scenario adjustment, split
/// evenly across stations.
pub enum ArrivalModel {
    RealNetwork {
        mean_interval_minutes: f64,
    },
    Synthetic {
        base_rate_per_hour: f64,
        demand_curve: DemandCurve,
        demand_multiplier: f64,
        /// `scenario.demand_adjustments[hour]`, per spec.md §4.5 step 2: a
        /// scenario-level multiplicative override distinct from
        /// `demand_multiplier`, applied on top of it when present.
        demand_adjustments: Option<Vec<f64>>,
    },
}

pub struct World {
    pub stations: Vec<Station>,
    pub scheduler: Scheduler<Event>,
    pub telemetry: TelemetrySink,
    pub rng: RngStreams,
    pub arrival_model: ArrivalModel,
    pub jitter_std: Option<f64>,
    next_vehicle_id: VehicleId,
}

impl World {
    pub fn new(
        stations: Vec<Station>,
        arrival_model: ArrivalModel,
        jitter_std: Option<f64>,
        seed: u64,
    ) -> Self {
        Self {
            stations,
            scheduler: Scheduler::new(),
            telemetry: TelemetrySink::new(),
            rng: RngStreams::from_seed(seed),
            arrival_model,
            jitter_std,
            next_vehicle_id: 0,
        }
    }

    pub fn start_arrivals(&mut self) {
        let station_ids: Vec<StationId> = (0..self.stations.len()).collect();
        for station in station_ids {
            self.scheduler.schedule_now(Event::ArrivalTick { station });
        }
    }

    pub fn start_charging_loops(&mut self) {
        for station in 0..self.stations.len() {
            pull_loop(self, station);
        }
    }

    pub fn run_until(&mut self, horizon_seconds: f64) {
        loop {
            match self.scheduler.peek_time() {
                Some(t) if t <= horizon_seconds => {
                    let event = self.scheduler.pop().expect("peeked event must be present");
                    dispatch(self, event);
                }
                _ => break,
            }
        }
    }

    fn rate_per_hour(&mut self, _station: StationId, now: f64) -> f64 {
        match &self.arrival_model {
            ArrivalModel::RealNetwork {
                mean_interval_minutes,
            } => 60.0 / mean_interval_minutes.max(1e-9),
            ArrivalModel::Synthetic {
                base_rate_per_hour,
                demand_curve,
                demand_multiplier,
                demand_adjustments,
            } => {
                let hour = ((now / 3600.0) as i64).rem_euclid(24) as usize;
                let mut city_rate = base_rate_per_hour * demand_curve.multiplier_at(now) * demand_multiplier;
                if let Some(adjustments) = demand_adjustments
                    && let Some(&adjustment) = adjustments.get(hour)
                {
                    city_rate *= adjustment;
                }
                city_rate / self.stations.len().max(1) as f64
            }
        }
    }
}

pub fn dispatch(world: &mut World, event: Event) {
    match event {
        Event::ArrivalTick { station } => on_arrival_tick(world, station),
        Event::VehicleArrival { station, vehicle } => on_vehicle_arrival(world, station, vehicle),
        Event::ChargerAcquired {
            station,
            battery,
            acquired_at,
        } => on_charger_acquired(world, station, battery, acquired_at),
        Event::CooldownDone {
            station,
            battery,
            acquired_at,
        } => on_cooldown_done(world, station, battery, acquired_at),
        Event::ChargeComplete {
            station,
            battery,
            acquired_at,
            energy_kwh,
        } => on_charge_complete(world, station, battery, acquired_at, energy_kwh),
        Event::SwapComplete {
            station,
            vehicle,
            battery,
        } => on_swap_complete(world, station, vehicle, battery),
    }
}

fn on_arrival_tick(world: &mut World, station: StationId) {
    let now = world.scheduler.now();
    let rate_per_hour = world.rate_per_hour(station, now);
    let mean_interval_seconds = 3600.0 / rate_per_hour.max(1e-9);
    let mut interval = exponential_draw(&mut world.rng.arrivals, mean_interval_seconds);
    if let Some(jitter_std) = world.jitter_std {
        let jitter = gaussian_noise(&mut world.rng.jitter, 1.0, jitter_std).max(0.5);
        interval *= jitter;
    }
    world.scheduler.schedule_after(interval, Event::ArrivalTick { station });

    let vehicle = Vehicle {
        id: world.next_vehicle_id,
        arrived_at: now,
        patience_seconds: BASE_PATIENCE_SECONDS,
        urgency: world.rng.urgency.gen_range_f64(URGENCY_MIN, URGENCY_MAX),
    };
    world.next_vehicle_id += 1;
    world.scheduler.schedule_now(Event::VehicleArrival { station, vehicle });
}

/// Entry point of the swap handler (spec.md §4.3).
fn on_vehicle_arrival(world: &mut World, station: StationId, vehicle: Vehicle) {
    let now = world.scheduler.now();

    // Step 1: increment current_queue_length, track peak, emit VEHICLE_ARRIVAL.
    let queue_length = {
        let st = &mut world.stations[station];
        st.current_queue_length += 1;
        if st.current_queue_length as u64 > st.stats.peak_queue_length {
            st.stats.peak_queue_length = st.current_queue_length as u64;
        }
        st.current_queue_length
    };
    world.telemetry.record(EventRecord {
        time_seconds: now,
        event_type: EventType::VehicleArrived,
        station_id: station,
        vehicle_id: Some(vehicle.id),
        battery_id: None,
        detail: format!("queue_length={queue_length}"),
    });
    record_queue_update(world, station, now, queue_length);

    // Step 2/3: a vehicle that finds no swappable battery leaves immediately
    // -- there is no queueing for inventory, per spec.md §4.3 step 2.
    let st = &mut world.stations[station];
    match st.pool.try_get(Battery::is_swappable) {
        Some(battery) => start_swap(world, station, vehicle, now, battery),
        None => {
            let st = &mut world.stations[station];
            st.current_queue_length -= 1;
            let queue_length = st.current_queue_length;
            st.stats.swaps_lost += 1;
            world.telemetry.record(EventRecord {
                time_seconds: now,
                event_type: EventType::StationStockout,
                station_id: station,
                vehicle_id: None,
                battery_id: None,
                detail: format!("queue_length={queue_length}"),
            });
            world.telemetry.record(EventRecord {
                time_seconds: now,
                event_type: EventType::SwapLost,
                station_id: station,
                vehicle_id: Some(vehicle.id),
                battery_id: None,
                detail: format!("reason=stockout queue_length={queue_length}"),
            });
            record_queue_update(world, station, now, queue_length);
        }
    }
}

fn record_queue_update(world: &mut World, station: StationId, now: f64, queue_length: usize) {
    world.telemetry.record(EventRecord {
        time_seconds: now,
        event_type: EventType::QueueUpdate,
        station_id: station,
        vehicle_id: None,
        battery_id: None,
        detail: format!("queue_length={queue_length}"),
    });
}

fn start_swap(world: &mut World, station: StationId, vehicle: Vehicle, wait_start: f64, mut battery: Battery) {
    let now = world.scheduler.now();
    let wait_seconds = now - wait_start;
    {
        let st = &mut world.stations[station];
        st.stats.record_wait(wait_seconds);
    }
    battery.status = BatteryStatus::InSwap;
    world.telemetry.record(EventRecord {
        time_seconds: now,
        event_type: EventType::SwapStarted,
        station_id: station,
        vehicle_id: Some(vehicle.id),
        battery_id: Some(battery.id),
        detail: format!("battery_soc={:.1} wait_seconds={wait_seconds:.1}", battery.soc),
    });
    let swap_time = world.stations[station].config.swap_time_seconds;
    world
        .scheduler
        .schedule_after(swap_time, Event::SwapComplete { station, vehicle, battery });
}

fn on_swap_complete(world: &mut World, station: StationId, vehicle: Vehicle, mut battery: Battery) {
    let now = world.scheduler.now();
    world.telemetry.record(EventRecord {
        time_seconds: now,
        event_type: EventType::SwapCompleted,
        station_id: station,
        vehicle_id: Some(vehicle.id),
        battery_id: Some(battery.id),
        detail: String::new(),
    });
    battery.status = BatteryStatus::Depleted;
    battery.soc = RETURNED_SOC;
    battery.cycle_count += 1;

    let queue_length = {
        let st = &mut world.stations[station];
        st.stats.swaps_completed += 1;
        st.current_queue_length -= 1;
        st.current_queue_length
    };
    record_queue_update(world, station, now, queue_length);

    deposit_to_charge_queue(world, station, battery);
}

fn deposit_to_charge_queue(world: &mut World, station: StationId, battery: Battery) {
    let st = &mut world.stations[station];
    match st.charge_queue.put(battery) {
        Ok(()) => {}
        Err((battery, _waiter)) => {
            spawn_charge_worker(world, station, battery);
            pull_loop(world, station);
        }
    }
}

fn pull_loop(world: &mut World, station: StationId) {
    loop {
        let next = world.stations[station].charge_queue.try_get();
        match next {
            Some(battery) => spawn_charge_worker(world, station, battery),
            None => {
                world.stations[station].charge_queue.enqueue_waiter(station);
                break;
            }
        }
    }
}

fn spawn_charge_worker(world: &mut World, station: StationId, battery: Battery) {
    let now = world.scheduler.now();
    let st = &mut world.stations[station];
    if st.chargers.try_acquire() {
        world.scheduler.schedule_now(Event::ChargerAcquired {
            station,
            battery,
            acquired_at: now,
        });
    } else {
        world.stations[station].chargers.enqueue(battery);
    }
}

fn on_charger_acquired(world: &mut World, station: StationId, mut battery: Battery, acquired_at: f64) {
    let now = world.scheduler.now();
    battery.status = BatteryStatus::Cooling;

    let st = &world.stations[station];
    if let Some(limit) = st.config.grid_power_limit_kw {
        let active = st.chargers.in_use() as f64 * st.config.charge_power_kw;
        if active > limit {
            world.stations[station].stats.grid_limit_hits += 1;
            world.telemetry.record(EventRecord {
                time_seconds: now,
                event_type: EventType::GridLimitHit,
                station_id: station,
                vehicle_id: None,
                battery_id: Some(battery.id),
                detail: format!("active_kw={active:.1} limit_kw={limit:.1}"),
            });
        }
    }

    let cooldown = world.stations[station].config.cooldown_seconds;
    world.scheduler.schedule_after(
        cooldown,
        Event::CooldownDone {
            station,
            battery,
            acquired_at,
        },
    );
}

fn on_cooldown_done(world: &mut World, station: StationId, mut battery: Battery, acquired_at: f64) {
    let now = world.scheduler.now();
    battery.status = BatteryStatus::Charging;
    world.telemetry.record(EventRecord {
        time_seconds: now,
        event_type: EventType::ChargeStarted,
        station_id: station,
        vehicle_id: None,
        battery_id: Some(battery.id),
        detail: format!("initial_soc={:.1}", battery.soc),
    });
    let (charge_seconds, energy_kwh) = world.stations[station].charge_profile();
    world.scheduler.schedule_after(
        charge_seconds,
        Event::ChargeComplete {
            station,
            battery,
            acquired_at,
            energy_kwh,
        },
    );
}

fn on_charge_complete(
    world: &mut World,
    station: StationId,
    mut battery: Battery,
    acquired_at: f64,
    energy_kwh: f64,
) {
    let now = world.scheduler.now();
    battery.soc = FULL_SOC;
    battery.status = BatteryStatus::Available;
    let duration = now - acquired_at;
    world.telemetry.record(EventRecord {
        time_seconds: now,
        event_type: EventType::ChargeCompleted,
        station_id: station,
        vehicle_id: None,
        battery_id: Some(battery.id),
        detail: format!("final_soc={FULL_SOC:.1} duration={duration:.1} energy_kwh={energy_kwh:.2}"),
    });

    let st = &mut world.stations[station];
    st.stats.charger_busy_seconds += duration;
    st.stats.total_charge_time_seconds += duration;
    st.stats.energy_delivered_kwh += energy_kwh;

    if let Some(next_battery) = st.chargers.release() {
        world.scheduler.schedule_now(Event::ChargerAcquired {
            station,
            battery: next_battery,
            acquired_at: now,
        });
    }

    deposit_to_pool(world, station, battery);
}

fn deposit_to_pool(world: &mut World, station: StationId, battery: Battery) {
    let st = &mut world.stations[station];
    let _ = st.pool.put(battery, Battery::is_swappable);
}

/// Small helper trait to keep `rand`'s verbose `random_range` call sites
/// readable at use.
trait UniformRange {
    fn gen_range_f64(&mut self, lo: f64, hi: f64) -> f64;
}

impl UniformRange for rand::rngs::StdRng {
    fn gen_range_f64(&mut self, lo: f64, hi: f64) -> f64 {
        use rand::Rng;
        self.random_range(lo..hi)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{BatteryConfig, StationConfig};

    fn station_config(id: usize, chargers: u32, total: u32) -> StationConfig {
        StationConfig {
            id,
            name: format!("s{id}"),
            location: (0.0, 0.0),
            charger_count: chargers,
            charge_power_kw: 60.0,
            swap_time_seconds: 90.0,
            total_batteries: total,
            battery_config: BatteryConfig::default(),
            cooldown_seconds: 0.0,
            grid_power_limit_kw: None,
        }
    }

    fn world_with(stations: Vec<Station>) -> World {
        World::new(
            stations,
            ArrivalModel::Synthetic {
                base_rate_per_hour: 60.0,
                demand_curve: DemandCurve::flat(),
                demand_multiplier: 1.0,
                demand_adjustments: None,
            },
            None,
            1,
        )
    }

    #[test]
    fn single_arrival_with_inventory_completes_swap() {
        // total=2 warm-starts with floor(0.8*2)=1 full battery in the pool,
        // so the first arrival finds one ready immediately.
        let mut world = world_with(vec![Station::new(station_config(0, 1, 2))]);
        let vehicle = Vehicle {
            id: 0,
            arrived_at: 0.0,
            patience_seconds: 600.0,
            urgency: 1.0,
        };
        world.scheduler.schedule_now(Event::VehicleArrival { station: 0, vehicle });
        world.run_until(10.0);
        assert_eq!(world.stations[0].stats.swaps_completed, 0); // swap takes 90s, horizon is 10s
        world.run_until(200.0);
        assert_eq!(world.stations[0].stats.swaps_completed, 1);
    }

    #[test]
    fn single_depleted_battery_station_loses_first_arrival() {
        // total=1: the warm-start formula leaves the pool empty (the one
        // battery starts DEPLETED on the charge queue), so an arrival before
        // any charging has happened is a stockout -- matches S2. A vehicle
        // that finds no swappable battery leaves immediately.
        let mut world = world_with(vec![Station::new(station_config(0, 1, 1))]);
        let vehicle = Vehicle {
            id: 0,
            arrived_at: 0.0,
            patience_seconds: 600.0,
            urgency: 1.0,
        };
        world.scheduler.schedule_now(Event::VehicleArrival { station: 0, vehicle });
        world.run_until(10.0);
        assert_eq!(world.stations[0].current_queue_length, 0);
        assert_eq!(world.stations[0].stats.swaps_lost, 1);
        assert_eq!(world.stations[0].stats.swaps_completed, 0);
    }

    #[test]
    fn zero_inventory_station_loses_every_arrival() {
        let mut world = world_with(vec![Station::new(station_config(0, 1, 0))]);
        let vehicle = Vehicle {
            id: 0,
            arrived_at: 0.0,
            patience_seconds: 600.0,
            urgency: 1.0,
        };
        world.scheduler.schedule_now(Event::VehicleArrival { station: 0, vehicle });
        world.run_until(10.0);
        assert_eq!(world.stations[0].stats.swaps_lost, 1);
        assert_eq!(world.stations[0].stats.swaps_completed, 0);
        assert_eq!(world.stations[0].current_queue_length, 0);
    }

    #[test]
    fn depleted_battery_eventually_returns_to_pool() {
        let mut world = world_with(vec![Station::new(station_config(0, 1, 2))]);
        let vehicle = Vehicle {
            id: 0,
            arrived_at: 0.0,
            patience_seconds: 600.0,
            urgency: 1.0,
        };
        world.scheduler.schedule_now(Event::VehicleArrival { station: 0, vehicle });
        world.start_charging_loops();
        world.run_until(100_000.0);
        assert_eq!(world.stations[0].available_battery_count(), 2);
        assert!(world.stations[0].stats.energy_delivered_kwh > 0.0);
        assert!(world.stations[0].stats.total_charge_time_seconds > 0.0);
    }

    #[test]
    fn peak_queue_length_tracks_the_high_water_mark() {
        // total=2 warm-starts 1 full battery in the pool. The first of three
        // simultaneous arrivals claims it (queue_length climbs to 1 but
        // isn't decremented until swap completion); every later arrival that
        // finds the pool empty loses immediately, so the queue never climbs
        // past 2 at once.
        let mut world = world_with(vec![Station::new(station_config(0, 1, 2))]);
        for v in 0..3u64 {
            let vehicle = Vehicle {
                id: v,
                arrived_at: 0.0,
                patience_seconds: 600.0,
                urgency: 1.0,
            };
            world.scheduler.schedule_now(Event::VehicleArrival { station: 0, vehicle });
        }
        world.run_until(0.0);
        assert_eq!(world.stations[0].stats.peak_queue_length, 2);
        assert_eq!(world.stations[0].stats.swaps_lost, 2);
    }

    #[test]
    fn charging_multiple_chargers_runs_concurrently() {
        // total=4 warm-starts 3 full + 1 depleted; two vehicles each claim a
        // full battery, leaving 3 batteries needing a charger (the warm-start
        // depleted one plus the two just-swapped ones) against only 2
        // chargers, so the third must wait out a whole extra cycle.
        let mut world = world_with(vec![Station::new(station_config(0, 2, 4))]);
        for v in 0..2u64 {
            let vehicle = Vehicle {
                id: v,
                arrived_at: 0.0,
                patience_seconds: 600.0,
                urgency: 1.0,
            };
            world.scheduler.schedule_now(Event::VehicleArrival { station: 0, vehicle });
        }
        world.start_charging_loops();
        // Drain swaps first so both depleted batteries hit the charge queue.
        world.run_until(200.0);
        let (charge_seconds, _) = world.stations[0].charge_profile();
        world.run_until(200.0 + 2.0 * charge_seconds + 1.0);
        assert_eq!(world.stations[0].available_battery_count(), 4);
    }
}
