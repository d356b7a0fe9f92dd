//! The event trace: an append-only log of everything that happened during a
//! run, queryable by type, and exportable to CSV/JSON. Grounded on the
//! teacher's `telemetry.rs` row-oriented export idiom.

use serde::Serialize;

use crate::model::{BatteryId, StationId, VehicleId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum EventType {
    VehicleArrived,
    SwapStarted,
    SwapCompleted,
    SwapLost,
    ChargeStarted,
    ChargeCompleted,
    GridLimitHit,
    /// The station-level condition observed at a stockout: the pool held no
    /// swappable battery. Emitted alongside (not instead of) the vehicle's
    /// own SwapLost event — see spec.md §3's event-type list.
    StationStockout,
    /// `current_queue_length` changed. Emitted whenever a vehicle arrival,
    /// stockout, or swap completion mutates the counter.
    QueueUpdate,
}

#[derive(Debug, Clone, Serialize)]
pub struct EventRecord {
    pub time_seconds: f64,
    pub event_type: EventType,
    pub station_id: StationId,
    pub vehicle_id: Option<VehicleId>,
    pub battery_id: Option<BatteryId>,
    pub detail: String,
}

#[derive(Debug, Default)]
pub struct TelemetrySink {
    events: Vec<EventRecord>,
}

impl TelemetrySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, record: EventRecord) {
        self.events.push(record);
    }

    pub fn events(&self) -> &[EventRecord] {
        &self.events
    }

    pub fn events_of_type(&self, kind: EventType) -> impl Iterator<Item = &EventRecord> {
        self.events.iter().filter(move |e| e.event_type == kind)
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rec(t: f64, kind: EventType, station: StationId) -> EventRecord {
        EventRecord {
            time_seconds: t,
            event_type: kind,
            station_id: station,
            vehicle_id: None,
            battery_id: None,
            detail: String::new(),
        }
    }

    #[test]
    fn filters_by_event_type() {
        let mut sink = TelemetrySink::new();
        sink.record(rec(1.0, EventType::VehicleArrived, 0));
        sink.record(rec(2.0, EventType::SwapCompleted, 0));
        sink.record(rec(3.0, EventType::SwapCompleted, 1));
        let completed: Vec<_> = sink.events_of_type(EventType::SwapCompleted).collect();
        assert_eq!(completed.len(), 2);
    }
}
