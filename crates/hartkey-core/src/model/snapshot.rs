//! Snapshot of one refresh cycle.

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::{Device, Event};

/// Devices plus their event history as of one successful refresh cycle.
///
/// Never mutated after construction; the coordinator publishes it behind
/// an `Arc` and replaces it wholesale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Devices in API order.
    pub devices: Vec<Device>,
    /// Events keyed by `device_id`, newest first within each group.
    pub events: IndexMap<String, Vec<Event>>,
    /// When the cycle that produced this snapshot completed.
    pub fetched_at: DateTime<Utc>,
}

impl Snapshot {
    pub fn new(devices: Vec<Device>, events: IndexMap<String, Vec<Event>>) -> Self {
        Self {
            devices,
            events,
            fetched_at: Utc::now(),
        }
    }

    pub fn device(&self, id: &str) -> Option<&Device> {
        self.devices.iter().find(|d| d.id == id)
    }

    /// Events for one device; empty when none were returned.
    pub fn events_for(&self, device_id: &str) -> &[Event] {
        self.events.get(device_id).map_or(&[], Vec::as_slice)
    }

    /// Most recent event for a device.
    pub fn latest_event(&self, device_id: &str) -> Option<&Event> {
        self.events_for(device_id).first()
    }

    pub fn actionable_devices(&self) -> impl Iterator<Item = &Device> {
        self.devices.iter().filter(|d| d.is_actionable())
    }

    pub fn event_count(&self) -> usize {
        self.events.values().map(Vec::len).sum()
    }
}
