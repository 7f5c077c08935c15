// ── Domain model ──
//
// Canonical types produced by the parse boundary in `convert` and
// published by the coordinator. Re-created fresh on every cycle.

pub mod device;
pub mod event;
pub mod snapshot;

pub use device::{Capability, Device, DeviceType, OPEN_DOOR_CAPABILITY};
pub use event::{Event, EventType};
pub use snapshot::Snapshot;
