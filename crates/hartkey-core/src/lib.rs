//! Polling coordinator and domain model for Hartkey intercoms and gates.
//!
//! Sits between `hartkey-api` and consumers (the CLI, or anything else
//! that wants a periodically refreshed view of a household's doors):
//!
//! - **[`Coordinator`]**: Owns the refresh cycle. [`start()`](Coordinator::start)
//!   runs the first refresh and spawns the periodic task;
//!   [`request_refresh()`](Coordinator::request_refresh) runs an on-demand
//!   cycle; [`issue_open_command()`](Coordinator::issue_open_command) sends
//!   the open command and refreshes afterwards.
//!
//! - **[`SnapshotFetcher`] / [`DoorOpener`]**: The I/O seam. [`HttpFetcher`]
//!   bounds every call with its own timeout: devices must succeed,
//!   events degrade to an empty map.
//!
//! - **[`Snapshot`]**: Immutable result of one successful cycle. The
//!   coordinator keeps exactly one; a failed cycle republishes it as-is.
//!
//! - **Domain model** ([`model`]): `Device`, `Event` and friends, built
//!   from loosely shaped vendor JSON by [`convert`].

pub mod config;
pub mod convert;
pub mod coordinator;
pub mod error;
pub mod fetcher;
pub mod model;
pub(crate) mod store;

// ── Primary re-exports ──────────────────────────────────────────────
pub use config::{CoordinatorConfig, UpdateInterval};
pub use coordinator::{Coordinator, CycleOutcome, PollState};
pub use error::CoreError;
pub use fetcher::{DoorOpener, EventWindow, HttpFetcher, SnapshotFetcher};
pub use model::{Capability, Device, DeviceType, Event, EventType, OPEN_DOOR_CAPABILITY, Snapshot};
