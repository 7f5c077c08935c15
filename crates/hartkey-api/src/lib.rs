// hartkey-api: Async Rust client for the Hartkey intercom/gate HTTP API

pub mod client;
pub mod error;
pub mod transport;
pub mod types;

pub use client::{Endpoints, HartkeyClient};
pub use error::Error;
pub use transport::TransportConfig;
pub use types::{EventsQuery, RAISED_AT_FORMAT};
