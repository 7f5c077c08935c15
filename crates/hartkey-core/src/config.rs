// ── Runtime coordinator configuration ──
//
// These types describe *how* to poll the Hartkey API. They carry the
// credential and the timing knobs, but never touch disk. The binary
// (or any other host) constructs a `CoordinatorConfig` and hands it in.

use std::time::Duration;

use hartkey_api::Endpoints;
use secrecy::SecretString;

use crate::error::CoreError;

/// Polling period, validated to 1–1440 minutes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UpdateInterval(u32);

impl UpdateInterval {
    pub const MIN_MINUTES: u32 = 1;
    pub const MAX_MINUTES: u32 = 1440;
    pub const DEFAULT_MINUTES: u32 = 5;

    pub fn from_minutes(minutes: u32) -> Result<Self, CoreError> {
        if (Self::MIN_MINUTES..=Self::MAX_MINUTES).contains(&minutes) {
            Ok(Self(minutes))
        } else {
            Err(CoreError::Config {
                message: format!(
                    "update interval must be between {} and {} minutes, got {minutes}",
                    Self::MIN_MINUTES,
                    Self::MAX_MINUTES
                ),
            })
        }
    }

    pub fn minutes(self) -> u32 {
        self.0
    }

    pub fn as_duration(self) -> Duration {
        Duration::from_secs(u64::from(self.0) * 60)
    }
}

impl Default for UpdateInterval {
    fn default() -> Self {
        Self(Self::DEFAULT_MINUTES)
    }
}

/// Configuration for one coordinator instance.
///
/// Built by the host, passed to `Coordinator` -- core never reads config files.
#[derive(Debug, Clone)]
pub struct CoordinatorConfig {
    /// API base URLs.
    pub endpoints: Endpoints,
    /// Bearer token.
    pub token: SecretString,
    /// How often the periodic refresh runs.
    pub update_interval: UpdateInterval,
    /// Bound on the device list call.
    pub devices_timeout: Duration,
    /// Bound on the event list call (larger payload).
    pub events_timeout: Duration,
    /// Bound on an open command.
    pub open_timeout: Duration,
    /// Trailing window for event history, in days.
    pub event_window_days: i64,
    /// Page size for the event query.
    pub event_page_limit: u32,
}

impl CoordinatorConfig {
    /// Defaults for everything except the credential.
    pub fn new(token: SecretString) -> Self {
        Self {
            endpoints: Endpoints::vendor(),
            token,
            update_interval: UpdateInterval::default(),
            devices_timeout: Duration::from_secs(10),
            events_timeout: Duration::from_secs(15),
            open_timeout: Duration::from_secs(10),
            event_window_days: 7,
            event_page_limit: 100,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interval_bounds() {
        assert!(UpdateInterval::from_minutes(0).is_err());
        assert!(UpdateInterval::from_minutes(1).is_ok());
        assert!(UpdateInterval::from_minutes(1440).is_ok());
        assert!(UpdateInterval::from_minutes(1441).is_err());
    }

    #[test]
    fn interval_duration() {
        let interval = UpdateInterval::from_minutes(5).expect("valid interval");
        assert_eq!(interval.as_duration(), Duration::from_secs(300));
        assert_eq!(UpdateInterval::default().minutes(), 5);
    }

    #[test]
    fn events_bound_exceeds_devices_bound() {
        let cfg = CoordinatorConfig::new(SecretString::from("t".to_string()));
        assert!(cfg.events_timeout > cfg.devices_timeout);
        assert_eq!(cfg.event_window_days, 7);
        assert_eq!(cfg.event_page_limit, 100);
    }
}
