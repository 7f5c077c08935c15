// ── Snapshot fetcher ──
//
// The two remote reads a refresh cycle needs, plus the open command.
// Each call is bounded by its own timeout. Device failures propagate;
// event failures are absorbed into an empty map.

use std::future::Future;
use std::time::Duration;

use chrono::{DateTime, Utc};
use hartkey_api::{EventsQuery, HartkeyClient, TransportConfig};
use indexmap::IndexMap;
use tracing::{debug, error, warn};

use crate::config::CoordinatorConfig;
use crate::convert::{parse_devices, parse_events};
use crate::error::CoreError;
use crate::model::{Device, Event, EventType};

// ── Traits ───────────────────────────────────────────────────────────

/// Source of device and event data for one refresh cycle.
pub trait SnapshotFetcher: Send + Sync + 'static {
    /// Fetch intercoms and gates. Hard failures are returned as errors.
    fn fetch_devices(&self) -> impl Future<Output = Result<Vec<Device>, CoreError>> + Send;

    /// Fetch event history for `device_ids` within `window`, grouped by
    /// device. Best-effort: any failure yields an empty map.
    fn fetch_events(
        &self,
        device_ids: &[String],
        window: EventWindow,
    ) -> impl Future<Output = IndexMap<String, Vec<Event>>> + Send;
}

/// Remote "open" action.
pub trait DoorOpener: Send + Sync + 'static {
    fn open_door(&self, device_id: &str) -> impl Future<Output = Result<(), CoreError>> + Send;
}

// ── Event window ─────────────────────────────────────────────────────

/// Closed time range `[begin, end]` for an event query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EventWindow {
    pub begin: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl EventWindow {
    /// The `days` leading up to now.
    pub fn trailing(days: i64) -> Self {
        Self::ending_at(Utc::now(), days)
    }

    pub fn ending_at(end: DateTime<Utc>, days: i64) -> Self {
        Self {
            begin: end - chrono::Duration::days(days),
            end,
        }
    }
}

// ── HTTP implementation ──────────────────────────────────────────────

/// [`SnapshotFetcher`] and [`DoorOpener`] over the real HTTP API.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: HartkeyClient,
    devices_timeout: Duration,
    events_timeout: Duration,
    open_timeout: Duration,
    page_limit: u32,
}

impl HttpFetcher {
    pub fn new(config: &CoordinatorConfig) -> Result<Self, CoreError> {
        let transport = TransportConfig {
            timeout: transport_ceiling(config),
            ..TransportConfig::default()
        };
        let client = HartkeyClient::new(config.endpoints.clone(), &config.token, &transport)?;
        Ok(Self::with_client(client, config))
    }

    /// Use a pre-built client (tests, custom transports).
    pub fn with_client(client: HartkeyClient, config: &CoordinatorConfig) -> Self {
        Self {
            client,
            devices_timeout: config.devices_timeout,
            events_timeout: config.events_timeout,
            open_timeout: config.open_timeout,
            page_limit: config.event_page_limit,
        }
    }

    pub fn client(&self) -> &HartkeyClient {
        &self.client
    }
}

/// Outer reqwest timeout: the largest per-call bound plus a margin.
fn transport_ceiling(config: &CoordinatorConfig) -> Duration {
    config
        .devices_timeout
        .max(config.events_timeout)
        .max(config.open_timeout)
        .saturating_add(Duration::from_secs(5))
}

/// Run `fut` with a deadline; exceeding it is a timeout failure.
async fn bounded<T>(
    limit: Duration,
    fut: impl Future<Output = Result<T, hartkey_api::Error>>,
) -> Result<T, hartkey_api::Error> {
    tokio::time::timeout(limit, fut)
        .await
        .map_err(|_| hartkey_api::Error::Timeout {
            timeout_secs: limit.as_secs(),
        })?
}

impl SnapshotFetcher for HttpFetcher {
    async fn fetch_devices(&self) -> Result<Vec<Device>, CoreError> {
        let body = bounded(self.devices_timeout, self.client.list_devices()).await?;
        debug!("fetched devices payload");
        parse_devices(body)
    }

    async fn fetch_events(
        &self,
        device_ids: &[String],
        window: EventWindow,
    ) -> IndexMap<String, Vec<Event>> {
        if device_ids.is_empty() {
            debug!("no device ids to fetch events for");
            return IndexMap::new();
        }
        debug!(devices = device_ids.len(), "fetching events");

        let query = EventsQuery {
            begin: window.begin,
            end: window.end,
            device_ids: device_ids.to_vec(),
            event_types: EventType::QUERIED
                .iter()
                .map(|t| t.as_str().to_owned())
                .collect(),
            offset: 0,
            limit: self.page_limit,
        };

        match bounded(self.events_timeout, self.client.list_events(&query)).await {
            Ok(body) => parse_events(body),
            Err(hartkey_api::Error::Validation { body }) => {
                warn!(body = %body, "API validation error for events");
                IndexMap::new()
            }
            Err(e) => {
                warn!(error = %e, "failed to fetch events");
                IndexMap::new()
            }
        }
    }
}

impl DoorOpener for HttpFetcher {
    async fn open_door(&self, device_id: &str) -> Result<(), CoreError> {
        match bounded(self.open_timeout, self.client.open_device(device_id)).await {
            Ok(()) => Ok(()),
            Err(hartkey_api::Error::Api { status, body }) => {
                error!(device_id, status, body = %body, "open command rejected");
                Err(CoreError::CommandFailed { status, body })
            }
            Err(hartkey_api::Error::Validation { body }) => {
                error!(device_id, status = 400, body = %body, "open command rejected");
                Err(CoreError::CommandFailed { status: 400, body })
            }
            Err(e) => {
                error!(device_id, error = %e, "open command failed");
                Err(e.into())
            }
        }
    }
}
