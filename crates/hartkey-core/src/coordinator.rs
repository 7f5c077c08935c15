// ── Polling coordinator ──
//
// Owns the refresh cycle and the single published snapshot. A cycle
// walks Fetching → Enriching → Published, or Fetching → Degrading when
// the device fetch fails. Degrading republishes the retained snapshot
// untouched, or surfaces the error when there is nothing to fall back to.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use tokio::sync::{Mutex, watch};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::config::CoordinatorConfig;
use crate::error::CoreError;
use crate::fetcher::{DoorOpener, EventWindow, HttpFetcher, SnapshotFetcher};
use crate::model::{Device, Snapshot};
use crate::store::SnapshotStore;

// ── PollState ────────────────────────────────────────────────────

/// Coordinator health, observable by consumers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollState {
    /// Not started yet.
    Idle,
    /// A cycle is in flight.
    Refreshing,
    /// The last cycle published new data.
    Fresh,
    /// The last cycle failed and the previous snapshot was republished.
    Stale { reason: String },
    /// The token was rejected. Periodic refreshes are paused until an
    /// explicit refresh succeeds.
    AuthRejected,
    /// The last cycle failed with nothing to fall back to.
    Failed { reason: String },
    /// Shut down.
    Stopped,
}

impl fmt::Display for PollState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Idle => f.write_str("idle"),
            Self::Refreshing => f.write_str("refreshing"),
            Self::Fresh => f.write_str("fresh"),
            Self::Stale { reason } => write!(f, "stale ({reason})"),
            Self::AuthRejected => f.write_str("credentials rejected"),
            Self::Failed { reason } => write!(f, "failed ({reason})"),
            Self::Stopped => f.write_str("stopped"),
        }
    }
}

/// Result of a cycle that did not hard-fail.
#[derive(Debug)]
pub enum CycleOutcome {
    /// A new snapshot was built and published.
    Fresh,
    /// The device fetch failed; the retained snapshot was republished.
    Fallback { cause: CoreError },
}

impl CycleOutcome {
    pub fn is_fresh(&self) -> bool {
        matches!(self, Self::Fresh)
    }
}

/// Steps of one refresh cycle.
enum CycleState {
    Fetching,
    Enriching(Vec<Device>),
    Published(Arc<Snapshot>),
    Degrading(CoreError),
}

// ── Coordinator ──────────────────────────────────────────────────

/// Polls the API and publishes [`Snapshot`]s.
///
/// Cheaply cloneable via `Arc<CoordinatorInner>`. Hand a clone to every
/// consumer that needs data; consumers only ever read snapshots.
pub struct Coordinator<F = HttpFetcher> {
    inner: Arc<CoordinatorInner<F>>,
}

impl<F> Clone for Coordinator<F> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

struct CoordinatorInner<F> {
    config: CoordinatorConfig,
    fetcher: F,
    store: SnapshotStore,
    state: watch::Sender<PollState>,
    /// Set when the token is rejected; cleared only by a published cycle.
    auth_rejected: AtomicBool,
    /// Serializes cycles. Held for the whole cycle.
    cycle_gate: Mutex<()>,
    cancel: CancellationToken,
    task_handles: Mutex<Vec<JoinHandle<()>>>,
}

impl Coordinator<HttpFetcher> {
    /// Build a coordinator that talks to the real API.
    pub fn from_config(config: CoordinatorConfig) -> Result<Self, CoreError> {
        let fetcher = HttpFetcher::new(&config)?;
        Ok(Self::new(config, fetcher))
    }
}

impl<F> Coordinator<F>
where
    F: SnapshotFetcher + DoorOpener,
{
    /// Create a coordinator. Does NOT fetch anything -- call
    /// [`start()`](Self::start) for the first refresh and periodic polling.
    pub fn new(config: CoordinatorConfig, fetcher: F) -> Self {
        let (state, _) = watch::channel(PollState::Idle);
        Self {
            inner: Arc::new(CoordinatorInner {
                config,
                fetcher,
                store: SnapshotStore::new(),
                state,
                auth_rejected: AtomicBool::new(false),
                cycle_gate: Mutex::new(()),
                cancel: CancellationToken::new(),
                task_handles: Mutex::new(Vec::new()),
            }),
        }
    }

    pub fn config(&self) -> &CoordinatorConfig {
        &self.inner.config
    }

    pub fn fetcher(&self) -> &F {
        &self.inner.fetcher
    }

    // ── Lifecycle ────────────────────────────────────────────────

    /// Run the first refresh, then spawn the periodic refresh task.
    ///
    /// The first refresh has nothing to fall back to, so any hard
    /// failure is returned and no task is spawned.
    pub async fn start(&self) -> Result<(), CoreError> {
        let outcome = self.request_refresh().await?;
        debug!(fresh = outcome.is_fresh(), "initial refresh complete");

        let period = self.inner.config.update_interval.as_duration();
        let task = tokio::spawn(refresh_task(
            self.clone(),
            period,
            self.inner.cancel.child_token(),
        ));
        self.inner.task_handles.lock().await.push(task);

        info!(
            interval_minutes = self.inner.config.update_interval.minutes(),
            "coordinator started"
        );
        Ok(())
    }

    /// Stop polling and abandon any in-flight call.
    ///
    /// The retained snapshot stays readable; no partially built
    /// snapshot is ever published.
    pub async fn shutdown(&self) {
        self.inner.cancel.cancel();

        let mut handles = self.inner.task_handles.lock().await;
        for handle in handles.drain(..) {
            let _ = handle.await;
        }

        self.inner.state.send_replace(PollState::Stopped);
        debug!("coordinator stopped");
    }

    pub fn is_shut_down(&self) -> bool {
        self.inner.cancel.is_cancelled()
    }

    // ── Reads ────────────────────────────────────────────────────

    /// The current snapshot, or `None` before the first successful cycle.
    pub fn current_snapshot(&self) -> Option<Arc<Snapshot>> {
        self.inner.store.current()
    }

    /// Notified on every publish, including fallback republishes.
    pub fn subscribe(&self) -> watch::Receiver<Option<Arc<Snapshot>>> {
        self.inner.store.subscribe()
    }

    pub fn state(&self) -> watch::Receiver<PollState> {
        self.inner.state.subscribe()
    }

    /// When the current snapshot was built.
    pub fn last_refreshed_at(&self) -> Option<chrono::DateTime<chrono::Utc>> {
        self.current_snapshot().map(|s| s.fetched_at)
    }

    /// True from a token rejection until the next successful cycle.
    pub fn is_auth_rejected(&self) -> bool {
        self.inner.auth_rejected.load(Ordering::Acquire)
    }

    // ── Refresh ──────────────────────────────────────────────────

    /// Run one refresh cycle and wait until it has published.
    ///
    /// Queues behind a cycle that is already in flight. Returns an error
    /// only when the device fetch fails with no snapshot to fall back
    /// to, or when the coordinator is shutting down.
    pub async fn request_refresh(&self) -> Result<CycleOutcome, CoreError> {
        let cancel = &self.inner.cancel;

        let _gate = tokio::select! {
            biased;
            () = cancel.cancelled() => return Err(CoreError::Cancelled),
            guard = self.inner.cycle_gate.lock() => guard,
        };

        self.inner.state.send_replace(PollState::Refreshing);
        debug!("starting refresh cycle");

        tokio::select! {
            biased;
            () = cancel.cancelled() => {
                debug!("refresh cycle abandoned");
                Err(CoreError::Cancelled)
            }
            result = self.run_cycle() => result,
        }
    }

    async fn run_cycle(&self) -> Result<CycleOutcome, CoreError> {
        let fetcher = &self.inner.fetcher;
        let mut state = CycleState::Fetching;

        loop {
            state = match state {
                CycleState::Fetching => match fetcher.fetch_devices().await {
                    Ok(devices) => CycleState::Enriching(devices),
                    Err(e) => CycleState::Degrading(e),
                },
                CycleState::Enriching(devices) => {
                    let ids: Vec<String> = devices.iter().map(|d| d.id.clone()).collect();
                    let window = EventWindow::trailing(self.inner.config.event_window_days);
                    let events = fetcher.fetch_events(&ids, window).await;
                    CycleState::Published(Arc::new(Snapshot::new(devices, events)))
                }
                CycleState::Published(snapshot) => {
                    info!(
                        devices = snapshot.devices.len(),
                        devices_with_events = snapshot.events.len(),
                        "coordinator update completed"
                    );
                    self.inner.auth_rejected.store(false, Ordering::Release);
                    self.inner.state.send_replace(PollState::Fresh);
                    self.inner.store.publish(snapshot);
                    return Ok(CycleOutcome::Fresh);
                }
                CycleState::Degrading(cause) => return self.degrade(cause),
            };
        }
    }

    fn degrade(&self, cause: CoreError) -> Result<CycleOutcome, CoreError> {
        if cause.is_auth() {
            error!(error = %cause, "credentials rejected; re-enter the bearer token");
        } else {
            warn!(error = %cause, "device fetch failed");
        }

        if cause.is_auth() {
            self.inner.auth_rejected.store(true, Ordering::Release);
        }

        let next_state = if self.is_auth_rejected() {
            PollState::AuthRejected
        } else if self.inner.store.current().is_some() {
            PollState::Stale {
                reason: cause.to_string(),
            }
        } else {
            PollState::Failed {
                reason: cause.to_string(),
            }
        };
        self.inner.state.send_replace(next_state);

        if self.inner.store.republish().is_some() {
            info!("using last successful data");
            Ok(CycleOutcome::Fallback { cause })
        } else {
            Err(cause)
        }
    }

    // ── Commands ─────────────────────────────────────────────────

    /// Send the open command to an actionable device, then refresh.
    ///
    /// The device must be present in the current snapshot with an
    /// enabled `open_door` capability. A failed command leaves the
    /// snapshot untouched. A failed follow-up refresh is logged only.
    pub async fn issue_open_command(&self, device_id: &str) -> Result<(), CoreError> {
        let snapshot = self
            .current_snapshot()
            .ok_or_else(|| CoreError::DeviceNotFound {
                identifier: device_id.to_owned(),
            })?;
        let device = snapshot
            .device(device_id)
            .ok_or_else(|| CoreError::DeviceNotFound {
                identifier: device_id.to_owned(),
            })?;
        if !device.is_actionable() {
            return Err(CoreError::NotActionable {
                identifier: device_id.to_owned(),
            });
        }
        info!(device_id, name = %device.display_name, "sending open command");

        let sent = tokio::select! {
            biased;
            () = self.inner.cancel.cancelled() => Err(CoreError::Cancelled),
            result = self.inner.fetcher.open_door(device_id) => result,
        };
        if let Err(e) = sent {
            if e.is_auth() {
                self.inner.auth_rejected.store(true, Ordering::Release);
                self.inner.state.send_replace(PollState::AuthRejected);
            }
            return Err(e);
        }
        info!(device_id, "open command accepted");

        match self.request_refresh().await {
            Ok(outcome) => debug!(fresh = outcome.is_fresh(), "post-open refresh complete"),
            Err(e) => warn!(error = %e, "refresh after open command failed"),
        }
        Ok(())
    }
}

// ── Background tasks ─────────────────────────────────────────────

/// Periodically refresh data. Skips ticks while credentials are rejected.
async fn refresh_task<F>(coordinator: Coordinator<F>, period: Duration, cancel: CancellationToken)
where
    F: SnapshotFetcher + DoorOpener,
{
    let mut interval = tokio::time::interval(period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    interval.tick().await; // consume the immediate first tick

    loop {
        tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            _ = interval.tick() => {
                if coordinator.is_auth_rejected() {
                    debug!("skipping periodic refresh: credentials rejected");
                } else {
                    match coordinator.request_refresh().await {
                        Ok(CycleOutcome::Fresh) => {}
                        Ok(CycleOutcome::Fallback { cause }) => {
                            debug!(error = %cause, "periodic refresh fell back to last snapshot");
                        }
                        Err(CoreError::Cancelled) => break,
                        Err(e) => warn!(error = %e, "periodic refresh failed"),
                    }
                }
            }
        }
    }
}
