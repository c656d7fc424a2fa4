// ── Device state synchronization coordinator ──
//
// Single owner of "what the device currently reports". Drives the
// poll/parse/publish cycle, serializes writes against reads through one
// device lock, and turns repeated poll failures into an availability
// state machine instead of errors.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU32, AtomicU64, Ordering};

use arc_swap::ArcSwapOption;
use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::{Mutex, broadcast, watch};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use cyberq_api::{CyberqClient, DeviceTransport};

use crate::config::CoordinatorConfig;
use crate::error::{CoreError, WriteError};
use crate::field::{Field, FieldValue};
use crate::model::Snapshot;
use crate::parse::parse;
use crate::stream::SnapshotStream;

const EVENT_CHANNEL_SIZE: usize = 64;

// ── Availability ─────────────────────────────────────────────────

/// Why the device is currently reported unavailable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum UnavailableReason {
    /// No poll has succeeded yet and the failure threshold was not reached.
    NotYetPolled,
    /// The device could not be reached.
    Transport,
    /// The device answered with something that is not a valid state.
    Parse,
}

/// Whether consumers should trust the current snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum Availability {
    Available,
    Unavailable {
        reason: UnavailableReason,
        since: DateTime<Utc>,
        consecutive_failures: u32,
    },
}

impl Availability {
    fn not_yet_polled() -> Self {
        Self::Unavailable {
            reason: UnavailableReason::NotYetPolled,
            since: Utc::now(),
            consecutive_failures: 0,
        }
    }

    pub fn is_available(&self) -> bool {
        matches!(self, Self::Available)
    }
}

/// Change notification fanned out to every subscriber.
#[derive(Debug, Clone)]
pub enum CoordinatorEvent {
    /// A newer snapshot was published (poll or accepted write).
    DataUpdated(Arc<Snapshot>),
    AvailabilityChanged(Availability),
}

/// What a single poll cycle did.
#[derive(Debug, Clone)]
pub enum RefreshOutcome {
    Updated(Arc<Snapshot>),
    /// A write held the device lock; the tick was skipped.
    Skipped,
    /// The result was not newer than the current snapshot and was dropped.
    Stale,
    Failed,
    Stopped,
}

// ── Coordinator ──────────────────────────────────────────────────

/// Handle to the synchronization coordinator for one device.
///
/// Cheaply cloneable via `Arc<CoordinatorInner>`. Entity adapters each hold
/// a clone. Generic over the transport so tests can substitute an
/// instrumented one.
pub struct Coordinator<T: DeviceTransport = CyberqClient> {
    inner: Arc<CoordinatorInner<T>>,
}

impl<T: DeviceTransport> Clone for Coordinator<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

struct CoordinatorInner<T> {
    config: CoordinatorConfig,
    transport: T,
    /// Held for the whole duration of every transport call.
    device_lock: Mutex<()>,
    current: ArcSwapOption<Snapshot>,
    snapshot_tx: watch::Sender<Option<Arc<Snapshot>>>,
    availability_tx: watch::Sender<Availability>,
    event_tx: broadcast::Sender<CoordinatorEvent>,
    sequence: AtomicU64,
    failures: AtomicU32,
    started: AtomicBool,
    stopped: AtomicBool,
    cancel: CancellationToken,
    task_handles: Mutex<Vec<JoinHandle<()>>>,
}

impl Coordinator<CyberqClient> {
    /// Create a coordinator talking HTTP to `config.host:config.port`.
    /// Does NOT poll -- call [`start()`](Self::start).
    pub fn new(config: CoordinatorConfig) -> Result<Self, CoreError> {
        let client = CyberqClient::new(&config.host, config.port, &config.transport())?;
        Ok(Self::with_transport(config, client))
    }
}

impl<T: DeviceTransport> Coordinator<T> {
    pub fn with_transport(config: CoordinatorConfig, transport: T) -> Self {
        let (snapshot_tx, _) = watch::channel(None);
        let (availability_tx, _) = watch::channel(Availability::not_yet_polled());
        let (event_tx, _) = broadcast::channel(EVENT_CHANNEL_SIZE);

        Self {
            inner: Arc::new(CoordinatorInner {
                config,
                transport,
                device_lock: Mutex::new(()),
                current: ArcSwapOption::empty(),
                snapshot_tx,
                availability_tx,
                event_tx,
                sequence: AtomicU64::new(0),
                failures: AtomicU32::new(0),
                started: AtomicBool::new(false),
                stopped: AtomicBool::new(false),
                cancel: CancellationToken::new(),
                task_handles: Mutex::new(Vec::new()),
            }),
        }
    }

    pub fn config(&self) -> &CoordinatorConfig {
        &self.inner.config
    }

    pub fn transport(&self) -> &T {
        &self.inner.transport
    }

    // ── Lifecycle ────────────────────────────────────────────────

    /// Spawn the poll loop. The first poll runs immediately.
    ///
    /// Calling `start` twice, or after [`stop()`](Self::stop), does nothing.
    pub async fn start(&self) {
        if self.is_stopped() || self.inner.started.swap(true, Ordering::SeqCst) {
            return;
        }

        let coordinator = self.clone();
        let cancel = self.inner.cancel.clone();
        self.inner
            .task_handles
            .lock()
            .await
            .push(tokio::spawn(poll_task(coordinator, cancel)));

        info!(
            device = %self.inner.config.device_key(),
            interval = ?self.inner.config.poll_interval(),
            "coordinator started"
        );
    }

    /// Stop polling and wait for the loop to exit.
    ///
    /// A poll already talking to the device finishes first, bounded by the
    /// request timeout. Once this returns the loop makes no further
    /// transport calls and later writes fail with [`WriteError::Stopped`].
    pub async fn stop(&self) {
        self.inner.stopped.store(true, Ordering::SeqCst);
        self.inner.cancel.cancel();

        let handles: Vec<_> = self.inner.task_handles.lock().await.drain(..).collect();
        for handle in handles {
            let _ = handle.await;
        }
        info!(device = %self.inner.config.device_key(), "coordinator stopped");
    }

    pub fn is_stopped(&self) -> bool {
        self.inner.stopped.load(Ordering::SeqCst)
    }

    // ── State observation ────────────────────────────────────────

    /// The most recent snapshot, if any poll has succeeded. Lock-free.
    pub fn current_snapshot(&self) -> Option<Arc<Snapshot>> {
        self.inner.current.load_full()
    }

    pub fn availability(&self) -> Availability {
        self.inner.availability_tx.borrow().clone()
    }

    /// Subscribe to data and availability change events.
    pub fn subscribe(&self) -> broadcast::Receiver<CoordinatorEvent> {
        self.inner.event_tx.subscribe()
    }

    pub fn watch_snapshot(&self) -> watch::Receiver<Option<Arc<Snapshot>>> {
        self.inner.snapshot_tx.subscribe()
    }

    pub fn watch_availability(&self) -> watch::Receiver<Availability> {
        self.inner.availability_tx.subscribe()
    }

    /// Stream of published snapshots.
    pub fn snapshots(&self) -> SnapshotStream {
        SnapshotStream::new(self.watch_snapshot())
    }

    // ── Polling ──────────────────────────────────────────────────

    /// Run one poll cycle.
    ///
    /// Skips without touching the device if a write holds the device lock.
    /// Failures are absorbed into [`Availability`].
    pub async fn refresh(&self) -> RefreshOutcome {
        if self.is_stopped() {
            return RefreshOutcome::Stopped;
        }
        let Ok(_guard) = self.inner.device_lock.try_lock() else {
            debug!("device busy, skipping poll");
            return RefreshOutcome::Skipped;
        };

        match self.poll_locked().await {
            Ok(snapshot) => match self.publish(snapshot) {
                Some(published) => {
                    self.record_success();
                    RefreshOutcome::Updated(published)
                }
                None => RefreshOutcome::Stale,
            },
            Err(err) => {
                self.record_failure(&err);
                RefreshOutcome::Failed
            }
        }
    }

    /// Run one poll and surface its failure. Used at setup, before the loop
    /// is started, so the caller can refuse a device that never answered.
    pub async fn first_refresh(&self) -> Result<Arc<Snapshot>, CoreError> {
        if self.is_stopped() {
            return Err(CoreError::Stopped);
        }
        let _guard = self.inner.device_lock.lock().await;

        match self.poll_locked().await {
            Ok(snapshot) => {
                let published = self.publish(snapshot);
                self.record_success();
                published
                    .or_else(|| self.current_snapshot())
                    .ok_or_else(|| CoreError::Internal("no snapshot after refresh".into()))
            }
            Err(err) => {
                self.record_failure(&err);
                Err(err)
            }
        }
    }

    /// Fetch and parse. Caller must hold the device lock.
    async fn poll_locked(&self) -> Result<Snapshot, CoreError> {
        let sequence = self.next_sequence();
        let payload = self.inner.transport.fetch().await?;
        let mut snapshot = parse(&payload)?;
        snapshot.sequence = sequence;
        Ok(snapshot)
    }

    // ── Writes ───────────────────────────────────────────────────

    /// Validate and send a single field to the device.
    ///
    /// Validation happens before any I/O. The call then waits for the
    /// device lock (at most `write_lock_timeout`), so it never overlaps a
    /// poll. On success the value is merged into a new snapshot and
    /// published; on failure the cached snapshot is untouched.
    pub async fn write(&self, field: Field, value: impl Into<FieldValue>) -> Result<(), WriteError> {
        if self.is_stopped() {
            return Err(WriteError::Stopped);
        }
        let value = value.into();
        let encoded = field.encode(&value)?;

        let wait = self.inner.config.write_lock_timeout;
        let Ok(_guard) = tokio::time::timeout(wait, self.inner.device_lock.lock()).await else {
            warn!(%field, "timed out waiting for the device lock");
            return Err(WriteError::Busy {
                waited_ms: u64::try_from(wait.as_millis()).unwrap_or(u64::MAX),
            });
        };

        let sequence = self.next_sequence();
        info!(%field, value = %encoded.value, "writing to device");
        self.inner
            .transport
            .write(&encoded.request)
            .await
            .map_err(|e| {
                warn!(%field, error = %e, "write failed");
                WriteError::from_transport(field, e)
            })?;

        if let Some(current) = self.current_snapshot() {
            let mut next = (*current).clone();
            next.apply(field, &encoded.value);
            next.sequence = sequence;
            next.received_at = Utc::now();
            self.publish(next);
        }
        Ok(())
    }

    // ── Internals ────────────────────────────────────────────────

    fn next_sequence(&self) -> u64 {
        self.inner.sequence.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Replace the current snapshot if `snapshot` is newer, then notify.
    /// Caller must hold the device lock.
    fn publish(&self, snapshot: Snapshot) -> Option<Arc<Snapshot>> {
        if let Some(current) = self.inner.current.load().as_ref() {
            if snapshot.sequence <= current.sequence {
                debug!(
                    sequence = snapshot.sequence,
                    current = current.sequence,
                    "discarding stale snapshot"
                );
                return None;
            }
        }

        let snapshot = Arc::new(snapshot);
        self.inner.current.store(Some(Arc::clone(&snapshot)));
        self.inner.snapshot_tx.send_replace(Some(Arc::clone(&snapshot)));
        let _ = self
            .inner
            .event_tx
            .send(CoordinatorEvent::DataUpdated(Arc::clone(&snapshot)));
        debug!(sequence = snapshot.sequence, "published snapshot");
        Some(snapshot)
    }

    fn record_success(&self) {
        self.inner.failures.store(0, Ordering::SeqCst);
        let changed = self.inner.availability_tx.send_if_modified(|state| {
            if state.is_available() {
                return false;
            }
            *state = Availability::Available;
            true
        });
        if changed {
            info!(device = %self.inner.config.device_key(), "device available");
            let _ = self
                .inner
                .event_tx
                .send(CoordinatorEvent::AvailabilityChanged(Availability::Available));
        }
    }

    fn record_failure(&self, err: &CoreError) {
        let failures = self.inner.failures.fetch_add(1, Ordering::SeqCst).saturating_add(1);
        let reason = match err {
            CoreError::Parse(_) => {
                warn!(error = %err, failures, "device returned an invalid payload");
                UnavailableReason::Parse
            }
            CoreError::Transport(e) => {
                warn!(
                    error = %err,
                    kind = e.kind(),
                    transient = e.is_transient(),
                    failures,
                    "poll failed"
                );
                UnavailableReason::Transport
            }
            _ => {
                warn!(error = %err, failures, "poll failed");
                UnavailableReason::Transport
            }
        };

        let threshold = self.inner.config.failure_threshold;
        let changed = self.inner.availability_tx.send_if_modified(|state| match state {
            Availability::Available => {
                if failures < threshold {
                    return false;
                }
                *state = Availability::Unavailable {
                    reason,
                    since: Utc::now(),
                    consecutive_failures: failures,
                };
                true
            }
            Availability::Unavailable {
                reason: current,
                since,
                consecutive_failures,
            } => {
                // count updates are silent; only leaving NotYetPolled notifies
                *consecutive_failures = failures;
                if *current == UnavailableReason::NotYetPolled && failures >= threshold {
                    *current = reason;
                    *since = Utc::now();
                    return true;
                }
                false
            }
        });

        if changed {
            let availability = self.availability();
            warn!(
                device = %self.inner.config.device_key(),
                ?reason,
                failures,
                "device unavailable"
            );
            let _ = self
                .inner
                .event_tx
                .send(CoordinatorEvent::AvailabilityChanged(availability));
        }
    }
}

// ── Background tasks ─────────────────────────────────────────────

/// Poll the device every `poll_interval` until cancelled.
async fn poll_task<T: DeviceTransport>(coordinator: Coordinator<T>, cancel: CancellationToken) {
    let mut interval = tokio::time::interval(coordinator.config().poll_interval());
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            _ = interval.tick() => {
                coordinator.refresh().await;
            }
        }
    }
    debug!("poll loop exited");
}
