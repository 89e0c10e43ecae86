//! Status poller: one repeating fetch against the status API per call site

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};
use tokio::sync::{watch, RwLock};
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use crate::config::{CycleOrdering, PollerConfig};
use crate::display::DisplayStatus;
use crate::io::HttpClient;
use crate::status_api::fetch_status;

/// What the presentation layer reads from a poller
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PollerSnapshot {
    pub name: String,
    pub status: DisplayStatus,
    /// Sequence number of the cycle that produced `status`, 0 before any
    pub sequence: u64,
    pub updated_epoch_ms: Option<u64>,
    pub refresh_interval_ms: u64,
}

/// How a single poll cycle ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleOutcome {
    Applied,
    /// A newer cycle had already been applied
    Stale,
    /// The poller was stopped while the request was in flight
    Discarded,
}

/// Polls the status API for one call site and keeps its `DisplayStatus`
pub struct StatusPoller {
    config: PollerConfig,
    url: String,
    http: Arc<dyn HttpClient>,
    state: RwLock<PollerSnapshot>,
    updates: watch::Sender<PollerSnapshot>,
    next_sequence: AtomicU64,
    started: AtomicBool,
    cancel: CancellationToken,
}

impl std::fmt::Debug for StatusPoller {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StatusPoller")
            .field("name", &self.config.name)
            .field("url", &self.url)
            .finish()
    }
}

impl StatusPoller {
    pub fn new(config: PollerConfig, url: String, http: Arc<dyn HttpClient>) -> Arc<Self> {
        let snapshot = PollerSnapshot {
            name: config.name.clone(),
            status: DisplayStatus::initial(&config),
            sequence: 0,
            updated_epoch_ms: None,
            refresh_interval_ms: config.refresh_interval_ms,
        };
        let (updates, _) = watch::channel(snapshot.clone());

        tracing::debug!(
            "Created status poller '{}' for {} every {}ms",
            config.name,
            url,
            config.refresh_interval_ms
        );

        Arc::new(Self {
            config,
            url,
            http,
            state: RwLock::new(snapshot),
            updates,
            next_sequence: AtomicU64::new(1),
            started: AtomicBool::new(false),
            cancel: CancellationToken::new(),
        })
    }

    pub fn name(&self) -> &str {
        &self.config.name
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn config(&self) -> &PollerConfig {
        &self.config
    }

    /// Current snapshot
    pub async fn snapshot(&self) -> PollerSnapshot {
        self.state.read().await.clone()
    }

    /// Receiver notified whenever a cycle is applied
    pub fn subscribe(&self) -> watch::Receiver<PollerSnapshot> {
        self.updates.subscribe()
    }

    /// Run one cycle right away, then one every refresh interval until the
    /// returned handle is stopped or dropped. A poller starts at most once.
    pub fn start(self: &Arc<Self>) -> crate::Result<PollerHandle> {
        if self.started.swap(true, Ordering::SeqCst) {
            return Err(crate::PibbleError::Poller(format!(
                "poller '{}' was already started",
                self.config.name
            )));
        }

        tracing::info!(
            "Starting status poller '{}' ({}ms interval)",
            self.config.name,
            self.config.refresh_interval_ms
        );

        self.spawn_cycle();

        let poller = Arc::clone(self);
        let cancel = self.cancel.clone();
        let period = self.config.refresh_interval();
        let task = tokio::spawn(async move {
            let mut ticker = interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                tokio::select! {
                    biased;
                    _ = cancel.cancelled() => {
                        tracing::debug!("Polling loop for '{}' cancelled", poller.name());
                        break;
                    }
                    _ = ticker.tick() => poller.spawn_cycle(),
                }
            }
        });

        Ok(PollerHandle {
            poller: Arc::clone(self),
            cancel: self.cancel.clone(),
            task: Some(task),
        })
    }

    /// Issue and run one poll cycle, returning how it ended. Failures are
    /// folded into the snapshot, never returned.
    pub async fn fetch_cycle(&self) -> CycleOutcome {
        let sequence = self.issue_sequence();
        self.run_cycle(sequence).await
    }

    fn issue_sequence(&self) -> u64 {
        self.next_sequence.fetch_add(1, Ordering::SeqCst)
    }

    /// Cycles run on their own task so a slow request never delays the
    /// next tick.
    fn spawn_cycle(self: &Arc<Self>) {
        let sequence = self.issue_sequence();
        let poller = Arc::clone(self);
        tokio::spawn(async move {
            poller.run_cycle(sequence).await;
        });
    }

    async fn run_cycle(&self, sequence: u64) -> CycleOutcome {
        tracing::debug!("Poll '{}' #{}: GET {}", self.config.name, sequence, self.url);
        let result = fetch_status(self.http.as_ref(), &self.url).await;

        let mut state = self.state.write().await;
        if self.cancel.is_cancelled() {
            tracing::debug!(
                "Poll '{}' #{} settled after stop, discarding",
                self.config.name,
                sequence
            );
            return CycleOutcome::Discarded;
        }
        if self.config.ordering == CycleOrdering::LatestIssued && sequence <= state.sequence {
            tracing::debug!(
                "Poll '{}' #{} is older than applied #{}, dropping",
                self.config.name,
                sequence,
                state.sequence
            );
            return CycleOutcome::Stale;
        }

        let status = match result {
            Ok(remote) => DisplayStatus::from_remote(&remote, &self.config),
            Err(e) => {
                tracing::warn!("Poll '{}' #{} failed: {}", self.config.name, sequence, e);
                state.status.after_error(&self.config)
            }
        };

        tracing::debug!(
            "Poll '{}' #{}: online={} players={}/{}",
            self.config.name,
            sequence,
            status.online,
            status.players.online,
            status.players.max
        );

        state.status = status;
        state.sequence = sequence;
        state.updated_epoch_ms = Some(current_epoch_ms());
        self.updates.send_replace((*state).clone());
        CycleOutcome::Applied
    }
}

/// Stops a started poller. Dropping the handle stops the timer too; `stop`
/// additionally waits until no cycle can touch the snapshot any more.
#[derive(Debug)]
pub struct PollerHandle {
    poller: Arc<StatusPoller>,
    cancel: CancellationToken,
    task: Option<JoinHandle<()>>,
}

impl PollerHandle {
    pub fn poller(&self) -> &Arc<StatusPoller> {
        &self.poller
    }

    pub async fn stop(mut self) {
        self.cancel.cancel();
        // Any cycle that checked the token before cancellation holds the
        // write lock until it has applied.
        drop(self.poller.state.write().await);
        if let Some(task) = self.task.take() {
            let _ = task.await;
        }
        tracing::info!("Stopped status poller '{}'", self.poller.name());
    }
}

impl Drop for PollerHandle {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

fn current_epoch_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}
