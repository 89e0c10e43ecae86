//! Engine: owns one status poller per call site and their lifecycles

use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use crate::config::Config;
use crate::io::HttpClient;
use crate::poller::{PollerHandle, PollerSnapshot, StatusPoller};

/// The engine starts every configured poller and tears them down on cancel
pub struct Engine {
    pollers: Vec<Arc<StatusPoller>>,
    cancel: CancellationToken,
}

impl Engine {
    pub fn new(config: &Config, http: Arc<dyn HttpClient>, cancel: CancellationToken) -> Self {
        let pollers = config
            .pollers
            .iter()
            .map(|poller_config| {
                StatusPoller::new(
                    poller_config.clone(),
                    config.endpoint_for(poller_config),
                    Arc::clone(&http),
                )
            })
            .collect();

        Self { pollers, cancel }
    }

    pub fn pollers(&self) -> &[Arc<StatusPoller>] {
        &self.pollers
    }

    pub fn poller(&self, name: &str) -> Option<&Arc<StatusPoller>> {
        self.pollers.iter().find(|p| p.name() == name)
    }

    /// Snapshots of every poller, in configuration order
    pub async fn snapshots(&self) -> Vec<PollerSnapshot> {
        collect_snapshots(&self.pollers).await
    }

    /// Start all pollers. Returns once the cancellation token is triggered
    /// and every poller has been stopped.
    pub async fn run(&self) -> crate::Result<()> {
        let mut handles: Vec<PollerHandle> = Vec::with_capacity(self.pollers.len());
        for poller in &self.pollers {
            match poller.start() {
                Ok(handle) => handles.push(handle),
                Err(e) => {
                    for handle in handles {
                        handle.stop().await;
                    }
                    return Err(e);
                }
            }
        }

        self.cancel.cancelled().await;

        for handle in handles {
            handle.stop().await;
        }
        Ok(())
    }
}

pub async fn collect_snapshots(pollers: &[Arc<StatusPoller>]) -> Vec<PollerSnapshot> {
    let mut snapshots = Vec::with_capacity(pollers.len());
    for poller in pollers {
        snapshots.push(poller.snapshot().await);
    }
    snapshots
}
