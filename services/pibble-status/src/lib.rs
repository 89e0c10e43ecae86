//! Pibble Status - server status poller for the Pibble SMP website
//!
//! Polls the Minecraft status API for each configured call site, normalizes
//! the answers into render-ready snapshots, and serves them on a dashboard.

pub mod config;
pub mod dashboard;
pub mod display;
pub mod engine;
pub mod error;
pub mod io;
pub mod poller;
pub mod status_api;
pub mod view;

pub use config::{load_config, Config};
pub use error::{PibbleError, Result, StatusFetchError};

use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::engine::Engine;
use crate::io::{HttpClient, ReqwestHttpClient};

const HTTP_TIMEOUT: Duration = Duration::from_secs(10);

/// Assembles a [`PibbleStatus`] service, with injectable collaborators for
/// tests
pub struct PibbleStatusBuilder {
    config: Config,
    http: Option<Arc<dyn HttpClient>>,
    cancel: Option<CancellationToken>,
}

impl PibbleStatusBuilder {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            http: None,
            cancel: None,
        }
    }

    pub fn with_http_client(mut self, http: Arc<dyn HttpClient>) -> Self {
        self.http = Some(http);
        self
    }

    pub fn with_cancellation_token(mut self, cancel: CancellationToken) -> Self {
        self.cancel = Some(cancel);
        self
    }

    pub async fn build(self) -> Result<PibbleStatus> {
        self.config.validate()?;

        let http = match self.http {
            Some(http) => http,
            None => Arc::new(ReqwestHttpClient::new(HTTP_TIMEOUT)?),
        };
        let cancel = self.cancel.unwrap_or_default();
        let engine = Engine::new(&self.config, http, cancel.clone());

        tracing::debug!(
            "Built pibble-status with {} poller(s) against {}",
            engine.pollers().len(),
            self.config.default_endpoint_url()
        );

        Ok(PibbleStatus {
            config: self.config,
            engine,
            cancel,
        })
    }
}

/// A built service, ready to start
pub struct PibbleStatus {
    config: Config,
    engine: Engine,
    cancel: CancellationToken,
}

impl PibbleStatus {
    pub fn engine(&self) -> &Engine {
        &self.engine
    }

    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Run until ctrl-c or until the cancellation token fires
    pub async fn start(self) -> Result<()> {
        let cancel_for_signal = self.cancel.clone();
        tokio::spawn(async move {
            match tokio::signal::ctrl_c().await {
                Ok(()) => {
                    tracing::info!("Shutdown signal received");
                    cancel_for_signal.cancel();
                }
                Err(e) => tracing::error!("Failed to listen for ctrl-c: {}", e),
            }
        });

        if self.config.dashboard.enabled {
            let dashboard_port = self.config.dashboard.port;
            let pollers = self.engine.pollers().to_vec();
            let cancel_for_dashboard = self.cancel.clone();

            tokio::spawn(async move {
                if let Err(e) =
                    dashboard::serve(pollers, dashboard_port, cancel_for_dashboard).await
                {
                    tracing::error!("{}. Continuing without dashboard.", e);
                }
            });
        }

        tracing::info!("Pibble status pollers started");

        // Blocks until cancelled
        self.engine.run().await?;

        tracing::info!("Pibble status pollers stopped");
        Ok(())
    }
}

/// Run the service with the given configuration
pub async fn run(config: Config) -> Result<()> {
    PibbleStatusBuilder::new(config).build().await?.start().await
}
