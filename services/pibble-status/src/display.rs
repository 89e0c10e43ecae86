//! Render-ready server status and the rules that derive it

use serde::{Deserialize, Serialize};

use crate::config::{OnErrorPolicy, PlayerCounts, PollerConfig};
use crate::status_api::RemoteServerStatus;

/// Normalized snapshot of the server as the pages show it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplayStatus {
    pub online: bool,
    pub players: PlayerCounts,
    pub version: String,
    pub motd: String,
    /// True until the first poll cycle settles, never again afterwards
    pub loading: bool,
    pub error: Option<String>,
}

impl DisplayStatus {
    /// State before any poll cycle has settled
    pub fn initial(config: &PollerConfig) -> Self {
        Self {
            online: false,
            players: config.default_players,
            version: config.version.initial.clone(),
            motd: config.motd.initial.clone(),
            loading: true,
            error: None,
        }
    }

    /// Fill a successful response's gaps with the configured fallbacks
    pub fn from_remote(remote: &RemoteServerStatus, config: &PollerConfig) -> Self {
        let version = remote
            .version
            .as_deref()
            .filter(|v| !v.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| config.version.fallback.clone());
        let motd = remote
            .motd_text()
            .unwrap_or_else(|| config.motd.fallback.clone());

        Self {
            online: remote.online.unwrap_or(false),
            players: remote
                .players
                .map(|p| p.or_defaults(config.default_players))
                .unwrap_or(config.default_players),
            version,
            motd,
            loading: false,
            error: None,
        }
    }

    /// State after a failed cycle, according to the poller's error policy
    pub fn after_error(&self, config: &PollerConfig) -> Self {
        let base = match config.on_error {
            OnErrorPolicy::Preserve => self.clone(),
            OnErrorPolicy::Reset => Self::initial(config),
        };
        Self {
            loading: false,
            error: Some(config.error_message.clone()),
            ..base
        }
    }
}
