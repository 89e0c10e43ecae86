//! Configuration types for the pibble-status service

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;
use std::time::Duration;

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Base URL of the status API, without a trailing slash
    #[serde(default = "default_api_base")]
    pub api_base: String,
    /// Minecraft server address as `ip:port`
    #[serde(default = "default_server_address")]
    pub server_address: String,
    #[serde(default = "default_pollers")]
    pub pollers: Vec<PollerConfig>,
    #[serde(default)]
    pub dashboard: DashboardConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base: default_api_base(),
            server_address: default_server_address(),
            pollers: default_pollers(),
            dashboard: DashboardConfig::default(),
        }
    }
}

impl Config {
    /// The status API URL for the configured server address
    pub fn default_endpoint_url(&self) -> String {
        crate::status_api::endpoint_url(&self.api_base, &self.server_address)
    }

    /// The endpoint a poller queries: its own override, or the shared one
    pub fn endpoint_for(&self, poller: &PollerConfig) -> String {
        poller
            .endpoint_url
            .clone()
            .unwrap_or_else(|| self.default_endpoint_url())
    }

    /// Reject configurations the engine cannot run
    pub fn validate(&self) -> crate::Result<()> {
        let mut seen = HashSet::new();
        for poller in &self.pollers {
            if poller.name.is_empty() {
                return Err(crate::PibbleError::Config(
                    "poller name must not be empty".to_string(),
                ));
            }
            if !seen.insert(poller.name.as_str()) {
                return Err(crate::PibbleError::Config(format!(
                    "duplicate poller name '{}'",
                    poller.name
                )));
            }
            if poller.refresh_interval_ms == 0 {
                return Err(crate::PibbleError::Config(format!(
                    "poller '{}' has a zero refresh interval",
                    poller.name
                )));
            }
        }
        Ok(())
    }
}

/// Player counts as shown to the user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PlayerCounts {
    #[serde(default)]
    pub online: u32,
    #[serde(default)]
    pub max: u32,
}

impl PlayerCounts {
    pub const fn new(online: u32, max: u32) -> Self {
        Self { online, max }
    }
}

/// What a failed poll cycle does to the previously displayed values
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OnErrorPolicy {
    /// Keep the last values, only flag the error
    #[default]
    Preserve,
    /// Fall back to the initial defaults
    Reset,
}

/// Which settled poll cycle is allowed to update the snapshot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CycleOrdering {
    /// Whichever cycle settles last wins, even if it was issued earlier
    #[default]
    LastSettled,
    /// Only cycles issued after the currently applied one are applied
    LatestIssued,
}

/// A text field with a value shown before the first response and a value
/// used when a response omits the field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Placeholder {
    pub initial: String,
    pub fallback: String,
}

impl Placeholder {
    pub fn new(initial: &str, fallback: &str) -> Self {
        Self {
            initial: initial.to_string(),
            fallback: fallback.to_string(),
        }
    }
}

/// One status poller instance
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PollerConfig {
    pub name: String,
    /// Overrides the URL derived from `api_base` and `server_address`
    #[serde(default)]
    pub endpoint_url: Option<String>,
    #[serde(default = "default_refresh_interval_ms")]
    pub refresh_interval_ms: u64,
    #[serde(default)]
    pub default_players: PlayerCounts,
    #[serde(default)]
    pub on_error: OnErrorPolicy,
    #[serde(default = "default_error_message")]
    pub error_message: String,
    #[serde(default)]
    pub ordering: CycleOrdering,
    #[serde(default = "default_version_placeholder")]
    pub version: Placeholder,
    #[serde(default = "default_motd_placeholder")]
    pub motd: Placeholder,
}

impl PollerConfig {
    /// A poller with every optional field at its default
    pub fn named(name: &str) -> Self {
        Self {
            name: name.to_string(),
            endpoint_url: None,
            refresh_interval_ms: default_refresh_interval_ms(),
            default_players: PlayerCounts::default(),
            on_error: OnErrorPolicy::default(),
            error_message: default_error_message(),
            ordering: CycleOrdering::default(),
            version: default_version_placeholder(),
            motd: default_motd_placeholder(),
        }
    }

    /// The compact indicator on the home page
    pub fn home() -> Self {
        Self {
            refresh_interval_ms: 30_000,
            default_players: PlayerCounts::new(0, 0),
            on_error: OnErrorPolicy::Reset,
            ..Self::named("home")
        }
    }

    /// The detailed status page
    pub fn status_page() -> Self {
        Self {
            refresh_interval_ms: 300_000,
            default_players: PlayerCounts::new(0, 20),
            on_error: OnErrorPolicy::Preserve,
            ..Self::named("status")
        }
    }

    pub fn refresh_interval(&self) -> Duration {
        Duration::from_millis(self.refresh_interval_ms)
    }
}

/// Dashboard configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_dashboard_port")]
    pub port: u16,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            port: default_dashboard_port(),
        }
    }
}

fn default_api_base() -> String {
    "https://api.mcsrvstat.us".to_string()
}

fn default_server_address() -> String {
    "45.142.28.7:19005".to_string()
}

fn default_pollers() -> Vec<PollerConfig> {
    vec![PollerConfig::home(), PollerConfig::status_page()]
}

fn default_refresh_interval_ms() -> u64 {
    30_000
}

fn default_error_message() -> String {
    "Unable to fetch server status".to_string()
}

fn default_version_placeholder() -> Placeholder {
    Placeholder::new("Unknown", "1.21.1")
}

fn default_motd_placeholder() -> Placeholder {
    Placeholder::new("Loading...", "Pibble SMP Server")
}

fn default_true() -> bool {
    true
}

fn default_dashboard_port() -> u16 {
    11120
}

/// Load configuration from a JSON file
pub fn load_config(path: &Path) -> crate::Result<Config> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        crate::PibbleError::Config(format!("Failed to read config file {:?}: {}", path, e))
    })?;
    let config: Config = serde_json::from_str(&content)?;
    config.validate()?;
    Ok(config)
}
