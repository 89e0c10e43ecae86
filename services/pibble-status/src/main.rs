//! pibble-status binary
//!
//! Polls the Minecraft status API for the Pibble SMP server on behalf of the
//! home page and the status page, and serves the resulting snapshots on the
//! dashboard until interrupted.

use std::path::PathBuf;

use clap::Parser;
use pibble_status::{load_config, Config, PibbleStatusBuilder};
use tracing::Level;

#[derive(Parser)]
#[command(name = "pibble-status")]
#[command(about = "Pibble SMP server status poller and dashboard")]
#[command(version)]
struct Args {
    /// Path to a JSON configuration file; built-in call sites are used otherwise
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Minecraft server to query, as host:port (overrides config file)
    #[arg(long)]
    server: Option<String>,

    /// Dashboard port (overrides config file)
    #[arg(long)]
    dashboard_port: Option<u16>,

    /// Poll without serving the dashboard
    #[arg(long)]
    no_dashboard: bool,

    /// Log level
    #[arg(short, long, default_value = "info")]
    log_level: Level,
}

impl Args {
    fn apply_overrides(&self, config: &mut Config) {
        if let Some(server) = &self.server {
            config.server_address = server.clone();
        }
        if let Some(port) = self.dashboard_port {
            config.dashboard.port = port;
        }
        if self.no_dashboard {
            config.dashboard.enabled = false;
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_max_level(args.log_level)
        .init();

    let mut config = match &args.config {
        Some(path) => {
            tracing::debug!("Loading status poller configuration from {:?}", path);
            load_config(path)?
        }
        None => {
            tracing::debug!("No config file given, polling for the home and status pages");
            Config::default()
        }
    };
    args.apply_overrides(&mut config);

    for poller in &config.pollers {
        tracing::info!(
            "Poller '{}' queries {} every {}ms ({:?} on error)",
            poller.name,
            config.endpoint_for(poller),
            poller.refresh_interval_ms,
            poller.on_error
        );
    }
    if !config.dashboard.enabled {
        tracing::info!("Dashboard disabled");
    }

    PibbleStatusBuilder::new(config).build().await?.start().await?;

    Ok(())
}
