//! Dashboard exposing poller snapshots as JSON and as a rendered page

use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use axum::routing::get;
use axum::Router;
use serde::Serialize;
use tokio_util::sync::CancellationToken;
use tower_http::cors::CorsLayer;

use crate::engine::collect_snapshots;
use crate::poller::{PollerSnapshot, StatusPoller};
use crate::view::{CompactView, DetailState, DetailedView, Indicator};

/// Dashboard application state
#[derive(Clone)]
pub struct DashboardState {
    pub pollers: Arc<[Arc<StatusPoller>]>,
}

/// A snapshot together with both rendered views
#[derive(Debug, Serialize)]
struct StatusEntry {
    #[serde(flatten)]
    snapshot: PollerSnapshot,
    compact: CompactView,
    detailed: DetailedView,
}

impl From<PollerSnapshot> for StatusEntry {
    fn from(snapshot: PollerSnapshot) -> Self {
        let compact = CompactView::render(&snapshot.status);
        let detailed = DetailedView::render(&snapshot.status);
        Self {
            snapshot,
            compact,
            detailed,
        }
    }
}

/// Build the dashboard axum router
pub fn build_router(pollers: Vec<Arc<StatusPoller>>) -> Router {
    let dashboard_state = DashboardState {
        pollers: pollers.into(),
    };

    let api: Router<DashboardState> = Router::new()
        .route("/api/status", get(status_handler))
        .route("/api/status/{name}", get(poller_status_handler))
        .layer(CorsLayer::permissive());

    Router::new()
        .route("/", get(index_handler))
        .route("/health", get(health_handler))
        .merge(api)
        .with_state(dashboard_state)
}

/// Serve the dashboard on `port` until `cancel` fires
pub async fn serve(
    pollers: Vec<Arc<StatusPoller>>,
    port: u16,
    cancel: CancellationToken,
) -> crate::Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = tokio::net::TcpListener::bind(addr).await.map_err(|e| {
        crate::PibbleError::Dashboard(format!("Failed to bind port {}: {}", port, e))
    })?;
    tracing::info!("Dashboard listening on http://{}", addr);

    axum::serve(listener, build_router(pollers))
        .with_graceful_shutdown(async move {
            cancel.cancelled().await;
        })
        .await
        .map_err(|e| crate::PibbleError::Dashboard(e.to_string()))?;

    tracing::debug!("Dashboard stopped");
    Ok(())
}

async fn index_handler(State(dashboard): State<DashboardState>) -> impl IntoResponse {
    let snapshots = collect_snapshots(&dashboard.pollers).await;

    let sections: String = snapshots.iter().map(render_section).collect();

    let html = format!(
        r#"<!DOCTYPE html>
<html>
<head>
    <meta charset="utf-8">
    <meta name="viewport" content="width=device-width, initial-scale=1">
    <meta http-equiv="refresh" content="30">
    <title>Pibble SMP Status</title>
</head>
<body style="font-family: system-ui, sans-serif; max-width: 960px; margin: 0 auto; padding: 1rem; background: #000; color: #e5e7eb;">
    <h1>Pibble SMP Status</h1>
    {sections}
</body>
</html>"#,
        sections = sections,
    );

    Html(html)
}

fn render_section(snapshot: &PollerSnapshot) -> String {
    let compact = CompactView::render(&snapshot.status);
    let detailed = DetailedView::render(&snapshot.status);

    let dot = match compact.indicator {
        Indicator::Pending => "#facc15",
        Indicator::Online => "#34d399",
        Indicator::Offline => "#f87171",
    };

    let body = match &detailed.state {
        DetailState::Loading => "<p>Checking server status...</p>".to_string(),
        DetailState::Error(message) => format!(
            r#"<div style="background: #7f1d1d; padding: 1rem; border-radius: 0.5rem;">
            <h3>Connection Error</h3>
            <p>{}</p>
        </div>"#,
            escape_html(message)
        ),
        DetailState::Ready => format!(
            r#"<table style="width: 100%; border-collapse: collapse;">
            <tr><th style="text-align: left;">Status</th><td>{}</td></tr>
            <tr><th style="text-align: left;">Players</th><td>{} ({})</td></tr>
            <tr><th style="text-align: left;">Version</th><td>{}</td></tr>
        </table>"#,
            detailed.online_label,
            detailed.player_ratio,
            detailed.player_caption,
            escape_html(&detailed.version)
        ),
    };

    format!(
        r#"<section>
        <h2>{name}</h2>
        <p><span style="display: inline-block; width: 0.5rem; height: 0.5rem; border-radius: 50%; background: {dot};"></span> {label}</p>
        {body}
        <h3>Server MOTD</h3>
        <p style="white-space: pre-line;">{motd}</p>
    </section>"#,
        name = escape_html(&snapshot.name),
        dot = dot,
        label = escape_html(&compact.label),
        body = body,
        motd = escape_html(&detailed.motd),
    )
}

fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

async fn status_handler(State(dashboard): State<DashboardState>) -> impl IntoResponse {
    let entries: Vec<StatusEntry> = collect_snapshots(&dashboard.pollers)
        .await
        .into_iter()
        .map(StatusEntry::from)
        .collect();

    axum::Json(entries)
}

async fn poller_status_handler(
    State(dashboard): State<DashboardState>,
    Path(name): Path<String>,
) -> Response {
    match dashboard.pollers.iter().find(|p| p.name() == name) {
        Some(poller) => axum::Json(StatusEntry::from(poller.snapshot().await)).into_response(),
        None => (
            StatusCode::NOT_FOUND,
            format!("No status poller named '{}'", name),
        )
            .into_response(),
    }
}

async fn health_handler() -> impl IntoResponse {
    "OK"
}
