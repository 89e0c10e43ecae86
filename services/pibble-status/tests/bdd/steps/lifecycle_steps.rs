//! BDD step definitions for poller teardown and service lifecycle

use std::sync::Arc;

use cucumber::{given, then, when};
use tokio_util::sync::CancellationToken;

use pibble_status::config::{Config, DashboardConfig, PollerConfig};
use pibble_status::io::HttpClient;
use pibble_status::PibbleStatusBuilder;

use crate::world::{ok_reply, settle, PibbleWorld, ScriptedHttpClient};

#[when("the poller is stopped")]
async fn poller_stopped(world: &mut PibbleWorld) {
    let handle = world.handle.take().expect("poller not started");
    handle.stop().await;
}

#[when(expr = "the in-flight request then answers with {int} players online")]
async fn late_answer(world: &mut PibbleWorld, online: u32) {
    let body = format!(
        r#"{{"online": true, "players": {{"online": {}, "max": 20}}}}"#,
        online
    );
    world.reply_next(ok_reply(&body));
    settle().await;
}

#[then("the snapshot should never have been updated")]
async fn never_updated(world: &mut PibbleWorld) {
    let snapshot = world.poller().snapshot().await;
    assert_eq!(snapshot.sequence, 0);
    assert_eq!(snapshot.updated_epoch_ms, None);
}

#[then("starting the poller again should fail")]
fn start_again_fails(world: &mut PibbleWorld) {
    assert!(world.poller().start().is_err());
}

// --- Service lifecycle ---

#[given("a service config with the default call sites and no dashboard")]
fn service_config(world: &mut PibbleWorld) {
    world.service_config = Some(Config {
        dashboard: DashboardConfig {
            enabled: false,
            ..DashboardConfig::default()
        },
        ..Config::default()
    });
}

#[given(expr = "a service config with two pollers named {string}")]
fn duplicate_service_config(world: &mut PibbleWorld, name: String) {
    world.service_config = Some(Config {
        pollers: vec![PollerConfig::named(&name), PollerConfig::named(&name)],
        dashboard: DashboardConfig {
            enabled: false,
            ..DashboardConfig::default()
        },
        ..Config::default()
    });
}

#[given("a pre-cancelled cancellation token")]
fn pre_cancelled_token(world: &mut PibbleWorld) {
    let token = CancellationToken::new();
    token.cancel();
    world.service_cancel = Some(token);
}

#[when("the service is built and started")]
async fn service_built_and_started(world: &mut PibbleWorld) {
    let config = world.service_config.clone().expect("config not set");
    let http: Arc<dyn HttpClient> = Arc::new(ScriptedHttpClient::default());
    let mut builder = PibbleStatusBuilder::new(config).with_http_client(http);
    if let Some(cancel) = world.service_cancel.take() {
        builder = builder.with_cancellation_token(cancel);
    }

    match builder.build().await {
        Ok(service) => {
            world.service_build_succeeded = Some(true);
            world.service_start_succeeded = Some(service.start().await.is_ok());
        }
        Err(_) => {
            world.service_build_succeeded = Some(false);
            world.service_start_succeeded = Some(false);
        }
    }
}

#[then("the service should stop cleanly")]
fn service_stops_cleanly(world: &mut PibbleWorld) {
    assert_eq!(world.service_build_succeeded, Some(true));
    assert_eq!(world.service_start_succeeded, Some(true));
}

#[then("the service build should fail")]
fn service_build_fails(world: &mut PibbleWorld) {
    assert_eq!(world.service_build_succeeded, Some(false));
}
