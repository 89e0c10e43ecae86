//! BDD step definitions for dashboard feature

use axum::body::Body;
use axum::http::Request;
use cucumber::{then, when};
use tower::ServiceExt;

use pibble_status::dashboard::build_router;

use crate::world::PibbleWorld;

#[when(expr = "the dashboard is asked for {string}")]
async fn dashboard_request(world: &mut PibbleWorld, uri: String) {
    let pollers = world.poller.iter().cloned().collect();
    let app = build_router(pollers);
    let response = app
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    world.response_status = Some(response.status().as_u16());
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    world.response_body = Some(String::from_utf8(body.to_vec()).unwrap());
}

#[then(expr = "the dashboard should answer {int}")]
fn dashboard_answers(world: &mut PibbleWorld, status: u16) {
    assert_eq!(world.response_status, Some(status));
}

#[then(expr = "the compact label should be {string}")]
fn compact_label(world: &mut PibbleWorld, label: String) {
    let body = world.response_body.as_ref().expect("no response body");
    let json: serde_json::Value = serde_json::from_str(body).unwrap();
    assert_eq!(json["compact"]["label"], label.as_str());
}

#[then(expr = "the detailed view should show {string} players")]
fn detailed_ratio(world: &mut PibbleWorld, ratio: String) {
    let body = world.response_body.as_ref().expect("no response body");
    let json: serde_json::Value = serde_json::from_str(body).unwrap();
    assert_eq!(json["detailed"]["player_ratio"], ratio.as_str());
}
