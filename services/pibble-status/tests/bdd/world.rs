//! BDD test world for pibble-status service

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use cucumber::World;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

use pibble_status::config::PollerConfig;
use pibble_status::io::{HttpClient, HttpResponse};
use pibble_status::poller::{CycleOutcome, PollerHandle, StatusPoller};
use pibble_status::PibbleError;

pub type Reply = pibble_status::Result<HttpResponse>;

/// HTTP client whose GETs each wait for a reply sent by a step
#[derive(Debug, Default)]
pub struct ScriptedHttpClient {
    pending: Mutex<VecDeque<oneshot::Receiver<Reply>>>,
    calls: AtomicUsize,
}

impl ScriptedHttpClient {
    pub fn expect_request(&self) -> oneshot::Sender<Reply> {
        let (tx, rx) = oneshot::channel();
        self.pending.lock().unwrap().push_back(rx);
        tx
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl HttpClient for ScriptedHttpClient {
    async fn get(&self, _url: &str) -> pibble_status::Result<HttpResponse> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let reply = self.pending.lock().unwrap().pop_front();
        match reply {
            Some(rx) => rx
                .await
                .unwrap_or_else(|_| Err(PibbleError::Http("reply dropped".to_string()))),
            None => Err(PibbleError::Http("unexpected request".to_string())),
        }
    }
}

/// Let spawned cycles run up to their next suspension point
pub async fn settle() {
    for _ in 0..50 {
        tokio::task::yield_now().await;
    }
}

#[derive(Debug, Default, World)]
pub struct PibbleWorld {
    // Poller testing
    pub poller_config: Option<PollerConfig>,
    pub http: Option<Arc<ScriptedHttpClient>>,
    pub replies: Vec<Option<oneshot::Sender<Reply>>>,
    pub poller: Option<Arc<StatusPoller>>,
    pub handle: Option<PollerHandle>,

    // Overlapping cycles
    pub cycles: Vec<Option<JoinHandle<CycleOutcome>>>,
    pub outcomes: Vec<(usize, CycleOutcome)>,

    // Dashboard testing
    pub response_status: Option<u16>,
    pub response_body: Option<String>,

    // Service lifecycle testing
    pub service_config: Option<pibble_status::Config>,
    pub service_cancel: Option<tokio_util::sync::CancellationToken>,
    pub service_build_succeeded: Option<bool>,
    pub service_start_succeeded: Option<bool>,
}

impl PibbleWorld {
    pub fn poller(&self) -> &Arc<StatusPoller> {
        self.poller.as_ref().expect("poller not created")
    }

    pub fn http(&self) -> &Arc<ScriptedHttpClient> {
        self.http.as_ref().expect("http client not created")
    }

    /// Create the poller from the configured call site, with one reply
    /// queued per expected request
    pub fn create_poller(&mut self, expected_requests: usize) {
        let config = self
            .poller_config
            .clone()
            .unwrap_or_else(PollerConfig::status_page);
        let http = Arc::new(ScriptedHttpClient::default());
        for _ in 0..expected_requests {
            self.replies.push(Some(http.expect_request()));
        }
        let poller = StatusPoller::new(
            config,
            "https://api.mcsrvstat.us/2/45.142.28.7:19005".to_string(),
            http.clone(),
        );
        self.http = Some(http);
        self.poller = Some(poller);
    }

    /// Complete the oldest outstanding request with `reply`
    pub fn reply_next(&mut self, reply: Reply) {
        let sender = self
            .replies
            .iter_mut()
            .find_map(Option::take)
            .expect("no outstanding request");
        sender.send(reply).expect("request was abandoned");
    }

    pub fn reply_to(&mut self, index: usize, reply: Reply) {
        let sender = self.replies[index]
            .take()
            .expect("request already answered");
        sender.send(reply).expect("request was abandoned");
    }
}

pub fn ok_reply(body: &str) -> Reply {
    Ok(HttpResponse {
        status: 200,
        body: body.to_string(),
    })
}
