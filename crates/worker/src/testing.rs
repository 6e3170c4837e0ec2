//! In-memory hosts and network for tests.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use swkit_client::{HeaderMap, HeaderValue, Network, Request, Response, StatusCode, header};
use swkit_core::config::WorkerConfig;
use swkit_core::{CacheDb, Error};
use url::Url;

use crate::host::{Badging, Clients, Notification, NotificationSurface, WindowClient};

#[derive(Debug, Clone)]
enum Route {
    Respond { status: u16, content_type: String, body: String },
    Fail,
    Hang,
}

/// Scripted network keyed by URL. Unknown URLs fail like an unreachable host.
#[derive(Debug, Default)]
pub struct FakeNetwork {
    routes: Mutex<HashMap<String, Route>>,
    calls: Mutex<Vec<Request>>,
}

impl FakeNetwork {
    pub fn new() -> Self {
        Self::default()
    }

    fn route(&self, url: &str, route: Route) {
        self.routes.lock().unwrap().insert(url.to_string(), route);
    }

    pub fn respond(&self, url: &str, content_type: &str, body: &str) {
        self.respond_status(url, 200, content_type, body);
    }

    pub fn respond_status(&self, url: &str, status: u16, content_type: &str, body: &str) {
        self.route(url, Route::Respond { status, content_type: content_type.into(), body: body.into() });
    }

    pub fn fail(&self, url: &str) {
        self.route(url, Route::Fail);
    }

    /// Never answers; the caller's timeout or cancellation must fire.
    pub fn hang(&self, url: &str) {
        self.route(url, Route::Hang);
    }

    /// Take the whole network down.
    pub fn fail_all(&self) {
        let mut routes = self.routes.lock().unwrap();
        for route in routes.values_mut() {
            *route = Route::Fail;
        }
    }

    pub fn calls_to(&self, url: &str) -> usize {
        self.calls.lock().unwrap().iter().filter(|r| r.url.as_str() == url).count()
    }

    pub fn total_calls(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    /// Every request that reached the network, in order.
    pub fn requests(&self) -> Vec<Request> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl Network for FakeNetwork {
    async fn fetch(&self, request: Request) -> Result<Response, Error> {
        let url = request.url.to_string();
        let route = self.routes.lock().unwrap().get(&url).cloned();
        self.calls.lock().unwrap().push(request);

        match route {
            Some(Route::Respond { status, content_type, body }) => {
                let mut headers = HeaderMap::new();
                headers.insert(header::CONTENT_TYPE, HeaderValue::from_str(&content_type).unwrap());
                let status = StatusCode::from_u16(status).unwrap();
                Ok(Response::new(status, headers, body).with_url(Url::parse(&url).unwrap()))
            }
            Some(Route::Hang) => {
                tokio::time::sleep(Duration::from_secs(60)).await;
                Err(Error::HttpError(format!("{url}: hung")))
            }
            Some(Route::Fail) | None => Err(Error::HttpError(format!("{url}: connection refused"))),
        }
    }
}

#[derive(Debug, Default)]
pub struct RecordingSurface {
    shown: Mutex<Vec<Notification>>,
    closed: Mutex<Vec<String>>,
    fail: bool,
}

impl RecordingSurface {
    pub fn failing() -> Self {
        Self { fail: true, ..Default::default() }
    }

    pub fn shown(&self) -> Vec<Notification> {
        self.shown.lock().unwrap().clone()
    }

    pub fn closed(&self) -> Vec<String> {
        self.closed.lock().unwrap().clone()
    }
}

#[async_trait]
impl NotificationSurface for RecordingSurface {
    async fn show(&self, notification: &Notification) -> Result<(), Error> {
        if self.fail {
            return Err(Error::Host("notification permission denied".into()));
        }
        self.shown.lock().unwrap().push(notification.clone());
        Ok(())
    }

    async fn close(&self, notification_id: &str) -> Result<(), Error> {
        self.closed.lock().unwrap().push(notification_id.to_string());
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct FakeBadging {
    counts: Mutex<Vec<u32>>,
    fail: bool,
}

impl FakeBadging {
    pub fn failing() -> Self {
        Self { fail: true, ..Default::default() }
    }

    pub fn counts(&self) -> Vec<u32> {
        self.counts.lock().unwrap().clone()
    }
}

#[async_trait]
impl Badging for FakeBadging {
    async fn set_badge(&self, count: u32) -> Result<(), Error> {
        if self.fail {
            return Err(Error::Host("badging rejected".into()));
        }
        self.counts.lock().unwrap().push(count);
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ClientCall {
    Focus(String),
    PostMessage(String, Value),
    Navigate(String, Url),
    OpenWindow(Url),
    Claim,
}

#[derive(Debug, Default)]
pub struct FakeClients {
    windows: Vec<WindowClient>,
    calls: Mutex<Vec<ClientCall>>,
    fail_focus: bool,
}

impl FakeClients {
    pub fn with_windows(windows: &[(&str, &str)]) -> Self {
        let windows = windows
            .iter()
            .map(|(id, url)| WindowClient { id: id.to_string(), url: Url::parse(url).unwrap(), focused: false })
            .collect();
        Self { windows, ..Default::default() }
    }

    pub fn failing_focus(mut self) -> Self {
        self.fail_focus = true;
        self
    }

    pub fn calls(&self) -> Vec<ClientCall> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: ClientCall) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl Clients for FakeClients {
    async fn match_all(&self) -> Result<Vec<WindowClient>, Error> {
        Ok(self.windows.clone())
    }

    async fn focus(&self, client_id: &str) -> Result<(), Error> {
        if self.fail_focus {
            return Err(Error::Host(format!("{client_id} cannot be focused")));
        }
        self.record(ClientCall::Focus(client_id.to_string()));
        Ok(())
    }

    async fn post_message(&self, client_id: &str, message: Value) -> Result<(), Error> {
        self.record(ClientCall::PostMessage(client_id.to_string(), message));
        Ok(())
    }

    async fn navigate(&self, client_id: &str, url: &Url) -> Result<(), Error> {
        self.record(ClientCall::Navigate(client_id.to_string(), url.clone()));
        Ok(())
    }

    async fn open_window(&self, url: &Url) -> Result<(), Error> {
        self.record(ClientCall::OpenWindow(url.clone()));
        Ok(())
    }

    async fn claim(&self) -> Result<(), Error> {
        self.record(ClientCall::Claim);
        Ok(())
    }
}

pub const SCOPE: &str = "https://shop.test/";

/// Small manifest under a test scope with a short network timeout.
pub fn worker_config() -> WorkerConfig {
    WorkerConfig {
        scope: SCOPE.into(),
        precache: vec!["/".into(), "/index.html".into(), "/offline.html".into()],
        network_timeout_ms: 200,
        ..Default::default()
    }
}

/// Route every entry of [`worker_config`]'s manifest.
pub fn serve_manifest(network: &FakeNetwork) {
    network.respond("https://shop.test/", "text/html", "<h1>home</h1>");
    network.respond("https://shop.test/index.html", "text/html", "<h1>shell</h1>");
    network.respond("https://shop.test/offline.html", "text/html", "<h1>offline</h1>");
}

pub async fn memory_storage() -> Arc<CacheDb> {
    Arc::new(CacheDb::open_in_memory().await.unwrap())
}
