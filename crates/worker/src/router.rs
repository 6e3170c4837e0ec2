//! Event router: one entry point per worker, one handler per event kind.

use std::sync::Arc;

use bytes::Bytes;
use swkit_client::{Network, Request, Response};
use swkit_core::{AppConfig, CacheDb, CacheStorage, Error};

use crate::cache_manager::{ActivateReport, CacheManager, FetchOutcome, InstallReport};
use crate::cancel::CancellationToken;
use crate::host::{Badging, Clients, NotificationSurface};
use crate::notify::{ClickOutcome, NotificationClick, NotificationDispatcher, PushOutcome};
use crate::tasks::WaitUntil;

/// Host surfaces handed to the worker at startup.
pub struct HostSurfaces {
    pub notifications: Arc<dyn NotificationSurface>,
    /// `None` when the host cannot badge the app icon.
    pub badging: Option<Arc<dyn Badging>>,
    pub clients: Arc<dyn Clients>,
}

#[derive(Debug)]
pub struct FetchEvent {
    pub request: Request,
    pub cancel: CancellationToken,
}

impl FetchEvent {
    pub fn new(request: Request) -> Self {
        Self { request, cancel: CancellationToken::new() }
    }
}

#[derive(Debug, Clone, Default)]
pub struct PushEvent {
    pub data: Option<Bytes>,
}

#[derive(Debug)]
pub enum WorkerEvent {
    Install,
    Activate,
    Fetch(FetchEvent),
    Push(PushEvent),
    NotificationClick(NotificationClick),
    /// Background sync; registered tags are acknowledged, nothing is replayed.
    Sync { tag: String },
    PeriodicSync { tag: String },
}

impl WorkerEvent {
    pub fn kind(&self) -> &'static str {
        match self {
            WorkerEvent::Install => "install",
            WorkerEvent::Activate => "activate",
            WorkerEvent::Fetch(_) => "fetch",
            WorkerEvent::Push(_) => "push",
            WorkerEvent::NotificationClick(_) => "notificationclick",
            WorkerEvent::Sync { .. } => "sync",
            WorkerEvent::PeriodicSync { .. } => "periodicsync",
        }
    }
}

#[derive(Debug)]
pub enum EventOutcome {
    Installed(InstallReport),
    Activated { report: ActivateReport, claimed: bool },
    Fetch(FetchOutcome),
    Pushed(PushOutcome),
    Clicked(ClickOutcome),
    Acknowledged { tag: String },
}

pub struct ServiceWorker {
    cache: CacheManager,
    notifications: NotificationDispatcher,
    clients: Arc<dyn Clients>,
    network: Arc<dyn Network>,
    wait_until: WaitUntil,
}

impl ServiceWorker {
    pub fn new(
        config: &AppConfig, storage: Arc<dyn CacheStorage>, network: Arc<dyn Network>, host: HostSurfaces,
    ) -> Result<Self, Error> {
        let cache = CacheManager::new(Arc::new(config.worker.clone()), storage, network.clone())?;
        let notifications = NotificationDispatcher::new(
            config.app_name.clone(),
            Arc::new(config.notifications.clone()),
            cache.scope().clone(),
            host.notifications,
            host.badging,
            host.clients.clone(),
        );

        Ok(Self { cache, notifications, clients: host.clients, network, wait_until: WaitUntil::new() })
    }

    /// Worker backed by the SQLite store at `config.db_path`.
    pub async fn open(config: &AppConfig, network: Arc<dyn Network>, host: HostSurfaces) -> Result<Self, Error> {
        let storage = CacheDb::open(&config.db_path).await?;
        tracing::info!(path = %config.db_path.display(), "opened cache store");
        Self::new(config, Arc::new(storage), network, host)
    }

    pub fn cache(&self) -> &CacheManager {
        &self.cache
    }

    /// Extended work registered by handled events. Settle it before
    /// shutting the worker down.
    pub fn wait_until(&self) -> &WaitUntil {
        &self.wait_until
    }

    pub async fn handle(&self, event: WorkerEvent) -> Result<EventOutcome, Error> {
        tracing::debug!(event = event.kind(), "dispatching event");

        match event {
            WorkerEvent::Install => Ok(EventOutcome::Installed(self.cache.install().await?)),
            WorkerEvent::Activate => {
                let report = self.cache.activate().await?;
                let claimed = report.claim_clients
                    && match self.clients.claim().await {
                        Ok(()) => true,
                        Err(e) => {
                            tracing::warn!("failed to claim clients: {}", e);
                            false
                        }
                    };
                Ok(EventOutcome::Activated { report, claimed })
            }
            WorkerEvent::Fetch(fetch) => Ok(EventOutcome::Fetch(
                self.cache.handle_fetch(fetch.request, &fetch.cancel, &self.wait_until).await,
            )),
            WorkerEvent::Push(push) => Ok(EventOutcome::Pushed(self.notifications.on_push(push.data.as_deref()).await?)),
            WorkerEvent::NotificationClick(click) => Ok(EventOutcome::Clicked(self.notifications.on_click(click).await?)),
            WorkerEvent::Sync { tag } | WorkerEvent::PeriodicSync { tag } => {
                tracing::info!(tag = %tag, "sync event acknowledged");
                Ok(EventOutcome::Acknowledged { tag })
            }
        }
    }

    /// Produce the response a page sees: intercepted, or a plain network
    /// fetch for requests the worker leaves alone.
    pub async fn respond_to(&self, event: FetchEvent) -> Result<Response, Error> {
        match self.cache.handle_fetch(event.request, &event.cancel, &self.wait_until).await {
            FetchOutcome::Respond { response, .. } => Ok(response),
            FetchOutcome::Passthrough(request) => self.network.fetch(request).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use swkit_client::{HeaderValue, Method, StatusCode, header};
    use url::Url;

    use super::*;
    use crate::cache_manager::ResponseSource;
    use crate::testing::{
        ClientCall, FakeBadging, FakeClients, FakeNetwork, RecordingSurface, memory_storage, serve_manifest,
        worker_config,
    };

    struct Harness {
        worker: ServiceWorker,
        network: Arc<FakeNetwork>,
        surface: Arc<RecordingSurface>,
        clients: Arc<FakeClients>,
    }

    async fn harness() -> Harness {
        let network = Arc::new(FakeNetwork::new());
        serve_manifest(&network);
        let surface = Arc::new(RecordingSurface::default());
        let clients = Arc::new(FakeClients::with_windows(&[("w1", "https://shop.test/home")]));
        let config = AppConfig { app_name: "Shop".into(), worker: worker_config(), ..Default::default() };

        let worker = ServiceWorker::new(
            &config,
            memory_storage().await,
            network.clone(),
            HostSurfaces {
                notifications: surface.clone(),
                badging: Some(Arc::new(FakeBadging::default())),
                clients: clients.clone(),
            },
        )
        .unwrap();

        Harness { worker, network, surface, clients }
    }

    fn url(s: &str) -> Url {
        Url::parse(s).unwrap()
    }

    #[tokio::test]
    async fn test_lifecycle_then_offline_navigation() {
        let h = harness().await;

        let installed = h.worker.handle(WorkerEvent::Install).await.unwrap();
        assert!(matches!(installed, EventOutcome::Installed(InstallReport { skip_waiting: true, .. })));

        let activated = h.worker.handle(WorkerEvent::Activate).await.unwrap();
        assert!(matches!(activated, EventOutcome::Activated { claimed: true, .. }));
        assert_eq!(h.clients.calls(), vec![ClientCall::Claim]);

        h.network.fail_all();
        let event = WorkerEvent::Fetch(FetchEvent::new(Request::navigate(url("https://shop.test/checkout"))));
        match h.worker.handle(event).await.unwrap() {
            EventOutcome::Fetch(outcome) => assert_eq!(outcome.source(), Some(ResponseSource::Fallback)),
            other => panic!("unexpected outcome {other:?}"),
        }
        h.worker.wait_until().settle().await;
    }

    #[tokio::test]
    async fn test_push_routed_to_dispatcher() {
        let h = harness().await;
        let event = WorkerEvent::Push(PushEvent { data: Some(Bytes::from_static(br#"{"title":"Sale"}"#)) });

        let outcome = h.worker.handle(event).await.unwrap();

        assert!(matches!(outcome, EventOutcome::Pushed(_)));
        assert_eq!(h.surface.shown()[0].title, "Sale");
    }

    #[tokio::test]
    async fn test_click_routed_to_dispatcher() {
        let h = harness().await;
        let click = NotificationClick { notification_id: "n1".into(), data: json!({ "url": "/promo" }), action: None };

        let outcome = h.worker.handle(WorkerEvent::NotificationClick(click)).await.unwrap();

        assert!(matches!(outcome, EventOutcome::Clicked(ClickOutcome::Focused { .. })));
    }

    #[tokio::test]
    async fn test_sync_events_acknowledged() {
        let h = harness().await;

        let sync = h.worker.handle(WorkerEvent::Sync { tag: "outbox".into() }).await.unwrap();
        let periodic = h.worker.handle(WorkerEvent::PeriodicSync { tag: "refresh".into() }).await.unwrap();

        assert!(matches!(sync, EventOutcome::Acknowledged { tag } if tag == "outbox"));
        assert!(matches!(periodic, EventOutcome::Acknowledged { tag } if tag == "refresh"));
        assert_eq!(h.network.total_calls(), 0);
    }

    #[tokio::test]
    async fn test_respond_to_passes_bypassed_requests_to_network() {
        let h = harness().await;
        let sdk = "https://cdn.onesignal.com/sdks/OneSignalSDK.js";
        h.network.respond(sdk, "text/javascript", "sdk()");

        let response = h.worker.respond_to(FetchEvent::new(Request::get(url(sdk)))).await.unwrap();

        assert_eq!(response.text(), "sdk()");
        assert_eq!(h.network.calls_to(sdk), 1);
    }

    #[tokio::test]
    async fn test_respond_to_sends_post_unmodified() {
        let h = harness().await;
        let orders = "https://shop.test/api/orders";
        h.network.respond_status(orders, 201, "application/json", r#"{"id":7}"#);
        let request = Request::new(Method::POST, url(orders))
            .with_header(header::CONTENT_TYPE, HeaderValue::from_static("application/json"))
            .with_body(r#"{"sku":"tea","qty":2}"#);

        let response = h.worker.respond_to(FetchEvent::new(request.clone())).await.unwrap();
        h.worker.wait_until().settle().await;

        assert_eq!(response.status(), StatusCode::CREATED);
        assert_eq!(h.network.requests(), vec![request]);
    }

    #[tokio::test]
    async fn test_respond_to_synthesizes_offline_response() {
        let h = harness().await;

        let response = h.worker.respond_to(FetchEvent::new(Request::get(url("https://shop.test/api/x")))).await.unwrap();

        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn test_open_persists_precache_at_db_path() {
        let dir = tempfile::TempDir::new().unwrap();
        let config = AppConfig { db_path: dir.path().join("cache.sqlite"), worker: worker_config(), ..Default::default() };
        let network = Arc::new(FakeNetwork::new());
        serve_manifest(&network);
        let host = || HostSurfaces {
            notifications: Arc::new(RecordingSurface::default()),
            badging: None,
            clients: Arc::new(FakeClients::default()),
        };

        let worker = ServiceWorker::open(&config, network.clone(), host()).await.unwrap();
        worker.handle(WorkerEvent::Install).await.unwrap();
        drop(worker);

        network.fail_all();
        let reopened = ServiceWorker::open(&config, network, host()).await.unwrap();
        let response = reopened.respond_to(FetchEvent::new(Request::navigate(url("https://shop.test/")))).await.unwrap();
        reopened.wait_until().settle().await;

        assert_eq!(response.text(), "<h1>home</h1>");
        assert!(config.db_path.exists());
    }

    #[test]
    fn test_event_kinds() {
        assert_eq!(WorkerEvent::Install.kind(), "install");
        assert_eq!(WorkerEvent::Push(PushEvent::default()).kind(), "push");
        assert_eq!(WorkerEvent::PeriodicSync { tag: "t".into() }.kind(), "periodicsync");
    }
}
