//! Offline worker for swkit.
//!
//! This crate provides:
//! - Versioned precache, activation cleanup and fetch interception
//! - Push notification display, badge updates and click routing
//! - An event router tying both to a host's lifecycle events

pub mod cache_manager;
pub mod cancel;
pub mod classify;
pub mod host;
pub mod notify;
pub mod router;
pub mod tasks;

#[cfg(test)]
mod testing;

pub use cache_manager::{ActivateReport, CacheManager, FetchOutcome, InstallReport, ResponseSource};
pub use cancel::CancellationToken;
pub use classify::{Classifier, RequestClass};
pub use host::{Badging, Clients, NavigateMessage, Notification, NotificationSurface, WindowClient};
pub use notify::{BadgeUpdate, ClickOutcome, NotificationClick, NotificationDispatcher, PushOutcome};
pub use router::{EventOutcome, FetchEvent, HostSurfaces, PushEvent, ServiceWorker, WorkerEvent};
pub use tasks::WaitUntil;
