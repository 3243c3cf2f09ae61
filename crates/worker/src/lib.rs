//! The offline response resolver and its event surface.
//!
//! This crate holds the worker itself: one `ServiceWorker` value per cache
//! generation, handling fetch interception, install/activate lifecycle,
//! host control messages, push notifications, and background-sync replay.
//!
//! Every handler is invoked by a host harness and returns when the event's
//! work is complete; awaiting the returned future is the host's half of the
//! contract.

pub mod lifecycle;
pub mod messages;
pub mod push;
pub mod resolver;
pub mod sync;
pub mod worker;

#[cfg(test)]
pub(crate) mod support;

pub use lifecycle::{ActivationReport, LifecycleState, PrecacheReport};
pub use messages::{HostMessage, VersionInfo};
pub use push::{ClientCommand, Notification, NotificationAction};
pub use sync::SyncReport;
pub use worker::ServiceWorker;
