//! Push notifications and notification click routing.
//!
//! The worker produces notification values; displaying them is the host's
//! job. Icon paths come from configuration, the vibration pattern is
//! fixed, and every notification carries the same two actions.

use serde::Serialize;
use url::Url;

use crate::worker::ServiceWorker;

const VIBRATE_PATTERN: [u32; 3] = [100, 50, 100];

const ACTION_EXPLORE: &str = "explore";
const ACTION_CLOSE: &str = "close";

/// A notification for the host to display.
#[derive(Debug, Clone, Serialize)]
pub struct Notification {
    pub title: String,
    pub body: String,
    pub icon: String,
    pub badge: String,
    pub vibrate: Vec<u32>,
    pub issued_at: String,
    pub actions: Vec<NotificationAction>,
}

/// One tappable action on a notification.
#[derive(Debug, Clone, Serialize)]
pub struct NotificationAction {
    pub action: String,
    pub title: String,
    pub icon: String,
}

/// What the host should do after a notification interaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientCommand {
    /// Open (or focus) a window at the given URL.
    OpenWindow(Url),
}

impl ServiceWorker {
    /// Build the notification for a push payload.
    ///
    /// The payload is the push message text; without one the body falls
    /// back to a generic update notice.
    pub fn on_push(&self, payload: Option<&str>) -> Notification {
        tracing::debug!("push event received");

        let body = match payload {
            Some(text) if !text.is_empty() => text.to_string(),
            _ => format!("New update from {}", self.config.notification_title),
        };

        Notification {
            title: self.config.notification_title.clone(),
            body,
            icon: self.config.notification_icon.clone(),
            badge: self.config.notification_badge.clone(),
            vibrate: VIBRATE_PATTERN.to_vec(),
            issued_at: chrono::Utc::now().to_rfc3339(),
            actions: vec![
                NotificationAction {
                    action: ACTION_EXPLORE.into(),
                    title: "Explore".into(),
                    icon: self.config.notification_icon.clone(),
                },
                NotificationAction {
                    action: ACTION_CLOSE.into(),
                    title: "Close".into(),
                    icon: self.config.notification_icon.clone(),
                },
            ],
        }
    }

    /// Route a notification click.
    ///
    /// `explore` opens the app root; every other action has no follow-up.
    /// The notification itself is closed by the host regardless of the
    /// action.
    pub fn on_notification_click(&self, action: &str) -> Option<ClientCommand> {
        tracing::debug!("notification action {:?}", action);

        if action == ACTION_EXPLORE {
            return Some(ClientCommand::OpenWindow(self.origin.clone()));
        }

        None
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use petrel_core::{AppConfig, CacheDb, MemoryQueue};

    use super::*;
    use crate::support::{MockFetcher, test_config};

    async fn worker() -> ServiceWorker {
        let db = CacheDb::open_in_memory().await.unwrap();
        ServiceWorker::new(test_config(), db, Arc::new(MockFetcher::new()), Arc::new(MemoryQueue::new())).unwrap()
    }

    #[tokio::test]
    async fn test_push_with_payload() {
        let worker = worker().await;
        let notification = worker.on_push(Some("Deploy finished"));

        assert_eq!(notification.title, "petrel");
        assert_eq!(notification.body, "Deploy finished");
        assert_eq!(notification.vibrate, vec![100, 50, 100]);
        assert_eq!(notification.icon, "/assets/img/favicon.png");
        assert_eq!(notification.badge, "/assets/img/apple-touch-icon.png");
    }

    #[tokio::test]
    async fn test_push_without_payload_uses_default_body() {
        let worker = worker().await;
        let notification = worker.on_push(None);

        assert_eq!(notification.body, "New update from petrel");
    }

    #[tokio::test]
    async fn test_push_empty_payload_uses_default_body() {
        let worker = worker().await;
        let notification = worker.on_push(Some(""));

        assert_eq!(notification.body, "New update from petrel");
    }

    #[tokio::test]
    async fn test_push_carries_both_actions() {
        let worker = worker().await;
        let notification = worker.on_push(None);

        let actions: Vec<&str> = notification.actions.iter().map(|a| a.action.as_str()).collect();
        assert_eq!(actions, vec!["explore", "close"]);
    }

    #[tokio::test]
    async fn test_notification_title_from_config() {
        let db = CacheDb::open_in_memory().await.unwrap();
        let config = AppConfig { notification_title: "CAD Foundation".into(), ..test_config() };
        let worker =
            ServiceWorker::new(config, db, Arc::new(MockFetcher::new()), Arc::new(MemoryQueue::new())).unwrap();

        let notification = worker.on_push(None);
        assert_eq!(notification.title, "CAD Foundation");
        assert_eq!(notification.body, "New update from CAD Foundation");
    }

    #[tokio::test]
    async fn test_explore_click_opens_app_root() {
        let worker = worker().await;
        let command = worker.on_notification_click("explore");

        match command {
            Some(ClientCommand::OpenWindow(url)) => {
                assert_eq!(url.as_str(), "http://localhost:8080/");
            }
            other => panic!("expected OpenWindow, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_close_click_has_no_follow_up() {
        let worker = worker().await;
        assert_eq!(worker.on_notification_click("close"), None);
        assert_eq!(worker.on_notification_click("unknown"), None);
    }
}
