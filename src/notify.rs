//! Push notifications
//!
//! Turns a push payload into a notification and handles clicks on it. The
//! display surface and the application's open windows sit behind the
//! [`NotificationSink`] and [`ClientWindows`] traits.

use crate::error::{WardenError, WardenResult};
use async_trait::async_trait;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info};
use url::Url;

const DEFAULT_TITLE: &str = "Divine Friend";
const DEFAULT_BODY: &str = "A new reminder from your Divine Friend";
const DEFAULT_URL: &str = "/";

/// Replaces any earlier notification from this app
pub const NOTIFICATION_TAG: &str = "divine-friend";

/// Push message body as sent by the server
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PushPayload {
    pub title: Option<String>,
    pub body: Option<String>,
    pub image: Option<String>,
    pub url: Option<String>,
    #[serde(default)]
    pub require_interaction: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NotificationAction {
    pub action: String,
    pub title: String,
}

/// Data carried with a notification to its click handler
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NotificationData {
    /// Path or URL to open, relative to the app origin
    pub url: String,
    /// Epoch milliseconds
    pub timestamp: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub tag: String,
    pub title: String,
    pub body: String,
    pub icon: String,
    pub badge: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    pub renotify: bool,
    pub require_interaction: bool,
    pub actions: Vec<NotificationAction>,
    pub data: NotificationData,
}

impl Notification {
    /// Build the notification shown for a push payload
    pub fn from_push(payload: PushPayload) -> Self {
        Self {
            tag: NOTIFICATION_TAG.to_string(),
            title: payload.title.unwrap_or_else(|| DEFAULT_TITLE.to_string()),
            body: payload.body.unwrap_or_else(|| DEFAULT_BODY.to_string()),
            icon: "/icon-192x192.png".to_string(),
            badge: "/badge-72x72.png".to_string(),
            image: payload.image,
            renotify: true,
            require_interaction: payload.require_interaction,
            actions: vec![
                NotificationAction {
                    action: "open".to_string(),
                    title: "Open app".to_string(),
                },
                NotificationAction {
                    action: "dismiss".to_string(),
                    title: "Later".to_string(),
                },
            ],
            data: NotificationData {
                url: payload.url.unwrap_or_else(|| DEFAULT_URL.to_string()),
                timestamp: Utc::now().timestamp_millis(),
            },
        }
    }
}

/// Which part of a notification was clicked
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClickAction {
    /// The notification body, no action button
    Body,
    Open,
    Dismiss,
    Other(String),
}

impl ClickAction {
    pub fn from_action(action: Option<&str>) -> Self {
        match action {
            None | Some("") => Self::Body,
            Some("open") => Self::Open,
            Some("dismiss") => Self::Dismiss,
            Some(other) => Self::Other(other.to_string()),
        }
    }
}

/// What a click led to
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", content = "url", rename_all = "kebab-case")]
pub enum ClickOutcome {
    Focused,
    Navigated(String),
    Opened(String),
    Nothing,
}

/// An open application window
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientWindow {
    pub id: String,
    pub url: Url,
}

/// Surface notifications are displayed on
#[async_trait]
pub trait NotificationSink: Send + Sync {
    async fn show(&self, notification: &Notification) -> WardenResult<()>;
    async fn close(&self, tag: &str) -> WardenResult<()>;
}

/// The application's open windows
#[async_trait]
pub trait ClientWindows: Send + Sync {
    /// First window whose URL is on `origin`
    async fn find(&self, origin: &Url) -> WardenResult<Option<ClientWindow>>;
    async fn focus(&self, window: &ClientWindow) -> WardenResult<()>;
    async fn navigate(&self, window: &ClientWindow, url: &Url) -> WardenResult<()>;
    async fn open(&self, url: &Url) -> WardenResult<()>;
}

/// Sink that writes notifications to the log
pub struct TracingSink;

#[async_trait]
impl NotificationSink for TracingSink {
    async fn show(&self, notification: &Notification) -> WardenResult<()> {
        info!(tag = %notification.tag, "Notification: {}: {}", notification.title, notification.body);
        Ok(())
    }

    async fn close(&self, tag: &str) -> WardenResult<()> {
        debug!(tag, "Notification closed");
        Ok(())
    }
}

/// Window set for hosts without any windows; opens are logged
pub struct HeadlessWindows;

#[async_trait]
impl ClientWindows for HeadlessWindows {
    async fn find(&self, _origin: &Url) -> WardenResult<Option<ClientWindow>> {
        Ok(None)
    }

    async fn focus(&self, window: &ClientWindow) -> WardenResult<()> {
        debug!("Focus window {}", window.id);
        Ok(())
    }

    async fn navigate(&self, window: &ClientWindow, url: &Url) -> WardenResult<()> {
        debug!("Navigate window {} to {}", window.id, url);
        Ok(())
    }

    async fn open(&self, url: &Url) -> WardenResult<()> {
        info!("Open window at {}", url);
        Ok(())
    }
}

/// Push and click handling for one app origin
pub struct Notifier {
    sink: Arc<dyn NotificationSink>,
    windows: Arc<dyn ClientWindows>,
    origin: Url,
}

impl Notifier {
    pub fn new(sink: Arc<dyn NotificationSink>, windows: Arc<dyn ClientWindows>, origin: Url) -> Self {
        Self {
            sink,
            windows,
            origin,
        }
    }

    /// Show the notification for a push message
    ///
    /// A push with no data shows the default notification.
    pub async fn push(&self, data: Option<&str>) -> WardenResult<Notification> {
        let payload = match data {
            Some(json) if !json.trim().is_empty() => serde_json::from_str::<PushPayload>(json)?,
            _ => PushPayload::default(),
        };

        let notification = Notification::from_push(payload);
        self.sink.show(&notification).await?;
        Ok(notification)
    }

    /// Close the notification and bring the app forward
    ///
    /// An existing window is focused, and navigated for `open`. Without one,
    /// `open` or a body click opens a new window; other actions open nothing.
    pub async fn click(
        &self,
        notification: &Notification,
        action: ClickAction,
    ) -> WardenResult<ClickOutcome> {
        self.sink.close(&notification.tag).await?;

        let url = self
            .origin
            .join(&notification.data.url)
            .map_err(|e| WardenError::InvalidUrl {
                url: notification.data.url.clone(),
                reason: e.to_string(),
            })?;

        if let Some(window) = self.windows.find(&self.origin).await? {
            self.windows.focus(&window).await?;
            if action == ClickAction::Open {
                self.windows.navigate(&window, &url).await?;
                return Ok(ClickOutcome::Navigated(url.to_string()));
            }
            return Ok(ClickOutcome::Focused);
        }

        match action {
            ClickAction::Open | ClickAction::Body => {
                self.windows.open(&url).await?;
                Ok(ClickOutcome::Opened(url.to_string()))
            }
            ClickAction::Dismiss | ClickAction::Other(_) => Ok(ClickOutcome::Nothing),
        }
    }
}
