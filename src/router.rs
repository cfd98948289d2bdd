//! Interception router
//!
//! Single dispatch point for everything the host delivers: intercepted
//! requests, lifecycle events, control messages, push messages and
//! notification clicks.
//!
//! | Category | Strategy | Partition |
//! |----------|----------|-----------|
//! | document | NetworkFirst | static |
//! | style-script | CacheFirst | static |
//! | image | CacheFirst | dynamic |
//! | api | NetworkFirstWithTimeout | api |
//! | other | NetworkFirst | dynamic |

use crate::classify::Classifier;
use crate::config::Config;
use crate::control::{ControlChannel, ControlMessage, ControlReply};
use crate::error::{WardenError, WardenResult};
use crate::lifecycle::{ActivateReport, InstallReport, LifecycleManager, LifecycleState};
use crate::network::Fetcher;
use crate::notify::{ClickAction, ClickOutcome, ClientWindows, Notification, NotificationSink, Notifier};
use crate::request::{Category, Request, Response};
use crate::revalidate::{RevalidationReport, RevalidationTrigger, Revalidator};
use crate::store::{CacheStore, PartitionName};
use crate::strategy::{Strategy, StrategyEngine};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;
use url::Url;

/// Result of intercepting a request
#[derive(Debug, Clone, PartialEq)]
pub enum Interception {
    /// The engine produced the response
    Respond(Response),
    /// Not handled here; the host performs the request itself
    Passthrough,
}

/// Strategy and partition for one category
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Route {
    pub strategy: Strategy,
    pub partition: PartitionName,
}

/// Fixed category routing, built once at startup
#[derive(Debug, Clone)]
pub struct RoutingTable {
    api_timeout: Duration,
}

impl RoutingTable {
    pub fn new(api_timeout: Duration) -> Self {
        Self { api_timeout }
    }

    pub fn route(&self, category: Category) -> Route {
        let (strategy, partition) = match category {
            Category::Document => (Strategy::NetworkFirst, PartitionName::Static),
            Category::StyleScript => (Strategy::CacheFirst, PartitionName::Static),
            Category::Image => (Strategy::CacheFirst, PartitionName::Dynamic),
            Category::Api => (
                Strategy::NetworkFirstWithTimeout(self.api_timeout),
                PartitionName::Api,
            ),
            Category::Other => (Strategy::NetworkFirst, PartitionName::Dynamic),
        };
        Route {
            strategy,
            partition,
        }
    }
}

pub struct InterceptionRouter {
    classifier: Classifier,
    routes: RoutingTable,
    engine: StrategyEngine,
    lifecycle: LifecycleManager,
    control: ControlChannel,
    revalidator: Arc<Revalidator>,
    notifier: Notifier,
}

impl InterceptionRouter {
    pub fn new(
        config: &Config,
        store: Arc<dyn CacheStore>,
        fetcher: Arc<dyn Fetcher>,
        sink: Arc<dyn NotificationSink>,
        windows: Arc<dyn ClientWindows>,
    ) -> WardenResult<Self> {
        let engine_config = &config.engine;
        let origin = Url::parse(&engine_config.origin).map_err(|e| WardenError::InvalidUrl {
            url: engine_config.origin.clone(),
            reason: e.to_string(),
        })?;

        let engine = StrategyEngine::new(
            Arc::clone(&store),
            fetcher,
            &engine_config.version,
            engine_config.max_concurrent_refreshes,
        );

        Ok(Self {
            classifier: Classifier::new(&config.manifest),
            routes: RoutingTable::new(Duration::from_millis(engine_config.api_timeout_ms)),
            lifecycle: LifecycleManager::new(
                engine.clone(),
                origin.clone(),
                config.manifest.core_assets.clone(),
                engine_config.skip_waiting_on_install,
            ),
            control: ControlChannel::new(
                store,
                engine_config.version.as_str(),
                engine_config.stats_sample_size,
            ),
            revalidator: Arc::new(Revalidator::new(
                engine.clone(),
                origin.clone(),
                config.manifest.important_resources.clone(),
            )),
            notifier: Notifier::new(sink, windows, origin),
            engine,
        })
    }

    /// Intercept one request
    ///
    /// Non-network schemes, and every request before the worker is active,
    /// pass through untouched.
    pub async fn handle(&self, mut request: Request) -> WardenResult<Interception> {
        if !self.classifier.accepts(&request) {
            debug!(request_id = %request.id, "Passthrough: scheme {}", request.url.scheme());
            return Ok(Interception::Passthrough);
        }
        if !self.lifecycle.is_active() {
            debug!(request_id = %request.id, "Passthrough: worker is {}", self.lifecycle.state());
            return Ok(Interception::Passthrough);
        }

        let category = self.classifier.classify(&request);
        request.category = Some(category);
        let route = self.routes.route(category);

        let response = self
            .engine
            .execute(&request, category, route.strategy, route.partition)
            .await?;
        Ok(Interception::Respond(response))
    }

    /// Route chosen for a category
    pub fn route(&self, category: Category) -> Route {
        self.routes.route(category)
    }

    pub fn classifier(&self) -> &Classifier {
        &self.classifier
    }

    pub fn engine(&self) -> &StrategyEngine {
        &self.engine
    }

    pub fn state(&self) -> LifecycleState {
        self.lifecycle.state()
    }

    pub async fn install(&self) -> WardenResult<InstallReport> {
        self.lifecycle.install().await
    }

    pub async fn activate(&self) -> WardenResult<ActivateReport> {
        self.lifecycle.activate().await
    }

    pub async fn skip_waiting(&self) -> WardenResult<Option<ActivateReport>> {
        self.lifecycle.skip_waiting().await
    }

    /// Pick up an earlier install of this version, if any
    pub async fn resume(&self) -> WardenResult<LifecycleState> {
        self.lifecycle.resume().await
    }

    /// Become active from an earlier install, or install now
    pub async fn boot(&self) -> WardenResult<LifecycleState> {
        if self.lifecycle.resume().await? == LifecycleState::Parsed {
            self.lifecycle.install().await?;
        }
        Ok(self.lifecycle.state())
    }

    /// Parse and answer a JSON control message
    pub async fn handle_control_message(&self, json: &str) -> WardenResult<ControlReply> {
        self.dispatch(ControlMessage::parse(json)?).await
    }

    /// Answer an already parsed control message
    pub async fn dispatch(&self, message: ControlMessage) -> WardenResult<ControlReply> {
        debug!("Control message {:?}", message);

        match message {
            ControlMessage::GetCacheStats => Ok(ControlReply::Stats(self.control.stats().await?)),
            ControlMessage::ClearCache => {
                self.control.clear_all().await?;
                Ok(ControlReply::Cleared { success: true })
            }
            ControlMessage::SkipWaiting => {
                self.lifecycle.skip_waiting().await?;
                Ok(ControlReply::Ack)
            }
            ControlMessage::GetVersion => Ok(ControlReply::Version {
                version: self.control.version().to_string(),
            }),
        }
    }

    pub async fn handle_push(&self, data: Option<&str>) -> WardenResult<Notification> {
        self.notifier.push(data).await
    }

    pub async fn handle_notification_click(
        &self,
        notification: &Notification,
        action: Option<&str>,
    ) -> WardenResult<ClickOutcome> {
        self.notifier
            .click(notification, ClickAction::from_action(action))
            .await
    }

    /// Refresh important resources now
    pub async fn revalidate(&self, trigger: RevalidationTrigger) -> RevalidationReport {
        self.revalidator.run(trigger).await
    }

    pub fn revalidator(&self) -> Arc<Revalidator> {
        Arc::clone(&self.revalidator)
    }
}
