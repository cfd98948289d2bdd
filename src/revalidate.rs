//! Best-effort refresh of important resources
//!
//! Runs when connectivity comes back or on a periodic tick. Each resource is
//! re-fetched into the static partition; failures are logged and dropped.

use crate::request::Request;
use crate::store::PartitionName;
use crate::strategy::StrategyEngine;
use futures_util::future::join_all;
use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, info};
use url::Url;

/// What woke the revalidator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum RevalidationTrigger {
    ConnectivityRestored,
    Periodic,
}

impl fmt::Display for RevalidationTrigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ConnectivityRestored => write!(f, "connectivity-restored"),
            Self::Periodic => write!(f, "periodic"),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RevalidationReport {
    pub trigger: RevalidationTrigger,
    pub refreshed: usize,
    pub failed: usize,
    /// Failures that may succeed on a later run (transport errors, 5xx)
    pub retryable: usize,
}

/// Outcome of one resource refresh
enum Refresh {
    Done,
    Failed { retryable: bool },
}

pub struct Revalidator {
    engine: StrategyEngine,
    origin: Url,
    resources: Vec<String>,
}

impl Revalidator {
    pub fn new(engine: StrategyEngine, origin: Url, resources: Vec<String>) -> Self {
        Self {
            engine,
            origin,
            resources,
        }
    }

    /// Refresh every important resource concurrently
    pub async fn run(&self, trigger: RevalidationTrigger) -> RevalidationReport {
        let target = self.engine.partition(PartitionName::Static);
        let refreshes = self.resources.iter().map(|path| {
            let target = target.clone();
            async move {
                let result = match Request::for_path(&self.origin, path) {
                    Ok(request) => self.engine.refresh_entry(&request, &target).await,
                    Err(e) => Err(e),
                };
                match result {
                    Ok(()) => Refresh::Done,
                    Err(e) => {
                        debug!("Revalidation of {} failed: {}", path, e);
                        Refresh::Failed {
                            retryable: e.is_retryable(),
                        }
                    }
                }
            }
        });

        let mut report = RevalidationReport {
            trigger,
            refreshed: 0,
            failed: 0,
            retryable: 0,
        };
        for outcome in join_all(refreshes).await {
            match outcome {
                Refresh::Done => report.refreshed += 1,
                Refresh::Failed { retryable } => {
                    report.failed += 1;
                    report.retryable += usize::from(retryable);
                }
            }
        }
        info!(
            "Revalidation ({}): {} refreshed, {} failed",
            trigger, report.refreshed, report.failed
        );
        report
    }

    /// Run on a fixed interval until the handle is aborted
    ///
    /// The first run happens one full interval after spawning.
    pub fn spawn_periodic(self: Arc<Self>, interval: Duration) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            ticker.tick().await;
            loop {
                ticker.tick().await;
                self.run(RevalidationTrigger::Periodic).await;
            }
        })
    }
}
