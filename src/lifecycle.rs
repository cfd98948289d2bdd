//! Partition lifecycle: install, waiting, activation
//!
//! ```text
//! Parsed -> Installing -> Waiting -> Activating -> Active
//!              |                        ^
//!              +-- skip_waiting --------+
//! ```
//!
//! Install pre-warms the static partition for the current version. Activate
//! deletes every partition outside `{static,dynamic,api} x version`; it is
//! serialized and safe to re-run after an interruption.

use crate::error::{WardenError, WardenResult};
use crate::request::Request;
use crate::store::{CacheStore, PartitionId, PartitionName};
use crate::strategy::StrategyEngine;
use futures_util::future::join_all;
use serde::Serialize;
use std::fmt;
use std::sync::{Arc, Mutex};
use tracing::{debug, info, warn};
use url::Url;

/// Worker lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LifecycleState {
    Parsed,
    Installing,
    Waiting,
    Activating,
    Active,
}

impl fmt::Display for LifecycleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Parsed => "parsed",
            Self::Installing => "installing",
            Self::Waiting => "waiting",
            Self::Activating => "activating",
            Self::Active => "active",
        };
        write!(f, "{}", name)
    }
}

/// Outcome of an install
#[derive(Debug, Clone, Default, Serialize)]
pub struct InstallReport {
    /// Core assets fetched and stored
    pub cached: usize,
    /// Core assets that could not be fetched or stored
    pub failed: Vec<String>,
    /// Activation result, when install went straight through
    #[serde(skip_serializing_if = "Option::is_none")]
    pub activation: Option<ActivateReport>,
}

/// Outcome of an activation
#[derive(Debug, Clone, Default, Serialize)]
pub struct ActivateReport {
    /// Stored names of the partitions removed
    pub deleted: Vec<String>,
}

/// Drives the install/activate state machine for one build version
pub struct LifecycleManager {
    state: Mutex<LifecycleState>,
    activation: tokio::sync::Mutex<()>,
    engine: StrategyEngine,
    origin: Url,
    core_assets: Vec<String>,
    skip_waiting_on_install: bool,
}

impl LifecycleManager {
    pub fn new(
        engine: StrategyEngine,
        origin: Url,
        core_assets: Vec<String>,
        skip_waiting_on_install: bool,
    ) -> Self {
        Self {
            state: Mutex::new(LifecycleState::Parsed),
            activation: tokio::sync::Mutex::new(()),
            engine,
            origin,
            core_assets,
            skip_waiting_on_install,
        }
    }

    /// Current state
    pub fn state(&self) -> LifecycleState {
        *self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn is_active(&self) -> bool {
        self.state() == LifecycleState::Active
    }

    fn set_state(&self, next: LifecycleState) {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        debug!("Lifecycle {} -> {}", *state, next);
        *state = next;
    }

    /// Move `from` -> `to` atomically, failing if the current state is not `from`
    fn transition(&self, from: &[LifecycleState], to: LifecycleState) -> WardenResult<()> {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        if !from.contains(&state) {
            return Err(WardenError::LifecycleTransition {
                from: state.to_string(),
                to: to.to_string(),
            });
        }
        debug!("Lifecycle {} -> {}", *state, to);
        *state = to;
        Ok(())
    }

    fn store(&self) -> &Arc<dyn CacheStore> {
        self.engine.store()
    }

    /// Pick up a version installed by an earlier run
    ///
    /// A build whose static partition already exists is not re-installed. It
    /// resumes `Active` only if no other build's partitions remain; otherwise
    /// the earlier run stopped before activation finished, so it resumes
    /// `Waiting` (and activates right away when `skip_waiting_on_install` is
    /// set). Returns the resulting state.
    pub async fn resume(&self) -> WardenResult<LifecycleState> {
        if self.state() != LifecycleState::Parsed {
            return Ok(self.state());
        }

        let version = self.engine.partition(PartitionName::Static).version;
        let current = self.engine.partition(PartitionName::Static).to_string();
        let partitions = self.store().partitions().await?;
        if !partitions.contains(&current) {
            return Ok(self.state());
        }

        let expected = Self::expected_names(&version);
        let stale = partitions.iter().filter(|p| !expected.contains(*p)).count();
        if stale == 0 {
            info!("Resuming installed version {}", version);
            self.set_state(LifecycleState::Active);
            return Ok(self.state());
        }

        info!(
            "Version {} is installed but {} stale partition(s) remain; waiting",
            version, stale
        );
        self.set_state(LifecycleState::Waiting);
        if self.skip_waiting_on_install {
            self.skip_waiting().await?;
        }
        Ok(self.state())
    }

    fn expected_names(version: &str) -> Vec<String> {
        PartitionId::expected_set(version)
            .iter()
            .map(ToString::to_string)
            .collect()
    }

    /// Open partitions and pre-warm the static one
    ///
    /// Individual asset failures are logged and skipped. A store that cannot
    /// open the partitions at all fails the install and resets to `Parsed`.
    pub async fn install(&self) -> WardenResult<InstallReport> {
        self.transition(&[LifecycleState::Parsed], LifecycleState::Installing)?;

        let mut report = match self.prewarm().await {
            Ok(report) => report,
            Err(e) => {
                self.set_state(LifecycleState::Parsed);
                return Err(e);
            }
        };

        info!(
            "Installed: {} of {} core assets cached",
            report.cached,
            self.core_assets.len()
        );
        self.set_state(LifecycleState::Waiting);

        if self.skip_waiting_on_install {
            report.activation = self.skip_waiting().await?;
        }

        Ok(report)
    }

    async fn prewarm(&self) -> WardenResult<InstallReport> {
        let version = self.engine.partition(PartitionName::Static).version;
        for partition in PartitionId::expected_set(&version) {
            self.store().open(&partition).await?;
        }

        let target = self.engine.partition(PartitionName::Static);
        let fetches = self.core_assets.iter().map(|path| {
            let target = target.clone();
            async move {
                let request = Request::for_path(&self.origin, path)?;
                self.engine.refresh_entry(&request, &target).await
            }
        });

        let mut report = InstallReport::default();
        for (path, result) in self.core_assets.iter().zip(join_all(fetches).await) {
            match result {
                Ok(()) => report.cached += 1,
                Err(e) => {
                    warn!("Skipping core asset {}: {}", path, e);
                    report.failed.push(path.clone());
                }
            }
        }
        Ok(report)
    }

    /// Leave `Waiting` and activate
    ///
    /// Outside `Waiting` this is a no-op and returns `None`.
    pub async fn skip_waiting(&self) -> WardenResult<Option<ActivateReport>> {
        if self.state() != LifecycleState::Waiting {
            debug!("skip_waiting ignored in state {}", self.state());
            return Ok(None);
        }
        self.activate().await.map(Some)
    }

    /// Delete stale partitions and become `Active`
    ///
    /// Re-running on an active worker repeats the cleanup. An interrupted
    /// activation stays in `Activating` and can be retried.
    pub async fn activate(&self) -> WardenResult<ActivateReport> {
        let _serialized = self.activation.lock().await;

        self.transition(
            &[
                LifecycleState::Waiting,
                LifecycleState::Activating,
                LifecycleState::Active,
            ],
            LifecycleState::Activating,
        )?;

        let version = self.engine.partition(PartitionName::Static).version;
        let expected = Self::expected_names(&version);

        let mut report = ActivateReport::default();
        for name in self.store().partitions().await? {
            if expected.contains(&name) {
                continue;
            }
            if self.store().delete_partition(&name).await? {
                info!("Deleted stale partition {}", name);
                report.deleted.push(name);
            }
        }

        self.set_state(LifecycleState::Active);
        info!("Activated version {}", version);
        Ok(report)
    }
}
