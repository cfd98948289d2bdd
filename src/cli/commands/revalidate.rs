//! Revalidate command - refresh important resources

use crate::cli::args::{RevalidateArgs, TriggerArg};
use crate::cli::ui::Ui;
use crate::config::Config;
use crate::engine::Warden;
use crate::error::{WardenError, WardenResult};
use crate::revalidate::RevalidationTrigger;
use std::time::Duration;
use tracing::info;

/// Execute the revalidate command
pub async fn execute(args: RevalidateArgs, config: &Config) -> WardenResult<()> {
    let ui = Ui::detect();
    let warden = Warden::from_config(config.clone())?;

    if let Some(secs) = args.every {
        if secs == 0 {
            return Err(WardenError::User("--every must be at least 1 second".to_string()));
        }

        ui.info(&format!("Revalidating every {}s, Ctrl-C to stop", secs));
        let task = warden.revalidator().spawn_periodic(Duration::from_secs(secs));
        let interrupted = tokio::signal::ctrl_c().await;
        task.abort();
        info!("Periodic revalidation stopped");
        return interrupted.map_err(|e| WardenError::io("waiting for Ctrl-C", e));
    }

    let trigger = match args.trigger {
        TriggerArg::ConnectivityRestored => RevalidationTrigger::ConnectivityRestored,
        TriggerArg::Periodic => RevalidationTrigger::Periodic,
    };

    let spinner = ui.spinner(&format!(
        "Revalidating {} resource(s)",
        config.manifest.important_resources.len()
    ));
    let report = warden.revalidate(trigger).await;
    let summary = format!("{} refreshed, {} failed", report.refreshed, report.failed);
    if report.failed > 0 {
        spinner.fail(&summary);
    } else {
        spinner.stop(&summary);
    }
    if report.retryable > 0 {
        ui.info(&format!(
            "{} failure(s) may succeed once the network is back",
            report.retryable
        ));
    }
    Ok(())
}
