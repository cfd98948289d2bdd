//! Install and activate commands

use crate::cli::ui::Ui;
use crate::config::Config;
use crate::engine::Warden;
use crate::error::WardenResult;
use crate::lifecycle::ActivateReport;
use tracing::debug;

/// Install the configured version
pub async fn install(config: &Config) -> WardenResult<()> {
    let ui = Ui::detect();
    let warden = Warden::from_config(config.clone())?;

    let spinner = ui.spinner(&format!(
        "Installing {} ({} core assets)",
        config.engine.version,
        config.manifest.core_assets.len()
    ));
    let report = match warden.install().await {
        Ok(report) => report,
        Err(e) => {
            spinner.fail("Install failed");
            return Err(e);
        }
    };
    spinner.stop(&format!(
        "Cached {} of {} core assets",
        report.cached,
        config.manifest.core_assets.len()
    ));

    for path in &report.failed {
        ui.warn(&format!("Not cached: {}", path));
    }

    match report.activation {
        Some(activation) => print_activation(&ui, &config.engine.version, &activation),
        None => ui.info(&format!(
            "Version {} is waiting; run `warden activate` to take over",
            config.engine.version
        )),
    }

    Ok(())
}

/// Activate the configured version
pub async fn activate(config: &Config) -> WardenResult<()> {
    let ui = Ui::detect();
    let warden = Warden::from_config(config.clone())?;

    // a fresh process starts in Parsed; only an earlier install lets it activate
    let state = warden.resume().await?;
    debug!("Activating from {}", state);
    let report = warden.activate().await?;
    print_activation(&ui, &config.engine.version, &report);
    Ok(())
}

fn print_activation(ui: &Ui, version: &str, report: &ActivateReport) {
    for name in &report.deleted {
        ui.info(&format!("Deleted stale partition {}", name));
    }
    ui.ok_detail(
        &format!("Version {} active", version),
        &format!("{} stale partition(s) removed", report.deleted.len()),
    );
}
