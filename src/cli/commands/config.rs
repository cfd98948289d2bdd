//! Config command - show or initialize configuration

use crate::cli::args::{ConfigAction, ConfigArgs};
use crate::cli::ui::Ui;
use crate::config::{Config, ConfigManager};
use crate::error::WardenResult;

/// Execute the config command
pub async fn execute(args: ConfigArgs, manager: &ConfigManager, config: &Config) -> WardenResult<()> {
    match args.action {
        None | Some(ConfigAction::Show) => show_config(config)?,
        Some(ConfigAction::Path) => println!("{}", manager.path().display()),
        Some(ConfigAction::Init { force }) => init_config(manager, force).await?,
    }

    Ok(())
}

fn show_config(config: &Config) -> WardenResult<()> {
    println!("{}", toml::to_string_pretty(config)?);
    Ok(())
}

async fn init_config(manager: &ConfigManager, force: bool) -> WardenResult<()> {
    let ui = Ui::detect();
    let path = manager.path();

    if path.exists() && !force {
        ui.warn(&format!(
            "Config already exists at {} - use --force to overwrite",
            path.display()
        ));
        return Ok(());
    }

    manager.save(&Config::default()).await?;
    ui.ok_detail("Configuration initialized", &path.display().to_string());

    Ok(())
}
