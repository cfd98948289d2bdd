//! Push command - deliver a push message, optionally click it

use crate::cli::args::PushArgs;
use crate::config::Config;
use crate::engine::Warden;
use crate::error::WardenResult;

/// Execute the push command
pub async fn execute(args: PushArgs, config: &Config) -> WardenResult<()> {
    let warden = Warden::from_config(config.clone())?;

    let notification = warden.handle_push(args.json.as_deref()).await?;
    println!("{}", serde_json::to_string_pretty(&notification)?);

    if let Some(click) = args.click {
        let outcome = warden
            .handle_notification_click(&notification, click.action())
            .await?;
        println!("{}", serde_json::to_string(&outcome)?);
    }
    Ok(())
}
