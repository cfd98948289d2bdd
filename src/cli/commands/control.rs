//! Control channel commands - stats, clear, raw messages

use crate::cli::args::{ClearArgs, MessageArgs, OutputFormat, StatsArgs};
use crate::cli::ui::Ui;
use crate::config::Config;
use crate::control::{CacheStats, ControlMessage, ControlReply};
use crate::engine::Warden;
use crate::error::{WardenError, WardenResult};
use console::style;

/// Show per-partition stats
pub async fn stats(args: StatsArgs, config: &Config) -> WardenResult<()> {
    let warden = Warden::from_config(config.clone())?;
    let ControlReply::Stats(stats) = warden.dispatch(ControlMessage::GetCacheStats).await? else {
        return Err(WardenError::Internal("stats reply had no stats".to_string()));
    };

    match args.format {
        OutputFormat::Table => print_stats_table(&stats, &config.engine.version, warden.store().backend_name()),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&stats)?),
    }
    Ok(())
}

fn print_stats_table(stats: &CacheStats, version: &str, backend: &str) {
    println!("{:<12} {:<10} {:>14}", "PARTITION", "ENTRIES", "SAMPLED BYTES");
    println!("{}", "-".repeat(38));

    for (name, s) in stats {
        let count = if s.count == 0 {
            style(s.count.to_string()).dim().to_string()
        } else {
            s.count.to_string()
        };
        println!(
            "{:<12} {:<10} {:>14}",
            format!("{}-{}", name, version),
            count,
            s.approximate_size_bytes
        );
    }

    println!();
    println!(
        "Total: {} entries ({} store)",
        stats.values().map(|s| s.count).sum::<usize>(),
        backend
    );
}

/// Delete every partition
pub async fn clear(args: ClearArgs, config: &Config) -> WardenResult<()> {
    let ui = Ui::detect().with_auto_yes(args.yes);
    let warden = Warden::from_config(config.clone())?;

    let partitions = warden.store().partitions().await?;
    if partitions.is_empty() {
        ui.info("No cache partitions found");
        return Ok(());
    }

    let prompt = format!("Delete {} cache partition(s)?", partitions.len());
    if !ui.confirm(&prompt, false).await? {
        ui.warn("Aborted; pass --yes to clear without a prompt");
        return Ok(());
    }

    warden.dispatch(ControlMessage::ClearCache).await?;
    ui.ok(&format!("Cleared {} partition(s)", partitions.len()));
    Ok(())
}

/// Send a raw JSON control message and print the reply
pub async fn message(args: MessageArgs, config: &Config) -> WardenResult<()> {
    let warden = Warden::from_config(config.clone())?;
    warden.resume().await?;

    match warden.handle_control_message(&args.json).await? {
        ControlReply::Ack => {}
        reply => println!("{}", serde_json::to_string_pretty(&reply)?),
    }
    Ok(())
}
