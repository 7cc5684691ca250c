//! Status command handler

use anyhow::Result;

use clipbox_core::storage::SCHEMA_VERSION;
use clipbox_core::{Config, LinkStore};

use crate::output::{Output, OutputFormat};

/// Show status information
pub fn show(store: &LinkStore, config: &Config, output: &Output) -> Result<()> {
    let links = store.try_get_all_links()?;
    let pinned = links.iter().filter(|l| l.is_pinned).count();
    let strategies = store.resolver().strategy_names();
    let location = store
        .path()
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| "(in memory)".to_string());

    match output.format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::json!({
                    "database": location,
                    "schema_version": config.schema_version,
                    "supported_schema_version": SCHEMA_VERSION,
                    "offline": config.offline,
                    "title_strategies": strategies,
                    "fetch_timeout_secs": config.fetch_timeout_secs,
                    "counts": {
                        "links": links.len(),
                        "pinned": pinned
                    }
                })
            );
        }
        OutputFormat::Quiet => {
            println!("{}", links.len());
        }
        OutputFormat::Human => {
            println!("Clipbox Status");
            println!("==============");
            println!();
            println!("Storage:");
            println!("  Database: {}", location);
            println!("  Schema:   v{}", config.schema_version);
            println!();
            println!("Titles:");
            if strategies.is_empty() {
                println!("  Strategies: none (offline)");
            } else {
                println!("  Strategies: {}", strategies.join(" -> "));
            }
            println!("  Timeout:    {}s per strategy", config.fetch_timeout_secs);
            println!();
            println!("Contents:");
            println!("  Links:  {}", links.len());
            println!("  Pinned: {}", pinned);
        }
    }

    Ok(())
}
