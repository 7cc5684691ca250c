//! Export and import handlers

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};

use clipbox_core::LinkStore;

use crate::output::Output;
use crate::prompt::confirm;

/// Write every link as JSON to `file`, or stdout when no file is given
pub fn export(store: &LinkStore, file: Option<PathBuf>, output: &Output) -> Result<()> {
    let links = store.export_links().context("Failed to export links")?;
    let json = serde_json::to_string_pretty(&links).context("Failed to serialize links")?;

    match file {
        Some(path) => {
            fs::write(&path, json)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            output.success(&format!(
                "Exported {} link(s) to {}",
                links.len(),
                path.display()
            ));
        }
        None => println!("{}", json),
    }

    Ok(())
}

/// Replace all links with the contents of an export file
pub fn import(store: &LinkStore, file: PathBuf, output: &Output) -> Result<()> {
    let json = fs::read_to_string(&file)
        .with_context(|| format!("Failed to read {}", file.display()))?;

    let existing = store.link_count()?;
    if existing > 0 && output.should_prompt() {
        println!(
            "Importing replaces all {} saved link(s) with the contents of {}",
            existing,
            file.display()
        );
        if !confirm("Are you sure?")? {
            println!("Cancelled.");
            return Ok(());
        }
    }

    let count = store
        .import_json(&json)
        .with_context(|| format!("Failed to import {}", file.display()))?;

    output.success(&format!("Imported {} link(s)", count));
    Ok(())
}
