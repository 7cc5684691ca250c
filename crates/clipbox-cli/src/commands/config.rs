//! Config command handlers

use std::path::PathBuf;

use anyhow::{bail, Context, Result};

use clipbox_core::Config;

use crate::output::{Output, OutputFormat};

const VALID_KEYS: &str =
    "data_dir, db_name, schema_version, fetch_timeout_secs, direct_fetch, offline, log_level, log_file";

/// Show current configuration
pub fn show(config_path: Option<&PathBuf>, output: &Output) -> Result<()> {
    let config =
        Config::load_with_cli_override(config_path).context("Failed to load configuration")?;

    match output.format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::json!({
                    "data_dir": config.data_dir,
                    "db_name": config.db_name,
                    "schema_version": config.schema_version,
                    "fetch_timeout_secs": config.fetch_timeout_secs,
                    "direct_fetch": config.direct_fetch,
                    "offline": config.offline,
                    "log_level": config.log_level,
                    "log_file": config.log_file
                })
            );
        }
        OutputFormat::Quiet => {
            println!("{}", config.sqlite_path().display());
        }
        OutputFormat::Human => {
            let effective_path = config_path
                .cloned()
                .unwrap_or_else(Config::config_file_path);
            println!("Configuration:");
            println!("  data_dir:           {}", config.data_dir.display());
            println!("  db_name:            {}", config.db_name);
            println!("  schema_version:     {}", config.schema_version);
            println!("  fetch_timeout_secs: {}", config.fetch_timeout_secs);
            println!("  direct_fetch:       {}", config.direct_fetch);
            println!("  offline:            {}", config.offline);
            println!(
                "  log_level:          {}",
                config.log_level.as_deref().unwrap_or("(not set)")
            );
            println!(
                "  log_file:           {}",
                config
                    .log_file
                    .as_ref()
                    .map(|p| p.display().to_string())
                    .unwrap_or_else(|| "(not set)".to_string())
            );
            println!();
            println!("Config file: {}", effective_path.display());
        }
    }

    Ok(())
}

/// Set a configuration value
pub fn set(
    key: String,
    value: String,
    config_path: Option<&PathBuf>,
    output: &Output,
) -> Result<()> {
    let mut config =
        Config::load_with_cli_override(config_path).context("Failed to load configuration")?;

    apply(&mut config, &key, &value)?;

    // Save to the CLI-specified path or default
    let save_path = config_path
        .cloned()
        .unwrap_or_else(Config::config_file_path);
    config
        .save_to_path(&save_path)
        .context("Failed to save configuration")?;

    output.success(&format!("Set {} = {}", key, value));

    Ok(())
}

fn apply(config: &mut Config, key: &str, value: &str) -> Result<()> {
    match key {
        "data_dir" => {
            config.data_dir = value.into();
        }
        "db_name" => {
            if value.trim().is_empty() {
                bail!("db_name cannot be empty");
            }
            config.db_name = value.to_string();
        }
        "schema_version" => {
            config.schema_version = value
                .parse()
                .context("Invalid value for schema_version. Use a whole number.")?;
        }
        "fetch_timeout_secs" => {
            let secs: u64 = value
                .parse()
                .context("Invalid value for fetch_timeout_secs. Use a whole number of seconds.")?;
            if secs == 0 {
                bail!("fetch_timeout_secs must be at least 1");
            }
            config.fetch_timeout_secs = secs;
        }
        "direct_fetch" => {
            config.direct_fetch = value
                .parse()
                .context("Invalid value for direct_fetch. Use 'true' or 'false'.")?;
        }
        "offline" => {
            config.offline = value
                .parse()
                .context("Invalid value for offline. Use 'true' or 'false'.")?;
        }
        "log_level" => {
            config.log_level = optional(value);
        }
        "log_file" => {
            config.log_file = optional(value).map(PathBuf::from);
        }
        _ => {
            bail!(
                "Unknown configuration key: '{}'\nValid keys: {}",
                key,
                VALID_KEYS
            );
        }
    }

    Ok(())
}

/// Empty or "none" clears an optional setting
fn optional(value: &str) -> Option<String> {
    if value.is_empty() || value == "none" {
        None
    } else {
        Some(value.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_apply_known_keys() {
        let mut config = Config::default();

        apply(&mut config, "db_name", "links.db").unwrap();
        apply(&mut config, "fetch_timeout_secs", "3").unwrap();
        apply(&mut config, "offline", "true").unwrap();
        apply(&mut config, "log_level", "debug").unwrap();

        assert_eq!(config.db_name, "links.db");
        assert_eq!(config.fetch_timeout_secs, 3);
        assert!(config.offline);
        assert_eq!(config.log_level.as_deref(), Some("debug"));

        apply(&mut config, "log_level", "none").unwrap();
        assert!(config.log_level.is_none());
    }

    #[test]
    fn test_apply_rejects_bad_values() {
        let mut config = Config::default();

        assert!(apply(&mut config, "offline", "maybe").is_err());
        assert!(apply(&mut config, "fetch_timeout_secs", "0").is_err());
        assert!(apply(&mut config, "schema_version", "three").is_err());

        let err = apply(&mut config, "sync_url", "x").unwrap_err().to_string();
        assert!(err.contains("Unknown configuration key"));
    }

    #[test]
    fn test_set_writes_config_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.toml");
        let data_dir = temp.path().join("data");
        std::fs::write(&path, format!("data_dir = {:?}\n", data_dir.display().to_string()))
            .unwrap();
        let output = Output::new(OutputFormat::Quiet);

        set(
            "db_name".to_string(),
            "other.db".to_string(),
            Some(&path),
            &output,
        )
        .unwrap();

        let config = Config::load_from_path(&path).unwrap();
        assert_eq!(config.db_name, "other.db");
    }
}
