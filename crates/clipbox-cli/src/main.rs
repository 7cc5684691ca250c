//! Clipbox CLI
//!
//! Command-line interface for Clipbox - save links into categories and
//! browse them later.

use std::path::PathBuf;

use anyhow::{anyhow, Result};
use clap::{Parser, Subcommand};

use clipbox_core::{Config, LinkStore, DEFAULT_CATEGORY};

mod commands;
mod logging;
mod output;
mod prompt;

use output::{Output, OutputFormat};

/// Where the bookmarklet sends captured pages unless told otherwise
const DEFAULT_APP_URL: &str = "http://localhost:3000";

#[derive(Parser)]
#[command(name = "clipbox")]
#[command(about = "Clipbox - save links into categories and find them later")]
#[command(version)]
#[command(propagate_version = true)]
struct Cli {
    /// Output as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Quiet mode - minimal output
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Use this config file instead of the default
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Save a link
    #[command(alias = "save")]
    Add {
        /// URL to save
        url: String,
        /// Category (work, ideas, read, tools, inbox)
        #[arg(short, long, default_value = DEFAULT_CATEGORY)]
        category: String,
        /// Title (fetched from the page if omitted)
        #[arg(short, long)]
        title: Option<String>,
    },
    /// List links
    #[command(alias = "ls")]
    List {
        /// Only links in this category (pinned first)
        #[arg(short, long)]
        category: Option<String>,
        /// Only links whose title or URL contains this text
        #[arg(short, long)]
        search: Option<String>,
    },
    /// Show link details
    Show {
        /// Link ID (full UUID or prefix)
        id: String,
    },
    /// Change a link's title or category
    Edit {
        /// Link ID (full UUID or prefix)
        id: String,
        /// New title
        #[arg(short, long)]
        title: Option<String>,
        /// New category
        #[arg(short, long)]
        category: Option<String>,
    },
    /// Pin or unpin a link
    Pin {
        /// Link ID (full UUID or prefix)
        id: String,
    },
    /// Delete a link
    #[command(alias = "rm")]
    Delete {
        /// Link ID (full UUID or prefix)
        id: String,
    },
    /// Open a link in the browser
    Open {
        /// Link ID (full UUID or prefix)
        id: String,
    },
    /// List categories with link counts
    Categories,
    /// Save shared content (URL, or text containing one)
    Share {
        #[arg(long)]
        url: Option<String>,
        #[arg(short, long)]
        title: Option<String>,
        #[arg(long)]
        text: Option<String>,
        /// Category to file the link under
        #[arg(short, long, default_value = DEFAULT_CATEGORY)]
        category: String,
    },
    /// Print the capture bookmarklet
    Bookmarklet {
        /// Base URL of the capture page
        #[arg(default_value = DEFAULT_APP_URL)]
        base_url: String,
    },
    /// Export all links as JSON
    Export {
        /// Write to this file instead of stdout
        file: Option<PathBuf>,
    },
    /// Replace all links with a JSON export
    Import {
        /// File written by `clipbox export`
        file: PathBuf,
    },
    /// Show or set configuration
    Config {
        #[command(subcommand)]
        command: Option<ConfigCommands>,
    },
    /// Show status (database location, counts)
    Status,
}

#[derive(Subcommand, Clone)]
enum ConfigCommands {
    /// Show current configuration
    Show,
    /// Set a configuration value
    Set {
        /// Configuration key (data_dir, db_name, fetch_timeout_secs, ...)
        key: String,
        /// Configuration value
        value: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let output = Output::new(OutputFormat::from_flags(cli.json, cli.quiet));
    let config_path = cli.config.as_ref();

    // Commands that don't need the store
    match &cli.command {
        Commands::Config { command } => {
            return handle_config_command(command.clone(), config_path, &output);
        }
        Commands::Bookmarklet { base_url } => {
            return commands::capture::bookmarklet(base_url, &output);
        }
        _ => {}
    }

    let config = Config::load_with_cli_override(config_path)?;
    logging::init(&config);

    let store = open_store(&config)?;

    match cli.command {
        Commands::Config { .. } => unreachable!(),      // Handled above
        Commands::Bookmarklet { .. } => unreachable!(), // Handled above
        Commands::Add {
            url,
            category,
            title,
        } => commands::link::add(&store, url, category, title, &output).await,
        Commands::List { category, search } => {
            commands::link::list(&store, category, search, &output)
        }
        Commands::Show { id } => commands::link::show(&store, id, &output),
        Commands::Edit {
            id,
            title,
            category,
        } => commands::link::edit(&store, id, title, category, &output),
        Commands::Pin { id } => commands::link::pin(&store, id, &output),
        Commands::Delete { id } => commands::link::delete(&store, id, &output),
        Commands::Open { id } => commands::link::open(&store, id, &output),
        Commands::Categories => commands::category::list(&store, &output),
        Commands::Share {
            url,
            title,
            text,
            category,
        } => commands::capture::share(&store, url, title, text, category, &output).await,
        Commands::Export { file } => commands::transfer::export(&store, file, &output),
        Commands::Import { file } => commands::transfer::import(&store, file, &output),
        Commands::Status => commands::status::show(&store, &config, &output),
    }
}

fn handle_config_command(
    command: Option<ConfigCommands>,
    config_path: Option<&PathBuf>,
    output: &Output,
) -> Result<()> {
    match command {
        Some(ConfigCommands::Show) | None => commands::config::show(config_path, output),
        Some(ConfigCommands::Set { key, value }) => {
            commands::config::set(key, value, config_path, output)
        }
    }
}

/// Open the store, attaching a recovery hint to storage errors
fn open_store(config: &Config) -> Result<LinkStore> {
    LinkStore::open_with_config(config).map_err(|e| match e.recovery_suggestion() {
        Some(hint) => anyhow!("Failed to open link store: {}\n{}", e, hint),
        None => anyhow!("Failed to open link store: {}", e),
    })
}
