//! Output formatting for CLI
//!
//! Provides consistent output formatting across all commands:
//! - Human-readable default output
//! - JSON output (--json flag)
//! - Quiet mode for scripting (--quiet flag)

use serde::Serialize;

use clipbox_core::{Category, SavedLink};

/// Output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable output (default)
    Human,
    /// JSON output
    Json,
    /// Quiet mode - minimal output
    Quiet,
}

impl OutputFormat {
    /// Create format from CLI flags
    pub fn from_flags(json: bool, quiet: bool) -> Self {
        if quiet {
            OutputFormat::Quiet
        } else if json {
            OutputFormat::Json
        } else {
            OutputFormat::Human
        }
    }
}

/// Output helper for consistent formatting
pub struct Output {
    /// The output format
    pub format: OutputFormat,
}

impl Output {
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    /// Check if output is in quiet mode
    pub fn is_quiet(&self) -> bool {
        matches!(self.format, OutputFormat::Quiet)
    }

    /// Print a single link
    pub fn print_link(&self, link: &SavedLink) {
        match self.format {
            OutputFormat::Human => {
                println!("ID:       {}", link.id);
                println!("Title:    {}", link.title);
                println!("URL:      {}", link.url);
                println!("Category: {}", category_label(&link.category));
                println!("Pinned:   {}", if link.is_pinned { "yes" } else { "no" });
                println!("Saved:    {}", link.created_at.format("%Y-%m-%d %H:%M"));
            }
            OutputFormat::Json => print_json(link),
            OutputFormat::Quiet => {
                println!("{}", link.id);
            }
        }
    }

    /// Print a list of links
    pub fn print_links(&self, links: &[SavedLink]) {
        match self.format {
            OutputFormat::Human => {
                if links.is_empty() {
                    println!("No links found.");
                    return;
                }
                for link in links {
                    println!(
                        "{} {} | {:<35} | {:<5} | {}",
                        if link.is_pinned { "*" } else { " " },
                        short_id(link),
                        truncate(&link.title, 35),
                        link.category,
                        truncate(&link.url, 45)
                    );
                }
                println!("\n{} link(s)", links.len());
            }
            OutputFormat::Json => print_json(links),
            OutputFormat::Quiet => {
                for link in links {
                    println!("{}", link.id);
                }
            }
        }
    }

    /// Print categories with their link counts
    pub fn print_categories(&self, categories: &[(&Category, usize)]) {
        match self.format {
            OutputFormat::Human => {
                for (category, count) in categories {
                    println!(
                        "{:<6} {:<6} ({:>3})  {}",
                        category.id, category.name, count, category.description
                    );
                }
            }
            OutputFormat::Json => {
                let json: Vec<_> = categories
                    .iter()
                    .map(|(category, count)| {
                        serde_json::json!({
                            "id": category.id,
                            "name": category.name,
                            "description": category.description,
                            "count": count
                        })
                    })
                    .collect();
                print_json(&json);
            }
            OutputFormat::Quiet => {
                for (category, _) in categories {
                    println!("{}", category.id);
                }
            }
        }
    }

    /// Print a success message
    pub fn success(&self, message: &str) {
        match self.format {
            OutputFormat::Human => println!("✓ {}", message),
            OutputFormat::Json => {
                println!(
                    "{}",
                    serde_json::json!({"status": "success", "message": message})
                );
            }
            OutputFormat::Quiet => {}
        }
    }

    /// Check if we should prompt for confirmation
    pub fn should_prompt(&self) -> bool {
        self.format == OutputFormat::Human
    }

    /// Print an informational message
    pub fn message(&self, msg: &str) {
        match self.format {
            OutputFormat::Human => println!("{}", msg),
            OutputFormat::Json => {
                println!("{}", serde_json::json!({"message": msg}));
            }
            OutputFormat::Quiet => {}
        }
    }
}

/// Pretty-print any serializable value as JSON
pub fn print_json<T: Serialize + ?Sized>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(json) => println!("{}", json),
        Err(e) => eprintln!("Failed to serialize output: {}", e),
    }
}

/// First eight characters of the link id
pub fn short_id(link: &SavedLink) -> String {
    link.id.to_string()[..8].to_string()
}

/// "Name (id)" for known categories, the raw id otherwise
fn category_label(id: &str) -> String {
    match Category::find(id) {
        Some(category) => format!("{} ({})", category.name, category.id),
        None => id.to_string(),
    }
}

/// Truncate a string to max length, adding "..." if truncated
fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}
