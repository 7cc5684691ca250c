//! Link command handlers

use anyhow::{bail, Context, Result};
use uuid::Uuid;

use clipbox_core::{Category, LinkPatch, LinkStore, SavedLink};

use crate::output::{short_id, Output};
use crate::prompt::{confirm, prompt_with_default};

/// Save a new link
pub async fn add(
    store: &LinkStore,
    url: String,
    category: String,
    title: Option<String>,
    output: &Output,
) -> Result<()> {
    ensure_category(&category)?;

    let link = store
        .add_link(&url, &category, title.as_deref())
        .await
        .context("Failed to save link")?;

    output.success(&format!("Saved link: {}", link.id));
    output.print_link(&link);

    Ok(())
}

/// List links, optionally restricted to a category and/or a search term
pub fn list(
    store: &LinkStore,
    category: Option<String>,
    search: Option<String>,
    output: &Output,
) -> Result<()> {
    let links = match category {
        Some(ref c) => {
            ensure_category(c)?;
            store.try_get_links_by_category(c)?
        }
        None => store.try_get_all_links()?,
    };

    let links = match search {
        Some(ref query) => filter_links(links, query),
        None => links,
    };

    output.print_links(&links);
    Ok(())
}

/// Show a single link
pub fn show(store: &LinkStore, id: String, output: &Output) -> Result<()> {
    let link = find_link(store, &id)?;
    output.print_link(&link);
    Ok(())
}

/// Edit a link's title and/or category
///
/// With neither flag given, prompts for each field.
pub fn edit(
    store: &LinkStore,
    id: String,
    title: Option<String>,
    category: Option<String>,
    output: &Output,
) -> Result<()> {
    let link = find_link(store, &id)?;

    let patch = if title.is_none() && category.is_none() {
        if !output.should_prompt() {
            bail!("Nothing to change. Pass --title and/or --category.");
        }
        prompt_patch(&link)?
    } else {
        LinkPatch { title, category }
    };

    if let Some(ref c) = patch.category {
        ensure_category(c)?;
    }

    if patch.is_empty() {
        output.message("No changes.");
        return Ok(());
    }

    let link = store
        .update_link(link.id, &patch)
        .context("Failed to update link")?;

    output.success("Link updated");
    output.print_link(&link);

    Ok(())
}

/// Pin or unpin a link
pub fn pin(store: &LinkStore, id: String, output: &Output) -> Result<()> {
    let link = find_link(store, &id)?;

    store.toggle_pin(link.id).context("Failed to toggle pin")?;

    let state = if link.is_pinned { "Unpinned" } else { "Pinned" };
    output.success(&format!("{} link: {}", state, link.title));

    Ok(())
}

/// Delete a link
pub fn delete(store: &LinkStore, id: String, output: &Output) -> Result<()> {
    let link = find_link(store, &id)?;

    // Confirm deletion
    if output.should_prompt() {
        println!("Delete link: {} - {}", short_id(&link), link.title);
        if !confirm("Are you sure?")? {
            println!("Cancelled.");
            return Ok(());
        }
    }

    store
        .delete_link(link.id)
        .context("Failed to delete link")?;

    output.success(&format!("Deleted link: {}", link.id));

    Ok(())
}

/// Open a link in the default browser
pub fn open(store: &LinkStore, id: String, output: &Output) -> Result<()> {
    let link = find_link(store, &id)?;

    open::that(&link.url).with_context(|| format!("Failed to open {}", link.url))?;

    output.message(&format!("Opened {}", link.url));
    Ok(())
}

/// Reject category ids outside the fixed list
pub(crate) fn ensure_category(id: &str) -> Result<()> {
    if !Category::is_known(id) {
        bail!(
            "Unknown category: '{}'\nValid categories: {}",
            id,
            Category::valid_ids()
        );
    }
    Ok(())
}

fn find_link(store: &LinkStore, id: &str) -> Result<SavedLink> {
    let uuid = parse_link_id(id, store)?;

    store
        .get_link(uuid)?
        .ok_or_else(|| anyhow::anyhow!("Link not found: {}", id))
}

/// Parse a link ID (supports full UUID or prefix)
fn parse_link_id(id: &str, store: &LinkStore) -> Result<Uuid> {
    let id = id.trim();
    if id.is_empty() {
        bail!("Link ID cannot be empty");
    }

    // Try full UUID first
    if let Ok(uuid) = Uuid::parse_str(id) {
        return Ok(uuid);
    }

    // Try prefix match
    let links = store.try_get_all_links()?;
    let matches: Vec<_> = links
        .iter()
        .filter(|l| l.id.to_string().starts_with(id))
        .collect();

    match matches.len() {
        0 => bail!("No link found matching: {}", id),
        1 => Ok(matches[0].id),
        _ => {
            eprintln!("Multiple links match '{}':", id);
            for link in &matches {
                eprintln!("  {} - {}", link.id, link.title);
            }
            bail!("Ambiguous ID. Please provide more characters.");
        }
    }
}

/// Keep links whose title or URL contains `query`, ignoring case
fn filter_links(links: Vec<SavedLink>, query: &str) -> Vec<SavedLink> {
    let query = query.to_lowercase();
    links
        .into_iter()
        .filter(|l| {
            l.title.to_lowercase().contains(&query) || l.url.to_lowercase().contains(&query)
        })
        .collect()
}

fn prompt_patch(link: &SavedLink) -> Result<LinkPatch> {
    println!("Editing link: {}", link.id);
    println!("Press Enter to keep current value, or type new value.\n");

    let title = prompt_with_default("Title", &link.title)?;
    println!("Categories: {}", Category::valid_ids());
    let category = prompt_with_default("Category", &link.category)?;

    Ok(LinkPatch { title, category })
}
