//! Share target and bookmarklet handlers

use anyhow::{bail, Context, Result};

use clipbox_core::capture;
use clipbox_core::{LinkStore, SharePayload};

use crate::commands::link::ensure_category;
use crate::output::{Output, OutputFormat};

/// Save whatever a share target handed over
///
/// An explicit URL wins over one found in the shared text.
pub async fn share(
    store: &LinkStore,
    url: Option<String>,
    title: Option<String>,
    text: Option<String>,
    category: String,
    output: &Output,
) -> Result<()> {
    ensure_category(&category)?;

    let payload = SharePayload { url, title, text };
    let Some(request) = payload.resolve() else {
        bail!("Nothing to save: no URL given and none found in the shared text");
    };

    let link = store
        .add_link(&request.url, &category, request.title.as_deref())
        .await
        .context("Failed to save shared link")?;

    output.success(&format!("Saved shared link: {}", link.title));
    output.print_link(&link);

    Ok(())
}

/// Print the bookmarklet for the given app location
pub fn bookmarklet(base_url: &str, output: &Output) -> Result<()> {
    let script = capture::bookmarklet(base_url);

    match output.format {
        OutputFormat::Json => {
            println!("{}", serde_json::json!({ "bookmarklet": script }));
        }
        OutputFormat::Quiet => println!("{}", script),
        OutputFormat::Human => {
            println!("Drag this to your bookmarks bar, or create a bookmark with it as the URL:");
            println!();
            println!("{}", script);
        }
    }

    Ok(())
}
