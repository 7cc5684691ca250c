//! Capture entry points
//!
//! Turns what a share target or bookmarklet hands over into a URL and an
//! optional title for `LinkStore::add_link`.

use once_cell::sync::Lazy;
use regex::Regex;

static URL_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)https?://\S+").unwrap());

/// Parameters received by the share target
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SharePayload {
    pub url: Option<String>,
    pub title: Option<String>,
    pub text: Option<String>,
}

/// A link ready to be saved
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaptureRequest {
    pub url: String,
    /// `None` lets the store resolve a title
    pub title: Option<String>,
}

impl SharePayload {
    /// Work out which URL was shared
    ///
    /// An explicit `url` wins; otherwise the first http(s) URL found in
    /// `text` is used. Returns `None` when neither yields a URL.
    pub fn resolve(&self) -> Option<CaptureRequest> {
        let url = non_blank(&self.url)
            .map(str::to_string)
            .or_else(|| self.text.as_deref().and_then(extract_url))?;

        Some(CaptureRequest {
            url,
            title: non_blank(&self.title).map(str::to_string),
        })
    }
}

/// Find the first http(s) URL in free text
pub fn extract_url(text: &str) -> Option<String> {
    URL_RE.find(text).map(|m| m.as_str().to_string())
}

/// Build the bookmarklet that sends the current page to `<app_base_url>/share`
pub fn bookmarklet(app_base_url: &str) -> String {
    let base = app_base_url.trim_end_matches('/');
    format!(
        "javascript:(function(){{window.open('{}/share?title='+encodeURIComponent(document.title)+'&url='+encodeURIComponent(window.location.href),'_blank');}})();",
        base
    )
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.trim().is_empty())
}
