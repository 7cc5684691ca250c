//! Data models for Clipbox
//!
//! Defines the saved link record, the partial update applied by
//! `LinkStore::update_link`, and the fixed list of categories.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Category assigned to captures that do not choose one
pub const DEFAULT_CATEGORY: &str = "inbox";

/// A saved link
///
/// Serializes with the field names used by the export format
/// (`isPinned`, `createdAt` as milliseconds since epoch).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SavedLink {
    /// Unique identifier, never reused
    pub id: Uuid,
    /// The URL exactly as supplied
    pub url: String,
    /// Display title
    pub title: String,
    /// Category id (normally one of [`CATEGORIES`])
    pub category: String,
    /// Pinned links sort ahead of the rest of their category
    pub is_pinned: bool,
    /// When this link was saved
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub created_at: DateTime<Utc>,
}

impl SavedLink {
    /// Create a new, unpinned link stamped with the current time
    pub fn new(
        url: impl Into<String>,
        title: impl Into<String>,
        category: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            url: url.into(),
            title: title.into(),
            category: category.into(),
            is_pinned: false,
            created_at: now_millis(),
        }
    }

    /// Creation time as milliseconds since the Unix epoch
    pub fn created_at_millis(&self) -> i64 {
        self.created_at.timestamp_millis()
    }

    /// Apply a partial update, leaving unspecified fields untouched
    pub fn apply(&mut self, patch: &LinkPatch) {
        if let Some(ref title) = patch.title {
            self.title = title.clone();
        }
        if let Some(ref category) = patch.category {
            self.category = category.clone();
        }
    }
}

/// Fields that may be changed by an update
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LinkPatch {
    pub title: Option<String>,
    pub category: Option<String>,
}

impl LinkPatch {
    pub fn title(title: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            category: None,
        }
    }

    pub fn category(category: impl Into<String>) -> Self {
        Self {
            title: None,
            category: Some(category.into()),
        }
    }

    /// True when the patch would not change anything
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.category.is_none()
    }
}

/// A category descriptor shown in pickers
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub struct Category {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
}

/// The fixed set of categories links can be filed under
pub static CATEGORIES: [Category; 5] = [
    Category {
        id: "work",
        name: "Work",
        description: "Professional links and resources",
    },
    Category {
        id: "ideas",
        name: "Ideas",
        description: "Inspiration and concepts",
    },
    Category {
        id: "read",
        name: "Read",
        description: "Articles and reading material",
    },
    Category {
        id: "tools",
        name: "Tools",
        description: "Useful apps and services",
    },
    Category {
        id: "inbox",
        name: "Inbox",
        description: "Unsorted links",
    },
];

impl Category {
    /// Look up a category by id
    pub fn find(id: &str) -> Option<&'static Category> {
        CATEGORIES.iter().find(|c| c.id == id)
    }

    /// Check whether `id` names one of the fixed categories
    pub fn is_known(id: &str) -> bool {
        Self::find(id).is_some()
    }

    /// Comma-separated list of valid ids, for error messages
    pub fn valid_ids() -> String {
        CATEGORIES
            .iter()
            .map(|c| c.id)
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// Current time truncated to millisecond precision, matching what is stored
pub(crate) fn now_millis() -> DateTime<Utc> {
    let now = Utc::now();
    DateTime::from_timestamp_millis(now.timestamp_millis()).unwrap_or(now)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_saved_link_new() {
        let link = SavedLink::new("https://example.com", "Example", "read");
        assert_eq!(link.url, "https://example.com");
        assert_eq!(link.title, "Example");
        assert_eq!(link.category, "read");
        assert!(!link.is_pinned);
        assert_eq!(link.created_at.timestamp_subsec_nanos() % 1_000_000, 0);
    }

    #[test]
    fn test_apply_patch_only_touches_given_fields() {
        let mut link = SavedLink::new("https://example.com", "Old", "inbox");
        let original = link.clone();

        link.apply(&LinkPatch::title("New"));
        assert_eq!(link.title, "New");
        assert_eq!(link.category, original.category);
        assert_eq!(link.id, original.id);
        assert_eq!(link.created_at, original.created_at);

        link.apply(&LinkPatch::category("work"));
        assert_eq!(link.title, "New");
        assert_eq!(link.category, "work");

        link.apply(&LinkPatch::default());
        assert_eq!(link.title, "New");
        assert_eq!(link.category, "work");
    }

    #[test]
    fn test_patch_is_empty() {
        assert!(LinkPatch::default().is_empty());
        assert!(!LinkPatch::title("x").is_empty());
    }

    #[test]
    fn test_serialization_uses_export_field_names() {
        let link = SavedLink::new("https://example.com", "Example", "tools");
        let json = serde_json::to_value(&link).unwrap();

        assert_eq!(json["isPinned"], serde_json::json!(false));
        assert_eq!(json["createdAt"], serde_json::json!(link.created_at_millis()));
        assert!(json["id"].is_string());

        let back: SavedLink = serde_json::from_value(json).unwrap();
        assert_eq!(back, link);
    }

    #[test]
    fn test_deserialize_exported_record() {
        let json = r#"{
            "id": "0b6c3a4e-2f1d-4c8e-9a57-1f2e3d4c5b6a",
            "url": "https://rust-lang.org",
            "title": "Rust",
            "category": "read",
            "isPinned": true,
            "createdAt": 1700000000123
        }"#;

        let link: SavedLink = serde_json::from_str(json).unwrap();
        assert!(link.is_pinned);
        assert_eq!(link.created_at_millis(), 1_700_000_000_123);
    }

    #[test]
    fn test_category_lookup() {
        assert_eq!(CATEGORIES.len(), 5);
        assert_eq!(Category::find("work").unwrap().name, "Work");
        assert!(Category::is_known(DEFAULT_CATEGORY));
        assert!(!Category::is_known("misc"));
        assert_eq!(Category::valid_ids(), "work, ideas, read, tools, inbox");
    }
}
