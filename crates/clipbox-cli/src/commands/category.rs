//! Category command handlers

use anyhow::Result;

use clipbox_core::{Category, LinkStore, SavedLink, CATEGORIES};

use crate::output::Output;

/// List the fixed categories with the number of links in each
pub fn list(store: &LinkStore, output: &Output) -> Result<()> {
    let links = store.try_get_all_links()?;
    let counts = count_by_category(&links);
    output.print_categories(&counts);
    Ok(())
}

fn count_by_category(links: &[SavedLink]) -> Vec<(&'static Category, usize)> {
    CATEGORIES
        .iter()
        .map(|category| {
            let count = links.iter().filter(|l| l.category == category.id).count();
            (category, count)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_count_by_category() {
        let links = vec![
            SavedLink::new("https://a.com", "A", "work"),
            SavedLink::new("https://b.com", "B", "work"),
            SavedLink::new("https://c.com", "C", "inbox"),
        ];

        let counts = count_by_category(&links);
        assert_eq!(counts.len(), CATEGORIES.len());

        let get = |id: &str| counts.iter().find(|(c, _)| c.id == id).map(|(_, n)| *n);
        assert_eq!(get("work"), Some(2));
        assert_eq!(get("inbox"), Some(1));
        assert_eq!(get("read"), Some(0));
    }

    #[test]
    fn test_count_keeps_category_order() {
        let counts = count_by_category(&[]);
        let ids: Vec<_> = counts.iter().map(|(c, _)| c.id).collect();
        assert_eq!(ids, vec!["work", "ideas", "read", "tools", "inbox"]);
    }
}
