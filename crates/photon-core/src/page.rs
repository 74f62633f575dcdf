//! Generic list envelope shared by every collection endpoint.

use serde::{Deserialize, Serialize};

/// One page of a list response: `{items, nextPageLink, previousPageLink}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    /// Items on this page, in server order
    pub items: Vec<T>,
    /// Link to the following page; empty or absent on the last page
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_page_link: Option<String>,
    /// Link to the preceding page
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub previous_page_link: Option<String>,
}

impl<T> Page<T> {
    /// Create a final page holding `items`.
    #[must_use]
    pub fn new(items: Vec<T>) -> Self {
        Self {
            items,
            next_page_link: None,
            previous_page_link: None,
        }
    }

    /// Set the next-page link.
    #[must_use]
    pub fn with_next_page_link(mut self, link: impl Into<String>) -> Self {
        self.next_page_link = Some(link.into());
        self
    }

    /// The next-page link, treating an empty string as absent.
    #[must_use]
    pub fn next_link(&self) -> Option<&str> {
        self.next_page_link
            .as_deref()
            .filter(|link| !link.trim().is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn empty_next_link_ends_pagination() {
        let page: Page<u32> = serde_json::from_value(json!({
            "items": [1, 2],
            "nextPageLink": "",
            "previousPageLink": ""
        }))
        .unwrap();
        assert_eq!(page.items, vec![1, 2]);
        assert!(page.next_link().is_none());
    }

    #[test]
    fn missing_links_are_allowed() {
        let page: Page<String> = serde_json::from_value(json!({"items": ["a"]})).unwrap();
        assert!(page.next_link().is_none());
        assert!(page.previous_page_link.is_none());
    }

    #[test]
    fn next_link_is_exposed() {
        let page = Page::new(vec![1]).with_next_page_link("/deployments?pageLink=p2");
        assert_eq!(page.next_link(), Some("/deployments?pageLink=p2"));
    }

    #[test]
    fn items_are_required() {
        assert!(serde_json::from_value::<Page<u32>>(json!({"nextPageLink": ""})).is_err());
    }
}
