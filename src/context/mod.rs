//! Context Info Store
//!
//! Holds the most recently observed "what is under the pointer / what is
//! focused" snapshot for one execution context. Each context owns exactly one
//! store; a snapshot is consumed by at most one copy action and the store is
//! reset afterwards.
//!
//! The two context kinds reset differently: a content store falls back to the
//! title/URL of its own document (it can always see the live page), while the
//! background store clears to the all-`None` snapshot (it has no page of its
//! own and only keeps a last-resort fallback).

use serde::{Deserialize, Serialize};

/// Snapshot of the element or page a copy action would apply to
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContextInfo {
    /// Whether the snapshot points at a hyperlink
    pub is_link: bool,
    /// Link text (or page title when not a link)
    pub content: Option<String>,
    /// Anchor title attribute, falling back to the link text
    pub title: Option<String>,
    /// Absolute URL of the link or page
    pub url: Option<String>,
}

impl ContextInfo {
    /// The all-`None` snapshot
    pub fn cleared() -> Self {
        Self::default()
    }

    /// Page-level snapshot carrying the document title and URL
    pub fn page_fallback(title: &str, url: &str) -> Self {
        Self {
            is_link: false,
            content: Some(title.to_string()),
            title: Some(title.to_string()),
            url: Some(url.to_string()),
        }
    }

    /// `is_link` implies a URL is present
    pub fn is_consistent(&self) -> bool {
        !self.is_link || self.url.is_some()
    }
}

/// Reset policy for a store
#[derive(Debug, Clone)]
enum ResetMode {
    /// Background: clear to the all-`None` snapshot
    Clear,
    /// Content: fall back to the owning document
    PageFallback { title: String, url: String },
}

/// Single-snapshot store with an owner-specific reset policy
#[derive(Debug, Clone)]
pub struct ContextInfoStore {
    info: ContextInfo,
    reset: ResetMode,
}

impl ContextInfoStore {
    /// Store for the background context
    pub fn background() -> Self {
        Self {
            info: ContextInfo::cleared(),
            reset: ResetMode::Clear,
        }
    }

    /// Store for a content context owning the given document
    pub fn content(doc_title: &str, doc_url: &str) -> Self {
        let reset = ResetMode::PageFallback {
            title: doc_title.to_string(),
            url: doc_url.to_string(),
        };
        let mut store = Self {
            info: ContextInfo::cleared(),
            reset,
        };
        store.init();
        store
    }

    /// Reset to the owner's default snapshot and return it
    pub fn init(&mut self) -> &ContextInfo {
        self.info = match &self.reset {
            ResetMode::Clear => ContextInfo::cleared(),
            ResetMode::PageFallback { title, url } => ContextInfo::page_fallback(title, url),
        };
        &self.info
    }

    /// Fully overwrite the snapshot (no partial merge)
    pub fn replace(&mut self, info: ContextInfo) {
        self.info = info;
    }

    /// Current snapshot
    pub fn get(&self) -> &ContextInfo {
        &self.info
    }

    /// Owned copy of the current snapshot
    pub fn snapshot(&self) -> ContextInfo {
        self.info.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_background_init_clears() {
        let mut store = ContextInfoStore::background();
        store.replace(ContextInfo {
            is_link: true,
            content: Some("x".into()),
            title: Some("x".into()),
            url: Some("http://x".into()),
        });
        store.init();
        assert_eq!(store.get(), &ContextInfo::cleared());
    }

    #[test]
    fn test_content_init_uses_page_fallback() {
        let mut store = ContextInfoStore::content("Example", "http://example.com/");
        store.replace(ContextInfo {
            is_link: true,
            content: Some("a link".into()),
            title: Some("a link".into()),
            url: Some("http://elsewhere".into()),
        });
        let info = store.init().clone();
        assert!(!info.is_link);
        assert_eq!(info.content.as_deref(), Some("Example"));
        assert_eq!(info.title.as_deref(), Some("Example"));
        assert_eq!(info.url.as_deref(), Some("http://example.com/"));
    }

    #[test]
    fn test_double_init_is_idempotent() {
        let mut background = ContextInfoStore::background();
        let first = background.init().clone();
        let second = background.init().clone();
        assert_eq!(first, second);

        let mut content = ContextInfoStore::content("T", "http://t");
        let first = content.init().clone();
        let second = content.init().clone();
        assert_eq!(first, second);
    }

    #[test]
    fn test_replace_is_full_overwrite() {
        let mut store = ContextInfoStore::content("T", "http://t");
        store.replace(ContextInfo {
            is_link: true,
            content: None,
            title: None,
            url: Some("http://a".into()),
        });
        // No field survives from the previous snapshot
        assert_eq!(store.get().content, None);
        assert_eq!(store.get().title, None);
        assert_eq!(store.get().url.as_deref(), Some("http://a"));
    }

    #[test]
    fn test_link_snapshot_consistency() {
        let info = ContextInfo {
            is_link: true,
            content: Some("c".into()),
            title: Some("t".into()),
            url: Some("http://x".into()),
        };
        assert!(info.is_consistent());

        let broken = ContextInfo {
            is_link: true,
            url: None,
            ..ContextInfo::cleared()
        };
        assert!(!broken.is_consistent());
    }
}
