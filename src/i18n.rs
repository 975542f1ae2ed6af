//! Message Catalog Lookup
//!
//! Narrow interface over localized strings. The coordination core only ever
//! asks for a handful of keys; a missing key falls back to a caller-supplied
//! default.

/// Localized message lookup
pub trait Localizer: Send + Sync {
    /// Resolve a message key, `None` if the catalog has no entry
    fn message(&self, key: &str) -> Option<String>;
}

/// Built-in English catalog
#[derive(Debug, Clone, Copy, Default)]
pub struct EnglishCatalog;

impl Localizer for EnglishCatalog {
    fn message(&self, key: &str) -> Option<String> {
        let text = match key {
            "extensionName" => "LinkClip",
            "copyPageURL" => "Copy Page URL",
            "copyLinkURL" => "Copy Link URL",
            "copyTabURL" => "Copy Tab URL",
            "copyAllTabsURL" => "Copy All Tab URLs",
            "userInput" => "Input Title",
            _ => return None,
        };
        Some(text.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_keys_resolve() {
        let catalog = EnglishCatalog;
        assert_eq!(catalog.message("copyPageURL").as_deref(), Some("Copy Page URL"));
        assert_eq!(catalog.message("userInput").as_deref(), Some("Input Title"));
    }

    #[test]
    fn test_unknown_key_is_none() {
        assert!(EnglishCatalog.message("noSuchKey").is_none());
    }
}
