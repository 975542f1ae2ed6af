//! Tab Registry Interface and Enablement Tracking
//!
//! The background context keeps a map of "this tab's content context is alive
//! and reachable" flags, keyed by stringified positive tab id. The global
//! enabled flag is a pure recomputation over that map (logical OR) and is
//! never stored independently, so it cannot drift from the tracker.

use std::collections::HashMap;

use async_trait::async_trait;

use crate::error::Result;

/// Sentinel id meaning "no tab"
pub const TAB_ID_NONE: i64 = -1;

/// Stringify a positive integer id
///
/// Zero, negative values, and the sentinel are not valid tracker keys and
/// yield `None`.
pub fn stringify_positive_int(id: i64) -> Option<String> {
    (id > 0).then(|| id.to_string())
}

/// A live tab as reported by the registry
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Tab {
    /// Tab identifier
    pub id: i64,
    /// Tab title
    pub title: Option<String>,
    /// Tab URL
    pub url: Option<String>,
    /// Whether this tab is the active one in its window
    pub active: bool,
}

/// Filter for registry queries
#[derive(Debug, Clone, Copy, Default)]
pub struct TabQuery {
    /// Only the active tab
    pub active: Option<bool>,
    /// Only tabs of the current window
    pub current_window: Option<bool>,
}

/// Privileged tab registry surface
#[async_trait]
pub trait TabRegistry: Send + Sync {
    /// Look up a live tab; fails for ids that do not refer to one
    async fn get(&self, tab_id: i64) -> Result<Tab>;

    /// Enumerate tabs matching the filter, in window tab order
    async fn query(&self, filter: TabQuery) -> Vec<Tab>;
}

/// Per-tab enablement map
#[derive(Debug, Default)]
pub struct TabTracker {
    enabled: HashMap<String, bool>,
}

impl TabTracker {
    /// Empty tracker
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the enablement of a tab's content context
    ///
    /// Invalid ids (zero, negative, sentinel) are never inserted; returns
    /// whether the map was touched.
    pub fn set_enabled(&mut self, tab_id: i64, enabled: bool) -> bool {
        match stringify_positive_int(tab_id) {
            Some(key) => {
                self.enabled.insert(key, enabled);
                true
            }
            None => false,
        }
    }

    /// Drop a tab's entry; returns whether an entry was actually deleted
    pub fn remove(&mut self, tab_id: i64) -> bool {
        stringify_positive_int(tab_id)
            .map(|key| self.enabled.remove(&key).is_some())
            .unwrap_or(false)
    }

    /// Enablement recorded for a tab, defaulting to false when unknown
    pub fn enabled_for(&self, tab_id: i64) -> bool {
        stringify_positive_int(tab_id)
            .and_then(|key| self.enabled.get(&key).copied())
            .unwrap_or(false)
    }

    /// Global enabled flag: OR over all tracked tabs, recomputed on demand
    pub fn global_enabled(&self) -> bool {
        self.enabled.values().any(|enabled| *enabled)
    }

    /// Number of tracked tabs
    pub fn len(&self) -> usize {
        self.enabled.len()
    }

    /// Whether no tab is tracked
    pub fn is_empty(&self) -> bool {
        self.enabled.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_enable_then_disable_drives_global_flag() {
        let mut tracker = TabTracker::new();
        assert!(!tracker.global_enabled());

        assert!(tracker.set_enabled(5, true));
        assert!(tracker.global_enabled());

        assert!(tracker.set_enabled(5, false));
        assert!(!tracker.global_enabled());
        assert_eq!(tracker.len(), 1);
    }

    #[test]
    fn test_global_flag_is_or_over_entries() {
        let mut tracker = TabTracker::new();
        tracker.set_enabled(1, false);
        tracker.set_enabled(2, true);
        tracker.set_enabled(3, false);
        assert!(tracker.global_enabled());

        tracker.set_enabled(2, false);
        assert!(!tracker.global_enabled());
    }

    #[test]
    fn test_remove_recomputes_global_flag() {
        let mut tracker = TabTracker::new();
        tracker.set_enabled(7, true);
        assert!(tracker.global_enabled());

        assert!(tracker.remove(7));
        assert!(!tracker.global_enabled());
        assert!(tracker.is_empty());
    }

    #[test]
    fn test_remove_absent_tab_is_noop() {
        let mut tracker = TabTracker::new();
        tracker.set_enabled(1, true);

        assert!(!tracker.remove(99));
        assert_eq!(tracker.len(), 1);
        assert!(tracker.global_enabled());
    }

    #[test]
    fn test_invalid_ids_are_never_inserted() {
        let mut tracker = TabTracker::new();
        assert!(!tracker.set_enabled(0, true));
        assert!(!tracker.set_enabled(-3, true));
        assert!(!tracker.set_enabled(TAB_ID_NONE, true));
        assert!(tracker.is_empty());
        assert!(!tracker.global_enabled());

        assert!(!tracker.remove(TAB_ID_NONE));
        assert!(!tracker.enabled_for(TAB_ID_NONE));
    }

    #[test]
    fn test_sparse_ids_are_supported() {
        let mut tracker = TabTracker::new();
        tracker.set_enabled(3, true);
        tracker.set_enabled(40_000_017, true);
        assert!(tracker.enabled_for(40_000_017));
        assert!(!tracker.enabled_for(4));
        assert_eq!(tracker.len(), 2);
    }

    #[test]
    fn test_stringify_positive_int() {
        assert_eq!(stringify_positive_int(12).as_deref(), Some("12"));
        assert_eq!(stringify_positive_int(0), None);
        assert_eq!(stringify_positive_int(-1), None);
    }
}
