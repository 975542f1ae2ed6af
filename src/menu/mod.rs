//! Context-Menu State Machine
//!
//! Owns the fixed entry set: one root per copy action, five format children
//! per root. Entries are created exactly once at startup, disabled; after
//! that they are only ever mutated, never destroyed. Enablement transitions
//! apply to every entry in one batch so the whole menu always reflects a
//! single enabled value.
//!
//! Surface filters (page / link / tab strip) are assigned at creation and
//! never toggled at runtime.

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::error::Result;
use crate::format::LinkFormat;
use crate::i18n::Localizer;
use crate::protocol::{CopyAction, MenuItemId};

/// Surfaces a menu entry can appear on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuContext {
    /// Every surface
    All,
    /// Hyperlink context only
    Link,
    /// Tab-strip context only
    Tab,
}

/// Static surface filter for a root action
pub fn contexts_for(action: CopyAction) -> &'static [MenuContext] {
    match action {
        CopyAction::Page => &[MenuContext::All],
        CopyAction::Link => &[MenuContext::Link],
        CopyAction::Tab | CopyAction::AllTabs => &[MenuContext::Tab],
    }
}

/// A single actionable menu entry
#[derive(Debug, Clone)]
pub struct MenuEntry {
    /// Unique entry id
    pub id: String,
    /// Owning root entry, `None` for roots
    pub parent_id: Option<String>,
    /// Surfaces this entry appears on
    pub contexts: &'static [MenuContext],
    /// Display title
    pub title: String,
    /// Current enablement
    pub enabled: bool,
}

/// Platform menu surface
#[async_trait]
pub trait MenuSurface: Send + Sync {
    /// Create an entry
    async fn create(&self, entry: &MenuEntry) -> Result<()>;

    /// Update an entry's enablement
    async fn update(&self, id: &str, enabled: bool) -> Result<()>;
}

/// Click info delivered with a menu activation
#[derive(Debug, Clone, Default)]
pub struct ClickInfo {
    /// Id of the activated entry
    pub menu_item_id: String,
    /// Page selection at click time, if any
    pub selection_text: Option<String>,
}

/// The full entry set and its shared enablement state
#[derive(Debug)]
pub struct MenuModel {
    entries: Vec<MenuEntry>,
    created: bool,
}

impl MenuModel {
    /// Build the entry set: 4 roots, 5 format children each, all disabled
    pub fn new(localizer: &dyn Localizer) -> Self {
        let mut entries = Vec::with_capacity(24);
        for action in CopyAction::ALL {
            let root_id = action.wire_prefix().to_string();
            let title = localizer
                .message(action.wire_prefix())
                .unwrap_or_else(|| root_id.clone());
            let contexts = contexts_for(action);
            entries.push(MenuEntry {
                id: root_id.clone(),
                parent_id: None,
                contexts,
                title,
                enabled: false,
            });
            for format in LinkFormat::ALL {
                entries.push(MenuEntry {
                    id: MenuItemId::new(action, format).wire_id(),
                    parent_id: Some(root_id.clone()),
                    contexts,
                    title: format.menu_title().to_string(),
                    enabled: false,
                });
            }
        }
        Self {
            entries,
            created: false,
        }
    }

    /// Create every entry on the surface, once
    ///
    /// A second call is a no-op; the entry set is never re-created.
    pub async fn create(&mut self, surface: &dyn MenuSurface) -> Result<()> {
        if self.created {
            debug!("menu entries already created, skipping");
            return Ok(());
        }
        for entry in &self.entries {
            surface.create(entry).await?;
        }
        self.created = true;
        debug!(entries = self.entries.len(), "menu entries created");
        Ok(())
    }

    /// Transition every entry to the given enablement in one batch
    ///
    /// A surface failure on one entry is logged and does not stop the rest;
    /// the model keeps the requested state either way.
    pub async fn set_all_enabled(&mut self, surface: &dyn MenuSurface, enabled: bool) {
        for entry in &mut self.entries {
            entry.enabled = enabled;
            if let Err(e) = surface.update(&entry.id, enabled).await {
                warn!(id = %entry.id, error = %e, "menu entry update failed");
            }
        }
    }

    /// All entries (roots and children)
    pub fn entries(&self) -> &[MenuEntry] {
        &self.entries
    }

    /// Leaf entries only
    pub fn leaf_entries(&self) -> impl Iterator<Item = &MenuEntry> {
        self.entries.iter().filter(|e| e.parent_id.is_some())
    }

    /// Whether every entry currently has the given enablement
    pub fn all_enabled_eq(&self, enabled: bool) -> bool {
        self.entries.iter().all(|e| e.enabled == enabled)
    }
}
