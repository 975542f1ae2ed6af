//! Headless Collaborator Implementations
//!
//! In-memory stand-ins for the privileged platform surfaces, used by the
//! host binary's scripted sessions and by the integration tests. They record
//! every interaction so coordination behavior stays observable without a
//! real browser around the core.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::{Mutex, RwLock};

use crate::action::ActionSurface;
use crate::clipboard::ClipboardSink;
use crate::content::UserPrompt;
use crate::error::{Error, Result};
use crate::menu::{MenuEntry, MenuSurface};
use crate::tabs::{Tab, TabQuery, TabRegistry};

/// In-memory tab registry preserving window tab order
#[derive(Debug, Default)]
pub struct MemoryTabRegistry {
    tabs: RwLock<Vec<Tab>>,
}

impl MemoryTabRegistry {
    /// Empty registry
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Append a tab at the end of the window order
    pub fn insert(&self, tab: Tab) {
        self.tabs.write().push(tab);
    }

    /// Close a tab
    pub fn remove(&self, tab_id: i64) {
        self.tabs.write().retain(|t| t.id != tab_id);
    }

    /// Make one tab the active tab
    pub fn activate(&self, tab_id: i64) {
        for tab in self.tabs.write().iter_mut() {
            tab.active = tab.id == tab_id;
        }
    }
}

#[async_trait]
impl TabRegistry for MemoryTabRegistry {
    async fn get(&self, tab_id: i64) -> Result<Tab> {
        self.tabs
            .read()
            .iter()
            .find(|t| t.id == tab_id)
            .cloned()
            .ok_or(Error::StaleTab(tab_id))
    }

    async fn query(&self, filter: TabQuery) -> Vec<Tab> {
        self.tabs
            .read()
            .iter()
            .filter(|t| filter.active.map_or(true, |want| t.active == want))
            .cloned()
            .collect()
    }
}

/// One recorded menu surface interaction
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MenuOp {
    /// Entry creation
    Create {
        /// Entry id
        id: String,
        /// Owning root, `None` for roots
        parent_id: Option<String>,
        /// Initial enablement
        enabled: bool,
    },
    /// Enablement update
    Update {
        /// Entry id
        id: String,
        /// New enablement
        enabled: bool,
    },
}

/// Menu surface that records every create and update
#[derive(Debug, Default)]
pub struct RecordingMenuSurface {
    ops: Mutex<Vec<MenuOp>>,
}

impl RecordingMenuSurface {
    /// Fresh surface
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// All recorded operations, in order
    pub fn ops(&self) -> Vec<MenuOp> {
        self.ops.lock().clone()
    }

    /// Number of created entries
    pub fn created_count(&self) -> usize {
        self.ops
            .lock()
            .iter()
            .filter(|op| matches!(op, MenuOp::Create { .. }))
            .count()
    }

    /// Last enablement pushed for an entry, if any
    pub fn last_enabled(&self, entry_id: &str) -> Option<bool> {
        self.ops.lock().iter().rev().find_map(|op| match op {
            MenuOp::Create { id, enabled, .. } | MenuOp::Update { id, enabled }
                if id == entry_id =>
            {
                Some(*enabled)
            }
            _ => None,
        })
    }
}

#[async_trait]
impl MenuSurface for RecordingMenuSurface {
    async fn create(&self, entry: &MenuEntry) -> Result<()> {
        self.ops.lock().push(MenuOp::Create {
            id: entry.id.clone(),
            parent_id: entry.parent_id.clone(),
            enabled: entry.enabled,
        });
        Ok(())
    }

    async fn update(&self, id: &str, enabled: bool) -> Result<()> {
        self.ops.lock().push(MenuOp::Update {
            id: id.to_string(),
            enabled,
        });
        Ok(())
    }
}

/// Toolbar surface that keeps the latest pushed state
#[derive(Debug, Default)]
pub struct RecordingActionSurface {
    icon: Mutex<Option<String>>,
    title: Mutex<Option<String>>,
    tab_buttons: Mutex<HashMap<i64, bool>>,
}

impl RecordingActionSurface {
    /// Fresh surface
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Last icon path set
    pub fn icon(&self) -> Option<String> {
        self.icon.lock().clone()
    }

    /// Last title set
    pub fn title(&self) -> Option<String> {
        self.title.lock().clone()
    }

    /// Last per-tab button state set
    pub fn tab_button(&self, tab_id: i64) -> Option<bool> {
        self.tab_buttons.lock().get(&tab_id).copied()
    }
}

#[async_trait]
impl ActionSurface for RecordingActionSurface {
    async fn set_icon(&self, path: &str) -> Result<()> {
        *self.icon.lock() = Some(path.to_string());
        Ok(())
    }

    async fn set_title(&self, title: &str) -> Result<()> {
        *self.title.lock() = Some(title.to_string());
        Ok(())
    }

    async fn set_tab_enabled(&self, tab_id: i64, enabled: bool) -> Result<()> {
        self.tab_buttons.lock().insert(tab_id, enabled);
        Ok(())
    }
}

/// Clipboard sink that captures writes instead of touching the system
#[derive(Debug, Default)]
pub struct CapturingClipboard {
    writes: Mutex<Vec<String>>,
}

impl CapturingClipboard {
    /// Fresh sink
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// All captured writes, oldest first
    pub fn writes(&self) -> Vec<String> {
        self.writes.lock().clone()
    }

    /// Most recent write, if any
    pub fn last(&self) -> Option<String> {
        self.writes.lock().last().cloned()
    }
}

impl ClipboardSink for CapturingClipboard {
    fn write_text(&self, text: &str) -> Result<()> {
        self.writes.lock().push(text.to_string());
        Ok(())
    }
}

/// Scripted prompt behavior
#[derive(Debug, Clone)]
enum PromptBehavior {
    AcceptDefault,
    Reply(String),
    Cancel,
}

/// User prompt that answers from a script instead of a dialog
#[derive(Debug)]
pub struct ScriptedPrompt {
    behavior: PromptBehavior,
}

impl ScriptedPrompt {
    /// Always accept the offered default text
    pub fn accept_default() -> Self {
        Self {
            behavior: PromptBehavior::AcceptDefault,
        }
    }

    /// Always reply with fixed text
    pub fn reply(text: &str) -> Self {
        Self {
            behavior: PromptBehavior::Reply(text.to_string()),
        }
    }

    /// Always cancel
    pub fn cancel() -> Self {
        Self {
            behavior: PromptBehavior::Cancel,
        }
    }
}

#[async_trait]
impl UserPrompt for ScriptedPrompt {
    async fn prompt(&self, _message: &str, default_value: &str) -> Option<String> {
        match &self.behavior {
            PromptBehavior::AcceptDefault => Some(default_value.to_string()),
            PromptBehavior::Reply(text) => Some(text.clone()),
            PromptBehavior::Cancel => None,
        }
    }
}
