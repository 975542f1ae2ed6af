//! Cross-Context Message Contract
//!
//! Messages between the background and content contexts are multi-key
//! objects: the present field names are the event keys, any subset of keys
//! may coexist in one message, and each present key is dispatched to its
//! handler independently. An absent or unrecognized key is a silent no-op.
//!
//! All payloads are immutable serde values; nothing here carries handles or
//! shared state across the context boundary.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::context::ContextInfo;
use crate::error::Error;
use crate::format::LinkFormat;
use crate::tabs::Tab;

/// Root copy action a menu entry belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CopyAction {
    /// Copy the current page
    Page,
    /// Copy the hyperlink under the pointer
    Link,
    /// Copy the clicked tab
    Tab,
    /// Copy every open tab in the current window
    AllTabs,
}

impl CopyAction {
    /// All actions, in menu order
    pub const ALL: [CopyAction; 4] = [
        CopyAction::Page,
        CopyAction::Link,
        CopyAction::Tab,
        CopyAction::AllTabs,
    ];

    /// Wire prefix used in menu item ids (doubles as the title catalog key)
    pub fn wire_prefix(self) -> &'static str {
        match self {
            CopyAction::Page => "copyPageURL",
            CopyAction::Link => "copyLinkURL",
            CopyAction::Tab => "copyTabURL",
            CopyAction::AllTabs => "copyAllTabsURL",
        }
    }
}

/// Identifier of one leaf menu entry: a root action plus a format kind
///
/// Serialized as the concatenated wire id, e.g. `copyLinkURLMarkdown`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MenuItemId {
    /// Root action
    pub action: CopyAction,
    /// Output format
    pub format: LinkFormat,
}

impl MenuItemId {
    /// Pair an action with a format
    pub fn new(action: CopyAction, format: LinkFormat) -> Self {
        Self { action, format }
    }

    /// Concatenated wire id
    pub fn wire_id(self) -> String {
        format!("{}{}", self.action.wire_prefix(), self.format.wire_suffix())
    }
}

impl fmt::Display for MenuItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.wire_id())
    }
}

impl FromStr for MenuItemId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        for action in CopyAction::ALL {
            if let Some(rest) = s.strip_prefix(action.wire_prefix()) {
                if let Some(format) = LinkFormat::from_wire_suffix(rest) {
                    return Ok(Self { action, format });
                }
            }
        }
        Err(Error::UnknownMenuItem(s.to_string()))
    }
}

impl Serialize for MenuItemId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.wire_id())
    }
}

impl<'de> Deserialize<'de> for MenuItemId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Status observation sent by a content context on page events
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusPayload {
    /// Whether the reporting document supports copy actions
    pub enabled: bool,
    /// Snapshot taken against the event target
    pub info: ContextInfo,
}

/// Copy trigger for a single page, link, or tab (background → content)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CopyRequest {
    /// Activated menu entry
    pub menu_item_id: MenuItemId,
    /// Resolved link text, if the background could determine one
    pub content: Option<String>,
    /// Resolved title
    pub title: Option<String>,
    /// Resolved URL
    pub url: Option<String>,
    /// Whether the content context should offer the user-input override
    pub prompt_user: bool,
}

/// One tab's link data inside the all-tabs aggregate
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TabLink {
    /// Tab identifier
    pub id: i64,
    /// Tab title
    pub title: Option<String>,
    /// Tab URL
    pub url: Option<String>,
    /// Link text (the tab title at capture time)
    pub content: Option<String>,
}

/// Copy trigger for the aggregate tab list (background → content)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CopyAllTabsRequest {
    /// Activated menu entry (the format component drives rendering)
    pub menu_item_id: MenuItemId,
    /// Tabs of the current window, in window tab order
    pub tabs: Vec<TabLink>,
}

/// Reply payload for a context-info pull
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContextInfoReply {
    /// The responding store's current snapshot
    pub info: ContextInfo,
}

/// Multi-key runtime message
///
/// Every field is one event key under its wire name; any subset may be
/// present. Unknown keys on the wire are ignored during deserialization.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Message {
    /// Content context came alive (register tab, re-sync menu and icon)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub load: Option<StatusPayload>,

    /// Pointer-adjacent key event observed (refresh background fallback)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub keydown: Option<StatusPayload>,

    /// Secondary mouse button observed (refresh background fallback)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mousedown: Option<StatusPayload>,

    /// Execute a single-link copy
    #[serde(
        rename = "executeCopy",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub execute_copy: Option<CopyRequest>,

    /// Execute the aggregate tab-list copy
    #[serde(
        rename = "executeCopyAllTabs",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub execute_copy_all_tabs: Option<CopyAllTabsRequest>,

    /// Popup mirror of an `executeCopy`
    #[serde(
        rename = "executeCopyPopup",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub execute_copy_popup: Option<CopyRequest>,

    /// Popup mirror of an `executeCopyAllTabs`
    #[serde(
        rename = "executeCopyAllTabsPopup",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub execute_copy_all_tabs_popup: Option<CopyAllTabsRequest>,

    /// Pull the receiver's current context-info snapshot
    #[serde(
        rename = "getContextInfo",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub get_context_info: Option<bool>,

    /// Context-info snapshot reply
    #[serde(
        rename = "contextInfo",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub context_info: Option<ContextInfoReply>,
}

impl Message {
    /// Message carrying a `load` observation
    pub fn load(payload: StatusPayload) -> Self {
        Self {
            load: Some(payload),
            ..Self::default()
        }
    }

    /// Message carrying a `keydown` observation
    pub fn keydown(payload: StatusPayload) -> Self {
        Self {
            keydown: Some(payload),
            ..Self::default()
        }
    }

    /// Message carrying a `mousedown` observation
    pub fn mousedown(payload: StatusPayload) -> Self {
        Self {
            mousedown: Some(payload),
            ..Self::default()
        }
    }

    /// Message carrying an `executeCopy` trigger
    pub fn execute_copy(request: CopyRequest) -> Self {
        Self {
            execute_copy: Some(request),
            ..Self::default()
        }
    }

    /// Message carrying an `executeCopyAllTabs` trigger
    pub fn execute_copy_all_tabs(request: CopyAllTabsRequest) -> Self {
        Self {
            execute_copy_all_tabs: Some(request),
            ..Self::default()
        }
    }

    /// Popup mirror of an `executeCopy`
    pub fn execute_copy_popup(request: CopyRequest) -> Self {
        Self {
            execute_copy_popup: Some(request),
            ..Self::default()
        }
    }

    /// Popup mirror of an `executeCopyAllTabs`
    pub fn execute_copy_all_tabs_popup(request: CopyAllTabsRequest) -> Self {
        Self {
            execute_copy_all_tabs_popup: Some(request),
            ..Self::default()
        }
    }

    /// Context-info pull request
    pub fn get_context_info() -> Self {
        Self {
            get_context_info: Some(true),
            ..Self::default()
        }
    }

    /// Context-info reply
    pub fn context_info(reply: ContextInfoReply) -> Self {
        Self {
            context_info: Some(reply),
            ..Self::default()
        }
    }

    /// Whether no recognized key is present
    pub fn is_empty(&self) -> bool {
        self.keys().is_empty()
    }

    /// Names of the present keys, for diagnostics
    pub fn keys(&self) -> Vec<&'static str> {
        let mut keys = Vec::new();
        if self.load.is_some() {
            keys.push("load");
        }
        if self.keydown.is_some() {
            keys.push("keydown");
        }
        if self.mousedown.is_some() {
            keys.push("mousedown");
        }
        if self.execute_copy.is_some() {
            keys.push("executeCopy");
        }
        if self.execute_copy_all_tabs.is_some() {
            keys.push("executeCopyAllTabs");
        }
        if self.execute_copy_popup.is_some() {
            keys.push("executeCopyPopup");
        }
        if self.execute_copy_all_tabs_popup.is_some() {
            keys.push("executeCopyAllTabsPopup");
        }
        if self.get_context_info.is_some() {
            keys.push("getContextInfo");
        }
        if self.context_info.is_some() {
            keys.push("contextInfo");
        }
        keys
    }
}

/// Identity of a message's origin, stamped by the bus
#[derive(Debug, Clone, Default)]
pub struct MessageSender {
    /// Originating tab, when the sender is a content context
    pub tab: Option<Tab>,
}
