//! # linkclip
//!
//! Cross-context coordination broker for copying page, link, and tab URLs
//! to the clipboard as formatted text (HTML anchor, Markdown, BBCode, plain
//! text).
//!
//! The system is split across two isolated execution contexts that never
//! share memory and talk only through asynchronous message passing:
//!
//! - **Background context** - privileged, page-independent; owns the tab
//!   enablement tracker, the context-menu state machine, and the last-resort
//!   context-info fallback.
//! - **Content contexts** - one per open page; observe the document, own the
//!   authoritative context-info snapshot, run the format engine, and write
//!   the clipboard.
//!
//! # Architecture
//!
//! ```text
//! Content context                 Bus                  Background context
//! ━━━━━━━━━━━━━━━                 ━━━                  ━━━━━━━━━━━━━━━━━━
//!
//! pointer/key event
//!   └─> ContextInfoStore ──> load/keydown/mousedown ──> TabTracker
//!                                                         ├─> MenuModel
//!                                                         └─> ActionSurface
//!
//! menu activation ──────────────> executeCopy <────── click resolution
//!   └─> FormatEngine                                  (click payload +
//!         └─> ClipboardWriter                          context-info fallback)
//! ```
//!
//! # Data Flow
//!
//! **Status path:** document event → content snapshot → background tracker →
//! menu + icon state.
//!
//! **Copy path:** menu click → background resolution → `executeCopy` to the
//! originating content context → format engine → one-shot clipboard write.
//!
//! All cross-context payloads are immutable serde values; the in-process
//! [`bus::LoopbackBus`] deep-copies every message through its wire form so
//! the two sides can never observe shared state.

#![warn(missing_docs)]
#![warn(clippy::all)]

/// Toolbar action surface: icon path selection and per-tab availability
pub mod action;

/// Background context: event loop, message routing, click resolution
pub mod background;

/// In-process message bus connecting the two context kinds
pub mod bus;

/// Clipboard writer with one-shot copy interception
pub mod clipboard;

/// Configuration and persisted settings
pub mod config;

/// Content context: document observation, format execution, clipboard
pub mod content;

/// Context-info snapshots ("what is under the pointer")
pub mod context;

/// Error types shared across the crate
pub mod error;

/// Link format engine (pure text generation)
pub mod format;

/// Headless collaborator implementations for the host binary and tests
pub mod headless;

/// Message catalog lookup
pub mod i18n;

/// Context-menu model and state machine
pub mod menu;

/// Cross-context message contract
pub mod protocol;

/// Tab registry interface and per-tab enablement tracking
pub mod tabs;

pub use error::{Error, Result};
