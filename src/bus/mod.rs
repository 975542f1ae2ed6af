//! In-Process Message Bus
//!
//! The substrate connecting the background context, per-tab content
//! contexts, and an optional popup listener. Delivery is asynchronous with
//! no ordering guarantee across distinct sends, and every message is pushed
//! through its serialized wire form so no payload can smuggle shared state
//! across the context boundary.
//!
//! A send to a context that no longer exists is a transport failure; callers
//! log and swallow it.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;
use tokio::sync::mpsc;
use tracing::debug;

use crate::error::{Error, Result};
use crate::protocol::{Message, MessageSender};
use crate::tabs::Tab;

/// A message addressed to the background inbox, with its stamped origin
#[derive(Debug)]
pub struct Inbound {
    /// The delivered message
    pub message: Message,
    /// Who sent it
    pub sender: MessageSender,
}

/// Sending handle for one content context
///
/// Stamps the owning tab onto every message so the background can attribute
/// the sender, the way a privileged runtime stamps `sender.tab`.
#[derive(Debug, Clone)]
pub struct ContentPort {
    bus: Arc<LoopbackBus>,
    tab: Tab,
}

impl ContentPort {
    /// The tab this port belongs to
    pub fn tab(&self) -> &Tab {
        &self.tab
    }

    /// Deliver a message to the background inbox
    pub async fn send(&self, message: Message) -> Result<()> {
        self.bus
            .send_to_background(
                message,
                MessageSender {
                    tab: Some(self.tab.clone()),
                },
            )
            .await
    }
}

/// Loopback bus wiring the two context kinds together in one process
#[derive(Debug, Default)]
pub struct LoopbackBus {
    background_tx: RwLock<Option<mpsc::Sender<Inbound>>>,
    tab_inboxes: RwLock<HashMap<i64, mpsc::Sender<Message>>>,
    popup_tx: RwLock<Option<mpsc::Sender<Message>>>,
}

impl LoopbackBus {
    /// Fresh bus with no registered contexts
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Register the background inbox, replacing any previous registration
    pub fn register_background(&self, capacity: usize) -> mpsc::Receiver<Inbound> {
        let (tx, rx) = mpsc::channel(capacity);
        *self.background_tx.write() = Some(tx);
        rx
    }

    /// Attach a content context for a tab
    ///
    /// Returns the context's sending port and its inbox.
    pub fn attach_content(
        self: &Arc<Self>,
        tab: Tab,
        capacity: usize,
    ) -> (ContentPort, mpsc::Receiver<Message>) {
        let (tx, rx) = mpsc::channel(capacity);
        self.tab_inboxes.write().insert(tab.id, tx);
        let port = ContentPort {
            bus: Arc::clone(self),
            tab,
        };
        (port, rx)
    }

    /// Detach a tab's content context, if attached
    pub fn detach_content(&self, tab_id: i64) {
        self.tab_inboxes.write().remove(&tab_id);
    }

    /// Register the popup inbox, replacing any previous registration
    pub fn register_popup(&self, capacity: usize) -> mpsc::Receiver<Message> {
        let (tx, rx) = mpsc::channel(capacity);
        *self.popup_tx.write() = Some(tx);
        rx
    }

    /// Deliver a message to the background inbox
    pub async fn send_to_background(
        &self,
        message: Message,
        sender: MessageSender,
    ) -> Result<()> {
        let tx = self.background_tx.read().clone();
        let tx = tx.ok_or_else(|| Error::Transport("background context not running".into()))?;
        let message = reserialize(message)?;
        tx.send(Inbound { message, sender })
            .await
            .map_err(|_| Error::ChannelSend)
    }

    /// Deliver a message to one tab's content context
    pub async fn send_to_tab(&self, tab_id: i64, message: Message) -> Result<()> {
        let tx = self.tab_inboxes.read().get(&tab_id).cloned();
        let tx = tx.ok_or_else(|| {
            Error::Transport(format!("no content context for tab {tab_id}"))
        })?;
        let message = reserialize(message)?;
        tx.send(message).await.map_err(|_| Error::ChannelSend)
    }

    /// Best-effort delivery to the popup listener
    ///
    /// An absent or closed popup is normal and never an error.
    pub async fn broadcast_popup(&self, message: Message) {
        let tx = self.popup_tx.read().clone();
        let Some(tx) = tx else {
            debug!(keys = ?message.keys(), "no popup listener for broadcast");
            return;
        };
        let Ok(message) = reserialize(message) else {
            return;
        };
        if tx.send(message).await.is_err() {
            debug!("popup listener went away");
        }
    }
}

/// Deep-copy a message through its wire form
fn reserialize(message: Message) -> Result<Message> {
    let wire = serde_json::to_value(&message)
        .map_err(|e| Error::Transport(format!("encode failed: {e}")))?;
    serde_json::from_value(wire).map_err(|e| Error::Transport(format!("decode failed: {e}")))
}
