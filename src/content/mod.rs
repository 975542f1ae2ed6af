//! Content Context
//!
//! One instance per open page. Observes document events, keeps the
//! authoritative context-info snapshot for its page, reports liveness and
//! snapshots to the background, and executes copy triggers: format engine,
//! optional user-input override, one-shot clipboard write.
//!
//! The context suspends only at message sends and at the user prompt; a
//! prompt left open stalls this page's copy action and nothing else.

pub mod dom;

use std::sync::Arc;
use std::sync::LazyLock;

use async_trait::async_trait;
use regex::Regex;
use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::bus::ContentPort;
use crate::clipboard::{ClipboardSink, ClipboardWriter};
use crate::context::ContextInfoStore;
use crate::error::Result;
use crate::format::{render_link, render_tab_list};
use crate::i18n::Localizer;
use crate::protocol::{
    ContextInfoReply, CopyAllTabsRequest, CopyRequest, Message, StatusPayload,
};
use self::dom::{create_context_info, Document, NodeId};

/// Default prompt label when the catalog has no entry
const USER_INPUT_FALLBACK: &str = "Input Title";

/// Secondary (context-menu) mouse button
pub const MOUSE_BUTTON_RIGHT: u8 = 2;

static COPYABLE_DOCUMENT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:(?:application/(?:[\w.-]+\+)?|image/[\w.-]+\+)xml|text/(?:html|xml))$")
        .expect("static pattern compiles")
});

/// Whether copy actions apply to a document of this content type
///
/// Only HTML/XML-family documents qualify.
pub fn is_copyable_document(content_type: &str) -> bool {
    COPYABLE_DOCUMENT.is_match(content_type)
}

/// Whether a mouse button opens the context menu
pub fn is_context_mouse_button(button: u8) -> bool {
    button == MOUSE_BUTTON_RIGHT
}

/// Key event as observed by the page
#[derive(Debug, Clone, Default)]
pub struct KeyEvent {
    /// Key value
    pub key: String,
    /// Alt held
    pub alt: bool,
    /// Shift held
    pub shift: bool,
}

impl KeyEvent {
    /// Whether this combination can lead to a copy action
    ///
    /// The copy accelerator, Shift+F10, and the ContextMenu key qualify.
    pub fn is_copy_trigger(&self) -> bool {
        (self.alt && self.shift && self.key == "C")
            || (self.shift && self.key == "F10")
            || self.key == "ContextMenu"
    }
}

/// Page event kinds reported to the background
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageEventKind {
    /// Document finished loading
    Load,
    /// Qualifying key event
    Keydown,
    /// Qualifying mouse event
    Mousedown,
}

/// User-input override surface
#[async_trait]
pub trait UserPrompt: Send + Sync {
    /// Ask the user for replacement text; `None` means cancelled
    async fn prompt(&self, message: &str, default_value: &str) -> Option<String>;
}

/// The per-page execution context
pub struct ContentContext {
    doc: Document,
    store: ContextInfoStore,
    port: ContentPort,
    prompt: Arc<dyn UserPrompt>,
    writer: ClipboardWriter,
    localizer: Arc<dyn Localizer>,
}

impl ContentContext {
    /// Context for a document, wired to the bus through its port
    pub fn new(
        doc: Document,
        port: ContentPort,
        prompt: Arc<dyn UserPrompt>,
        sink: Arc<dyn ClipboardSink>,
        localizer: Arc<dyn Localizer>,
    ) -> Self {
        let store = ContextInfoStore::content(&doc.title, &doc.url);
        Self {
            doc,
            store,
            port,
            prompt,
            writer: ClipboardWriter::new(sink),
            localizer,
        }
    }

    /// Current context-info snapshot
    pub fn snapshot(&self) -> crate::context::ContextInfo {
        self.store.snapshot()
    }

    /// Observe a qualifying page event against a target node
    ///
    /// Rebuilds the snapshot from the target and reports it, with the
    /// document's copy eligibility, to the background.
    pub async fn observe(&mut self, kind: PageEventKind, target: NodeId) -> Result<()> {
        let enabled = is_copyable_document(&self.doc.content_type);
        let info = create_context_info(&self.doc, target);
        self.store.replace(info.clone());

        let payload = StatusPayload { enabled, info };
        let message = match kind {
            PageEventKind::Load => Message::load(payload),
            PageEventKind::Keydown => Message::keydown(payload),
            PageEventKind::Mousedown => Message::mousedown(payload),
        };
        self.port.send(message).await
    }

    /// Observe a key event, reporting only qualifying combinations
    pub async fn observe_keydown(&mut self, event: &KeyEvent, target: NodeId) -> Result<()> {
        if event.is_copy_trigger() {
            self.observe(PageEventKind::Keydown, target).await
        } else {
            Ok(())
        }
    }

    /// Observe a mouse event, reporting only the context-menu button
    pub async fn observe_mousedown(&mut self, button: u8, target: NodeId) -> Result<()> {
        if is_context_mouse_button(button) {
            self.observe(PageEventKind::Mousedown, target).await
        } else {
            Ok(())
        }
    }

    /// Dispatch an inbound message
    ///
    /// Each present key runs its handler; a failing handler is logged and
    /// does not stop the rest.
    pub async fn handle_message(&mut self, message: Message) {
        if let Some(request) = message.execute_copy {
            if let Err(e) = self.on_execute_copy(request).await {
                warn!(error = %e, "executeCopy handler failed");
            }
        }
        if let Some(request) = message.execute_copy_all_tabs {
            if let Err(e) = self.on_execute_copy_all_tabs(request).await {
                warn!(error = %e, "executeCopyAllTabs handler failed");
            }
        }
        if message.get_context_info.is_some() {
            let reply = Message::context_info(ContextInfoReply {
                info: self.store.snapshot(),
            });
            if let Err(e) = self.port.send(reply).await {
                warn!(error = %e, "context info reply failed");
            }
        }
    }

    /// Consume the inbox until the bus side closes
    pub async fn run(mut self, mut inbox: mpsc::Receiver<Message>) {
        while let Some(message) = inbox.recv().await {
            self.handle_message(message).await;
        }
        debug!("content context stopped");
    }

    async fn on_execute_copy(&mut self, request: CopyRequest) -> Result<()> {
        let text = self.build_copy_text(&request).await;
        let outcome = match &text {
            Some(text) => self.writer.copy(text),
            None => {
                debug!(id = %request.menu_item_id, "nothing to copy");
                Ok(())
            }
        };
        // The snapshot is consumed whether or not anything was written
        self.store.init();
        outcome
    }

    async fn on_execute_copy_all_tabs(&mut self, request: CopyAllTabsRequest) -> Result<()> {
        let text = render_tab_list(request.menu_item_id.format, &request.tabs);
        let outcome = match &text {
            Some(text) => self.writer.copy(text),
            None => Ok(()),
        };
        self.store.init();
        outcome
    }

    /// Resolve the final text for a single-link copy
    ///
    /// Request fields win; the local snapshot fills gaps. The user-input
    /// override applies to content-bearing formats when requested, and a
    /// cancelled prompt abandons the copy.
    async fn build_copy_text(&self, request: &CopyRequest) -> Option<String> {
        let stored = self.store.get();
        let format = request.menu_item_id.format;

        let fallback_content = if format.prompts_for_content() {
            stored.content.clone().or_else(|| stored.title.clone())
        } else {
            stored.url.clone()
        };
        let content = request.content.clone().or(fallback_content);
        let title = request.title.clone().or_else(|| stored.title.clone());
        let url = request.url.clone().or_else(|| stored.url.clone());

        let content = if request.prompt_user && format.prompts_for_content() {
            let label = self
                .localizer
                .message("userInput")
                .unwrap_or_else(|| USER_INPUT_FALLBACK.to_string());
            self.prompt
                .prompt(&label, content.as_deref().unwrap_or(""))
                .await?
        } else {
            return render_link(format, content.as_deref(), title.as_deref(), url.as_deref());
        };

        render_link(format, Some(&content), title.as_deref(), url.as_deref())
    }
}

impl std::fmt::Debug for ContentContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ContentContext")
            .field("url", &self.doc.url)
            .field("store", &self.store)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bus::LoopbackBus;
    use crate::format::LinkFormat;
    use crate::headless::{CapturingClipboard, ScriptedPrompt};
    use crate::i18n::EnglishCatalog;
    use crate::protocol::{CopyAction, MenuItemId, TabLink};
    use crate::tabs::Tab;
    use super::dom::{Href, Node};

    fn sample_doc() -> (Document, NodeId) {
        let mut doc = Document::new("Example Page", "http://example.com/", "text/html");
        let body = doc.append(doc.root(), Node::element("body"));
        let anchor = doc.append(
            body,
            Node::anchor("Example link", Href::Plain("http://example.com/a".into())),
        );
        (doc, anchor)
    }

    struct Fixture {
        content: ContentContext,
        clipboard: Arc<CapturingClipboard>,
        background_rx: mpsc::Receiver<crate::bus::Inbound>,
        anchor: NodeId,
    }

    fn fixture(prompt: ScriptedPrompt) -> Fixture {
        let (doc, anchor) = sample_doc();
        let bus = LoopbackBus::new();
        let background_rx = bus.register_background(8);
        let tab = Tab {
            id: 1,
            title: Some("Example Page".into()),
            url: Some("http://example.com/".into()),
            active: true,
        };
        let (port, _inbox) = bus.attach_content(tab, 8);
        let clipboard = Arc::new(CapturingClipboard::default());
        let content = ContentContext::new(
            doc,
            port,
            Arc::new(prompt),
            clipboard.clone(),
            Arc::new(EnglishCatalog),
        );
        Fixture {
            content,
            clipboard,
            background_rx,
            anchor,
        }
    }

    fn copy_request(format: LinkFormat, prompt_user: bool) -> CopyRequest {
        CopyRequest {
            menu_item_id: MenuItemId::new(CopyAction::Page, format),
            content: Some("Example Page".into()),
            title: Some("Example Page".into()),
            url: Some("http://example.com/".into()),
            prompt_user,
        }
    }

    #[test]
    fn test_copyable_document_types() {
        assert!(is_copyable_document("text/html"));
        assert!(is_copyable_document("text/xml"));
        assert!(is_copyable_document("application/xml"));
        assert!(is_copyable_document("application/xhtml+xml"));
        assert!(is_copyable_document("image/svg+xml"));

        assert!(!is_copyable_document("application/pdf"));
        assert!(!is_copyable_document("text/plain"));
        assert!(!is_copyable_document("image/png"));
    }

    #[test]
    fn test_key_triggers() {
        let accel = KeyEvent {
            key: "C".into(),
            alt: true,
            shift: true,
        };
        assert!(accel.is_copy_trigger());

        let menu_key = KeyEvent {
            key: "ContextMenu".into(),
            ..KeyEvent::default()
        };
        assert!(menu_key.is_copy_trigger());

        let shift_f10 = KeyEvent {
            key: "F10".into(),
            shift: true,
            ..KeyEvent::default()
        };
        assert!(shift_f10.is_copy_trigger());

        let plain_c = KeyEvent {
            key: "C".into(),
            ..KeyEvent::default()
        };
        assert!(!plain_c.is_copy_trigger());
    }

    #[test]
    fn test_mouse_trigger() {
        assert!(is_context_mouse_button(MOUSE_BUTTON_RIGHT));
        assert!(!is_context_mouse_button(0));
    }

    #[tokio::test]
    async fn test_observe_reports_status() {
        let mut fx = fixture(ScriptedPrompt::accept_default());
        let anchor = fx.anchor;
        fx.content
            .observe(PageEventKind::Load, anchor)
            .await
            .unwrap();

        let inbound = fx.background_rx.recv().await.unwrap();
        let payload = inbound.message.load.unwrap();
        assert!(payload.enabled);
        assert!(payload.info.is_link);
        assert_eq!(payload.info.url.as_deref(), Some("http://example.com/a"));
        assert_eq!(inbound.sender.tab.unwrap().id, 1);
    }

    #[tokio::test]
    async fn test_non_trigger_events_stay_silent() {
        let mut fx = fixture(ScriptedPrompt::accept_default());
        let target = fx.content.doc.root();
        fx.content
            .observe_keydown(
                &KeyEvent {
                    key: "C".into(),
                    ..KeyEvent::default()
                },
                target,
            )
            .await
            .unwrap();
        fx.content.observe_mousedown(0, target).await.unwrap();

        assert!(fx.background_rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_execute_copy_writes_clipboard() {
        let mut fx = fixture(ScriptedPrompt::accept_default());
        fx.content
            .handle_message(Message::execute_copy(copy_request(LinkFormat::Text, false)))
            .await;

        assert_eq!(
            fx.clipboard.last().as_deref(),
            Some("Example Page <http://example.com/>")
        );
    }

    #[tokio::test]
    async fn test_prompt_override_replaces_content() {
        let mut fx = fixture(ScriptedPrompt::reply("My Title"));
        fx.content
            .handle_message(Message::execute_copy(copy_request(LinkFormat::Text, true)))
            .await;

        assert_eq!(
            fx.clipboard.last().as_deref(),
            Some("My Title <http://example.com/>")
        );
    }

    #[tokio::test]
    async fn test_cancelled_prompt_abandons_copy_but_resets() {
        let mut fx = fixture(ScriptedPrompt::cancel());
        // Seed a non-default snapshot so the reset is observable
        let anchor = fx.anchor;
        fx.content
            .observe(PageEventKind::Mousedown, anchor)
            .await
            .unwrap();
        assert!(fx.content.snapshot().is_link);

        fx.content
            .handle_message(Message::execute_copy(copy_request(LinkFormat::Text, true)))
            .await;

        assert!(fx.clipboard.last().is_none());
        assert!(!fx.content.snapshot().is_link);
        assert_eq!(
            fx.content.snapshot().content.as_deref(),
            Some("Example Page")
        );
    }

    #[tokio::test]
    async fn test_bbcode_url_never_prompts() {
        // A cancelling prompt would abandon the copy if it were consulted
        let mut fx = fixture(ScriptedPrompt::cancel());
        fx.content
            .handle_message(Message::execute_copy(copy_request(
                LinkFormat::BBCodeUrl,
                true,
            )))
            .await;

        assert_eq!(
            fx.clipboard.last().as_deref(),
            Some("[url]http://example.com/[/url]")
        );
    }

    #[tokio::test]
    async fn test_missing_request_fields_fall_back_to_snapshot() {
        let mut fx = fixture(ScriptedPrompt::accept_default());
        let request = CopyRequest {
            menu_item_id: MenuItemId::new(CopyAction::Page, LinkFormat::Markdown),
            content: None,
            title: None,
            url: None,
            prompt_user: false,
        };
        fx.content
            .handle_message(Message::execute_copy(request))
            .await;

        assert_eq!(
            fx.clipboard.last().as_deref(),
            Some("[Example Page](http://example.com/ \"Example Page\")")
        );
    }

    #[tokio::test]
    async fn test_all_tabs_copy_bypasses_prompt() {
        let mut fx = fixture(ScriptedPrompt::cancel());
        let request = CopyAllTabsRequest {
            menu_item_id: MenuItemId::new(CopyAction::AllTabs, LinkFormat::Text),
            tabs: vec![
                TabLink {
                    id: 1,
                    title: Some("One".into()),
                    url: Some("http://one/".into()),
                    content: Some("One".into()),
                },
                TabLink {
                    id: 2,
                    title: Some("Two".into()),
                    url: Some("http://two/".into()),
                    content: Some("Two".into()),
                },
            ],
        };
        fx.content
            .handle_message(Message::execute_copy_all_tabs(request))
            .await;

        assert_eq!(
            fx.clipboard.last().as_deref(),
            Some("One <http://one/>\nTwo <http://two/>")
        );
    }

    #[tokio::test]
    async fn test_get_context_info_replies_with_snapshot() {
        let mut fx = fixture(ScriptedPrompt::accept_default());
        fx.content
            .handle_message(Message::get_context_info())
            .await;

        let inbound = fx.background_rx.recv().await.unwrap();
        let reply = inbound.message.context_info.unwrap();
        assert_eq!(reply.info.content.as_deref(), Some("Example Page"));
    }
}
