//! Background Context
//!
//! The privileged, page-independent side of the coordination protocol. Owns
//! the tab enablement tracker, the menu state machine, the last-resort
//! context-info fallback, and the settings snapshot; drives the toolbar icon
//! and per-tab button state.
//!
//! All state here is mutated only by this context's own handlers. Handlers
//! run one at a time off a single event loop, but may interleave across
//! messages at await points, so state is left consistent after every awaited
//! step.

use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::action::{action_title, icon_path, ActionSurface};
use crate::bus::{Inbound, LoopbackBus};
use crate::config::Settings;
use crate::context::ContextInfoStore;
use crate::error::classify;
use crate::format::LinkFormat;
use crate::i18n::Localizer;
use crate::menu::{ClickInfo, MenuModel, MenuSurface};
use crate::protocol::{
    ContextInfoReply, CopyAction, CopyAllTabsRequest, CopyRequest, Message, MenuItemId,
    StatusPayload, TabLink,
};
use crate::tabs::{Tab, TabQuery, TabRegistry, TabTracker, TAB_ID_NONE};

/// Platform events delivered to the background event loop
#[derive(Debug)]
pub enum BackgroundEvent {
    /// A menu entry was activated on some tab
    MenuClicked {
        /// Click payload
        info: ClickInfo,
        /// The tab the click happened on
        tab: Tab,
    },
    /// The active tab changed
    TabActivated {
        /// Newly active tab
        tab_id: i64,
    },
    /// A tab finished updating (navigation, title change)
    TabUpdated {
        /// Updated tab id
        tab_id: i64,
        /// Updated tab state
        tab: Tab,
    },
    /// A tab was closed
    TabRemoved {
        /// Removed tab id
        tab_id: i64,
    },
    /// Persisted settings changed
    SettingsChanged(Settings),
    /// Stop the event loop
    Shutdown,
}

/// Collaborators the background context depends on
pub struct BackgroundDeps {
    /// Privileged tab registry
    pub registry: Arc<dyn TabRegistry>,
    /// Platform menu surface
    pub menu_surface: Arc<dyn MenuSurface>,
    /// Toolbar action surface
    pub action: Arc<dyn ActionSurface>,
    /// Message catalog
    pub localizer: Arc<dyn Localizer>,
    /// Bus for reaching content contexts and the popup
    pub bus: Arc<LoopbackBus>,
}

/// The privileged execution context
pub struct Background {
    registry: Arc<dyn TabRegistry>,
    menu_surface: Arc<dyn MenuSurface>,
    action: Arc<dyn ActionSurface>,
    localizer: Arc<dyn Localizer>,
    bus: Arc<LoopbackBus>,
    tracker: TabTracker,
    menu: MenuModel,
    store: ContextInfoStore,
    settings: Settings,
}

impl Background {
    /// Background context with the given collaborators and settings snapshot
    pub fn new(deps: BackgroundDeps, settings: Settings) -> Self {
        let menu = MenuModel::new(deps.localizer.as_ref());
        Self {
            registry: deps.registry,
            menu_surface: deps.menu_surface,
            action: deps.action,
            localizer: deps.localizer,
            bus: deps.bus,
            tracker: TabTracker::new(),
            menu,
            store: ContextInfoStore::background(),
            settings,
        }
    }

    /// Create the menu entry set and apply the initial icon state
    pub async fn startup(&mut self) -> crate::error::Result<()> {
        self.menu.create(self.menu_surface.as_ref()).await?;
        self.refresh_icon().await;
        info!("background context initialized");
        Ok(())
    }

    /// Whether any tracked tab is enabled
    pub fn global_enabled(&self) -> bool {
        self.tracker.global_enabled()
    }

    /// The menu model, for state inspection
    pub fn menu(&self) -> &MenuModel {
        &self.menu
    }

    /// The enablement tracker, for state inspection
    pub fn tracker(&self) -> &TabTracker {
        &self.tracker
    }

    /// Event loop: platform events and bus messages until shutdown
    pub async fn run(
        mut self,
        mut events: mpsc::Receiver<BackgroundEvent>,
        mut inbox: mpsc::Receiver<Inbound>,
    ) {
        loop {
            tokio::select! {
                maybe_event = events.recv() => {
                    match maybe_event {
                        Some(BackgroundEvent::Shutdown) | None => break,
                        Some(event) => self.handle_event(event).await,
                    }
                }
                maybe_inbound = inbox.recv() => {
                    match maybe_inbound {
                        Some(inbound) => self.handle_message(inbound).await,
                        None => break,
                    }
                }
            }
        }
        debug!("background context stopped");
    }

    /// Dispatch one platform event
    pub async fn handle_event(&mut self, event: BackgroundEvent) {
        match event {
            BackgroundEvent::MenuClicked { info, tab } => self.on_menu_clicked(info, tab).await,
            BackgroundEvent::TabActivated { tab_id } => self.handle_active_tab(tab_id).await,
            BackgroundEvent::TabUpdated { tab_id, tab } => {
                if tab.active {
                    self.handle_active_tab(tab_id).await;
                }
            }
            BackgroundEvent::TabRemoved { tab_id } => self.remove_enabled_tab(tab_id).await,
            BackgroundEvent::SettingsChanged(settings) => {
                self.settings = settings;
                self.refresh_icon().await;
            }
            BackgroundEvent::Shutdown => {}
        }
    }

    /// Dispatch one inbound message
    ///
    /// Each present key runs its handler to completion; a failing handler is
    /// logged and does not stop the others.
    pub async fn handle_message(&mut self, inbound: Inbound) {
        let Inbound { message, sender } = inbound;
        debug!(keys = ?message.keys(), "background message");

        if let Some(payload) = message.load {
            self.on_load(sender.tab.clone(), payload).await;
        }
        if let Some(payload) = message.keydown {
            self.store.replace(payload.info);
        }
        if let Some(payload) = message.mousedown {
            self.store.replace(payload.info);
        }
        if let Some(request) = message.execute_copy {
            self.bus
                .broadcast_popup(Message::execute_copy_popup(request))
                .await;
        }
        if let Some(request) = message.execute_copy_all_tabs {
            self.bus
                .broadcast_popup(Message::execute_copy_all_tabs_popup(request))
                .await;
        }
        if message.get_context_info.is_some() {
            let reply = Message::context_info(ContextInfoReply {
                info: self.store.snapshot(),
            });
            match sender.tab.as_ref().map(|t| t.id) {
                Some(tab_id) => {
                    if let Err(e) = self.bus.send_to_tab(tab_id, reply).await {
                        warn!(tab_id, error = %e, "context info reply failed");
                    }
                }
                None => self.bus.broadcast_popup(reply).await,
            }
        }
        if let Some(reply) = message.context_info {
            self.store.replace(reply.info.clone());
            self.bus.broadcast_popup(Message::context_info(reply)).await;
        }
    }

    /// A content context reported itself alive
    async fn on_load(&mut self, tab: Option<Tab>, payload: StatusPayload) {
        let Some(tab) = tab else {
            debug!("load signal without a sender tab");
            return;
        };
        let tab_id = tab.id;
        self.set_enabled_tab(tab_id, Some(&tab), payload.enabled)
            .await;
        self.handle_active_tab(tab_id).await;
    }

    /// Record a tab's enablement after verifying liveness
    ///
    /// Unknown or invalid tabs are a silent no-op.
    async fn set_enabled_tab(&mut self, tab_id: i64, tab: Option<&Tab>, enabled: bool) {
        let live = tab.is_some() || self.registry.get(tab_id).await.is_ok();
        if live {
            self.tracker.set_enabled(tab_id, enabled);
        } else {
            debug!(tab_id, "ignoring enablement for unknown tab");
        }
    }

    /// Re-sync toolbar button, icon, and menu for a tab
    async fn handle_active_tab(&mut self, tab_id: i64) {
        if self.registry.get(tab_id).await.is_err() {
            debug!(tab_id, "active-tab sync skipped for stale tab");
            return;
        }
        let global = self.tracker.global_enabled();
        if let Err(e) = self.action.set_tab_enabled(tab_id, global).await {
            warn!(error = %e, "toolbar button update failed");
        }
        self.refresh_icon().await;
        let enabled = self.tracker.enabled_for(tab_id);
        self.menu
            .set_all_enabled(self.menu_surface.as_ref(), enabled)
            .await;
    }

    /// Drop a closed tab and re-sync icon and menu for the now-active tab
    async fn remove_enabled_tab(&mut self, tab_id: i64) {
        if !self.tracker.remove(tab_id) {
            return;
        }
        self.refresh_icon().await;
        let active = self
            .registry
            .query(TabQuery {
                active: Some(true),
                ..TabQuery::default()
            })
            .await
            .into_iter()
            .next();
        if let Some(active) = active {
            let enabled = self.tracker.enabled_for(active.id);
            self.menu
                .set_all_enabled(self.menu_surface.as_ref(), enabled)
                .await;
        }
    }

    /// A menu entry was activated: resolve and dispatch the copy trigger
    async fn on_menu_clicked(&mut self, info: ClickInfo, tab: Tab) {
        let tab_id = tab.id;
        if tab_id < 0 || tab_id == TAB_ID_NONE {
            debug!("menu click without a real tab");
            return;
        }
        let menu_item_id: MenuItemId = match info.menu_item_id.parse() {
            Ok(id) => id,
            Err(e) => {
                debug!(error = %e, "ignoring unrecognized menu entry");
                return;
            }
        };

        let message = match menu_item_id.action {
            CopyAction::AllTabs => {
                let tabs = self.all_tab_links().await;
                Message::execute_copy_all_tabs(CopyAllTabsRequest { menu_item_id, tabs })
            }
            action => {
                let (content, title, url) =
                    self.resolve_click(action, menu_item_id.format, &info, &tab);
                Message::execute_copy(CopyRequest {
                    menu_item_id,
                    content,
                    title,
                    url,
                    prompt_user: self.settings.prompt_on_copy,
                })
            }
        };

        if let Err(e) = self.bus.send_to_tab(tab_id, message).await {
            warn!(tab_id, kind = ?classify(&e), error = %e, "copy trigger delivery failed");
        }
        // The fallback snapshot is consumed by the click either way
        self.store.init();
    }

    /// Resolve the copy triple from the click payload and stored fallback
    ///
    /// Link-action formats read the context snapshot; page/tab actions read
    /// the clicked tab. URL-only output carries the bare URL as content.
    fn resolve_click(
        &self,
        action: CopyAction,
        format: LinkFormat,
        info: &ClickInfo,
        tab: &Tab,
    ) -> (Option<String>, Option<String>, Option<String>) {
        let ctx = self.store.get();
        let selection = info.selection_text.clone().filter(|s| !s.is_empty());
        match (action, format) {
            (CopyAction::Link, LinkFormat::BBCodeUrl) => {
                (ctx.url.clone(), None, ctx.url.clone())
            }
            (CopyAction::Link, _) => (
                selection
                    .or_else(|| ctx.content.clone())
                    .or_else(|| ctx.title.clone()),
                ctx.title.clone(),
                ctx.url.clone(),
            ),
            (_, LinkFormat::BBCodeUrl) => (tab.url.clone(), None, tab.url.clone()),
            _ => (
                selection.or_else(|| tab.title.clone()),
                tab.title.clone(),
                tab.url.clone(),
            ),
        }
    }

    /// Snapshot every tab of the current window, in window tab order
    async fn all_tab_links(&self) -> Vec<TabLink> {
        self.registry
            .query(TabQuery {
                current_window: Some(true),
                ..TabQuery::default()
            })
            .await
            .into_iter()
            .map(|tab| TabLink {
                id: tab.id,
                content: tab.title.clone(),
                title: tab.title,
                url: tab.url,
            })
            .collect()
    }

    async fn refresh_icon(&self) {
        let enabled = self.tracker.global_enabled();
        let path = icon_path(self.settings.icon_variant, enabled);
        let name = self
            .localizer
            .message("extensionName")
            .unwrap_or_else(|| "LinkClip".to_string());
        if let Err(e) = self.action.set_icon(&path).await {
            warn!(error = %e, "icon update failed");
        }
        if let Err(e) = self.action.set_title(&action_title(&name)).await {
            warn!(error = %e, "toolbar title update failed");
        }
    }
}

impl std::fmt::Debug for Background {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Background")
            .field("tracker", &self.tracker)
            .field("settings", &self.settings)
            .finish()
    }
}
