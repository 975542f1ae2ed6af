//! linkclip - cross-context link copy broker
//!
//! Entry point for the host binary. Runs a scripted headless session: one
//! background context, three content contexts, a link copy and an all-tabs
//! copy, printing what would have landed on the clipboard.

use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use tokio::sync::mpsc;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use linkclip::background::{Background, BackgroundDeps, BackgroundEvent};
use linkclip::bus::LoopbackBus;
use linkclip::config::{Config, IconVariant, Settings, SettingsStore};
use linkclip::content::dom::{Document, Href, Node};
use linkclip::content::{ContentContext, PageEventKind};
use linkclip::headless::{
    CapturingClipboard, MemoryTabRegistry, RecordingActionSurface, RecordingMenuSurface,
    ScriptedPrompt,
};
use linkclip::i18n::EnglishCatalog;
use linkclip::menu::ClickInfo;
use linkclip::tabs::{Tab, TabRegistry};

/// Command-line arguments for linkclip
#[derive(Parser, Debug)]
#[command(name = "linkclip")]
#[command(version, about = "Cross-context link copy broker", long_about = None)]
pub struct Args {
    /// Configuration file path
    #[arg(short, long, default_value = "linkclip.toml")]
    pub config: String,

    /// Verbose logging (can be specified multiple times)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Log format (json|pretty|compact)
    #[arg(long, env = "LINKCLIP_LOG_FORMAT", default_value = "compact")]
    pub log_format: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    init_logging(&args)?;

    info!(
        "linkclip v{} ({} {})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_DATE")
    );

    let config = Config::load(&args.config).unwrap_or_else(|e| {
        tracing::warn!("Failed to load config: {}, using defaults", e);
        Config::default()
    });
    config.validate()?;

    run_scripted_session(config).await
}

/// Drive a full coordination round trip without a browser
async fn run_scripted_session(config: Config) -> Result<()> {
    let capacity = config.broker.channel_capacity;

    let bus = LoopbackBus::new();
    let registry = MemoryTabRegistry::new();
    let menu_surface = RecordingMenuSurface::new();
    let action = RecordingActionSurface::new();
    let clipboard = CapturingClipboard::new();
    let localizer = Arc::new(EnglishCatalog);

    let mut background = Background::new(
        BackgroundDeps {
            registry: registry.clone(),
            menu_surface: menu_surface.clone(),
            action: action.clone(),
            localizer: localizer.clone(),
            bus: bus.clone(),
        },
        config.settings,
    );
    background.startup().await?;

    let (event_tx, event_rx) = mpsc::channel(capacity);
    let inbox = bus.register_background(capacity);
    let background_task = tokio::spawn(background.run(event_rx, inbox));

    // Three open tabs; the second one carries a link we will copy
    let tabs = [
        ("Rust Language", "https://www.rust-lang.org/"),
        ("Example Domain", "https://example.com/"),
        ("Crates", "https://crates.io/"),
    ];
    let mut contexts = Vec::new();
    for (index, (title, url)) in tabs.iter().enumerate() {
        let id = index as i64 + 1;
        let active = id == 2;
        let tab = Tab {
            id,
            title: Some(title.to_string()),
            url: Some(url.to_string()),
            active,
        };
        registry.insert(tab.clone());

        let mut doc = Document::new(title, url, "text/html");
        let body = doc.append(doc.root(), Node::element("body"));
        let anchor = doc.append(
            body,
            Node::anchor(
                "More information...",
                Href::Plain("https://www.iana.org/domains/example".into()),
            ),
        );

        let (port, rx) = bus.attach_content(tab, capacity);
        let mut content = ContentContext::new(
            doc,
            port,
            Arc::new(ScriptedPrompt::accept_default()),
            clipboard.clone(),
            localizer.clone(),
        );
        content.observe(PageEventKind::Load, anchor).await?;
        contexts.push((content, rx, anchor));
    }

    // A right-click on the link in tab 2, then the Markdown link menu entry
    let (content, rx, anchor) = &mut contexts[1];
    content.observe(PageEventKind::Mousedown, *anchor).await?;
    event_tx
        .send(BackgroundEvent::MenuClicked {
            info: ClickInfo {
                menu_item_id: "copyLinkURLMarkdown".into(),
                selection_text: None,
            },
            tab: registry.get(2).await?,
        })
        .await?;
    if let Some(message) = rx.recv().await {
        content.handle_message(message).await;
    }
    println!(
        "link copy      → {}",
        clipboard.last().unwrap_or_else(|| "<nothing>".into())
    );

    // All tabs as plain text, issued from the same tab
    event_tx
        .send(BackgroundEvent::MenuClicked {
            info: ClickInfo {
                menu_item_id: "copyAllTabsURLText".into(),
                selection_text: None,
            },
            tab: registry.get(2).await?,
        })
        .await?;
    if let Some(message) = rx.recv().await {
        content.handle_message(message).await;
    }
    println!("all tabs copy  →");
    if let Some(text) = clipboard.last() {
        for line in text.lines() {
            println!("  {line}");
        }
    }

    // Settings change at runtime: the background re-applies the icon
    let settings_store = SettingsStore::new(config.settings);
    let mut settings_rx = settings_store.subscribe();
    let settings_tx = event_tx.clone();
    let settings_task = tokio::spawn(async move {
        while settings_rx.changed().await.is_ok() {
            let settings = *settings_rx.borrow_and_update();
            if settings_tx
                .send(BackgroundEvent::SettingsChanged(settings))
                .await
                .is_err()
            {
                break;
            }
        }
    });
    settings_store.update(Settings {
        icon_variant: IconVariant::Color,
        ..config.settings
    });
    tokio::time::sleep(std::time::Duration::from_millis(50)).await;
    println!(
        "icon           → {}",
        action.icon().unwrap_or_else(|| "<unset>".into())
    );

    event_tx.send(BackgroundEvent::Shutdown).await?;
    background_task.await?;
    settings_task.abort();

    info!("scripted session complete");
    Ok(())
}

fn init_logging(args: &Args) -> Result<()> {
    let log_level = match args.verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(format!("linkclip={log_level},warn")));

    match args.log_format.as_str() {
        "json" => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        }
        "pretty" => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().pretty())
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().compact())
                .init();
        }
    }

    Ok(())
}
