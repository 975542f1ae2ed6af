//! Link Format Engine
//!
//! Pure text generation: a format kind plus a `(content, title, url)` triple
//! in, final clipboard text out. No state, no IO.
//!
//! A missing component (`None`) makes the affected function return `None`;
//! callers treat that as "nothing to copy" rather than an error.

use serde::{Deserialize, Serialize};

use crate::protocol::TabLink;

/// Output format for a generated link
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LinkFormat {
    /// HTML anchor: `<a href="..." title="...">...</a>`
    Html,
    /// Markdown inline link: `[...](... "...")`
    Markdown,
    /// BBCode with link text: `[url=...]...[/url]`
    BBCodeText,
    /// BBCode, URL only: `[url]...[/url]`
    BBCodeUrl,
    /// Plain text: `... <...>`
    Text,
}

impl LinkFormat {
    /// All format kinds, in menu order
    pub const ALL: [LinkFormat; 5] = [
        LinkFormat::Html,
        LinkFormat::Markdown,
        LinkFormat::BBCodeText,
        LinkFormat::BBCodeUrl,
        LinkFormat::Text,
    ];

    /// Wire suffix used in menu item ids
    pub fn wire_suffix(self) -> &'static str {
        match self {
            LinkFormat::Html => "HTML",
            LinkFormat::Markdown => "Markdown",
            LinkFormat::BBCodeText => "BBCodeText",
            LinkFormat::BBCodeUrl => "BBCodeURL",
            LinkFormat::Text => "Text",
        }
    }

    /// Parse a wire suffix back into a format kind
    pub fn from_wire_suffix(suffix: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|f| f.wire_suffix() == suffix)
    }

    /// Human-readable menu entry title
    pub fn menu_title(self) -> &'static str {
        match self {
            LinkFormat::Html => "HTML",
            LinkFormat::Markdown => "Markdown",
            LinkFormat::BBCodeText => "BBCode (Text)",
            LinkFormat::BBCodeUrl => "BBCode (URL)",
            LinkFormat::Text => "Text",
        }
    }

    /// Whether the user-input override applies to this format
    ///
    /// URL-only output has no content component to override.
    pub fn prompts_for_content(self) -> bool {
        !matches!(self, LinkFormat::BBCodeUrl)
    }
}

/// HTML anchor, with `"` in the title escaped as `&quot;`
pub fn html_anchor(
    content: Option<&str>,
    title: Option<&str>,
    url: Option<&str>,
) -> Option<String> {
    let (content, title, url) = (content?, title?, url?);
    let title = title.replace('"', "&quot;");
    Some(format!(
        "<a href=\"{}\" title=\"{}\">{}</a>",
        url,
        title,
        content.trim()
    ))
}

/// Markdown inline link, with `"` in the title backslash-escaped
pub fn markdown_link(
    content: Option<&str>,
    title: Option<&str>,
    url: Option<&str>,
) -> Option<String> {
    let (content, title, url) = (content?, title?, url?);
    let title = title.replace('"', "\\\"");
    Some(format!("[{}]({} \"{}\")", content.trim(), url, title))
}

/// BBCode link carrying the content as link text
pub fn bbcode_text_link(content: Option<&str>, url: Option<&str>) -> Option<String> {
    let (content, url) = (content?, url?);
    Some(format!("[url={}]{}[/url]", url, content.trim()))
}

/// BBCode link carrying only the URL
pub fn bbcode_url_link(url: Option<&str>) -> Option<String> {
    Some(format!("[url]{}[/url]", url?))
}

/// Plain text link: content followed by the URL in angle brackets
pub fn text_link(content: Option<&str>, url: Option<&str>) -> Option<String> {
    let (content, url) = (content?, url?);
    Some(format!("{} <{}>", content.trim(), url))
}

/// Render one link in the requested format
pub fn render_link(
    format: LinkFormat,
    content: Option<&str>,
    title: Option<&str>,
    url: Option<&str>,
) -> Option<String> {
    match format {
        LinkFormat::Html => html_anchor(content, title, url),
        LinkFormat::Markdown => markdown_link(content, title, url),
        LinkFormat::BBCodeText => bbcode_text_link(content, url),
        LinkFormat::BBCodeUrl => bbcode_url_link(url),
        LinkFormat::Text => text_link(content, url),
    }
}

/// Render the aggregate tab list, one link per line, in the given order
///
/// Tabs whose fields do not produce a link are skipped; an empty result
/// yields `None`.
pub fn render_tab_list(format: LinkFormat, tabs: &[TabLink]) -> Option<String> {
    let lines: Vec<String> = tabs
        .iter()
        .filter_map(|tab| {
            render_link(
                format,
                tab.content.as_deref(),
                tab.title.as_deref(),
                tab.url.as_deref(),
            )
        })
        .collect();
    if lines.is_empty() {
        None
    } else {
        Some(lines.join("\n"))
    }
}
