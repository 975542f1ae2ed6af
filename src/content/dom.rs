//! Minimal Document Model
//!
//! Content contexts observe pointer and key events against a node tree. This
//! model carries exactly what anchor resolution needs: local names, text,
//! title attributes, and resolved hrefs. Hrefs are absolute by the time they
//! reach this layer, the way a live DOM exposes them.

use crate::context::ContextInfo;

/// Index of a node within its document
pub type NodeId = usize;

/// Href attribute value
///
/// Anchors inside SVG expose an animated string pair instead of a plain
/// value; resolution unwraps it to the base value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Href {
    /// Plain string href
    Plain(String),
    /// SVG animated href
    SvgAnimated {
        /// The base (unanimated) value
        base_val: String,
    },
}

impl Href {
    /// The effective string value
    pub fn as_str(&self) -> &str {
        match self {
            Href::Plain(value) => value,
            Href::SvgAnimated { base_val } => base_val,
        }
    }
}

/// One element node
#[derive(Debug, Clone, Default)]
pub struct Node {
    /// Lowercase element name
    pub local_name: String,
    /// Visible text content
    pub text: String,
    /// Title attribute, if set
    pub title: Option<String>,
    /// Href attribute, if set
    pub href: Option<Href>,
    parent: Option<NodeId>,
}

impl Node {
    /// Element with a name and no other attributes
    pub fn element(local_name: &str) -> Self {
        Self {
            local_name: local_name.to_string(),
            ..Self::default()
        }
    }

    /// Anchor element with text and an href
    pub fn anchor(text: &str, href: Href) -> Self {
        Self {
            local_name: "a".to_string(),
            text: text.to_string(),
            href: Some(href),
            ..Self::default()
        }
    }

    /// Set the title attribute
    pub fn with_title(mut self, title: &str) -> Self {
        self.title = Some(title.to_string());
        self
    }
}

/// A document: metadata plus an element tree rooted at the document element
#[derive(Debug, Clone)]
pub struct Document {
    /// Document title
    pub title: String,
    /// Document URL
    pub url: String,
    /// MIME content type
    pub content_type: String,
    nodes: Vec<Node>,
}

impl Document {
    /// New document containing only its root element
    pub fn new(title: &str, url: &str, content_type: &str) -> Self {
        Self {
            title: title.to_string(),
            url: url.to_string(),
            content_type: content_type.to_string(),
            nodes: vec![Node::element("html")],
        }
    }

    /// The document element
    pub fn root(&self) -> NodeId {
        0
    }

    /// Append a node under a parent, returning its id
    pub fn append(&mut self, parent: NodeId, mut node: Node) -> NodeId {
        node.parent = Some(parent);
        self.nodes.push(node);
        self.nodes.len() - 1
    }

    /// Look up a node
    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id)
    }

    /// Find the closest anchor at or above a node
    ///
    /// Walks the ancestor chain up to, but excluding, the document root;
    /// nodes hanging directly off the root are outside the walk.
    pub fn find_anchor(&self, start: NodeId) -> Option<NodeId> {
        let root = self.root();
        let mut current = start;
        loop {
            let node = self.nodes.get(current)?;
            let parent = node.parent?;
            if parent == root {
                return None;
            }
            if node.local_name == "a" {
                return Some(current);
            }
            current = parent;
        }
    }
}

/// Collapse internal whitespace runs to single spaces and trim the ends
pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Build a context-info snapshot for an event target
///
/// Falls back to the page title/URL; upgrades to a link snapshot when an
/// anchor with a non-empty href is found at or above the target.
pub fn create_context_info(doc: &Document, target: NodeId) -> ContextInfo {
    let mut info = ContextInfo::page_fallback(&doc.title, &doc.url);
    let Some(anchor_id) = doc.find_anchor(target) else {
        return info;
    };
    let Some(anchor) = doc.node(anchor_id) else {
        return info;
    };
    if let Some(href) = &anchor.href {
        let url = href.as_str();
        if !url.is_empty() {
            let content = collapse_whitespace(&anchor.text);
            let title = anchor
                .title
                .clone()
                .filter(|t| !t.is_empty())
                .unwrap_or_else(|| content.clone());
            info = ContextInfo {
                is_link: true,
                content: Some(content),
                title: Some(title),
                url: Some(url.to_string()),
            };
        }
    }
    info
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_doc() -> (Document, NodeId, NodeId) {
        let mut doc = Document::new("Example Page", "http://example.com/", "text/html");
        let body = doc.append(doc.root(), Node::element("body"));
        let paragraph = doc.append(body, Node::element("p"));
        let anchor = doc.append(
            paragraph,
            Node::anchor("  An   example\nlink  ", Href::Plain("http://example.com/a".into())),
        );
        let span = doc.append(anchor, Node::element("span"));
        (doc, anchor, span)
    }

    #[test]
    fn test_find_anchor_on_self() {
        let (doc, anchor, _) = sample_doc();
        assert_eq!(doc.find_anchor(anchor), Some(anchor));
    }

    #[test]
    fn test_find_anchor_via_descendant() {
        let (doc, anchor, span) = sample_doc();
        assert_eq!(doc.find_anchor(span), Some(anchor));
    }

    #[test]
    fn test_no_anchor_above_plain_node() {
        let mut doc = Document::new("T", "http://t/", "text/html");
        let body = doc.append(doc.root(), Node::element("body"));
        let div = doc.append(body, Node::element("div"));
        assert_eq!(doc.find_anchor(div), None);
    }

    #[test]
    fn test_walk_excludes_children_of_root() {
        let mut doc = Document::new("T", "http://t/", "text/html");
        // An anchor hanging directly off the document element is outside
        // the ancestor walk
        let anchor = doc.append(
            doc.root(),
            Node::anchor("x", Href::Plain("http://x/".into())),
        );
        assert_eq!(doc.find_anchor(anchor), None);
    }

    #[test]
    fn test_context_info_for_link_target() {
        let (doc, _, span) = sample_doc();
        let info = create_context_info(&doc, span);
        assert!(info.is_link);
        assert_eq!(info.content.as_deref(), Some("An example link"));
        assert_eq!(info.title.as_deref(), Some("An example link"));
        assert_eq!(info.url.as_deref(), Some("http://example.com/a"));
        assert!(info.is_consistent());
    }

    #[test]
    fn test_context_info_prefers_title_attribute() {
        let mut doc = Document::new("T", "http://t/", "text/html");
        let body = doc.append(doc.root(), Node::element("body"));
        let anchor = doc.append(
            body,
            Node::anchor("text", Href::Plain("http://x/".into())).with_title("Titled"),
        );
        let info = create_context_info(&doc, anchor);
        assert_eq!(info.title.as_deref(), Some("Titled"));
        assert_eq!(info.content.as_deref(), Some("text"));
    }

    #[test]
    fn test_context_info_falls_back_to_page() {
        let mut doc = Document::new("Example Page", "http://example.com/", "text/html");
        let body = doc.append(doc.root(), Node::element("body"));
        let div = doc.append(body, Node::element("div"));
        let info = create_context_info(&doc, div);
        assert!(!info.is_link);
        assert_eq!(info.content.as_deref(), Some("Example Page"));
        assert_eq!(info.url.as_deref(), Some("http://example.com/"));
    }

    #[test]
    fn test_empty_href_is_not_a_link() {
        let mut doc = Document::new("T", "http://t/", "text/html");
        let body = doc.append(doc.root(), Node::element("body"));
        let anchor = doc.append(body, Node::anchor("x", Href::Plain(String::new())));
        let info = create_context_info(&doc, anchor);
        assert!(!info.is_link);
    }

    #[test]
    fn test_svg_animated_href_unwraps() {
        let mut doc = Document::new("T", "http://t/", "image/svg+xml");
        let body = doc.append(doc.root(), Node::element("g"));
        let anchor = doc.append(
            body,
            Node::anchor(
                "svg link",
                Href::SvgAnimated {
                    base_val: "http://svg.example/".into(),
                },
            ),
        );
        let info = create_context_info(&doc, anchor);
        assert!(info.is_link);
        assert_eq!(info.url.as_deref(), Some("http://svg.example/"));
    }

    #[test]
    fn test_collapse_whitespace() {
        assert_eq!(collapse_whitespace("  a \t b\n\nc  "), "a b c");
        assert_eq!(collapse_whitespace(""), "");
    }
}
