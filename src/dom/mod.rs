//! Default HTML document provider backed by html5ever.
//!
//! Markup is parsed into an [`arena::Arena`] through [`tree_sink::ArenaSink`];
//! [`HtmlDocument`] then exposes it as a [`DocumentTree`].

pub mod arena;
pub mod select;
pub mod tree_sink;

use html5ever::driver::ParseOpts;
use html5ever::parse_document;
use html5ever::tendril::TendrilSink;

use self::arena::{Arena, NodeData, NodeId};
use self::tree_sink::ArenaSink;
use crate::error::{Error, Result};
use crate::tree::{DocumentParser, DocumentTree, NodeKind};

/// Elements laid out as blocks. Anything else is inline.
const BLOCK_TAGS: &[&str] = &[
    "html", "head", "body", "frameset", "script", "noscript", "style", "meta", "link", "title",
    "frame", "noframes", "section", "nav", "aside", "hgroup", "header", "footer", "p", "h1", "h2",
    "h3", "h4", "h5", "h6", "ul", "ol", "pre", "div", "blockquote", "hr", "address", "figure",
    "figcaption", "form", "fieldset", "ins", "del", "dl", "dt", "dd", "li", "table", "caption",
    "thead", "tfoot", "tbody", "colgroup", "col", "tr", "th", "td", "video", "audio", "canvas",
    "details", "menu", "plaintext", "template", "article", "main", "svg", "math", "center", "dir",
    "applet", "marquee", "listing",
];

/// How parse errors reported by html5ever are handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Strictness {
    /// Recover like a browser does; errors are only logged.
    #[default]
    Lenient,
    /// Fail with [`Error::MalformedDocument`] on the first parse error.
    Strict,
}

/// Parser producing [`HtmlDocument`]s.
#[derive(Debug, Clone, Copy, Default)]
pub struct HtmlParser {
    strictness: Strictness,
}

impl HtmlParser {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_strictness(mut self, strictness: Strictness) -> Self {
        self.strictness = strictness;
        self
    }

    pub fn strictness(&self) -> Strictness {
        self.strictness
    }
}

impl DocumentParser for HtmlParser {
    type Document = HtmlDocument;

    fn parse(&self, href: &str, markup: &str) -> Result<HtmlDocument> {
        let (arena, errors) = parse_document(ArenaSink::new(), ParseOpts::default())
            .from_utf8()
            .one(markup.as_bytes())
            .into_parts();

        if let Some(first) = errors.first() {
            match self.strictness {
                Strictness::Strict => {
                    return Err(Error::MalformedDocument {
                        href: href.to_string(),
                        reason: first.to_string(),
                    });
                }
                Strictness::Lenient => {
                    for error in &errors {
                        log::trace!("{href}: ignoring parse error: {error}");
                    }
                }
            }
        }

        Ok(HtmlDocument::new(arena))
    }
}

/// Parsed HTML document.
pub struct HtmlDocument {
    arena: Arena,
    body: Option<NodeId>,
}

impl HtmlDocument {
    fn new(arena: Arena) -> Self {
        let body = arena.find_by_tag("body");
        Self { arena, body }
    }

    /// Parse `markup` leniently.
    pub fn parse(markup: &str) -> Self {
        let (arena, _) = parse_document(ArenaSink::new(), ParseOpts::default())
            .from_utf8()
            .one(markup.as_bytes())
            .into_parts();
        Self::new(arena)
    }

    pub fn arena(&self) -> &Arena {
        &self.arena
    }
}

impl DocumentTree for HtmlDocument {
    type Node = NodeId;

    fn content_root(&self) -> NodeId {
        self.body.unwrap_or_else(|| self.arena.document())
    }

    fn kind(&self, node: NodeId) -> NodeKind {
        match self.arena.get(node).map(|n| &n.data) {
            Some(NodeData::Element { .. }) => NodeKind::Element,
            Some(NodeData::Text(_)) => NodeKind::Text,
            _ => NodeKind::Other,
        }
    }

    fn tag_name(&self, node: NodeId) -> Option<&str> {
        self.arena.element_name(node).map(|name| name.as_ref())
    }

    fn attr(&self, node: NodeId, name: &str) -> Option<&str> {
        self.arena.get_attr(node, name)
    }

    fn has_class(&self, node: NodeId, class: &str) -> bool {
        self.arena
            .element_classes(node)
            .iter()
            .any(|c| c.eq_ignore_ascii_case(class))
    }

    fn is_block(&self, node: NodeId) -> bool {
        self.tag_name(node)
            .is_some_and(|tag| BLOCK_TAGS.contains(&tag))
    }

    fn text(&self, node: NodeId) -> Option<&str> {
        self.arena.text_content(node)
    }

    fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.arena.parent(node)
    }

    fn first_child(&self, node: NodeId) -> Option<NodeId> {
        self.arena.first_child(node)
    }

    fn next_sibling(&self, node: NodeId) -> Option<NodeId> {
        self.arena.next_sibling(node)
    }

    fn css_selector(&self, node: NodeId) -> Option<String> {
        select::css_selector(&self.arena, node)
    }

    fn select_first(&self, selector: &str) -> Result<Option<NodeId>> {
        select::select_first(&self.arena, selector)
    }
}
