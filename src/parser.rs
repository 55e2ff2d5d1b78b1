//! Traversal engine turning a document tree into content elements.
//!
//! The tree is walked once, depth first. Text is accumulated while walking
//! inline content and flushed into a [`TextContentElement`] whenever a block
//! boundary, a line break or an embedded media element is met. Runs of text
//! in a different language become separate [`Segment`]s of the same element.
//!
//! Inside code containers (`<pre>`, or any element with class `pre` or
//! `code`) whitespace is kept verbatim, and indentation expressed with
//! inline `padding-left`/`margin-left` styles is turned back into spaces.

use std::collections::HashSet;

use crate::config::ExtractorConfig;
use crate::content::{
    AudioContentElement, ContentAttribute, ContentElement, ImageContentElement, Link, Segment,
    TextContentElement, TextRole, VideoContentElement,
};
use crate::href::resolve_href;
use crate::locator::{Locator, LocatorText, take_unless_blank};
use crate::style::indentation_for_style;
use crate::text::{
    append_normalized_whitespace, is_blank, is_inline_whitespace, suffix_chars,
    trim_leading_whitespace, trim_trailing_whitespace, unescape_entities,
};
use crate::tree::{
    DocumentTree, NodeKind, Visit, descendants_by_tag, language, nearest_ancestor_with_attr, walk,
};

/// Content elements of a resource, and where reading should resume.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedElements {
    pub elements: Vec<ContentElement>,
    /// Index of the element reading starts at.
    pub start_index: usize,
}

/// Enclosing block element.
#[derive(Debug)]
struct Breadcrumb<N> {
    node: N,
    css_selector: Option<String>,
    /// Element count when the block was entered.
    first_element: usize,
}

/// Mutable state of one walk.
#[derive(Debug)]
struct TraversalState<N> {
    elements: Vec<ContentElement>,
    /// Element count when the start element was first flushed.
    start_index: Option<usize>,
    /// Segments of the text element being built.
    segments: Vec<Segment>,
    /// Text of the current segment, whitespace coalesced.
    text: String,
    /// Text of the current segment, as found in the document.
    raw_text: String,
    /// Raw text since the beginning of the current element.
    element_raw_text: String,
    /// Raw text since the beginning of the resource.
    whole_raw_text: String,
    /// Language of the current segment.
    language: Option<String>,
    /// Block ancestors of the current node, innermost last.
    breadcrumbs: Vec<Breadcrumb<N>>,
    code_depth: usize,
    /// Keep the next code segment even when it holds no text.
    blank_line: bool,
    /// Whitespace-only text met in a code block, waiting to prefix the next
    /// text node.
    pending_indentation: Option<String>,
    /// Styled ancestors whose indentation was already emitted.
    indented_ancestors: HashSet<N>,
}

impl<N> Default for TraversalState<N> {
    fn default() -> Self {
        Self {
            elements: Vec::new(),
            start_index: None,
            segments: Vec::new(),
            text: String::new(),
            raw_text: String::new(),
            element_raw_text: String::new(),
            whole_raw_text: String::new(),
            language: None,
            breadcrumbs: Vec::new(),
            code_depth: 0,
            blank_line: false,
            pending_indentation: None,
            indented_ancestors: HashSet::new(),
        }
    }
}

/// Extracts the content elements of a document.
///
/// # Example
///
/// ```
/// use lectern::dom::HtmlDocument;
/// use lectern::{ContentParser, ExtractorConfig, Locator};
///
/// let doc = HtmlDocument::parse("<body><h1>Title</h1><p>Some <em>text</em>.</p></body>");
/// let base = Locator::new("/ch1.xhtml", "application/xhtml+xml");
/// let config = ExtractorConfig::default();
///
/// let parsed = ContentParser::new(&doc, &base, None, &config).parse();
/// let texts: Vec<_> = parsed.elements.iter().filter_map(|e| e.text()).collect();
/// assert_eq!(texts, ["Title", "Some text."]);
/// ```
pub struct ContentParser<'a, T: DocumentTree> {
    tree: &'a T,
    base_locator: &'a Locator,
    start_element: Option<T::Node>,
    config: &'a ExtractorConfig,
    state: TraversalState<T::Node>,
}

impl<'a, T: DocumentTree> ContentParser<'a, T> {
    /// Create a parser for `tree`.
    ///
    /// Element locators are copies of `base_locator`. When `start_element`
    /// is given, the resulting start index points at the first element
    /// extracted from it.
    pub fn new(
        tree: &'a T,
        base_locator: &'a Locator,
        start_element: Option<T::Node>,
        config: &'a ExtractorConfig,
    ) -> Self {
        Self {
            tree,
            base_locator,
            start_element,
            config,
            state: TraversalState::default(),
        }
    }

    /// Walk the document and return its content elements.
    pub fn parse(mut self) -> ParsedElements {
        let tree = self.tree;
        for visit in walk(tree, tree.content_root()) {
            match visit {
                Visit::Enter(node) => self.enter(node),
                Visit::Exit(node) => self.exit(node),
            }
        }
        // Only reachable without a <body>, where no block closes the content
        self.flush_text();

        let elements = self.state.elements;
        let start_index = if self.base_locator.locations.progression == Some(1.0) {
            elements.len().saturating_sub(1)
        } else {
            self.state.start_index.unwrap_or(0)
        };
        ParsedElements {
            elements,
            start_index,
        }
    }

    fn in_code_block(&self) -> bool {
        self.state.code_depth > 0
    }

    fn is_code_container(&self, node: T::Node) -> bool {
        self.tree.tag_name(node) == Some("pre")
            || self.tree.has_class(node, "pre")
            || self.tree.has_class(node, "code")
    }

    fn enter(&mut self, node: T::Node) {
        let tree = self.tree;
        let Some(tag) = tree.tag_name(node) else {
            return;
        };
        let is_block = tree.is_block(node);

        if self.is_code_container(node) {
            self.flush_text();
            self.state.code_depth += 1;
        }

        if is_block {
            self.flush_text();
            self.state.breadcrumbs.push(Breadcrumb {
                node,
                css_selector: tree.css_selector(node),
                first_element: self.state.elements.len(),
            });
        }

        match tag {
            "br" if self.in_code_block() => self.flush_line(),
            "br" => self.flush_text(),
            "img" => {
                self.flush_text();
                self.push_image(node);
            }
            "audio" | "video" => {
                self.flush_text();
                self.push_media(node, tag);
            }
            _ if is_block && !self.in_code_block() => self.flush_text(),
            _ => {}
        }
    }

    fn exit(&mut self, node: T::Node) {
        let tree = self.tree;
        match tree.kind(node) {
            NodeKind::Text => {
                if let Some(text) = tree.text(node) {
                    self.append_text(node, text);
                }
            }
            NodeKind::Element => {
                let is_container = self.is_code_container(node);
                if is_container {
                    self.flush_text();
                    self.state.code_depth = self.state.code_depth.saturating_sub(1);
                }

                if tree.is_block(node) {
                    let first_element = self.state.breadcrumbs.last().map(|b| b.first_element);
                    debug_assert_eq!(
                        self.state.breadcrumbs.last().map(|b| b.node),
                        Some(node),
                        "block exited out of order"
                    );
                    // A line that already produced elements is not blank
                    if !is_container
                        && self.in_code_block()
                        && first_element == Some(self.state.elements.len())
                    {
                        self.flush_line();
                    } else {
                        self.flush_text();
                    }
                    self.state.breadcrumbs.pop();
                }
            }
            NodeKind::Other => {}
        }
    }

    fn append_text(&mut self, node: T::Node, text: &str) {
        let tree = self.tree;
        let in_code = self.in_code_block();

        let mut whole = String::new();
        if let Some(pending) = self.state.pending_indentation.take()
            && in_code
        {
            whole.push_str(&pending);
        }
        whole.push_str(text);

        if in_code {
            // Indentation written as its own text node prefixes the next one
            if !whole.is_empty() && whole.chars().all(is_inline_whitespace) {
                self.state.pending_indentation = Some(whole);
                return;
            }

            if let Some(ancestor) =
                nearest_ancestor_with_attr(tree, node, "style", self.config.style_search_depth)
                && self.state.indented_ancestors.insert(ancestor)
            {
                let style = tree.attr(ancestor, "style").unwrap_or_default();
                whole.insert_str(0, &indentation_for_style(style, self.config.spaces_per_em));
            }
        } else if is_blank(&whole) {
            return;
        }

        let language = language(tree, node);
        if !in_code && self.state.language.as_deref() != language {
            self.flush_segment();
            self.state.language = language.map(str::to_string);
        }

        let text = unescape_entities(&whole);
        self.state.raw_text.push_str(&text);
        if in_code {
            self.state.text.push_str(&text);
        } else {
            let strip_leading = self.state.text.ends_with(' ');
            append_normalized_whitespace(&mut self.state.text, &text, strip_leading);
        }
    }

    fn current_selector(&self) -> Option<String> {
        self.state
            .breadcrumbs
            .last()
            .and_then(|b| b.css_selector.clone())
    }

    fn language_attributes(&self) -> Vec<ContentAttribute> {
        self.state
            .language
            .iter()
            .map(ContentAttribute::language)
            .collect()
    }

    /// Close the current segment, if it holds any text or ends a blank line
    /// of code.
    fn flush_segment(&mut self) {
        let before = (!self.state.whole_raw_text.is_empty()).then(|| {
            suffix_chars(&self.state.whole_raw_text, self.config.before_max_length).to_string()
        });

        if self.in_code_block() {
            let blank_line = std::mem::take(&mut self.state.blank_line);
            if !self.state.text.is_empty() || blank_line {
                let text = self.state.text.clone();
                let locator = self.base_locator.at_element(
                    self.current_selector(),
                    LocatorText::new(before, Some(text.clone()), None),
                );
                let attributes = self.language_attributes();
                self.state.segments.push(Segment {
                    locator,
                    text,
                    attributes,
                });
            }
        } else {
            let trimmed = self.state.text.trim();
            if !trimmed.is_empty() {
                let text = if self.state.segments.is_empty() {
                    // Keep a single trailing space separating it from the next segment
                    let trailing = trim_leading_whitespace(&self.state.text)
                        .chars()
                        .last()
                        .filter(|c| c.is_whitespace());
                    let mut text = trimmed.to_string();
                    text.extend(trailing);
                    text
                } else {
                    self.state.text.clone()
                };

                let locator = self.base_locator.at_element(
                    self.current_selector(),
                    LocatorText::trimming(&self.state.raw_text, before.as_deref()),
                );
                let attributes = self.language_attributes();
                self.state.segments.push(Segment {
                    locator,
                    text,
                    attributes,
                });
            }
        }

        let state = &mut self.state;
        if !state.raw_text.is_empty() {
            state.whole_raw_text.push_str(&state.raw_text);
            state.element_raw_text.push_str(&state.raw_text);
        }
        state.raw_text.clear();
        state.text.clear();
    }

    /// Close the current line of a code block, as an empty element when it
    /// holds no text.
    fn flush_line(&mut self) {
        self.state.blank_line = self.state.segments.is_empty();
        self.flush_text();
    }

    /// Close the current text element, if it has segments.
    fn flush_text(&mut self) {
        self.flush_segment();

        let parent = self.state.breadcrumbs.last().map(|b| b.node);
        if self.state.start_index.is_none()
            && self.start_element.is_some()
            && parent == self.start_element
        {
            self.state.start_index = Some(self.state.elements.len());
        }

        if self.state.segments.is_empty() {
            return;
        }

        let in_code = self.in_code_block();
        if !in_code && let Some(last) = self.state.segments.last_mut() {
            let len = trim_trailing_whitespace(&last.text).len();
            last.text.truncate(len);
        }

        let before = self
            .state
            .segments
            .first()
            .and_then(|s| s.locator.text.before.clone());
        let element_raw_text = std::mem::take(&mut self.state.element_raw_text);
        let (text, role) = if in_code {
            (
                LocatorText::new(before, Some(element_raw_text), None),
                TextRole::CodeBlock,
            )
        } else {
            (
                LocatorText::trimming(&element_raw_text, before.as_deref()),
                TextRole::Body,
            )
        };

        let locator = self.base_locator.at_element(self.current_selector(), text);
        let element = TextContentElement {
            locator,
            role,
            segments: std::mem::take(&mut self.state.segments),
            attributes: Vec::new(),
        };
        log::trace!(
            "text element #{} at {:?}: {:?}",
            self.state.elements.len(),
            element.locator.locations.css_selector,
            element.locator.text.highlight
        );
        self.state.elements.push(ContentElement::Text(element));
    }

    /// Locator of an embedded element, anchored on the element itself.
    fn element_locator(&self, node: T::Node) -> Locator {
        self.base_locator
            .at_element(self.tree.css_selector(node), LocatorText::default())
    }

    fn src_relative_to_href(&self, node: T::Node) -> Option<String> {
        self.tree
            .attr(node, "src")
            .filter(|src| !is_blank(src))
            .map(|src| resolve_href(&self.base_locator.href, src))
    }

    fn push_image(&mut self, node: T::Node) {
        let Some(href) = self.src_relative_to_href(node) else {
            return;
        };

        let attributes = self
            .tree
            .attr(node, "alt")
            .filter(|alt| !is_blank(alt))
            .map(ContentAttribute::accessibility_label)
            .into_iter()
            .collect();

        let element = ImageContentElement {
            locator: self.element_locator(node),
            embedded_link: Link::new(href),
            caption: self.figure_caption(node),
            attributes,
        };
        log::trace!("image element {}", element.embedded_link.href);
        self.state.elements.push(ContentElement::Image(element));
    }

    fn push_media(&mut self, node: T::Node, tag: &str) {
        let tree = self.tree;
        let link = match self.src_relative_to_href(node) {
            Some(href) => Some(Link::new(href)),
            None => {
                let mut sources = descendants_by_tag(tree, node, "source")
                    .into_iter()
                    .filter_map(|source| {
                        let mut link = Link::new(self.src_relative_to_href(source)?);
                        if let Some(media_type) = tree.attr(source, "type").filter(|t| !is_blank(t)) {
                            link = link.with_media_type(media_type);
                        }
                        Some(link)
                    });
                sources
                    .next()
                    .map(|primary| primary.with_alternates(sources.collect()))
            }
        };

        let Some(embedded_link) = link else {
            return;
        };
        let locator = self.element_locator(node);
        log::trace!("{tag} element {}", embedded_link.href);

        let element = match tag {
            "audio" => ContentElement::Audio(AudioContentElement {
                locator,
                embedded_link,
                attributes: Vec::new(),
            }),
            _ => ContentElement::Video(VideoContentElement {
                locator,
                embedded_link,
                attributes: Vec::new(),
            }),
        };
        self.state.elements.push(element);
    }

    /// Text of the `<figcaption>` of the `<figure>` enclosing `node`.
    fn figure_caption(&self, node: T::Node) -> Option<String> {
        let tree = self.tree;
        let mut current = tree.parent(node);
        let figure = loop {
            let candidate = current?;
            if tree.tag_name(candidate) == Some("figure") {
                break candidate;
            }
            current = tree.parent(candidate);
        };

        let caption = descendants_by_tag(tree, figure, "figcaption")
            .into_iter()
            .next()?;
        let mut text = String::new();
        for visit in walk(tree, caption) {
            if let Visit::Enter(n) = visit
                && let Some(content) = tree.text(n)
            {
                let strip_leading = text.is_empty() || text.ends_with(' ');
                append_normalized_whitespace(&mut text, content, strip_leading);
            }
        }
        let len = trim_trailing_whitespace(&text).len();
        text.truncate(len);
        take_unless_blank(text)
    }
}
