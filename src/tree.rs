//! Abstract document tree consumed by the content parser.
//!
//! The parser never touches a concrete DOM. It walks any [`DocumentTree`],
//! which exposes just enough of a node to classify it, read its text and
//! attributes, move along parent/child/sibling links and compute or query
//! CSS selectors. [`crate::dom::HtmlDocument`] is the html5ever-backed
//! implementation.

use std::fmt::Debug;
use std::hash::Hash;

use crate::error::Result;

/// Kind of a node in a document tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    Element,
    Text,
    /// Document root, comments, doctypes and anything else.
    Other,
}

/// Read-only view over a parsed document.
pub trait DocumentTree {
    /// Cheap handle to a node of the tree.
    type Node: Copy + Eq + Hash + Debug;

    /// Node the content walk starts from: the `<body>` if there is one,
    /// the document root otherwise.
    fn content_root(&self) -> Self::Node;

    fn kind(&self, node: Self::Node) -> NodeKind;

    /// Lowercase local name of an element.
    fn tag_name(&self, node: Self::Node) -> Option<&str>;

    fn attr(&self, node: Self::Node, name: &str) -> Option<&str>;

    fn has_class(&self, node: Self::Node, class: &str) -> bool;

    /// Whether the element is rendered as a block.
    fn is_block(&self, node: Self::Node) -> bool;

    /// Content of a text node.
    fn text(&self, node: Self::Node) -> Option<&str>;

    fn parent(&self, node: Self::Node) -> Option<Self::Node>;

    fn first_child(&self, node: Self::Node) -> Option<Self::Node>;

    fn next_sibling(&self, node: Self::Node) -> Option<Self::Node>;

    /// Structural CSS selector uniquely identifying an element.
    fn css_selector(&self, node: Self::Node) -> Option<String>;

    /// First element in document order matching `selector`.
    ///
    /// Returns `Ok(None)` when nothing matches, and an error when the
    /// selector cannot be evaluated.
    fn select_first(&self, selector: &str) -> Result<Option<Self::Node>>;

    fn is_element(&self, node: Self::Node) -> bool {
        self.kind(node) == NodeKind::Element
    }

    fn children(&self, node: Self::Node) -> Children<'_, Self>
    where
        Self: Sized,
    {
        Children {
            tree: self,
            next: self.first_child(node),
        }
    }
}

/// Turns the decoded markup of a resource into a [`DocumentTree`].
pub trait DocumentParser {
    type Document: DocumentTree;

    /// Parse `markup`, read from the resource at `href`.
    fn parse(&self, href: &str, markup: &str) -> Result<Self::Document>;
}

/// Iterator over the children of a node.
pub struct Children<'a, T: DocumentTree> {
    tree: &'a T,
    next: Option<T::Node>,
}

impl<T: DocumentTree> Iterator for Children<'_, T> {
    type Item = T::Node;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next?;
        self.next = self.tree.next_sibling(current);
        Some(current)
    }
}

/// Step of a depth-first walk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visit<N> {
    Enter(N),
    Exit(N),
}

/// Depth-first walk of the subtree rooted at `root`, root included.
///
/// Every node is entered before its children and exited after them.
pub fn walk<T: DocumentTree>(tree: &T, root: T::Node) -> Walk<'_, T> {
    Walk {
        tree,
        stack: vec![Visit::Enter(root)],
    }
}

pub struct Walk<'a, T: DocumentTree> {
    tree: &'a T,
    stack: Vec<Visit<T::Node>>,
}

impl<T: DocumentTree> Iterator for Walk<'_, T> {
    type Item = Visit<T::Node>;

    fn next(&mut self) -> Option<Self::Item> {
        let visit = self.stack.pop()?;
        if let Visit::Enter(node) = visit {
            self.stack.push(Visit::Exit(node));
            // Push children in reverse order for left-to-right traversal
            let mut children: Vec<_> = self.tree.children(node).collect();
            children.reverse();
            self.stack.extend(children.into_iter().map(Visit::Enter));
        }
        Some(visit)
    }
}

/// Nearest element above `node` carrying `attr`, looking at most
/// `max_depth` ancestors up.
pub fn nearest_ancestor_with_attr<T: DocumentTree>(
    tree: &T,
    node: T::Node,
    attr: &str,
    max_depth: usize,
) -> Option<T::Node> {
    let mut current = tree.parent(node);
    let mut depth = 0;
    while let Some(element) = current {
        if depth >= max_depth || !tree.is_element(element) {
            break;
        }
        if tree.attr(element, attr).is_some() {
            return Some(element);
        }
        current = tree.parent(element);
        depth += 1;
    }
    None
}

/// Language of `node`, from its own `xml:lang` or `lang` attribute or the
/// nearest ancestor carrying one. Blank values are ignored.
pub fn language<T: DocumentTree>(tree: &T, node: T::Node) -> Option<&str> {
    let mut current = Some(node);
    while let Some(n) = current {
        let lang = ["xml:lang", "lang"]
            .into_iter()
            .filter_map(|name| tree.attr(n, name))
            .find(|value| !value.trim().is_empty());
        if lang.is_some() {
            return lang;
        }
        current = tree.parent(n);
    }
    None
}

/// Elements named `tag` below `node`, in document order.
pub fn descendants_by_tag<T: DocumentTree>(tree: &T, node: T::Node, tag: &str) -> Vec<T::Node> {
    walk(tree, node)
        .filter_map(|visit| match visit {
            Visit::Enter(n) if n != node && tree.tag_name(n) == Some(tag) => Some(n),
            _ => None,
        })
        .collect()
}
