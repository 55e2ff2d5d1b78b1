//! html5ever `TreeSink` building an [`Arena`].

use std::borrow::Cow;
use std::cell::RefCell;

use html5ever::tendril::StrTendril;
use html5ever::tree_builder::{ElementFlags, NodeOrText, QuirksMode, TreeSink};
use html5ever::{Attribute as Html5Attribute, QualName};

use super::arena::{Arena, Attribute, NodeData, NodeId};

/// Handle used by the tree builder to reference nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NodeHandle(pub NodeId);

impl Default for NodeHandle {
    fn default() -> Self {
        NodeHandle(NodeId::NONE)
    }
}

/// Sink collecting the parsed tree and the parser's error messages.
///
/// html5ever drives the sink through `&self`, so state sits behind
/// `RefCell`s.
pub struct ArenaSink {
    arena: RefCell<Arena>,
    errors: RefCell<Vec<Cow<'static, str>>>,
}

impl Default for ArenaSink {
    fn default() -> Self {
        Self::new()
    }
}

impl ArenaSink {
    pub fn new() -> Self {
        Self {
            arena: RefCell::new(Arena::new()),
            errors: RefCell::new(Vec::new()),
        }
    }

    /// Consume the sink, returning the tree and the parse errors met.
    pub fn into_parts(self) -> (Arena, Vec<Cow<'static, str>>) {
        (self.arena.into_inner(), self.errors.into_inner())
    }

    fn append_to(&self, parent: NodeId, child: NodeOrText<NodeHandle>) {
        let mut arena = self.arena.borrow_mut();
        match child {
            NodeOrText::AppendNode(node) => arena.append(parent, node.0),
            NodeOrText::AppendText(text) => arena.append_text(parent, &text),
        }
    }
}

impl TreeSink for ArenaSink {
    type Handle = NodeHandle;
    type Output = Self;
    type ElemName<'a>
        = &'a QualName
    where
        Self: 'a;

    fn finish(self) -> Self::Output {
        self
    }

    fn parse_error(&self, msg: Cow<'static, str>) {
        self.errors.borrow_mut().push(msg);
    }

    fn get_document(&self) -> Self::Handle {
        NodeHandle(self.arena.borrow().document())
    }

    fn elem_name<'a>(&'a self, target: &'a Self::Handle) -> Self::ElemName<'a> {
        static EMPTY: QualName = QualName {
            prefix: None,
            ns: html5ever::ns!(),
            local: html5ever::local_name!(""),
        };

        let arena = self.arena.borrow();
        match arena.qual_name(target.0) {
            // SAFETY: nodes are never removed from the arena and an element's
            // name is never rewritten, so the QualName outlives the RefCell
            // borrow for as long as `self` lives.
            Some(name) => unsafe { std::mem::transmute::<&QualName, &'a QualName>(name) },
            None => &EMPTY,
        }
    }

    fn create_element(
        &self,
        name: QualName,
        attrs: Vec<Html5Attribute>,
        _flags: ElementFlags,
    ) -> Self::Handle {
        let attrs = attrs
            .into_iter()
            .map(|a| Attribute {
                name: a.name,
                value: a.value.to_string(),
            })
            .collect();
        NodeHandle(self.arena.borrow_mut().create_element(name, attrs))
    }

    fn create_comment(&self, text: StrTendril) -> Self::Handle {
        NodeHandle(self.arena.borrow_mut().create_comment(text.to_string()))
    }

    fn create_pi(&self, _target: StrTendril, data: StrTendril) -> Self::Handle {
        NodeHandle(self.arena.borrow_mut().create_comment(data.to_string()))
    }

    fn append(&self, parent: &Self::Handle, child: NodeOrText<Self::Handle>) {
        self.append_to(parent.0, child);
    }

    fn append_based_on_parent_node(
        &self,
        element: &Self::Handle,
        prev_element: &Self::Handle,
        child: NodeOrText<Self::Handle>,
    ) {
        let parent = self.arena.borrow().parent(element.0);
        match parent {
            Some(parent) => self.append_to(parent, child),
            None => self.append_to(prev_element.0, child),
        }
    }

    fn append_doctype_to_document(
        &self,
        _name: StrTendril,
        _public_id: StrTendril,
        _system_id: StrTendril,
    ) {
        let mut arena = self.arena.borrow_mut();
        let document = arena.document();
        let doctype = arena.create_doctype();
        arena.append(document, doctype);
    }

    fn get_template_contents(&self, target: &Self::Handle) -> Self::Handle {
        // Template contents stay inline; they are never rendered as content
        *target
    }

    fn same_node(&self, x: &Self::Handle, y: &Self::Handle) -> bool {
        x.0 == y.0
    }

    fn set_quirks_mode(&self, _mode: QuirksMode) {}

    fn append_before_sibling(&self, sibling: &Self::Handle, new_node: NodeOrText<Self::Handle>) {
        let mut arena = self.arena.borrow_mut();
        match new_node {
            NodeOrText::AppendNode(node) => arena.insert_before(sibling.0, node.0),
            NodeOrText::AppendText(text) => arena.insert_text_before(sibling.0, &text),
        }
    }

    fn add_attrs_if_missing(&self, target: &Self::Handle, attrs: Vec<Html5Attribute>) {
        let mut arena = self.arena.borrow_mut();
        if let Some(node) = arena.get_mut(target.0)
            && let NodeData::Element {
                attrs: existing, ..
            } = &mut node.data
        {
            for attr in attrs {
                if !existing.iter().any(|a| a.name == attr.name) {
                    existing.push(Attribute {
                        name: attr.name,
                        value: attr.value.to_string(),
                    });
                }
            }
        }
    }

    fn remove_from_parent(&self, target: &Self::Handle) {
        self.arena.borrow_mut().detach(target.0);
    }

    fn reparent_children(&self, node: &Self::Handle, new_parent: &Self::Handle) {
        let mut arena = self.arena.borrow_mut();
        let children: Vec<_> = arena.children(node.0).collect();
        for child in children {
            arena.detach(child);
            arena.append(new_parent.0, child);
        }
    }
}

#[cfg(test)]
mod tests {
    use html5ever::driver::ParseOpts;
    use html5ever::parse_document;
    use html5ever::tendril::TendrilSink;

    use super::*;

    fn parse_html(html: &str) -> (Arena, Vec<Cow<'static, str>>) {
        parse_document(ArenaSink::new(), ParseOpts::default())
            .from_utf8()
            .one(html.as_bytes())
            .into_parts()
    }

    #[test]
    fn test_basic_parse() {
        let (arena, _) = parse_html("<html><body><p>Hello</p></body></html>");

        let p = arena.find_by_tag("p").expect("should find p");
        let text = arena.children(p).next().expect("p should have child");
        assert_eq!(arena.text_content(text), Some("Hello"));
    }

    #[test]
    fn test_implied_elements() {
        let (arena, _) = parse_html("<p>Loose paragraph</p>");

        let html = arena.find_by_tag("html").expect("html is implied");
        let body = arena.find_by_tag("body").expect("body is implied");
        assert_eq!(arena.parent(html), Some(arena.document()));
        assert_eq!(arena.parent(body), Some(html));
    }

    #[test]
    fn test_collects_parse_errors() {
        let (_, errors) = parse_html("<!DOCTYPE html><html><body><p>ok</p></body></html>");
        assert!(errors.is_empty());

        let (_, errors) = parse_html("<html><body></div><p>unclosed</body>");
        assert!(!errors.is_empty());
    }

    #[test]
    fn test_misnested_formatting_reparents() {
        let (arena, _) = parse_html("<p><b>bold <i>both</b> italic</i></p>");

        let p = arena.find_by_tag("p").expect("p");
        let tags: Vec<_> = arena
            .element_children(p)
            .filter_map(|c| arena.element_name(c).map(|n| n.to_string()))
            .collect();
        assert_eq!(tags, ["b", "i"]);
    }
}
