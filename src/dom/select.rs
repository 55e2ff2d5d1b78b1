//! CSS selector support for the arena DOM.
//!
//! Two directions are covered: matching parsed selectors against elements
//! (through the `selectors` crate) to resolve a resume anchor, and building
//! the structural selector that anchors each extracted unit.

use std::fmt;

use cssparser::ToCss;

use html5ever::{LocalName, Namespace};
use selectors::attr::{AttrSelectorOperation, CaseSensitivity, NamespaceConstraint};
use selectors::context::{MatchingContext, SelectorCaches};
use selectors::matching::{ElementSelectorFlags, MatchingForInvalidation, MatchingMode, NeedsSelectorFlags};
use selectors::parser::{ParseRelative, SelectorList, SelectorParseErrorKind};
use selectors::{OpaqueElement, SelectorImpl};

use super::arena::{Arena, NodeData, NodeId};
use crate::error::{Error, Result};

/// Selector implementation for the arena DOM.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DomSelectors;

/// Identifier, class and attribute value strings.
#[derive(Debug, Clone, PartialEq, Eq, Default, Hash)]
pub struct IdentStr(pub String);

impl precomputed_hash::PrecomputedHash for IdentStr {
    fn precomputed_hash(&self) -> u32 {
        self.0
            .bytes()
            .fold(0u32, |h, b| h.wrapping_mul(31).wrapping_add(u32::from(b)))
    }
}

impl AsRef<str> for IdentStr {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<&str> for IdentStr {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl cssparser::ToCss for IdentStr {
    fn to_css<W: fmt::Write>(&self, dest: &mut W) -> fmt::Result {
        cssparser::serialize_identifier(&self.0, dest)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CssLocalName(pub LocalName);

impl precomputed_hash::PrecomputedHash for CssLocalName {
    fn precomputed_hash(&self) -> u32 {
        self.0.precomputed_hash()
    }
}

impl From<&str> for CssLocalName {
    fn from(s: &str) -> Self {
        Self(LocalName::from(s))
    }
}

impl cssparser::ToCss for CssLocalName {
    fn to_css<W: fmt::Write>(&self, dest: &mut W) -> fmt::Result {
        dest.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct CssNamespace(pub Namespace);

impl precomputed_hash::PrecomputedHash for CssNamespace {
    fn precomputed_hash(&self) -> u32 {
        self.0.precomputed_hash()
    }
}

impl From<&str> for CssNamespace {
    fn from(s: &str) -> Self {
        Self(Namespace::from(s))
    }
}

impl cssparser::ToCss for CssNamespace {
    fn to_css<W: fmt::Write>(&self, dest: &mut W) -> fmt::Result {
        dest.write_str(&self.0)
    }
}

/// No pseudo-elements are supported.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PseudoElement {}

impl cssparser::ToCss for PseudoElement {
    fn to_css<W: fmt::Write>(&self, _dest: &mut W) -> fmt::Result {
        match *self {}
    }
}

impl selectors::parser::PseudoElement for PseudoElement {
    type Impl = DomSelectors;

    fn accepts_state_pseudo_classes(&self) -> bool {
        match *self {}
    }

    fn valid_after_slotted(&self) -> bool {
        match *self {}
    }
}

/// Only tree-structural pseudo-classes apply to a static document, and
/// those are handled by the `selectors` crate itself.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum NonTSPseudoClass {}

impl selectors::parser::NonTSPseudoClass for NonTSPseudoClass {
    type Impl = DomSelectors;

    fn is_active_or_hover(&self) -> bool {
        match *self {}
    }

    fn is_user_action_state(&self) -> bool {
        match *self {}
    }
}

impl cssparser::ToCss for NonTSPseudoClass {
    fn to_css<W: fmt::Write>(&self, _dest: &mut W) -> fmt::Result {
        match *self {}
    }
}

impl<'i> selectors::parser::Parser<'i> for DomSelectors {
    type Impl = DomSelectors;
    type Error = SelectorParseErrorKind<'i>;
}

impl SelectorImpl for DomSelectors {
    type ExtraMatchingData<'a> = ();
    type AttrValue = IdentStr;
    type Identifier = IdentStr;
    type LocalName = CssLocalName;
    type NamespaceUrl = CssNamespace;
    type NamespacePrefix = IdentStr;
    type BorrowedLocalName = CssLocalName;
    type BorrowedNamespaceUrl = CssNamespace;
    type NonTSPseudoClass = NonTSPseudoClass;
    type PseudoElement = PseudoElement;
}

/// Element of an [`Arena`] seen by the selector engine.
#[derive(Clone, Copy)]
pub struct ElementRef<'a> {
    arena: &'a Arena,
    id: NodeId,
}

impl<'a> ElementRef<'a> {
    pub fn new(arena: &'a Arena, id: NodeId) -> Self {
        Self { arena, id }
    }

    fn wrap(&self, id: Option<NodeId>) -> Option<Self> {
        id.map(|id| Self::new(self.arena, id))
    }
}

impl fmt::Debug for ElementRef<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ElementRef")
            .field("id", &self.id)
            .field("name", &self.arena.element_name(self.id))
            .finish()
    }
}

impl selectors::Element for ElementRef<'_> {
    type Impl = DomSelectors;

    fn opaque(&self) -> OpaqueElement {
        OpaqueElement::new(self)
    }

    fn parent_element(&self) -> Option<Self> {
        let parent = self.arena.parent(self.id)?;
        self.arena.is_element(parent).then(|| Self::new(self.arena, parent))
    }

    fn parent_node_is_shadow_root(&self) -> bool {
        false
    }

    fn containing_shadow_host(&self) -> Option<Self> {
        None
    }

    fn is_pseudo_element(&self) -> bool {
        false
    }

    fn prev_sibling_element(&self) -> Option<Self> {
        self.wrap(self.arena.prev_element_sibling(self.id))
    }

    fn next_sibling_element(&self) -> Option<Self> {
        self.wrap(self.arena.next_element_sibling(self.id))
    }

    fn first_element_child(&self) -> Option<Self> {
        self.wrap(self.arena.element_children(self.id).next())
    }

    fn is_html_element_in_html_document(&self) -> bool {
        self.arena
            .qual_name(self.id)
            .is_some_and(|n| n.ns == html5ever::ns!(html))
    }

    fn has_local_name(&self, name: &CssLocalName) -> bool {
        self.arena.element_name(self.id).is_some_and(|n| *n == name.0)
    }

    fn has_namespace(&self, ns: &CssNamespace) -> bool {
        self.arena.qual_name(self.id).is_some_and(|n| n.ns == ns.0)
    }

    fn is_same_type(&self, other: &Self) -> bool {
        self.arena.qual_name(self.id) == other.arena.qual_name(other.id)
    }

    fn attr_matches(
        &self,
        ns: &NamespaceConstraint<&CssNamespace>,
        local_name: &CssLocalName,
        operation: &AttrSelectorOperation<&IdentStr>,
    ) -> bool {
        self.arena.attrs(self.id).iter().any(|attr| {
            let ns_match = match ns {
                NamespaceConstraint::Any => true,
                NamespaceConstraint::Specific(ns) => attr.name.ns == ns.0,
            };
            ns_match && attr.name.local == local_name.0 && operation.eval_str(&attr.value)
        })
    }

    fn match_non_ts_pseudo_class(
        &self,
        pc: &NonTSPseudoClass,
        _context: &mut MatchingContext<'_, Self::Impl>,
    ) -> bool {
        match *pc {}
    }

    fn match_pseudo_element(
        &self,
        pe: &PseudoElement,
        _context: &mut MatchingContext<'_, Self::Impl>,
    ) -> bool {
        match *pe {}
    }

    fn is_link(&self) -> bool {
        self.arena
            .element_name(self.id)
            .is_some_and(|n| matches!(n.as_ref(), "a" | "area" | "link"))
            && self.arena.get_attr(self.id, "href").is_some()
    }

    fn is_html_slot_element(&self) -> bool {
        false
    }

    fn has_id(&self, id: &IdentStr, case_sensitivity: CaseSensitivity) -> bool {
        self.arena
            .element_id(self.id)
            .is_some_and(|own| case_sensitivity.eq(own.as_bytes(), id.0.as_bytes()))
    }

    fn has_class(&self, name: &IdentStr, case_sensitivity: CaseSensitivity) -> bool {
        self.arena
            .element_classes(self.id)
            .iter()
            .any(|c| case_sensitivity.eq(c.as_bytes(), name.0.as_bytes()))
    }

    fn imported_part(&self, _name: &IdentStr) -> Option<IdentStr> {
        None
    }

    fn is_part(&self, _name: &IdentStr) -> bool {
        false
    }

    fn is_empty(&self) -> bool {
        !self.arena.children(self.id).any(|child| {
            match self.arena.get(child).map(|n| &n.data) {
                Some(NodeData::Element { .. }) => true,
                Some(NodeData::Text(t)) => !t.is_empty(),
                _ => false,
            }
        })
    }

    fn is_root(&self) -> bool {
        self.arena
            .parent(self.id)
            .is_some_and(|p| self.arena.is_document(p))
    }

    fn apply_selector_flags(&self, _flags: ElementSelectorFlags) {}

    fn add_element_unique_hashes(&self, _filter: &mut selectors::bloom::BloomFilter) -> bool {
        false
    }

    fn has_custom_state(&self, _name: &IdentStr) -> bool {
        false
    }
}

/// Parse `selector` as a selector list.
pub fn parse_selector_list(selector: &str) -> Result<SelectorList<DomSelectors>> {
    let mut input = cssparser::ParserInput::new(selector);
    let mut parser = cssparser::Parser::new(&mut input);
    SelectorList::parse(&DomSelectors, &mut parser, ParseRelative::No).map_err(|err| {
        Error::SelectorResolutionFailed {
            selector: selector.to_string(),
            reason: format!(
                "{:?} at line {}, column {}",
                err.kind, err.location.line, err.location.column
            ),
        }
    })
}

/// First element in document order matched by `selector`.
pub fn select_first(arena: &Arena, selector: &str) -> Result<Option<NodeId>> {
    let list = parse_selector_list(selector)?;

    let mut caches = SelectorCaches::default();
    let mut context = MatchingContext::new(
        MatchingMode::Normal,
        None,
        &mut caches,
        selectors::context::QuirksMode::NoQuirks,
        NeedsSelectorFlags::No,
        MatchingForInvalidation::No,
    );

    let found = arena
        .descendants(arena.document())
        .into_iter()
        .filter(|&id| arena.is_element(id))
        .find(|&id| {
            let element = ElementRef::new(arena, id);
            list.slice().iter().any(|selector| {
                selectors::matching::matches_selector(selector, 0, None, &element, &mut context)
            })
        });
    Ok(found)
}

/// Structural selector uniquely locating `id`.
///
/// Ids and classes are escaped as CSS identifiers, so the result parses
/// back to the same element whatever characters they hold.
///
/// An element with an `id` attribute is addressed by it alone. Otherwise
/// the selector is the parent's selector followed by ` > tag.class…`,
/// disambiguated with `:nth-child()` when the parent has several children
/// matching the same tag and classes. Children of the document root stop
/// the recursion.
pub fn css_selector(arena: &Arena, id: NodeId) -> Option<String> {
    let name = arena.element_name(id)?;
    if let Some(own_id) = arena.element_id(id).filter(|v| !v.is_empty()) {
        return Some(format!("#{}", IdentStr::from(own_id).to_css_string()));
    }

    let classes = unique_classes(arena.element_classes(id));
    let mut part = name.replace(':', "|");
    for class in &classes {
        part.push('.');
        part.push_str(&IdentStr::from(class.as_str()).to_css_string());
    }

    let parent = match arena.parent(id) {
        Some(parent) if arena.is_element(parent) => parent,
        _ => return Some(part),
    };

    let similar = arena
        .element_children(parent)
        .filter(|&sibling| {
            arena.element_name(sibling) == Some(name)
                && classes
                    .iter()
                    .all(|c| arena.element_classes(sibling).contains(c))
        })
        .count();

    let mut selector = css_selector(arena, parent)?;
    selector.push_str(" > ");
    selector.push_str(&part);
    if similar > 1 {
        let index = arena
            .element_children(parent)
            .position(|sibling| sibling == id)
            .unwrap_or_default();
        selector.push_str(&format!(":nth-child({})", index + 1));
    }
    Some(selector)
}

fn unique_classes(classes: &[String]) -> Vec<&String> {
    let mut unique: Vec<&String> = Vec::with_capacity(classes.len());
    for class in classes {
        if !unique.contains(&class) {
            unique.push(class);
        }
    }
    unique
}
