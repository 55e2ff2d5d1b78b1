//! # lectern
//!
//! Extracts the content of EPUB (X)HTML resources as a flat, navigable
//! sequence of text, image, audio and video elements, for read-aloud and
//! similar linear consumers.
//!
//! ## Features
//!
//! - Text split at block boundaries and line breaks, with collapsed
//!   whitespace and per-language segments
//! - Preformatted code kept verbatim, including CSS indentation
//! - Every element carries a [`Locator`]: CSS selector, surrounding text and
//!   progression in the resource and in the publication
//! - Bidirectional cursor starting at any element, or at the end
//!
//! ## Quick Start
//!
//! ```
//! use lectern::{ContentIterator, HtmlResourceContentIterator, Locator, MemoryResource};
//!
//! let resource = MemoryResource::new(
//!     "/chapter1.xhtml",
//!     "application/xhtml+xml",
//!     r#"<html><body><p>Hello <em>world</em>.</p><img src="map.png" alt="A map"/></body></html>"#,
//! );
//! let locator = Locator::new("/chapter1.xhtml", "application/xhtml+xml");
//! let mut iter = HtmlResourceContentIterator::new(resource, None, locator);
//!
//! let text = iter.next()?.unwrap();
//! assert_eq!(text.text().as_deref(), Some("Hello world."));
//!
//! let image = iter.next()?.unwrap();
//! assert_eq!(image.accessibility_label(), Some("A map"));
//! assert!(iter.next()?.is_none());
//! # Ok::<(), lectern::Error>(())
//! ```
//!
//! ## Other documents
//!
//! The traversal runs over any [`DocumentTree`]. [`dom::HtmlDocument`] is the
//! html5ever-backed implementation used by [`HtmlResourceContentIterator`];
//! other parsers plug in through [`DocumentParser`].

pub mod config;
pub mod content;
pub mod dom;
pub mod error;
pub mod href;
pub mod iterator;
pub mod locator;
pub mod parser;
pub mod progression;
pub mod resource;
pub mod style;
pub mod text;
pub mod tree;
pub mod util;

pub use config::ExtractorConfig;
pub use content::{
    AttributeKey, AudioContentElement, ContentAttribute, ContentElement, ImageContentElement,
    Link, Segment, TextContentElement, TextRole, VideoContentElement,
};
pub use dom::{HtmlDocument, HtmlParser, Strictness};
pub use error::{Error, Result};
pub use iterator::{ContentIterator, HtmlResourceContentIterator, HtmlResourceContentIteratorFactory};
pub use locator::{Locations, Locator, LocatorText};
pub use parser::{ContentParser, ParsedElements};
pub use resource::{FileResource, MemoryResource, Resource};
pub use tree::{DocumentParser, DocumentTree};
