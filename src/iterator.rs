//! Bidirectional iteration over the content of a resource.

use std::ops::RangeInclusive;

use crate::config::ExtractorConfig;
use crate::content::ContentElement;
use crate::dom::HtmlParser;
use crate::error::Result;
use crate::locator::Locator;
use crate::parser::{ContentParser, ParsedElements};
use crate::progression::adjust_progressions;
use crate::resource::{CloseGuard, Resource};
use crate::tree::{DocumentParser, DocumentTree};
use crate::util::is_html_media_type;

/// Prefix some selector generators add, which matches nothing once the
/// document root is an element of its own.
const ROOT_PREFIX: &str = ":root > ";

/// Iterates over the content elements of a publication resource.
pub trait ContentIterator {
    /// Move to the next element and return it, or `None` at the end.
    fn next(&mut self) -> Result<Option<ContentElement>>;

    /// Move to the previous element and return it, or `None` at the start.
    fn previous(&mut self) -> Result<Option<ContentElement>>;

    /// Drain the remaining elements.
    fn collect_remaining(&mut self) -> Result<Vec<ContentElement>> {
        let mut elements = Vec::new();
        while let Some(element) = self.next()? {
            elements.push(element);
        }
        Ok(elements)
    }
}

/// Iterates over an HTML resource, starting from a locator.
///
/// To start mid-resource, the locator must carry a CSS selector. To start
/// from the end, it must have a progression of 1.0.
///
/// The resource is read and parsed on the first call to
/// [`next`](ContentIterator::next) or [`previous`](ContentIterator::previous),
/// then closed. The outcome is kept: a failure is returned again on every
/// later call.
///
/// # Example
///
/// ```
/// use lectern::{ContentIterator, HtmlResourceContentIterator, Locator, MemoryResource};
///
/// let resource = MemoryResource::new(
///     "/ch1.xhtml",
///     "application/xhtml+xml",
///     "<h1>Chapter 1</h1><p>It begins.</p><p>It ends.</p>",
/// );
/// let locator = Locator::new("/ch1.xhtml", "application/xhtml+xml").with_css_selector("html > body > p:nth-child(3)");
/// let mut iter = HtmlResourceContentIterator::new(resource, None, locator);
///
/// assert_eq!(iter.next()?.and_then(|e| e.text()).as_deref(), Some("It ends."));
/// assert_eq!(iter.previous()?.and_then(|e| e.text()).as_deref(), Some("It begins."));
/// # Ok::<(), lectern::Error>(())
/// ```
pub struct HtmlResourceContentIterator<R: Resource, P: DocumentParser = HtmlParser> {
    resource: R,
    parser: P,
    locator: Locator,
    total_progression_range: Option<RangeInclusive<f64>>,
    config: ExtractorConfig,
    elements: Option<Result<ParsedElements>>,
    current_index: Option<usize>,
}

impl<R: Resource> HtmlResourceContentIterator<R> {
    pub fn new(
        resource: R,
        total_progression_range: Option<RangeInclusive<f64>>,
        locator: Locator,
    ) -> Self {
        Self::with_parser(resource, HtmlParser::default(), total_progression_range, locator)
    }
}

impl<R: Resource, P: DocumentParser> HtmlResourceContentIterator<R, P> {
    /// Create an iterator parsing the resource with `parser`.
    pub fn with_parser(
        resource: R,
        parser: P,
        total_progression_range: Option<RangeInclusive<f64>>,
        locator: Locator,
    ) -> Self {
        Self {
            resource,
            parser,
            locator,
            total_progression_range,
            config: ExtractorConfig::default(),
            elements: None,
            current_index: None,
        }
    }

    pub fn with_config(mut self, config: ExtractorConfig) -> Self {
        self.config = config;
        self
    }

    pub fn resource(&self) -> &R {
        &self.resource
    }

    fn elements(&mut self) -> Result<&ParsedElements> {
        let Self {
            resource,
            parser,
            locator,
            total_progression_range,
            config,
            elements,
            ..
        } = self;

        elements
            .get_or_insert_with(|| {
                parse_elements(
                    resource,
                    parser,
                    locator,
                    total_progression_range.as_ref(),
                    config,
                )
            })
            .as_ref()
            .map_err(Clone::clone)
    }
}

impl<R: Resource, P: DocumentParser> ContentIterator for HtmlResourceContentIterator<R, P> {
    fn next(&mut self) -> Result<Option<ContentElement>> {
        let current = self.current_index;
        let parsed = self.elements()?;
        let index = current.map_or(parsed.start_index, |i| i + 1);

        let Some(element) = parsed.elements.get(index).cloned() else {
            return Ok(None);
        };
        self.current_index = Some(index);
        Ok(Some(element))
    }

    fn previous(&mut self) -> Result<Option<ContentElement>> {
        let current = self.current_index;
        let parsed = self.elements()?;
        let Some(index) = current.unwrap_or(parsed.start_index).checked_sub(1) else {
            return Ok(None);
        };

        let Some(element) = parsed.elements.get(index).cloned() else {
            return Ok(None);
        };
        self.current_index = Some(index);
        Ok(Some(element))
    }
}

fn parse_elements<R: Resource, P: DocumentParser>(
    resource: &mut R,
    parser: &P,
    locator: &Locator,
    total_progression_range: Option<&RangeInclusive<f64>>,
    config: &ExtractorConfig,
) -> Result<ParsedElements> {
    let mut guard = CloseGuard(resource);
    let href = guard.0.href().to_string();
    let markup = guard.0.read_as_string()?;
    let document = parser.parse(&href, &markup)?;

    let start_element = match locator.locations.css_selector.as_deref() {
        Some(selector) => {
            let selector = selector.strip_prefix(ROOT_PREFIX).unwrap_or(selector);
            let found = document.select_first(selector)?;
            if found.is_none() {
                log::warn!("{href}: no element matches start selector `{selector}`");
            }
            found
        }
        None => None,
    };

    let mut parsed = ContentParser::new(&document, locator, start_element, config).parse();
    adjust_progressions(&mut parsed.elements, total_progression_range);

    log::debug!(
        "{href}: extracted {} elements, starting at {}",
        parsed.elements.len(),
        parsed.start_index
    );
    Ok(parsed)
}

/// Creates [`HtmlResourceContentIterator`]s for the HTML resources of a
/// publication's reading order.
#[derive(Debug, Clone, Default)]
pub struct HtmlResourceContentIteratorFactory {
    parser: HtmlParser,
    config: ExtractorConfig,
}

impl HtmlResourceContentIteratorFactory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_parser(mut self, parser: HtmlParser) -> Self {
        self.parser = parser;
        self
    }

    pub fn with_config(mut self, config: ExtractorConfig) -> Self {
        self.config = config;
        self
    }

    /// Iterator over the reading order item at `reading_order_index`, or
    /// `None` when the resource is not HTML.
    ///
    /// `positions_by_reading_order` lists the publication positions of each
    /// reading order item and bounds the total progression of the elements.
    pub fn make<R: Resource>(
        &self,
        positions_by_reading_order: &[Vec<Locator>],
        reading_order_index: usize,
        resource: R,
        locator: Locator,
    ) -> Option<HtmlResourceContentIterator<R>> {
        if !is_html_media_type(resource.media_type()) {
            return None;
        }

        let range = total_progression_range(positions_by_reading_order, reading_order_index);
        Some(
            HtmlResourceContentIterator::with_parser(resource, self.parser, range, locator)
                .with_config(self.config.clone()),
        )
    }
}

/// Span of the publication covered by a reading order item.
///
/// It starts at the total progression of the item's first position and ends
/// where the next item starts, or at 1.0 for the last one.
pub fn total_progression_range(
    positions_by_reading_order: &[Vec<Locator>],
    reading_order_index: usize,
) -> Option<RangeInclusive<f64>> {
    let first_total_progression = |index: usize| {
        positions_by_reading_order
            .get(index)?
            .first()?
            .locations
            .total_progression
    };

    let start = first_total_progression(reading_order_index)?;
    let end = first_total_progression(reading_order_index + 1).unwrap_or(1.0);
    Some(start..=end)
}
