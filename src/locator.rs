//! Position references into a resource.
//!
//! A [`Locator`] points at a location inside one resource of a publication.
//! Every extracted content element carries one, and a locator is also what a
//! reading application hands back to resume iteration where it left off.

/// A position inside a resource.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Locator {
    /// Href of the resource, relative to the publication root.
    pub href: String,
    /// Media type of the resource (e.g. `application/xhtml+xml`).
    pub media_type: String,
    /// Optional title of the section containing the location.
    pub title: Option<String>,
    pub locations: Locations,
    pub text: LocatorText,
}

/// Where the location is inside the resource.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Locations {
    /// Progression in the resource, between 0.0 and 1.0.
    pub progression: Option<f64>,
    /// Progression in the whole publication, between 0.0 and 1.0.
    pub total_progression: Option<f64>,
    /// 1-based position in the publication's position list.
    pub position: Option<u32>,
    /// CSS selector of the nearest element enclosing the location.
    pub css_selector: Option<String>,
    /// Fragment identifiers (e.g. element ids) for the location.
    pub fragments: Vec<String>,
}

/// Text surrounding the location.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct LocatorText {
    /// Text preceding the location.
    pub before: Option<String>,
    /// Text at the location.
    pub highlight: Option<String>,
    /// Text following the location.
    pub after: Option<String>,
}

impl Locator {
    /// Create a locator at the start of a resource.
    pub fn new(href: impl Into<String>, media_type: impl Into<String>) -> Self {
        Self {
            href: href.into(),
            media_type: media_type.into(),
            ..Self::default()
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_progression(mut self, progression: f64) -> Self {
        self.locations.progression = Some(progression);
        self
    }

    pub fn with_total_progression(mut self, total_progression: f64) -> Self {
        self.locations.total_progression = Some(total_progression);
        self
    }

    pub fn with_css_selector(mut self, selector: impl Into<String>) -> Self {
        self.locations.css_selector = Some(selector.into());
        self
    }

    pub fn with_text(mut self, text: LocatorText) -> Self {
        self.text = text;
        self
    }

    /// Copy of this locator pointing at another element, with fresh text.
    pub(crate) fn at_element(&self, css_selector: Option<String>, text: LocatorText) -> Self {
        let mut locator = self.clone();
        locator.locations.css_selector = css_selector;
        locator.text = text;
        locator
    }
}

impl LocatorText {
    pub fn new(before: Option<String>, highlight: Option<String>, after: Option<String>) -> Self {
        Self {
            before,
            highlight,
            after,
        }
    }

    /// Split `text` into its leading whitespace, content and trailing
    /// whitespace.
    ///
    /// The leading run is appended to `before`, the trailing run becomes
    /// `after`. Blank `before` and `after` values are dropped.
    pub fn trimming(text: &str, before: Option<&str>) -> Self {
        let start = text
            .char_indices()
            .find(|(_, c)| !c.is_whitespace())
            .map(|(i, _)| i)
            .unwrap_or(0);
        let end = text
            .char_indices()
            .rev()
            .find(|(_, c)| !c.is_whitespace())
            .map(|(i, c)| i + c.len_utf8())
            .unwrap_or(text.len());

        let mut leading = before.unwrap_or_default().to_string();
        leading.push_str(&text[..start]);

        Self {
            before: take_unless_blank(leading),
            highlight: Some(text[start..end].to_string()),
            after: take_unless_blank(text[end..].to_string()),
        }
    }
}

/// `None` when `s` contains only whitespace.
pub(crate) fn take_unless_blank(s: String) -> Option<String> {
    if s.trim().is_empty() { None } else { Some(s) }
}
