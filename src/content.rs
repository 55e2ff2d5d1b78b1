//! Content elements extracted from a resource.
//!
//! A resource is exposed as a flat sequence of [`ContentElement`]s: runs of
//! text, images, audio and video. Each element carries a [`Locator`]
//! pointing back at where it was found.

use crate::locator::Locator;

/// One unit of content.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(tag = "type", rename_all = "lowercase"))]
pub enum ContentElement {
    Text(TextContentElement),
    Image(ImageContentElement),
    Audio(AudioContentElement),
    Video(VideoContentElement),
}

/// A block of text, split into segments of uniform language.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct TextContentElement {
    pub locator: Locator,
    pub role: TextRole,
    pub segments: Vec<Segment>,
    pub attributes: Vec<ContentAttribute>,
}

/// What a block of text is used for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
pub enum TextRole {
    /// Normal body text, with whitespace collapsed.
    Body,
    /// Preformatted code, with whitespace preserved.
    CodeBlock,
}

/// A contiguous run of text sharing the same attributes.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Segment {
    pub locator: Locator,
    pub text: String,
    pub attributes: Vec<ContentAttribute>,
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct ImageContentElement {
    pub locator: Locator,
    pub embedded_link: Link,
    pub caption: Option<String>,
    pub attributes: Vec<ContentAttribute>,
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct AudioContentElement {
    pub locator: Locator,
    pub embedded_link: Link,
    pub attributes: Vec<ContentAttribute>,
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct VideoContentElement {
    pub locator: Locator,
    pub embedded_link: Link,
    pub attributes: Vec<ContentAttribute>,
}

/// Link to an embedded resource.
///
/// Media with several candidate sources list the first one as the link
/// itself and the others, in document order, as `alternates`.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Link {
    pub href: String,
    pub media_type: Option<String>,
    pub alternates: Vec<Link>,
}

impl Link {
    pub fn new(href: impl Into<String>) -> Self {
        Self {
            href: href.into(),
            ..Self::default()
        }
    }

    pub fn with_media_type(mut self, media_type: impl Into<String>) -> Self {
        self.media_type = Some(media_type.into());
        self
    }

    pub fn with_alternates(mut self, alternates: Vec<Link>) -> Self {
        self.alternates = alternates;
        self
    }
}

/// Key/value attribute attached to an element or segment.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct ContentAttribute {
    pub key: AttributeKey,
    pub value: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub enum AttributeKey {
    /// Textual alternative for a media element.
    AccessibilityLabel,
    /// BCP 47 language tag.
    Language,
}

impl ContentAttribute {
    pub fn new(key: AttributeKey, value: impl Into<String>) -> Self {
        Self {
            key,
            value: value.into(),
        }
    }

    pub fn language(value: impl Into<String>) -> Self {
        Self::new(AttributeKey::Language, value)
    }

    pub fn accessibility_label(value: impl Into<String>) -> Self {
        Self::new(AttributeKey::AccessibilityLabel, value)
    }
}

fn find_attribute(attributes: &[ContentAttribute], key: AttributeKey) -> Option<&str> {
    attributes
        .iter()
        .find(|a| a.key == key)
        .map(|a| a.value.as_str())
}

impl TextContentElement {
    /// Full text of the element, concatenating its segments.
    pub fn text(&self) -> String {
        self.segments.iter().map(|s| s.text.as_str()).collect()
    }
}

impl Segment {
    pub fn language(&self) -> Option<&str> {
        find_attribute(&self.attributes, AttributeKey::Language)
    }
}

impl ContentElement {
    pub fn locator(&self) -> &Locator {
        match self {
            ContentElement::Text(e) => &e.locator,
            ContentElement::Image(e) => &e.locator,
            ContentElement::Audio(e) => &e.locator,
            ContentElement::Video(e) => &e.locator,
        }
    }

    pub fn attributes(&self) -> &[ContentAttribute] {
        match self {
            ContentElement::Text(e) => &e.attributes,
            ContentElement::Image(e) => &e.attributes,
            ContentElement::Audio(e) => &e.attributes,
            ContentElement::Video(e) => &e.attributes,
        }
    }

    /// Language of the element; text elements fall back on their first
    /// segment.
    pub fn language(&self) -> Option<&str> {
        find_attribute(self.attributes(), AttributeKey::Language).or_else(|| match self {
            ContentElement::Text(e) => e.segments.first().and_then(Segment::language),
            _ => None,
        })
    }

    pub fn accessibility_label(&self) -> Option<&str> {
        find_attribute(self.attributes(), AttributeKey::AccessibilityLabel)
    }

    /// Textual representation of the element.
    ///
    /// Media elements fall back on their caption, then on their
    /// accessibility label.
    pub fn text(&self) -> Option<String> {
        match self {
            ContentElement::Text(e) => Some(e.text()),
            ContentElement::Image(e) => e
                .caption
                .clone()
                .or_else(|| self.accessibility_label().map(str::to_string)),
            ContentElement::Audio(_) | ContentElement::Video(_) => {
                self.accessibility_label().map(str::to_string)
            }
        }
    }

    pub fn as_text(&self) -> Option<&TextContentElement> {
        match self {
            ContentElement::Text(e) => Some(e),
            _ => None,
        }
    }

    /// Apply `update` to every locator held by the element, including the
    /// locators of text segments.
    pub(crate) fn update_locators(&mut self, update: impl Fn(&mut Locator)) {
        match self {
            ContentElement::Text(e) => {
                update(&mut e.locator);
                for segment in &mut e.segments {
                    update(&mut segment.locator);
                }
            }
            ContentElement::Image(e) => update(&mut e.locator),
            ContentElement::Audio(e) => update(&mut e.locator),
            ContentElement::Video(e) => update(&mut e.locator),
        }
    }
}
