//! Extraction settings.

/// Tuning of the content extraction.
///
/// # Example
///
/// ```
/// use lectern::ExtractorConfig;
///
/// let config = ExtractorConfig::default().with_before_max_length(120);
/// assert_eq!(config.before_max_length, 120);
/// assert_eq!(config.style_search_depth, 5);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractorConfig {
    /// Number of characters of preceding text kept in `LocatorText::before`.
    pub before_max_length: usize,
    /// Spaces emitted per `em` of left padding/margin in code blocks.
    pub spaces_per_em: f64,
    /// How many ancestors are searched for a `style` attribute when
    /// reconstructing code indentation.
    pub style_search_depth: usize,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            before_max_length: 50,
            spaces_per_em: 2.0,
            style_search_depth: 5,
        }
    }
}

impl ExtractorConfig {
    pub fn with_before_max_length(mut self, length: usize) -> Self {
        self.before_max_length = length;
        self
    }

    pub fn with_spaces_per_em(mut self, spaces: f64) -> Self {
        self.spaces_per_em = spaces;
        self
    }

    pub fn with_style_search_depth(mut self, depth: usize) -> Self {
        self.style_search_depth = depth;
        self
    }
}
