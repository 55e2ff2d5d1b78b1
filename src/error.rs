//! Error types for content extraction.

use std::io;
use std::sync::Arc;

/// Errors that can occur while extracting content from a resource.
///
/// Errors are cheap to clone: a cursor computes its content once and hands
/// the same failure back on every subsequent call.
#[derive(Debug, Clone, thiserror::Error)]
pub enum Error {
    /// Reading the resource failed.
    #[error("resource {href} is unavailable: {source}")]
    ResourceUnavailable {
        href: String,
        #[source]
        source: Arc<io::Error>,
    },

    /// The resource could not be turned into a document tree.
    #[error("malformed document {href}: {reason}")]
    MalformedDocument { href: String, reason: String },

    /// A structural anchor could not be evaluated against the document.
    ///
    /// This is distinct from an anchor that simply matches nothing, which is
    /// not an error.
    #[error("failed to resolve selector `{selector}`: {reason}")]
    SelectorResolutionFailed { selector: String, reason: String },
}

impl Error {
    /// Wrap an I/O failure for the resource at `href`.
    pub fn resource(href: impl Into<String>, source: io::Error) -> Self {
        Error::ResourceUnavailable {
            href: href.into(),
            source: Arc::new(source),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
