//! Extraction limits and the configurable entry point

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::{html, text};

/// Body size ceilings applied before any parsing work starts.
///
/// Oversized input is returned unchanged rather than partially stripped,
/// so a caller never loses content to a limit.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractConfig {
    /// Lines beyond this count are carried through verbatim, untouched by
    /// quotation analysis.
    pub max_lines: usize,
    /// HTML bodies with more opening tags than this are returned unchanged.
    pub max_tags: usize,
    /// A single line longer than this disables splitter rewrapping for the
    /// whole body.
    pub max_line_length: usize,
}

impl Default for ExtractConfig {
    fn default() -> Self {
        Self {
            max_lines: 1000,
            max_tags: 419,
            max_line_length: 32_768,
        }
    }
}

/// MIME content type of a message body, as far as extraction cares.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentType {
    PlainText,
    Html,
    /// Anything else is passed through untouched.
    Other,
}

impl ContentType {
    /// Maps a MIME type string to the matching extraction path.
    ///
    /// Parameters after a `;` are ignored. Unrecognized types map to
    /// [`ContentType::Other`].
    #[must_use]
    pub fn from_mime(mime: &str) -> Self {
        let essence = mime.split(';').next().unwrap_or("").trim();
        if essence.eq_ignore_ascii_case("text/plain") {
            Self::PlainText
        } else if essence.eq_ignore_ascii_case("text/html") {
            Self::Html
        } else {
            Self::Other
        }
    }
}

/// Reply extractor with explicit limits.
///
/// The free functions at the crate root use [`ExtractConfig::default`];
/// build an `Extractor` to override any of the ceilings.
#[derive(Debug, Clone, Default)]
pub struct Extractor {
    config: ExtractConfig,
}

impl Extractor {
    #[must_use]
    pub const fn new(config: ExtractConfig) -> Self {
        Self { config }
    }

    #[must_use]
    pub const fn config(&self) -> &ExtractConfig {
        &self.config
    }

    /// Extracts the last message, dispatching on the body's content type.
    ///
    /// Bodies with a content type other than `text/plain` or `text/html`
    /// are returned unchanged.
    #[must_use]
    pub fn extract_from(&self, msg_body: &str, content_type: ContentType) -> String {
        match content_type {
            ContentType::PlainText => self.extract_from_plain(msg_body),
            ContentType::Html => self.extract_from_html(msg_body),
            ContentType::Other => msg_body.to_owned(),
        }
    }

    /// Extracts the last message from a plain-text body.
    #[must_use]
    pub fn extract_from_plain(&self, msg_body: &str) -> String {
        text::extract_from_plain(msg_body, &self.config)
    }

    /// Extracts the last message from an HTML body.
    ///
    /// When the body cannot be cut safely the original markup is returned
    /// unchanged.
    #[must_use]
    pub fn extract_from_html(&self, msg_body: &str) -> String {
        html::extract_from_html(msg_body, &self.config)
    }

    /// Like [`Self::extract_from_html`] but surfaces the reason when the
    /// body is left unchanged.
    pub fn try_extract_from_html(&self, msg_body: &str) -> Result<String> {
        html::reduce_html(msg_body, &self.config)
    }
}
