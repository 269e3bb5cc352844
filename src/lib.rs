// Enforce at crate level
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::missing_errors_doc, clippy::missing_panics_doc)]
#![allow(clippy::significant_drop_tightening)]

//! Reply Extraction
//!
//! Extracts the last authored message from an email body by stripping
//! quoted replies, forwarded threads and signatures, for both plain-text
//! and HTML bodies.
//!
//! # Features
//!
//! - Splitter detection for Gmail, Outlook, Apple Mail, Android and a
//!   dozen localized reply banners
//! - Per-line classification plus a marker-sequence grammar, so inline
//!   replies are never truncated
//! - HTML stripping that cuts quotation tags out of the real tree via a
//!   checkpoint round-trip, preserving the author's markup
//! - Signature detection with pluggable sign-off patterns
//!
//! # Example
//!
//! ```rust
//! use reply_extract::extract_from_plain;
//!
//! let body = "Thanks John!\n\nOn Tue, Nov 8, 2022 at 9:12 AM, John Doe <john@example.com> wrote:\n\n> Hi, see the attached report.";
//! assert_eq!(extract_from_plain(body), "Thanks John!");
//! ```

mod config;
mod error;
mod grammar;
mod html;
mod markers;
mod patterns;
mod signature;
mod text;

pub use config::{ContentType, ExtractConfig, Extractor};
pub use error::{ExtractError, Result};
pub use grammar::{ProcessedLines, process_marked_lines};
pub use html::html_to_text;
pub use markers::{
    Marker, mark_message_lines, mark_message_lines_unindented, mark_thread_lines,
};
pub use signature::{
    LineClassifier, SignatureExtractor, extract_signature, get_signature_candidate,
};

/// Extracts the last message from `msg_body`, dispatching on content type.
#[must_use]
pub fn extract_from(msg_body: &str, content_type: ContentType) -> String {
    Extractor::default().extract_from(msg_body, content_type)
}

/// Extracts the last message from a plain-text body.
#[must_use]
pub fn extract_from_plain(msg_body: &str) -> String {
    Extractor::default().extract_from_plain(msg_body)
}

/// Extracts the last message from an HTML body, returning the markup
/// unchanged when no quotation can be cut safely.
#[must_use]
pub fn extract_from_html(msg_body: &str) -> String {
    Extractor::default().extract_from_html(msg_body)
}
