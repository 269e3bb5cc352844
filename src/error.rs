//! Error types for quotation stripping

use thiserror::Error;

/// Reasons an extraction stage can decline to produce a stripped body.
///
/// None of these ever reach callers of the public entry points: the
/// top-level functions map every variant to "return the input unchanged".
#[derive(Error, Debug)]
pub enum ExtractError {
    /// Document is empty or whitespace-only
    #[error("document has no visible content")]
    EmptyDocument,

    /// Tag count exceeds the processing ceiling
    #[error("document exceeds the maximum tag count: {0}")]
    TooManyTags(usize),

    /// Rendered text exceeds the line-count ceiling
    #[error("rendered text exceeds the maximum line count: {0}")]
    TooManyLines(usize),

    /// Parsed document has no root element to operate on
    #[error("document has no root element")]
    NoRootElement,

    /// Neither a direct cut nor the checkpoint pass removed anything
    #[error("no quotation found")]
    NothingToStrip,

    /// Stripping would leave an empty visible document
    #[error("stripping would produce an empty document")]
    EmptyResult,

    /// Failed to serialize the reduced tree back to markup
    #[error("failed to serialize document: {0}")]
    Serialize(#[from] std::io::Error),
}

/// Result type for extraction stages
pub type Result<T> = std::result::Result<T, ExtractError>;
