//! Decoding errors for the URLON codec.
//!
//! Encoding is infallible for every [`serde_json::Value`]; only [`crate::parse`]
//! can fail.

use thiserror::Error;

/// Errors produced while decoding a URLON string.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UrlonError {
    /// A value started with a character that is not a type marker
    /// (`=`, `:`, `@`, `$`), or a separator other than `&` followed an item.
    #[error("Unexpected char '{found}' at position {position}")]
    UnexpectedChar {
        /// The offending character.
        found: char,
        /// Character offset in the percent-decoded input.
        position: usize,
    },

    /// The input ended where a value was required.
    #[error("Unexpected end of input at position {position}")]
    UnexpectedEnd {
        /// Character offset in the percent-decoded input.
        position: usize,
    },

    /// A `%` escape was truncated, not hexadecimal, or decoded to invalid UTF-8.
    #[error("Invalid percent escape: {detail}")]
    InvalidEscape {
        /// Description of the malformed sequence.
        detail: String,
    },
}
