//! LZW-specific error types.

use thiserror::Error;

/// LZW compression/decompression errors.
#[derive(Debug, Error)]
pub enum LzwError {
    /// Literal width outside the supported 2..=8 range.
    #[error("literal width {0} outside supported range 2..=8")]
    InvalidLitWidth(u8),

    /// An input byte does not fit the configured literal width.
    #[error("input byte {literal:#04x} exceeds the {lit_width}-bit literal range")]
    LiteralOverflow {
        /// The offending input byte.
        literal: u8,
        /// The configured literal width.
        lit_width: u8,
    },

    /// The stream contains a code the dictionary cannot resolve yet.
    #[error("invalid LZW code {code} (next assignable code is {hi})")]
    InvalidCode {
        /// The unresolvable code.
        code: u16,
        /// The decoder's next assignable code at that point.
        hi: u16,
    },

    /// The stream ended without an end-of-stream code.
    #[error("compressed stream ended without an end-of-stream code at byte {offset}")]
    UnexpectedEof {
        /// Byte offset where input ran out.
        offset: usize,
    },
}

/// Result type for LZW operations.
pub type Result<T> = std::result::Result<T, LzwError>;
