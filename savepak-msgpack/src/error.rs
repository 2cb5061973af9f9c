//! Codec error types.

use savepak_core::error::CoreError;
use thiserror::Error;

/// MessagePack encode/decode errors.
#[derive(Debug, Error)]
pub enum MsgPackError {
    /// Input ended before the bytes a prefix declared were available.
    #[error("input truncated: needed {needed} more bytes, {available} available")]
    Truncated {
        /// Additional bytes the current primitive required.
        needed: usize,
        /// Bytes left in the input.
        available: usize,
    },

    /// A top-level decode finished with input left over.
    #[error("{remaining} trailing bytes after top-level value")]
    ExtraBytes {
        /// Number of unconsumed bytes.
        remaining: usize,
    },

    /// A byte that is not a valid MessagePack prefix.
    #[error("marker byte {marker:#04x} is not a valid MessagePack prefix")]
    InvalidMarker {
        /// The offending byte.
        marker: u8,
    },

    /// A str payload that is not UTF-8.
    #[error("string payload is not valid UTF-8")]
    InvalidString(#[from] std::string::FromUtf8Error),

    /// An extension tag in the reserved range with no built-in decoder.
    #[error("unknown extension tag {tag}")]
    UnknownExtension {
        /// The unrecognized tag.
        tag: i8,
    },

    /// A well-known-constant selector outside the registered table.
    #[error("unknown well-known-constant selector {selector}")]
    UnknownConstant {
        /// The unrecognized selector byte.
        selector: u8,
    },

    /// A value the encoder cannot represent, or a malformed payload shape.
    #[error("unsupported value: {message}")]
    UnsupportedValue {
        /// Description of what was rejected.
        message: String,
    },

    /// Container nesting past the decoder's safety limit.
    #[error("value nesting exceeds the decoder limit of {limit}")]
    NestingTooDeep {
        /// The enforced depth limit.
        limit: usize,
    },

    /// A core structure rejected its decoded representation.
    #[error(transparent)]
    Core(#[from] CoreError),
}

/// Result type alias for codec operations.
pub type Result<T> = std::result::Result<T, MsgPackError>;

impl MsgPackError {
    /// Create an unsupported value error.
    pub fn unsupported(message: impl Into<String>) -> Self {
        Self::UnsupportedValue {
            message: message.into(),
        }
    }
}
