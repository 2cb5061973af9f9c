//! Pipeline error type.
//!
//! The façade adds no failure modes of its own beyond base64 transport;
//! codec errors surface with their original kind intact.

use savepak_lzw::LzwError;
use savepak_msgpack::MsgPackError;
use thiserror::Error;

/// Errors surfaced by the store pipeline.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A serialization-layer failure.
    #[error(transparent)]
    MsgPack(#[from] MsgPackError),

    /// A compression-layer failure.
    #[error(transparent)]
    Lzw(#[from] LzwError),

    /// A malformed base64 wrapper.
    #[error("base64 payload is malformed: {0}")]
    Base64(#[from] base64::DecodeError),
}

/// Result type alias for pipeline operations.
pub type Result<T> = std::result::Result<T, StoreError>;
