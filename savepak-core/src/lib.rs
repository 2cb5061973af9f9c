//! # Savepak Core
//!
//! Core components for the savepak player-data persistence library.
//!
//! This crate provides the fundamental building blocks shared by the codec
//! layers:
//!
//! - [`bitfield`]: Fixed-size, byte-packed bit vectors
//! - [`enumdef`]: Immutable name/integer lookup tables
//! - [`types`]: Game domain values (vectors, rotations, colors, references)
//! - [`error`]: Error types
//!
//! ## Architecture
//!
//! Savepak is designed as a layered pipeline:
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │ L4: Store façade                                        │
//! │     compress/decompress, soft cap, base64, CLI          │
//! ├─────────────────────────────────────────────────────────┤
//! │ L3: LZW codec                                           │
//! │     variable-width codes, lzw framing header            │
//! ├─────────────────────────────────────────────────────────┤
//! │ L2: MessagePack codec                                   │
//! │     typed values, extension registry, constants         │
//! ├─────────────────────────────────────────────────────────┤
//! │ L1: Core (this crate)                                   │
//! │     BitField, EnumDef, domain types, errors             │
//! └─────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Example
//!
//! ```rust
//! use savepak_core::bitfield::BitField;
//!
//! let mut flags = BitField::new(64, false);
//! flags.set(3, true).unwrap();
//! assert_eq!(flags.get(3).unwrap(), true);
//! assert_eq!(flags.count_ones(), 1);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![forbid(unsafe_code)]
#![allow(clippy::module_name_repetitions)]

pub mod bitfield;
pub mod enumdef;
pub mod error;
pub mod types;

// Re-exports for convenience
pub use bitfield::BitField;
pub use enumdef::EnumDef;
pub use error::{CoreError, Result};
pub use types::{Color, ObjectRef, PlayerRef, Rotation, Vec2, Vec3, Vec4};

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::bitfield::BitField;
    pub use crate::enumdef::EnumDef;
    pub use crate::error::{CoreError, Result};
    pub use crate::types::{Color, ObjectRef, PlayerRef, Rotation, Vec2, Vec3, Vec4};
}
