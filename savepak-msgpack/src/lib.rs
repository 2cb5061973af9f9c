//! # Savepak MessagePack
//!
//! The typed serialization layer of the savepak player-data pipeline:
//! a MessagePack codec ([spec](https://github.com/msgpack/msgpack/blob/master/spec.md))
//! extended with the game-domain types a save blob actually contains.
//!
//! ## Extension tags
//!
//! | Tag | Payload |
//! |-----|---------|
//! | 0   | Vector3: 3x float32 |
//! | 1   | Rotation: 3x float32 |
//! | 2   | Color: 4x uint8 |
//! | 3   | Vector2: 2x float32 |
//! | 4   | Vector4: 4x float32 |
//! | 5   | Player id, compact: 2x big-endian u64 |
//! | 6   | Player id, verbatim bytes |
//! | 7   | Object ref, compact: big-endian u64 |
//! | 8   | Object ref, verbatim bytes |
//! | 40  | Well-known constant: 1 selector byte |
//! | 41  | Bit array: bits-in-last-byte, then packed bytes |
//! | 42  | Enum: nested (keys, values) pair |
//! | 43..=127 | User-defined |
//!
//! Values equal to a well-known constant (palette colors, unit vectors,
//! the unassigned object reference) always encode as the one-byte
//! selector form.
//!
//! ## Example
//!
//! ```rust
//! use savepak_msgpack::{decode, encode, EncodeOptions, Value};
//! use savepak_core::types::Vec3;
//!
//! let value = Value::Map(vec![
//!     (Value::Str("spawn".into()), Value::Vector3(Vec3::new(4.0, 0.5, -3.0))),
//!     (Value::Str("lives".into()), Value::Int(3)),
//! ]);
//! let bytes = encode(&value, &EncodeOptions::PIPELINE).unwrap();
//! assert_eq!(decode(&bytes).unwrap(), value);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![forbid(unsafe_code)]
#![allow(clippy::module_name_repetitions)]

mod config;
mod constants;
mod decode;
mod encode;
mod error;
pub mod ext;
mod value;

pub use config::{ArrayMode, EncodeOptions, FloatMode, IntMode, StringMode};
pub use decode::{decode, decode_prefix, decode_with};
pub use encode::{encode, encoded_len};
pub use error::{MsgPackError, Result};
pub use ext::DecodeRegistry;
pub use value::Value;
