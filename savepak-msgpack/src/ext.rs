//! Extension tags, payload layouts and the user-extension registry.
//!
//! Tags 0..=39 are reserved for built-in domain types, 40 for the
//! well-known-constant discriminator, 41..=42 for the packed structures,
//! and 43..=127 for user-defined types. Negative tags (the MessagePack
//! application-reserved range) pass through untouched.

use std::collections::HashMap;
use std::fmt;

use savepak_core::bitfield::BitField;
use savepak_core::enumdef::EnumDef;
use savepak_core::error::CoreError;
use savepak_core::types::{ObjectRef, PlayerRef, Rotation, Vec2, Vec3, Vec4};

use crate::constants;
use crate::error::{MsgPackError, Result};
use crate::value::Value;

/// 3x float32 (x, y, z).
pub const VECTOR3: i8 = 0;
/// 3x float32 Euler angles.
pub const ROTATION: i8 = 1;
/// 4x uint8 (r, g, b, a).
pub const COLOR: i8 = 2;
/// 2x float32 (x, y).
pub const VECTOR2: i8 = 3;
/// 4x float32 (x, y, z, w).
pub const VECTOR4: i8 = 4;
/// Two big-endian u64 halves of a canonical 32-hex-char player id.
pub const PLAYER_ID128: i8 = 5;
/// Verbatim player id bytes.
pub const PLAYER_ID_STRING: i8 = 6;
/// Big-endian u64 form of a canonical 16-hex-char object reference id.
pub const OBJECT_REF64: i8 = 7;
/// Verbatim object reference id bytes.
pub const OBJECT_REF_STRING: i8 = 8;
/// One selector byte into the well-known-constant table.
pub const CONSTANT: i8 = 40;
/// Bits-in-last-byte prefix (0 = full), then the packed bytes.
pub const BIT_ARRAY: i8 = 41;
/// Nested encoding of the (keys array, values array) pair.
pub const ENUM: i8 = 42;
/// First tag available to user-defined extensions.
pub const FIRST_USER: i8 = 43;

/// Decode hook for one user-defined extension tag.
pub type ExtHandler = Box<dyn Fn(&[u8]) -> Result<Value> + Send + Sync>;

/// Typed decode hooks for user-defined extension tags.
///
/// Without a registered handler a user tag decodes to [`Value::Ext`],
/// which still round-trips byte-for-byte; a handler turns the payload
/// into a richer value instead.
#[derive(Default)]
pub struct DecodeRegistry {
    handlers: HashMap<i8, ExtHandler>,
}

impl DecodeRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a decode hook for `tag`.
    ///
    /// Tags below [`FIRST_USER`] are reserved for the built-in types and
    /// are rejected.
    pub fn register<F>(&mut self, tag: i8, handler: F) -> Result<()>
    where
        F: Fn(&[u8]) -> Result<Value> + Send + Sync + 'static,
    {
        if (0..FIRST_USER).contains(&tag) {
            return Err(MsgPackError::unsupported(format!(
                "extension tag {tag} is reserved for built-in types"
            )));
        }
        self.handlers.insert(tag, Box::new(handler));
        Ok(())
    }

    fn handler(&self, tag: i8) -> Option<&ExtHandler> {
        self.handlers.get(&tag)
    }
}

impl fmt::Debug for DecodeRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut tags: Vec<i8> = self.handlers.keys().copied().collect();
        tags.sort_unstable();
        f.debug_struct("DecodeRegistry").field("tags", &tags).finish()
    }
}

/// Interpret one extension payload.
pub(crate) fn decode_ext(
    tag: i8,
    payload: &[u8],
    registry: Option<&DecodeRegistry>,
) -> Result<Value> {
    match tag {
        VECTOR3 => {
            expect_len(payload, 12)?;
            Ok(Value::Vector3(Vec3::new(
                f32_at(payload, 0),
                f32_at(payload, 4),
                f32_at(payload, 8),
            )))
        }
        ROTATION => {
            expect_len(payload, 12)?;
            Ok(Value::Rotation(Rotation::new(
                f32_at(payload, 0),
                f32_at(payload, 4),
                f32_at(payload, 8),
            )))
        }
        COLOR => {
            expect_len(payload, 4)?;
            Ok(Value::Color(savepak_core::types::Color::rgba(
                payload[0], payload[1], payload[2], payload[3],
            )))
        }
        VECTOR2 => {
            expect_len(payload, 8)?;
            Ok(Value::Vector2(Vec2::new(
                f32_at(payload, 0),
                f32_at(payload, 4),
            )))
        }
        VECTOR4 => {
            expect_len(payload, 16)?;
            Ok(Value::Vector4(Vec4::new(
                f32_at(payload, 0),
                f32_at(payload, 4),
                f32_at(payload, 8),
                f32_at(payload, 12),
            )))
        }
        PLAYER_ID128 => {
            expect_len(payload, 16)?;
            Ok(Value::Player(PlayerRef::from_compact128(
                u64_at(payload, 0),
                u64_at(payload, 8),
            )))
        }
        PLAYER_ID_STRING => Ok(Value::Player(PlayerRef::new(utf8(payload)?))),
        OBJECT_REF64 => {
            expect_len(payload, 8)?;
            Ok(Value::Object(ObjectRef::from_compact64(u64_at(payload, 0))))
        }
        OBJECT_REF_STRING => Ok(Value::Object(ObjectRef::new(utf8(payload)?))),
        CONSTANT => {
            expect_len(payload, 1)?;
            constants::value_for(payload[0]).ok_or(MsgPackError::UnknownConstant {
                selector: payload[0],
            })
        }
        BIT_ARRAY => decode_bits(payload),
        ENUM => decode_enum(payload),
        tag if (0..CONSTANT).contains(&tag) => Err(MsgPackError::UnknownExtension { tag }),
        tag => match registry.and_then(|r| r.handler(tag)) {
            Some(handler) => handler(payload),
            None => Ok(Value::Ext(tag, payload.to_vec())),
        },
    }
}

/// Build the tag-42 payload value: `[keys, values]` in stored order.
pub(crate) fn enum_pair(def: &EnumDef) -> Value {
    let keys = def.iter().map(|(k, _)| Value::Str(k.to_string())).collect();
    let values = def.iter().map(|(_, v)| Value::Int(v)).collect();
    Value::Array(vec![Value::Array(keys), Value::Array(values)])
}

fn decode_bits(payload: &[u8]) -> Result<Value> {
    let (&used, bytes) = payload.split_first().ok_or(MsgPackError::Truncated {
        needed: 1,
        available: 0,
    })?;
    if used > 7 {
        return Err(CoreError::invalid_argument(format!(
            "bits-in-last-byte is {used}, expected 0..=7"
        ))
        .into());
    }
    let len = match bytes.len() {
        0 if used == 0 => 0,
        0 => {
            return Err(CoreError::invalid_argument(
                "partial last byte declared for an empty bit array",
            )
            .into())
        }
        n if used == 0 => n * 8,
        n => (n - 1) * 8 + usize::from(used),
    };
    Ok(Value::Bits(BitField::from_raw_parts(len, bytes.to_vec())?))
}

fn decode_enum(payload: &[u8]) -> Result<Value> {
    let pair = crate::decode::decode(payload)?;
    let Value::Array(mut items) = pair else {
        return Err(MsgPackError::unsupported(
            "enum payload must be a pair of arrays",
        ));
    };
    if items.len() != 2 {
        return Err(MsgPackError::unsupported(format!(
            "enum payload holds {} elements, expected 2",
            items.len()
        )));
    }
    let values_value = items.pop().expect("length checked");
    let keys_value = items.pop().expect("length checked");
    let (Value::Array(keys_raw), Value::Array(values_raw)) = (keys_value, values_value) else {
        return Err(MsgPackError::unsupported(
            "enum payload must be a pair of arrays",
        ));
    };
    let mut keys = Vec::with_capacity(keys_raw.len());
    for key in keys_raw {
        match key {
            Value::Str(s) => keys.push(s),
            other => {
                return Err(MsgPackError::unsupported(format!(
                    "enum key is {}, expected str",
                    other.type_name()
                )))
            }
        }
    }
    let mut values = Vec::with_capacity(values_raw.len());
    for value in values_raw {
        match value.as_int() {
            Some(i) => values.push(i),
            None => {
                return Err(MsgPackError::unsupported(format!(
                    "enum value is {}, expected int",
                    value.type_name()
                )))
            }
        }
    }
    Ok(Value::Enum(EnumDef::from_ordered_pairs(keys, values)?))
}

/// Reject payloads whose length does not match the tag's fixed layout.
fn expect_len(payload: &[u8], want: usize) -> Result<()> {
    if payload.len() < want {
        return Err(MsgPackError::Truncated {
            needed: want - payload.len(),
            available: payload.len(),
        });
    }
    if payload.len() > want {
        return Err(MsgPackError::ExtraBytes {
            remaining: payload.len() - want,
        });
    }
    Ok(())
}

fn f32_at(payload: &[u8], at: usize) -> f32 {
    let bytes: [u8; 4] = payload[at..at + 4].try_into().expect("length checked");
    f32::from_be_bytes(bytes)
}

fn u64_at(payload: &[u8], at: usize) -> u64 {
    let bytes: [u8; 8] = payload[at..at + 8].try_into().expect("length checked");
    u64::from_be_bytes(bytes)
}

fn utf8(payload: &[u8]) -> Result<String> {
    Ok(String::from_utf8(payload.to_vec())?)
}
