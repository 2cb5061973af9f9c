//! The decoded value model.

use savepak_core::bitfield::BitField;
use savepak_core::enumdef::EnumDef;
use savepak_core::types::{Color, ObjectRef, PlayerRef, Rotation, Vec2, Vec3, Vec4};

/// A value the codec can round-trip.
///
/// The scalar and container variants mirror the MessagePack data model;
/// the domain variants are carried on the wire as extension payloads.
/// `Ext` holds a user-defined or foreign extension verbatim.
///
/// Maps are unordered entry lists. Keys may be any value; during decode,
/// nil and NaN keys are discarded and numeric keys are canonicalized (see
/// [`Value::canonical_key`]), with the last write winning among equal
/// keys.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// The absent value.
    Nil,
    /// A boolean.
    Bool(bool),
    /// A signed integer.
    Int(i64),
    /// An unsigned integer that does not fit `Int`.
    UInt(u64),
    /// A single-precision float.
    F32(f32),
    /// A double-precision float.
    F64(f64),
    /// A UTF-8 string.
    Str(String),
    /// Raw bytes.
    Bin(Vec<u8>),
    /// An ordered sequence.
    Array(Vec<Value>),
    /// An unordered key/value table.
    Map(Vec<(Value, Value)>),
    /// An uninterpreted extension: tag and payload.
    Ext(i8, Vec<u8>),
    /// A 2-component vector.
    Vector2(Vec2),
    /// A 3-component vector.
    Vector3(Vec3),
    /// A 4-component vector.
    Vector4(Vec4),
    /// An Euler rotation.
    Rotation(Rotation),
    /// An RGBA color.
    Color(Color),
    /// A player reference.
    Player(PlayerRef),
    /// A game object reference.
    Object(ObjectRef),
    /// A packed bit vector.
    Bits(BitField),
    /// A name/integer lookup table.
    Enum(EnumDef),
}

impl Value {
    /// True for [`Value::Nil`].
    pub fn is_nil(&self) -> bool {
        matches!(self, Value::Nil)
    }

    /// The integer payload of an `Int`, or of a `UInt` that fits.
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            Value::UInt(u) => i64::try_from(*u).ok(),
            _ => None,
        }
    }

    /// The float payload of either float variant.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::F32(f) => Some(f64::from(*f)),
            Value::F64(f) => Some(*f),
            _ => None,
        }
    }

    /// The string payload, if this is a `Str`.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    /// The elements, if this is an `Array`.
    pub fn as_array(&self) -> Option<&[Value]> {
        match self {
            Value::Array(items) => Some(items),
            _ => None,
        }
    }

    /// The entries, if this is a `Map`.
    pub fn as_map(&self) -> Option<&[(Value, Value)]> {
        match self {
            Value::Map(entries) => Some(entries),
            _ => None,
        }
    }

    /// Look up a map entry by string key.
    pub fn map_get(&self, key: &str) -> Option<&Value> {
        self.as_map()?
            .iter()
            .find(|(k, _)| matches!(k, Value::Str(s) if s == key))
            .map(|(_, v)| v)
    }

    /// A short name for error messages.
    pub(crate) fn type_name(&self) -> &'static str {
        match self {
            Value::Nil => "nil",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::UInt(_) => "uint",
            Value::F32(_) => "float32",
            Value::F64(_) => "float64",
            Value::Str(_) => "str",
            Value::Bin(_) => "bin",
            Value::Array(_) => "array",
            Value::Map(_) => "map",
            Value::Ext(..) => "ext",
            Value::Vector2(_) => "vector2",
            Value::Vector3(_) => "vector3",
            Value::Vector4(_) => "vector4",
            Value::Rotation(_) => "rotation",
            Value::Color(_) => "color",
            Value::Player(_) => "player",
            Value::Object(_) => "object",
            Value::Bits(_) => "bits",
            Value::Enum(_) => "enum",
        }
    }

    /// The canonical map-key form of this value.
    ///
    /// `None` means the key is dropped (nil, NaN). Unsigned values that
    /// fit a signed integer and floats with an integral value collapse to
    /// `Int`; 32-bit floats widen (exactly) to `F64`. Two keys that
    /// canonicalize equal address the same map slot.
    pub fn canonical_key(self) -> Option<Value> {
        match self {
            Value::Nil => None,
            Value::UInt(u) => Some(match i64::try_from(u) {
                Ok(i) => Value::Int(i),
                Err(_) => Value::UInt(u),
            }),
            Value::F32(f) => float_key(f64::from(f)),
            Value::F64(f) => float_key(f),
            other => Some(other),
        }
    }
}

fn float_key(f: f64) -> Option<Value> {
    if f.is_nan() {
        return None;
    }
    // 2^63 is exactly representable; the strict upper bound keeps the
    // cast in range.
    if f.fract() == 0.0 && f >= i64::MIN as f64 && f < i64::MAX as f64 {
        return Some(Value::Int(f as i64));
    }
    Some(Value::F64(f))
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int(i64::from(v))
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<u32> for Value {
    fn from(v: u32) -> Self {
        Value::Int(i64::from(v))
    }
}

impl From<u64> for Value {
    fn from(v: u64) -> Self {
        match i64::try_from(v) {
            Ok(i) => Value::Int(i),
            Err(_) => Value::UInt(v),
        }
    }
}

impl From<f32> for Value {
    fn from(v: f32) -> Self {
        Value::F32(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::F64(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Str(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Str(v)
    }
}

impl From<Vec<u8>> for Value {
    fn from(v: Vec<u8>) -> Self {
        Value::Bin(v)
    }
}

impl From<Vec<Value>> for Value {
    fn from(v: Vec<Value>) -> Self {
        Value::Array(v)
    }
}

impl From<Vec2> for Value {
    fn from(v: Vec2) -> Self {
        Value::Vector2(v)
    }
}

impl From<Vec3> for Value {
    fn from(v: Vec3) -> Self {
        Value::Vector3(v)
    }
}

impl From<Vec4> for Value {
    fn from(v: Vec4) -> Self {
        Value::Vector4(v)
    }
}

impl From<Rotation> for Value {
    fn from(v: Rotation) -> Self {
        Value::Rotation(v)
    }
}

impl From<Color> for Value {
    fn from(v: Color) -> Self {
        Value::Color(v)
    }
}

impl From<PlayerRef> for Value {
    fn from(v: PlayerRef) -> Self {
        Value::Player(v)
    }
}

impl From<ObjectRef> for Value {
    fn from(v: ObjectRef) -> Self {
        Value::Object(v)
    }
}

impl From<BitField> for Value {
    fn from(v: BitField) -> Self {
        Value::Bits(v)
    }
}

impl From<EnumDef> for Value {
    fn from(v: EnumDef) -> Self {
        Value::Enum(v)
    }
}
