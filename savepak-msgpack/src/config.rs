//! Encoder configuration.
//!
//! Each knob is a small set of named modes; the combination is carried in
//! an [`EncodeOptions`] value. Decoding needs no configuration: every wire
//! form maps to exactly one [`crate::Value`] shape.

/// Which string family the encoder may emit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StringMode {
    /// Only fixstr/str16/str32; for peers predating the str8 marker.
    Compat,
    /// The full str family, including str8.
    #[default]
    Str8,
    /// Emit string payloads with the bin family instead.
    Binary,
}

/// How non-negative integers pick their encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IntMode {
    /// Prefer the positive/uint encodings (smallest first).
    #[default]
    Unsigned,
    /// Skip the uint family; widen through the signed encodings.
    Signed,
}

/// Precision for 64-bit float values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FloatMode {
    /// Emit float64 payloads as float32 (lossy).
    Single,
    /// Keep float64 payloads at full width.
    #[default]
    Double,
}

/// How sequences with holes, and integer-keyed maps, are represented.
///
/// The host runtime has a single table type; these modes reproduce its
/// classifier over the split array/map model (see DESIGN.md).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ArrayMode {
    /// Arrays containing nil holes fall back to a map of their present
    /// 1-based indices; maps keyed exactly by 1..=n collapse to arrays.
    #[default]
    WithoutHole,
    /// Arrays encode verbatim, nil holes included; positive-integer-keyed
    /// maps become arrays padded with nil to the max index.
    WithHole,
    /// Arrays encode as maps of their present 1-based indices; maps stay
    /// maps.
    AlwaysAsMap,
}

/// The encoder configuration surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EncodeOptions {
    /// String family selection.
    pub string: StringMode,
    /// Integer family selection.
    pub int: IntMode,
    /// Float precision.
    pub float: FloatMode,
    /// Sequence/map representation.
    pub array: ArrayMode,
}

impl EncodeOptions {
    /// The configuration the store pipeline uses: str8 strings, unsigned
    /// integers, double floats, hole-free arrays.
    pub const PIPELINE: Self = Self {
        string: StringMode::Str8,
        int: IntMode::Unsigned,
        float: FloatMode::Double,
        array: ArrayMode::WithoutHole,
    };
}
