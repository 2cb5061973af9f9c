//! The MessagePack encoder.
//!
//! Encoding writes into a byte sink; the same single pass drives both the
//! producing sink (`Vec<u8>`) and the counting sink behind
//! [`encoded_len`], so a measured length is the produced length by
//! construction.

use savepak_core::types::{ObjectRef, PlayerRef};

use crate::config::{ArrayMode, EncodeOptions, FloatMode, IntMode, StringMode};
use crate::constants;
use crate::error::{MsgPackError, Result};
use crate::ext;
use crate::value::Value;

/// Encode `value` into a fresh byte string.
pub fn encode(value: &Value, options: &EncodeOptions) -> Result<Vec<u8>> {
    let mut out = Vec::with_capacity(64);
    write_value(&mut out, value, options)?;
    Ok(out)
}

/// The exact number of bytes [`encode`] would produce, without producing
/// them.
pub fn encoded_len(value: &Value, options: &EncodeOptions) -> Result<usize> {
    let mut counter = Counter(0);
    write_value(&mut counter, value, options)?;
    Ok(counter.0)
}

/// A byte destination.
pub(crate) trait Sink {
    /// Append a run of bytes.
    fn put(&mut self, bytes: &[u8]);
    /// Append a single byte.
    fn put_u8(&mut self, byte: u8);
}

impl Sink for Vec<u8> {
    fn put(&mut self, bytes: &[u8]) {
        self.extend_from_slice(bytes);
    }

    fn put_u8(&mut self, byte: u8) {
        self.push(byte);
    }
}

/// Measure-mode sink: counts instead of storing.
pub(crate) struct Counter(pub usize);

impl Sink for Counter {
    fn put(&mut self, bytes: &[u8]) {
        self.0 += bytes.len();
    }

    fn put_u8(&mut self, _byte: u8) {
        self.0 += 1;
    }
}

fn write_value<S: Sink>(out: &mut S, value: &Value, options: &EncodeOptions) -> Result<()> {
    // Constant-eligible variants check the well-known table first; the
    // one-byte selector form always wins over the full payload.
    if matches!(
        value,
        Value::Vector2(_)
            | Value::Vector3(_)
            | Value::Vector4(_)
            | Value::Rotation(_)
            | Value::Color(_)
            | Value::Object(_)
    ) {
        if let Some(selector) = constants::selector_for(value) {
            write_ext_header(out, ext::CONSTANT, 1)?;
            out.put_u8(selector);
            return Ok(());
        }
    }
    match value {
        Value::Nil => out.put_u8(0xC0),
        Value::Bool(false) => out.put_u8(0xC2),
        Value::Bool(true) => out.put_u8(0xC3),
        Value::Int(i) => write_int(out, *i, options.int),
        Value::UInt(u) => write_nonneg(out, *u, options.int),
        Value::F32(f) => {
            out.put_u8(0xCA);
            out.put(&f.to_be_bytes());
        }
        Value::F64(f) => match options.float {
            FloatMode::Double => {
                out.put_u8(0xCB);
                out.put(&f.to_be_bytes());
            }
            FloatMode::Single => {
                out.put_u8(0xCA);
                out.put(&(*f as f32).to_be_bytes());
            }
        },
        Value::Str(s) => write_str(out, s, options.string)?,
        Value::Bin(bytes) => write_bin(out, bytes)?,
        Value::Array(items) => write_array(out, items, options)?,
        Value::Map(entries) => write_map(out, entries, options)?,
        Value::Ext(tag, payload) => write_user_ext(out, *tag, payload)?,
        Value::Vector2(v) => {
            write_ext_header(out, ext::VECTOR2, 8)?;
            out.put(&v.x.to_be_bytes());
            out.put(&v.y.to_be_bytes());
        }
        Value::Vector3(v) => {
            write_ext_header(out, ext::VECTOR3, 12)?;
            out.put(&v.x.to_be_bytes());
            out.put(&v.y.to_be_bytes());
            out.put(&v.z.to_be_bytes());
        }
        Value::Vector4(v) => {
            write_ext_header(out, ext::VECTOR4, 16)?;
            out.put(&v.x.to_be_bytes());
            out.put(&v.y.to_be_bytes());
            out.put(&v.z.to_be_bytes());
            out.put(&v.w.to_be_bytes());
        }
        Value::Rotation(r) => {
            write_ext_header(out, ext::ROTATION, 12)?;
            out.put(&r.pitch.to_be_bytes());
            out.put(&r.yaw.to_be_bytes());
            out.put(&r.roll.to_be_bytes());
        }
        Value::Color(c) => {
            write_ext_header(out, ext::COLOR, 4)?;
            out.put(&[c.r, c.g, c.b, c.a]);
        }
        Value::Player(p) => write_player(out, p)?,
        Value::Object(o) => write_object(out, o)?,
        Value::Bits(bits) => {
            write_ext_header(out, ext::BIT_ARRAY, 1 + bits.as_bytes().len())?;
            out.put_u8((bits.len() % 8) as u8);
            out.put(bits.as_bytes());
        }
        Value::Enum(def) => {
            // The nested pair always uses the pipeline configuration so
            // the payload is independent of the outer options.
            let pair = ext::enum_pair(def);
            let payload_len = encoded_len(&pair, &EncodeOptions::PIPELINE)?;
            write_ext_header(out, ext::ENUM, payload_len)?;
            write_value(out, &pair, &EncodeOptions::PIPELINE)?;
        }
    }
    Ok(())
}

fn write_player<S: Sink>(out: &mut S, player: &PlayerRef) -> Result<()> {
    match player.compact128() {
        Some((hi, lo)) => {
            write_ext_header(out, ext::PLAYER_ID128, 16)?;
            out.put(&hi.to_be_bytes());
            out.put(&lo.to_be_bytes());
        }
        None => {
            write_ext_header(out, ext::PLAYER_ID_STRING, player.id().len())?;
            out.put(player.id().as_bytes());
        }
    }
    Ok(())
}

fn write_object<S: Sink>(out: &mut S, object: &ObjectRef) -> Result<()> {
    match object.compact64() {
        Some(bits) => {
            write_ext_header(out, ext::OBJECT_REF64, 8)?;
            out.put(&bits.to_be_bytes());
        }
        None => {
            write_ext_header(out, ext::OBJECT_REF_STRING, object.id().len())?;
            out.put(object.id().as_bytes());
        }
    }
    Ok(())
}

fn write_user_ext<S: Sink>(out: &mut S, tag: i8, payload: &[u8]) -> Result<()> {
    if (0..ext::FIRST_USER).contains(&tag) {
        return Err(MsgPackError::unsupported(format!(
            "extension tag {tag} is reserved for built-in types"
        )));
    }
    write_ext_header(out, tag, payload.len())?;
    out.put(payload);
    Ok(())
}

fn write_ext_header<S: Sink>(out: &mut S, tag: i8, len: usize) -> Result<()> {
    match len {
        1 => out.put_u8(0xD4),
        2 => out.put_u8(0xD5),
        4 => out.put_u8(0xD6),
        8 => out.put_u8(0xD7),
        16 => out.put_u8(0xD8),
        _ if len <= 0xFF => {
            out.put_u8(0xC7);
            out.put_u8(len as u8);
        }
        _ if len <= 0xFFFF => {
            out.put_u8(0xC8);
            out.put(&(len as u16).to_be_bytes());
        }
        _ if len <= u32::MAX as usize => {
            out.put_u8(0xC9);
            out.put(&(len as u32).to_be_bytes());
        }
        _ => {
            return Err(MsgPackError::unsupported(format!(
                "extension payload of {len} bytes exceeds the wire format"
            )))
        }
    }
    out.put_u8(tag as u8);
    Ok(())
}

fn write_int<S: Sink>(out: &mut S, value: i64, mode: IntMode) {
    if value >= 0 {
        return write_nonneg(out, value as u64, mode);
    }
    if value >= -32 {
        out.put_u8(value as u8);
    } else if value >= i64::from(i8::MIN) {
        out.put_u8(0xD0);
        out.put_u8(value as i8 as u8);
    } else if value >= i64::from(i16::MIN) {
        out.put_u8(0xD1);
        out.put(&(value as i16).to_be_bytes());
    } else if value >= i64::from(i32::MIN) {
        out.put_u8(0xD2);
        out.put(&(value as i32).to_be_bytes());
    } else {
        out.put_u8(0xD3);
        out.put(&value.to_be_bytes());
    }
}

fn write_nonneg<S: Sink>(out: &mut S, value: u64, mode: IntMode) {
    match mode {
        IntMode::Unsigned => {
            if value <= 0x7F {
                out.put_u8(value as u8);
            } else if value <= 0xFF {
                out.put_u8(0xCC);
                out.put_u8(value as u8);
            } else if value <= 0xFFFF {
                out.put_u8(0xCD);
                out.put(&(value as u16).to_be_bytes());
            } else if value <= u64::from(u32::MAX) {
                out.put_u8(0xCE);
                out.put(&(value as u32).to_be_bytes());
            } else {
                out.put_u8(0xCF);
                out.put(&value.to_be_bytes());
            }
        }
        IntMode::Signed => {
            if value <= 0x7F {
                out.put_u8(value as u8);
            } else if value <= i16::MAX as u64 {
                out.put_u8(0xD1);
                out.put(&(value as i16).to_be_bytes());
            } else if value <= i32::MAX as u64 {
                out.put_u8(0xD2);
                out.put(&(value as i32).to_be_bytes());
            } else if value <= i64::MAX as u64 {
                out.put_u8(0xD3);
                out.put(&(value as i64).to_be_bytes());
            } else {
                // No signed encoding holds it; fall back to uint64.
                out.put_u8(0xCF);
                out.put(&value.to_be_bytes());
            }
        }
    }
}

fn write_str<S: Sink>(out: &mut S, s: &str, mode: StringMode) -> Result<()> {
    if mode == StringMode::Binary {
        return write_bin(out, s.as_bytes());
    }
    let len = s.len();
    if len <= 31 {
        out.put_u8(0xA0 | len as u8);
    } else if mode == StringMode::Str8 && len <= 0xFF {
        out.put_u8(0xD9);
        out.put_u8(len as u8);
    } else if len <= 0xFFFF {
        out.put_u8(0xDA);
        out.put(&(len as u16).to_be_bytes());
    } else if len <= u32::MAX as usize {
        out.put_u8(0xDB);
        out.put(&(len as u32).to_be_bytes());
    } else {
        return Err(MsgPackError::unsupported(format!(
            "string of {len} bytes exceeds the wire format"
        )));
    }
    out.put(s.as_bytes());
    Ok(())
}

fn write_bin<S: Sink>(out: &mut S, bytes: &[u8]) -> Result<()> {
    let len = bytes.len();
    if len <= 0xFF {
        out.put_u8(0xC4);
        out.put_u8(len as u8);
    } else if len <= 0xFFFF {
        out.put_u8(0xC5);
        out.put(&(len as u16).to_be_bytes());
    } else if len <= u32::MAX as usize {
        out.put_u8(0xC6);
        out.put(&(len as u32).to_be_bytes());
    } else {
        return Err(MsgPackError::unsupported(format!(
            "binary of {len} bytes exceeds the wire format"
        )));
    }
    out.put(bytes);
    Ok(())
}

fn write_array<S: Sink>(out: &mut S, items: &[Value], options: &EncodeOptions) -> Result<()> {
    match options.array {
        ArrayMode::WithHole => write_array_raw(out, items, options),
        ArrayMode::WithoutHole => {
            if items.iter().any(Value::is_nil) {
                write_index_map(out, items, options)
            } else {
                write_array_raw(out, items, options)
            }
        }
        ArrayMode::AlwaysAsMap => write_index_map(out, items, options),
    }
}

fn write_array_raw<S: Sink>(out: &mut S, items: &[Value], options: &EncodeOptions) -> Result<()> {
    write_array_header(out, items.len())?;
    for item in items {
        write_value(out, item, options)?;
    }
    Ok(())
}

fn write_array_header<S: Sink>(out: &mut S, len: usize) -> Result<()> {
    if len <= 15 {
        out.put_u8(0x90 | len as u8);
    } else if len <= 0xFFFF {
        out.put_u8(0xDC);
        out.put(&(len as u16).to_be_bytes());
    } else if len <= u32::MAX as usize {
        out.put_u8(0xDD);
        out.put(&(len as u32).to_be_bytes());
    } else {
        return Err(MsgPackError::unsupported(format!(
            "array of {len} elements exceeds the wire format"
        )));
    }
    Ok(())
}

/// Encode a sequence as a map of its present 1-based indices.
fn write_index_map<S: Sink>(out: &mut S, items: &[Value], options: &EncodeOptions) -> Result<()> {
    let present = items.iter().filter(|v| !v.is_nil()).count();
    write_map_header(out, present)?;
    for (index, item) in items.iter().enumerate() {
        if item.is_nil() {
            continue;
        }
        write_nonneg(out, index as u64 + 1, options.int);
        write_value(out, item, options)?;
    }
    Ok(())
}

fn write_map<S: Sink>(
    out: &mut S,
    entries: &[(Value, Value)],
    options: &EncodeOptions,
) -> Result<()> {
    for (key, _) in entries {
        if key.is_nil() {
            return Err(MsgPackError::unsupported("map key is nil"));
        }
        if matches!(key, Value::F32(f) if f.is_nan()) || matches!(key, Value::F64(f) if f.is_nan())
        {
            return Err(MsgPackError::unsupported("map key is NaN"));
        }
    }
    match options.array {
        ArrayMode::AlwaysAsMap => write_map_raw(out, entries, options),
        ArrayMode::WithoutHole => match dense_sequence(entries) {
            Some(sequence) => {
                write_array_header(out, sequence.len())?;
                for item in sequence {
                    write_value(out, item, options)?;
                }
                Ok(())
            }
            None => write_map_raw(out, entries, options),
        },
        ArrayMode::WithHole => match padded_sequence(entries) {
            Some(sequence) => {
                write_array_header(out, sequence.len())?;
                for item in sequence {
                    match item {
                        Some(value) => write_value(out, value, options)?,
                        None => out.put_u8(0xC0),
                    }
                }
                Ok(())
            }
            None => write_map_raw(out, entries, options),
        },
    }
}

fn write_map_raw<S: Sink>(
    out: &mut S,
    entries: &[(Value, Value)],
    options: &EncodeOptions,
) -> Result<()> {
    write_map_header(out, entries.len())?;
    for (key, value) in entries {
        write_value(out, key, options)?;
        write_value(out, value, options)?;
    }
    Ok(())
}

fn write_map_header<S: Sink>(out: &mut S, len: usize) -> Result<()> {
    if len <= 15 {
        out.put_u8(0x80 | len as u8);
    } else if len <= 0xFFFF {
        out.put_u8(0xDE);
        out.put(&(len as u16).to_be_bytes());
    } else if len <= u32::MAX as usize {
        out.put_u8(0xDF);
        out.put(&(len as u32).to_be_bytes());
    } else {
        return Err(MsgPackError::unsupported(format!(
            "map of {len} entries exceeds the wire format"
        )));
    }
    Ok(())
}

/// The entry's key as a 1-based sequence index, when it has one.
fn sequence_index(key: &Value) -> Option<usize> {
    match key.clone().canonical_key()? {
        Value::Int(i) if i >= 1 => usize::try_from(i).ok(),
        _ => None,
    }
}

/// Values ordered by key when the keys are exactly `1..=n`.
fn dense_sequence(entries: &[(Value, Value)]) -> Option<Vec<&Value>> {
    if entries.is_empty() {
        // An empty table keeps its map identity.
        return None;
    }
    let mut slots: Vec<Option<&Value>> = vec![None; entries.len()];
    for (key, value) in entries {
        let index = sequence_index(key)?;
        if index > entries.len() {
            return None;
        }
        let slot = &mut slots[index - 1];
        if slot.is_some() {
            return None;
        }
        *slot = Some(value);
    }
    slots.into_iter().collect()
}

/// Values ordered by key, nil-padded to the max index, when every key is
/// a positive integer.
fn padded_sequence(entries: &[(Value, Value)]) -> Option<Vec<Option<&Value>>> {
    if entries.is_empty() {
        return None;
    }
    let mut max = 0usize;
    for (key, _) in entries {
        max = max.max(sequence_index(key)?);
    }
    let mut slots: Vec<Option<&Value>> = vec![None; max];
    for (key, value) in entries {
        let index = sequence_index(key).expect("validated above");
        if slots[index - 1].is_some() {
            return None;
        }
        slots[index - 1] = Some(value);
    }
    Some(slots)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bytes(value: &Value) -> Vec<u8> {
        encode(value, &EncodeOptions::PIPELINE).unwrap()
    }

    #[test]
    fn test_scalar_markers() {
        assert_eq!(bytes(&Value::Nil), [0xC0]);
        assert_eq!(bytes(&Value::Bool(false)), [0xC2]);
        assert_eq!(bytes(&Value::Bool(true)), [0xC3]);
        assert_eq!(bytes(&Value::Int(5)), [0x05]);
        assert_eq!(bytes(&Value::Int(-1)), [0xFF]);
        assert_eq!(bytes(&Value::Int(-32)), [0xE0]);
        assert_eq!(bytes(&Value::Int(-33)), [0xD0, 0xDF]);
        assert_eq!(bytes(&Value::Int(200)), [0xCC, 0xC8]);
        assert_eq!(bytes(&Value::Int(70000)), [0xCE, 0x00, 0x01, 0x11, 0x70]);
        assert_eq!(
            bytes(&Value::UInt(u64::MAX)),
            [0xCF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF]
        );
    }

    #[test]
    fn test_signed_mode_skips_uint_family() {
        let options = EncodeOptions {
            int: IntMode::Signed,
            ..EncodeOptions::PIPELINE
        };
        assert_eq!(encode(&Value::Int(5), &options).unwrap(), [0x05]);
        assert_eq!(
            encode(&Value::Int(200), &options).unwrap(),
            [0xD1, 0x00, 0xC8]
        );
        assert_eq!(
            encode(&Value::Int(70000), &options).unwrap(),
            [0xD2, 0x00, 0x01, 0x11, 0x70]
        );
    }

    #[test]
    fn test_float_markers() {
        assert_eq!(bytes(&Value::F32(1.0)), [0xCA, 0x3F, 0x80, 0x00, 0x00]);
        assert_eq!(
            bytes(&Value::F64(1.0)),
            [0xCB, 0x3F, 0xF0, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00]
        );
        let single = EncodeOptions {
            float: FloatMode::Single,
            ..EncodeOptions::PIPELINE
        };
        assert_eq!(
            encode(&Value::F64(1.0), &single).unwrap(),
            [0xCA, 0x3F, 0x80, 0x00, 0x00]
        );
    }

    #[test]
    fn test_string_modes() {
        let forty = "x".repeat(40);
        // str8 marker in the default mode.
        let mut expected = vec![0xD9, 40];
        expected.extend_from_slice(forty.as_bytes());
        assert_eq!(bytes(&Value::Str(forty.clone())), expected);

        // Compat skips str8 and widens to str16.
        let compat = EncodeOptions {
            string: StringMode::Compat,
            ..EncodeOptions::PIPELINE
        };
        let mut expected = vec![0xDA, 0x00, 40];
        expected.extend_from_slice(forty.as_bytes());
        assert_eq!(encode(&Value::Str(forty.clone()), &compat).unwrap(), expected);

        // Binary mode uses the bin family.
        let binary = EncodeOptions {
            string: StringMode::Binary,
            ..EncodeOptions::PIPELINE
        };
        let mut expected = vec![0xC4, 40];
        expected.extend_from_slice(forty.as_bytes());
        assert_eq!(encode(&Value::Str(forty), &binary).unwrap(), expected);

        // fixstr regardless of mode.
        assert_eq!(bytes(&Value::Str("ok".into())), [0xA2, b'o', b'k']);
    }

    #[test]
    fn test_without_hole_collapses_dense_int_map() {
        let map = Value::Map(vec![
            (Value::Int(2), Value::Str("b".into())),
            (Value::Int(1), Value::Str("a".into())),
        ]);
        assert_eq!(bytes(&map), [0x92, 0xA1, b'a', 0xA1, b'b']);
    }

    #[test]
    fn test_without_hole_turns_holey_array_into_map() {
        let array = Value::Array(vec![
            Value::Str("a".into()),
            Value::Nil,
            Value::Str("c".into()),
        ]);
        assert_eq!(
            bytes(&array),
            [0x82, 0x01, 0xA1, b'a', 0x03, 0xA1, b'c']
        );
    }

    #[test]
    fn test_with_hole_pads_sparse_map() {
        let options = EncodeOptions {
            array: ArrayMode::WithHole,
            ..EncodeOptions::PIPELINE
        };
        let map = Value::Map(vec![
            (Value::Int(1), Value::Str("a".into())),
            (Value::Int(3), Value::Str("c".into())),
        ]);
        assert_eq!(
            encode(&map, &options).unwrap(),
            [0x93, 0xA1, b'a', 0xC0, 0xA1, b'c']
        );
    }

    #[test]
    fn test_always_as_map() {
        let options = EncodeOptions {
            array: ArrayMode::AlwaysAsMap,
            ..EncodeOptions::PIPELINE
        };
        let array = Value::Array(vec![Value::Str("a".into()), Value::Str("b".into())]);
        assert_eq!(
            encode(&array, &options).unwrap(),
            [0x82, 0x01, 0xA1, b'a', 0x02, 0xA1, b'b']
        );
    }

    #[test]
    fn test_string_keyed_map_stays_map() {
        let map = Value::Map(vec![(Value::Str("hp".into()), Value::Int(20))]);
        assert_eq!(bytes(&map), [0x81, 0xA2, b'h', b'p', 0x14]);
    }

    #[test]
    fn test_rejects_nil_and_nan_keys() {
        let nil_key = Value::Map(vec![(Value::Nil, Value::Int(1))]);
        assert!(encode(&nil_key, &EncodeOptions::PIPELINE).is_err());
        let nan_key = Value::Map(vec![(Value::F64(f64::NAN), Value::Int(1))]);
        assert!(encode(&nan_key, &EncodeOptions::PIPELINE).is_err());
    }

    #[test]
    fn test_reserved_ext_tags_rejected() {
        for tag in [0, 7, 40, 42] {
            let value = Value::Ext(tag, vec![1]);
            assert!(encode(&value, &EncodeOptions::PIPELINE).is_err(), "tag {tag}");
        }
        assert!(encode(&Value::Ext(43, vec![1]), &EncodeOptions::PIPELINE).is_ok());
        assert!(encode(&Value::Ext(-1, vec![1]), &EncodeOptions::PIPELINE).is_ok());
    }

    #[test]
    fn test_measure_matches_production() {
        let options_matrix = [
            EncodeOptions::PIPELINE,
            EncodeOptions {
                string: StringMode::Compat,
                int: IntMode::Signed,
                float: FloatMode::Single,
                array: ArrayMode::WithHole,
            },
            EncodeOptions {
                string: StringMode::Binary,
                array: ArrayMode::AlwaysAsMap,
                ..EncodeOptions::PIPELINE
            },
        ];
        let value = Value::Map(vec![
            (
                Value::Str("profile".into()),
                Value::Array(vec![
                    Value::Int(-9000),
                    Value::F64(2.75),
                    Value::Str("x".repeat(300)),
                    Value::Nil,
                ]),
            ),
            (Value::Int(1), Value::Bin(vec![0xAB; 70])),
        ]);
        for options in &options_matrix {
            let produced = encode(&value, options).unwrap();
            assert_eq!(encoded_len(&value, options).unwrap(), produced.len());
        }
    }
}
