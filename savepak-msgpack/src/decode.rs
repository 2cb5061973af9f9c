//! The MessagePack decoder.
//!
//! A cursor walks the input; every primitive consumes exactly the bytes
//! its prefix declares. Running short fails with `Truncated`; a top-level
//! decode that leaves bytes behind fails with `ExtraBytes` unless the
//! caller asked for a prefix decode.

use crate::error::{MsgPackError, Result};
use crate::ext::{self, DecodeRegistry};
use crate::value::Value;

/// Container nesting limit; blobs come from untrusted storage and must
/// not be able to exhaust the stack.
const MAX_DEPTH: usize = 256;

/// Decode one value spanning the whole input.
pub fn decode(bytes: &[u8]) -> Result<Value> {
    decode_inner(bytes, None)
}

/// Decode one value spanning the whole input, with typed hooks for
/// user-defined extension tags.
pub fn decode_with(bytes: &[u8], registry: &DecodeRegistry) -> Result<Value> {
    decode_inner(bytes, Some(registry))
}

/// Decode one value from the front of the input, returning it together
/// with the number of bytes consumed. Trailing bytes are the caller's.
pub fn decode_prefix(bytes: &[u8]) -> Result<(Value, usize)> {
    let mut decoder = Decoder::new(bytes, None);
    let value = decoder.read_value()?;
    Ok((value, decoder.pos))
}

fn decode_inner(bytes: &[u8], registry: Option<&DecodeRegistry>) -> Result<Value> {
    let mut decoder = Decoder::new(bytes, registry);
    let value = decoder.read_value()?;
    let remaining = decoder.remaining();
    if remaining > 0 {
        return Err(MsgPackError::ExtraBytes { remaining });
    }
    Ok(value)
}

struct Decoder<'a, 'r> {
    buf: &'a [u8],
    pos: usize,
    registry: Option<&'r DecodeRegistry>,
    depth: usize,
}

impl<'a, 'r> Decoder<'a, 'r> {
    fn new(buf: &'a [u8], registry: Option<&'r DecodeRegistry>) -> Self {
        Self {
            buf,
            pos: 0,
            registry,
            depth: 0,
        }
    }

    fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }

    fn take(&mut self, n: usize) -> Result<&'a [u8]> {
        if self.remaining() < n {
            return Err(MsgPackError::Truncated {
                needed: n - self.remaining(),
                available: self.remaining(),
            });
        }
        let slice = &self.buf[self.pos..self.pos + n];
        self.pos += n;
        Ok(slice)
    }

    fn u8(&mut self) -> Result<u8> {
        Ok(self.take(1)?[0])
    }

    fn u16(&mut self) -> Result<u16> {
        let bytes: [u8; 2] = self.take(2)?.try_into().expect("length checked");
        Ok(u16::from_be_bytes(bytes))
    }

    fn u32(&mut self) -> Result<u32> {
        let bytes: [u8; 4] = self.take(4)?.try_into().expect("length checked");
        Ok(u32::from_be_bytes(bytes))
    }

    fn u64(&mut self) -> Result<u64> {
        let bytes: [u8; 8] = self.take(8)?.try_into().expect("length checked");
        Ok(u64::from_be_bytes(bytes))
    }

    fn read_value(&mut self) -> Result<Value> {
        if self.depth >= MAX_DEPTH {
            return Err(MsgPackError::NestingTooDeep { limit: MAX_DEPTH });
        }
        self.depth += 1;
        let value = self.read_value_inner();
        self.depth -= 1;
        value
    }

    fn read_value_inner(&mut self) -> Result<Value> {
        let marker = self.u8()?;
        Ok(match marker {
            // positive fixint
            0x00..=0x7F => Value::Int(i64::from(marker)),
            // fixmap
            0x80..=0x8F => self.read_map(usize::from(marker & 0x0F))?,
            // fixarray
            0x90..=0x9F => self.read_array(usize::from(marker & 0x0F))?,
            // fixstr
            0xA0..=0xBF => self.read_str(usize::from(marker & 0x1F))?,
            0xC0 => Value::Nil,
            0xC1 => return Err(MsgPackError::InvalidMarker { marker }),
            0xC2 => Value::Bool(false),
            0xC3 => Value::Bool(true),
            0xC4 => {
                let len = usize::from(self.u8()?);
                Value::Bin(self.take(len)?.to_vec())
            }
            0xC5 => {
                let len = usize::from(self.u16()?);
                Value::Bin(self.take(len)?.to_vec())
            }
            0xC6 => {
                let len = self.u32()? as usize;
                Value::Bin(self.take(len)?.to_vec())
            }
            0xC7 => {
                let len = usize::from(self.u8()?);
                self.read_ext(len)?
            }
            0xC8 => {
                let len = usize::from(self.u16()?);
                self.read_ext(len)?
            }
            0xC9 => {
                let len = self.u32()? as usize;
                self.read_ext(len)?
            }
            0xCA => Value::F32(f32::from_bits(self.u32()?)),
            0xCB => Value::F64(f64::from_bits(self.u64()?)),
            0xCC => Value::Int(i64::from(self.u8()?)),
            0xCD => Value::Int(i64::from(self.u16()?)),
            0xCE => Value::Int(i64::from(self.u32()?)),
            0xCF => {
                let raw = self.u64()?;
                match i64::try_from(raw) {
                    Ok(i) => Value::Int(i),
                    Err(_) => Value::UInt(raw),
                }
            }
            0xD0 => Value::Int(i64::from(self.u8()? as i8)),
            0xD1 => Value::Int(i64::from(self.u16()? as i16)),
            0xD2 => Value::Int(i64::from(self.u32()? as i32)),
            0xD3 => Value::Int(self.u64()? as i64),
            0xD4 => self.read_ext(1)?,
            0xD5 => self.read_ext(2)?,
            0xD6 => self.read_ext(4)?,
            0xD7 => self.read_ext(8)?,
            0xD8 => self.read_ext(16)?,
            0xD9 => {
                let len = usize::from(self.u8()?);
                self.read_str(len)?
            }
            0xDA => {
                let len = usize::from(self.u16()?);
                self.read_str(len)?
            }
            0xDB => {
                let len = self.u32()? as usize;
                self.read_str(len)?
            }
            0xDC => {
                let len = usize::from(self.u16()?);
                self.read_array(len)?
            }
            0xDD => {
                let len = self.u32()? as usize;
                self.read_array(len)?
            }
            0xDE => {
                let len = usize::from(self.u16()?);
                self.read_map(len)?
            }
            0xDF => {
                let len = self.u32()? as usize;
                self.read_map(len)?
            }
            // negative fixint
            0xE0..=0xFF => Value::Int(i64::from(marker as i8)),
        })
    }

    fn read_str(&mut self, len: usize) -> Result<Value> {
        let bytes = self.take(len)?;
        Ok(Value::Str(String::from_utf8(bytes.to_vec())?))
    }

    fn read_array(&mut self, len: usize) -> Result<Value> {
        // Declared counts are untrusted; cap the preallocation and let
        // growth follow actual input.
        let mut items = Vec::with_capacity(len.min(4096));
        for _ in 0..len {
            items.push(self.read_value()?);
        }
        Ok(Value::Array(items))
    }

    fn read_map(&mut self, len: usize) -> Result<Value> {
        let mut entries: Vec<(Value, Value)> = Vec::with_capacity(len.min(4096));
        for _ in 0..len {
            let raw_key = self.read_value()?;
            let value = self.read_value()?;
            // Nil and NaN keys are dropped; canonically equal keys keep
            // the last write.
            let Some(key) = raw_key.canonical_key() else {
                continue;
            };
            match entries.iter_mut().find(|entry| entry.0 == key) {
                Some(entry) => entry.1 = value,
                None => entries.push((key, value)),
            }
        }
        Ok(Value::Map(entries))
    }

    fn read_ext(&mut self, len: usize) -> Result<Value> {
        let tag = self.u8()? as i8;
        let payload = self.take(len)?;
        ext::decode_ext(tag, payload, self.registry)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncated_scalar() {
        let err = decode(&[0xCD, 0x01]).unwrap_err();
        assert!(matches!(
            err,
            MsgPackError::Truncated {
                needed: 1,
                available: 1
            }
        ));
    }

    #[test]
    fn test_truncated_container() {
        // fixarray of 2 with only one element present.
        let err = decode(&[0x92, 0xC0]).unwrap_err();
        assert!(matches!(err, MsgPackError::Truncated { .. }));
    }

    #[test]
    fn test_extra_bytes() {
        let err = decode(&[0xC0, 0xC0]).unwrap_err();
        assert!(matches!(err, MsgPackError::ExtraBytes { remaining: 1 }));
    }

    #[test]
    fn test_decode_prefix_returns_position() {
        let (value, consumed) = decode_prefix(&[0x05, 0xC0, 0xC0]).unwrap();
        assert_eq!(value, Value::Int(5));
        assert_eq!(consumed, 1);
    }

    #[test]
    fn test_never_used_marker() {
        let err = decode(&[0xC1]).unwrap_err();
        assert!(matches!(err, MsgPackError::InvalidMarker { marker: 0xC1 }));
    }

    #[test]
    fn test_invalid_utf8_str() {
        let err = decode(&[0xA2, 0xFF, 0xFE]).unwrap_err();
        assert!(matches!(err, MsgPackError::InvalidString(_)));
    }

    #[test]
    fn test_map_key_policies() {
        // {nil: 1, 2.0: "a", 2: "b"} decodes to {2: "b"}: the nil key is
        // dropped and the float key collapses onto the integer slot.
        let bytes = [
            0x83, 0xC0, 0x01, 0xCB, 0x40, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0xA1,
            b'a', 0x02, 0xA1, b'b',
        ];
        let value = decode(&bytes).unwrap();
        assert_eq!(
            value,
            Value::Map(vec![(Value::Int(2), Value::Str("b".into()))])
        );
    }

    #[test]
    fn test_uint64_overflow_keeps_uint() {
        let mut bytes = vec![0xCF];
        bytes.extend_from_slice(&u64::MAX.to_be_bytes());
        assert_eq!(decode(&bytes).unwrap(), Value::UInt(u64::MAX));

        let mut bytes = vec![0xCF];
        bytes.extend_from_slice(&42u64.to_be_bytes());
        assert_eq!(decode(&bytes).unwrap(), Value::Int(42));
    }

    #[test]
    fn test_nesting_limit() {
        // 300 nested single-element arrays.
        let mut bytes = vec![0x91; 300];
        bytes.push(0xC0);
        let err = decode(&bytes).unwrap_err();
        assert!(matches!(err, MsgPackError::NestingTooDeep { .. }));
    }

    #[test]
    fn test_declared_length_larger_than_input() {
        // bin32 claiming 4 GiB.
        let err = decode(&[0xC6, 0xFF, 0xFF, 0xFF, 0xFF, 0x00]).unwrap_err();
        assert!(matches!(err, MsgPackError::Truncated { .. }));
    }
}
