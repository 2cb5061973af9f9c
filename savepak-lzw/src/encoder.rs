//! LZW encoder (compression).
//!
//! The dictionary is an open-addressed hash table rather than a string
//! trie: each entry packs a 20-bit key (12-bit prefix code, 8-bit literal
//! suffix) and a 12-bit code into one u32, so lookups are a probe and a
//! compare instead of a byte-vector walk.

use crate::config::{BitOrder, LzwConfig};
use crate::error::{LzwError, Result};
use crate::MAGIC;

/// Largest code value at the 12-bit ceiling.
pub(crate) const MAX_CODE: u32 = (1 << 12) - 1;
/// Hash table slots, 4x the code ceiling to keep probe chains short.
const TABLE_SIZE: usize = 1 << 14;
const TABLE_MASK: u32 = (TABLE_SIZE - 1) as u32;
/// Sentinel for "no pending prefix code yet".
const INVALID_CODE: u32 = u32::MAX;
/// An empty table slot. Valid entries are never zero: the stored code is
/// always at least `clear + 2`, which exceeds zero for every literal width.
const INVALID_ENTRY: u32 = 0;

/// LZW encoder.
///
/// The hash table survives [`LzwEncoder::reset`] (and the implicit reset at
/// the start of every [`LzwEncoder::encode`] call), so a long-lived encoder
/// does not reallocate per payload. Instances are single-threaded; use one
/// encoder per worker.
#[derive(Debug)]
pub struct LzwEncoder {
    config: LzwConfig,
    /// Reserved dictionary-reset code, `1 << lit_width`.
    clear: u32,
    /// Reserved end-of-stream code, `clear + 1`.
    eof: u32,
    /// Current code width in bits.
    width: u32,
    /// Next code to assign.
    hi: u32,
    /// Code value at which the width must grow.
    overflow: u32,
    /// Bit accumulator and its fill level.
    bits: u32,
    n_bits: u32,
    /// Open-addressed dictionary, `key << 12 | code` per slot.
    table: Vec<u32>,
}

impl LzwEncoder {
    /// Create an encoder with the given configuration.
    pub fn new(config: LzwConfig) -> Result<Self> {
        config.validate()?;
        let clear = 1u32 << config.lit_width;
        let mut encoder = Self {
            config,
            clear,
            eof: clear + 1,
            width: 0,
            hi: 0,
            overflow: 0,
            bits: 0,
            n_bits: 0,
            table: vec![INVALID_ENTRY; TABLE_SIZE],
        };
        encoder.reset();
        Ok(encoder)
    }

    /// The configuration this encoder was built with.
    pub fn config(&self) -> LzwConfig {
        self.config
    }

    /// Restore the initial state, keeping the table allocation.
    pub fn reset(&mut self) {
        self.width = u32::from(self.config.lit_width) + 1;
        self.hi = self.eof;
        self.overflow = 1 << self.width;
        self.bits = 0;
        self.n_bits = 0;
        self.table.fill(INVALID_ENTRY);
    }

    /// Encode `input` as one complete LZW stream.
    pub fn encode(&mut self, input: &[u8]) -> Result<Vec<u8>> {
        let mut out = Vec::with_capacity(input.len() / 2 + 4);
        self.encode_into(input, &mut out)?;
        Ok(out)
    }

    /// Encode `input` as one complete LZW stream appended to `out`.
    ///
    /// The stream is self-delimiting: clear code first, end-of-stream code
    /// last, then a padding byte for any residual bits. On error the bytes
    /// appended so far form no valid stream; the caller discards them.
    pub fn encode_into(&mut self, input: &[u8], out: &mut Vec<u8>) -> Result<()> {
        self.reset();
        let max_literal = (1u32 << self.config.lit_width) - 1;

        self.write_code(out, self.clear);
        let mut code = match input.first() {
            Some(&first) => {
                if u32::from(first) > max_literal {
                    return Err(self.literal_overflow(first));
                }
                u32::from(first)
            }
            None => INVALID_CODE,
        };

        'bytes: for &byte in input.iter().skip(1) {
            let literal = u32::from(byte);
            if literal > max_literal {
                return Err(self.literal_overflow(byte));
            }
            let key = code << 8 | literal;
            // Probe for the extended string; hit means it becomes the
            // pending prefix and we move on to the next byte.
            let mut hash = ((key >> 12) ^ key) & TABLE_MASK;
            let mut slot = hash;
            loop {
                let entry = self.table[slot as usize];
                if entry == INVALID_ENTRY {
                    break;
                }
                if entry >> 12 == key {
                    code = entry & MAX_CODE;
                    continue 'bytes;
                }
                slot = (slot + 1) & TABLE_MASK;
            }
            // Miss: emit the pending prefix, restart from the literal and
            // record the extended string under the next free code.
            self.write_code(out, code);
            code = literal;
            if !self.bump_hi(out) {
                loop {
                    if self.table[hash as usize] == INVALID_ENTRY {
                        self.table[hash as usize] = key << 12 | self.hi;
                        break;
                    }
                    hash = (hash + 1) & TABLE_MASK;
                }
            }
        }

        if code != INVALID_CODE {
            self.write_code(out, code);
            self.bump_hi(out);
        }
        self.write_code(out, self.eof);
        self.flush(out);
        Ok(())
    }

    /// Encode with the self-describing `lzw` framing header.
    ///
    /// Framing is only defined for 8-bit literals, where the first stream
    /// byte is 0x00 (LSB) or 0x80 (MSB) and doubles as the bit-order
    /// discriminator.
    pub fn encode_framed(&mut self, input: &[u8]) -> Result<Vec<u8>> {
        if self.config.lit_width != 8 {
            return Err(LzwError::InvalidLitWidth(self.config.lit_width));
        }
        let mut out = Vec::with_capacity(input.len() / 2 + 8);
        out.extend_from_slice(&MAGIC);
        self.encode_into(input, &mut out)?;
        Ok(out)
    }

    /// Advance `hi` past the just-assigned code, growing the width at the
    /// overflow threshold and resetting the dictionary at the 12-bit
    /// ceiling. Returns true when a reset happened (nothing may be
    /// inserted for this step).
    fn bump_hi(&mut self, out: &mut Vec<u8>) -> bool {
        self.hi += 1;
        if self.hi == self.overflow {
            self.width += 1;
            self.overflow <<= 1;
        }
        if self.hi == MAX_CODE {
            let clear = self.clear;
            self.write_code(out, clear);
            self.width = u32::from(self.config.lit_width) + 1;
            self.hi = self.eof;
            self.overflow = clear << 1;
            self.table.fill(INVALID_ENTRY);
            return true;
        }
        false
    }

    fn write_code(&mut self, out: &mut Vec<u8>, code: u32) {
        match self.config.order {
            BitOrder::Lsb => {
                self.bits |= code << self.n_bits;
                self.n_bits += self.width;
                while self.n_bits >= 8 {
                    out.push(self.bits as u8);
                    self.bits >>= 8;
                    self.n_bits -= 8;
                }
            }
            BitOrder::Msb => {
                self.bits |= code << (32 - self.width - self.n_bits);
                self.n_bits += self.width;
                while self.n_bits >= 8 {
                    out.push((self.bits >> 24) as u8);
                    self.bits <<= 8;
                    self.n_bits -= 8;
                }
            }
        }
    }

    /// Emit the final partial byte, if any.
    fn flush(&mut self, out: &mut Vec<u8>) {
        if self.n_bits > 0 {
            if self.config.order == BitOrder::Msb {
                self.bits >>= 24;
            }
            out.push(self.bits as u8);
            self.bits = 0;
            self.n_bits = 0;
        }
    }

    fn literal_overflow(&self, literal: u8) -> LzwError {
        LzwError::LiteralOverflow {
            literal,
            lit_width: self.config.lit_width,
        }
    }
}
