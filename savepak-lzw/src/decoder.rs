//! LZW decoder (decompression).
//!
//! Dictionary entries are two parallel arrays indexed by code: `suffix`
//! holds the last byte of a code's expansion and `prefix` the code for
//! everything before it. Expansions are materialized right-to-left into
//! the tail of a fixed scratch buffer, then moved to the buffer head,
//! which flushes to the caller in ≈4 KiB chunks.

use crate::config::{BitOrder, LzwConfig};
use crate::error::{LzwError, Result};
use crate::unwrap_frame;

/// Ceiling code width in bits.
const MAX_WIDTH: u32 = 12;
/// Dictionary capacity at the ceiling width.
const DICT_SIZE: usize = 1 << MAX_WIDTH;
/// Scratch fill level that triggers a flush to the caller's output.
const FLUSH_AT: usize = DICT_SIZE;
/// Sentinel for "no previous code" (start of stream / after a clear).
const INVALID_CODE: u16 = u16::MAX;

/// LZW decoder.
///
/// The suffix/prefix/scratch buffers survive [`LzwDecoder::reset`] (and the
/// implicit reset at the start of every decode call); a long-lived decoder
/// does not reallocate per payload. Instances are single-threaded; use one
/// decoder per worker.
#[derive(Debug)]
pub struct LzwDecoder {
    config: LzwConfig,
    clear: u16,
    eof: u16,
    /// Current code width in bits.
    width: u32,
    /// Upper bound of currently known codes.
    hi: u16,
    /// Code value at which the width must grow.
    overflow: u16,
    /// Previous code, for dictionary additions.
    last: u16,
    /// Bit accumulator and its fill level.
    bits: u32,
    n_bits: u32,
    /// Last byte of each code's expansion.
    suffix: Vec<u8>,
    /// Code for the expansion minus its last byte.
    prefix: Vec<u16>,
    /// Expansion scratch; head is flushed output, tail is the work area.
    output: Vec<u8>,
    /// Scratch fill level.
    filled: usize,
}

impl LzwDecoder {
    /// Create a decoder with the given configuration.
    pub fn new(config: LzwConfig) -> Result<Self> {
        config.validate()?;
        let clear = config.clear_code();
        let mut decoder = Self {
            config,
            clear,
            eof: clear + 1,
            width: 0,
            hi: 0,
            overflow: 0,
            last: INVALID_CODE,
            bits: 0,
            n_bits: 0,
            suffix: vec![0; DICT_SIZE],
            prefix: vec![0; DICT_SIZE],
            output: vec![0; 2 * DICT_SIZE],
            filled: 0,
        };
        decoder.reset();
        Ok(decoder)
    }

    /// The configuration this decoder was built with.
    pub fn config(&self) -> LzwConfig {
        self.config
    }

    /// Restore the initial state, keeping all buffer allocations.
    pub fn reset(&mut self) {
        self.width = u32::from(self.config.lit_width) + 1;
        self.hi = self.eof;
        self.overflow = 1 << self.width;
        self.last = INVALID_CODE;
        self.bits = 0;
        self.n_bits = 0;
        self.filled = 0;
    }

    /// Decode one complete LZW stream (no framing header).
    pub fn decode(&mut self, input: &[u8]) -> Result<Vec<u8>> {
        let mut out = Vec::with_capacity(input.len() * 2);
        self.run(input, &mut out, None)?;
        Ok(out)
    }

    /// Decode one complete stream, invoking `on_chunk` with the chunk size
    /// each time decoded bytes are flushed into the output (every ≈4 KiB
    /// and once at end of stream).
    ///
    /// The callback runs at a point where all codec invariants hold, which
    /// makes it a safe cooperative-yield site for host runtimes.
    pub fn decode_with(
        &mut self,
        input: &[u8],
        mut on_chunk: impl FnMut(usize),
    ) -> Result<Vec<u8>> {
        let mut out = Vec::with_capacity(input.len() * 2);
        self.run(input, &mut out, Some(&mut on_chunk))?;
        Ok(out)
    }

    /// Inspect `data` for the framing header; when present, decode the
    /// stream with the bit order the header declares and return the bytes.
    /// Returns `None` for any other prefix (carry-through payloads).
    pub fn decode_framed(&mut self, data: &[u8]) -> Result<Option<Vec<u8>>> {
        match unwrap_frame(data) {
            Some((order, stream)) => {
                self.config.order = order;
                Ok(Some(self.decode(stream)?))
            }
            None => Ok(None),
        }
    }

    /// [`LzwDecoder::decode_framed`] with the flush observer of
    /// [`LzwDecoder::decode_with`].
    pub fn decode_framed_with(
        &mut self,
        data: &[u8],
        mut on_chunk: impl FnMut(usize),
    ) -> Result<Option<Vec<u8>>> {
        match unwrap_frame(data) {
            Some((order, stream)) => {
                self.config.order = order;
                let mut out = Vec::with_capacity(stream.len() * 2);
                self.run(stream, &mut out, Some(&mut on_chunk))?;
                Ok(Some(out))
            }
            None => Ok(None),
        }
    }

    fn run(
        &mut self,
        input: &[u8],
        out: &mut Vec<u8>,
        mut observer: Option<&mut dyn FnMut(usize)>,
    ) -> Result<()> {
        self.reset();
        let mut pos = 0usize;
        loop {
            let code = self.read_code(input, &mut pos)?;
            if code < self.clear {
                // Literal: one byte, and it terminates last's extension.
                self.output[self.filled] = code as u8;
                self.filled += 1;
                if self.last != INVALID_CODE {
                    self.suffix[usize::from(self.hi)] = code as u8;
                    self.prefix[usize::from(self.hi)] = self.last;
                }
            } else if code == self.clear {
                self.width = u32::from(self.config.lit_width) + 1;
                self.hi = self.eof;
                self.overflow = 1 << self.width;
                self.last = INVALID_CODE;
                continue;
            } else if code == self.eof {
                break;
            } else if code <= self.hi {
                let mut c = code;
                let mut i = self.output.len() - 1;
                if code == self.hi && self.last != INVALID_CODE {
                    // Self-referential code: its expansion is last's
                    // expansion followed by last's first byte.
                    c = self.last;
                    while c >= self.clear {
                        c = self.prefix[usize::from(c)];
                    }
                    self.output[i] = c as u8;
                    i -= 1;
                    c = self.last;
                }
                while c >= self.clear {
                    self.output[i] = self.suffix[usize::from(c)];
                    i -= 1;
                    c = self.prefix[usize::from(c)];
                }
                self.output[i] = c as u8;
                let expansion = self.output.len() - i;
                self.output.copy_within(i.., self.filled);
                self.filled += expansion;
                if self.last != INVALID_CODE {
                    self.suffix[usize::from(self.hi)] = c as u8;
                    self.prefix[usize::from(self.hi)] = self.last;
                }
            } else {
                return Err(LzwError::InvalidCode { code, hi: self.hi });
            }
            self.last = code;
            self.hi += 1;
            if self.hi >= self.overflow {
                if self.width == MAX_WIDTH {
                    // Ceiling reached: undo the advance and stop adding
                    // entries until the next clear code.
                    self.last = INVALID_CODE;
                    self.hi -= 1;
                } else {
                    self.width += 1;
                    self.overflow <<= 1;
                }
            }
            if self.filled >= FLUSH_AT {
                out.extend_from_slice(&self.output[..self.filled]);
                if let Some(cb) = observer.as_mut() {
                    cb(self.filled);
                }
                self.filled = 0;
            }
        }
        if self.filled > 0 {
            out.extend_from_slice(&self.output[..self.filled]);
            if let Some(cb) = observer.as_mut() {
                cb(self.filled);
            }
            self.filled = 0;
        }
        Ok(())
    }

    fn read_code(&mut self, input: &[u8], pos: &mut usize) -> Result<u16> {
        while self.n_bits < self.width {
            let byte = *input
                .get(*pos)
                .ok_or(LzwError::UnexpectedEof { offset: *pos })?;
            *pos += 1;
            match self.config.order {
                BitOrder::Lsb => {
                    self.bits |= u32::from(byte) << self.n_bits;
                }
                BitOrder::Msb => {
                    self.bits |= u32::from(byte) << (24 - self.n_bits);
                }
            }
            self.n_bits += 8;
        }
        let code = match self.config.order {
            BitOrder::Lsb => {
                let code = (self.bits & ((1 << self.width) - 1)) as u16;
                self.bits >>= self.width;
                code
            }
            BitOrder::Msb => {
                let code = (self.bits >> (32 - self.width)) as u16;
                self.bits <<= self.width;
                code
            }
        };
        self.n_bits -= self.width;
        Ok(code)
    }
}
