//! # Savepak Store
//!
//! The pipeline façade of the savepak player-data persistence library.
//!
//! Host storage grants roughly 32 KiB per player and meters work per
//! frame, so a save blob is produced in two bounded stages: the value is
//! serialized with the MessagePack codec, then LZW-compressed behind a
//! self-describing header. Payloads whose serialized form already
//! exceeds a soft cap skip compression entirely to stay inside the
//! per-frame budget; the header makes both shapes self-identifying on
//! the way back in.
//!
//! ## Example
//!
//! ```rust
//! use savepak_store::Pipeline;
//! use savepak_msgpack::Value;
//!
//! let mut pipeline = Pipeline::new();
//! let value = Value::Map(vec![
//!     (Value::Str("xp".into()), Value::Int(10_450)),
//!     (Value::Str("name".into()), Value::Str("ada".into())),
//! ]);
//! let packed = pipeline.compress(&value).unwrap();
//! assert_eq!(pipeline.decompress(&packed.data).unwrap(), value);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![forbid(unsafe_code)]

mod error;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use log::debug;

use savepak_lzw::{BitOrder, LzwConfig, LzwDecoder, LzwEncoder};
use savepak_msgpack::{encode, EncodeOptions, Value};

pub use error::{Result, StoreError};
pub use savepak_lzw::MAGIC;

/// Serialized size above which compression is skipped.
///
/// Sized so that the LZW pass on a compressible payload stays within the
/// host's per-frame instruction budget.
pub const DEFAULT_SOFT_CAP: usize = 4090;

/// Pipeline configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PipelineOptions {
    /// LZW bit order for newly produced blobs.
    pub order: BitOrder,
    /// Serialized size above which blobs are stored uncompressed.
    pub soft_cap: usize,
    /// Serialization configuration.
    pub encode: EncodeOptions,
    /// Caller-chosen schema version, reported beside each blob.
    pub version: u32,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            order: BitOrder::Lsb,
            soft_cap: DEFAULT_SOFT_CAP,
            encode: EncodeOptions::PIPELINE,
            version: 1,
        }
    }
}

/// One produced blob with its size report.
#[derive(Debug, Clone, PartialEq)]
pub struct Packed {
    /// The stored bytes: LZW-framed, or the raw serialized form when the
    /// soft cap was exceeded.
    pub data: Vec<u8>,
    /// Serialized (pre-compression) size in bytes.
    pub raw_len: usize,
    /// Stored size in bytes.
    pub packed_len: usize,
    /// `packed_len / raw_len` to three decimals, rounded down; exactly
    /// 1.0 for uncompressed blobs.
    pub ratio: f64,
    /// The schema version the blob was produced under. Stored beside the
    /// blob by the caller, never inside it.
    pub version: u32,
}

/// The serialize-and-compress pipeline.
///
/// A pipeline owns one LZW encoder and one decoder so their dictionary
/// and scratch buffers amortize across blobs. Instances are
/// single-threaded; give each worker its own.
#[derive(Debug)]
pub struct Pipeline {
    options: PipelineOptions,
    encoder: LzwEncoder,
    decoder: LzwDecoder,
}

impl Pipeline {
    /// Create a pipeline with default options.
    pub fn new() -> Self {
        Self::with_options(PipelineOptions::default())
    }

    /// Create a pipeline with explicit options.
    pub fn with_options(options: PipelineOptions) -> Self {
        let config = LzwConfig::with_order(options.order);
        Self {
            options,
            encoder: LzwEncoder::new(config).expect("8-bit literal width is always valid"),
            decoder: LzwDecoder::new(config).expect("8-bit literal width is always valid"),
        }
    }

    /// The active options.
    pub fn options(&self) -> &PipelineOptions {
        &self.options
    }

    /// Serialize and compress `value`.
    ///
    /// When the serialized form exceeds the soft cap it is returned
    /// unchanged (no framing header) with a ratio of exactly 1.0.
    pub fn compress(&mut self, value: &Value) -> Result<Packed> {
        let raw = encode(value, &self.options.encode)?;
        let raw_len = raw.len();
        if raw_len > self.options.soft_cap {
            debug!(
                "serialized {} bytes exceed the {}-byte soft cap; storing uncompressed",
                raw_len, self.options.soft_cap
            );
            return Ok(Packed {
                data: raw,
                raw_len,
                packed_len: raw_len,
                ratio: 1.0,
                version: self.options.version,
            });
        }
        let data = self.encoder.encode_framed(&raw)?;
        let packed_len = data.len();
        let ratio = floor_ratio(packed_len, raw_len);
        debug!(
            "packed {raw_len} -> {packed_len} bytes (ratio {ratio:.3}, order {:?})",
            self.options.order
        );
        Ok(Packed {
            data,
            raw_len,
            packed_len,
            ratio,
            version: self.options.version,
        })
    }

    /// Decompress and deserialize a stored blob.
    ///
    /// Blobs carrying the framing header are LZW-decoded first (in the
    /// bit order the header declares, regardless of this pipeline's own
    /// order); anything else is treated as a raw serialized payload.
    pub fn decompress(&mut self, data: &[u8]) -> Result<Value> {
        match self.decoder.decode_framed(data)? {
            Some(raw) => {
                debug!("unpacked {} -> {} bytes", data.len(), raw.len());
                Ok(savepak_msgpack::decode(&raw)?)
            }
            None => Ok(savepak_msgpack::decode(data)?),
        }
    }

    /// [`Pipeline::decompress`] with a callback at every ≈4 KiB of
    /// decompressed output.
    ///
    /// The callback receives the chunk size and runs with all codec
    /// invariants intact, which makes it a safe cooperative-yield point
    /// inside a host runtime; outside one it is a no-op hook.
    pub fn decompress_with_progress(
        &mut self,
        data: &[u8],
        on_chunk: impl FnMut(usize),
    ) -> Result<Value> {
        match self.decoder.decode_framed_with(data, on_chunk)? {
            Some(raw) => Ok(savepak_msgpack::decode(&raw)?),
            None => Ok(savepak_msgpack::decode(data)?),
        }
    }

    /// [`Pipeline::compress`], then wrap the blob in standard base64 for
    /// string-typed host storage.
    pub fn compress_base64(&mut self, value: &Value) -> Result<String> {
        let packed = self.compress(value)?;
        Ok(BASE64.encode(packed.data))
    }

    /// Unwrap standard base64, then [`Pipeline::decompress`].
    pub fn decompress_base64(&mut self, text: &str) -> Result<Value> {
        let data = BASE64.decode(text)?;
        self.decompress(&data)
    }
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::new()
    }
}

/// Convenience one-shot compress with default options.
pub fn compress(value: &Value) -> Result<Packed> {
    Pipeline::new().compress(value)
}

/// Convenience one-shot decompress with default options.
pub fn decompress(data: &[u8]) -> Result<Value> {
    Pipeline::new().decompress(data)
}

/// `packed / raw` to three decimals, rounded down.
fn floor_ratio(packed: usize, raw: usize) -> f64 {
    (packed as f64 / raw as f64 * 1000.0).floor() / 1000.0
}
