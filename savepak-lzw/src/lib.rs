//! # Savepak LZW
//!
//! Variable-width LZW compression for the savepak player-data pipeline.
//!
//! ## Format
//!
//! - Literal width 2..=8 bits (8 for the pipeline); clear code at
//!   `1 << lit_width`, end-of-stream code right after it
//! - Code width starts at `lit_width + 1` and grows to a 12-bit ceiling
//! - LSB-first (GIF order) or MSB-first (TIFF order) bit packing
//! - A framed payload starts with the bytes `l z w`; the first stream
//!   byte, derived from the leading clear code, doubles as the bit-order
//!   discriminator: 0x00 means LSB, 0x80 means MSB. Any other prefix
//!   means "not compressed, carry the payload through verbatim"
//!
//! The algorithm is shared with GIF/TIFF LZW but the framing is savepak's
//! own; blobs are not interchangeable with either container.
//!
//! ## Example
//!
//! ```rust
//! use savepak_lzw::{compress, decompress, BitOrder};
//!
//! let blob = compress(b"TOBEORNOTTOBEORTOBEORNOT", BitOrder::Lsb).unwrap();
//! assert_eq!(&blob[..3], b"lzw");
//! assert_eq!(decompress(&blob).unwrap(), b"TOBEORNOTTOBEORTOBEORNOT");
//!
//! // Unframed payloads pass through unchanged.
//! assert_eq!(decompress(b"plain").unwrap(), b"plain");
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![forbid(unsafe_code)]

mod config;
mod decoder;
mod encoder;
mod error;

pub use config::{BitOrder, LzwConfig};
pub use decoder::LzwDecoder;
pub use encoder::LzwEncoder;
pub use error::{LzwError, Result};

/// Framing magic preceding every compressed payload.
pub const MAGIC: [u8; 3] = *b"lzw";

/// Check `data` for the framing header.
///
/// Returns the declared bit order and the LZW stream (which still begins
/// with the discriminator byte; it is the first byte of the stream
/// proper), or `None` when the prefix does not match.
pub fn unwrap_frame(data: &[u8]) -> Option<(BitOrder, &[u8])> {
    if data.len() < 4 || data[..3] != MAGIC {
        return None;
    }
    match data[3] {
        0x00 => Some((BitOrder::Lsb, &data[3..])),
        0x80 => Some((BitOrder::Msb, &data[3..])),
        _ => None,
    }
}

/// Compress `data` into a framed payload with 8-bit literals.
pub fn compress(data: &[u8], order: BitOrder) -> Result<Vec<u8>> {
    let mut encoder = LzwEncoder::new(LzwConfig::with_order(order))?;
    encoder.encode_framed(data)
}

/// Decompress a framed payload; unframed payloads are returned verbatim.
pub fn decompress(data: &[u8]) -> Result<Vec<u8>> {
    let mut decoder = LzwDecoder::new(LzwConfig::LSB)?;
    match decoder.decode_framed(data)? {
        Some(bytes) => Ok(bytes),
        None => Ok(data.to_vec()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_framed_roundtrip_both_orders() {
        let data = b"The quick brown fox jumps over the lazy dog. ".repeat(8);
        for order in [BitOrder::Lsb, BitOrder::Msb] {
            let blob = compress(&data, order).unwrap();
            assert_eq!(decompress(&blob).unwrap(), data);
        }
    }

    #[test]
    fn test_unwrap_frame() {
        assert!(unwrap_frame(b"lzw\x00rest").is_some());
        assert_eq!(unwrap_frame(b"lzw\x80rest").unwrap().0, BitOrder::Msb);
        assert!(unwrap_frame(b"lzw\x42rest").is_none());
        assert!(unwrap_frame(b"lzw").is_none());
        assert!(unwrap_frame(b"gzip").is_none());
        assert!(unwrap_frame(b"").is_none());
    }

    #[test]
    fn test_discriminator_is_part_of_stream() {
        let blob = compress(b"xyz", BitOrder::Lsb).unwrap();
        let (order, stream) = unwrap_frame(&blob).unwrap();
        assert_eq!(order, BitOrder::Lsb);
        assert_eq!(stream[0], blob[3]);
        assert_eq!(stream.len(), blob.len() - 3);
    }

    #[test]
    fn test_passthrough() {
        assert_eq!(decompress(b"").unwrap(), b"");
        assert_eq!(decompress(b"lz").unwrap(), b"lz");
        assert_eq!(decompress(b"not lzw data").unwrap(), b"not lzw data");
    }
}
