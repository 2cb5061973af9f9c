//! LZW configuration: bit order and literal width.

use crate::error::{LzwError, Result};

/// Bit packing order of the code stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BitOrder {
    /// Least-significant bit first (GIF order). Codes are OR-ed into the
    /// accumulator at the current fill level and whole bytes drain from
    /// the low end.
    Lsb,
    /// Most-significant bit first (TIFF/PDF order). Codes are OR-ed in
    /// below the already-filled high bits and bytes drain from the high
    /// end.
    Msb,
}

/// LZW codec parameters.
///
/// `lit_width` is the bit width of input literals, 2..=8. The clear code
/// is `1 << lit_width`, end-of-stream is `clear + 1`, and the code width
/// starts at `lit_width + 1`, growing up to 12 bits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LzwConfig {
    /// Bit packing order.
    pub order: BitOrder,
    /// Literal width in bits.
    pub lit_width: u8,
}

impl LzwConfig {
    /// LSB-first, 8-bit literals. The pipeline default.
    pub const LSB: Self = Self::with_order(BitOrder::Lsb);

    /// MSB-first, 8-bit literals.
    pub const MSB: Self = Self::with_order(BitOrder::Msb);

    /// 8-bit literals with the given order.
    pub const fn with_order(order: BitOrder) -> Self {
        Self {
            order,
            lit_width: 8,
        }
    }

    /// Arbitrary literal width with the given order.
    pub const fn new(order: BitOrder, lit_width: u8) -> Self {
        Self { order, lit_width }
    }

    /// Reject literal widths outside 2..=8.
    pub fn validate(&self) -> Result<()> {
        if !(2..=8).contains(&self.lit_width) {
            return Err(LzwError::InvalidLitWidth(self.lit_width));
        }
        Ok(())
    }

    /// The dictionary-reset code, `1 << lit_width`.
    pub fn clear_code(&self) -> u16 {
        1 << self.lit_width
    }

    /// The end-of-stream code, `clear + 1`.
    pub fn eof_code(&self) -> u16 {
        self.clear_code() + 1
    }
}
