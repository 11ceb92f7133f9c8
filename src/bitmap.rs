//! Decoding of `BITMAP` rows into 8-bit intensity samples.

use thiserror::Error;

/// Number of bits per raster sample, between 1 and 8.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde-serialize", derive(serde::Serialize))]
#[cfg_attr(feature = "serde-deserialize", derive(serde::Deserialize))]
#[cfg_attr(any(feature = "rkyv-serialize", feature = "rkyv-deserialize"), derive(rkyv::Archive))]
#[cfg_attr(feature = "rkyv-serialize", derive(rkyv::Serialize))]
#[cfg_attr(feature = "rkyv-deserialize", derive(rkyv::Deserialize))]
pub struct BitDepth(u8);

impl BitDepth {
    /// Plain two-level bitmaps, the BDF default.
    pub const ONE: BitDepth = BitDepth(1);

    /// Returns `None` unless `bits` is in `1..=8`.
    #[must_use]
    pub fn new(bits: u8) -> Option<Self> {
        (1..=8).contains(&bits).then_some(BitDepth(bits))
    }

    /// Bits per sample.
    #[must_use]
    pub fn bits(self) -> u8 {
        self.0
    }

    /// Largest raw sample value, `2^bits - 1`.
    #[must_use]
    pub fn max_value(self) -> u16 {
        (1u16 << self.0) - 1
    }

    /// Scales a raw sample to `0..=255`, rounding to nearest.
    #[must_use]
    pub fn scale(self, raw: u16) -> u8 {
        let max = u32::from(self.max_value());
        let raw = u32::from(raw).min(max);
        u8::try_from((raw * 255 + max / 2) / max).unwrap_or(u8::MAX)
    }
}

impl Default for BitDepth {
    fn default() -> Self {
        BitDepth::ONE
    }
}

/// Reasons a bitmap row is rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RowError {
    /// The row is not an even-length string of hex digits.
    #[error("`{0}` is not a hex-encoded byte string")]
    InvalidHex(String),
    /// The row holds fewer bits than the glyph width calls for.
    #[error("row has {available} bits, glyph needs {needed}")]
    TooShort {
        /// Bits required by `width * bit depth`.
        needed: usize,
        /// Bits actually present.
        available: usize,
    },
    /// More rows were given than the glyph's `BBX` height.
    #[error("glyph is only {height} rows tall")]
    TooManyRows {
        /// Declared height.
        height: usize,
    },
}

/// Decodes a row such as `"3C"` or `"0ff0"` into bytes.
///
/// # Errors
///
/// Returns [`RowError::InvalidHex`] on odd lengths or non-hex digits.
pub fn decode_hex(row: &str) -> Result<Vec<u8>, RowError> {
    let invalid = || RowError::InvalidHex(row.to_owned());

    let digits = row.as_bytes();
    if digits.len() % 2 != 0 {
        return Err(invalid());
    }

    digits
        .chunks_exact(2)
        .map(|pair| {
            let hi = nibble(pair[0]).ok_or_else(invalid)?;
            let lo = nibble(pair[1]).ok_or_else(invalid)?;
            Ok(hi << 4 | lo)
        })
        .collect()
}

fn nibble(digit: u8) -> Option<u8> {
    match digit {
        b'0'..=b'9' => Some(digit - b'0'),
        b'a'..=b'f' => Some(digit - b'a' + 10),
        b'A'..=b'F' => Some(digit - b'A' + 10),
        _ => None,
    }
}

fn bit_at(packed: &[u8], index: usize) -> u16 {
    u16::from(packed[index >> 3] >> (7 - (index % 8)) & 1)
}

/// Unpacks `width` samples of `depth` bits each from `packed`, MSB first,
/// into the front of `out`.
///
/// Samples may straddle byte boundaries. Trailing padding bits are ignored.
///
/// # Errors
///
/// Returns [`RowError::TooShort`] if `packed` holds fewer than
/// `width * depth` bits.
///
/// # Panics
///
/// Panics if `out` is shorter than `width`.
pub fn decode_row(packed: &[u8], width: usize, depth: BitDepth, out: &mut [u8]) -> Result<(), RowError> {
    let bits = usize::from(depth.bits());
    let needed = width * bits;
    let available = packed.len() * 8;
    if available < needed {
        return Err(RowError::TooShort { needed, available });
    }

    for (i, sample) in out[..width].iter_mut().enumerate() {
        let raw = (0..bits).fold(0u16, |acc, j| acc << 1 | bit_at(packed, i * bits + j));
        *sample = depth.scale(raw);
    }

    Ok(())
}
