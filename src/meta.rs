//! The parsed font model: glyph rasters, characters and their lookup.

use std::collections::HashMap;

use crate::bitmap::BitDepth;
use crate::face::BdfFace;

/// A glyph image holding one 8-bit intensity sample per pixel, row-major.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde-serialize", derive(serde::Serialize))]
#[cfg_attr(feature = "serde-deserialize", derive(serde::Deserialize))]
#[cfg_attr(any(feature = "rkyv-serialize", feature = "rkyv-deserialize"), derive(rkyv::Archive))]
#[cfg_attr(feature = "rkyv-serialize", derive(rkyv::Serialize))]
#[cfg_attr(feature = "rkyv-deserialize", derive(rkyv::Deserialize))]
pub struct Raster {
    width: usize,
    height: usize,
    pixels: Vec<u8>,
}

impl Raster {
    /// Largest number of samples a single raster may hold.
    pub const MAX_AREA: usize = 1 << 24;

    /// A fully transparent `width` by `height` raster, or `None` if it would
    /// hold more than [`Raster::MAX_AREA`] samples.
    #[must_use]
    pub fn new(width: usize, height: usize) -> Option<Self> {
        let area = width.checked_mul(height).filter(|&area| area <= Self::MAX_AREA)?;
        Some(Self { width, height, pixels: vec![0; area] })
    }

    /// Width in pixels.
    #[must_use]
    pub fn width(&self) -> usize {
        self.width
    }

    /// Height in pixels.
    #[must_use]
    pub fn height(&self) -> usize {
        self.height
    }

    /// Bytes per row. Always equal to the width.
    #[must_use]
    pub fn stride(&self) -> usize {
        self.width
    }

    /// All samples, row by row.
    #[must_use]
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    /// The samples of row `y`, top to bottom.
    ///
    /// # Panics
    ///
    /// Panics if `y` is out of bounds.
    #[must_use]
    pub fn row(&self, y: usize) -> &[u8] {
        &self.pixels[y * self.width..(y + 1) * self.width]
    }

    pub(crate) fn row_mut(&mut self, y: usize) -> &mut [u8] {
        &mut self.pixels[y * self.width..(y + 1) * self.width]
    }

    /// The sample at column `x` of row `y`, if inside the raster.
    #[must_use]
    pub fn get(&self, x: usize, y: usize) -> Option<u8> {
        (x < self.width && y < self.height).then(|| self.pixels[y * self.width + x])
    }
}

/// One decoded glyph.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde-serialize", derive(serde::Serialize))]
#[cfg_attr(feature = "serde-deserialize", derive(serde::Deserialize))]
#[cfg_attr(any(feature = "rkyv-serialize", feature = "rkyv-deserialize"), derive(rkyv::Archive))]
#[cfg_attr(feature = "rkyv-serialize", derive(rkyv::Serialize))]
#[cfg_attr(feature = "rkyv-deserialize", derive(rkyv::Deserialize))]
pub struct Character {
    pub(crate) name: String,
    pub(crate) code_point: Option<u32>,
    pub(crate) advance: [i32; 2],
    pub(crate) origin: [i32; 2],
    pub(crate) raster: Raster,
}

impl Character {
    /// The `STARTCHAR` name. Not necessarily unique.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Code point this glyph was registered under, or `None` for glyphs
    /// outside the font's encoding.
    #[must_use]
    pub fn code_point(&self) -> Option<u32> {
        self.code_point
    }

    /// Pen displacement after drawing this glyph, from `DWIDTH`.
    #[must_use]
    pub fn advance(&self) -> [i32; 2] {
        self.advance
    }

    /// Offset of the raster's lower-left corner from the glyph origin, from `BBX`.
    #[must_use]
    pub fn origin(&self) -> [i32; 2] {
        self.origin
    }

    /// The decoded glyph image.
    #[must_use]
    pub fn raster(&self) -> &Raster {
        &self.raster
    }
}

/// Outcome of [`Font::lookup`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lookup<'a> {
    /// The font has a glyph for the requested code point.
    Exact(&'a Character),
    /// The requested code point is missing; this is the default glyph.
    Fallback(&'a Character),
    /// Neither the requested nor the default glyph exists.
    Missing,
}

impl<'a> Lookup<'a> {
    /// The glyph to draw, if any.
    #[must_use]
    pub fn character(self) -> Option<&'a Character> {
        match self {
            Lookup::Exact(c) | Lookup::Fallback(c) => Some(c),
            Lookup::Missing => None,
        }
    }
}

/// A parsed BDF font.
///
/// Built once by [`parse`](crate::parse) and read-only afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde-serialize", derive(serde::Serialize))]
#[cfg_attr(feature = "serde-deserialize", derive(serde::Deserialize))]
#[cfg_attr(any(feature = "rkyv-serialize", feature = "rkyv-deserialize"), derive(rkyv::Archive))]
#[cfg_attr(feature = "rkyv-serialize", derive(rkyv::Serialize))]
#[cfg_attr(feature = "rkyv-deserialize", derive(rkyv::Deserialize))]
pub struct Font {
    pub(crate) name: String,
    pub(crate) point_size: i32,
    pub(crate) pixel_size: i32,
    pub(crate) dpi: [i32; 2],
    pub(crate) bit_depth: BitDepth,
    pub(crate) ascent: i32,
    pub(crate) descent: i32,
    pub(crate) cap_height: i32,
    pub(crate) x_height: i32,
    pub(crate) characters: Vec<Character>,
    pub(crate) index: HashMap<u32, usize>,
    pub(crate) charset_id: String,
    pub(crate) default_code_point: Option<u32>,
}

impl Font {
    /// The `FONT` name, usually an XLFD string.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Nominal point size from `SIZE`.
    #[must_use]
    pub fn point_size(&self) -> i32 {
        self.point_size
    }

    /// `PIXEL_SIZE` property.
    #[must_use]
    pub fn pixel_size(&self) -> i32 {
        self.pixel_size
    }

    /// Horizontal and vertical resolution from `SIZE`.
    #[must_use]
    pub fn dpi(&self) -> [i32; 2] {
        self.dpi
    }

    /// Bits per raster sample.
    #[must_use]
    pub fn bit_depth(&self) -> BitDepth {
        self.bit_depth
    }

    /// `FONT_ASCENT`, in pixels above the baseline.
    #[must_use]
    pub fn ascent(&self) -> i32 {
        self.ascent
    }

    /// `FONT_DESCENT`, in pixels below the baseline.
    #[must_use]
    pub fn descent(&self) -> i32 {
        self.descent
    }

    /// `CAP_HEIGHT` property.
    #[must_use]
    pub fn cap_height(&self) -> i32 {
        self.cap_height
    }

    /// `X_HEIGHT` property.
    #[must_use]
    pub fn x_height(&self) -> i32 {
        self.x_height
    }

    /// All glyphs in source order.
    #[must_use]
    pub fn characters(&self) -> &[Character] {
        &self.characters
    }

    /// `CHARSET_REGISTRY` and `CHARSET_ENCODING` joined by a dash.
    #[must_use]
    pub fn charset_id(&self) -> &str {
        &self.charset_id
    }

    /// Code point drawn in place of missing glyphs.
    #[must_use]
    pub fn default_code_point(&self) -> Option<u32> {
        self.default_code_point
    }

    /// The glyph registered for `code_point`, without fallback.
    #[must_use]
    pub fn get(&self, code_point: u32) -> Option<&Character> {
        self.index.get(&code_point).map(|&i| &self.characters[i])
    }

    /// Resolves `code_point` to a glyph, falling back to the default glyph.
    #[must_use]
    pub fn lookup(&self, code_point: u32) -> Lookup<'_> {
        if let Some(c) = self.get(code_point) {
            return Lookup::Exact(c);
        }

        match self.default_code_point.and_then(|d| self.get(d)) {
            Some(c) => Lookup::Fallback(c),
            None => Lookup::Missing,
        }
    }

    /// A [`Face`](crate::Face) over this font.
    #[must_use]
    pub fn face(&self) -> BdfFace<'_> {
        BdfFace::new(self)
    }
}
