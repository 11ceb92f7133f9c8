//! The glyph query interface consumed by text renderers.

use crate::geom::{Fixed, FixedPoint, FixedRect, Point, Rect};
use crate::meta::{Character, Font, Raster};

/// Font-wide vertical metrics in 26.6 units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Metrics {
    /// Distance from the baseline to the top of the line.
    pub ascent: Fixed,
    /// Distance from the baseline to the bottom of the line.
    pub descent: Fixed,
    /// Height of capital letters above the baseline.
    pub cap_height: Fixed,
    /// Height of lowercase letters above the baseline.
    pub x_height: Fixed,
    /// Recommended line spacing, `ascent + descent`.
    pub height: Fixed,
}

/// A glyph placed at a pen position, ready to be composited.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GlyphRaster<'a> {
    /// Where the mask lands in destination pixel space.
    pub dest: Rect,
    /// Intensity samples to draw through.
    pub mask: &'a Raster,
    /// Position in `mask` that corresponds to `dest.min`.
    pub mask_origin: Point,
    /// Horizontal pen advance.
    pub advance: Fixed,
}

/// Ink bounds of a glyph relative to the pen position, y pointing down.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct GlyphBounds {
    /// The bounding box. On a miss, a zero-width box spanning the line.
    pub bounds: FixedRect,
    /// Horizontal pen advance, zero on a miss.
    pub advance: Fixed,
    /// Whether a glyph, possibly the default one, was found.
    pub found: bool,
}

/// Read-only glyph source for a text renderer.
///
/// All values are in 26.6 units. Methods that take a `char` fall back to the
/// font's default glyph when it has no glyph of its own.
pub trait Face {
    /// Vertical metrics of the whole font.
    fn metrics(&self) -> Metrics;

    /// Extra horizontal adjustment between `left` and `right`.
    fn kern(&self, left: char, right: char) -> Fixed;

    /// Places the glyph for `ch` with its origin at `dot`.
    ///
    /// Returns `None` if there is nothing to draw, not even a default glyph.
    fn glyph(&self, dot: FixedPoint, ch: char) -> Option<GlyphRaster<'_>>;

    /// The bounding box and advance of the glyph for `ch`.
    fn glyph_bounds(&self, ch: char) -> GlyphBounds;

    /// The horizontal advance of the glyph for `ch`.
    fn glyph_advance(&self, ch: char) -> Option<Fixed>;
}

/// [`Face`] implementation backed by a parsed [`Font`].
#[derive(Debug, Clone, Copy)]
pub struct BdfFace<'a> {
    font: &'a Font,
}

impl<'a> BdfFace<'a> {
    /// Wraps `font`.
    #[must_use]
    pub fn new(font: &'a Font) -> Self {
        Self { font }
    }

    /// The underlying font.
    #[must_use]
    pub fn font(&self) -> &'a Font {
        self.font
    }

    fn character(&self, ch: char) -> Option<&'a Character> {
        self.font.lookup(u32::from(ch)).character()
    }
}

fn extent(len: usize) -> i32 {
    i32::try_from(len).unwrap_or(i32::MAX)
}

impl Face for BdfFace<'_> {
    fn metrics(&self) -> Metrics {
        let font = self.font;
        Metrics {
            ascent: Fixed::from_int(font.ascent()),
            descent: Fixed::from_int(font.descent()),
            cap_height: Fixed::from_int(font.cap_height()),
            x_height: Fixed::from_int(font.x_height()),
            height: Fixed::from_int(font.ascent().saturating_add(font.descent())),
        }
    }

    fn kern(&self, _left: char, _right: char) -> Fixed {
        Fixed::ZERO
    }

    fn glyph(&self, dot: FixedPoint, ch: char) -> Option<GlyphRaster<'_>> {
        let c = self.character(ch)?;
        let [lx, ly] = c.origin();
        let (width, height) = (extent(c.raster().width()), extent(c.raster().height()));

        // BBX offsets are measured up from the baseline, pixel rows grow down
        let x = dot.x.floor().saturating_add(lx);
        let y = dot.y.floor().saturating_sub(ly);

        Some(GlyphRaster {
            dest: Rect {
                min: Point { x, y: y.saturating_sub(height) },
                max: Point { x: x.saturating_add(width), y },
            },
            mask: c.raster(),
            mask_origin: Point::default(),
            advance: Fixed::from_int(c.advance()[0]),
        })
    }

    fn glyph_bounds(&self, ch: char) -> GlyphBounds {
        let Some(c) = self.character(ch) else {
            return GlyphBounds {
                bounds: FixedRect::from_ints(0, self.font.ascent().saturating_neg(), 0, self.font.descent()),
                advance: Fixed::ZERO,
                found: false,
            };
        };

        let [lx, ly] = c.origin();
        let (width, height) = (extent(c.raster().width()), extent(c.raster().height()));
        GlyphBounds {
            bounds: FixedRect::from_ints(
                lx,
                ly.saturating_add(height).saturating_neg(),
                lx.saturating_add(width),
                ly.saturating_neg(),
            ),
            advance: Fixed::from_int(c.advance()[0]),
            found: true,
        }
    }

    fn glyph_advance(&self, ch: char) -> Option<Fixed> {
        self.character(ch).map(|c| Fixed::from_int(c.advance()[0]))
    }
}
