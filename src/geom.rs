//! 26.6 fixed-point values and the pixel-space rectangles glyphs are placed in.

use std::ops::{Add, AddAssign, Neg, Sub};

/// A 26.6 fixed-point number: 26 integer bits and 6 fractional bits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[repr(transparent)]
pub struct Fixed(i32);

impl Fixed {
    /// Number of fractional bits.
    pub const FRAC_BITS: u32 = 6;
    /// Zero.
    pub const ZERO: Fixed = Fixed(0);
    /// One whole unit.
    pub const ONE: Fixed = Fixed(1 << Self::FRAC_BITS);

    /// Wraps raw 26.6 bits.
    #[inline]
    #[must_use]
    pub const fn from_bits(bits: i32) -> Self {
        Self(bits)
    }

    /// Raw 26.6 bits.
    #[inline]
    #[must_use]
    pub const fn to_bits(self) -> i32 {
        self.0
    }

    /// Converts whole units, saturating at the representable range.
    #[inline]
    #[must_use]
    pub const fn from_int(units: i32) -> Self {
        Self(units.saturating_mul(Self::ONE.0))
    }

    /// Whole units, rounded towards negative infinity.
    #[inline]
    #[must_use]
    pub const fn floor(self) -> i32 {
        self.0 >> Self::FRAC_BITS
    }
}

impl Add for Fixed {
    type Output = Self;

    #[inline]
    fn add(self, rhs: Self) -> Self {
        Self(self.0.saturating_add(rhs.0))
    }
}

impl AddAssign for Fixed {
    #[inline]
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

impl Sub for Fixed {
    type Output = Self;

    #[inline]
    fn sub(self, rhs: Self) -> Self {
        Self(self.0.saturating_sub(rhs.0))
    }
}

impl Neg for Fixed {
    type Output = Self;

    #[inline]
    fn neg(self) -> Self {
        Self(self.0.saturating_neg())
    }
}

/// A point in 26.6 coordinates, y pointing down.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct FixedPoint {
    /// Horizontal component.
    pub x: Fixed,
    /// Vertical component.
    pub y: Fixed,
}

impl FixedPoint {
    /// Point at whole-unit coordinates.
    #[must_use]
    pub const fn from_ints(x: i32, y: i32) -> Self {
        Self { x: Fixed::from_int(x), y: Fixed::from_int(y) }
    }
}

/// A rectangle in 26.6 coordinates, `min` inclusive and `max` exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct FixedRect {
    /// Top-left corner.
    pub min: FixedPoint,
    /// Bottom-right corner.
    pub max: FixedPoint,
}

impl FixedRect {
    /// Rectangle from whole-unit corner coordinates.
    #[must_use]
    pub const fn from_ints(min_x: i32, min_y: i32, max_x: i32, max_y: i32) -> Self {
        Self {
            min: FixedPoint::from_ints(min_x, min_y),
            max: FixedPoint::from_ints(max_x, max_y),
        }
    }
}

/// An integer pixel position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Point {
    /// Column.
    pub x: i32,
    /// Row.
    pub y: i32,
}

/// A pixel rectangle, `min` inclusive and `max` exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Rect {
    /// Top-left corner.
    pub min: Point,
    /// Bottom-right corner.
    pub max: Point,
}

impl Rect {
    /// Width in pixels, zero for inverted rectangles.
    #[must_use]
    pub fn width(&self) -> i32 {
        self.max.x.saturating_sub(self.min.x).max(0)
    }

    /// Height in pixels, zero for inverted rectangles.
    #[must_use]
    pub fn height(&self) -> i32 {
        self.max.y.saturating_sub(self.min.y).max(0)
    }

    /// True if the rectangle covers no pixels.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.width() == 0 || self.height() == 0
    }
}
