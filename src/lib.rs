//! Parser and glyph query interface for BDF (Glyph Bitmap Distribution Format)
//! bitmap fonts.
//!
//! # Usage
//! ```
//! use bdf_raster::{Face, FixedPoint, Font};
//!
//! const SOURCE: &str = "\
//! FONT -test-block-medium-r-normal--8-80-75-75-c-80-iso8859-1
//! SIZE 8 75 75
//! FONT_ASCENT 7
//! FONT_DESCENT 1
//! CHARSET_REGISTRY \"ISO8859\"
//! CHARSET_ENCODING \"1\"
//! CHARS 1
//! STARTCHAR block
//! ENCODING 35
//! DWIDTH 8 0
//! BBX 8 2 0 0
//! BITMAP
//! FF
//! 81
//! ENDCHAR
//! ENDFONT
//! ";
//!
//! let font: Font = SOURCE.parse()?;
//! let face = font.face();
//!
//! let glyph = face.glyph(FixedPoint::from_ints(0, 7), '#').unwrap();
//! assert_eq!((glyph.dest.min.y, glyph.dest.max.y), (5, 7));
//! assert_eq!(glyph.mask.row(1), &[255, 0, 0, 0, 0, 0, 0, 255]);
//! assert_eq!(face.metrics().height.floor(), 8);
//! # Ok::<(), bdf_raster::ParseError>(())
//! ```
//!
//! ## Grayscale
//! A fourth `SIZE` argument sets the bits per sample. Samples are scaled to
//! `0..=255`, so a 2-bit font decodes to the levels 0, 85, 170 and 255.
//!
//! ## Serialization
//! With the `serde-serialize`/`serde-deserialize` and
//! `rkyv-serialize`/`rkyv-deserialize` features, a parsed [`Font`] can be
//! stored and reloaded without going through the text format again.

#![cfg_attr(docs_rs, feature(doc_cfg))]
#![deny(missing_docs)]
#![warn(clippy::pedantic)]

pub mod bitmap;
pub mod charmap;
mod face;
mod geom;
mod meta;
mod parse;

pub use bitmap::{decode_hex, decode_row, BitDepth, RowError};
pub use charmap::{resolve, Charmap};
pub use face::{BdfFace, Face, GlyphBounds, GlyphRaster, Metrics};
pub use geom::{Fixed, FixedPoint, FixedRect, Point, Rect};
pub use meta::{Character, Font, Lookup, Raster};
pub use parse::{parse, ErrorKind, ParseError};

#[cfg(feature = "bin")]
mod cli;

#[cfg(feature = "bin")]
#[cfg_attr(docs_rs, doc(cfg(feature = "bin")))]
pub use cli::{run, text_to_image, Args, CliError};
