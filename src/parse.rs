//! The two-pass BDF reader: global properties up to `CHARS`, then one block
//! per glyph.

use std::borrow::Cow;
use std::collections::HashMap;
use std::str::FromStr;

use thiserror::Error;
use tracing::{debug, trace, warn};

use crate::bitmap::{self, BitDepth, RowError};
use crate::charmap::{self, Charmap};
use crate::meta::{Character, Font, Raster};

/// Raw code of the default glyph when the font names none (space).
const FALLBACK_DEFAULT_CHAR: i64 = 32;

/// Upper bound on the glyph slots reserved up front from `CHARS`.
const MAX_PREALLOCATED_GLYPHS: usize = 1 << 16;

/// A parse failure and the line it occurred on.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("line {line}: {kind}")]
pub struct ParseError {
    /// 1-based line number.
    pub line: usize,
    /// What went wrong.
    pub kind: ErrorKind,
}

/// The ways a BDF source can be rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ErrorKind {
    /// A known keyword with missing or unusable arguments, or used out of place.
    #[error("malformed {keyword} line: {reason}")]
    MalformedLine {
        /// The line's first token.
        keyword: String,
        /// Human-readable cause.
        reason: String,
    },
    /// The number of glyph blocks does not match `CHARS`.
    #[error("font declares {declared} glyphs but has {found}")]
    GlyphCountMismatch {
        /// Count given by `CHARS`.
        declared: usize,
        /// Blocks seen so far.
        found: usize,
    },
    /// A `BITMAP` row that cannot be decoded.
    #[error("malformed bitmap row: {0}")]
    MalformedBitmapRow(#[from] RowError),
    /// A glyph block with no `ENDCHAR`.
    #[error("glyph {name:?} is missing ENDCHAR")]
    UnterminatedGlyph {
        /// The glyph's `STARTCHAR` name.
        name: String,
    },
}

/// Parses a BDF font.
///
/// # Errors
///
/// Fails on the first malformed line, and when the glyph blocks disagree with
/// the `CHARS` count. No partial font is returned.
pub fn parse(data: &[u8]) -> Result<Font, ParseError> {
    let mut lines = Lines::new(data);
    let mut font = Font::default();

    let Some(declared) = parse_globals(&mut lines, &mut font)? else {
        warn!(font = %font.name, "no CHARS line, font has no glyphs");
        return Ok(font);
    };

    parse_glyphs(&mut lines, &mut font, declared)?;

    debug!(
        font = %font.name,
        glyphs = font.characters.len(),
        charset = %font.charset_id,
        "parsed BDF font"
    );
    Ok(font)
}

impl FromStr for Font {
    type Err = ParseError;

    fn from_str(source: &str) -> Result<Self, Self::Err> {
        parse(source.as_bytes())
    }
}

struct Lines<'a> {
    rest: std::slice::Split<'a, u8, fn(&u8) -> bool>,
    number: usize,
}

fn is_newline(byte: &u8) -> bool {
    *byte == b'\n'
}

impl<'a> Lines<'a> {
    fn new(data: &'a [u8]) -> Self {
        Self { rest: data.split(is_newline as fn(&u8) -> bool), number: 0 }
    }
}

impl<'a> Iterator for Lines<'a> {
    type Item = (usize, Cow<'a, str>);

    fn next(&mut self) -> Option<Self::Item> {
        let raw = self.rest.next()?;
        let raw = raw.strip_suffix(b"\r").unwrap_or(raw);
        self.number += 1;
        Some((self.number, String::from_utf8_lossy(raw)))
    }
}

/// A line split into its keyword and the text after it.
struct Fields<'l> {
    line: usize,
    keyword: &'l str,
    rest: &'l str,
}

impl<'l> Fields<'l> {
    fn split(line: usize, text: &'l str) -> Self {
        let text = text.trim();
        let (keyword, rest) = text
            .split_once(|c: char| c.is_ascii_whitespace())
            .unwrap_or((text, ""));
        Self { line, keyword, rest: rest.trim_start() }
    }

    fn error(&self, reason: impl Into<String>) -> ParseError {
        ParseError {
            line: self.line,
            kind: ErrorKind::MalformedLine { keyword: self.keyword.to_owned(), reason: reason.into() },
        }
    }

    fn arg(&self, index: usize) -> Option<&'l str> {
        self.rest.split_ascii_whitespace().nth(index)
    }

    fn int<T: FromStr>(&self, index: usize) -> Result<T, ParseError> {
        let token = self
            .arg(index)
            .ok_or_else(|| self.error(format!("missing argument {}", index + 1)))?;
        token
            .parse()
            .map_err(|_| self.error(format!("`{token}` is not a valid integer here")))
    }

    /// The first argument with any surrounding double quotes removed.
    fn string(&self) -> Result<&'l str, ParseError> {
        let token = self.arg(0).ok_or_else(|| self.error("missing argument 1"))?;
        Ok(unquote(token))
    }

    /// Everything after the keyword, for values that may contain spaces.
    fn rest(&self) -> Result<&'l str, ParseError> {
        if self.rest.is_empty() {
            return Err(self.error("missing argument 1"));
        }
        Ok(unquote(self.rest.trim_end()))
    }
}

fn unquote(value: &str) -> &str {
    value
        .strip_prefix('"')
        .and_then(|v| v.strip_suffix('"'))
        .unwrap_or(value)
}

/// Reads header and property lines into `font` until `CHARS`.
///
/// Returns the declared glyph count, or `None` if the input ended first.
fn parse_globals(lines: &mut Lines<'_>, font: &mut Font) -> Result<Option<usize>, ParseError> {
    let mut registry = String::new();
    let mut encoding = String::new();
    let mut default_char = FALLBACK_DEFAULT_CHAR;
    let mut declared = None;

    for (line, text) in lines.by_ref() {
        let fields = Fields::split(line, &text);
        match fields.keyword {
            "FONT" => font.name = fields.rest()?.to_owned(),
            "SIZE" => {
                font.point_size = fields.int(0)?;
                font.dpi = [fields.int(1)?, fields.int(2)?];
                if fields.arg(3).is_some() {
                    let bits = fields.int(3)?;
                    font.bit_depth = BitDepth::new(bits)
                        .ok_or_else(|| fields.error(format!("unsupported bit depth {bits}")))?;
                }
            }
            "PIXEL_SIZE" => font.pixel_size = fields.int(0)?,
            "FONT_ASCENT" => font.ascent = fields.int(0)?,
            "FONT_DESCENT" => font.descent = fields.int(0)?,
            "CAP_HEIGHT" => font.cap_height = fields.int(0)?,
            "X_HEIGHT" => font.x_height = fields.int(0)?,
            "CHARSET_REGISTRY" => fields.string()?.clone_into(&mut registry),
            "CHARSET_ENCODING" => fields.string()?.clone_into(&mut encoding),
            "DEFAULT_CHAR" => default_char = fields.int(0)?,
            "CHARS" => {
                declared = Some(fields.int(0)?);
                break;
            }
            _ => trace!(line, keyword = fields.keyword, "ignoring header line"),
        }
    }

    font.charset_id = format!("{registry}-{encoding}");
    font.default_code_point = charmap::resolve(Charmap::find(&font.charset_id), default_char);

    Ok(declared)
}

/// A glyph between `STARTCHAR` and `ENDCHAR`.
struct OpenGlyph {
    opened_at: usize,
    character: Character,
    /// Next bitmap row to fill, once `BITMAP` has been seen.
    row: Option<usize>,
}

fn parse_glyphs(lines: &mut Lines<'_>, font: &mut Font, declared: usize) -> Result<(), ParseError> {
    let charmap = Charmap::find(&font.charset_id);
    let reserved = declared.min(MAX_PREALLOCATED_GLYPHS);
    let mut characters: Vec<Character> = Vec::with_capacity(reserved);
    let mut index: HashMap<u32, usize> = HashMap::with_capacity(reserved);
    let mut current: Option<OpenGlyph> = None;
    let mut last_line = lines.number;

    for (line, text) in lines.by_ref() {
        last_line = line;
        let fields = Fields::split(line, &text);

        if let Some(glyph) = current.as_mut() {
            if let Some(row) = glyph.row {
                if fields.keyword.is_empty() {
                    continue;
                }
                if fields.keyword != "ENDCHAR" {
                    decode_bitmap_row(glyph, row, fields.keyword, font.bit_depth)
                        .map_err(|e| ParseError { line, kind: e.into() })?;
                    glyph.row = Some(row + 1);
                    continue;
                }
            }
        }

        match fields.keyword {
            "STARTCHAR" => {
                if let Some(open) = &current {
                    return Err(unterminated(open));
                }
                if characters.len() == declared {
                    return Err(ParseError {
                        line,
                        kind: ErrorKind::GlyphCountMismatch { declared, found: declared + 1 },
                    });
                }
                current = Some(OpenGlyph {
                    opened_at: line,
                    character: Character { name: fields.rest()?.to_owned(), ..Character::default() },
                    row: None,
                });
            }
            "ENCODING" | "DWIDTH" | "BBX" | "BITMAP" | "ENDCHAR" => {
                let glyph = current
                    .as_mut()
                    .ok_or_else(|| fields.error("outside of a STARTCHAR block"))?;
                match fields.keyword {
                    "ENCODING" => {
                        glyph.character.code_point = charmap::resolve(charmap, fields.int(0)?);
                    }
                    "DWIDTH" => glyph.character.advance = [fields.int(0)?, fields.int(1)?],
                    "BBX" => {
                        let (width, height) = (fields.int(0)?, fields.int(1)?);
                        glyph.character.origin = [fields.int(2)?, fields.int(3)?];
                        glyph.character.raster = Raster::new(width, height)
                            .ok_or_else(|| fields.error(format!("{width}x{height} raster is too large")))?;
                    }
                    "BITMAP" => glyph.row = Some(0),
                    _ => {
                        if let Some(done) = current.take() {
                            finish_glyph(done, &mut characters, &mut index);
                        }
                    }
                }
            }
            _ => trace!(line, keyword = fields.keyword, "ignoring glyph line"),
        }
    }

    if let Some(open) = &current {
        return Err(unterminated(open));
    }
    if characters.len() != declared {
        return Err(ParseError {
            line: last_line,
            kind: ErrorKind::GlyphCountMismatch { declared, found: characters.len() },
        });
    }

    font.characters = characters;
    font.index = index;
    Ok(())
}

fn decode_bitmap_row(glyph: &mut OpenGlyph, row: usize, hex: &str, depth: BitDepth) -> Result<(), RowError> {
    let raster = &mut glyph.character.raster;
    if row >= raster.height() {
        return Err(RowError::TooManyRows { height: raster.height() });
    }
    let packed = bitmap::decode_hex(hex)?;
    let width = raster.width();
    bitmap::decode_row(&packed, width, depth, raster.row_mut(row))
}

fn finish_glyph(glyph: OpenGlyph, characters: &mut Vec<Character>, index: &mut HashMap<u32, usize>) {
    let OpenGlyph { opened_at, character, row } = glyph;

    let rows = row.unwrap_or(0);
    if rows < character.raster.height() {
        warn!(
            line = opened_at,
            glyph = %character.name,
            rows,
            height = character.raster.height(),
            "bitmap has fewer rows than BBX height, rest left blank"
        );
    }

    if let Some(code_point) = character.code_point {
        if let Some(previous) = index.insert(code_point, characters.len()) {
            debug!(
                code_point,
                previous = %characters[previous].name,
                glyph = %character.name,
                "code point claimed twice, keeping the later glyph"
            );
        }
    }
    characters.push(character);
}

fn unterminated(glyph: &OpenGlyph) -> ParseError {
    ParseError {
        line: glyph.opened_at,
        kind: ErrorKind::UnterminatedGlyph { name: glyph.character.name.clone() },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SINGLE_A: &str = "\
STARTFONT 2.1
FONT -test-fixed-medium-r-normal--8-80-75-75-c-80-iso10646-1
SIZE 8 75 75
FONT_ASCENT 7
FONT_DESCENT 1
CHARS 1
STARTCHAR A
ENCODING 65
DWIDTH 8 0
BBX 8 8 0 0
BITMAP
FF
FF
FF
FF
FF
FF
FF
FF
ENDCHAR
ENDFONT
";

    fn kind(source: &str) -> ErrorKind {
        source.parse::<Font>().unwrap_err().kind
    }

    #[test]
    fn single_glyph() {
        let font: Font = SINGLE_A.parse().unwrap();
        assert_eq!(font.characters().len(), 1);

        let a = &font.characters()[0];
        assert_eq!(a.name(), "A");
        assert_eq!(a.code_point(), Some(65));
        assert_eq!(a.advance(), [8, 0]);
        assert_eq!(a.origin(), [0, 0]);
        assert_eq!((a.raster().width(), a.raster().height(), a.raster().stride()), (8, 8, 8));
        assert!(a.raster().pixels().iter().all(|&p| p == 255));

        assert_eq!(font.lookup(65).character(), Some(a));
        // no glyph for the default code point 32 either
        assert_eq!(font.lookup(66), crate::Lookup::Missing);
    }

    #[test]
    fn header_fields() {
        let source = "\
FONT -misc-fixed-medium-r-semicondensed--13-120-75-75-c-60-iso8859-1
SIZE 12 75 100 2
COMMENT anything goes here
STARTPROPERTIES 8
PIXEL_SIZE 13
FONT_ASCENT 11
FONT_DESCENT 2
CAP_HEIGHT 9
X_HEIGHT 6
CHARSET_REGISTRY \"ISO8859\"
CHARSET_ENCODING \"1\"
DEFAULT_CHAR 0
ENDPROPERTIES
CHARS 0
";
        let font: Font = source.parse().unwrap();
        assert_eq!(font.name(), "-misc-fixed-medium-r-semicondensed--13-120-75-75-c-60-iso8859-1");
        assert_eq!(font.point_size(), 12);
        assert_eq!(font.dpi(), [75, 100]);
        assert_eq!(font.bit_depth().bits(), 2);
        assert_eq!(font.pixel_size(), 13);
        assert_eq!((font.ascent(), font.descent()), (11, 2));
        assert_eq!((font.cap_height(), font.x_height()), (9, 6));
        assert_eq!(font.charset_id(), "ISO8859-1");
        assert_eq!(font.default_code_point(), Some(0));
        assert!(font.characters().is_empty());
    }

    #[test]
    fn default_char_defaults_to_space() {
        let font: Font = "CHARS 0\n".parse().unwrap();
        assert_eq!(font.default_code_point(), Some(32));
        assert_eq!(font.charset_id(), "-");
        assert_eq!(font.bit_depth(), BitDepth::ONE);
    }

    #[test]
    fn missing_chars_line_gives_empty_font() {
        let font: Font = "FONT lonely\nSIZE 8 75 75\n".parse().unwrap();
        assert_eq!(font.name(), "lonely");
        assert!(font.characters().is_empty());
    }

    #[test]
    fn codes_go_through_the_charmap() {
        let source = "\
CHARSET_REGISTRY ISO8859
CHARSET_ENCODING 15
DEFAULT_CHAR 164
CHARS 1
STARTCHAR Euro
ENCODING 164
DWIDTH 6 0
BBX 0 0 0 0
BITMAP
ENDCHAR
";
        let font: Font = source.parse().unwrap();
        assert_eq!(font.characters()[0].code_point(), Some(0x20AC));
        assert_eq!(font.default_code_point(), Some(0x20AC));
        assert!(font.get(0x20AC).is_some());
        assert!(font.get(164).is_none());
    }

    #[test]
    fn later_glyph_wins_code_point() {
        let source = "\
CHARS 2
STARTCHAR first
ENCODING 65
BBX 0 0 0 0
ENDCHAR
STARTCHAR second
ENCODING 65
BBX 0 0 0 0
ENDCHAR
";
        let font: Font = source.parse().unwrap();
        assert_eq!(font.characters().len(), 2);
        assert_eq!(font.get(65).map(Character::name), Some("second"));
    }

    #[test]
    fn unencoded_glyphs_are_kept_but_not_indexed() {
        let source = "\
CHARS 1
STARTCHAR extra
ENCODING -1
BBX 0 0 0 0
ENDCHAR
";
        let font: Font = source.parse().unwrap();
        assert_eq!(font.characters()[0].code_point(), None);
        assert!(font.index.is_empty());
    }

    #[test]
    fn grayscale_rows() {
        let source = "\
SIZE 4 75 75 2
CHARS 1
STARTCHAR gray
ENCODING 1
BBX 4 2 0 0
BITMAP
1B
E4
ENDCHAR
";
        let font: Font = source.parse().unwrap();
        let raster = font.characters()[0].raster();
        assert_eq!(raster.row(0), &[0, 85, 170, 255]);
        assert_eq!(raster.row(1), &[255, 170, 85, 0]);
    }

    #[test]
    fn short_bitmap_leaves_rows_blank() {
        let source = "\
CHARS 1
STARTCHAR half
ENCODING 1
BBX 8 2 0 0
BITMAP
FF
ENDCHAR
";
        let font: Font = source.parse().unwrap();
        let raster = font.characters()[0].raster();
        assert_eq!(raster.row(0), &[255; 8]);
        assert_eq!(raster.row(1), &[0; 8]);
    }

    #[test]
    fn too_many_glyphs() {
        let source = "\
CHARS 1
STARTCHAR a
ENCODING 97
ENDCHAR
STARTCHAR b
ENCODING 98
ENDCHAR
";
        let err = source.parse::<Font>().unwrap_err();
        assert_eq!(err.line, 5);
        assert_eq!(err.kind, ErrorKind::GlyphCountMismatch { declared: 1, found: 2 });
    }

    #[test]
    fn too_few_glyphs() {
        let source = "CHARS 2\nSTARTCHAR a\nENDCHAR\n";
        assert_eq!(kind(source), ErrorKind::GlyphCountMismatch { declared: 2, found: 1 });
    }

    #[test]
    fn unterminated_glyph() {
        let err = "CHARS 1\nSTARTCHAR a\nBBX 8 1 0 0\nBITMAP\nFF\n".parse::<Font>().unwrap_err();
        assert_eq!(err.line, 2);
        assert_eq!(err.kind, ErrorKind::UnterminatedGlyph { name: "a".into() });

        let source = "CHARS 2\nSTARTCHAR a\nSTARTCHAR b\nENDCHAR\n";
        assert_eq!(kind(source), ErrorKind::UnterminatedGlyph { name: "a".into() });
    }

    #[test]
    fn malformed_lines() {
        assert!(matches!(kind("SIZE 8 75\n"), ErrorKind::MalformedLine { keyword, .. } if keyword == "SIZE"));
        assert!(matches!(kind("SIZE 8 75 75 16\n"), ErrorKind::MalformedLine { .. }));
        assert!(matches!(kind("FONT_ASCENT high\n"), ErrorKind::MalformedLine { .. }));
        assert!(matches!(kind("CHARS -1\n"), ErrorKind::MalformedLine { .. }));
        assert!(matches!(kind("CHARS 1\nSTARTCHAR a\nBBX -8 1 0 0\n"), ErrorKind::MalformedLine { .. }));
        assert!(matches!(kind("CHARS 1\nSTARTCHAR a\nDWIDTH 8\n"), ErrorKind::MalformedLine { .. }));
        assert!(matches!(kind("CHARS 1\nENCODING 65\n"), ErrorKind::MalformedLine { .. }));
    }

    #[test]
    fn oversized_bbx_is_rejected() {
        for bbx in ["BBX 4294967296 4294967296 0 0", "BBX 100000 100000 0 0"] {
            let source = format!("CHARS 1\nSTARTCHAR a\n{bbx}\nBITMAP\n00\nENDCHAR\n");
            let err = source.parse::<Font>().unwrap_err();
            assert_eq!(err.line, 3);
            assert!(matches!(err.kind, ErrorKind::MalformedLine { ref keyword, .. } if keyword == "BBX"), "{bbx}");
        }

        let font: Font = "CHARS 1\nSTARTCHAR a\nBBX 4096 4096 0 0\nBITMAP\nENDCHAR\n".parse().unwrap();
        assert_eq!(font.characters()[0].raster().pixels().len(), Raster::MAX_AREA);
    }

    #[test]
    fn malformed_rows() {
        let base = "CHARS 1\nSTARTCHAR a\nBBX 12 1 0 0\nBITMAP\n";
        assert!(matches!(
            kind(&format!("{base}FZ00\nENDCHAR\n")),
            ErrorKind::MalformedBitmapRow(RowError::InvalidHex(_))
        ));
        assert_eq!(
            kind(&format!("{base}FF\nENDCHAR\n")),
            ErrorKind::MalformedBitmapRow(RowError::TooShort { needed: 12, available: 8 })
        );
        assert_eq!(
            kind(&format!("{base}FFF0\nFFF0\nENDCHAR\n")),
            ErrorKind::MalformedBitmapRow(RowError::TooManyRows { height: 1 })
        );
    }

    #[test]
    fn crlf_and_error_display() {
        let font: Font = SINGLE_A.replace('\n', "\r\n").parse().unwrap();
        assert_eq!(font.characters()[0].raster().row(7), &[255; 8]);

        let err = "\n\nPIXEL_SIZE big\n".parse::<Font>().unwrap_err();
        assert_eq!(err.to_string(), "line 3: malformed PIXEL_SIZE line: `big` is not a valid integer here");
    }
}
