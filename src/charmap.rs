//! Legacy single-byte character sets that BDF fonts declare through
//! `CHARSET_REGISTRY` and `CHARSET_ENCODING`.

/// A supported 8-bit character set.
///
/// All of these agree with Unicode below `0xA0`; they only differ in their
/// upper half.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Charmap {
    /// ISO 8859-1 (Latin-1), which maps every byte to the same code point.
    Iso8859_1,
    /// ISO 8859-2 (Latin-2, Central European).
    Iso8859_2,
    /// ISO 8859-9 (Latin-5, Turkish).
    Iso8859_9,
    /// ISO 8859-15 (Latin-9, Western European with the euro sign).
    Iso8859_15,
}

static KNOWN_CHARMAPS: [(&str, Charmap); 4] = [
    ("iso8859-1", Charmap::Iso8859_1),
    ("iso8859-2", Charmap::Iso8859_2),
    ("iso8859-9", Charmap::Iso8859_9),
    ("iso8859-15", Charmap::Iso8859_15),
];

/// Bytes `0xA0..=0xFF` of ISO 8859-2.
static ISO_8859_2_HIGH: [u16; 96] = [
    0x00A0, 0x0104, 0x02D8, 0x0141, 0x00A4, 0x013D, 0x015A, 0x00A7,
    0x00A8, 0x0160, 0x015E, 0x0164, 0x0179, 0x00AD, 0x017D, 0x017B,
    0x00B0, 0x0105, 0x02DB, 0x0142, 0x00B4, 0x013E, 0x015B, 0x02C7,
    0x00B8, 0x0161, 0x015F, 0x0165, 0x017A, 0x02DD, 0x017E, 0x017C,
    0x0154, 0x00C1, 0x00C2, 0x0102, 0x00C4, 0x0139, 0x0106, 0x00C7,
    0x010C, 0x00C9, 0x0118, 0x00CB, 0x011A, 0x00CD, 0x00CE, 0x010E,
    0x0110, 0x0143, 0x0147, 0x00D3, 0x00D4, 0x0150, 0x00D6, 0x00D7,
    0x0158, 0x016E, 0x00DA, 0x0170, 0x00DC, 0x00DD, 0x0162, 0x00DF,
    0x0155, 0x00E1, 0x00E2, 0x0103, 0x00E4, 0x013A, 0x0107, 0x00E7,
    0x010D, 0x00E9, 0x0119, 0x00EB, 0x011B, 0x00ED, 0x00EE, 0x010F,
    0x0111, 0x0144, 0x0148, 0x00F3, 0x00F4, 0x0151, 0x00F6, 0x00F7,
    0x0159, 0x016F, 0x00FA, 0x0171, 0x00FC, 0x00FD, 0x0163, 0x02D9,
];

/// Positions where ISO 8859-9 departs from Latin-1.
static ISO_8859_9_PATCH: [(u8, u16); 6] = [
    (0xD0, 0x011E),
    (0xDD, 0x0130),
    (0xDE, 0x015E),
    (0xF0, 0x011F),
    (0xFD, 0x0131),
    (0xFE, 0x015F),
];

/// Positions where ISO 8859-15 departs from Latin-1.
static ISO_8859_15_PATCH: [(u8, u16); 8] = [
    (0xA4, 0x20AC),
    (0xA6, 0x0160),
    (0xA8, 0x0161),
    (0xB4, 0x017D),
    (0xB8, 0x017E),
    (0xBC, 0x0152),
    (0xBD, 0x0153),
    (0xBE, 0x0178),
];

impl Charmap {
    /// Looks up the character set named by a charset identifier such as
    /// `"ISO8859-1"`.
    ///
    /// Matching ignores case and surrounding whitespace. Unknown identifiers
    /// yield `None`, meaning raw codes are used as code points unchanged.
    #[must_use]
    pub fn find(charset_id: &str) -> Option<Self> {
        let wanted = charset_id.trim();
        KNOWN_CHARMAPS
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(wanted))
            .map(|&(_, charmap)| charmap)
    }

    /// Decodes a single byte of this character set.
    #[must_use]
    pub fn decode_byte(self, byte: u8) -> char {
        if byte < 0xA0 {
            return char::from(byte);
        }

        let code_point = match self {
            Charmap::Iso8859_1 => u16::from(byte),
            Charmap::Iso8859_2 => ISO_8859_2_HIGH[usize::from(byte - 0xA0)],
            Charmap::Iso8859_9 => patched(&ISO_8859_9_PATCH, byte),
            Charmap::Iso8859_15 => patched(&ISO_8859_15_PATCH, byte),
        };

        char::from_u32(u32::from(code_point)).unwrap_or(char::REPLACEMENT_CHARACTER)
    }
}

fn patched(patch: &[(u8, u16)], byte: u8) -> u16 {
    patch
        .iter()
        .find(|&&(at, _)| at == byte)
        .map_or(u16::from(byte), |&(_, code_point)| code_point)
}

/// Turns a raw character code from the font source into a lookup code point.
///
/// Negative codes mark glyphs outside the encoding and have no code point.
/// Codes that fit in a byte go through `charmap` when one is given; anything
/// else is taken as-is.
#[must_use]
pub fn resolve(charmap: Option<Charmap>, raw: i64) -> Option<u32> {
    let code = u32::try_from(raw).ok()?;
    match (charmap, u8::try_from(code)) {
        (Some(charmap), Ok(byte)) => Some(u32::from(charmap.decode_byte(byte))),
        _ => Some(code),
    }
}
