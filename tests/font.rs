//! Loads a complete Latin-1 font and queries it the way a renderer would.

use bdf_raster::{ErrorKind, Face, Fixed, FixedPoint, FixedRect, Font, Lookup, Point, Rect};

const SAMPLE: &str = include_str!("fixtures/sample.bdf");

fn sample() -> Font {
    bdf_raster::parse(SAMPLE.as_bytes()).unwrap()
}

#[test]
fn header_and_properties() {
    let font = sample();
    assert_eq!(font.name(), "-test-sample-medium-r-normal--10-100-75-75-c-60-iso8859-1");
    assert_eq!(font.point_size(), 10);
    assert_eq!(font.pixel_size(), 10);
    assert_eq!(font.dpi(), [75, 75]);
    assert_eq!((font.ascent(), font.descent()), (8, 2));
    assert_eq!(font.charset_id(), "ISO8859-1");
    assert_eq!(font.default_code_point(), Some(0));
}

#[test]
fn every_declared_glyph_is_present() {
    let font = sample();
    let names: Vec<&str> = font.characters().iter().map(|c| c.name()).collect();
    assert_eq!(names, ["defaultchar", "space", "A", "eacute", "comma.alt"]);

    for c in font.characters() {
        let raster = c.raster();
        assert_eq!(raster.pixels().len(), raster.width() * raster.height());
        assert!(raster.pixels().iter().all(|&p| p == 0 || p == 255));
    }
}

#[test]
fn latin1_codes_resolve_to_unicode() {
    let font = sample();
    let e = font.get(u32::from('é')).unwrap();
    assert_eq!(e.name(), "eacute");
    assert_eq!(e.raster().row(4), &[255, 255, 255, 255, 255]);
    assert_eq!(font.characters()[4].code_point(), None);
}

#[test]
fn fallback_to_default_glyph() {
    let font = sample();
    match font.lookup(u32::from('Ω')) {
        Lookup::Fallback(c) => assert_eq!(c.name(), "defaultchar"),
        other => panic!("expected fallback, got {other:?}"),
    }
    assert!(matches!(font.lookup(u32::from('A')), Lookup::Exact(c) if c.name() == "A"));
}

#[test]
fn face_queries() {
    let font = sample();
    let face = font.face();

    let metrics = face.metrics();
    assert_eq!(metrics.height, Fixed::from_int(10));
    assert_eq!(metrics.cap_height, Fixed::from_int(7));
    assert_eq!(metrics.x_height, Fixed::from_int(5));

    let a = face.glyph(FixedPoint::from_ints(12, 8), 'A').unwrap();
    assert_eq!(a.dest, Rect { min: Point { x: 12, y: 1 }, max: Point { x: 17, y: 8 } });
    assert_eq!(a.mask.row(0), &[0, 0, 255, 0, 0]);
    assert_eq!(a.advance, Fixed::from_int(6));

    let bounds = face.glyph_bounds('é');
    assert!(bounds.found);
    assert_eq!(bounds.bounds, FixedRect::from_ints(0, -8, 5, 0));

    assert_eq!(face.glyph_advance(' '), Some(Fixed::from_int(6)));
    assert_eq!(face.kern('A', 'é'), Fixed::ZERO);
}

#[test]
fn truncated_font_is_rejected() {
    let cut = SAMPLE.find("STARTCHAR comma.alt").unwrap();
    let err = SAMPLE[..cut].parse::<Font>().unwrap_err();
    assert_eq!(err.kind, ErrorKind::GlyphCountMismatch { declared: 5, found: 4 });
}

#[test]
fn extra_glyph_is_rejected() {
    let source = SAMPLE.replace("CHARS 5", "CHARS 4");
    let err = source.parse::<Font>().unwrap_err();
    assert_eq!(err.kind, ErrorKind::GlyphCountMismatch { declared: 4, found: 5 });
    assert!(err.to_string().starts_with(&format!("line {}:", err.line)));
}
