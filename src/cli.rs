use std::path::{Path, PathBuf};

use clap::Parser;
use image::{GrayImage, Luma};
use thiserror::Error;
use tracing::{debug, info};

use crate::{Face, Fixed, FixedPoint, Font, ParseError};

const DEFAULT_TEXT: &str = "The quick brown fox jumps over the lazy dog";

/// Command line of `bdf2img`.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Path to the BDF font to render with
    pub font_path: PathBuf,
    /// Path to where the output image should be written
    pub img_path: PathBuf,
    /// Text to render; a literal `\n` starts a new line
    pub text: Vec<String>,
    /// Path to where the parsed font should be written (ron, json or rkyv)
    #[arg(short, long)]
    pub meta_path: Option<PathBuf>,
    /// Number of blank pixels around the text
    #[arg(short, long, default_value_t = 4)]
    pub padding: u32,
    /// Extra pixels between consecutive lines
    #[arg(short = 'g', long, default_value_t = 0)]
    pub line_gap: u32,
}

/// Everything that can stop `bdf2img`.
#[derive(Debug, Error)]
pub enum CliError {
    /// The font file could not be read.
    #[error("failed to read {}: {source}", path.display())]
    Read {
        /// File that was being read.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },
    /// The font file is not valid BDF.
    #[error("failed to parse {}: {source}", path.display())]
    Parse {
        /// File that was being parsed.
        path: PathBuf,
        /// Underlying parse error.
        source: ParseError,
    },
    /// The output image could not be written.
    #[error("failed to write output image: {0}")]
    Image(#[from] image::ImageError),
    /// The font metadata could not be written.
    #[error("failed to write {}: {source}", path.display())]
    Write {
        /// File that was being written.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },
    /// Serializing the font failed.
    #[error("failed to serialize font metadata: {0}")]
    Serialize(String),
    /// The metadata path has an extension we cannot write.
    #[error("cannot deduce metadata format from {}; supported formats are ron, json, rkyv", .0.display())]
    UnknownMetaFormat(PathBuf),
}

/// Runs `bdf2img` with parsed arguments.
///
/// # Errors
///
/// Fails if the font cannot be read or parsed, or an output cannot be written.
pub fn run(args: &Args) -> Result<(), CliError> {
    let data = std::fs::read(&args.font_path)
        .map_err(|source| CliError::Read { path: args.font_path.clone(), source })?;
    let font = crate::parse(&data)
        .map_err(|source| CliError::Parse { path: args.font_path.clone(), source })?;
    info!(font = font.name(), glyphs = font.characters().len(), "loaded font");

    let text = if args.text.is_empty() {
        DEFAULT_TEXT.to_owned()
    } else {
        args.text.join(" ").replace("\\n", "\n")
    };

    let image = text_to_image(&font.face(), &text, args.padding, args.line_gap);
    image.save(&args.img_path)?;
    debug!(path = %args.img_path.display(), width = image.width(), height = image.height(), "wrote image");

    if let Some(meta_path) = &args.meta_path {
        write_meta(&font, meta_path)?;
    }

    Ok(())
}

fn write_meta(font: &Font, path: &Path) -> Result<(), CliError> {
    let bytes = match path.extension().and_then(|ext| ext.to_str()) {
        Some("ron") => ron::ser::to_string_pretty(font, ron::ser::PrettyConfig::default())
            .map_err(|e| CliError::Serialize(e.to_string()))?
            .into_bytes(),
        Some("json") => serde_json::to_vec(font).map_err(|e| CliError::Serialize(e.to_string()))?,
        Some("rkyv") => rkyv::to_bytes::<_, 4096>(font)
            .map_err(|e| CliError::Serialize(e.to_string()))?
            .into_vec(),
        _ => return Err(CliError::UnknownMetaFormat(path.to_owned())),
    };

    std::fs::write(path, bytes).map_err(|source| CliError::Write { path: path.to_owned(), source })
}

fn line_advance<F: Face>(face: &F, line: &str) -> Fixed {
    let mut width = Fixed::ZERO;
    let mut prev = None;
    for ch in line.chars() {
        if let Some(prev) = prev {
            width += face.kern(prev, ch);
        }
        width += face.glyph_advance(ch).unwrap_or(Fixed::ZERO);
        prev = Some(ch);
    }
    width
}

/// Composites `text` onto a black grayscale canvas sized to fit it.
///
/// Glyph intensities are combined with `max`, so overlapping glyphs never
/// darken each other.
pub fn text_to_image<F: Face>(face: &F, text: &str, padding: u32, line_gap: u32) -> GrayImage {
    let metrics = face.metrics();
    let lines: Vec<&str> = text.lines().collect();
    let padding = i32::try_from(padding).unwrap_or(i32::MAX);
    let line_gap = i32::try_from(line_gap).unwrap_or(i32::MAX);
    let font_height = metrics.height.floor().max(0);
    let line_height = font_height.saturating_add(line_gap);

    let text_width = lines
        .iter()
        .map(|line| line_advance(face, line).floor())
        .max()
        .unwrap_or(0);
    let line_count = i32::try_from(lines.len()).unwrap_or(i32::MAX);
    let text_height = match line_count {
        0 => 0,
        n => (n - 1).saturating_mul(line_height).saturating_add(font_height),
    };
    let width = text_width.max(0).saturating_add(padding.saturating_mul(2));
    let height = text_height.saturating_add(padding.saturating_mul(2));

    let mut image = GrayImage::new(
        u32::try_from(width.max(1)).unwrap_or(1),
        u32::try_from(height.max(1)).unwrap_or(1),
    );

    let mut baseline = padding.saturating_add(metrics.ascent.floor());
    for line in &lines {
        let mut dot = FixedPoint { x: Fixed::from_int(padding), y: Fixed::from_int(baseline) };
        let mut prev = None;
        for ch in line.chars() {
            if let Some(prev) = prev {
                dot.x += face.kern(prev, ch);
            }
            prev = Some(ch);

            let Some(glyph) = face.glyph(dot, ch) else {
                continue;
            };
            for (my, row) in (glyph.dest.min.y..glyph.dest.max.y).enumerate() {
                for (mx, col) in (glyph.dest.min.x..glyph.dest.max.x).enumerate() {
                    let (Ok(x), Ok(y)) = (u32::try_from(col), u32::try_from(row)) else {
                        continue;
                    };
                    if x >= image.width() || y >= image.height() {
                        continue;
                    }
                    let sample = glyph.mask.get(mx, my).unwrap_or(0);
                    let pixel = image.get_pixel_mut(x, y);
                    *pixel = Luma([pixel.0[0].max(sample)]);
                }
            }
            dot.x += glyph.advance;
        }
        baseline = baseline.saturating_add(line_height);
    }

    image
}
