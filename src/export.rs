//! Turning a rendered surface into downloadable files.
//!
//! Raster formats encode the preview surface as-is. SVG regenerates the grid
//! at a fixed scale. The "PDF" export composes a printable sheet and encodes
//! it as PNG, so its artifact carries a `.png` name.

use core::fmt;
use core::str::FromStr;
use std::fs;
use std::io::Cursor;
use std::path::{Path, PathBuf};

use image::codecs::jpeg::JpegEncoder;
use image::codecs::webp::WebPEncoder;
use image::imageops::{self, FilterType};
use image::{DynamicImage, ImageFormat, Rgba, RgbaImage};
use serde::{Deserialize, Serialize};

use crate::category::Category;
use crate::color::Color;
use crate::error::{Error, Result};
use crate::font;
use crate::matrix::{ErrorLevel, PseudoMatrix};
use crate::render;

/// Quality used for lossy formats when none is given.
pub const DEFAULT_QUALITY: f32 = 0.9;

/// Pixels per module in SVG output, whatever the preview size.
pub const SVG_MODULE_PX: u32 = 10;

/// Side of the print sheet, the width of an A4 page in points.
pub const SHEET_SIZE: u32 = 595;

/// Side of the code drawn on the print sheet.
pub const SHEET_CODE_SIZE: u32 = 300;

/// Distance between the code and each caption baseline.
const CAPTION_GAP: u32 = 30;

const TITLE_PX: f32 = 16.0;
const DATE_PX: f32 = 12.0;

/// File formats a code can be downloaded as.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    Png,
    Jpeg,
    Webp,
    Svg,
    /// Printable sheet, delivered as a PNG image.
    Pdf,
}

impl ExportFormat {
    /// File extension of the produced artifact.
    pub const fn extension(self) -> &'static str {
        match self {
            ExportFormat::Png | ExportFormat::Pdf => "png",
            ExportFormat::Jpeg => "jpg",
            ExportFormat::Webp => "webp",
            ExportFormat::Svg => "svg",
        }
    }

    /// MIME type of the produced artifact.
    pub const fn mime(self) -> &'static str {
        match self {
            ExportFormat::Png | ExportFormat::Pdf => "image/png",
            ExportFormat::Jpeg => "image/jpeg",
            ExportFormat::Webp => "image/webp",
            ExportFormat::Svg => "image/svg+xml",
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ExportFormat::Png => "png",
            ExportFormat::Jpeg => "jpg",
            ExportFormat::Webp => "webp",
            ExportFormat::Svg => "svg",
            ExportFormat::Pdf => "pdf",
        };
        f.write_str(name)
    }
}

impl FromStr for ExportFormat {
    type Err = Error;

    fn from_str(s: &str) -> core::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "png" => Ok(ExportFormat::Png),
            "jpg" | "jpeg" => Ok(ExportFormat::Jpeg),
            "webp" => Ok(ExportFormat::Webp),
            "svg" => Ok(ExportFormat::Svg),
            "pdf" => Ok(ExportFormat::Pdf),
            _ => Err(Error::UnknownFormat(s.to_string())),
        }
    }
}

/// Everything needed to redraw a code outside the preview surface.
#[derive(Clone, Copy, Debug)]
pub struct ExportSource<'a> {
    pub category: Category,
    pub text: &'a str,
    pub foreground: Color,
    pub background: Color,
    pub error_level: ErrorLevel,
    /// The preview surface as currently rendered.
    pub surface: &'a RgbaImage,
}

/// A file ready to be written or handed to the caller.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Artifact {
    pub filename: String,
    pub mime: &'static str,
    pub bytes: Vec<u8>,
}

impl Artifact {
    /// Writes the artifact into `dir`, creating it if needed, and returns
    /// the full path.
    pub fn write_to(&self, dir: &Path) -> Result<PathBuf> {
        fs::create_dir_all(dir)?;
        let path = dir.join(&self.filename);
        fs::write(&path, &self.bytes)?;
        log::info!("wrote {} ({} bytes)", path.display(), self.bytes.len());
        Ok(path)
    }
}

/// Builds `qr-<category>-<timestamp>.<ext>`.
pub fn artifact_filename(category: Category, format: ExportFormat, timestamp_ms: i64) -> String {
    format!("qr-{}-{}.{}", category.slug(), timestamp_ms, format.extension())
}

/// Exports `source` in `format`.
///
/// `quality` applies to JPEG and WebP and defaults to [`DEFAULT_QUALITY`];
/// `date` is the line printed under the code on the print sheet.
pub fn export(
    source: &ExportSource<'_>,
    format: ExportFormat,
    quality: Option<f32>,
    timestamp_ms: i64,
    date: &str,
) -> Result<Artifact> {
    let quality = quality.unwrap_or(DEFAULT_QUALITY);
    let bytes = match format {
        ExportFormat::Png | ExportFormat::Jpeg | ExportFormat::Webp => {
            encode_raster(source.surface, format, quality)?
        }
        ExportFormat::Svg => {
            let matrix = PseudoMatrix::generate(source.text, source.error_level);
            svg_document(&matrix, source.foreground, source.background).into_bytes()
        }
        ExportFormat::Pdf => {
            let sheet = compose_print_sheet(source.surface, source.category, date);
            encode_raster(&sheet, ExportFormat::Png, quality)?
        }
    };

    let artifact = Artifact {
        filename: artifact_filename(source.category, format, timestamp_ms),
        mime: format.mime(),
        bytes,
    };
    log::info!("exported {} as {format} ({} bytes)", source.category, artifact.bytes.len());
    Ok(artifact)
}

/// Encodes a surface as PNG, JPEG or WebP.
///
/// JPEG has no alpha channel, so the surface is flattened to RGB first. The
/// WebP encoder is lossless and ignores `quality`, which is still validated.
pub fn encode_raster(surface: &RgbaImage, format: ExportFormat, quality: f32) -> Result<Vec<u8>> {
    if !(quality > 0.0 && quality <= 1.0) {
        return Err(Error::InvalidQuality(quality));
    }

    let mut bytes = Vec::new();
    match format {
        ExportFormat::Jpeg => {
            let rgb = DynamicImage::ImageRgba8(surface.clone()).to_rgb8();
            let level = (quality * 100.0).round().clamp(1.0, 100.0) as u8;
            let encoder = JpegEncoder::new_with_quality(&mut bytes, level);
            rgb.write_with_encoder(encoder)?;
        }
        ExportFormat::Webp => {
            let encoder = WebPEncoder::new_lossless(&mut bytes);
            surface.write_with_encoder(encoder)?;
        }
        ExportFormat::Png | ExportFormat::Pdf => {
            surface.write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)?;
        }
        ExportFormat::Svg => {
            return Err(Error::UnknownFormat(format!("{format} is not a raster format")))
        }
    }
    Ok(bytes)
}

/// Minimal SVG document for the grid at [`SVG_MODULE_PX`] pixels per module.
pub fn svg_document(matrix: &PseudoMatrix, foreground: Color, background: Color) -> String {
    render::to_svg_string(matrix, SVG_MODULE_PX, foreground, background)
}

/// Builds the printable sheet: a white square page with the code scaled to
/// [`SHEET_CODE_SIZE`] in the middle, a title above and a date below.
pub fn compose_print_sheet(surface: &RgbaImage, category: Category, date: &str) -> RgbaImage {
    let white = Rgba([255, 255, 255, 255]);
    let ink = Rgba([0, 0, 0, 255]);
    let mut sheet = RgbaImage::from_pixel(SHEET_SIZE, SHEET_SIZE, white);

    let offset = (SHEET_SIZE - SHEET_CODE_SIZE) / 2;
    if surface.width() > 0 && surface.height() > 0 {
        let scaled =
            imageops::resize(surface, SHEET_CODE_SIZE, SHEET_CODE_SIZE, FilterType::Nearest);
        imageops::overlay(&mut sheet, &scaled, i64::from(offset), i64::from(offset));
    }

    let center = SHEET_SIZE / 2;
    let title = format!("QR Code - {}", category.label());
    let date_baseline = offset + SHEET_CODE_SIZE + CAPTION_GAP;
    font::draw_text_centered(&mut sheet, &title, center, offset - CAPTION_GAP, TITLE_PX, ink);
    font::draw_text_centered(&mut sheet, date, center, date_baseline, DATE_PX, ink);
    sheet
}
