//! Caption text for the print sheet, rasterized on the CPU with `fontdue`
//! from an embedded DejaVu Sans.

use std::sync::OnceLock;

use fontdue::{Font, FontSettings};
use image::{Rgba, RgbaImage};

static FONT_DATA: &[u8] = include_bytes!("../assets/fonts/DejaVuSans.ttf");

fn caption_font() -> Option<&'static Font> {
    static FONT: OnceLock<Option<Font>> = OnceLock::new();
    FONT.get_or_init(|| match Font::from_bytes(FONT_DATA, FontSettings::default()) {
        Ok(font) => Some(font),
        Err(e) => {
            log::warn!("caption font unavailable: {e}");
            None
        }
    })
    .as_ref()
}

fn advance(font: &Font, text: &str, px: f32) -> f32 {
    text.chars().map(|c| font.metrics(c, px).advance_width).sum()
}

/// Draws `text` horizontally centered on `center_x` with its baseline on
/// `baseline_y`, blending glyph coverage over what is already there. Pixels
/// falling outside the image are clipped.
pub fn draw_text_centered(
    img: &mut RgbaImage,
    text: &str,
    center_x: u32,
    baseline_y: u32,
    px: f32,
    color: Rgba<u8>,
) {
    let Some(font) = caption_font() else {
        return;
    };
    let mut pen_x = center_x as f32 - advance(font, text, px) / 2.0;
    let baseline = i64::from(baseline_y);

    for c in text.chars() {
        let (metrics, coverage) = font.rasterize(c, px);
        let left = (pen_x + metrics.xmin as f32).round() as i64;
        // `ymin` is the bottom edge of the bitmap relative to the baseline.
        let top = baseline - metrics.height as i64 - i64::from(metrics.ymin);
        for (i, &alpha) in coverage.iter().enumerate() {
            if alpha > 0 {
                let x = left + (i % metrics.width) as i64;
                let y = top + (i / metrics.width) as i64;
                blend(img, x, y, color, alpha);
            }
        }
        pen_x += metrics.advance_width;
    }
}

fn blend(img: &mut RgbaImage, x: i64, y: i64, color: Rgba<u8>, alpha: u8) {
    let (w, h) = (i64::from(img.width()), i64::from(img.height()));
    if !((0..w).contains(&x) && (0..h).contains(&y)) {
        return;
    }
    let pixel = img.get_pixel_mut(x as u32, y as u32);
    let a = u16::from(alpha);
    for channel in 0..3 {
        let (src, dst) = (u16::from(color[channel]), u16::from(pixel[channel]));
        pixel[channel] = ((src * a + dst * (255 - a) + 127) / 255) as u8;
    }
    pixel[3] = 255;
}
