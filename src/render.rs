use crate::color::Color;
use crate::matrix::PseudoMatrix;

use image::{ImageBuffer, RgbaImage};
use std::fs;
use std::path::{Path, PathBuf};

/*---- Utilities ----*/

/// Paints `matrix` onto a `size` x `size` surface.
///
/// The background is filled first, then every pixel whose cell is dark gets
/// the foreground. Pixel `x` belongs to column `x * 25 / size`, so each cell
/// covers `size / 25` pixels on average and no pixel is blended.
///
/// # Arguments
///
/// * `matrix` - The grid to draw.
/// * `size` - Width and height of the surface, in pixels.
/// * `foreground` - Color of dark modules.
/// * `background` - Color of everything else.
///
/// # Example
///
/// ```rust
/// use qrstudio::color::Color;
/// use qrstudio::matrix::{ErrorLevel, PseudoMatrix};
/// use qrstudio::render::rasterize;
///
/// let grid = PseudoMatrix::generate("Hello", ErrorLevel::Medium);
/// let img = rasterize(&grid, 256, Color::BLACK, Color::WHITE);
/// assert_eq!(img.dimensions(), (256, 256));
/// ```
pub fn rasterize(
    matrix: &PseudoMatrix,
    size: u32,
    foreground: Color,
    background: Color,
) -> RgbaImage {
    let mut img: RgbaImage = ImageBuffer::from_pixel(size, size, background.to_rgba());
    let modules = u64::from(matrix.size() as u32);
    let fg = foreground.to_rgba();

    for (x, y, pixel) in img.enumerate_pixels_mut() {
        let col = u64::from(x) * modules / u64::from(size);
        let row = u64::from(y) * modules / u64::from(size);
        if matrix.get_module(col as i32, row as i32) {
            *pixel = fg;
        }
    }

    log::debug!("rasterized grid onto {size}x{size} surface");
    img
}

// Returns a string of SVG code for an image depicting the given grid,
// drawn at `module_px` pixels per module with no quiet zone.
// The string always uses Unix newlines (\n), regardless of the platform.
pub fn to_svg_string(
    matrix: &PseudoMatrix,
    module_px: u32,
    foreground: Color,
    background: Color,
) -> String {
    let dimension = matrix.size() as u32 * module_px;
    let mut result = String::new();
    result += &format!(
        "<svg width=\"{0}\" height=\"{0}\" xmlns=\"http://www.w3.org/2000/svg\">\n", dimension);
    result += &format!("\t<rect width=\"100%\" height=\"100%\" fill=\"{background}\"/>\n");
    for y in 0 .. matrix.size() {
        for x in 0 .. matrix.size() {
            if matrix.get_module(x, y) {
                result += &format!(
                    "\t<rect x=\"{}\" y=\"{}\" width=\"{2}\" height=\"{2}\" fill=\"{3}\"/>\n",
                    x as u32 * module_px, y as u32 * module_px, module_px, foreground);
            }
        }
    }
    result += "</svg>\n";
    result
}

/// Renders the grid as text for a terminal, two characters per module and a
/// quiet zone of four modules on every side.
pub fn to_terminal_string(matrix: &PseudoMatrix) -> String {
    let border: i32 = 4;
    let mut out = String::new();
    for y in -border .. matrix.size() + border {
        for x in -border .. matrix.size() + border {
            let c: char = if matrix.get_module(x, y) { '█' } else { ' ' };
            out.push(c);
            out.push(c);
        }
        out.push('\n');
    }
    out
}

/// Saves a surface as PNG into a directory, creating the directory when it
/// does not exist yet.
///
/// # Arguments
///
/// * `img` - The surface to save.
/// * `directory_path` - Optional. Defaults to "generated".
/// * `filename` - Optional file stem. Defaults to the current timestamp in milliseconds.
///
/// # Errors
///
/// Returns an `image::ImageError` if the directory cannot be created or the image cannot be
/// written.
pub fn save_png(
    img: &RgbaImage,
    directory_path: Option<&Path>,
    filename: Option<&str>,
) -> Result<PathBuf, image::ImageError> {
    let directory_path = directory_path.unwrap_or_else(|| Path::new("generated"));
    let filename = match filename {
        Some(name) => name.to_string(),
        None => chrono::Utc::now().timestamp_millis().to_string(),
    };

    if !directory_path.exists() {
        fs::create_dir_all(directory_path)?;
    }

    let file_path = directory_path.join(format!("{filename}.png"));
    img.save(&file_path)?;
    log::info!("saved preview to {}", file_path.display());
    Ok(file_path)
}
