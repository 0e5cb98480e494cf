#![forbid(unsafe_code)]
//! Pseudo-matrix generation.
//!
//! The grid produced here only looks like a QR symbol: three finder markers,
//! two timing lines and a central block whose modules depend on the parity of
//! the input's character-code sum. It is not decodable by a QR reader and is
//! kept deliberately cosmetic.
use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Width and height of every generated grid, in modules.
pub const GRID_SIZE: u8 = 25;

/// Side of a finder marker.
const FINDER_SIZE: u8 = 7;

/// First and one-past-last index of the timing lines.
const TIMING_RANGE: core::ops::Range<u8> = 8..17;

/// Row and column of the timing lines.
const TIMING_TRACK: u8 = 6;

/// First and one-past-last index of the central block, on both axes.
const CENTER_RANGE: core::ops::Range<u8> = 9..18;

/// A fixed-size grid of dark and light modules.
///
/// # Example
///
/// ```rust
/// use qrstudio::matrix::{ErrorLevel, PseudoMatrix};
///
/// let grid = PseudoMatrix::generate("https://example.com", ErrorLevel::Medium);
/// assert_eq!(grid.size(), 25);
/// assert!(grid.get_module(0, 0));
/// ```
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct PseudoMatrix {
    /// The modules of the grid (0 = light, 1 = dark), packed bitwise into bytes.
    /// Accessed through get_module().
    modules: Vec<u8>,

    /// Tag selected by the user. It does not influence any module.
    error_level: ErrorLevel,
}

impl PseudoMatrix {
    /// Builds the grid for `text`.
    ///
    /// Two strings whose [`char_code_sum`] values have the same parity yield
    /// identical grids.
    pub fn generate(text: &str, error_level: ErrorLevel) -> Self {
        let cells = usize::from(GRID_SIZE) * usize::from(GRID_SIZE);
        let mut result = Self {
            modules: vec![0u8; (cells + 7) / 8],
            error_level,
        };

        let far = GRID_SIZE - FINDER_SIZE;
        result.draw_finder_pattern(0, 0);
        result.draw_finder_pattern(0, far);
        result.draw_finder_pattern(far, 0);

        for i in TIMING_RANGE {
            result.set_cell(TIMING_TRACK, i, i % 2 == 1);
            result.set_cell(i, TIMING_TRACK, i % 2 == 1);
        }

        let sum = char_code_sum(text);
        for r in CENTER_RANGE {
            for c in CENTER_RANGE {
                let product = u64::from(r) * u64::from(c);
                result.set_cell(r, c, (sum.wrapping_add(product)) % 2 == 1);
            }
        }

        log::debug!(
            "generated {}x{} grid (char-code sum {}, level {})",
            GRID_SIZE,
            GRID_SIZE,
            sum,
            error_level
        );
        result
    }

    /// Returns the grid's size in modules, always [`GRID_SIZE`].
    pub fn size(&self) -> i32 {
        i32::from(GRID_SIZE)
    }

    /// Returns the error level the grid was requested with.
    pub fn error_level(&self) -> ErrorLevel {
        self.error_level
    }

    /// Returns the color of the module at the given coordinates.
    ///
    /// Returns `true` for dark modules and `false` for light modules. Coordinates outside the
    /// grid return `false`.
    ///
    /// # Arguments
    ///
    /// * `x` - X-coordinate, the column (0 is left).
    /// * `y` - Y-coordinate, the row (0 is top).
    pub fn get_module(&self, x: i32, y: i32) -> bool {
        let range = 0..self.size();
        range.contains(&x) && range.contains(&y) && self.get_cell(y as u8, x as u8)
    }

    /// Iterates over the rows, top to bottom, as vectors of module colors.
    pub fn rows(&self) -> impl Iterator<Item = Vec<bool>> + '_ {
        (0..GRID_SIZE).map(move |r| (0..GRID_SIZE).map(|c| self.get_cell(r, c)).collect())
    }

    /// Number of dark modules in the grid.
    pub fn dark_count(&self) -> usize {
        self.modules.iter().map(|b| b.count_ones() as usize).sum()
    }

    fn draw_finder_pattern(&mut self, top: u8, left: u8) {
        for r in 0..FINDER_SIZE {
            for c in 0..FINDER_SIZE {
                let ring = r == 0 || r == FINDER_SIZE - 1 || c == 0 || c == FINDER_SIZE - 1;
                let core = (2..=4).contains(&r) && (2..=4).contains(&c);
                if ring || core {
                    self.set_cell(top + r, left + c, true);
                }
            }
        }
    }

    fn get_cell(&self, row: u8, col: u8) -> bool {
        let (byteindex, bitindex) = Self::locate(row, col);
        get_bit(self.modules[byteindex].into(), bitindex)
    }

    fn set_cell(&mut self, row: u8, col: u8, isdark: bool) {
        let (byteindex, bitindex) = Self::locate(row, col);
        if isdark {
            self.modules[byteindex] |= 1u8 << bitindex;
        } else {
            self.modules[byteindex] &= !(1u8 << bitindex);
        }
    }

    fn locate(row: u8, col: u8) -> (usize, u8) {
        let range = 0..GRID_SIZE;
        assert!(range.contains(&row) && range.contains(&col));
        let index = usize::from(row) * usize::from(GRID_SIZE) + usize::from(col);
        (index >> 3, (index & 7) as u8)
    }
}

/// Sum of the UTF-16 code units of `text`.
///
/// Characters outside the basic multilingual plane contribute both halves of
/// their surrogate pair.
pub fn char_code_sum(text: &str) -> u64 {
    text.encode_utf16().map(u64::from).sum()
}

/// Error correction level shown to the user.
///
/// Purely a label: the pseudo-matrix does not encode redundancy.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Debug, Default, Serialize, Deserialize)]
pub enum ErrorLevel {
    /// Nominally tolerates ~7% damage.
    #[serde(rename = "L")]
    Low,
    /// Nominally tolerates ~15% damage.
    #[default]
    #[serde(rename = "M")]
    Medium,
    /// Nominally tolerates ~25% damage.
    #[serde(rename = "Q")]
    Quartile,
    /// Nominally tolerates ~30% damage.
    #[serde(rename = "H")]
    High,
}

impl ErrorLevel {
    pub const ALL: [ErrorLevel; 4] = [
        ErrorLevel::Low,
        ErrorLevel::Medium,
        ErrorLevel::Quartile,
        ErrorLevel::High,
    ];

    /// Single-letter code: L, M, Q or H.
    pub const fn letter(self) -> char {
        use ErrorLevel::*;
        match self {
            Low => 'L',
            Medium => 'M',
            Quartile => 'Q',
            High => 'H',
        }
    }

    /// Nominal share of recoverable damage, in percent.
    pub const fn recovery_percent(self) -> u8 {
        use ErrorLevel::*;
        match self {
            Low => 7,
            Medium => 15,
            Quartile => 25,
            High => 30,
        }
    }
}

impl fmt::Display for ErrorLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.letter())
    }
}

impl FromStr for ErrorLevel {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        use ErrorLevel::*;
        match s.trim().to_ascii_lowercase().as_str() {
            "l" | "low" => Ok(Low),
            "m" | "medium" => Ok(Medium),
            "q" | "quartile" => Ok(Quartile),
            "h" | "high" => Ok(High),
            _ => Err(Error::UnknownErrorLevel(s.to_string())),
        }
    }
}

fn get_bit(x: u32, i: u8) -> bool {
    ((x >> i) & 1) != 0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn center_block(grid: &PseudoMatrix) -> Vec<bool> {
        let mut out = Vec::new();
        for y in 9..18 {
            for x in 9..18 {
                out.push(grid.get_module(x, y));
            }
        }
        out
    }

    #[test]
    fn test_finder_patterns() {
        let grid = PseudoMatrix::generate("anything", ErrorLevel::Low);
        for (top, left) in [(0, 0), (0, 18), (18, 0)] {
            // Outer ring, light gap, dark core.
            assert!(grid.get_module(left, top));
            assert!(grid.get_module(left + 6, top + 6));
            assert!(!grid.get_module(left + 1, top + 1));
            assert!(!grid.get_module(left + 5, top + 3));
            assert!(grid.get_module(left + 3, top + 3));
            assert!(grid.get_module(left + 2, top + 4));
        }
        // The fourth corner stays empty.
        assert!(!grid.get_module(20, 20));
    }

    #[test]
    fn test_timing_lines() {
        let grid = PseudoMatrix::generate("", ErrorLevel::Medium);
        for i in 8..17 {
            assert_eq!(grid.get_module(i, 6), i % 2 == 1);
            assert_eq!(grid.get_module(6, i), i % 2 == 1);
        }
    }

    #[test]
    fn test_center_block_follows_parity() {
        // "a" = 97 (odd): cell = (97 + r*c) % 2.
        let grid = PseudoMatrix::generate("a", ErrorLevel::Medium);
        assert!(!grid.get_module(9, 9)); // 97 + 81 = 178
        assert!(grid.get_module(10, 9)); // 97 + 90 = 187
    }

    #[test]
    fn test_collision_for_equal_parity() {
        // 'a' + 'd' = 97 + 100 = 'b' + 'c' = 98 + 99.
        let first = PseudoMatrix::generate("ad", ErrorLevel::Medium);
        let second = PseudoMatrix::generate("bc", ErrorLevel::Medium);
        assert_eq!(char_code_sum("ad"), char_code_sum("bc"));
        assert_eq!(center_block(&first), center_block(&second));
        assert_eq!(first, second);

        // Different sums with the same parity collide as well.
        let third = PseudoMatrix::generate("c", ErrorLevel::Medium);
        let fourth = PseudoMatrix::generate("a", ErrorLevel::Medium);
        assert_eq!(center_block(&third), center_block(&fourth));
    }

    #[test]
    fn test_parity_change_alters_center() {
        let odd = PseudoMatrix::generate("a", ErrorLevel::Medium);
        let even = PseudoMatrix::generate("b", ErrorLevel::Medium);
        assert_ne!(center_block(&odd), center_block(&even));
    }

    #[test]
    fn test_error_level_is_cosmetic() {
        let low = PseudoMatrix::generate("same", ErrorLevel::Low);
        let high = PseudoMatrix::generate("same", ErrorLevel::High);
        assert_eq!(low.rows().collect::<Vec<_>>(), high.rows().collect::<Vec<_>>());
        assert_eq!(high.error_level(), ErrorLevel::High);
    }

    #[test]
    fn test_out_of_bounds() {
        let grid = PseudoMatrix::generate("x", ErrorLevel::Medium);
        assert!(!grid.get_module(-1, 0));
        assert!(!grid.get_module(0, 25));
    }

    #[test]
    fn test_char_code_sum_utf16() {
        assert_eq!(char_code_sum("ab"), 195);
        // U+1F600 encodes as 0xD83D 0xDE00.
        assert_eq!(char_code_sum("\u{1F600}"), 0xD83D + 0xDE00);
    }

    #[test]
    fn test_error_level_parse() {
        assert_eq!("q".parse::<ErrorLevel>().unwrap(), ErrorLevel::Quartile);
        assert_eq!("High".parse::<ErrorLevel>().unwrap(), ErrorLevel::High);
        assert!("x".parse::<ErrorLevel>().is_err());
        assert_eq!(ErrorLevel::default().to_string(), "M");
    }
}
