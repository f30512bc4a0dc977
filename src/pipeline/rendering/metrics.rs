//! Glyph advance widths used for line breaking and centring in PDF output.

use ab_glyph::{Font, FontVec};

use super::style::MM_PER_POINT;
use super::RenderError;

/// Which of the three faces a line is set in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FontFace {
    Regular,
    Bold,
    Italic,
}

/// Advance widths in 1/1000 em for ASCII 0x20..=0x7E, from the standard
/// Adobe Times AFM files (WinAnsi code points).
#[rustfmt::skip]
const TIMES_ROMAN: [u16; 95] = [
    250, 333, 408, 500, 500, 833, 778, 180, 333, 333, 500, 564, 250, 333, 250, 278,
    500, 500, 500, 500, 500, 500, 500, 500, 500, 500, 278, 278, 564, 564, 564, 444,
    921, 722, 667, 667, 722, 611, 556, 722, 722, 333, 389, 722, 611, 889, 722, 722,
    556, 722, 667, 556, 611, 722, 722, 944, 722, 722, 611, 333, 278, 333, 469, 500,
    333, 444, 500, 444, 500, 444, 333, 500, 500, 278, 278, 500, 278, 778, 500, 500,
    500, 500, 333, 389, 278, 500, 500, 722, 500, 500, 444, 480, 200, 480, 541,
];

#[rustfmt::skip]
const TIMES_BOLD: [u16; 95] = [
    250, 333, 555, 500, 500, 1000, 833, 278, 333, 333, 500, 570, 250, 333, 250, 278,
    500, 500, 500, 500, 500, 500, 500, 500, 500, 500, 333, 333, 570, 570, 570, 500,
    930, 722, 667, 722, 722, 667, 611, 778, 778, 389, 500, 778, 667, 944, 722, 778,
    611, 778, 722, 556, 667, 722, 722, 1000, 722, 722, 667, 333, 278, 333, 581, 500,
    333, 500, 556, 444, 556, 444, 333, 500, 556, 278, 333, 556, 278, 833, 556, 500,
    556, 556, 444, 389, 333, 556, 500, 722, 500, 500, 444, 394, 220, 394, 520,
];

#[rustfmt::skip]
const TIMES_ITALIC: [u16; 95] = [
    250, 333, 420, 500, 500, 833, 778, 214, 333, 333, 500, 675, 250, 333, 250, 278,
    500, 500, 500, 500, 500, 500, 500, 500, 500, 500, 333, 333, 675, 675, 675, 500,
    920, 611, 611, 667, 722, 611, 611, 722, 722, 333, 444, 667, 556, 833, 667, 722,
    611, 722, 611, 500, 556, 722, 611, 833, 611, 556, 556, 389, 278, 389, 422, 500,
    333, 500, 500, 444, 500, 444, 278, 500, 500, 278, 278, 444, 278, 722, 500, 500,
    500, 500, 389, 389, 278, 500, 444, 667, 444, 444, 389, 400, 275, 400, 541,
];

/// Width for Latin-1 characters outside the ASCII tables. Wide enough for
/// accented capitals so estimates never fall short.
const FALLBACK_WIDTH: u16 = 722;

/// Width source for whichever font the PDF is set in.
pub enum FontMetrics {
    /// Built-in Times faces.
    Times,
    /// A TrueType font used for every face.
    Loaded(FontVec),
}

impl FontMetrics {
    pub fn from_font_bytes(bytes: Vec<u8>) -> Result<Self, RenderError> {
        FontVec::try_from_vec(bytes)
            .map(Self::Loaded)
            .map_err(|e| RenderError::IoFailure(format!("Unreadable font: {e}")))
    }

    /// Rendered width of `text` in millimetres.
    pub fn width_mm(&self, text: &str, size_pt: f32, face: FontFace) -> f32 {
        self.width_em(text, face) * size_pt * MM_PER_POINT
    }

    fn width_em(&self, text: &str, face: FontFace) -> f32 {
        match self {
            Self::Times => {
                let table = match face {
                    FontFace::Regular => &TIMES_ROMAN,
                    FontFace::Bold => &TIMES_BOLD,
                    FontFace::Italic => &TIMES_ITALIC,
                };
                let units: u32 = text
                    .chars()
                    .map(|c| match c as u32 {
                        code @ 0x20..=0x7E => u32::from(table[(code - 0x20) as usize]),
                        _ => u32::from(FALLBACK_WIDTH),
                    })
                    .sum();
                units as f32 / 1000.0
            }
            Self::Loaded(font) => {
                let units_per_em = font.units_per_em().unwrap_or(1000.0);
                let units: f32 = text
                    .chars()
                    .map(|c| font.h_advance_unscaled(font.glyph_id(c)))
                    .sum();
                units / units_per_em
            }
        }
    }
}
