/// Styling shared by the DOCX and PDF serializers.
///
/// Sizes are in points and distances in inches; each serializer converts to
/// its own units (half-points and twips for DOCX, millimetres for PDF).
#[derive(Debug, Clone, PartialEq)]
pub struct RenderStyle {
    pub font_family: &'static str,
    /// Used for complex-script (Devanagari) runs in DOCX.
    pub complex_script_font: &'static str,
    pub body_size_pt: f32,
    pub heading_size_pt: f32,
    pub header_size_pt: f32,
    pub footer_size_pt: f32,
    pub rule_size_pt: f32,
    pub disclaimer_size_pt: f32,
    pub line_spacing: f32,
    pub page_width_mm: f32,
    pub page_height_mm: f32,
    pub margin_in: f32,
    pub numbered_indent_in: f32,
    pub numbered_hanging_in: f32,
    pub header_color: &'static str,
    pub rule_color: &'static str,
    pub disclaimer_color: &'static str,
    pub rule_width_chars: usize,
    /// Stroke width of the drawn rule in PDF output.
    pub rule_thickness_pt: f32,
}

impl Default for RenderStyle {
    fn default() -> Self {
        Self {
            font_family: "Times New Roman",
            complex_script_font: "Mangal",
            body_size_pt: 12.0,
            heading_size_pt: 13.0,
            header_size_pt: 9.0,
            footer_size_pt: 9.0,
            rule_size_pt: 9.0,
            disclaimer_size_pt: 8.0,
            line_spacing: 1.5,
            page_width_mm: 210.0,
            page_height_mm: 297.0,
            margin_in: 1.0,
            numbered_indent_in: 0.5,
            numbered_hanging_in: 0.25,
            header_color: "888888",
            rule_color: "999999",
            disclaimer_color: "666666",
            rule_width_chars: 50,
            rule_thickness_pt: 0.75,
        }
    }
}

pub const MM_PER_INCH: f32 = 25.4;
pub const MM_PER_POINT: f32 = MM_PER_INCH / 72.0;
pub const TWIPS_PER_INCH: f32 = 1440.0;

impl RenderStyle {
    pub fn rule(&self) -> String {
        "─".repeat(self.rule_width_chars)
    }

    pub fn margin_mm(&self) -> f32 {
        self.margin_in * MM_PER_INCH
    }

    pub fn content_width_mm(&self) -> f32 {
        self.page_width_mm - 2.0 * self.margin_mm()
    }
}

/// Point size to DOCX half-points.
pub fn half_points(pt: f32) -> usize {
    (pt * 2.0).round() as usize
}

pub fn twips(inches: f32) -> i32 {
    (inches * TWIPS_PER_INCH).round() as i32
}

pub fn mm_to_twips(mm: f32) -> u32 {
    (mm / MM_PER_INCH * TWIPS_PER_INCH).round() as u32
}

/// RGB hex ("666666") to 0..1 components.
pub fn rgb_components(hex: &str) -> (f32, f32, f32) {
    let channel = |range: std::ops::Range<usize>| {
        hex.get(range)
            .and_then(|c| u8::from_str_radix(c, 16).ok())
            .map(|v| f32::from(v) / 255.0)
            .unwrap_or(0.0)
    };
    (channel(0..2), channel(2..4), channel(4..6))
}
