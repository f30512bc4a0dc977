use std::io::BufWriter;
use std::path::PathBuf;

use printpdf::{
    BuiltinFont, Color, IndirectFontRef, Line, Mm, PdfDocument, PdfDocumentReference, Point, Rgb,
};

use super::disclaimer::{disclaimer_for, DISCLAIMER_EN};
use super::layout::Block;
use super::metrics::{FontFace, FontMetrics};
use super::style::{rgb_components, RenderStyle, MM_PER_INCH, MM_PER_POINT};
use super::{DocumentRenderer, RenderError, StylingMetadata};
use crate::models::{ExportFormat, OutputLanguage};

const AUTHOR: &str = "NyayMitra";

/// One positioned line of text on a page. Coordinates are from the
/// bottom-left corner, in millimetres.
#[derive(Debug, Clone, PartialEq)]
pub struct PlacedText {
    pub text: String,
    pub x_mm: f32,
    pub y_mm: f32,
    pub size_pt: f32,
    pub face: FontFace,
    pub color: Option<&'static str>,
}

/// Something drawn on a page, in drawing order.
#[derive(Debug, Clone, PartialEq)]
pub enum PlacedItem {
    Text(PlacedText),
    /// Horizontal stroke from `x_start_mm` to `x_end_mm` at `y_mm`.
    Rule {
        x_start_mm: f32,
        x_end_mm: f32,
        y_mm: f32,
    },
}

impl PlacedItem {
    pub fn as_text(&self) -> Option<&PlacedText> {
        match self {
            Self::Text(line) => Some(line),
            Self::Rule { .. } => None,
        }
    }

    fn y_mm(&self) -> f32 {
        match self {
            Self::Text(line) => line.y_mm,
            Self::Rule { y_mm, .. } => *y_mm,
        }
    }
}

/// Portable-document output via `printpdf`.
///
/// Layout runs in two passes: blocks are first flowed into pages, then each
/// page is drawn with its running header and "Page N" footer.
pub struct PdfRenderer {
    style: RenderStyle,
    unicode_font: Option<PathBuf>,
}

impl PdfRenderer {
    /// `unicode_font` is a TTF used for every face; without it the built-in
    /// Times faces are used, which only cover Latin text.
    pub fn new(style: RenderStyle, unicode_font: Option<PathBuf>) -> Self {
        Self {
            style,
            unicode_font,
        }
    }

    /// First pass: flow blocks and the disclaimer into pages.
    pub fn paginate(
        &self,
        blocks: &[Block],
        disclaimer: &str,
        metrics: &FontMetrics,
    ) -> Vec<Vec<PlacedItem>> {
        let style = &self.style;
        let margin = style.margin_mm();
        let content_width = style.content_width_mm();
        let mut flow = Flow::new(style);

        for block in blocks {
            match block {
                Block::Spacer => flow.skip(6.0),
                Block::Heading(text) => {
                    let size = style.heading_size_pt;
                    let measure = |s: &str| metrics.width_mm(s, size, FontFace::Bold);
                    flow.skip(12.0);
                    for line in wrap_text(text, content_width, measure) {
                        let x = margin + ((content_width - measure(&line)) / 2.0).max(0.0);
                        flow.push(line, x, size, FontFace::Bold, None);
                    }
                    flow.skip(6.0);
                }
                Block::NumberedItem { .. } => {
                    let size = style.body_size_pt;
                    let indent = style.numbered_indent_in * MM_PER_INCH;
                    let hanging = style.numbered_hanging_in * MM_PER_INCH;
                    let measure = |s: &str| metrics.width_mm(s, size, FontFace::Regular);
                    flow.skip(6.0);
                    // The hanging first line is wider than the rest; wrap to the narrower.
                    let lines = wrap_text(&block.display_text(), content_width - indent, measure);
                    for (i, line) in lines.into_iter().enumerate() {
                        let x = if i == 0 {
                            margin + indent - hanging
                        } else {
                            margin + indent
                        };
                        flow.push(line, x, size, FontFace::Regular, None);
                    }
                    flow.skip(3.0);
                }
                Block::Body(text) => {
                    let size = style.body_size_pt;
                    let measure = |s: &str| metrics.width_mm(s, size, FontFace::Regular);
                    flow.skip(3.0);
                    for line in wrap_text(text, content_width, measure) {
                        flow.push(line, margin, size, FontFace::Regular, None);
                    }
                    flow.skip(3.0);
                }
            }
        }

        flow.skip(30.0);
        flow.rule(margin, style.page_width_mm - margin);
        flow.skip(10.0);
        let size = style.disclaimer_size_pt;
        let measure = |s: &str| metrics.width_mm(s, size, FontFace::Italic);
        for paragraph in disclaimer.split('\n') {
            if paragraph.trim().is_empty() {
                flow.skip(size);
                continue;
            }
            for line in wrap_text(paragraph, content_width, measure) {
                flow.push(line, margin, size, FontFace::Italic, Some(style.disclaimer_color));
            }
        }

        flow.pages
    }

    /// Disclaimer for the requested language, falling back to English when
    /// the built-in fonts cannot show the script.
    fn disclaimer(&self, language: OutputLanguage) -> &'static str {
        let text = disclaimer_for(language);
        if self.unicode_font.is_none() && !is_latin1(text) {
            tracing::warn!(
                language = language.as_str(),
                "No Unicode font configured; using English disclaimer in PDF"
            );
            return DISCLAIMER_EN;
        }
        text
    }

    fn read_unicode_font(&self) -> Result<Option<Vec<u8>>, RenderError> {
        let Some(path) = &self.unicode_font else {
            return Ok(None);
        };
        std::fs::read(path)
            .map(Some)
            .map_err(|e| RenderError::IoFailure(format!("Cannot open font {}: {e}", path.display())))
    }

    fn load_fonts(
        &self,
        doc: &PdfDocumentReference,
        font_bytes: Option<&[u8]>,
    ) -> Result<Fonts, RenderError> {
        match font_bytes {
            Some(bytes) => {
                let font = doc.add_external_font(bytes).map_err(font_error)?;
                Ok(Fonts {
                    regular: font.clone(),
                    bold: font.clone(),
                    italic: font,
                })
            }
            None => Ok(Fonts {
                regular: doc.add_builtin_font(BuiltinFont::TimesRoman).map_err(font_error)?,
                bold: doc.add_builtin_font(BuiltinFont::TimesBold).map_err(font_error)?,
                italic: doc.add_builtin_font(BuiltinFont::TimesItalic).map_err(font_error)?,
            }),
        }
    }
}

fn font_error(e: impl std::fmt::Display) -> RenderError {
    RenderError::IoFailure(format!("PDF font error: {e}"))
}

struct Fonts {
    regular: IndirectFontRef,
    bold: IndirectFontRef,
    italic: IndirectFontRef,
}

impl Fonts {
    fn face(&self, face: FontFace) -> &IndirectFontRef {
        match face {
            FontFace::Regular => &self.regular,
            FontFace::Bold => &self.bold,
            FontFace::Italic => &self.italic,
        }
    }
}

fn rgb(hex: &str) -> Color {
    let (r, g, b) = rgb_components(hex);
    Color::Rgb(Rgb::new(r, g, b, None))
}

impl DocumentRenderer for PdfRenderer {
    fn format(&self) -> ExportFormat {
        ExportFormat::Pdf
    }

    fn render(&self, blocks: &[Block], styling: &StylingMetadata) -> Result<Vec<u8>, RenderError> {
        let style = &self.style;
        if self.unicode_font.is_none()
            && blocks.iter().any(|b| !is_latin1(&b.display_text()))
        {
            tracing::warn!("Draft contains non-Latin text but no Unicode font is configured");
        }

        let font_bytes = self.read_unicode_font()?;
        let metrics = match &font_bytes {
            Some(bytes) => FontMetrics::from_font_bytes(bytes.clone())?,
            None => FontMetrics::Times,
        };
        let pages = self.paginate(blocks, self.disclaimer(styling.language), &metrics);
        let width = Mm(style.page_width_mm);
        let height = Mm(style.page_height_mm);

        let (doc, first_page, first_layer) =
            PdfDocument::new(styling.display_title(), width, height, "Layer 1");
        let doc = doc.with_author(AUTHOR).with_subject(styling.subject());
        let fonts = self.load_fonts(&doc, font_bytes.as_deref())?;

        let header = styling
            .title
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty());
        let margin = style.margin_mm();

        for (index, items) in pages.iter().enumerate() {
            let (page, layer) = if index == 0 {
                (first_page, first_layer)
            } else {
                doc.add_page(width, height, "Layer 1")
            };
            let layer = doc.get_page(page).get_layer(layer);

            let mut current_color: Option<&str> = None;
            let mut set_color = |color: Option<&'static str>| {
                if color != current_color {
                    layer.set_fill_color(rgb(color.unwrap_or("000000")));
                    current_color = color;
                }
            };

            if let Some(title) = header {
                set_color(Some(style.header_color));
                let title_width = metrics.width_mm(title, style.header_size_pt, FontFace::Italic);
                let x = style.page_width_mm - margin - title_width;
                layer.use_text(
                    title,
                    style.header_size_pt,
                    Mm(x.max(margin)),
                    Mm(style.page_height_mm - margin / 2.0),
                    fonts.face(FontFace::Italic),
                );
            }

            for item in items {
                match item {
                    PlacedItem::Text(line) => {
                        set_color(line.color);
                        layer.use_text(
                            line.text.as_str(),
                            line.size_pt,
                            Mm(line.x_mm),
                            Mm(line.y_mm),
                            fonts.face(line.face),
                        );
                    }
                    PlacedItem::Rule {
                        x_start_mm,
                        x_end_mm,
                        y_mm,
                    } => {
                        layer.set_outline_color(rgb(style.rule_color));
                        layer.set_outline_thickness(style.rule_thickness_pt);
                        layer.add_line(Line {
                            points: vec![
                                (Point::new(Mm(*x_start_mm), Mm(*y_mm)), false),
                                (Point::new(Mm(*x_end_mm), Mm(*y_mm)), false),
                            ],
                            is_closed: false,
                        });
                    }
                }
            }

            set_color(None);
            let footer = format!("Page {}", index + 1);
            let footer_width = metrics.width_mm(&footer, style.footer_size_pt, FontFace::Regular);
            let x = margin + (style.content_width_mm() - footer_width) / 2.0;
            layer.use_text(
                footer,
                style.footer_size_pt,
                Mm(x),
                Mm(margin / 2.0),
                fonts.face(FontFace::Regular),
            );
        }

        let mut buf = BufWriter::new(Vec::new());
        doc.save(&mut buf)
            .map_err(|e| RenderError::IoFailure(format!("PDF save error: {e}")))?;
        buf.into_inner()
            .map_err(|e| RenderError::IoFailure(format!("PDF buffer error: {e}")))
    }
}

/// Vertical cursor that starts a new page when a line would cross the
/// bottom margin.
struct Flow<'a> {
    style: &'a RenderStyle,
    pages: Vec<Vec<PlacedItem>>,
    y: f32,
}

impl<'a> Flow<'a> {
    fn new(style: &'a RenderStyle) -> Self {
        Self {
            style,
            pages: vec![Vec::new()],
            y: Self::top(style),
        }
    }

    fn top(style: &RenderStyle) -> f32 {
        style.page_height_mm - style.margin_mm()
    }

    fn current_is_empty(&self) -> bool {
        self.pages.last().map_or(true, |p| p.is_empty())
    }

    fn break_page(&mut self) {
        self.pages.push(Vec::new());
        self.y = Self::top(self.style);
    }

    /// Vertical space in points. Ignored at the top of a fresh page.
    fn skip(&mut self, points: f32) {
        if self.current_is_empty() {
            return;
        }
        self.y -= points * MM_PER_POINT;
        if self.y < self.style.margin_mm() {
            self.break_page();
        }
    }

    /// Reserve `height_mm` below the cursor, breaking the page if it does
    /// not fit, and return the new baseline.
    fn advance(&mut self, height_mm: f32) -> f32 {
        if self.y - height_mm < self.style.margin_mm() && !self.current_is_empty() {
            self.break_page();
        }
        self.y -= height_mm;
        self.y
    }

    fn place(&mut self, item: PlacedItem) {
        if let Some(page) = self.pages.last_mut() {
            page.push(item);
        }
    }

    fn push(
        &mut self,
        text: String,
        x_mm: f32,
        size_pt: f32,
        face: FontFace,
        color: Option<&'static str>,
    ) {
        let y_mm = self.advance(size_pt * MM_PER_POINT * self.style.line_spacing);
        self.place(PlacedItem::Text(PlacedText {
            text,
            x_mm,
            y_mm,
            size_pt,
            face,
            color,
        }));
    }

    fn rule(&mut self, x_start_mm: f32, x_end_mm: f32) {
        let y_mm = self.advance(self.style.rule_thickness_pt * MM_PER_POINT);
        self.place(PlacedItem::Rule {
            x_start_mm,
            x_end_mm,
            y_mm,
        });
    }
}

fn is_latin1(text: &str) -> bool {
    text.chars().all(|c| (c as u32) < 0x100)
}

/// Greedy word wrap against a measured width. Words wider than a line are
/// split at the last character that still fits.
fn wrap_text(text: &str, max_width: f32, measure: impl Fn(&str) -> f32) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        let mut word = word.to_string();
        while measure(&word) > max_width {
            if !current.is_empty() {
                lines.push(std::mem::take(&mut current));
            }
            let rest = word.split_off(fitting_prefix_len(&word, max_width, &measure));
            lines.push(word);
            word = rest;
        }
        if word.is_empty() {
            continue;
        }
        if current.is_empty() {
            current = word;
            continue;
        }
        let candidate = format!("{current} {word}");
        if measure(&candidate) > max_width {
            lines.push(std::mem::replace(&mut current, word));
        } else {
            current = candidate;
        }
    }
    if !current.is_empty() {
        lines.push(current);
    }
    lines
}

/// Byte length of the longest prefix of `word` that fits; at least one char.
fn fitting_prefix_len(word: &str, max_width: f32, measure: &impl Fn(&str) -> f32) -> usize {
    let mut end = word.chars().next().map_or(0, char::len_utf8);
    for (idx, ch) in word.char_indices().skip(1) {
        let next = idx + ch.len_utf8();
        if measure(&word[..next]) > max_width {
            break;
        }
        end = next;
    }
    end
}

#[cfg(test)]
mod tests {
    use lopdf::content::Content;
    use lopdf::Object;

    use super::*;
    use crate::pipeline::rendering::classify;

    fn renderer() -> PdfRenderer {
        PdfRenderer::new(RenderStyle::default(), None)
    }

    fn paginate(text: &str) -> Vec<Vec<PlacedItem>> {
        renderer().paginate(&classify(text), DISCLAIMER_EN, &FontMetrics::Times)
    }

    fn all_lines(pages: &[Vec<PlacedItem>]) -> Vec<&PlacedText> {
        pages.iter().flatten().filter_map(PlacedItem::as_text).collect()
    }

    fn char_count(s: &str) -> f32 {
        s.chars().count() as f32
    }

    /// (operator, text operand) for every operation on every page.
    fn content_ops(bytes: &[u8]) -> Vec<(String, String)> {
        let doc = lopdf::Document::load_mem(bytes).unwrap();
        let mut ops = Vec::new();
        for (_, page_id) in doc.get_pages() {
            let content = Content::decode(&doc.get_page_content(page_id).unwrap()).unwrap();
            for op in content.operations {
                let text = op
                    .operands
                    .iter()
                    .filter_map(|o| match o {
                        Object::String(bytes, _) => Some(String::from_utf8_lossy(bytes).into_owned()),
                        _ => None,
                    })
                    .collect::<String>();
                ops.push((op.operator, text));
            }
        }
        ops
    }

    #[test]
    fn wrap_respects_width() {
        let lines = wrap_text("the quick brown fox jumps over the lazy dog", 10.0, char_count);
        assert!(lines.iter().all(|l| l.chars().count() <= 10));
        assert_eq!(lines.join(" "), "the quick brown fox jumps over the lazy dog");
    }

    #[test]
    fn wrap_splits_long_words() {
        let lines = wrap_text("abcdefghijkl xy", 5.0, char_count);
        assert_eq!(lines, vec!["abcde", "fghij", "kl xy"]);
    }

    #[test]
    fn short_draft_fits_one_page() {
        let pages = paginate("AFFIDAVIT\n1. I am the deponent.\nVerified at Lucknow.");
        assert_eq!(pages.len(), 1);
    }

    #[test]
    fn long_draft_spans_pages_within_margins() {
        let text = (1..=120)
            .map(|i| format!("{i}. That the deponent states the facts of paragraph {i} truthfully."))
            .collect::<Vec<_>>()
            .join("\n");
        let style = RenderStyle::default();
        let pages = paginate(&text);
        assert!(pages.len() > 1);
        for item in pages.iter().flatten() {
            assert!(item.y_mm() >= style.margin_mm() - 0.01);
            assert!(item.y_mm() <= style.page_height_mm - style.margin_mm());
        }
    }

    #[test]
    fn headings_are_bold_and_centred() {
        let pages = paginate("IN THE HIGH COURT");
        let heading = pages[0][0].as_text().unwrap();
        assert_eq!(heading.face, FontFace::Bold);
        assert_eq!(heading.size_pt, 13.0);
        assert!(heading.x_mm > RenderStyle::default().margin_mm() + 10.0);
    }

    #[test]
    fn long_cause_title_stays_inside_right_margin() {
        let style = RenderStyle::default();
        let right_edge = style.page_width_mm - style.margin_mm();
        let metrics = FontMetrics::Times;
        let text = "IN THE COURT OF THE ADDITIONAL CHIEF JUDICIAL MAGISTRATE, LUCKNOW, UTTAR PRADESH\n\
                    WHEREAS the complainant Shri Ramesh Kumar son of Late Shri Suresh Kumar, resident of Mohalla Chowk, has approached the Station House Officer, Police Station Hazratganj, for registration of an FIR under Section 379 IPC.\n\
                    1. That the applicant's motorcycle bearing registration number UP32AB1234 was stolen from outside his residence during the night.";
        let pages = paginate(text);
        let lines = all_lines(&pages);

        let heading_lines = lines.iter().filter(|l| l.face == FontFace::Bold).count();
        assert!(heading_lines > 1, "cause title should wrap");
        for line in lines {
            let end = line.x_mm + metrics.width_mm(&line.text, line.size_pt, line.face);
            assert!(line.x_mm >= style.margin_mm() - 0.01, "{:?} starts in the margin", line.text);
            assert!(end <= right_edge + 0.01, "{:?} ends at {end}mm", line.text);
        }
    }

    #[test]
    fn numbered_items_use_hanging_indent() {
        let long_item = format!("1. {}", "word ".repeat(60));
        let pages = paginate(&long_item);
        let lines = all_lines(&pages);
        let margin = RenderStyle::default().margin_mm();
        assert!((lines[0].x_mm - (margin + 0.25 * MM_PER_INCH)).abs() < 0.01);
        assert!((lines[1].x_mm - (margin + 0.5 * MM_PER_INCH)).abs() < 0.01);
    }

    #[test]
    fn disclaimer_follows_rule_at_the_end() {
        let style = RenderStyle::default();
        let pages = paginate("Body text.");
        let items: Vec<&PlacedItem> = pages.iter().flatten().collect();
        let rule_at = items
            .iter()
            .position(|i| matches!(i, PlacedItem::Rule { .. }))
            .unwrap();
        if let PlacedItem::Rule {
            x_start_mm,
            x_end_mm,
            ..
        } = items[rule_at]
        {
            assert!((x_start_mm - style.margin_mm()).abs() < 0.01);
            assert!((x_end_mm - (style.page_width_mm - style.margin_mm())).abs() < 0.01);
        }
        assert!(items[..rule_at].iter().any(|i| i.as_text().is_some_and(|l| l.text == "Body text.")));

        let rest: Vec<&PlacedText> = items[rule_at + 1..].iter().filter_map(|i| i.as_text()).collect();
        assert!(!rest.is_empty());
        assert!(rest.iter().all(|l| l.face == FontFace::Italic && l.size_pt == 8.0));
        assert!(rest.iter().any(|l| l.text.contains("NyayMitra")));
    }

    #[test]
    fn rule_is_stroked_between_body_and_disclaimer() {
        let blocks = classify("PRAYER\nKindly register an FIR.");
        let bytes = renderer().render(&blocks, &StylingMetadata::default()).unwrap();
        let ops = content_ops(&bytes);

        let is_text_op = |op: &str| op == "Tj" || op == "TJ";
        let body_at = ops
            .iter()
            .position(|(op, text)| is_text_op(op) && text.contains("Kindly register an FIR."))
            .unwrap();
        let stroke_at = ops.iter().position(|(op, _)| op == "S").unwrap();
        let disclaimer_at = ops
            .iter()
            .position(|(op, text)| is_text_op(op) && text.starts_with("DISCLAIMER:"))
            .unwrap();
        assert!(body_at < stroke_at && stroke_at < disclaimer_at);
        assert!(ops.iter().all(|(op, text)| !is_text_op(op) || !text.is_empty()));
    }

    #[test]
    fn box_drawing_is_not_latin1() {
        assert!(!is_latin1(&RenderStyle::default().rule()));
        assert!(is_latin1("Rs. 50,000 § 379"));
    }

    #[test]
    fn hindi_disclaimer_needs_unicode_font() {
        assert_eq!(renderer().disclaimer(OutputLanguage::Hindi), DISCLAIMER_EN);
        let with_font = PdfRenderer::new(RenderStyle::default(), Some("/fonts/noto.ttf".into()));
        assert_ne!(with_font.disclaimer(OutputLanguage::Hindi), DISCLAIMER_EN);
    }

    #[test]
    fn missing_unicode_font_is_io_failure() {
        let r = PdfRenderer::new(RenderStyle::default(), Some("/nonexistent/noto.ttf".into()));
        let err = r.render(&classify("Body"), &StylingMetadata::default()).unwrap_err();
        assert!(matches!(err, RenderError::IoFailure(_)));
    }

    #[test]
    fn rendered_page_count_matches_layout() {
        let text = (1..=120)
            .map(|i| format!("{i}. Paragraph number {i} of the written statement."))
            .collect::<Vec<_>>()
            .join("\n");
        let blocks = classify(&text);
        let r = renderer();
        let expected = r.paginate(&blocks, DISCLAIMER_EN, &FontMetrics::Times).len();
        let styling = StylingMetadata {
            title: Some("Written Statement".into()),
            ..Default::default()
        };
        let bytes = r.render(&blocks, &styling).unwrap();
        assert!(bytes.starts_with(b"%PDF"));
        let doc = lopdf::Document::load_mem(&bytes).unwrap();
        assert_eq!(doc.get_pages().len(), expected);
    }
}
