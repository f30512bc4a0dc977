use std::io::Cursor;

use docx_rs::{
    AlignmentType, BreakType, Docx, Footer, Header, LineSpacing, PageMargin, PageNum, Paragraph, Run,
    RunFonts, SpecialIndentType,
};

use super::disclaimer::disclaimer_for;
use super::layout::Block;
use super::style::{half_points, mm_to_twips, twips, RenderStyle};
use super::{DocumentRenderer, RenderError, StylingMetadata};
use crate::models::ExportFormat;

/// Word-processing output via `docx-rs`.
pub struct DocxRenderer {
    style: RenderStyle,
}

impl DocxRenderer {
    pub fn new(style: RenderStyle) -> Self {
        Self { style }
    }

    /// Assemble the document tree without packing it.
    pub fn build(&self, blocks: &[Block], styling: &StylingMetadata) -> Docx {
        let style = &self.style;
        let margin = twips(style.margin_in);

        let mut docx = Docx::new()
            .page_size(
                mm_to_twips(style.page_width_mm),
                mm_to_twips(style.page_height_mm),
            )
            .page_margin(
                PageMargin::new()
                    .top(margin)
                    .bottom(margin)
                    .left(margin)
                    .right(margin),
            )
            .default_fonts(self.fonts())
            .default_size(half_points(style.body_size_pt))
            .footer(self.footer());

        if let Some(title) = styling.title.as_deref().map(str::trim).filter(|t| !t.is_empty()) {
            docx = docx.header(self.header(title));
        }

        for block in blocks {
            docx = docx.add_paragraph(self.paragraph(block));
        }

        for paragraph in self.disclaimer_block(styling) {
            docx = docx.add_paragraph(paragraph);
        }
        docx
    }

    fn fonts(&self) -> RunFonts {
        RunFonts::new()
            .ascii(self.style.font_family)
            .hi_ansi(self.style.font_family)
            .east_asia(self.style.font_family)
            .cs(self.style.complex_script_font)
    }

    fn run(&self, text: &str, size_pt: f32) -> Run {
        Run::new()
            .add_text(text)
            .fonts(self.fonts())
            .size(half_points(size_pt))
    }

    fn spacing(&self, before: u32, after: u32) -> LineSpacing {
        LineSpacing::new()
            .before(before)
            .after(after)
            .line((240.0 * self.style.line_spacing).round() as i32)
    }

    fn header(&self, title: &str) -> Header {
        Header::new().add_paragraph(
            Paragraph::new()
                .align(AlignmentType::Right)
                .add_run(
                    self.run(title, self.style.header_size_pt)
                        .italic()
                        .color(self.style.header_color),
                ),
        )
    }

    fn footer(&self) -> Footer {
        Footer::new().add_paragraph(
            Paragraph::new()
                .align(AlignmentType::Center)
                .add_run(self.run("Page ", self.style.footer_size_pt))
                .add_page_num(PageNum::new()),
        )
    }

    fn paragraph(&self, block: &Block) -> Paragraph {
        let style = &self.style;
        match block {
            Block::Spacer => Paragraph::new().line_spacing(LineSpacing::new().before(120)),
            Block::Heading(text) => Paragraph::new()
                .align(AlignmentType::Center)
                .line_spacing(self.spacing(240, 120))
                .add_run(self.run(text, style.heading_size_pt).bold()),
            Block::NumberedItem { .. } => Paragraph::new()
                .line_spacing(self.spacing(120, 60))
                .indent(
                    Some(twips(style.numbered_indent_in)),
                    Some(SpecialIndentType::Hanging(twips(style.numbered_hanging_in))),
                    None,
                    None,
                )
                .add_run(self.run(&block.display_text(), style.body_size_pt)),
            Block::Body(text) => Paragraph::new()
                .line_spacing(self.spacing(60, 60))
                .add_run(self.run(text, style.body_size_pt)),
        }
    }

    /// Spacer, horizontal rule, then the language-specific disclaimer.
    fn disclaimer_block(&self, styling: &StylingMetadata) -> Vec<Paragraph> {
        let style = &self.style;
        let mut disclaimer = Paragraph::new().line_spacing(LineSpacing::new().before(200));
        for (i, line) in disclaimer_for(styling.language).split('\n').enumerate() {
            if i > 0 {
                disclaimer = disclaimer.add_run(Run::new().add_break(BreakType::TextWrapping));
            }
            disclaimer = disclaimer.add_run(
                self.run(line, style.disclaimer_size_pt)
                    .italic()
                    .color(style.disclaimer_color),
            );
        }

        vec![
            Paragraph::new().line_spacing(LineSpacing::new().before(600)),
            Paragraph::new().add_run(
                self.run(&style.rule(), style.rule_size_pt)
                    .color(style.rule_color),
            ),
            disclaimer,
        ]
    }
}

impl DocumentRenderer for DocxRenderer {
    fn format(&self) -> ExportFormat {
        ExportFormat::Docx
    }

    fn render(&self, blocks: &[Block], styling: &StylingMetadata) -> Result<Vec<u8>, RenderError> {
        let mut buf = Cursor::new(Vec::new());
        self.build(blocks, styling)
            .build()
            .pack(&mut buf)
            .map_err(|e| RenderError::IoFailure(format!("DOCX pack error: {e}")))?;
        Ok(buf.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::OutputLanguage;
    use crate::pipeline::rendering::{classify, DISCLAIMER_HI};

    fn renderer() -> DocxRenderer {
        DocxRenderer::new(RenderStyle::default())
    }

    fn draft_blocks() -> Vec<Block> {
        classify("IN THE COURT OF SESSIONS JUDGE\n\n1. The applicant is innocent.\nRespectfully submitted.")
    }

    #[test]
    fn one_paragraph_per_block_plus_disclaimer() {
        let blocks = draft_blocks();
        let docx = renderer().build(&blocks, &StylingMetadata::default());
        assert_eq!(docx.document.children.len(), blocks.len() + 3);
    }

    #[test]
    fn document_carries_text_and_styling() {
        let docx = renderer().build(&draft_blocks(), &StylingMetadata::default());
        let json = docx.json();
        assert!(json.contains("IN THE COURT OF SESSIONS JUDGE"));
        assert!(json.contains("1. The applicant is innocent."));
        assert!(json.contains("Times New Roman"));
        assert!(json.contains("artificial intelligence"));
        assert!(json.contains(&"─".repeat(50)));
    }

    #[test]
    fn hindi_output_uses_hindi_disclaimer() {
        let styling = StylingMetadata {
            language: OutputLanguage::Hindi,
            ..Default::default()
        };
        let json = renderer().build(&draft_blocks(), &styling).json();
        assert!(DISCLAIMER_HI.contains("कानूनी सलाह"));
        assert!(json.contains("कानूनी सलाह"));
        assert!(!json.contains("artificial intelligence"));
    }

    #[test]
    fn packs_to_zip_container() {
        let bytes = renderer()
            .render(&draft_blocks(), &StylingMetadata::default())
            .unwrap();
        assert!(bytes.starts_with(b"PK"));
        assert!(bytes.len() > 1000);
    }

    #[test]
    fn empty_draft_still_renders_disclaimer() {
        let docx = renderer().build(&[], &StylingMetadata::default());
        assert_eq!(docx.document.children.len(), 3);
    }
}
