//! Turns free-form draft text into a paragraph model and serializes it to
//! DOCX or PDF with the same styling rules.

pub mod layout;
pub mod style;
pub mod disclaimer;
pub mod metrics;
pub mod docx;
pub mod pdf;

pub use layout::{classify, classify_line, Block};
pub use style::RenderStyle;
pub use disclaimer::{disclaimer_for, DISCLAIMER_EN, DISCLAIMER_HI};
pub use docx::DocxRenderer;
pub use pdf::PdfRenderer;

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::models::{DocumentType, ExportFormat, OutputLanguage};

pub const DEFAULT_TITLE: &str = "Legal Document";

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("Render I/O failure: {0}")]
    IoFailure(String),
}

impl From<std::io::Error> for RenderError {
    fn from(e: std::io::Error) -> Self {
        Self::IoFailure(e.to_string())
    }
}

/// Caller-supplied document information that shapes the output.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StylingMetadata {
    /// Running header and PDF title. Absent means no header.
    pub title: Option<String>,
    pub document_type: Option<DocumentType>,
    pub language: OutputLanguage,
}

impl StylingMetadata {
    pub fn display_title(&self) -> &str {
        self.title
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .unwrap_or(DEFAULT_TITLE)
    }

    pub fn subject(&self) -> &str {
        self.document_type
            .map(|t| t.label())
            .unwrap_or(DEFAULT_TITLE)
    }
}

/// A finished document ready to be written or streamed.
#[derive(Debug, Clone, Serialize)]
pub struct RenderedArtifact {
    #[serde(skip)]
    pub bytes: Vec<u8>,
    pub format: ExportFormat,
    pub file_name: String,
    pub size_bytes: usize,
    pub created_at: DateTime<Utc>,
}

/// Serializes a paragraph model into one container format.
pub trait DocumentRenderer {
    fn format(&self) -> ExportFormat;

    fn render(
        &self,
        blocks: &[Block],
        styling: &StylingMetadata,
    ) -> Result<Vec<u8>, RenderError>;
}

/// Renders draft text to `format`, picking the matching serializer.
pub fn render_document(
    text: &str,
    format: ExportFormat,
    styling: &StylingMetadata,
    unicode_font: Option<PathBuf>,
) -> Result<RenderedArtifact, RenderError> {
    let renderer: Box<dyn DocumentRenderer> = match format {
        ExportFormat::Docx => Box::new(DocxRenderer::new(RenderStyle::default())),
        ExportFormat::Pdf => Box::new(PdfRenderer::new(RenderStyle::default(), unicode_font)),
    };
    render_with(renderer.as_ref(), text, styling)
}

pub fn render_with(
    renderer: &dyn DocumentRenderer,
    text: &str,
    styling: &StylingMetadata,
) -> Result<RenderedArtifact, RenderError> {
    let format = renderer.format();
    let _span = tracing::info_span!(
        "render",
        format = format.as_str(),
        language = styling.language.as_str()
    )
    .entered();

    let blocks = classify(text);
    let bytes = renderer.render(&blocks, styling)?;
    let artifact = RenderedArtifact {
        size_bytes: bytes.len(),
        bytes,
        format,
        file_name: artifact_file_name(styling.document_type, format),
        created_at: Utc::now(),
    };

    tracing::info!(
        blocks = blocks.len(),
        size_bytes = artifact.size_bytes,
        file_name = %artifact.file_name,
        "Document rendered"
    );
    Ok(artifact)
}

/// `<document_type>_<uuid>.<ext>`, unique per call.
fn artifact_file_name(document_type: Option<DocumentType>, format: ExportFormat) -> String {
    let stem = document_type.map(|t| t.as_str()).unwrap_or("document");
    format!("{stem}_{}.{}", Uuid::new_v4(), format.extension())
}
