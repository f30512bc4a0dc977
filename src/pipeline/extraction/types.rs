use std::path::Path;

use serde::{Deserialize, Serialize};

use super::format::{check_size_limit, detect_media_kind, media_kind_from_mime};
use super::ExtractionError;

/// Below this many characters (trimmed) extracted text is unusable downstream.
pub const MIN_USABLE_TEXT_CHARS: usize = 20;

/// Length of the extraction preview shown before interpretation.
pub const PREVIEW_CHARS: usize = 500;

/// Declared kind of a source artifact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MediaKind {
    Audio,
    Image,
    Pdf,
    PlainText,
    Unsupported,
}

impl MediaKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Audio => "audio",
            Self::Image => "image",
            Self::Pdf => "pdf",
            Self::PlainText => "plain_text",
            Self::Unsupported => "unsupported",
        }
    }
}

/// Raw input to the extractor. Owned by the request that created it.
#[derive(Debug, Clone)]
pub struct SourceArtifact {
    pub bytes: Vec<u8>,
    pub kind: MediaKind,
    /// Declared language tag (ISO 639-1, e.g. "hi").
    pub language: String,
    pub file_name: Option<String>,
}

impl SourceArtifact {
    pub fn new(bytes: Vec<u8>, kind: MediaKind, language: &str) -> Self {
        Self {
            bytes,
            kind,
            language: language.to_string(),
            file_name: None,
        }
    }

    pub fn with_file_name(mut self, file_name: &str) -> Self {
        self.file_name = Some(file_name.to_string());
        self
    }

    /// Pasted or typed text.
    pub fn from_text(text: &str, language: &str) -> Self {
        Self::new(text.as_bytes().to_vec(), MediaKind::PlainText, language)
    }

    /// Read a file, detect its media kind and enforce the upload size limits.
    pub fn from_path(path: &Path, language: &str) -> Result<Self, ExtractionError> {
        let bytes = std::fs::read(path)?;
        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .map(str::to_string);

        let kind = detect_media_kind(file_name.as_deref(), &bytes);
        check_size_limit(kind, bytes.len())?;

        Ok(Self {
            bytes,
            kind,
            language: language.to_string(),
            file_name,
        })
    }

    /// Uploaded bytes with the MIME type the client declared.
    ///
    /// The declared type decides the media kind; a generic
    /// `application/octet-stream` (or an empty type) falls back to content
    /// and file-name detection. Size limits apply either way.
    pub fn from_bytes_with_mime(
        bytes: Vec<u8>,
        mime: &str,
        file_name: Option<&str>,
        language: &str,
    ) -> Result<Self, ExtractionError> {
        let kind = if is_generic_mime(mime) {
            detect_media_kind(file_name, &bytes)
        } else {
            media_kind_from_mime(mime)
        };
        check_size_limit(kind, bytes.len())?;

        Ok(Self {
            bytes,
            kind,
            language: language.to_string(),
            file_name: file_name.map(str::to_string),
        })
    }
}

fn is_generic_mime(mime: &str) -> bool {
    let essence = mime.split(';').next().unwrap_or_default().trim();
    essence.is_empty() || essence.eq_ignore_ascii_case("application/octet-stream")
}

/// How text was extracted
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum ExtractionMethod {
    PrimaryTextLayer,
    OpticalRecognition,
    SpeechToText,
}

impl ExtractionMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PrimaryTextLayer => "primary-text-layer",
            Self::OpticalRecognition => "optical-recognition",
            Self::SpeechToText => "speech-to-text",
        }
    }
}

/// Time-aligned piece of a transcript.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpeechSegment {
    #[serde(default)]
    pub start: f64,
    #[serde(default)]
    pub end: f64,
    pub text: String,
}

/// Result of text extraction from a single source artifact
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractionResult {
    pub text: String,
    pub method: ExtractionMethod,
    /// 0–100, reported by optical recognition only. Informational.
    pub confidence: Option<f32>,
    pub page_count: Option<usize>,
    pub duration_seconds: Option<f64>,
    pub detected_language: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub segments: Vec<SpeechSegment>,
    pub latency_ms: u64,
}

impl ExtractionResult {
    /// Character count of the trimmed text.
    pub fn usable_length(&self) -> usize {
        self.text.trim().chars().count()
    }

    pub fn is_sufficient(&self) -> bool {
        self.usable_length() >= MIN_USABLE_TEXT_CHARS
    }

    /// Reject text too short to interpret.
    pub fn ensure_sufficient(self) -> Result<Self, ExtractionError> {
        if self.is_sufficient() {
            Ok(self)
        } else {
            Err(ExtractionError::InsufficientText {
                length: self.usable_length(),
                minimum: MIN_USABLE_TEXT_CHARS,
            })
        }
    }

    /// First 500 characters, with "..." appended when the text is longer.
    pub fn preview(&self) -> String {
        let mut chars = self.text.chars();
        let head: String = chars.by_ref().take(PREVIEW_CHARS).collect();
        if chars.next().is_some() {
            format!("{head}...")
        } else {
            head
        }
    }
}

// ──────────────────────────────────────────────
// Capability contracts
// ──────────────────────────────────────────────

/// Output of a speech-to-text capability.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Transcript {
    pub text: String,
    pub language: Option<String>,
    pub duration_seconds: Option<f64>,
    pub segments: Vec<SpeechSegment>,
}

/// Speech-to-text capability (allows mocking for tests)
pub trait SpeechToText {
    fn transcribe(
        &self,
        audio: &[u8],
        file_name: &str,
        language_hint: &str,
        vocabulary_hint: &str,
    ) -> Result<Transcript, ExtractionError>;
}

/// Raw OCR result from the engine
#[derive(Debug, Clone, PartialEq)]
pub struct OcrPageResult {
    pub text: String,
    /// 0–100
    pub confidence: f32,
}

/// Optical recognition capability. Accepts image or PDF bytes and a
/// Tesseract-style language set such as "eng+hin".
pub trait OcrEngine {
    fn recognize(&self, bytes: &[u8], languages: &str) -> Result<OcrPageResult, ExtractionError>;
}

/// Text of one PDF page.
#[derive(Debug, Clone, PartialEq)]
pub struct PageText {
    pub page_number: usize,
    pub text: String,
}

/// PDF text-layer extraction abstraction
pub trait PdfExtractor {
    fn extract_text(&self, pdf_bytes: &[u8]) -> Result<Vec<PageText>, ExtractionError>;
}

/// Main extraction orchestrator trait
pub trait TextExtractor {
    fn extract(&self, artifact: &SourceArtifact) -> Result<ExtractionResult, ExtractionError>;
}
