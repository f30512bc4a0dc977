use std::time::Instant;

use super::language_detect::detect_language;
use super::pdf::join_pages;
use super::sanitize::sanitize_extracted_text;
use super::speech::vocabulary_hint;
use super::types::{
    ExtractionMethod, ExtractionResult, MediaKind, OcrEngine, PdfExtractor, SourceArtifact,
    SpeechToText, TextExtractor,
};
use super::ExtractionError;

/// A PDF text layer must exceed this many characters (trimmed) to be trusted.
/// Anything shorter is treated as a scan and sent to OCR.
pub const MIN_TEXT_LAYER_CHARS: usize = 50;

/// Default OCR language set: English plus Devanagari Hindi.
pub const DEFAULT_OCR_LANGUAGES: &str = "eng+hin";

/// Concrete implementation of the text extractor.
/// Uses trait objects for speech, OCR and PDF extraction, enabling dependency injection.
pub struct DocumentExtractor {
    speech_engine: Box<dyn SpeechToText + Send + Sync>,
    ocr_engine: Box<dyn OcrEngine + Send + Sync>,
    pdf_extractor: Box<dyn PdfExtractor + Send + Sync>,
    ocr_languages: String,
}

impl DocumentExtractor {
    pub fn new(
        speech_engine: Box<dyn SpeechToText + Send + Sync>,
        ocr_engine: Box<dyn OcrEngine + Send + Sync>,
        pdf_extractor: Box<dyn PdfExtractor + Send + Sync>,
    ) -> Self {
        Self {
            speech_engine,
            ocr_engine,
            pdf_extractor,
            ocr_languages: DEFAULT_OCR_LANGUAGES.to_string(),
        }
    }

    /// Override the OCR language set (Tesseract-style, e.g. "eng+mar").
    pub fn with_ocr_languages(mut self, languages: &str) -> Self {
        self.ocr_languages = languages.to_string();
        self
    }

    fn transcribe(&self, artifact: &SourceArtifact) -> Result<ExtractionResult, ExtractionError> {
        let start = Instant::now();
        let file_name = artifact.file_name.as_deref().unwrap_or("dictation.webm");

        let transcript = self.speech_engine.transcribe(
            &artifact.bytes,
            file_name,
            &artifact.language,
            vocabulary_hint(&artifact.language),
        )?;

        Ok(ExtractionResult {
            text: transcript.text.trim().to_string(),
            method: ExtractionMethod::SpeechToText,
            confidence: None,
            page_count: None,
            duration_seconds: transcript.duration_seconds,
            detected_language: transcript.language,
            segments: transcript.segments,
            latency_ms: start.elapsed().as_millis() as u64,
        })
    }

    /// Direct text layer first; OCR whenever it is missing, unreadable or too short.
    fn extract_pdf(&self, artifact: &SourceArtifact) -> Result<ExtractionResult, ExtractionError> {
        let start = Instant::now();

        match self.pdf_extractor.extract_text(&artifact.bytes) {
            Ok(pages) => {
                let text = sanitize_extracted_text(&join_pages(&pages));
                let usable = text.trim().chars().count();
                if usable > MIN_TEXT_LAYER_CHARS {
                    return Ok(ExtractionResult {
                        detected_language: detect_language(&text).map(str::to_string),
                        text,
                        method: ExtractionMethod::PrimaryTextLayer,
                        confidence: None,
                        page_count: Some(pages.len()),
                        duration_seconds: None,
                        segments: vec![],
                        latency_ms: start.elapsed().as_millis() as u64,
                    });
                }
                tracing::info!(
                    usable_chars = usable,
                    pages = pages.len(),
                    "PDF text layer yielded minimal text, attempting OCR"
                );
            }
            Err(e) => {
                tracing::warn!(error = %e, "PDF text layer unreadable, attempting OCR");
            }
        }

        self.recognize(artifact)
    }

    fn recognize(&self, artifact: &SourceArtifact) -> Result<ExtractionResult, ExtractionError> {
        let start = Instant::now();
        let ocr = self.ocr_engine.recognize(&artifact.bytes, &self.ocr_languages)?;
        let text = sanitize_extracted_text(&ocr.text);

        Ok(ExtractionResult {
            detected_language: detect_language(&text).map(str::to_string),
            text,
            method: ExtractionMethod::OpticalRecognition,
            confidence: Some(ocr.confidence.clamp(0.0, 100.0)),
            page_count: None,
            duration_seconds: None,
            segments: vec![],
            latency_ms: start.elapsed().as_millis() as u64,
        })
    }

    fn read_plain_text(
        &self,
        artifact: &SourceArtifact,
    ) -> Result<ExtractionResult, ExtractionError> {
        let raw = std::str::from_utf8(&artifact.bytes)
            .map_err(|e| ExtractionError::EncodingError(format!("Text is not valid UTF-8: {e}")))?;
        let text = raw.strip_prefix('\u{FEFF}').unwrap_or(raw).trim().to_string();

        Ok(ExtractionResult {
            detected_language: detect_language(&text).map(str::to_string),
            text,
            method: ExtractionMethod::PrimaryTextLayer,
            confidence: None,
            page_count: None,
            duration_seconds: None,
            segments: vec![],
            latency_ms: 0,
        })
    }
}

impl TextExtractor for DocumentExtractor {
    fn extract(&self, artifact: &SourceArtifact) -> Result<ExtractionResult, ExtractionError> {
        let _span = tracing::info_span!(
            "extract",
            kind = artifact.kind.as_str(),
            size = artifact.bytes.len(),
            language = %artifact.language,
        )
        .entered();

        let result = match artifact.kind {
            MediaKind::Audio => self.transcribe(artifact)?,
            MediaKind::Pdf => self.extract_pdf(artifact)?,
            MediaKind::Image => self.recognize(artifact)?,
            MediaKind::PlainText => self.read_plain_text(artifact)?,
            MediaKind::Unsupported => {
                let name = artifact.file_name.as_deref().unwrap_or("input");
                return Err(ExtractionError::UnsupportedFormat(format!(
                    "{name} is not audio, PDF, image or plain text"
                )));
            }
        };

        tracing::info!(
            method = result.method.as_str(),
            text_len = result.text.len(),
            confidence = ?result.confidence,
            pages = ?result.page_count,
            latency_ms = result.latency_ms,
            "Extraction complete"
        );

        Ok(result)
    }
}
