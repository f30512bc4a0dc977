//! Optical recognition through an Ollama vision model.
//!
//! Bridges the `VisionClient` (structuring layer) to the `OcrEngine` trait
//! (extraction layer). Scanned PDFs are split into their embedded page
//! images first; each page is recognized separately and the texts joined.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use base64::Engine as _;

use super::page_images::extract_page_images;
use super::types::{OcrEngine, OcrPageResult};
use super::ExtractionError;
use crate::pipeline::structuring::types::VisionClient;

// ──────────────────────────────────────────────
// Prompts
// ──────────────────────────────────────────────

const OCR_SYSTEM_PROMPT: &str = "\
You are a text extractor for Indian legal and court documents. Your task is to \
transcribe ALL visible text from the provided page image exactly as written. \
Do not translate, summarize, or correct anything.";

/// Marker the model is asked to use for unreadable words.
const ILLEGIBLE_MARKER: &str = "[illegible]";

fn ocr_user_prompt(languages: &str) -> String {
    format!(
        "Extract all visible text from this page. The text is in {}. \
         Keep the original script, line breaks, paragraph numbering and case numbers. \
         Write {ILLEGIBLE_MARKER} for any word you cannot read. \
         Output only the extracted text.",
        describe_languages(languages)
    )
}

/// "eng+hin" → "English and Hindi (Devanagari script)".
pub fn describe_languages(languages: &str) -> String {
    let names: Vec<String> = languages
        .split('+')
        .map(str::trim)
        .filter(|code| !code.is_empty())
        .map(|code| match code {
            "eng" => "English".to_string(),
            "hin" => "Hindi (Devanagari script)".to_string(),
            "mar" => "Marathi (Devanagari script)".to_string(),
            "urd" => "Urdu".to_string(),
            other => other.to_string(),
        })
        .collect();

    match names.len() {
        0 => "English".to_string(),
        1 => names[0].clone(),
        n => format!("{} and {}", names[..n - 1].join(", "), names[n - 1]),
    }
}

// ──────────────────────────────────────────────
// OllamaVisionOcr
// ──────────────────────────────────────────────

/// Production OCR engine backed by an Ollama vision model.
pub struct OllamaVisionOcr {
    vision_client: Arc<dyn VisionClient + Send + Sync>,
    model_name: String,
}

impl OllamaVisionOcr {
    pub fn new(vision_client: Arc<dyn VisionClient + Send + Sync>, model_name: &str) -> Self {
        Self {
            vision_client,
            model_name: model_name.to_string(),
        }
    }

    fn recognize_image(
        &self,
        image_bytes: &[u8],
        languages: &str,
    ) -> Result<OcrPageResult, ExtractionError> {
        let images = vec![base64::engine::general_purpose::STANDARD.encode(image_bytes)];
        let prompt = ocr_user_prompt(languages);

        let raw = self
            .vision_client
            .chat_with_images(&self.model_name, &prompt, &images, Some(OCR_SYSTEM_PROMPT))
            .map_err(|e| ExtractionError::OcrFailed(format!("Vision OCR failed: {e}")))?;

        let text = raw.trim().to_string();
        let confidence = compute_heuristic_confidence(&text);
        Ok(OcrPageResult { text, confidence })
    }
}

impl OcrEngine for OllamaVisionOcr {
    fn recognize(&self, bytes: &[u8], languages: &str) -> Result<OcrPageResult, ExtractionError> {
        let _span = tracing::info_span!(
            "vision_ocr",
            model = %self.model_name,
            input_size = bytes.len(),
            languages,
        )
        .entered();
        let start = std::time::Instant::now();

        let pages = if bytes.starts_with(b"%PDF") {
            let images = extract_page_images(bytes)?;
            if images.is_empty() {
                return Err(ExtractionError::OcrFailed(
                    "PDF has no text layer and no embedded page images".into(),
                ));
            }
            images
                .iter()
                .map(|img| self.recognize_image(img, languages))
                .collect::<Result<Vec<_>, _>>()?
        } else {
            vec![self.recognize_image(bytes, languages)?]
        };

        let result = merge_pages(pages);

        tracing::info!(
            elapsed_ms = %start.elapsed().as_millis(),
            text_len = result.text.len(),
            confidence = result.confidence,
            "Vision OCR complete"
        );

        Ok(result)
    }
}

/// Join page texts and average their confidence.
fn merge_pages(pages: Vec<OcrPageResult>) -> OcrPageResult {
    let count = pages.len().max(1) as f32;
    let confidence = pages.iter().map(|p| p.confidence).sum::<f32>() / count;
    let text = pages
        .into_iter()
        .map(|p| p.text)
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join("\n\n");
    OcrPageResult { text, confidence }
}

// ──────────────────────────────────────────────
// Confidence heuristic
// ──────────────────────────────────────────────

/// Estimate a 0–100 confidence from the shape of the output.
///
/// Vision models give no per-word confidence. Length sets the base
/// (0 chars → 0, <50 → 20, <200 → 40, <500 → 60, otherwise 80), numbered
/// paragraphs add 5, and every `[illegible]` marker costs 5.
/// Capped at 95.
pub fn compute_heuristic_confidence(text: &str) -> f32 {
    let len = text.chars().count();
    if len == 0 {
        return 0.0;
    }

    let base: f32 = match len {
        0..=49 => 20.0,
        50..=199 => 40.0,
        200..=499 => 60.0,
        _ => 80.0,
    };

    let numbered = text.lines().any(|l| {
        let l = l.trim_start();
        l.split_once('.')
            .is_some_and(|(n, _)| !n.is_empty() && n.chars().all(|c| c.is_ascii_digit()))
    });
    let bonus = if numbered { 5.0 } else { 0.0 };

    let illegible = text.matches(ILLEGIBLE_MARKER).count() as f32;

    (base + bonus - 5.0 * illegible).clamp(5.0, 95.0)
}

// ──────────────────────────────────────────────
// MockOcrEngine (testing)
// ──────────────────────────────────────────────

/// Mock OCR engine for testing. Returns a fixed result and counts calls.
pub struct MockOcrEngine {
    result: Result<OcrPageResult, String>,
    calls: AtomicUsize,
}

impl MockOcrEngine {
    pub fn new(text: &str, confidence: f32) -> Self {
        Self {
            result: Ok(OcrPageResult {
                text: text.to_string(),
                confidence,
            }),
            calls: AtomicUsize::new(0),
        }
    }

    /// An engine whose every call fails with `OcrFailed`.
    pub fn failing(message: &str) -> Self {
        Self {
            result: Err(message.to_string()),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl OcrEngine for MockOcrEngine {
    fn recognize(&self, _bytes: &[u8], _languages: &str) -> Result<OcrPageResult, ExtractionError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.result
            .clone()
            .map_err(ExtractionError::OcrFailed)
    }
}

impl<T: OcrEngine + ?Sized> OcrEngine for Arc<T> {
    fn recognize(&self, bytes: &[u8], languages: &str) -> Result<OcrPageResult, ExtractionError> {
        (**self).recognize(bytes, languages)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::extraction::page_images::tests::{fake_jpeg, make_scanned_pdf};
    use crate::pipeline::structuring::ollama::MockVisionClient;

    #[test]
    fn describe_default_language_set() {
        assert_eq!(describe_languages("eng+hin"), "English and Hindi (Devanagari script)");
        assert_eq!(describe_languages("eng"), "English");
        assert_eq!(describe_languages(""), "English");
        assert_eq!(
            describe_languages("eng+hin+urd"),
            "English, Hindi (Devanagari script) and Urdu"
        );
    }

    #[test]
    fn prompt_names_languages_and_marker() {
        let prompt = ocr_user_prompt("eng+hin");
        assert!(prompt.contains("Hindi"));
        assert!(prompt.contains(ILLEGIBLE_MARKER));
    }

    #[test]
    fn confidence_empty_text_is_zero() {
        assert_eq!(compute_heuristic_confidence(""), 0.0);
    }

    #[test]
    fn confidence_grows_with_length() {
        let short = compute_heuristic_confidence("ORDER");
        let long = compute_heuristic_confidence(&"न्यायालय का आदेश ".repeat(40));
        assert_eq!(short, 20.0);
        assert!(long > short);
    }

    #[test]
    fn confidence_numbered_paragraph_bonus() {
        let text = "1. The applicant is a resident of Barabanki district in Uttar Pradesh.";
        assert_eq!(compute_heuristic_confidence(text), 45.0);
    }

    #[test]
    fn illegible_markers_lower_confidence() {
        let clean = "The accused entered the house on the night of the incident.";
        let messy = "The accused [illegible] entered [illegible] house [illegible] the incident.";
        assert!(compute_heuristic_confidence(messy) < compute_heuristic_confidence(clean));
        assert!(compute_heuristic_confidence(messy) >= 5.0);
    }

    #[test]
    fn image_bytes_sent_as_single_base64_image() {
        let client = Arc::new(MockVisionClient::new("थाना कोतवाली\nFIR No. 12/2025"));
        let ocr = OllamaVisionOcr::new(client.clone(), "llama3.2-vision");

        let result = ocr.recognize(&fake_jpeg(32), "eng+hin").unwrap();
        assert_eq!(result.text, "थाना कोतवाली\nFIR No. 12/2025");
        assert_eq!(client.image_counts(), vec![1]);
    }

    #[test]
    fn scanned_pdf_is_split_into_page_images() {
        let client = Arc::new(MockVisionClient::new("Page text"));
        let ocr = OllamaVisionOcr::new(client.clone(), "llama3.2-vision");

        let pdf = make_scanned_pdf(&[fake_jpeg(128)]);
        let result = ocr.recognize(&pdf, "eng+hin").unwrap();
        assert_eq!(result.text, "Page text");
        assert_eq!(client.call_count(), 1);
    }

    #[test]
    fn pdf_without_images_fails_ocr() {
        let client = Arc::new(MockVisionClient::new("unused"));
        let ocr = OllamaVisionOcr::new(client.clone(), "llama3.2-vision");

        let pdf = crate::pipeline::extraction::pdf::tests::make_test_pdf(&["x"]);
        let err = ocr.recognize(&pdf, "eng+hin").unwrap_err();
        assert!(matches!(err, ExtractionError::OcrFailed(_)));
        assert_eq!(client.call_count(), 0);
    }

    #[test]
    fn vision_failure_maps_to_ocr_failed() {
        let client = Arc::new(MockVisionClient::failing("connection refused"));
        let ocr = OllamaVisionOcr::new(client, "llama3.2-vision");
        let err = ocr.recognize(&fake_jpeg(16), "eng").unwrap_err();
        assert!(matches!(err, ExtractionError::OcrFailed(ref m) if m.contains("connection refused")));
    }

    #[test]
    fn merge_averages_confidence() {
        let merged = merge_pages(vec![
            OcrPageResult { text: "one".into(), confidence: 40.0 },
            OcrPageResult { text: "".into(), confidence: 0.0 },
            OcrPageResult { text: "three".into(), confidence: 80.0 },
        ]);
        assert_eq!(merged.text, "one\n\nthree");
        assert_eq!(merged.confidence, 40.0);
    }

    #[test]
    fn mock_counts_calls() {
        let mock = MockOcrEngine::new("text", 88.0);
        mock.recognize(b"img", "eng").unwrap();
        mock.recognize(b"img", "eng").unwrap();
        assert_eq!(mock.call_count(), 2);
        assert!(MockOcrEngine::failing("boom").recognize(b"x", "eng").is_err());
    }
}
