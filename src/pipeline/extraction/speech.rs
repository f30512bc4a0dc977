//! Speech-to-text for legal dictation.
//!
//! `WhisperClient` speaks the OpenAI-compatible `/v1/audio/transcriptions`
//! protocol (OpenAI, faster-whisper-server, whisper.cpp server), so the
//! backend is swappable by URL alone.

use std::sync::Mutex;
use std::time::Duration;

use serde::Deserialize;

use super::types::{SpeechSegment, SpeechToText, Transcript};
use super::ExtractionError;

/// Vocabulary hint for Hindi dictation: legal terms the recognizer should expect.
pub const HINDI_LEGAL_VOCABULARY: &str = "Legal dictation in Hindi. May include terms like: \
FIR, धारा, अदालत, न्यायालय, याचिका, प्रार्थना पत्र, \
शिकायत, अभियुक्त, वादी, प्रतिवादी, आदेश, निर्णय, \
तहसीलदार, कलेक्टर, पुलिस अधीक्षक, थाना, \
Section, IPC, CrPC, CPC, BNS, BNSS";

/// Vocabulary hint for English dictation.
pub const ENGLISH_LEGAL_VOCABULARY: &str = "Legal dictation in Indian English. May include terms like: \
FIR, Section, IPC, CrPC, CPC, BNS, BNSS, affidavit, petition, bail, adjournment, \
Station House Officer, Superintendent of Police, Tehsildar, Collector, deponent, \
complainant, accused, respondent, prayer";

/// Legal vocabulary hint for a dictation language (ISO 639-1 or 639-3).
pub fn vocabulary_hint(language: &str) -> &'static str {
    match language.trim().to_ascii_lowercase().as_str() {
        "hi" | "hin" | "hindi" => HINDI_LEGAL_VOCABULARY,
        _ => ENGLISH_LEGAL_VOCABULARY,
    }
}

// ──────────────────────────────────────────────
// WhisperClient
// ──────────────────────────────────────────────

/// HTTP client for an OpenAI-compatible transcription endpoint.
pub struct WhisperClient {
    base_url: String,
    model: String,
    api_key: Option<String>,
    client: reqwest::blocking::Client,
    timeout: Duration,
}

impl WhisperClient {
    pub fn new(
        base_url: &str,
        model: &str,
        api_key: Option<String>,
        timeout: Duration,
    ) -> Result<Self, ExtractionError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| {
                ExtractionError::TranscriptionFailed(format!("HTTP client setup failed: {e}"))
            })?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
            api_key,
            client,
            timeout,
        })
    }
}

/// `verbose_json` response body
#[derive(Deserialize)]
struct TranscriptionResponse {
    text: String,
    #[serde(default)]
    language: Option<String>,
    #[serde(default)]
    duration: Option<f64>,
    #[serde(default)]
    segments: Option<Vec<SpeechSegment>>,
}

impl SpeechToText for WhisperClient {
    fn transcribe(
        &self,
        audio: &[u8],
        file_name: &str,
        language_hint: &str,
        vocabulary_hint: &str,
    ) -> Result<Transcript, ExtractionError> {
        let url = format!("{}/v1/audio/transcriptions", self.base_url);
        let mime = mime_guess::from_path(file_name).first_or_octet_stream();

        let file_part = reqwest::blocking::multipart::Part::bytes(audio.to_vec())
            .file_name(file_name.to_string())
            .mime_str(mime.essence_str())
            .map_err(|e| ExtractionError::TranscriptionFailed(e.to_string()))?;

        let form = reqwest::blocking::multipart::Form::new()
            .text("model", self.model.clone())
            .text("language", language_hint.to_string())
            .text("prompt", vocabulary_hint.to_string())
            .text("response_format", "verbose_json")
            .part("file", file_part);

        let mut request = self.client.post(&url).multipart(form);
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request.send().map_err(|e| {
            if e.is_connect() {
                ExtractionError::TranscriptionFailed(format!(
                    "Transcription server is not reachable at {}",
                    self.base_url
                ))
            } else if e.is_timeout() {
                ExtractionError::TranscriptionFailed(format!(
                    "Request timed out after {}s",
                    self.timeout.as_secs()
                ))
            } else {
                ExtractionError::TranscriptionFailed(e.to_string())
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(ExtractionError::TranscriptionFailed(format!(
                "Server returned status {}: {}",
                status.as_u16(),
                body
            )));
        }

        let parsed: TranscriptionResponse = response
            .json()
            .map_err(|e| ExtractionError::TranscriptionFailed(format!("Bad response: {e}")))?;

        Ok(Transcript {
            text: parsed.text,
            language: parsed.language,
            duration_seconds: parsed.duration,
            segments: parsed.segments.unwrap_or_default(),
        })
    }
}

// ──────────────────────────────────────────────
// MockSpeechEngine (testing)
// ──────────────────────────────────────────────

/// Mock speech engine. Returns a fixed transcript and records the hints
/// it was called with.
pub struct MockSpeechEngine {
    result: Result<Transcript, String>,
    hints: Mutex<Vec<(String, String)>>,
}

impl MockSpeechEngine {
    pub fn new(text: &str) -> Self {
        Self {
            result: Ok(Transcript {
                text: text.to_string(),
                language: Some("hindi".into()),
                duration_seconds: Some(42.0),
                segments: vec![SpeechSegment {
                    start: 0.0,
                    end: 42.0,
                    text: text.to_string(),
                }],
            }),
            hints: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(message: &str) -> Self {
        Self {
            result: Err(message.to_string()),
            hints: Mutex::new(Vec::new()),
        }
    }

    /// (language hint, vocabulary hint) for every call so far.
    pub fn recorded_hints(&self) -> Vec<(String, String)> {
        self.hints.lock().map(|h| h.clone()).unwrap_or_default()
    }
}

impl SpeechToText for MockSpeechEngine {
    fn transcribe(
        &self,
        _audio: &[u8],
        _file_name: &str,
        language_hint: &str,
        vocabulary_hint: &str,
    ) -> Result<Transcript, ExtractionError> {
        if let Ok(mut hints) = self.hints.lock() {
            hints.push((language_hint.to_string(), vocabulary_hint.to_string()));
        }
        self.result
            .clone()
            .map_err(ExtractionError::TranscriptionFailed)
    }
}

impl<T: SpeechToText + ?Sized> SpeechToText for std::sync::Arc<T> {
    fn transcribe(
        &self,
        audio: &[u8],
        file_name: &str,
        language_hint: &str,
        vocabulary_hint: &str,
    ) -> Result<Transcript, ExtractionError> {
        (**self).transcribe(audio, file_name, language_hint, vocabulary_hint)
    }
}
