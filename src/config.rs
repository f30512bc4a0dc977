//! Application constants and pipeline configuration.
//!
//! `PipelineConfig` carries everything the concrete backends need: endpoints,
//! model names, OCR language set, per-stage timeouts and output locations.
//! Defaults target a local Ollama instance and a local Whisper-compatible
//! transcription server; every value can be overridden with a `NYAYMITRA_*`
//! environment variable.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Application-level constants
pub const APP_NAME: &str = "NyayMitra";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Get the application data directory.
/// Falls back to the current directory when no data dir can be resolved.
pub fn app_data_dir() -> PathBuf {
    dirs::data_dir()
        .or_else(dirs::home_dir)
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_NAME)
}

/// Directory where rendered artifacts are written by default.
pub fn exports_dir() -> PathBuf {
    app_data_dir().join("exports")
}

/// Default tracing filter when `RUST_LOG` is not set.
pub fn default_log_filter() -> &'static str {
    "nyaymitra=info,warn"
}

// ═══════════════════════════════════════════════════════════
// Pipeline configuration
// ═══════════════════════════════════════════════════════════

/// Per-stage timeouts, in seconds.
///
/// Transcription and OCR run over whole recordings or scanned pages and get a
/// much longer budget than the structured metadata call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StageTimeouts {
    pub transcription_secs: u64,
    pub ocr_secs: u64,
    pub metadata_secs: u64,
    pub generation_secs: u64,
}

impl Default for StageTimeouts {
    fn default() -> Self {
        Self {
            transcription_secs: 600,
            ocr_secs: 300,
            metadata_secs: 60,
            generation_secs: 180,
        }
    }
}

impl StageTimeouts {
    pub fn transcription(&self) -> Duration {
        Duration::from_secs(self.transcription_secs)
    }

    pub fn ocr(&self) -> Duration {
        Duration::from_secs(self.ocr_secs)
    }

    pub fn metadata(&self) -> Duration {
        Duration::from_secs(self.metadata_secs)
    }

    pub fn generation(&self) -> Duration {
        Duration::from_secs(self.generation_secs)
    }
}

/// Deserialization fills missing keys from `Default`, so a config file only
/// needs the settings it changes.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Base URL of the Ollama server used for completion and vision OCR.
    pub ollama_url: String,
    /// Model used for metadata, explanation and drafting.
    pub completion_model: String,
    /// Vision-capable model used for optical recognition.
    pub vision_model: String,
    /// Base URL of an OpenAI-compatible transcription server.
    pub transcription_url: String,
    pub transcription_model: String,
    /// Bearer token for the transcription server, if it needs one.
    #[serde(skip_serializing)]
    pub transcription_api_key: Option<String>,
    /// Tesseract-style language set for OCR ("eng+hin").
    pub ocr_languages: String,
    /// Default dictation language hint (ISO 639-1).
    pub dictation_language: String,
    pub timeouts: StageTimeouts,
    pub output_dir: PathBuf,
    /// TrueType font with Devanagari coverage for PDF output.
    /// Without it PDFs use the built-in Times family.
    pub unicode_font_path: Option<PathBuf>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            ollama_url: "http://localhost:11434".into(),
            completion_model: "llama3.1:8b".into(),
            vision_model: "llama3.2-vision".into(),
            transcription_url: "http://localhost:8000".into(),
            transcription_model: "whisper-1".into(),
            transcription_api_key: None,
            ocr_languages: "eng+hin".into(),
            dictation_language: "hi".into(),
            timeouts: StageTimeouts::default(),
            output_dir: exports_dir(),
            unicode_font_path: None,
        }
    }
}

impl PipelineConfig {
    /// Defaults overridden by `NYAYMITRA_*` environment variables.
    ///
    /// Timeout variables that do not parse as integers are ignored with a warning.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(v) = lookup("NYAYMITRA_OLLAMA_URL") {
            config.ollama_url = v;
        }
        if let Some(v) = lookup("NYAYMITRA_COMPLETION_MODEL") {
            config.completion_model = v;
        }
        if let Some(v) = lookup("NYAYMITRA_VISION_MODEL") {
            config.vision_model = v;
        }
        if let Some(v) = lookup("NYAYMITRA_TRANSCRIPTION_URL") {
            config.transcription_url = v;
        }
        if let Some(v) = lookup("NYAYMITRA_TRANSCRIPTION_MODEL") {
            config.transcription_model = v;
        }
        if let Some(v) = lookup("NYAYMITRA_TRANSCRIPTION_API_KEY") {
            config.transcription_api_key = Some(v);
        }
        if let Some(v) = lookup("NYAYMITRA_OCR_LANGUAGES") {
            config.ocr_languages = v;
        }
        if let Some(v) = lookup("NYAYMITRA_DICTATION_LANGUAGE") {
            config.dictation_language = v;
        }
        if let Some(v) = lookup("NYAYMITRA_OUTPUT_DIR") {
            config.output_dir = PathBuf::from(v);
        }
        if let Some(v) = lookup("NYAYMITRA_UNICODE_FONT") {
            config.unicode_font_path = Some(PathBuf::from(v));
        }

        let timeout_vars: [(&str, &mut u64); 4] = [
            ("NYAYMITRA_TRANSCRIPTION_TIMEOUT_SECS", &mut config.timeouts.transcription_secs),
            ("NYAYMITRA_OCR_TIMEOUT_SECS", &mut config.timeouts.ocr_secs),
            ("NYAYMITRA_METADATA_TIMEOUT_SECS", &mut config.timeouts.metadata_secs),
            ("NYAYMITRA_GENERATION_TIMEOUT_SECS", &mut config.timeouts.generation_secs),
        ];
        for (key, slot) in timeout_vars {
            if let Some(raw) = lookup(key) {
                match raw.trim().parse::<u64>() {
                    Ok(secs) if secs > 0 => *slot = secs,
                    _ => tracing::warn!(key, value = %raw, "Ignoring invalid timeout override"),
                }
            }
        }

        config
    }
}
