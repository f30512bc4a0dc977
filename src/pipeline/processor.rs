//! Legal document pipeline.
//!
//! Drives extract → interpret → compose, with rendering on demand. Every
//! capability is injected as a trait object, so the whole pipeline runs
//! against mocks in tests and one instance can serve concurrent requests.

use std::path::PathBuf;
use std::sync::Arc;

use serde::Serialize;

use crate::config::PipelineConfig;
use crate::models::{DocumentType, ExportFormat, OutputLanguage, StructuredMetadata};
use crate::pipeline::drafting::{Draft, DraftComposer, RefinementOutcome};
use crate::pipeline::extraction::{
    DocumentExtractor, ExtractionError, ExtractionResult, MediaKind, OllamaVisionOcr,
    PdfTextExtractor, SourceArtifact, TextExtractor, WhisperClient, MIN_USABLE_TEXT_CHARS,
};
use crate::pipeline::rendering::{render_document, RenderError, RenderedArtifact, StylingMetadata};
use crate::pipeline::storage::{ArtifactStore, StorageError};
use crate::pipeline::structuring::{
    DocumentInterpreter, Explanation, InterpretationError, MetadataExtraction, OllamaClient,
};

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Stage a pipeline error came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineStage {
    Extraction,
    Interpretation,
    Composition,
    Rendering,
    Storage,
}

impl PipelineStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Extraction => "extraction",
            Self::Interpretation => "interpretation",
            Self::Composition => "composition",
            Self::Rendering => "rendering",
            Self::Storage => "storage",
        }
    }
}

/// A stage failure, carrying the stage's own error unchanged.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("Extraction failed: {0}")]
    Extraction(#[from] ExtractionError),

    #[error("Interpretation failed: {0}")]
    Interpretation(#[from] InterpretationError),

    /// Drafting shares the completion error type with interpretation.
    #[error("Composition failed: {0}")]
    Composition(InterpretationError),

    #[error("Rendering failed: {0}")]
    Rendering(#[from] RenderError),

    #[error("Storage failed: {0}")]
    Storage(#[from] StorageError),
}

impl PipelineError {
    pub fn stage(&self) -> PipelineStage {
        match self {
            Self::Extraction(_) => PipelineStage::Extraction,
            Self::Interpretation(_) => PipelineStage::Interpretation,
            Self::Composition(_) => PipelineStage::Composition,
            Self::Rendering(_) => PipelineStage::Rendering,
            Self::Storage(_) => PipelineStage::Storage,
        }
    }
}

// ---------------------------------------------------------------------------
// Result types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StageUsage {
    pub stage: PipelineStage,
    pub tokens_used: u32,
    pub latency_ms: u64,
}

/// Per-request token and latency totals. Returned to the caller, never stored.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct UsageReport {
    pub stages: Vec<StageUsage>,
}

impl UsageReport {
    pub fn record(&mut self, stage: PipelineStage, tokens_used: u32, latency_ms: u64) {
        self.stages.push(StageUsage {
            stage,
            tokens_used,
            latency_ms,
        });
    }

    pub fn total_tokens(&self) -> u32 {
        self.stages.iter().map(|s| s.tokens_used).sum()
    }

    pub fn total_latency_ms(&self) -> u64 {
        self.stages.iter().map(|s| s.latency_ms).sum()
    }
}

/// Output of the dictation-to-draft flows.
#[derive(Debug, Clone, Serialize)]
pub struct DraftOutcome {
    /// Present when the input was audio.
    pub extraction: Option<ExtractionResult>,
    pub transcript: String,
    pub metadata: StructuredMetadata,
    pub draft: Draft,
    pub usage: UsageReport,
}

/// Output of the explain flows.
#[derive(Debug, Clone, Serialize)]
pub struct UnderstandingOutcome {
    /// Absent for pasted text.
    pub extraction: Option<ExtractionResult>,
    pub explanation: Explanation,
    pub usage: UsageReport,
}

// ---------------------------------------------------------------------------
// Pipeline
// ---------------------------------------------------------------------------

pub struct LegalPipeline {
    extractor: Box<dyn TextExtractor + Send + Sync>,
    interpreter: DocumentInterpreter,
    composer: DraftComposer,
    unicode_font: Option<PathBuf>,
    store: ArtifactStore,
}

impl LegalPipeline {
    pub fn new(
        extractor: Box<dyn TextExtractor + Send + Sync>,
        interpreter: DocumentInterpreter,
        composer: DraftComposer,
        store: ArtifactStore,
    ) -> Self {
        Self {
            extractor,
            interpreter,
            composer,
            unicode_font: None,
            store,
        }
    }

    pub fn with_unicode_font(mut self, path: Option<PathBuf>) -> Self {
        self.unicode_font = path;
        self
    }

    /// Production wiring: Whisper, Ollama vision OCR, pdf-extract and one
    /// Ollama completion client per stage timeout.
    pub fn from_config(config: &PipelineConfig) -> Result<Self, PipelineError> {
        let timeouts = &config.timeouts;

        let vision = OllamaClient::new(&config.ollama_url, &config.vision_model, timeouts.ocr())
            .map_err(|e| ExtractionError::OcrFailed(e.to_string()))?;
        let ocr = OllamaVisionOcr::new(Arc::new(vision), &config.vision_model);
        let speech = WhisperClient::new(
            &config.transcription_url,
            &config.transcription_model,
            config.transcription_api_key.clone(),
            timeouts.transcription(),
        )?;
        let extractor = DocumentExtractor::new(
            Box::new(speech),
            Box::new(ocr),
            Box::new(PdfTextExtractor),
        )
        .with_ocr_languages(&config.ocr_languages);

        let metadata_llm =
            OllamaClient::new(&config.ollama_url, &config.completion_model, timeouts.metadata())?;
        let explanation_llm = OllamaClient::new(
            &config.ollama_url,
            &config.completion_model,
            timeouts.generation(),
        )?;
        let drafting_llm = OllamaClient::new(
            &config.ollama_url,
            &config.completion_model,
            timeouts.generation(),
        )
        .map_err(PipelineError::Composition)?;

        tracing::info!(
            ollama_url = %config.ollama_url,
            completion_model = %config.completion_model,
            vision_model = %config.vision_model,
            transcription_url = %config.transcription_url,
            ocr_languages = %config.ocr_languages,
            "Pipeline configured"
        );

        Ok(Self::new(
            Box::new(extractor),
            DocumentInterpreter::new(Box::new(metadata_llm), Box::new(explanation_llm)),
            DraftComposer::new(Box::new(drafting_llm)),
            ArtifactStore::new(&config.output_dir),
        )
        .with_unicode_font(config.unicode_font_path.clone()))
    }

    // ── Single stages ────────────────────────────────────────

    pub fn extract_text(&self, artifact: &SourceArtifact) -> Result<ExtractionResult, PipelineError> {
        Ok(self.extractor.extract(artifact)?)
    }

    pub fn extract_metadata(&self, transcript: &str) -> Result<MetadataExtraction, PipelineError> {
        Ok(self.interpreter.extract_metadata(transcript)?)
    }

    pub fn explain(
        &self,
        document_text: &str,
        language: OutputLanguage,
    ) -> Result<Explanation, PipelineError> {
        Ok(self.interpreter.explain(document_text, language)?)
    }

    pub fn compose_draft(
        &self,
        transcript: &str,
        metadata: &StructuredMetadata,
        document_type: Option<DocumentType>,
        language: OutputLanguage,
    ) -> Result<Draft, PipelineError> {
        self.composer
            .compose(transcript, metadata, document_type, language)
            .map_err(PipelineError::Composition)
    }

    pub fn refine_draft(
        &self,
        current: &Draft,
        instructions: &str,
    ) -> Result<RefinementOutcome, PipelineError> {
        self.composer
            .refine(current, instructions)
            .map_err(PipelineError::Composition)
    }

    pub fn render(
        &self,
        text: &str,
        format: ExportFormat,
        styling: &StylingMetadata,
    ) -> Result<RenderedArtifact, PipelineError> {
        Ok(render_document(text, format, styling, self.unicode_font.clone())?)
    }

    /// Persist a rendered artifact to the output directory.
    pub fn save(&self, artifact: &RenderedArtifact) -> Result<PathBuf, PipelineError> {
        Ok(self.store.save(artifact)?)
    }

    // ── Flows ────────────────────────────────────────────────

    /// Typed or pasted dictation → metadata → draft.
    ///
    /// `document_type` overrides whatever type the metadata reports.
    pub fn create_from_text(
        &self,
        transcript: &str,
        document_type: Option<DocumentType>,
        language: OutputLanguage,
    ) -> Result<DraftOutcome, PipelineError> {
        let _span = tracing::info_span!("create_from_text").entered();
        ensure_sufficient_text(transcript)?;
        self.draft_from_transcript(None, transcript.trim().to_string(), document_type, language)
    }

    /// Recorded dictation → transcript → metadata → draft.
    pub fn create_from_audio(
        &self,
        audio: &SourceArtifact,
        document_type: Option<DocumentType>,
        language: OutputLanguage,
    ) -> Result<DraftOutcome, PipelineError> {
        let _span = tracing::info_span!("create_from_audio", bytes = audio.bytes.len()).entered();
        if audio.kind != MediaKind::Audio {
            return Err(ExtractionError::UnsupportedFormat(format!(
                "expected an audio recording, got {}",
                audio.kind.as_str()
            ))
            .into());
        }

        let extraction = self.extractor.extract(audio)?.ensure_sufficient()?;
        let transcript = extraction.text.clone();
        self.draft_from_transcript(Some(extraction), transcript, document_type, language)
    }

    /// Uploaded legal document → text → plain-language explanation.
    pub fn understand_document(
        &self,
        document: &SourceArtifact,
        language: OutputLanguage,
    ) -> Result<UnderstandingOutcome, PipelineError> {
        let _span =
            tracing::info_span!("understand_document", kind = document.kind.as_str()).entered();
        let extraction = self.extractor.extract(document)?.ensure_sufficient()?;

        let mut usage = UsageReport::default();
        usage.record(PipelineStage::Extraction, 0, extraction.latency_ms);

        let explanation = self.interpreter.explain(&extraction.text, language)?;
        usage.record(
            PipelineStage::Interpretation,
            explanation.tokens_used,
            explanation.latency_ms,
        );

        Ok(UnderstandingOutcome {
            extraction: Some(extraction),
            explanation,
            usage,
        })
    }

    /// Pasted document text → explanation.
    pub fn explain_text(
        &self,
        document_text: &str,
        language: OutputLanguage,
    ) -> Result<UnderstandingOutcome, PipelineError> {
        let _span = tracing::info_span!("explain_text").entered();
        ensure_sufficient_text(document_text)?;

        let explanation = self.interpreter.explain(document_text, language)?;
        let mut usage = UsageReport::default();
        usage.record(
            PipelineStage::Interpretation,
            explanation.tokens_used,
            explanation.latency_ms,
        );
        Ok(UnderstandingOutcome {
            extraction: None,
            explanation,
            usage,
        })
    }

    fn draft_from_transcript(
        &self,
        extraction: Option<ExtractionResult>,
        transcript: String,
        document_type: Option<DocumentType>,
        language: OutputLanguage,
    ) -> Result<DraftOutcome, PipelineError> {
        let mut usage = UsageReport::default();
        if let Some(extraction) = &extraction {
            usage.record(PipelineStage::Extraction, 0, extraction.latency_ms);
        }

        let extracted = self.interpreter.extract_metadata(&transcript)?;
        usage.record(
            PipelineStage::Interpretation,
            extracted.tokens_used,
            extracted.latency_ms,
        );

        let mut metadata = extracted.metadata;
        if let Some(overriding) = document_type {
            metadata.document_type = Some(overriding);
        }

        let draft = self.compose_draft(&transcript, &metadata, None, language)?;
        usage.record(PipelineStage::Composition, draft.tokens_used, draft.latency_ms);

        tracing::info!(
            document_type = draft.document_type.as_str(),
            total_tokens = usage.total_tokens(),
            total_latency_ms = usage.total_latency_ms(),
            "Draft created"
        );

        Ok(DraftOutcome {
            extraction,
            transcript,
            metadata,
            draft,
            usage,
        })
    }
}

fn ensure_sufficient_text(text: &str) -> Result<(), ExtractionError> {
    let length = text.trim().chars().count();
    if length < MIN_USABLE_TEXT_CHARS {
        return Err(ExtractionError::InsufficientText {
            length,
            minimum: MIN_USABLE_TEXT_CHARS,
        });
    }
    Ok(())
}
