use std::time::Instant;

use serde::{Deserialize, Serialize};

use super::templates::template_for;
use crate::models::{DocumentType, OutputLanguage, StructuredMetadata};
use crate::pipeline::structuring::{CompletionRequest, InterpretationError, TextCompletion};

pub const DRAFT_TEMPERATURE: f32 = 0.3;
pub const REFINE_TEMPERATURE: f32 = 0.2;
pub const DRAFT_MAX_TOKENS: u32 = 4000;

pub const REFINE_SYSTEM_PROMPT: &str = "You are a legal document editor for Indian courts. Modify the given document based on the lawyer's instructions. Maintain formal legal language and court-ready formatting. Return only the modified document.";

/// Generated legal draft plus usage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Draft {
    pub text: String,
    pub document_type: DocumentType,
    pub tokens_used: u32,
    pub latency_ms: u64,
}

impl Draft {
    /// Wrap existing text (e.g. an edited draft loaded from disk) for refinement.
    pub fn from_text(text: impl Into<String>, document_type: Option<DocumentType>) -> Self {
        Self {
            text: text.into(),
            document_type: document_type.unwrap_or(DocumentType::Other),
            tokens_used: 0,
            latency_ms: 0,
        }
    }
}

/// The edit pair produced by one refinement, for the caller to log.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefinementOutcome {
    pub original: String,
    pub instructions: String,
    pub refined: Draft,
}

/// Composes court-ready drafts from a transcript and its metadata.
pub struct DraftComposer {
    llm: Box<dyn TextCompletion + Send + Sync>,
}

impl DraftComposer {
    pub fn new(llm: Box<dyn TextCompletion + Send + Sync>) -> Self {
        Self { llm }
    }

    /// Generate a full draft.
    ///
    /// `document_type` overrides the type found in `metadata`; with neither,
    /// the shared default instruction is used.
    pub fn compose(
        &self,
        transcript: &str,
        metadata: &StructuredMetadata,
        document_type: Option<DocumentType>,
        language: OutputLanguage,
    ) -> Result<Draft, InterpretationError> {
        let transcript = transcript.trim();
        if transcript.is_empty() {
            return Err(InterpretationError::EmptyInput);
        }
        let resolved = document_type.or(metadata.document_type);
        let _span = tracing::info_span!(
            "compose_draft",
            document_type = resolved.map(|t| t.as_str()).unwrap_or("default"),
            language = language.as_str()
        )
        .entered();
        let start = Instant::now();

        let request = CompletionRequest::new(
            template_for(resolved),
            draft_user_prompt(transcript, metadata, language)?,
            DRAFT_TEMPERATURE,
        )
        .max_output_tokens(DRAFT_MAX_TOKENS);
        let completion = self.llm.complete(&request)?;
        let latency_ms = start.elapsed().as_millis() as u64;

        tracing::info!(
            tokens = completion.tokens_used,
            output_chars = completion.text.chars().count(),
            latency_ms,
            "Draft generated"
        );

        Ok(Draft {
            text: completion.text.trim().to_string(),
            document_type: resolved.unwrap_or(DocumentType::Other),
            tokens_used: completion.tokens_used,
            latency_ms,
        })
    }

    /// Apply a lawyer's editing instructions to an existing draft.
    pub fn refine(
        &self,
        current: &Draft,
        instructions: &str,
    ) -> Result<RefinementOutcome, InterpretationError> {
        let instructions = instructions.trim();
        if current.text.trim().is_empty() || instructions.is_empty() {
            return Err(InterpretationError::EmptyInput);
        }
        let _span = tracing::info_span!(
            "refine_draft",
            document_type = current.document_type.as_str(),
            draft_chars = current.text.chars().count(),
            instruction_chars = instructions.chars().count()
        )
        .entered();
        let start = Instant::now();

        let request = CompletionRequest::new(
            REFINE_SYSTEM_PROMPT,
            format!(
                "CURRENT DOCUMENT:\n{}\n\nINSTRUCTIONS:\n{instructions}",
                current.text
            ),
            REFINE_TEMPERATURE,
        )
        .max_output_tokens(DRAFT_MAX_TOKENS);
        let completion = self.llm.complete(&request)?;
        let latency_ms = start.elapsed().as_millis() as u64;

        tracing::info!(tokens = completion.tokens_used, latency_ms, "Draft refined");

        Ok(RefinementOutcome {
            original: current.text.clone(),
            instructions: instructions.to_string(),
            refined: Draft {
                text: completion.text.trim().to_string(),
                document_type: current.document_type,
                tokens_used: completion.tokens_used,
                latency_ms,
            },
        })
    }
}

fn draft_user_prompt(
    transcript: &str,
    metadata: &StructuredMetadata,
    language: OutputLanguage,
) -> Result<String, InterpretationError> {
    let metadata_json = serde_json::to_string_pretty(metadata)
        .map_err(|e| InterpretationError::MalformedMetadata(e.to_string()))?;
    Ok(format!(
        "Generate a formal legal document based on the following information.\n\n\
         TRANSCRIPT (original dictation):\n{transcript}\n\n\
         EXTRACTED METADATA:\n{metadata_json}\n\n\
         OUTPUT LANGUAGE: {language}\n\n\
         Generate the complete, court-ready document. Use proper legal formatting, numbered paragraphs, and formal language. Include all standard sections for this document type."
    ))
}
