use std::time::Instant;

use super::parser::{parse_explanation_sections, parse_metadata};
use super::prompt::{
    explanation_system_prompt, explanation_user_prompt, metadata_schema,
    EXPLANATION_MAX_TOKENS, EXPLANATION_TEMPERATURE, METADATA_SYSTEM_PROMPT,
    METADATA_TEMPERATURE,
};
use super::types::{CompletionRequest, Explanation, MetadataExtraction, TextCompletion};
use super::InterpretationError;
use crate::models::OutputLanguage;

/// Turns unstructured legal text into a metadata record or a sectioned
/// plain-language explanation via an injected completion capability.
///
/// Metadata and explanation run against separate clients so each can carry
/// its own timeout.
pub struct DocumentInterpreter {
    metadata_llm: Box<dyn TextCompletion + Send + Sync>,
    explanation_llm: Box<dyn TextCompletion + Send + Sync>,
}

impl DocumentInterpreter {
    pub fn new(
        metadata_llm: Box<dyn TextCompletion + Send + Sync>,
        explanation_llm: Box<dyn TextCompletion + Send + Sync>,
    ) -> Self {
        Self {
            metadata_llm,
            explanation_llm,
        }
    }

    /// Extract the fixed metadata record from a dictation transcript.
    ///
    /// A response that does not parse is a `MalformedMetadata` error; no
    /// partially filled record is ever returned.
    pub fn extract_metadata(
        &self,
        transcript: &str,
    ) -> Result<MetadataExtraction, InterpretationError> {
        let transcript = transcript.trim();
        if transcript.is_empty() {
            return Err(InterpretationError::EmptyInput);
        }
        let _span =
            tracing::info_span!("extract_metadata", input_chars = transcript.chars().count())
                .entered();
        let start = Instant::now();

        let request = CompletionRequest::new(
            METADATA_SYSTEM_PROMPT,
            format!("Transcript:\n{transcript}"),
            METADATA_TEMPERATURE,
        )
        .json_schema(metadata_schema());
        let completion = self.metadata_llm.complete(&request)?;

        let metadata = parse_metadata(&completion.text).inspect_err(|e| {
            tracing::warn!(
                error = %e,
                response_chars = completion.text.len(),
                "Metadata response rejected"
            );
        })?;
        let latency_ms = start.elapsed().as_millis() as u64;

        tracing::info!(
            document_type = metadata.document_type.map(|t| t.as_str()).unwrap_or("none"),
            populated = metadata.populated_fields(),
            tokens = completion.tokens_used,
            latency_ms,
            "Metadata extracted"
        );

        Ok(MetadataExtraction {
            metadata,
            tokens_used: completion.tokens_used,
            latency_ms,
        })
    }

    /// Explain a legal document in `language` under the six fixed headings.
    pub fn explain(
        &self,
        document_text: &str,
        language: OutputLanguage,
    ) -> Result<Explanation, InterpretationError> {
        let document_text = document_text.trim();
        if document_text.is_empty() {
            return Err(InterpretationError::EmptyInput);
        }
        let _span = tracing::info_span!(
            "explain",
            input_chars = document_text.chars().count(),
            language = language.as_str()
        )
        .entered();
        let start = Instant::now();

        let request = CompletionRequest::new(
            explanation_system_prompt(language),
            explanation_user_prompt(document_text),
            EXPLANATION_TEMPERATURE,
        )
        .max_output_tokens(EXPLANATION_MAX_TOKENS);
        let completion = self.explanation_llm.complete(&request)?;

        let sections = parse_explanation_sections(&completion.text);
        let latency_ms = start.elapsed().as_millis() as u64;

        if sections.filled_count() < 6 {
            tracing::warn!(
                filled = sections.filled_count(),
                "Explanation is missing expected headings"
            );
        }
        tracing::info!(
            tokens = completion.tokens_used,
            output_chars = completion.text.chars().count(),
            latency_ms,
            "Explanation generated"
        );

        Ok(Explanation {
            full_text: completion.text,
            sections,
            tokens_used: completion.tokens_used,
            latency_ms,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::models::DocumentType;
    use crate::pipeline::structuring::{MockLlmClient, EXPLANATION_HEADINGS};

    fn interpreter(llm: Arc<MockLlmClient>) -> DocumentInterpreter {
        DocumentInterpreter::new(Box::new(llm.clone()), Box::new(llm))
    }

    fn full_explanation() -> String {
        EXPLANATION_HEADINGS
            .iter()
            .enumerate()
            .map(|(i, h)| format!("{h}\nContent of section {}.", i + 1))
            .collect::<Vec<_>>()
            .join("\n\n")
    }

    #[test]
    fn metadata_request_uses_schema_and_low_temperature() {
        let llm = Arc::new(
            MockLlmClient::new(r#"{"document_type": "bail_application", "applicant_name": "Mohan Lal"}"#)
                .with_tokens(240),
        );
        let result = interpreter(llm.clone())
            .extract_metadata("Mere muvakkil Mohan Lal ki zamanat arzi banani hai")
            .unwrap();

        assert_eq!(result.metadata.document_type, Some(DocumentType::BailApplication));
        assert_eq!(result.metadata.applicant_name.as_deref(), Some("Mohan Lal"));
        assert_eq!(result.tokens_used, 240);

        let request = llm.last_request().unwrap();
        assert_eq!(request.system, METADATA_SYSTEM_PROMPT);
        assert!(request.user.contains("Mohan Lal"));
        assert!((request.temperature - 0.1).abs() < f32::EPSILON);
        assert!(request.format.is_some());
    }

    #[test]
    fn malformed_metadata_is_an_error() {
        let llm = Arc::new(MockLlmClient::new("I could not find any details."));
        let err = interpreter(llm).extract_metadata("some transcript").unwrap_err();
        assert!(matches!(err, InterpretationError::MalformedMetadata(_)));
    }

    #[test]
    fn upstream_failure_propagates() {
        let llm = Arc::new(MockLlmClient::failing("connection refused"));
        let err = interpreter(llm.clone())
            .extract_metadata("some transcript")
            .unwrap_err();
        assert!(matches!(err, InterpretationError::UpstreamFailure(_)));

        let err = interpreter(llm)
            .explain("ORDER: matter adjourned", OutputLanguage::English)
            .unwrap_err();
        assert!(matches!(err, InterpretationError::UpstreamFailure(_)));
    }

    #[test]
    fn empty_input_never_reaches_the_client() {
        let llm = Arc::new(MockLlmClient::new("{}"));
        let interp = interpreter(llm.clone());
        assert!(matches!(
            interp.extract_metadata("  \n "),
            Err(InterpretationError::EmptyInput)
        ));
        assert!(matches!(
            interp.explain("", OutputLanguage::Hindi),
            Err(InterpretationError::EmptyInput)
        ));
        assert!(llm.requests().is_empty());
    }

    #[test]
    fn explanation_is_split_into_sections() {
        let llm = Arc::new(MockLlmClient::new(&full_explanation()).with_tokens(900));
        let explanation = interpreter(llm.clone())
            .explain("IN THE COURT OF CIVIL JUDGE ...", OutputLanguage::Hindi)
            .unwrap();

        assert_eq!(explanation.sections.filled_count(), 6);
        assert_eq!(explanation.sections.deadlines, "Content of section 4.");
        assert_eq!(explanation.tokens_used, 900);
        assert!(explanation.full_text.starts_with("## 1."));

        let request = llm.last_request().unwrap();
        assert_eq!(request.max_output_tokens, Some(3000));
        assert!(request.format.is_none());
        assert!(request.system.contains("hindi"));
        assert!(request.user.contains("CIVIL JUDGE"));
    }

    #[test]
    fn unstructured_explanation_still_returns_full_text() {
        let llm = Arc::new(MockLlmClient::new("This is a notice. Reply within 15 days."));
        let explanation = interpreter(llm)
            .explain("NOTICE under Section 80 CPC", OutputLanguage::English)
            .unwrap();
        assert_eq!(explanation.sections.filled_count(), 0);
        assert_eq!(explanation.full_text, "This is a notice. Reply within 15 days.");
    }

    #[test]
    fn stages_use_their_own_clients() {
        let metadata_llm = Arc::new(MockLlmClient::new("{}"));
        let explanation_llm = Arc::new(MockLlmClient::new(&full_explanation()));
        let interp = DocumentInterpreter::new(
            Box::new(metadata_llm.clone()),
            Box::new(explanation_llm.clone()),
        );
        interp.extract_metadata("transcript").unwrap();
        interp.explain("document", OutputLanguage::English).unwrap();
        assert_eq!(metadata_llm.requests().len(), 1);
        assert_eq!(explanation_llm.requests().len(), 1);
    }
}
