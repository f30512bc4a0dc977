use serde::{Deserialize, Serialize};

use super::InterpretationError;

/// One request to a text-completion capability.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    pub system: String,
    pub user: String,
    pub temperature: f32,
    pub max_output_tokens: Option<u32>,
    /// JSON schema the output must satisfy (structured-output variant).
    pub format: Option<serde_json::Value>,
}

impl CompletionRequest {
    pub fn new(system: impl Into<String>, user: impl Into<String>, temperature: f32) -> Self {
        Self {
            system: system.into(),
            user: user.into(),
            temperature,
            max_output_tokens: None,
            format: None,
        }
    }

    pub fn max_output_tokens(mut self, tokens: u32) -> Self {
        self.max_output_tokens = Some(tokens);
        self
    }

    pub fn json_schema(mut self, schema: serde_json::Value) -> Self {
        self.format = Some(schema);
        self
    }
}

/// Generated text plus usage.
#[derive(Debug, Clone, PartialEq)]
pub struct Completion {
    pub text: String,
    pub tokens_used: u32,
    pub latency_ms: u64,
}

/// Text-completion capability (allows mocking)
pub trait TextCompletion {
    fn complete(&self, request: &CompletionRequest) -> Result<Completion, InterpretationError>;
}

impl<T: TextCompletion + ?Sized> TextCompletion for std::sync::Arc<T> {
    fn complete(&self, request: &CompletionRequest) -> Result<Completion, InterpretationError> {
        (**self).complete(request)
    }
}

/// Vision chat capability used by optical recognition.
pub trait VisionClient {
    /// `images` are base64-encoded PNG/JPEG files.
    fn chat_with_images(
        &self,
        model: &str,
        prompt: &str,
        images: &[String],
        system: Option<&str>,
    ) -> Result<String, InterpretationError>;
}

/// The six named slots of a generated explanation. Missing sections are empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExplanationSections {
    pub about: String,
    pub important_points: String,
    pub directions: String,
    pub deadlines: String,
    pub next_steps: String,
    pub disclaimer: String,
}

impl ExplanationSections {
    /// Slots in heading order.
    pub fn in_order(&self) -> [&str; 6] {
        [
            &self.about,
            &self.important_points,
            &self.directions,
            &self.deadlines,
            &self.next_steps,
            &self.disclaimer,
        ]
    }

    pub fn filled_count(&self) -> usize {
        self.in_order().iter().filter(|s| !s.is_empty()).count()
    }
}

/// Plain-language explanation of a legal document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Explanation {
    pub full_text: String,
    pub sections: ExplanationSections,
    pub tokens_used: u32,
    pub latency_ms: u64,
}

/// Metadata record plus usage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetadataExtraction {
    pub metadata: crate::models::StructuredMetadata,
    pub tokens_used: u32,
    pub latency_ms: u64,
}
