use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

use super::types::{Completion, CompletionRequest, TextCompletion, VisionClient};
use super::InterpretationError;

/// Ollama HTTP client for local LLM inference.
///
/// One client per stage: the timeout is fixed at construction so metadata
/// calls fail fast while drafting gets the longer generation budget.
pub struct OllamaClient {
    base_url: String,
    model: String,
    client: reqwest::blocking::Client,
    timeout: Duration,
}

impl OllamaClient {
    pub fn new(base_url: &str, model: &str, timeout: Duration) -> Result<Self, InterpretationError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| {
                InterpretationError::UpstreamFailure(format!("HTTP client setup failed: {e}"))
            })?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
            client,
            timeout,
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn post_chat(&self, body: &ChatRequest<'_>) -> Result<ChatResponse, InterpretationError> {
        let url = format!("{}/api/chat", self.base_url);

        let response = self.client.post(&url).json(body).send().map_err(|e| {
            if e.is_connect() {
                InterpretationError::UpstreamFailure(format!(
                    "Ollama is not running at {}",
                    self.base_url
                ))
            } else if e.is_timeout() {
                InterpretationError::UpstreamFailure(format!(
                    "Request timed out after {}s",
                    self.timeout.as_secs()
                ))
            } else {
                InterpretationError::UpstreamFailure(e.to_string())
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(InterpretationError::UpstreamFailure(format!(
                "Ollama returned error (status {}): {}",
                status.as_u16(),
                body
            )));
        }

        response
            .json()
            .map_err(|e| InterpretationError::UpstreamFailure(format!("Response parsing error: {e}")))
    }
}

/// Request body for Ollama /api/chat
#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    stream: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    format: Option<&'a serde_json::Value>,
    options: ChatOptions,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    images: Option<&'a [String]>,
}

#[derive(Serialize)]
struct ChatOptions {
    temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    num_predict: Option<u32>,
}

/// Response body from Ollama /api/chat
#[derive(Deserialize)]
struct ChatResponse {
    message: ChatResponseMessage,
    #[serde(default)]
    prompt_eval_count: Option<u32>,
    #[serde(default)]
    eval_count: Option<u32>,
}

#[derive(Deserialize)]
struct ChatResponseMessage {
    content: String,
}

impl ChatResponse {
    fn tokens_used(&self) -> u32 {
        self.prompt_eval_count.unwrap_or(0) + self.eval_count.unwrap_or(0)
    }
}

impl TextCompletion for OllamaClient {
    fn complete(&self, request: &CompletionRequest) -> Result<Completion, InterpretationError> {
        let start = Instant::now();
        let body = ChatRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: &request.system,
                    images: None,
                },
                ChatMessage {
                    role: "user",
                    content: &request.user,
                    images: None,
                },
            ],
            stream: false,
            format: request.format.as_ref(),
            options: ChatOptions {
                temperature: request.temperature,
                num_predict: request.max_output_tokens,
            },
        };

        let parsed = self.post_chat(&body)?;
        let tokens_used = parsed.tokens_used();

        Ok(Completion {
            text: parsed.message.content,
            tokens_used,
            latency_ms: start.elapsed().as_millis() as u64,
        })
    }
}

impl VisionClient for OllamaClient {
    fn chat_with_images(
        &self,
        model: &str,
        prompt: &str,
        images: &[String],
        system: Option<&str>,
    ) -> Result<String, InterpretationError> {
        let mut messages = Vec::with_capacity(2);
        if let Some(system) = system {
            messages.push(ChatMessage {
                role: "system",
                content: system,
                images: None,
            });
        }
        messages.push(ChatMessage {
            role: "user",
            content: prompt,
            images: Some(images),
        });

        let body = ChatRequest {
            model,
            messages,
            stream: false,
            format: None,
            options: ChatOptions {
                temperature: 0.0,
                num_predict: None,
            },
        };

        Ok(self.post_chat(&body)?.message.content)
    }
}

// ──────────────────────────────────────────────
// Test doubles
// ──────────────────────────────────────────────

/// Mock LLM client for testing: returns a configurable response and
/// records every request it receives.
pub struct MockLlmClient {
    response: Result<String, String>,
    tokens_used: u32,
    requests: Mutex<Vec<CompletionRequest>>,
}

impl MockLlmClient {
    pub fn new(response: &str) -> Self {
        Self {
            response: Ok(response.to_string()),
            tokens_used: 100,
            requests: Mutex::new(Vec::new()),
        }
    }

    /// A client whose every call fails with `UpstreamFailure`.
    pub fn failing(message: &str) -> Self {
        Self {
            response: Err(message.to_string()),
            tokens_used: 0,
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn with_tokens(mut self, tokens_used: u32) -> Self {
        self.tokens_used = tokens_used;
        self
    }

    pub fn requests(&self) -> Vec<CompletionRequest> {
        self.requests.lock().map(|r| r.clone()).unwrap_or_default()
    }

    pub fn last_request(&self) -> Option<CompletionRequest> {
        self.requests().pop()
    }
}

impl TextCompletion for MockLlmClient {
    fn complete(&self, request: &CompletionRequest) -> Result<Completion, InterpretationError> {
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(request.clone());
        }
        match &self.response {
            Ok(text) => Ok(Completion {
                text: text.clone(),
                tokens_used: self.tokens_used,
                latency_ms: 1,
            }),
            Err(message) => Err(InterpretationError::UpstreamFailure(message.clone())),
        }
    }
}

/// Replies with a fixed sequence of responses, one per call, for
/// multi-stage flows (metadata, then draft). Records requests.
pub struct ScriptedLlmClient {
    responses: Mutex<VecDeque<String>>,
    requests: Mutex<Vec<CompletionRequest>>,
}

impl ScriptedLlmClient {
    pub fn new<I, S>(responses: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            responses: Mutex::new(responses.into_iter().map(Into::into).collect()),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn requests(&self) -> Vec<CompletionRequest> {
        self.requests.lock().map(|r| r.clone()).unwrap_or_default()
    }
}

impl TextCompletion for ScriptedLlmClient {
    fn complete(&self, request: &CompletionRequest) -> Result<Completion, InterpretationError> {
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(request.clone());
        }
        let next = self
            .responses
            .lock()
            .map_err(|_| InterpretationError::UpstreamFailure("script lock poisoned".into()))?
            .pop_front()
            .ok_or_else(|| InterpretationError::UpstreamFailure("script exhausted".into()))?;

        Ok(Completion {
            tokens_used: (next.len() / 4) as u32,
            text: next,
            latency_ms: 1,
        })
    }
}

/// Mock vision client: fixed reply, counts calls and images per call.
pub struct MockVisionClient {
    response: Result<String, String>,
    calls: AtomicUsize,
    image_counts: Mutex<Vec<usize>>,
}

impl MockVisionClient {
    pub fn new(response: &str) -> Self {
        Self {
            response: Ok(response.to_string()),
            calls: AtomicUsize::new(0),
            image_counts: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(message: &str) -> Self {
        Self {
            response: Err(message.to_string()),
            calls: AtomicUsize::new(0),
            image_counts: Mutex::new(Vec::new()),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn image_counts(&self) -> Vec<usize> {
        self.image_counts.lock().map(|c| c.clone()).unwrap_or_default()
    }
}

impl VisionClient for MockVisionClient {
    fn chat_with_images(
        &self,
        _model: &str,
        _prompt: &str,
        images: &[String],
        _system: Option<&str>,
    ) -> Result<String, InterpretationError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut counts) = self.image_counts.lock() {
            counts.push(images.len());
        }
        self.response
            .clone()
            .map_err(InterpretationError::UpstreamFailure)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> OllamaClient {
        OllamaClient::new("http://localhost:11434/", "llama3.1:8b", Duration::from_secs(60)).unwrap()
    }

    #[test]
    fn ollama_client_trims_trailing_slash() {
        let client = client();
        assert_eq!(client.base_url, "http://localhost:11434");
        assert_eq!(client.model(), "llama3.1:8b");
        assert_eq!(client.timeout, Duration::from_secs(60));
    }

    #[test]
    fn chat_request_serializes_options_and_schema() {
        let schema = serde_json::json!({"type": "object"});
        let body = ChatRequest {
            model: "llama3.1:8b",
            messages: vec![ChatMessage { role: "user", content: "hi", images: None }],
            stream: false,
            format: Some(&schema),
            options: ChatOptions { temperature: 0.1, num_predict: Some(4000) },
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["format"]["type"], "object");
        assert_eq!(json["options"]["num_predict"], 4000);
        assert!((json["options"]["temperature"].as_f64().unwrap() - 0.1).abs() < 1e-6);
        assert!(json["messages"][0].get("images").is_none());
    }

    #[test]
    fn chat_request_omits_absent_format_and_limit() {
        let body = ChatRequest {
            model: "m",
            messages: vec![],
            stream: false,
            format: None,
            options: ChatOptions { temperature: 0.2, num_predict: None },
        };
        let json = serde_json::to_value(&body).unwrap();
        assert!(json.get("format").is_none());
        assert!(json["options"].get("num_predict").is_none());
    }

    #[test]
    fn chat_response_sums_token_counts() {
        let json = r#"{
            "model": "llama3.1:8b",
            "message": {"role": "assistant", "content": "{}"},
            "done": true,
            "prompt_eval_count": 812,
            "eval_count": 190
        }"#;
        let parsed: ChatResponse = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.tokens_used(), 1002);
        assert_eq!(parsed.message.content, "{}");
    }

    #[test]
    fn chat_response_without_counts_uses_zero() {
        let parsed: ChatResponse =
            serde_json::from_str(r#"{"message": {"role": "assistant", "content": "ok"}}"#).unwrap();
        assert_eq!(parsed.tokens_used(), 0);
    }

    #[test]
    #[ignore = "opens a local TCP connection"]
    fn unreachable_ollama_is_upstream_failure() {
        let client =
            OllamaClient::new("http://127.0.0.1:9", "llama3.1:8b", Duration::from_secs(2)).unwrap();
        let err = client
            .complete(&CompletionRequest::new("system", "user", 0.1))
            .unwrap_err();
        assert!(matches!(err, InterpretationError::UpstreamFailure(_)));
    }

    #[test]
    fn mock_client_records_requests() {
        let client = MockLlmClient::new("response").with_tokens(42);
        let completion = client
            .complete(&CompletionRequest::new("sys", "user", 0.3).max_output_tokens(4000))
            .unwrap();
        assert_eq!(completion.text, "response");
        assert_eq!(completion.tokens_used, 42);
        let last = client.last_request().unwrap();
        assert_eq!(last.max_output_tokens, Some(4000));
    }

    #[test]
    fn scripted_client_replies_in_order_then_fails() {
        let client = ScriptedLlmClient::new(["first", "second"]);
        let req = CompletionRequest::new("s", "u", 0.1);
        assert_eq!(client.complete(&req).unwrap().text, "first");
        assert_eq!(client.complete(&req).unwrap().text, "second");
        assert!(client.complete(&req).is_err());
        assert_eq!(client.requests().len(), 3);
    }
}
