/// LLM Client: the single point of entry for all model calls in the API.
///
/// ARCHITECTURAL RULE: No other module may call a provider API directly.
/// Stages depend on `dyn LlmBackend` and go through `generate_structured`,
/// which owns the timeout and retry policy.
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, warn};

pub mod prompts;
#[cfg(test)]
pub mod testing;

const OPENAI_API_URL: &str = "https://api.openai.com/v1/chat/completions";
const TEMPERATURE: f32 = 0.7;
const BASE_BACKOFF: Duration = Duration::from_millis(500);

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("LLM call timed out")]
    Timeout,

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("LLM provider rejected the API key")]
    Unauthorized,

    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("LLM returned empty content")]
    EmptyContent,

    #[error("LLM refused the request: {0}")]
    Refusal(String),

    #[error("Gave up after {attempts} attempts: {last}")]
    Exhausted {
        attempts: u32,
        #[source]
        last: Box<LlmError>,
    },
}

impl LlmError {
    /// Whether a fresh attempt of the whole call might succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            LlmError::Unauthorized | LlmError::Exhausted { .. } => false,
            LlmError::Api { status, .. } => *status == 429 || *status >= 500,
            _ => true,
        }
    }
}

/// JSON schema the model's answer must conform to.
#[derive(Debug, Clone)]
pub struct OutputShape {
    pub name: &'static str,
    pub schema: Value,
}

/// A type the LLM can be asked to produce directly.
pub trait StructuredOutput: DeserializeOwned + Send {
    fn shape() -> OutputShape;

    /// Post-parse check; a failure is treated like malformed output and retried.
    fn validate(&self) -> Result<(), LlmError> {
        Ok(())
    }
}

/// A single structured-generation round trip. No retries at this level.
#[async_trait]
pub trait LlmBackend: Send + Sync {
    async fn complete(
        &self,
        system_prompt: &str,
        user_prompt: &str,
        shape: &OutputShape,
    ) -> Result<String, LlmError>;
}

/// Timeout and whole-call retry budget applied around every backend call.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub timeout: Duration,
    pub base_backoff: Duration,
}

impl RetryPolicy {
    pub fn new(max_retries: u32, timeout: Duration) -> Self {
        Self {
            max_retries,
            timeout,
            base_backoff: BASE_BACKOFF,
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(2, Duration::from_secs(60))
    }
}

/// Calls the backend and parses the answer into `T`.
///
/// Timeouts, transport errors, 429/5xx, malformed JSON and failed `validate`
/// are retried up to `policy.max_retries` times with exponential backoff.
/// Authentication failures return immediately.
pub async fn generate_structured<T: StructuredOutput>(
    backend: &dyn LlmBackend,
    system_prompt: &str,
    user_prompt: &str,
    policy: &RetryPolicy,
) -> Result<T, LlmError> {
    let shape = T::shape();
    let attempts = policy.max_retries + 1;
    let mut last_error: Option<LlmError> = None;

    for attempt in 0..attempts {
        if attempt > 0 {
            let delay = backoff_delay(policy.base_backoff, attempt);
            warn!(
                "LLM call attempt {}/{} failed ({}), retrying after {}ms...",
                attempt,
                attempts,
                last_error.as_ref().map(ToString::to_string).unwrap_or_default(),
                delay.as_millis()
            );
            tokio::time::sleep(delay).await;
        }

        let outcome = tokio::time::timeout(
            policy.timeout,
            backend.complete(system_prompt, user_prompt, &shape),
        )
        .await
        .unwrap_or(Err(LlmError::Timeout))
        .and_then(|text| parse_structured::<T>(&text));

        match outcome {
            Ok(value) => return Ok(value),
            Err(e) if !e.is_retryable() => return Err(e),
            Err(e) => last_error = Some(e),
        }
    }

    Err(LlmError::Exhausted {
        attempts,
        last: Box::new(last_error.unwrap_or(LlmError::EmptyContent)),
    })
}

fn parse_structured<T: StructuredOutput>(text: &str) -> Result<T, LlmError> {
    let value: T = serde_json::from_str(strip_json_fences(text))?;
    value.validate()?;
    Ok(value)
}

// ────────────────────────────────────────────────────────────────────────────
// OpenAI Chat Completions backend
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    temperature: f32,
    messages: [ChatMessage<'a>; 2],
    response_format: ResponseFormat<'a>,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ResponseFormat<'a> {
    #[serde(rename = "type")]
    format_type: &'a str,
    json_schema: JsonSchemaFormat<'a>,
}

#[derive(Debug, Serialize)]
struct JsonSchemaFormat<'a> {
    name: &'a str,
    schema: &'a Value,
    strict: bool,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
    usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
    refusal: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Usage {
    prompt_tokens: u32,
    completion_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct OpenAiError {
    error: OpenAiErrorBody,
}

#[derive(Debug, Deserialize)]
struct OpenAiErrorBody {
    message: String,
}

/// Structured-output client for the OpenAI Chat Completions API.
#[derive(Clone)]
pub struct LlmClient {
    client: Client,
    api_key: String,
    model: String,
}

impl LlmClient {
    pub fn new(api_key: String, model: String, timeout: Duration) -> Result<Self, LlmError> {
        Ok(Self {
            client: Client::builder().timeout(timeout).build()?,
            api_key,
            model,
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

#[async_trait]
impl LlmBackend for LlmClient {
    async fn complete(
        &self,
        system_prompt: &str,
        user_prompt: &str,
        shape: &OutputShape,
    ) -> Result<String, LlmError> {
        let request_body = ChatRequest {
            model: &self.model,
            temperature: TEMPERATURE,
            messages: [
                ChatMessage {
                    role: "system",
                    content: system_prompt,
                },
                ChatMessage {
                    role: "user",
                    content: user_prompt,
                },
            ],
            response_format: ResponseFormat {
                format_type: "json_schema",
                json_schema: JsonSchemaFormat {
                    name: shape.name,
                    schema: &shape.schema,
                    strict: true,
                },
            },
        };

        let response = self
            .client
            .post(OPENAI_API_URL)
            .bearer_auth(&self.api_key)
            .json(&request_body)
            .send()
            .await
            .map_err(map_transport_error)?;

        let status = response.status();

        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(LlmError::Unauthorized);
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<OpenAiError>(&body)
                .map(|e| e.error.message)
                .unwrap_or(body);
            warn!("LLM API returned {}: {}", status, message);
            return Err(LlmError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let chat: ChatResponse = response.json().await.map_err(map_transport_error)?;

        if let Some(usage) = &chat.usage {
            debug!(
                "LLM call succeeded: shape={}, prompt_tokens={}, completion_tokens={}",
                shape.name, usage.prompt_tokens, usage.completion_tokens
            );
        }

        let message = chat
            .choices
            .into_iter()
            .next()
            .map(|c| c.message)
            .ok_or(LlmError::EmptyContent)?;

        if let Some(refusal) = message.refusal {
            return Err(LlmError::Refusal(refusal));
        }

        message
            .content
            .filter(|c| !c.trim().is_empty())
            .ok_or(LlmError::EmptyContent)
    }
}

/// Exponential backoff before retry `attempt` (1-based): base, 2x base, 4x base...
/// Saturates instead of overflowing for large retry counts.
fn backoff_delay(base: Duration, attempt: u32) -> Duration {
    base.saturating_mul(2u32.saturating_pow(attempt.saturating_sub(1)))
}

fn map_transport_error(e: reqwest::Error) -> LlmError {
    if e.is_timeout() {
        LlmError::Timeout
    } else {
        LlmError::Http(e)
    }
}

/// Strips ```json ... ``` or ``` ... ``` code fences from LLM output.
fn strip_json_fences(text: &str) -> &str {
    let text = text.trim();
    if let Some(stripped) = text.strip_prefix("```json") {
        stripped
            .trim_start()
            .strip_suffix("```")
            .map(|s| s.trim())
            .unwrap_or(stripped.trim_start())
    } else if let Some(stripped) = text.strip_prefix("```") {
        stripped
            .trim_start()
            .strip_suffix("```")
            .map(|s| s.trim())
            .unwrap_or(stripped.trim_start())
    } else {
        text
    }
}

#[cfg(test)]
mod tests {
    use super::testing::{ScriptedBackend, StallingBackend};
    use super::*;

    #[derive(Debug, Deserialize)]
    struct Headline {
        headline: String,
    }

    impl StructuredOutput for Headline {
        fn shape() -> OutputShape {
            OutputShape {
                name: "headline",
                schema: serde_json::json!({
                    "type": "object",
                    "properties": { "headline": { "type": "string" } },
                    "required": ["headline"],
                    "additionalProperties": false
                }),
            }
        }

        fn validate(&self) -> Result<(), LlmError> {
            if self.headline.is_empty() {
                return Err(LlmError::EmptyContent);
            }
            Ok(())
        }
    }

    fn ok(text: &str) -> Result<String, LlmError> {
        Ok(text.to_string())
    }

    #[test]
    fn test_strip_json_fences_with_json_tag() {
        let input = "```json\n{\"key\": \"value\"}\n```";
        assert_eq!(strip_json_fences(input), "{\"key\": \"value\"}");
    }

    #[test]
    fn test_strip_json_fences_without_tag() {
        let input = "```\n{\"key\": \"value\"}\n```";
        assert_eq!(strip_json_fences(input), "{\"key\": \"value\"}");
    }

    #[test]
    fn test_strip_json_fences_no_fences() {
        let input = "{\"key\": \"value\"}";
        assert_eq!(strip_json_fences(input), "{\"key\": \"value\"}");
    }

    #[test]
    fn test_backoff_doubles_and_saturates() {
        let base = Duration::from_millis(500);
        assert_eq!(backoff_delay(base, 1), Duration::from_millis(500));
        assert_eq!(backoff_delay(base, 2), Duration::from_millis(1000));
        assert_eq!(backoff_delay(base, 3), Duration::from_millis(2000));
        assert_eq!(backoff_delay(base, 40), base.saturating_mul(u32::MAX));
    }

    #[test]
    fn test_only_auth_and_client_errors_are_fatal() {
        assert!(!LlmError::Unauthorized.is_retryable());
        assert!(!LlmError::Api { status: 400, message: String::new() }.is_retryable());
        assert!(LlmError::Api { status: 429, message: String::new() }.is_retryable());
        assert!(LlmError::Api { status: 503, message: String::new() }.is_retryable());
        assert!(LlmError::Timeout.is_retryable());
        assert!(LlmError::EmptyContent.is_retryable());
    }

    #[tokio::test(start_paused = true)]
    async fn test_malformed_output_is_retried_until_success() {
        let backend = ScriptedBackend::new(vec![
            ok("not json at all"),
            ok(r#"{"headline": ""}"#),
            ok(r#"{"headline": "Band 7 in four weeks"}"#),
        ]);

        let result: Headline =
            generate_structured(&backend, "sys", "user", &RetryPolicy::default())
                .await
                .unwrap();

        assert_eq!(result.headline, "Band 7 in four weeks");
        assert_eq!(backend.call_count(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_retry_budget_is_whole_calls_then_exhausted() {
        let backend = ScriptedBackend::new(vec![
            Err(LlmError::Api { status: 500, message: "boom".into() }),
            Err(LlmError::Api { status: 502, message: "boom".into() }),
            Err(LlmError::Api { status: 503, message: "boom".into() }),
            ok(r#"{"headline": "never reached"}"#),
        ]);

        let err = generate_structured::<Headline>(&backend, "sys", "user", &RetryPolicy::default())
            .await
            .unwrap_err();

        assert!(matches!(err, LlmError::Exhausted { attempts: 3, .. }));
        assert_eq!(backend.call_count(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_unauthorized_is_not_retried() {
        let backend = ScriptedBackend::new(vec![
            Err(LlmError::Unauthorized),
            ok(r#"{"headline": "never reached"}"#),
        ]);

        let err = generate_structured::<Headline>(&backend, "sys", "user", &RetryPolicy::default())
            .await
            .unwrap_err();

        assert!(matches!(err, LlmError::Unauthorized));
        assert_eq!(backend.call_count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeouts_consume_the_retry_budget() {
        let backend = StallingBackend::default();
        let policy = RetryPolicy::new(2, Duration::from_secs(5));

        let err = generate_structured::<Headline>(&backend, "sys", "user", &policy)
            .await
            .unwrap_err();

        match err {
            LlmError::Exhausted { attempts, last } => {
                assert_eq!(attempts, 3);
                assert!(matches!(*last, LlmError::Timeout));
            }
            other => panic!("expected Exhausted, got {other:?}"),
        }
        assert_eq!(backend.call_count(), 3);
    }

    #[test]
    fn test_chat_request_carries_strict_json_schema() {
        let shape = Headline::shape();
        let request = ChatRequest {
            model: "gpt-4o-mini",
            temperature: TEMPERATURE,
            messages: [
                ChatMessage { role: "system", content: "s" },
                ChatMessage { role: "user", content: "u" },
            ],
            response_format: ResponseFormat {
                format_type: "json_schema",
                json_schema: JsonSchemaFormat {
                    name: shape.name,
                    schema: &shape.schema,
                    strict: true,
                },
            },
        };

        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["response_format"]["type"], "json_schema");
        assert_eq!(json["response_format"]["json_schema"]["name"], "headline");
        assert_eq!(json["response_format"]["json_schema"]["strict"], true);
        assert_eq!(json["messages"][0]["role"], "system");
        assert_eq!(json["messages"][1]["content"], "u");
    }

    #[test]
    fn test_chat_response_refusal_deserializes() {
        let body = r#"{
            "choices": [{ "message": { "content": null, "refusal": "I can't help with that." } }],
            "usage": { "prompt_tokens": 12, "completion_tokens": 5 }
        }"#;
        let parsed: ChatResponse = serde_json::from_str(body).unwrap();
        assert_eq!(
            parsed.choices[0].message.refusal.as_deref(),
            Some("I can't help with that.")
        );
        assert!(parsed.choices[0].message.content.is_none());
    }
}
