/// LLM Client — the single point of entry for all Gemini API calls in AdForge.
///
/// ARCHITECTURAL RULE: No other module may call the Gemini API directly.
/// All LLM interactions MUST go through this module.
use futures_util::StreamExt;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::mpsc;
use tracing::{debug, warn};

const GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";
const REQUEST_TIMEOUT_SECS: u64 = 120;
const CHAT_CHANNEL_CAPACITY: usize = 64;

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Content blocked by safety filter ({reason})")]
    Blocked { reason: String },

    #[error("LLM returned empty content")]
    EmptyContent,
}

// ────────────────────────────────────────────────────────────────────────────
// Wire types
// ────────────────────────────────────────────────────────────────────────────

/// A single chat turn in Gemini wire format. Role is "user" or "model";
/// system-authored priming turns are sent with the "model" role.
#[derive(Debug, Clone, Serialize)]
pub struct Content {
    pub role: &'static str,
    pub parts: Vec<Part>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Part {
    pub text: String,
}

impl Content {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: "user",
            parts: vec![Part { text: text.into() }],
        }
    }

    pub fn model(text: impl Into<String>) -> Self {
        Self {
            role: "model",
            parts: vec![Part { text: text.into() }],
        }
    }
}

#[derive(Debug, Serialize)]
struct SafetySetting {
    category: &'static str,
    threshold: &'static str,
}

/// Block medium-and-above for every harm category.
const SAFETY_SETTINGS: [SafetySetting; 4] = [
    SafetySetting {
        category: "HARM_CATEGORY_HARASSMENT",
        threshold: "BLOCK_MEDIUM_AND_ABOVE",
    },
    SafetySetting {
        category: "HARM_CATEGORY_HATE_SPEECH",
        threshold: "BLOCK_MEDIUM_AND_ABOVE",
    },
    SafetySetting {
        category: "HARM_CATEGORY_SEXUALLY_EXPLICIT",
        threshold: "BLOCK_MEDIUM_AND_ABOVE",
    },
    SafetySetting {
        category: "HARM_CATEGORY_DANGEROUS_CONTENT",
        threshold: "BLOCK_MEDIUM_AND_ABOVE",
    },
];

#[derive(Debug, Serialize)]
struct GenerateContentRequest {
    contents: Vec<Content>,
    #[serde(rename = "safetySettings")]
    safety_settings: &'static [SafetySetting],
}

#[derive(Debug, Deserialize)]
pub struct GenerateContentResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
    #[serde(rename = "promptFeedback")]
    pub prompt_feedback: Option<PromptFeedback>,
    #[serde(rename = "usageMetadata")]
    pub usage_metadata: Option<UsageMetadata>,
}

#[derive(Debug, Deserialize)]
pub struct Candidate {
    pub content: Option<CandidateContent>,
    #[serde(rename = "finishReason")]
    pub finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CandidateContent {
    #[serde(default)]
    pub parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
pub struct CandidatePart {
    pub text: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct PromptFeedback {
    #[serde(rename = "blockReason")]
    pub block_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UsageMetadata {
    #[serde(rename = "promptTokenCount")]
    pub prompt_token_count: Option<u32>,
    #[serde(rename = "candidatesTokenCount")]
    pub candidates_token_count: Option<u32>,
}

impl GenerateContentResponse {
    /// Concatenated text of the first candidate's parts.
    /// Chunks with a missing or malformed parts array degrade to empty text.
    pub fn text(&self) -> String {
        self.candidates
            .first()
            .and_then(|c| c.content.as_ref())
            .map(|content| {
                content
                    .parts
                    .iter()
                    .filter_map(|p| p.text.as_deref())
                    .collect::<String>()
            })
            .unwrap_or_default()
    }

    /// True when the first candidate carries a SAFETY finish reason.
    pub fn safety_stopped(&self) -> bool {
        self.candidates
            .first()
            .and_then(|c| c.finish_reason.as_deref())
            .map(|r| r == "SAFETY")
            .unwrap_or(false)
    }
}

#[derive(Debug, Deserialize)]
struct GeminiError {
    error: GeminiErrorBody,
}

#[derive(Debug, Deserialize)]
struct GeminiErrorBody {
    message: String,
}

// ────────────────────────────────────────────────────────────────────────────
// Client
// ────────────────────────────────────────────────────────────────────────────

/// Incremental event from a streaming chat call. Exactly one of
/// `Done`, `SafetyStop`, or `Error` terminates the stream.
#[derive(Debug, Clone, PartialEq)]
pub enum ChatEvent {
    Delta(String),
    Done,
    SafetyStop,
    Error(String),
}

/// The single Gemini client used by all services in AdForge.
#[derive(Clone)]
pub struct LlmClient {
    client: Client,
    api_key: String,
    model: String,
}

impl LlmClient {
    pub fn new(api_key: String, model: String) -> Self {
        Self {
            client: Client::builder()
                .timeout(std::time::Duration::from_secs(REQUEST_TIMEOUT_SECS))
                .build()
                .expect("Failed to build HTTP client"),
            api_key,
            model,
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn endpoint(&self, verb: &str) -> String {
        format!("{GEMINI_API_BASE}/models/{}:{verb}", self.model)
    }

    /// Single-turn generation call. Exactly one request — no retry, no
    /// backoff. A safety block or empty candidate list is an error, never a
    /// partial result.
    pub async fn generate(&self, prompt: &str) -> Result<String, LlmError> {
        let request_body = GenerateContentRequest {
            contents: vec![Content::user(prompt)],
            safety_settings: &SAFETY_SETTINGS,
        };

        let response = self
            .client
            .post(self.endpoint("generateContent"))
            .header("x-goog-api-key", &self.api_key)
            .header("content-type", "application/json")
            .json(&request_body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<GeminiError>(&body)
                .map(|e| e.error.message)
                .unwrap_or(body);
            return Err(LlmError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let parsed: GenerateContentResponse = response.json().await?;

        if let Some(reason) = parsed
            .prompt_feedback
            .as_ref()
            .and_then(|f| f.block_reason.clone())
        {
            return Err(LlmError::Blocked { reason });
        }
        if parsed.safety_stopped() {
            return Err(LlmError::Blocked {
                reason: "SAFETY".to_string(),
            });
        }

        if let Some(usage) = &parsed.usage_metadata {
            debug!(
                "LLM call succeeded: prompt_tokens={:?}, candidate_tokens={:?}",
                usage.prompt_token_count, usage.candidates_token_count
            );
        }

        let text = parsed.text();
        if text.trim().is_empty() {
            return Err(LlmError::EmptyContent);
        }
        Ok(text)
    }

    /// Multi-turn chat call with a streamed response.
    ///
    /// Returns a channel of `ChatEvent`s: zero or more `Delta`s followed by a
    /// single terminal event. Every chunk is inspected for a SAFETY finish
    /// reason; on detection the stream stops immediately rather than draining
    /// to completion. Malformed chunks are skipped, not fatal.
    pub async fn stream_chat(
        &self,
        contents: Vec<Content>,
    ) -> Result<mpsc::Receiver<ChatEvent>, LlmError> {
        let request_body = GenerateContentRequest {
            contents,
            safety_settings: &SAFETY_SETTINGS,
        };

        let url = format!("{}?alt=sse", self.endpoint("streamGenerateContent"));
        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .header("content-type", "application/json")
            .json(&request_body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<GeminiError>(&body)
                .map(|e| e.error.message)
                .unwrap_or(body);
            return Err(LlmError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let (tx, rx) = mpsc::channel(CHAT_CHANNEL_CAPACITY);
        tokio::spawn(async move {
            let mut stream = response.bytes_stream();
            let mut lines = SseLineBuffer::new();

            while let Some(chunk) = stream.next().await {
                let chunk = match chunk {
                    Ok(c) => c,
                    Err(e) => {
                        warn!("Chat stream aborted: {e}");
                        let _ = tx.send(ChatEvent::Error(format!("stream error: {e}"))).await;
                        return;
                    }
                };
                lines.push(&chunk);

                while let Some(line) = lines.next_line() {
                    if !forward_line(&line, &tx).await {
                        return;
                    }
                }
            }

            // The final event can arrive without a trailing newline, and it
            // is the one that carries the finish reason. Parse the residue
            // before reporting completion.
            if let Some(line) = lines.flush() {
                if !forward_line(&line, &tx).await {
                    return;
                }
            }

            let _ = tx.send(ChatEvent::Done).await;
        });

        Ok(rx)
    }
}

/// Accumulates raw stream bytes and yields complete `\n`-terminated lines.
/// Whatever remains when the byte stream ends is recoverable via `flush`.
struct SseLineBuffer {
    buffer: String,
}

impl SseLineBuffer {
    fn new() -> Self {
        Self {
            buffer: String::new(),
        }
    }

    fn push(&mut self, bytes: &[u8]) {
        self.buffer.push_str(&String::from_utf8_lossy(bytes));
    }

    fn next_line(&mut self) -> Option<String> {
        let pos = self.buffer.find('\n')?;
        Some(self.buffer.drain(..=pos).collect())
    }

    /// Residual un-terminated line at stream end, if any.
    fn flush(&mut self) -> Option<String> {
        let tail = std::mem::take(&mut self.buffer);
        if tail.trim().is_empty() {
            None
        } else {
            Some(tail)
        }
    }
}

/// Events carried by one SSE line: at most a `Delta` followed by a
/// `SafetyStop`. The delta comes first so the caller still sees the text
/// the filter cut off. Non-data lines and malformed chunks yield nothing.
fn chunk_events(line: &str) -> Vec<ChatEvent> {
    let Some(payload) = parse_sse_data(line.trim_end()) else {
        return Vec::new();
    };
    match serde_json::from_str::<GenerateContentResponse>(payload) {
        Ok(parsed) => {
            let mut events = Vec::new();
            let text = parsed.text();
            if !text.is_empty() {
                events.push(ChatEvent::Delta(text));
            }
            if parsed.safety_stopped() {
                warn!("Chat reply stopped by safety filter mid-stream");
                events.push(ChatEvent::SafetyStop);
            }
            events
        }
        Err(e) => {
            debug!("Skipping malformed stream chunk: {e}");
            Vec::new()
        }
    }
}

/// Forwards the events from one line into the channel. Returns `false` once
/// the stream is finished: a terminal event was sent or the consumer is gone.
async fn forward_line(line: &str, tx: &mpsc::Sender<ChatEvent>) -> bool {
    for event in chunk_events(line) {
        let terminal = matches!(event, ChatEvent::SafetyStop);
        if tx.send(event).await.is_err() || terminal {
            return false;
        }
    }
    true
}

/// Extracts the JSON payload from an SSE `data:` line.
/// Comment lines, blank keep-alives, and other fields yield `None`.
fn parse_sse_data(line: &str) -> Option<&str> {
    let payload = line.strip_prefix("data:")?.trim_start();
    if payload.is_empty() {
        None
    } else {
        Some(payload)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_sse_data_extracts_payload() {
        assert_eq!(
            parse_sse_data(r#"data: {"candidates":[]}"#),
            Some(r#"{"candidates":[]}"#)
        );
    }

    #[test]
    fn test_parse_sse_data_ignores_blank_and_comments() {
        assert_eq!(parse_sse_data(""), None);
        assert_eq!(parse_sse_data(": keep-alive"), None);
        assert_eq!(parse_sse_data("event: message"), None);
        assert_eq!(parse_sse_data("data:"), None);
    }

    #[test]
    fn test_chunk_text_extraction() {
        let chunk: GenerateContentResponse = serde_json::from_str(
            r#"{"candidates":[{"content":{"parts":[{"text":"Hello "},{"text":"world"}]}}]}"#,
        )
        .unwrap();
        assert_eq!(chunk.text(), "Hello world");
        assert!(!chunk.safety_stopped());
    }

    #[test]
    fn test_chunk_safety_finish_reason_detected() {
        let chunk: GenerateContentResponse = serde_json::from_str(
            r#"{"candidates":[{"content":{"parts":[{"text":"Sure, here's..."}]},"finishReason":"SAFETY"}]}"#,
        )
        .unwrap();
        assert_eq!(chunk.text(), "Sure, here's...");
        assert!(chunk.safety_stopped());
    }

    #[test]
    fn test_chunk_missing_parts_degrades_to_empty() {
        // Malformed shape: candidate without content. Best-effort extraction.
        let chunk: GenerateContentResponse =
            serde_json::from_str(r#"{"candidates":[{"finishReason":"STOP"}]}"#).unwrap();
        assert_eq!(chunk.text(), "");
        assert!(!chunk.safety_stopped());
    }

    #[test]
    fn test_line_buffer_yields_terminated_lines_then_tail() {
        let mut lines = SseLineBuffer::new();
        lines.push(b"data: {\"a\":1}\ndata: {\"b\"");
        assert_eq!(lines.next_line().as_deref(), Some("data: {\"a\":1}\n"));
        assert_eq!(lines.next_line(), None);
        lines.push(b":2}");
        assert_eq!(lines.next_line(), None);
        assert_eq!(lines.flush().as_deref(), Some("data: {\"b\":2}"));
        assert_eq!(lines.flush(), None);
    }

    #[test]
    fn test_line_buffer_flush_ignores_whitespace_tail() {
        let mut lines = SseLineBuffer::new();
        lines.push(b"data: {}\n\r\n  ");
        assert!(lines.next_line().is_some());
        assert!(lines.next_line().is_some());
        assert_eq!(lines.flush(), None);
    }

    #[test]
    fn test_unterminated_final_event_keeps_text_and_safety_stop() {
        // The last event of a stream may lack a trailing newline; the
        // buffered residue must still produce both the delta and the stop.
        let mut lines = SseLineBuffer::new();
        lines.push(
            br#"data: {"candidates":[{"content":{"parts":[{"text":"x"}]},"finishReason":"SAFETY"}]}"#,
        );
        assert_eq!(lines.next_line(), None);
        let tail = lines.flush().unwrap();
        assert_eq!(
            chunk_events(&tail),
            vec![ChatEvent::Delta("x".to_string()), ChatEvent::SafetyStop]
        );
    }

    #[test]
    fn test_chunk_events_skips_non_data_and_malformed_lines() {
        assert!(chunk_events(": keep-alive").is_empty());
        assert!(chunk_events("event: message").is_empty());
        assert!(chunk_events("data: {not json").is_empty());
    }

    #[test]
    fn test_chunk_events_plain_delta() {
        assert_eq!(
            chunk_events(r#"data: {"candidates":[{"content":{"parts":[{"text":"Hi"}]}}]}"#),
            vec![ChatEvent::Delta("Hi".to_string())]
        );
    }

    #[test]
    fn test_block_reason_deserializes() {
        let parsed: GenerateContentResponse =
            serde_json::from_str(r#"{"promptFeedback":{"blockReason":"SAFETY"}}"#).unwrap();
        assert_eq!(
            parsed.prompt_feedback.as_ref().unwrap().block_reason.as_deref(),
            Some("SAFETY")
        );
        assert_eq!(parsed.text(), "");
    }
}
