//! Initial ad generation — validates inputs, assembles the prompt, issues
//! the single generateContent call.
//!
//! Exactly one request per user action: no retry, no backoff. Failures are
//! surfaced once and leave all session state untouched; recovery is a manual
//! re-submission.

use tracing::info;

use crate::errors::AppError;
use crate::generation::prompts::build_generation_prompt;
use crate::generation::tone::Tone;
use crate::llm_client::{LlmClient, LlmError};

/// Generates a job advertisement from the template and description.
/// Returns the complete ad text, or an error with no partial result.
pub async fn generate_ad(
    llm: &LlmClient,
    template: &str,
    description: &str,
    tone: Tone,
    max_words: u32,
) -> Result<String, AppError> {
    if template.trim().is_empty() {
        return Err(AppError::Validation(
            "Job ad template cannot be empty".to_string(),
        ));
    }
    if description.trim().is_empty() {
        return Err(AppError::Validation(
            "Job description cannot be empty".to_string(),
        ));
    }

    let prompt = build_generation_prompt(template, description, tone, max_words);
    info!(
        "Generating ad: tone={}, max_words={}, prompt_len={}",
        tone.label(),
        max_words,
        prompt.len()
    );

    match llm.generate(&prompt).await {
        Ok(text) => Ok(text),
        Err(LlmError::Blocked { reason }) => Err(AppError::SafetyBlocked(reason)),
        Err(LlmError::EmptyContent) => Err(AppError::Llm(
            "The model returned an empty response".to_string(),
        )),
        Err(e) => Err(AppError::Llm(format!("Ad generation failed: {e}"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_client() -> LlmClient {
        LlmClient::new("test-key".to_string(), "gemini-2.0-flash-001".to_string())
    }

    #[tokio::test]
    async fn test_empty_template_rejected_before_any_call() {
        let err = generate_ad(&test_client(), "   ", "desc", Tone::default(), 0)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn test_empty_description_rejected_before_any_call() {
        let err = generate_ad(&test_client(), "template", "\n\t", Tone::default(), 0)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }
}
