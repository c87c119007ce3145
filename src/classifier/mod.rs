//! Classifier gateway — the boundary to the LLM that judges content.
//!
//! Two uses:
//! - **Auto-scan**: every message in the monitored channel is asked a yes/no
//!   question; a `Yes` puts it in the automated queue.
//! - **Assisted review**: a rendered report is sent with the review
//!   instructions and the free-text answer goes through `Verdict::parse`.
//!
//! There is no retry and no timeout here; callers decide what a failure means.

pub mod prompts;
pub mod verdict;

pub use verdict::{SuspensionLength, Verdict};

use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use crate::error::LlmError;
use crate::llm::{ChatMessage, CompletionRequest, LlmProvider};

/// Temperature for every classifier call.
const CLASSIFIER_TEMPERATURE: f32 = 0.0;

/// Default token budget for classifier answers.
pub const DEFAULT_MAX_TOKENS: u32 = 1000;

/// `(role context, message, instructions) → verdict text`.
#[async_trait]
pub trait ClassifierGateway: Send + Sync {
    async fn classify(
        &self,
        role_context: &str,
        message: &str,
        instructions: &str,
    ) -> Result<String, LlmError>;

    /// Auto-scan one channel message. `true` when the answer is exactly `Yes`.
    async fn scan(&self, message: &str) -> Result<bool, LlmError> {
        let answer = self
            .classify(prompts::MODERATOR_CONTEXT, message, prompts::SCAN_INSTRUCTIONS)
            .await?;
        Ok(answer.trim() == "Yes")
    }

    /// Ask for a review verdict on a rendered report.
    async fn review(&self, rendered_report: &str) -> Result<Verdict, LlmError> {
        let answer = self
            .classify(
                prompts::MODERATOR_CONTEXT,
                rendered_report,
                prompts::REVIEW_INSTRUCTIONS,
            )
            .await?;
        Ok(Verdict::parse(&answer))
    }
}

/// Classifier backed by an `LlmProvider`: the role context becomes the system
/// prompt, and the user turn is the instructions followed by the message.
pub struct LlmClassifier {
    llm: Arc<dyn LlmProvider>,
    max_tokens: u32,
}

impl LlmClassifier {
    pub fn new(llm: Arc<dyn LlmProvider>) -> Self {
        Self {
            llm,
            max_tokens: DEFAULT_MAX_TOKENS,
        }
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }
}

#[async_trait]
impl ClassifierGateway for LlmClassifier {
    async fn classify(
        &self,
        role_context: &str,
        message: &str,
        instructions: &str,
    ) -> Result<String, LlmError> {
        let request = CompletionRequest::new(vec![
            ChatMessage::system(role_context),
            ChatMessage::user(format!("{instructions}{message}")),
        ])
        .with_temperature(CLASSIFIER_TEMPERATURE)
        .with_max_tokens(self.max_tokens);

        let response = self.llm.complete(request).await?;
        debug!(
            model = self.llm.model_name(),
            verdict = %response.content,
            "Classifier answered"
        );
        Ok(response.content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::{CompletionResponse, FinishReason, Role};
    use tokio::sync::Mutex;

    /// Mock LLM that returns a fixed answer and records the last request.
    struct MockLlm {
        answer: String,
        last_request: Mutex<Option<CompletionRequest>>,
    }

    impl MockLlm {
        fn new(answer: &str) -> Arc<Self> {
            Arc::new(Self {
                answer: answer.to_string(),
                last_request: Mutex::new(None),
            })
        }
    }

    #[async_trait]
    impl LlmProvider for MockLlm {
        fn model_name(&self) -> &str {
            "mock-classifier"
        }

        async fn complete(
            &self,
            request: CompletionRequest,
        ) -> Result<CompletionResponse, LlmError> {
            *self.last_request.lock().await = Some(request);
            Ok(CompletionResponse {
                content: self.answer.clone(),
                input_tokens: 10,
                output_tokens: 1,
                finish_reason: FinishReason::Stop,
                response_id: None,
            })
        }
    }

    #[tokio::test]
    async fn classify_builds_system_and_user_turns() {
        let llm = MockLlm::new("No");
        let classifier = LlmClassifier::new(llm.clone()).with_max_tokens(20);

        let answer = classifier
            .classify("ROLE", "the message", "INSTRUCTIONS: ")
            .await
            .unwrap();
        assert_eq!(answer, "No");

        let request = llm.last_request.lock().await.clone().unwrap();
        assert_eq!(request.messages[0].role, Role::System);
        assert_eq!(request.messages[0].content, "ROLE");
        assert_eq!(request.messages[1].content, "INSTRUCTIONS: the message");
        assert_eq!(request.max_tokens, Some(20));
        assert_eq!(request.temperature, Some(0.0));
    }

    #[tokio::test]
    async fn scan_requires_exact_yes() {
        assert!(LlmClassifier::new(MockLlm::new("Yes")).scan("x").await.unwrap());
        assert!(LlmClassifier::new(MockLlm::new(" Yes\n")).scan("x").await.unwrap());
        assert!(!LlmClassifier::new(MockLlm::new("No")).scan("x").await.unwrap());
        assert!(!LlmClassifier::new(MockLlm::new("Yes, clearly")).scan("x").await.unwrap());
    }

    #[tokio::test]
    async fn review_parses_verdict() {
        let classifier = LlmClassifier::new(MockLlm::new("7 days suspension"));
        assert_eq!(
            classifier.review("report").await.unwrap(),
            Verdict::Suspend(SuspensionLength::Days(7))
        );
    }
}
