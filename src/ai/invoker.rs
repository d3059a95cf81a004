//! Generation Invoker
//!
//! The single narrow doorway to the external collaborator: one blocking
//! round-trip per call, a deadline, and nothing else. No retry logic lives
//! here — retries are round decisions owned by the pipeline policy — and
//! nothing is cached.

use tracing::debug;

use super::prompt::GenerationRequest;
use super::provider::SharedProvider;
use super::timeout::{TimeoutConfig, with_timeout};
use crate::types::Result;

/// One-shot collaborator invoker.
#[derive(Clone)]
pub struct GenerationInvoker {
    provider: SharedProvider,
    timeouts: TimeoutConfig,
}

impl GenerationInvoker {
    pub fn new(provider: SharedProvider, timeouts: TimeoutConfig) -> Self {
        Self { provider, timeouts }
    }

    pub fn provider_name(&self) -> &str {
        self.provider.name()
    }

    /// Send one generation request and return the raw response text.
    ///
    /// Fails with `CollaboratorUnavailable` on transport failure and
    /// `CollaboratorTimeout` when the deadline elapses.
    pub async fn request(&self, request: &GenerationRequest) -> Result<String> {
        let prompt = request.render();
        debug!(
            provider = self.provider.name(),
            batch_size = request.batch_size(),
            prompt_chars = prompt.len(),
            "Invoking collaborator"
        );

        let response = with_timeout(
            self.timeouts.request,
            self.provider.generate(&prompt),
            self.provider.name(),
        )
        .await?;

        debug!(
            provider = %response.metadata.provider,
            model = %response.metadata.model,
            tokens = response.usage.total(),
            elapsed_ms = response.timing.total_ms,
            "Collaborator responded"
        );

        Ok(response.text)
    }

    /// Probe whether the collaborator is reachable at all, under the
    /// shorter connection deadline.
    pub async fn health_check(&self) -> Result<bool> {
        with_timeout(
            self.timeouts.connect,
            self.provider.health_check(),
            self.provider.name(),
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::provider::{LlmProvider, LlmResponse, ResponseMetadata, ResponseTiming, TokenUsage};
    use crate::types::{ConstraintSpec, ForgeError};
    use crate::vocab::VocabularyIndex;
    use async_trait::async_trait;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct MockProvider {
        calls: AtomicUsize,
        reply: String,
    }

    #[async_trait]
    impl LlmProvider for MockProvider {
        async fn generate(&self, _prompt: &str) -> crate::types::Result<LlmResponse> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(LlmResponse {
                text: self.reply.clone(),
                usage: TokenUsage::default(),
                timing: ResponseTiming::default(),
                metadata: ResponseMetadata {
                    model: "mock-model".to_string(),
                    provider: "mock".to_string(),
                },
            })
        }

        fn name(&self) -> &str {
            "mock"
        }

        fn model(&self) -> &str {
            "mock-model"
        }

        async fn health_check(&self) -> crate::types::Result<bool> {
            Ok(true)
        }
    }

    struct SlowProvider;

    #[async_trait]
    impl LlmProvider for SlowProvider {
        async fn generate(&self, _prompt: &str) -> crate::types::Result<LlmResponse> {
            tokio::time::sleep(std::time::Duration::from_secs(60)).await;
            unreachable!("deadline should have fired")
        }

        fn name(&self) -> &str {
            "slow"
        }

        fn model(&self) -> &str {
            "slow-model"
        }

        async fn health_check(&self) -> crate::types::Result<bool> {
            Ok(true)
        }
    }

    fn sample_request() -> GenerationRequest {
        let spec = ConstraintSpec::default();
        let index = VocabularyIndex::from_words(vec!["arcilla"]).unwrap();
        GenerationRequest::new(&spec, &index, 3)
    }

    #[tokio::test]
    async fn test_single_round_trip() {
        let provider = Arc::new(MockProvider {
            calls: AtomicUsize::new(0),
            reply: "[]".to_string(),
        });
        let invoker = GenerationInvoker::new(provider.clone(), TimeoutConfig::default());

        let text = invoker.request(&sample_request()).await.unwrap();
        assert_eq!(text, "[]");
        // Exactly one outbound call per invocation.
        assert_eq!(provider.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_deadline_maps_to_collaborator_timeout() {
        let invoker = GenerationInvoker::new(
            Arc::new(SlowProvider),
            TimeoutConfig::default().with_request_secs(0),
        );

        let err = invoker.request(&sample_request()).await.unwrap_err();
        assert!(matches!(err, ForgeError::CollaboratorTimeout { .. }));
    }
}
