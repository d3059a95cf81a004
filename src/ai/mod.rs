//! AI Integration Layer
//!
//! Everything that touches the external generative collaborator: the
//! provider abstraction, prompt construction, the one-shot invoker, the
//! request deadline wrapper, and mechanical JSON repair for the payloads
//! it returns.

pub mod invoker;
pub mod json_repair;
pub mod prompt;
pub mod provider;
pub mod timeout;

pub use invoker::GenerationInvoker;
pub use prompt::GenerationRequest;
pub use provider::{
    LlmProvider, LlmResponse, OllamaProvider, OpenAiProvider, ProviderConfig, ResponseMetadata,
    ResponseTiming, SharedProvider, TokenUsage, create_provider,
};
pub use timeout::{TimeoutConfig, with_timeout};
