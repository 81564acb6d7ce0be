//! Language-model access behind a small trait so the pipeline can be driven by a fake.

pub mod openai;
pub mod types;

pub use openai::OpenAiClient;
pub use types::{ChatCompletion, ChatRequest, Message, Usage};

use crate::error::LlmError;
use async_trait::async_trait;

/// A chat-completion endpoint.
#[async_trait]
pub trait ChatClient: Send + Sync {
    async fn complete(&self, request: &ChatRequest) -> Result<ChatCompletion, LlmError>;
}
