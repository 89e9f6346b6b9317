use async_trait::async_trait;
use std::fmt::Debug;
use thiserror::Error;

use crate::conversation::{ContentBlock, ConversationTurn};
use crate::tools::ToolSpec;

/// Why the model stopped generating
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StopReason {
    EndTurn,
    ToolUse,
    MaxTokens,
    StopSequence,
    Other(String),
}

impl StopReason {
    pub fn parse(reason: &str) -> Self {
        match reason {
            "end_turn" => StopReason::EndTurn,
            "tool_use" => StopReason::ToolUse,
            "max_tokens" => StopReason::MaxTokens,
            "stop_sequence" => StopReason::StopSequence,
            other => StopReason::Other(other.to_string()),
        }
    }
}

/// One model call: the full history plus the advertised tools.
#[derive(Debug, Clone, Copy)]
pub struct ModelRequest<'a> {
    pub turns: &'a [ConversationTurn],
    pub tools: &'a [ToolSpec],
}

#[derive(Debug, Clone, PartialEq)]
pub struct ModelResponse {
    pub stop_reason: StopReason,
    pub content: Vec<ContentBlock>,
}

/// Provider failures; `Display` is the message shown to the user.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProviderError {
    #[error("Authentication failed. Please check your API key is correct.")]
    Authentication(String),
    #[error("Rate limit exceeded. Please wait a moment and try again.")]
    RateLimited,
    #[error("Connection failed. Please check your internet connection.")]
    Connection(String),
    #[error("Invalid request: {0}")]
    BadRequest(String),
    #[error("Unexpected error occurred: API returned {status}: {message}")]
    Api { status: u16, message: String },
    #[error("Unexpected error occurred: could not read the model response: {0}")]
    Parse(String),
}

/// Generic model provider trait, the seam the orchestrator talks through
#[async_trait]
pub trait ModelProvider: Debug + Send + Sync {
    async fn send(&self, request: ModelRequest<'_>) -> Result<ModelResponse, ProviderError>;

    fn model_name(&self) -> &str;

    fn provider_name(&self) -> &str;
}
