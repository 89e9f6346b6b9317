use async_trait::async_trait;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::constants::{ANTHROPIC_API_URL, ANTHROPIC_API_VERSION, MODEL_REQUEST_TIMEOUT_SECS};
use crate::conversation::{ContentBlock, ConversationTurn, Role, TurnContent};
use crate::logging::{log_debug, log_error, log_info, log_trace};
use crate::provider::{ModelProvider, ModelRequest, ModelResponse, ProviderError, StopReason};
use crate::tools::ToolSpec;

#[derive(Debug, Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    messages: Vec<ApiMessage>,
    #[serde(skip_serializing_if = "no_tools")]
    tools: &'a [ToolSpec],
}

fn no_tools(tools: &&[ToolSpec]) -> bool {
    tools.is_empty()
}

#[derive(Debug, Serialize)]
struct ApiMessage {
    role: &'static str,
    content: ApiContent,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum ApiContent {
    Text(String),
    Blocks(Vec<ApiBlock>),
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ApiBlock {
    Text {
        text: String,
    },
    ToolUse {
        id: String,
        name: String,
        input: serde_json::Value,
    },
    ToolResult {
        tool_use_id: String,
        content: String,
    },
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    #[serde(default)]
    content: Vec<ApiBlock>,
    stop_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorResponse {
    error: ApiErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ApiErrorDetail {
    #[serde(rename = "type")]
    error_type: String,
    message: String,
}

impl From<&ContentBlock> for ApiBlock {
    fn from(block: &ContentBlock) -> Self {
        match block {
            ContentBlock::Text { text } => ApiBlock::Text { text: text.clone() },
            ContentBlock::ToolUse { id, name, input } => ApiBlock::ToolUse {
                id: id.clone(),
                name: name.clone(),
                input: input.clone(),
            },
            ContentBlock::ToolResult {
                tool_use_id,
                content,
            } => ApiBlock::ToolResult {
                tool_use_id: tool_use_id.clone(),
                content: content.clone(),
            },
        }
    }
}

fn to_api_message(turn: &ConversationTurn) -> ApiMessage {
    let role = match turn.role {
        Role::User | Role::ToolResult => "user",
        Role::Assistant => "assistant",
    };
    let content = match &turn.content {
        TurnContent::Text(text) => ApiContent::Text(text.clone()),
        TurnContent::Blocks(blocks) => ApiContent::Blocks(blocks.iter().map(ApiBlock::from).collect()),
    };
    ApiMessage { role, content }
}

fn from_api_response(response: MessagesResponse) -> ModelResponse {
    let content = response
        .content
        .into_iter()
        .filter_map(|block| match block {
            ApiBlock::Text { text } => Some(ContentBlock::Text { text }),
            ApiBlock::ToolUse { id, name, input } => Some(ContentBlock::ToolUse { id, name, input }),
            ApiBlock::ToolResult { .. } | ApiBlock::Unknown => None,
        })
        .collect();
    let stop_reason = response
        .stop_reason
        .as_deref()
        .map(StopReason::parse)
        .unwrap_or(StopReason::EndTurn);
    ModelResponse {
        stop_reason,
        content,
    }
}

/// Maps a non-success status and body to a provider error.
fn map_error_response(status: StatusCode, body: &str) -> ProviderError {
    let detail = serde_json::from_str::<ApiErrorResponse>(body).ok().map(|e| e.error);
    let message = detail
        .as_ref()
        .map(|d| d.message.clone())
        .unwrap_or_else(|| {
            if body.trim().is_empty() {
                status.canonical_reason().unwrap_or("Unknown error").to_string()
            } else {
                body.to_string()
            }
        });

    match (status, detail.as_ref().map(|d| d.error_type.as_str())) {
        (StatusCode::UNAUTHORIZED, _) | (_, Some("authentication_error")) => {
            ProviderError::Authentication(message)
        }
        (StatusCode::TOO_MANY_REQUESTS, _) | (_, Some("rate_limit_error")) => {
            ProviderError::RateLimited
        }
        (StatusCode::BAD_REQUEST, _) | (_, Some("invalid_request_error")) => {
            ProviderError::BadRequest(message)
        }
        _ => ProviderError::Api {
            status: status.as_u16(),
            message,
        },
    }
}

/// Client for the Anthropic Messages API
#[derive(Debug)]
pub struct AnthropicClient {
    client: reqwest::Client,
    api_key: String,
    model: String,
    max_tokens: u32,
    base_url: String,
}

impl AnthropicClient {
    pub fn new(api_key: String, model: String, max_tokens: u32) -> Result<Self, ProviderError> {
        Self::with_base_url(api_key, model, max_tokens, ANTHROPIC_API_URL.to_string())
    }

    pub fn with_base_url(
        api_key: String,
        model: String,
        max_tokens: u32,
        base_url: String,
    ) -> Result<Self, ProviderError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(MODEL_REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|e| ProviderError::Connection(format!("failed to create HTTP client: {e}")))?;

        log_info(&format!(
            "Initializing Anthropic client with model: {model} (max_tokens {max_tokens})"
        ));

        Ok(Self {
            client,
            api_key,
            model,
            max_tokens,
            base_url,
        })
    }

    fn build_body<'a>(&'a self, request: &ModelRequest<'a>) -> MessagesRequest<'a> {
        MessagesRequest {
            model: &self.model,
            max_tokens: self.max_tokens,
            messages: request.turns.iter().map(to_api_message).collect(),
            tools: request.tools,
        }
    }
}

#[async_trait]
impl ModelProvider for AnthropicClient {
    async fn send(&self, request: ModelRequest<'_>) -> Result<ModelResponse, ProviderError> {
        let body = self.build_body(&request);
        log_info(&format!(
            "Sending {} message(s) with {} tool(s) to {}",
            body.messages.len(),
            body.tools.len(),
            self.model
        ));
        log_trace(&format!("Request body: {body:?}"));

        let response = self
            .client
            .post(&self.base_url)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_API_VERSION)
            .header("content-type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                log_error(&format!("Model request failed: {e}"));
                ProviderError::Connection(e.to_string())
            })?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| ProviderError::Connection(e.to_string()))?;

        if !status.is_success() {
            log_error(&format!("Model API returned {status}: {text}"));
            return Err(map_error_response(status, &text));
        }

        log_trace(&format!("Response body: {text}"));
        let parsed: MessagesResponse =
            serde_json::from_str(&text).map_err(|e| ProviderError::Parse(e.to_string()))?;
        let response = from_api_response(parsed);
        log_debug(&format!(
            "Model stopped with {:?} and {} block(s)",
            response.stop_reason,
            response.content.len()
        ));
        Ok(response)
    }

    fn model_name(&self) -> &str {
        &self.model
    }

    fn provider_name(&self) -> &str {
        "Anthropic"
    }
}
