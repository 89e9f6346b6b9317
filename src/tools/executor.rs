use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;

use crate::logging::{log_debug, log_error, log_info};

use super::implementations::{self, ToolError};
use super::registry::{ToolKind, ToolSpec, all_specs, registered_names};
use super::search::SearchClient;

/// Every failed tool result starts with this marker.
pub const ERROR_MARKER: &str = "Error";

pub fn is_error_result(content: &str) -> bool {
    content.starts_with(ERROR_MARKER)
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum DispatchError {
    #[error("Unknown tool '{name}'. Available tools: {available}")]
    UnknownTool { name: String, available: String },
    #[error("Invalid arguments for {tool}: {reason}")]
    InvalidArguments { tool: &'static str, reason: String },
    #[error(transparent)]
    ToolExecutionFailed(#[from] ToolError),
}

/// A tool call requested by the model, consumed exactly once.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolInvocation {
    pub id: String,
    pub name: String,
    pub arguments: Value,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ToolResult {
    pub tool_use_id: String,
    pub content: String,
}

impl ToolResult {
    pub fn is_error(&self) -> bool {
        is_error_result(&self.content)
    }
}

/// Seam between the orchestration loop and the tools it can call.
#[async_trait]
pub trait ToolDispatch: Send + Sync {
    /// Specs advertised to the model on every request.
    fn specs(&self) -> Vec<ToolSpec>;

    /// Runs one tool. Never fails: errors come back as text with [`ERROR_MARKER`].
    async fn execute(&self, name: &str, arguments: &Value) -> String;
}

/// Runs every invocation of a round concurrently; results keep request order.
pub async fn execute_all<D>(dispatch: &D, invocations: &[ToolInvocation]) -> Vec<ToolResult>
where
    D: ToolDispatch + ?Sized,
{
    log_info(&format!("Executing {} tool call(s)", invocations.len()));

    let futures: Vec<_> = invocations
        .iter()
        .map(|invocation| async move {
            ToolResult {
                tool_use_id: invocation.id.clone(),
                content: dispatch.execute(&invocation.name, &invocation.arguments).await,
            }
        })
        .collect();

    futures::future::join_all(futures).await
}

/// Dispatcher for the built-in tools
pub struct ToolExecutor {
    search: SearchClient,
}

impl ToolExecutor {
    pub fn new(search: SearchClient) -> Self {
        Self { search }
    }

    fn parse_args<T: DeserializeOwned>(kind: ToolKind, arguments: &Value) -> Result<T, DispatchError> {
        serde_json::from_value(arguments.clone()).map_err(|e| DispatchError::InvalidArguments {
            tool: kind.name(),
            reason: e.to_string(),
        })
    }

    pub async fn dispatch(&self, name: &str, arguments: &Value) -> Result<String, DispatchError> {
        let kind = ToolKind::from_name(name).ok_or_else(|| DispatchError::UnknownTool {
            name: name.to_string(),
            available: registered_names().join(", "),
        })?;

        let output = match kind {
            ToolKind::Calculator => implementations::calculate(Self::parse_args(kind, arguments)?)?,
            ToolKind::CurrentTime => {
                implementations::current_time(Self::parse_args(kind, arguments)?)?
            }
            ToolKind::WebSearch => {
                implementations::web_search(&self.search, Self::parse_args(kind, arguments)?).await?
            }
        };
        Ok(output)
    }
}

#[async_trait]
impl ToolDispatch for ToolExecutor {
    fn specs(&self) -> Vec<ToolSpec> {
        all_specs()
    }

    async fn execute(&self, name: &str, arguments: &Value) -> String {
        log_info(&format!("Executing tool: {name}"));
        log_debug(&format!("Tool arguments: {arguments}"));

        match self.dispatch(name, arguments).await {
            Ok(output) => {
                log_info(&format!(
                    "Tool {name} succeeded, output length: {}",
                    output.len()
                ));
                output
            }
            Err(e) => {
                log_error(&format!("Tool {name} failed: {e}"));
                format!("{ERROR_MARKER}: {e}")
            }
        }
    }
}
