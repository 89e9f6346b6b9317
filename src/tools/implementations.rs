/// Tool implementations
///
/// Each tool parses its own argument struct, calls into the leaf module that
/// does the work and returns the text handed back to the model.
use serde::Deserialize;
use thiserror::Error;

use super::clock::{self, ClockError, DEFAULT_TIMEZONE};
use super::expression::{self, ExpressionError};
use super::search::{DEFAULT_MAX_RESULTS, SearchClient, SearchError};

/// Failure raised by a tool after its arguments were accepted.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ToolError {
    #[error(transparent)]
    Expression(#[from] ExpressionError),
    #[error(transparent)]
    Clock(#[from] ClockError),
    #[error(transparent)]
    Search(#[from] SearchError),
}

// ============================================================================
// calculator_tool
// ============================================================================

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CalculatorArgs {
    pub expression: String,
}

pub fn calculate(args: CalculatorArgs) -> Result<String, ToolError> {
    let value = expression::evaluate(&args.expression)?;
    Ok(format!("Result: {value}"))
}

// ============================================================================
// get_current_time
// ============================================================================

fn default_timezone() -> String {
    DEFAULT_TIMEZONE.to_string()
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CurrentTimeArgs {
    #[serde(default = "default_timezone")]
    pub timezone: String,
}

pub fn current_time(args: CurrentTimeArgs) -> Result<String, ToolError> {
    Ok(clock::current_time(&args.timezone)?)
}

// ============================================================================
// web_search
// ============================================================================

fn default_num_results() -> i64 {
    DEFAULT_MAX_RESULTS
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct WebSearchArgs {
    pub query: String,
    #[serde(default = "default_num_results")]
    pub num_results: i64,
}

pub async fn web_search(client: &SearchClient, args: WebSearchArgs) -> Result<String, ToolError> {
    Ok(client.search(&args.query, args.num_results).await?)
}
