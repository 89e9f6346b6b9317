/// Tools module for tool-use capabilities
///
/// - Expression sandbox, clock lookup and web search leaves
/// - Fixed tool registry advertised to the model
/// - Dispatcher turning tool calls into result text
pub mod clock;
pub mod executor;
pub mod expression;
mod implementations;
pub mod registry;
pub mod search;

pub use executor::{ToolDispatch, ToolExecutor, ToolInvocation, ToolResult, execute_all};
pub use registry::ToolSpec;
pub use search::SearchClient;
