use serde::Serialize;
use serde_json::{Value, json};

/// Tool description advertised to the model
///
/// Serializes to the shape the Messages API expects in its `tools` array.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ToolSpec {
    pub name: String,
    pub description: String,
    pub input_schema: Value,
}

/// The fixed set of tools the assistant may call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ToolKind {
    Calculator,
    CurrentTime,
    WebSearch,
}

impl ToolKind {
    /// Registration order. Also the order names are listed in error messages.
    pub const ALL: [ToolKind; 3] = [
        ToolKind::Calculator,
        ToolKind::CurrentTime,
        ToolKind::WebSearch,
    ];

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "calculator_tool" => Some(ToolKind::Calculator),
            "get_current_time" => Some(ToolKind::CurrentTime),
            "web_search" => Some(ToolKind::WebSearch),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            ToolKind::Calculator => "calculator_tool",
            ToolKind::CurrentTime => "get_current_time",
            ToolKind::WebSearch => "web_search",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            ToolKind::Calculator => {
                "Evaluate an arithmetic expression and return the numeric result. \
                 Supports + - * / % ** and parentheses, the functions sqrt, sin, cos, \
                 tan, log, log10, abs, ceil, floor and pow, and the constants pi and e. \
                 Use this for any calculation instead of doing math yourself."
            }
            ToolKind::CurrentTime => {
                "Get the current date and time in a given timezone. \
                 Accepts IANA timezone names such as 'UTC', 'US/Eastern', \
                 'Europe/London' or 'Asia/Tokyo'."
            }
            ToolKind::WebSearch => {
                "Search the web for current information using DuckDuckGo instant answers. \
                 Returns direct answers, summaries, related topics and quick facts."
            }
        }
    }

    fn schema(self) -> Value {
        match self {
            ToolKind::Calculator => json!({
                "type": "object",
                "properties": {
                    "expression": {
                        "type": "string",
                        "description": "The arithmetic expression to evaluate, e.g. '15 * 847 / 100'"
                    }
                },
                "required": ["expression"]
            }),
            ToolKind::CurrentTime => json!({
                "type": "object",
                "properties": {
                    "timezone": {
                        "type": "string",
                        "description": "IANA timezone name (default: 'UTC')"
                    }
                },
                "required": []
            }),
            ToolKind::WebSearch => json!({
                "type": "object",
                "properties": {
                    "query": {
                        "type": "string",
                        "description": "The search query"
                    },
                    "num_results": {
                        "type": "integer",
                        "description": "Number of related results to include, 1 to 5 (default: 3)"
                    }
                },
                "required": ["query"]
            }),
        }
    }

    pub fn spec(self) -> ToolSpec {
        ToolSpec {
            name: self.name().to_string(),
            description: self.description().to_string(),
            input_schema: self.schema(),
        }
    }
}

/// Specs for every registered tool, in registration order.
pub fn all_specs() -> Vec<ToolSpec> {
    ToolKind::ALL.iter().map(|kind| kind.spec()).collect()
}

pub fn registered_names() -> Vec<&'static str> {
    ToolKind::ALL.iter().map(|kind| kind.name()).collect()
}
