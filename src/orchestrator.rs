use thiserror::Error;

use crate::conversation::{Conversation, ConversationTurn, Role};
use crate::logging::{log_debug, log_error, log_info, log_warn};
use crate::provider::{ModelProvider, ModelRequest, ProviderError, StopReason};
use crate::tools::{ToolDispatch, ToolSpec, execute_all};

pub const NO_RESPONSE_TEXT: &str = "(no response text)";

/// Counters for the whole session, owned by the orchestrator
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionStats {
    pub tool_calls_issued: usize,
    pub tool_calls_succeeded: usize,
    /// Model calls made.
    pub rounds: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OrchestratorError {
    #[error(transparent)]
    Provider(#[from] ProviderError),
    #[error("Stopped after {0} model rounds: the assistant kept requesting tools without giving an answer.")]
    TooManyRounds(usize),
}

/// Drives one user turn through as many tool rounds as the model asks for
pub struct Orchestrator {
    provider: Box<dyn ModelProvider>,
    tools: Box<dyn ToolDispatch>,
    specs: Vec<ToolSpec>,
    conversation: Conversation,
    stats: SessionStats,
    max_rounds: usize,
}

impl Orchestrator {
    pub fn new(
        provider: Box<dyn ModelProvider>,
        tools: Box<dyn ToolDispatch>,
        max_rounds: usize,
    ) -> Self {
        let specs = tools.specs();
        log_info(&format!(
            "Orchestrator ready: {} via {}, {} tool(s), max {} round(s)",
            provider.model_name(),
            provider.provider_name(),
            specs.len(),
            max_rounds
        ));
        Self {
            provider,
            tools,
            specs,
            conversation: Conversation::new(),
            stats: SessionStats::default(),
            max_rounds: max_rounds.max(1),
        }
    }

    pub fn stats(&self) -> SessionStats {
        self.stats
    }

    pub fn conversation(&self) -> &Conversation {
        &self.conversation
    }

    pub fn tool_specs(&self) -> &[ToolSpec] {
        &self.specs
    }

    pub fn model_name(&self) -> &str {
        self.provider.model_name()
    }

    /// Handle one user message and return the text to show.
    ///
    /// Never fails: provider problems and the round cap come back as a
    /// readable message, and the history is left ready for the next turn.
    pub async fn respond(&mut self, user_text: &str) -> String {
        self.conversation.append(ConversationTurn::user(user_text));

        let mut tools_used: Vec<String> = Vec::new();
        match self.run_rounds(&mut tools_used).await {
            Ok(text) => {
                let mut response = if text.trim().is_empty() {
                    NO_RESPONSE_TEXT.to_string()
                } else {
                    text
                };
                if !tools_used.is_empty() {
                    response.push_str(&format!("\n\n[Tools used: {}]", tools_used.join(", ")));
                }
                response
            }
            Err(e) => {
                log_error(&format!("Turn failed: {e}"));
                let message = e.to_string();
                self.close_dangling_turn(&message);
                message
            }
        }
    }

    async fn run_rounds(&mut self, tools_used: &mut Vec<String>) -> Result<String, OrchestratorError> {
        for round in 1..=self.max_rounds {
            self.stats.rounds += 1;
            log_debug(&format!(
                "Round {round}: sending {} turn(s)",
                self.conversation.len()
            ));

            let response = self
                .provider
                .send(ModelRequest {
                    turns: self.conversation.turns(),
                    tools: &self.specs,
                })
                .await?;

            let turn = if response.content.is_empty() {
                ConversationTurn::assistant_text(NO_RESPONSE_TEXT)
            } else {
                ConversationTurn::assistant_blocks(response.content)
            };
            let invocations = turn.tool_invocations();

            if response.stop_reason != StopReason::ToolUse || invocations.is_empty() {
                if response.stop_reason == StopReason::ToolUse {
                    log_warn("Model stopped for tool use without requesting any tool");
                } else if !invocations.is_empty() {
                    log_warn(&format!(
                        "Dropping {} tool request(s) cut off by stop reason {:?}",
                        invocations.len(),
                        response.stop_reason
                    ));
                }
                // Only text is kept: a tool_use block must always be followed by its results.
                let text = turn.text();
                let kept = if text.trim().is_empty() { NO_RESPONSE_TEXT } else { text.as_str() };
                self.conversation.append(ConversationTurn::assistant_text(kept));
                return Ok(text);
            }

            self.conversation.append(turn);
            for invocation in &invocations {
                if !tools_used.contains(&invocation.name) {
                    tools_used.push(invocation.name.clone());
                }
            }

            let results = execute_all(self.tools.as_ref(), &invocations).await;
            let succeeded = results.iter().filter(|r| !r.is_error()).count();
            self.stats.tool_calls_issued += results.len();
            self.stats.tool_calls_succeeded += succeeded;
            log_info(&format!(
                "Round {round}: {succeeded}/{} tool call(s) succeeded",
                results.len()
            ));

            self.conversation.append(ConversationTurn::tool_results(&results));
        }

        Err(OrchestratorError::TooManyRounds(self.max_rounds))
    }

    /// Leave the history ending on an assistant turn so roles keep alternating.
    fn close_dangling_turn(&mut self, message: &str) {
        let needs_answer = self
            .conversation
            .last()
            .is_some_and(|turn| matches!(turn.role, Role::User | Role::ToolResult));
        if needs_answer {
            self.conversation
                .append(ConversationTurn::assistant_text(format!("[Error: {message}]")));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conversation::{ContentBlock, TurnContent};
    use crate::provider::ModelResponse;
    use crate::tools::{SearchClient, ToolExecutor, registry::all_specs};
    use async_trait::async_trait;
    use serde_json::{Value, json};
    use std::collections::VecDeque;
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    /// Plays back canned responses and records how many turns each call saw.
    #[derive(Debug, Default)]
    struct ScriptedProvider {
        script: Mutex<VecDeque<Result<ModelResponse, ProviderError>>>,
        seen: Arc<Mutex<Vec<Vec<ConversationTurn>>>>,
    }

    impl ScriptedProvider {
        fn new(script: Vec<Result<ModelResponse, ProviderError>>) -> Self {
            Self {
                script: Mutex::new(script.into()),
                seen: Arc::default(),
            }
        }
    }

    #[async_trait]
    impl ModelProvider for ScriptedProvider {
        async fn send(&self, request: ModelRequest<'_>) -> Result<ModelResponse, ProviderError> {
            self.seen.lock().unwrap().push(request.turns.to_vec());
            self.script.lock().unwrap().pop_front().unwrap_or_else(|| {
                Err(ProviderError::Api {
                    status: 500,
                    message: "script exhausted".to_string(),
                })
            })
        }

        fn model_name(&self) -> &str {
            "scripted"
        }

        fn provider_name(&self) -> &str {
            "Scripted"
        }
    }

    fn text(reply: &str) -> Result<ModelResponse, ProviderError> {
        Ok(ModelResponse {
            stop_reason: StopReason::EndTurn,
            content: vec![ContentBlock::Text {
                text: reply.to_string(),
            }],
        })
    }

    fn tool_use(calls: &[(&str, &str, Value)]) -> Result<ModelResponse, ProviderError> {
        Ok(ModelResponse {
            stop_reason: StopReason::ToolUse,
            content: calls
                .iter()
                .map(|(id, name, input)| ContentBlock::ToolUse {
                    id: id.to_string(),
                    name: name.to_string(),
                    input: input.clone(),
                })
                .collect(),
        })
    }

    fn real_tools() -> Box<dyn ToolDispatch> {
        Box::new(ToolExecutor::new(
            SearchClient::new("http://127.0.0.1:1/").unwrap(),
        ))
    }

    fn tool_result_blocks(turn: &ConversationTurn) -> Vec<(String, String)> {
        match &turn.content {
            TurnContent::Blocks(blocks) => blocks
                .iter()
                .filter_map(|b| match b {
                    ContentBlock::ToolResult {
                        tool_use_id,
                        content,
                    } => Some((tool_use_id.clone(), content.clone())),
                    _ => None,
                })
                .collect(),
            TurnContent::Text(_) => Vec::new(),
        }
    }

    #[tokio::test]
    async fn test_percentage_question_end_to_end() {
        let provider = ScriptedProvider::new(vec![
            tool_use(&[(
                "toolu_01",
                "calculator_tool",
                json!({"expression": "15 * 847 / 100"}),
            )]),
            text("15% of 847 is 127.05."),
        ]);
        let seen = provider.seen.clone();
        let mut orchestrator = Orchestrator::new(Box::new(provider), real_tools(), 5);

        let response = orchestrator.respond("What's 15% of 847?").await;

        assert_eq!(response, "15% of 847 is 127.05.\n\n[Tools used: calculator_tool]");
        assert_eq!(
            orchestrator.stats(),
            SessionStats {
                tool_calls_issued: 1,
                tool_calls_succeeded: 1,
                rounds: 2,
            }
        );

        let turns = orchestrator.conversation().turns();
        assert_eq!(turns.len(), 4);
        assert_eq!(turns[2].role, Role::ToolResult);
        assert_eq!(
            tool_result_blocks(&turns[2]),
            vec![("toolu_01".to_string(), "Result: 127.05".to_string())]
        );

        // The follow-up call replays the whole history including the results.
        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 2);
        assert_eq!(seen[0].len(), 1);
        assert_eq!(seen[1].len(), 3);
    }

    #[tokio::test]
    async fn test_plain_answer_has_no_summary() {
        let provider = ScriptedProvider::new(vec![text("Hello! How can I help?")]);
        let mut orchestrator = Orchestrator::new(Box::new(provider), real_tools(), 5);

        let response = orchestrator.respond("hi").await;
        assert_eq!(response, "Hello! How can I help?");
        assert_eq!(orchestrator.stats().tool_calls_issued, 0);
        assert_eq!(orchestrator.stats().rounds, 1);
    }

    #[tokio::test]
    async fn test_failed_tool_is_isolated_and_not_counted() {
        let provider = ScriptedProvider::new(vec![
            tool_use(&[
                ("a", "calculator_tool", json!({"expression": "10 / 0"})),
                ("b", "get_current_time", json!({"timezone": "UTC"})),
                ("c", "calculator_tool", json!({"expression": "sqrt(16)"})),
            ]),
            text("Done."),
        ]);
        let mut orchestrator = Orchestrator::new(Box::new(provider), real_tools(), 5);

        let response = orchestrator.respond("do three things").await;

        assert!(response.ends_with("[Tools used: calculator_tool, get_current_time]"));
        assert_eq!(orchestrator.stats().tool_calls_issued, 3);
        assert_eq!(orchestrator.stats().tool_calls_succeeded, 2);

        let results = tool_result_blocks(&orchestrator.conversation().turns()[2]);
        let ids: Vec<&str> = results.iter().map(|(id, _)| id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b", "c"]);
        assert_eq!(results[0].1, "Error: Division by zero is not allowed");
        assert_eq!(results[2].1, "Result: 4");
    }

    struct SlowTools;

    #[async_trait]
    impl ToolDispatch for SlowTools {
        fn specs(&self) -> Vec<ToolSpec> {
            all_specs()
        }

        async fn execute(&self, _name: &str, arguments: &Value) -> String {
            let delay = arguments["delay_ms"].as_u64().unwrap_or(0);
            tokio::time::sleep(Duration::from_millis(delay)).await;
            format!("slept {delay}")
        }
    }

    #[tokio::test]
    async fn test_results_follow_request_order_not_completion_order() {
        let provider = ScriptedProvider::new(vec![
            tool_use(&[
                ("slow", "web_search", json!({"delay_ms": 200})),
                ("fast", "calculator_tool", json!({"delay_ms": 0})),
                ("mid", "get_current_time", json!({"delay_ms": 50})),
            ]),
            text("ok"),
        ]);
        let mut orchestrator = Orchestrator::new(Box::new(provider), Box::new(SlowTools), 5);

        orchestrator.respond("go").await;

        let results = tool_result_blocks(&orchestrator.conversation().turns()[2]);
        assert_eq!(
            results,
            vec![
                ("slow".to_string(), "slept 200".to_string()),
                ("fast".to_string(), "slept 0".to_string()),
                ("mid".to_string(), "slept 50".to_string()),
            ]
        );
    }

    #[tokio::test]
    async fn test_provider_error_becomes_message_and_history_stays_valid() {
        let provider = ScriptedProvider::new(vec![
            Err(ProviderError::Authentication("invalid x-api-key".to_string())),
            text("Second try worked."),
        ]);
        let mut orchestrator = Orchestrator::new(Box::new(provider), real_tools(), 5);

        let response = orchestrator.respond("hello").await;
        assert_eq!(
            response,
            "Authentication failed. Please check your API key is correct."
        );

        let roles: Vec<Role> = orchestrator.conversation().turns().iter().map(|t| t.role).collect();
        assert_eq!(roles, vec![Role::User, Role::Assistant]);

        let response = orchestrator.respond("hello again").await;
        assert_eq!(response, "Second try worked.");
        assert_eq!(orchestrator.conversation().user_message_count(), 2);
    }

    #[tokio::test]
    async fn test_error_after_tool_round_closes_turn() {
        let provider = ScriptedProvider::new(vec![
            tool_use(&[("a", "calculator_tool", json!({"expression": "1 + 1"}))]),
            Err(ProviderError::Connection("reset".to_string())),
        ]);
        let mut orchestrator = Orchestrator::new(Box::new(provider), real_tools(), 5);

        let response = orchestrator.respond("add").await;
        assert_eq!(response, "Connection failed. Please check your internet connection.");

        let roles: Vec<Role> = orchestrator.conversation().turns().iter().map(|t| t.role).collect();
        assert_eq!(
            roles,
            vec![Role::User, Role::Assistant, Role::ToolResult, Role::Assistant]
        );
        assert_eq!(orchestrator.stats().tool_calls_succeeded, 1);
    }

    #[tokio::test]
    async fn test_round_cap() {
        let endless: Vec<_> = (0..10)
            .map(|i| {
                let id = format!("toolu_{i}");
                tool_use(&[(id.as_str(), "calculator_tool", json!({"expression": "1"}))])
            })
            .collect();
        let provider = ScriptedProvider::new(endless);
        let mut orchestrator = Orchestrator::new(Box::new(provider), real_tools(), 2);

        let response = orchestrator.respond("loop forever").await;

        assert_eq!(response, OrchestratorError::TooManyRounds(2).to_string());
        assert_eq!(orchestrator.stats().rounds, 2);
        assert_eq!(orchestrator.stats().tool_calls_issued, 2);
        assert_eq!(
            orchestrator.conversation().last().map(|t| t.role),
            Some(Role::Assistant)
        );
    }

    #[tokio::test]
    async fn test_empty_final_text_gets_placeholder() {
        let provider = ScriptedProvider::new(vec![Ok(ModelResponse {
            stop_reason: StopReason::EndTurn,
            content: Vec::new(),
        })]);
        let mut orchestrator = Orchestrator::new(Box::new(provider), real_tools(), 5);

        assert_eq!(orchestrator.respond("...").await, NO_RESPONSE_TEXT);
        assert_eq!(orchestrator.conversation().assistant_message_count(), 1);
    }

    #[tokio::test]
    async fn test_truncated_tool_request_is_not_left_in_history() {
        let provider = ScriptedProvider::new(vec![
            Ok(ModelResponse {
                stop_reason: StopReason::MaxTokens,
                content: vec![
                    ContentBlock::Text {
                        text: "Let me compute.".to_string(),
                    },
                    ContentBlock::ToolUse {
                        id: "toolu_x".to_string(),
                        name: "calculator_tool".to_string(),
                        input: json!({"expression": "2 + 2"}),
                    },
                ],
            }),
            text("Second answer."),
        ]);
        let seen = provider.seen.clone();
        let mut orchestrator = Orchestrator::new(Box::new(provider), real_tools(), 5);

        assert_eq!(orchestrator.respond("first").await, "Let me compute.");
        assert_eq!(orchestrator.respond("second").await, "Second answer.");
        assert_eq!(orchestrator.stats().tool_calls_issued, 0);

        let seen = seen.lock().unwrap();
        let replayed = &seen[1];
        assert_eq!(replayed.len(), 3);
        assert_eq!(replayed[1].role, Role::Assistant);
        assert!(replayed[1].tool_invocations().is_empty());
        assert_eq!(replayed[1].text(), "Let me compute.");
    }

    #[tokio::test]
    async fn test_truncated_tool_request_without_text_gets_placeholder() {
        let provider = ScriptedProvider::new(vec![Ok(ModelResponse {
            stop_reason: StopReason::MaxTokens,
            content: vec![ContentBlock::ToolUse {
                id: "toolu_y".to_string(),
                name: "web_search".to_string(),
                input: json!({"query": "rust"}),
            }],
        })]);
        let mut orchestrator = Orchestrator::new(Box::new(provider), real_tools(), 5);

        assert_eq!(orchestrator.respond("search").await, NO_RESPONSE_TEXT);
        let last = orchestrator.conversation().last().unwrap();
        assert!(last.tool_invocations().is_empty());
        assert_eq!(last.text(), NO_RESPONSE_TEXT);
    }

    #[tokio::test]
    async fn test_specs_advertised_on_every_call() {
        let provider = ScriptedProvider::new(vec![text("ok")]);
        let orchestrator = Orchestrator::new(Box::new(provider), real_tools(), 5);
        let names: Vec<&str> = orchestrator.tool_specs().iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["calculator_tool", "get_current_time", "web_search"]);
    }
}
