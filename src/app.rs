use anyhow::{Context, Result};
use std::io::Write;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use uuid::Uuid;

use crate::anthropic::AnthropicClient;
use crate::api_key::get_api_key;
use crate::cli::Config;
use crate::constants::QUIT_COMMANDS;
use crate::logging::{close_session_file_logging, log_info, setup_session_file_logging};
use crate::orchestrator::Orchestrator;
use crate::output::{SessionEnd, write_banner, write_goodbye, write_help, write_stats};
use crate::tools::{SearchClient, ToolExecutor};

/// One line of console input, classified
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConsoleCommand {
    Quit,
    Stats,
    Help,
    Empty,
    Message(String),
}

impl ConsoleCommand {
    pub fn parse(line: &str) -> Self {
        let trimmed = line.trim();
        let lowered = trimmed.to_lowercase();
        if trimmed.is_empty() {
            ConsoleCommand::Empty
        } else if QUIT_COMMANDS.contains(&lowered.as_str()) {
            ConsoleCommand::Quit
        } else if lowered == "stats" {
            ConsoleCommand::Stats
        } else if lowered == "help" {
            ConsoleCommand::Help
        } else {
            ConsoleCommand::Message(trimmed.to_string())
        }
    }
}

pub async fn run_app(config: Config) -> Result<()> {
    let session_id = Uuid::new_v4().to_string();
    setup_session_file_logging(&session_id).context("Failed to setup session file logging")?;
    log_info(&format!("Starting session {session_id} with config: {config:?}"));

    let api_key = get_api_key().context("Failed to get API key")?;

    let provider = AnthropicClient::new(api_key, config.model.clone(), config.max_tokens)
        .context("Failed to initialize model provider")?;
    let search =
        SearchClient::new(config.search_endpoint.clone()).context("Failed to initialize web search")?;
    let mut orchestrator = Orchestrator::new(
        Box::new(provider),
        Box::new(ToolExecutor::new(search)),
        config.max_rounds,
    );

    let mut stdout = std::io::stdout();
    write_banner(&mut stdout, orchestrator.model_name(), orchestrator.tool_specs())?;

    let stdin = BufReader::new(tokio::io::stdin());
    let end = chat_loop(&mut orchestrator, stdin, &mut stdout).await?;

    log_info(&format!("Session ended: {end:?}"));
    if !orchestrator.conversation().is_empty() {
        log_info(&orchestrator.conversation().stats_line());
    }
    write_goodbye(&mut stdout, end, orchestrator.conversation())?;
    close_session_file_logging();
    Ok(())
}

/// Read lines until a quit word, end of input or Ctrl-C.
pub async fn chat_loop<R, W>(orchestrator: &mut Orchestrator, input: R, out: &mut W) -> Result<SessionEnd>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    let mut lines = input.lines();

    loop {
        write!(out, "You: ")?;
        out.flush()?;

        let line = tokio::select! {
            line = lines.next_line() => line.context("Failed to read from stdin")?,
            Ok(()) = tokio::signal::ctrl_c() => {
                writeln!(out)?;
                return Ok(SessionEnd::Interrupted);
            }
        };

        let Some(line) = line else {
            writeln!(out)?;
            return Ok(SessionEnd::EndOfInput);
        };

        match ConsoleCommand::parse(&line) {
            ConsoleCommand::Quit => return Ok(SessionEnd::QuitCommand),
            ConsoleCommand::Empty => {
                writeln!(out, "Please enter a message to continue.")?;
            }
            ConsoleCommand::Help => write_help(out, orchestrator.tool_specs())?,
            ConsoleCommand::Stats => {
                write_stats(out, &orchestrator.stats(), orchestrator.conversation())?
            }
            ConsoleCommand::Message(text) => {
                writeln!(out, "Thinking...")?;
                out.flush()?;
                let response = orchestrator.respond(&text).await;
                writeln!(out, "Bot: {response}")?;
                writeln!(out)?;
            }
        }
    }
}
