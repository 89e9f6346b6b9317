use anyhow::{Context, Result};
use std::io::Write;
use tabwriter::TabWriter;

use crate::constants::QUIT_COMMANDS;
use crate::conversation::Conversation;
use crate::orchestrator::SessionStats;
use crate::tools::ToolSpec;

/// How the chat loop ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEnd {
    QuitCommand,
    EndOfInput,
    Interrupted,
}

pub fn write_banner<W: Write>(out: &mut W, model: &str, specs: &[ToolSpec]) -> Result<()> {
    let names: Vec<&str> = specs.iter().map(|spec| spec.name.as_str()).collect();
    writeln!(out, "Tool Calling Chat Bot ({model})")?;
    writeln!(out, "{}", "=".repeat(60))?;
    writeln!(out, "Available tools: {}", names.join(", "))?;
    writeln!(
        out,
        "Type 'help' for commands, '{}' to end.",
        QUIT_COMMANDS.join("', '")
    )?;
    writeln!(out, "{}", "- ".repeat(30))?;
    writeln!(out, "Chat started! Say hello to begin.")?;
    writeln!(out)?;
    out.flush().context("Failed to flush banner")
}

pub fn write_help<W: Write>(out: &mut W, specs: &[ToolSpec]) -> Result<()> {
    writeln!(out, "Commands:")?;
    writeln!(out, "  help                 Show this help")?;
    writeln!(out, "  stats                Show conversation and tool statistics")?;
    writeln!(out, "  {:<20} End the session", QUIT_COMMANDS.join(" | "))?;
    writeln!(out)?;
    writeln!(out, "Tools the assistant can use:")?;
    for spec in specs {
        writeln!(out, "  {}: {}", spec.name, spec.description)?;
    }
    writeln!(out)?;
    out.flush().context("Failed to flush help")
}

pub fn write_stats<W: Write>(
    out: &mut W,
    stats: &SessionStats,
    conversation: &Conversation,
) -> Result<()> {
    let mut tw = TabWriter::new(&mut *out);
    writeln!(tw, "user messages\t{}", conversation.user_message_count())?;
    writeln!(tw, "bot responses\t{}", conversation.assistant_message_count())?;
    writeln!(tw, "tool calls issued\t{}", stats.tool_calls_issued)?;
    writeln!(tw, "tool calls succeeded\t{}", stats.tool_calls_succeeded)?;
    writeln!(tw, "model rounds\t{}", stats.rounds)?;
    tw.flush().context("Failed to flush table output")?;
    drop(tw);

    writeln!(out)?;
    out.flush().context("Failed to flush stats")
}

pub fn write_goodbye<W: Write>(out: &mut W, end: SessionEnd, conversation: &Conversation) -> Result<()> {
    let farewell = match end {
        SessionEnd::QuitCommand | SessionEnd::EndOfInput => "Thanks for chatting! Goodbye!",
        SessionEnd::Interrupted => "Chat interrupted. Goodbye!",
    };
    writeln!(out)?;
    writeln!(out, "{farewell}")?;
    writeln!(out, "{}", conversation.stats_line())?;
    out.flush().context("Failed to flush goodbye")
}
