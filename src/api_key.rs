use anyhow::{Context, Result, bail};
use std::env;
use std::io::{self, BufRead, Write};

use crate::constants::{ANTHROPIC_CONSOLE_URL, API_KEY_ENV_VAR, API_KEY_PREFIX};
use crate::logging::{log_error, log_info, log_warn};

/// Read the key from ANTHROPIC_API_KEY, or prompt for it on stderr.
pub fn get_api_key() -> Result<String> {
    let env_value = env::var(API_KEY_ENV_VAR).ok();
    let stdin = io::stdin();
    let mut input = stdin.lock();
    resolve_api_key(env_value, &mut input, &mut io::stderr())
}

pub fn resolve_api_key<R: BufRead, W: Write>(
    env_value: Option<String>,
    input: &mut R,
    out: &mut W,
) -> Result<String> {
    if let Some(key) = env_value
        .map(|k| k.trim().to_string())
        .filter(|k| !k.is_empty())
    {
        log_info("Found ANTHROPIC_API_KEY environment variable");
        if !validate_api_key_format(&key) {
            writeln!(out, "⚠️  Warning: API key should start with '{API_KEY_PREFIX}'")?;
        }
        return Ok(key);
    }

    log_warn("ANTHROPIC_API_KEY environment variable not found or empty");
    writeln!(out)?;
    writeln!(out, "{}", "=".repeat(50))?;
    writeln!(out, "API Key Setup")?;
    writeln!(out, "{}", "=".repeat(50))?;
    writeln!(out, "No {API_KEY_ENV_VAR} environment variable found.")?;
    writeln!(out, "Please enter your Anthropic API key.")?;
    writeln!(out, "(Get one from: {ANTHROPIC_CONSOLE_URL})")?;
    writeln!(out, "{}", "-".repeat(50))?;

    let key = prompt(input, out, "Enter your API key: ")?;
    if key.is_empty() {
        log_error("No API key entered");
        bail!("API key is required to run the bot (set {API_KEY_ENV_VAR} or enter it when prompted)");
    }

    if !validate_api_key_format(&key) {
        writeln!(out, "Warning: API key should start with '{API_KEY_PREFIX}'")?;
        let confirm = prompt(input, out, "Continue anyway? (y/n): ")?;
        if !confirm.eq_ignore_ascii_case("y") {
            log_error("User rejected API key with unexpected format");
            bail!("Invalid API key format");
        }
    }

    writeln!(out, "API key configured successfully!")?;
    Ok(key)
}

/// Prompt and read one trimmed line; EOF reads as empty.
fn prompt<R: BufRead, W: Write>(input: &mut R, out: &mut W, message: &str) -> Result<String> {
    write!(out, "{message}")?;
    out.flush()?;
    let mut line = String::new();
    input
        .read_line(&mut line)
        .context("Failed to read from stdin")?;
    Ok(line.trim().to_string())
}

pub fn validate_api_key_format(api_key: &str) -> bool {
    if !api_key.starts_with(API_KEY_PREFIX) {
        log_warn(&format!(
            "API key does not start with '{API_KEY_PREFIX}' (expected for Anthropic API keys)"
        ));
        return false;
    }

    if !api_key
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        log_warn("API key contains invalid characters");
        return false;
    }

    log_info("API key format validation passed");
    true
}
