/// API key validation constants
pub const API_KEY_PREFIX: &str = "sk-ant-";
pub const API_KEY_ENV_VAR: &str = "ANTHROPIC_API_KEY";

/// Anthropic Messages API
pub const ANTHROPIC_API_URL: &str = "https://api.anthropic.com/v1/messages";
pub const ANTHROPIC_API_VERSION: &str = "2023-06-01";
pub const MODEL_REQUEST_TIMEOUT_SECS: u64 = 60;

/// Default model constants
pub const DEFAULT_MODEL: &str = "claude-3-5-sonnet-20241022";
pub const DEFAULT_MAX_TOKENS: u32 = 1000;

/// Get default model from environment variable or default
pub fn get_default_model() -> String {
    std::env::var("TOOLCHAT_DEFAULT_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string())
}

/// Upper bound on model calls per user turn
pub const DEFAULT_MAX_ROUNDS: usize = 5;

/// Get max rounds from environment variable or default
pub fn get_max_rounds() -> usize {
    std::env::var("TOOLCHAT_MAX_ROUNDS")
        .ok()
        .and_then(|s| s.parse().ok())
        .filter(|&rounds| rounds > 0)
        .unwrap_or(DEFAULT_MAX_ROUNDS)
}

/// URLs for user guidance
pub const ANTHROPIC_CONSOLE_URL: &str = "https://console.anthropic.com/";

/// Words that end the session (compared case-insensitively)
pub const QUIT_COMMANDS: &[&str] = &["quit", "exit", "bye", "q"];
