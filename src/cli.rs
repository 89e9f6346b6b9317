use clap::{Arg, ArgMatches, Command, value_parser};

use crate::constants::{DEFAULT_MAX_TOKENS, get_default_model, get_max_rounds};
use crate::tools::search::DEFAULT_SEARCH_ENDPOINT;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub model: String,
    pub max_tokens: u32,
    pub max_rounds: usize,
    pub search_endpoint: String,
}

impl Config {
    pub fn from_args() -> Self {
        let matches = Self::build_cli().get_matches();
        Self::from_matches(&matches)
    }

    fn from_matches(matches: &ArgMatches) -> Self {
        Self {
            model: matches
                .get_one::<String>("model")
                .cloned()
                .unwrap_or_else(get_default_model),
            max_tokens: matches
                .get_one::<u32>("max-tokens")
                .copied()
                .unwrap_or(DEFAULT_MAX_TOKENS),
            max_rounds: matches
                .get_one::<usize>("max-rounds")
                .copied()
                .unwrap_or_else(get_max_rounds),
            search_endpoint: matches
                .get_one::<String>("search-endpoint")
                .cloned()
                .unwrap_or_else(|| DEFAULT_SEARCH_ENDPOINT.to_string()),
        }
    }

    fn build_cli() -> Command {
        Command::new("toolchat")
            .version(env!("TOOLCHAT_VERSION"))
            .about("Interactive chat with Claude that can calculate, tell the time and search the web")
            .after_help(
                "The API key is read from ANTHROPIC_API_KEY, or prompted for on startup.\n\
                 Set RUST_LOG to see logs on stderr, TOOLCHAT_LOG_TO_FILE to keep them in ~/.toolchat/logs.",
            )
            .arg(
                Arg::new("model")
                    .short('m')
                    .long("model")
                    .help("Specify the model to use. Can be set via TOOLCHAT_DEFAULT_MODEL environment variable.")
                    .value_name("MODEL")
                    .action(clap::ArgAction::Set),
            )
            .arg(
                Arg::new("max-tokens")
                    .long("max-tokens")
                    .help("Maximum number of tokens per model response (default 1000)")
                    .value_name("N")
                    .value_parser(value_parser!(u32).range(1..))
                    .action(clap::ArgAction::Set),
            )
            .arg(
                Arg::new("max-rounds")
                    .long("max-rounds")
                    .help("Maximum model calls per message before giving up on tool use (default 5). Can be set via TOOLCHAT_MAX_ROUNDS environment variable.")
                    .value_name("N")
                    .value_parser(value_parser!(usize))
                    .action(clap::ArgAction::Set),
            )
            .arg(
                Arg::new("search-endpoint")
                    .long("search-endpoint")
                    .help("Instant-answer endpoint used by the web_search tool")
                    .value_name("URL")
                    .hide(true)
                    .action(clap::ArgAction::Set),
            )
    }
}
