mod anthropic;
mod api_key;
mod app;
mod cli;
mod constants;
mod conversation;
mod logging;
mod orchestrator;
mod output;
mod provider;
mod tools;

use crate::app::run_app;
use crate::cli::Config;
use crate::logging::{init_logging, log_error};

#[tokio::main]
async fn main() {
    init_logging();

    let config = Config::from_args();

    let exit_code = match run_app(config).await {
        Ok(()) => 0,
        Err(e) => {
            log_error(&format!("Fatal: {e:#}"));
            eprintln!("Error: {e:#}");
            eprintln!("Make sure you have a valid API key and internet connection");
            1
        }
    };

    // A stdin read left pending by Ctrl-C would otherwise hold up runtime shutdown.
    std::process::exit(exit_code);
}
