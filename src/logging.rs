use std::env;
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::{debug, error, info, trace, warn};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

const LOG_TARGET: &str = "toolchat";
const LOG_TO_FILE_ENV_VAR: &str = "TOOLCHAT_LOG_TO_FILE";

/// Open per-session log file, tagged with the session it belongs to
struct SessionLog {
    file: File,
    tag: String,
}

static SESSION_LOG: Mutex<Option<SessionLog>> = Mutex::new(None);

/// Initialize logging system
/// - Console logging is ONLY enabled when RUST_LOG is set
/// - File logging is enabled when TOOLCHAT_LOG_TO_FILE is set (see `setup_session_file_logging`)
pub fn init_logging() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(env_filter);

    if env::var("RUST_LOG").is_ok() {
        registry
            .with(
                fmt::layer()
                    .with_target(true)
                    .with_line_number(true)
                    .with_writer(std::io::stderr),
            )
            .init();
    } else {
        registry.init();
    }
}

/// Open `~/.toolchat/logs/<session_id>.log` when TOOLCHAT_LOG_TO_FILE is set.
/// Returns the path of the log file, if one was opened.
pub fn setup_session_file_logging(session_id: &str) -> anyhow::Result<Option<PathBuf>> {
    if env::var(LOG_TO_FILE_ENV_VAR).is_err() {
        return Ok(None);
    }
    let home_dir =
        dirs::home_dir().ok_or_else(|| anyhow::anyhow!("Could not find home directory"))?;
    let path = open_session_log(&home_dir.join(".toolchat").join("logs"), session_id)?;
    Ok(Some(path))
}

fn open_session_log(logs_dir: &Path, session_id: &str) -> anyhow::Result<PathBuf> {
    std::fs::create_dir_all(logs_dir)?;

    let path = logs_dir.join(format!("{session_id}.log"));
    let file = OpenOptions::new().create(true).append(true).open(&path)?;

    let log = SessionLog {
        file,
        tag: session_tag(session_id),
    };
    match SESSION_LOG.lock() {
        Ok(mut guard) => *guard = Some(log),
        Err(_) => anyhow::bail!("session log lock poisoned"),
    }

    log_info(&format!("File logging enabled: {}", path.display()));
    Ok(path)
}

/// Write a closing line and release the session log file.
pub fn close_session_file_logging() {
    log_debug("Closing session log");
    if let Ok(mut guard) = SESSION_LOG.lock() {
        guard.take();
    }
}

/// First group of a uuid, enough to tell interleaved sessions apart.
fn session_tag(session_id: &str) -> String {
    session_id
        .split('-')
        .next()
        .filter(|s| !s.is_empty())
        .unwrap_or(session_id)
        .to_string()
}

fn format_line(timestamp: &str, level: &str, tag: &str, msg: &str) -> String {
    format!("[{timestamp}] [{level}] [{LOG_TARGET}:{tag}] {msg}")
}

fn write_to_file(level: &str, msg: &str) {
    if let Ok(mut guard) = SESSION_LOG.lock()
        && let Some(log) = guard.as_mut()
    {
        let timestamp = chrono::Utc::now().format("%Y-%m-%d %H:%M:%S%.3f").to_string();
        let _ = writeln!(log.file, "{}", format_line(&timestamp, level, &log.tag, msg));
        let _ = log.file.flush();
    }
}

pub fn log_error(msg: &str) {
    error!("{msg}");
    write_to_file("ERROR", msg);
}

pub fn log_warn(msg: &str) {
    warn!("{msg}");
    write_to_file("WARN", msg);
}

pub fn log_info(msg: &str) {
    info!("{msg}");
    write_to_file("INFO", msg);
}

pub fn log_debug(msg: &str) {
    debug!("{msg}");
    write_to_file("DEBUG", msg);
}

pub fn log_trace(msg: &str) {
    trace!("{msg}");
    write_to_file("TRACE", msg);
}
