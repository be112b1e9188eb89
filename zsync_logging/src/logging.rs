use std::ffi::OsStr;
use std::path::Path;
use std::sync::OnceLock;

use tracing::{error, info};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

use crate::config::{LoggingConfig, LoggingMode};
use crate::constants::{DEFAULT_LOG_LEVEL_CONSOLE, DEFAULT_LOG_LEVEL_FILE};

/// The main entry point to set up logging. Should only be called once per process.
pub fn init_logging(cfg: LoggingConfig) {
    match &cfg.logging_mode {
        LoggingMode::File(path) => {
            // Fall back to the console if the file can't be written.
            if let Err(e) = init_logging_to_file(path, cfg.use_json) {
                init_logging_to_console(cfg.use_json);
                error!("Error logging to file {path:?} ({e}); falling back to console logging.");
            }
        },
        LoggingMode::Console => init_logging_to_console(cfg.use_json),
    }

    info!(version = %cfg.version, "zsyncdownload starting");
}

fn env_filter(default_level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_level))
        .unwrap_or_default()
}

fn init_logging_to_console(use_json: bool) {
    let fmt_layer_base = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_line_number(true)
        .with_file(true)
        .with_target(false);
    let fmt_filter = env_filter(DEFAULT_LOG_LEVEL_CONSOLE);

    let registry = tracing_subscriber::registry();
    if use_json {
        registry.with(fmt_layer_base.json().with_filter(fmt_filter)).init();
    } else {
        registry.with(fmt_layer_base.pretty().with_filter(fmt_filter)).init();
    }
}

fn init_logging_to_file(path: &Path, use_json: bool) -> Result<(), std::io::Error> {
    use tracing_appender::{non_blocking, rolling};

    let (path, file_name) = match path.file_name() {
        Some(name) => (path.to_path_buf(), name.to_os_string()),
        None => (path.join("zsync.log"), OsStr::new("zsync.log").to_os_string()),
    };

    let log_directory = match path.parent() {
        Some(parent) => {
            std::fs::create_dir_all(parent)?;
            parent
        },
        None => Path::new("."),
    };

    // Make sure the location is writeable so failure surfaces here rather than in the appender thread.
    std::fs::OpenOptions::new().create(true).append(true).open(&path)?;

    let file_appender = rolling::never(log_directory, file_name);
    let (writer, guard) = non_blocking(file_appender);

    // The guard flushes on drop; keep it for the life of the process.
    static FILE_GUARD: OnceLock<tracing_appender::non_blocking::WorkerGuard> = OnceLock::new();
    let _ = FILE_GUARD.set(guard);

    let fmt_layer_base = tracing_subscriber::fmt::layer()
        .with_line_number(true)
        .with_file(true)
        .with_target(false)
        .with_ansi(false)
        .with_writer(writer);
    let fmt_filter = env_filter(DEFAULT_LOG_LEVEL_FILE);

    let registry = tracing_subscriber::registry();
    if use_json {
        registry.with(fmt_layer_base.json().with_filter(fmt_filter)).init();
    } else {
        registry.with(fmt_layer_base.pretty().with_filter(fmt_filter)).init();
    }

    Ok(())
}
