use std::path::PathBuf;

use utils::normalized_path_from_user_string;
use zsync_config::LogConfig;

#[derive(Clone, Debug, PartialEq)]
pub enum LoggingMode {
    File(PathBuf),
    Console,
}

#[derive(Clone, Debug, PartialEq)]
pub struct LoggingConfig {
    pub logging_mode: LoggingMode,
    pub use_json: bool,
    pub version: String,
}

impl LoggingConfig {
    /// Resolve the destination and format from the log configuration group.
    ///
    /// No destination (or an empty one) means console logging. Files default to JSON lines and
    /// the console to text unless `format` says otherwise.
    pub fn from_config(version: impl Into<String>, log_config: &LogConfig) -> Self {
        let logging_mode = match log_config.dest.as_deref().map(str::trim) {
            None | Some("") => LoggingMode::Console,
            Some(dest) => LoggingMode::File(normalized_path_from_user_string(dest)),
        };

        let use_json = match &log_config.format {
            Some(format) => format.trim().eq_ignore_ascii_case("json"),
            None => logging_mode != LoggingMode::Console,
        };

        Self {
            logging_mode,
            use_json,
            version: version.into(),
        }
    }
}
