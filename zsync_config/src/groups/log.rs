crate::config_group!({

    /// The log destination. Unset or empty logs to the console; anything else is a file path.
    ///
    /// The default value is None.
    ///
    /// Use the environment variable `ZSYNC_LOG_DEST` to set this value.
    ref dest: Option<String> = None;

    /// "json" for JSON lines, anything else for text. File logging defaults to json, console to text.
    ///
    /// The default value is None.
    ///
    /// Use the environment variable `ZSYNC_LOG_FORMAT` to set this value.
    ref format: Option<String> = None;
});
