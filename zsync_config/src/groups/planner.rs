crate::config_group!({

    /// The range planner executable. It is run as `<command> <descriptor> <seed>` and must print the
    /// plan as JSON on stdout.
    ///
    /// The default value is "zsyncranges", looked up on PATH.
    ///
    /// Use the environment variable `ZSYNC_PLANNER_COMMAND` to set this value.
    ref command: String = "zsyncranges".to_string();

    /// Extra arguments for the planner, split on whitespace and passed ahead of the descriptor
    /// and seed paths.
    ///
    /// The default value is empty.
    ///
    /// Use the environment variable `ZSYNC_PLANNER_ARGS` to set this value.
    ref args: String = String::new();
});
