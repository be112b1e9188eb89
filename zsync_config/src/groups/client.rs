use std::time::Duration;

crate::config_group!({

    /// Maximum time allowed to establish a TCP connection to the file server.
    ///
    /// The default value is 60 seconds.
    ///
    /// Use the environment variable `ZSYNC_CLIENT_CONNECT_TIMEOUT` to set this value.
    ref connect_timeout: Duration = Duration::from_secs(60);

    /// Maximum time allowed between data packets of a range response before the fetch fails.
    ///
    /// The default value is 120 seconds.
    ///
    /// Use the environment variable `ZSYNC_CLIENT_READ_TIMEOUT` to set this value.
    ref read_timeout: Duration = Duration::from_secs(120);

    /// The User-Agent header sent with descriptor and range requests.
    ///
    /// Use the environment variable `ZSYNC_CLIENT_USER_AGENT` to set this value.
    ref user_agent: String = concat!("zsyncdownload/", env!("CARGO_PKG_VERSION")).to_string();
});
