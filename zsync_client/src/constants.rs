pub const CURRENT_VERSION: &str = env!("CARGO_PKG_VERSION");

pub const ZSYNC_DOWNLOAD_PROGRAM: &str = "zsyncdownload";
