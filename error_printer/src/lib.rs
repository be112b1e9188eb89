use std::fmt::{Debug, Display};
use std::panic::Location;

use tracing::{debug, error, info, warn};

/// Logs the error of a `Result` as it passes through, returning the `Result` unchanged.
///
/// Useful where an error is propagated or deliberately ignored but should still leave a trace in
/// the logs, e.g. `set_mtime(path).warn_error("could not set mtime").ok();`.
pub trait ErrorPrinter {
    fn log_error<M: Display>(self, message: M) -> Self;

    fn warn_error<M: Display>(self, message: M) -> Self;

    fn debug_error<M: Display>(self, message: M) -> Self;

    fn info_error<M: Display>(self, message: M) -> Self;
}

impl<T, E: Debug> ErrorPrinter for Result<T, E> {
    #[track_caller]
    fn log_error<M: Display>(self, message: M) -> Self {
        if let Err(e) = &self {
            let caller = Location::caller();
            error!(caller = %caller, "{message}, error: {e:?}");
        }
        self
    }

    #[track_caller]
    fn warn_error<M: Display>(self, message: M) -> Self {
        if let Err(e) = &self {
            let caller = Location::caller();
            warn!(caller = %caller, "{message}, error: {e:?}");
        }
        self
    }

    #[track_caller]
    fn debug_error<M: Display>(self, message: M) -> Self {
        if let Err(e) = &self {
            let caller = Location::caller();
            debug!(caller = %caller, "{message}, error: {e:?}");
        }
        self
    }

    #[track_caller]
    fn info_error<M: Display>(self, message: M) -> Self {
        if let Err(e) = &self {
            let caller = Location::caller();
            info!(caller = %caller, "{message}, error: {e:?}");
        }
        self
    }
}

/// Logs when an `Option` is `None`, returning it unchanged.
pub trait OptionPrinter {
    fn error_none<M: Display>(self, message: M) -> Self;

    fn warn_none<M: Display>(self, message: M) -> Self;

    fn info_none<M: Display>(self, message: M) -> Self;
}

impl<T> OptionPrinter for Option<T> {
    #[track_caller]
    fn error_none<M: Display>(self, message: M) -> Self {
        if self.is_none() {
            error!(caller = %Location::caller(), "{message}");
        }
        self
    }

    #[track_caller]
    fn warn_none<M: Display>(self, message: M) -> Self {
        if self.is_none() {
            warn!(caller = %Location::caller(), "{message}");
        }
        self
    }

    #[track_caller]
    fn info_none<M: Display>(self, message: M) -> Self {
        if self.is_none() {
            info!(caller = %Location::caller(), "{message}");
        }
        self
    }
}
