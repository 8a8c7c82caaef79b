//! Result extension trait for logging errors with context.
//!
//! Adds a `log` method to `Result` so failures on the session and
//! request paths are recorded where they happen, without changing what the
//! caller receives.

use std::fmt::Display;
use tracing::warn;

/// Extension trait for logging errors with context.
pub trait ResultExt<T, E> {
    /// Log the error with context if this is an `Err` variant.
    ///
    /// # Example
    ///
    /// ```ignore
    /// use clubhub_client::result_ext::ResultExt;
    ///
    /// let result: Result<i32, &str> = Err("connection refused");
    /// let _ = result.log("loading branches");
    /// ```
    fn log<S: ToString>(self, context: S) -> Result<T, E>;
}

impl<T, E: Display> ResultExt<T, E> for Result<T, E> {
    #[track_caller]
    fn log<S: ToString>(self, context: S) -> Result<T, E> {
        if let Err(ref e) = self {
            let caller_location = std::panic::Location::caller();
            warn!(
                target: "clubhub_client",
                error = %e,
                file = %format!("{}:{}", caller_location.file(), caller_location.line()),
                context = %context.to_string(),
                "Operation failed"
            );
        }
        self
    }
}
