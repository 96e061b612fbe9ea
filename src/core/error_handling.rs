//! Error reporting shared by every module's error type

/// Errors that know whether their message is fit to show a user
///
/// When `is_user_actionable()` is true, `user_message()` should return the
/// message to show. Otherwise it returns `None` and callers fall back to a
/// generic description of the failed operation.
pub trait ContextualError: std::error::Error {
    /// Invalid options, malformed subjects and bad config files are
    /// user-actionable; lock poisoning and lost connections are not
    fn is_user_actionable(&self) -> bool;

    fn user_message(&self) -> Option<&str>;
}

/// Log an error at the level of detail its kind deserves
///
/// User-actionable errors show their own message; system errors show the
/// operation that failed. Full detail always goes to the debug log.
///
/// # Examples
/// ```rust
/// use subpool::core::error_handling::log_error_with_context;
/// use subpool::pool::PoolError;
///
/// let error = PoolError::InvalidOptions {
///     message: "pool size must be at least 1".to_string(),
/// };
/// log_error_with_context(&error, "Starting worker pool");
/// // Logs: "FATAL: pool size must be at least 1"
/// ```
pub fn log_error_with_context<E: ContextualError + std::fmt::Debug>(
    error: &E,
    operation_context: &str,
) {
    match error.user_message() {
        Some(user_msg) if error.is_user_actionable() => log::error!("FATAL: {}", user_msg),
        _ => log::error!("FATAL: {}", operation_context),
    }
    log::debug!("DETAIL: {}", error);
    log::debug!("DEBUG_DETAILS: {:?}", error);
}
