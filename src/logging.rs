/// Conditional logging for hot paths
///
/// The `debug_log!` macro forwards to `log::debug!` in debug builds or when the
/// `console_logging` feature is enabled. In release builds it compiles to
/// nothing, which keeps per-tick code such as follower traversal free of
/// formatting overhead. Errors and warnings should use `log::error!` and
/// `log::warn!` directly.
///
/// # Examples
///
/// ```rust
/// use track_graph::debug_log;
///
/// debug_log!("follower crossed into section {}", 3);
/// ```
#[macro_export]
macro_rules! debug_log {
    ($($arg:tt)+) => {
        #[cfg(any(debug_assertions, feature = "console_logging"))]
        {
            ::log::debug!($($arg)+);
        }
    };
}
