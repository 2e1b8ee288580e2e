//! Level-gated logging on top of `tracing`.
//!
//! Each macro takes a [`LogConfig`](mtr_config::LogConfig) (or a reference to
//! one) followed by regular `tracing` event arguments. The toggle is checked
//! first, so a disabled severity never formats its fields.
//!
//! | Macro | Severity | tracing level |
//! |-------|----------|---------------|
//! | [`log_debug!`](crate::log_debug) | debug | `TRACE` |
//! | [`log_trivial!`](crate::log_trivial) | trivial | `DEBUG` |
//! | [`log_info!`](crate::log_info) | info | `INFO` |
//! | [`log_important!`](crate::log_important) | important | `WARN` |

#[doc(hidden)]
pub use tracing as __tracing;

/// Emit a debug-severity event if enabled.
#[macro_export]
macro_rules! log_debug {
    ($levels:expr, $($arg:tt)+) => {
        if $levels.debug {
            $crate::log::__tracing::trace!($($arg)+);
        }
    };
}

/// Emit a trivial-severity event if enabled.
#[macro_export]
macro_rules! log_trivial {
    ($levels:expr, $($arg:tt)+) => {
        if $levels.trivial {
            $crate::log::__tracing::debug!($($arg)+);
        }
    };
}

/// Emit an info-severity event if enabled.
#[macro_export]
macro_rules! log_info {
    ($levels:expr, $($arg:tt)+) => {
        if $levels.info {
            $crate::log::__tracing::info!($($arg)+);
        }
    };
}

/// Emit an important-severity event if enabled.
#[macro_export]
macro_rules! log_important {
    ($levels:expr, $($arg:tt)+) => {
        if $levels.important {
            $crate::log::__tracing::warn!($($arg)+);
        }
    };
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::fmt;

    use mtr_config::LogConfig;

    /// Counts how often it is formatted.
    struct Probe<'a>(&'a Cell<usize>);

    impl fmt::Display for Probe<'_> {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            self.0.set(self.0.get() + 1);
            f.write_str("probe")
        }
    }

    #[test]
    fn test_disabled_level_skips_arguments() {
        let calls = Cell::new(0);
        let levels = LogConfig::none();

        log_trivial!(levels, "{}", Probe(&calls));
        log_debug!(levels, "{}", Probe(&calls));
        log_info!(&levels, "{}", Probe(&calls));
        log_important!(levels, "{}", Probe(&calls));

        assert_eq!(calls.get(), 0);
    }

    #[test]
    fn test_enabled_level_compiles_with_fields() {
        let levels = LogConfig::all();
        log_trivial!(levels, position = 3, tag = %"p", "closing tag");
        log_important!(levels, tag = %"b", "ignoring closing tag");
    }
}
