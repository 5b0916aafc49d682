//! Logging macros prefixing records with the simulation time and algorithm name.
//!
//! The macros accept anything with `time() -> f64` and `name()` methods as context, usually a
//! [`SimulationContext`](crate::SimulationContext), and format records as `[time LEVEL name] message`.
//! Installing a logger (e.g. `env_logger`) is up to the application.

/// Logs a message at the trace level.
#[macro_export]
macro_rules! log_trace {
    ($ctx:expr, $msg:expr) => (
        if $crate::__log::log_enabled!($crate::__log::Level::Trace) {
            $crate::__log::trace!(
                "[{:.3} {} {}] {}",
                $ctx.time(), $crate::colored::Colorize::cyan("TRACE"), $ctx.name(), $msg
            );
        }
    );
    ($ctx:expr, $format:expr, $($arg:tt)+) => (
        if $crate::__log::log_enabled!($crate::__log::Level::Trace) {
            $crate::__log::trace!(
                "[{:.3} {} {}] {}",
                $ctx.time(), $crate::colored::Colorize::cyan("TRACE"), $ctx.name(), format!($format, $($arg)+)
            );
        }
    );
}

/// Logs a message at the debug level.
#[macro_export]
macro_rules! log_debug {
    ($ctx:expr, $msg:expr) => (
        if $crate::__log::log_enabled!($crate::__log::Level::Debug) {
            $crate::__log::debug!(
                "[{:.3} {} {}] {}",
                $ctx.time(), $crate::colored::Colorize::blue("DEBUG"), $ctx.name(), $msg
            );
        }
    );
    ($ctx:expr, $format:expr, $($arg:tt)+) => (
        if $crate::__log::log_enabled!($crate::__log::Level::Debug) {
            $crate::__log::debug!(
                "[{:.3} {} {}] {}",
                $ctx.time(), $crate::colored::Colorize::blue("DEBUG"), $ctx.name(), format!($format, $($arg)+)
            );
        }
    );
}

/// Logs a message at the info level.
#[macro_export]
macro_rules! log_info {
    ($ctx:expr, $msg:expr) => (
        if $crate::__log::log_enabled!($crate::__log::Level::Info) {
            $crate::__log::info!(
                "[{:.3} {}  {}] {}",
                $ctx.time(), $crate::colored::Colorize::green("INFO"), $ctx.name(), $msg
            );
        }
    );
    ($ctx:expr, $format:expr, $($arg:tt)+) => (
        if $crate::__log::log_enabled!($crate::__log::Level::Info) {
            $crate::__log::info!(
                "[{:.3} {}  {}] {}",
                $ctx.time(), $crate::colored::Colorize::green("INFO"), $ctx.name(), format!($format, $($arg)+)
            );
        }
    );
}

/// Logs a message at the warn level.
#[macro_export]
macro_rules! log_warn {
    ($ctx:expr, $msg:expr) => (
        if $crate::__log::log_enabled!($crate::__log::Level::Warn) {
            $crate::__log::warn!(
                "[{:.3} {}  {}] {}",
                $ctx.time(), $crate::colored::Colorize::yellow("WARN"), $ctx.name(), $msg
            );
        }
    );
    ($ctx:expr, $format:expr, $($arg:tt)+) => (
        if $crate::__log::log_enabled!($crate::__log::Level::Warn) {
            $crate::__log::warn!(
                "[{:.3} {}  {}] {}",
                $ctx.time(), $crate::colored::Colorize::yellow("WARN"), $ctx.name(), format!($format, $($arg)+)
            );
        }
    );
}

/// Logs a message at the error level.
#[macro_export]
macro_rules! log_error {
    ($ctx:expr, $msg:expr) => (
        if $crate::__log::log_enabled!($crate::__log::Level::Error) {
            $crate::__log::error!(
                "[{:.3} {} {}] {}",
                $ctx.time(), $crate::colored::Colorize::red("ERROR"), $ctx.name(), $msg
            );
        }
    );
    ($ctx:expr, $format:expr, $($arg:tt)+) => (
        if $crate::__log::log_enabled!($crate::__log::Level::Error) {
            $crate::__log::error!(
                "[{:.3} {} {}] {}",
                $ctx.time(), $crate::colored::Colorize::red("ERROR"), $ctx.name(), format!($format, $($arg)+)
            );
        }
    );
}
