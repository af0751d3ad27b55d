//! Structured console logging for v4swap
//!
//! - Standard levels (Error/Warning/Info/Debug/Verbose)
//! - Per-subsystem debug control via `--debug <tag>`
//! - Colored, aligned console output
//!
//! ## Usage
//!
//! ```rust
//! use v4swap::logger::{self, LogTag};
//!
//! logger::info(LogTag::Swap, "Swap confirmed");
//! logger::warning(LogTag::Quote, "Quote is older than the last block");
//! logger::debug(LogTag::Allowance, "Permit2 allowance: ..."); // only with --debug allowance
//! ```

mod config;
mod core;
mod format;
mod levels;
mod tags;

pub use config::{get_logger_config, set_logger_config, LoggerConfig};
pub use levels::LogLevel;
pub use tags::LogTag;

/// Install a logger configuration. Call once at startup, before logging.
pub fn init(config: LoggerConfig) {
    set_logger_config(config);
}

/// Log at ERROR level (always shown)
pub fn error(tag: LogTag, message: &str) {
    core::log_internal(tag, LogLevel::Error, message);
}

/// Log at WARNING level
pub fn warning(tag: LogTag, message: &str) {
    core::log_internal(tag, LogLevel::Warning, message);
}

/// Log at INFO level (normal operation)
pub fn info(tag: LogTag, message: &str) {
    core::log_internal(tag, LogLevel::Info, message);
}

/// Log at DEBUG level, shown only when the tag was enabled with `--debug <tag>`
pub fn debug(tag: LogTag, message: &str) {
    core::log_internal(tag, LogLevel::Debug, message);
}

/// Log at VERBOSE level, shown only with `--verbose`
pub fn verbose(tag: LogTag, message: &str) {
    core::log_internal(tag, LogLevel::Verbose, message);
}
