//! Structured logging for SolSwap
//!
//! ```rust,no_run
//! use solswap::logger::{self, LogTag};
//!
//! logger::info(LogTag::Quotes, "Fetching quotes");
//! logger::debug(LogTag::Okx, "Signed request built"); // only with --debug okx
//! ```
//!
//! Call [`init`] once at startup; before that the defaults apply
//! (Info level, no debug tags).

mod config;
mod core;
mod format;
mod levels;
mod tags;

pub use config::{get_logger_config, set_logger_config, update_logger_config, LoggerConfig};
pub use levels::LogLevel;
pub use tags::LogTag;

/// Install the process-wide logger configuration
pub fn init(config: LoggerConfig) {
    set_logger_config(config);
}

/// Always shown
pub fn error(tag: LogTag, message: &str) {
    core::log_internal(tag, LogLevel::Error, message);
}

pub fn warning(tag: LogTag, message: &str) {
    core::log_internal(tag, LogLevel::Warning, message);
}

pub fn info(tag: LogTag, message: &str) {
    core::log_internal(tag, LogLevel::Info, message);
}

/// Only shown when the tag is debug-enabled (`--debug <tag>`)
pub fn debug(tag: LogTag, message: &str) {
    core::log_internal(tag, LogLevel::Debug, message);
}

/// Only shown with `--verbose`
pub fn verbose(tag: LogTag, message: &str) {
    core::log_internal(tag, LogLevel::Verbose, message);
}
