//! Shared utilities: logging setup and presentation formatting.

pub mod format;
pub mod logging;

pub use format::{format_percent, format_tokens, format_tokens_compact};
pub use logging::{init_logging, LogFormat};
