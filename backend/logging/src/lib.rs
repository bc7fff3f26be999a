//! Structured logging for LensText.
//!
//! Handles subscriber setup (console + rolling file), secret redaction, and
//! recognition-cycle event records.

pub mod cycle_log;
pub mod logger;
pub mod redact;

pub use cycle_log::{log_cycle_event, CycleEvent};
pub use logger::{init_logger, ConsoleOutput, LogSettings};
pub use redact::redact_sensitive_data;
pub use tracing_appender::non_blocking::WorkerGuard;
