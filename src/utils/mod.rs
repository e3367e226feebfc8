//! Shared utilities
//!
//! Clock/timer helpers and logging setup.

mod logger;
mod timer;

pub use logger::{init_logger, LogLevel};
pub use timer::{Clock, Timer, TokioClock};
