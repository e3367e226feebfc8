//! Test environment framework
//!
//! Lifecycle of the ephemeral namespace the e2e suite runs in: setup,
//! diagnostic capture and teardown.

mod diagnostics;
mod environment;
mod error;

pub use diagnostics::{collect_logs, copy_stream, write_report, DEFAULT_TAIL_LINES};
pub use environment::{Environment, TeardownError};
pub use error::{BoxError, FrameworkError, Result};
