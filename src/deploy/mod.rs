//! Controller deployment module
//!
//! Provisions the controller workload and polls for the custom resource
//! type it registers.

mod health;
mod provisioner;

pub use health::{PollOutcome, ReadinessPoller, DEFAULT_POLL_INTERVAL, DEFAULT_READY_TIMEOUT};
pub use provisioner::Provisioner;
