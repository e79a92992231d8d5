//! Auto-capture automation
//!
//! This module owns the session lifecycle: the controller guarding the
//! running state, the loop that captures and advances until a terminal
//! condition, and the configuration for both.

pub mod config;
pub mod controller;
mod runner;
mod session;

pub use config::{AutomationConfig, AutomationConfigBuilder};
pub use controller::CaptureController;
pub use session::{SessionOutcome, SessionStatus};
