//! Command gateway
//!
//! Stateless request/response bridge between an external UI surface and the
//! [`CaptureController`]. The gateway recognizes three actions and produces
//! no response at all for anything else — it never raises an error toward
//! the caller.

mod server;
/// Gateway wire types
pub mod types;

use std::sync::Arc;

use serde_json::Value;
use tracing::debug;

use crate::automation::CaptureController;

pub use server::GatewayServer;
pub use types::{AckResponse, Command, StatusResponse};

/// Dispatches recognized commands to the capture controller.
pub struct CommandGateway {
    controller: Arc<CaptureController>,
}

impl CommandGateway {
    /// Create a gateway for the given controller.
    pub fn new(controller: Arc<CaptureController>) -> Self {
        Self { controller }
    }

    /// Handle one raw request line. `None` means the request was not handled
    /// (malformed JSON, unknown action, or a start without a target).
    pub fn handle_line(&self, line: &str) -> Option<Value> {
        let command: Command = match serde_json::from_str(line) {
            Ok(command) => command,
            Err(err) => {
                debug!(error = %err, "unrecognized request");
                return None;
            }
        };
        self.dispatch(command)
    }

    /// Handle one parsed request value.
    pub fn handle_value(&self, raw: &Value) -> Option<Value> {
        let command: Command = serde_json::from_value(raw.clone()).ok()?;
        self.dispatch(command)
    }

    /// Execute a recognized command.
    ///
    /// A start while a session is already running is still acknowledged with
    /// `success: true`: the command was accepted, the running session simply
    /// keeps its state. A start without a tab produces no response.
    pub fn dispatch(&self, command: Command) -> Option<Value> {
        match command {
            Command::GetStatus => {
                let status = StatusResponse {
                    is_auto_capturing: self.controller.is_running(),
                };
                serde_json::to_value(status).ok()
            }
            Command::Start { tab_id: Some(tab) } => {
                self.controller.start(tab);
                serde_json::to_value(AckResponse { success: true }).ok()
            }
            Command::Start { tab_id: None } => {
                debug!("start request without tabId, not handled");
                None
            }
            Command::Stop => {
                self.controller.stop();
                serde_json::to_value(AckResponse { success: true }).ok()
            }
        }
    }
}
