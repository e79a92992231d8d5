//! Gateway wire types
//!
//! Requests carry an `action` discriminator; responses are minimal objects
//! with the exact field names the UI surface expects (`isAutoCapturing`,
//! `success`, `tabId`). Nothing else crosses this boundary — there is no
//! error channel in the protocol.

use serde::{Deserialize, Serialize};

use crate::browser::TabId;

/// A recognized gateway request.
///
/// Unknown `action` values fail to deserialize, which the gateway treats as
/// "not handled" rather than as an error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action")]
pub enum Command {
    /// Query whether a session is running.
    #[serde(rename = "getAutoCaptureStatus")]
    GetStatus,

    /// Start a session on the given tab.
    #[serde(rename = "startAutoCapture")]
    Start {
        /// Target page handle; a request without one is not handled.
        #[serde(rename = "tabId", default, skip_serializing_if = "Option::is_none")]
        tab_id: Option<TabId>,
    },

    /// Request cooperative cancellation of the current session.
    #[serde(rename = "stopAutoCapture")]
    Stop,
}

/// Response to `getAutoCaptureStatus`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusResponse {
    /// True exactly while a capture session is running.
    #[serde(rename = "isAutoCapturing")]
    pub is_auto_capturing: bool,
}

/// Acknowledgement for `startAutoCapture` and `stopAutoCapture`.
///
/// `success` reports that the command was accepted, not that a new session
/// began: a start while one is already running is acknowledged too.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AckResponse {
    /// Whether the command was accepted.
    pub success: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_deserialize_status() {
        let cmd: Command = serde_json::from_str(r#"{"action":"getAutoCaptureStatus"}"#).unwrap();
        assert_eq!(cmd, Command::GetStatus);
    }

    #[test]
    fn test_command_deserialize_start_with_tab() {
        let cmd: Command =
            serde_json::from_str(r#"{"action":"startAutoCapture","tabId":12}"#).unwrap();
        assert_eq!(
            cmd,
            Command::Start {
                tab_id: Some(TabId(12))
            }
        );
    }

    #[test]
    fn test_command_deserialize_start_without_tab() {
        let cmd: Command = serde_json::from_str(r#"{"action":"startAutoCapture"}"#).unwrap();
        assert_eq!(cmd, Command::Start { tab_id: None });
    }

    #[test]
    fn test_command_unknown_action_is_error() {
        let result = serde_json::from_str::<Command>(r#"{"action":"resizeImage"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_status_response_field_name() {
        let json = serde_json::to_string(&StatusResponse {
            is_auto_capturing: true,
        })
        .unwrap();
        assert_eq!(json, r#"{"isAutoCapturing":true}"#);
    }

    #[test]
    fn test_ack_response_shape() {
        let json = serde_json::to_string(&AckResponse { success: true }).unwrap();
        assert_eq!(json, r#"{"success":true}"#);
    }
}
