//! Browser collaborator seam
//!
//! The automation core never talks to a browser directly. It goes through two
//! narrow capabilities: a [`CaptureInvoker`] that performs one screenshot side
//! effect, and a [`ScriptHost`] that executes a probe script inside the target
//! page's frames and hands back each frame's structured result. A CDP-backed
//! implementation of both lives in [`cdp`]; tests substitute scripted fakes.

pub mod cdp;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::Result;

/// Opaque handle identifying the page a session operates on.
///
/// Fixed for the lifetime of one capture session; minted by whatever opened the
/// page (the CDP layer, an extension host, a test fixture).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TabId(pub u64);

impl std::fmt::Display for TabId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "tab#{}", self.0)
    }
}

/// Performs one screenshot/export action for the current page state.
///
/// Treated as an opaque external collaborator: the loop only cares that the
/// call completed or failed. Failures are not retried; they end the session.
#[async_trait]
pub trait CaptureInvoker: Send + Sync {
    /// Capture the current state of `tab`.
    async fn run_capture(&self, tab: TabId) -> Result<()>;
}

/// Executes a probe script inside the target page and returns its result.
///
/// The script is a self-contained expression; the host evaluates it in every
/// frame it can reach and returns one entry per frame. `None` entries mean the
/// frame produced no structured result (navigated away, threw at the top
/// level, or the serialized value could not be decoded).
#[async_trait]
pub trait ScriptHost: Send + Sync {
    /// Evaluate `script` in the frames of `tab`.
    async fn execute(&self, tab: TabId, script: &str) -> Result<Vec<Option<Value>>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tab_id_display() {
        assert_eq!(TabId(42).to_string(), "tab#42");
    }

    #[test]
    fn test_tab_id_serde_transparent() {
        let json = serde_json::to_string(&TabId(7)).unwrap();
        assert_eq!(json, "7");
        let back: TabId = serde_json::from_str("7").unwrap();
        assert_eq!(back, TabId(7));
    }
}
