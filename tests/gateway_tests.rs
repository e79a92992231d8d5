//! Command gateway integration tests
//!
//! These verify the request/response protocol: recognized actions, their
//! exact response shapes, and the no-response cases.

use std::sync::Arc;

use async_trait::async_trait;
use pretty_assertions::assert_eq;
use serde_json::json;

use autoshot::automation::{AutomationConfig, CaptureController};
use autoshot::browser::{CaptureInvoker, TabId};
use autoshot::error::Result;
use autoshot::gateway::{AckResponse, Command, CommandGateway, StatusResponse};
use autoshot::probe::{AdvanceOutcome, Prober};

struct NoopInvoker;

#[async_trait]
impl CaptureInvoker for NoopInvoker {
    async fn run_capture(&self, _tab: TabId) -> Result<()> {
        Ok(())
    }
}

/// Prober that ends every session after its first capture.
struct OneShotProber;

#[async_trait]
impl Prober for OneShotProber {
    async fn last_item_reached(&self, _tab: TabId) -> bool {
        true
    }

    async fn advance(&self, _tab: TabId) -> AdvanceOutcome {
        AdvanceOutcome::NotFound
    }

    async fn last_item_toast(&self, _tab: TabId) -> bool {
        false
    }

    async fn next_group(&self, _tab: TabId) -> bool {
        false
    }

    async fn first_thumbnail(&self, _tab: TabId) -> bool {
        false
    }
}

/// Prober that never finishes, to hold a session open during a test.
struct PendingProber;

#[async_trait]
impl Prober for PendingProber {
    async fn last_item_reached(&self, _tab: TabId) -> bool {
        futures::future::pending().await
    }

    async fn advance(&self, _tab: TabId) -> AdvanceOutcome {
        AdvanceOutcome::NotFound
    }

    async fn last_item_toast(&self, _tab: TabId) -> bool {
        false
    }

    async fn next_group(&self, _tab: TabId) -> bool {
        false
    }

    async fn first_thumbnail(&self, _tab: TabId) -> bool {
        false
    }
}

fn gateway_with(prober: Arc<dyn Prober>) -> (CommandGateway, Arc<CaptureController>) {
    let controller = Arc::new(CaptureController::with_prober(
        Arc::new(NoopInvoker),
        prober,
        AutomationConfig::builder().auto_switch_group(false).build(),
    ));
    (CommandGateway::new(Arc::clone(&controller)), controller)
}

#[tokio::test(start_paused = true)]
async fn status_reports_idle_before_start() {
    let (gateway, _ctl) = gateway_with(Arc::new(OneShotProber));

    let response = gateway
        .handle_line(r#"{"action":"getAutoCaptureStatus"}"#)
        .expect("status is handled");
    assert_eq!(response, json!({"isAutoCapturing": false}));
}

#[tokio::test(start_paused = true)]
async fn start_is_acknowledged_and_status_flips() {
    let (gateway, ctl) = gateway_with(Arc::new(PendingProber));

    let response = gateway
        .handle_line(r#"{"action":"startAutoCapture","tabId":7}"#)
        .expect("start is handled");
    assert_eq!(response, json!({"success": true}));

    let status = gateway
        .handle_line(r#"{"action":"getAutoCaptureStatus"}"#)
        .expect("status is handled");
    assert_eq!(status, json!({"isAutoCapturing": true}));
    assert_eq!(ctl.status().tab, Some(TabId(7)));
}

#[tokio::test(start_paused = true)]
async fn start_while_running_still_reports_success() {
    let (gateway, ctl) = gateway_with(Arc::new(PendingProber));

    gateway
        .handle_line(r#"{"action":"startAutoCapture","tabId":1}"#)
        .expect("first start handled");
    let response = gateway
        .handle_line(r#"{"action":"startAutoCapture","tabId":2}"#)
        .expect("second start handled");

    // The command was accepted even though no new session began.
    assert_eq!(response, json!({"success": true}));
    assert_eq!(ctl.status().tab, Some(TabId(1)));
}

#[tokio::test(start_paused = true)]
async fn start_without_tab_is_not_handled() {
    let (gateway, ctl) = gateway_with(Arc::new(OneShotProber));

    assert!(gateway
        .handle_line(r#"{"action":"startAutoCapture"}"#)
        .is_none());
    assert!(!ctl.status().is_running);
}

#[tokio::test(start_paused = true)]
async fn stop_is_acknowledged_even_when_idle() {
    let (gateway, _ctl) = gateway_with(Arc::new(OneShotProber));

    let response = gateway
        .handle_line(r#"{"action":"stopAutoCapture"}"#)
        .expect("stop is handled");
    assert_eq!(response, json!({"success": true}));
}

#[tokio::test(start_paused = true)]
async fn stop_ends_a_running_session() {
    let (gateway, ctl) = gateway_with(Arc::new(OneShotProber));

    gateway
        .handle_line(r#"{"action":"startAutoCapture","tabId":3}"#)
        .expect("start handled");
    gateway
        .handle_line(r#"{"action":"stopAutoCapture"}"#)
        .expect("stop handled");

    ctl.join().await;
    let status = gateway
        .handle_line(r#"{"action":"getAutoCaptureStatus"}"#)
        .expect("status handled");
    assert_eq!(status, json!({"isAutoCapturing": false}));
}

#[tokio::test(start_paused = true)]
async fn unknown_action_is_not_handled() {
    let (gateway, _ctl) = gateway_with(Arc::new(OneShotProber));

    assert!(gateway.handle_line(r#"{"action":"resizeImage"}"#).is_none());
    assert!(gateway.handle_line(r#"{"action":""}"#).is_none());
    assert!(gateway.handle_line(r#"{"no_action":true}"#).is_none());
}

#[tokio::test(start_paused = true)]
async fn malformed_json_is_not_handled() {
    let (gateway, _ctl) = gateway_with(Arc::new(OneShotProber));

    assert!(gateway.handle_line("not json at all").is_none());
    assert!(gateway.handle_line(r#"{"action":"#).is_none());
}

#[tokio::test(start_paused = true)]
async fn handle_value_matches_handle_line() {
    let (gateway, _ctl) = gateway_with(Arc::new(OneShotProber));

    let raw = json!({"action": "getAutoCaptureStatus"});
    let response = gateway.handle_value(&raw).expect("handled");
    assert_eq!(response, json!({"isAutoCapturing": false}));

    assert!(gateway.handle_value(&json!({"action": "unknown"})).is_none());
}

#[test]
fn response_types_round_trip() {
    let status: StatusResponse =
        serde_json::from_str(r#"{"isAutoCapturing":true}"#).expect("status parses");
    assert!(status.is_auto_capturing);

    let ack: AckResponse = serde_json::from_str(r#"{"success":true}"#).expect("ack parses");
    assert!(ack.success);
}

#[test]
fn command_serialization_round_trip() {
    let start = Command::Start {
        tab_id: Some(TabId(42)),
    };
    let json = serde_json::to_string(&start).expect("serializes");
    assert_eq!(json, r#"{"action":"startAutoCapture","tabId":42}"#);
    let back: Command = serde_json::from_str(&json).expect("parses");
    assert_eq!(back, start);
}
