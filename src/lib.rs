//! Autoshot - Auto-Capture Controller for Gallery-Style Web Pages
//!
//! This crate drives a repeating capture-and-advance cycle against a live web
//! page: take a screenshot, advance the page to its next item through DOM
//! manipulation, detect when the final item has been reached, repeat. The
//! running session can be started, stopped, and queried from outside while it
//! runs.
//!
//! # Architecture
//!
//! ```text
//! UI surface ──▶ Command Gateway ──▶ Capture Controller
//!                                          │
//!                                          ▼
//!                                   Auto-Capture Loop
//!                                    │            │
//!                                    ▼            ▼
//!                              Page Prober   Capture Invoker
//!                              (in-page JS)  (screenshot)
//! ```
//!
//! The loop is a single cooperative tokio task; at most one session runs at a
//! time, and the running flag is released on every exit path. Probes execute
//! inside the target page through a [`browser::ScriptHost`], so the core
//! never assumes shared memory with the page.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use autoshot::automation::{AutomationConfig, CaptureController};
//! use autoshot::browser::cdp::{CdpBrowser, CdpConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let browser = Arc::new(CdpBrowser::launch(CdpConfig::default()).await?);
//!     let tab = browser.open("https://example.com/gallery").await?;
//!
//!     let controller = CaptureController::new(
//!         browser.clone(),
//!         browser.clone(),
//!         AutomationConfig::default(),
//!     );
//!     controller.start(tab);
//!     controller.join().await;
//!
//!     println!("captured {} images", controller.status().image_count);
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod automation;
pub mod browser;
pub mod error;
pub mod gateway;
pub mod probe;

// Re-exports for convenience
pub use automation::{AutomationConfig, CaptureController, SessionOutcome, SessionStatus};
pub use browser::{CaptureInvoker, ScriptHost, TabId};
pub use error::{Error, Result};
pub use gateway::{Command, CommandGateway, GatewayServer};
pub use probe::{AdvanceOutcome, PageProber, ProbeConfig, Prober};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");
