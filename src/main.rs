//! Autoshot CLI
//!
//! Launches a browser, opens the target page, and serves the command gateway
//! over stdio. Responses go to stdout; logs go to stderr so they never mix
//! with the wire protocol.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tracing::info;

use autoshot::automation::{AutomationConfig, CaptureController};
use autoshot::browser::cdp::{CdpBrowser, CdpConfig};
use autoshot::gateway::{CommandGateway, GatewayServer};

/// Auto-capture controller for gallery-style web pages
#[derive(Parser, Debug)]
#[command(name = "autoshot")]
#[command(version)]
#[command(about = "Capture, advance, detect the end, repeat")]
struct Args {
    /// Page to open and capture
    url: String,

    /// Run with a visible browser window
    #[arg(long)]
    headed: bool,

    /// Path to Chrome/Chromium executable
    #[arg(long)]
    chrome_path: Option<String>,

    /// Directory captures are written to
    #[arg(short, long, default_value = "captures")]
    output_dir: PathBuf,

    /// Stop cleanly after this many captures (0 = unlimited)
    #[arg(long, default_value = "0")]
    max_captures: u64,

    /// Do not switch to the next item group when one is exhausted
    #[arg(long)]
    no_group_switch: bool,

    /// Start capturing immediately instead of waiting for a start command
    #[arg(long)]
    auto_start: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let filter = if args.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    info!("autoshot {} starting", autoshot::VERSION);

    let cdp_config = {
        let mut builder = CdpConfig::builder()
            .headless(!args.headed)
            .output_dir(args.output_dir.clone());
        if let Some(ref path) = args.chrome_path {
            builder = builder.chrome_path(path.clone());
        }
        builder.build()
    };

    let browser = Arc::new(
        CdpBrowser::launch(cdp_config)
            .await
            .context("failed to launch browser")?,
    );
    let tab = browser
        .open(&args.url)
        .await
        .context("failed to open target page")?;
    info!(%tab, url = %args.url, "target page ready");

    let automation = AutomationConfig::builder()
        .max_captures(args.max_captures)
        .auto_switch_group(!args.no_group_switch)
        .build();

    let controller = Arc::new(CaptureController::new(
        browser.clone(),
        browser.clone(),
        automation,
    ));

    if args.auto_start {
        controller.start(tab);
    }

    let server = GatewayServer::new(CommandGateway::new(controller.clone()));
    server.run().await.context("gateway failed")?;

    // Stdin closed: wind the session down and release the browser.
    controller.stop();
    controller.join().await;
    let status = controller.status();
    info!(images = status.image_count, "session state at shutdown");

    browser.close().await.context("failed to close browser")?;
    Ok(())
}
