//! CDP-backed browser collaborators
//!
//! This module provides the production implementation of the collaborator
//! seam: a ChromiumOxide-driven browser that can open pages, evaluate probe
//! scripts in them, and write full-page PNG captures to disk.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig as CdpBrowserConfig};
use chromiumoxide::cdp::browser_protocol::page::CaptureScreenshotFormat;
use chromiumoxide::page::ScreenshotParams;
use chromiumoxide::Page;
use chrono::Utc;
use futures::StreamExt;
use serde_json::Value;
use tokio::sync::{Mutex, RwLock};
use tokio::task::JoinHandle;
use tracing::{debug, info, instrument, warn};

use crate::browser::{CaptureInvoker, ScriptHost, TabId};
use crate::error::{BrowserError, CaptureError, Error, ProbeError, Result};

/// Configuration for browser launch
#[derive(Debug, Clone)]
pub struct CdpConfig {
    /// Run in headless mode (default: true)
    pub headless: bool,
    /// Browser window width (default: 1920)
    pub width: u32,
    /// Browser window height (default: 1080)
    pub height: u32,
    /// Enable sandbox (default: true)
    pub sandbox: bool,
    /// Navigation timeout in milliseconds (default: 30000)
    pub timeout_ms: u64,
    /// Path to Chrome/Chromium executable (None = auto-detect)
    pub chrome_path: Option<String>,
    /// Directory capture output files are written to (default: "captures")
    pub output_dir: PathBuf,
    /// Additional Chrome arguments
    pub extra_args: Vec<String>,
}

impl Default for CdpConfig {
    fn default() -> Self {
        Self {
            headless: true,
            width: 1920,
            height: 1080,
            sandbox: true,
            timeout_ms: 30000,
            chrome_path: None,
            output_dir: PathBuf::from("captures"),
            extra_args: Vec::new(),
        }
    }
}

impl CdpConfig {
    /// Create a new config builder
    pub fn builder() -> CdpConfigBuilder {
        CdpConfigBuilder::default()
    }
}

/// Builder for CdpConfig
#[derive(Default)]
pub struct CdpConfigBuilder {
    config: CdpConfig,
}

impl CdpConfigBuilder {
    /// Set headless mode
    pub fn headless(mut self, headless: bool) -> Self {
        self.config.headless = headless;
        self
    }

    /// Set viewport dimensions
    pub fn viewport(mut self, width: u32, height: u32) -> Self {
        self.config.width = width;
        self.config.height = height;
        self
    }

    /// Enable/disable sandbox
    pub fn sandbox(mut self, sandbox: bool) -> Self {
        self.config.sandbox = sandbox;
        self
    }

    /// Set navigation timeout
    pub fn timeout_ms(mut self, ms: u64) -> Self {
        self.config.timeout_ms = ms;
        self
    }

    /// Set Chrome path
    pub fn chrome_path<S: Into<String>>(mut self, path: S) -> Self {
        self.config.chrome_path = Some(path.into());
        self
    }

    /// Set the capture output directory
    pub fn output_dir<P: Into<PathBuf>>(mut self, dir: P) -> Self {
        self.config.output_dir = dir.into();
        self
    }

    /// Add extra Chrome argument
    pub fn arg<S: Into<String>>(mut self, arg: S) -> Self {
        self.config.extra_args.push(arg.into());
        self
    }

    /// Build the config
    pub fn build(self) -> CdpConfig {
        self.config
    }
}

/// ChromiumOxide-backed browser implementing [`ScriptHost`] and
/// [`CaptureInvoker`].
pub struct CdpBrowser {
    browser: Mutex<Browser>,
    handler: Mutex<Option<JoinHandle<()>>>,
    config: CdpConfig,
    pages: RwLock<HashMap<TabId, Page>>,
    next_tab: AtomicU64,
    capture_seq: AtomicU64,
}

impl CdpBrowser {
    /// Launch a browser with the given config
    #[instrument(skip(config))]
    pub async fn launch(config: CdpConfig) -> Result<Self> {
        info!(headless = config.headless, "launching browser");

        let mut builder = CdpBrowserConfig::builder();

        builder = builder.viewport(chromiumoxide::handler::viewport::Viewport {
            width: config.width,
            height: config.height,
            device_scale_factor: None,
            emulating_mobile: false,
            is_landscape: true,
            has_touch: false,
        });

        if !config.headless {
            builder = builder.with_head();
        }

        if !config.sandbox {
            builder = builder.arg("--no-sandbox");
        }

        if let Some(ref path) = config.chrome_path {
            builder = builder.chrome_executable(path);
        }

        for arg in &config.extra_args {
            builder = builder.arg(arg);
        }

        let cdp_config = builder
            .build()
            .map_err(|e| BrowserError::ConfigError(e.to_string()))?;

        let (browser, mut handler) = Browser::launch(cdp_config)
            .await
            .map_err(|e| BrowserError::LaunchFailed(e.to_string()))?;

        let handler_task = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if event.is_err() {
                    warn!("browser handler event error");
                    break;
                }
            }
            debug!("browser handler finished");
        });

        tokio::fs::create_dir_all(&config.output_dir).await?;

        info!("browser launched");

        Ok(Self {
            browser: Mutex::new(browser),
            handler: Mutex::new(Some(handler_task)),
            config,
            pages: RwLock::new(HashMap::new()),
            next_tab: AtomicU64::new(0),
            capture_seq: AtomicU64::new(0),
        })
    }

    /// Open a new page at `url` and register a tab handle for it
    #[instrument(skip(self))]
    pub async fn open(&self, url: &str) -> Result<TabId> {
        if !url.starts_with("http://") && !url.starts_with("https://") && !url.starts_with("file://")
        {
            return Err(BrowserError::LoadFailed(format!(
                "URL must start with http://, https://, or file://: {}",
                url
            ))
            .into());
        }

        let page = self
            .browser
            .lock()
            .await
            .new_page("about:blank")
            .await
            .map_err(|e| BrowserError::PageCreationFailed(e.to_string()))?;

        let timeout = Duration::from_millis(self.config.timeout_ms);
        tokio::time::timeout(timeout, page.goto(url))
            .await
            .map_err(|_| BrowserError::Timeout(self.config.timeout_ms))?
            .map_err(|e| BrowserError::LoadFailed(e.to_string()))?;

        self.wait_for_load(&page).await?;

        let tab = TabId(self.next_tab.fetch_add(1, Ordering::SeqCst) + 1);
        self.pages.write().await.insert(tab, page);
        info!(%tab, url, "page opened");

        Ok(tab)
    }

    /// Number of registered pages
    pub async fn page_count(&self) -> usize {
        self.pages.read().await.len()
    }

    /// Get the browser configuration
    pub fn config(&self) -> &CdpConfig {
        &self.config
    }

    /// Close the browser
    #[instrument(skip(self))]
    pub async fn close(&self) -> Result<()> {
        info!("closing browser");

        self.pages.write().await.clear();

        self.browser
            .lock()
            .await
            .close()
            .await
            .map_err(|e| Error::cdp(e.to_string()))?;

        let handler = self.handler.lock().await.take();
        if let Some(handler) = handler {
            let _ = tokio::time::timeout(Duration::from_secs(5), handler).await;
        }

        info!("browser closed");
        Ok(())
    }

    async fn page(&self, tab: TabId) -> Result<Page> {
        self.pages
            .read()
            .await
            .get(&tab)
            .cloned()
            .ok_or_else(|| BrowserError::UnknownTab(tab.0).into())
    }

    async fn wait_for_load(&self, page: &Page) -> Result<()> {
        let script = r#"
            new Promise(resolve => {
                if (document.readyState === 'complete') {
                    resolve(true);
                } else {
                    window.addEventListener('load', () => resolve(true));
                }
            })
        "#;
        let timeout = Duration::from_millis(self.config.timeout_ms);
        tokio::time::timeout(timeout, page.evaluate(script))
            .await
            .map_err(|_| BrowserError::Timeout(self.config.timeout_ms))?
            .map_err(|e| Error::cdp(e.to_string()))?;
        Ok(())
    }
}

#[async_trait]
impl ScriptHost for CdpBrowser {
    /// Evaluate a probe script in the page's main frame.
    ///
    /// CDP evaluation reaches one frame, so the result vector has a single
    /// entry; probe combination is any-match / first-match over however many
    /// frames report, so this degrades gracefully.
    async fn execute(&self, tab: TabId, script: &str) -> Result<Vec<Option<Value>>> {
        let page = self.page(tab).await?;
        let result = page
            .evaluate(script)
            .await
            .map_err(|e| ProbeError::InjectionFailed(e.to_string()))?;
        Ok(vec![result.value().cloned()])
    }
}

#[async_trait]
impl CaptureInvoker for CdpBrowser {
    /// Capture a full-page PNG and write it beneath the output directory.
    async fn run_capture(&self, tab: TabId) -> Result<()> {
        let page = self.page(tab).await?;

        let params = ScreenshotParams::builder()
            .format(CaptureScreenshotFormat::Png)
            .from_surface(true)
            .capture_beyond_viewport(true)
            .build();

        let data = page
            .screenshot(params)
            .await
            .map_err(|e| CaptureError::ScreenshotFailed(e.to_string()))?;

        let seq = self.capture_seq.fetch_add(1, Ordering::SeqCst) + 1;
        let name = format!("capture-{}-{:04}.png", Utc::now().format("%Y%m%d-%H%M%S"), seq);
        let path = self.config.output_dir.join(name);

        tokio::fs::write(&path, &data)
            .await
            .map_err(|e| CaptureError::WriteFailed(e.to_string()))?;

        debug!(%tab, path = %path.display(), bytes = data.len(), "capture written");
        Ok(())
    }
}
