//! Page probing
//!
//! Probes answer two questions against a live page whose markup this crate
//! does not control: "has the last item been reached?" and "can we advance to
//! the next item?". Probe behavior is data — marker strings and an ordered
//! list of matcher strategies in [`ProbeConfig`] — rendered into in-page
//! scripts by [`scripts`]. Combination semantics live here in Rust: last-item
//! detection is any-match-true across signals and frames, advance is
//! first-match-wins, and a probe that produces no structured result is mapped
//! fail-safe (toward stopping for last-item, toward failure for advance).

pub mod scripts;

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use crate::browser::{ScriptHost, TabId};

/// One matcher strategy for the advance probe.
///
/// Strategies are attempted in list order; the first one that yields a
/// visible, enabled candidate wins and the remaining strategies are skipped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum AdvanceStrategy {
    /// A container is matched first; the button inside it is activated.
    Container {
        /// Container selectors, e.g. a wrapper span around the real button.
        selectors: Vec<String>,
    },
    /// The matched element itself is activated.
    Direct {
        /// Selectors for directly clickable controls (carousel arrows).
        selectors: Vec<String>,
    },
    /// Button-like elements filtered by their label text.
    Text {
        /// Candidate selectors to scan.
        selectors: Vec<String>,
        /// Accepted label texts (exact or substring match).
        patterns: Vec<String>,
    },
    /// An icon is matched first; the nearest enclosing button is activated.
    Icon {
        /// Icon selectors whose closest button/role=button parent is clicked.
        selectors: Vec<String>,
    },
}

/// Selectors and markers for the optional group-advance probes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupProbeConfig {
    /// Selectors for the next-group control.
    pub next_selectors: Vec<String>,
    /// Label text the next-group control must contain.
    pub next_marker: String,
    /// Label texts that disqualify a next-group candidate.
    pub next_exclude: Vec<String>,
    /// Selectors for the thumbnail containers of a freshly opened group.
    pub thumbnail_selectors: Vec<String>,
    /// Ancestor texts that disqualify a thumbnail candidate (user avatars etc.).
    pub thumbnail_exclude: Vec<String>,
}

impl Default for GroupProbeConfig {
    fn default() -> Self {
        Self {
            next_selectors: vec!["div.zdkBtn".into(), ".zdkBtn".into()],
            next_marker: "下一个".into(),
            next_exclude: vec![
                "用户".into(),
                "普通用户".into(),
                "头像".into(),
                "个人".into(),
                "登录".into(),
            ],
            thumbnail_selectors: vec![".demo-image__preview".into()],
            thumbnail_exclude: vec![
                "用户".into(),
                "普通用户".into(),
                "头像".into(),
                "个人信息".into(),
                "点击更换头像".into(),
            ],
        }
    }
}

/// Configuration for the page prober.
///
/// Defaults target Element-UI style gallery pages; every field can be
/// overridden for other markup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProbeConfig {
    /// Marker strings whose presence in body or toast text means "last item".
    pub last_item_markers: Vec<String>,
    /// Marker strings for the post-advance toast re-check.
    pub toast_markers: Vec<String>,
    /// Selectors for toast/notification elements.
    pub toast_selectors: Vec<String>,
    /// Advance controls whose disabled state also means "last item".
    pub disabled_next_selectors: Vec<String>,
    /// Ordered advance strategies, most specific first.
    pub advance: Vec<AdvanceStrategy>,
    /// Label texts that disqualify any advance candidate.
    pub advance_exclude: Vec<String>,
    /// Group-advance probe settings.
    pub group: GroupProbeConfig,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            last_item_markers: vec![
                "已经是最后一张了".into(),
                "已经是最后一张".into(),
                "已是最后".into(),
            ],
            toast_markers: vec!["已经是最后一张了".into(), "已经是最后一张".into()],
            toast_selectors: vec![
                ".el-message__content".into(),
                ".el-message".into(),
                ".toast".into(),
            ],
            disabled_next_selectors: vec![
                ".el-carousel__arrow--right".into(),
                ".btn-next".into(),
                ".right-btn".into(),
            ],
            advance: vec![
                AdvanceStrategy::Container {
                    selectors: vec![".right-btn".into(), "span.right-btn".into()],
                },
                AdvanceStrategy::Direct {
                    selectors: vec![
                        ".el-carousel__arrow--right".into(),
                        ".el-carousel__arrow.el-carousel__arrow--right".into(),
                    ],
                },
                AdvanceStrategy::Text {
                    selectors: vec![
                        "button".into(),
                        "[role=\"button\"]".into(),
                        ".btn-next".into(),
                        "[class*=\"next-btn\"]".into(),
                    ],
                    patterns: vec!["下一张".into(), "下一张>".into(), "下一张 >".into()],
                },
                AdvanceStrategy::Icon {
                    selectors: vec![
                        ".el-icon-caret-right".into(),
                        ".el-icon-arrow-right".into(),
                        "i.el-icon-caret-right".into(),
                    ],
                },
            ],
            advance_exclude: vec![
                "下一条".into(),
                "下一项".into(),
                "下一页".into(),
                "用户".into(),
                "普通用户".into(),
            ],
            group: GroupProbeConfig::default(),
        }
    }
}

/// Result of one advance attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AdvanceOutcome {
    /// A control was activated; `matched` names the winning `kind:selector`.
    Advanced {
        /// The strategy kind and selector that matched.
        matched: String,
    },
    /// No visible, enabled advance control was found.
    NotFound,
}

/// The probing capability the auto-capture loop depends on.
///
/// Implemented by [`PageProber`] over a [`ScriptHost`]; tests substitute
/// scripted implementations.
#[async_trait]
pub trait Prober: Send + Sync {
    /// True when the page reports its final item (fail-safe: a probe that
    /// yields no structured result also counts as the final item).
    async fn last_item_reached(&self, tab: TabId) -> bool;

    /// Attempt to activate an advance control.
    async fn advance(&self, tab: TabId) -> AdvanceOutcome;

    /// Advisory re-check for a "last item" toast shortly after an advance.
    async fn last_item_toast(&self, tab: TabId) -> bool;

    /// Attempt to activate the next-group control.
    async fn next_group(&self, tab: TabId) -> bool;

    /// Attempt to open the first thumbnail of a freshly switched group.
    async fn first_thumbnail(&self, tab: TabId) -> bool;
}

/// Prober that renders [`ProbeConfig`] into scripts and runs them through a
/// [`ScriptHost`].
pub struct PageProber {
    host: Arc<dyn ScriptHost>,
    last_item_js: String,
    toast_js: String,
    advance_js: String,
    group_next_js: String,
    first_thumbnail_js: String,
}

impl PageProber {
    /// Create a prober for the given host and configuration.
    ///
    /// Scripts are rendered once up front; the config is consumed.
    pub fn new(host: Arc<dyn ScriptHost>, config: ProbeConfig) -> Self {
        Self {
            last_item_js: scripts::last_item_script(&config),
            toast_js: scripts::toast_script(&config),
            advance_js: scripts::advance_script(&config),
            group_next_js: scripts::group_next_script(&config.group),
            first_thumbnail_js: scripts::first_thumbnail_script(&config.group),
            host,
        }
    }

    async fn run_bool(&self, tab: TabId, script: &str, on_silence: bool, what: &str) -> bool {
        match self.host.execute(tab, script).await {
            Ok(frames) => interpret_bool(&frames, on_silence),
            Err(err) => {
                warn!(%tab, probe = what, error = %err, "probe invocation failed");
                on_silence
            }
        }
    }
}

#[async_trait]
impl Prober for PageProber {
    async fn last_item_reached(&self, tab: TabId) -> bool {
        // Silence means the target context is gone; stopping beats looping
        // forever against a dead page.
        let last = self.run_bool(tab, &self.last_item_js, true, "last-item").await;
        debug!(%tab, last, "last-item probe");
        last
    }

    async fn advance(&self, tab: TabId) -> AdvanceOutcome {
        match self.host.execute(tab, &self.advance_js).await {
            Ok(frames) => interpret_advance(&frames),
            Err(err) => {
                warn!(%tab, error = %err, "advance probe failed");
                AdvanceOutcome::NotFound
            }
        }
    }

    async fn last_item_toast(&self, tab: TabId) -> bool {
        self.run_bool(tab, &self.toast_js, false, "toast").await
    }

    async fn next_group(&self, tab: TabId) -> bool {
        self.run_bool(tab, &self.group_next_js, false, "next-group").await
    }

    async fn first_thumbnail(&self, tab: TabId) -> bool {
        self.run_bool(tab, &self.first_thumbnail_js, false, "first-thumbnail")
            .await
    }
}

/// Combine per-frame boolean reports.
///
/// Any frame reporting `true` wins. When no frame produced a boolean at all,
/// `on_silence` decides: `true` for the last-item probe (a vanished context is
/// treated as the end), `false` for the advisory probes.
pub fn interpret_bool(frames: &[Option<Value>], on_silence: bool) -> bool {
    let mut saw_report = false;
    for frame in frames {
        match frame {
            Some(Value::Bool(true)) => return true,
            Some(Value::Bool(false)) => saw_report = true,
            _ => {}
        }
    }
    if saw_report {
        false
    } else {
        on_silence
    }
}

/// Combine per-frame advance reports: the first frame that activated a
/// control wins.
pub fn interpret_advance(frames: &[Option<Value>]) -> AdvanceOutcome {
    for frame in frames {
        if let Some(Value::String(matched)) = frame {
            if matched != scripts::NO_ADVANCE {
                return AdvanceOutcome::Advanced {
                    matched: matched.clone(),
                };
            }
        }
    }
    AdvanceOutcome::NotFound
}
