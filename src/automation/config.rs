//! Auto-capture configuration

use std::time::Duration;

use crate::probe::ProbeConfig;

/// Configuration for an auto-capture session
#[derive(Debug, Clone)]
pub struct AutomationConfig {
    /// Pause after each capture before judging "last item" (default: 2000ms).
    /// Absorbs the page's own async rendering latency.
    pub settle_delay: Duration,
    /// Pause after a successful advance before the next capture
    /// (default: 2500ms). Longer than the settle delay: the next item must
    /// finish a full re-render before it is captured.
    pub render_delay: Duration,
    /// Pause between an advance click and the toast re-check (default: 1000ms)
    pub toast_delay: Duration,
    /// Advance retry attempts after a failed first attempt (default: 3)
    pub advance_retries: u32,
    /// Pause between advance retries (default: 1000ms)
    pub advance_retry_delay: Duration,
    /// Stop cleanly after this many captures; 0 means unlimited (default: 0)
    pub max_captures: u64,
    /// Switch to the next item group when the current one is exhausted
    /// (default: true)
    pub auto_switch_group: bool,
    /// Pause between the next-group click and the thumbnail click
    /// (default: 3500ms)
    pub group_switch_delay: Duration,
    /// Pause after a completed group switch before capturing resumes
    /// (default: 5000ms)
    pub post_switch_delay: Duration,
    /// Page prober settings
    pub probe: ProbeConfig,
}

impl Default for AutomationConfig {
    fn default() -> Self {
        Self {
            settle_delay: Duration::from_millis(2000),
            render_delay: Duration::from_millis(2500),
            toast_delay: Duration::from_millis(1000),
            advance_retries: 3,
            advance_retry_delay: Duration::from_millis(1000),
            max_captures: 0,
            auto_switch_group: true,
            group_switch_delay: Duration::from_millis(3500),
            post_switch_delay: Duration::from_millis(5000),
            probe: ProbeConfig::default(),
        }
    }
}

impl AutomationConfig {
    /// Create a new config builder
    pub fn builder() -> AutomationConfigBuilder {
        AutomationConfigBuilder::default()
    }
}

/// Builder for AutomationConfig
#[derive(Default)]
pub struct AutomationConfigBuilder {
    config: AutomationConfig,
}

impl AutomationConfigBuilder {
    /// Set the post-capture settle delay
    pub fn settle_delay(mut self, delay: Duration) -> Self {
        self.config.settle_delay = delay;
        self
    }

    /// Set the post-advance render delay
    pub fn render_delay(mut self, delay: Duration) -> Self {
        self.config.render_delay = delay;
        self
    }

    /// Set the toast re-check delay
    pub fn toast_delay(mut self, delay: Duration) -> Self {
        self.config.toast_delay = delay;
        self
    }

    /// Set the number of advance retries
    pub fn advance_retries(mut self, retries: u32) -> Self {
        self.config.advance_retries = retries;
        self
    }

    /// Set the pause between advance retries
    pub fn advance_retry_delay(mut self, delay: Duration) -> Self {
        self.config.advance_retry_delay = delay;
        self
    }

    /// Set the capture ceiling (0 = unlimited)
    pub fn max_captures(mut self, max: u64) -> Self {
        self.config.max_captures = max;
        self
    }

    /// Enable/disable automatic group switching
    pub fn auto_switch_group(mut self, enabled: bool) -> Self {
        self.config.auto_switch_group = enabled;
        self
    }

    /// Set the pause between the next-group click and the thumbnail click
    pub fn group_switch_delay(mut self, delay: Duration) -> Self {
        self.config.group_switch_delay = delay;
        self
    }

    /// Set the pause after a completed group switch
    pub fn post_switch_delay(mut self, delay: Duration) -> Self {
        self.config.post_switch_delay = delay;
        self
    }

    /// Set the prober configuration
    pub fn probe(mut self, probe: ProbeConfig) -> Self {
        self.config.probe = probe;
        self
    }

    /// Build the config
    pub fn build(self) -> AutomationConfig {
        self.config
    }
}
