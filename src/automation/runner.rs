//! The auto-capture loop
//!
//! One iteration: capture, count, settle, probe for the last item, advance,
//! re-check for the end-of-items toast, wait for the next item to render.
//! Cancellation is cooperative and observed once per iteration at the top of
//! the loop; a capture or probe already in flight is allowed to finish.
//!
//! Iterations never overlap: an iteration's advance fully completes (or the
//! loop terminates) before the next capture begins, because the next item
//! must finish rendering before it is worth capturing.

use std::sync::Arc;

use metrics::counter;
use tokio::time::sleep;
use tracing::{debug, info, instrument, warn};

use crate::automation::config::AutomationConfig;
use crate::automation::session::{SessionOutcome, SessionState};
use crate::browser::{CaptureInvoker, TabId};
use crate::error::Result;
use crate::probe::{AdvanceOutcome, Prober};

enum GroupSwitch {
    Switched,
    Unavailable,
}

/// Executes one capture session against a fixed target page.
pub(crate) struct CaptureRunner {
    state: Arc<SessionState>,
    invoker: Arc<dyn CaptureInvoker>,
    prober: Arc<dyn Prober>,
    config: AutomationConfig,
    tab: TabId,
}

impl CaptureRunner {
    pub(crate) fn new(
        state: Arc<SessionState>,
        invoker: Arc<dyn CaptureInvoker>,
        prober: Arc<dyn Prober>,
        config: AutomationConfig,
        tab: TabId,
    ) -> Self {
        Self {
            state,
            invoker,
            prober,
            config,
            tab,
        }
    }

    /// Run the loop to a terminal state.
    ///
    /// Capture failures propagate as errors and are not retried; the caller
    /// logs them and the running slot is released by its guard either way.
    #[instrument(skip(self), fields(tab = %self.tab))]
    pub(crate) async fn run(&self) -> Result<SessionOutcome> {
        loop {
            // Cancellation checkpoint: a stop request takes effect here, not
            // mid-step.
            if self.state.stop_requested() {
                info!(images = self.state.image_count(), "stop request observed");
                return Ok(SessionOutcome::Cancelled);
            }

            let captured = self.state.image_count();
            if self.config.max_captures > 0 && captured >= self.config.max_captures {
                info!(captured, "capture ceiling reached");
                return Ok(SessionOutcome::Completed);
            }

            debug!(n = captured + 1, "capturing");
            self.invoker.run_capture(self.tab).await?;
            let count = self.state.increment_captures();
            counter!("autoshot_captures_total").increment(1);

            sleep(self.config.settle_delay).await;

            if self.prober.last_item_reached(self.tab).await {
                match self.try_switch_group().await {
                    GroupSwitch::Switched => continue,
                    GroupSwitch::Unavailable => {
                        info!(images = count, "last item reached");
                        return Ok(SessionOutcome::Completed);
                    }
                }
            }

            if !self.advance_with_retries().await {
                warn!(images = count, "no advance control found");
                return Ok(SessionOutcome::Aborted);
            }

            // Clicking "next" on the final item surfaces a transient toast
            // instead of navigating; catch it now rather than capturing a
            // duplicate of the last frame.
            sleep(self.config.toast_delay).await;
            if self.prober.last_item_toast(self.tab).await {
                match self.try_switch_group().await {
                    GroupSwitch::Switched => continue,
                    GroupSwitch::Unavailable => {
                        info!(images = count, "end-of-items toast after advance");
                        return Ok(SessionOutcome::Completed);
                    }
                }
            }

            sleep(self.config.render_delay).await;
        }
    }

    async fn advance_with_retries(&self) -> bool {
        if let AdvanceOutcome::Advanced { matched } = self.prober.advance(self.tab).await {
            debug!(%matched, "advanced");
            return true;
        }
        for attempt in 1..=self.config.advance_retries {
            sleep(self.config.advance_retry_delay).await;
            debug!(attempt, retries = self.config.advance_retries, "retrying advance");
            if let AdvanceOutcome::Advanced { matched } = self.prober.advance(self.tab).await {
                debug!(%matched, attempt, "advanced on retry");
                return true;
            }
        }
        false
    }

    /// Move to the next group of items once the current one is exhausted.
    ///
    /// `Unavailable` covers both "feature disabled" and "no further group":
    /// either way the session ends as a clean completion.
    async fn try_switch_group(&self) -> GroupSwitch {
        if !self.config.auto_switch_group {
            return GroupSwitch::Unavailable;
        }
        if !self.prober.next_group(self.tab).await {
            debug!("no next-group control");
            return GroupSwitch::Unavailable;
        }
        sleep(self.config.group_switch_delay).await;
        if !self.prober.first_thumbnail(self.tab).await {
            warn!("next-group clicked but no first thumbnail found");
            return GroupSwitch::Unavailable;
        }
        info!("switched to next group");
        counter!("autoshot_group_switches_total").increment(1);
        sleep(self.config.post_switch_delay).await;
        GroupSwitch::Switched
    }
}
