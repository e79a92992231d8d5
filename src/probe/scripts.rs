//! Probe script rendering
//!
//! Each probe is a self-contained JavaScript expression evaluated inside the
//! target page. Configuration (marker strings, selector lists, strategy order)
//! is serialized into the script as JSON literals, so the page side needs no
//! globals and no prior injection. Scripts never throw at the top level: the
//! markup being probed is not controlled by this crate, so every DOM access is
//! guarded and failures collapse to the probe's negative result.

use crate::probe::{GroupProbeConfig, ProbeConfig};

/// Marker returned by the advance script when no candidate control matched.
pub const NO_ADVANCE: &str = "none";

const LAST_ITEM_TEMPLATE: &str = r#"
(() => {
  const markers = __MARKERS__;
  const toastSelectors = __TOAST_SELECTORS__;
  const disabledSelectors = __DISABLED_SELECTORS__;
  try {
    const bodyText = document.body ? (document.body.innerText || '') : '';
    if (markers.some((marker) => bodyText.includes(marker))) return true;
    for (const selector of toastSelectors) {
      for (const toast of document.querySelectorAll(selector)) {
        const text = toast.textContent || '';
        if (markers.some((marker) => text.includes(marker))) return true;
      }
    }
    for (const selector of disabledSelectors) {
      for (const control of document.querySelectorAll(selector)) {
        if (control.disabled) return true;
      }
    }
    return false;
  } catch (e) {
    return false;
  }
})()
"#;

const TOAST_TEMPLATE: &str = r#"
(() => {
  const markers = __MARKERS__;
  const toastSelectors = __TOAST_SELECTORS__;
  try {
    const bodyText = document.body ? (document.body.innerText || '') : '';
    if (markers.some((marker) => bodyText.includes(marker))) return true;
    for (const selector of toastSelectors) {
      for (const toast of document.querySelectorAll(selector)) {
        const text = toast.textContent || '';
        if (markers.some((marker) => text.includes(marker))) return true;
      }
    }
    return false;
  } catch (e) {
    return false;
  }
})()
"#;

const ADVANCE_TEMPLATE: &str = r#"
(() => {
  const strategies = __STRATEGIES__;
  const exclude = __EXCLUDE__;
  function isVisible(el) {
    if (!el) return false;
    try {
      const style = window.getComputedStyle(el);
      if (style.display === 'none' || style.visibility === 'hidden' || style.opacity === '0') return false;
      const rect = el.getBoundingClientRect();
      return rect.width > 0 && rect.height > 0;
    } catch (e) {
      return false;
    }
  }
  function isActionable(el) {
    if (!el || !isVisible(el)) return false;
    if (el.disabled) return false;
    if (el.classList && (el.classList.contains('is-disabled') || el.classList.contains('disabled'))) return false;
    return true;
  }
  function labelText(el) {
    return ((el.innerText || el.textContent) || '').trim();
  }
  function isExcluded(el) {
    const text = labelText(el);
    return exclude.some((pattern) => text.includes(pattern));
  }
  for (const strategy of strategies) {
    for (const selector of strategy.selectors) {
      let candidates;
      try {
        candidates = document.querySelectorAll(selector);
      } catch (e) {
        continue;
      }
      for (const el of candidates) {
        let target = null;
        if (strategy.kind === 'container') {
          if (!isVisible(el)) continue;
          const button = el.querySelector('button');
          if (isActionable(button) && !isExcluded(button)) target = button;
        } else if (strategy.kind === 'direct') {
          if (isActionable(el) && !isExcluded(el)) target = el;
        } else if (strategy.kind === 'text') {
          if (!isActionable(el) || isExcluded(el)) continue;
          const text = labelText(el);
          if (strategy.patterns.some((pattern) => text === pattern || text.includes(pattern))) target = el;
        } else if (strategy.kind === 'icon') {
          if (!isVisible(el)) continue;
          const button = el.closest('button') || el.closest('[role="button"]') || el.parentElement;
          if (isActionable(button) && !isExcluded(button)) target = button;
        }
        if (target) {
          target.click();
          return strategy.kind + ':' + selector;
        }
      }
    }
  }
  return 'none';
})()
"#;

const GROUP_NEXT_TEMPLATE: &str = r#"
(() => {
  const selectors = __SELECTORS__;
  const marker = __MARKER__;
  const exclude = __EXCLUDE__;
  try {
    for (const selector of selectors) {
      for (const el of document.querySelectorAll(selector)) {
        const text = (el.textContent || '').trim();
        if (exclude.some((pattern) => text.includes(pattern))) continue;
        if (!text.includes(marker)) continue;
        const rect = el.getBoundingClientRect();
        if (rect.top > window.innerHeight * 0.3) {
          el.click();
          return true;
        }
      }
    }
    return false;
  } catch (e) {
    return false;
  }
})()
"#;

const FIRST_THUMBNAIL_TEMPLATE: &str = r#"
(() => {
  const selectors = __SELECTORS__;
  const exclude = __EXCLUDE__;
  function inDialog(el) {
    let current = el;
    while (current) {
      const className = (typeof current.className === 'string' ? current.className : '').toLowerCase();
      if (className.includes('dialog') || className.includes('modal')) return true;
      current = current.parentElement;
    }
    return false;
  }
  function nearExcludedText(el) {
    let current = el;
    for (let i = 0; i < 8 && current; i++) {
      const text = (current.textContent || '').trim();
      if (exclude.some((pattern) => text.includes(pattern))) return true;
      current = current.parentElement;
    }
    return false;
  }
  try {
    for (const selector of selectors) {
      for (const container of document.querySelectorAll(selector)) {
        if (inDialog(container)) continue;
        if (nearExcludedText(container)) continue;
        const rect = container.getBoundingClientRect();
        if (rect.top < 100 || rect.left < window.innerWidth * 0.4) continue;
        if (rect.width < 50 || rect.height < 50) continue;
        const img = container.querySelector('img') || container;
        img.click();
        return true;
      }
    }
    return false;
  } catch (e) {
    return false;
  }
})()
"#;

fn json<T: serde::Serialize>(value: &T) -> String {
    // Only infallible shapes (strings and lists of strings) reach this point.
    serde_json::to_string(value).unwrap_or_else(|_| "null".to_string())
}

/// Render the last-item detection script.
///
/// The page is considered exhausted when any of three signals fires: a marker
/// string in the visible body text, a marker string inside a toast element, or
/// a disabled advance control.
pub fn last_item_script(config: &ProbeConfig) -> String {
    LAST_ITEM_TEMPLATE
        .replace("__MARKERS__", &json(&config.last_item_markers))
        .replace("__TOAST_SELECTORS__", &json(&config.toast_selectors))
        .replace("__DISABLED_SELECTORS__", &json(&config.disabled_next_selectors))
}

/// Render the toast-only re-check script run shortly after an advance click.
pub fn toast_script(config: &ProbeConfig) -> String {
    TOAST_TEMPLATE
        .replace("__MARKERS__", &json(&config.toast_markers))
        .replace("__TOAST_SELECTORS__", &json(&config.toast_selectors))
}

/// Render the advance script.
///
/// Strategies are tried in their configured order; within a strategy the first
/// candidate that passes the visibility test (computed display/visibility,
/// strictly positive bounding box) and is not disabled gets exactly one click.
/// Returns the matched `kind:selector` pair, or `"none"`.
pub fn advance_script(config: &ProbeConfig) -> String {
    ADVANCE_TEMPLATE
        .replace("__STRATEGIES__", &json(&config.advance))
        .replace("__EXCLUDE__", &json(&config.advance_exclude))
}

/// Render the next-group click script.
pub fn group_next_script(config: &GroupProbeConfig) -> String {
    GROUP_NEXT_TEMPLATE
        .replace("__SELECTORS__", &json(&config.next_selectors))
        .replace("__MARKER__", &json(&config.next_marker))
        .replace("__EXCLUDE__", &json(&config.next_exclude))
}

/// Render the first-thumbnail click script used after a group switch.
pub fn first_thumbnail_script(config: &GroupProbeConfig) -> String {
    FIRST_THUMBNAIL_TEMPLATE
        .replace("__SELECTORS__", &json(&config.thumbnail_selectors))
        .replace("__EXCLUDE__", &json(&config.thumbnail_exclude))
}
