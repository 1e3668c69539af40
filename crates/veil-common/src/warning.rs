//! Compositing warnings with colored terminal output.
//!
//! Provides deduplication to avoid spamming the same warning multiple times.
//! Used by the canvas and layer crates to report caller mistakes that are
//! recoverable (unbalanced stack calls, mismatched mask sizes, missing fonts).

use std::collections::BTreeSet;
use std::sync::{Mutex, PoisonError};

use owo_colors::OwoColorize;

/// Global set of warnings we've already printed (to deduplicate)
static WARNED: Mutex<BTreeSet<String>> = Mutex::new(BTreeSet::new());

/// Warn about a recoverable problem (prints once per unique message)
///
/// # Example
/// ```ignore
/// warn_once("layers", "end_transparency_layer called with no open layer");
/// ```
pub fn warn_once(component: &str, message: &str) {
    let key = format!("[{component}] {message}");
    let should_print = WARNED
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .insert(key);

    if should_print {
        eprintln!("{}", format!("[Veil {component}] ⚠ {message}").yellow());
    }
}

/// Returns `true` if a warning for `component` containing `needle` has been
/// emitted since the last [`clear_warnings`].
#[must_use]
pub fn has_warned(component: &str, needle: &str) -> bool {
    let prefix = format!("[{component}] ");
    WARNED
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .iter()
        .any(|key| key.starts_with(&prefix) && key.contains(needle))
}

/// Clear all recorded warnings (call when starting a new frame)
pub fn clear_warnings() {
    WARNED
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .clear();
}
