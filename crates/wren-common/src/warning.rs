//! Tool warnings with colored terminal output.
//!
//! Provides deduplication to avoid spamming the same warning multiple times.
//! The parser itself never prints; front ends use this to surface
//! recorded parse issues and unsupported input.

use std::collections::HashSet;
use std::sync::{Mutex, PoisonError};

/// ANSI color codes for terminal output
const YELLOW: &str = "\x1b[33m";
const RESET: &str = "\x1b[0m";

/// Global set of warnings we've already printed (to deduplicate)
static WARNED: Mutex<Option<HashSet<String>>> = Mutex::new(None);

/// Print a warning once per unique `(component, message)` pair.
///
/// Returns `true` if the warning was printed, `false` if it was a repeat.
///
/// # Example
/// ```ignore
/// warn_once("HTML", "unexpected-null-character at 3:14");
/// ```
pub fn warn_once(component: &str, message: &str) -> bool {
    let key = format!("[{component}] {message}");
    let should_print = WARNED
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .get_or_insert_with(HashSet::new)
        .insert(key);

    if should_print {
        eprintln!("{YELLOW}[Wren {component}] ⚠ {message}{RESET}");
    }
    should_print
}

/// Clear all recorded warnings (call before processing a new input)
pub fn clear_warnings() {
    let mut guard = WARNED.lock().unwrap_or_else(PoisonError::into_inner);
    if let Some(set) = guard.as_mut() {
        set.clear();
    }
}
