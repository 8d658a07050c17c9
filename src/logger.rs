//! Logging utilities with colored output and progress display.
//!
//! This module provides:
//! - `log!` macro for formatted terminal output with colored prefixes
//! - `ProgressLine` for single-line progress display with multiple counters
//!
//! # Example
//!
//! ```ignore
//! // Simple logging
//! log!("migrate"; "processing {} files", count);
//!
//! // Progress line for a batch run
//! let progress = ProgressLine::new(&[("files", 1050), ("failed", 0)]);
//! progress.inc("files");
//! progress.finish();
//! ```

use crossterm::{
    cursor, execute,
    terminal::{Clear, ClearType},
};
use owo_colors::OwoColorize;
use parking_lot::Mutex;
use std::{
    io::{Write, stdout},
    sync::atomic::{AtomicBool, AtomicUsize, Ordering},
};

/// Global verbose flag (set by --verbose CLI argument)
static VERBOSE: AtomicBool = AtomicBool::new(false);

/// Set verbose mode globally
pub fn set_verbose(v: bool) {
    VERBOSE.store(v, Ordering::SeqCst);
}

/// Check if verbose mode is enabled
pub fn is_verbose() -> bool {
    VERBOSE.load(Ordering::SeqCst)
}

/// Active progress bar count (for log coordination)
static BAR_COUNT: AtomicUsize = AtomicUsize::new(0);

// ============================================================================
// Log Macro
// ============================================================================

/// Log a message with a colored module prefix
///
/// # Usage
/// ```ignore
/// log!("module"; "message with {} formatting", args);
/// ```
#[macro_export]
macro_rules! log {
    ($module:expr; $($arg:tt)*) => {{
        $crate::logger::log($module, &format!($($arg)*))
    }};
}

/// Log a debug message (only shown when --verbose is enabled)
///
/// # Usage
/// ```ignore
/// debug!("module"; "debug info: {}", value);
/// ```
#[macro_export]
macro_rules! debug {
    ($module:expr; $($arg:tt)*) => {{
        if $crate::logger::is_verbose() {
            $crate::logger::log($module, &format!($($arg)*))
        }
    }};
}

// ============================================================================
// Helper Functions
// ============================================================================

/// Log a message with a colored module prefix
#[inline]
#[allow(clippy::cast_possible_truncation)] // Safe: bars count is always small
pub fn log(module: &str, message: &str) {
    let module_lower = module.to_ascii_lowercase();
    let prefix = colorize_prefix(module, &module_lower);

    let mut stdout = stdout().lock();

    let bar_count = BAR_COUNT.load(Ordering::SeqCst);
    if bar_count > 0 {
        execute!(stdout, cursor::MoveUp(bar_count as u16)).ok();
        execute!(stdout, Clear(ClearType::FromCursorDown)).ok();
    } else {
        execute!(stdout, Clear(ClearType::UntilNewLine)).ok();
    }

    writeln!(stdout, "{prefix} {message}").ok();

    if bar_count > 0 {
        for _ in 0..bar_count {
            writeln!(stdout).ok();
        }
    }

    stdout.flush().ok();
}

/// Apply color to a module prefix based on module type
#[inline]
fn colorize_prefix(module: &str, module_lower: &str) -> String {
    let prefix = format!("[{module}]");
    match module_lower {
        "migrate" => prefix.bright_blue().bold().to_string(),
        "verify" => prefix.bright_green().bold().to_string(),
        "error" => prefix.bright_red().bold().to_string(),
        "warn" => prefix.bright_magenta().bold().to_string(),
        _ => prefix.bright_yellow().bold().to_string(),
    }
}

// ============================================================================
// Progress Line (single-line counters)
// ============================================================================

/// Single-line progress display with multiple counters
///
/// Displays: `[migrate] files(42/1050) skipped(3) failed(1)`
///
/// All counters update in place on the same line. Uses `try_lock` to avoid
/// blocking worker threads - if display is busy, the update is skipped
pub struct ProgressLine {
    counters: Vec<Counter>,
    lock: Mutex<()>,
}

struct Counter {
    name: &'static str,
    total: usize,
    current: AtomicUsize,
}

impl ProgressLine {
    /// Create a progress line with named counters and their totals.
    ///
    /// A total of 0 renders as a bare count (no `/total` suffix).
    pub fn new(counters: &[(&'static str, usize)]) -> Self {
        BAR_COUNT.fetch_add(1, Ordering::SeqCst);
        let line = Self {
            counters: counters
                .iter()
                .map(|(name, total)| Counter {
                    name,
                    total: *total,
                    current: AtomicUsize::new(0),
                })
                .collect(),
            lock: Mutex::new(()),
        };
        line.render(false);
        line
    }

    /// Increment a counter by name and redraw.
    pub fn inc(&self, name: &str) {
        for counter in &self.counters {
            if counter.name == name {
                counter.current.fetch_add(1, Ordering::Relaxed);
                break;
            }
        }
        self.render(true);
    }

    /// Current value of a counter (0 if unknown name).
    pub fn get(&self, name: &str) -> usize {
        self.counters
            .iter()
            .find(|c| c.name == name)
            .map(|c| c.current.load(Ordering::Relaxed))
            .unwrap_or(0)
    }

    /// Finish the progress display, keeping the final line.
    pub fn finish(self) {
        self.render(true);
        BAR_COUNT.fetch_sub(1, Ordering::SeqCst);
    }

    fn render(&self, overwrite: bool) {
        // Skip update if another thread is rendering
        let Some(_guard) = (if overwrite {
            self.lock.try_lock()
        } else {
            Some(self.lock.lock())
        }) else {
            return;
        };

        let mut parts = Vec::with_capacity(self.counters.len());
        for counter in &self.counters {
            let current = counter.current.load(Ordering::Relaxed);
            if counter.total > 0 {
                parts.push(format!(
                    "{}({}/{})",
                    counter.name.cyan(),
                    current,
                    counter.total
                ));
            } else {
                parts.push(format!("{}({})", counter.name.cyan(), current));
            }
        }

        let prefix = "[migrate]".bright_blue().bold().to_string();
        let mut stdout = stdout().lock();
        if overwrite {
            execute!(stdout, cursor::MoveUp(1)).ok();
            execute!(stdout, Clear(ClearType::FromCursorDown)).ok();
        }
        writeln!(stdout, "{} {}", prefix, parts.join(" ")).ok();
        stdout.flush().ok();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counter_tracking() {
        let progress = ProgressLine::new(&[("files", 10), ("failed", 0)]);
        progress.inc("files");
        progress.inc("files");
        progress.inc("failed");
        assert_eq!(progress.get("files"), 2);
        assert_eq!(progress.get("failed"), 1);
        assert_eq!(progress.get("unknown"), 0);
        progress.finish();
    }

    #[test]
    fn test_verbose_flag() {
        set_verbose(true);
        assert!(is_verbose());
        set_verbose(false);
        assert!(!is_verbose());
    }
}
