//! Outcome notifications: one human-readable line per success or failure.

use std::cell::RefCell;
use std::io::{self, IsTerminal, Write};

const ANSI_RESET: &str = "\x1b[0m";
const ANSI_GREEN: &str = "\x1b[32m";
const ANSI_YELLOW: &str = "\x1b[33m";
const ANSI_RED: &str = "\x1b[31m";

/// Capability injected into each orchestrator for user-facing outcome lines.
pub trait Notifier {
    fn notify_success(&self, message: &str);

    /// Something worth a look that does not fail the operation.
    fn notify_warning(&self, message: &str);

    fn notify_error(&self, message: &str);
}

/// Writes `OK ...` / `WARN ...` / `ERR ...` lines to stderr.
#[derive(Debug, Clone, Copy)]
pub struct ConsoleNotifier {
    color: bool,
}

impl ConsoleNotifier {
    /// Colors the level name only when stderr is a terminal.
    pub fn stderr() -> Self {
        Self {
            color: io::stderr().is_terminal(),
        }
    }

    pub fn with_color(color: bool) -> Self {
        Self { color }
    }

    fn format(&self, level: &str, color: &str, message: &str) -> String {
        if self.color {
            format!("{color}{level}{ANSI_RESET} {message}")
        } else {
            format!("{level} {message}")
        }
    }

    fn emit(&self, line: String) {
        // Nothing sensible is left to report to if stderr is gone.
        let _ = writeln!(io::stderr().lock(), "{line}");
    }
}

impl Notifier for ConsoleNotifier {
    fn notify_success(&self, message: &str) {
        self.emit(self.format("OK", ANSI_GREEN, message));
    }

    fn notify_warning(&self, message: &str) {
        self.emit(self.format("WARN", ANSI_YELLOW, message));
    }

    fn notify_error(&self, message: &str) {
        self.emit(self.format("ERR", ANSI_RED, message));
    }
}

/// A notification captured by `MemoryNotifier`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    Success(String),
    Warning(String),
    Error(String),
}

/// Keeps notifications in memory so callers can inspect them.
#[derive(Debug, Default)]
pub struct MemoryNotifier {
    notices: RefCell<Vec<Notice>>,
}

impl MemoryNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn notices(&self) -> Vec<Notice> {
        self.notices.borrow().clone()
    }

    pub fn successes(&self) -> Vec<String> {
        self.notices
            .borrow()
            .iter()
            .filter_map(|notice| match notice {
                Notice::Success(message) => Some(message.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn warnings(&self) -> Vec<String> {
        self.notices
            .borrow()
            .iter()
            .filter_map(|notice| match notice {
                Notice::Warning(message) => Some(message.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn errors(&self) -> Vec<String> {
        self.notices
            .borrow()
            .iter()
            .filter_map(|notice| match notice {
                Notice::Error(message) => Some(message.clone()),
                _ => None,
            })
            .collect()
    }
}

impl Notifier for MemoryNotifier {
    fn notify_success(&self, message: &str) {
        self.notices.borrow_mut().push(Notice::Success(message.to_string()));
    }

    fn notify_warning(&self, message: &str) {
        self.notices.borrow_mut().push(Notice::Warning(message.to_string()));
    }

    fn notify_error(&self, message: &str) {
        self.notices.borrow_mut().push(Notice::Error(message.to_string()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_console_format() {
        let plain = ConsoleNotifier::with_color(false);
        assert_eq!(plain.format("OK", ANSI_GREEN, "a -> b"), "OK a -> b");
        assert_eq!(plain.format("WARN", ANSI_YELLOW, "2 items"), "WARN 2 items");

        let colored = ConsoleNotifier::with_color(true);
        assert_eq!(colored.format("ERR", ANSI_RED, "nope"), "\x1b[31mERR\x1b[0m nope");
    }

    #[test]
    fn test_memory_notifier_splits_levels() {
        let notifier = MemoryNotifier::new();
        notifier.notify_success("moved");
        notifier.notify_error("failed");
        notifier.notify_warning("leftovers");
        notifier.notify_success("moved again");

        assert_eq!(notifier.successes(), vec!["moved", "moved again"]);
        assert_eq!(notifier.warnings(), vec!["leftovers"]);
        assert_eq!(notifier.errors(), vec!["failed"]);
        assert_eq!(notifier.notices().len(), 4);
    }
}
