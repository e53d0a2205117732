//! User-visible feedback for rejected or noteworthy operations.

use std::sync::RwLock;

/// How a notification should be presented.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Info,
    Success,
    Warning,
    Error,
}

/// Sink for user-facing messages. The host decides how to show them.
pub trait Notifier: Send + Sync {
    fn show(&self, message: &str, severity: Severity);
}

/// Forwards notifications to the `log` facade.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn show(&self, message: &str, severity: Severity) {
        match severity {
            Severity::Info | Severity::Success => log::info!("{message}"),
            Severity::Warning => log::warn!("{message}"),
            Severity::Error => log::error!("{message}"),
        }
    }
}

/// Keeps every notification in memory, for tests and headless hosts.
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    messages: RwLock<Vec<(String, Severity)>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything shown so far, oldest first.
    pub fn messages(&self) -> Vec<(String, Severity)> {
        self.messages.read().map(|m| m.clone()).unwrap_or_default()
    }

    /// Number of notifications with the given severity.
    pub fn count(&self, severity: Severity) -> usize {
        self.messages
            .read()
            .map(|m| m.iter().filter(|(_, s)| *s == severity).count())
            .unwrap_or(0)
    }

    pub fn clear(&self) {
        if let Ok(mut messages) = self.messages.write() {
            messages.clear();
        }
    }
}

impl Notifier for RecordingNotifier {
    fn show(&self, message: &str, severity: Severity) {
        if let Ok(mut messages) = self.messages.write() {
            messages.push((message.to_string(), severity));
        }
    }
}
