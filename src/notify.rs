//! # User Notifications
//!
//! Non-blocking notifications surfaced after a user action completes or
//! fails (the "toast" collaborator). Flows in [`crate::actions`] push at
//! most one notification per outcome; nothing in here blocks or retries.

/// Severity of a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Info,
    Error,
}

/// A single user-visible notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub severity: Severity,
    pub title: String,
    pub message: String,
}

impl Notification {
    pub fn info(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Info,
            title: title.into(),
            message: message.into(),
        }
    }

    pub fn error(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            title: title.into(),
            message: message.into(),
        }
    }
}

/// Sink for user-visible notifications.
///
/// The editor UI shows these as toasts; the CLI prints them; tests record
/// them to assert that a failure notifies exactly once.
pub trait Notifier {
    fn notify(&mut self, notification: Notification);
}

/// Notifier that logs notifications and otherwise drops them.
///
/// Used by headless flows (CLI, server) where the HTTP response or exit
/// code already carries the outcome.
#[derive(Debug, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&mut self, notification: Notification) {
        match notification.severity {
            Severity::Info => log::info!("{}: {}", notification.title, notification.message),
            Severity::Error => log::error!("{}: {}", notification.title, notification.message),
        }
    }
}

/// Notifier that records every notification, for tests.
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    pub notifications: Vec<Notification>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Notifications with `Severity::Error`.
    pub fn errors(&self) -> Vec<&Notification> {
        self.notifications
            .iter()
            .filter(|n| n.severity == Severity::Error)
            .collect()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&mut self, notification: Notification) {
        self.notifications.push(notification);
    }
}
