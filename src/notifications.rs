//! User-visible notifications raised by the session.
//!
//! The session decides *what* to tell the user; a [`Notifier`] decides how to
//! show it. The TUI renders notifications as expiring toasts, the headless
//! front end prints them. Notifiers must not block the caller.
//!
//! # Severity and Placement
//!
//! - **Success / Info**: room joined, users arriving or leaving (top-centre)
//! - **Error**: validation failures and relay-reported errors (bottom-right)

// Rust guideline compliant 2026-02

use std::time::Duration;

use tokio::sync::mpsc;

/// How urgent a notification is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Membership changes and other ambient updates.
    Info,
    /// A requested action completed.
    Success,
    /// Something the user asked for was rejected.
    Error,
}

impl Severity {
    /// Returns the lowercase label used in logs and headless output.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Info => "info",
            Self::Success => "success",
            Self::Error => "error",
        }
    }

    /// Where a toast of this severity is drawn.
    pub fn placement(self) -> Placement {
        match self {
            Self::Info | Self::Success => Placement::TopCenter,
            Self::Error => Placement::BottomRight,
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Screen anchor for a toast.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    /// Centered along the top edge.
    TopCenter,
    /// Bottom-right corner.
    BottomRight,
}

/// One (severity, text, duration hint) triple.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    /// Urgency.
    pub severity: Severity,
    /// Message shown to the user.
    pub text: String,
    /// How long the message should stay visible.
    pub duration: Duration,
}

impl Notification {
    /// Create an info notification.
    pub fn info(text: impl Into<String>, duration: Duration) -> Self {
        Self {
            severity: Severity::Info,
            text: text.into(),
            duration,
        }
    }

    /// Create a success notification.
    pub fn success(text: impl Into<String>, duration: Duration) -> Self {
        Self {
            severity: Severity::Success,
            text: text.into(),
            duration,
        }
    }

    /// Create an error notification.
    pub fn error(text: impl Into<String>, duration: Duration) -> Self {
        Self {
            severity: Severity::Error,
            text: text.into(),
            duration,
        }
    }
}

/// Receives notifications from the session.
pub trait Notifier {
    /// Hand a notification to the display side. Must return immediately.
    fn notify(&self, notification: Notification);
}

/// Forwards notifications over an unbounded channel to the front end.
#[derive(Debug, Clone)]
pub struct ChannelNotifier {
    tx: mpsc::UnboundedSender<Notification>,
}

impl ChannelNotifier {
    /// Create a notifier and the receiver the front end drains.
    pub fn new() -> (Self, mpsc::UnboundedReceiver<Notification>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl Notifier for ChannelNotifier {
    fn notify(&self, notification: Notification) {
        log::info!(
            "[notify] {}: {} ({}ms)",
            notification.severity,
            notification.text,
            notification.duration.as_millis()
        );
        if self.tx.send(notification).is_err() {
            log::debug!("[notify] Front end gone, notification dropped");
        }
    }
}
