//! Expiring toast notifications.

// Rust guideline compliant 2026-02

use std::collections::VecDeque;
use std::time::Instant;

use crate::constants::MAX_VISIBLE_TOASTS;
use crate::notifications::{Notification, Placement};

/// A notification with its expiry deadline.
#[derive(Debug, Clone)]
pub struct Toast {
    /// What to show.
    pub notification: Notification,
    /// When it disappears.
    pub expires_at: Instant,
}

/// Active toasts, oldest first.
#[derive(Debug, Default)]
pub struct ToastQueue {
    toasts: VecDeque<Toast>,
}

impl ToastQueue {
    /// Show `notification` from `now` for its duration hint.
    pub fn push(&mut self, notification: Notification, now: Instant) {
        let expires_at = now + notification.duration;
        self.toasts.push_back(Toast {
            notification,
            expires_at,
        });
    }

    /// Drop expired toasts. Returns true if any were removed.
    pub fn prune(&mut self, now: Instant) -> bool {
        let before = self.toasts.len();
        self.toasts.retain(|toast| toast.expires_at > now);
        self.toasts.len() != before
    }

    /// Returns true if nothing is showing.
    pub fn is_empty(&self) -> bool {
        self.toasts.is_empty()
    }

    /// Toasts drawn at `placement`, newest first, capped at
    /// [`MAX_VISIBLE_TOASTS`].
    pub fn visible(&self, placement: Placement) -> impl Iterator<Item = &Toast> {
        self.toasts
            .iter()
            .rev()
            .filter(move |toast| toast.notification.severity.placement() == placement)
            .take(MAX_VISIBLE_TOASTS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_prune_removes_expired() {
        let start = Instant::now();
        let mut queue = ToastQueue::default();
        queue.push(Notification::info("short", Duration::from_millis(100)), start);
        queue.push(Notification::info("long", Duration::from_secs(5)), start);

        assert!(!queue.prune(start));
        assert!(queue.prune(start + Duration::from_secs(1)));

        let left: Vec<_> = queue
            .visible(Placement::TopCenter)
            .map(|t| t.notification.text.as_str())
            .collect();
        assert_eq!(left, vec!["long"]);

        queue.prune(start + Duration::from_secs(10));
        assert!(queue.is_empty());
    }

    #[test]
    fn test_visible_splits_by_placement_newest_first() {
        let now = Instant::now();
        let mut queue = ToastQueue::default();
        queue.push(Notification::success("joined", Duration::from_secs(2)), now);
        queue.push(Notification::error("bad room", Duration::from_secs(3)), now);
        queue.push(Notification::info("bob arrived", Duration::from_secs(5)), now);

        let top: Vec<_> = queue
            .visible(Placement::TopCenter)
            .map(|t| t.notification.text.as_str())
            .collect();
        let bottom: Vec<_> = queue
            .visible(Placement::BottomRight)
            .map(|t| t.notification.text.as_str())
            .collect();
        assert_eq!(top, vec!["bob arrived", "joined"]);
        assert_eq!(bottom, vec!["bad room"]);
    }

    #[test]
    fn test_visible_is_capped() {
        let now = Instant::now();
        let mut queue = ToastQueue::default();
        for n in 0..(MAX_VISIBLE_TOASTS + 2) {
            queue.push(Notification::error(format!("e{n}"), Duration::from_secs(3)), now);
        }
        assert_eq!(queue.visible(Placement::BottomRight).count(), MAX_VISIBLE_TOASTS);
    }
}
