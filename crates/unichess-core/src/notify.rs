//! Transient user notifications for failures.
//!
//! `Notifier` is fire-and-forget: reporting never changes application state.
//! `Toasts` keeps a small queue of recent messages that expire on their own.

use std::collections::VecDeque;
use std::sync::{Mutex, PoisonError};
use std::time::{Duration, Instant};

use tracing::warn;

/// How long a toast stays on screen.
const TOAST_TTL: Duration = Duration::from_secs(5);

/// Maximum number of toasts kept at once; the oldest is dropped first.
const MAX_TOASTS: usize = 5;

pub trait Notifier: Send + Sync {
    fn notify_error(&self, message: &str);
}

#[derive(Debug, Clone)]
pub struct Toast {
    pub message: String,
    pub shown_at: Instant,
}

impl Toast {
    pub fn is_expired_at(&self, now: Instant) -> bool {
        now.duration_since(self.shown_at) >= TOAST_TTL
    }
}

pub struct Toasts {
    queue: Mutex<VecDeque<Toast>>,
}

impl Toasts {
    pub fn new() -> Self {
        Self {
            queue: Mutex::new(VecDeque::with_capacity(MAX_TOASTS)),
        }
    }

    fn push_at(&self, message: &str, now: Instant) {
        let mut queue = self.queue.lock().unwrap_or_else(PoisonError::into_inner);
        queue.retain(|t| !t.is_expired_at(now));

        // Same message already showing: restart its timer instead of stacking
        if let Some(existing) = queue.iter_mut().find(|t| t.message == message) {
            existing.shown_at = now;
            return;
        }
        if queue.len() == MAX_TOASTS {
            queue.pop_front();
        }
        queue.push_back(Toast {
            message: message.to_string(),
            shown_at: now,
        });
    }

    /// Toasts still on screen
    pub fn active(&self) -> Vec<Toast> {
        self.active_at(Instant::now())
    }

    fn active_at(&self, now: Instant) -> Vec<Toast> {
        let queue = self.queue.lock().unwrap_or_else(PoisonError::into_inner);
        queue.iter().filter(|t| !t.is_expired_at(now)).cloned().collect()
    }

    /// Remove and return every queued toast
    pub fn drain(&self) -> Vec<Toast> {
        let mut queue = self.queue.lock().unwrap_or_else(PoisonError::into_inner);
        queue.drain(..).collect()
    }

    pub fn messages(&self) -> Vec<String> {
        self.active().into_iter().map(|t| t.message).collect()
    }

    pub fn len(&self) -> usize {
        self.queue.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for Toasts {
    fn default() -> Self {
        Self::new()
    }
}

impl Notifier for Toasts {
    fn notify_error(&self, message: &str) {
        warn!(message = %message, "Error notification");
        self.push_at(message, Instant::now());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_notify_queues_message() {
        let toasts = Toasts::new();
        assert!(toasts.is_empty());

        toasts.notify_error("Incorrect credentials");
        assert_eq!(toasts.messages(), vec!["Incorrect credentials".to_string()]);
    }

    #[test]
    fn test_duplicate_message_is_collapsed() {
        let toasts = Toasts::new();
        toasts.notify_error("Network error, please try again later");
        toasts.notify_error("Network error, please try again later");
        assert_eq!(toasts.len(), 1);
    }

    #[test]
    fn test_toasts_expire() {
        let toasts = Toasts::new();
        let start = Instant::now();
        toasts.push_at("first", start);

        assert_eq!(toasts.active_at(start + Duration::from_secs(4)).len(), 1);
        assert!(toasts.active_at(start + TOAST_TTL).is_empty());

        // Expired toasts are pruned on the next push
        toasts.push_at("second", start + TOAST_TTL);
        let remaining: Vec<_> = toasts.drain().into_iter().map(|t| t.message).collect();
        assert_eq!(remaining, vec!["second".to_string()]);
    }

    #[test]
    fn test_oldest_toast_dropped_when_full() {
        let toasts = Toasts::new();
        let now = Instant::now();
        for i in 0..=MAX_TOASTS {
            toasts.push_at(&format!("error {}", i), now);
        }
        let messages: Vec<_> = toasts.active_at(now).into_iter().map(|t| t.message).collect();
        assert_eq!(messages.len(), MAX_TOASTS);
        assert_eq!(messages[0], "error 1");
    }

    #[test]
    fn test_drain_empties_queue() {
        let toasts = Toasts::new();
        toasts.notify_error("boom");
        assert_eq!(toasts.drain().len(), 1);
        assert!(toasts.is_empty());
    }
}
