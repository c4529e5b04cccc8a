use tokio::sync::watch;
use tracing::debug;

use super::{SessionStore, SessionStrategy, SessionToken};

/// Reactive in-memory session store.
///
/// The token lives for the lifetime of the process. Every write is pushed to
/// all subscribers before `set_token`/`clear_token` returns.
pub struct MemoryStore {
    tx: watch::Sender<Option<SessionToken>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(None);
        Self { tx }
    }

    /// Receiver that observes every subsequent token change
    pub fn subscribe(&self) -> watch::Receiver<Option<SessionToken>> {
        self.tx.subscribe()
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionStore for MemoryStore {
    fn token(&self) -> Option<SessionToken> {
        self.tx.borrow().clone()
    }

    fn set_token(&self, token: SessionToken) {
        // send_replace succeeds even with no live receivers
        self.tx.send_replace(Some(token));
        debug!(subscribers = self.tx.receiver_count(), "Session token set");
    }

    fn clear_token(&self) {
        self.tx.send_replace(None);
        debug!("Session token cleared");
    }

    fn strategy(&self) -> SessionStrategy {
        SessionStrategy::Memory
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn token(value: &str) -> SessionToken {
        SessionToken::new(value).expect("non-empty token")
    }

    #[test]
    fn test_fresh_store_is_absent() {
        let store = MemoryStore::new();
        assert!(store.token().is_none());
    }

    #[test]
    fn test_read_is_idempotent() {
        let store = MemoryStore::new();
        store.set_token(token("abc123"));
        assert_eq!(store.token(), store.token());
    }

    #[test]
    fn test_write_is_visible_immediately() {
        let store = MemoryStore::new();
        store.set_token(token("first"));
        assert_eq!(store.token(), Some(token("first")));

        store.set_token(token("second"));
        assert_eq!(store.token(), Some(token("second")));

        store.clear_token();
        assert!(store.token().is_none());
    }

    #[test]
    fn test_subscribers_observe_writes() {
        let store = MemoryStore::new();
        let mut rx = store.subscribe();
        assert!(!rx.has_changed().expect("sender alive"));

        store.set_token(token("abc123"));
        assert!(rx.has_changed().expect("sender alive"));
        assert_eq!(*rx.borrow_and_update(), Some(token("abc123")));

        store.clear_token();
        assert!(rx.has_changed().expect("sender alive"));
        assert!(rx.borrow_and_update().is_none());
    }
}
