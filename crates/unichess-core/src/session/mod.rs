//! Session store for the client's bearer token.
//!
//! This module provides:
//! - `SessionToken`: the opaque bearer credential issued at login
//! - `SessionStore`: the get/set/clear contract every consumer depends on
//! - Three persistence strategies, exactly one selected per deployment:
//!   - `CookieStore`: survives restarts, expires 1 day after login
//!   - `MemoryStore`: process lifetime only, notifies subscribers on write
//!   - `LocalStorage`: survives restarts indefinitely, no notification
//!
//! Stores are shared as `Arc<dyn SessionStore>` and injected into the
//! login flow and session guard.

pub mod cookie_store;
pub mod local_storage;
pub mod memory;

use std::fmt;
use std::sync::Arc;

use anyhow::Result;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::Config;

pub use cookie_store::{CookieStore, COOKIE_NAME};
pub use local_storage::LocalStorage;
pub use memory::MemoryStore;

/// Opaque bearer token issued by the backend.
///
/// Never parsed or validated. The empty string is the absent state, so a
/// `SessionToken` always holds a non-empty value.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct SessionToken(String);

impl SessionToken {
    pub fn new(value: impl Into<String>) -> Option<Self> {
        let value = value.into();
        if value.is_empty() {
            None
        } else {
            Some(Self(value))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Debug for SessionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SessionToken(<redacted>)")
    }
}

/// Which medium holds the session token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStrategy {
    #[default]
    Cookie,
    Memory,
    LocalStorage,
}

impl SessionStrategy {
    /// How long a token lives in this medium, for display
    pub fn lifetime(&self) -> &'static str {
        match self {
            SessionStrategy::Cookie => "1 day",
            SessionStrategy::Memory => "until exit",
            SessionStrategy::LocalStorage => "until logout",
        }
    }
}

impl fmt::Display for SessionStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SessionStrategy::Cookie => "cookie",
            SessionStrategy::Memory => "memory",
            SessionStrategy::LocalStorage => "local storage",
        };
        f.write_str(name)
    }
}

/// Holder of at most one session token.
///
/// Implementations never fail on write: persistence errors are logged and
/// the call returns normally.
pub trait SessionStore: Send + Sync {
    /// Current token, or `None` when unauthenticated
    fn token(&self) -> Option<SessionToken>;

    /// Replace the current token
    fn set_token(&self, token: SessionToken);

    /// Reset to the unauthenticated state
    fn clear_token(&self);

    fn strategy(&self) -> SessionStrategy;

    fn is_authenticated(&self) -> bool {
        self.token().is_some()
    }
}

/// Open the session store selected by the configuration.
pub fn open(config: &Config) -> Result<Arc<dyn SessionStore>> {
    let strategy = config.session_strategy;
    debug!(%strategy, environment = ?config.environment, "Opening session store");

    let store: Arc<dyn SessionStore> = match strategy {
        SessionStrategy::Cookie => Arc::new(CookieStore::new(
            config.cache_dir()?,
            config.cookie_domain()?,
            config.environment.is_production(),
        )),
        SessionStrategy::Memory => Arc::new(MemoryStore::new()),
        SessionStrategy::LocalStorage => {
            Arc::new(LocalStorage::new(config.data_dir()?, config.api_url()))
        }
    };
    Ok(store)
}
