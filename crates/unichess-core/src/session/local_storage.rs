use std::collections::BTreeMap;
use std::path::PathBuf;

use anyhow::{Context, Result};
use tracing::{debug, warn};

use super::{SessionStore, SessionStrategy, SessionToken};

/// Key holding the raw token string
pub const TOKEN_KEY: &str = "token";

/// Subdirectory of the data directory holding one file per origin
const STORAGE_DIR: &str = "local_storage";

/// Origin-scoped persistent key/value storage.
///
/// The token survives restarts with no expiry. There is no change
/// notification; every read goes back to the file.
pub struct LocalStorage {
    path: PathBuf,
}

impl LocalStorage {
    pub fn new(data_dir: PathBuf, origin: &str) -> Self {
        let path = data_dir
            .join(STORAGE_DIR)
            .join(format!("{}.json", origin_slug(origin)));
        Self { path }
    }

    pub fn get_item(&self, key: &str) -> Result<Option<String>> {
        Ok(self.read_all()?.remove(key))
    }

    pub fn set_item(&self, key: &str, value: &str) -> Result<()> {
        let mut items = self.read_all()?;
        items.insert(key.to_string(), value.to_string());
        self.write_all(&items)
    }

    pub fn remove_item(&self, key: &str) -> Result<()> {
        let mut items = self.read_all()?;
        if items.remove(key).is_some() {
            self.write_all(&items)?;
        }
        Ok(())
    }

    fn read_all(&self) -> Result<BTreeMap<String, String>> {
        if !self.path.exists() {
            return Ok(BTreeMap::new());
        }
        let contents = std::fs::read_to_string(&self.path)
            .context("Failed to read local storage")?;
        serde_json::from_str(&contents).context("Failed to parse local storage")
    }

    fn write_all(&self, items: &BTreeMap<String, String>) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(items)?;
        std::fs::write(&self.path, contents).context("Failed to write local storage")?;
        Ok(())
    }
}

/// File-safe name for an origin such as `http://localhost:8000`
fn origin_slug(origin: &str) -> String {
    origin
        .trim_end_matches('/')
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '.' { c } else { '_' })
        .collect()
}

impl SessionStore for LocalStorage {
    fn token(&self) -> Option<SessionToken> {
        match self.get_item(TOKEN_KEY) {
            Ok(value) => value.and_then(SessionToken::new),
            Err(e) => {
                warn!(error = %e, "Failed to read token from local storage");
                None
            }
        }
    }

    fn set_token(&self, token: SessionToken) {
        match self.set_item(TOKEN_KEY, token.as_str()) {
            Ok(()) => debug!(path = %self.path.display(), "Token written to local storage"),
            Err(e) => warn!(error = %e, "Failed to write token to local storage"),
        }
    }

    fn clear_token(&self) {
        if let Err(e) = self.remove_item(TOKEN_KEY) {
            warn!(error = %e, "Failed to remove token from local storage");
        }
    }

    fn strategy(&self) -> SessionStrategy {
        SessionStrategy::LocalStorage
    }
}
