use std::path::PathBuf;

use anyhow::{Context, Result};
use cookie::{Cookie, SameSite};
use time::{Duration, OffsetDateTime};
use tracing::{debug, warn};

use super::{SessionStore, SessionStrategy, SessionToken};

/// Cookie jar file name in cache directory
const COOKIE_FILE: &str = "session_cookie";

/// Name of the cookie holding the session token
pub const COOKIE_NAME: &str = "token";

/// Cookie lifetime in days.
const COOKIE_EXPIRY_DAYS: i64 = 1;

const COOKIE_PATH: &str = "/";

/// Cookie-backed session store.
///
/// The token survives restarts until the cookie expires. The cookie is kept
/// on disk as its `Set-Cookie` line and re-read on every access so expiry
/// is honoured mid-session.
pub struct CookieStore {
    cache_dir: PathBuf,
    domain: String,
    secure: bool,
}

impl CookieStore {
    pub fn new(cache_dir: PathBuf, domain: impl Into<String>, secure: bool) -> Self {
        Self {
            cache_dir,
            domain: domain.into(),
            secure,
        }
    }

    /// Build the cookie for a freshly issued token
    pub fn issue(&self, token: &SessionToken, now: OffsetDateTime) -> Cookie<'static> {
        Cookie::build((COOKIE_NAME, token.as_str().to_string()))
            .expires(now + Duration::days(COOKIE_EXPIRY_DAYS))
            .path(COOKIE_PATH)
            .domain(self.domain.clone())
            .secure(self.secure)
            .same_site(SameSite::Strict)
            .build()
    }

    /// Load the cookie from disk. An expired cookie is deleted and reads
    /// as `None`.
    pub fn load(&self) -> Result<Option<Cookie<'static>>> {
        let path = self.cookie_path();
        if !path.exists() {
            return Ok(None);
        }
        let contents = std::fs::read_to_string(&path)
            .context("Failed to read session cookie")?;
        let cookie = Cookie::parse(contents.trim().to_string())
            .context("Failed to parse session cookie")?;

        let expired = cookie
            .expires_datetime()
            .map(|expires| expires <= OffsetDateTime::now_utc())
            .unwrap_or(false);
        if expired {
            debug!(expires = ?cookie.expires_datetime(), "Session cookie expired");
            self.remove()?;
            return Ok(None);
        }
        Ok(Some(cookie))
    }

    fn save(&self, cookie: &Cookie<'_>) -> Result<()> {
        std::fs::create_dir_all(&self.cache_dir)?;
        std::fs::write(self.cookie_path(), cookie.to_string())
            .context("Failed to write session cookie")?;
        Ok(())
    }

    fn remove(&self) -> Result<()> {
        let path = self.cookie_path();
        if path.exists() {
            std::fs::remove_file(path)?;
        }
        Ok(())
    }

    fn cookie_path(&self) -> PathBuf {
        self.cache_dir.join(COOKIE_FILE)
    }
}

impl SessionStore for CookieStore {
    fn token(&self) -> Option<SessionToken> {
        match self.load() {
            Ok(cookie) => cookie.and_then(|c| SessionToken::new(c.value())),
            Err(e) => {
                warn!(error = %e, "Failed to load session cookie");
                None
            }
        }
    }

    fn set_token(&self, token: SessionToken) {
        let cookie = self.issue(&token, OffsetDateTime::now_utc());
        match self.save(&cookie) {
            Ok(()) => debug!(domain = %self.domain, "Session cookie set"),
            Err(e) => warn!(error = %e, "Failed to save session cookie"),
        }
    }

    fn clear_token(&self) {
        if let Err(e) = self.remove() {
            warn!(error = %e, "Failed to remove session cookie");
        }
    }

    fn strategy(&self) -> SessionStrategy {
        SessionStrategy::Cookie
    }
}
