//! Route table and navigation surface.

use std::fmt;
use std::sync::{Mutex, PoisonError};

use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Home,
    Login,
    Play,
    Redirect,
}

impl Route {
    pub fn path(&self) -> &'static str {
        match self {
            Route::Home => "/",
            Route::Login => "/login",
            Route::Play => "/play",
            Route::Redirect => "/r",
        }
    }

    /// Match a path, ignoring any query string or trailing slash
    pub fn from_path(path: &str) -> Option<Self> {
        let path = path.split(['?', '#']).next().unwrap_or(path);
        let path = if path.len() > 1 { path.trim_end_matches('/') } else { path };
        match path {
            "/" | "" => Some(Route::Home),
            "/login" => Some(Route::Login),
            "/play" => Some(Route::Play),
            "/r" => Some(Route::Redirect),
            _ => None,
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

/// Anything that can be asked to move the client to another route
pub trait Navigator: Send + Sync {
    fn navigate(&self, route: Route);
}

/// In-process navigation history.
///
/// Tracks the current route and every navigation request made since
/// creation.
pub struct History {
    inner: Mutex<HistoryInner>,
}

struct HistoryInner {
    current: Route,
    requests: Vec<Route>,
}

impl History {
    pub fn new(start: Route) -> Self {
        Self {
            inner: Mutex::new(HistoryInner {
                current: start,
                requests: Vec::new(),
            }),
        }
    }

    pub fn current(&self) -> Route {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner).current
    }

    pub fn requests(&self) -> Vec<Route> {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .requests
            .clone()
    }
}

impl Navigator for History {
    fn navigate(&self, route: Route) {
        let mut inner = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        debug!(from = %inner.current, to = %route, "Navigating");
        inner.current = route;
        inner.requests.push(route);
    }
}
