//! Mount-time redirect for the login view.
//!
//! The check runs once per mount. It does not watch the store afterwards;
//! coming back to the login route only re-runs it because the view mounts
//! again.

use std::sync::Arc;

use tracing::debug;

use crate::login::LoginForm;
use crate::routes::{Navigator, Route};
use crate::session::SessionStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardDecision {
    /// Already authenticated; navigation to the route was requested
    Redirect(Route),
    /// No session; show the login form
    Proceed,
}

pub struct SessionGuard {
    store: Arc<dyn SessionStore>,
    navigator: Arc<dyn Navigator>,
}

impl SessionGuard {
    pub fn new(store: Arc<dyn SessionStore>, navigator: Arc<dyn Navigator>) -> Self {
        Self { store, navigator }
    }

    pub fn check(&self) -> GuardDecision {
        if self.store.token().is_some() {
            debug!(strategy = %self.store.strategy(), "Session present, leaving login view");
            self.navigator.navigate(Route::Home);
            GuardDecision::Redirect(Route::Home)
        } else {
            GuardDecision::Proceed
        }
    }
}

/// Result of mounting the login view
#[derive(Debug)]
pub enum LoginView {
    Redirected,
    Form(LoginForm),
}

/// Mount the login view: run the guard, then hand out a fresh form if the
/// client is not authenticated.
pub fn mount_login_view(guard: &SessionGuard) -> LoginView {
    match guard.check() {
        GuardDecision::Redirect(_) => LoginView::Redirected,
        GuardDecision::Proceed => LoginView::Form(LoginForm::new()),
    }
}
