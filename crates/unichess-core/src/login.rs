//! Credential submission.
//!
//! `LoginFlow` drives `Idle -> Submitting -> {Authenticated, Failed}`. On
//! success the token goes into the session store and the flow navigates
//! home; every failure becomes a notification. Submissions arriving while
//! one is already in flight are ignored.

use std::fmt;
use std::future::Future;
use std::sync::{Arc, Mutex, PoisonError};

use tracing::{debug, error, info, warn};

use crate::api::ApiError;
use crate::notify::Notifier;
use crate::routes::{Navigator, Route};
use crate::session::{SessionStore, SessionToken};

/// Username and password for a single submission. Never persisted.
#[derive(Clone)]
pub struct Credentials {
    username: String,
    password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn password(&self) -> &str {
        &self.password
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Backend that exchanges credentials for a session token
pub trait AuthApi: Send + Sync {
    fn login(
        &self,
        credentials: &Credentials,
    ) -> impl Future<Output = Result<SessionToken, ApiError>> + Send;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginState {
    Idle,
    Submitting,
    Authenticated,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    Authenticated,
    /// Carries the message that was reported to the user
    Failed(String),
    /// Another submission was already in flight
    Ignored,
}

pub struct LoginFlow<A> {
    api: A,
    store: Arc<dyn SessionStore>,
    notifier: Arc<dyn Notifier>,
    navigator: Arc<dyn Navigator>,
    state: Mutex<LoginState>,
}

impl<A: AuthApi> LoginFlow<A> {
    pub fn new(
        api: A,
        store: Arc<dyn SessionStore>,
        notifier: Arc<dyn Notifier>,
        navigator: Arc<dyn Navigator>,
    ) -> Self {
        Self {
            api,
            store,
            notifier,
            navigator,
            state: Mutex::new(LoginState::Idle),
        }
    }

    pub fn state(&self) -> LoginState {
        *self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Enter `Submitting`, or return `None` if a submission is in flight
    fn begin(&self) -> Option<Submission<'_>> {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        if *state == LoginState::Submitting {
            return None;
        }
        *state = LoginState::Submitting;
        Some(Submission {
            state: &self.state,
            finished: false,
        })
    }

    /// Submit credentials. They are dropped when this returns.
    ///
    /// Dropping the returned future before it completes puts the flow back
    /// to `Idle`.
    pub async fn submit(&self, credentials: Credentials) -> SubmitOutcome {
        let Some(submission) = self.begin() else {
            warn!("Login already in progress, ignoring submission");
            return SubmitOutcome::Ignored;
        };

        let result = self.api.login(&credentials).await;
        drop(credentials);

        match result {
            Ok(token) => {
                self.store.set_token(token);
                submission.finish(LoginState::Authenticated);
                info!("Login successful");
                self.navigator.navigate(Route::Home);
                SubmitOutcome::Authenticated
            }
            Err(e) => {
                error!(error = %e, "Login failed");
                let message = e.user_message();
                self.notifier.notify_error(&message);
                submission.finish(LoginState::Failed);
                SubmitOutcome::Failed(message)
            }
        }
    }
}

/// Holds a flow in `Submitting` until finished or dropped
struct Submission<'a> {
    state: &'a Mutex<LoginState>,
    finished: bool,
}

impl Submission<'_> {
    fn finish(mut self, outcome: LoginState) {
        *self.state.lock().unwrap_or_else(PoisonError::into_inner) = outcome;
        self.finished = true;
    }
}

impl Drop for Submission<'_> {
    fn drop(&mut self) {
        if !self.finished {
            debug!("Login submission cancelled");
            *self.state.lock().unwrap_or_else(PoisonError::into_inner) = LoginState::Idle;
        }
    }
}

/// Form-local state of the login view
#[derive(Default)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

impl fmt::Debug for LoginForm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginForm")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

impl LoginForm {
    pub fn new() -> Self {
        Self::default()
    }

    /// Hand the entered credentials to the flow.
    ///
    /// The password is cleared whatever the outcome; the username stays for
    /// re-editing.
    pub async fn submit<A: AuthApi>(&mut self, flow: &LoginFlow<A>) -> SubmitOutcome {
        let password = std::mem::take(&mut self.password);
        let credentials = Credentials::new(self.username.clone(), password);
        flow.submit(credentials).await
    }
}

/// End the session and return to the login view
pub fn logout(store: &dyn SessionStore, navigator: &dyn Navigator) {
    store.clear_token();
    info!("Logged out");
    navigator.navigate(Route::Login);
}
