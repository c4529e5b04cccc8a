//! unichess-core - client-side session and authentication lifecycle.
//!
//! Acquires a bearer token from the login endpoint, keeps it in one of the
//! session store strategies, and uses its presence to gate the login view.

pub mod api;
pub mod config;
pub mod guard;
pub mod login;
pub mod models;
pub mod notify;
pub mod routes;
pub mod session;

#[cfg(test)]
mod testing;

pub use api::{ApiClient, ApiError};
pub use config::{Config, Environment};
pub use guard::{mount_login_view, GuardDecision, LoginView, SessionGuard};
pub use login::{logout, AuthApi, Credentials, LoginFlow, LoginForm, LoginState, SubmitOutcome};
pub use notify::{Notifier, Toast, Toasts};
pub use routes::{History, Navigator, Route};
pub use session::{SessionStore, SessionStrategy, SessionToken};
