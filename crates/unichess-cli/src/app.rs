//! Application state for the unichess terminal client.
//!
//! `App` wires the core together: configuration, the selected session
//! store, the API client, the notification queue and the navigation
//! history.

use std::io::{self, Write};
use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{debug, warn};

use unichess_core::session;
use unichess_core::{
    logout, mount_login_view, ApiClient, Config, History, LoginFlow, LoginView, Navigator, Notifier,
    Route, SessionGuard, SessionStore, SessionStrategy, SubmitOutcome, Toasts,
};

/// Environment variables that pre-fill the login prompts
const USERNAME_ENV: &str = "UNICHESS_USERNAME";
const PASSWORD_ENV: &str = "UNICHESS_PASSWORD";

pub struct App {
    pub config: Config,
    pub store: Arc<dyn SessionStore>,
    pub api: ApiClient,
    pub toasts: Arc<Toasts>,
    pub history: Arc<History>,
}

impl App {
    /// Create a new application instance from the saved configuration
    pub fn new() -> Result<Self> {
        let config = match Config::load() {
            Ok(c) => c,
            Err(e) => {
                warn!(error = %e, "Failed to load config, using defaults");
                Config::default()
            }
        };
        let store = session::open(&config)?;
        Self::with_store(config, store)
    }

    pub fn with_store(config: Config, store: Arc<dyn SessionStore>) -> Result<Self> {
        debug!(environment = ?config.environment, api_url = config.api_url(), "Config loaded");
        let api = ApiClient::new(config.api_url())?;

        Ok(Self {
            config,
            store,
            api,
            toasts: Arc::new(Toasts::new()),
            history: Arc::new(History::new(Route::Home)),
        })
    }

    // =========================================================================
    // Authentication
    // =========================================================================

    pub fn is_authenticated(&self) -> bool {
        self.store.is_authenticated()
    }

    /// Mount the login view and, if not redirected, run one submission.
    pub async fn login(&mut self) -> Result<()> {
        self.history.navigate(Route::Login);
        let guard = SessionGuard::new(self.store.clone(), self.history.clone());

        let mut form = match mount_login_view(&guard) {
            LoginView::Redirected => {
                println!("Already logged in.");
                return Ok(());
            }
            LoginView::Form(form) => form,
        };

        form.username = match std::env::var(USERNAME_ENV) {
            Ok(username) => username,
            Err(_) => prompt_username(self.config.last_username.as_deref())?,
        };
        form.password = match std::env::var(PASSWORD_ENV) {
            Ok(password) => password,
            Err(_) => rpassword::prompt_password("Password: ")?,
        };

        let flow = LoginFlow::new(
            self.api.clone(),
            self.store.clone(),
            self.toasts.clone(),
            self.history.clone(),
        );
        println!("\nAuthenticating...");

        if form.submit(&flow).await == SubmitOutcome::Authenticated {
            self.config.last_username = Some(form.username);
            if let Err(e) = self.config.save() {
                warn!(error = %e, "Failed to save config");
            }
            println!("Login successful!");
            if self.store.strategy() == SessionStrategy::Memory {
                println!("Note: the memory session store does not outlive this process.");
            }
        }
        Ok(())
    }

    /// Navigate to a page. The login page goes through the session guard.
    pub async fn open(&mut self, route: Route) -> Result<()> {
        if route == Route::Login {
            return self.login().await;
        }
        self.history.navigate(route);
        println!("Opened {}", route);
        Ok(())
    }

    pub fn logout(&self) {
        logout(self.store.as_ref(), self.history.as_ref());
        println!("Logged out.");
    }

    /// One-line description of the session state
    pub fn status(&self) -> String {
        let strategy = self.store.strategy();
        if self.is_authenticated() {
            format!(
                "Logged in ({} session, lasts {}) against {}",
                strategy,
                strategy.lifetime(),
                self.config.api_url()
            )
        } else {
            format!("Not logged in ({} session) against {}", strategy, self.config.api_url())
        }
    }

    // =========================================================================
    // Account requests
    // =========================================================================

    pub async fn register(&self, email: &str) -> Result<()> {
        let password = match std::env::var(PASSWORD_ENV) {
            Ok(password) => password,
            Err(_) => rpassword::prompt_password("Choose a password: ")?,
        };
        match self.api.register(email, &password).await {
            Ok(user) => println!("Created account #{} for {}", user.id, user.email),
            Err(e) => self.report(&e.user_message()),
        }
        Ok(())
    }

    pub async fn show_user(&self, uid: i64) -> Result<()> {
        let api = match self.store.token() {
            Some(token) => self.api.with_token(token),
            None => self.api.clone(),
        };
        match api.fetch_user(uid).await {
            Ok(user) => println!("#{} {}", user.id, user.email),
            Err(e) => self.report(&e.user_message()),
        }
        Ok(())
    }

    fn report(&self, message: &str) {
        self.toasts.notify_error(message);
    }

    /// Print and clear any pending notifications
    pub fn flush_notifications(&self) {
        for toast in self.toasts.drain() {
            eprintln!("error: {}", toast.message);
        }
    }
}

fn prompt_username(last_username: Option<&str>) -> Result<String> {
    match last_username {
        Some(last) => print!("Username [{}]: ", last),
        None => print!("Username: "),
    }
    io::stdout().flush()?;

    let mut input = String::new();
    io::stdin()
        .read_line(&mut input)
        .context("Failed to read username")?;
    let input = input.trim();

    Ok(match last_username {
        Some(last) if input.is_empty() => last.to_string(),
        _ => input.to_string(),
    })
}
