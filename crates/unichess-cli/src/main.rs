//! unichess - terminal client for the unichess chess backend.
//!
//! Logs in against the configured API, keeps the session token in the
//! configured session store, and reports failures as notifications.

mod app;

use std::ffi::OsString;
use std::io;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use unichess_core::{Config, Route};

use app::App;

// ============================================================================
// Constants
// ============================================================================

/// When set, logs are also written to `unichess.log` in the cache directory
const LOG_FILE_ENV: &str = "UNICHESS_LOG_FILE";

const LOG_FILE_NAME: &str = "unichess.log";

const USAGE: &str = "\
Usage: unichess <command>

Commands:
  login            Log in (skipped when a session already exists)
  logout           End the current session
  status           Show whether a session is present
  register <email> Create a new account
  user <id>        Look up a user with the current session
  open <path>      Navigate to a page (/, /login, /play, /r)
  help             Show this message";

#[derive(Debug, PartialEq, Eq)]
enum Command {
    Login,
    Logout,
    Status,
    Register(String),
    User(i64),
    Open(Route),
    Help,
}

fn parse_command(args: &[String]) -> Result<Command> {
    let Some(name) = args.first() else {
        return Ok(Command::Status);
    };
    let command = match name.as_str() {
        "login" => Command::Login,
        "logout" => Command::Logout,
        "status" => Command::Status,
        "register" => match args.get(1) {
            Some(email) => Command::Register(email.clone()),
            None => bail!("register needs an email address"),
        },
        "user" => {
            let id = args.get(1).context("user needs an id")?;
            let id = id
                .parse()
                .with_context(|| format!("Invalid user id: {}", id))?;
            Command::User(id)
        }
        "open" => {
            let path = args.get(1).context("open needs a path")?;
            match Route::from_path(path) {
                Some(route) => Command::Open(route),
                None => bail!("Unknown page: {}", path),
            }
        }
        "help" | "-h" | "--help" => Command::Help,
        other => bail!("Unknown command: {}\n\n{}", other, USAGE),
    };
    Ok(command)
}

/// Directory for the log file, when file logging is switched on
fn log_dir(flag: Option<OsString>) -> Option<PathBuf> {
    if flag.is_none() {
        return None;
    }
    match Config::default().cache_dir() {
        Ok(dir) => Some(dir),
        Err(e) => {
            eprintln!("warning: file logging disabled: {}", e);
            None
        }
    }
}

/// Initialize the tracing subscriber for logging
fn init_tracing(log_dir: Option<PathBuf>) -> Option<WorkerGuard> {
    // Use RUST_LOG env var to control log level (e.g., RUST_LOG=debug)
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    let (file_layer, guard) = match log_dir {
        Some(dir) => {
            let appender = tracing_appender::rolling::never(dir, LOG_FILE_NAME);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            (Some(fmt::layer().with_writer(writer).with_ansi(false)), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(file_layer)
        .with(filter)
        .init();

    guard
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();

    let _log_guard = init_tracing(log_dir(std::env::var_os(LOG_FILE_ENV)));

    let args: Vec<String> = std::env::args().skip(1).collect();
    let command = parse_command(&args)?;
    if command == Command::Help {
        println!("{}", USAGE);
        return Ok(());
    }

    let mut app = App::new()?;
    info!(command = ?command, strategy = %app.store.strategy(), "unichess starting");

    let result = match command {
        Command::Login => app.login().await,
        Command::Logout => {
            app.logout();
            Ok(())
        }
        Command::Status => {
            println!("{}", app.status());
            Ok(())
        }
        Command::Register(email) => app.register(&email).await,
        Command::User(id) => app.show_user(id).await,
        Command::Open(route) => app.open(route).await,
        Command::Help => Ok(()),
    };

    app.flush_notifications();
    result
}
