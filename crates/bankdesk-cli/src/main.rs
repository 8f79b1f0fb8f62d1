//! bankdesk - a terminal front-end for the bankdesk banking backend.
//!
//! Each subcommand is one navigation: it passes the route guard, runs the
//! matching flow, and prints a plain-text view of the result. The session
//! persists between runs in the configured credential store.

mod commands;
mod prompt;
mod view;

use std::io;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use bankdesk_core::config::{ENV_API_URL, ENV_PROFILE, ENV_STORAGE};
use bankdesk_core::models::AccountType;
use bankdesk_core::{App, AuthFlow, BankClient, Config};

use commands::Runner;
use prompt::Terminal;

/// Log file name prefix inside `log_dir`
const LOG_FILE_PREFIX: &str = "bankdesk.log";

#[derive(Parser, Debug)]
#[command(name = "bankdesk")]
#[command(about = "Terminal client for the bankdesk banking backend", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Backend base URL
    #[arg(long, global = true, env = ENV_API_URL)]
    api_url: Option<String>,

    /// Session profile; runs with the same profile share one session
    #[arg(long, global = true, env = ENV_PROFILE)]
    profile: Option<String>,

    /// Credential store (file, keyring, memory)
    #[arg(long, global = true, env = ENV_STORAGE)]
    storage: Option<String>,
}

impl Cli {
    /// Command-line values keyed by the environment variable they stand in for
    fn lookup(&self, key: &str) -> Option<String> {
        match key {
            ENV_API_URL => self.api_url.clone(),
            ENV_PROFILE => self.profile.clone(),
            ENV_STORAGE => self.storage.clone(),
            _ => None,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Log in and show your accounts
    Login {
        #[arg(short, long)]
        username: Option<String>,
    },

    /// Register a new user
    Signup {
        #[arg(long)]
        first_name: String,
        #[arg(long)]
        last_name: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        phone: String,
        #[arg(short, long)]
        username: String,
    },

    /// Show your accounts
    Home,

    /// Open a new account
    CreateAccount {
        /// Account type (current, savings)
        #[arg(short = 't', long = "type")]
        account_type: AccountType,
    },

    /// Log out and forget the stored session
    Logout,

    /// Show whether a session is stored, without contacting the backend
    Status,

    /// Navigate to a client route such as /home or /createAccount
    Open { path: String },

    /// Trade the stored refresh token for a new token pair
    #[cfg(feature = "token-refresh")]
    Refresh,
}

/// Initialize the tracing subscriber for logging
fn init_tracing(log_dir: Option<&Path>) -> Option<WorkerGuard> {
    // RUST_LOG controls the level (e.g., RUST_LOG=bankdesk_core=debug)
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    let (file_layer, guard) = match log_dir {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, LOG_FILE_PREFIX);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            (
                Some(fmt::layer().with_writer(writer).with_ansi(false)),
                Some(guard),
            )
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

/// Load the config file, falling back to defaults when it is unreadable
fn load_config() -> (Config, Option<String>) {
    match Config::load() {
        Ok(config) => (config, None),
        Err(e) => (Config::default(), Some(format!("{:#}", e))),
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<ExitCode> {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    let (mut config, load_error) = load_config();
    let log_dir: Option<PathBuf> = config.log_dir.clone();
    let _guard = init_tracing(log_dir.as_deref());
    if let Some(e) = load_error {
        warn!(error = %e, "Could not load config file, using defaults");
    }

    config
        .apply_overrides(|key| cli.lookup(key))
        .context("Invalid configuration")?;
    info!(
        api = %config.api_base_url,
        profile = %config.profile,
        storage = %config.storage,
        "bankdesk starting"
    );

    let store = config.open_store()?;
    let client = BankClient::from_config(&config, store.clone())?;
    let mut runner = Runner::new(App::new(store), AuthFlow::new(client), Terminal);

    let ok = match cli.command {
        Command::Login { username } => runner.login(username).await?,
        Command::Signup {
            first_name,
            last_name,
            email,
            phone,
            username,
        } => {
            runner
                .sign_up(commands::Registration {
                    first_name,
                    last_name,
                    email,
                    phone_number: phone,
                    username,
                })
                .await?
        }
        Command::Home => runner.home().await?,
        Command::CreateAccount { account_type } => {
            runner.create_account(Some(account_type)).await?
        }
        Command::Logout => runner.logout().await,
        Command::Status => {
            println!("{}", view::render_status(&config, &runner.session()));
            true
        }
        Command::Open { path } => runner.open(&path).await?,
        #[cfg(feature = "token-refresh")]
        Command::Refresh => runner.refresh().await,
    };

    Ok(if ok { ExitCode::SUCCESS } else { ExitCode::FAILURE })
}
