use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use aoj::prelude::*;
use clap::{Parser, Subcommand};
use tracing_subscriber::{EnvFilter, fmt};

#[derive(Debug, Parser)]
#[command(name = "aoj", version, about = "Log in to the AOJ judge and manage local sessions")]
struct Cli {
    #[arg(
        long,
        env = "AOJ_CONFIG_DIR",
        global = true,
        help = "Session and config directory [default: ~/.aoj-cli]"
    )]
    config_dir: Option<PathBuf>,

    #[arg(long, env = "AOJ_BASE_URL", global = true, help = "Judge API base URL")]
    base_url: Option<String>,

    #[arg(short, long, global = true, conflicts_with = "quiet", help = "Debug logging")]
    verbose: bool,

    #[arg(short, long, global = true, help = "Only log warnings and errors")]
    quiet: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Log in and make the new session current.
    ///
    /// The password is read from AOJ_PASSWORD, or prompted for without echo.
    Login {
        #[arg(short, long, env = "AOJ_USERNAME")]
        username: Option<String>,
    },
    /// End the current session.
    Logout,
    /// Show the current session.
    Status,
    /// Delete expired sessions.
    Prune,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(&cli);

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            report(&e);
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(cli: &Cli) {
    let default_level = if cli.verbose {
        "debug"
    } else if cli.quiet {
        "warn"
    } else {
        "info"
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .init();
}

async fn run(cli: Cli) -> Result<()> {
    let mut config = AojConfig::load(cli.config_dir)?;
    if let Some(base_url) = cli.base_url {
        config = config.with_base_url(base_url);
    }
    tracing::debug!(
        config_dir = %config.config_dir.display(),
        base_url = %config.base_url,
        "configuration loaded"
    );

    let store = FileSessionStore::new(config.store_config());
    match cli.command {
        Command::Login { username } => login(&config, store, username).await,
        Command::Logout => logout(&config, store).await,
        Command::Status => status(&store),
        Command::Prune => prune_sessions(&store),
    }
}

async fn login(config: &AojConfig, store: FileSessionStore, username: Option<String>) -> Result<()> {
    let username = match username {
        Some(username) => username,
        None => prompt("Username: ")?,
    };
    let password = read_password(std::env::var("AOJ_PASSWORD").ok())?;

    let workflow = LoginWorkflow::new(AojAuthGateway::new(config.gateway_config())?, store);
    let outcome = workflow
        .execute(LoginRequest::new(username, password))
        .await?;

    println!("Logged in as {}", outcome.username);
    Ok(())
}

async fn logout(config: &AojConfig, store: FileSessionStore) -> Result<()> {
    let workflow = LogoutWorkflow::new(AojAuthGateway::new(config.gateway_config())?, store);
    match workflow.execute().await {
        Ok(username) => {
            println!("Logged out {username}");
            Ok(())
        }
        Err(e) if e.is(ErrorKind::NotFound) => {
            println!("Not logged in");
            Ok(())
        }
        Err(e) => Err(e),
    }
}

fn status(store: &FileSessionStore) -> Result<()> {
    let session = current_session(store)?;
    println!("Logged in as {}", session.username());
    println!("Session:    {}", session.id().masked());
    println!("Expires in: {}", format_remaining(&session));
    Ok(())
}

fn prune_sessions(store: &FileSessionStore) -> Result<()> {
    let report = prune(store)?;
    println!("Removed {} expired session(s)", report.deleted);
    if report.cleared_current {
        println!("Cleared stale current session");
    }
    Ok(())
}

/// Reads one line from stdin after printing `label` on stderr.
fn prompt(label: &str) -> Result<String> {
    let io_error = |e: io::Error| Error::internal("failed to read from terminal").with_source(e);

    let mut stderr = io::stderr();
    stderr.write_all(label.as_bytes()).map_err(io_error)?;
    stderr.flush().map_err(io_error)?;

    let mut line = String::new();
    io::stdin().lock().read_line(&mut line).map_err(io_error)?;
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}

/// Uses `from_env` when set, otherwise asks on the terminal with echo off.
fn read_password(from_env: Option<String>) -> Result<String> {
    match from_env {
        Some(password) => Ok(password),
        None => rpassword::prompt_password("Password: ")
            .map_err(|e| Error::internal("failed to read password").with_source(e)),
    }
}

fn format_remaining(session: &Session) -> String {
    let remaining = session.remaining_time();
    format!(
        "{}h {:02}m",
        remaining.num_hours(),
        remaining.num_minutes() % 60
    )
}

fn report(err: &Error) {
    eprintln!("error: {}", err.chain());
    let hint = match err.kind() {
        ErrorKind::Unauthorized => "check your credentials, or run `aoj login`",
        ErrorKind::NetworkError => "could not reach AOJ, check your connection",
        ErrorKind::ServiceUnavailable => "AOJ is temporarily unavailable",
        _ => return,
    };
    if err.kind().is_retryable() {
        eprintln!("hint: {hint}, then try again");
    } else {
        eprintln!("hint: {hint}");
    }
}
