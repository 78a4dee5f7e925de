use anyhow::{Context, Result};
use clap::Parser;
use secrecy::SecretString;
use std::path::{Path, PathBuf};
use tokio::sync::mpsc;

use tgrss_dash::api::ApiClient;
use tgrss_dash::app::{App, AppEvent, ExitReason};
use tgrss_dash::config::{self, Config};
use tgrss_dash::session::SessionStore;
use tgrss_dash::ui;

#[derive(Parser, Debug)]
#[command(
    name = "tgrss-dash",
    about = "Terminal admin console for an RSS to Telegram push service"
)]
struct Args {
    /// Backend origin, e.g. https://push.example.com (overrides the config file)
    #[arg(long, value_name = "URL")]
    base_url: Option<String>,

    /// Store a new session token and start
    #[arg(long, value_name = "TOKEN", conflicts_with = "logout")]
    token: Option<String>,

    /// End the session on the server, forget the stored token and exit
    #[arg(long)]
    logout: bool,

    /// Use an alternate config file
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,
}

/// Create the config directory with user-only access.
fn prepare_config_dir(config_dir: &Path) -> Result<()> {
    if !config_dir.exists() {
        std::fs::create_dir_all(config_dir).context("Failed to create config directory")?;
    }

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let perms = std::fs::Permissions::from_mode(0o700);
        if let Err(e) = std::fs::set_permissions(config_dir, perms) {
            eprintln!(
                "Warning: could not restrict permissions on {}: {}",
                config_dir.display(),
                e
            );
        }
    }
    Ok(())
}

/// Log to a file in the config directory; stdout belongs to the TUI.
fn init_logging(config_dir: &Path) -> Result<()> {
    let log_path = config_dir.join("tgrss-dash.log");
    let file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
        .with_context(|| format!("Failed to open log file {}", log_path.display()))?;

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::sync::Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}

fn print_login_instructions(session: &SessionStore) {
    eprintln!("Error: Not logged in (no session at {})", session.path().display());
    eprintln!();
    eprintln!("Log in through the web dashboard, copy the session token, then run:");
    eprintln!("  tgrss-dash --base-url https://push.example.com --token <TOKEN>");
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config_dir = config::config_dir().context("Failed to locate config directory")?;
    prepare_config_dir(&config_dir)?;
    init_logging(&config_dir)?;

    let config_path = args
        .config
        .clone()
        .unwrap_or_else(|| config_dir.join("config.toml"));
    let config = Config::load(&config_path)
        .with_context(|| format!("Failed to load config from {}", config_path.display()))?;

    let base_url = args
        .base_url
        .clone()
        .or_else(|| config.base_url.clone());
    let session = SessionStore::in_dir(&config_dir);

    if args.logout {
        match (base_url.as_deref(), session.load()?) {
            (Some(base_url), Some(token)) => {
                let client = ApiClient::new(base_url, token, config.request_timeout())?;
                if let Err(e) = client.logout().await {
                    tracing::warn!(error = %e, "Server-side logout failed");
                    eprintln!("Warning: server logout failed ({}), forgetting the session anyway", e);
                }
            }
            (None, Some(_)) => {
                eprintln!("Warning: no base URL configured, only forgetting the local session");
            }
            (_, None) => {}
        }
        session.clear()?;
        println!("Logged out.");
        return Ok(());
    }

    let Some(base_url) = base_url else {
        anyhow::bail!(
            "No backend configured: pass --base-url or set base_url in {}",
            config_path.display()
        );
    };

    let token = match args.token {
        Some(token) => {
            let token = SecretString::from(token);
            session.store(&token).context("Failed to store session token")?;
            token
        }
        None => match session.load()? {
            Some(token) => token,
            None => {
                print_login_instructions(&session);
                std::process::exit(1);
            }
        },
    };

    let client = ApiClient::new(&base_url, token, config.request_timeout())
        .context("Failed to create API client")?;
    tracing::info!(base_url = %client.base_url(), "Starting dashboard");

    let mut app = App::new(client, config, session);
    let (event_tx, event_rx) = mpsc::channel::<AppEvent>(32);

    let exit = ui::run(&mut app, event_tx, event_rx).await?;

    match exit {
        ExitReason::Quit => println!("Goodbye!"),
        ExitReason::LoggedOut => println!("Logged out."),
        ExitReason::SessionExpired => {
            eprintln!("Session expired or invalid. Log in again with --token <TOKEN>.");
            std::process::exit(1);
        }
    }
    Ok(())
}
