//! `portico-tui`: terminal console for the portico administration API.
//!
//! One screen per managed resource (announcements, documents, galleries,
//! news, violations, roles, users), navigable via number keys 1-7. Each
//! screen owns a paginated list query with filters, a create/edit form
//! and confirmations for deletes and lifecycle transitions.
//!
//! Logs are written to a file (default `/tmp/portico-tui.log`) to avoid
//! corrupting the terminal UI.

mod action;
mod app;
mod component;
mod data_bridge;
mod event;
mod screen;
mod screens;
mod theme;
mod tui;
mod widgets;

use std::path::PathBuf;

use clap::Parser;
use color_eyre::eyre::{Result, WrapErr, bail, eyre};
use secrecy::SecretString;
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use portico_config::{Profile, auth_with_secret, config_path, profile_to_connection_config};
use portico_core::{ConnectionConfig, Controller};

use crate::app::App;

/// Terminal console for managing portico content.
#[derive(Parser, Debug)]
#[command(name = "portico-tui", version, about)]
struct Cli {
    /// Config profile to use
    #[arg(short = 'p', long, env = "PORTICO_PROFILE")]
    profile: Option<String>,

    /// API base URL (overrides the profile)
    #[arg(short = 'u', long, env = "PORTICO_API_URL")]
    api_url: Option<String>,

    /// Bearer token or API key (overrides the profile's credentials)
    #[arg(long, env = "PORTICO_TOKEN", hide_env_values = true)]
    token: Option<String>,

    /// Log file path
    #[arg(long, default_value = "/tmp/portico-tui.log")]
    log_file: PathBuf,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

/// File-based tracing; stdout and stderr belong to the terminal UI.
/// Hold the returned guard until exit so buffered lines are flushed.
fn setup_tracing(cli: &Cli) -> WorkerGuard {
    let log_level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "portico_tui={log_level},portico_core={log_level},portico_api={log_level}"
        ))
    });

    let log_dir = cli
        .log_file
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or(std::path::Path::new("/tmp"));
    let log_filename = cli
        .log_file
        .file_name()
        .unwrap_or(std::ffi::OsStr::new("portico-tui.log"));

    let file_appender = tracing_appender::rolling::never(log_dir, log_filename);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_writer(non_blocking)
                .with_ansi(false)
                .with_target(true)
                .with_thread_ids(true),
        )
        .init();

    guard
}

/// Flags win over the profile, the profile wins over `[defaults]`.
fn build_connection_config(cli: &Cli) -> Result<ConnectionConfig> {
    let cfg = portico_config::load_config_or_default();
    let name = cfg.active_profile_name(cli.profile.as_deref());

    let mut profile = match cfg.profiles.get(&name) {
        Some(profile) => profile.clone(),
        None if cli.profile.is_some() => {
            bail!(
                "profile '{name}' not found in {}",
                config_path().display()
            );
        }
        None => {
            let url = cli.api_url.as_deref().ok_or_else(|| {
                eyre!(
                    "no API configured: run `portico config init` or pass --api-url (config: {})",
                    config_path().display()
                )
            })?;
            let mut profile = Profile::new(url);
            if cli.token.is_none() {
                profile.auth_mode = "none".into();
            }
            profile
        }
    };
    if let Some(url) = &cli.api_url {
        profile.api_url.clone_from(url);
    }

    // A flag token replaces the credential chain entirely
    let secret = cli.token.clone().map(SecretString::from);
    let mut lookup = profile.clone();
    if secret.is_some() {
        lookup.auth_mode = "none".into();
    }

    let mut config = profile_to_connection_config(&lookup, &name, &cfg.defaults)
        .wrap_err_with(|| format!("invalid profile '{name}'"))?;
    if let Some(secret) = secret {
        config.auth = auth_with_secret(&profile, secret);
    }
    Ok(config)
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Hooks go in before the terminal enters raw mode
    tui::install_hooks()?;

    let _log_guard = setup_tracing(&cli);

    let config = build_connection_config(&cli)?;
    info!(url = %config.url, "starting portico-tui");

    let controller = Controller::new(config);
    controller
        .connect()
        .await
        .wrap_err("could not reach the portico API")?;

    let screens = screens::create_screens(&controller).await?;
    let mut app = App::new(controller, screens);
    app.run().await?;

    Ok(())
}
