//! Inkdesk - a terminal editor for the rich-text "About" page content.
//!
//! # Usage
//!
//! ```bash
//! inkdesk about.html
//! inkdesk --watch --placeholder "Tell attendees about the event" about.html
//! inkdesk --token "$JWT" --require-session about.html
//! inkdesk --normalize about.html
//! ```

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use inkdesk::app::App;
use inkdesk::config::{
    ConfigFlags, ThemeMode, clear_config_flags, default_session_path, global_config_path,
    load_config_flags, local_override_path, parse_flag_tokens, save_config_flags,
};
use inkdesk::context::AppContext;
use inkdesk::document::Document;
use inkdesk::session::SessionStore;
use inkdesk::store::{ContentStore, FileContentStore};

/// Edit rich-text page content in the terminal
#[derive(Parser, Debug)]
#[command(name = "inkdesk", version, about, long_about = None)]
struct Cli {
    /// HTML content file to edit (created on first save)
    #[arg(value_name = "FILE")]
    file: PathBuf,

    /// Watch file for changes and auto-reload
    #[arg(short, long)]
    watch: bool,

    /// Open without saving; the editor and toolbar are frozen
    #[arg(long)]
    read_only: bool,

    /// Freeze editing unless a valid session is signed in
    #[arg(long)]
    require_session: bool,

    /// Text shown while the page is empty
    #[arg(long, value_name = "TEXT")]
    placeholder: Option<String>,

    /// Color theme
    #[arg(long, value_enum)]
    theme: Option<ThemeMode>,

    /// Sign in with a session token (stored for later runs)
    #[arg(long, value_name = "JWT")]
    token: Option<String>,

    /// Remove the stored session and exit
    #[arg(long)]
    logout: bool,

    /// Session file location
    #[arg(long, value_name = "PATH")]
    session_file: Option<PathBuf>,

    /// Write debug logs to a file instead of stderr
    #[arg(long, value_name = "PATH")]
    log_file: Option<PathBuf>,

    /// Print the canonical HTML of FILE and exit
    #[arg(long)]
    normalize: bool,

    /// Save current command-line flags as defaults
    #[arg(long)]
    save: bool,

    /// Clear saved defaults
    #[arg(long)]
    clear: bool,
}

fn init_logging(log_file: Option<&Path>) -> Result<()> {
    match log_file {
        Some(path) => {
            let file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("Failed to open log file {}", path.display()))?;
            tracing_subscriber::fmt()
                .with_env_filter(
                    EnvFilter::try_from_default_env()
                        .unwrap_or_else(|_| EnvFilter::new("inkdesk=debug")),
                )
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .init();
        }
        None => {
            tracing_subscriber::fmt()
                .with_env_filter(
                    EnvFilter::from_default_env().add_directive(tracing::Level::WARN.into()),
                )
                .with_writer(std::io::stderr)
                .init();
        }
    }
    Ok(())
}

fn print_normalized(path: &Path) -> Result<()> {
    let loaded = FileContentStore::new(path)
        .load()
        .with_context(|| format!("Failed to load {}", path.display()))?;
    println!("{}", Document::parse(&loaded.html).to_html());
    Ok(())
}

fn main() -> Result<()> {
    let raw_args = std::env::args().collect::<Vec<_>>();
    let cli = Cli::parse();
    let global_path = global_config_path();
    let local_path = local_override_path();
    let cli_flags = parse_flag_tokens(&raw_args);

    if cli.clear {
        clear_config_flags(&global_path)?;
    }
    if cli.save {
        save_config_flags(&global_path, &cli_flags)?;
    }

    let file_flags = if cli.clear {
        ConfigFlags::default()
    } else {
        let global_flags = load_config_flags(&global_path)?;
        let local_flags = load_config_flags(&local_path)?;
        global_flags.union(&local_flags)
    };
    let effective = file_flags.union(&cli_flags);

    init_logging(effective.log_file.as_deref())?;

    if cli.normalize {
        return print_normalized(&cli.file);
    }

    let session_path = effective
        .session_file
        .clone()
        .unwrap_or_else(default_session_path);
    let mut ctx = AppContext::init(
        SessionStore::new(session_path),
        effective.theme.unwrap_or(ThemeMode::Auto),
        effective.require_session,
    );

    if cli.logout {
        ctx.sign_out().context("Failed to sign out")?;
        info!("signed out");
        println!("Signed out.");
        return Ok(());
    }
    if let Some(token) = &cli.token {
        let session = ctx.sign_in(token).context("Invalid session token")?;
        info!(user = %session.label(), "token accepted");
    }

    let mut app = App::new(cli.file, ctx)
        .with_watch(effective.watch)
        .with_read_only(effective.read_only)
        .with_placeholder(effective.placeholder.clone())
        .with_config_paths(
            Some(global_path.clone()),
            if local_path.exists() {
                Some(local_path.clone())
            } else {
                None
            },
        );

    let result = app.run().context("Application error");
    if let Err(err) = &result {
        warn!(error = %err, "editor stopped with an error");
    }
    app.into_context().teardown();
    result
}
