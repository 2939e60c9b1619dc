//! Roomchat CLI - terminal client for room-based chat.
//!
//! This is the main binary entry point. See the `roomchat` library for the
//! core functionality.

use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use mimalloc::MiMalloc;
use roomchat::{app::headless::run_headless, tui, ChatApp, Config};

/// Global allocator configured per M-MIMALLOC-APPS guideline.
#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

/// Global flag for signal-triggered shutdown (as Arc for signal-hook compatibility)
static SHUTDOWN_FLAG: std::sync::LazyLock<Arc<AtomicBool>> =
    std::sync::LazyLock::new(|| Arc::new(AtomicBool::new(false)));

fn register_signal_handlers() -> Result<()> {
    use signal_hook::consts::signal::{SIGHUP, SIGINT, SIGTERM};
    use signal_hook::flag;
    flag::register(SIGINT, Arc::clone(&SHUTDOWN_FLAG))?;
    flag::register(SIGTERM, Arc::clone(&SHUTDOWN_FLAG))?;
    flag::register(SIGHUP, Arc::clone(&SHUTDOWN_FLAG))?;
    Ok(())
}

/// Load config and apply CLI overrides on top of file and environment.
fn effective_config(url: Option<String>, username: Option<String>) -> Result<Config> {
    let mut config = Config::load()?;
    if let Some(url) = url {
        config.set_key("relay_url", &url)?;
    }
    if let Some(username) = username {
        config.set_key("username", &username)?;
    }
    Ok(config)
}

/// Runs the client in line mode (no TUI).
///
/// Useful for scripting, CI, and terminals without full-screen support.
fn run_line_mode(config: &Config) -> Result<()> {
    register_signal_handlers()?;
    let mut app = ChatApp::new(config);
    log::info!("roomchat v{} started in headless mode", env!("CARGO_PKG_VERSION"));
    run_headless(&mut app, &SHUTDOWN_FLAG)?;
    println!("Shutting down...");
    Ok(())
}

/// Runs the interactive TUI.
fn run_interactive(config: &Config) -> Result<()> {
    register_signal_handlers()?;
    let mut app = ChatApp::new(config);
    log::info!("roomchat v{} started", env!("CARGO_PKG_VERSION"));
    tui::run_tui(&mut app, &SHUTDOWN_FLAG)
}

fn show_or_set_config(key: Option<String>, value: Option<String>) -> Result<()> {
    let mut config = Config::load()?;
    match (key, value) {
        (None, _) => println!("{}", serde_json::to_string_pretty(&config)?),
        (Some(key), None) => {
            let json = serde_json::to_value(&config)?;
            match json.get(&key) {
                Some(value) => println!("{value}"),
                None if roomchat::config::CONFIG_KEYS.contains(&key.as_str()) => println!("null"),
                None => anyhow::bail!("Unknown config key '{key}'"),
            }
        }
        (Some(key), Some(value)) => {
            config.set_key(&key, &value)?;
            config.save()?;
            println!("Saved {key} to {}", Config::config_path()?.display());
        }
    }
    Ok(())
}

// CLI
#[derive(Parser)]
#[command(name = "roomchat")]
#[command(version)]
#[command(about = "Terminal client for transient room-based chat")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Connect to the relay and start chatting
    Start {
        /// Relay URL (ws://, wss://, http:// or https://)
        #[arg(long)]
        url: Option<String>,
        /// Username to pre-fill in the lobby
        #[arg(long)]
        username: Option<String>,
        /// Line mode on stdin/stdout instead of the TUI
        #[arg(long)]
        headless: bool,
    },
    /// Show the effective config, one key, or persist a key
    Config {
        /// Config key (relay_url, username, message_log_limit)
        key: Option<String>,
        /// New value; empty string unsets optional keys
        value: Option<String>,
    },
}

fn init_logging() -> Result<()> {
    // Log to a file so the TUI is not corrupted.
    let log_path = Config::log_file_path()?;
    let log_file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
        .with_context(|| format!("Failed to create log file at {}", log_path.display()))?;
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Pipe(Box::new(log_file)))
        .format_timestamp_secs()
        .init();
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging()?;

    // Log panics and restore the terminal before the default handler prints.
    let default_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        log::error!("PANIC: {:?}", panic_info);
        tui::restore_terminal();
        default_hook(panic_info);
    }));

    match cli.command {
        Commands::Start {
            url,
            username,
            headless,
        } => {
            let config = effective_config(url, username)?;
            if headless {
                run_line_mode(&config)?;
            } else {
                run_interactive(&config)?;
            }
        }
        Commands::Config { key, value } => show_or_set_config(key, value)?,
    }

    Ok(())
}
