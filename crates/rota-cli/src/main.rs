//! `rota`: terminal UI for the volunteer roster.
//!
//! # Usage
//!
//! ```
//! rota --url http://localhost:8080 --user ana --password secret
//! rota --config ~/.config/rota/config.toml --log-file /tmp/rota.log
//! ```

mod app;
mod client;
mod ui;

use std::{
  fs::File,
  io,
  path::{Path, PathBuf},
  sync::Mutex,
  time::Duration,
};

use anyhow::{Context, Result};
use app::App;
use chrono::Local;
use clap::Parser;
use client::{ApiClient, ApiConfig};
use crossterm::{
  event::{self, Event},
  execute,
  terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Terminal, backend::CrosstermBackend};
use rota_core::{identity::AuthEvent, session::RosterSession};
use serde::Deserialize;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

// ─── CLI args ─────────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(name = "rota", about = "Terminal UI for the volunteer roster")]
struct Args {
  /// Path to a TOML config file (url, username, password).
  #[arg(short, long, value_name = "FILE")]
  config: Option<PathBuf>,

  /// Base URL of the roster server (default: http://localhost:8080).
  #[arg(long, env = "ROTA_URL")]
  url: Option<String>,

  /// Account name.
  #[arg(long, env = "ROTA_USER")]
  user: Option<String>,

  /// Account password (plaintext).
  #[arg(long, env = "ROTA_PASSWORD")]
  password: Option<String>,

  /// Append logs to this file. Nothing is logged without it.
  #[arg(long, value_name = "FILE")]
  log_file: Option<PathBuf>,
}

// ─── Config file ──────────────────────────────────────────────────────────────

/// Shape of the optional TOML config file.
#[derive(Deserialize, Default)]
struct ConfigFile {
  #[serde(default)]
  url:      String,
  #[serde(default)]
  username: String,
  #[serde(default)]
  password: String,
}

// ─── Entry point ──────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
  let args = Args::parse();

  if let Some(path) = &args.log_file {
    init_logging(path)?;
  }

  let file_cfg: ConfigFile = if let Some(path) = &args.config {
    let raw = std::fs::read_to_string(path)
      .with_context(|| format!("reading config file {}", path.display()))?;
    toml::from_str(&raw).context("parsing config file")?
  } else {
    ConfigFile::default()
  };

  // CLI flags override config file, which overrides defaults.
  let api_config = ApiConfig {
    base_url: args
      .url
      .or_else(|| (!file_cfg.url.is_empty()).then(|| file_cfg.url.clone()))
      .unwrap_or_else(|| "http://localhost:8080".to_string()),
    username: args
      .user
      .or_else(|| (!file_cfg.username.is_empty()).then(|| file_cfg.username.clone()))
      .unwrap_or_default(),
    password: args
      .password
      .or_else(|| (!file_cfg.password.is_empty()).then(|| file_cfg.password.clone()))
      .unwrap_or_default(),
  };

  // Sign in before touching the terminal so errors print normally.
  let client = ApiClient::new(api_config).context("building HTTP client")?;
  let info = client.session().await.context("signing in")?;
  let mut session = RosterSession::new(client, info.tenancy);
  let load_result = session
    .handle_auth_event(AuthEvent::SignedIn(info.identity))
    .await;

  let mut app = App::new(session, Local::now().naive_local());
  if let Err(e) = load_result {
    // Keep going with an empty roster; `r` retries.
    app.status_msg = format!("Error loading roster: {e}");
  }

  enable_raw_mode().context("enabling raw mode")?;
  let mut stdout = io::stdout();
  execute!(stdout, EnterAlternateScreen).context("entering alternate screen")?;
  let backend = CrosstermBackend::new(stdout);
  let mut terminal = Terminal::new(backend).context("creating terminal")?;

  let run_result = run_event_loop(&mut terminal, &mut app).await;

  // Restore terminal regardless of result.
  disable_raw_mode().ok();
  execute!(terminal.backend_mut(), LeaveAlternateScreen).ok();
  terminal.show_cursor().ok();

  run_result
}

fn init_logging(path: &Path) -> Result<()> {
  let file = File::options()
    .create(true)
    .append(true)
    .open(path)
    .with_context(|| format!("opening log file {}", path.display()))?;

  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .with_ansi(false)
    .with_writer(Mutex::new(file))
    .init();
  Ok(())
}

// ─── Event loop ───────────────────────────────────────────────────────────────

async fn run_event_loop(
  terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
  app: &mut App<ApiClient>,
) -> Result<()> {
  loop {
    terminal.draw(|f| ui::draw(f, app)).context("drawing frame")?;

    // Poll for an event, yielding control to tokio while waiting.
    let maybe_event = tokio::task::block_in_place(|| {
      if event::poll(Duration::from_millis(50))? {
        Ok::<_, io::Error>(Some(event::read()?))
      } else {
        Ok(None)
      }
    })?;

    if let Some(Event::Key(key)) = maybe_event {
      let cont = app.handle_key(key).await?;
      if !cont {
        break;
      }
    }
  }

  Ok(())
}
