//! Roster server binary.
//!
//! Reads `config.toml` (or the path specified with `--config`) layered with
//! `ROTA_*` environment variables, opens the SQLite store, and serves the JSON
//! API under `/api`.
//!
//! # Password hash generation
//!
//! To generate the argon2 PHC string for an account's `password_hash`:
//!
//! ```
//! cargo run -p rota-server --bin server -- --hash-password
//! ```

use std::{
  path::{Path, PathBuf},
  sync::Arc,
};

use anyhow::Context as _;
use argon2::{Argon2, PasswordHasher, password_hash::SaltString};
use clap::Parser;
use rand_core::OsRng;
use rota_server::{AppState, ServerConfig};
use rota_store_sqlite::SqliteStore;
use tokio::net::TcpListener;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "Volunteer roster server")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "config.toml")]
  config: PathBuf,

  /// Print the argon2 hash for a password entered on stdin and exit.
  #[arg(long)]
  hash_password: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();

  if cli.hash_password {
    let password = read_password()?;
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
      .hash_password(password.as_bytes(), &salt)
      .map_err(|e| anyhow::anyhow!("argon2 error: {e}"))?
      .to_string();
    println!("{hash}");
    return Ok(());
  }

  let settings = config::Config::builder()
    .add_source(config::File::from(cli.config).required(false))
    .add_source(config::Environment::with_prefix("ROTA"))
    .build()
    .context("failed to read config file")?;

  let server_cfg: ServerConfig = settings
    .try_deserialize()
    .context("failed to deserialise ServerConfig")?;
  server_cfg.validate()?;

  let store_path = expand_tilde(&server_cfg.store_path);

  let store = SqliteStore::open(&store_path)
    .await
    .with_context(|| format!("failed to open store at {store_path:?}"))?;

  tracing::info!(
    store = %store_path.display(),
    tenancy = ?server_cfg.tenancy,
    accounts = server_cfg.accounts.len(),
    "store opened"
  );

  let state = AppState {
    store:  Arc::new(store),
    auth:   Arc::new(server_cfg.auth()),
    config: Arc::new(server_cfg.clone()),
  };

  let app = rota_server::router(state);
  let address = format!("{}:{}", server_cfg.host, server_cfg.port);

  tracing::info!("Listening on http://{address}");
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;

  axum::serve(listener, app).await.context("server error")?;

  Ok(())
}

/// Read a password line from stdin.
fn read_password() -> anyhow::Result<String> {
  use std::io::{self, BufRead, Write};
  print!("Password: ");
  io::stdout().flush().ok();
  let mut line = String::new();
  io::stdin().lock().read_line(&mut line)?;
  let password = line.trim_end_matches(['\n', '\r']).to_string();
  anyhow::ensure!(!password.is_empty(), "password must not be empty");
  Ok(password)
}

/// Expand a leading `~` to the user's home directory.
fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}
