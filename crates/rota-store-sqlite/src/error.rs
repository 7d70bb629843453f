//! Error type for `rota-store-sqlite`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("core error: {0}")]
  Core(#[from] rota_core::Error),

  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("uuid parse error: {0}")]
  Uuid(#[from] uuid::Error),

  /// The file was written by a newer build with a different layout.
  #[error("unsupported schema version {found} (this build understands {expected})")]
  SchemaVersion { found: i64, expected: i64 },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
