//! Quill blog backend binary.
//!
//! Reads `quill.toml` (or the path given with `--config`) plus `QUILL_*`
//! environment overrides, opens the SQLite store, and serves the JSON API.

use std::{
  ffi::OsString,
  path::{Path, PathBuf},
  sync::Arc,
};

use anyhow::Context as _;
use clap::Parser;
use quill_server::ServerConfig;
use quill_store_sqlite::SqliteStore;
use tokio::net::TcpListener;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "Quill blog backend")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "quill.toml")]
  config: PathBuf,
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

  let settings = config::Config::builder()
    .set_default("host", "127.0.0.1")?
    .set_default("port", 8080)?
    .set_default("store_path", "quill.db")?
    .set_default("allowed_origins", Vec::<String>::new())?
    .add_source(config::File::from(cli.config).required(false))
    .add_source(
      config::Environment::with_prefix("QUILL")
        .try_parsing(true)
        .list_separator(",")
        .with_list_parse_key("allowed_origins"),
    )
    .build()
    .context("failed to read configuration")?;

  let server_cfg: ServerConfig = settings
    .try_deserialize()
    .context("failed to deserialise ServerConfig")?;

  let store_path = expand_tilde(&server_cfg.store_path);

  let store = SqliteStore::open(&store_path)
    .await
    .with_context(|| format!("failed to open store at {store_path:?}"))?;

  tracing::info!(path = %store_path.display(), "store opened");

  let app = quill_server::app(Arc::new(store), &server_cfg)?;
  let listener = TcpListener::bind((server_cfg.host.as_str(), server_cfg.port))
    .await
    .with_context(|| format!("failed to bind {}:{}", server_cfg.host, server_cfg.port))?;

  tracing::info!(address = %listener.local_addr()?, "quill listening");

  axum::serve(listener, app).await.context("server error")?;

  Ok(())
}

/// Resolve a `~/`-prefixed store path against `$HOME`.
fn expand_tilde(path: &Path) -> PathBuf { expand_tilde_in(path, std::env::var_os("HOME")) }

fn expand_tilde_in(path: &Path, home: Option<OsString>) -> PathBuf {
  match (path.strip_prefix("~"), home) {
    (Ok(rest), Some(home)) => PathBuf::from(home).join(rest),
    _ => path.to_path_buf(),
  }
}
