//! `dormfix`: command-line client for the dormfix issue desk.
//!
//! Each invocation restores the desk and the current session from a SQLite
//! state file, runs one command, and writes everything back, all inside a
//! single write transaction on that file.
//!
//! # Usage
//!
//! ```text
//! dormfix login student 6730123456 --password student123
//! dormfix report --category plumbing --severity high --description "leaking tap"
//! dormfix --config ~/.config/dormfix/cli.toml admin list --sort date
//! ```

mod app;
mod render;

use std::{io, path::PathBuf};

use anyhow::{Context, Result};
use app::Command;
use clap::Parser;
use dormfix_core::{
  client::Client,
  credential::AdminCredentials,
  fixtures::{DEFAULT_ADMIN_PASSWORD, DEFAULT_ADMIN_USERNAME},
};
use dormfix_store_sqlite::SqliteKv;
use serde::Deserialize;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

// ─── CLI args ─────────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(name = "dormfix", about = "Report and track dormitory facility issues")]
struct Args {
  /// Path to a TOML config file (state_path, admin_username, admin_password_hash).
  #[arg(short, long, value_name = "FILE")]
  config: Option<PathBuf>,

  /// SQLite file holding accounts, issues and the session (default: dormfix.db).
  #[arg(long, env = "DORMFIX_STATE", value_name = "FILE")]
  state: Option<PathBuf>,

  /// Start from an empty desk instead of the demo data when the state file is new.
  #[arg(long)]
  no_demo: bool,

  #[command(subcommand)]
  command: Command,
}

// ─── Config file ──────────────────────────────────────────────────────────────

/// Shape of the optional TOML config file.
#[derive(Deserialize, Default)]
struct ConfigFile {
  state_path:          Option<PathBuf>,
  admin_username:      Option<String>,
  /// argon2 PHC string, as printed by `dormfix-server --hash-password`.
  admin_password_hash: Option<String>,
}

impl ConfigFile {
  fn admin(&self) -> Result<AdminCredentials> {
    let username = self.admin_username.as_deref().unwrap_or(DEFAULT_ADMIN_USERNAME);
    Ok(match &self.admin_password_hash {
      Some(hash) => AdminCredentials {
        username:      username.to_string(),
        password_hash: hash.clone(),
      },
      None => AdminCredentials::from_plaintext(username, DEFAULT_ADMIN_PASSWORD)?,
    })
  }
}

// ─── Entry point ──────────────────────────────────────────────────────────────

fn main() -> Result<()> {
  tracing_subscriber::fmt()
    .with_writer(io::stderr)
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::WARN.into())
        .from_env_lossy(),
    )
    .init();

  let args = Args::parse();

  let file_cfg: ConfigFile = if let Some(path) = &args.config {
    let raw = std::fs::read_to_string(path)
      .with_context(|| format!("reading config file {}", path.display()))?;
    toml::from_str(&raw).context("parsing config file")?
  } else {
    ConfigFile::default()
  };

  // CLI flags override config file, which overrides defaults.
  let state_path = args
    .state
    .or_else(|| file_cfg.state_path.clone())
    .unwrap_or_else(|| PathBuf::from("dormfix.db"));

  let kv = SqliteKv::open(&state_path)
    .with_context(|| format!("opening state file {}", state_path.display()))?;
  let admin = file_cfg.admin()?;
  let seed_demo = !args.no_demo;

  // One write transaction per run: concurrent runs against the same file
  // queue up instead of overwriting each other's changes.
  kv.transaction(|kv| -> Result<()> {
    let mut client = Client::restore(kv, admin, seed_demo).context("restoring state")?;
    app::run(args.command, &mut client, &mut io::stdout().lock())?;
    client.persist(kv).context("saving state")
  })
}
