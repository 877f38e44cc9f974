//! dormfix-server binary.
//!
//! Reads `config.toml` (or the path given with `--config`) layered under
//! `DORMFIX_*` environment variables, builds an in-process issue desk, and
//! serves the JSON API over HTTP.
//!
//! # Password hash generation
//!
//! To generate the argon2 PHC string for `admin_password_hash`:
//!
//! ```text
//! cargo run -p dormfix-api --bin dormfix-server -- --hash-password
//! ```

use std::path::PathBuf;

use anyhow::Context as _;
use clap::Parser;
use dormfix_api::{AppState, ServerConfig};
use dormfix_core::{
  credential::{AdminCredentials, hash_password},
  desk::Desk,
  fixtures,
};
use tokio::net::TcpListener;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "dormfix issue desk server")]
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

  // Helper mode: hash a password and exit.
  if cli.hash_password {
    let password = read_password()?;
    println!("{}", hash_password(&password)?);
    return Ok(());
  }

  let settings = config::Config::builder()
    .set_default("host", "127.0.0.1")?
    .set_default("port", 8080_i64)?
    .set_default("admin_username", fixtures::DEFAULT_ADMIN_USERNAME)?
    .set_default("seed_demo", false)?
    .add_source(config::File::from(cli.config).required(false))
    .add_source(config::Environment::with_prefix("DORMFIX"))
    .build()
    .context("failed to read config file")?;

  let server_cfg: ServerConfig = settings
    .try_deserialize()
    .context("failed to deserialise ServerConfig")?;

  let admin = match &server_cfg.admin_password_hash {
    Some(hash) => AdminCredentials {
      username:      server_cfg.admin_username.clone(),
      password_hash: hash.clone(),
    },
    None => {
      tracing::warn!("admin_password_hash not set; using the default admin password");
      AdminCredentials::from_plaintext(&server_cfg.admin_username, fixtures::DEFAULT_ADMIN_PASSWORD)?
    }
  };

  let desk = if server_cfg.seed_demo {
    tracing::info!("seeding demo students and reports");
    Desk::demo(admin)?
  } else {
    Desk::new(admin)
  };

  let app = dormfix_api::router(AppState::new(desk));
  let address = format!("{}:{}", server_cfg.host, server_cfg.port);

  tracing::info!("Listening on http://{address}");
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;

  axum::serve(listener, app).await.context("server error")?;

  Ok(())
}

/// Read a password from stdin.
fn read_password() -> anyhow::Result<String> {
  use std::io::{self, BufRead, Write};
  print!("Password: ");
  io::stdout().flush().ok();
  let mut line = String::new();
  io::stdin().lock().read_line(&mut line)?;
  Ok(line.trim_end_matches(['\n', '\r']).to_string())
}
