//! kiosk-server binary.
//!
//! Reads `config.toml` (or the path given with `--config`) layered with
//! `KIOSK_*` environment variables, opens the SQLite store and serves the
//! kiosk API. Subcommands administer branches and produce the setup-key hash.
//!
//! ```text
//! server hash-key                      # prints setup_key_hash for config.toml
//! server branch add PD "Parndorf"
//! server branch list --all
//! server                               # same as `server serve`
//! ```

use std::{
  path::{Path, PathBuf},
  sync::Arc,
};

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use kiosk_core::{branch::NewBranch, store::SubscriptionStore};
use kiosk_server::{AppState, ServerConfig, brevo::BrevoClient, pairing::hash_setup_key};
use kiosk_store_sqlite::SqliteStore;
use tokio::net::TcpListener;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "Kiosk newsletter server")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "config.toml")]
  config: PathBuf,

  #[command(subcommand)]
  command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
  /// Serve the HTTP API (default).
  Serve,
  /// Print the argon2 hash for a setup key entered on stdin and exit.
  HashKey,
  /// Manage branches.
  #[command(subcommand)]
  Branch(BranchCommand),
  /// Show recent subscriptions.
  Subscriptions {
    #[arg(short, long, default_value_t = 20)]
    limit: usize,
  },
}

#[derive(Subcommand)]
enum BranchCommand {
  /// Register a new branch.
  Add {
    code:        String,
    name:        String,
    #[arg(short, long)]
    description: Option<String>,
  },
  /// List branches.
  List {
    /// Include inactive branches.
    #[arg(long)]
    all: bool,
  },
  /// Stop accepting pairings and submissions for a branch.
  Deactivate { code: String },
  /// Re-enable a deactivated branch.
  Activate { code: String },
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
  let command = cli.command.unwrap_or(Command::Serve);

  if let Command::HashKey = command {
    let key = read_stdin_line("Setup key: ")?;
    let hash = hash_setup_key(&key).map_err(|e| anyhow::anyhow!("argon2 error: {e}"))?;
    println!("{hash}");
    return Ok(());
  }

  let settings = config::Config::builder()
    .add_source(config::File::from(cli.config).required(false))
    .add_source(
      config::Environment::with_prefix("KIOSK")
        .prefix_separator("_")
        .separator("__"),
    )
    .build()
    .context("failed to read config file")?;

  let server_cfg: ServerConfig = settings
    .try_deserialize()
    .context("failed to deserialise ServerConfig")?;

  let store_path = expand_tilde(&server_cfg.store_path);
  let store = SqliteStore::open(&store_path)
    .await
    .with_context(|| format!("failed to open store at {store_path:?}"))?;

  match command {
    Command::Serve => serve(store, server_cfg).await,
    Command::Branch(cmd) => branch(&store, cmd).await,
    Command::Subscriptions { limit } => {
      for s in store.list_subscriptions(limit).await? {
        println!(
          "{}  {}  list {}  {} {} <{}>",
          s.created_at.format("%Y-%m-%d %H:%M"),
          s.subscription_id,
          s.list_id,
          s.draft.first_name,
          s.draft.last_name,
          s.draft.email,
        );
      }
      Ok(())
    }
    Command::HashKey => Ok(()),
  }
}

async fn serve(store: SqliteStore, server_cfg: ServerConfig) -> anyhow::Result<()> {
  if server_cfg.setup_key_hash.is_none() {
    tracing::warn!("no setup_key_hash configured; kiosk pairing is disabled");
  }
  if server_cfg.brevo.api_key.is_none() {
    tracing::warn!("no Brevo API key configured; contacts are stored but not forwarded");
  }

  let mailer = BrevoClient::new(server_cfg.brevo.clone()).context("failed to build HTTP client")?;

  let state = AppState {
    store:  Arc::new(store),
    mailer: Arc::new(mailer),
    config: Arc::new(server_cfg.clone()),
  };

  let app = kiosk_server::router(state);
  let address = format!("{}:{}", server_cfg.host, server_cfg.port);

  tracing::info!("Listening on http://{address}");
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;

  axum::serve(listener, app).await.context("server error")?;
  Ok(())
}

async fn branch(store: &SqliteStore, cmd: BranchCommand) -> anyhow::Result<()> {
  match cmd {
    BranchCommand::Add { code, name, description } => {
      let mut input = NewBranch::new(&code, &name)?;
      if let Some(d) = description {
        input = input.with_description(d);
      }
      let b = store.add_branch(input).await?;
      println!("added {} ({}) {}", b.code, b.name, b.id);
    }
    BranchCommand::List { all } => {
      for b in store.list_branches(!all).await? {
        let state = if b.is_active { "active" } else { "inactive" };
        println!("{:<10} {:<9} {}", b.code, state, b.name);
      }
    }
    BranchCommand::Deactivate { code } => set_active(store, &code, false).await?,
    BranchCommand::Activate { code } => set_active(store, &code, true).await?,
  }
  Ok(())
}

async fn set_active(store: &SqliteStore, code: &str, active: bool) -> anyhow::Result<()> {
  let b = store
    .set_branch_active(code, active)
    .await?
    .with_context(|| format!("no branch with code {code:?}"))?;
  println!("{} is now {}", b.code, if b.is_active { "active" } else { "inactive" });
  Ok(())
}

fn read_stdin_line(prompt: &str) -> anyhow::Result<String> {
  use std::io::{self, BufRead, Write};
  print!("{prompt}");
  io::stdout().flush().ok();
  let mut line = String::new();
  io::stdin().lock().read_line(&mut line)?;
  Ok(line.trim_end_matches(['\n', '\r']).to_string())
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
