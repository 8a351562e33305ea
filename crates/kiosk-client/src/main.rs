//! `kiosk` — terminal front end for the newsletter kiosk.
//!
//! # Usage
//!
//! ```
//! kiosk --url http://localhost:3000 --locale de
//! kiosk --config /etc/kiosk/client.toml
//! kiosk pair --branch PD --key <setup key>
//! ```

mod app;
mod client;
mod form;
mod geocode;
mod i18n;
mod idle;
mod pairing;
mod signature;
mod submit;
mod ui;

use std::{
  fs::OpenOptions,
  io,
  path::PathBuf,
  sync::Mutex,
  time::{Duration, Instant},
};

use anyhow::{Context, Result};
use app::{App, NetEvent};
use clap::{Parser, Subcommand};
use client::{ApiClient, ApiConfig};
use crossterm::{
  event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyEventKind},
  execute,
  terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use geocode::Geocoder;
use i18n::Locale;
use ratatui::{Terminal, backend::CrosstermBackend, layout::Rect};
use serde::Deserialize;
use tokio::sync::mpsc;

// ─── CLI args ─────────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(name = "kiosk", about = "Newsletter sign-up kiosk")]
struct Args {
  /// Path to a TOML config file.
  #[arg(short, long, value_name = "FILE")]
  config: Option<PathBuf>,

  /// Base URL of the kiosk server (default: http://localhost:3000).
  #[arg(long, env = "KIOSK_URL")]
  url: Option<String>,

  /// Initial language: en, de, ru or sk.
  #[arg(long)]
  locale: Option<Locale>,

  /// Geocoding API key; enables address search.
  #[arg(long, env = "KIOSK_MAPS_KEY")]
  maps_key: Option<String>,

  /// Directory holding the persisted pairing (default: ./kiosk-state).
  #[arg(long, value_name = "DIR")]
  state_dir: Option<PathBuf>,

  /// Write logs to this file. The terminal belongs to the UI.
  #[arg(long, value_name = "FILE")]
  log_file: Option<PathBuf>,

  #[command(subcommand)]
  command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
  /// Pair this kiosk with a branch using the setup key, then exit.
  Pair {
    #[arg(long)]
    branch: String,
    #[arg(long, env = "KIOSK_SETUP_KEY")]
    key:    String,
  },
}

// ─── Config file ──────────────────────────────────────────────────────────────

/// Shape of the optional TOML config file.
#[derive(Deserialize, Default)]
struct ConfigFile {
  #[serde(default)]
  url:       String,
  #[serde(default)]
  locale:    Option<Locale>,
  #[serde(default)]
  maps_key:  String,
  #[serde(default)]
  state_dir: Option<PathBuf>,
  #[serde(default)]
  log_file:  Option<PathBuf>,
}

// ─── Entry point ──────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
  let args = Args::parse();

  // Load config file if provided.
  let file_cfg: ConfigFile = if let Some(path) = &args.config {
    let raw = std::fs::read_to_string(path)
      .with_context(|| format!("reading config file {}", path.display()))?;
    toml::from_str(&raw).context("parsing config file")?
  } else {
    ConfigFile::default()
  };

  // CLI flags override config file, which overrides defaults.
  let api_config = ApiConfig {
    base_url:  args
      .url
      .or_else(|| (!file_cfg.url.is_empty()).then(|| file_cfg.url.clone()))
      .unwrap_or_else(|| "http://localhost:3000".to_string()),
    state_dir: Some(
      args
        .state_dir
        .or(file_cfg.state_dir)
        .unwrap_or_else(|| PathBuf::from("kiosk-state")),
    ),
  };
  let locale = args.locale.or(file_cfg.locale).unwrap_or_default();
  let maps_key = args
    .maps_key
    .or_else(|| (!file_cfg.maps_key.is_empty()).then(|| file_cfg.maps_key.clone()));
  let log_file = args.log_file.or(file_cfg.log_file);

  let client = ApiClient::new(api_config)?;

  if let Some(Command::Pair { branch, key }) = args.command {
    init_logging(None)?;
    let paired = client.pair(&branch, &key).await?;
    println!("{}: {} ({})", paired.message, paired.branch.name, paired.branch.code);
    return Ok(());
  }

  // The terminal belongs to the UI; without a log file nothing is logged.
  if let Some(path) = log_file {
    init_logging(Some(path))?;
  }

  let geocoder = maps_key.map(Geocoder::new).transpose()?;
  if geocoder.is_none() {
    tracing::info!("no maps key configured; address search disabled");
  }

  let (tx, rx) = mpsc::unbounded_channel();
  let mut app = App::new(client, geocoder, locale, tx);
  app.load_branches();

  // Set up the terminal.
  enable_raw_mode().context("enabling raw mode")?;
  let mut stdout = io::stdout();
  execute!(stdout, EnterAlternateScreen, EnableMouseCapture)
    .context("entering alternate screen")?;
  let backend = CrosstermBackend::new(stdout);
  let mut terminal = Terminal::new(backend).context("creating terminal")?;

  // Run the event loop; restore terminal even on error.
  let run_result = run_event_loop(&mut terminal, &mut app, rx).await;

  disable_raw_mode().ok();
  execute!(terminal.backend_mut(), LeaveAlternateScreen, DisableMouseCapture).ok();
  terminal.show_cursor().ok();

  run_result
}

/// Logs go to stderr, or are appended to `file` when given.
fn init_logging(file: Option<PathBuf>) -> Result<()> {
  let filter = tracing_subscriber::EnvFilter::try_from_default_env()
    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

  match file {
    Some(path) => {
      let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .with_context(|| format!("opening log file {}", path.display()))?;
      tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(false)
        .with_writer(Mutex::new(file))
        .init();
    }
    None => {
      tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
    }
  }
  Ok(())
}

// ─── Event loop ───────────────────────────────────────────────────────────────

async fn run_event_loop(
  terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
  app: &mut App,
  mut rx: mpsc::UnboundedReceiver<NetEvent>,
) -> Result<()> {
  loop {
    // Re-measure the signature pad at most once per frame.
    if app.resize.take() {
      let size = terminal.size().context("reading terminal size")?;
      app.pad_area = ui::pad_area(Rect::new(0, 0, size.width, size.height));
    }

    terminal.draw(|f| ui::draw(f, app)).context("drawing frame")?;

    // Poll for an event, yielding control to tokio while waiting.
    let maybe_event = tokio::task::block_in_place(|| {
      if event::poll(Duration::from_millis(50))? {
        Ok::<_, io::Error>(Some(event::read()?))
      } else {
        Ok(None)
      }
    })?;

    let now = Instant::now();
    if let Some(evt) = maybe_event {
      match evt {
        Event::Key(key) if key.kind == KeyEventKind::Press => {
          if !app.handle_key(key, now) {
            break;
          }
        }
        Event::Mouse(mouse) => app.handle_mouse(mouse, now),
        Event::Resize(_, _) => app.resize.request(),
        _ => {}
      }
    }

    while let Ok(net) = rx.try_recv() {
      app.handle_net(net, now);
    }

    app.on_tick(now);
  }

  Ok(())
}
