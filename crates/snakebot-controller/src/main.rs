//! # snakebot-controller
//!
//! `snakebot`: a line-oriented driving console for the snake robot. Reads
//! commands from stdin, drives the robot through a [`Session`], and prints
//! connection changes as they happen.

#![deny(unsafe_code)]

mod console;
mod input;
mod render;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use snakebot_session::{Session, SessionConfig, SessionSnapshot, WsConnector};
use snakebot_settings::ControllerSettings;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::console::{Console, Outcome};

/// Snake robot controller.
#[derive(Parser, Debug)]
#[command(name = "snakebot", version, about = "Drive the snake robot over WebSocket")]
struct Cli {
    /// Robot host (overrides settings).
    #[arg(long)]
    host: Option<String>,

    /// Robot port (overrides settings).
    #[arg(long)]
    port: Option<u16>,

    /// Initial drive speed, 50-255.
    #[arg(long)]
    speed: Option<u8>,

    /// Settings file (defaults to `~/.snakebot/settings.json`).
    #[arg(long)]
    settings: Option<PathBuf>,

    /// Diagnostic log level; `RUST_LOG` takes precedence.
    #[arg(long)]
    log_level: Option<String>,

    /// Start without connecting.
    #[arg(long)]
    no_connect: bool,
}

impl Cli {
    fn apply(&self, settings: &mut ControllerSettings) {
        if let Some(host) = &self.host {
            settings.device.host.clone_from(host);
        }
        if let Some(port) = self.port {
            settings.device.port = port;
        }
        if let Some(speed) = self.speed {
            settings.drive.default_speed = speed;
        }
        if let Some(level) = &self.log_level {
            settings.logging.level.clone_from(level);
        }
    }
}

/// Print state transitions and new errors until the session goes away.
fn spawn_watcher(mut rx: watch::Receiver<SessionSnapshot>) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut prev = rx.borrow_and_update().clone();
        while rx.changed().await.is_ok() {
            let next = rx.borrow_and_update().clone();
            for line in render::transitions(&prev, &next) {
                println!("{line}");
            }
            prev = next;
        }
    })
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let settings_path = cli
        .settings
        .clone()
        .unwrap_or_else(snakebot_settings::settings_path);
    let mut settings = snakebot_settings::load_settings_from_path(&settings_path)
        .with_context(|| format!("Failed to load settings from {}", settings_path.display()))?;
    cli.apply(&mut settings);
    settings.validate().context("Invalid settings")?;

    let _ = snakebot_logging::init_subscriber(&settings.logging.level);
    tracing::info!(
        version = snakebot_core::constants::VERSION,
        settings = %settings_path.display(),
        "snakebot starting"
    );

    let session = Session::spawn(
        SessionConfig::from(&settings.session),
        Arc::new(WsConnector::new()),
    );
    let watcher = spawn_watcher(session.subscribe());
    let mut console = Console::new(session.clone(), &settings);

    println!("{}", render::HELP);
    if !cli.no_connect {
        if let Outcome::Continue(Some(text)) = console.execute(input::Input::Connect {
            host: None,
            port: None,
        }) {
            println!("{text}");
        }
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        let line = tokio::select! {
            line = lines.next_line() => line.context("Failed to read stdin")?,
            _ = tokio::signal::ctrl_c() => None,
        };
        let Some(line) = line else {
            break;
        };
        let outcome = match input::parse_line(&line) {
            Ok(parsed) => console.execute(parsed),
            Err(e) => Outcome::Continue(Some(e.to_string())),
        };
        match outcome {
            Outcome::Continue(Some(text)) => println!("{text}"),
            Outcome::Continue(None) => {}
            Outcome::Quit => break,
        }
    }

    session.disconnect();
    let _ = session.flush().await;
    session.shutdown();
    let _ = watcher.await;
    tracing::info!("snakebot stopped");
    Ok(())
}
