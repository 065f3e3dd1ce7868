//! kioskd - vending kiosk session daemon.
//!
//! Reads token scans and coin deposits from the kiosk's microcontroller,
//! runs the session loop against the configured directory backends, and
//! prints display updates to stdout. Type `logout` or `door` on stdin to
//! press the corresponding buttons.

mod config;
mod logging;
mod sink;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::io::BufReader;
use tokio::sync::mpsc;
use tracing::{info, warn};

use kiosk_directory::{AnyCreditStore, AnyIdentityResolver};
use kiosk_hardware::{DeviceLink, LinkConfig};
use kiosk_session::{Notifier, SessionController};
use kiosk_storage::{Database, DatabaseConfig, SqliteDepositLedger};

use crate::config::{KioskConfig, Overrides};

#[derive(Parser, Debug)]
#[command(name = "kioskd")]
#[command(about = "Vending kiosk session daemon", version)]
struct Cli {
    /// Configuration file
    #[arg(short, long, default_value = "kiosk.toml")]
    config: PathBuf,

    /// Serial device, overriding [serial].port
    #[arg(short, long)]
    port: Option<String>,

    /// Inactivity timeout in seconds, overriding [session].timeout_secs
    #[arg(short, long)]
    timeout: Option<u64>,

    /// Directory for daily log files, overriding [logging].dir
    #[arg(long)]
    log_dir: Option<PathBuf>,

    /// Mirror log output to stderr
    #[arg(short, long)]
    foreground: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = KioskConfig::load(&cli.config)?;
    config.apply(Overrides {
        port: cli.port,
        timeout_secs: cli.timeout,
        log_dir: cli.log_dir,
    });
    config.validate()?;

    logging::init(&config.logging, cli.foreground)?;
    info!(
        version = kiosk_core::VERSION,
        config = %cli.config.display(),
        port = %config.serial.port,
        "Starting kioskd"
    );

    let call_timeout = config.session.call_timeout();
    let resolver = AnyIdentityResolver::from_config(&config.identity, call_timeout)
        .context("Invalid [identity] section")?;
    let store = AnyCreditStore::from_config(&config.credits, call_timeout)
        .context("Invalid [credits] section")?;

    let ledger_db = match &config.ledger.path {
        Some(path) => Some(
            Database::new(DatabaseConfig::new(path))
                .await
                .with_context(|| format!("Failed to open deposit ledger {}", path.display()))?,
        ),
        None => None,
    };

    let link = kiosk_hardware::serial::open(&config.serial)
        .with_context(|| format!("Failed to open serial port {}", config.serial.port))?;
    let link_config = LinkConfig {
        heartbeat_period: Some(config.session.heartbeat_period()),
        ..LinkConfig::default()
    };
    let (events, commands, tasks) = DeviceLink::new(link_config)
        .start(link.reader, link.writer)
        .split();

    let (notifier, display) = Notifier::channel();
    let display = tokio::spawn(sink::run_console_sink(display, std::io::stdout()));

    let (control_tx, control_rx) = mpsc::channel(8);
    let control = tokio::spawn(sink::forward_control(
        BufReader::new(tokio::io::stdin()),
        control_tx,
    ));

    let mut controller = SessionController::new(resolver, store, commands, notifier, config.session);
    if let Some(db) = &ledger_db {
        controller = controller.with_ledger(SqliteDepositLedger::new(db.pool().clone()));
    }

    let session = controller.run(events, control_rx);
    tokio::pin!(session);

    tokio::select! {
        () = &mut session => {}
        result = tokio::signal::ctrl_c() => {
            if let Err(e) = result {
                warn!(error = %e, "Failed to listen for interrupt");
            }
            info!("Interrupted, stopping serial reader");
            // The event stream ends at the next read timeout; the loop then
            // commits and logs out while the writer is still running.
            tasks.stop_reader();
            session.await;
        }
    }

    tasks.shutdown().await?;
    control.abort();
    if let Some(db) = ledger_db {
        db.close().await;
    }
    if let Err(e) = display.await {
        warn!(error = %e, "Display task failed");
    }

    info!("kioskd stopped");
    Ok(())
}
