//! Scorecast headless host.
//!
//! Loads the controller configuration, starts the controller on its own
//! thread and drives it from a line-oriented operator console on stdin.

pub mod commands;
pub mod config;

use std::io;
use std::sync::Arc;
use std::thread;

use anyhow::{anyhow, Context};
use crossbeam_channel::Sender;
use parking_lot::RwLock;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use scorecast_encoder::{LoggingEncoder, StatusSink};
use scorecast_engine::{
    create_controller, Collaborators, MemoryDestinationStore, UnlinkedPlatform,
};
use scorecast_ipc::{command_channel, event_channel, ControllerCommand, SessionSnapshot};

/// Host state shared with the console.
pub struct AppState {
    pub command_tx: Sender<ControllerCommand>,
    pub snapshot: Arc<RwLock<SessionSnapshot>>,
}

/// Initialize logging.
pub fn init_logging() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "scorecast=debug,scorecast_lib=debug,scorecast_engine=debug,scorecast_encoder=debug"
                    .into()
            }),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();
}

/// Run the host until the console closes.
pub fn run() -> anyhow::Result<()> {
    init_logging();
    info!("Scorecast starting");

    let config_path = config::config_path(
        std::env::args().skip(1),
        std::env::var(config::CONFIG_ENV).ok(),
    );
    let config = config::load_config(config_path.as_deref())?;

    // Create IPC channels
    let (command_tx, command_rx) = command_channel();
    let (event_tx, event_rx) = event_channel();

    let collaborators = Collaborators {
        encoder: Box::new(LoggingEncoder::with_sink(StatusSink::new(command_tx.clone()))),
        store: Box::new(MemoryDestinationStore::new()),
        platform: Box::new(UnlinkedPlatform),
    };
    let mut controller = create_controller(config, collaborators, command_rx, event_tx);

    let state = AppState {
        command_tx,
        snapshot: controller.snapshot_handle(),
    };

    // Start controller in background thread
    let controller_thread = thread::Builder::new()
        .name("controller".to_string())
        .spawn(move || controller.run())
        .context("Failed to spawn controller thread")?;

    let event_thread = thread::Builder::new()
        .name("events".to_string())
        .spawn(move || commands::print_events(event_rx))
        .context("Failed to spawn event thread")?;

    println!("Type `help` for commands.");
    let result = commands::console(&state, io::stdin().lock());

    if state.command_tx.send(ControllerCommand::Shutdown).is_err() {
        warn!("Controller already stopped");
    }
    drop(state);

    controller_thread
        .join()
        .map_err(|_| anyhow!("Controller thread panicked"))?;
    event_thread
        .join()
        .map_err(|_| anyhow!("Event thread panicked"))?;

    info!("Scorecast stopped");
    result
}
