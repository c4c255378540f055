//! cast-player: drive the dual-target playback core from a terminal.
//!
//! Loads the catalog from a TOML config, wires the coordinator to a simulated
//! local element and a simulated receiver, reads line commands from stdin and
//! renders every display snapshot as text on stdout. Logs go to stderr.

mod cli;
mod commands;
mod render;
mod simulated;

use std::io::BufRead;
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use cast_player::{
    Catalog, DisplayBus, InputCommand, LocalAdapter, PlaybackCoordinator, PlayerConfig,
    PlayerRuntime, RemoteAdapter, SessionSwitchController,
};
use cast_player_types::{DisplayModel, FeatureMode};
use clap::Parser;
use crossbeam_channel::{Receiver, Sender, unbounded};
use tracing_subscriber::EnvFilter;

use commands::{HELP, LineCommand};
use simulated::{SimulatedElement, SimulatedReceiver};

fn main() -> Result<()> {
    let args = cli::Args::parse();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,cast_player=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = PlayerConfig::load(&args.config)?;
    let mut options = config.options()?;
    if let Some(mode) = args.mode {
        options.feature_mode = mode;
    }
    let catalog = Arc::new(config.catalog());
    if options.feature_mode == FeatureMode::Live && catalog.live().is_none() {
        bail!("live mode needs a [live] section in {:?}", args.config);
    }
    tracing::info!(
        config = ?args.config,
        items = catalog.len(),
        mode = ?options.feature_mode,
        "catalog loaded"
    );

    let (input_tx, input_rx) = unbounded::<InputCommand>();
    let (remote_tx, remote_rx) = unbounded();
    let (local_tx, local_rx) = unbounded();

    let element = SimulatedElement::new(&catalog, local_tx);
    let receiver = SimulatedReceiver::start(args.receiver_name.clone(), remote_tx);

    let display = DisplayBus::new();
    let updates = display.subscribe();
    let coordinator = PlaybackCoordinator::new(
        catalog.clone(),
        options.clone(),
        Box::new(LocalAdapter::new(Box::new(element))),
        display,
    );
    let switch = SessionSwitchController::new(
        Box::new(RemoteAdapter::new(receiver.clone(), options.clock_offset)),
        receiver,
    );
    let mut runtime = PlayerRuntime::new(coordinator, switch, input_rx, remote_rx, local_rx);

    {
        let input_tx = input_tx.clone();
        ctrlc::set_handler(move || {
            let _ = input_tx.send(InputCommand::Quit);
        })
        .context("install ctrl-c handler")?;
    }

    let timeline_width = options.timeline_width;
    std::thread::spawn(move || render_loop(updates, timeline_width));

    println!("{HELP}");
    println!("{}", render::render_catalog(&catalog));
    std::thread::spawn({
        let catalog = catalog.clone();
        move || read_commands(catalog, input_tx)
    });

    runtime.run()
}

/// Print each snapshot that renders differently from the last one.
fn render_loop(updates: Receiver<DisplayModel>, timeline_width: f64) {
    let mut last = String::new();
    for model in updates.iter() {
        let text = render::render_display(&model, timeline_width);
        if text != last {
            println!("{text}");
            last = text;
        }
    }
}

fn read_commands(catalog: Arc<Catalog>, input_tx: Sender<InputCommand>) {
    let stdin = std::io::stdin();
    for line in stdin.lock().lines() {
        let line = match line {
            Ok(line) => line,
            Err(err) => {
                tracing::warn!(error = %err, "stdin read failed");
                break;
            }
        };
        match commands::parse_line(&line) {
            Ok(None) => {}
            Ok(Some(LineCommand::List)) => println!("{}", render::render_catalog(&catalog)),
            Ok(Some(LineCommand::Help)) => println!("{HELP}"),
            Ok(Some(LineCommand::Input(command))) => {
                let quit = command == InputCommand::Quit;
                if input_tx.send(command).is_err() || quit {
                    return;
                }
            }
            Err(err) => println!("{err:#}"),
        }
    }
    let _ = input_tx.send(InputCommand::Quit);
}
