mod commands;
mod logging;
mod state;
mod theme;

use autoclick_core::{load_record, settings_path, ClickEngine};
use autoclick_platform::{start_hotkey_listener, EnigoEmitter, HotkeyEvent, NoopEmitter};
use commands::Command;
use crossbeam_channel::{bounded, never, select, tick, Receiver};
use state::{hotkey_label, AppError, AppState, CursorFn, Flow};
use std::io::BufRead;
use std::process::ExitCode;
use std::sync::Arc;
use std::thread;
use std::time::Duration;
use tracing::{error, info, warn};

/// Set to `1` to log clicks instead of injecting them.
const DRY_RUN_ENV: &str = "AUTOCLICK_DRY_RUN";

/// How often the click counter is polled for display.
const REFRESH_INTERVAL: Duration = Duration::from_millis(250);

fn main() -> ExitCode {
    logging::setup(logging::file_logging_requested());

    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "autoclick failed");
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<(), AppError> {
    let path = settings_path();
    let record = load_record(&path)?;
    info!(?path, "settings loaded");

    let (engine, cursor) = build_engine()?;
    let mut state = AppState::new(engine, record, path, cursor);

    let hotkey = start_hotkey_listener(state.hotkey());
    let mut hotkey_rx = hotkey.receiver().clone();
    let lines = spawn_stdin_reader();
    let ticker = tick(REFRESH_INTERVAL);

    println!(
        "autoclick: hotkey {} toggles clicking, type `help` for commands",
        hotkey_label(state.hotkey())
    );
    println!("{}", state.status());

    loop {
        let mut hotkey_lost = false;
        select! {
            recv(lines) -> line => {
                let Ok(line) = line else {
                    info!("input closed");
                    break;
                };
                if line.trim().is_empty() {
                    continue;
                }
                let cmd = match line.parse::<Command>() {
                    Ok(cmd) => cmd,
                    Err(e) => {
                        println!("{} (type `help`)", e);
                        continue;
                    }
                };
                match state.handle(cmd) {
                    Ok(Flow::Continue) => {}
                    Ok(Flow::Rebind(binding)) => hotkey.set_binding(binding),
                    Ok(Flow::Quit) => break,
                    Err(e) => {
                        warn!(error = %e, "command failed");
                        println!("{}", e);
                    }
                }
            }
            recv(hotkey_rx) -> event => match event {
                Ok(HotkeyEvent::Triggered(_)) => state.toggle(),
                Err(_) => hotkey_lost = true,
            },
            recv(ticker) -> _ => {
                if let Some(count) = state.tick() {
                    println!("Clicks: {}", count);
                }
            }
        }

        if hotkey_lost {
            warn!("hotkey listener stopped, hotkey disabled");
            hotkey_rx = never();
        }
    }

    state.shutdown()
}

fn build_engine() -> Result<(ClickEngine, CursorFn), AppError> {
    if std::env::var(DRY_RUN_ENV).is_ok_and(|v| v == "1") {
        info!("dry run, clicks are only logged");
        let cursor: CursorFn = Box::new(|| None);
        return Ok((ClickEngine::new(NoopEmitter), cursor));
    }

    let emitter = Arc::new(EnigoEmitter::new()?);
    let engine = ClickEngine::new(emitter.clone());
    let cursor: CursorFn = Box::new(move || match emitter.cursor_position() {
        Ok(point) => Some(point),
        Err(e) => {
            warn!(error = %e, "failed to read pointer position");
            None
        }
    });
    Ok((engine, cursor))
}

/// Forward stdin lines to the control loop. The channel closes at EOF.
fn spawn_stdin_reader() -> Receiver<String> {
    let (tx, rx) = bounded(16);
    thread::spawn(move || {
        for line in std::io::stdin().lock().lines() {
            match line {
                Ok(line) => {
                    if tx.send(line).is_err() {
                        break;
                    }
                }
                Err(e) => {
                    warn!(error = %e, "failed to read stdin");
                    break;
                }
            }
        }
    });
    rx
}
