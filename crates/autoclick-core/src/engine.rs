//! Click engine: Stopped/Running state machine + emission thread.

use crate::{ClickKind, ClickSettings, Point};
use crossbeam_channel::{bounded, Receiver, RecvTimeoutError, Sender, TrySendError};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::thread::{self, JoinHandle};
use tracing::{debug, error, info, warn};

/// Engine state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum EngineState {
    #[default]
    Stopped,
    Running,
}

/// Events emitted by the engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum EngineEvent {
    /// A worker was spawned with this snapshot.
    Started { settings: ClickSettings },
    /// The worker exited.
    Stopped { total_clicks: u64 },
    /// Moving the pointer or submitting a click failed. Sent once per
    /// streak of consecutive failures.
    EmitFailed { message: String },
}

/// One half of a click.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ButtonEvent {
    Down(ClickKind),
    Up(ClickKind),
}

impl ButtonEvent {
    /// The down/up pair making up one click.
    pub fn click(kind: ClickKind) -> [ButtonEvent; 2] {
        [ButtonEvent::Down(kind), ButtonEvent::Up(kind)]
    }
}

/// Trait for synthesizing pointer input (implemented by autoclick-platform).
///
/// `send_buttons` receives a whole click at once so the implementation can
/// submit it as one batch. If a `Down` went through, the matching `Up` must be
/// attempted before returning, even when reporting an error.
pub trait ClickEmitter: Send + Sync {
    fn move_to(&self, point: Point) -> Result<(), String>;
    fn send_buttons(&self, events: &[ButtonEvent]) -> Result<(), String>;
}

impl<E: ClickEmitter + ?Sized> ClickEmitter for Arc<E> {
    fn move_to(&self, point: Point) -> Result<(), String> {
        (**self).move_to(point)
    }

    fn send_buttons(&self, events: &[ButtonEvent]) -> Result<(), String> {
        (**self).send_buttons(events)
    }
}

struct Worker {
    stop_tx: Sender<()>,
    thread: JoinHandle<()>,
}

/// Owns the emission thread. Share it by reference or `Arc`; all control
/// methods take `&self`.
pub struct ClickEngine {
    emitter: Arc<dyn ClickEmitter>,
    running: Arc<AtomicBool>,
    click_count: Arc<AtomicU64>,
    runs_started: AtomicU64,
    /// Held across every transition so check + spawn and signal + join are atomic.
    worker: Mutex<Option<Worker>>,
    event_tx: Sender<EngineEvent>,
    event_rx: Receiver<EngineEvent>,
}

impl ClickEngine {
    pub fn new(emitter: impl ClickEmitter + 'static) -> Self {
        Self::with_shared(Arc::new(emitter))
    }

    pub fn with_shared(emitter: Arc<dyn ClickEmitter>) -> Self {
        let (event_tx, event_rx) = bounded(256);
        Self {
            emitter,
            running: Arc::new(AtomicBool::new(false)),
            click_count: Arc::new(AtomicU64::new(0)),
            runs_started: AtomicU64::new(0),
            worker: Mutex::new(None),
            event_tx,
            event_rx,
        }
    }

    /// Start clicking with a private copy of `settings`. No-op while running.
    pub fn start(&self, settings: ClickSettings) {
        let mut slot = self.lock_worker();
        if slot.is_some() && !self.is_running() {
            // Only a dying worker clears the flag while still in the slot.
            self.finish(slot.take());
        }
        if slot.is_some() {
            debug!("start ignored, engine already running");
            return;
        }

        let (stop_tx, stop_rx) = bounded::<()>(1);
        self.running.store(true, Ordering::SeqCst);

        let ctx = LoopContext {
            settings,
            emitter: self.emitter.clone(),
            running: self.running.clone(),
            click_count: self.click_count.clone(),
            stop_rx,
            event_tx: self.event_tx.clone(),
        };
        let thread = thread::spawn(move || ctx.run());

        self.runs_started.fetch_add(1, Ordering::SeqCst);
        info!(
            interval_ms = settings.interval_ms,
            kind = %settings.kind,
            target = ?settings.target,
            "click engine started"
        );
        self.emit(EngineEvent::Started { settings });
        *slot = Some(Worker { stop_tx, thread });
    }

    /// Stop clicking and wait for the worker to exit. No-op while stopped.
    ///
    /// Once this returns no further click is emitted.
    pub fn stop(&self) {
        let mut slot = self.lock_worker();
        self.finish(slot.take());
    }

    /// Stop when running, start otherwise. Returns the resulting state.
    pub fn toggle(&self, settings: ClickSettings) -> EngineState {
        if self.is_running() {
            self.stop();
        } else {
            self.start(settings);
        }
        self.state()
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    pub fn state(&self) -> EngineState {
        if self.is_running() {
            EngineState::Running
        } else {
            EngineState::Stopped
        }
    }

    /// Total clicks emitted by this engine, across runs.
    pub fn click_count(&self) -> u64 {
        self.click_count.load(Ordering::SeqCst)
    }

    /// Number of worker threads spawned so far.
    pub fn runs_started(&self) -> u64 {
        self.runs_started.load(Ordering::SeqCst)
    }

    /// Drain all pending events (non-blocking).
    pub fn drain_events(&self) -> Vec<EngineEvent> {
        let mut events = Vec::new();
        while let Ok(event) = self.event_rx.try_recv() {
            events.push(event);
        }
        events
    }

    fn lock_worker(&self) -> MutexGuard<'_, Option<Worker>> {
        // A poisoned slot still holds a valid Option; keep going with it.
        self.worker.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Signal, join and report one worker. Caller holds the worker slot.
    fn finish(&self, worker: Option<Worker>) {
        let Some(worker) = worker else {
            return;
        };

        self.running.store(false, Ordering::SeqCst);
        // Full or disconnected both mean the worker is already on its way out.
        let _ = worker.stop_tx.try_send(());

        if worker.thread.join().is_err() {
            error!("click worker panicked");
        }

        let total_clicks = self.click_count();
        info!(total_clicks, "click engine stopped");
        self.emit(EngineEvent::Stopped { total_clicks });
    }

    /// Lifecycle events evict the oldest pending event rather than being lost.
    fn emit(&self, mut event: EngineEvent) {
        loop {
            match self.event_tx.try_send(event) {
                Ok(()) => return,
                Err(TrySendError::Full(rejected)) => {
                    if let Ok(dropped) = self.event_rx.try_recv() {
                        debug!(event = ?dropped, "dropping oldest engine event");
                    }
                    event = rejected;
                }
                Err(TrySendError::Disconnected(_)) => return,
            }
        }
    }
}

impl Drop for ClickEngine {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Everything the worker thread owns.
struct LoopContext {
    settings: ClickSettings,
    emitter: Arc<dyn ClickEmitter>,
    running: Arc<AtomicBool>,
    click_count: Arc<AtomicU64>,
    stop_rx: Receiver<()>,
    event_tx: Sender<EngineEvent>,
}

impl LoopContext {
    fn run(self) {
        info!("click worker started");
        let _running = RunningGuard(&self.running);

        let interval = self.settings.interval();
        let pair = ButtonEvent::click(self.settings.kind);
        let mut move_failing = false;
        let mut click_failing = false;

        while self.running.load(Ordering::SeqCst) {
            if let Some(point) = self.settings.target {
                match self.emitter.move_to(point) {
                    Ok(()) => move_failing = false,
                    Err(message) => {
                        self.report_failure(&mut move_failing, "pointer move failed", message)
                    }
                }
            }

            match self.emitter.send_buttons(&pair) {
                Ok(()) => {
                    let count = self.click_count.fetch_add(1, Ordering::SeqCst) + 1;
                    debug!(count, "click emitted");
                    click_failing = false;
                }
                Err(message) => self.report_failure(&mut click_failing, "click failed", message),
            }

            match self.stop_rx.recv_timeout(interval) {
                Err(RecvTimeoutError::Timeout) => continue,
                Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
            }
        }

        info!("click worker exiting");
    }

    /// Warn and emit an event on the first failure of a streak only.
    fn report_failure(&self, failing: &mut bool, what: &str, message: String) {
        if *failing {
            debug!(error = %message, "{} again", what);
            return;
        }
        warn!(error = %message, "{}", what);
        *failing = true;
        let _ = self.event_tx.try_send(EngineEvent::EmitFailed { message });
    }
}

/// Clears the running flag when the worker exits, including by panic.
struct RunningGuard<'a>(&'a AtomicBool);

impl Drop for RunningGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}
