//! Application state: owns the engine and the current settings record.

use crate::commands::{Command, PositionArg, HELP};
use crate::theme::{self, Theme};
use autoclick_core::{
    save_record, ClickEngine, ClickKind, ClickSettings, EngineEvent, EngineState, HotkeyBinding,
    Point, SettingsRecord, StorageError,
};
use std::path::PathBuf;
use thiserror::Error;
use tracing::{debug, info, warn};

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error(transparent)]
    Platform(#[from] autoclick_platform::PlatformError),
    #[error("stop the clicker before changing settings")]
    Busy,
    #[error("pointer position is not available")]
    CursorUnavailable,
}

/// What the control loop should do after a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    /// Hotkey changed; re-register it with the listener.
    Rebind(Option<HotkeyBinding>),
    Quit,
}

/// Reads the current pointer location, if the platform can.
pub type CursorFn = Box<dyn Fn() -> Option<Point> + Send>;

pub struct AppState {
    engine: ClickEngine,
    /// What the controls show; the engine gets a snapshot of it on start.
    record: SettingsRecord,
    settings_path: PathBuf,
    cursor: CursorFn,
    last_count: u64,
}

impl AppState {
    pub fn new(
        engine: ClickEngine,
        record: SettingsRecord,
        settings_path: PathBuf,
        cursor: CursorFn,
    ) -> Self {
        let last_count = engine.click_count();
        Self {
            engine,
            record,
            settings_path,
            cursor,
            last_count,
        }
    }

    pub fn record(&self) -> &SettingsRecord {
        &self.record
    }

    pub fn engine(&self) -> &ClickEngine {
        &self.engine
    }

    pub fn hotkey(&self) -> Option<HotkeyBinding> {
        self.record.hotkey()
    }

    /// Settings as the engine would receive them right now.
    pub fn click_settings(&self) -> ClickSettings {
        self.record.click_settings()
    }

    pub fn handle(&mut self, cmd: Command) -> Result<Flow, AppError> {
        debug!(?cmd, "handling command");

        match cmd {
            Command::Start => {
                self.engine.start(self.click_settings());
                self.print_state();
            }
            Command::Stop => {
                self.engine.stop();
                self.print_state();
            }
            Command::Toggle => self.toggle(),
            Command::Status => println!("{}", self.status()),
            Command::Help => println!("{}", HELP),
            Command::Interval(ms) => {
                self.ensure_stopped()?;
                let settings = self.click_settings();
                let updated = ClickSettings::new(ms, settings.kind, settings.target);
                self.record.apply_click_settings(&updated);
                println!("Interval: {} ms", updated.interval_ms);
            }
            Command::Button(kind) => {
                self.ensure_stopped()?;
                self.record.is_left_click = kind == ClickKind::Left;
                println!("Button: {}", kind);
            }
            Command::Position(arg) => {
                self.ensure_stopped()?;
                self.set_position(arg)?;
                println!("Position: {}", self.position_label());
            }
            Command::Hotkey(binding) => {
                self.record.set_hotkey(binding);
                save_record(&self.settings_path, &self.record)?;
                println!("Hotkey: {}", hotkey_label(binding));
                return Ok(Flow::Rebind(binding));
            }
            Command::Theme => {
                self.record.theme_index = theme::next_index(self.record.theme_index);
                save_record(&self.settings_path, &self.record)?;
                println!("Theme: {}", Theme::from_index(self.record.theme_index));
            }
            Command::Quit => return Ok(Flow::Quit),
        }

        Ok(Flow::Continue)
    }

    /// Shared by the toggle command and the hotkey.
    pub fn toggle(&mut self) {
        let state = self.engine.toggle(self.click_settings());
        info!(?state, "toggled");
        self.print_state();
    }

    /// Periodic refresh: log engine events and report new clicks.
    pub fn tick(&mut self) -> Option<u64> {
        for event in self.engine.drain_events() {
            match event {
                EngineEvent::EmitFailed { message } => debug!(%message, "emit failed"),
                other => debug!(event = ?other, "engine event"),
            }
        }

        let count = self.engine.click_count();
        if count == self.last_count {
            return None;
        }
        self.last_count = count;
        Some(count)
    }

    /// Stop the engine and persist settings.
    pub fn shutdown(&mut self) -> Result<(), AppError> {
        self.engine.stop();
        save_record(&self.settings_path, &self.record)?;
        info!(total_clicks = self.engine.click_count(), "shut down");
        Ok(())
    }

    pub fn status(&self) -> String {
        let settings = self.click_settings();
        let theme = Theme::from_index(self.record.theme_index);
        format!(
            "Status: {}\nClicks: {}\nInterval: {} ms\nButton: {}\nPosition: {}\nHotkey: {}\nTheme: {}{}",
            state_label(self.engine.state()),
            self.engine.click_count(),
            settings.interval_ms,
            settings.kind,
            self.position_label(),
            hotkey_label(self.hotkey()),
            theme,
            if theme.is_animated() { " (animated)" } else { "" },
        )
    }

    fn set_position(&mut self, arg: PositionArg) -> Result<(), AppError> {
        match arg {
            PositionArg::Fixed(point) => self.fix_position(point),
            PositionArg::Current => self.record.fixed_position = false,
            PositionArg::Here => {
                let point = (self.cursor)().ok_or(AppError::CursorUnavailable)?;
                self.fix_position(point);
            }
        }
        Ok(())
    }

    fn fix_position(&mut self, point: Point) {
        self.record.fixed_position = true;
        self.record.x = point.x;
        self.record.y = point.y;
    }

    fn ensure_stopped(&self) -> Result<(), AppError> {
        if self.engine.is_running() {
            warn!("settings change rejected while running");
            return Err(AppError::Busy);
        }
        Ok(())
    }

    fn position_label(&self) -> String {
        match self.click_settings().target {
            Some(p) => format!("fixed ({}, {})", p.x, p.y),
            None => "current".to_string(),
        }
    }

    fn print_state(&self) {
        println!("Status: {}", state_label(self.engine.state()));
    }
}

fn state_label(state: EngineState) -> &'static str {
    match state {
        EngineState::Running => "Running",
        EngineState::Stopped => "Stopped",
    }
}

pub fn hotkey_label(binding: Option<HotkeyBinding>) -> String {
    binding.map_or_else(|| "None".to_string(), |b| b.to_string())
}
