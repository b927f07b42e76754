//! Click injection implementations.

use crate::{PlatformError, PlatformResult};
use autoclick_core::{ButtonEvent, ClickEmitter, ClickKind, Point};
use enigo::{Button, Coordinate, Direction, Enigo, Mouse, Settings};
use std::sync::{Mutex, MutexGuard};
use tracing::{debug, warn};

/// Emitter that only logs, for headless runs and UI development.
pub struct NoopEmitter;

impl ClickEmitter for NoopEmitter {
    fn move_to(&self, point: Point) -> Result<(), String> {
        debug!(?point, "NoopEmitter: would move pointer");
        Ok(())
    }

    fn send_buttons(&self, events: &[ButtonEvent]) -> Result<(), String> {
        debug!(?events, "NoopEmitter: would send buttons");
        Ok(())
    }
}

/// Real click emitter using the `enigo` crate.
pub struct EnigoEmitter {
    enigo: Mutex<Enigo>,
}

impl EnigoEmitter {
    pub fn new() -> PlatformResult<Self> {
        let enigo = Enigo::new(&Settings::default())
            .map_err(|e| PlatformError::Unavailable(format!("failed to create Enigo: {e}")))?;
        Ok(Self {
            enigo: Mutex::new(enigo),
        })
    }

    /// Current pointer location in screen coordinates.
    pub fn cursor_position(&self) -> PlatformResult<Point> {
        let enigo = self.lock()?;
        let (x, y) = enigo
            .location()
            .map_err(|e| PlatformError::InjectionFailed(e.to_string()))?;
        Ok(Point::new(x, y))
    }

    fn lock(&self) -> PlatformResult<MutexGuard<'_, Enigo>> {
        self.enigo
            .lock()
            .map_err(|_| PlatformError::Unavailable("enigo lock poisoned".into()))
    }
}

impl ClickEmitter for EnigoEmitter {
    fn move_to(&self, point: Point) -> Result<(), String> {
        let mut enigo = self.lock().map_err(|e| e.to_string())?;
        debug!(x = point.x, y = point.y, "moving pointer");
        enigo
            .move_mouse(point.x, point.y, Coordinate::Abs)
            .map_err(|e| PlatformError::InjectionFailed(e.to_string()).to_string())
    }

    fn send_buttons(&self, events: &[ButtonEvent]) -> Result<(), String> {
        // One lock for the whole batch so no other injection lands in between.
        let mut enigo = self.lock().map_err(|e| e.to_string())?;
        let mut held: Vec<Button> = Vec::with_capacity(events.len());

        for event in events {
            let result = match *event {
                ButtonEvent::Down(kind) => {
                    let button = to_enigo_button(kind);
                    enigo
                        .button(button, Direction::Press)
                        .map(|()| held.push(button))
                }
                ButtonEvent::Up(kind) => {
                    let button = to_enigo_button(kind);
                    enigo
                        .button(button, Direction::Release)
                        .map(|()| held.retain(|b| *b != button))
                }
            };

            if let Err(e) = result {
                release_held(&mut enigo, &held);
                return Err(PlatformError::InjectionFailed(e.to_string()).to_string());
            }
        }

        debug!(?events, "buttons sent");
        Ok(())
    }
}

/// Best-effort release of buttons a failed batch left pressed.
fn release_held(enigo: &mut Enigo, held: &[Button]) {
    for button in held {
        if let Err(e) = enigo.button(*button, Direction::Release) {
            warn!(?button, error = %e, "failed to release button");
        }
    }
}

fn to_enigo_button(kind: ClickKind) -> Button {
    match kind {
        ClickKind::Left => Button::Left,
        ClickKind::Right => Button::Right,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_button_mapping() {
        assert!(matches!(to_enigo_button(ClickKind::Left), Button::Left));
        assert!(matches!(to_enigo_button(ClickKind::Right), Button::Right));
    }

    #[test]
    fn test_noop_emitter_accepts_everything() {
        let emitter = NoopEmitter;
        assert!(emitter.move_to(Point::new(-5, 5)).is_ok());
        assert!(emitter
            .send_buttons(&ButtonEvent::click(ClickKind::Right))
            .is_ok());
    }
}
