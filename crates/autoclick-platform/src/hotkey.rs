//! Global toggle hotkey, built on `rdev::listen`.

use autoclick_core::hotkey::key_from_name;
use autoclick_core::{HotkeyBinding, HotkeyModifiers};
use crossbeam_channel::{bounded, Receiver, Sender};
use rdev::{listen, Event, EventType, Key};
use std::thread::{self, JoinHandle};
use tracing::{debug, error, info, warn};

/// Events emitted by the listener.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HotkeyEvent {
    /// The bound combination was pressed.
    Triggered(HotkeyBinding),
}

/// Tracks modifier state and decides when the binding fires.
///
/// Fires once per press; OS auto-repeat is swallowed until the main key is
/// released. Bindings have no Win/Cmd modifier, so holding Meta blocks them.
#[derive(Debug, Default)]
pub struct HotkeyMatcher {
    binding: Option<HotkeyBinding>,
    shift: [bool; 2],
    ctrl: [bool; 2],
    alt: [bool; 2],
    meta: [bool; 2],
    fired: bool,
}

impl HotkeyMatcher {
    pub fn new(binding: Option<HotkeyBinding>) -> Self {
        Self {
            binding,
            ..Self::default()
        }
    }

    pub fn set_binding(&mut self, binding: Option<HotkeyBinding>) {
        self.binding = binding;
        self.fired = false;
    }

    pub fn binding(&self) -> Option<HotkeyBinding> {
        self.binding
    }

    pub fn modifiers(&self) -> HotkeyModifiers {
        HotkeyModifiers {
            shift: self.shift.iter().any(|&d| d),
            ctrl: self.ctrl.iter().any(|&d| d),
            alt: self.alt.iter().any(|&d| d),
        }
    }

    /// Feed one input event. Returns the binding when it fires.
    pub fn on_event(&mut self, event: &EventType) -> Option<HotkeyBinding> {
        match *event {
            EventType::KeyPress(key) => {
                self.update_modifier(key, true);
                let binding = self.binding?;
                let vk = vk_from_rdev(key)?;
                let meta = self.meta.iter().any(|&d| d);
                if !self.fired && !meta && binding.matches(vk, self.modifiers()) {
                    self.fired = true;
                    return Some(binding);
                }
                None
            }
            EventType::KeyRelease(key) => {
                self.update_modifier(key, false);
                if let (Some(binding), Some(vk)) = (self.binding, vk_from_rdev(key)) {
                    if binding.vk == vk {
                        self.fired = false;
                    }
                }
                None
            }
            _ => None,
        }
    }

    fn update_modifier(&mut self, key: Key, down: bool) {
        match key {
            Key::ShiftLeft => self.shift[0] = down,
            Key::ShiftRight => self.shift[1] = down,
            Key::ControlLeft => self.ctrl[0] = down,
            Key::ControlRight => self.ctrl[1] = down,
            Key::Alt => self.alt[0] = down,
            Key::AltGr => self.alt[1] = down,
            Key::MetaLeft => self.meta[0] = down,
            Key::MetaRight => self.meta[1] = down,
            _ => {}
        }
    }
}

/// Handle to the listener thread.
pub struct HotkeyHandle {
    event_rx: Receiver<HotkeyEvent>,
    binding_tx: Sender<Option<HotkeyBinding>>,
    stop_tx: Sender<()>,
    thread: Option<JoinHandle<()>>,
}

impl HotkeyHandle {
    /// Channel of fired hotkeys, for use in `select!`.
    pub fn receiver(&self) -> &Receiver<HotkeyEvent> {
        &self.event_rx
    }

    /// Try to receive an event (non-blocking).
    pub fn try_recv(&self) -> Option<HotkeyEvent> {
        self.event_rx.try_recv().ok()
    }

    /// Replace the binding. Takes effect on the next input event.
    pub fn set_binding(&self, binding: Option<HotkeyBinding>) {
        if let Err(e) = self.binding_tx.try_send(binding) {
            warn!("Failed to update hotkey binding: {}", e);
        }
    }

    /// Signal the hook to stop forwarding events.
    pub fn stop(&self) {
        let _ = self.stop_tx.try_send(());
    }

    /// Check if the hook thread is still running.
    pub fn is_running(&self) -> bool {
        self.thread.as_ref().is_some_and(|t| !t.is_finished())
    }
}

impl Drop for HotkeyHandle {
    fn drop(&mut self) {
        self.stop();
        // rdev::listen never returns, so the thread is detached rather than joined.
        let _ = self.thread.take();
    }
}

/// Start listening for `binding` system-wide.
pub fn start_hotkey_listener(binding: Option<HotkeyBinding>) -> HotkeyHandle {
    let (event_tx, event_rx) = bounded(16);
    let (binding_tx, binding_rx) = bounded(16);
    let (stop_tx, stop_rx) = bounded(1);

    let thread = thread::spawn(move || {
        run_listener(binding, event_tx, binding_rx, stop_rx);
    });

    HotkeyHandle {
        event_rx,
        binding_tx,
        stop_tx,
        thread: Some(thread),
    }
}

fn run_listener(
    binding: Option<HotkeyBinding>,
    event_tx: Sender<HotkeyEvent>,
    binding_rx: Receiver<Option<HotkeyBinding>>,
    stop_rx: Receiver<()>,
) {
    info!("Hotkey listener started (rdev)");
    let mut matcher = HotkeyMatcher::new(binding);
    let mut stopped = false;

    let callback = move |event: Event| {
        if stopped || stop_rx.try_recv().is_ok() {
            stopped = true;
            return;
        }

        while let Ok(binding) = binding_rx.try_recv() {
            debug!(?binding, "hotkey binding updated");
            matcher.set_binding(binding);
        }

        if let Some(binding) = matcher.on_event(&event.event_type) {
            info!(hotkey = %binding, "hotkey triggered");
            if let Err(e) = event_tx.try_send(HotkeyEvent::Triggered(binding)) {
                warn!("Failed to send hotkey event: {}", e);
            }
        }
    };

    if let Err(error) = listen(callback) {
        error!(?error, "Hotkey listener error");
    }

    info!("Hotkey listener exiting");
}

/// Virtual-key code for an rdev key. Modifier keys map to `None`.
pub fn vk_from_rdev(key: Key) -> Option<u8> {
    let name = match key {
        Key::KeyA => "a",
        Key::KeyB => "b",
        Key::KeyC => "c",
        Key::KeyD => "d",
        Key::KeyE => "e",
        Key::KeyF => "f",
        Key::KeyG => "g",
        Key::KeyH => "h",
        Key::KeyI => "i",
        Key::KeyJ => "j",
        Key::KeyK => "k",
        Key::KeyL => "l",
        Key::KeyM => "m",
        Key::KeyN => "n",
        Key::KeyO => "o",
        Key::KeyP => "p",
        Key::KeyQ => "q",
        Key::KeyR => "r",
        Key::KeyS => "s",
        Key::KeyT => "t",
        Key::KeyU => "u",
        Key::KeyV => "v",
        Key::KeyW => "w",
        Key::KeyX => "x",
        Key::KeyY => "y",
        Key::KeyZ => "z",
        Key::Num0 => "0",
        Key::Num1 => "1",
        Key::Num2 => "2",
        Key::Num3 => "3",
        Key::Num4 => "4",
        Key::Num5 => "5",
        Key::Num6 => "6",
        Key::Num7 => "7",
        Key::Num8 => "8",
        Key::Num9 => "9",
        Key::F1 => "f1",
        Key::F2 => "f2",
        Key::F3 => "f3",
        Key::F4 => "f4",
        Key::F5 => "f5",
        Key::F6 => "f6",
        Key::F7 => "f7",
        Key::F8 => "f8",
        Key::F9 => "f9",
        Key::F10 => "f10",
        Key::F11 => "f11",
        Key::F12 => "f12",
        Key::Backspace => "backspace",
        Key::Tab => "tab",
        Key::Return => "enter",
        Key::Pause => "pause",
        Key::Escape => "escape",
        Key::Space => "space",
        Key::PageUp => "pageup",
        Key::PageDown => "pagedown",
        Key::End => "end",
        Key::Home => "home",
        Key::LeftArrow => "left",
        Key::UpArrow => "up",
        Key::RightArrow => "right",
        Key::DownArrow => "down",
        Key::Insert => "insert",
        Key::Delete => "delete",
        _ => return None,
    };
    key_from_name(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn binding(s: &str) -> HotkeyBinding {
        s.parse().unwrap()
    }

    #[test]
    fn test_vk_mapping() {
        assert_eq!(vk_from_rdev(Key::KeyA), Some(0x41));
        assert_eq!(vk_from_rdev(Key::Num7), Some(0x37));
        assert_eq!(vk_from_rdev(Key::F6), Some(0x75));
        assert_eq!(vk_from_rdev(Key::Space), Some(0x20));
        assert_eq!(vk_from_rdev(Key::ShiftLeft), None);
        assert_eq!(vk_from_rdev(Key::Unknown(999)), None);
    }

    #[test]
    fn test_fires_once_per_press() {
        let mut matcher = HotkeyMatcher::new(Some(binding("f6")));

        assert!(matcher.on_event(&EventType::KeyPress(Key::F6)).is_some());
        // Auto-repeat while held.
        assert!(matcher.on_event(&EventType::KeyPress(Key::F6)).is_none());
        assert!(matcher.on_event(&EventType::KeyRelease(Key::F6)).is_none());
        assert!(matcher.on_event(&EventType::KeyPress(Key::F6)).is_some());
    }

    #[test]
    fn test_requires_exact_modifiers() {
        let mut matcher = HotkeyMatcher::new(Some(binding("ctrl+shift+s")));

        assert!(matcher.on_event(&EventType::KeyPress(Key::KeyS)).is_none());
        matcher.on_event(&EventType::KeyRelease(Key::KeyS));

        matcher.on_event(&EventType::KeyPress(Key::ControlRight));
        assert!(matcher.on_event(&EventType::KeyPress(Key::KeyS)).is_none());
        matcher.on_event(&EventType::KeyRelease(Key::KeyS));

        matcher.on_event(&EventType::KeyPress(Key::ShiftLeft));
        assert_eq!(
            matcher.on_event(&EventType::KeyPress(Key::KeyS)),
            Some(binding("ctrl+shift+s"))
        );
        matcher.on_event(&EventType::KeyRelease(Key::KeyS));

        // Extra modifier held: no match.
        matcher.on_event(&EventType::KeyPress(Key::Alt));
        assert!(matcher.on_event(&EventType::KeyPress(Key::KeyS)).is_none());
    }

    #[test]
    fn test_meta_blocks_binding() {
        let mut matcher = HotkeyMatcher::new(Some(binding("ctrl+f6")));

        matcher.on_event(&EventType::KeyPress(Key::ControlLeft));
        matcher.on_event(&EventType::KeyPress(Key::MetaLeft));
        assert!(matcher.on_event(&EventType::KeyPress(Key::F6)).is_none());
        matcher.on_event(&EventType::KeyRelease(Key::F6));

        matcher.on_event(&EventType::KeyRelease(Key::MetaLeft));
        assert!(matcher.on_event(&EventType::KeyPress(Key::F6)).is_some());
    }

    #[test]
    fn test_either_side_counts_as_modifier() {
        let mut matcher = HotkeyMatcher::new(None);
        matcher.on_event(&EventType::KeyPress(Key::ShiftLeft));
        matcher.on_event(&EventType::KeyPress(Key::ShiftRight));
        matcher.on_event(&EventType::KeyRelease(Key::ShiftLeft));
        assert!(matcher.modifiers().shift);
        matcher.on_event(&EventType::KeyRelease(Key::ShiftRight));
        assert!(!matcher.modifiers().shift);
    }

    #[test]
    fn test_unbound_and_rebinding() {
        let mut matcher = HotkeyMatcher::new(None);
        assert!(matcher.on_event(&EventType::KeyPress(Key::F8)).is_none());

        matcher.set_binding(Some(binding("f8")));
        assert!(matcher.on_event(&EventType::KeyPress(Key::F8)).is_some());

        matcher.set_binding(None);
        matcher.on_event(&EventType::KeyRelease(Key::F8));
        assert!(matcher.on_event(&EventType::KeyPress(Key::F8)).is_none());
        assert_eq!(matcher.binding(), None);
    }

    #[test]
    fn test_mouse_events_ignored() {
        let mut matcher = HotkeyMatcher::new(Some(binding("f6")));
        let event = EventType::MouseMove { x: 1.0, y: 2.0 };
        assert!(matcher.on_event(&event).is_none());
    }
}
