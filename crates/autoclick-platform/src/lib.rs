//! autoclick-platform: platform-specific I/O boundary for autoclick.
//!
//! This crate provides:
//! - Click injection via `enigo`
//! - A global toggle hotkey listener via `rdev`
//!
//! ## Module Structure
//!
//! - `error` - Common error types
//! - `injector` - `ClickEmitter` implementations
//! - `hotkey` - Global hotkey listener

mod error;
mod hotkey;
mod injector;

pub use error::{PlatformError, PlatformResult};

pub use injector::{EnigoEmitter, NoopEmitter};

pub use hotkey::{start_hotkey_listener, HotkeyEvent, HotkeyHandle, HotkeyMatcher};
