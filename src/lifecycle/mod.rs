//! Daemon lifecycle: shutdown and settings-reload signals

mod signals;

pub use signals::{ReloadSignal, ShutdownSignal};
