//! Glossa hotkey crate - global keyboard interception and chord classification.
//!
//! Splits the problem in two: a pure classifier state machine
//! ([`HotkeyClassifier`]) that decides trigger/release/consume for every raw
//! key event, and a platform listener ([`HotkeyListener`]) that installs the
//! OS hook on a dedicated thread and forwards notifications to the engine's
//! context over a non-blocking channel.

pub mod classifier;
pub mod keys;
pub mod listener;

pub use classifier::{Classification, HotkeyClassifier, HotkeyNotification, Verdict};
pub use keys::{Key, ModifierKey, Modifiers};
pub use listener::{HotkeyListener, ListenerEvent};
