//! Hotkey classification state machine.
//!
//! Turns a stream of raw key-down/key-up events into trigger and release
//! notifications, and decides for every event whether it is consumed or
//! passed through to the rest of the system. The classifier is pure state:
//! it performs no I/O and holds no locks, so it is safe to run inside the
//! interception callback.
//!
//! Arming rules:
//! - A mapped letter pressed while exactly Ctrl+Alt are held arms that
//!   hotkey and emits one `Triggered` notification; the key-down is
//!   consumed so it never reaches the focused application.
//! - Key-down repeats of the armed letter are consumed without
//!   re-triggering, for as long as the letter stays down.
//! - The armed hotkey disarms when its letter or a required modifier goes
//!   up. A `Released` notification is emitted only when release tracking
//!   is enabled; the disarm itself is unconditional.
//! - Everything else passes through unmodified.

use std::collections::HashMap;

use glossa_core::types::HotkeyBinding;

use crate::keys::{Key, Modifiers};

/// What the interception hook should do with the raw event.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Verdict {
    /// Swallow the event; other applications never see it.
    Consume,
    /// Forward the event unmodified.
    PassThrough,
}

/// Notification emitted toward the engine's context.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HotkeyNotification {
    Triggered(HotkeyBinding),
    Released(HotkeyBinding),
}

/// Result of classifying one raw key event.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Classification {
    pub verdict: Verdict,
    pub notification: Option<HotkeyNotification>,
}

impl Classification {
    fn pass() -> Self {
        Self {
            verdict: Verdict::PassThrough,
            notification: None,
        }
    }

    fn consume() -> Self {
        Self {
            verdict: Verdict::Consume,
            notification: None,
        }
    }
}

/// The hotkey state machine: held modifiers plus at most one armed hotkey.
#[derive(Debug)]
pub struct HotkeyClassifier {
    table: HashMap<char, HotkeyBinding>,
    release_tracking: bool,
    modifiers: Modifiers,
    armed: Option<char>,
}

impl HotkeyClassifier {
    pub fn new(bindings: &[HotkeyBinding], release_tracking: bool) -> Self {
        let table = bindings.iter().map(|b| (b.key, *b)).collect();
        Self {
            table,
            release_tracking,
            modifiers: Modifiers::default(),
            armed: None,
        }
    }

    /// The currently armed binding, if any.
    pub fn armed(&self) -> Option<HotkeyBinding> {
        self.armed.and_then(|key| self.table.get(&key).copied())
    }

    /// Forget all held state. Called after the hook is re-installed, when
    /// key-up events may have been missed.
    pub fn reset(&mut self) {
        self.modifiers = Modifiers::default();
        self.armed = None;
    }

    /// Classify one raw key event. `pressed` is true for key-down
    /// (including auto-repeat), false for key-up.
    pub fn process(&mut self, key: Key, pressed: bool) -> Classification {
        if pressed {
            self.on_key_down(key)
        } else {
            self.on_key_up(key)
        }
    }

    fn on_key_down(&mut self, key: Key) -> Classification {
        match key {
            Key::Modifier(m) => {
                self.modifiers.press(m);
                Classification::pass()
            }
            Key::Letter(c) => {
                if let Some(armed) = self.armed {
                    // Swallow repeats of the armed letter even if the
                    // modifier set has drifted: the press that armed it was
                    // consumed, so its repeats must not leak.
                    if armed == c {
                        return Classification::consume();
                    }
                    // A second qualifying chord while one hotkey is armed is
                    // swallowed without triggering: one armed hotkey at a
                    // time.
                    if self.table.contains_key(&c) && self.modifiers.chord_exact() {
                        return Classification::consume();
                    }
                    return Classification::pass();
                }
                match self.table.get(&c) {
                    Some(binding) if self.modifiers.chord_exact() => {
                        self.armed = Some(c);
                        tracing::debug!(hotkey = %binding, "Hotkey triggered");
                        Classification {
                            verdict: Verdict::Consume,
                            notification: Some(HotkeyNotification::Triggered(*binding)),
                        }
                    }
                    _ => Classification::pass(),
                }
            }
            Key::Other => Classification::pass(),
        }
    }

    fn on_key_up(&mut self, key: Key) -> Classification {
        match key {
            Key::Letter(c) => {
                if self.armed == Some(c) {
                    let notification = self.disarm();
                    return Classification {
                        verdict: Verdict::Consume,
                        notification,
                    };
                }
                Classification::pass()
            }
            Key::Modifier(m) => {
                self.modifiers.release(m);
                // Modifier-up events always pass through: swallowing them
                // would leave other applications with a stuck modifier.
                if self.armed.is_some() && m.is_required() {
                    let notification = self.disarm();
                    return Classification {
                        verdict: Verdict::PassThrough,
                        notification,
                    };
                }
                Classification::pass()
            }
            Key::Other => Classification::pass(),
        }
    }

    fn disarm(&mut self) -> Option<HotkeyNotification> {
        let binding = self.armed();
        self.armed = None;
        match binding {
            Some(b) if self.release_tracking => {
                tracing::debug!(hotkey = %b, "Hotkey released");
                Some(HotkeyNotification::Released(b))
            }
            _ => None,
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
