//! Glossa engine crate - capture/translate/apply orchestration.
//!
//! Owns the coordination state machine and the single-flight invariant:
//! at most one translation sequence runs at a time, the clipboard snapshot
//! is restored on every exit path, and triggers arriving mid-sequence are
//! dropped rather than queued. The clipboard mediator and input simulator
//! live here too; both are thin but safety-critical.

pub mod clipboard;
pub mod engine;
pub mod input;
pub mod state;

pub use clipboard::{ClipboardMediator, MemoryClipboard, SystemClipboard};
pub use engine::TranslationEngine;
pub use input::{InputSimulator, SystemInput};
pub use state::{EngineState, StateMachine};
