//! Coordination state machine with thread-safe transitions.
//!
//! Enforces the strictly sequential lifecycle of a translation sequence:
//! - Idle -> Capturing (trigger accepted, clipboard snapshot taken)
//! - Capturing -> Translating (selection captured, backend call starts)
//! - Translating -> Applying (translation received, result being applied)
//! - Applying -> Idle (sequence complete)
//! - Capturing -> Idle (no selection)
//! - Translating -> Idle (translation failed)
//!
//! `Idle -> Capturing` doubles as the single-flight guard: a trigger is
//! accepted only when [`StateMachine::try_begin`] wins that transition.

use std::fmt;
use std::sync::{Arc, Mutex};

use glossa_core::error::GlossaError;

/// Operational state of the orchestration engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EngineState {
    /// No sequence in flight. Ready for the next trigger.
    Idle,
    /// Saving the clipboard and capturing the selection via simulated copy.
    Capturing,
    /// Waiting on the translation backend.
    Translating,
    /// Applying the result (in-place paste or side-channel hand-off).
    Applying,
}

impl fmt::Display for EngineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EngineState::Idle => write!(f, "Idle"),
            EngineState::Capturing => write!(f, "Capturing"),
            EngineState::Translating => write!(f, "Translating"),
            EngineState::Applying => write!(f, "Applying"),
        }
    }
}

impl EngineState {
    /// Returns whether a transition from `self` to `target` is valid.
    pub fn can_transition_to(&self, target: &EngineState) -> bool {
        matches!(
            (self, target),
            (EngineState::Idle, EngineState::Capturing)
                | (EngineState::Capturing, EngineState::Translating)
                | (EngineState::Translating, EngineState::Applying)
                | (EngineState::Applying, EngineState::Idle)
                // Early exits
                | (EngineState::Capturing, EngineState::Idle)
                | (EngineState::Translating, EngineState::Idle)
        )
    }
}

/// Thread-safe state machine for the coordination state.
///
/// Wraps `EngineState` in an `Arc<Mutex<>>` to allow safe concurrent access.
/// All transitions are validated before being applied, returning an error
/// if the requested transition is not permitted.
#[derive(Debug, Clone)]
pub struct StateMachine {
    state: Arc<Mutex<EngineState>>,
}

impl Default for StateMachine {
    fn default() -> Self {
        Self::new()
    }
}

impl StateMachine {
    /// Create a new state machine initialized to `Idle`.
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(EngineState::Idle)),
        }
    }

    /// Returns the current state.
    pub fn current(&self) -> EngineState {
        *self.state.lock().expect("state mutex poisoned")
    }

    /// The single-flight guard: atomically transition `Idle -> Capturing`.
    ///
    /// Returns `true` if the sequence may begin; `false` when another
    /// sequence is in flight and the trigger must be dropped.
    pub fn try_begin(&self) -> bool {
        let mut state = self.state.lock().expect("state mutex poisoned");
        if *state == EngineState::Idle {
            tracing::debug!("Engine state: Idle -> Capturing");
            *state = EngineState::Capturing;
            true
        } else {
            false
        }
    }

    /// Attempt to transition to the target state.
    ///
    /// Returns `Ok(())` if the transition is valid, or a
    /// `GlossaError::Translation` if it is not allowed from the current
    /// state.
    pub fn transition(&self, target: EngineState) -> Result<(), GlossaError> {
        let mut state = self.state.lock().expect("state mutex poisoned");
        if state.can_transition_to(&target) {
            tracing::debug!("Engine state: {} -> {}", *state, target);
            *state = target;
            Ok(())
        } else {
            Err(GlossaError::Translation(format!(
                "Invalid state transition: {} -> {}",
                *state, target
            )))
        }
    }

    /// Force the state machine back to Idle (used for error recovery).
    pub fn reset(&self) {
        let mut state = self.state.lock().expect("state mutex poisoned");
        tracing::warn!("Engine state machine reset to Idle from {}", *state);
        *state = EngineState::Idle;
    }
}

// =============================================================================
// Tests
// =============================================================================
