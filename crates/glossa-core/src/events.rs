use serde::{Deserialize, Serialize};

use crate::types::{HotkeyAction, TargetLanguage, Timestamp};

/// All domain events that can occur in the Glossa system.
///
/// Events are emitted by the engine and the hotkey listener after state
/// changes and consumed by:
/// - Presentation collaborators (HUD toast / result panel)
/// - The log output of the composition root
#[derive(Clone, Debug, Serialize, Deserialize)]
#[non_exhaustive]
pub enum GlossaEvent {
    // =========================================================================
    // Sequence outcomes
    // =========================================================================
    /// A hotkey trigger was accepted and a capture sequence started.
    TriggerAccepted {
        language: TargetLanguage,
        action: HotkeyAction,
        timestamp: Timestamp,
    },

    /// A trigger arrived while a sequence was in flight and was dropped.
    TriggerDropped {
        language: TargetLanguage,
        timestamp: Timestamp,
    },

    /// An in-place replacement completed; the translated text is carried
    /// for transient-notification display.
    TranslationApplied {
        translated_text: String,
        language: TargetLanguage,
        timestamp: Timestamp,
    },

    /// A popup-bound translation is ready; the selection was left untouched.
    TranslationReady {
        original_text: String,
        translated_text: String,
        language: TargetLanguage,
        timestamp: Timestamp,
    },

    /// The simulated copy produced nothing new; no translation was requested.
    NoSelection { timestamp: Timestamp },

    /// A sequence failed; `message` is the user-facing description.
    TranslationFailed {
        message: String,
        timestamp: Timestamp,
    },

    // =========================================================================
    // Listener lifecycle
    // =========================================================================
    /// The keyboard hook was installed and triggers are being delivered.
    ListenerStarted { timestamp: Timestamp },

    /// The hook could not be installed or was lost and could not be
    /// re-installed; the user must grant permission and restart the listener.
    PermissionDenied { timestamp: Timestamp },

    /// The OS removed the keyboard hook and re-installation failed
    /// repeatedly; triggers are no longer delivered.
    HookLost { timestamp: Timestamp },
}
