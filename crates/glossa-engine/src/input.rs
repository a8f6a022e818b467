//! Simulated copy/paste keystrokes via Windows SendInput.
//!
//! On Windows, synthesizes Ctrl+C / Ctrl+V chords as virtual-key events.
//! The events carry the injected flag, so the hotkey hook passes them
//! through without classifying them.
//!
//! On non-Windows, provides a stub that returns an error.

use glossa_core::error::{GlossaError, Result};

/// Synthesizes "copy" and "paste" key chords at the OS input layer.
pub trait InputSimulator: Send + Sync {
    /// Press and release Ctrl+C in the focused application.
    fn send_copy(&self) -> Result<()>;

    /// Press and release Ctrl+V in the focused application.
    fn send_paste(&self) -> Result<()>;
}

/// Production input simulator.
pub struct SystemInput;

impl SystemInput {
    pub fn new() -> Self {
        Self
    }

    /// Send a Ctrl+<letter> chord: Ctrl down, letter down, letter up,
    /// Ctrl up, in one `SendInput` batch.
    #[cfg(target_os = "windows")]
    fn send_chord(&self, vk_letter: u16, label: &str) -> Result<()> {
        use windows_sys::Win32::UI::Input::KeyboardAndMouse::{
            SendInput, INPUT, INPUT_0, INPUT_KEYBOARD, KEYBDINPUT, KEYEVENTF_KEYUP, VK_CONTROL,
        };

        let chord: [(u16, bool); 4] = [
            (VK_CONTROL, false),
            (vk_letter, false),
            (vk_letter, true),
            (VK_CONTROL, true),
        ];

        let inputs: Vec<INPUT> = chord
            .iter()
            .map(|&(vk, key_up)| INPUT {
                r#type: INPUT_KEYBOARD,
                Anonymous: INPUT_0 {
                    ki: KEYBDINPUT {
                        wVk: vk,
                        wScan: 0,
                        dwFlags: if key_up { KEYEVENTF_KEYUP } else { 0 },
                        time: 0,
                        dwExtraInfo: 0,
                    },
                },
            })
            .collect();

        let sent = unsafe {
            SendInput(
                inputs.len() as u32,
                inputs.as_ptr(),
                std::mem::size_of::<INPUT>() as i32,
            )
        };

        if sent as usize != inputs.len() {
            return Err(GlossaError::Inject(format!(
                "SendInput only sent {} of {} events for {}",
                sent,
                inputs.len(),
                label
            )));
        }

        tracing::debug!(chord = label, "Key chord injected");
        Ok(())
    }
}

impl Default for SystemInput {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(target_os = "windows")]
impl InputSimulator for SystemInput {
    fn send_copy(&self) -> Result<()> {
        // 0x43 = 'C'
        self.send_chord(0x43, "Ctrl+C")
    }

    fn send_paste(&self) -> Result<()> {
        // 0x56 = 'V'
        self.send_chord(0x56, "Ctrl+V")
    }
}

#[cfg(not(target_os = "windows"))]
impl InputSimulator for SystemInput {
    fn send_copy(&self) -> Result<()> {
        Err(GlossaError::Inject(
            "Input simulation is only available on Windows".into(),
        ))
    }

    fn send_paste(&self) -> Result<()> {
        Err(GlossaError::Inject(
            "Input simulation is only available on Windows".into(),
        ))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
