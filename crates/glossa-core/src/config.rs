use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::{GlossaError, Result};
use crate::types::{HotkeyAction, HotkeyBinding, TargetLanguage};

/// Top-level configuration for the Glossa application.
///
/// Loaded from `~/.glossa/config.toml` by default. Each section corresponds
/// to a component or cross-cutting concern.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GlossaConfig {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub hotkeys: HotkeysConfig,
    #[serde(default)]
    pub timing: TimingConfig,
    #[serde(default)]
    pub translator: TranslatorConfig,
}

impl Default for GlossaConfig {
    fn default() -> Self {
        Self {
            general: GeneralConfig::default(),
            hotkeys: HotkeysConfig::default(),
            timing: TimingConfig::default(),
            translator: TranslatorConfig::default(),
        }
    }
}

impl GlossaConfig {
    /// Load configuration from a TOML file.
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: GlossaConfig = toml::from_str(&content)?;
        info!("Configuration loaded from {}", path.display());
        Ok(config)
    }

    /// Load configuration from a TOML file, falling back to defaults if the
    /// file does not exist or cannot be parsed.
    pub fn load_or_default(path: &Path) -> Self {
        match Self::load(path) {
            Ok(config) => config,
            Err(e) => {
                warn!(
                    "Failed to load config from {}: {}. Using defaults.",
                    path.display(),
                    e
                );
                Self::default()
            }
        }
    }

    /// Save the current configuration to a TOML file.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content =
            toml::to_string_pretty(self).map_err(|e| GlossaError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        info!("Configuration saved to {}", path.display());
        Ok(())
    }
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Log level: trace, debug, info, warn, error.
    pub log_level: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}

/// Hotkey listener configuration.
///
/// The modifier chord (Ctrl+Alt) is fixed; only the letter bindings and the
/// release-tracking behavior are configurable.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HotkeysConfig {
    /// Emit a Release notification when an armed hotkey's letter or a
    /// required modifier goes up. Key-down repeats of an armed hotkey are
    /// suppressed regardless of this flag.
    pub release_tracking: bool,
    /// Seconds between proactive re-installations of the keyboard hook.
    /// The OS can silently remove a low-level hook; re-hooking on a timer
    /// is the only reliable recovery.
    pub rehook_interval_secs: u32,
    /// Letter-to-action binding table. Each entry maps one letter (pressed
    /// with Ctrl+Alt) to a target language and an apply action.
    pub bindings: Vec<BindingConfig>,
}

impl Default for HotkeysConfig {
    fn default() -> Self {
        Self {
            release_tracking: false,
            rehook_interval_secs: 30,
            bindings: vec![
                BindingConfig {
                    key: "E".to_string(),
                    language: "en".to_string(),
                    action: "replace".to_string(),
                },
                BindingConfig {
                    key: "S".to_string(),
                    language: "es".to_string(),
                    action: "replace".to_string(),
                },
                BindingConfig {
                    key: "W".to_string(),
                    language: "en".to_string(),
                    action: "popup".to_string(),
                },
            ],
        }
    }
}

/// One entry of the hotkey binding table, as written in TOML.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BindingConfig {
    /// Single ASCII letter, case-insensitive.
    pub key: String,
    /// Target language code ("en", "es", "fr", "de", "ja", "zh-CN").
    pub language: String,
    /// "replace" (in-place paste) or "popup" (side-channel display).
    pub action: String,
}

impl BindingConfig {
    /// Validate and convert this entry into a typed binding.
    pub fn resolve(&self) -> Result<HotkeyBinding> {
        let mut chars = self.key.chars();
        let letter = match (chars.next(), chars.next()) {
            (Some(c), None) if c.is_ascii_alphabetic() => c.to_ascii_uppercase(),
            _ => {
                return Err(GlossaError::Config(format!(
                    "Hotkey key must be a single letter, got '{}'",
                    self.key
                )))
            }
        };
        let language: TargetLanguage = self
            .language
            .parse()
            .map_err(GlossaError::Config)?;
        let action: HotkeyAction = self.action.parse().map_err(GlossaError::Config)?;
        Ok(HotkeyBinding {
            key: letter,
            language,
            action,
        })
    }
}

impl HotkeysConfig {
    /// Resolve the whole binding table, rejecting duplicate letters.
    pub fn resolve_bindings(&self) -> Result<Vec<HotkeyBinding>> {
        let mut bindings = Vec::with_capacity(self.bindings.len());
        for entry in &self.bindings {
            let binding = entry.resolve()?;
            if bindings.iter().any(|b: &HotkeyBinding| b.key == binding.key) {
                return Err(GlossaError::Config(format!(
                    "Duplicate hotkey letter '{}'",
                    binding.key
                )));
            }
            bindings.push(binding);
        }
        Ok(bindings)
    }
}

/// Fixed delays around the simulated copy/paste keystrokes.
///
/// Both are best-effort heuristics: the focused application's clipboard
/// update is not observable, so the engine waits a fixed interval instead of
/// an event. A slow target application may need larger values.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TimingConfig {
    /// Wait after the simulated copy before reading the clipboard.
    pub copy_settle_ms: u64,
    /// Wait after the simulated paste before restoring the clipboard.
    pub paste_complete_ms: u64,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            copy_settle_ms: 150,
            paste_complete_ms: 200,
        }
    }
}

/// Translation backend configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TranslatorConfig {
    /// Endpoint accepting Google-v2-shaped translate requests.
    pub endpoint: String,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
    /// Maximum source text length in characters; longer selections are
    /// rejected before any network call.
    pub max_chars: usize,
    /// Environment variable holding the API key.
    pub api_key_env: String,
}

impl Default for TranslatorConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://translation.googleapis.com/language/translate/v2".to_string(),
            timeout_secs: 30,
            max_chars: 5_000,
            api_key_env: "GLOSSA_API_KEY".to_string(),
        }
    }
}
