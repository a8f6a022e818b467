use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Timestamp alias used across events and requests.
pub type Timestamp = DateTime<Utc>;

// =============================================================================
// Enums
// =============================================================================

/// Target language a hotkey translates into.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetLanguage {
    English,
    Spanish,
    French,
    German,
    Japanese,
    ChineseSimplified,
}

impl TargetLanguage {
    /// ISO 639-1 style code sent to the translation backend.
    pub fn code(&self) -> &'static str {
        match self {
            TargetLanguage::English => "en",
            TargetLanguage::Spanish => "es",
            TargetLanguage::French => "fr",
            TargetLanguage::German => "de",
            TargetLanguage::Japanese => "ja",
            TargetLanguage::ChineseSimplified => "zh-CN",
        }
    }
}

impl fmt::Display for TargetLanguage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TargetLanguage::English => "English",
            TargetLanguage::Spanish => "Spanish",
            TargetLanguage::French => "French",
            TargetLanguage::German => "German",
            TargetLanguage::Japanese => "Japanese",
            TargetLanguage::ChineseSimplified => "Chinese (Simplified)",
        };
        write!(f, "{}", name)
    }
}

impl FromStr for TargetLanguage {
    type Err = String;

    /// Parses a language code as written in the config binding table.
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "en" => Ok(TargetLanguage::English),
            "es" => Ok(TargetLanguage::Spanish),
            "fr" => Ok(TargetLanguage::French),
            "de" => Ok(TargetLanguage::German),
            "ja" => Ok(TargetLanguage::Japanese),
            "zh-CN" | "zh" => Ok(TargetLanguage::ChineseSimplified),
            other => Err(format!("Unknown language code: {}", other)),
        }
    }
}

/// What a hotkey does with its translation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HotkeyAction {
    /// Overwrite the selection in place via a simulated paste (default).
    #[default]
    Replace,
    /// Show the translation in a separate surface; the selection is untouched.
    Popup,
}

impl FromStr for HotkeyAction {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "replace" => Ok(HotkeyAction::Replace),
            "popup" => Ok(HotkeyAction::Popup),
            other => Err(format!("Unknown hotkey action: {}", other)),
        }
    }
}

// =============================================================================
// Value types
// =============================================================================

/// A fixed global hotkey: a letter key (with the required modifier chord)
/// bound to a target language and an apply action.
///
/// Bindings are built from the config table at startup and never change at
/// runtime.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct HotkeyBinding {
    /// Uppercase ASCII letter pressed together with the modifier chord.
    pub key: char,
    pub language: TargetLanguage,
    pub action: HotkeyAction,
}

impl fmt::Display for HotkeyBinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Ctrl+Alt+{} -> {} ({:?})", self.key, self.language, self.action)
    }
}

/// One translation request: the captured selection and where it should go.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranslationRequest {
    pub source_text: String,
    pub target_language: TargetLanguage,
}

/// A translation result returned by the backend.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Translation {
    pub translated_text: String,
    /// Backend-detected source language, if reported.
    pub detected_source_language: Option<String>,
}

// =============================================================================
// Tests
// =============================================================================
