//! Glossa application binary - composition root.
//!
//! Ties together all Glossa crates into a single executable:
//! 1. Load configuration from TOML and resolve the hotkey binding table
//! 2. Build the translator, clipboard mediator, and input simulator
//! 3. Start the global keyboard hook on its own thread
//! 4. Run the engine loop bridging hook notifications to sequences
//! 5. Log outcome events (the stand-in for presentation collaborators)
//!
//! Interception and input simulation require Windows; on other platforms
//! the binary starts, reports the permission as denied, and idles.

use std::path::PathBuf;
use std::sync::Arc;

use glossa_core::config::GlossaConfig;
use glossa_core::events::GlossaEvent;
use glossa_engine::{SystemClipboard, SystemInput, TranslationEngine};
use glossa_hotkey::HotkeyListener;
use glossa_translate::{EnvCredentialStore, HttpTranslator};

/// Resolve the config file path (GLOSSA_CONFIG env, or ~/.glossa/config.toml).
fn config_path() -> PathBuf {
    if let Ok(p) = std::env::var("GLOSSA_CONFIG") {
        return PathBuf::from(p);
    }
    #[cfg(target_os = "windows")]
    if let Ok(home) = std::env::var("USERPROFILE") {
        return PathBuf::from(home).join(".glossa").join("config.toml");
    }
    #[cfg(not(target_os = "windows"))]
    if let Ok(home) = std::env::var("HOME") {
        return PathBuf::from(home).join(".glossa").join("config.toml");
    }
    PathBuf::from("config.toml")
}

/// Log outcome events. A HUD or result panel would subscribe here instead.
async fn outcome_loop(mut events: tokio::sync::mpsc::UnboundedReceiver<GlossaEvent>) {
    while let Some(event) = events.recv().await {
        match event {
            GlossaEvent::TranslationApplied {
                translated_text,
                language,
                ..
            } => {
                tracing::info!(%language, text = %translated_text, "Selection replaced");
            }
            GlossaEvent::TranslationReady {
                original_text,
                translated_text,
                language,
                ..
            } => {
                tracing::info!(
                    %language,
                    original = %original_text,
                    translated = %translated_text,
                    "Translation ready for display"
                );
            }
            GlossaEvent::NoSelection { .. } => {
                tracing::info!("Nothing selected");
            }
            GlossaEvent::TranslationFailed { message, .. } => {
                tracing::warn!(%message, "Translation failed");
            }
            GlossaEvent::TriggerDropped { language, .. } => {
                tracing::debug!(%language, "Trigger dropped while busy");
            }
            GlossaEvent::HookLost { .. } | GlossaEvent::PermissionDenied { .. } => {
                tracing::warn!("Keyboard interception unavailable; grant access and restart");
            }
            GlossaEvent::ListenerStarted { .. } => {
                tracing::info!("Hotkeys active");
            }
            _ => {}
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Config first: the default log level comes from it.
    let config_file = config_path();
    let config = GlossaConfig::load_or_default(&config_file);

    // Tracing. RUST_LOG overrides the configured level.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                tracing_subscriber::EnvFilter::new(config.general.log_level.clone())
            }),
        )
        .init();

    tracing::info!("Starting Glossa v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!(path = %config_file.display(), "Configuration loaded");

    // The binding table is fixed for the lifetime of the process.
    let bindings = config.hotkeys.resolve_bindings()?;
    for binding in &bindings {
        tracing::info!(hotkey = %binding, "Hotkey bound");
    }

    // Collaborators.
    let credentials = Arc::new(EnvCredentialStore::new(
        config.translator.api_key_env.clone(),
    ));
    let translator = Arc::new(HttpTranslator::new(&config.translator, credentials)?);
    let clipboard = Arc::new(SystemClipboard::new());
    let input = Arc::new(SystemInput::new());

    let (event_tx, event_rx) = tokio::sync::mpsc::unbounded_channel();
    let engine = Arc::new(TranslationEngine::new(
        clipboard,
        input,
        translator,
        event_tx.clone(),
        config.timing.clone(),
    ));

    // Hook thread -> engine channel.
    let (trigger_tx, trigger_rx) = tokio::sync::mpsc::unbounded_channel();
    let mut listener = HotkeyListener::new(
        bindings,
        config.hotkeys.release_tracking,
        config.hotkeys.rehook_interval_secs,
    );
    listener.start(trigger_tx)?;
    if listener.permission_granted() {
        let _ = event_tx.send(GlossaEvent::ListenerStarted {
            timestamp: chrono::Utc::now(),
        });
    } else {
        tracing::warn!(
            "Input-monitoring permission not granted; hotkeys are inactive until it is and the listener is restarted"
        );
        let _ = event_tx.send(GlossaEvent::PermissionDenied {
            timestamp: chrono::Utc::now(),
        });
    }

    // Outcome reporting.
    tokio::spawn(outcome_loop(event_rx));

    // Engine loop; runs until shutdown.
    let engine_task = tokio::spawn(Arc::clone(&engine).run(trigger_rx));

    tokio::signal::ctrl_c().await?;
    tracing::info!("Shutting down");
    listener.stop();
    engine_task.abort();

    Ok(())
}
