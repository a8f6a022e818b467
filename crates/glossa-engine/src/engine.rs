//! The translation orchestration engine.
//!
//! Executes exactly one capture -> translate -> apply sequence at a time in
//! response to hotkey triggers, with deterministic clipboard hygiene on
//! every exit path. Triggers arriving while a sequence is in flight are
//! dropped, never queued.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender};
use uuid::Uuid;

use glossa_core::config::TimingConfig;
use glossa_core::events::GlossaEvent;
use glossa_core::types::{HotkeyAction, HotkeyBinding, TranslationRequest};
use glossa_hotkey::ListenerEvent;
use glossa_translate::Translator;

use crate::clipboard::ClipboardMediator;
use crate::input::InputSimulator;
use crate::state::{EngineState, StateMachine};

/// The single coordinator owning the "is a translation in flight"
/// invariant.
///
/// All collaborators are injected as trait objects; the engine itself holds
/// no platform code. Outcomes are reported on an unbounded event channel
/// for presentation collaborators; nothing propagates as an error out of
/// [`handle_trigger`](Self::handle_trigger).
pub struct TranslationEngine {
    state: StateMachine,
    clipboard: Arc<dyn ClipboardMediator>,
    input: Arc<dyn InputSimulator>,
    translator: Arc<dyn Translator>,
    events: UnboundedSender<GlossaEvent>,
    timing: TimingConfig,
}

impl TranslationEngine {
    pub fn new(
        clipboard: Arc<dyn ClipboardMediator>,
        input: Arc<dyn InputSimulator>,
        translator: Arc<dyn Translator>,
        events: UnboundedSender<GlossaEvent>,
        timing: TimingConfig,
    ) -> Self {
        Self {
            state: StateMachine::new(),
            clipboard,
            input,
            translator,
            events,
            timing,
        }
    }

    /// Returns the current coordination state.
    pub fn current_state(&self) -> EngineState {
        self.state.current()
    }

    /// Consume listener events until the channel closes.
    ///
    /// Each accepted trigger runs as its own task so the loop keeps
    /// receiving while a sequence is in flight; a trigger arriving
    /// mid-sequence is evaluated against the guard immediately and dropped,
    /// rather than queueing behind the running sequence.
    pub async fn run(self: Arc<Self>, mut listener_events: UnboundedReceiver<ListenerEvent>) {
        while let Some(event) = listener_events.recv().await {
            match event {
                ListenerEvent::Triggered(binding) => {
                    let engine = Arc::clone(&self);
                    tokio::spawn(async move {
                        engine.handle_trigger(binding).await;
                    });
                }
                ListenerEvent::Released(binding) => {
                    tracing::debug!(hotkey = %binding, "Hotkey released");
                }
                ListenerEvent::HookLost => {
                    tracing::warn!("Keyboard hook lost; triggers are no longer delivered");
                    self.emit(GlossaEvent::HookLost {
                        timestamp: Utc::now(),
                    });
                }
            }
        }
        tracing::debug!("Listener channel closed; engine loop exiting");
    }

    /// Run one full sequence for `binding`, or drop the trigger if a
    /// sequence is already in flight.
    pub async fn handle_trigger(&self, binding: HotkeyBinding) {
        // Single-flight guard: atomically claims Idle -> Capturing.
        if !self.state.try_begin() {
            tracing::debug!(hotkey = %binding, "Translation in flight; trigger dropped");
            self.emit(GlossaEvent::TriggerDropped {
                language: binding.language,
                timestamp: Utc::now(),
            });
            return;
        }

        let sequence_id = Uuid::new_v4();
        tracing::info!(sequence_id = %sequence_id, hotkey = %binding, "Translation sequence started");
        self.emit(GlossaEvent::TriggerAccepted {
            language: binding.language,
            action: binding.action,
            timestamp: Utc::now(),
        });

        // Snapshot before anything mutates the clipboard. If even reading
        // fails there is nothing to protect and nothing was touched.
        let snapshot = match self.clipboard.read_text() {
            Ok(snapshot) => snapshot,
            Err(e) => {
                tracing::warn!(error = %e, "Clipboard read failed; sequence aborted");
                self.state.reset();
                self.emit(GlossaEvent::TranslationFailed {
                    message: "Could not access the clipboard.".to_string(),
                    timestamp: Utc::now(),
                });
                return;
            }
        };

        let outcome = self.run_sequence(&binding, snapshot.as_deref()).await;

        // Epilogue, unconditional on every path out of the sequence body:
        // put the snapshot back (a second restore of the same value is
        // harmless), return to Idle, then report. An empty snapshot
        // restores as an explicit clear.
        if let Err(e) = self.clipboard.restore(snapshot.as_deref()) {
            tracing::error!(error = %e, "Failed to restore clipboard snapshot");
        }
        if self.state.transition(EngineState::Idle).is_err() {
            self.state.reset();
        }
        tracing::info!(sequence_id = %sequence_id, hotkey = %binding, "Translation sequence finished");
        self.emit(outcome);
    }

    /// The sequence body: capture, translate, apply. Returns the outcome
    /// event; the caller owns snapshot restoration and the return to Idle.
    async fn run_sequence(&self, binding: &HotkeyBinding, snapshot: Option<&str>) -> GlossaEvent {
        // State is Capturing (claimed by try_begin).
        if let Err(e) = self.input.send_copy() {
            tracing::warn!(error = %e, "Simulated copy failed");
            return GlossaEvent::TranslationFailed {
                message: "Could not capture the selection.".to_string(),
                timestamp: Utc::now(),
            };
        }

        // The focused application populates the clipboard at its own pace
        // and its completion is not observable; this wait is a heuristic,
        // not a synchronization point.
        tokio::time::sleep(Duration::from_millis(self.timing.copy_settle_ms)).await;

        let captured = match self.clipboard.read_text() {
            Ok(captured) => captured,
            Err(e) => {
                tracing::warn!(error = %e, "Clipboard read after copy failed");
                return GlossaEvent::TranslationFailed {
                    message: "Could not read the captured selection.".to_string(),
                    timestamp: Utc::now(),
                };
            }
        };

        // Empty, or identical to the snapshot: the copy produced nothing
        // new, so there was no selection. The backend is never contacted.
        let source_text = match captured {
            Some(text) if !text.is_empty() && snapshot != Some(text.as_str()) => text,
            _ => {
                tracing::info!("No selection detected; sequence ends without translation");
                return GlossaEvent::NoSelection {
                    timestamp: Utc::now(),
                };
            }
        };

        if let Err(e) = self.state.transition(EngineState::Translating) {
            tracing::error!(error = %e, "State machine out of sync");
            return GlossaEvent::TranslationFailed {
                message: "Internal state error.".to_string(),
                timestamp: Utc::now(),
            };
        }

        let request = TranslationRequest {
            source_text: source_text.clone(),
            target_language: binding.language,
        };
        let translation = match self.translator.translate(&request).await {
            Ok(translation) => translation,
            Err(e) => {
                tracing::warn!(error = %e, "Translation failed");
                return GlossaEvent::TranslationFailed {
                    message: e.user_message(),
                    timestamp: Utc::now(),
                };
            }
        };

        if let Err(e) = self.state.transition(EngineState::Applying) {
            tracing::error!(error = %e, "State machine out of sync");
            return GlossaEvent::TranslationFailed {
                message: "Internal state error.".to_string(),
                timestamp: Utc::now(),
            };
        }

        match binding.action {
            HotkeyAction::Replace => {
                if let Err(e) = self.clipboard.write_text(&translation.translated_text) {
                    tracing::warn!(error = %e, "Failed to stage translation on the clipboard");
                    return GlossaEvent::TranslationFailed {
                        message: "Could not write the translation to the clipboard.".to_string(),
                        timestamp: Utc::now(),
                    };
                }
                if let Err(e) = self.input.send_paste() {
                    tracing::warn!(error = %e, "Simulated paste failed");
                    return GlossaEvent::TranslationFailed {
                        message: "Could not paste the translation.".to_string(),
                        timestamp: Utc::now(),
                    };
                }
                // Give the focused application time to consume the paste
                // before the snapshot overwrites the clipboard again.
                tokio::time::sleep(Duration::from_millis(self.timing.paste_complete_ms)).await;

                GlossaEvent::TranslationApplied {
                    translated_text: translation.translated_text,
                    language: binding.language,
                    timestamp: Utc::now(),
                }
            }
            HotkeyAction::Popup => {
                // The translation never touches the clipboard on this path.
                GlossaEvent::TranslationReady {
                    original_text: source_text,
                    translated_text: translation.translated_text,
                    language: binding.language,
                    timestamp: Utc::now(),
                }
            }
        }
    }

    fn emit(&self, event: GlossaEvent) {
        let _ = self.events.send(event);
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clipboard::MemoryClipboard;
    use async_trait::async_trait;
    use glossa_core::error::{GlossaError, Result as GlossaResult};
    use glossa_core::types::{TargetLanguage, Translation};
    use glossa_translate::TranslateError;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::sync::mpsc::unbounded_channel;
    use tokio::sync::Notify;

    /// Input simulator double: "copying" places the configured selection on
    /// the clipboard, as the focused application would; pastes are counted.
    struct ScriptedInput {
        clipboard: Arc<MemoryClipboard>,
        selection: Option<String>,
        copies: AtomicUsize,
        pastes: AtomicUsize,
        fail_copy: bool,
    }

    impl ScriptedInput {
        fn new(clipboard: Arc<MemoryClipboard>, selection: Option<&str>) -> Self {
            Self {
                clipboard,
                selection: selection.map(str::to_string),
                copies: AtomicUsize::new(0),
                pastes: AtomicUsize::new(0),
                fail_copy: false,
            }
        }
    }

    impl InputSimulator for ScriptedInput {
        fn send_copy(&self) -> GlossaResult<()> {
            if self.fail_copy {
                return Err(GlossaError::Inject("copy failed".to_string()));
            }
            self.copies.fetch_add(1, Ordering::SeqCst);
            if let Some(selection) = &self.selection {
                self.clipboard.write_text(selection)?;
            }
            Ok(())
        }

        fn send_paste(&self) -> GlossaResult<()> {
            self.pastes.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    /// Translator double with a call counter, a fixed response, and an
    /// optional gate to hold the engine in Translating.
    struct StubTranslator {
        calls: AtomicUsize,
        respond: Box<dyn Fn() -> Result<Translation, TranslateError> + Send + Sync>,
        gate: Option<Arc<Notify>>,
    }

    impl StubTranslator {
        fn returning(text: &str) -> Self {
            let text = text.to_string();
            Self {
                calls: AtomicUsize::new(0),
                respond: Box::new(move || {
                    Ok(Translation {
                        translated_text: text.clone(),
                        detected_source_language: None,
                    })
                }),
                gate: None,
            }
        }

        fn failing(make: impl Fn() -> TranslateError + Send + Sync + 'static) -> Self {
            Self {
                calls: AtomicUsize::new(0),
                respond: Box::new(move || Err(make())),
                gate: None,
            }
        }

        fn gated(text: &str, gate: Arc<Notify>) -> Self {
            let mut stub = Self::returning(text);
            stub.gate = Some(gate);
            stub
        }

        fn call_count(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl Translator for StubTranslator {
        async fn translate(
            &self,
            _request: &TranslationRequest,
        ) -> Result<Translation, TranslateError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if let Some(gate) = &self.gate {
                gate.notified().await;
            }
            (self.respond)()
        }
    }

    fn fast_timing() -> TimingConfig {
        TimingConfig {
            copy_settle_ms: 1,
            paste_complete_ms: 1,
        }
    }

    fn binding(action: HotkeyAction) -> HotkeyBinding {
        HotkeyBinding {
            key: 'E',
            language: TargetLanguage::English,
            action,
        }
    }

    fn build_engine(
        clipboard: Arc<MemoryClipboard>,
        input: Arc<ScriptedInput>,
        translator: Arc<StubTranslator>,
    ) -> (
        Arc<TranslationEngine>,
        tokio::sync::mpsc::UnboundedReceiver<GlossaEvent>,
    ) {
        let (tx, rx) = unbounded_channel();
        let engine = Arc::new(TranslationEngine::new(
            clipboard,
            input,
            translator,
            tx,
            fast_timing(),
        ));
        (engine, rx)
    }

    fn drain(rx: &mut tokio::sync::mpsc::UnboundedReceiver<GlossaEvent>) -> Vec<GlossaEvent> {
        let mut events = Vec::new();
        while let Ok(event) = rx.try_recv() {
            events.push(event);
        }
        events
    }

    async fn wait_for_state(engine: &TranslationEngine, state: EngineState) {
        for _ in 0..500 {
            if engine.current_state() == state {
                return;
            }
            tokio::time::sleep(Duration::from_millis(2)).await;
        }
        panic!(
            "Engine never reached {} (currently {})",
            state,
            engine.current_state()
        );
    }

    #[tokio::test]
    async fn test_inplace_success_restores_clipboard() {
        // Scenario A: selection "Hello" translated to "Hola" in place.
        let clipboard = Arc::new(MemoryClipboard::new(Some("unchanged-marker")));
        let input = Arc::new(ScriptedInput::new(Arc::clone(&clipboard), Some("Hello")));
        let translator = Arc::new(StubTranslator::returning("Hola"));
        let (engine, mut rx) =
            build_engine(Arc::clone(&clipboard), Arc::clone(&input), Arc::clone(&translator));

        engine.handle_trigger(binding(HotkeyAction::Replace)).await;

        assert_eq!(clipboard.content().as_deref(), Some("unchanged-marker"));
        assert_eq!(engine.current_state(), EngineState::Idle);
        assert_eq!(translator.call_count(), 1);
        assert_eq!(input.copies.load(Ordering::SeqCst), 1);
        assert_eq!(input.pastes.load(Ordering::SeqCst), 1);

        let events = drain(&mut rx);
        assert!(events.iter().any(|e| matches!(
            e,
            GlossaEvent::TranslationApplied { translated_text, .. } if translated_text == "Hola"
        )));
        // The translation was on the clipboard only during the transient
        // paste window, between staging and restore.
        assert_eq!(
            clipboard.writes(),
            vec![
                Some("Hello".to_string()),
                Some("Hola".to_string()),
                Some("unchanged-marker".to_string()),
            ]
        );
    }

    #[tokio::test]
    async fn test_no_selection_short_circuits() {
        // Scenario B: copy leaves the clipboard unchanged.
        let clipboard = Arc::new(MemoryClipboard::new(Some("X")));
        let input = Arc::new(ScriptedInput::new(Arc::clone(&clipboard), None));
        let translator = Arc::new(StubTranslator::returning("unused"));
        let (engine, mut rx) =
            build_engine(Arc::clone(&clipboard), Arc::clone(&input), Arc::clone(&translator));

        engine.handle_trigger(binding(HotkeyAction::Replace)).await;

        assert_eq!(translator.call_count(), 0);
        assert_eq!(input.pastes.load(Ordering::SeqCst), 0);
        assert_eq!(clipboard.content().as_deref(), Some("X"));
        assert_eq!(engine.current_state(), EngineState::Idle);

        let events = drain(&mut rx);
        assert!(events
            .iter()
            .any(|e| matches!(e, GlossaEvent::NoSelection { .. })));
    }

    #[tokio::test]
    async fn test_copy_of_identical_text_is_no_selection() {
        // The focused app copies exactly what was already on the clipboard.
        let clipboard = Arc::new(MemoryClipboard::new(Some("same")));
        let input = Arc::new(ScriptedInput::new(Arc::clone(&clipboard), Some("same")));
        let translator = Arc::new(StubTranslator::returning("unused"));
        let (engine, mut rx) =
            build_engine(Arc::clone(&clipboard), input, Arc::clone(&translator));

        engine.handle_trigger(binding(HotkeyAction::Replace)).await;

        assert_eq!(translator.call_count(), 0);
        let events = drain(&mut rx);
        assert!(events
            .iter()
            .any(|e| matches!(e, GlossaEvent::NoSelection { .. })));
    }

    #[tokio::test]
    async fn test_empty_capture_is_no_selection() {
        let clipboard = Arc::new(MemoryClipboard::new(None));
        let input = Arc::new(ScriptedInput::new(Arc::clone(&clipboard), Some("")));
        let translator = Arc::new(StubTranslator::returning("unused"));
        let (engine, mut rx) =
            build_engine(Arc::clone(&clipboard), input, Arc::clone(&translator));

        engine.handle_trigger(binding(HotkeyAction::Replace)).await;

        assert_eq!(translator.call_count(), 0);
        assert!(drain(&mut rx)
            .iter()
            .any(|e| matches!(e, GlossaEvent::NoSelection { .. })));
    }

    #[tokio::test]
    async fn test_translation_failure_restores_clipboard() {
        // Scenario C: backend reports rate limiting.
        let clipboard = Arc::new(MemoryClipboard::new(Some("before")));
        let input = Arc::new(ScriptedInput::new(Arc::clone(&clipboard), Some("Hallo")));
        let translator = Arc::new(StubTranslator::failing(|| TranslateError::RateLimited));
        let (engine, mut rx) =
            build_engine(Arc::clone(&clipboard), Arc::clone(&input), Arc::clone(&translator));

        engine.handle_trigger(binding(HotkeyAction::Replace)).await;

        assert_eq!(clipboard.content().as_deref(), Some("before"));
        assert_eq!(engine.current_state(), EngineState::Idle);
        assert_eq!(input.pastes.load(Ordering::SeqCst), 0);

        let events = drain(&mut rx);
        assert!(events.iter().any(|e| matches!(
            e,
            GlossaEvent::TranslationFailed { message, .. } if message.contains("rate limit")
        )));
    }

    #[tokio::test]
    async fn test_single_flight_drops_concurrent_trigger() {
        // Scenario D: trigger B arrives while A is in Translating.
        let clipboard = Arc::new(MemoryClipboard::new(Some("orig")));
        let input = Arc::new(ScriptedInput::new(Arc::clone(&clipboard), Some("Hello")));
        let gate = Arc::new(Notify::new());
        let translator = Arc::new(StubTranslator::gated("Hola", Arc::clone(&gate)));
        let (engine, mut rx) =
            build_engine(Arc::clone(&clipboard), input, Arc::clone(&translator));

        let engine_a = Arc::clone(&engine);
        let task_a = tokio::spawn(async move {
            engine_a.handle_trigger(binding(HotkeyAction::Replace)).await;
        });

        wait_for_state(&engine, EngineState::Translating).await;

        // Trigger B: dropped with no state change.
        engine.handle_trigger(binding(HotkeyAction::Replace)).await;
        assert_eq!(engine.current_state(), EngineState::Translating);
        assert_eq!(translator.call_count(), 1);

        // Let A finish.
        gate.notify_one();
        task_a.await.unwrap();
        assert_eq!(engine.current_state(), EngineState::Idle);

        // Trigger C is accepted normally.
        gate.notify_one();
        engine.handle_trigger(binding(HotkeyAction::Replace)).await;
        assert_eq!(translator.call_count(), 2);
        assert_eq!(engine.current_state(), EngineState::Idle);

        let events = drain(&mut rx);
        let dropped = events
            .iter()
            .filter(|e| matches!(e, GlossaEvent::TriggerDropped { .. }))
            .count();
        let applied = events
            .iter()
            .filter(|e| matches!(e, GlossaEvent::TranslationApplied { .. }))
            .count();
        assert_eq!(dropped, 1);
        assert_eq!(applied, 2);
    }

    #[tokio::test]
    async fn test_popup_never_stages_translation() {
        // Scenario E: side-channel display leaves the selection untouched.
        let clipboard = Arc::new(MemoryClipboard::new(Some("orig")));
        let input = Arc::new(ScriptedInput::new(Arc::clone(&clipboard), Some("Bonjour")));
        let translator = Arc::new(StubTranslator::returning("Hello"));
        let (engine, mut rx) =
            build_engine(Arc::clone(&clipboard), Arc::clone(&input), translator);

        engine.handle_trigger(binding(HotkeyAction::Popup)).await;

        assert_eq!(clipboard.content().as_deref(), Some("orig"));
        assert_eq!(input.pastes.load(Ordering::SeqCst), 0);
        // The translated text was never on the clipboard at any point.
        assert!(!clipboard
            .writes()
            .contains(&Some("Hello".to_string())));

        let events = drain(&mut rx);
        assert!(events.iter().any(|e| matches!(
            e,
            GlossaEvent::TranslationReady { original_text, translated_text, .. }
                if original_text == "Bonjour" && translated_text == "Hello"
        )));
    }

    #[tokio::test]
    async fn test_empty_snapshot_restores_as_clear() {
        let clipboard = Arc::new(MemoryClipboard::new(None));
        let input = Arc::new(ScriptedInput::new(Arc::clone(&clipboard), Some("Hi")));
        let translator = Arc::new(StubTranslator::returning("Hola"));
        let (engine, _rx) =
            build_engine(Arc::clone(&clipboard), input, translator);

        engine.handle_trigger(binding(HotkeyAction::Replace)).await;

        // The clipboard was empty before the sequence, so it ends cleared,
        // not holding the translated text.
        assert_eq!(clipboard.content(), None);
        assert_eq!(clipboard.writes().last(), Some(&None));
    }

    #[tokio::test]
    async fn test_copy_failure_returns_to_idle() {
        let clipboard = Arc::new(MemoryClipboard::new(Some("keep")));
        let mut input = ScriptedInput::new(Arc::clone(&clipboard), Some("never"));
        input.fail_copy = true;
        let translator = Arc::new(StubTranslator::returning("unused"));
        let (engine, mut rx) =
            build_engine(Arc::clone(&clipboard), Arc::new(input), Arc::clone(&translator));

        engine.handle_trigger(binding(HotkeyAction::Replace)).await;

        assert_eq!(engine.current_state(), EngineState::Idle);
        assert_eq!(clipboard.content().as_deref(), Some("keep"));
        assert_eq!(translator.call_count(), 0);
        assert!(drain(&mut rx)
            .iter()
            .any(|e| matches!(e, GlossaEvent::TranslationFailed { .. })));
    }

    #[tokio::test]
    async fn test_sequences_back_to_back() {
        let clipboard = Arc::new(MemoryClipboard::new(Some("base")));
        let input = Arc::new(ScriptedInput::new(Arc::clone(&clipboard), Some("word")));
        let translator = Arc::new(StubTranslator::returning("palabra"));
        let (engine, mut rx) =
            build_engine(Arc::clone(&clipboard), input, Arc::clone(&translator));

        for _ in 0..3 {
            engine.handle_trigger(binding(HotkeyAction::Replace)).await;
            assert_eq!(engine.current_state(), EngineState::Idle);
        }
        assert_eq!(translator.call_count(), 3);
        assert_eq!(clipboard.content().as_deref(), Some("base"));

        let applied = drain(&mut rx)
            .iter()
            .filter(|e| matches!(e, GlossaEvent::TranslationApplied { .. }))
            .count();
        assert_eq!(applied, 3);
    }

    #[tokio::test]
    async fn test_run_loop_drops_triggers_while_busy() {
        // The receive loop itself must evaluate triggers immediately,
        // not queue them behind the in-flight sequence.
        let clipboard = Arc::new(MemoryClipboard::new(Some("orig")));
        let input = Arc::new(ScriptedInput::new(Arc::clone(&clipboard), Some("Hello")));
        let gate = Arc::new(Notify::new());
        let translator = Arc::new(StubTranslator::gated("Hola", Arc::clone(&gate)));
        let (engine, mut rx) =
            build_engine(Arc::clone(&clipboard), input, Arc::clone(&translator));

        let (listener_tx, listener_rx) = unbounded_channel();
        let run_engine = Arc::clone(&engine);
        let run_task = tokio::spawn(async move {
            run_engine.run(listener_rx).await;
        });

        listener_tx
            .send(ListenerEvent::Triggered(binding(HotkeyAction::Replace)))
            .unwrap();
        wait_for_state(&engine, EngineState::Translating).await;

        // Two more triggers while busy: both dropped.
        for _ in 0..2 {
            listener_tx
                .send(ListenerEvent::Triggered(binding(HotkeyAction::Replace)))
                .unwrap();
        }
        // Give the loop time to evaluate them against the guard.
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(translator.call_count(), 1);

        gate.notify_one();
        wait_for_state(&engine, EngineState::Idle).await;

        drop(listener_tx);
        run_task.await.unwrap();

        let events = drain(&mut rx);
        let dropped = events
            .iter()
            .filter(|e| matches!(e, GlossaEvent::TriggerDropped { .. }))
            .count();
        assert_eq!(dropped, 2);
        assert_eq!(clipboard.content().as_deref(), Some("orig"));
    }

    #[tokio::test]
    async fn test_run_loop_forwards_hook_lost() {
        let clipboard = Arc::new(MemoryClipboard::new(None));
        let input = Arc::new(ScriptedInput::new(Arc::clone(&clipboard), None));
        let translator = Arc::new(StubTranslator::returning("unused"));
        let (engine, mut rx) = build_engine(clipboard, input, translator);

        let (listener_tx, listener_rx) = unbounded_channel();
        let run_task = tokio::spawn(Arc::clone(&engine).run(listener_rx));

        listener_tx.send(ListenerEvent::HookLost).unwrap();
        drop(listener_tx);
        run_task.await.unwrap();

        assert!(drain(&mut rx)
            .iter()
            .any(|e| matches!(e, GlossaEvent::HookLost { .. })));
    }
}
