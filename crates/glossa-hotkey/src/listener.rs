//! Global keyboard interception.
//!
//! On Windows, installs a low-level keyboard hook (`WH_KEYBOARD_LL`) on a
//! dedicated thread with its own message pump. The hook callback does
//! classification only and returns in bounded time; trigger notifications
//! are handed to the engine's context through a non-blocking channel send.
//!
//! The OS can silently remove a low-level hook it considers too slow, so
//! the hook thread re-installs it on a periodic timer. Repeated re-install
//! failure degrades to permission-denied reporting and a `HookLost` event.
//!
//! The hook callback carries no user data, so the live listener is
//! recovered through a registry mapping a stable integer token to its
//! shared state — no raw pointer crosses the callback frame.
//!
//! On non-Windows, provides a stub that reports the permission as denied.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::sync::mpsc::UnboundedSender;

use glossa_core::error::Result;
use glossa_core::types::HotkeyBinding;

/// Notification delivered from the interception thread to the engine.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ListenerEvent {
    /// A hotkey chord was pressed; the key event was consumed.
    Triggered(HotkeyBinding),
    /// An armed hotkey's letter or required modifier went up. Only emitted
    /// when release tracking is enabled.
    Released(HotkeyBinding),
    /// The keyboard hook was lost and could not be re-installed.
    HookLost,
}

/// Manages the global keyboard hook lifecycle.
pub struct HotkeyListener {
    bindings: Vec<HotkeyBinding>,
    release_tracking: bool,
    rehook_interval_secs: u32,
    permission_granted: Arc<AtomicBool>,
    #[cfg(target_os = "windows")]
    running: Option<windows::RunningHook>,
}

impl HotkeyListener {
    pub fn new(
        bindings: Vec<HotkeyBinding>,
        release_tracking: bool,
        rehook_interval_secs: u32,
    ) -> Self {
        Self {
            bindings,
            release_tracking,
            rehook_interval_secs,
            permission_granted: Arc::new(AtomicBool::new(false)),
            #[cfg(target_os = "windows")]
            running: None,
        }
    }

    /// Whether the hook is installed and events are being intercepted.
    ///
    /// Goes false when installation fails and when the hook is lost and
    /// cannot be re-installed. Never auto-retried: the caller must grant
    /// access and call [`start`](Self::start) again.
    pub fn permission_granted(&self) -> bool {
        self.permission_granted.load(Ordering::SeqCst)
    }

    /// Install the keyboard hook and begin delivering events on `sender`.
    ///
    /// A permission failure is reported through
    /// [`permission_granted`](Self::permission_granted) rather than an
    /// error; `Err` is returned only for misuse (listener already running).
    #[cfg(target_os = "windows")]
    pub fn start(&mut self, sender: UnboundedSender<ListenerEvent>) -> Result<()> {
        use glossa_core::error::GlossaError;

        if self.running.is_some() {
            return Err(GlossaError::Hotkey("Listener already started".to_string()));
        }

        let running = windows::install(
            &self.bindings,
            self.release_tracking,
            self.rehook_interval_secs,
            sender,
            Arc::clone(&self.permission_granted),
        )?;
        self.running = Some(running);

        if self.permission_granted() {
            tracing::info!(
                bindings = self.bindings.len(),
                release_tracking = self.release_tracking,
                "Keyboard hook installed"
            );
        } else {
            tracing::warn!("Keyboard hook could not be installed; triggers are disabled");
        }
        Ok(())
    }

    /// Stub start for non-Windows platforms: reports permission denied.
    #[cfg(not(target_os = "windows"))]
    pub fn start(&mut self, _sender: UnboundedSender<ListenerEvent>) -> Result<()> {
        tracing::warn!(
            bindings = self.bindings.len(),
            release_tracking = self.release_tracking,
            rehook_interval_secs = self.rehook_interval_secs,
            "Global keyboard interception is only available on Windows"
        );
        self.permission_granted.store(false, Ordering::SeqCst);
        Ok(())
    }

    /// Remove the hook and join the interception thread. Idempotent.
    #[cfg(target_os = "windows")]
    pub fn stop(&mut self) {
        if let Some(running) = self.running.take() {
            windows::shutdown(running);
            tracing::info!("Keyboard hook removed");
        }
    }

    /// Stub stop.
    #[cfg(not(target_os = "windows"))]
    pub fn stop(&mut self) {}

    /// Ask the OS for input-monitoring access and return the current state.
    ///
    /// Windows grants low-level hooks without a user dialog, so this only
    /// reports; on platforms with a grant flow this is where it would be
    /// invoked.
    pub fn request_permission(&self) -> bool {
        #[cfg(not(target_os = "windows"))]
        tracing::warn!("Input-monitoring permission cannot be requested on this platform");
        self.permission_granted()
    }

    /// The binding table this listener classifies against.
    pub fn bindings(&self) -> &[HotkeyBinding] {
        &self.bindings
    }
}

impl Drop for HotkeyListener {
    fn drop(&mut self) {
        self.stop();
    }
}

// ---------------------------------------------------------------------------
// Windows hook plumbing
// ---------------------------------------------------------------------------

#[cfg(target_os = "windows")]
mod windows {
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicBool, AtomicU32, AtomicU64, Ordering};
    use std::sync::{Arc, Mutex, OnceLock};
    use std::time::Duration;

    use tokio::sync::mpsc::UnboundedSender;

    use glossa_core::error::{GlossaError, Result};
    use glossa_core::types::HotkeyBinding;

    use super::ListenerEvent;
    use crate::classifier::{HotkeyClassifier, HotkeyNotification, Verdict};
    use crate::keys::key_from_vk;

    use windows_sys::Win32::Foundation::{LPARAM, LRESULT, WPARAM};
    use windows_sys::Win32::System::Threading::GetCurrentThreadId;
    use windows_sys::Win32::UI::WindowsAndMessaging::{
        CallNextHookEx, DispatchMessageW, GetMessageW, KillTimer, PostThreadMessageW, SetTimer,
        SetWindowsHookExW, TranslateMessage, UnhookWindowsHookEx, KBDLLHOOKSTRUCT, LLKHF_INJECTED,
        MSG, WH_KEYBOARD_LL, WM_APP, WM_KEYDOWN, WM_KEYUP, WM_SYSKEYDOWN, WM_SYSKEYUP, WM_TIMER,
    };

    /// Private thread message asking the hook thread to exit.
    const MSG_STOP: u32 = WM_APP + 1;
    /// Consecutive re-install failures before degrading to permission-denied.
    const MAX_REHOOK_FAILURES: u32 = 3;

    /// State shared between the owning listener, the hook thread, and the
    /// hook callback (via the token registry).
    struct ListenerShared {
        classifier: Mutex<HotkeyClassifier>,
        sender: UnboundedSender<ListenerEvent>,
        permission_granted: Arc<AtomicBool>,
    }

    pub(super) struct RunningHook {
        token: u64,
        thread_id: Arc<AtomicU32>,
        thread: std::thread::JoinHandle<()>,
    }

    /// Token → shared-state registry. The hook callback receives no user
    /// data, so it resolves the active listener through here instead of a
    /// smuggled pointer.
    static REGISTRY: OnceLock<Mutex<HashMap<u64, Arc<ListenerShared>>>> = OnceLock::new();
    /// Token of the listener whose hook is currently installed (0 = none).
    static ACTIVE_TOKEN: AtomicU64 = AtomicU64::new(0);
    static NEXT_TOKEN: AtomicU64 = AtomicU64::new(1);

    fn registry() -> &'static Mutex<HashMap<u64, Arc<ListenerShared>>> {
        REGISTRY.get_or_init(|| Mutex::new(HashMap::new()))
    }

    fn active_listener() -> Option<Arc<ListenerShared>> {
        let token = ACTIVE_TOKEN.load(Ordering::SeqCst);
        if token == 0 {
            return None;
        }
        registry().lock().ok()?.get(&token).cloned()
    }

    pub(super) fn install(
        bindings: &[HotkeyBinding],
        release_tracking: bool,
        rehook_interval_secs: u32,
        sender: UnboundedSender<ListenerEvent>,
        permission_granted: Arc<AtomicBool>,
    ) -> Result<RunningHook> {
        let token = NEXT_TOKEN.fetch_add(1, Ordering::SeqCst);
        if ACTIVE_TOKEN
            .compare_exchange(0, token, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return Err(GlossaError::Hotkey(
                "Another keyboard hook is already active in this process".to_string(),
            ));
        }

        let shared = Arc::new(ListenerShared {
            classifier: Mutex::new(HotkeyClassifier::new(bindings, release_tracking)),
            sender,
            permission_granted,
        });
        registry()
            .lock()
            .map_err(|e| GlossaError::Hotkey(format!("Hook registry poisoned: {}", e)))?
            .insert(token, Arc::clone(&shared));

        let thread_id = Arc::new(AtomicU32::new(0));
        let thread_id_slot = Arc::clone(&thread_id);
        let (install_tx, install_rx) = std::sync::mpsc::channel::<bool>();

        let thread = std::thread::Builder::new()
            .name("glossa-hotkey".to_string())
            .spawn(move || {
                hook_thread_main(token, thread_id_slot, install_tx, rehook_interval_secs);
            })
            .map_err(|e| GlossaError::Hotkey(format!("Failed to spawn hook thread: {}", e)))?;

        // Wait for the install attempt so permission_granted is accurate
        // when start() returns. Installation is local and fast.
        match install_rx.recv_timeout(Duration::from_secs(5)) {
            Ok(_) => {}
            Err(e) => {
                tracing::warn!(error = %e, "Hook thread did not report install status");
            }
        }

        Ok(RunningHook {
            token,
            thread_id,
            thread,
        })
    }

    pub(super) fn shutdown(running: RunningHook) {
        // The thread's message queue exists once it has called GetMessageW;
        // retry briefly in case stop() races thread startup.
        let thread_id = running.thread_id.load(Ordering::SeqCst);
        if thread_id != 0 {
            for _ in 0..50 {
                let posted =
                    unsafe { PostThreadMessageW(thread_id, MSG_STOP, 0 as WPARAM, 0 as LPARAM) };
                if posted != 0 {
                    break;
                }
                std::thread::sleep(Duration::from_millis(10));
            }
        }
        if let Err(e) = running.thread.join() {
            tracing::warn!("Hook thread panicked: {:?}", e);
        }
        if let Ok(mut map) = registry().lock() {
            map.remove(&running.token);
        }
        let _ = ACTIVE_TOKEN.compare_exchange(
            running.token,
            0,
            Ordering::SeqCst,
            Ordering::SeqCst,
        );
    }

    fn hook_thread_main(
        token: u64,
        thread_id: Arc<AtomicU32>,
        install_tx: std::sync::mpsc::Sender<bool>,
        rehook_interval_secs: u32,
    ) {
        let Some(shared) = ({
            let token_entry = registry().lock().ok().and_then(|m| m.get(&token).cloned());
            token_entry
        }) else {
            let _ = install_tx.send(false);
            return;
        };

        unsafe {
            thread_id.store(GetCurrentThreadId(), Ordering::SeqCst);

            let mut hook = SetWindowsHookExW(WH_KEYBOARD_LL, Some(keyboard_hook_proc), 0, 0);
            if hook == 0 {
                tracing::warn!("SetWindowsHookEx failed; input interception unavailable");
                shared.permission_granted.store(false, Ordering::SeqCst);
                let _ = install_tx.send(false);
                return;
            }
            shared.permission_granted.store(true, Ordering::SeqCst);
            let _ = install_tx.send(true);

            let interval_ms = rehook_interval_secs.saturating_mul(1000).max(1000);
            let timer = SetTimer(0, 1, interval_ms, None);

            let mut failures: u32 = 0;
            let mut msg: MSG = std::mem::zeroed();
            while GetMessageW(&mut msg, 0, 0, 0) > 0 {
                match msg.message {
                    MSG_STOP => break,
                    WM_TIMER => {
                        // The OS silently removes a hook whose callback it
                        // judged too slow; there is no notification, so the
                        // hook is proactively re-installed on every tick.
                        UnhookWindowsHookEx(hook);
                        hook = SetWindowsHookExW(WH_KEYBOARD_LL, Some(keyboard_hook_proc), 0, 0);
                        // Key-ups may have been missed around the re-hook.
                        if let Ok(mut classifier) = shared.classifier.lock() {
                            classifier.reset();
                        }
                        if hook == 0 {
                            failures += 1;
                            tracing::warn!(failures, "Keyboard hook re-install failed");
                            if failures >= MAX_REHOOK_FAILURES {
                                shared.permission_granted.store(false, Ordering::SeqCst);
                                let _ = shared.sender.send(ListenerEvent::HookLost);
                                break;
                            }
                        } else {
                            if failures > 0 {
                                tracing::info!("Keyboard hook re-installed");
                            }
                            failures = 0;
                        }
                    }
                    _ => {
                        TranslateMessage(&msg);
                        DispatchMessageW(&msg);
                    }
                }
            }

            if timer != 0 {
                KillTimer(0, timer);
            }
            if hook != 0 {
                UnhookWindowsHookEx(hook);
            }
        }
    }

    /// The low-level keyboard hook callback.
    ///
    /// Must return in bounded time: classification is lock-guarded pure
    /// state, and notification delivery is a non-blocking unbounded send.
    unsafe extern "system" fn keyboard_hook_proc(
        code: i32,
        wparam: WPARAM,
        lparam: LPARAM,
    ) -> LRESULT {
        if code < 0 {
            return CallNextHookEx(0, code, wparam, lparam);
        }

        let kb = &*(lparam as *const KBDLLHOOKSTRUCT);
        // Events injected by our own input simulator (or anyone else's)
        // pass through unclassified.
        if kb.flags & LLKHF_INJECTED != 0 {
            return CallNextHookEx(0, code, wparam, lparam);
        }

        let pressed = matches!(wparam as u32, WM_KEYDOWN | WM_SYSKEYDOWN);
        let released = matches!(wparam as u32, WM_KEYUP | WM_SYSKEYUP);
        if !pressed && !released {
            return CallNextHookEx(0, code, wparam, lparam);
        }

        let Some(shared) = active_listener() else {
            return CallNextHookEx(0, code, wparam, lparam);
        };

        let classification = match shared.classifier.lock() {
            Ok(mut classifier) => classifier.process(key_from_vk(kb.vkCode), pressed),
            Err(_) => return CallNextHookEx(0, code, wparam, lparam),
        };

        if let Some(notification) = classification.notification {
            let event = match notification {
                HotkeyNotification::Triggered(binding) => ListenerEvent::Triggered(binding),
                HotkeyNotification::Released(binding) => ListenerEvent::Released(binding),
            };
            let _ = shared.sender.send(event);
        }

        match classification.verdict {
            Verdict::Consume => 1,
            Verdict::PassThrough => CallNextHookEx(0, code, wparam, lparam),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use glossa_core::types::{HotkeyAction, TargetLanguage};

    fn bindings() -> Vec<HotkeyBinding> {
        vec![HotkeyBinding {
            key: 'E',
            language: TargetLanguage::English,
            action: HotkeyAction::Replace,
        }]
    }

    #[test]
    fn test_listener_initially_not_granted() {
        let listener = HotkeyListener::new(bindings(), false, 30);
        assert!(!listener.permission_granted());
        assert_eq!(listener.bindings().len(), 1);
    }

    #[cfg(not(target_os = "windows"))]
    #[test]
    fn test_stub_start_reports_permission_denied() {
        let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
        let mut listener = HotkeyListener::new(bindings(), false, 30);

        listener.start(tx).unwrap();
        assert!(!listener.permission_granted());
        assert!(!listener.request_permission());
        // No events are ever delivered by the stub.
        assert!(rx.try_recv().is_err());
    }

    #[cfg(not(target_os = "windows"))]
    #[test]
    fn test_stub_stop_is_idempotent() {
        let (tx, _rx) = tokio::sync::mpsc::unbounded_channel();
        let mut listener = HotkeyListener::new(bindings(), false, 30);
        listener.start(tx).unwrap();
        listener.stop();
        listener.stop();
    }
}
