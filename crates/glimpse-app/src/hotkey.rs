use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use global_hotkey::hotkey::{Code, HotKey, Modifiers};
use global_hotkey::{GlobalHotKeyEvent, GlobalHotKeyManager, HotKeyState};
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use glimpse_config::hotkey::HotkeyChord;
use glimpse_types::{TriggerSignal, TriggerSource};

use crate::controller::TriggerHandle;
use crate::state::AppState;

/// Global hotkey registration. Dropping the listener unregisters the key.
pub struct HotkeyListener {
    manager: GlobalHotKeyManager,
    hotkey: HotKey,
}

impl HotkeyListener {
    pub fn register(chord: &HotkeyChord) -> anyhow::Result<Self> {
        let manager = GlobalHotKeyManager::new()
            .map_err(|e| anyhow::anyhow!("failed to create hotkey manager: {}", e))?;

        let modifiers = to_modifiers(chord);
        let code = to_code(&chord.key)
            .with_context(|| format!("no key code for '{}'", chord.key))?;
        let hotkey = HotKey::new(modifiers, code);

        manager
            .register(hotkey)
            .map_err(|e| anyhow::anyhow!("failed to register hotkey '{}': {}", chord, e))?;

        info!(chord = %chord, "global hotkey registered");

        Ok(Self { manager, hotkey })
    }

    /// Returns true when our hotkey was pressed since the last poll.
    /// Release events are ignored so one chord yields one trigger.
    pub fn poll(&self) -> bool {
        if let Ok(event) = GlobalHotKeyEvent::receiver().try_recv() {
            event.id == self.hotkey.id() && event.state == HotKeyState::Pressed
        } else {
            false
        }
    }
}

impl Drop for HotkeyListener {
    fn drop(&mut self) {
        if let Err(e) = self.manager.unregister(self.hotkey) {
            error!(error = %e, "failed to unregister hotkey");
        }
    }
}

/// Polls the OS hotkey queue on a blocking thread and fires triggers.
///
/// The hotkey never carries a region. The session that picks the trigger up
/// resolves the region from its own configuration snapshot.
pub async fn hotkey_io(
    state: Arc<AppState>,
    trigger: TriggerHandle,
    cancel: CancellationToken,
) -> anyhow::Result<()> {
    let (enabled, chord_text) = {
        let config = state.config.read().await;
        (config.hotkey.enabled, config.hotkey.chord.clone())
    };

    if !enabled {
        info!("hotkey trigger disabled in profile");
        return Ok(());
    }

    let chord = match chord_text.parse::<HotkeyChord>() {
        Ok(chord) => chord,
        Err(err) => {
            error!(
                chord = %chord_text,
                error = %err,
                "invalid hotkey chord, falling back to the default"
            );
            HotkeyChord::default()
        }
    };

    let handle = tokio::task::spawn_blocking(move || {
        let listener = match HotkeyListener::register(&chord) {
            Ok(listener) => listener,
            Err(e) => {
                error!(error = %e, "hotkey unavailable, keyboard trigger is off");
                return;
            }
        };

        info!("hotkey listener started");

        loop {
            if cancel.is_cancelled() {
                info!("hotkey listener stopping");
                return;
            }

            if listener.poll() {
                info!("hotkey pressed");
                trigger.fire(TriggerSignal {
                    region: None,
                    source: TriggerSource::Hotkey,
                    template: None,
                });
            }

            std::thread::sleep(Duration::from_millis(50));
        }
    });

    handle.await?;
    Ok(())
}

fn to_modifiers(chord: &HotkeyChord) -> Option<Modifiers> {
    let mut modifiers = Modifiers::empty();
    if chord.ctrl {
        modifiers |= Modifiers::CONTROL;
    }
    if chord.alt {
        modifiers |= Modifiers::ALT;
    }
    if chord.shift {
        modifiers |= Modifiers::SHIFT;
    }
    if chord.meta {
        modifiers |= Modifiers::META;
    }

    if modifiers.is_empty() {
        None
    } else {
        Some(modifiers)
    }
}

fn to_code(key: &str) -> Option<Code> {
    let code = match key {
        "a" => Code::KeyA,
        "b" => Code::KeyB,
        "c" => Code::KeyC,
        "d" => Code::KeyD,
        "e" => Code::KeyE,
        "f" => Code::KeyF,
        "g" => Code::KeyG,
        "h" => Code::KeyH,
        "i" => Code::KeyI,
        "j" => Code::KeyJ,
        "k" => Code::KeyK,
        "l" => Code::KeyL,
        "m" => Code::KeyM,
        "n" => Code::KeyN,
        "o" => Code::KeyO,
        "p" => Code::KeyP,
        "q" => Code::KeyQ,
        "r" => Code::KeyR,
        "s" => Code::KeyS,
        "t" => Code::KeyT,
        "u" => Code::KeyU,
        "v" => Code::KeyV,
        "w" => Code::KeyW,
        "x" => Code::KeyX,
        "y" => Code::KeyY,
        "z" => Code::KeyZ,
        "0" => Code::Digit0,
        "1" => Code::Digit1,
        "2" => Code::Digit2,
        "3" => Code::Digit3,
        "4" => Code::Digit4,
        "5" => Code::Digit5,
        "6" => Code::Digit6,
        "7" => Code::Digit7,
        "8" => Code::Digit8,
        "9" => Code::Digit9,
        "f1" => Code::F1,
        "f2" => Code::F2,
        "f3" => Code::F3,
        "f4" => Code::F4,
        "f5" => Code::F5,
        "f6" => Code::F6,
        "f7" => Code::F7,
        "f8" => Code::F8,
        "f9" => Code::F9,
        "f10" => Code::F10,
        "f11" => Code::F11,
        "f12" => Code::F12,
        "space" => Code::Space,
        "enter" => Code::Enter,
        "tab" => Code::Tab,
        "escape" | "esc" => Code::Escape,
        "backspace" => Code::Backspace,
        "delete" => Code::Delete,
        "insert" => Code::Insert,
        "home" => Code::Home,
        "end" => Code::End,
        "pageup" => Code::PageUp,
        "pagedown" => Code::PageDown,
        "up" => Code::ArrowUp,
        "down" => Code::ArrowDown,
        "left" => Code::ArrowLeft,
        "right" => Code::ArrowRight,
        "printscreen" => Code::PrintScreen,
        _ => return None,
    };

    Some(code)
}
