use std::env;

use serde::{Deserialize, Serialize};

use self::capture::CaptureConfig;
use self::dispatch::DispatchConfig;
use self::hotkey::HotkeyConfig;
use self::notify::NotifyConfig;
use self::prompts::PromptsConfig;
use self::providers::{ApiKey, ProvidersConfig};

pub mod capture;
pub mod dispatch;
pub mod hotkey;
pub mod notify;
pub mod prompts;
pub mod providers;

#[derive(Serialize, Deserialize, Clone, Default)]
#[serde(default)]
pub struct Config {
    pub providers: ProvidersConfig,
    pub prompts: PromptsConfig,
    pub dispatch: DispatchConfig,
    pub hotkey: HotkeyConfig,
    pub notify: NotifyConfig,
    pub capture: CaptureConfig,
}

impl Config {
    pub fn new() -> Self {
        let mut config = Config::default();
        config.apply_env();
        config
    }

    /// Environment overrides win over the profile file.
    pub fn apply_env(&mut self) {
        if let Ok(key) = env::var("GLIMPSE_AI_API_KEY") {
            let id = self.providers.active_ai.clone();
            if let Some(entry) = self.providers.entry_mut(&id) {
                entry.api_key = ApiKey::new(key);
            }
        }

        if let Ok(key) = env::var("GLIMPSE_OCR_API_KEY") {
            if let Some(id) = self.providers.active_ocr.clone() {
                if let Some(entry) = self.providers.entry_mut(&id) {
                    entry.api_key = ApiKey::new(key);
                }
            }
        }

        if let Ok(chord) = env::var("GLIMPSE_HOTKEY") {
            self.hotkey.chord = chord;
        }
    }
}
