use glimpse_types::NotifyStyle;
use serde::{Deserialize, Serialize};

fn default_style() -> NotifyStyle {
    NotifyStyle::Toast
}

#[derive(Serialize, Deserialize, Clone, Copy)]
#[serde(default)]
pub struct NotifyConfig {
    #[serde(default = "default_style")]
    pub style: NotifyStyle,
}

impl Default for NotifyConfig {
    fn default() -> Self {
        Self {
            style: default_style(),
        }
    }
}
