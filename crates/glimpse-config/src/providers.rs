use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

fn default_ai_id() -> String {
    "openai".to_string()
}

fn default_ai_endpoint() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_ai_model() -> String {
    "gpt-4o".to_string()
}

fn default_timeout_ms() -> u64 {
    30000
}

fn default_temperature() -> f32 {
    0.3
}

/// Bearer token for a provider. Debug output is redacted so request
/// logs never carry the secret.
#[derive(Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ApiKey(String);

impl ApiKey {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ApiKey(****)")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderKind {
    Ai,
    Ocr,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct ProviderConfig {
    pub id: String,
    pub kind: ProviderKind,
    pub endpoint: String,
    pub api_key: ApiKey,
    /// Model identifier; unused for OCR entries.
    pub model: String,
    /// Whether the model accepts image input directly.
    pub multimodal: bool,
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    /// Omitted from requests when unset.
    pub max_tokens: Option<u32>,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            id: default_ai_id(),
            kind: ProviderKind::Ai,
            endpoint: default_ai_endpoint(),
            api_key: ApiKey::default(),
            model: default_ai_model(),
            multimodal: true,
            timeout_ms: default_timeout_ms(),
            temperature: default_temperature(),
            max_tokens: None,
        }
    }
}

#[derive(Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct ProvidersConfig {
    pub entries: Vec<ProviderConfig>,
    pub active_ai: String,
    pub active_ocr: Option<String>,
}

impl Default for ProvidersConfig {
    fn default() -> Self {
        Self {
            entries: vec![ProviderConfig::default()],
            active_ai: default_ai_id(),
            active_ocr: None,
        }
    }
}

/// The provider entries a session snapshots at creation.
#[derive(Debug, Clone)]
pub struct ActiveProviders {
    pub ai: ProviderConfig,
    pub ocr: Option<ProviderConfig>,
}

impl ProvidersConfig {
    pub fn entry(&self, id: &str) -> Option<&ProviderConfig> {
        self.entries.iter().find(|e| e.id == id)
    }

    pub fn entry_mut(&mut self, id: &str) -> Option<&mut ProviderConfig> {
        self.entries.iter_mut().find(|e| e.id == id)
    }

    /// Resolves the active ids against the registry. The AI entry is
    /// mandatory; the OCR entry only has to exist when an id names it.
    pub fn resolve(&self) -> Result<ActiveProviders, ProviderError> {
        let ai = self.lookup(&self.active_ai, ProviderKind::Ai)?.clone();
        let ocr = match &self.active_ocr {
            Some(id) => Some(self.lookup(id, ProviderKind::Ocr)?.clone()),
            None => None,
        };
        Ok(ActiveProviders { ai, ocr })
    }

    fn lookup(&self, id: &str, kind: ProviderKind) -> Result<&ProviderConfig, ProviderError> {
        let entry = self
            .entry(id)
            .ok_or_else(|| ProviderError::Unknown { id: id.to_string() })?;
        if entry.kind != kind {
            return Err(ProviderError::WrongKind {
                id: id.to_string(),
                expected: kind,
            });
        }
        Ok(entry)
    }
}

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("no provider entry with id {id:?}")]
    Unknown { id: String },
    #[error("provider {id:?} is not a {expected:?} provider")]
    WrongKind { id: String, expected: ProviderKind },
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry() -> ProvidersConfig {
        ProvidersConfig {
            entries: vec![
                ProviderConfig {
                    id: "vision".to_string(),
                    multimodal: true,
                    ..ProviderConfig::default()
                },
                ProviderConfig {
                    id: "paddle".to_string(),
                    kind: ProviderKind::Ocr,
                    endpoint: "http://127.0.0.1:8868/ocr".to_string(),
                    ..ProviderConfig::default()
                },
            ],
            active_ai: "vision".to_string(),
            active_ocr: Some("paddle".to_string()),
        }
    }

    #[test]
    fn test_resolve_active_pair() {
        let active = registry().resolve().expect("resolve failed");
        assert_eq!(active.ai.id, "vision");
        assert_eq!(active.ocr.expect("no ocr entry").id, "paddle");
    }

    #[test]
    fn test_resolve_without_ocr() {
        let mut config = registry();
        config.active_ocr = None;
        let active = config.resolve().expect("resolve failed");
        assert!(active.ocr.is_none());
    }

    #[test]
    fn test_resolve_unknown_id() {
        let mut config = registry();
        config.active_ai = "missing".to_string();
        match config.resolve() {
            Err(ProviderError::Unknown { id }) => assert_eq!(id, "missing"),
            other => panic!("expected Unknown, got {:?}", other.map(|a| a.ai.id)),
        }
    }

    #[test]
    fn test_resolve_kind_mismatch() {
        let mut config = registry();
        config.active_ai = "paddle".to_string();
        match config.resolve() {
            Err(ProviderError::WrongKind { id, expected }) => {
                assert_eq!(id, "paddle");
                assert_eq!(expected, ProviderKind::Ai);
            }
            other => panic!("expected WrongKind, got {:?}", other.map(|a| a.ai.id)),
        }
    }

    #[test]
    fn test_api_key_debug_is_redacted() {
        let key = ApiKey::new("sk-secret-value");
        let printed = format!("{:?}", key);
        assert!(!printed.contains("secret"));
        assert_eq!(key.expose(), "sk-secret-value");
    }
}
