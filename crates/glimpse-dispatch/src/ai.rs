//! Chat-completions wire format.

use base64::Engine;
use serde::{Deserialize, Serialize};

use glimpse_config::providers::ProviderConfig;

use crate::{AiPayload, AiReply, DispatchError};

#[derive(Debug, Serialize)]
pub(crate) struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: String,
    content: serde_json::Value,
}

impl ChatRequest {
    pub(crate) fn build(provider: &ProviderConfig, payload: &AiPayload) -> Self {
        let content = match &payload.image {
            Some(image) => {
                let encoded = base64::engine::general_purpose::STANDARD.encode(&image.png);
                serde_json::json!([
                    {
                        "type": "text",
                        "text": payload.prompt,
                    },
                    {
                        "type": "image_url",
                        "image_url": {
                            "url": format!("data:image/png;base64,{}", encoded),
                        },
                    }
                ])
            }
            None => serde_json::Value::String(payload.prompt.clone()),
        };

        ChatRequest {
            model: provider.model.clone(),
            messages: vec![ChatMessage {
                role: "user".to_string(),
                content,
            }],
            temperature: provider.temperature,
            max_tokens: provider.max_tokens,
        }
    }
}

pub(crate) fn chat_url(endpoint: &str) -> String {
    format!("{}/chat/completions", endpoint.trim_end_matches('/'))
}

#[derive(Debug, Deserialize)]
pub(crate) struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
    #[serde(default)]
    reasoning_content: Option<String>,
}

impl ChatResponse {
    pub(crate) fn into_reply(self) -> Result<AiReply, DispatchError> {
        let choice = self
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| DispatchError::Malformed {
                message: "chat response has no choices".to_string(),
            })?;
        let answer = choice
            .message
            .content
            .ok_or_else(|| DispatchError::Malformed {
                message: "chat choice has no content".to_string(),
            })?;
        Ok(AiReply {
            answer,
            reasoning: choice.message.reasoning_content,
        })
    }
}
