use serde::{Deserialize, Serialize};

fn default_template() -> String {
    "explain".to_string()
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct PromptTemplate {
    pub name: String,
    pub body: String,
    /// Forces the OCR path even on a multimodal model.
    pub requires_ocr: bool,
}

impl Default for PromptTemplate {
    fn default() -> Self {
        Self {
            name: String::new(),
            body: String::new(),
            requires_ocr: false,
        }
    }
}

#[derive(Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct PromptsConfig {
    pub templates: Vec<PromptTemplate>,
    #[serde(default = "default_template")]
    pub default_template: String,
}

impl Default for PromptsConfig {
    fn default() -> Self {
        Self {
            templates: builtin_templates(),
            default_template: default_template(),
        }
    }
}

impl PromptsConfig {
    pub fn get(&self, name: &str) -> Option<&PromptTemplate> {
        self.templates.iter().find(|t| t.name == name)
    }
}

pub fn builtin_templates() -> Vec<PromptTemplate> {
    vec![
        PromptTemplate {
            name: "explain".to_string(),
            body: "Explain what this capture shows. Be concise.".to_string(),
            requires_ocr: false,
        },
        PromptTemplate {
            name: "transcribe".to_string(),
            body: "Transcribe every piece of text visible in this capture, exactly as written."
                .to_string(),
            requires_ocr: false,
        },
        PromptTemplate {
            name: "solve".to_string(),
            body: "The following text was extracted from a screenshot:\n\n{ocr_text}\n\nSolve the problem it describes and show the key steps."
                .to_string(),
            requires_ocr: true,
        },
        PromptTemplate {
            name: "translate".to_string(),
            body: "Translate the captured text into English, keeping the original line breaks:\n\n{ocr_text}"
                .to_string(),
            requires_ocr: true,
        },
    ]
}
