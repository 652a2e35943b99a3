use glimpse_config::prompts::PromptTemplate;

pub const OCR_SLOT: &str = "{ocr_text}";

/// Renders a template into the final prompt. Substitution is a single
/// pass: a slot marker arriving inside the extracted text is kept
/// verbatim, never re-expanded. Templates without the slot get the text
/// appended as a labeled block, so a template written for the direct
/// path still works when routing forces OCR.
pub fn render(template: &PromptTemplate, ocr_text: Option<&str>) -> String {
    match ocr_text {
        Some(text) if template.body.contains(OCR_SLOT) => template.body.replace(OCR_SLOT, text),
        Some(text) => format!(
            "{}\n\nText extracted from the capture:\n{}",
            template.body, text
        ),
        None => template.body.clone(),
    }
}
