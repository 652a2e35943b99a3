//! OCR upload wire format: a single multipart PNG part named "file",
//! answered with either a joined `text` field or a `lines` array.

use serde::Deserialize;

use glimpse_types::PixelBuffer;

use crate::DispatchError;

pub(crate) fn ocr_form(image: &PixelBuffer) -> Result<reqwest::multipart::Form, reqwest::Error> {
    let part = reqwest::multipart::Part::bytes(image.png.clone())
        .file_name("capture.png")
        .mime_str("image/png")?;
    Ok(reqwest::multipart::Form::new().part("file", part))
}

#[derive(Debug, Deserialize)]
pub(crate) struct OcrResponse {
    text: Option<String>,
    #[serde(default)]
    lines: Option<Vec<String>>,
}

impl OcrResponse {
    /// An empty extraction is a valid result; a body with neither field
    /// is not.
    pub(crate) fn into_text(self) -> Result<String, DispatchError> {
        if let Some(text) = self.text {
            return Ok(text);
        }
        if let Some(lines) = self.lines {
            return Ok(lines.join("\n"));
        }
        Err(DispatchError::Malformed {
            message: "OCR response has neither text nor lines".to_string(),
        })
    }
}
