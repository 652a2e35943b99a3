use glimpse_config::providers::ProviderConfig;
use glimpse_types::PixelBuffer;

mod ai;
mod http;
mod ocr;

pub use http::HttpDispatcher;

/// Outbound provider interface. All network traffic in a session goes
/// through one of these two calls.
#[async_trait::async_trait]
pub trait Dispatch: Send + Sync {
    /// Extract text from a PNG capture.
    async fn ocr(
        &self,
        provider: &ProviderConfig,
        image: &PixelBuffer,
    ) -> Result<String, DispatchError>;

    /// Run one chat exchange against an AI provider.
    async fn ai(
        &self,
        provider: &ProviderConfig,
        payload: AiPayload,
    ) -> Result<AiReply, DispatchError>;
}

/// Prompt plus the capture when it rides along directly.
#[derive(Debug, Clone)]
pub struct AiPayload {
    pub prompt: String,
    pub image: Option<PixelBuffer>,
}

#[derive(Debug, Clone)]
pub struct AiReply {
    pub answer: String,
    /// Separate reasoning stream some models return alongside the answer.
    pub reasoning: Option<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    #[error("request timed out after {timeout_ms} ms")]
    Timeout { timeout_ms: u64 },

    #[error("transient provider failure: {message}")]
    Transient {
        status: Option<u16>,
        message: String,
    },

    #[error("provider rejected the request (status {status}): {message}")]
    Rejected { status: u16, message: String },

    #[error("malformed provider response: {message}")]
    Malformed { message: String },
}

impl DispatchError {
    /// Timeouts and transient failures may succeed on retry; rejections
    /// and malformed bodies never do.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            DispatchError::Timeout { .. } | DispatchError::Transient { .. }
        )
    }

    pub fn status_code(&self) -> Option<u16> {
        match self {
            DispatchError::Rejected { status, .. } => Some(*status),
            DispatchError::Transient { status, .. } => *status,
            _ => None,
        }
    }
}
