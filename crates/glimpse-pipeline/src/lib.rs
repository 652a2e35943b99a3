use glimpse_capture::CaptureError;
use glimpse_config::providers::ProviderError;
use glimpse_dispatch::DispatchError;

pub mod router;
pub mod runner;
pub mod session;
pub mod sink;
pub mod template;

pub use runner::{PipelineDeps, run_session};

#[cfg(test)]
mod tests;

/// Everything that can take a session to `Failed`. None of these are
/// fatal to the process; the session reports and the app keeps running.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("capture failed: {0}")]
    Capture(#[from] CaptureError),

    #[error("capture task failed: {0}")]
    CaptureTask(#[from] tokio::task::JoinError),

    #[error("provider configuration error: {0}")]
    Provider(#[from] ProviderError),

    #[error("unknown prompt template {0:?}")]
    UnknownTemplate(String),

    #[error("route needs extracted text but no OCR provider is configured")]
    NoOcrConfigured,

    #[error(transparent)]
    Dispatch(#[from] DispatchError),
}
