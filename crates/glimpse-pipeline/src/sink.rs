use kanal::AsyncSender;

use glimpse_types::{HostEvent, SessionReport};

/// Consumer of terminal session outcomes. Delivery must never fail the
/// session; implementations log and swallow their own errors.
#[async_trait::async_trait]
pub trait ResultSink: Send + Sync {
    async fn deliver(&self, report: SessionReport);
}

/// Sink that forwards reports onto the host event channel.
pub struct ChannelSink {
    events: AsyncSender<HostEvent>,
}

impl ChannelSink {
    pub fn new(events: AsyncSender<HostEvent>) -> Self {
        Self { events }
    }
}

#[async_trait::async_trait]
impl ResultSink for ChannelSink {
    async fn deliver(&self, report: SessionReport) {
        if let Err(err) = self
            .events
            .send(HostEvent::SessionFinished(report))
            .await
        {
            tracing::warn!(error = %err, "host event channel closed, dropping report");
        }
    }
}
