use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use kanal::{AsyncReceiver, AsyncSender};
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use glimpse_capture::ScreenGrabber;
use glimpse_dispatch::Dispatch;
use glimpse_pipeline::sink::ChannelSink;
use glimpse_pipeline::{PipelineDeps, run_session};
use glimpse_types::{HostEvent, TriggerSignal};

use crate::hotkey::hotkey_io;
use crate::presenter::presenter_loop;
use crate::state::AppState;

/// Centralized channel management
pub struct ChannelSet {
    pub triggers: (AsyncSender<TriggerSignal>, AsyncReceiver<TriggerSignal>),
    pub host_events: (AsyncSender<HostEvent>, AsyncReceiver<HostEvent>),
}

impl ChannelSet {
    pub fn new() -> Self {
        Self {
            // Rendezvous channel: a send only completes while the session
            // loop is parked in recv, so the channel reads as full for the
            // whole lifetime of a running session.
            triggers: kanal::bounded_async(0),
            host_events: kanal::bounded_async(64),
        }
    }
}

/// Clonable trigger entry point shared by every trigger source.
///
/// Firing never waits. While a session is in flight the trigger channel is
/// full and the signal is dropped and counted rather than queued.
#[derive(Clone)]
pub struct TriggerHandle {
    tx: AsyncSender<TriggerSignal>,
    dropped: Arc<AtomicU64>,
}

impl TriggerHandle {
    pub(crate) fn new(tx: AsyncSender<TriggerSignal>) -> Self {
        Self {
            tx,
            dropped: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Returns true when the signal was handed to the session loop.
    pub fn fire(&self, signal: TriggerSignal) -> bool {
        match self.tx.try_send(signal) {
            Ok(true) => true,
            Ok(false) => {
                let total = self.dropped.fetch_add(1, Ordering::Relaxed) + 1;
                info!(dropped_total = total, "session in flight, trigger dropped");
                false
            }
            Err(err) => {
                error!(error = %err, "trigger channel closed");
                false
            }
        }
    }

    pub fn dropped_total(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }
}

/// Owns the background tasks and the channels wiring them together.
pub struct PipelineController {
    channels: ChannelSet,
    state: Arc<AppState>,
    deps: Arc<PipelineDeps>,
    trigger: TriggerHandle,
    cancel_token: CancellationToken,
}

impl PipelineController {
    pub fn new(
        state: Arc<AppState>,
        dispatch: Arc<dyn Dispatch>,
        grabber: Arc<dyn ScreenGrabber>,
    ) -> Self {
        let channels = ChannelSet::new();
        let deps = Arc::new(PipelineDeps {
            grabber,
            dispatch,
            sink: Arc::new(ChannelSink::new(channels.host_events.0.clone())),
            events: channels.host_events.0.clone(),
        });
        let trigger = TriggerHandle::new(channels.triggers.0.clone());

        Self {
            channels,
            state,
            deps,
            trigger,
            cancel_token: CancellationToken::new(),
        }
    }

    pub fn trigger_handle(&self) -> TriggerHandle {
        self.trigger.clone()
    }

    pub fn spawn_tasks(&self) -> JoinSet<anyhow::Result<()>> {
        let mut tasks = JoinSet::new();

        tasks.spawn(session_loop(
            self.state.clone(),
            self.deps.clone(),
            self.channels.triggers.1.clone(),
            self.cancel_token.child_token(),
        ));

        tasks.spawn(hotkey_io(
            self.state.clone(),
            self.trigger.clone(),
            self.cancel_token.child_token(),
        ));

        tasks.spawn(presenter_loop(
            self.channels.host_events.1.clone(),
            self.cancel_token.child_token(),
        ));

        tasks
    }

    pub fn shutdown(&self) {
        self.cancel_token.cancel();
    }
}

/// Receives trigger signals and runs one capture session at a time.
///
/// The configuration is snapshotted per trigger, so profile edits apply to
/// the next session rather than the one in flight.
pub(crate) async fn session_loop(
    state: Arc<AppState>,
    deps: Arc<PipelineDeps>,
    triggers: AsyncReceiver<TriggerSignal>,
    cancel: CancellationToken,
) -> anyhow::Result<()> {
    info!("session loop ready");

    loop {
        let trigger = tokio::select! {
            _ = cancel.cancelled() => {
                info!("session loop stopping");
                return Ok(());
            }
            trigger = triggers.recv() => trigger?,
        };

        let snapshot = {
            let config = state.config.read().await;
            config.clone()
        };

        run_session(&deps, snapshot, trigger).await;
    }
}
