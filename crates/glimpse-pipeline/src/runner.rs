use std::sync::Arc;

use kanal::AsyncSender;
use tracing::{debug, info, warn};

use glimpse_capture::ScreenGrabber;
use glimpse_config::Config;
use glimpse_dispatch::{AiPayload, AiReply, Dispatch};
use glimpse_types::{
    HostEvent, RoutePath, SessionOutcome, SessionPhase, SessionReport, TriggerSignal,
};

use crate::session::CaptureSession;
use crate::sink::ResultSink;
use crate::{SessionError, router, template};

/// Shared collaborators for session runs.
pub struct PipelineDeps {
    pub grabber: Arc<dyn ScreenGrabber>,
    pub dispatch: Arc<dyn Dispatch>,
    pub sink: Arc<dyn ResultSink>,
    pub events: AsyncSender<HostEvent>,
}

/// Drives one trigger to a terminal report. `config` is the snapshot
/// taken when the trigger was accepted; edits made while the session
/// runs do not affect it.
pub async fn run_session(
    deps: &PipelineDeps,
    config: Config,
    trigger: TriggerSignal,
) -> SessionReport {
    let mut session = CaptureSession::new();
    let template_name = trigger
        .template
        .clone()
        .unwrap_or_else(|| config.prompts.default_template.clone());

    info!(
        id = %session.id(),
        source = ?trigger.source,
        template = %template_name,
        "session started"
    );
    let _ = deps
        .events
        .send(HostEvent::SessionStarted {
            id: session.id(),
            source: trigger.source,
        })
        .await;

    let outcome = match drive(deps, &config, &template_name, &trigger, &mut session).await {
        Ok(reply) => {
            advance(&mut session, &deps.events, SessionPhase::Completed).await;
            info!(
                id = %session.id(),
                elapsed_ms = session.elapsed_ms(),
                "session completed"
            );
            SessionOutcome::Completed {
                answer: reply.answer,
                reasoning: reply.reasoning,
            }
        }
        Err(err) => {
            advance(&mut session, &deps.events, SessionPhase::Failed).await;
            warn!(id = %session.id(), error = %err, "session failed");
            SessionOutcome::Failed {
                error: err.to_string(),
            }
        }
    };

    let report = SessionReport {
        id: session.id(),
        template: template_name,
        route: session.route(),
        outcome,
        notify: config.notify.style,
        elapsed_ms: session.elapsed_ms(),
    };
    deps.sink.deliver(report.clone()).await;
    report
}

async fn drive(
    deps: &PipelineDeps,
    config: &Config,
    template_name: &str,
    trigger: &TriggerSignal,
    session: &mut CaptureSession,
) -> Result<AiReply, SessionError> {
    let active = config.providers.resolve()?;
    let template = config
        .prompts
        .get(template_name)
        .ok_or_else(|| SessionError::UnknownTemplate(template_name.to_string()))?
        .clone();

    let region = trigger.region.or(config.capture.region);
    let grabber = deps.grabber.clone();
    let image = tokio::task::spawn_blocking(move || grabber.grab(region)).await??;
    advance(session, &deps.events, SessionPhase::Captured).await;
    debug!(
        id = %session.id(),
        width = image.width,
        height = image.height,
        "capture ready"
    );

    let route = router::route(active.ai.multimodal, &template);
    session.set_route(route);
    advance(session, &deps.events, SessionPhase::Routed).await;
    info!(id = %session.id(), route = ?route, "route selected");

    let payload = match route {
        RoutePath::DirectMultimodal => AiPayload {
            prompt: template::render(&template, None),
            image: Some(image),
        },
        RoutePath::OcrThenText => {
            let ocr_provider = active.ocr.as_ref().ok_or(SessionError::NoOcrConfigured)?;
            advance(session, &deps.events, SessionPhase::OcrPending).await;
            let text = deps.dispatch.ocr(ocr_provider, &image).await?;
            advance(session, &deps.events, SessionPhase::OcrDone).await;
            debug!(id = %session.id(), chars = text.len(), "text extracted");
            AiPayload {
                prompt: template::render(&template, Some(&text)),
                image: None,
            }
        }
    };

    advance(session, &deps.events, SessionPhase::AiPending).await;
    let reply = deps.dispatch.ai(&active.ai, payload).await?;
    Ok(reply)
}

async fn advance(
    session: &mut CaptureSession,
    events: &AsyncSender<HostEvent>,
    phase: SessionPhase,
) {
    session.advance(phase);
    let _ = events
        .send(HostEvent::PhaseChanged {
            id: session.id(),
            phase,
        })
        .await;
}
