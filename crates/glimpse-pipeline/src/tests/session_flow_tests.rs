use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use kanal::AsyncReceiver;
use tokio::time::timeout;

use glimpse_capture::{CaptureError, ScreenGrabber};
use glimpse_config::Config;
use glimpse_config::providers::{ProviderConfig, ProviderKind};
use glimpse_dispatch::{AiPayload, AiReply, Dispatch, DispatchError};
use glimpse_types::{
    CaptureRegion, HostEvent, PixelBuffer, RoutePath, SessionOutcome, SessionPhase, SessionReport,
    TriggerSignal, TriggerSource,
};

use crate::runner::{PipelineDeps, run_session};
use crate::sink::ChannelSink;

struct MockGrabber {
    grabs: AtomicUsize,
    regions: Mutex<Vec<Option<CaptureRegion>>>,
}

impl MockGrabber {
    fn new() -> Arc<Self> {
        Arc::new(Self {
            grabs: AtomicUsize::new(0),
            regions: Mutex::new(Vec::new()),
        })
    }
}

impl ScreenGrabber for MockGrabber {
    fn grab(&self, region: Option<CaptureRegion>) -> Result<PixelBuffer, CaptureError> {
        self.grabs.fetch_add(1, Ordering::SeqCst);
        self.regions.lock().expect("poisoned").push(region);
        Ok(PixelBuffer {
            png: vec![1, 2, 3, 4],
            width: 2,
            height: 2,
        })
    }
}

struct FailingGrabber;

impl ScreenGrabber for FailingGrabber {
    fn grab(&self, _region: Option<CaptureRegion>) -> Result<PixelBuffer, CaptureError> {
        Err(CaptureError::NoMonitor)
    }
}

#[derive(Default)]
struct ScriptedDispatch {
    calls: Mutex<Vec<&'static str>>,
    payloads: Mutex<Vec<AiPayload>>,
    ocr_text: String,
}

impl ScriptedDispatch {
    fn with_ocr_text(text: &str) -> Arc<Self> {
        Arc::new(Self {
            ocr_text: text.to_string(),
            ..Self::default()
        })
    }

    fn calls(&self) -> Vec<&'static str> {
        self.calls.lock().expect("poisoned").clone()
    }
}

#[async_trait::async_trait]
impl Dispatch for ScriptedDispatch {
    async fn ocr(
        &self,
        _provider: &ProviderConfig,
        _image: &PixelBuffer,
    ) -> Result<String, DispatchError> {
        self.calls.lock().expect("poisoned").push("ocr");
        Ok(self.ocr_text.clone())
    }

    async fn ai(
        &self,
        _provider: &ProviderConfig,
        payload: AiPayload,
    ) -> Result<AiReply, DispatchError> {
        self.calls.lock().expect("poisoned").push("ai");
        let reply = AiReply {
            answer: "forty two".to_string(),
            reasoning: Some("because".to_string()),
        };
        self.payloads.lock().expect("poisoned").push(payload);
        Ok(reply)
    }
}

fn harness(
    dispatch: Arc<ScriptedDispatch>,
    grabber: Arc<dyn ScreenGrabber>,
) -> (PipelineDeps, AsyncReceiver<HostEvent>) {
    let (tx, rx) = kanal::unbounded_async::<HostEvent>();
    let deps = PipelineDeps {
        grabber,
        dispatch,
        sink: Arc::new(ChannelSink::new(tx.clone())),
        events: tx,
    };
    (deps, rx)
}

fn ocr_config() -> Config {
    let mut config = Config::default();
    config.providers.entries.push(ProviderConfig {
        id: "paddle".to_string(),
        kind: ProviderKind::Ocr,
        endpoint: "http://127.0.0.1:8868/ocr".to_string(),
        ..ProviderConfig::default()
    });
    config.providers.active_ocr = Some("paddle".to_string());
    config
}

fn trigger(template: Option<&str>) -> TriggerSignal {
    TriggerSignal {
        region: None,
        source: TriggerSource::Hotkey,
        template: template.map(str::to_string),
    }
}

async fn drain_until_finished(
    rx: &AsyncReceiver<HostEvent>,
) -> (Vec<SessionPhase>, SessionReport) {
    let mut phases = Vec::new();
    loop {
        let event = timeout(Duration::from_secs(2), rx.recv())
            .await
            .expect("timed out waiting for events")
            .expect("channel closed");
        match event {
            HostEvent::SessionStarted { .. } => {}
            HostEvent::PhaseChanged { phase, .. } => phases.push(phase),
            HostEvent::SessionFinished(report) => return (phases, report),
        }
    }
}

fn answer_of(report: &SessionReport) -> &str {
    match &report.outcome {
        SessionOutcome::Completed { answer, .. } => answer,
        SessionOutcome::Failed { error } => panic!("session failed: {}", error),
    }
}

fn error_of(report: &SessionReport) -> &str {
    match &report.outcome {
        SessionOutcome::Failed { error } => error,
        SessionOutcome::Completed { answer, .. } => {
            panic!("session unexpectedly completed: {}", answer)
        }
    }
}

#[tokio::test]
async fn test_direct_route_sends_capture_straight_to_ai() {
    let dispatch = ScriptedDispatch::with_ocr_text("");
    let grabber = MockGrabber::new();
    let (deps, rx) = harness(dispatch.clone(), grabber.clone());

    let report = run_session(&deps, Config::default(), trigger(Some("explain"))).await;

    assert_eq!(answer_of(&report), "forty two");
    assert_eq!(report.route, Some(RoutePath::DirectMultimodal));
    assert_eq!(dispatch.calls(), vec!["ai"]);

    let payloads = dispatch.payloads.lock().expect("poisoned");
    assert!(payloads[0].image.is_some(), "direct route must carry the capture");

    let (phases, finished) = drain_until_finished(&rx).await;
    assert_eq!(
        phases,
        vec![
            SessionPhase::Captured,
            SessionPhase::Routed,
            SessionPhase::AiPending,
            SessionPhase::Completed,
        ]
    );
    assert_eq!(finished.id, report.id);
}

#[tokio::test]
async fn test_ocr_route_extracts_before_asking() {
    let dispatch = ScriptedDispatch::with_ocr_text("2 + 2 = ?");
    let grabber = MockGrabber::new();
    let (deps, rx) = harness(dispatch.clone(), grabber.clone());

    let report = run_session(&deps, ocr_config(), trigger(Some("solve"))).await;

    assert_eq!(answer_of(&report), "forty two");
    assert_eq!(report.route, Some(RoutePath::OcrThenText));
    assert_eq!(dispatch.calls(), vec!["ocr", "ai"], "extraction must come first");

    let payloads = dispatch.payloads.lock().expect("poisoned");
    assert!(payloads[0].image.is_none(), "text route must not carry the capture");
    assert!(
        payloads[0].prompt.contains("2 + 2 = ?"),
        "prompt missing extracted text: {}",
        payloads[0].prompt
    );

    let (phases, _) = drain_until_finished(&rx).await;
    assert_eq!(
        phases,
        vec![
            SessionPhase::Captured,
            SessionPhase::Routed,
            SessionPhase::OcrPending,
            SessionPhase::OcrDone,
            SessionPhase::AiPending,
            SessionPhase::Completed,
        ]
    );
}

#[tokio::test]
async fn test_text_model_without_ocr_fails_without_dispatching() {
    let dispatch = ScriptedDispatch::with_ocr_text("");
    let grabber = MockGrabber::new();
    let (deps, rx) = harness(dispatch.clone(), grabber.clone());

    let mut config = Config::default();
    config.providers.entries[0].multimodal = false;

    let report = run_session(&deps, config, trigger(Some("explain"))).await;

    assert!(error_of(&report).contains("OCR"));
    assert_eq!(report.route, Some(RoutePath::OcrThenText));
    assert!(dispatch.calls().is_empty(), "no provider may be called");
    assert_eq!(grabber.grabs.load(Ordering::SeqCst), 1);

    let (phases, _) = drain_until_finished(&rx).await;
    assert_eq!(
        phases,
        vec![
            SessionPhase::Captured,
            SessionPhase::Routed,
            SessionPhase::Failed,
        ]
    );
}

#[tokio::test]
async fn test_unknown_template_fails_before_capture() {
    let dispatch = ScriptedDispatch::with_ocr_text("");
    let grabber = MockGrabber::new();
    let (deps, rx) = harness(dispatch.clone(), grabber.clone());

    let report = run_session(&deps, Config::default(), trigger(Some("nope"))).await;

    assert!(error_of(&report).contains("nope"));
    assert!(report.route.is_none());
    assert!(dispatch.calls().is_empty());
    assert_eq!(grabber.grabs.load(Ordering::SeqCst), 0, "must not grab the screen");

    let (phases, _) = drain_until_finished(&rx).await;
    assert_eq!(phases, vec![SessionPhase::Failed]);
}

#[tokio::test]
async fn test_trigger_region_overrides_profile_region() {
    let dispatch = ScriptedDispatch::with_ocr_text("");
    let grabber = MockGrabber::new();
    let (deps, _rx) = harness(dispatch.clone(), grabber.clone());

    let mut config = Config::default();
    config.capture.region = Some(CaptureRegion {
        x: 0,
        y: 0,
        width: 100,
        height: 100,
    });

    let mut with_region = trigger(Some("explain"));
    with_region.region = Some(CaptureRegion {
        x: 50,
        y: 60,
        width: 70,
        height: 80,
    });
    run_session(&deps, config.clone(), with_region).await;
    run_session(&deps, config, trigger(Some("explain"))).await;

    let regions = grabber.regions.lock().expect("poisoned");
    let first = regions[0].expect("first grab had no region");
    assert_eq!((first.x, first.y, first.width, first.height), (50, 60, 70, 80));
    let second = regions[1].expect("second grab had no region");
    assert_eq!(second.width, 100, "profile region must be the fallback");
}

#[tokio::test]
async fn test_capture_failure_reports_and_skips_providers() {
    let dispatch = ScriptedDispatch::with_ocr_text("");
    let (deps, rx) = harness(dispatch.clone(), Arc::new(FailingGrabber));

    let report = run_session(&deps, Config::default(), trigger(None)).await;

    assert!(error_of(&report).contains("no monitor"));
    assert!(dispatch.calls().is_empty());

    let (phases, _) = drain_until_finished(&rx).await;
    assert_eq!(phases, vec![SessionPhase::Failed]);
}
