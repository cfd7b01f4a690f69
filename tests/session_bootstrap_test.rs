//! Session bootstrap workflow tests against a fake signaling engine
//!
//! Covers the ordered bootstrap sequence (capture, create, playback, offer),
//! the candidate log, answer application, and teardown semantics without
//! touching a real peer connection.

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use crabrtc::engine::{CandidateObserver, EngineFactory, SignalingEngine};
use crabrtc::errors::SessionError;
use crabrtc::media::{MediaStream, SyntheticMediaSource};
use crabrtc::session::SessionBootstrapper;
use crabrtc::types::{
    IceCandidateInit, MediaConstraints, SessionMode, SessionOptions, SessionState,
};
use crabrtc::ui::{PlaybackTarget, StatusSink};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

struct FakeEngine {
    answer_fails: bool,
    attached_media: Mutex<Vec<MediaStream>>,
    processed_answers: Mutex<Vec<String>>,
    added_candidates: Mutex<Vec<IceCandidateInit>>,
    remote: Vec<MediaStream>,
    disposed: AtomicBool,
}

impl FakeEngine {
    fn new(answer_fails: bool) -> Self {
        Self {
            answer_fails,
            attached_media: Mutex::new(Vec::new()),
            processed_answers: Mutex::new(Vec::new()),
            added_candidates: Mutex::new(Vec::new()),
            remote: vec![MediaStream::new("remote-0".to_string(), true, true)],
            disposed: AtomicBool::new(false),
        }
    }
}

#[async_trait]
impl SignalingEngine for FakeEngine {
    async fn attach_local_media(&self, stream: &MediaStream) -> Result<(), SessionError> {
        self.attached_media.lock().unwrap().push(stream.clone());
        Ok(())
    }

    async fn generate_offer(&self) -> Result<String, SessionError> {
        Ok("v=0\r\no=- 0 0 IN IP4 127.0.0.1\r\ns=-\r\n".to_string())
    }

    async fn add_ice_candidate(&self, candidate: IceCandidateInit) -> Result<(), SessionError> {
        if candidate.candidate.contains("reject") {
            return Err(SessionError::IceCandidateError("rejected".to_string()));
        }
        self.added_candidates.lock().unwrap().push(candidate);
        Ok(())
    }

    async fn process_answer(&self, sdp: String) -> Result<(), SessionError> {
        if self.answer_fails {
            return Err(SessionError::AnswerProcessingError(
                "negotiation failed".to_string(),
            ));
        }
        self.processed_answers.lock().unwrap().push(sdp);
        Ok(())
    }

    async fn create_data_channel(&self, _label: &str) -> Result<(), SessionError> {
        Ok(())
    }

    async fn send_data(&self, _label: &str, _data: Vec<u8>) -> Result<(), SessionError> {
        Ok(())
    }

    async fn remote_streams(&self) -> Vec<MediaStream> {
        self.remote.clone()
    }

    async fn dispose(&self) -> Result<(), SessionError> {
        self.disposed.store(true, Ordering::SeqCst);
        Ok(())
    }
}

struct FakeFactory {
    fail_create: bool,
    answer_fails: bool,
    trickle: Vec<String>,
    created_options: Mutex<Vec<SessionOptions>>,
    engines: Mutex<Vec<Arc<FakeEngine>>>,
    observers: Mutex<Vec<CandidateObserver>>,
}

impl FakeFactory {
    fn new() -> Self {
        Self {
            fail_create: false,
            answer_fails: false,
            trickle: Vec::new(),
            created_options: Mutex::new(Vec::new()),
            engines: Mutex::new(Vec::new()),
            observers: Mutex::new(Vec::new()),
        }
    }

    fn failing() -> Self {
        Self {
            fail_create: true,
            ..Self::new()
        }
    }

    fn with_trickle(candidates: Vec<&str>) -> Self {
        Self {
            trickle: candidates.into_iter().map(String::from).collect(),
            ..Self::new()
        }
    }

    fn last_engine(&self) -> Arc<FakeEngine> {
        self.engines.lock().unwrap().last().unwrap().clone()
    }

    fn last_observer(&self) -> CandidateObserver {
        self.observers.lock().unwrap().last().unwrap().clone()
    }
}

#[async_trait]
impl EngineFactory for FakeFactory {
    async fn create(
        &self,
        options: &SessionOptions,
        on_candidate: CandidateObserver,
    ) -> Result<Arc<dyn SignalingEngine>, SessionError> {
        if self.fail_create {
            return Err(SessionError::EngineError("backend unavailable".to_string()));
        }
        self.created_options.lock().unwrap().push(options.clone());
        self.observers.lock().unwrap().push(on_candidate.clone());

        for candidate in &self.trickle {
            on_candidate(IceCandidateInit {
                candidate: candidate.clone(),
                sdp_mid: Some("0".to_string()),
                sdp_mline_index: Some(0),
            });
        }

        let engine = Arc::new(FakeEngine::new(self.answer_fails));
        self.engines.lock().unwrap().push(engine.clone());
        Ok(engine)
    }
}

#[derive(Default)]
struct RecordingSink {
    events: Mutex<Vec<String>>,
}

impl RecordingSink {
    fn events(&self) -> Vec<String> {
        self.events.lock().unwrap().clone()
    }
}

impl StatusSink for RecordingSink {
    fn show_spinner(&self, local: bool, remote: bool) {
        self.events
            .lock()
            .unwrap()
            .push(format!("spinner:{}:{}", local, remote));
    }

    fn hide_spinner(&self) {
        self.events.lock().unwrap().push("spinner-hidden".to_string());
    }

    fn start_playback(&self, target: PlaybackTarget) {
        let name = match target {
            PlaybackTarget::Local => "local",
            PlaybackTarget::Remote => "remote",
        };
        self.events.lock().unwrap().push(format!("playback:{}", name));
    }

    fn set_status(&self, status: &str) {
        self.events.lock().unwrap().push(format!("status:{}", status));
    }

    fn clear_status(&self) {
        self.events.lock().unwrap().push("status-cleared".to_string());
    }
}

fn bootstrapper(
    factory: Arc<FakeFactory>,
    sink: Arc<RecordingSink>,
) -> SessionBootstrapper {
    SessionBootstrapper::new(factory, Arc::new(SyntheticMediaSource::new()), sink)
}

fn options(mode: SessionMode) -> SessionOptions {
    SessionOptions::new(mode, MediaConstraints::default())
}

#[tokio::test]
async fn test_send_recv_bootstrap_sequence() {
    let factory = Arc::new(FakeFactory::new());
    let sink = Arc::new(RecordingSink::default());
    let session = bootstrapper(factory.clone(), sink.clone());

    let status = session.start_session(options(SessionMode::SendRecv)).await.unwrap();
    assert_eq!(status.mode, SessionMode::SendRecv);
    assert_eq!(status.state, SessionState::OfferGenerated);
    assert!(status.has_offer);

    // Local media attached before offer generation
    let engine = factory.last_engine();
    assert_eq!(engine.attached_media.lock().unwrap().len(), 1);

    let events = sink.events();
    assert_eq!(events[0], "spinner:true:true");
    assert!(events.contains(&"playback:local".to_string()));

    let offer = session.sdp_offer().await.unwrap();
    assert!(offer.starts_with("v=0"));
}

#[tokio::test]
async fn test_mode_determines_media_and_sinks() {
    // SendOnly: local capture, local spinner only
    let factory = Arc::new(FakeFactory::new());
    let sink = Arc::new(RecordingSink::default());
    let session = bootstrapper(factory.clone(), sink.clone());
    session.start_session(options(SessionMode::SendOnly)).await.unwrap();
    assert_eq!(sink.events()[0], "spinner:true:false");
    assert_eq!(factory.last_engine().attached_media.lock().unwrap().len(), 1);

    // RecvOnly: no local capture, remote spinner only
    let factory = Arc::new(FakeFactory::new());
    let sink = Arc::new(RecordingSink::default());
    let session = bootstrapper(factory.clone(), sink.clone());
    session.start_session(options(SessionMode::RecvOnly)).await.unwrap();
    assert_eq!(sink.events()[0], "spinner:false:true");
    assert!(factory.last_engine().attached_media.lock().unwrap().is_empty());
    assert!(!sink.events().contains(&"playback:local".to_string()));
}

#[tokio::test]
async fn test_engine_create_failure_surfaces_session_creation_error() {
    let factory = Arc::new(FakeFactory::failing());
    let sink = Arc::new(RecordingSink::default());
    let session = bootstrapper(factory, sink);

    let result = session.start_session(options(SessionMode::SendRecv)).await;
    assert!(matches!(
        result,
        Err(SessionError::SessionCreationError(_))
    ));
    assert!(session.status().await.is_none());
}

#[tokio::test]
async fn test_media_failure_surfaces_acquisition_error() {
    let factory = Arc::new(FakeFactory::new());
    let session = SessionBootstrapper::new(
        factory,
        Arc::new(SyntheticMediaSource::failing()),
        Arc::new(RecordingSink::default()),
    );

    let result = session.start_session(options(SessionMode::SendOnly)).await;
    assert!(matches!(
        result,
        Err(SessionError::MediaAcquisitionError(_))
    ));
}

#[tokio::test]
async fn test_local_candidates_kept_in_discovery_order() {
    let factory = Arc::new(FakeFactory::with_trickle(vec!["cand-a", "cand-b", "cand-c"]));
    let sink = Arc::new(RecordingSink::default());
    let session = bootstrapper(factory, sink);

    session.start_session(options(SessionMode::SendRecv)).await.unwrap();

    let log = session.local_candidates().await;
    assert_eq!(log.len(), 3);
    assert!(log[0].contains("cand-a"));
    assert!(log[1].contains("cand-b"));
    assert!(log[2].contains("cand-c"));

    // Each entry is the JSON transport format
    let parsed: crabrtc::types::IceCandidateInit = serde_json::from_str(&log[0]).unwrap();
    assert_eq!(parsed.candidate, "cand-a");
}

#[tokio::test]
async fn test_candidate_order_preserved_under_interleaved_reads() {
    let factory = Arc::new(FakeFactory::new());
    let sink = Arc::new(RecordingSink::default());
    let session = bootstrapper(factory.clone(), sink);
    session.start_session(options(SessionMode::SendRecv)).await.unwrap();

    // Trickle after the bootstrap completed, interleaving appends with
    // concurrent readers of the log and the status snapshot.
    let observer = factory.last_observer();
    for i in 0..100 {
        observer(IceCandidateInit {
            candidate: format!("cand-{}", i),
            sdp_mid: Some("0".to_string()),
            sdp_mline_index: Some(0),
        });
        if i % 3 == 0 {
            let _ = session.local_candidates().await;
        }
        if i % 7 == 0 {
            let _ = session.status().await;
        }
    }

    let log = session.local_candidates().await;
    assert_eq!(log.len(), 100);
    for (i, entry) in log.iter().enumerate() {
        let parsed: crabrtc::types::IceCandidateInit = serde_json::from_str(entry).unwrap();
        assert_eq!(parsed.candidate, format!("cand-{}", i));
    }
    assert_eq!(session.status().await.unwrap().local_candidates, 100);
}

#[tokio::test]
async fn test_remote_candidate_forwarded_to_engine() {
    let factory = Arc::new(FakeFactory::new());
    let sink = Arc::new(RecordingSink::default());
    let session = bootstrapper(factory.clone(), sink);
    session.start_session(options(SessionMode::SendRecv)).await.unwrap();

    let wire = serde_json::json!({
        "candidate": "candidate:1 1 UDP 2122260223 192.168.1.1 5000 typ host",
        "sdp_mid": "0",
        "sdp_mline_index": 0
    })
    .to_string();
    session.add_remote_ice_candidate(&wire).await.unwrap();

    let engine = factory.last_engine();
    assert_eq!(engine.added_candidates.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn test_malformed_remote_candidate_is_ice_candidate_error() {
    let factory = Arc::new(FakeFactory::new());
    let session = bootstrapper(factory, Arc::new(RecordingSink::default()));
    session.start_session(options(SessionMode::SendRecv)).await.unwrap();

    let result = session.add_remote_ice_candidate("{not json").await;
    assert!(matches!(result, Err(SessionError::IceCandidateError(_))));

    // Session stays in its last good state
    let status = session.status().await.unwrap();
    assert_eq!(status.state, SessionState::OfferGenerated);
}

#[tokio::test]
async fn test_answer_is_decoded_before_forwarding() {
    let factory = Arc::new(FakeFactory::new());
    let sink = Arc::new(RecordingSink::default());
    let session = bootstrapper(factory.clone(), sink.clone());
    session.start_session(options(SessionMode::SendRecv)).await.unwrap();

    let sdp = "v=0\r\no=- 1 1 IN IP4 127.0.0.1\r\ns=-\r\n";
    session
        .submit_remote_answer(&BASE64.encode(sdp))
        .await
        .unwrap();

    let engine = factory.last_engine();
    let processed = engine.processed_answers.lock().unwrap();
    assert_eq!(processed.as_slice(), &[sdp.to_string()]);

    assert!(sink.events().contains(&"playback:remote".to_string()));
    assert_eq!(session.status().await.unwrap().state, SessionState::Active);
}

#[tokio::test]
async fn test_non_base64_answer_fails_without_remote_playback() {
    let factory = Arc::new(FakeFactory::new());
    let sink = Arc::new(RecordingSink::default());
    let session = bootstrapper(factory.clone(), sink.clone());
    session.start_session(options(SessionMode::SendRecv)).await.unwrap();

    let result = session.submit_remote_answer("*** not base64 ***").await;
    assert!(matches!(
        result,
        Err(SessionError::AnswerProcessingError(_))
    ));

    assert!(factory.last_engine().processed_answers.lock().unwrap().is_empty());
    assert!(!sink.events().contains(&"playback:remote".to_string()));
    assert_eq!(
        session.status().await.unwrap().state,
        SessionState::OfferGenerated
    );
}

#[tokio::test]
async fn test_failed_negotiation_freezes_state() {
    let mut factory = FakeFactory::new();
    factory.answer_fails = true;
    let factory = Arc::new(factory);
    let sink = Arc::new(RecordingSink::default());
    let session = bootstrapper(factory, sink.clone());
    session.start_session(options(SessionMode::SendRecv)).await.unwrap();

    let sdp = BASE64.encode("v=0\r\n");
    let result = session.submit_remote_answer(&sdp).await;
    assert!(matches!(
        result,
        Err(SessionError::AnswerProcessingError(_))
    ));
    assert!(!sink.events().contains(&"playback:remote".to_string()));
}

#[tokio::test]
async fn test_stop_session_is_idempotent_and_resets_ui() {
    let factory = Arc::new(FakeFactory::new());
    let sink = Arc::new(RecordingSink::default());
    let session = bootstrapper(factory.clone(), sink.clone());
    session.start_session(options(SessionMode::SendRecv)).await.unwrap();

    session.stop_session().await;
    let engine = factory.last_engine();
    assert!(engine.disposed.load(Ordering::SeqCst));
    assert!(session.status().await.is_none());

    // Second stop with no session still resets UI state
    session.stop_session().await;
    let resets = sink
        .events()
        .iter()
        .filter(|e| *e == "spinner-hidden")
        .count();
    assert_eq!(resets, 2);
}

#[tokio::test]
async fn test_new_start_disposes_previous_session() {
    let factory = Arc::new(FakeFactory::new());
    let sink = Arc::new(RecordingSink::default());
    let session = bootstrapper(factory.clone(), sink);

    session.start_session(options(SessionMode::SendRecv)).await.unwrap();
    let first = factory.last_engine();

    session.start_session(options(SessionMode::RecvOnly)).await.unwrap();
    let second = factory.last_engine();

    assert!(first.disposed.load(Ordering::SeqCst));
    assert!(!second.disposed.load(Ordering::SeqCst));
    assert_eq!(
        session.status().await.unwrap().mode,
        SessionMode::RecvOnly
    );
}

#[tokio::test]
async fn test_candidate_log_resets_per_session() {
    let factory = Arc::new(FakeFactory::with_trickle(vec!["cand-a"]));
    let session = bootstrapper(factory, Arc::new(RecordingSink::default()));

    session.start_session(options(SessionMode::SendRecv)).await.unwrap();
    assert_eq!(session.local_candidates().await.len(), 1);

    session.start_session(options(SessionMode::SendRecv)).await.unwrap();
    assert_eq!(session.local_candidates().await.len(), 1);
}

#[tokio::test]
async fn test_operations_without_session_report_invalid_state() {
    let factory = Arc::new(FakeFactory::new());
    let session = bootstrapper(factory, Arc::new(RecordingSink::default()));

    let result = session.add_remote_ice_candidate("{\"candidate\":\"c\"}").await;
    assert!(matches!(result, Err(SessionError::InvalidState(_))));

    let result = session.submit_remote_answer(&BASE64.encode("v=0")).await;
    assert!(matches!(result, Err(SessionError::InvalidState(_))));

    assert!(session.remote_streams().await.is_empty());
}
