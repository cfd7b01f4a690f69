//! Session bootstrap orchestration
//!
//! Stands up a WebRTC session in the harness order: local media capture,
//! engine creation, local playback, offer generation, ICE trickle, remote
//! answer, remote playback. The engine and capture provider are opaque
//! collaborators; this module only sequences them.

use crate::engine::{EngineFactory, SignalingEngine};
use crate::errors::SessionError;
use crate::media::MediaSource;
use crate::types::{
    IceCandidateInit, SessionMode, SessionOptions, SessionState, SessionStatus,
};
use crate::ui::{spinner_targets, PlaybackTarget, StatusSink};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use chrono::{DateTime, Utc};
use std::sync::{Arc, Mutex};
use tokio::sync::RwLock;
use uuid::Uuid;

/// Per-session state, constructed fresh on start and dropped on stop
struct SessionContext {
    id: String,
    mode: SessionMode,
    state: SessionState,
    engine: Arc<dyn SignalingEngine>,
    sdp_offer: Option<String>,
    created_at: DateTime<Utc>,
}

/// Orchestrates the session-bootstrap workflow
///
/// Holds at most one active session. The local candidate log is append-only
/// and survives until the next start, so late candidates gathered during
/// teardown are never lost to readers. The log is a plain mutex, never held
/// across an await, so the engine's callback thread appends synchronously
/// and discovery order is preserved structurally.
pub struct SessionBootstrapper {
    factory: Arc<dyn EngineFactory>,
    media: Arc<dyn MediaSource>,
    ui: Arc<dyn StatusSink>,
    context: RwLock<Option<SessionContext>>,
    local_candidates: Arc<Mutex<Vec<String>>>,
}

impl SessionBootstrapper {
    pub fn new(
        factory: Arc<dyn EngineFactory>,
        media: Arc<dyn MediaSource>,
        ui: Arc<dyn StatusSink>,
    ) -> Self {
        Self {
            factory,
            media,
            ui,
            context: RwLock::new(None),
            local_candidates: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Start a session in the given directional mode.
    ///
    /// Any previously active session is torn down first, so at most one
    /// engine instance is alive at a time.
    pub async fn start_session(&self, options: SessionOptions) -> Result<SessionStatus, SessionError> {
        if self.context.read().await.is_some() {
            log::warn!("Active session found on start; disposing it first");
            self.stop_session().await;
        }

        log::info!("Starting WebRTC session in {} mode", options.mode.as_str());
        let (local, remote) = spinner_targets(options.mode);
        self.ui.show_spinner(local, remote);

        // Candidate log is per-session: reset before the engine can trickle.
        self.local_candidates.lock().expect("lock poisoned").clear();

        let local_stream = if options.mode.needs_local_sink() {
            Some(self.media.request_stream(&options.constraints).await?)
        } else {
            None
        };

        let candidates = Arc::clone(&self.local_candidates);
        let observer: crate::engine::CandidateObserver = Arc::new(move |candidate| {
            on_local_ice_candidate(&candidates, candidate);
        });

        let engine = self
            .factory
            .create(&options, observer)
            .await
            .map_err(|e| SessionError::SessionCreationError(e.to_string()))?;

        if let Some(stream) = &local_stream {
            engine
                .attach_local_media(stream)
                .await
                .map_err(|e| SessionError::SessionCreationError(e.to_string()))?;
        }

        let mut context = SessionContext {
            id: Uuid::new_v4().to_string(),
            mode: options.mode,
            state: SessionState::Created,
            engine,
            sdp_offer: None,
            created_at: Utc::now(),
        };

        if options.mode.needs_local_sink() {
            self.ui.start_playback(PlaybackTarget::Local);
        }

        // Offer generation is part of the bootstrap; a failure here leaves
        // the session frozen in Created rather than tearing it down.
        match context.engine.generate_offer().await {
            Ok(offer) => {
                log::info!("SDP offer generated for session {}", context.id);
                context.sdp_offer = Some(offer);
                context.state = SessionState::OfferGenerated;
            }
            Err(e) => {
                log::error!("Offer generation failed: {}", e);
                *self.context.write().await = Some(context);
                self.ui.set_status("offer generation failed");
                return Err(SessionError::SessionCreationError(e.to_string()));
            }
        }

        let status = snapshot(&context, self.local_candidates.lock().expect("lock poisoned").len());
        *self.context.write().await = Some(context);
        self.ui.set_status(&format!("session started ({})", options.mode.as_str()));
        Ok(status)
    }

    /// Apply a remote ICE candidate received over the signaling channel.
    ///
    /// A failure is reported but leaves the session in its last good state.
    pub async fn add_remote_ice_candidate(&self, serialized: &str) -> Result<(), SessionError> {
        let candidate: IceCandidateInit = serde_json::from_str(serialized)
            .map_err(|e| SessionError::IceCandidateError(format!("malformed candidate: {}", e)))?;

        let context = self.context.read().await;
        let context = context
            .as_ref()
            .ok_or_else(|| SessionError::InvalidState("no active session".to_string()))?;

        context.engine.add_ice_candidate(candidate).await
    }

    /// Decode and apply the remote SDP answer; on success remote playback
    /// starts and the session becomes active.
    pub async fn submit_remote_answer(&self, encoded: &str) -> Result<(), SessionError> {
        let decoded = BASE64.decode(encoded.trim()).map_err(|e| {
            SessionError::AnswerProcessingError(format!("answer is not valid base64: {}", e))
        })?;
        let sdp = String::from_utf8(decoded).map_err(|e| {
            SessionError::AnswerProcessingError(format!("answer is not valid UTF-8: {}", e))
        })?;

        let mut context = self.context.write().await;
        let context = context
            .as_mut()
            .ok_or_else(|| SessionError::InvalidState("no active session".to_string()))?;

        context.engine.process_answer(sdp).await?;
        context.state = SessionState::AnswerApplied;

        log::info!("SDP answer applied for session {}", context.id);
        if context.mode.needs_remote_sink() {
            self.ui.start_playback(PlaybackTarget::Remote);
        }
        context.state = SessionState::Active;
        Ok(())
    }

    /// Dispose the active session, if any. Always resets spinner and status,
    /// and never fails; disposal errors are swallowed.
    pub async fn stop_session(&self) {
        if let Some(mut context) = self.context.write().await.take() {
            log::info!("Stopping session {}", context.id);
            context.state = SessionState::Disposed;
            if let Err(e) = context.engine.dispose().await {
                log::warn!("Engine disposal error ignored: {}", e);
            }
        }
        self.ui.hide_spinner();
        self.ui.clear_status();
    }

    /// Serialized local ICE candidates, in discovery order
    pub async fn local_candidates(&self) -> Vec<String> {
        self.local_candidates.lock().expect("lock poisoned").clone()
    }

    /// The generated local SDP offer, if negotiation got that far
    pub async fn sdp_offer(&self) -> Option<String> {
        self.context.read().await.as_ref().and_then(|c| c.sdp_offer.clone())
    }

    /// Remote streams received by the active engine
    pub async fn remote_streams(&self) -> Vec<crate::media::MediaStream> {
        match self.context.read().await.as_ref() {
            Some(context) => context.engine.remote_streams().await,
            None => Vec::new(),
        }
    }

    /// Send bytes over a data channel of the active session
    pub async fn send_data(&self, label: &str, data: Vec<u8>) -> Result<(), SessionError> {
        let context = self.context.read().await;
        let context = context
            .as_ref()
            .ok_or_else(|| SessionError::InvalidState("no active session".to_string()))?;
        context.engine.send_data(label, data).await
    }

    /// Status snapshot of the active session
    pub async fn status(&self) -> Option<SessionStatus> {
        let candidates = self.local_candidates.lock().expect("lock poisoned").len();
        self.context
            .read()
            .await
            .as_ref()
            .map(|context| snapshot(context, candidates))
    }
}

/// Append a locally discovered candidate to the ordered log.
///
/// Pure side-effecting observer; serialization cannot fail for this wire
/// format and the log never shrinks. Appends are synchronous under the
/// mutex, so two candidates from the engine cannot land out of order.
fn on_local_ice_candidate(candidate_log: &Arc<Mutex<Vec<String>>>, candidate: IceCandidateInit) {
    let serialized = serde_json::to_string(&candidate)
        .unwrap_or_else(|_| candidate.candidate.clone());
    log::debug!("Local candidate: '{}'", serialized);
    candidate_log
        .lock()
        .expect("lock poisoned")
        .push(serialized);
}

fn snapshot(context: &SessionContext, candidates: usize) -> SessionStatus {
    SessionStatus {
        session_id: context.id.clone(),
        mode: context.mode,
        state: context.state,
        local_candidates: candidates,
        has_offer: context.sdp_offer.is_some(),
        created_at: context.created_at,
    }
}
