//! Signaling engine capability
//!
//! Offer/answer generation, ICE gathering, and connection establishment are
//! delegated to an opaque engine behind this trait, so the bootstrapper can
//! run against the webrtc-rs backend in production and a fake in tests.

pub mod webrtc;

use crate::errors::SessionError;
use crate::media::MediaStream;
use crate::types::{IceCandidateInit, SessionOptions};
use async_trait::async_trait;
use std::sync::Arc;

/// Observer invoked for every locally discovered ICE candidate, in
/// discovery order.
pub type CandidateObserver = Arc<dyn Fn(IceCandidateInit) + Send + Sync>;

/// Opaque peer signaling engine
#[async_trait]
pub trait SignalingEngine: Send + Sync {
    /// Attach locally captured media before negotiation
    async fn attach_local_media(&self, stream: &MediaStream) -> Result<(), SessionError>;

    /// Generate the local SDP offer and install it as the local description
    async fn generate_offer(&self) -> Result<String, SessionError>;

    /// Apply a remote ICE candidate
    async fn add_ice_candidate(&self, candidate: IceCandidateInit) -> Result<(), SessionError>;

    /// Apply the remote SDP answer
    async fn process_answer(&self, sdp: String) -> Result<(), SessionError>;

    /// Open a data channel on the underlying connection
    async fn create_data_channel(&self, label: &str) -> Result<(), SessionError>;

    /// Send bytes over an open data channel
    async fn send_data(&self, label: &str, data: Vec<u8>) -> Result<(), SessionError>;

    /// Remote media streams received so far, in arrival order
    async fn remote_streams(&self) -> Vec<MediaStream>;

    /// Release the underlying connection
    async fn dispose(&self) -> Result<(), SessionError>;
}

/// Factory creating engines for new sessions
#[async_trait]
pub trait EngineFactory: Send + Sync {
    async fn create(
        &self,
        options: &SessionOptions,
        on_candidate: CandidateObserver,
    ) -> Result<Arc<dyn SignalingEngine>, SessionError>;
}

pub use self::webrtc::{WebRtcEngine, WebRtcEngineFactory};
