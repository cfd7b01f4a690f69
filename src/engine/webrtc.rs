//! webrtc-rs backed signaling engine

use crate::engine::{CandidateObserver, EngineFactory, SignalingEngine};
use crate::errors::SessionError;
use crate::media::MediaStream;
use crate::types::{IceCandidateInit, IceServerEntry, SessionMode, SessionOptions};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use webrtc::api::interceptor_registry::register_default_interceptors;
use webrtc::api::media_engine::MediaEngine;
use webrtc::api::APIBuilder;
use webrtc::data_channel::data_channel_init::RTCDataChannelInit;
use webrtc::data_channel::RTCDataChannel;
use webrtc::ice_transport::ice_candidate::RTCIceCandidate;
use webrtc::ice_transport::ice_server::RTCIceServer;
use webrtc::interceptor::registry::Registry;
use webrtc::peer_connection::configuration::RTCConfiguration;
use webrtc::peer_connection::sdp::session_description::RTCSessionDescription;
use webrtc::peer_connection::RTCPeerConnection;
use webrtc::rtp_transceiver::rtp_codec::RTPCodecType;
use webrtc::rtp_transceiver::rtp_transceiver_direction::RTCRtpTransceiverDirection;
use webrtc::rtp_transceiver::RTCRtpTransceiverInit;

impl From<IceServerEntry> for RTCIceServer {
    fn from(entry: IceServerEntry) -> Self {
        RTCIceServer {
            urls: entry.urls,
            username: entry.username.unwrap_or_default(),
            credential: entry.credential.unwrap_or_default(),
            ..Default::default()
        }
    }
}

fn transceiver_direction(mode: SessionMode) -> RTCRtpTransceiverDirection {
    match mode {
        SessionMode::SendRecv => RTCRtpTransceiverDirection::Sendrecv,
        SessionMode::SendOnly => RTCRtpTransceiverDirection::Sendonly,
        SessionMode::RecvOnly => RTCRtpTransceiverDirection::Recvonly,
    }
}

/// Signaling engine over a webrtc-rs peer connection
pub struct WebRtcEngine {
    mode: SessionMode,
    peer_connection: Arc<RTCPeerConnection>,
    data_channels: Arc<RwLock<HashMap<String, Arc<RTCDataChannel>>>>,
    remote_streams: Arc<RwLock<Vec<MediaStream>>>,
}

impl WebRtcEngine {
    async fn new(
        options: &SessionOptions,
        on_candidate: CandidateObserver,
    ) -> Result<Self, SessionError> {
        let mut media_engine = MediaEngine::default();
        media_engine
            .register_default_codecs()
            .map_err(|e| SessionError::EngineError(format!("codec registration failed: {}", e)))?;
        let registry = register_default_interceptors(Registry::new(), &mut media_engine)
            .map_err(|e| SessionError::EngineError(format!("interceptor setup failed: {}", e)))?;
        let api = APIBuilder::new()
            .with_media_engine(media_engine)
            .with_interceptor_registry(registry)
            .build();

        let rtc_config = RTCConfiguration {
            ice_servers: options
                .ice_servers
                .clone()
                .unwrap_or_default()
                .into_iter()
                .map(Into::into)
                .collect(),
            ..Default::default()
        };

        let peer_connection = Arc::new(
            api.new_peer_connection(rtc_config)
                .await
                .map_err(|e| {
                    SessionError::EngineError(format!("failed to create peer connection: {}", e))
                })?,
        );

        peer_connection.on_ice_candidate(Box::new(move |candidate: Option<RTCIceCandidate>| {
            if let Some(candidate) = candidate {
                log::debug!("Local ICE candidate gathered: {}", candidate);
                // sdp_mid/mline index are not exposed on RTCIceCandidate
                on_candidate(IceCandidateInit {
                    candidate: candidate.to_string(),
                    sdp_mid: None,
                    sdp_mline_index: None,
                });
            }
            Box::pin(async {})
        }));

        let remote_streams = Arc::new(RwLock::new(Vec::<MediaStream>::new()));
        let streams_clone = Arc::clone(&remote_streams);
        peer_connection.on_track(Box::new(move |track, _receiver, _transceiver| {
            let streams = Arc::clone(&streams_clone);
            Box::pin(async move {
                let stream_id = track.stream_id();
                let is_audio = track.kind() == RTPCodecType::Audio;
                log::info!("Remote track arrived: stream={}, kind={}", stream_id, track.kind());

                let mut streams = streams.write().await;
                match streams.iter().position(|s| s.id == stream_id) {
                    Some(i) => {
                        if is_audio {
                            streams[i].has_audio = true;
                        } else {
                            streams[i].has_video = true;
                        }
                    }
                    None => streams.push(MediaStream::new(stream_id, is_audio, !is_audio)),
                }
            })
        }));

        let engine = Self {
            mode: options.mode,
            peer_connection,
            data_channels: Arc::new(RwLock::new(HashMap::new())),
            remote_streams,
        };

        if let Some(label) = &options.data_channel {
            engine.create_data_channel(label).await?;
        }

        // Receive-only sessions carry no local media, so the transceivers
        // that drive ICE/media negotiation are added here instead.
        if !options.mode.needs_local_sink() {
            engine.add_transceivers(options.constraints.audio, options.constraints.video.is_some())
                .await?;
        }

        Ok(engine)
    }

    async fn add_transceivers(&self, audio: bool, video: bool) -> Result<(), SessionError> {
        let init = || {
            Some(RTCRtpTransceiverInit {
                direction: transceiver_direction(self.mode),
                send_encodings: vec![],
            })
        };

        if audio {
            self.peer_connection
                .add_transceiver_from_kind(RTPCodecType::Audio, init())
                .await
                .map_err(|e| {
                    SessionError::EngineError(format!("failed to add audio transceiver: {}", e))
                })?;
        }
        if video {
            self.peer_connection
                .add_transceiver_from_kind(RTPCodecType::Video, init())
                .await
                .map_err(|e| {
                    SessionError::EngineError(format!("failed to add video transceiver: {}", e))
                })?;
        }
        Ok(())
    }
}

#[async_trait]
impl SignalingEngine for WebRtcEngine {
    async fn attach_local_media(&self, stream: &MediaStream) -> Result<(), SessionError> {
        log::info!(
            "Attaching local stream {} (audio={}, video={})",
            stream.id,
            stream.has_audio,
            stream.has_video
        );
        self.add_transceivers(stream.has_audio, stream.has_video).await
    }

    async fn generate_offer(&self) -> Result<String, SessionError> {
        log::info!("Creating SDP offer");

        let offer = self
            .peer_connection
            .create_offer(None)
            .await
            .map_err(|e| SessionError::EngineError(format!("failed to create offer: {}", e)))?;

        self.peer_connection
            .set_local_description(offer.clone())
            .await
            .map_err(|e| {
                SessionError::EngineError(format!("failed to set local description: {}", e))
            })?;

        Ok(offer.sdp)
    }

    async fn add_ice_candidate(&self, candidate: IceCandidateInit) -> Result<(), SessionError> {
        log::debug!("Adding remote ICE candidate: {}", candidate.candidate);

        let init = webrtc::ice_transport::ice_candidate::RTCIceCandidateInit {
            candidate: candidate.candidate,
            sdp_mid: candidate.sdp_mid,
            sdp_mline_index: candidate.sdp_mline_index,
            username_fragment: None,
        };

        self.peer_connection
            .add_ice_candidate(init)
            .await
            .map_err(|e| SessionError::IceCandidateError(format!("engine rejected candidate: {}", e)))
    }

    async fn process_answer(&self, sdp: String) -> Result<(), SessionError> {
        log::info!("Applying remote SDP answer");

        let answer = RTCSessionDescription::answer(sdp)
            .map_err(|e| SessionError::AnswerProcessingError(format!("invalid SDP answer: {}", e)))?;

        self.peer_connection
            .set_remote_description(answer)
            .await
            .map_err(|e| {
                SessionError::AnswerProcessingError(format!(
                    "failed to set remote description: {}",
                    e
                ))
            })
    }

    async fn create_data_channel(&self, label: &str) -> Result<(), SessionError> {
        log::info!("Creating data channel '{}'", label);

        let config = RTCDataChannelInit {
            ordered: Some(true),
            ..Default::default()
        };

        let channel = self
            .peer_connection
            .create_data_channel(label, Some(config))
            .await
            .map_err(|e| {
                SessionError::EngineError(format!("failed to create data channel: {}", e))
            })?;

        self.data_channels
            .write()
            .await
            .insert(label.to_string(), channel);
        Ok(())
    }

    async fn send_data(&self, label: &str, data: Vec<u8>) -> Result<(), SessionError> {
        let channels = self.data_channels.read().await;
        let channel = channels.get(label).ok_or_else(|| {
            SessionError::EngineError(format!("data channel '{}' not found", label))
        })?;

        if channel.ready_state()
            != webrtc::data_channel::data_channel_state::RTCDataChannelState::Open
        {
            return Err(SessionError::EngineError(format!(
                "data channel '{}' is not open",
                label
            )));
        }

        log::debug!("Sending {} bytes through channel '{}'", data.len(), label);
        channel
            .send(&bytes::Bytes::from(data))
            .await
            .map(|_| ())
            .map_err(|e| SessionError::EngineError(format!("failed to send data: {}", e)))
    }

    async fn remote_streams(&self) -> Vec<MediaStream> {
        self.remote_streams.read().await.clone()
    }

    async fn dispose(&self) -> Result<(), SessionError> {
        log::info!("Closing peer connection");
        self.peer_connection
            .close()
            .await
            .map_err(|e| SessionError::EngineError(format!("failed to close: {}", e)))
    }
}

/// Factory producing webrtc-rs engines
pub struct WebRtcEngineFactory;

#[async_trait]
impl EngineFactory for WebRtcEngineFactory {
    async fn create(
        &self,
        options: &SessionOptions,
        on_candidate: CandidateObserver,
    ) -> Result<Arc<dyn SignalingEngine>, SessionError> {
        let engine = WebRtcEngine::new(options, on_candidate).await?;
        Ok(Arc::new(engine))
    }
}
