//! Core data types for session bootstrap
//!
//! Wire formats follow the harness conventions: ICE candidates travel as
//! JSON-serialized objects, remote SDP answers as base64-encoded text.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Directional mode of a WebRTC session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SessionMode {
    SendRecv,
    SendOnly,
    RecvOnly,
}

impl SessionMode {
    /// Whether this mode feeds a local media sink (preview of captured media)
    pub fn needs_local_sink(&self) -> bool {
        matches!(self, SessionMode::SendRecv | SessionMode::SendOnly)
    }

    /// Whether this mode feeds a remote media sink (playback of received media)
    pub fn needs_remote_sink(&self) -> bool {
        matches!(self, SessionMode::SendRecv | SessionMode::RecvOnly)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SessionMode::SendRecv => "send-recv",
            SessionMode::SendOnly => "send-only",
            SessionMode::RecvOnly => "recv-only",
        }
    }
}

/// Video capture constraints
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VideoConstraints {
    pub max_width: u32,
    pub min_frame_rate: u32,
    pub ideal_frame_rate: u32,
    pub max_frame_rate: u32,
}

impl Default for VideoConstraints {
    fn default() -> Self {
        Self {
            max_width: 640,
            min_frame_rate: 10,
            ideal_frame_rate: 15,
            max_frame_rate: 20,
        }
    }
}

/// User media constraints (audio flag + optional video bounds)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediaConstraints {
    pub audio: bool,
    pub video: Option<VideoConstraints>,
}

impl Default for MediaConstraints {
    fn default() -> Self {
        Self {
            audio: true,
            video: Some(VideoConstraints::default()),
        }
    }
}

impl MediaConstraints {
    /// Audio capture only, no video
    pub fn audio_only() -> Self {
        Self {
            audio: true,
            video: None,
        }
    }

    /// Video capture only, default video bounds
    pub fn video_only() -> Self {
        Self {
            audio: false,
            video: Some(VideoConstraints::default()),
        }
    }
}

/// ICE server configuration entry
///
/// Credential-less entries omit the auth fields entirely, distinguishing
/// "no auth" from "auth with null".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IceServerEntry {
    pub urls: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub credential: Option<String>,
}

impl IceServerEntry {
    /// Build an entry from harness-style parameters.
    ///
    /// The harness transports "no credentials" as the literal string "null";
    /// either field being "null" yields a url-only entry.
    pub fn from_parameters(url: String, username: String, credential: String) -> Self {
        if username == "null" || credential == "null" {
            Self {
                urls: vec![url],
                username: None,
                credential: None,
            }
        } else {
            Self {
                urls: vec![url],
                username: Some(username),
                credential: Some(credential),
            }
        }
    }

    pub fn url_only(url: String) -> Self {
        Self {
            urls: vec![url],
            username: None,
            credential: None,
        }
    }
}

/// ICE candidate wire format (JSON transport)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IceCandidateInit {
    pub candidate: String,
    #[serde(default)]
    pub sdp_mid: Option<String>,
    #[serde(default)]
    pub sdp_mline_index: Option<u16>,
}

/// Options for creating a session; immutable once the session starts
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionOptions {
    pub mode: SessionMode,
    pub constraints: MediaConstraints,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ice_servers: Option<Vec<IceServerEntry>>,
    /// Label of a data channel to open at setup time, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_channel: Option<String>,
}

impl SessionOptions {
    pub fn new(mode: SessionMode, constraints: MediaConstraints) -> Self {
        Self {
            mode,
            constraints,
            ice_servers: None,
            data_channel: None,
        }
    }
}

/// Session lifecycle state
///
/// Progression is strictly forward; any engine-reported error freezes the
/// session at its current state. Disposed is terminal and reachable from
/// every state via stop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SessionState {
    Idle,
    Created,
    OfferGenerated,
    AnswerApplied,
    Active,
    Disposed,
}

/// Snapshot of a session for status queries
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionStatus {
    pub session_id: String,
    pub mode: SessionMode,
    pub state: SessionState,
    pub local_candidates: usize,
    pub has_offer: bool,
    pub created_at: DateTime<Utc>,
}
