//! Local media acquisition
//!
//! The capture provider is an external collaborator: the bootstrapper only
//! needs `request_stream`. The synthetic source mirrors the deterministic
//! offline test data approach used for camera capture, so session flows can
//! be exercised without hardware or browser media permissions.

use crate::errors::SessionError;
use crate::types::MediaConstraints;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Handle to an acquired or received media stream
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaStream {
    pub id: String,
    pub has_audio: bool,
    pub has_video: bool,
}

impl MediaStream {
    pub fn new(id: String, has_audio: bool, has_video: bool) -> Self {
        Self {
            id,
            has_audio,
            has_video,
        }
    }
}

/// Capture provider: maps user constraints to a local stream
#[async_trait]
pub trait MediaSource: Send + Sync {
    async fn request_stream(
        &self,
        constraints: &MediaConstraints,
    ) -> Result<MediaStream, SessionError>;
}

/// Deterministic offline media source
///
/// Produces stream handles matching the requested constraints without
/// touching any capture hardware.
pub struct SyntheticMediaSource {
    fail: bool,
}

impl SyntheticMediaSource {
    pub fn new() -> Self {
        Self { fail: false }
    }

    /// Source that rejects every request, for exercising acquisition errors
    pub fn failing() -> Self {
        Self { fail: true }
    }
}

impl Default for SyntheticMediaSource {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MediaSource for SyntheticMediaSource {
    async fn request_stream(
        &self,
        constraints: &MediaConstraints,
    ) -> Result<MediaStream, SessionError> {
        if self.fail {
            return Err(SessionError::MediaAcquisitionError(
                "synthetic source configured to fail".to_string(),
            ));
        }
        if !constraints.audio && constraints.video.is_none() {
            return Err(SessionError::MediaAcquisitionError(
                "constraints request neither audio nor video".to_string(),
            ));
        }

        let stream = MediaStream::new(
            format!("synthetic-{}", Uuid::new_v4()),
            constraints.audio,
            constraints.video.is_some(),
        );
        log::debug!(
            "Synthetic stream {} acquired (audio={}, video={})",
            stream.id,
            stream.has_audio,
            stream.has_video
        );
        Ok(stream)
    }
}
