//! UI collaborator surface
//!
//! Spinner graphics, status fields, and media element playback live in the
//! host application. The bootstrapper only pushes side effects through this
//! sink; it never reads UI state back.

use crate::types::SessionMode;

/// Which media element playback should start on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackTarget {
    Local,
    Remote,
}

/// Sink for UI side effects
pub trait StatusSink: Send + Sync {
    /// Show busy spinners on the sinks the mode requires
    fn show_spinner(&self, local: bool, remote: bool);

    /// Hide spinners on both sinks
    fn hide_spinner(&self);

    /// Start playback on a media element
    fn start_playback(&self, target: PlaybackTarget);

    /// Update the status field
    fn set_status(&self, status: &str);

    /// Reset status field to empty
    fn clear_status(&self);
}

/// Default sink that forwards UI side effects to the log
pub struct LogStatusSink;

impl StatusSink for LogStatusSink {
    fn show_spinner(&self, local: bool, remote: bool) {
        log::debug!("Spinner shown (local={}, remote={})", local, remote);
    }

    fn hide_spinner(&self) {
        log::debug!("Spinner hidden");
    }

    fn start_playback(&self, target: PlaybackTarget) {
        log::info!("Playback started on {:?} element", target);
    }

    fn set_status(&self, status: &str) {
        log::info!("Status: {}", status);
    }

    fn clear_status(&self) {
        log::debug!("Status cleared");
    }
}

/// Spinner targets derived from the directional mode
pub fn spinner_targets(mode: SessionMode) -> (bool, bool) {
    (mode.needs_local_sink(), mode.needs_remote_sink())
}
