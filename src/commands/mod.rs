//! Tauri command surface
//!
//! One command per harness control: session start/stop buttons, ICE server
//! entry, constraint presets, answer/candidate input fields, and the audio
//! detection toggles.

pub mod monitor;
pub mod session;

use crate::engine::WebRtcEngineFactory;
use crate::media::SyntheticMediaSource;
use crate::monitor::AudioActivityMonitor;
use crate::session::SessionBootstrapper;
use crate::types::{IceServerEntry, MediaConstraints};
use crate::ui::LogStatusSink;
use std::sync::Arc;
use tokio::sync::RwLock;

// Plugin-global harness state. Session state itself lives inside the
// bootstrapper; these hold the knobs the UI can set before a session starts.
lazy_static::lazy_static! {
    pub(crate) static ref BOOTSTRAPPER: SessionBootstrapper = SessionBootstrapper::new(
        Arc::new(WebRtcEngineFactory),
        Arc::new(SyntheticMediaSource::new()),
        Arc::new(LogStatusSink),
    );
    pub(crate) static ref ICE_SERVERS: RwLock<Option<Vec<IceServerEntry>>> = RwLock::new(None);
    pub(crate) static ref CONSTRAINTS: RwLock<MediaConstraints> =
        RwLock::new(MediaConstraints::default());
    pub(crate) static ref DATA_CHANNEL: RwLock<Option<String>> = RwLock::new(None);
    pub(crate) static ref MONITOR: AudioActivityMonitor = AudioActivityMonitor::default();
}

pub use monitor::*;
pub use session::*;
