//! CrabRTC: WebRTC session bootstrap for Tauri applications
//!
//! This crate orchestrates the session-bootstrap workflow of a WebRTC test
//! harness: local media capture, peer creation in one of three directional
//! modes, offer generation, ICE trickle, remote answer application, and
//! playback start, plus rudimentary remote audio activity detection.
//!
//! The signaling engine itself (ICE, DTLS, SDP) is delegated to webrtc-rs
//! behind a capability trait, so the orchestration can also run against a
//! fake engine in tests.
//!
//! # Usage
//! Add this to your `Cargo.toml`:
//! ```toml
//! [dependencies]
//! crabrtc = "0.2"
//! tauri = { version = "2.0", features = ["protocol-asset"] }
//! ```
//!
//! Then in your Tauri app:
//! ```rust,ignore
//! fn main() {
//!     tauri::Builder::default()
//!         .plugin(crabrtc::init())
//!         .run(tauri::generate_context!())
//!         .expect("error while running tauri application");
//! }
//! ```
pub mod commands;
pub mod config;
pub mod engine;
pub mod errors;
pub mod media;
pub mod monitor;
pub mod session;
pub mod types;
pub mod ui;

// Re-exports for convenience
pub use config::CrabRtcConfig;
pub use errors::SessionError;
pub use media::{MediaSource, MediaStream, SyntheticMediaSource};
pub use monitor::AudioActivityMonitor;
pub use session::SessionBootstrapper;
pub use types::{
    IceCandidateInit, IceServerEntry, MediaConstraints, SessionMode, SessionOptions,
    SessionState, SessionStatus, VideoConstraints,
};

use tauri::{
    plugin::{Builder, TauriPlugin},
    Runtime,
};

/// Initialize the CrabRTC plugin with all commands
pub fn init<R: Runtime>() -> TauriPlugin<R> {
    Builder::new("crabrtc")
        .invoke_handler(tauri::generate_handler![
            // Session commands
            commands::session::start_session,
            commands::session::stop_session,
            commands::session::get_session_status,
            commands::session::get_sdp_offer,
            commands::session::get_local_ice_candidates,
            commands::session::add_remote_ice_candidate,
            commands::session::submit_remote_answer,
            commands::session::set_ice_servers,
            commands::session::set_audio_constraints,
            commands::session::set_video_constraints,
            commands::session::reset_media_constraints,
            commands::session::enable_data_channel,
            commands::session::send_data_channel_message,
            // Audio detection commands
            commands::monitor::start_audio_detection,
            commands::monitor::report_audio_volume,
            commands::monitor::check_audio_detection,
            commands::monitor::reset_audio_detection,
            commands::monitor::stop_audio_detection,
            commands::monitor::get_audio_detection_status,
        ])
        .build()
}

/// Initialize logging for the session system
pub fn init_logging() {
    if std::env::var("RUST_LOG").is_err() {
        std::env::set_var("RUST_LOG", "crabrtc=info");
    }
    let _ = env_logger::try_init();
}

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");
pub const DESCRIPTION: &str = env!("CARGO_PKG_DESCRIPTION");

/// Get crate information
pub fn get_info() -> CrateInfo {
    CrateInfo {
        name: NAME.to_string(),
        version: VERSION.to_string(),
        description: DESCRIPTION.to_string(),
    }
}

/// Crate information structure
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct CrateInfo {
    pub name: String,
    pub version: String,
    pub description: String,
}
