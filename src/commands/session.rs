use crate::commands::{BOOTSTRAPPER, CONSTRAINTS, DATA_CHANNEL, ICE_SERVERS};
use crate::types::{
    IceServerEntry, MediaConstraints, SessionMode, SessionOptions, SessionStatus,
};
use tauri::command;

/// Start a WebRTC session in the given directional mode
#[command]
pub async fn start_session(mode: SessionMode) -> Result<SessionStatus, String> {
    log::info!("Starting WebRTC session in {} mode...", mode.as_str());

    let mut options = SessionOptions::new(mode, CONSTRAINTS.read().await.clone());
    options.ice_servers = ICE_SERVERS.read().await.clone();
    options.data_channel = DATA_CHANNEL.read().await.clone();
    log::debug!("Options: {}", serde_json::to_string(&options).unwrap_or_default());

    BOOTSTRAPPER
        .start_session(options)
        .await
        .map_err(|e| e.to_string())
}

/// Stop the active session; always succeeds and resets UI state
#[command]
pub async fn stop_session() -> Result<String, String> {
    BOOTSTRAPPER.stop_session().await;
    Ok("session stopped".to_string())
}

/// Status snapshot of the active session, if any
#[command]
pub async fn get_session_status() -> Result<Option<SessionStatus>, String> {
    Ok(BOOTSTRAPPER.status().await)
}

/// The generated local SDP offer, once negotiation reaches that point
#[command]
pub async fn get_sdp_offer() -> Result<Option<String>, String> {
    Ok(BOOTSTRAPPER.sdp_offer().await)
}

/// Serialized local ICE candidates in discovery order
#[command]
pub async fn get_local_ice_candidates() -> Result<Vec<String>, String> {
    Ok(BOOTSTRAPPER.local_candidates().await)
}

/// Apply a remote ICE candidate (JSON transport format).
///
/// Engine rejections are reported to the log only; the session stays in its
/// last good state.
#[command]
pub async fn add_remote_ice_candidate(candidate: String) -> Result<String, String> {
    match BOOTSTRAPPER.add_remote_ice_candidate(&candidate).await {
        Ok(()) => Ok("candidate added".to_string()),
        Err(e) => {
            log::error!("Error adding candidate: {}", e);
            Ok(format!("candidate rejected: {}", e))
        }
    }
}

/// Apply the base64-encoded remote SDP answer.
///
/// Decode or negotiation failures are reported to the log only.
#[command]
pub async fn submit_remote_answer(answer: String) -> Result<String, String> {
    match BOOTSTRAPPER.submit_remote_answer(&answer).await {
        Ok(()) => Ok("answer applied".to_string()),
        Err(e) => {
            log::error!("{}", e);
            Ok(format!("answer rejected: {}", e))
        }
    }
}

/// Configure the ICE server list for subsequent sessions.
///
/// The literal string "null" in username or credential means "no auth".
#[command]
pub async fn set_ice_servers(
    url: String,
    username: String,
    credential: String,
) -> Result<String, String> {
    let entry = IceServerEntry::from_parameters(url, username, credential);
    log::info!("ICE servers set: {:?}", entry.urls);
    *ICE_SERVERS.write().await = Some(vec![entry]);
    Ok("ice servers updated".to_string())
}

/// Constrain capture to audio only
#[command]
pub async fn set_audio_constraints() -> Result<String, String> {
    *CONSTRAINTS.write().await = MediaConstraints::audio_only();
    Ok("constraints set to audio only".to_string())
}

/// Constrain capture to video only
#[command]
pub async fn set_video_constraints() -> Result<String, String> {
    *CONSTRAINTS.write().await = MediaConstraints::video_only();
    Ok("constraints set to video only".to_string())
}

/// Restore the default audio + video constraints
#[command]
pub async fn reset_media_constraints() -> Result<String, String> {
    *CONSTRAINTS.write().await = MediaConstraints::default();
    Ok("constraints reset".to_string())
}

/// Request a data channel on the next session start
#[command]
pub async fn enable_data_channel(label: Option<String>) -> Result<String, String> {
    let label = label.unwrap_or_else(|| "dataChannel".to_string());
    log::info!("Data channel '{}' will be opened on next session", label);
    *DATA_CHANNEL.write().await = Some(label.clone());
    Ok(format!("data channel '{}' enabled", label))
}

/// Send a message over the active session's data channel.
///
/// A missing channel is a silent no-op, matching the harness behavior.
#[command]
pub async fn send_data_channel_message(message: String) -> Result<String, String> {
    let label = match DATA_CHANNEL.read().await.clone() {
        Some(label) => label,
        None => {
            log::debug!("No data channel configured; message dropped");
            return Ok("no data channel".to_string());
        }
    };

    BOOTSTRAPPER
        .send_data(&label, message.into_bytes())
        .await
        .map_err(|e| e.to_string())?;
    Ok(format!("message sent on '{}'", label))
}
