use crate::commands::{BOOTSTRAPPER, MONITOR};
use crate::monitor::MonitorStatus;
use tauri::command;

/// Attach audio detection to the first remote stream of the active session
#[command]
pub async fn start_audio_detection() -> Result<String, String> {
    let streams = BOOTSTRAPPER.remote_streams().await;
    let stream = streams
        .first()
        .ok_or_else(|| "no remote stream available".to_string())?;

    MONITOR.start(stream);
    Ok(format!("audio detection started on stream {}", stream.id))
}

/// Record one volume reading from the host's level meter
#[command]
pub async fn report_audio_volume(volume: f64) -> Result<(), String> {
    MONITOR.record_volume(volume);
    Ok(())
}

/// Whether the sample buffer still indicates audio activity
#[command]
pub async fn check_audio_detection() -> Result<bool, String> {
    Ok(MONITOR.check_activity())
}

/// Clear the sample buffer
#[command]
pub async fn reset_audio_detection() -> Result<String, String> {
    MONITOR.reset();
    Ok("audio detection reset".to_string())
}

/// Detach audio detection; no-op when not attached
#[command]
pub async fn stop_audio_detection() -> Result<String, String> {
    MONITOR.stop();
    Ok("audio detection stopped".to_string())
}

/// Monitor status snapshot
#[command]
pub async fn get_audio_detection_status() -> Result<MonitorStatus, String> {
    Ok(MONITOR.status())
}
