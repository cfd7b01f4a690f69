//! Remote audio activity monitoring
//!
//! Collects volume readings (dB) from the first remote stream of the active
//! session and answers a coarse "was audio detected" question. The counting
//! rule has a known asymmetry that downstream checks depend on: negative
//! readings clear the running count only while it is still below the silence
//! threshold.

use crate::media::MediaStream;
use serde::{Deserialize, Serialize};
use std::sync::Mutex;

pub const DEFAULT_SILENCE_THRESHOLD: usize = 20;

/// Monitor status snapshot
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitorStatus {
    pub attached_stream: Option<String>,
    pub samples: usize,
}

struct MonitorState {
    attached_stream: Option<String>,
    samples: Vec<f64>,
}

/// Volume-sample collector over a remote media stream
pub struct AudioActivityMonitor {
    threshold: usize,
    state: Mutex<MonitorState>,
}

impl AudioActivityMonitor {
    pub fn new(threshold: usize) -> Self {
        Self {
            threshold,
            state: Mutex::new(MonitorState {
                attached_stream: None,
                samples: Vec::new(),
            }),
        }
    }

    /// Attach to a remote stream and reset the sample buffer
    pub fn start(&self, stream: &MediaStream) {
        log::info!("Audio detection attached to stream {}", stream.id);
        let mut state = self.state.lock().expect("lock poisoned");
        state.attached_stream = Some(stream.id.clone());
        state.samples.clear();
    }

    /// Record one volume reading. The sentinel negative-infinity reading
    /// (silence in dB space) is normalized to zero before buffering.
    pub fn record_volume(&self, volume: f64) {
        let mut state = self.state.lock().expect("lock poisoned");
        if state.attached_stream.is_none() {
            log::debug!("Volume reading ignored; detection not started");
            return;
        }
        let volume = if volume == f64::NEG_INFINITY { 0.0 } else { volume };
        state.samples.push(volume);
    }

    /// Scan the buffer for sustained silence.
    ///
    /// The count climbs on non-negative samples and is zeroed by a negative
    /// sample only while still below the threshold. Returns true while the
    /// final count stays below it.
    pub fn check_activity(&self) -> bool {
        let state = self.state.lock().expect("lock poisoned");
        let mut count = 0usize;
        for sample in &state.samples {
            if *sample < 0.0 {
                if count < self.threshold {
                    count = 0;
                }
            } else {
                count += 1;
            }
        }
        count < self.threshold
    }

    /// Clear the sample buffer without detaching
    pub fn reset(&self) {
        self.state.lock().expect("lock poisoned").samples.clear();
    }

    /// Detach from the stream; no-op when not attached
    pub fn stop(&self) {
        let mut state = self.state.lock().expect("lock poisoned");
        if let Some(stream) = state.attached_stream.take() {
            log::info!("Audio detection detached from stream {}", stream);
        }
    }

    pub fn status(&self) -> MonitorStatus {
        let state = self.state.lock().expect("lock poisoned");
        MonitorStatus {
            attached_stream: state.attached_stream.clone(),
            samples: state.samples.len(),
        }
    }
}

impl Default for AudioActivityMonitor {
    fn default() -> Self {
        Self::new(DEFAULT_SILENCE_THRESHOLD)
    }
}
