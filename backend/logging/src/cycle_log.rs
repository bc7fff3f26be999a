//! Recognition-cycle events, written through `tracing` as structured records.

use serde::Serialize;
use tracing::{info, warn};

use crate::redact::redact_sensitive_data;

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CycleEvent {
    CaptureStarted {
        device: String,
    },
    CameraUnavailable {
        detail: String,
    },
    CaptureCancelled,
    PayloadAcquired {
        source: String,
        mime_type: String,
        bytes: usize,
    },
    RecognitionSucceeded {
        chars: usize,
        no_text: bool,
    },
    RecognitionFailed {
        detail: String,
    },
    StaleOutcomeDiscarded,
    Reset {
        from: String,
    },
}

impl CycleEvent {
    fn is_failure(&self) -> bool {
        matches!(
            self,
            CycleEvent::CameraUnavailable { .. } | CycleEvent::RecognitionFailed { .. }
        )
    }

    fn redacted(mut self) -> Self {
        match &mut self {
            CycleEvent::CameraUnavailable { detail } | CycleEvent::RecognitionFailed { detail } => {
                *detail = redact_sensitive_data(detail);
            }
            _ => {}
        }
        self
    }
}

/// Log one cycle event. Free-text details are redacted first.
pub fn log_cycle_event(cycle: &str, event: CycleEvent) {
    let event = event.redacted();
    let failure = event.is_failure();
    let json = serde_json::to_string(&event).unwrap_or_else(|_| "{}".into());
    if failure {
        warn!(target: "lenstext::cycle", cycle = %cycle, event = %json, "cycle event");
    } else {
        info!(target: "lenstext::cycle", cycle = %cycle, event = %json, "cycle event");
    }
}
