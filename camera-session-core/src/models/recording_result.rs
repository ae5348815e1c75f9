use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::camera_models::Resolution;

/// Delivered to the caller when a recording stops.
///
/// Serializable for handing to the encoder pipeline or a backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordingResult {
    pub id: Uuid,
    pub started_at: DateTime<Utc>,
    pub duration_ms: u64,
    pub size: Resolution,
    /// Rotation the encoder should tag the stream with.
    pub orientation_hint_degrees: u32,
}

impl RecordingResult {
    pub fn new(
        started_at: DateTime<Utc>,
        duration_ms: u64,
        size: Resolution,
        orientation_hint_degrees: u32,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            started_at,
            duration_ms,
            size,
            orientation_hint_degrees,
        }
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}
