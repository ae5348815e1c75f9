use serde::{Deserialize, Serialize};

use super::camera_models::{LensFacing, Resolution};
use super::capture_request::AfMode;
use super::error::CameraError;

/// Configuration for a camera manager.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfiguration {
    /// Specific camera ID, or None to select by `preferred_facing`.
    pub camera_id: Option<String>,

    /// Lens facing used when `camera_id` is None (default: back).
    pub preferred_facing: LensFacing,

    /// Preview size the caller would like, in display orientation.
    pub requested_preview_size: Resolution,

    /// Upper bound applied on top of the display bounds (default: 1920x1080).
    pub max_preview_size: Resolution,

    /// Autofocus mode for preview and record requests.
    pub autofocus: AfMode,
}

impl CameraConfiguration {
    pub fn validate(&self) -> Result<(), String> {
        if self.requested_preview_size.is_empty() {
            return Err(format!(
                "requested preview size must be positive: {}",
                self.requested_preview_size
            ));
        }
        if self.max_preview_size.is_empty() {
            return Err(format!(
                "max preview size must be positive: {}",
                self.max_preview_size
            ));
        }
        if matches!(&self.camera_id, Some(id) if id.is_empty()) {
            return Err("camera id must not be empty".into());
        }
        Ok(())
    }

    /// Parse and validate a JSON configuration. Missing fields take defaults.
    pub fn from_json(json: &str) -> Result<Self, CameraError> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| CameraError::ConfigurationFailed(format!("invalid configuration: {}", e)))?;
        config.validate().map_err(CameraError::ConfigurationFailed)?;
        Ok(config)
    }
}

impl Default for CameraConfiguration {
    fn default() -> Self {
        Self {
            camera_id: None,
            preferred_facing: LensFacing::Back,
            requested_preview_size: Resolution::new(1280, 720),
            max_preview_size: Resolution::new(1920, 1080),
            autofocus: AfMode::ContinuousPicture,
        }
    }
}
