use serde::{Deserialize, Serialize};

use super::error::CameraError;
use super::surface::SurfaceId;

/// Request template, selects the platform's tuning defaults.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RequestTemplate {
    Preview,
    Record,
    StillCapture,
}

/// Autofocus mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AfMode {
    Off,
    Auto,
    ContinuousVideo,
    #[default]
    ContinuousPicture,
}

/// One-shot autofocus trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum AfTrigger {
    #[default]
    Idle,
    Start,
    Cancel,
}

/// Immutable capture parameters submitted to a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaptureRequest {
    pub template: RequestTemplate,
    pub af_mode: AfMode,
    pub af_trigger: AfTrigger,
    pub targets: Vec<SurfaceId>,
}

/// Mutable builder for [`CaptureRequest`], obtained from a device handle.
#[derive(Debug, Clone)]
pub struct CaptureRequestBuilder {
    template: RequestTemplate,
    af_mode: AfMode,
    af_trigger: AfTrigger,
    targets: Vec<SurfaceId>,
}

impl CaptureRequestBuilder {
    pub fn new(template: RequestTemplate) -> Self {
        Self {
            template,
            af_mode: AfMode::Auto,
            af_trigger: AfTrigger::Idle,
            targets: Vec::new(),
        }
    }

    pub fn template(&self) -> RequestTemplate {
        self.template
    }

    pub fn set_af_mode(&mut self, mode: AfMode) -> &mut Self {
        self.af_mode = mode;
        self
    }

    pub fn set_af_trigger(&mut self, trigger: AfTrigger) -> &mut Self {
        self.af_trigger = trigger;
        self
    }

    /// Adds an output target. Duplicates are ignored.
    pub fn add_target(&mut self, id: SurfaceId) -> &mut Self {
        if !self.targets.contains(&id) {
            self.targets.push(id);
        }
        self
    }

    pub fn build(&self) -> Result<CaptureRequest, CameraError> {
        if self.targets.is_empty() {
            return Err(CameraError::DeviceAccess(
                "capture request has no output targets".into(),
            ));
        }
        Ok(CaptureRequest {
            template: self.template,
            af_mode: self.af_mode,
            af_trigger: self.af_trigger,
            targets: self.targets.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn build_requires_a_target() {
        let builder = CaptureRequestBuilder::new(RequestTemplate::Preview);
        assert!(builder.build().is_err());
    }

    #[test]
    fn targets_keep_insertion_order_without_duplicates() {
        let mut builder = CaptureRequestBuilder::new(RequestTemplate::Record);
        builder.add_target(7).add_target(3).add_target(7);
        builder.set_af_mode(AfMode::ContinuousPicture);

        let request = builder.build().unwrap();
        assert_eq!(request.targets, vec![7, 3]);
        assert_eq!(request.af_mode, AfMode::ContinuousPicture);
        assert_eq!(request.af_trigger, AfTrigger::Idle);
    }
}
