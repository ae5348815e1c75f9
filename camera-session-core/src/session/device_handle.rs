use crate::models::capture_request::{CaptureRequestBuilder, RequestTemplate};
use crate::models::error::CameraError;
use crate::models::surface::SurfaceSet;
use crate::traits::camera_device::CameraDevice;

use super::callbacks::SessionCallbacks;

/// Owned wrapper around an opened [`CameraDevice`].
///
/// Closed exactly once, either explicitly or on drop.
pub struct DeviceHandle {
    device: Box<dyn CameraDevice>,
    closed: bool,
}

impl DeviceHandle {
    pub fn new(device: Box<dyn CameraDevice>) -> Self {
        Self {
            device,
            closed: false,
        }
    }

    pub fn id(&self) -> &str {
        self.device.id()
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    pub fn create_request_builder(
        &self,
        template: RequestTemplate,
    ) -> Result<CaptureRequestBuilder, CameraError> {
        self.ensure_open()?;
        Ok(CaptureRequestBuilder::new(template))
    }

    pub fn create_capture_session(
        &mut self,
        targets: &SurfaceSet,
        callbacks: SessionCallbacks,
    ) -> Result<(), CameraError> {
        self.ensure_open()?;
        if targets.is_empty() {
            return Err(CameraError::DeviceAccess(
                "capture session needs at least one target".into(),
            ));
        }
        self.device.create_capture_session(targets, callbacks)
    }

    pub fn close(&mut self) {
        if !self.closed {
            log::info!("closing camera {}", self.device.id());
            self.device.close();
            self.closed = true;
        }
    }

    fn ensure_open(&self) -> Result<(), CameraError> {
        if self.closed {
            return Err(CameraError::DeviceAccess(format!(
                "camera {} is closed",
                self.device.id()
            )));
        }
        Ok(())
    }
}

impl Drop for DeviceHandle {
    fn drop(&mut self) {
        if !self.closed {
            log::warn!("camera {} dropped while open", self.device.id());
            self.close();
        }
    }
}
