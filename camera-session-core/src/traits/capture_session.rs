use crate::models::capture_request::CaptureRequest;
use crate::models::error::CameraError;

/// A configured capture session on an open device.
pub trait CaptureSession: Send {
    /// Replace the repeating request that drives streaming.
    fn set_repeating_request(&mut self, request: &CaptureRequest) -> Result<(), CameraError>;

    /// Submit a single request once.
    fn capture(&mut self, request: &CaptureRequest) -> Result<(), CameraError>;

    /// Stop streaming and release the session.
    fn close(&mut self);
}
