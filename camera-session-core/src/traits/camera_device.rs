use crate::models::error::CameraError;
use crate::models::surface::SurfaceSet;
use crate::session::callbacks::SessionCallbacks;

/// An opened camera, handed over by [`DeviceCallbacks::opened`](crate::session::callbacks::DeviceCallbacks::opened).
pub trait CameraDevice: Send {
    fn id(&self) -> &str;

    /// Begin configuring a capture session bound to `targets`.
    ///
    /// The outcome arrives later through `callbacks`. The platform may
    /// reject a second live session on the same device, so callers close
    /// the previous session first.
    fn create_capture_session(
        &mut self,
        targets: &SurfaceSet,
        callbacks: SessionCallbacks,
    ) -> Result<(), CameraError>;

    /// Release the device. Further calls are invalid.
    fn close(&mut self);
}
