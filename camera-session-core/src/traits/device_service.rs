use crate::models::camera_models::DeviceCharacteristics;
use crate::models::error::CameraError;
use crate::session::callbacks::DeviceCallbacks;

/// Platform service that discovers, describes and opens camera devices.
///
/// Implemented by platform backends and by `camera-session-virtual`.
pub trait DeviceService: Send + Sync {
    /// IDs of the cameras currently present, in platform order.
    fn camera_ids(&self) -> Result<Vec<String>, CameraError>;

    /// Capability record for `camera_id`.
    fn characteristics(&self, camera_id: &str) -> Result<DeviceCharacteristics, CameraError>;

    /// Begin opening `camera_id`.
    ///
    /// Returns once the request is accepted. The outcome arrives later,
    /// on a thread of the platform's choosing, as exactly one of
    /// `callbacks.opened`, `callbacks.error` or `callbacks.disconnected`.
    fn open_device(&self, camera_id: &str, callbacks: DeviceCallbacks) -> Result<(), CameraError>;
}
