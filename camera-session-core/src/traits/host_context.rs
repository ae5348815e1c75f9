use crate::models::camera_models::{Resolution, Rotation};

/// The window or activity hosting the camera preview.
///
/// Held weakly by the manager. Once dropped or invalid, entry points
/// refuse to run.
pub trait HostContext: Send + Sync {
    fn display_rotation(&self) -> Rotation;

    /// Display size in the display's current orientation.
    fn display_bounds(&self) -> Resolution;

    /// False once the host is finishing or destroyed.
    fn is_valid(&self) -> bool;
}
