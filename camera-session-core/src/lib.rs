//! # camera-session-core
//!
//! Platform-agnostic camera session core.
//!
//! Provides output size negotiation, sensor/display orientation handling,
//! and the preview/record session state machine. Platform backends
//! implement the `DeviceService`, `CameraDevice` and `CaptureSession`
//! traits and plug into the generic `CameraManager`.
//!
//! ## Architecture
//!
//! ```text
//! camera-session-core (this crate)
//! ├── traits/       ← DeviceService, CameraDevice, CaptureSession, HostContext, CameraListener, Clock
//! ├── models/       ← CameraError, SessionState, CameraConfiguration, Resolution, CaptureRequest, Surface
//! ├── negotiation/  ← size fitting, orientation swap and capture rotation
//! └── session/      ← CameraManager, session worker, DeviceHandle, SurfaceRegistry
//! ```

pub mod models;
pub mod negotiation;
pub mod session;
pub mod traits;

// Re-export key types at crate root for convenience.
pub use models::camera_models::{DeviceCharacteristics, LensFacing, Resolution, Rotation, SurfaceKind};
pub use models::capture_request::{AfMode, AfTrigger, CaptureRequest, CaptureRequestBuilder, RequestTemplate};
pub use models::config::CameraConfiguration;
pub use models::error::{CameraError, ErrorKind};
pub use models::recording_result::RecordingResult;
pub use models::state::SessionState;
pub use models::surface::{Surface, SurfaceId, SurfaceSet};
pub use negotiation::orientation::{capture_rotation_degrees, swapped, OrientationState};
pub use negotiation::size_fitter::{choose_optimal_size, largest_by_area, SizeRequest};
pub use session::callbacks::{DeviceCallbacks, SessionCallbacks};
pub use session::device_handle::DeviceHandle;
pub use session::manager::CameraManager;
pub use session::shared::Snapshot;
pub use session::surface_registry::SurfaceRegistry;
pub use traits::camera_device::CameraDevice;
pub use traits::camera_listener::CameraListener;
pub use traits::capture_session::CaptureSession;
pub use traits::clock::{Clock, MonotonicClock};
pub use traits::device_service::DeviceService;
pub use traits::host_context::HostContext;
