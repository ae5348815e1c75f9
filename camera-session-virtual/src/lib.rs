//! # camera-session-virtual
//!
//! Scripted in-process backend for camera-session-kit.
//!
//! Provides:
//! - `VirtualDeviceService`: device service with scripted cameras and failures
//! - `VirtualCamera` / `VirtualSession`: device and session that log every call
//! - `VirtualHost`: display host whose rotation can change and which can be invalidated
//! - `presets`: characteristics of typical phone cameras
//!
//! Open and configure answers arrive on a `virtual-camera-callbacks` thread,
//! so the session core sees the same threading as on a real camera stack.
//!
//! ## Usage
//! ```ignore
//! use std::sync::Arc;
//! use camera_session_core::{CameraConfiguration, CameraManager, Surface, SurfaceKind};
//! use camera_session_virtual::{VirtualDeviceService, VirtualHost};
//!
//! let service = Arc::new(VirtualDeviceService::phone()?);
//! let host = Arc::new(VirtualHost::portrait_phone());
//! let manager = CameraManager::new(service, &host, CameraConfiguration::default());
//! manager.configure()?;
//! let view = Surface::new(SurfaceKind::Preview, "view");
//! manager.open(&view)?;
//! ```

mod dispatcher;

pub mod device;
pub mod host;
pub mod journal;
pub mod presets;
pub mod script;
pub mod service;

pub use device::{VirtualCamera, VirtualSession};
pub use host::VirtualHost;
pub use journal::{Journal, PlatformCall};
pub use script::OpenBehavior;
pub use service::VirtualDeviceService;
