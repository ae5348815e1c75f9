//! Display host for headless runs.

use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::Mutex;

use camera_session_core::models::camera_models::{Resolution, Rotation};
use camera_session_core::traits::host_context::HostContext;

/// A display whose rotation can change and which can be torn down.
pub struct VirtualHost {
    rotation: Mutex<Rotation>,
    bounds: Resolution,
    valid: AtomicBool,
}

impl VirtualHost {
    pub fn new(rotation: Rotation, bounds: Resolution) -> Self {
        Self {
            rotation: Mutex::new(rotation),
            bounds,
            valid: AtomicBool::new(true),
        }
    }

    /// 1080x1920 display held upright.
    pub fn portrait_phone() -> Self {
        Self::new(Rotation::Deg0, Resolution::new(1080, 1920))
    }

    pub fn set_rotation(&self, rotation: Rotation) {
        *self.rotation.lock() = rotation;
    }

    /// Simulate the hosting window going away.
    pub fn invalidate(&self) {
        log::info!("virtual host invalidated");
        self.valid.store(false, Ordering::SeqCst);
    }
}

impl HostContext for VirtualHost {
    fn display_rotation(&self) -> Rotation {
        *self.rotation.lock()
    }

    fn display_bounds(&self) -> Resolution {
        self.bounds
    }

    fn is_valid(&self) -> bool {
        self.valid.load(Ordering::SeqCst)
    }
}
