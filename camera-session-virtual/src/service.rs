//! Scripted device service.

use std::sync::Arc;

use parking_lot::Mutex;

use camera_session_core::models::camera_models::DeviceCharacteristics;
use camera_session_core::models::error::CameraError;
use camera_session_core::session::callbacks::DeviceCallbacks;
use camera_session_core::traits::device_service::DeviceService;

use crate::device::VirtualCamera;
use crate::dispatcher::CallbackThread;
use crate::journal::{Journal, PlatformCall};
use crate::presets;
use crate::script::{OpenBehavior, Script};

struct CameraEntry {
    id: String,
    // None: the camera is listed but cannot describe itself.
    characteristics: Option<DeviceCharacteristics>,
}

/// In-process [`DeviceService`] with scripted cameras.
///
/// Open and configure answers are delivered on a dedicated callback thread,
/// never on the thread that made the request.
pub struct VirtualDeviceService {
    cameras: Vec<CameraEntry>,
    script: Arc<Mutex<Script>>,
    journal: Journal,
    last_open: Mutex<Option<DeviceCallbacks>>,
    callbacks: CallbackThread,
}

impl VirtualDeviceService {
    pub fn new() -> Result<Self, CameraError> {
        Ok(Self {
            cameras: Vec::new(),
            script: Arc::new(Mutex::new(Script::default())),
            journal: Journal::default(),
            last_open: Mutex::new(None),
            callbacks: CallbackThread::spawn("virtual-camera-callbacks")?,
        })
    }

    /// Back camera "0" and front camera "1".
    pub fn phone() -> Result<Self, CameraError> {
        Ok(Self::new()?
            .with_camera("0", presets::back_camera())
            .with_camera("1", presets::front_camera()))
    }

    pub fn with_camera(mut self, id: &str, characteristics: DeviceCharacteristics) -> Self {
        self.cameras.push(CameraEntry {
            id: id.to_string(),
            characteristics: Some(characteristics),
        });
        self
    }

    /// A camera that is listed but whose characteristics cannot be read.
    pub fn with_unreadable_camera(mut self, id: &str) -> Self {
        self.cameras.push(CameraEntry {
            id: id.to_string(),
            characteristics: None,
        });
        self
    }

    pub fn set_open_behavior(&self, behavior: OpenBehavior) {
        self.script.lock().open = behavior;
    }

    /// Make every following session configure fail, or succeed again with `None`.
    pub fn set_session_failure(&self, reason: Option<&str>) {
        self.script.lock().session_failure = reason.map(str::to_string);
    }

    pub fn set_repeating_failure(&self, fail: bool) {
        self.script.lock().fail_repeating = fail;
    }

    /// Report that the most recently opened camera was disconnected.
    pub fn disconnect(&self) {
        if let Some(callbacks) = self.last_open.lock().clone() {
            self.callbacks.poster().post(move || callbacks.disconnected());
        }
    }

    /// Report a fatal error on the most recently opened camera.
    pub fn raise_error(&self, code: i32) {
        if let Some(callbacks) = self.last_open.lock().clone() {
            self.callbacks.poster().post(move || callbacks.error(code));
        }
    }

    pub fn journal(&self) -> &Journal {
        &self.journal
    }

    pub fn calls(&self) -> Vec<PlatformCall> {
        self.journal.calls()
    }

    fn entry(&self, camera_id: &str) -> Result<&CameraEntry, CameraError> {
        self.cameras
            .iter()
            .find(|c| c.id == camera_id)
            .ok_or_else(|| {
                CameraError::CharacteristicsUnavailable(format!("unknown camera {}", camera_id))
            })
    }
}

impl DeviceService for VirtualDeviceService {
    fn camera_ids(&self) -> Result<Vec<String>, CameraError> {
        Ok(self.cameras.iter().map(|c| c.id.clone()).collect())
    }

    fn characteristics(&self, camera_id: &str) -> Result<DeviceCharacteristics, CameraError> {
        self.entry(camera_id)?.characteristics.clone().ok_or_else(|| {
            CameraError::CharacteristicsUnavailable(format!(
                "camera {} did not report characteristics",
                camera_id
            ))
        })
    }

    fn open_device(&self, camera_id: &str, callbacks: DeviceCallbacks) -> Result<(), CameraError> {
        self.entry(camera_id)
            .map_err(|_| CameraError::DeviceAccess(format!("no camera with id {}", camera_id)))?;
        self.journal
            .record(PlatformCall::OpenRequested(camera_id.to_string()));

        let behavior = self.script.lock().open.clone();
        log::debug!("virtual open of camera {}: {:?}", camera_id, behavior);
        let poster = self.callbacks.poster();
        match behavior {
            OpenBehavior::Reject => {
                return Err(CameraError::DeviceAccess(format!(
                    "camera {} is in use",
                    camera_id
                )))
            }
            OpenBehavior::Hang => {}
            OpenBehavior::Error(code) => {
                let callbacks = callbacks.clone();
                poster.post(move || callbacks.error(code));
            }
            OpenBehavior::Disconnect => {
                let callbacks = callbacks.clone();
                poster.post(move || callbacks.disconnected());
            }
            OpenBehavior::Succeed => {
                let camera = VirtualCamera::new(
                    camera_id.to_string(),
                    Arc::clone(&self.script),
                    self.journal.clone(),
                    poster.clone(),
                );
                let callbacks = callbacks.clone();
                poster.post(move || callbacks.opened(Box::new(camera)));
            }
        }
        *self.last_open.lock() = Some(callbacks);
        Ok(())
    }
}
