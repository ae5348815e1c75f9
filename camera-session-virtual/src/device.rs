//! Virtual camera device and capture session.

use std::sync::Arc;

use parking_lot::Mutex;

use camera_session_core::models::capture_request::CaptureRequest;
use camera_session_core::models::error::CameraError;
use camera_session_core::models::surface::SurfaceSet;
use camera_session_core::session::callbacks::SessionCallbacks;
use camera_session_core::traits::camera_device::CameraDevice;
use camera_session_core::traits::capture_session::CaptureSession;

use crate::dispatcher::Poster;
use crate::journal::{Journal, PlatformCall};
use crate::script::Script;

/// An opened virtual camera. Session answers arrive on the callback thread.
pub struct VirtualCamera {
    id: String,
    script: Arc<Mutex<Script>>,
    journal: Journal,
    poster: Poster,
    closed: bool,
}

impl VirtualCamera {
    pub(crate) fn new(
        id: String,
        script: Arc<Mutex<Script>>,
        journal: Journal,
        poster: Poster,
    ) -> Self {
        Self {
            id,
            script,
            journal,
            poster,
            closed: false,
        }
    }
}

impl CameraDevice for VirtualCamera {
    fn id(&self) -> &str {
        &self.id
    }

    fn create_capture_session(
        &mut self,
        targets: &SurfaceSet,
        callbacks: SessionCallbacks,
    ) -> Result<(), CameraError> {
        if self.closed {
            return Err(CameraError::DeviceAccess(format!("camera {} is closed", self.id)));
        }
        self.journal.record(PlatformCall::SessionRequested {
            camera_id: self.id.clone(),
            targets: targets.iter().map(|s| s.name().to_string()).collect(),
        });

        let (failure, serial) = {
            let mut script = self.script.lock();
            script.next_session += 1;
            (script.session_failure.clone(), script.next_session)
        };
        log::debug!(
            "camera {} configuring session {} for generation {}",
            self.id,
            serial,
            callbacks.generation()
        );
        match failure {
            Some(reason) => self.poster.post(move || callbacks.configure_failed(reason)),
            None => {
                let session = VirtualSession {
                    serial,
                    script: Arc::clone(&self.script),
                    journal: self.journal.clone(),
                    closed: false,
                };
                self.poster
                    .post(move || callbacks.configured(Box::new(session)));
            }
        }
        Ok(())
    }

    fn close(&mut self) {
        if !self.closed {
            self.closed = true;
            self.journal.record(PlatformCall::CameraClosed(self.id.clone()));
        }
    }
}

/// A configured virtual session. Numbered in creation order per service.
pub struct VirtualSession {
    serial: u64,
    script: Arc<Mutex<Script>>,
    journal: Journal,
    closed: bool,
}

impl VirtualSession {
    fn ensure_open(&self) -> Result<(), CameraError> {
        if self.closed {
            return Err(CameraError::DeviceAccess(format!(
                "session {} is closed",
                self.serial
            )));
        }
        Ok(())
    }
}

impl CaptureSession for VirtualSession {
    fn set_repeating_request(&mut self, request: &CaptureRequest) -> Result<(), CameraError> {
        self.ensure_open()?;
        if self.script.lock().fail_repeating {
            return Err(CameraError::DeviceAccess(
                "repeating request rejected by camera".into(),
            ));
        }
        self.journal.record(PlatformCall::RepeatingRequest {
            session: self.serial,
            template: request.template,
        });
        Ok(())
    }

    fn capture(&mut self, request: &CaptureRequest) -> Result<(), CameraError> {
        self.ensure_open()?;
        self.journal.record(PlatformCall::Capture {
            session: self.serial,
            trigger: request.af_trigger,
        });
        Ok(())
    }

    fn close(&mut self) {
        if !self.closed {
            self.closed = true;
            self.journal.record(PlatformCall::SessionClosed(self.serial));
        }
    }
}
