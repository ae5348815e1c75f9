//! Adapters the platform invokes. They never touch session state directly;
//! everything is forwarded to the session worker as a [`Command`].

use std::fmt;
use std::sync::{Arc, Weak};

use crossbeam_channel::Sender;

use crate::models::error::CameraError;
use crate::models::state::SessionState;
use crate::models::surface::Surface;
use crate::traits::camera_device::CameraDevice;
use crate::traits::capture_session::CaptureSession;

use super::worker::WorkerLauncher;

/// Message processed by the session worker.
pub(crate) enum Command {
    DeviceOpened(Box<dyn CameraDevice>),
    DeviceDisconnected,
    DeviceError(i32),
    SessionConfigured {
        generation: u64,
        session: Box<dyn CaptureSession>,
    },
    SessionConfigureFailed {
        generation: u64,
        reason: String,
    },
    StartRecord(Weak<Surface>),
    StopRecord,
    TakePhoto,
    Shutdown,
}

impl Command {
    pub(crate) fn name(&self) -> &'static str {
        match self {
            Self::DeviceOpened(_) => "DeviceOpened",
            Self::DeviceDisconnected => "DeviceDisconnected",
            Self::DeviceError(_) => "DeviceError",
            Self::SessionConfigured { .. } => "SessionConfigured",
            Self::SessionConfigureFailed { .. } => "SessionConfigureFailed",
            Self::StartRecord(_) => "StartRecord",
            Self::StopRecord => "StopRecord",
            Self::TakePhoto => "TakePhoto",
            Self::Shutdown => "Shutdown",
        }
    }

    /// Closes any platform object carried by an undelivered command.
    pub(crate) fn release(self) {
        match self {
            Self::DeviceOpened(mut device) => {
                log::info!("closing camera {} opened after shutdown", device.id());
                device.close();
            }
            Self::SessionConfigured { mut session, .. } => session.close(),
            _ => {}
        }
    }
}

impl fmt::Debug for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Device state callbacks handed to [`DeviceService::open_device`](crate::traits::device_service::DeviceService::open_device).
///
/// Safe to call from any thread. The first successful `opened` spawns the
/// session worker.
#[derive(Clone)]
pub struct DeviceCallbacks {
    launcher: Arc<WorkerLauncher>,
}

impl DeviceCallbacks {
    pub(crate) fn new(launcher: Arc<WorkerLauncher>) -> Self {
        Self { launcher }
    }

    pub fn opened(&self, device: Box<dyn CameraDevice>) {
        log::info!("camera {} opened", device.id());
        if let Err(command) = self.launcher.dispatch_spawning(Command::DeviceOpened(device)) {
            command.release();
        }
    }

    pub fn disconnected(&self) {
        log::warn!("camera disconnected");
        if self
            .launcher
            .dispatch(Command::DeviceDisconnected)
            .is_err()
        {
            self.lost_before_open(CameraError::Disconnected);
        }
    }

    pub fn error(&self, code: i32) {
        log::error!("camera error {}", code);
        if self.launcher.dispatch(Command::DeviceError(code)).is_err() {
            self.lost_before_open(device_error(code));
        }
    }

    // No worker yet, so nothing is owned: the open attempt just ends.
    fn lost_before_open(&self, error: CameraError) {
        let shared = self.launcher.shared();
        if shared.is_cancelled() {
            return;
        }
        shared.set_state(SessionState::Closed);
        shared.notify_failure(&error);
    }
}

pub(crate) fn device_error(code: i32) -> CameraError {
    CameraError::DeviceAccess(format!("camera reported error code {}", code))
}

/// Session state callbacks handed to
/// [`CameraDevice::create_capture_session`](crate::traits::camera_device::CameraDevice::create_capture_session).
#[derive(Clone)]
pub struct SessionCallbacks {
    generation: u64,
    sender: Sender<Command>,
}

impl SessionCallbacks {
    pub(crate) fn new(generation: u64, sender: Sender<Command>) -> Self {
        Self { generation, sender }
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn configured(&self, session: Box<dyn CaptureSession>) {
        let command = Command::SessionConfigured {
            generation: self.generation,
            session,
        };
        if let Err(undelivered) = self.sender.send(command) {
            log::warn!("session worker gone, closing configured session");
            undelivered.into_inner().release();
        }
    }

    pub fn configure_failed(&self, reason: impl Into<String>) {
        let command = Command::SessionConfigureFailed {
            generation: self.generation,
            reason: reason.into(),
        };
        if self.sender.send(command).is_err() {
            log::warn!("session worker gone, dropping configure failure");
        }
    }
}
