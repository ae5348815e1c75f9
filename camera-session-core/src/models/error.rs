use thiserror::Error;

/// Errors raised by the camera session core.
///
/// Variants fall into four groups, see [`ErrorKind`]. Configuration errors
/// are fatal to a manager instance; device access errors are reported
/// through [`CameraListener::on_failure`](crate::traits::camera_listener::CameraListener::on_failure)
/// rather than unwinding out of the worker.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CameraError {
    #[error("device reported no candidate output sizes")]
    NoCandidate,

    #[error("device characteristics unavailable: {0}")]
    CharacteristicsUnavailable(String),

    #[error("hosting context is no longer valid")]
    HostInvalidated,

    #[error("no camera device available")]
    NoDevice,

    #[error("configuration failed: {0}")]
    ConfigurationFailed(String),

    #[error("camera manager is not ready")]
    NotReady,

    #[error("device access failed: {0}")]
    DeviceAccess(String),

    #[error("device disconnected")]
    Disconnected,

    #[error("{operation} is not valid in state {state}")]
    InvalidState {
        operation: &'static str,
        state: String,
    },

    #[error("worker teardown interrupted: {0}")]
    InterruptedTeardown(String),
}

/// Coarse classification of a [`CameraError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Configuration,
    DeviceAccess,
    InvalidState,
    InterruptedTeardown,
}

impl CameraError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NoCandidate
            | Self::CharacteristicsUnavailable(_)
            | Self::HostInvalidated
            | Self::NoDevice
            | Self::ConfigurationFailed(_)
            | Self::NotReady => ErrorKind::Configuration,
            Self::DeviceAccess(_) | Self::Disconnected => ErrorKind::DeviceAccess,
            Self::InvalidState { .. } => ErrorKind::InvalidState,
            Self::InterruptedTeardown(_) => ErrorKind::InterruptedTeardown,
        }
    }

    /// Configuration errors leave the manager permanently not-ready.
    pub fn is_fatal(&self) -> bool {
        self.kind() == ErrorKind::Configuration
    }
}
