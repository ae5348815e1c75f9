use std::fmt;

use super::error::CameraError;

/// Camera session state machine.
///
/// State transitions:
/// ```text
/// unconfigured → opening → ready → preview_active ⇄ record_active
///       ↓           ↓                     ↓               ↓
///    failed       closed ←──── closing ←──┴───────────────┘
/// ```
/// `Closed` is terminal. `Failed` only leaves through `close`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    Unconfigured,
    Opening,
    Ready,
    PreviewActive,
    RecordActive,
    Closing,
    Closed,
    Failed(CameraError),
}

impl SessionState {
    pub fn is_closed(&self) -> bool {
        matches!(self, Self::Closed)
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed(_))
    }

    /// Streaming through a repeating request, in either mode.
    pub fn is_streaming(&self) -> bool {
        matches!(self, Self::PreviewActive | Self::RecordActive)
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Unconfigured => "Unconfigured",
            Self::Opening => "Opening",
            Self::Ready => "Ready",
            Self::PreviewActive => "PreviewActive",
            Self::RecordActive => "RecordActive",
            Self::Closing => "Closing",
            Self::Closed => "Closed",
            Self::Failed(_) => "Failed",
        }
    }

    /// Builds the `InvalidState` error for `operation` attempted in this state.
    pub fn reject(&self, operation: &'static str) -> CameraError {
        CameraError::InvalidState {
            operation,
            state: self.name().to_string(),
        }
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Failed(err) => write!(f, "Failed({})", err),
            other => f.write_str(other.name()),
        }
    }
}
