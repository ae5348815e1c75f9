use crate::models::error::CameraError;
use crate::models::recording_result::RecordingResult;
use crate::models::state::SessionState;

/// Event listener for camera manager notifications.
///
/// Methods are called from the session worker thread (or, for failures
/// before the worker exists, from the platform's callback thread).
/// Implementations should marshal to their own thread if needed.
pub trait CameraListener: Send + Sync {
    /// Called when the session state changes.
    fn on_state_changed(&self, state: &SessionState);

    /// Called once, when the first preview session is ready and before its
    /// repeating request is submitted.
    fn on_preview_started(&self);

    /// Called when a recording stops.
    ///
    /// If recording is stopped before the record session finished
    /// configuring, nothing was recorded: `duration_ms` is 0 and
    /// `started_at` is the time of the stop.
    fn on_record_stopped(&self, result: &RecordingResult);

    /// Called when the device or a session fails asynchronously.
    fn on_failure(&self, error: &CameraError);
}
