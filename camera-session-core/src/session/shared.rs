use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;

use crate::models::camera_models::Resolution;
use crate::models::error::CameraError;
use crate::models::state::SessionState;
use crate::negotiation::orientation::OrientationState;
use crate::traits::camera_listener::CameraListener;

/// Caller-visible view of the manager, updated by configuration and by the
/// session worker. Reads are eventually consistent with the worker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    pub state: SessionState,
    pub camera_id: Option<String>,
    pub preview_size: Option<Resolution>,
    pub orientation: Option<OrientationState>,
    pub flash_supported: bool,
    pub recording: bool,
}

impl Default for Snapshot {
    fn default() -> Self {
        Self {
            state: SessionState::Unconfigured,
            camera_id: None,
            preview_size: None,
            orientation: None,
            flash_supported: false,
            recording: false,
        }
    }
}

/// State shared between caller threads, platform callbacks and the worker.
pub(crate) struct Shared {
    snapshot: Mutex<Snapshot>,
    listener: Mutex<Option<Arc<dyn CameraListener>>>,
    cancelled: AtomicBool,
}

impl Shared {
    pub(crate) fn new() -> Self {
        Self {
            snapshot: Mutex::new(Snapshot::default()),
            listener: Mutex::new(None),
            cancelled: AtomicBool::new(false),
        }
    }

    pub(crate) fn snapshot(&self) -> Snapshot {
        self.snapshot.lock().clone()
    }

    pub(crate) fn state(&self) -> SessionState {
        self.snapshot.lock().state.clone()
    }

    pub(crate) fn update(&self, f: impl FnOnce(&mut Snapshot)) {
        f(&mut self.snapshot.lock());
    }

    /// Moves to `new_state` and notifies the listener.
    ///
    /// `Closed` never changes again and `Closing` only moves to `Closed`.
    pub(crate) fn set_state(&self, new_state: SessionState) {
        {
            let mut s = self.snapshot.lock();
            if s.state == new_state {
                return;
            }
            let blocked = match s.state {
                SessionState::Closed => true,
                SessionState::Closing => new_state != SessionState::Closed,
                _ => false,
            };
            if blocked {
                log::debug!("ignoring transition {} -> {}", s.state, new_state);
                return;
            }
            log::debug!("session state {} -> {}", s.state, new_state);
            s.state = new_state.clone();
        }
        if let Some(listener) = self.listener() {
            listener.on_state_changed(&new_state);
        }
    }

    /// Moves from `expected` to `new_state` only if `expected` is current.
    /// Hands back the current state otherwise.
    pub(crate) fn transition(
        &self,
        expected: &SessionState,
        new_state: SessionState,
    ) -> Result<(), SessionState> {
        {
            let mut s = self.snapshot.lock();
            if s.state != *expected {
                return Err(s.state.clone());
            }
            log::debug!("session state {} -> {}", s.state, new_state);
            s.state = new_state.clone();
        }
        if let Some(listener) = self.listener() {
            listener.on_state_changed(&new_state);
        }
        Ok(())
    }

    /// Moves to `Failed(error)` and reports the error to the listener.
    pub(crate) fn fail(&self, error: CameraError) {
        self.set_state(SessionState::Failed(error.clone()));
        self.notify_failure(&error);
    }

    pub(crate) fn notify_failure(&self, error: &CameraError) {
        if let Some(listener) = self.listener() {
            listener.on_failure(error);
        }
    }

    pub(crate) fn set_listener(&self, listener: Arc<dyn CameraListener>) {
        *self.listener.lock() = Some(listener);
    }

    pub(crate) fn listener(&self) -> Option<Arc<dyn CameraListener>> {
        self.listener.lock().clone()
    }

    pub(crate) fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub(crate) fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}
