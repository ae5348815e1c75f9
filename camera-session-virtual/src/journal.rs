//! Record of every call the session core made into the virtual platform.

use std::sync::Arc;

use parking_lot::Mutex;

use camera_session_core::models::capture_request::{AfTrigger, RequestTemplate};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlatformCall {
    OpenRequested(String),
    SessionRequested {
        camera_id: String,
        targets: Vec<String>,
    },
    RepeatingRequest {
        session: u64,
        template: RequestTemplate,
    },
    Capture {
        session: u64,
        trigger: AfTrigger,
    },
    SessionClosed(u64),
    CameraClosed(String),
}

/// Append-only call log shared between the service and everything it hands out.
#[derive(Debug, Clone, Default)]
pub struct Journal {
    calls: Arc<Mutex<Vec<PlatformCall>>>,
}

impl Journal {
    pub fn record(&self, call: PlatformCall) {
        log::trace!("platform call {:?}", call);
        self.calls.lock().push(call);
    }

    pub fn calls(&self) -> Vec<PlatformCall> {
        self.calls.lock().clone()
    }

    pub fn count(&self, predicate: impl Fn(&PlatformCall) -> bool) -> usize {
        self.calls.lock().iter().filter(|c| predicate(c)).count()
    }

    pub fn clear(&self) {
        self.calls.lock().clear();
    }
}
