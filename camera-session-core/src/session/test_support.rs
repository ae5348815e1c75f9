//! In-test fakes for the platform side of the session worker.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use crossbeam_channel::{Receiver, Sender};
use parking_lot::Mutex;

use crate::models::camera_models::{
    DeviceCharacteristics, LensFacing, Resolution, Rotation, SurfaceKind,
};
use crate::models::capture_request::{AfMode, AfTrigger, CaptureRequest, RequestTemplate};
use crate::models::error::CameraError;
use crate::models::recording_result::RecordingResult;
use crate::models::state::SessionState;
use crate::models::surface::{Surface, SurfaceId, SurfaceSet};
use crate::negotiation::orientation::OrientationState;
use crate::session::callbacks::{Command, DeviceCallbacks, SessionCallbacks};
use crate::session::coordinator::SessionCoordinator;
use crate::session::shared::Shared;
use crate::traits::camera_device::CameraDevice;
use crate::traits::camera_listener::CameraListener;
use crate::traits::capture_session::CaptureSession;
use crate::traits::clock::Clock;
use crate::traits::device_service::DeviceService;
use crate::traits::host_context::HostContext;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    SessionCreated(Vec<SurfaceId>),
    SessionClosed(u64),
    Repeating(u64, RequestTemplate),
    Capture(u64, AfTrigger),
    DeviceClosed,
    PreviewStarted,
    RecordStopped(u64),
    Failure(CameraError),
}

/// Shared record of everything the fake platform and listener observed.
#[derive(Default)]
pub struct Platform {
    events: Vec<Event>,
    states: Vec<String>,
    open_sessions: usize,
    max_open_sessions: usize,
    next_session: u64,
    parked: Vec<SessionCallbacks>,
    manual: bool,
    fail_repeating: bool,
    close_delay: Duration,
    panic_on_close: bool,
}

pub type PlatformRef = Arc<Mutex<Platform>>;

impl Platform {
    fn new_session(platform: &PlatformRef) -> Box<dyn CaptureSession> {
        let mut p = platform.lock();
        p.next_session += 1;
        p.open_sessions += 1;
        p.max_open_sessions = p.max_open_sessions.max(p.open_sessions);
        Box::new(FakeSession {
            serial: p.next_session,
            platform: Arc::clone(platform),
            closed: false,
        })
    }
}

pub struct FakeDevice {
    platform: PlatformRef,
}

impl CameraDevice for FakeDevice {
    fn id(&self) -> &str {
        "0"
    }

    fn create_capture_session(
        &mut self,
        targets: &SurfaceSet,
        callbacks: SessionCallbacks,
    ) -> Result<(), CameraError> {
        let manual = {
            let mut p = self.platform.lock();
            p.events.push(Event::SessionCreated(targets.ids()));
            if p.manual {
                p.parked.push(callbacks.clone());
            }
            p.manual
        };
        if !manual {
            callbacks.configured(Platform::new_session(&self.platform));
        }
        Ok(())
    }

    fn close(&mut self) {
        let (delay, crash) = {
            let mut p = self.platform.lock();
            (p.close_delay, std::mem::take(&mut p.panic_on_close))
        };
        if crash {
            panic!("camera driver crashed while closing");
        }
        thread::sleep(delay);
        self.platform.lock().events.push(Event::DeviceClosed);
    }
}

pub struct FakeSession {
    serial: u64,
    platform: PlatformRef,
    closed: bool,
}

impl CaptureSession for FakeSession {
    fn set_repeating_request(&mut self, request: &CaptureRequest) -> Result<(), CameraError> {
        let mut p = self.platform.lock();
        if p.fail_repeating {
            return Err(CameraError::DeviceAccess("repeating request rejected".into()));
        }
        p.events.push(Event::Repeating(self.serial, request.template));
        Ok(())
    }

    fn capture(&mut self, request: &CaptureRequest) -> Result<(), CameraError> {
        self.platform
            .lock()
            .events
            .push(Event::Capture(self.serial, request.af_trigger));
        Ok(())
    }

    fn close(&mut self) {
        if !self.closed {
            self.closed = true;
            let mut p = self.platform.lock();
            p.open_sessions -= 1;
            p.events.push(Event::SessionClosed(self.serial));
        }
    }
}

pub struct JournalListener {
    platform: PlatformRef,
}

impl CameraListener for JournalListener {
    fn on_state_changed(&self, state: &SessionState) {
        self.platform.lock().states.push(state.name().to_string());
    }

    fn on_preview_started(&self) {
        self.platform.lock().events.push(Event::PreviewStarted);
    }

    fn on_record_stopped(&self, result: &RecordingResult) {
        self.platform
            .lock()
            .events
            .push(Event::RecordStopped(result.duration_ms));
    }

    fn on_failure(&self, error: &CameraError) {
        self.platform.lock().events.push(Event::Failure(error.clone()));
    }
}

#[derive(Default)]
pub struct ManualClock(AtomicU64);

impl ManualClock {
    pub fn set(&self, millis: u64) {
        self.0.store(millis, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now_millis(&self) -> u64 {
        self.0.load(Ordering::SeqCst)
    }
}

/// Drives a coordinator synchronously: commands are pumped on the test
/// thread instead of a worker.
pub struct Harness {
    pub coordinator: SessionCoordinator,
    pub shared: Arc<Shared>,
    pub clock: Arc<ManualClock>,
    pub render: Arc<Surface>,
    sender: Sender<Command>,
    receiver: Receiver<Command>,
    platform: PlatformRef,
}

impl Harness {
    /// Sessions configure as soon as they are requested.
    pub fn new() -> Self {
        Self::build(false)
    }

    /// Sessions wait for `configure_oldest` / `fail_oldest`.
    pub fn manual() -> Self {
        Self::build(true)
    }

    fn build(manual: bool) -> Self {
        let platform: PlatformRef = Arc::new(Mutex::new(Platform {
            manual,
            ..Default::default()
        }));
        let shared = Arc::new(Shared::new());
        shared.update(|s| {
            s.camera_id = Some("0".into());
            s.preview_size = Some(Resolution::new(1280, 720));
            s.orientation = Some(OrientationState::new(Rotation::Deg0, Rotation::Deg90));
        });
        shared.set_state(SessionState::Opening);
        shared.set_listener(Arc::new(JournalListener {
            platform: Arc::clone(&platform),
        }));

        let clock = Arc::new(ManualClock::default());
        let render = Surface::new(SurfaceKind::Preview, "view");
        let (sender, receiver) = crossbeam_channel::unbounded();
        let coordinator = SessionCoordinator::new(
            Arc::clone(&shared),
            sender.clone(),
            Arc::clone(&clock) as Arc<dyn Clock>,
            AfMode::ContinuousPicture,
            Arc::downgrade(&render),
        );

        Self {
            coordinator,
            shared,
            clock,
            render,
            sender,
            receiver,
            platform,
        }
    }

    /// Hands the coordinator and its mailbox over to a real worker.
    pub fn into_worker_parts(self) -> (SessionCoordinator, Sender<Command>, Receiver<Command>) {
        (self.coordinator, self.sender, self.receiver)
    }

    /// The next device close panics once.
    pub fn panic_on_device_close(&self) {
        self.platform.lock().panic_on_close = true;
    }

    pub fn device(&self) -> Box<dyn CameraDevice> {
        Box::new(FakeDevice {
            platform: Arc::clone(&self.platform),
        })
    }

    pub fn open(&mut self) {
        let device = self.device();
        self.coordinator.on_device_opened(device);
        self.pump();
    }

    pub fn pump(&mut self) {
        while let Ok(command) = self.receiver.try_recv() {
            self.coordinator.handle(command);
        }
    }

    pub fn configure_oldest(&mut self) {
        let callbacks = self.platform.lock().parked.remove(0);
        callbacks.configured(Platform::new_session(&self.platform));
        self.pump();
    }

    pub fn fail_oldest(&mut self, reason: &str) {
        let callbacks = self.platform.lock().parked.remove(0);
        callbacks.configure_failed(reason);
        self.pump();
    }

    pub fn fail_repeating(&self) {
        self.platform.lock().fail_repeating = true;
    }

    /// Drops the only strong reference to the render target.
    pub fn release_render(&mut self) {
        let replacement = Surface::new(SurfaceKind::Preview, "replacement");
        drop(std::mem::replace(&mut self.render, replacement));
    }

    pub fn events(&self) -> Vec<Event> {
        self.platform.lock().events.clone()
    }

    pub fn states(&self) -> Vec<String> {
        self.platform.lock().states.clone()
    }

    pub fn clear_events(&self) {
        let mut p = self.platform.lock();
        p.events.clear();
        p.states.clear();
    }

    pub fn max_open_sessions(&self) -> usize {
        self.platform.lock().max_open_sessions
    }
}

/// Host with fixed display properties.
pub struct FixedHost {
    pub rotation: Rotation,
    pub bounds: Resolution,
    pub valid: bool,
}

impl HostContext for FixedHost {
    fn display_rotation(&self) -> Rotation {
        self.rotation
    }

    fn display_bounds(&self) -> Resolution {
        self.bounds
    }

    fn is_valid(&self) -> bool {
        self.valid
    }
}

/// Device service whose open requests are parked until the test answers.
#[derive(Default)]
pub struct FakeService {
    pub cameras: Vec<(String, DeviceCharacteristics)>,
    pub pending_opens: Mutex<Vec<DeviceCallbacks>>,
    pub platform: PlatformRef,
}

impl FakeService {
    pub fn with_camera(mut self, id: &str, characteristics: DeviceCharacteristics) -> Self {
        self.cameras.push((id.to_string(), characteristics));
        self
    }

    pub fn take_pending_open(&self) -> Option<DeviceCallbacks> {
        let mut pending = self.pending_opens.lock();
        if pending.is_empty() {
            None
        } else {
            Some(pending.remove(0))
        }
    }

    pub fn device(&self) -> Box<dyn CameraDevice> {
        Box::new(FakeDevice {
            platform: Arc::clone(&self.platform),
        })
    }

    pub fn events(&self) -> Vec<Event> {
        self.platform.lock().events.clone()
    }

    pub fn slow_device_close(&self, delay: Duration) {
        self.platform.lock().close_delay = delay;
    }

    pub fn panic_on_device_close(&self) {
        self.platform.lock().panic_on_close = true;
    }
}

impl DeviceService for FakeService {
    fn camera_ids(&self) -> Result<Vec<String>, CameraError> {
        Ok(self.cameras.iter().map(|(id, _)| id.clone()).collect())
    }

    fn characteristics(&self, camera_id: &str) -> Result<DeviceCharacteristics, CameraError> {
        let by_id: HashMap<&str, &DeviceCharacteristics> =
            self.cameras.iter().map(|(id, c)| (id.as_str(), c)).collect();
        by_id
            .get(camera_id)
            .map(|c| (*c).clone())
            .ok_or_else(|| CameraError::CharacteristicsUnavailable(format!("unknown camera {}", camera_id)))
    }

    fn open_device(&self, _camera_id: &str, callbacks: DeviceCallbacks) -> Result<(), CameraError> {
        self.pending_opens.lock().push(callbacks);
        Ok(())
    }
}

/// Back camera mounted at 90 degrees with 16:9 output sizes.
pub fn phone_back_camera() -> DeviceCharacteristics {
    DeviceCharacteristics::new(LensFacing::Back, Rotation::Deg90)
        .with_flash(true)
        .with_sizes(
            SurfaceKind::Preview,
            vec![
                Resolution::new(640, 480),
                Resolution::new(1280, 720),
                Resolution::new(1920, 1080),
            ],
        )
        .with_sizes(
            SurfaceKind::StillCapture,
            vec![Resolution::new(1920, 1080), Resolution::new(1280, 720)],
        )
        .with_sizes(SurfaceKind::Record, vec![Resolution::new(1280, 720)])
}
