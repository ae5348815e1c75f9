use std::sync::{Arc, Weak};

use chrono::{DateTime, Utc};
use crossbeam_channel::Sender;

use crate::models::camera_models::Resolution;
use crate::models::capture_request::{AfMode, AfTrigger, CaptureRequestBuilder, RequestTemplate};
use crate::models::error::CameraError;
use crate::models::recording_result::RecordingResult;
use crate::models::state::SessionState;
use crate::models::surface::{Surface, SurfaceSet};
use crate::traits::camera_device::CameraDevice;
use crate::traits::capture_session::CaptureSession;
use crate::traits::clock::Clock;

use super::callbacks::{device_error, Command, SessionCallbacks};
use super::device_handle::DeviceHandle;
use super::shared::Shared;
use super::surface_registry::SurfaceRegistry;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Flow {
    Continue,
    Shutdown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StreamMode {
    Preview,
    Record,
}

/// A session that has been requested from the device but not yet configured.
#[derive(Debug, Clone, Copy)]
struct PendingSession {
    generation: u64,
    mode: StreamMode,
}

#[derive(Debug, Clone, Copy)]
struct RecordStart {
    at_millis: u64,
    wall: DateTime<Utc>,
}

/// Owns the open device and its capture session, and drives the session
/// state machine.
///
/// Lives on the session worker; every method runs on that one thread.
/// Transition methods that return `Err` rejected the request without side
/// effects. Failures after side effects go through `fail`, which releases
/// the device and reports to the listener.
pub(crate) struct SessionCoordinator {
    shared: Arc<Shared>,
    commands: Sender<Command>,
    clock: Arc<dyn Clock>,
    autofocus: AfMode,
    registry: SurfaceRegistry,
    device: Option<DeviceHandle>,
    session: Option<Box<dyn CaptureSession>>,
    builder: Option<CaptureRequestBuilder>,
    surfaces: SurfaceSet,
    pending: Option<PendingSession>,
    generation: u64,
    record_start: Option<RecordStart>,
    preview_announced: bool,
}

impl SessionCoordinator {
    pub(crate) fn new(
        shared: Arc<Shared>,
        commands: Sender<Command>,
        clock: Arc<dyn Clock>,
        autofocus: AfMode,
        render: Weak<Surface>,
    ) -> Self {
        Self {
            shared,
            commands,
            clock,
            autofocus,
            registry: SurfaceRegistry::new(render),
            device: None,
            session: None,
            builder: None,
            surfaces: SurfaceSet::default(),
            pending: None,
            generation: 0,
            record_start: None,
            preview_announced: false,
        }
    }

    pub(crate) fn handle(&mut self, command: Command) -> Flow {
        if self.shared.is_cancelled() && !matches!(command, Command::Shutdown) {
            log::debug!("releasing {} queued before close", command.name());
            command.release();
            return Flow::Continue;
        }

        let outcome = match command {
            Command::DeviceOpened(device) => {
                self.on_device_opened(device);
                Ok(())
            }
            Command::DeviceDisconnected => {
                self.on_device_lost(CameraError::Disconnected);
                Ok(())
            }
            Command::DeviceError(code) => {
                self.on_device_lost(device_error(code));
                Ok(())
            }
            Command::SessionConfigured {
                generation,
                session,
            } => {
                self.on_session_configured(generation, session);
                Ok(())
            }
            Command::SessionConfigureFailed { generation, reason } => {
                self.on_session_configure_failed(generation, reason);
                Ok(())
            }
            Command::StartRecord(target) => self.start_record(target),
            Command::StopRecord => self.stop_record().map(|_| ()),
            Command::TakePhoto => self.take_photo(),
            Command::Shutdown => {
                self.shutdown();
                return Flow::Shutdown;
            }
        };

        if let Err(e) = outcome {
            log::warn!("request rejected: {}", e);
            self.shared.notify_failure(&e);
        }
        Flow::Continue
    }

    pub(crate) fn on_device_opened(&mut self, device: Box<dyn CameraDevice>) {
        let mut handle = DeviceHandle::new(device);
        let state = self.shared.state();
        if state != SessionState::Opening || self.device.is_some() {
            log::warn!("camera {} opened in state {}, closing it", handle.id(), state);
            handle.close();
            return;
        }
        self.device = Some(handle);
        self.shared.set_state(SessionState::Ready);
        self.start_preview();
    }

    /// Device went away: release everything and end in `Closed`.
    pub(crate) fn on_device_lost(&mut self, error: CameraError) {
        log::error!("camera lost: {}", error);
        self.release();
        self.shared.set_state(SessionState::Closed);
        self.shared.notify_failure(&error);
    }

    pub(crate) fn start_preview(&mut self) {
        if let Err(e) = self.try_start_preview() {
            self.fail(e);
        }
    }

    fn try_start_preview(&mut self) -> Result<(), CameraError> {
        self.close_session();
        let targets = self.registry.preview_set()?;
        let mut builder = self.device()?.create_request_builder(RequestTemplate::Preview)?;
        builder.set_af_mode(self.autofocus);
        for id in targets.ids() {
            builder.add_target(id);
        }
        self.request_session(targets, builder, StreamMode::Preview)?;
        self.shared.update(|s| s.recording = false);
        self.shared.set_state(SessionState::PreviewActive);
        Ok(())
    }

    pub(crate) fn start_record(&mut self, target: Weak<Surface>) -> Result<(), CameraError> {
        let state = self.shared.state();
        if state != SessionState::PreviewActive {
            return Err(state.reject("start_record"));
        }

        let mut registry = self.registry.clone();
        registry.set_record(target);
        let targets = registry.record_set()?;
        self.registry = registry;

        if let Err(e) = self.switch_to_record(targets) {
            self.fail(e);
        }
        Ok(())
    }

    fn switch_to_record(&mut self, targets: SurfaceSet) -> Result<(), CameraError> {
        self.close_session();
        let mut builder = self.device()?.create_request_builder(RequestTemplate::Record)?;
        builder.set_af_mode(self.autofocus);
        for id in targets.ids() {
            builder.add_target(id);
        }
        self.request_session(targets, builder, StreamMode::Record)?;
        self.shared.set_state(SessionState::RecordActive);
        Ok(())
    }

    pub(crate) fn stop_record(&mut self) -> Result<RecordingResult, CameraError> {
        let state = self.shared.state();
        if state != SessionState::RecordActive {
            return Err(state.reject("stop_record"));
        }

        let record_start = self.record_start.take();
        self.close_session();
        let now = self.clock.now_millis();
        let (duration_ms, started_at) = match record_start {
            Some(start) => (now.saturating_sub(start.at_millis), start.wall),
            None => {
                log::warn!("recording stopped before its session was ready");
                (0, Utc::now())
            }
        };
        self.registry.clear_record();
        self.shared.update(|s| s.recording = false);

        let snapshot = self.shared.snapshot();
        let result = RecordingResult::new(
            started_at,
            duration_ms,
            snapshot.preview_size.unwrap_or(Resolution::new(0, 0)),
            snapshot
                .orientation
                .map(|o| o.capture_rotation_degrees())
                .unwrap_or(0),
        );
        log::info!("recording stopped after {}ms", duration_ms);
        if let Some(listener) = self.shared.listener() {
            listener.on_record_stopped(&result);
        }

        self.start_preview();
        Ok(result)
    }

    /// Submits a one-shot autofocus trigger on the live session.
    pub(crate) fn take_photo(&mut self) -> Result<(), CameraError> {
        let state = self.shared.state();
        if !state.is_streaming() {
            return Err(state.reject("take_photo"));
        }
        let (Some(session), Some(builder)) = (self.session.as_mut(), self.builder.as_ref()) else {
            return Err(state.reject("take_photo"));
        };

        let mut trigger = builder.clone();
        trigger.set_af_trigger(AfTrigger::Start);
        let request = trigger.build()?;
        let submitted = session.capture(&request);
        if let Err(e) = submitted {
            self.fail(e);
        }
        Ok(())
    }

    pub(crate) fn on_session_configured(
        &mut self,
        generation: u64,
        mut session: Box<dyn CaptureSession>,
    ) {
        let pending = match self.pending {
            Some(p) if p.generation == generation => p,
            _ => {
                log::warn!("closing superseded session (generation {})", generation);
                session.close();
                return;
            }
        };
        self.pending = None;

        let request = match self.builder.as_ref().map(CaptureRequestBuilder::build) {
            Some(Ok(request)) => request,
            Some(Err(e)) => {
                session.close();
                self.fail(e);
                return;
            }
            None => {
                session.close();
                self.fail(CameraError::DeviceAccess("no capture request prepared".into()));
                return;
            }
        };

        if pending.mode == StreamMode::Preview && !self.preview_announced {
            self.preview_announced = true;
            if let Some(listener) = self.shared.listener() {
                listener.on_preview_started();
            }
        }

        let submitted = session.set_repeating_request(&request);
        self.session = Some(session);
        if let Err(e) = submitted {
            self.fail(e);
            return;
        }

        log::info!("session {} streaming to {}", generation, self.surfaces);
        if pending.mode == StreamMode::Record {
            let at_millis = self.clock.now_millis();
            self.record_start = Some(RecordStart {
                at_millis,
                wall: Utc::now(),
            });
            self.shared.update(|s| s.recording = true);
            log::info!("recording started at {}ms", at_millis);
        }
    }

    pub(crate) fn on_session_configure_failed(&mut self, generation: u64, reason: String) {
        if !matches!(self.pending, Some(p) if p.generation == generation) {
            log::debug!("ignoring failure of superseded session {}: {}", generation, reason);
            return;
        }
        self.fail(CameraError::DeviceAccess(format!(
            "session configuration failed: {}",
            reason
        )));
    }

    /// Close session then device, and end in `Closed`.
    pub(crate) fn shutdown(&mut self) {
        self.release();
        self.shared.set_state(SessionState::Closed);
        log::info!("session worker shut down");
    }

    fn request_session(
        &mut self,
        targets: SurfaceSet,
        builder: CaptureRequestBuilder,
        mode: StreamMode,
    ) -> Result<(), CameraError> {
        let generation = self.generation + 1;
        let callbacks = SessionCallbacks::new(generation, self.commands.clone());
        self.device_mut()?.create_capture_session(&targets, callbacks)?;

        log::debug!("requested {:?} session {} for {}", mode, generation, targets);
        self.generation = generation;
        self.builder = Some(builder);
        self.surfaces = targets;
        self.pending = Some(PendingSession { generation, mode });
        Ok(())
    }

    fn close_session(&mut self) {
        if let Some(mut session) = self.session.take() {
            session.close();
            log::debug!("closed capture session");
        }
        self.record_start = None;
    }

    fn release(&mut self) {
        self.close_session();
        self.pending = None;
        self.builder = None;
        self.surfaces = SurfaceSet::default();
        if let Some(mut device) = self.device.take() {
            device.close();
        }
        self.registry.clear_record();
        self.shared.update(|s| s.recording = false);
    }

    fn fail(&mut self, error: CameraError) {
        log::error!("camera session failed: {}", error);
        self.release();
        self.shared.fail(error);
    }

    fn device(&self) -> Result<&DeviceHandle, CameraError> {
        self.device
            .as_ref()
            .ok_or_else(|| CameraError::DeviceAccess("camera is not open".into()))
    }

    fn device_mut(&mut self) -> Result<&mut DeviceHandle, CameraError> {
        self.device
            .as_mut()
            .ok_or_else(|| CameraError::DeviceAccess("camera is not open".into()))
    }
}
