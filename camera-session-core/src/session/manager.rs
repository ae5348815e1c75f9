use std::sync::{Arc, Weak};

use parking_lot::Mutex;

use crate::models::camera_models::{DeviceCharacteristics, Resolution, SurfaceKind};
use crate::models::config::CameraConfiguration;
use crate::models::error::CameraError;
use crate::models::state::SessionState;
use crate::models::surface::Surface;
use crate::negotiation::orientation::OrientationState;
use crate::negotiation::size_fitter::{largest_by_area, SizeRequest};
use crate::traits::camera_listener::CameraListener;
use crate::traits::clock::{Clock, MonotonicClock};
use crate::traits::device_service::DeviceService;
use crate::traits::host_context::HostContext;

use super::callbacks::{Command, DeviceCallbacks};
use super::shared::{Shared, Snapshot};
use super::worker::{WorkerLauncher, WorkerSlot};

/// Result of a successful configure step.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Negotiation {
    camera_id: String,
    preview_size: Resolution,
    orientation: OrientationState,
    flash_supported: bool,
}

/// Caller-facing camera manager.
///
/// Configuration runs synchronously on the caller's thread. Everything after
/// `open` runs on a dedicated session worker that is spawned when the device
/// first reports it is open:
/// ```text
/// [caller] ─ open/start_record/stop_record ─┐
///                                           ├→ [worker: SessionCoordinator] → DeviceHandle → CaptureSession
/// [platform callbacks] ─────────────────────┘
/// ```
/// Every method takes `&self` and may be called from any thread.
pub struct CameraManager {
    service: Arc<dyn DeviceService>,
    host: Mutex<Option<Weak<dyn HostContext>>>,
    config: CameraConfiguration,
    clock: Arc<dyn Clock>,
    shared: Arc<Shared>,
    worker: Arc<WorkerSlot>,
    teardown: Mutex<()>,
}

impl CameraManager {
    pub fn new<H: HostContext + 'static>(
        service: Arc<dyn DeviceService>,
        host: &Arc<H>,
        config: CameraConfiguration,
    ) -> Self {
        let host = Arc::downgrade(host);
        let host: Weak<dyn HostContext> = host;
        Self {
            service,
            host: Mutex::new(Some(host)),
            config,
            clock: Arc::new(MonotonicClock::new()),
            shared: Arc::new(Shared::new()),
            worker: Arc::new(WorkerSlot::default()),
            teardown: Mutex::new(()),
        }
    }

    /// Replace the clock used to time recordings.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn set_listener(&self, listener: Arc<dyn CameraListener>) {
        self.shared.set_listener(listener);
    }

    pub fn config(&self) -> &CameraConfiguration {
        &self.config
    }

    pub fn snapshot(&self) -> Snapshot {
        self.shared.snapshot()
    }

    pub fn state(&self) -> SessionState {
        self.shared.state()
    }

    /// Negotiated preview size, once `configure` has succeeded.
    pub fn preview_size(&self) -> Option<Resolution> {
        self.shared.snapshot().preview_size
    }

    pub fn is_recording_video(&self) -> bool {
        self.shared.snapshot().recording
    }

    pub fn flash_supported(&self) -> bool {
        self.shared.snapshot().flash_supported
    }

    /// Rotation to tag captured frames with, once configured.
    pub fn capture_rotation_degrees(&self) -> Option<u32> {
        self.shared
            .snapshot()
            .orientation
            .map(|o| o.capture_rotation_degrees())
    }

    /// Configured and not failed.
    pub fn is_ready(&self) -> bool {
        let snapshot = self.shared.snapshot();
        snapshot.preview_size.is_some() && !snapshot.state.is_failed()
    }

    /// Negotiate the preview size for the configured requested size.
    pub fn configure(&self) -> Result<Resolution, CameraError> {
        self.configure_for(self.config.requested_preview_size)
    }

    /// Select a camera and negotiate a preview size close to `requested`
    /// (display orientation).
    ///
    /// Any failure is fatal: the manager moves to `Failed` and later calls
    /// return `NotReady`.
    pub fn configure_for(&self, requested: Resolution) -> Result<Resolution, CameraError> {
        match self.shared.state() {
            SessionState::Unconfigured => {}
            SessionState::Failed(_) => return Err(CameraError::NotReady),
            other => return Err(other.reject("configure")),
        }

        match self.negotiate(requested) {
            Ok(negotiation) => {
                log::info!(
                    "camera {} configured with preview size {}",
                    negotiation.camera_id,
                    negotiation.preview_size
                );
                let preview_size = negotiation.preview_size;
                self.shared.update(|s| {
                    s.camera_id = Some(negotiation.camera_id);
                    s.preview_size = Some(negotiation.preview_size);
                    s.orientation = Some(negotiation.orientation);
                    s.flash_supported = negotiation.flash_supported;
                });
                Ok(preview_size)
            }
            Err(e) => {
                log::error!("camera configuration failed: {}", e);
                self.shared.set_state(SessionState::Failed(e.clone()));
                Err(e)
            }
        }
    }

    /// Open the configured camera and stream preview into `render_target`.
    ///
    /// Returns once the open request is accepted. Preview starts when the
    /// device reports open; failures after this point arrive through
    /// [`CameraListener::on_failure`].
    pub fn open(&self, render_target: &Arc<Surface>) -> Result<(), CameraError> {
        let snapshot = self.shared.snapshot();
        if snapshot.state != SessionState::Unconfigured {
            return Err(open_rejection(snapshot.state));
        }
        let camera_id = snapshot.camera_id.ok_or(CameraError::NotReady)?;
        if let Err(e) = self.host() {
            self.shared.set_state(SessionState::Failed(e.clone()));
            return Err(e);
        }

        // Only one caller may win the move to Opening and reach the device.
        self.shared
            .transition(&SessionState::Unconfigured, SessionState::Opening)
            .map_err(open_rejection)?;
        let launcher = WorkerLauncher::new(
            Arc::clone(&self.shared),
            Arc::clone(&self.clock),
            self.config.autofocus,
            Arc::downgrade(render_target),
            Arc::clone(&self.worker),
        );
        let callbacks = DeviceCallbacks::new(Arc::new(launcher));

        log::info!("opening camera {}", camera_id);
        if let Err(e) = self.service.open_device(&camera_id, callbacks) {
            log::error!("failed to open camera {}: {}", camera_id, e);
            self.shared.set_state(SessionState::Failed(e.clone()));
            return Err(e);
        }
        Ok(())
    }

    /// Trigger autofocus on the live session.
    pub fn take_photo(&self) -> Result<(), CameraError> {
        self.host()?;
        let state = self.usable_state()?;
        if !state.is_streaming() {
            return Err(state.reject("take_photo"));
        }
        self.post(Command::TakePhoto, &state, "take_photo")
    }

    /// Switch from preview to recording into `record_target` alongside the
    /// render target.
    pub fn start_record(&self, record_target: &Arc<Surface>) -> Result<(), CameraError> {
        self.host()?;
        let state = self.usable_state()?;
        if state != SessionState::PreviewActive {
            return Err(state.reject("start_record"));
        }
        if record_target.kind() != SurfaceKind::Record {
            log::warn!(
                "record target {} has kind {:?}",
                record_target.name(),
                record_target.kind()
            );
        }
        self.post(
            Command::StartRecord(Arc::downgrade(record_target)),
            &state,
            "start_record",
        )
    }

    /// Stop recording and return to preview. The duration is delivered via
    /// [`CameraListener::on_record_stopped`].
    pub fn stop_record(&self) -> Result<(), CameraError> {
        self.host()?;
        let state = self.usable_state()?;
        if state != SessionState::RecordActive {
            return Err(state.reject("stop_record"));
        }
        self.post(Command::StopRecord, &state, "stop_record")
    }

    /// Tear everything down and block until the session worker has stopped.
    ///
    /// Idempotent. Concurrent callers all return only once teardown has
    /// finished. The caller's surfaces are never closed.
    pub fn close(&self) {
        // A listener closing from the worker must not wait on a teardown
        // that is joining that same worker.
        let _teardown = if self.worker.on_worker_thread() {
            None
        } else {
            Some(self.teardown.lock())
        };
        if self.shared.state().is_closed() && !self.worker.is_running() {
            return;
        }

        let worker = self.worker.cancel_and_take(&self.shared);
        self.shared.set_state(SessionState::Closing);
        if let Some(worker) = worker {
            if let Err(e) = worker.shutdown() {
                log::error!("{}", e);
            }
        }
        self.shared.set_state(SessionState::Closed);
        self.host.lock().take();
        log::info!("camera manager closed");
    }

    fn post(
        &self,
        command: Command,
        state: &SessionState,
        operation: &'static str,
    ) -> Result<(), CameraError> {
        self.worker.send(command).map_err(|undelivered| {
            undelivered.release();
            state.reject(operation)
        })
    }

    fn usable_state(&self) -> Result<SessionState, CameraError> {
        let state = self.shared.state();
        if state.is_failed() {
            return Err(CameraError::NotReady);
        }
        Ok(state)
    }

    fn host(&self) -> Result<Arc<dyn HostContext>, CameraError> {
        let host = self
            .host
            .lock()
            .as_ref()
            .and_then(Weak::upgrade)
            .ok_or(CameraError::HostInvalidated)?;
        if !host.is_valid() {
            return Err(CameraError::HostInvalidated);
        }
        Ok(host)
    }

    fn negotiate(&self, requested: Resolution) -> Result<Negotiation, CameraError> {
        self.config
            .validate()
            .map_err(CameraError::ConfigurationFailed)?;
        if requested.is_empty() {
            return Err(CameraError::ConfigurationFailed(format!(
                "requested preview size must be positive: {}",
                requested
            )));
        }

        let host = self.host()?;
        let (camera_id, characteristics) = self.select_camera()?;

        let largest = largest_by_area(characteristics.sizes_for(SurfaceKind::StillCapture))?;
        let display_rotation = host.display_rotation();
        let orientation = OrientationState::new(display_rotation, characteristics.sensor_orientation);
        let request = SizeRequest::oriented(
            requested,
            host.display_bounds(),
            self.config.max_preview_size,
            largest,
            &orientation,
        );
        let preview_size = request.fit(characteristics.sizes_for(SurfaceKind::Preview))?;

        log::debug!(
            "display rotation {} sensor {} swapped {}",
            display_rotation.degrees(),
            characteristics.sensor_orientation.degrees(),
            orientation.is_swapped()
        );
        log::debug!("preview size {} largest size is {}", preview_size, largest);
        log::debug!(
            "all preview sizes {:?}",
            characteristics.sizes_for(SurfaceKind::Preview)
        );
        log::debug!(
            "all record sizes {:?}",
            characteristics.sizes_for(SurfaceKind::Record)
        );

        Ok(Negotiation {
            camera_id,
            preview_size,
            orientation,
            flash_supported: characteristics.flash_available,
        })
    }

    /// Explicit `camera_id`, else the first camera facing
    /// `preferred_facing`, else the first camera that describes itself.
    fn select_camera(&self) -> Result<(String, DeviceCharacteristics), CameraError> {
        if let Some(id) = &self.config.camera_id {
            let characteristics = self.characteristics(id)?;
            return Ok((id.clone(), characteristics));
        }

        let ids = self
            .service
            .camera_ids()
            .map_err(|e| CameraError::CharacteristicsUnavailable(e.to_string()))?;
        if ids.is_empty() {
            return Err(CameraError::NoDevice);
        }

        let mut fallback = None;
        for id in ids {
            match self.characteristics(&id) {
                Ok(c) if c.facing == self.config.preferred_facing => return Ok((id, c)),
                Ok(c) => {
                    fallback.get_or_insert((id, c));
                }
                Err(e) => log::warn!("skipping camera {}: {}", id, e),
            }
        }
        fallback.ok_or_else(|| {
            CameraError::CharacteristicsUnavailable("no camera reported its characteristics".into())
        })
    }

    fn characteristics(&self, camera_id: &str) -> Result<DeviceCharacteristics, CameraError> {
        self.service
            .characteristics(camera_id)
            .map_err(|e| match e {
                CameraError::CharacteristicsUnavailable(_) => e,
                other => CameraError::CharacteristicsUnavailable(other.to_string()),
            })
    }
}

fn open_rejection(state: SessionState) -> CameraError {
    match state {
        SessionState::Failed(_) => CameraError::NotReady,
        other => other.reject("open"),
    }
}

impl Drop for CameraManager {
    fn drop(&mut self) {
        self.close();
    }
}

#[cfg(test)]
mod tests {
    use std::thread;
    use std::time::{Duration, Instant};

    use super::*;
    use crate::models::camera_models::{LensFacing, Rotation};
    use crate::session::test_support::{phone_back_camera, Event, FakeService, FixedHost};

    fn portrait_host() -> Arc<FixedHost> {
        Arc::new(FixedHost {
            rotation: Rotation::Deg0,
            bounds: Resolution::new(1080, 1920),
            valid: true,
        })
    }

    fn manager_with(service: FakeService, host: &Arc<FixedHost>) -> (CameraManager, Arc<FakeService>) {
        let service = Arc::new(service);
        let config = CameraConfiguration {
            requested_preview_size: Resolution::new(720, 1280),
            ..Default::default()
        };
        let manager = CameraManager::new(Arc::clone(&service) as Arc<dyn DeviceService>, host, config);
        (manager, service)
    }

    fn wait_for(manager: &CameraManager, state: SessionState) {
        let deadline = Instant::now() + Duration::from_secs(2);
        while manager.state() != state {
            assert!(Instant::now() < deadline, "timed out waiting for {}", state);
            thread::sleep(Duration::from_millis(5));
        }
    }

    #[test]
    fn configure_negotiates_rotated_preview_size() {
        let host = portrait_host();
        let (manager, _) = manager_with(FakeService::default().with_camera("0", phone_back_camera()), &host);

        assert_eq!(manager.configure().unwrap(), Resolution::new(1280, 720));
        assert_eq!(manager.preview_size(), Some(Resolution::new(1280, 720)));
        assert_eq!(manager.capture_rotation_degrees(), Some(90));
        assert!(manager.flash_supported());
        assert!(manager.is_ready());
        assert_eq!(manager.state(), SessionState::Unconfigured);
        assert_eq!(manager.config().max_preview_size, Resolution::new(1920, 1080));
    }

    #[test]
    fn empty_preview_sizes_leave_manager_not_ready() {
        let host = portrait_host();
        let camera = phone_back_camera().with_sizes(SurfaceKind::Preview, Vec::new());
        let (manager, _) = manager_with(FakeService::default().with_camera("0", camera), &host);

        assert_eq!(manager.configure(), Err(CameraError::NoCandidate));
        assert!(!manager.is_ready());
        let render = Surface::new(SurfaceKind::Preview, "view");
        assert_eq!(manager.open(&render), Err(CameraError::NotReady));
        assert_eq!(manager.stop_record(), Err(CameraError::NotReady));

        manager.close();
        assert_eq!(manager.state(), SessionState::Closed);
    }

    #[test]
    fn dropped_host_fails_configuration() {
        let host = portrait_host();
        let (manager, _) = manager_with(FakeService::default().with_camera("0", phone_back_camera()), &host);
        drop(host);

        assert_eq!(manager.configure(), Err(CameraError::HostInvalidated));
        assert!(manager.state().is_failed());
    }

    #[test]
    fn no_cameras_is_a_configuration_error() {
        let host = portrait_host();
        let (manager, _) = manager_with(FakeService::default(), &host);
        assert_eq!(manager.configure(), Err(CameraError::NoDevice));
    }

    #[test]
    fn selects_camera_by_preferred_facing() {
        let host = portrait_host();
        let front = DeviceCharacteristics::new(LensFacing::Front, Rotation::Deg270)
            .with_sizes(SurfaceKind::Preview, vec![Resolution::new(640, 480)])
            .with_sizes(SurfaceKind::StillCapture, vec![Resolution::new(640, 480)]);
        let service = FakeService::default()
            .with_camera("1", front)
            .with_camera("0", phone_back_camera());
        let (manager, _) = manager_with(service, &host);

        manager.configure().unwrap();
        assert_eq!(manager.snapshot().camera_id.as_deref(), Some("0"));
    }

    #[test]
    fn open_before_configure_is_not_ready() {
        let host = portrait_host();
        let (manager, _) = manager_with(FakeService::default().with_camera("0", phone_back_camera()), &host);
        let render = Surface::new(SurfaceKind::Preview, "view");
        assert_eq!(manager.open(&render), Err(CameraError::NotReady));
    }

    #[test]
    fn record_calls_outside_streaming_are_rejected() {
        let host = portrait_host();
        let (manager, _) = manager_with(FakeService::default().with_camera("0", phone_back_camera()), &host);
        manager.configure().unwrap();
        let record = Surface::new(SurfaceKind::Record, "encoder");

        assert!(matches!(
            manager.start_record(&record),
            Err(CameraError::InvalidState { operation: "start_record", .. })
        ));
        assert!(matches!(
            manager.stop_record(),
            Err(CameraError::InvalidState { operation: "stop_record", .. })
        ));
        assert_eq!(manager.state(), SessionState::Unconfigured);
    }

    #[test]
    fn opened_device_streams_on_worker_and_close_joins() {
        let host = portrait_host();
        let (manager, service) =
            manager_with(FakeService::default().with_camera("0", phone_back_camera()), &host);
        manager.configure().unwrap();
        let render = Surface::new(SurfaceKind::Preview, "view");

        manager.open(&render).unwrap();
        assert_eq!(manager.state(), SessionState::Opening);

        let callbacks = service.take_pending_open().unwrap();
        callbacks.opened(service.device());
        wait_for(&manager, SessionState::PreviewActive);

        manager.close();
        assert_eq!(manager.state(), SessionState::Closed);
        let events = service.events();
        assert_eq!(&events[events.len() - 2..], &[Event::SessionClosed(1), Event::DeviceClosed]);

        manager.close();
        assert_eq!(manager.state(), SessionState::Closed);
    }

    #[test]
    fn device_opened_after_close_is_released() {
        let host = portrait_host();
        let (manager, service) =
            manager_with(FakeService::default().with_camera("0", phone_back_camera()), &host);
        manager.configure().unwrap();
        let render = Surface::new(SurfaceKind::Preview, "view");
        manager.open(&render).unwrap();

        manager.close();
        service.take_pending_open().unwrap().opened(service.device());

        assert_eq!(manager.state(), SessionState::Closed);
        assert_eq!(service.events(), vec![Event::DeviceClosed]);
    }

    #[test]
    fn open_error_before_worker_closes_and_reports() {
        let host = portrait_host();
        let (manager, service) =
            manager_with(FakeService::default().with_camera("0", phone_back_camera()), &host);
        manager.configure().unwrap();
        let render = Surface::new(SurfaceKind::Preview, "view");
        manager.open(&render).unwrap();

        service.take_pending_open().unwrap().error(4);
        assert_eq!(manager.state(), SessionState::Closed);
        manager.close();
        assert_eq!(manager.state(), SessionState::Closed);
    }

    #[test]
    fn close_from_unconfigured_reaches_closed() {
        let host = portrait_host();
        let (manager, _) = manager_with(FakeService::default(), &host);
        manager.close();
        assert_eq!(manager.state(), SessionState::Closed);

        let render = Surface::new(SurfaceKind::Preview, "view");
        assert!(matches!(
            manager.open(&render),
            Err(CameraError::InvalidState { operation: "open", .. })
        ));
    }

    fn streaming_manager() -> (CameraManager, Arc<FakeService>, Arc<FixedHost>, Arc<Surface>) {
        let host = portrait_host();
        let (manager, service) =
            manager_with(FakeService::default().with_camera("0", phone_back_camera()), &host);
        manager.configure().unwrap();
        let render = Surface::new(SurfaceKind::Preview, "view");
        manager.open(&render).unwrap();
        service.take_pending_open().unwrap().opened(service.device());
        wait_for(&manager, SessionState::PreviewActive);
        (manager, service, host, render)
    }

    #[test]
    fn concurrent_close_returns_after_device_release() {
        let (manager, service, _host, _render) = streaming_manager();
        service.slow_device_close(Duration::from_millis(300));

        thread::scope(|s| {
            s.spawn(|| manager.close());
            thread::sleep(Duration::from_millis(50));
            manager.close();
            assert_eq!(manager.state(), SessionState::Closed);
            assert!(service.events().contains(&Event::DeviceClosed));
        });
    }

    #[test]
    fn worker_panic_during_close_still_reaches_closed() {
        let (manager, service, _host, _render) = streaming_manager();
        service.panic_on_device_close();

        manager.close();
        assert_eq!(manager.state(), SessionState::Closed);
        assert!(service.events().contains(&Event::DeviceClosed));
    }

    #[test]
    fn concurrent_open_reaches_device_once() {
        let host = portrait_host();
        let (manager, service) =
            manager_with(FakeService::default().with_camera("0", phone_back_camera()), &host);
        manager.configure().unwrap();
        let render = Surface::new(SurfaceKind::Preview, "view");

        let results = thread::scope(|s| {
            let other = s.spawn(|| manager.open(&render));
            let mine = manager.open(&render);
            vec![mine, other.join().unwrap()]
        });

        assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
        assert!(results.iter().any(|r| matches!(
            r,
            Err(CameraError::InvalidState { operation: "open", .. })
        )));
        assert_eq!(service.pending_opens.lock().len(), 1);
        assert_eq!(manager.state(), SessionState::Opening);
    }
}
