use std::sync::{Arc, Weak};
use std::thread::{self, ThreadId};

use crossbeam_channel::{Receiver, Sender};
use parking_lot::Mutex;

use crate::models::capture_request::AfMode;
use crate::models::error::CameraError;
use crate::models::surface::Surface;
use crate::traits::clock::Clock;

use super::callbacks::Command;
use super::coordinator::{Flow, SessionCoordinator};
use super::shared::Shared;

/// The dedicated session thread and its mailbox.
pub(crate) struct Worker {
    sender: Sender<Command>,
    handle: thread::JoinHandle<()>,
}

impl Worker {
    fn spawn(
        mut coordinator: SessionCoordinator,
        sender: Sender<Command>,
        receiver: Receiver<Command>,
    ) -> Result<Self, CameraError> {
        let handle = thread::Builder::new()
            .name("camera-session-worker".into())
            .spawn(move || {
                for command in receiver.iter() {
                    if coordinator.handle(command) == Flow::Shutdown {
                        break;
                    }
                }
                log::debug!("session worker stopped");
            })
            .map_err(|e| CameraError::DeviceAccess(format!("failed to spawn session worker: {}", e)))?;

        Ok(Self { sender, handle })
    }

    fn thread_id(&self) -> ThreadId {
        self.handle.thread().id()
    }

    /// Queue shutdown and wait for the thread to finish.
    pub(crate) fn shutdown(self) -> Result<(), CameraError> {
        if self.sender.send(Command::Shutdown).is_err() {
            log::warn!("session worker already stopped");
        }
        if self.handle.thread().id() == thread::current().id() {
            // Close requested from a listener callback; the loop exits after
            // this command returns.
            log::warn!("close called on the session worker, not joining");
            return Ok(());
        }
        self.handle
            .join()
            .map_err(|_| CameraError::InterruptedTeardown("session worker panicked".into()))
    }
}

/// Slot holding the worker once it exists.
#[derive(Default)]
pub(crate) struct WorkerSlot {
    worker: Mutex<Option<Worker>>,
    // Kept after the worker is taken so a closing listener can be recognised.
    worker_thread: Mutex<Option<ThreadId>>,
}

impl WorkerSlot {
    /// Send to the running worker. Hands the command back if there is none.
    pub(crate) fn send(&self, command: Command) -> Result<(), Command> {
        match self.worker.lock().as_ref() {
            Some(worker) => worker.sender.send(command).map_err(|e| e.into_inner()),
            None => Err(command),
        }
    }

    pub(crate) fn is_running(&self) -> bool {
        self.worker.lock().is_some()
    }

    pub(crate) fn on_worker_thread(&self) -> bool {
        *self.worker_thread.lock() == Some(thread::current().id())
    }

    /// Marks the manager cancelled and removes the worker, atomically with
    /// respect to [`WorkerLauncher::dispatch_spawning`].
    pub(crate) fn cancel_and_take(&self, shared: &Shared) -> Option<Worker> {
        let mut worker = self.worker.lock();
        shared.cancel();
        worker.take()
    }
}

/// Everything needed to start the worker lazily from a platform callback.
pub(crate) struct WorkerLauncher {
    shared: Arc<Shared>,
    clock: Arc<dyn Clock>,
    autofocus: AfMode,
    render: Weak<Surface>,
    slot: Arc<WorkerSlot>,
}

impl WorkerLauncher {
    pub(crate) fn new(
        shared: Arc<Shared>,
        clock: Arc<dyn Clock>,
        autofocus: AfMode,
        render: Weak<Surface>,
        slot: Arc<WorkerSlot>,
    ) -> Self {
        Self {
            shared,
            clock,
            autofocus,
            render,
            slot,
        }
    }

    pub(crate) fn shared(&self) -> &Shared {
        &self.shared
    }

    pub(crate) fn dispatch(&self, command: Command) -> Result<(), Command> {
        self.slot.send(command)
    }

    /// Like [`dispatch`](Self::dispatch), but spawns the worker first if it
    /// does not exist yet. Refuses once the manager has been closed.
    pub(crate) fn dispatch_spawning(&self, command: Command) -> Result<(), Command> {
        let mut slot = self.slot.worker.lock();
        if self.shared.is_cancelled() {
            log::debug!("{} arrived after close", command.name());
            return Err(command);
        }
        if slot.is_none() {
            let (sender, receiver) = crossbeam_channel::unbounded();
            let coordinator = SessionCoordinator::new(
                Arc::clone(&self.shared),
                sender.clone(),
                Arc::clone(&self.clock),
                self.autofocus,
                self.render.clone(),
            );
            match Worker::spawn(coordinator, sender, receiver) {
                Ok(worker) => {
                    *self.slot.worker_thread.lock() = Some(worker.thread_id());
                    *slot = Some(worker);
                }
                Err(e) => {
                    drop(slot);
                    self.shared.fail(e);
                    return Err(command);
                }
            }
        }
        match slot.as_ref() {
            Some(worker) => worker.sender.send(command).map_err(|e| e.into_inner()),
            None => Err(command),
        }
    }
}
