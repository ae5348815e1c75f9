//! Callback thread for the virtual platform.
//!
//! Real camera stacks answer open and configure requests asynchronously on
//! their own threads. Every answer from the virtual service is posted here
//! so callers see the same ordering.

use std::thread;

use crossbeam_channel::{Receiver, Sender};
use parking_lot::Mutex;

use camera_session_core::models::error::CameraError;

type Task = Box<dyn FnOnce() + Send>;

enum Message {
    Run(Task),
    Stop,
}

/// Handle for queueing work on the callback thread.
#[derive(Clone)]
pub(crate) struct Poster {
    sender: Sender<Message>,
}

impl Poster {
    pub(crate) fn post(&self, task: impl FnOnce() + Send + 'static) {
        if self.sender.send(Message::Run(Box::new(task))).is_err() {
            log::warn!("virtual callback thread gone, dropping callback");
        }
    }
}

pub(crate) struct CallbackThread {
    sender: Sender<Message>,
    handle: Mutex<Option<thread::JoinHandle<()>>>,
}

impl CallbackThread {
    pub(crate) fn spawn(name: &str) -> Result<Self, CameraError> {
        let (sender, receiver) = crossbeam_channel::unbounded();
        let handle = thread::Builder::new()
            .name(name.to_string())
            .spawn(move || run(receiver))
            .map_err(|e| {
                CameraError::DeviceAccess(format!("failed to spawn callback thread: {}", e))
            })?;
        Ok(Self {
            sender,
            handle: Mutex::new(Some(handle)),
        })
    }

    pub(crate) fn poster(&self) -> Poster {
        Poster {
            sender: self.sender.clone(),
        }
    }

    /// Stop after the callbacks already queued and wait for the thread.
    pub(crate) fn stop(&self) {
        let Some(handle) = self.handle.lock().take() else {
            return;
        };
        let _ = self.sender.send(Message::Stop);
        if handle.thread().id() == thread::current().id() {
            return;
        }
        if handle.join().is_err() {
            log::error!("virtual callback thread panicked");
        }
    }
}

impl Drop for CallbackThread {
    fn drop(&mut self) {
        self.stop();
    }
}

fn run(receiver: Receiver<Message>) {
    for message in receiver.iter() {
        match message {
            Message::Run(task) => task(),
            Message::Stop => break,
        }
    }
    log::debug!("virtual callback thread stopped");
}
