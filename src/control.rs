use crate::{aggregator::Flushed, error::ControlError};
use crossbeam_channel::{bounded, Sender};

pub(crate) enum ControlMessage {
    Flush(Sender<Flushed>),
    Shutdown,
}

/// Handle for driving the flush scheduler from outside its thread.
///
/// `Controller` is cloneable, and every clone talks to the same scheduler.
#[derive(Clone)]
pub struct Controller {
    control_tx: Sender<ControlMessage>,
}

impl Controller {
    pub(crate) fn new(control_tx: Sender<ControlMessage>) -> Controller { Controller { control_tx } }

    /// Runs a sweep on the scheduler thread and waits for it to finish.
    pub fn flush(&self) -> Result<Flushed, ControlError> {
        let (tx, rx) = bounded(1);
        self.control_tx
            .send(ControlMessage::Flush(tx))
            .map_err(|_| ControlError::SchedulerStopped)?;
        rx.recv().map_err(|_| ControlError::SchedulerStopped)
    }

    /// Asks the scheduler to stop.
    ///
    /// Returns without waiting for the scheduler thread to exit.  Counters buffered after the
    /// scheduler stopped are still swept when `Statistics` is dropped under `ShutdownPolicy::Flush`.
    pub fn shutdown(&self) -> Result<(), ControlError> {
        self.control_tx
            .send(ControlMessage::Shutdown)
            .map_err(|_| ControlError::SchedulerStopped)
    }
}
