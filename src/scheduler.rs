use crate::{
    aggregator::{Aggregator, Flushed},
    control::{ControlMessage, Controller},
    transport::Transport,
};
use crossbeam_channel::{bounded, select, tick, Receiver};
use log::{debug, error, info};
use std::{
    io,
    sync::Arc,
    thread::{self, JoinHandle},
    time::Duration,
};

/// What the scheduler does with pending counters when it stops.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ShutdownPolicy {
    /// Run one last sweep before exiting.
    Flush,
    /// Exit immediately, dropping whatever is still pending.
    Discard,
}

impl Default for ShutdownPolicy {
    fn default() -> ShutdownPolicy { ShutdownPolicy::Flush }
}

/// Background thread sweeping an aggregator on a fixed period.
///
/// Dropping the scheduler stops the thread and waits for it to exit.
pub(crate) struct FlushScheduler {
    controller: Controller,
    handle: Option<JoinHandle<()>>,
    policy: ShutdownPolicy,
    final_sweep: Box<dyn Fn() -> Flushed + Send + Sync>,
}

impl FlushScheduler {
    pub(crate) fn spawn<T>(
        aggregator: Arc<Aggregator<T>>, period: Duration, policy: ShutdownPolicy,
    ) -> io::Result<FlushScheduler>
    where
        T: Transport + 'static,
    {
        let (control_tx, control_rx) = bounded(1024);
        let swept = aggregator.clone();
        let final_sweep = Box::new(move || sweep(&swept));
        let handle = thread::Builder::new()
            .name("hotstat-flush".to_owned())
            .spawn(move || run(&aggregator, period, policy, control_rx))?;

        Ok(FlushScheduler {
            controller: Controller::new(control_tx),
            handle: Some(handle),
            policy,
            final_sweep,
        })
    }

    pub(crate) fn controller(&self) -> &Controller { &self.controller }

    /// Stops the scheduler thread and waits for it to exit.
    ///
    /// Under `ShutdownPolicy::Flush`, anything buffered after the loop exited, e.g. because a
    /// `Controller` shut it down early, is swept here.
    pub(crate) fn stop(&mut self) {
        if let Some(handle) = self.handle.take() {
            // Fails only if the loop already exited.
            let _ = self.controller.shutdown();
            if handle.join().is_err() {
                error!("flush scheduler thread panicked");
            }
            if self.policy == ShutdownPolicy::Flush {
                (self.final_sweep)();
            }
        }
    }
}

impl Drop for FlushScheduler {
    fn drop(&mut self) { self.stop(); }
}

fn sweep<T: Transport>(aggregator: &Aggregator<T>) -> Flushed {
    let flushed = aggregator.flush_all();
    if !flushed.is_empty() {
        debug!("flushed {} counters, {} failed", flushed.keys, flushed.failures);
    }
    flushed
}

fn run<T: Transport>(
    aggregator: &Aggregator<T>, period: Duration, policy: ShutdownPolicy, control_rx: Receiver<ControlMessage>,
) {
    info!("flush scheduler started, sweeping every {:?}", period);

    let ticker = tick(period);
    loop {
        let stop = select! {
            recv(ticker) -> _ => {
                sweep(aggregator);
                false
            },
            recv(control_rx) -> msg => match msg {
                Ok(ControlMessage::Flush(reply)) => {
                    let _ = reply.send(sweep(aggregator));
                    false
                },
                Ok(ControlMessage::Shutdown) | Err(_) => true,
            },
        };
        if stop {
            break;
        }
    }

    if policy == ShutdownPolicy::Flush {
        sweep(aggregator);
    }
    info!("flush scheduler stopped");
}
