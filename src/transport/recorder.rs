use super::Transport;
use crate::{data::Sample, error::TransportError};
use parking_lot::Mutex;
use std::{
    io,
    sync::atomic::{AtomicBool, Ordering},
};

/// In-memory transport that records every emission.
///
/// Useful for asserting on what would have gone over the wire.  It can be switched into a failing
/// mode, where every send returns an error and nothing is recorded.
#[derive(Default)]
pub struct Recorder {
    samples: Mutex<Vec<Sample<String>>>,
    failing: AtomicBool,
}

impl Recorder {
    pub fn new() -> Recorder { Recorder::default() }

    /// Makes every subsequent send fail, or succeed again.
    pub fn set_failing(&self, failing: bool) { self.failing.store(failing, Ordering::Release); }

    /// Gets a copy of every sample recorded so far.
    pub fn samples(&self) -> Vec<Sample<String>> { self.samples.lock().clone() }

    /// Number of samples recorded so far.
    pub fn len(&self) -> usize { self.samples.lock().len() }

    pub fn is_empty(&self) -> bool { self.samples.lock().is_empty() }

    /// Removes and returns every sample recorded so far.
    pub fn take(&self) -> Vec<Sample<String>> { std::mem::take(&mut *self.samples.lock()) }

    /// Sum of all counter deltas recorded for `key`.
    pub fn count_total(&self, key: &str) -> i64 {
        self.samples
            .lock()
            .iter()
            .filter_map(|s| match s {
                Sample::Count(k, v) if k == key => Some(*v),
                _ => None,
            })
            .sum()
    }

    fn record(&self, sample: Sample<&str>) -> Result<(), TransportError> {
        if self.failing.load(Ordering::Acquire) {
            return Err(io::Error::new(io::ErrorKind::Other, "recorder set to fail").into());
        }

        self.samples.lock().push(sample.into_owned());
        Ok(())
    }
}

impl Transport for Recorder {
    fn increment_by(&self, key: &str, amount: i64, _sample_rate: f32) -> Result<(), TransportError> {
        self.record(Sample::Count(key, amount))
    }

    fn gauge(&self, key: &str, value: i64, _sample_rate: f32) -> Result<(), TransportError> {
        self.record(Sample::Gauge(key, value))
    }

    fn timing(&self, key: &str, duration_ms: i64, _sample_rate: f32) -> Result<(), TransportError> {
        self.record(Sample::Timing(key, duration_ms))
    }
}
