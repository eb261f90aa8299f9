use crate::{
    data::Counter,
    error::TransportError,
    transport::{Transport, FULL_SAMPLE_RATE},
};
use log::warn;
use parking_lot::Mutex;

/// Pending total at which a buffered counter is flushed immediately.
pub const DEFAULT_FLUSH_THRESHOLD: i64 = 100;

/// Outcome of a sweep over all pending counters.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Flushed {
    /// Number of keys that had a positive pending total and were emitted.
    pub keys: usize,
    /// Number of those emissions the transport rejected.
    pub failures: usize,
}

impl Flushed {
    pub fn is_empty(&self) -> bool { self.keys == 0 }
}

/// Buffers counter increments and forwards them to a transport in bulk.
///
/// Every mutation of the pending totals happens under a single lock, so a key is never read and
/// cleared by two flushers at once and no increment is lost between the read and the clear.  The
/// transport is always called after the lock is released, so a slow send never holds up
/// increments to other keys.
pub struct Aggregator<T> {
    pending: Mutex<Counter>,
    transport: T,
    threshold: i64,
}

impl<T: Transport> Aggregator<T> {
    pub fn new(transport: T) -> Aggregator<T> { Aggregator::with_threshold(transport, DEFAULT_FLUSH_THRESHOLD) }

    pub fn with_threshold(transport: T, threshold: i64) -> Aggregator<T> {
        Aggregator {
            pending: Mutex::new(Counter::new()),
            transport,
            threshold,
        }
    }

    pub fn transport(&self) -> &T { &self.transport }

    pub fn threshold(&self) -> i64 { self.threshold }

    /// Adds `amount` to the pending total for `key`.
    ///
    /// If the pending total reaches the flush threshold, the entire total is emitted as a single
    /// counter delta and the pending total goes back to zero.  Returns the transport's error if
    /// that emission failed; the flushed amount is not restored in that case.
    pub fn buffered_increment_by(&self, key: &str, amount: i64) -> Result<(), TransportError> {
        let flushed = self.pending.lock().update_and_take(key, amount, self.threshold);
        match flushed {
            Some(total) => self.transport.increment_by(key, total, FULL_SAMPLE_RATE),
            None => Ok(()),
        }
    }

    /// Emits and clears every strictly positive pending total.
    ///
    /// A key the transport fails to emit is logged and skipped; the rest of the sweep carries on.
    pub fn flush_all(&self) -> Flushed {
        let drained = self.pending.lock().drain_positive();

        let mut flushed = Flushed {
            keys: drained.len(),
            failures: 0,
        };
        for (key, total) in drained {
            if let Err(e) = self.transport.increment_by(&key, total, FULL_SAMPLE_RATE) {
                warn!("failed to flush {} for counter {:?}: {}", total, key, e);
                flushed.failures += 1;
            }
        }
        flushed
    }

    /// Emits a counter delta right away, bypassing the buffer.
    pub fn increment_by(&self, key: &str, amount: i64) -> Result<(), TransportError> {
        self.transport.increment_by(key, amount, FULL_SAMPLE_RATE)
    }

    pub fn gauge(&self, key: &str, value: i64) -> Result<(), TransportError> {
        self.transport.gauge(key, value, FULL_SAMPLE_RATE)
    }

    pub fn timing(&self, key: &str, duration_ms: i64) -> Result<(), TransportError> {
        self.transport.timing(key, duration_ms, FULL_SAMPLE_RATE)
    }

    /// Current pending total for `key`.
    pub fn pending(&self, key: &str) -> i64 { self.pending.lock().value(key) }

    /// Number of distinct keys ever buffered.
    pub fn tracked_keys(&self) -> usize { self.pending.lock().len() }
}

#[cfg(test)]
mod tests {
    use super::{Aggregator, Flushed};
    use crate::{data::Sample, transport::Recorder};
    use std::{sync::Arc, thread};

    fn count(key: &str, value: i64) -> Sample<String> { Sample::Count(key.to_owned(), value) }

    #[test]
    fn test_buffered_flushes_at_threshold() {
        let agg = Aggregator::new(Recorder::new());
        for _ in 0..4 {
            agg.buffered_increment_by("S", 20).unwrap();
        }
        assert!(agg.transport().samples().is_empty());
        assert_eq!(agg.pending("S"), 80);

        agg.buffered_increment_by("S", 20).unwrap();
        assert_eq!(agg.transport().take(), vec![count("S", 100)]);
        assert_eq!(agg.pending("S"), 0);
    }

    #[test]
    fn test_buffered_flushes_whole_total_past_threshold() {
        let agg = Aggregator::new(Recorder::new());
        for _ in 0..6 {
            agg.buffered_increment_by("S", 19).unwrap();
        }
        assert_eq!(agg.transport().take(), vec![count("S", 114)]);
        assert_eq!(agg.pending("S"), 0);
    }

    #[test]
    fn test_buffered_keys_are_independent() {
        let agg = Aggregator::new(Recorder::new());
        for _ in 0..4 {
            agg.buffered_increment_by("A", 20).unwrap();
            agg.buffered_increment_by("B", 20).unwrap();
        }
        agg.buffered_increment_by("A", 20).unwrap();
        assert_eq!(agg.transport().take(), vec![count("A", 100)]);
        assert_eq!(agg.pending("B"), 80);

        agg.buffered_increment_by("B", 20).unwrap();
        assert_eq!(agg.transport().take(), vec![count("B", 100)]);
    }

    #[test]
    fn test_custom_threshold() {
        let agg = Aggregator::with_threshold(Recorder::new(), 3);
        assert_eq!(agg.threshold(), 3);
        agg.buffered_increment_by("S", 1).unwrap();
        agg.buffered_increment_by("S", 1).unwrap();
        agg.buffered_increment_by("S", 1).unwrap();
        assert_eq!(agg.transport().take(), vec![count("S", 3)]);
    }

    #[test]
    fn test_flush_all_skips_empty_keys() {
        let agg = Aggregator::new(Recorder::new());
        for _ in 0..5 {
            agg.buffered_increment_by("S", 19).unwrap();
        }
        agg.buffered_increment_by("zero", 0).unwrap();
        agg.buffered_increment_by("negative", -5).unwrap();

        assert_eq!(agg.flush_all(), Flushed { keys: 1, failures: 0 });
        assert_eq!(agg.transport().take(), vec![count("S", 95)]);

        // Nothing pending, so nothing is emitted on the next sweep.
        assert!(agg.flush_all().is_empty());
        assert!(agg.transport().samples().is_empty());
        assert_eq!(agg.pending("negative"), -5);
        assert_eq!(agg.tracked_keys(), 3);
    }

    #[test]
    fn test_flush_all_continues_past_failures() {
        let _ = env_logger::try_init();
        let agg = Aggregator::new(Recorder::new());
        agg.buffered_increment_by("a", 1).unwrap();
        agg.buffered_increment_by("b", 2).unwrap();

        agg.transport().set_failing(true);
        assert_eq!(agg.flush_all(), Flushed { keys: 2, failures: 2 });

        // Failed emissions are dropped, not re-buffered.
        agg.transport().set_failing(false);
        assert!(agg.flush_all().is_empty());
        assert_eq!(agg.pending("a"), 0);
        assert_eq!(agg.pending("b"), 0);
    }

    #[test]
    fn test_threshold_flush_returns_transport_error() {
        let agg = Aggregator::with_threshold(Recorder::new(), 10);
        agg.transport().set_failing(true);
        assert!(agg.buffered_increment_by("S", 5).is_ok());
        assert!(agg.buffered_increment_by("S", 5).is_err());
        assert_eq!(agg.pending("S"), 0);
    }

    #[test]
    fn test_unbuffered_paths_emit_every_call() {
        let agg = Aggregator::new(Recorder::new());
        agg.increment_by("S", 20).unwrap();
        agg.increment_by("S", 20).unwrap();
        agg.gauge("G", 38).unwrap();
        agg.gauge("G", 38).unwrap();
        agg.timing("T", 12).unwrap();

        assert_eq!(
            agg.transport().take(),
            vec![
                count("S", 20),
                count("S", 20),
                Sample::Gauge("G".to_owned(), 38),
                Sample::Gauge("G".to_owned(), 38),
                Sample::Timing("T".to_owned(), 12),
            ]
        );
        assert_eq!(agg.pending("S"), 0);
    }

    #[test]
    fn test_concurrent_increments_are_never_lost() {
        let agg = Arc::new(Aggregator::new(Recorder::new()));
        let threads = 8;
        let per_thread = 1_000;

        let handles = (0..threads)
            .map(|i| {
                let agg = agg.clone();
                thread::spawn(move || {
                    for n in 0..per_thread {
                        let key = if (i + n) % 2 == 0 { "even" } else { "odd" };
                        agg.buffered_increment_by(key, 3).unwrap();
                        if n % 250 == 0 {
                            agg.flush_all();
                        }
                    }
                })
            })
            .collect::<Vec<_>>();
        for handle in handles {
            handle.join().unwrap();
        }

        let recorder = agg.transport();
        let emitted = recorder.count_total("even") + recorder.count_total("odd");
        let pending = agg.pending("even") + agg.pending("odd");
        assert_eq!(emitted + pending, threads * per_thread * 3);

        agg.flush_all();
        assert_eq!(
            recorder.count_total("even") + recorder.count_total("odd"),
            threads * per_thread * 3
        );
    }
}
