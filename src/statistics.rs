use crate::{
    aggregator::{Aggregator, Flushed},
    configuration::Configuration,
    control::Controller,
    error::{ConfigurationError, ControlError, TransportError},
    normalize::normalize,
    scheduler::FlushScheduler,
    trace::Trace,
    transport::{Transport, UdpTransport},
};
use log::debug;
use std::{error::Error, sync::Arc, time::Duration};

/// Path segment used by `inc_err` when the error text normalizes to nothing.
pub const UNKNOWN_ERROR_SEGMENT: &str = "Unknown";

/// The operations a metrics client offers to callers.
///
/// Implemented by [`Statistics`] and, for use in tests, by [`MockStatser`](crate::MockStatser).
pub trait Statser {
    /// Increments `<key>.count` by one.
    fn inc(&self, key: &str) -> Result<(), TransportError>;

    /// Increments `<key>.<NormalizedErrorText>.count` by one.
    ///
    /// Error text without any ASCII letters or digits is recorded as `<key>.Unknown.count`.
    fn inc_err(&self, key: &str, err: &dyn Error) -> Result<(), TransportError>;

    /// Emits a counter delta right away.
    fn increment_by(&self, key: &str, amount: i64) -> Result<(), TransportError>;

    /// Adds to a buffered counter, emitted once it reaches the flush threshold or on the next
    /// periodic flush.
    fn buffered_increment_by(&self, key: &str, amount: i64) -> Result<(), TransportError>;

    fn gauge(&self, key: &str, value: i64) -> Result<(), TransportError>;

    /// Ends a trace, incrementing its counter through the unbuffered path.
    fn end(&self, trace: Trace) -> Result<(), TransportError>;

    /// Ends a trace, incrementing its counter through the buffered path.
    fn buffered_end(&self, trace: Trace) -> Result<(), TransportError>;
}

/// Metrics client with buffered counters.
///
/// Owns the counter aggregator and the background thread that periodically flushes it.  Dropping
/// `Statistics` stops that thread, flushing or discarding pending counters according to the
/// configured `ShutdownPolicy`.
pub struct Statistics<T: Transport + 'static = UdpTransport> {
    aggregator: Arc<Aggregator<T>>,
    scheduler: FlushScheduler,
}

impl Statistics<UdpTransport> {
    /// Creates a `Statistics` configured from `STATSD_ADDRESS` and `STATSD_PREFIX`.
    pub fn from_env() -> Result<Statistics<UdpTransport>, ConfigurationError> { Configuration::from_env()?.build() }
}

impl<T: Transport + 'static> Statistics<T> {
    /// Creates a `Statistics` emitting through `transport` and flushing every `flush_interval`.
    pub fn with_transport(transport: T, flush_interval: Duration) -> Result<Statistics<T>, ConfigurationError> {
        Configuration::new()
            .flush_interval(flush_interval)
            .build_with_transport(transport)
    }

    pub(crate) fn from_config(transport: T, conf: Configuration) -> Result<Statistics<T>, ConfigurationError> {
        let aggregator = Arc::new(Aggregator::with_threshold(transport, conf.flush_threshold));
        let scheduler = FlushScheduler::spawn(aggregator.clone(), conf.flush_interval, conf.shutdown_policy)
            .map_err(ConfigurationError::Scheduler)?;

        Ok(Statistics { aggregator, scheduler })
    }

    /// Reference to the underlying aggregator.
    pub fn aggregator(&self) -> &Aggregator<T> { &self.aggregator }

    /// Reference to the underlying transport.
    pub fn transport(&self) -> &T { self.aggregator.transport() }

    /// Gets a `Controller` for the flush scheduler.
    pub fn controller(&self) -> Controller { self.scheduler.controller().clone() }

    /// Emits a timing, in milliseconds, right away.
    pub fn timing(&self, key: &str, duration_ms: i64) -> Result<(), TransportError> {
        self.aggregator.timing(key, duration_ms)
    }

    /// Flushes every pending buffered counter and waits for the flush to finish.
    pub fn flush(&self) -> Result<Flushed, ControlError> { self.scheduler.controller().flush() }

    /// Stops the flush scheduler, applying the configured shutdown policy.
    pub fn shutdown(mut self) { self.scheduler.stop(); }

    fn finish_trace(&self, trace: Trace, buffered: bool) -> Result<(), TransportError> {
        let elapsed_ms = trace.elapsed_ms();

        let counted = if trace.increment_by() > 0 {
            let key = trace.count_key();
            if buffered {
                self.aggregator.buffered_increment_by(&key, trace.increment_by())
            } else {
                self.aggregator.increment_by(&key, trace.increment_by())
            }
        } else {
            Ok(())
        };

        // The timing goes out even when the count didn't.
        let timed = self.aggregator.timing(trace.identifier(), elapsed_ms);
        if let Err(e) = &timed {
            debug!("failed to emit timing for {:?}: {}", trace.identifier(), e);
        }

        counted.and(timed)
    }
}

impl<T: Transport + 'static> Statser for Statistics<T> {
    fn inc(&self, key: &str) -> Result<(), TransportError> {
        self.aggregator.increment_by(&format!("{}.count", key), 1)
    }

    fn inc_err(&self, key: &str, err: &dyn Error) -> Result<(), TransportError> {
        let mut segment = normalize(&err.to_string());
        if segment.is_empty() {
            segment.push_str(UNKNOWN_ERROR_SEGMENT);
        }
        let key = format!("{}.{}.count", key, segment);
        self.aggregator.increment_by(&key, 1)
    }

    fn increment_by(&self, key: &str, amount: i64) -> Result<(), TransportError> {
        self.aggregator.increment_by(key, amount)
    }

    fn buffered_increment_by(&self, key: &str, amount: i64) -> Result<(), TransportError> {
        self.aggregator.buffered_increment_by(key, amount)
    }

    fn gauge(&self, key: &str, value: i64) -> Result<(), TransportError> { self.aggregator.gauge(key, value) }

    fn end(&self, trace: Trace) -> Result<(), TransportError> { self.finish_trace(trace, false) }

    fn buffered_end(&self, trace: Trace) -> Result<(), TransportError> { self.finish_trace(trace, true) }
}
