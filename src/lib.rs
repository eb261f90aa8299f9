//! Buffered statsd emission.
//!
//! `hotstat` sends counters, gauges and timings to a statsd collector over UDP, fire-and-forget.
//! Counters can be sent straight through, or buffered: buffered increments are summed locally per
//! key and only emitted once a key's pending total reaches the flush threshold, or when the
//! background flush thread sweeps all pending keys, once per flush interval.
//!
//! ```no_run
//! use hotstat::{trace_and_increment, Configuration, Statser};
//! use std::time::Duration;
//!
//! let stats = Configuration::new()
//!     .address("127.0.0.1:8125")
//!     .prefix("myapp")
//!     .flush_interval(Duration::from_secs(1))
//!     .build()
//!     .expect("failed to create statsd client");
//!
//! let t = trace_and_increment("request");
//! stats.buffered_increment_by("bytes_in", 512).unwrap();
//! stats.gauge("connections", 12).unwrap();
//! stats.end(t).unwrap();
//! ```
mod aggregator;
mod configuration;
mod control;
mod data;
mod error;
mod mock;
mod normalize;
mod scheduler;
mod statistics;
mod trace;
mod transport;

pub use self::{
    aggregator::{Aggregator, Flushed, DEFAULT_FLUSH_THRESHOLD},
    configuration::{Configuration, ADDRESS_VAR, FLUSH_INTERVAL_VAR, PREFIX_VAR},
    control::Controller,
    data::Sample,
    error::{ConfigurationError, ControlError, TransportError},
    mock::{AmountCall, EndCall, IncErrCall, MockStatser},
    normalize::normalize,
    scheduler::ShutdownPolicy,
    statistics::{Statistics, Statser, UNKNOWN_ERROR_SEGMENT},
    trace::{trace, trace_and_increment, Trace},
    transport::{Recorder, Transport, UdpTransport, FULL_SAMPLE_RATE},
};
