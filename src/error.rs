use std::io;
use thiserror::Error;

/// Errors raised while building a `Statistics` instance.
#[derive(Debug, Error)]
pub enum ConfigurationError {
    /// A required environment variable was missing or empty.
    #[error("environment variable {0} not defined, cannot continue")]
    MissingVariable(&'static str),

    /// An environment variable was present but could not be parsed.
    #[error("environment variable {name} has invalid value {value:?}")]
    InvalidVariable { name: &'static str, value: String },

    #[error("no collector address configured")]
    MissingAddress,

    #[error("no metric prefix configured")]
    MissingPrefix,

    #[error("flush interval must be greater than zero")]
    InvalidFlushInterval,

    /// The collector address could not be resolved, or no socket could be opened towards it.
    #[error("couldn't initialize statsd for {address:?}: {source}")]
    InvalidAddress {
        address: String,
        #[source]
        source: io::Error,
    },

    #[error("failed to start flush scheduler: {0}")]
    Scheduler(#[source] io::Error),
}

/// Errors raised by a transport while emitting a metric.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("failed to send metric: {0}")]
    Io(#[from] io::Error),

    /// The socket accepted fewer bytes than the datagram held.
    #[error("metric datagram truncated: sent {sent} of {expected} bytes")]
    Truncated { sent: usize, expected: usize },
}

/// Errors raised when talking to the flush scheduler through a `Controller`.
#[derive(Debug, Error)]
pub enum ControlError {
    #[error("flush scheduler is not running")]
    SchedulerStopped,
}
