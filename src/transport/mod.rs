use crate::error::TransportError;
use std::sync::Arc;

mod recorder;
pub use self::recorder::Recorder;
mod udp;
pub use self::udp::UdpTransport;

/// Sample rate used for every emission made by this crate.
pub const FULL_SAMPLE_RATE: f32 = 1.0;

/// A best-effort sender of individual metric emissions.
///
/// Implementations must not block waiting on the network: every call either hands the metric off
/// or fails immediately.  Keys are passed unprefixed; any prefixing is the transport's concern.
pub trait Transport: Send + Sync {
    /// Emits a counter delta.
    fn increment_by(&self, key: &str, amount: i64, sample_rate: f32) -> Result<(), TransportError>;

    /// Emits a gauge value.
    fn gauge(&self, key: &str, value: i64, sample_rate: f32) -> Result<(), TransportError>;

    /// Emits a timing, in milliseconds.
    fn timing(&self, key: &str, duration_ms: i64, sample_rate: f32) -> Result<(), TransportError>;
}

impl<T: Transport + ?Sized> Transport for Arc<T> {
    fn increment_by(&self, key: &str, amount: i64, sample_rate: f32) -> Result<(), TransportError> {
        (**self).increment_by(key, amount, sample_rate)
    }

    fn gauge(&self, key: &str, value: i64, sample_rate: f32) -> Result<(), TransportError> {
        (**self).gauge(key, value, sample_rate)
    }

    fn timing(&self, key: &str, duration_ms: i64, sample_rate: f32) -> Result<(), TransportError> {
        (**self).timing(key, duration_ms, sample_rate)
    }
}
