use std::fmt::{self, Display};

pub mod counter;

pub(crate) use self::counter::Counter;

/// A single metric emission.
///
/// Samples are what a `Transport` puts on the wire, one datagram per sample.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Sample<K> {
    /// A counter delta.
    ///
    /// The collector adds the value to its running counter, so negative deltas decrease it.
    Count(K, i64),

    /// A single value, also known as a gauge.
    ///
    /// Values operate in last-write-wins mode on the collector.
    Gauge(K, i64),

    /// A timed sample, in milliseconds.
    Timing(K, i64),
}

impl<K> Sample<K> {
    /// Gets the metric key of this sample.
    pub fn key(&self) -> &K {
        match self {
            Sample::Count(key, _) | Sample::Gauge(key, _) | Sample::Timing(key, _) => key,
        }
    }

    /// Gets the value carried by this sample.
    pub fn value(&self) -> i64 {
        match self {
            Sample::Count(_, value) | Sample::Gauge(_, value) | Sample::Timing(_, value) => *value,
        }
    }

    fn kind(&self) -> &'static str {
        match self {
            Sample::Count(..) => "c",
            Sample::Gauge(..) => "g",
            Sample::Timing(..) => "ms",
        }
    }

    /// Converts the key of this sample into an owned one.
    pub fn into_owned(self) -> Sample<String>
    where
        K: Display,
    {
        match self {
            Sample::Count(key, value) => Sample::Count(key.to_string(), value),
            Sample::Gauge(key, value) => Sample::Gauge(key.to_string(), value),
            Sample::Timing(key, value) => Sample::Timing(key.to_string(), value),
        }
    }
}

impl<K: Display> Sample<K> {
    /// Renders this sample as a statsd line.
    ///
    /// The prefix and key are joined with a `.`, unless the prefix is empty.  The sample rate is
    /// only written out when it is below `1.0`.
    pub fn render(&self, prefix: &str, sample_rate: f32) -> String {
        let mut line = String::with_capacity(prefix.len() + 32);
        let _ = self.write_line(&mut line, prefix, sample_rate);
        line
    }

    fn write_line<W: fmt::Write>(&self, w: &mut W, prefix: &str, sample_rate: f32) -> fmt::Result {
        if !prefix.is_empty() {
            write!(w, "{}.", prefix)?;
        }
        write!(w, "{}:{}|{}", self.key(), self.value(), self.kind())?;
        if sample_rate < 1.0 {
            write!(w, "|@{}", sample_rate)?;
        }
        Ok(())
    }
}

impl<K: Display> Display for Sample<K> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result { self.write_line(f, "", 1.0) }
}
