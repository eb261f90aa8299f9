use std::time::{Duration, Instant};

/// A started timing measurement.
///
/// Created by [`trace`] or [`trace_and_increment`] and consumed by `Statistics::end` or
/// `Statistics::buffered_end`, so a trace can only ever be ended once.
#[derive(Debug)]
pub struct Trace {
    identifier: String,
    start: Instant,
    increment_by: i64,
}

impl Trace {
    /// Creates a trace from an already captured start time.
    pub fn new<S: Into<String>>(identifier: S, start: Instant, increment_by: i64) -> Trace {
        Trace {
            identifier: identifier.into(),
            start,
            increment_by,
        }
    }

    pub fn identifier(&self) -> &str { &self.identifier }

    pub fn start(&self) -> Instant { self.start }

    /// Amount the `<identifier>.count` counter is incremented by when the trace ends.
    pub fn increment_by(&self) -> i64 { self.increment_by }

    pub fn elapsed(&self) -> Duration { self.start.elapsed() }

    /// Whole milliseconds since the trace started, truncated.
    pub fn elapsed_ms(&self) -> i64 { self.elapsed().as_millis() as i64 }

    /// Key of the counter incremented when this trace ends.
    pub(crate) fn count_key(&self) -> String { format!("{}.count", self.identifier) }

    pub(crate) fn into_parts(self) -> (String, Instant, i64) { (self.identifier, self.start, self.increment_by) }
}

/// Starts a trace that only emits a timing when ended.
pub fn trace<S: Into<String>>(identifier: S) -> Trace { Trace::new(identifier, Instant::now(), 0) }

/// Starts a trace that emits a timing and bumps `<identifier>.count` by one when ended.
pub fn trace_and_increment<S: Into<String>>(identifier: S) -> Trace { Trace::new(identifier, Instant::now(), 1) }

#[cfg(test)]
mod tests {
    use super::{trace, trace_and_increment, Trace};
    use std::{
        thread,
        time::{Duration, Instant},
    };

    #[test]
    fn test_trace_increment_amounts() {
        let t = trace("db.query");
        assert_eq!(t.identifier(), "db.query");
        assert_eq!(t.increment_by(), 0);
        assert_eq!(t.count_key(), "db.query.count");

        assert_eq!(trace_and_increment("db.query").increment_by(), 1);
    }

    #[test]
    fn test_trace_elapsed_ms() {
        let start = Instant::now() - Duration::from_millis(1500);
        let t = Trace::new("slow", start, 3);
        assert!(t.elapsed_ms() >= 1500);
        assert!(t.elapsed_ms() < 1600);

        let (identifier, stamp, increment_by) = t.into_parts();
        assert_eq!(identifier, "slow");
        assert_eq!(stamp, start);
        assert_eq!(increment_by, 3);
    }

    #[test]
    fn test_trace_measures_wall_clock() {
        let t = trace("sleepy");
        thread::sleep(Duration::from_millis(5));
        assert!(t.elapsed_ms() >= 5);
        assert!(t.start() <= Instant::now());
    }
}
