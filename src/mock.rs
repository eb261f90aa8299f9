use crate::{error::TransportError, statistics::Statser, trace::Trace};
use parking_lot::Mutex;
use std::{error::Error, time::Instant};

/// A recorded call to `inc_err`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IncErrCall {
    pub key: String,
    /// The error's `Display` text, as given, before normalization.
    pub error: String,
}

/// A recorded call to `increment_by`, `buffered_increment_by` or `gauge`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AmountCall {
    pub key: String,
    pub amount: i64,
}

/// A recorded call to `end` or `buffered_end`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EndCall {
    pub identifier: String,
    pub start: Instant,
    pub increment_by: i64,
}

#[derive(Default)]
struct Calls {
    inc: Vec<String>,
    inc_err: Vec<IncErrCall>,
    end: Vec<EndCall>,
    buffered_end: Vec<EndCall>,
    increment_by: Vec<AmountCall>,
    buffered_increment_by: Vec<AmountCall>,
    gauge: Vec<AmountCall>,
}

/// A `Statser` that records every call instead of emitting anything.
///
/// Hand it to code under test in place of `Statistics`, then assert on what was recorded.  Every
/// operation succeeds.
///
/// ```
/// use hotstat::{MockStatser, Statser};
///
/// let stats = MockStatser::new();
/// stats.inc("some stat").unwrap();
/// assert_eq!(stats.calls_to_inc(), vec!["some stat".to_owned()]);
/// ```
#[derive(Default)]
pub struct MockStatser {
    calls: Mutex<Calls>,
}

impl MockStatser {
    pub fn new() -> MockStatser { MockStatser::default() }

    pub fn calls_to_inc(&self) -> Vec<String> { self.calls.lock().inc.clone() }

    pub fn calls_to_inc_err(&self) -> Vec<IncErrCall> { self.calls.lock().inc_err.clone() }

    pub fn calls_to_end(&self) -> Vec<EndCall> { self.calls.lock().end.clone() }

    pub fn calls_to_buffered_end(&self) -> Vec<EndCall> { self.calls.lock().buffered_end.clone() }

    pub fn calls_to_increment_by(&self) -> Vec<AmountCall> { self.calls.lock().increment_by.clone() }

    pub fn calls_to_buffered_increment_by(&self) -> Vec<AmountCall> {
        self.calls.lock().buffered_increment_by.clone()
    }

    pub fn calls_to_gauge(&self) -> Vec<AmountCall> { self.calls.lock().gauge.clone() }

    /// Forgets every recorded call.
    pub fn reset(&self) { *self.calls.lock() = Calls::default(); }
}

fn amount_call(key: &str, amount: i64) -> AmountCall {
    AmountCall {
        key: key.to_owned(),
        amount,
    }
}

fn end_call(trace: Trace) -> EndCall {
    let (identifier, start, increment_by) = trace.into_parts();
    EndCall {
        identifier,
        start,
        increment_by,
    }
}

impl Statser for MockStatser {
    fn inc(&self, key: &str) -> Result<(), TransportError> {
        self.calls.lock().inc.push(key.to_owned());
        Ok(())
    }

    fn inc_err(&self, key: &str, err: &dyn Error) -> Result<(), TransportError> {
        self.calls.lock().inc_err.push(IncErrCall {
            key: key.to_owned(),
            error: err.to_string(),
        });
        Ok(())
    }

    fn increment_by(&self, key: &str, amount: i64) -> Result<(), TransportError> {
        self.calls.lock().increment_by.push(amount_call(key, amount));
        Ok(())
    }

    fn buffered_increment_by(&self, key: &str, amount: i64) -> Result<(), TransportError> {
        self.calls.lock().buffered_increment_by.push(amount_call(key, amount));
        Ok(())
    }

    fn gauge(&self, key: &str, value: i64) -> Result<(), TransportError> {
        self.calls.lock().gauge.push(amount_call(key, value));
        Ok(())
    }

    fn end(&self, trace: Trace) -> Result<(), TransportError> {
        self.calls.lock().end.push(end_call(trace));
        Ok(())
    }

    fn buffered_end(&self, trace: Trace) -> Result<(), TransportError> {
        self.calls.lock().buffered_end.push(end_call(trace));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{AmountCall, MockStatser};
    use crate::{statistics::Statser, trace::Trace};
    use std::{io, sync::Arc, thread, time::Instant};

    #[test]
    fn test_mock_records_inc() {
        let stats = MockStatser::new();
        stats.inc("testing inc").unwrap();
        assert_eq!(stats.calls_to_inc(), vec!["testing inc".to_owned()]);
    }

    #[test]
    fn test_mock_records_inc_err() {
        let stats = MockStatser::new();
        let err = io::Error::new(io::ErrorKind::Other, "this is an error to test things out");
        stats.inc_err("incing error", &err).unwrap();

        let calls = stats.calls_to_inc_err();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].key, "incing error");
        assert_eq!(calls[0].error, "this is an error to test things out");
    }

    #[test]
    fn test_mock_records_ends() {
        let stats = MockStatser::new();
        let start = Instant::now();
        stats.end(Trace::new("calling end", start, 5)).unwrap();
        stats.buffered_end(Trace::new("calling buffered end", start, 5)).unwrap();

        let ends = stats.calls_to_end();
        assert_eq!(ends.len(), 1);
        assert_eq!(ends[0].identifier, "calling end");
        assert_eq!(ends[0].start, start);
        assert_eq!(ends[0].increment_by, 5);

        let buffered = stats.calls_to_buffered_end();
        assert_eq!(buffered.len(), 1);
        assert_eq!(buffered[0].identifier, "calling buffered end");
    }

    #[test]
    fn test_mock_records_amounts() {
        let stats = MockStatser::new();
        stats.increment_by("some stat", 20).unwrap();
        stats.buffered_increment_by("some stat", 20).unwrap();
        stats.gauge("some stat", 38).unwrap();

        let expected = |amount| {
            vec![AmountCall {
                key: "some stat".to_owned(),
                amount,
            }]
        };
        assert_eq!(stats.calls_to_increment_by(), expected(20));
        assert_eq!(stats.calls_to_buffered_increment_by(), expected(20));
        assert_eq!(stats.calls_to_gauge(), expected(38));

        stats.reset();
        assert!(stats.calls_to_gauge().is_empty());
    }

    #[test]
    fn test_mock_is_shareable() {
        let stats = Arc::new(MockStatser::new());
        let handles = (0..4)
            .map(|_| {
                let stats = stats.clone();
                thread::spawn(move || {
                    for _ in 0..100 {
                        stats.inc("shared").unwrap();
                    }
                })
            })
            .collect::<Vec<_>>();
        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(stats.calls_to_inc().len(), 400);
    }
}
