use crate::{
    aggregator::DEFAULT_FLUSH_THRESHOLD,
    error::ConfigurationError,
    scheduler::ShutdownPolicy,
    statistics::Statistics,
    transport::{Transport, UdpTransport},
};
use std::{env, time::Duration};

/// Environment variable holding the collector address, e.g. `127.0.0.1:8125`.
pub const ADDRESS_VAR: &str = "STATSD_ADDRESS";
/// Environment variable holding the metric name prefix.
pub const PREFIX_VAR: &str = "STATSD_PREFIX";
/// Optional environment variable overriding the flush interval, in milliseconds.
pub const FLUSH_INTERVAL_VAR: &str = "STATSD_FLUSH_INTERVAL_MS";

/// A configuration builder for `Statistics`.
#[derive(Clone, Debug)]
pub struct Configuration {
    pub(crate) address: Option<String>,
    pub(crate) prefix: Option<String>,
    pub(crate) flush_interval: Duration,
    pub(crate) flush_threshold: i64,
    pub(crate) shutdown_policy: ShutdownPolicy,
}

impl Default for Configuration {
    fn default() -> Configuration {
        Configuration {
            address: None,
            prefix: None,
            flush_interval: Duration::from_secs(1),
            flush_threshold: DEFAULT_FLUSH_THRESHOLD,
            shutdown_policy: ShutdownPolicy::default(),
        }
    }
}

impl Configuration {
    /// Creates a new `Configuration` with default values.
    pub fn new() -> Configuration { Default::default() }

    /// Creates a `Configuration` from the process environment.
    ///
    /// `STATSD_ADDRESS` and `STATSD_PREFIX` are required, and an empty value counts as missing.
    /// `STATSD_FLUSH_INTERVAL_MS` is optional.
    pub fn from_env() -> Result<Configuration, ConfigurationError> {
        Configuration::from_lookup(|name| env::var(name).ok())
    }

    /// Creates a `Configuration` from an arbitrary variable lookup.
    ///
    /// Behaves exactly like `from_env`, but reads variables through `lookup`.
    pub fn from_lookup<F>(lookup: F) -> Result<Configuration, ConfigurationError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |name: &'static str| {
            lookup(name)
                .filter(|value| !value.is_empty())
                .ok_or(ConfigurationError::MissingVariable(name))
        };

        let address = required(ADDRESS_VAR)?;
        let prefix = required(PREFIX_VAR)?;

        let mut conf = Configuration::new().address(address).prefix(prefix);
        if let Some(raw) = lookup(FLUSH_INTERVAL_VAR) {
            let millis = raw
                .trim()
                .parse::<u64>()
                .map_err(|_| ConfigurationError::InvalidVariable {
                    name: FLUSH_INTERVAL_VAR,
                    value: raw.clone(),
                })?;
            conf = conf.flush_interval(Duration::from_millis(millis));
        }

        Ok(conf)
    }

    /// Sets the collector address.
    ///
    /// Anything that resolves as a socket address works, such as `127.0.0.1:8125` or
    /// `statsd.local:8125`.
    pub fn address<S: Into<String>>(mut self, address: S) -> Self {
        self.address = Some(address.into());
        self
    }

    /// Sets the prefix prepended, with a `.`, to every metric key.
    pub fn prefix<S: Into<String>>(mut self, prefix: S) -> Self {
        self.prefix = Some(prefix.into());
        self
    }

    /// Sets the flush interval.
    ///
    /// Defaults to `1s`.
    ///
    /// Every interval, all buffered counters with a positive pending total are flushed, whether or
    /// not they reached the flush threshold.  Must be greater than zero.
    pub fn flush_interval(mut self, flush_interval: Duration) -> Self {
        self.flush_interval = flush_interval;
        self
    }

    /// Sets the flush threshold.
    ///
    /// Defaults to `100`.
    ///
    /// A buffered counter whose pending total reaches this value is flushed immediately, carrying
    /// the entire pending total.  A threshold of `1` or less effectively disables buffering for
    /// positive increments.
    pub fn flush_threshold(mut self, flush_threshold: i64) -> Self {
        self.flush_threshold = flush_threshold;
        self
    }

    /// Sets what happens to pending counters when `Statistics` is shut down or dropped.
    ///
    /// Defaults to `ShutdownPolicy::Flush`.
    pub fn shutdown_policy(mut self, shutdown_policy: ShutdownPolicy) -> Self {
        self.shutdown_policy = shutdown_policy;
        self
    }

    /// Creates a `Statistics` sending to the configured collector over UDP.
    pub fn build(self) -> Result<Statistics<UdpTransport>, ConfigurationError> {
        let address = self.address.clone().ok_or(ConfigurationError::MissingAddress)?;
        let prefix = self.prefix.clone().ok_or(ConfigurationError::MissingPrefix)?;
        let transport = UdpTransport::connect(address.as_str(), &prefix)
            .map_err(|source| ConfigurationError::InvalidAddress { address, source })?;

        self.build_with_transport(transport)
    }

    /// Creates a `Statistics` emitting through the given transport.
    ///
    /// The configured address and prefix are ignored; the transport is expected to be ready.
    pub fn build_with_transport<T>(self, transport: T) -> Result<Statistics<T>, ConfigurationError>
    where
        T: Transport + 'static,
    {
        if self.flush_interval == Duration::from_secs(0) {
            return Err(ConfigurationError::InvalidFlushInterval);
        }

        Statistics::from_config(transport, self)
    }
}
