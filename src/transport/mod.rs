//! Framed packet connections over byte streams.
//!
//! [`stream::Connection`] is the async realization over any
//! `AsyncRead + AsyncWrite` stream; [`blocking::Connection`] mirrors the
//! same surface over `std::io` streams. Both share [`ConnectionConfig`].

use std::time::Duration;

pub mod blocking;
pub mod stream;

pub use stream::Connection;

/// Configuration for a packet connection.
#[derive(Debug, Clone)]
pub struct ConnectionConfig {
    /// Timeout for establishing the TCP connection.
    pub connect_timeout: Duration,
    /// Deadline for reading one whole packet; `None` waits indefinitely.
    pub read_timeout: Option<Duration>,
    /// Deadline for writing one whole packet; `None` waits indefinitely.
    pub write_timeout: Option<Duration>,
}

impl Default for ConnectionConfig {
    /// Construct a [`ConnectionConfig`] populated with the library's default values.
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(10),
            read_timeout: Some(Duration::from_secs(30)),
            write_timeout: Some(Duration::from_secs(30)),
        }
    }
}

impl From<ConnectionConfigBuilder> for ConnectionConfig {
    fn from(builder: ConnectionConfigBuilder) -> Self {
        builder.build()
    }
}

impl ConnectionConfig {
    /// Creates a new [`ConnectionConfig`] with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a builder for [`ConnectionConfig`].
    pub fn builder() -> ConnectionConfigBuilder {
        ConnectionConfigBuilder::default()
    }
}

/// Configuration builder for packet connections.
#[derive(Debug, Clone, Default)]
pub struct ConnectionConfigBuilder {
    connect_timeout: Option<Duration>,
    read_timeout: Option<Option<Duration>>,
    write_timeout: Option<Option<Duration>>,
}

impl ConnectionConfigBuilder {
    /// Creates a new [`ConnectionConfigBuilder`] with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the timeout for establishing the TCP connection.
    #[must_use]
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = Some(timeout);
        self
    }

    /// Set the per-packet read deadline; `None` waits indefinitely.
    #[must_use]
    pub fn read_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.read_timeout = Some(timeout);
        self
    }

    /// Set the per-packet write deadline; `None` waits indefinitely.
    #[must_use]
    pub fn write_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.write_timeout = Some(timeout);
        self
    }

    /// Finalize the configuration.
    pub fn build(self) -> ConnectionConfig {
        let defaults = ConnectionConfig::default();
        ConnectionConfig {
            connect_timeout: self.connect_timeout.unwrap_or(defaults.connect_timeout),
            read_timeout: self.read_timeout.unwrap_or(defaults.read_timeout),
            write_timeout: self.write_timeout.unwrap_or(defaults.write_timeout),
        }
    }
}
