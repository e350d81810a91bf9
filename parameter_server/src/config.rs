use std::time::Duration;

/// Runtime bounds of a `ParameterServer`.
#[derive(Debug, Clone, Copy)]
pub struct ServerConfig {
    recv_timeout: Duration,
}

impl ServerConfig {
    /// Creates a new server configuration.
    ///
    /// # Arguments
    /// * `recv_timeout` - How long a single wait on the upload channel may last.
    ///
    /// # Returns
    /// A `ServerConfig` instance.
    pub fn new(recv_timeout: Duration) -> Self {
        Self { recv_timeout }
    }

    pub fn recv_timeout(&self) -> Duration {
        self.recv_timeout
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self::new(Duration::from_secs(1))
    }
}
