//! Server configuration

use contracts::ServerSettings;

/// Runtime configuration of the TCP server
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// `host:port`; port 0 picks a free port
    pub bind_address: String,
    /// Longest accepted request line, newline excluded
    pub max_request_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self::from(&ServerSettings::default())
    }
}

impl From<&ServerSettings> for ServerConfig {
    fn from(settings: &ServerSettings) -> Self {
        Self {
            bind_address: settings.bind_address(),
            max_request_bytes: settings.max_request_bytes,
        }
    }
}

impl ServerConfig {
    /// Loopback on an ephemeral port (tests)
    pub fn ephemeral() -> Self {
        Self {
            bind_address: "127.0.0.1:0".to_string(),
            ..Self::default()
        }
    }
}
