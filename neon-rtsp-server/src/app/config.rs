use std::fmt;
use std::path::Path;

use serde::Deserialize;

use config::{Config, ConfigError};

use crate::net::connection::ConnectionOptions;
use crate::session::MalformedPolicy;

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub server: Server,
    #[serde(default)]
    pub streams: Vec<Stream>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Server {
    pub host: String,
    pub port: u16,
    #[serde(default = "Server::default_max_request_size")]
    pub max_request_size: usize,
    #[serde(default)]
    pub malformed: MalformedPolicy,
}

impl Server {
    fn default_max_request_size() -> usize {
        ConnectionOptions::default().max_request_size
    }

    pub fn connection_options(&self) -> ConnectionOptions {
        ConnectionOptions {
            max_request_size: self.max_request_size,
            ..ConnectionOptions::default()
        }
    }
}

/// Path a client may `SETUP`.
#[derive(Debug, Clone, Deserialize)]
pub struct Stream {
    pub name: String,
    pub path: String,
}

impl fmt::Display for Stream {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.path)
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: Server {
                host: "127.0.0.1".to_string(),
                port: 554,
                max_request_size: Server::default_max_request_size(),
                malformed: MalformedPolicy::default(),
            },
            streams: Vec::new(),
        }
    }
}

impl AppConfig {
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        Config::builder()
            .add_source(config::File::from(path))
            .add_source(config::Environment::with_prefix("neon"))
            .build()?
            .try_deserialize()
    }
}

#[cfg(test)]
mod tests {

    use config::{Config, FileFormat};

    use crate::session::MalformedPolicy;

    use super::AppConfig;

    fn parse(yaml: &str) -> AppConfig {
        Config::builder()
            .add_source(config::File::from_str(yaml, FileFormat::Yaml))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap()
    }

    #[test]
    fn full() {
        let config = parse(
            "server:\n  \
               host: 0.0.0.0\n  \
               port: 8554\n  \
               max_request_size: 1024\n  \
               malformed: skip\n\
             streams:\n  \
               - name: Lobby\n    \
                 path: /lobby\n",
        );
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 8554);
        assert_eq!(config.server.connection_options().max_request_size, 1024);
        assert_eq!(config.server.malformed, MalformedPolicy::Skip);
        assert_eq!(config.streams.len(), 1);
        assert_eq!(config.streams[0].to_string(), "Lobby (/lobby)");
    }

    #[test]
    fn defaults() {
        let config = parse("server:\n  host: 127.0.0.1\n  port: 554\n");
        assert_eq!(
            config.server.max_request_size,
            AppConfig::default().server.max_request_size,
        );
        assert_eq!(config.server.malformed, MalformedPolicy::Close);
        assert!(config.streams.is_empty());
    }
}
