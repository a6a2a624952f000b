//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the service.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

use crate::log::{Format, Level};

/// Root configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct AppConfig {
    /// Listener settings.
    pub server: ServerConfig,

    /// Log line rendering and sinks.
    pub logging: LoggingConfig,

    /// Request/response logging middleware.
    pub http: HttpLogConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,

    /// Request timeout (total time for request/response) in seconds.
    pub request_timeout_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
            request_timeout_secs: 30,
        }
    }
}

/// Where failed log writes are reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AltWriter {
    #[default]
    Stderr,
    None,
}

/// Logging engine configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Line format (json, lite, debug).
    pub format: Format,

    /// Minimum level written (trace, debug, info, error).
    pub level: Level,

    /// JSON-escape structured values (true) or wrap them in bare quotes.
    pub escape: bool,

    /// Longest string value kept before truncation; 0 disables truncation.
    pub max_len: usize,

    /// Fallback sink for failed writes.
    pub alt_writer: AltWriter,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            format: Format::Json,
            level: Level::Info,
            escape: true,
            max_len: 0,
            alt_writer: AltWriter::Stderr,
        }
    }
}

/// Style of the per-request correlation identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RequestIdStyle {
    /// Seven random alphanumerics.
    #[default]
    Short,
    /// A UUID v4.
    Uuid,
}

/// Request/response logging configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct HttpLogConfig {
    /// Header names (canonical form, e.g. "X-Secret") logged as a placeholder.
    pub redact_headers: Vec<String>,

    /// Leave request and response bodies out of log events.
    pub skip_body: bool,

    /// Requests whose path matches this regex are not logged.
    pub skip_pattern: Option<String>,

    /// Longest body text kept in an event, in bytes; longer bodies are
    /// logged truncated. Handlers always receive the whole body.
    pub max_body_bytes: usize,

    /// Level of the request and response events.
    pub level: Level,

    /// Correlation identifier style.
    pub request_id: RequestIdStyle,
}

impl Default for HttpLogConfig {
    fn default() -> Self {
        Self {
            redact_headers: vec!["Authorization".to_string(), "Cookie".to_string()],
            skip_body: false,
            skip_pattern: None,
            max_body_bytes: 1024 * 1024, // 1MB
            level: Level::Trace,
            request_id: RequestIdStyle::Short,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minimal_config_uses_defaults() {
        let config: AppConfig = toml::from_str("").unwrap();
        assert_eq!(config.server.bind_address, "0.0.0.0:8080");
        assert_eq!(config.logging.format, Format::Json);
        assert_eq!(config.http.request_id, RequestIdStyle::Short);
        assert_eq!(config.http.level, Level::Trace);
    }

    #[test]
    fn full_config_parses() {
        let config: AppConfig = toml::from_str(
            r#"
            [server]
            bind_address = "127.0.0.1:9000"

            [logging]
            format = "lite"
            level = "trace"
            alt_writer = "none"

            [http]
            redact_headers = ["X-Secret"]
            skip_body = true
            skip_pattern = "^/monitor$"
            request_id = "uuid"
            level = "info"
            "#,
        )
        .unwrap();

        assert_eq!(config.server.bind_address, "127.0.0.1:9000");
        assert_eq!(config.server.request_timeout_secs, 30);
        assert_eq!(config.logging.format, Format::Lite);
        assert_eq!(config.logging.level, Level::Trace);
        assert_eq!(config.logging.alt_writer, AltWriter::None);
        assert_eq!(config.http.redact_headers, vec!["X-Secret".to_string()]);
        assert!(config.http.skip_body);
        assert_eq!(config.http.skip_pattern.as_deref(), Some("^/monitor$"));
        assert_eq!(config.http.request_id, RequestIdStyle::Uuid);
        assert_eq!(config.http.level, Level::Info);
    }
}
