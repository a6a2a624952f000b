//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeouts > 0, body limit > 0)
//! - Check the skip pattern compiles and the bind address parses
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: AppConfig → Result<(), Vec<ValidationError>>

use std::net::SocketAddr;

use thiserror::Error;

use crate::config::schema::AppConfig;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("server.bind_address {0:?} is not a socket address")]
    BindAddress(String),

    #[error("server.request_timeout_secs must be greater than 0")]
    RequestTimeout,

    #[error("http.max_body_bytes must be greater than 0")]
    MaxBodyBytes,

    #[error("http.skip_pattern {pattern:?} is not a valid regex: {reason}")]
    SkipPattern { pattern: String, reason: String },
}

/// Check every semantic rule, collecting all failures.
pub fn validate_config(config: &AppConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.server.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::BindAddress(config.server.bind_address.clone()));
    }

    if config.server.request_timeout_secs == 0 {
        errors.push(ValidationError::RequestTimeout);
    }

    if config.http.max_body_bytes == 0 {
        errors.push(ValidationError::MaxBodyBytes);
    }

    if let Some(pattern) = &config.http.skip_pattern {
        if let Err(e) = regex::Regex::new(pattern) {
            errors.push(ValidationError::SkipPattern {
                pattern: pattern.clone(),
                reason: e.to_string(),
            });
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert_eq!(validate_config(&AppConfig::default()), Ok(()));
    }

    #[test]
    fn reports_every_problem() {
        let mut config = AppConfig::default();
        config.server.bind_address = "nowhere".into();
        config.server.request_timeout_secs = 0;
        config.http.max_body_bytes = 0;
        config.http.skip_pattern = Some("(".into());

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 4);
        assert_eq!(errors[0], ValidationError::BindAddress("nowhere".into()));
        assert!(matches!(errors[3], ValidationError::SkipPattern { .. }));
    }
}
