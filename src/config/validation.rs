//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (intervals > 0, port valid)
//! - Check that CORS entries are well-formed HTTP tokens
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: RelayConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;

use axum::http::{HeaderName, HeaderValue, Method};
use thiserror::Error;

use crate::config::schema::RelayConfig;

/// A single semantic problem in a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("listener.host must not be empty")]
    EmptyHost,

    #[error("listener.port must be non-zero")]
    ZeroPort,

    #[error("upstream.scheme must be `http` or `https`, got `{0}`")]
    UnsupportedScheme(String),

    #[error("upstream.path must start with `/`, got `{0}`")]
    RelativePath(String),

    #[error("upstream.allowed_host_suffixes contains an empty entry")]
    EmptyHostSuffix,

    #[error("session.keepalive_secs must be greater than zero")]
    ZeroKeepAlive,

    #[error("session.downstream_buffer must be greater than zero")]
    ZeroDownstreamBuffer,

    #[error("cors.allowed_origins contains invalid origin `{0}`")]
    InvalidOrigin(String),

    #[error("cors.allowed_methods contains invalid method `{0}`")]
    InvalidMethod(String),

    #[error("cors.allowed_headers contains invalid header `{0}`")]
    InvalidHeader(String),

    #[error("observability.metrics_address `{0}` is not a socket address")]
    InvalidMetricsAddress(String),
}

/// Validate a parsed configuration, collecting every problem found.
pub fn validate_config(config: &RelayConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.host.trim().is_empty() {
        errors.push(ValidationError::EmptyHost);
    }
    if config.listener.port == 0 {
        errors.push(ValidationError::ZeroPort);
    }

    let upstream = &config.upstream;
    if upstream.scheme != "http" && upstream.scheme != "https" {
        errors.push(ValidationError::UnsupportedScheme(upstream.scheme.clone()));
    }
    if !upstream.path.starts_with('/') {
        errors.push(ValidationError::RelativePath(upstream.path.clone()));
    }
    if upstream
        .allowed_host_suffixes
        .iter()
        .any(|suffix| suffix.trim_matches('.').is_empty())
    {
        errors.push(ValidationError::EmptyHostSuffix);
    }

    if config.session.keepalive_secs == 0 {
        errors.push(ValidationError::ZeroKeepAlive);
    }
    if config.session.downstream_buffer == 0 {
        errors.push(ValidationError::ZeroDownstreamBuffer);
    }

    let cors = &config.cors;
    for origin in cors.allowed_origins.iter().filter(|o| o.as_str() != "*") {
        if HeaderValue::from_str(origin).is_err() || !origin.contains("://") {
            errors.push(ValidationError::InvalidOrigin(origin.clone()));
        }
    }
    for method in &cors.allowed_methods {
        if Method::from_bytes(method.as_bytes()).is_err() {
            errors.push(ValidationError::InvalidMethod(method.clone()));
        }
    }
    for header in &cors.allowed_headers {
        if HeaderName::from_bytes(header.as_bytes()).is_err() {
            errors.push(ValidationError::InvalidHeader(header.clone()));
        }
    }

    let observability = &config.observability;
    if observability.metrics_enabled
        && observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::InvalidMetricsAddress(
            observability.metrics_address.clone(),
        ));
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
    use std::time::Duration;

    #[test]
    fn default_config_is_valid() {
        assert_eq!(validate_config(&RelayConfig::default()), Ok(()));
    }

    #[test]
    fn collects_every_error() {
        let mut config = RelayConfig::default();
        config.listener.port = 0;
        config.upstream.scheme = "ftp".into();
        config.session.keepalive_secs = 0;
        config.cors.allowed_headers.push("bad header".into());

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(
            errors,
            vec![
                ValidationError::ZeroPort,
                ValidationError::UnsupportedScheme("ftp".into()),
                ValidationError::ZeroKeepAlive,
                ValidationError::InvalidHeader("bad header".into()),
            ]
        );
    }

    #[test]
    fn wildcard_origin_is_accepted() {
        let mut config = RelayConfig::default();
        config.cors.allowed_origins = vec!["*".into(), "https://app.example.com".into()];
        assert!(validate_config(&config).is_ok());

        config.cors.allowed_origins.push("app.example.com".into());
        assert_eq!(
            validate_config(&config).unwrap_err(),
            vec![ValidationError::InvalidOrigin("app.example.com".into())]
        );
    }

    #[test]
    fn metrics_address_checked_only_when_enabled() {
        let mut config = RelayConfig::default();
        config.observability.metrics_address = "nowhere".into();
        assert!(validate_config(&config).is_ok());

        config.observability.metrics_enabled = true;
        assert_eq!(
            validate_config(&config).unwrap_err(),
            vec![ValidationError::InvalidMetricsAddress("nowhere".into())]
        );
    }

    #[test]
    fn zero_connect_timeout_means_unbounded() {
        let mut config = RelayConfig::default();
        assert_eq!(config.upstream.connect_timeout(), Some(Duration::from_secs(10)));

        config.upstream.connect_timeout_secs = 0;
        assert!(validate_config(&config).is_ok());
        assert_eq!(config.upstream.connect_timeout(), None);
    }

    #[test]
    fn empty_host_suffix_rejected() {
        let mut config = RelayConfig::default();
        config.upstream.allowed_host_suffixes = vec!["example.com".into(), ".".into()];
        assert_eq!(
            validate_config(&config).unwrap_err(),
            vec![ValidationError::EmptyHostSuffix]
        );
    }
}
