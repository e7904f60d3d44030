//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeouts > 0, body limit > 0)
//! - Check proxy targets are absolute http(s) URLs
//! - Detect conflicting proxy prefixes
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: DevConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::collections::HashSet;
use std::net::SocketAddr;

use url::Url;

use crate::config::schema::DevConfig;

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// A single semantic problem in a configuration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("server.host must not be empty")]
    EmptyHost,
    #[error("server.max_body_bytes must be greater than 0")]
    ZeroBodyLimit,
    #[error("timeouts.{0} must be greater than 0")]
    ZeroTimeout(&'static str),
    #[error("proxy prefix `{0}` must start with '/' and not be '/'")]
    InvalidPrefix(String),
    #[error("proxy prefix `{0}` is declared more than once")]
    DuplicatePrefix(String),
    #[error("proxy target `{target}` is invalid: {reason}")]
    InvalidTarget { target: String, reason: String },
    #[error("observability.log_level `{0}` is not one of trace, debug, info, warn, error")]
    InvalidLogLevel(String),
    #[error("observability.metrics_address `{0}` is not a socket address")]
    InvalidMetricsAddress(String),
}

/// Check a parsed configuration for semantic errors.
pub fn validate_config(config: &DevConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.server.host.trim().is_empty() {
        errors.push(ValidationError::EmptyHost);
    }
    if config.server.max_body_bytes == 0 {
        errors.push(ValidationError::ZeroBodyLimit);
    }
    if config.timeouts.connect_secs == 0 {
        errors.push(ValidationError::ZeroTimeout("connect_secs"));
    }
    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::ZeroTimeout("request_secs"));
    }

    let mut prefixes = HashSet::new();
    for rule in &config.proxy {
        if !rule.prefix.starts_with('/') || rule.prefix == "/" {
            errors.push(ValidationError::InvalidPrefix(rule.prefix.clone()));
        } else if !prefixes.insert(rule.prefix.as_str()) {
            errors.push(ValidationError::DuplicatePrefix(rule.prefix.clone()));
        }

        if let Err(reason) = check_target(&rule.target) {
            errors.push(ValidationError::InvalidTarget {
                target: rule.target.clone(),
                reason,
            });
        }
    }

    let level = config.observability.log_level.to_ascii_lowercase();
    if !LOG_LEVELS.contains(&level.as_str()) {
        errors.push(ValidationError::InvalidLogLevel(
            config.observability.log_level.clone(),
        ));
    }
    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::InvalidMetricsAddress(
            config.observability.metrics_address.clone(),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn check_target(target: &str) -> Result<(), String> {
    let url = Url::parse(target).map_err(|e| e.to_string())?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(format!("unsupported scheme `{}`", url.scheme()));
    }
    if url.host_str().is_none() {
        return Err("missing host".to_string());
    }
    Ok(())
}
