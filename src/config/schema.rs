//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the dev server.
//! All types derive Serde traits for deserialization from config files.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Root configuration for the dev server.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct DevConfig {
    /// Listener configuration (host, port, assets).
    pub server: ServerConfig,

    /// Prefix-based forwarding rules to remote origins.
    pub proxy: Vec<ProxyRule>,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

impl Default for DevConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            proxy: vec![ProxyRule::default()],
            timeouts: TimeoutConfig::default(),
            observability: ObservabilityConfig::default(),
        }
    }
}

impl DevConfig {
    /// `host:port` the listener binds to.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

/// Listener settings given on the command line; they win over the file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ServerOverrides {
    pub host: Option<String>,
    pub port: Option<u16>,
}

impl ServerOverrides {
    pub fn apply(&self, config: &mut DevConfig) {
        if let Some(host) = &self.host {
            config.server.host = host.clone();
        }
        if let Some(port) = self.port {
            config.server.port = port;
        }
    }
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Host name or IP to bind (e.g., "localhost", "0.0.0.0").
    pub host: String,

    /// TCP port.
    pub port: u16,

    /// Directory served under `/assets`.
    pub assets_dir: Option<PathBuf>,

    /// Module script the page shell loads (e.g., "/assets/index.js").
    pub entry_script: Option<String>,

    /// Maximum request body size in bytes.
    pub max_body_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 5173,
            assets_dir: None,
            entry_script: None,
            max_body_bytes: 2 * 1024 * 1024, // 2MB
        }
    }
}

/// Forwarding rule for requests under a path prefix.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct ProxyRule {
    /// Path prefix to match (e.g., "/api").
    pub prefix: String,

    /// Remote origin (e.g., "https://ps.azkivam.com").
    pub target: String,

    /// Send the target's authority as `Host` instead of the client's.
    #[serde(default = "default_true")]
    pub change_origin: bool,

    /// Verify the target's TLS certificate.
    #[serde(default)]
    pub secure: bool,

    /// Remove `prefix` from the forwarded path.
    #[serde(default = "default_true")]
    pub strip_prefix: bool,
}

impl Default for ProxyRule {
    fn default() -> Self {
        Self {
            prefix: "/api".to_string(),
            target: "https://ps.azkivam.com".to_string(),
            change_origin: true,
            secure: false,
            strip_prefix: true,
        }
    }
}

fn default_true() -> bool {
    true
}

/// Timeout configuration for upstream calls.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Connection establishment timeout in seconds.
    pub connect_secs: u64,

    /// Request timeout (total time for request/response) in seconds.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            connect_secs: 5,
            request_secs: 30,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "127.0.0.1:9090".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_dev_setup() {
        let config = DevConfig::default();
        assert_eq!(config.bind_address(), "localhost:5173");
        assert_eq!(config.proxy, vec![ProxyRule::default()]);
        assert_eq!(config.proxy[0].prefix, "/api");
        assert_eq!(config.proxy[0].target, "https://ps.azkivam.com");
        assert!(config.proxy[0].change_origin);
        assert!(!config.proxy[0].secure);
        assert!(config.proxy[0].strip_prefix);
    }

    #[test]
    fn test_overrides_replace_listener_fields() {
        let mut config = DevConfig::default();
        ServerOverrides::default().apply(&mut config);
        assert_eq!(config.bind_address(), "localhost:5173");

        let overrides = ServerOverrides {
            host: Some("0.0.0.0".into()),
            port: None,
        };
        overrides.apply(&mut config);
        assert_eq!(config.bind_address(), "0.0.0.0:5173");
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config: DevConfig = toml::from_str(
            r#"
            [server]
            port = 3000

            [[proxy]]
            prefix = "/backend"
            target = "http://127.0.0.1:8000"
            "#,
        )
        .unwrap();

        assert_eq!(config.server.host, "localhost");
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.proxy.len(), 1);
        assert!(config.proxy[0].change_origin);
        assert!(!config.proxy[0].secure);
        assert_eq!(config.timeouts.request_secs, 30);
    }

    #[test]
    fn test_empty_proxy_list_is_allowed() {
        let config: DevConfig = toml::from_str("proxy = []").unwrap();
        assert!(config.proxy.is_empty());
    }
}
