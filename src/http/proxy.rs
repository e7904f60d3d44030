//! Forwarding of prefixed paths (e.g. `/api`) to remote origins.
//!
//! # Responsibilities
//! - Pick the proxy rule whose prefix the request path starts with
//! - Rewrite the path (strip prefix) and join it onto the target origin
//! - Forward method, headers and body; stream the response back
//! - Map upstream failures to 502 / 504
//!
//! # Design Decisions
//! - One HTTP client per rule (TLS verification is a per-rule setting)
//! - Upstream redirects are passed through, not followed
//! - Hop-by-hop headers stripped in both directions
//! - The table is rebuilt as a whole on config reload

use std::time::Duration;

use axum::{
    body::Body,
    http::{header, HeaderMap, HeaderName, Request, StatusCode},
    response::{IntoResponse, Response},
};
use url::Url;

use crate::config::{DevConfig, ProxyRule, TimeoutConfig};
use crate::http::request::X_REQUEST_ID;

const HOP_BY_HOP: [HeaderName; 8] = [
    header::CONNECTION,
    HeaderName::from_static("keep-alive"),
    header::PROXY_AUTHENTICATE,
    header::PROXY_AUTHORIZATION,
    header::TE,
    header::TRAILER,
    header::TRANSFER_ENCODING,
    header::UPGRADE,
];

/// Errors raised while building the proxy table.
#[derive(Debug, thiserror::Error)]
pub enum ProxyError {
    #[error("invalid proxy target `{target}`: {source}")]
    InvalidTarget {
        target: String,
        #[source]
        source: url::ParseError,
    },
    #[error("failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),
}

/// A compiled proxy rule with its client.
#[derive(Debug, Clone)]
pub struct ProxyRoute {
    rule: ProxyRule,
    target: Url,
    client: reqwest::Client,
}

impl ProxyRoute {
    pub fn new(rule: ProxyRule, timeouts: &TimeoutConfig) -> Result<Self, ProxyError> {
        let target = Url::parse(&rule.target).map_err(|source| ProxyError::InvalidTarget {
            target: rule.target.clone(),
            source,
        })?;

        let client = reqwest::Client::builder()
            .redirect(reqwest::redirect::Policy::none())
            .danger_accept_invalid_certs(!rule.secure)
            .connect_timeout(Duration::from_secs(timeouts.connect_secs))
            .timeout(Duration::from_secs(timeouts.request_secs))
            .no_proxy()
            .build()?;

        Ok(Self {
            rule,
            target,
            client,
        })
    }

    pub fn rule(&self) -> &ProxyRule {
        &self.rule
    }

    /// Does `path` fall under this rule's prefix?
    pub fn matches(&self, path: &str) -> bool {
        path.starts_with(&self.rule.prefix)
    }

    /// Path sent upstream for a client `path`.
    pub fn rewrite_path(&self, path: &str) -> String {
        let rest = if self.rule.strip_prefix {
            path.strip_prefix(self.rule.prefix.as_str()).unwrap_or(path)
        } else {
            path
        };

        if rest.starts_with('/') {
            rest.to_string()
        } else {
            format!("/{}", rest)
        }
    }

    /// Full upstream URL for a client path and query.
    pub fn upstream_url(&self, path: &str, query: Option<&str>) -> Url {
        let mut url = self.target.clone();
        let base = self.target.path().trim_end_matches('/');
        url.set_path(&format!("{}{}", base, self.rewrite_path(path)));
        url.set_query(query);
        url
    }

    /// Forward `request` upstream and stream the answer back.
    pub async fn forward(&self, request: Request<Body>, request_id: &str) -> Response {
        let (parts, body) = request.into_parts();
        let url = self.upstream_url(parts.uri.path(), parts.uri.query());

        let has_body = parts.headers.contains_key(header::CONTENT_LENGTH)
            || parts.headers.contains_key(header::TRANSFER_ENCODING);

        let mut headers = parts.headers;
        strip_hop_by_hop(&mut headers);
        if self.rule.change_origin {
            headers.remove(header::HOST);
        }

        tracing::debug!(
            request_id = %request_id,
            method = %parts.method,
            upstream = %url,
            "Forwarding to upstream"
        );

        let mut upstream = self
            .client
            .request(parts.method.clone(), url.clone())
            .headers(headers);
        if has_body {
            // Size is already capped by the body limit layer
            match axum::body::to_bytes(body, usize::MAX).await {
                Ok(bytes) => upstream = upstream.body(bytes),
                Err(e) => {
                    tracing::warn!(request_id = %request_id, error = %e, "Failed to read request body");
                    return (StatusCode::PAYLOAD_TOO_LARGE, "Request body rejected").into_response();
                }
            }
        }

        match upstream.send().await {
            Ok(response) => {
                let status = response.status();
                let mut headers = response.headers().clone();
                strip_hop_by_hop(&mut headers);

                let mut out = Response::new(Body::from_stream(response.bytes_stream()));
                *out.status_mut() = status;
                *out.headers_mut() = headers;
                out
            }
            Err(e) if e.is_timeout() => {
                tracing::error!(request_id = %request_id, upstream = %url, error = %e, "Upstream timed out");
                (StatusCode::GATEWAY_TIMEOUT, "Upstream request timed out").into_response()
            }
            Err(e) => {
                tracing::error!(request_id = %request_id, upstream = %url, error = %e, "Upstream error");
                (StatusCode::BAD_GATEWAY, "Upstream request failed").into_response()
            }
        }
    }
}

/// All proxy rules of a configuration, in declaration order.
#[derive(Debug, Clone, Default)]
pub struct ProxyTable {
    routes: Vec<ProxyRoute>,
}

impl ProxyTable {
    pub fn from_config(config: &DevConfig) -> Result<Self, ProxyError> {
        let routes = config
            .proxy
            .iter()
            .cloned()
            .map(|rule| ProxyRoute::new(rule, &config.timeouts))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { routes })
    }

    /// First rule whose prefix `path` starts with.
    pub fn find(&self, path: &str) -> Option<&ProxyRoute> {
        self.routes.iter().find(|route| route.matches(path))
    }

    pub fn routes(&self) -> &[ProxyRoute] {
        &self.routes
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}

/// Remove hop-by-hop headers, including those listed in `Connection`.
fn strip_hop_by_hop(headers: &mut HeaderMap) {
    let listed: Vec<HeaderName> = headers
        .get_all(header::CONNECTION)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(','))
        .filter_map(|name| HeaderName::from_bytes(name.trim().as_bytes()).ok())
        .filter(|name| *name != X_REQUEST_ID)
        .collect();

    for name in listed.iter().chain(HOP_BY_HOP.iter()) {
        headers.remove(name);
    }
}
