use std::net::IpAddr;
use thiserror::Error;
use typed_builder::TypedBuilder;

pub const DEFAULT_RATE_LIMIT_PER_SECOND: f64 = 5.0;
pub const DEFAULT_RATE_LIMIT_BURST: u32 = 10;

/// Runtime settings shared by the router and its handlers.
#[derive(Debug, Clone, TypedBuilder)]
pub struct GatewayConfig {
    /// Always starts and ends with `/`.
    #[builder(default = "/".to_string(), setter(transform = |path: &str| normalize_base_path(path)))]
    pub base_path: String,

    #[builder(setter(into))]
    pub internal_secret: String,

    #[builder(default = DEFAULT_RATE_LIMIT_PER_SECOND)]
    pub rate_limit_per_second: f64,

    #[builder(default = DEFAULT_RATE_LIMIT_BURST)]
    pub rate_limit_burst: u32,

    /// Peers allowed to name the real client in `X-Forwarded-For`.
    #[builder(default)]
    pub trusted_proxies: Vec<IpAddr>,
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("base path {0:?} must not contain '{{', '}}' or '*'")]
    InvalidBasePath(String),
}

impl GatewayConfig {
    /// Rejects settings the router cannot be built from.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.base_path.contains(['{', '}', '*']) {
            return Err(ConfigError::InvalidBasePath(self.base_path.clone()));
        }
        Ok(())
    }

    pub fn is_trusted_proxy(&self, peer: IpAddr) -> bool {
        self.trusted_proxies.contains(&peer)
    }

    /// Route that creates links, e.g. `/` or `/s/`.
    pub fn collection_route(&self) -> String {
        self.base_path.clone()
    }

    /// Route that addresses one link, e.g. `/{id}` or `/s/{id}`.
    pub fn item_route(&self) -> String {
        format!("{}{{id}}", self.base_path)
    }
}

/// Trims surrounding whitespace and slashes, then wraps the result in
/// exactly one leading and one trailing `/`.
pub fn normalize_base_path(path: &str) -> String {
    let trimmed = path.trim().trim_matches('/');
    if trimmed.is_empty() {
        "/".to_string()
    } else {
        format!("/{trimmed}/")
    }
}
