use crate::config::{
    ConfigError, GatewayConfig, DEFAULT_RATE_LIMIT_BURST, DEFAULT_RATE_LIMIT_PER_SECOND,
};
use clap::{Parser, ValueEnum};
use std::fmt::{Display, Formatter};
use std::net::{IpAddr, SocketAddr};

pub const LISTEN_ADDR_ENV: &str = "URLZ_LISTEN_ADDR";
pub const BASE_PATH_ENV: &str = "CUSTOM_BASE_PATH";
pub const INTERNAL_SECRET_ENV: &str = "INTERNAL_SECRET_VALUE";
pub const STORAGE_BACKEND_ENV: &str = "URLZ_STORAGE_BACKEND";
pub const REDIS_URL_ENV: &str = "URLZ_REDIS_URL";
pub const ID_LENGTH_ENV: &str = "URLZ_ID_LENGTH";
pub const RATE_LIMIT_PER_SECOND_ENV: &str = "URLZ_RATE_LIMIT_PER_SECOND";
pub const RATE_LIMIT_BURST_ENV: &str = "URLZ_RATE_LIMIT_BURST";
pub const TRUSTED_PROXIES_ENV: &str = "URLZ_TRUSTED_PROXIES";
pub const LOG_FORMAT_ENV: &str = "URLZ_LOG_FORMAT";

pub const DEFAULT_LISTEN_ADDR: &str = "0.0.0.0:8080";
pub const DEFAULT_BASE_PATH: &str = "/";
pub const DEFAULT_ID_LENGTH: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum StorageBackendArg {
    #[value(name = "in-memory")]
    InMemory,
    #[value(name = "redis")]
    Redis,
}

impl Display for StorageBackendArg {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            StorageBackendArg::InMemory => write!(f, "in-memory"),
            StorageBackendArg::Redis => write!(f, "redis"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormatArg {
    Json,
    Pretty,
}

#[derive(Debug, Parser)]
#[command(name = "urlz", about = "URL shortener HTTP server")]
pub struct Cli {
    #[arg(long, env = LISTEN_ADDR_ENV, default_value = DEFAULT_LISTEN_ADDR)]
    pub listen_addr: SocketAddr,

    /// Prefix for every shortener route, e.g. `/s/`.
    #[arg(long, env = BASE_PATH_ENV, default_value = DEFAULT_BASE_PATH)]
    pub base_path: String,

    /// Value callers must send in `X-Internal-Secret` to create, update or delete links.
    #[arg(long, env = INTERNAL_SECRET_ENV, hide_env_values = true)]
    pub internal_secret: String,

    #[arg(
        long,
        env = STORAGE_BACKEND_ENV,
        value_enum,
        default_value_t = StorageBackendArg::InMemory
    )]
    pub storage: StorageBackendArg,

    #[arg(long, env = REDIS_URL_ENV, required_if_eq("storage", "redis"))]
    pub redis_url: Option<String>,

    #[arg(long, env = ID_LENGTH_ENV, default_value_t = DEFAULT_ID_LENGTH)]
    pub id_length: usize,

    /// Tokens added back to each client's bucket per second.
    #[arg(long, env = RATE_LIMIT_PER_SECOND_ENV, default_value_t = DEFAULT_RATE_LIMIT_PER_SECOND)]
    pub rate_limit_per_second: f64,

    /// Maximum number of redirects a client can make back to back.
    #[arg(long, env = RATE_LIMIT_BURST_ENV, default_value_t = DEFAULT_RATE_LIMIT_BURST)]
    pub rate_limit_burst: u32,

    /// Reverse proxy address whose `X-Forwarded-For` header is believed.
    /// Repeat the flag or separate addresses with commas.
    #[arg(long = "trusted-proxy", env = TRUSTED_PROXIES_ENV, value_delimiter = ',')]
    pub trusted_proxies: Vec<IpAddr>,

    #[arg(long, env = LOG_FORMAT_ENV, value_enum, default_value_t = LogFormatArg::Json)]
    pub log_format: LogFormatArg,
}

impl Cli {
    pub fn gateway_config(&self) -> Result<GatewayConfig, ConfigError> {
        let config = GatewayConfig::builder()
            .base_path(&self.base_path)
            .internal_secret(self.internal_secret.clone())
            .rate_limit_per_second(self.rate_limit_per_second)
            .rate_limit_burst(self.rate_limit_burst)
            .trusted_proxies(self.trusted_proxies.clone())
            .build();
        config.validate()?;
        Ok(config)
    }
}
