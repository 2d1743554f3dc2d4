pub mod toml_config;

use crate::core::upstream::GOV24_SERVICE_LIST_URL;
use crate::core::ConfigProvider;
use crate::utils::error::{RelayError, Result};
use crate::utils::validation::{self, Validate};
use clap::Parser;
use std::net::SocketAddr;
use std::path::PathBuf;
use toml_config::TomlConfig;

pub const SERVICE_KEY_ENV: &str = "SUBSIDY_API_KEY";

pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 8787;

/// 允許呼叫轉發服務的前端網域
pub const DEFAULT_ALLOWED_ORIGINS: &[&str] = &[
    "https://your-username.github.io",
    "https://your-domain.com",
    "http://localhost:3000", // 開發用
];

#[derive(Debug, Clone, Default, Parser)]
#[command(name = "subsidy-relay")]
#[command(about = "Relay questionnaire answers to the Gov24 subsidy API without exposing the API key")]
pub struct CliConfig {
    #[arg(long, help = "Listen host [default: 127.0.0.1]")]
    pub host: Option<String>,

    #[arg(long, help = "Listen port [default: 8787]")]
    pub port: Option<u16>,

    #[arg(long, help = "Upstream service list endpoint")]
    pub upstream_endpoint: Option<String>,

    #[arg(long, value_delimiter = ',', help = "Allowed browser origins (comma separated)")]
    pub allowed_origins: Vec<String>,

    #[arg(long, help = "Optional TOML configuration file")]
    pub config: Option<PathBuf>,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Emit logs as JSON")]
    pub json_logs: bool,
}

/// 啟動時組好、之後不再變動的設定
#[derive(Clone)]
pub struct RelayConfig {
    pub host: String,
    pub port: u16,
    pub upstream_endpoint: String,
    pub allowed_origins: Vec<String>,
    service_key: Option<String>,
}

impl std::fmt::Debug for RelayConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RelayConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("upstream_endpoint", &self.upstream_endpoint)
            .field("allowed_origins", &self.allowed_origins)
            .field("service_key", &self.service_key.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            upstream_endpoint: GOV24_SERVICE_LIST_URL.to_string(),
            allowed_origins: DEFAULT_ALLOWED_ORIGINS
                .iter()
                .map(|origin| origin.to_string())
                .collect(),
            service_key: None,
        }
    }
}

impl RelayConfig {
    /// 讀取 CLI、設定檔與環境變數
    pub fn load(cli: &CliConfig) -> Result<Self> {
        let file = match &cli.config {
            Some(path) => {
                tracing::debug!("Loading configuration file {}", path.display());
                Some(TomlConfig::from_file(path)?)
            }
            None => None,
        };
        let env_key = std::env::var(SERVICE_KEY_ENV).ok();

        Ok(Self::resolve(cli, file.as_ref(), env_key))
    }

    /// 優先順序：CLI 明確指定 > 設定檔 > 內建預設；金鑰則是環境變數 > 設定檔
    pub fn resolve(cli: &CliConfig, file: Option<&TomlConfig>, env_key: Option<String>) -> Self {
        let defaults = Self::default();

        let host = cli
            .host
            .clone()
            .or_else(|| file.and_then(|f| f.host()).map(str::to_string))
            .unwrap_or(defaults.host);

        let port = cli
            .port
            .or_else(|| file.and_then(|f| f.port()))
            .unwrap_or(defaults.port);

        let upstream_endpoint = cli
            .upstream_endpoint
            .clone()
            .or_else(|| file.and_then(|f| f.upstream_endpoint()).map(str::to_string))
            .unwrap_or(defaults.upstream_endpoint);

        let allowed_origins = if !cli.allowed_origins.is_empty() {
            cli.allowed_origins.clone()
        } else {
            file.and_then(|f| f.allowed_origins())
                .map(<[String]>::to_vec)
                .unwrap_or(defaults.allowed_origins)
        };

        let service_key = env_key
            .filter(|key| !key.is_empty())
            .or_else(|| file.and_then(|f| f.service_key()).map(str::to_string));

        Self {
            host,
            port,
            upstream_endpoint,
            allowed_origins,
            service_key,
        }
    }

    pub fn with_service_key(mut self, service_key: impl Into<String>) -> Self {
        self.service_key = Some(service_key.into());
        self
    }

    pub fn has_service_key(&self) -> bool {
        self.service_key.is_some()
    }

    pub fn socket_addr(&self) -> Result<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|e| RelayError::InvalidConfigValueError {
                field: "host".to_string(),
                value: self.host.clone(),
                reason: format!("Invalid listen address: {}", e),
            })
    }
}

impl ConfigProvider for RelayConfig {
    fn upstream_endpoint(&self) -> &str {
        &self.upstream_endpoint
    }

    fn allowed_origins(&self) -> &[String] {
        &self.allowed_origins
    }

    fn service_key(&self) -> Option<&str> {
        self.service_key.as_deref()
    }
}

impl Validate for RelayConfig {
    fn validate(&self) -> Result<()> {
        validation::validate_non_empty_string("host", &self.host)?;
        validation::validate_positive_number("port", usize::from(self.port), 1)?;
        validation::validate_url("upstream_endpoint", &self.upstream_endpoint)?;

        validation::validate_non_empty_list("allowed_origins", &self.allowed_origins)?;
        for origin in &self.allowed_origins {
            validation::validate_origin("allowed_origins", origin)?;
        }

        // 金鑰缺少不擋啟動，只是每個請求都會回 500
        if !self.has_service_key() {
            tracing::warn!(
                "⚠️ {} is not configured, every relay request will fail",
                SERVICE_KEY_ENV
            );
        }

        tracing::info!("✅ Relay configuration validation passed");
        Ok(())
    }
}
