//! Application configuration
//!
//! Loaded from built-in defaults, then a `.env` file if present, then
//! environment variables with the `HATIM_` prefix:
//!
//! - `HATIM_BIND_ADDR=0.0.0.0:8080` -> `bind_addr`
//! - `HATIM_API_BASE_URL=https://...` -> `api_base_url`
//! - `HATIM_ADMIN_PASSWORD=...` -> `admin_password`

use serde::Deserialize;
use std::net::SocketAddr;
use std::time::Duration;

use crate::error::ConfigError;

const ENV_PREFIX: &str = "HATIM";

/// Longest session lifetime accepted, one year.
pub const MAX_SESSION_HOURS: u32 = 24 * 365;

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct AppConfig {
    /// Address the web server listens on
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,

    /// Base URL of the remote `cuzlers` resource
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,

    /// Password unlocking the admin controls of the page
    #[serde(default = "default_admin_password")]
    pub admin_password: String,

    /// How long a row shows "Güncellendi" after an update
    #[serde(default = "default_updated_window_ms")]
    pub updated_window_ms: u64,

    #[serde(default = "default_session_hours")]
    pub session_hours: u32,

    /// Directory served under `/static`
    #[serde(default = "default_static_dir")]
    pub static_dir: String,
}

fn default_bind_addr() -> String {
    "127.0.0.1:3000".to_string()
}

fn default_api_base_url() -> String {
    "https://ihya-2025-be0afcce5189.herokuapp.com".to_string()
}

fn default_admin_password() -> String {
    "LONDRA".to_string()
}

fn default_updated_window_ms() -> u64 {
    2000
}

fn default_session_hours() -> u32 {
    24
}

fn default_static_dir() -> String {
    "static".to_string()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
            api_base_url: default_api_base_url(),
            admin_password: default_admin_password(),
            updated_window_ms: default_updated_window_ms(),
            session_hours: default_session_hours(),
            static_dir: default_static_dir(),
        }
    }
}

impl AppConfig {
    /// Load configuration from `.env` and the process environment
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a value cannot be parsed into its expected type.
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_environment(config::Environment::with_prefix(ENV_PREFIX))
    }

    fn from_environment(source: config::Environment) -> Result<Self, ConfigError> {
        let config = config::Config::builder()
            .add_source(source)
            .build()?
            .try_deserialize()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.socket_addr()?;
        if !(self.api_base_url.starts_with("http://") || self.api_base_url.starts_with("https://"))
        {
            return Err(ConfigError::Invalid("api_base_url must be an http(s) URL"));
        }
        if self.admin_password.is_empty() {
            return Err(ConfigError::Invalid("admin_password must not be empty"));
        }
        if self.session_hours == 0 {
            return Err(ConfigError::Invalid("session_hours must be positive"));
        }
        if self.session_hours > MAX_SESSION_HOURS {
            return Err(ConfigError::Invalid("session_hours must be at most one year"));
        }
        Ok(())
    }

    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        self.bind_addr
            .parse()
            .map_err(|_| ConfigError::Invalid("bind_addr is not a socket address"))
    }

    pub fn updated_window(&self) -> Duration {
        Duration::from_millis(self.updated_window_ms)
    }
}
