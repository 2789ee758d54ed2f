use crate::error::{ServerError, ServerResult};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::time::Duration;

/// Server configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    /// Server bind address
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Maximum request body size in KB
    #[serde(default = "default_max_body_size_kb")]
    pub max_body_size_kb: usize,

    /// Log filter directive
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Scanner and matcher backend
    #[serde(default)]
    pub device: DeviceConfig,
}

/// Which collaborator implementations back the device session and matcher.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    /// In-process simulated scanner and matcher.
    #[default]
    Simulated,
    /// No scanner attached; template-to-template matching still works.
    #[serde(rename = "none", alias = "detached")]
    Detached,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DeviceConfig {
    #[serde(default)]
    pub backend: Backend,

    /// Minimum extraction quality (0 disables the check)
    #[serde(default)]
    pub min_quality: u8,

    /// Simulated time-to-finger per capture
    #[serde(default)]
    pub capture_delay_ms: u64,

    /// Simulated finger identity
    #[serde(default = "default_finger_seed")]
    pub finger_seed: u64,

    /// Simulated matcher acceptance threshold in [0, 1]
    #[serde(default = "default_match_threshold")]
    pub match_threshold: f64,
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            backend: Backend::default(),
            min_quality: 0,
            capture_delay_ms: 0,
            finger_seed: default_finger_seed(),
            match_threshold: default_match_threshold(),
        }
    }
}

impl DeviceConfig {
    pub fn capture_delay(&self) -> Duration {
        Duration::from_millis(self.capture_delay_ms)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
            port: default_port(),
            max_body_size_kb: default_max_body_size_kb(),
            log_level: default_log_level(),
            device: DeviceConfig::default(),
        }
    }
}

impl ServerConfig {
    /// Load configuration from `.env`, an optional `fpbridge.*` file and
    /// `FPBRIDGE__*` environment variables, in increasing precedence.
    pub fn load() -> anyhow::Result<Self> {
        if let Err(err) = dotenvy::dotenv() {
            if !err.not_found() {
                return Err(err.into());
            }
        }

        Self::load_with(config::Environment::with_prefix("FPBRIDGE").separator("__"))
    }

    fn load_with(environment: config::Environment) -> anyhow::Result<Self> {
        let builder = config::Config::builder()
            // Load from file if exists
            .add_source(config::File::with_name("fpbridge").required(false))
            // Override with environment variables
            .add_source(environment.try_parsing(true));

        let config: ServerConfig = builder.build()?.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Reject settings the server cannot start with.
    pub fn validate(&self) -> ServerResult<()> {
        self.socket_addr()?;
        let threshold = self.device.match_threshold;
        if !(0.0..=1.0).contains(&threshold) {
            return Err(ServerError::Config(format!(
                "device.match_threshold must be within [0, 1], got {threshold}"
            )));
        }
        if self.max_body_size_kb == 0 {
            return Err(ServerError::Config(
                "max_body_size_kb must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }

    /// Get the socket address to bind to
    pub fn socket_addr(&self) -> ServerResult<SocketAddr> {
        let addr_str = format!("{}:{}", self.bind_addr, self.port);
        Ok(addr_str.parse()?)
    }

    /// Get max body size in bytes
    pub fn max_body_size(&self) -> usize {
        self.max_body_size_kb * 1024
    }
}

fn default_bind_addr() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    6001
}

fn default_max_body_size_kb() -> usize {
    64
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_finger_seed() -> u64 {
    1
}

fn default_match_threshold() -> f64 {
    0.9
}
