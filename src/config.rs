use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;
use tracing::{error, info};

/// Application configuration, read from the environment
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    /// Server host address
    #[serde(default = "default_host")]
    pub host: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Steps run by a generation when the request does not say otherwise
    #[serde(default = "default_total_steps")]
    pub default_total_steps: u32,

    /// Simulated work per generation step
    #[serde(default = "default_step_delay_ms")]
    pub step_delay_ms: u64,

    /// Pause between the stages of the process simulator
    #[serde(default = "default_simulator_delay_ms")]
    pub simulator_delay_ms: u64,

    /// Buffer size of each in-memory topic channel
    #[serde(default = "default_topic_capacity")]
    pub topic_capacity: usize,

    /// How long a finished operation stays queryable; its id is reserved until then
    #[serde(default = "default_operation_retention_secs")]
    pub operation_retention_secs: u64,

    /// How often finished operations are swept
    #[serde(default = "default_cleanup_interval_secs")]
    pub cleanup_interval_secs: u64,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Environment variable error: {0}")]
    EnvError(#[from] envy::Error),
}

impl Config {
    /// Load configuration from environment variables, seeded from app.env or .env
    pub fn load() -> Result<Self, ConfigError> {
        if std::path::Path::new("app.env").exists() {
            dotenvy::from_filename("app.env").ok();
        } else {
            dotenvy::dotenv().ok();
        }

        match envy::from_env::<Config>() {
            Ok(config) => {
                info!(
                    host = %config.host,
                    port = config.port,
                    step_delay_ms = config.step_delay_ms,
                    "Configuration loaded"
                );
                Ok(config)
            }
            Err(e) => {
                error!(error = %e, "Failed to load configuration");
                Err(ConfigError::EnvError(e))
            }
        }
    }

    /// Get the full server address
    pub fn server_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn step_delay(&self) -> Duration {
        Duration::from_millis(self.step_delay_ms)
    }

    pub fn simulator_delay(&self) -> Duration {
        Duration::from_millis(self.simulator_delay_ms)
    }

    pub fn operation_retention(&self) -> Duration {
        Duration::from_secs(self.operation_retention_secs)
    }

    /// Sweep period, never shorter than one second
    pub fn cleanup_interval(&self) -> Duration {
        Duration::from_secs(self.cleanup_interval_secs.max(1))
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            default_total_steps: default_total_steps(),
            step_delay_ms: default_step_delay_ms(),
            simulator_delay_ms: default_simulator_delay_ms(),
            topic_capacity: default_topic_capacity(),
            operation_retention_secs: default_operation_retention_secs(),
            cleanup_interval_secs: default_cleanup_interval_secs(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_total_steps() -> u32 {
    5
}

fn default_step_delay_ms() -> u64 {
    3000
}

fn default_simulator_delay_ms() -> u64 {
    2000
}

fn default_topic_capacity() -> usize {
    100
}

fn default_operation_retention_secs() -> u64 {
    10 * 60
}

fn default_cleanup_interval_secs() -> u64 {
    60
}
