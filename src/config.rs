//! Application configuration

use std::time::Duration;

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use serde_with::serde_as;
use tracing::warn;

use crate::errors::AisDecoderError;

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub mqtt: MqttConfig,
    #[serde(default)]
    pub decoder: DecoderConfig,
}

#[serde_as]
#[derive(Debug, Deserialize, Clone)]
pub struct MqttConfig {
    pub host: String,
    #[serde(default = "default_mqtt_port")]
    pub port: u16,
    pub topics: Vec<String>,
    pub client_id: String,
    #[serde(default = "default_keep_alive")]
    #[serde_as(as = "serde_with::DurationSeconds<u64>")]
    pub keep_alive: Duration,
}

/// Decode pipeline options.
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct DecoderConfig {
    /// Fail a record on any invalid armor character instead of letting it
    /// contribute zero bits.
    pub strict_armor: bool,
    /// Reject non-initial fragments and decode first fragments strictly.
    /// When disabled, every fragment is attempted and unreadable fields
    /// take their "not available" codes.
    pub require_fragment_reassembly_upstream: bool,
}

impl Default for DecoderConfig {
    fn default() -> Self {
        DecoderConfig {
            strict_armor: false,
            require_fragment_reassembly_upstream: true,
        }
    }
}

fn default_mqtt_port() -> u16 {
    1883
}

fn default_keep_alive() -> Duration {
    Duration::from_secs(5)
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        let config = Config::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(Environment::with_prefix("AISDECODER").separator("__"))
            .build()?;

        config.try_deserialize()
    }
}

impl MqttConfig {
    /// Validate configuration parameters
    pub fn validate(&self) -> Result<(), AisDecoderError> {
        if self.host.is_empty() {
            return Err(AisDecoderError::ConfigurationError {
                message: "MQTT host cannot be empty".to_string(),
            });
        }

        if self.client_id.is_empty() {
            return Err(AisDecoderError::ConfigurationError {
                message: "MQTT client id cannot be empty".to_string(),
            });
        }

        if self.topics.is_empty() {
            warn!("No MQTT topics configured, the feed will stay silent");
        }

        Ok(())
    }
}
