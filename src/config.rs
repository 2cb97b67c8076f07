//! Configuration file handling.
//!
//! This module handles loading, merging and validating configuration from
//! `.mobile-backend.toml` files.

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::ml::predictor::{DEFAULT_BIAS, DEFAULT_TRAINING_NOISE_STD, DEFAULT_WEIGHTS};
use crate::ml::LinearModel;

/// Name of the configuration file looked up in the working directory.
pub const CONFIG_FILE: &str = ".mobile-backend.toml";

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// HTTP server settings.
    #[serde(default)]
    pub server: ServerConfig,

    /// Mock model settings.
    #[serde(default)]
    pub model: ModelConfig,
}

/// HTTP server settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Interface to bind.
    #[serde(default = "default_host")]
    pub host: String,

    /// TCP port to listen on.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Allow cross-origin requests from any origin.
    #[serde(default = "default_true")]
    pub cors: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cors: true,
        }
    }
}

impl ServerConfig {
    /// `host:port` string suitable for binding.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    5000
}

fn default_true() -> bool {
    true
}

/// Linear model settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    /// Initial weights; their count fixes the feature dimension.
    #[serde(default = "default_weights")]
    pub weights: Vec<f64>,

    /// Bias added to every score.
    #[serde(default = "default_bias")]
    pub bias: f64,

    /// Standard deviation of the noise mock training adds to each weight.
    #[serde(default = "default_training_noise_std")]
    pub training_noise_std: f64,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            weights: default_weights(),
            bias: default_bias(),
            training_noise_std: default_training_noise_std(),
        }
    }
}

impl ModelConfig {
    pub fn linear_model(&self) -> LinearModel {
        LinearModel::new(self.weights.clone(), self.bias)
    }
}

fn default_weights() -> Vec<f64> {
    DEFAULT_WEIGHTS.to_vec()
}

fn default_bias() -> f64 {
    DEFAULT_BIAS
}

fn default_training_noise_std() -> f64 {
    DEFAULT_TRAINING_NOISE_STD
}

impl Config {
    /// Load configuration from a file path.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Try to load configuration from the default location.
    ///
    /// Returns `Ok(None)` if the file doesn't exist, `Err` if it exists but can't be parsed.
    pub fn load_default() -> Result<Option<Self>> {
        let default_path = Path::new(CONFIG_FILE);

        if default_path.exists() {
            Ok(Some(Self::load(default_path)?))
        } else {
            Ok(None)
        }
    }

    /// Merge this configuration with CLI arguments.
    ///
    /// CLI arguments take precedence over config file settings, but only
    /// when they were actually given.
    pub fn merge_with_args(&mut self, args: &crate::cli::Args) {
        if let Some(ref host) = args.host {
            self.server.host = host.clone();
        }
        if let Some(port) = args.port {
            self.server.port = port;
        }
        if args.no_cors {
            self.server.cors = false;
        }
    }

    /// Check the values a file may have set badly.
    pub fn validate(&self) -> Result<()> {
        if self.server.host.trim().is_empty() {
            bail!("server.host must not be empty");
        }
        if self.model.weights.is_empty() {
            bail!("model.weights must contain at least one weight");
        }
        if let Some(i) = self.model.weights.iter().position(|w| !w.is_finite()) {
            bail!("model.weights[{}] is not a finite number", i);
        }
        if !self.model.bias.is_finite() {
            bail!("model.bias is not a finite number");
        }
        if !self.model.training_noise_std.is_finite() || self.model.training_noise_std < 0.0 {
            bail!(
                "model.training_noise_std must be a non-negative number, got {}",
                self.model.training_noise_std
            );
        }
        Ok(())
    }

    /// Generate a default configuration file content.
    pub fn default_toml() -> String {
        let config = Config::default();
        toml::to_string_pretty(&config).unwrap_or_else(|_| String::new())
    }
}
