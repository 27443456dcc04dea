//! Server configuration

use crate::cli::Cli;
use anyhow::Context;
use feedback_sentiment_classifiers::ClassifierConfig;
use serde::{Deserialize, Serialize};
use std::net::{IpAddr, SocketAddr};
use std::path::Path;

/// Server configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Listen address
    pub host: String,

    /// Listen port
    pub port: u16,

    /// Cross-origin access gate
    pub cors: CorsConfig,

    /// Classifier built at startup
    pub classifier: ClassifierConfig,

    /// Prometheus exporter
    pub metrics: MetricsConfig,
}

impl ServerConfig {
    /// Load configuration from file and CLI overrides
    pub fn load(config_path: &str, cli: &Cli) -> anyhow::Result<Self> {
        // Try to load from file, or use defaults
        let mut config = if Path::new(config_path).exists() {
            let content = std::fs::read_to_string(config_path)
                .with_context(|| format!("Failed to read config file {config_path}"))?;
            serde_yaml::from_str(&content)
                .with_context(|| format!("Failed to parse config file {config_path}"))?
        } else {
            Self::default()
        };

        // Apply CLI overrides
        if let Some(host) = &cli.host {
            config.host = host.clone();
        }

        if let Some(port) = cli.port {
            config.port = port;
        }

        if let Some(backend) = cli.backend {
            config.classifier.backend = backend;
        }

        Ok(config)
    }

    /// Address the HTTP listener binds to
    pub fn socket_addr(&self) -> anyhow::Result<SocketAddr> {
        let ip: IpAddr = self
            .host
            .parse()
            .with_context(|| format!("Invalid listen address '{}'", self.host))?;
        Ok(SocketAddr::new(ip, self.port))
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
            cors: CorsConfig::default(),
            classifier: ClassifierConfig::default(),
            metrics: MetricsConfig::default(),
        }
    }
}

/// CORS configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CorsConfig {
    /// Origins allowed to call the API from a browser
    pub allowed_origins: Vec<String>,

    /// Allow cookies and authorization headers on cross-origin requests
    pub allow_credentials: bool,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allowed_origins: vec![
                "http://localhost:3000".to_string(),
                "http://127.0.0.1:3000".to_string(),
            ],
            allow_credentials: true,
        }
    }
}

/// Metrics configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MetricsConfig {
    /// Install the Prometheus recorder and scrape listener
    pub enabled: bool,

    /// Scrape listener address
    pub listen: SocketAddr,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            listen: SocketAddr::from(([0, 0, 0, 0], 9000)),
        }
    }
}
