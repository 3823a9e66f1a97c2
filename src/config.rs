use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::env;
use wager_metrics::MetricsConfig;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub database: DatabaseConfig,
    pub server: ServerConfig,
    pub analytics: AnalyticsConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyticsConfig {
    pub min_bucket_sample: usize,
    pub kelly_cap: f64,
    pub variation_fallback_days: i64,
    pub value_bet_threshold: f64,
    pub refresh_interval_seconds: u64,
}

impl AppConfig {
    pub fn new() -> Result<Self, ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let config = Config::builder()
            // Start with default values
            .set_default("database.url", "postgresql://localhost:5432/wager_rs_dev")?
            .set_default("database.max_connections", 20)?
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 8080)?
            .set_default("analytics.min_bucket_sample", 5)?
            .set_default("analytics.kelly_cap", 25.0)?
            .set_default("analytics.variation_fallback_days", 30)?
            .set_default("analytics.value_bet_threshold", 10.0)?
            .set_default("analytics.refresh_interval_seconds", 300)?
            // Add in settings from configuration file
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", run_mode)).required(false))
            .add_source(File::with_name("config/local").required(false))
            // Add in settings from environment variables
            .add_source(Environment::new().separator("_"))
            .build()?;

        config.try_deserialize()
    }

    pub fn database_url(&self) -> &str {
        &self.database.url
    }

    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    /// Thresholds for the metrics engine; bucket edges keep their built-in
    /// defaults.
    pub fn metrics_config(&self) -> MetricsConfig {
        MetricsConfig {
            min_bucket_sample: self.analytics.min_bucket_sample,
            kelly_cap: self.analytics.kelly_cap,
            variation_fallback_days: self.analytics.variation_fallback_days,
            value_bet_threshold: self.analytics.value_bet_threshold,
            ..MetricsConfig::default()
        }
    }
}
