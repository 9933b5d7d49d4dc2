// Configuration management with layered configuration (file, env)

use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::str::FromStr;

/// Main settings structure containing all configuration options
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub mailer: MailerConfig,
    pub scheduler: SchedulerConfig,
    pub observability: ObservabilityConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
    pub connect_timeout_seconds: u64,
}

/// Outbound email delivery over the provider's HTTP API
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MailerConfig {
    pub endpoint: String,
    #[serde(default)]
    pub api_token: String,
    pub from_address: String,
    pub from_name: String,
    pub timeout_seconds: u64,
    pub max_in_flight: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchedulerConfig {
    pub refresh_interval_seconds: u64,
    pub nudge_cron: String,
    pub timezone: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObservabilityConfig {
    pub log_level: String,
    pub metrics_port: u16,
    pub tracing_endpoint: Option<String>,
}

impl Settings {
    /// Load configuration with layered precedence: defaults → file → env
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from_path("config")
    }

    /// Load configuration from a specific path
    pub fn load_from_path<P: AsRef<Path>>(config_dir: P) -> Result<Self, ConfigError> {
        let config_dir = config_dir.as_ref();

        let builder = Config::builder()
            // Start with default configuration
            .add_source(File::from(config_dir.join("default.toml")).required(false))
            // Add local configuration (not committed to git)
            .add_source(File::from(config_dir.join("local.toml")).required(false))
            // Add environment-specific configuration
            .add_source(
                Environment::with_prefix("APP")
                    .separator("__")
                    .try_parsing(true),
            );

        let config = builder.build()?;
        config.try_deserialize()
    }

    /// Validate configuration settings
    pub fn validate(&self) -> Result<(), String> {
        // Validate server config
        if self.server.port == 0 {
            return Err("Server port must be greater than 0".to_string());
        }

        // Validate database config
        if self.database.url.is_empty() {
            return Err("Database URL cannot be empty".to_string());
        }
        if self.database.max_connections == 0 {
            return Err("Database max_connections must be greater than 0".to_string());
        }

        // Validate mailer config
        if self.mailer.endpoint.is_empty() {
            return Err("Mailer endpoint cannot be empty".to_string());
        }
        if self.mailer.from_address.is_empty() {
            return Err("Mailer from_address cannot be empty".to_string());
        }
        if self.mailer.timeout_seconds == 0 {
            return Err("Mailer timeout_seconds must be greater than 0".to_string());
        }
        if self.mailer.max_in_flight == 0 {
            return Err("Mailer max_in_flight must be greater than 0".to_string());
        }

        // Validate scheduler config
        if self.scheduler.refresh_interval_seconds == 0 {
            return Err("Scheduler refresh_interval_seconds must be greater than 0".to_string());
        }
        if cron::Schedule::from_str(&self.scheduler.nudge_cron).is_err() {
            return Err(format!(
                "Scheduler nudge_cron is not a valid cron expression: {}",
                self.scheduler.nudge_cron
            ));
        }
        if self.scheduler.timezone.parse::<chrono_tz::Tz>().is_err() {
            return Err(format!(
                "Scheduler timezone is not a known timezone: {}",
                self.scheduler.timezone
            ));
        }

        // Validate observability config
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.observability.log_level.as_str()) {
            return Err(format!(
                "Observability log_level must be one of trace, debug, info, warn, error; got {}",
                self.observability.log_level
            ));
        }

        Ok(())
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            database: DatabaseConfig::default(),
            mailer: MailerConfig::default(),
            scheduler: SchedulerConfig::default(),
            observability: ObservabilityConfig::default(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "postgresql://localhost/talentgrid".to_string(),
            max_connections: 10,
            min_connections: 2,
            connect_timeout_seconds: 30,
        }
    }
}

impl Default for MailerConfig {
    fn default() -> Self {
        Self {
            endpoint: "http://localhost:8025/api/send".to_string(),
            api_token: String::new(),
            from_address: "no-reply@talentgrid.local".to_string(),
            from_name: "TalentGrid".to_string(),
            timeout_seconds: 10,
            max_in_flight: 8,
        }
    }
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            refresh_interval_seconds: 60,
            nudge_cron: "0 0 8 * * *".to_string(),
            timezone: "Asia/Ho_Chi_Minh".to_string(),
        }
    }
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_port: 9090,
            tracing_endpoint: None,
        }
    }
}
