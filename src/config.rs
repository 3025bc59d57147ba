//! Configuration management for Wattson
//!
//! This module handles loading, validation, and management of the application
//! configuration from YAML files with support for environment variable overrides.

use crate::error::{Result, WattsonError};
use serde::{Deserialize, Serialize};
use std::path::Path;

fn default_true() -> bool {
    true
}

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Home Assistant API connection configuration
    pub home_assistant: HomeAssistantConfig,

    /// Vehicle battery and home charger parameters
    pub charging: ChargingConfig,

    /// Logging configuration
    pub logging: LoggingConfig,

    /// Web server binding configuration
    pub web: WebConfig,
}

/// Home Assistant API connection parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HomeAssistantConfig {
    /// Base URL of the Home Assistant instance
    pub url: String,

    /// Long-lived access token; empty means resolve from env or token file
    pub token: String,

    /// Fallback token file with `export HA_TOKEN=...` lines
    pub token_file: String,

    /// Entity id of the vehicle battery level sensor
    pub battery_entity: String,

    /// Entity id of the vehicle range sensor (optional reading)
    pub range_entity: String,

    /// Entity id of the vehicle charging state sensor (optional reading)
    pub charging_entity: String,
}

/// Vehicle battery and home charger parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChargingConfig {
    /// Usable battery capacity in kWh
    pub battery_capacity_kwh: f64,

    /// Home charger power in kW
    pub charger_power_kw: f64,

    /// Duration of one tariff slot in hours (Agile publishes 30-minute slots)
    pub slot_duration_hours: f64,

    /// Default target charge percentage when the caller supplies none
    pub default_target_percent: u8,
}

impl ChargingConfig {
    /// Energy deliverable by the charger in one slot
    pub fn kwh_per_slot(&self) -> f64 {
        self.charger_power_kw * self.slot_duration_hours
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (TRACE, DEBUG, INFO, WARN, ERROR)
    pub level: String,

    /// Path to log file (or directory for rolling logs)
    pub file: String,

    /// Number of rotated files to keep
    pub backup_count: u32,

    /// Whether to log to console
    #[serde(default = "default_true")]
    pub console_output: bool,

    /// Whether to use JSON format
    pub json_format: bool,
}

/// Web server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WebConfig {
    /// Bind address
    pub host: String,

    /// TCP port
    pub port: u16,
}

impl Default for HomeAssistantConfig {
    fn default() -> Self {
        Self {
            url: "http://192.168.1.162:8123".to_string(),
            token: String::new(),
            token_file: "~/.config/homeassistant/tokens".to_string(),
            battery_entity: "sensor.tesla_model_y_battery".to_string(),
            range_entity: "sensor.tesla_model_y_range".to_string(),
            charging_entity: "sensor.tesla_model_y_charging".to_string(),
        }
    }
}

impl Default for ChargingConfig {
    fn default() -> Self {
        // Tesla Model Y Long Range on a 7 kW home charger
        Self {
            battery_capacity_kwh: 75.0,
            charger_power_kw: 7.0,
            slot_duration_hours: 0.5,
            default_target_percent: 80,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "INFO".to_string(),
            file: "/tmp/wattson.log".to_string(),
            backup_count: 5,
            console_output: true,
            json_format: false,
        }
    }
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 5050,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            home_assistant: HomeAssistantConfig::default(),
            charging: ChargingConfig::default(),
            logging: LoggingConfig::default(),
            web: WebConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from a YAML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let mut config: Config = serde_yaml::from_str(&contents)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Load configuration from the default locations
    pub fn load() -> Result<Self> {
        let default_paths = [
            "wattson_config.yaml",
            "/data/wattson_config.yaml",
            "/etc/wattson/config.yaml",
        ];

        for path in &default_paths {
            if Path::new(path).exists() {
                return Self::from_file(path);
            }
        }

        // Fall back to default configuration
        let mut config = Config::default();
        config.apply_env_overrides();
        Ok(config)
    }

    /// Save configuration to a YAML file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let yaml = serde_yaml::to_string(self)?;
        std::fs::write(path, yaml)?;
        Ok(())
    }

    /// Apply `HA_URL` / `HA_TOKEN` environment variable overrides
    fn apply_env_overrides(&mut self) {
        if let Ok(url) = std::env::var("HA_URL")
            && !url.is_empty()
        {
            self.home_assistant.url = url;
        }
        if let Ok(token) = std::env::var("HA_TOKEN")
            && !token.is_empty()
        {
            self.home_assistant.token = token;
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.home_assistant.url.is_empty() {
            return Err(WattsonError::validation(
                "home_assistant.url",
                "URL cannot be empty",
            ));
        }

        if self.home_assistant.battery_entity.is_empty() {
            return Err(WattsonError::validation(
                "home_assistant.battery_entity",
                "Entity id cannot be empty",
            ));
        }

        if self.charging.battery_capacity_kwh <= 0.0 {
            return Err(WattsonError::validation(
                "charging.battery_capacity_kwh",
                "Must be positive",
            ));
        }

        if self.charging.charger_power_kw <= 0.0 {
            return Err(WattsonError::validation(
                "charging.charger_power_kw",
                "Must be positive",
            ));
        }

        if self.charging.slot_duration_hours <= 0.0 {
            return Err(WattsonError::validation(
                "charging.slot_duration_hours",
                "Must be positive",
            ));
        }

        if self.charging.default_target_percent > 100 {
            return Err(WattsonError::validation(
                "charging.default_target_percent",
                "Must be at most 100",
            ));
        }

        if self.web.port == 0 {
            return Err(WattsonError::validation(
                "web.port",
                "Port must be greater than 0",
            ));
        }

        Ok(())
    }

    /// Resolve the Home Assistant access token.
    ///
    /// Order: explicit config value, then the token file (lines of the form
    /// `export HA_TOKEN="..."`). Env overrides are applied at load time.
    pub fn resolve_token(&self) -> Result<String> {
        if !self.home_assistant.token.is_empty() {
            return Ok(self.home_assistant.token.clone());
        }

        let path = expand_home(&self.home_assistant.token_file);
        if Path::new(&path).exists() {
            let contents = std::fs::read_to_string(&path)?;
            for line in contents.lines() {
                if let Some(rest) = line.strip_prefix("export HA_TOKEN=") {
                    let token = rest.trim().trim_matches('"').to_string();
                    if !token.is_empty() {
                        return Ok(token);
                    }
                }
            }
        }

        Err(WattsonError::config("No Home Assistant token found"))
    }
}

/// Expand a leading `~/` using the HOME environment variable
fn expand_home(path: &str) -> String {
    if let Some(rest) = path.strip_prefix("~/")
        && let Ok(home) = std::env::var("HOME")
    {
        return format!("{}/{}", home.trim_end_matches('/'), rest);
    }
    path.to_string()
}
