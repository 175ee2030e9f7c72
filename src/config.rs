//! Configuration management for `TripSage`
//!
//! Handles loading configuration from files, environment variables,
//! and provides validation for all configuration settings.

use crate::TripSageError;
use anyhow::{Context, Result};
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration structure for `TripSage`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TripSageConfig {
    /// Language model endpoint configuration
    #[serde(default)]
    pub llm: LlmConfig,
    /// Per-agent overrides
    #[serde(default)]
    pub agents: AgentsConfig,
    /// Data-fetch tool configuration
    #[serde(default)]
    pub tools: ToolsConfig,
    /// Planning pipeline settings
    #[serde(default)]
    pub planning: PlanningConfig,
    /// Web server settings
    #[serde(default)]
    pub server: ServerConfig,
    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// OpenAI-compatible chat completions endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// API key (falls back to `OPENAI_API_KEY`)
    pub api_key: Option<String>,
    /// Base URL, `/chat/completions` is appended
    #[serde(default = "default_llm_base_url")]
    pub base_url: String,
    /// Default model for all agents
    #[serde(default = "default_llm_model")]
    pub model: String,
    /// Default sampling temperature
    #[serde(default = "default_llm_temperature")]
    pub temperature: f32,
    /// Maximum completion tokens per dispatch
    #[serde(default = "default_llm_max_tokens")]
    pub max_tokens: u32,
    /// Request timeout in seconds
    #[serde(default = "default_llm_timeout")]
    pub timeout_seconds: u32,
    /// Maximum number of retries for transient failures
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
}

/// Model overrides for a single agent
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AgentOverrides {
    pub model: Option<String>,
    pub temperature: Option<f32>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AgentsConfig {
    #[serde(default)]
    pub web_research: AgentOverrides,
    #[serde(default)]
    pub travel: AgentOverrides,
    #[serde(default)]
    pub reporter: AgentOverrides,
}

/// Data-fetch tool settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolsConfig {
    /// Attach an Open-Meteo forecast to the weather task
    #[serde(default = "default_true")]
    pub weather_enabled: bool,
    /// Attach Wikipedia image candidates to the destination task
    #[serde(default = "default_true")]
    pub images_enabled: bool,
    #[serde(default = "default_geocoding_base_url")]
    pub geocoding_base_url: String,
    #[serde(default = "default_weather_base_url")]
    pub weather_base_url: String,
    #[serde(default = "default_wikipedia_base_url")]
    pub wikipedia_base_url: String,
    /// Request timeout in seconds
    #[serde(default = "default_tools_timeout")]
    pub timeout_seconds: u32,
    /// Maximum number of retries for transient failures
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    /// Flight search credentials; flight lookups are off without them
    pub amadeus: Option<AmadeusConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AmadeusConfig {
    pub client_id: String,
    pub client_secret: String,
    #[serde(default = "default_amadeus_base_url")]
    pub base_url: String,
    /// Currency prices are requested in
    #[serde(default = "default_amadeus_currency")]
    pub currency: String,
    #[serde(default = "default_amadeus_max_offers")]
    pub max_offers: u32,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PlanningConfig {
    /// Dispatch the five research tasks concurrently
    #[serde(default)]
    pub parallel: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_server_host")]
    pub host: String,
    #[serde(default = "default_server_port")]
    pub port: u16,
}

/// Logging configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (error, warn, info, debug, trace)
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Log format (pretty or json)
    #[serde(default = "default_log_format")]
    pub format: String,
}

// Default value functions
fn default_llm_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_llm_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_llm_temperature() -> f32 {
    0.7
}

fn default_llm_max_tokens() -> u32 {
    4096
}

fn default_llm_timeout() -> u32 {
    180
}

fn default_max_retries() -> u32 {
    3
}

fn default_true() -> bool {
    true
}

fn default_geocoding_base_url() -> String {
    "https://geocoding-api.open-meteo.com/v1".to_string()
}

fn default_weather_base_url() -> String {
    "https://api.open-meteo.com/v1".to_string()
}

fn default_wikipedia_base_url() -> String {
    "https://en.wikipedia.org/w/api.php".to_string()
}

fn default_tools_timeout() -> u32 {
    30
}

fn default_amadeus_base_url() -> String {
    "https://test.api.amadeus.com".to_string()
}

fn default_amadeus_currency() -> String {
    "INR".to_string()
}

fn default_amadeus_max_offers() -> u32 {
    3
}

fn default_server_host() -> String {
    "127.0.0.1".to_string()
}

fn default_server_port() -> u16 {
    8501
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_llm_base_url(),
            model: default_llm_model(),
            temperature: default_llm_temperature(),
            max_tokens: default_llm_max_tokens(),
            timeout_seconds: default_llm_timeout(),
            max_retries: default_max_retries(),
        }
    }
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            weather_enabled: true,
            images_enabled: true,
            geocoding_base_url: default_geocoding_base_url(),
            weather_base_url: default_weather_base_url(),
            wikipedia_base_url: default_wikipedia_base_url(),
            timeout_seconds: default_tools_timeout(),
            max_retries: default_max_retries(),
            amadeus: None,
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_server_host(),
            port: default_server_port(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl TripSageConfig {
    /// Load configuration from the default file location and environment variables
    pub fn load() -> Result<Self> {
        Self::load_from_path(None)
    }

    /// Load configuration from specified path
    pub fn load_from_path(config_path: Option<PathBuf>) -> Result<Self> {
        let mut builder = Config::builder();

        // An explicit path must exist, the default location is optional
        match config_path {
            Some(path) => {
                builder = builder.add_source(
                    File::from(path.clone())
                        .required(true)
                        .format(config::FileFormat::Toml),
                );
            }
            None => {
                if let Some(path) = Self::get_config_path().filter(|p| p.exists()) {
                    builder = builder.add_source(
                        File::from(path)
                            .required(false)
                            .format(config::FileFormat::Toml),
                    );
                }
            }
        }

        // TRIPSAGE_LLM__API_KEY -> llm.api_key
        builder = builder.add_source(
            Environment::with_prefix("TRIPSAGE")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let settings = builder
            .build()
            .with_context(|| "Failed to build configuration")?;

        let mut config: TripSageConfig = settings
            .try_deserialize()
            .with_context(|| "Failed to deserialize configuration")?;

        if config.llm.api_key.is_none() {
            config.llm.api_key = std::env::var("OPENAI_API_KEY").ok();
        }

        config.apply_defaults();
        config.validate()?;

        Ok(config)
    }

    /// Get the default configuration file path
    #[must_use]
    pub fn get_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("tripsage").join("config.toml"))
    }

    /// Apply default values to blank configuration fields
    pub fn apply_defaults(&mut self) {
        if self.llm.base_url.is_empty() {
            self.llm.base_url = default_llm_base_url();
        }
        if self.llm.model.is_empty() {
            self.llm.model = default_llm_model();
        }
        if self.llm.timeout_seconds == 0 {
            self.llm.timeout_seconds = default_llm_timeout();
        }
        if self.llm.max_tokens == 0 {
            self.llm.max_tokens = default_llm_max_tokens();
        }
        if self.tools.timeout_seconds == 0 {
            self.tools.timeout_seconds = default_tools_timeout();
        }
        if self.server.host.is_empty() {
            self.server.host = default_server_host();
        }
        if self.logging.level.is_empty() {
            self.logging.level = default_log_level();
        }
        if self.logging.format.is_empty() {
            self.logging.format = default_log_format();
        }
        if matches!(self.llm.api_key.as_deref(), Some("")) {
            self.llm.api_key = None;
        }
    }

    /// Validate all configuration settings
    pub fn validate(&self) -> Result<()> {
        self.validate_numeric_ranges()?;
        self.validate_string_values()?;
        self.validate_amadeus()?;
        Ok(())
    }

    /// The model API key, required before any dispatch can happen
    pub fn require_api_key(&self) -> crate::Result<&str> {
        self.llm.api_key.as_deref().ok_or_else(|| {
            TripSageError::config(
                "No model API key configured. Set TRIPSAGE_LLM__API_KEY or OPENAI_API_KEY.",
            )
        })
    }

    /// Validate numeric configuration ranges
    fn validate_numeric_ranges(&self) -> Result<()> {
        if self.llm.timeout_seconds > 600 {
            return Err(TripSageError::config("LLM timeout cannot exceed 600 seconds").into());
        }

        if self.llm.max_retries > 10 || self.tools.max_retries > 10 {
            return Err(TripSageError::config("Max retries cannot exceed 10").into());
        }

        if self.tools.timeout_seconds > 300 {
            return Err(TripSageError::config("Tool timeout cannot exceed 300 seconds").into());
        }

        let temperatures = [
            Some(self.llm.temperature),
            self.agents.web_research.temperature,
            self.agents.travel.temperature,
            self.agents.reporter.temperature,
        ];
        if temperatures
            .into_iter()
            .flatten()
            .any(|t| !(0.0..=2.0).contains(&t))
        {
            return Err(TripSageError::config("Temperature must be between 0.0 and 2.0").into());
        }

        Ok(())
    }

    /// Validate string configuration values
    fn validate_string_values(&self) -> Result<()> {
        let valid_log_levels = ["error", "warn", "info", "debug", "trace"];
        if !valid_log_levels.contains(&self.logging.level.as_str()) {
            return Err(TripSageError::config(format!(
                "Invalid log level '{}'. Must be one of: {}",
                self.logging.level,
                valid_log_levels.join(", ")
            ))
            .into());
        }

        let valid_log_formats = ["pretty", "json"];
        if !valid_log_formats.contains(&self.logging.format.as_str()) {
            return Err(TripSageError::config(format!(
                "Invalid log format '{}'. Must be one of: {}",
                self.logging.format,
                valid_log_formats.join(", ")
            ))
            .into());
        }

        let urls = [
            ("LLM", &self.llm.base_url),
            ("Geocoding", &self.tools.geocoding_base_url),
            ("Weather", &self.tools.weather_base_url),
            ("Wikipedia", &self.tools.wikipedia_base_url),
        ];
        for (name, url) in urls {
            if !is_http_url(url) {
                return Err(TripSageError::config(format!(
                    "{name} base URL must be a valid HTTP or HTTPS URL"
                ))
                .into());
            }
        }

        Ok(())
    }

    fn validate_amadeus(&self) -> Result<()> {
        if let Some(amadeus) = &self.tools.amadeus {
            if amadeus.client_id.is_empty() || amadeus.client_secret.is_empty() {
                return Err(TripSageError::config(
                    "Amadeus client_id and client_secret must both be set, or the section removed",
                )
                .into());
            }
            if !is_http_url(&amadeus.base_url) {
                return Err(TripSageError::config(
                    "Amadeus base URL must be a valid HTTP or HTTPS URL",
                )
                .into());
            }
            if amadeus.max_offers == 0 || amadeus.max_offers > 20 {
                return Err(
                    TripSageError::config("Amadeus max_offers must be between 1 and 20").into(),
                );
            }
        }
        Ok(())
    }
}

fn is_http_url(url: &str) -> bool {
    url.starts_with("http://") || url.starts_with("https://")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = TripSageConfig::default();
        assert_eq!(config.llm.base_url, "https://api.openai.com/v1");
        assert_eq!(config.llm.timeout_seconds, 180);
        assert_eq!(config.tools.weather_base_url, "https://api.open-meteo.com/v1");
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.server.port, 8501);
        assert!(!config.planning.parallel);
        assert!(config.llm.api_key.is_none());
        assert!(config.tools.amadeus.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_require_api_key() {
        let mut config = TripSageConfig::default();
        assert!(matches!(
            config.require_api_key(),
            Err(TripSageError::Config { .. })
        ));

        config.llm.api_key = Some("sk-test".to_string());
        assert_eq!(config.require_api_key().unwrap(), "sk-test");
    }

    #[test]
    fn test_blank_api_key_is_treated_as_missing() {
        let mut config = TripSageConfig::default();
        config.llm.api_key = Some(String::new());
        config.apply_defaults();
        assert!(config.llm.api_key.is_none());
    }

    #[test]
    fn test_config_validation_invalid_log_level() {
        let mut config = TripSageConfig::default();
        config.logging.level = "invalid".to_string();
        let result = config.validate();
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("Invalid log level"));
    }

    #[test]
    fn test_config_validation_numeric_ranges() {
        let mut config = TripSageConfig::default();
        config.llm.timeout_seconds = 5000;
        let result = config.validate();
        assert!(result.unwrap_err().to_string().contains("timeout cannot exceed"));

        let mut config = TripSageConfig::default();
        config.agents.travel.temperature = Some(3.5);
        let result = config.validate();
        assert!(result.unwrap_err().to_string().contains("Temperature"));
    }

    #[test]
    fn test_config_validation_urls() {
        let mut config = TripSageConfig::default();
        config.tools.wikipedia_base_url = "en.wikipedia.org".to_string();
        let result = config.validate();
        assert!(result.unwrap_err().to_string().contains("Wikipedia base URL"));
    }

    #[test]
    fn test_config_validation_amadeus() {
        let mut config = TripSageConfig::default();
        config.tools.amadeus = Some(AmadeusConfig {
            client_id: "id".to_string(),
            client_secret: String::new(),
            base_url: default_amadeus_base_url(),
            currency: default_amadeus_currency(),
            max_offers: 3,
        });
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_load_from_file() {
        let path = std::env::temp_dir().join(format!(
            "tripsage-config-test-{}.toml",
            std::process::id()
        ));
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(
            file,
            "[llm]\nmodel = \"llama-3.1-70b\"\nbase_url = \"https://api.groq.com/openai/v1\"\n\n\
             [agents.reporter]\ntemperature = 0.3\n\n\
             [planning]\nparallel = true\n\n\
             [server]\nport = 9000\n"
        )
        .unwrap();

        let config = TripSageConfig::load_from_path(Some(path.clone())).unwrap();
        std::fs::remove_file(&path).unwrap();

        assert_eq!(config.llm.model, "llama-3.1-70b");
        assert_eq!(config.llm.base_url, "https://api.groq.com/openai/v1");
        assert_eq!(config.agents.reporter.temperature, Some(0.3));
        assert!(config.planning.parallel);
        assert_eq!(config.server.port, 9000);
        // untouched sections keep their defaults
        assert_eq!(config.logging.format, "pretty");
        assert!(config.tools.images_enabled);
    }

    #[test]
    fn test_load_from_missing_explicit_path_fails() {
        let path = std::env::temp_dir().join("tripsage-definitely-missing.toml");
        assert!(TripSageConfig::load_from_path(Some(path)).is_err());
    }

    #[test]
    fn test_config_path_generation() {
        if let Some(path) = TripSageConfig::get_config_path() {
            assert!(path.to_string_lossy().contains("tripsage"));
            assert!(path.to_string_lossy().ends_with("config.toml"));
        }
    }
}
