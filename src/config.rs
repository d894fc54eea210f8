use crate::cli::{Cli, OutputFormat};
use reqwest::Url;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use thiserror::Error;

/// Origin of the hosted validation service
pub const DEFAULT_BASE_URL: &str = "https://validator-api.semweb.yandex.ru";

/// Trait for abstracting environment variable access
pub trait EnvProvider {
    fn get(&self, key: &str) -> Option<String>;
}

/// System environment variable provider for production use
pub struct SystemEnvProvider;

impl EnvProvider for SystemEnvProvider {
    fn get(&self, key: &str) -> Option<String> {
        std::env::var(key).ok()
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    TomlParsing(#[from] toml::de::Error),

    #[error("JSON parsing error: {0}")]
    JsonParsing(#[from] serde_json::Error),

    #[error("Configuration validation error: {0}")]
    Validation(String),

    #[error("Environment variable error: {0}")]
    Environment(String),

    #[error("Unsupported configuration file format: {0}")]
    UnsupportedFormat(String),
}

pub type Result<T> = std::result::Result<T, ConfigError>;

/// Revision of the document parser API.
///
/// The service has been published under two incompatible paths, each with its
/// own name for the credential query parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ApiVersion {
    /// `/v1.1/document_parser?apikey=...`
    #[default]
    #[serde(rename = "v1.1")]
    V1_1,
    /// `/1.1/document_parser?api_key=...`
    #[serde(rename = "legacy")]
    Legacy,
}

impl ApiVersion {
    pub fn path(self) -> &'static str {
        match self {
            ApiVersion::V1_1 => "/v1.1/document_parser",
            ApiVersion::Legacy => "/1.1/document_parser",
        }
    }

    pub fn credential_param(self) -> &'static str {
        match self {
            ApiVersion::V1_1 => "apikey",
            ApiVersion::Legacy => "api_key",
        }
    }
}

impl fmt::Display for ApiVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiVersion::V1_1 => f.write_str("v1.1"),
            ApiVersion::Legacy => f.write_str("legacy"),
        }
    }
}

impl FromStr for ApiVersion {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "v1.1" | "current" => Ok(ApiVersion::V1_1),
            "legacy" | "1.1" => Ok(ApiVersion::Legacy),
            other => Err(ConfigError::Validation(format!(
                "Unknown API version '{}' (expected 'v1.1' or 'legacy')",
                other
            ))),
        }
    }
}

/// Settings for a [`crate::Validator`]
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ValidatorConfig {
    /// Service origin, without a trailing path
    pub base_url: String,
    /// Which path/credential-parameter pair to use
    pub api_version: ApiVersion,
    /// Overrides the version's request path
    pub path: Option<String>,
    /// Overrides the version's credential query parameter name
    pub credential_param: Option<String>,
    /// HTTP request timeout in seconds; unset means no client-side timeout
    pub timeout_seconds: Option<u64>,
    /// User agent string
    pub user_agent: String,
}

impl Default for ValidatorConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_version: ApiVersion::default(),
            path: None,
            credential_param: None,
            timeout_seconds: None,
            user_agent: format!("semweb-validator/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl ValidatorConfig {
    pub fn path(&self) -> &str {
        self.path
            .as_deref()
            .unwrap_or_else(|| self.api_version.path())
    }

    pub fn credential_param(&self) -> &str {
        self.credential_param
            .as_deref()
            .unwrap_or_else(|| self.api_version.credential_param())
    }
}

/// Output configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct OutputConfig {
    /// Output format
    pub format: OutputFormatConfig,
    /// Verbose output
    pub verbose: bool,
    /// Quiet mode (errors only)
    pub quiet: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: OutputFormatConfig::Human,
            verbose: false,
            quiet: false,
        }
    }
}

/// Output format configuration (serializable version of CLI OutputFormat)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormatConfig {
    Human,
    Json,
}

impl From<OutputFormat> for OutputFormatConfig {
    fn from(format: OutputFormat) -> Self {
        match format {
            OutputFormat::Human => OutputFormatConfig::Human,
            OutputFormat::Json => OutputFormatConfig::Json,
        }
    }
}

impl From<OutputFormatConfig> for OutputFormat {
    fn from(format: OutputFormatConfig) -> Self {
        match format {
            OutputFormatConfig::Human => OutputFormat::Human,
            OutputFormatConfig::Json => OutputFormat::Json,
        }
    }
}

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct Config {
    /// API key for the validation service
    pub token: Option<String>,
    pub validator: ValidatorConfig,
    pub output: OutputConfig,
}

/// Configuration manager for loading and merging configurations
pub struct ConfigManager;

impl ConfigManager {
    /// Load configuration with precedence: file -> environment -> CLI
    pub async fn load_config(cli: &Cli) -> Result<Config> {
        let mut config = Config::default();

        if let Some(config_path) = &cli.config {
            config = Self::load_from_file(config_path).await?;
        } else if let Some(found_config) = Self::find_config_file().await? {
            config = found_config;
        }

        config = Self::apply_environment_overrides(config)?;
        config = Self::merge_with_cli(config, cli)?;

        Self::validate_config(&config)?;

        Ok(config)
    }

    /// Load configuration from a file (TOML or JSON)
    pub async fn load_from_file(path: &Path) -> Result<Config> {
        let content = tokio::fs::read_to_string(path).await?;

        match path.extension().and_then(|ext| ext.to_str()) {
            Some("toml") => Ok(toml::from_str(&content)?),
            Some("json") => Ok(serde_json::from_str(&content)?),
            Some(ext) => Err(ConfigError::UnsupportedFormat(ext.to_string())),
            None => {
                // Try to parse as TOML first, then JSON
                if let Ok(config) = toml::from_str::<Config>(&content) {
                    Ok(config)
                } else {
                    Ok(serde_json::from_str(&content)?)
                }
            }
        }
    }

    /// Find configuration file in standard locations
    pub async fn find_config_file() -> Result<Option<Config>> {
        let config_names = [
            "semweb-validator.toml",
            "semweb-validator.json",
            ".semweb-validator.toml",
            ".semweb-validator.json",
        ];

        for name in &config_names {
            let path = PathBuf::from(name);
            if path.exists() {
                return Ok(Some(Self::load_from_file(&path).await?));
            }
        }

        if let Some(config_dir) = dirs::config_dir() {
            let app_config_dir = config_dir.join("semweb-validator");
            for name in &config_names {
                let path = app_config_dir.join(name);
                if path.exists() {
                    return Ok(Some(Self::load_from_file(&path).await?));
                }
            }
        }

        Ok(None)
    }

    /// Apply environment variable overrides using the system environment
    pub fn apply_environment_overrides(config: Config) -> Result<Config> {
        Self::apply_environment_overrides_with(&SystemEnvProvider, config)
    }

    /// Apply environment variable overrides with a custom environment provider
    pub fn apply_environment_overrides_with(
        env: &impl EnvProvider,
        mut config: Config,
    ) -> Result<Config> {
        if let Some(token) = env.get("SEMWEB_VALIDATOR_TOKEN") {
            config.token = Some(token);
        }

        if let Some(base_url) = env.get("SEMWEB_VALIDATOR_BASE_URL") {
            config.validator.base_url = base_url;
        }

        if let Some(version) = env.get("SEMWEB_VALIDATOR_API_VERSION") {
            config.validator.api_version = version.parse().map_err(|_| {
                ConfigError::Environment(format!(
                    "Invalid SEMWEB_VALIDATOR_API_VERSION value: {}",
                    version
                ))
            })?;
        }

        if let Some(path) = env.get("SEMWEB_VALIDATOR_PATH") {
            config.validator.path = Some(path);
        }

        if let Some(param) = env.get("SEMWEB_VALIDATOR_CREDENTIAL_PARAM") {
            config.validator.credential_param = Some(param);
        }

        if let Some(timeout) = env.get("SEMWEB_VALIDATOR_TIMEOUT") {
            config.validator.timeout_seconds = Some(timeout.parse().map_err(|_| {
                ConfigError::Environment(format!(
                    "Invalid SEMWEB_VALIDATOR_TIMEOUT value: {}",
                    timeout
                ))
            })?);
        }

        if let Some(format) = env.get("SEMWEB_VALIDATOR_FORMAT") {
            config.output.format = match format.to_lowercase().as_str() {
                "human" => OutputFormatConfig::Human,
                "json" => OutputFormatConfig::Json,
                _ => {
                    return Err(ConfigError::Environment(format!(
                        "Invalid SEMWEB_VALIDATOR_FORMAT value: {}",
                        format
                    )));
                }
            };
        }

        Ok(config)
    }

    /// Merge CLI arguments with configuration (CLI takes precedence)
    pub fn merge_with_cli(mut config: Config, cli: &Cli) -> Result<Config> {
        if let Some(token) = &cli.token {
            config.token = Some(token.clone());
        }
        if let Some(base_url) = &cli.base_url {
            config.validator.base_url = base_url.clone();
        }
        if let Some(version) = &cli.api_version {
            config.validator.api_version = version.parse()?;
        }
        if cli.timeout.is_some() {
            config.validator.timeout_seconds = cli.timeout;
        }
        if let Some(format) = &cli.output_format {
            config.output.format = (*format).into();
        }
        config.output.verbose |= cli.verbose;
        config.output.quiet |= cli.quiet;

        Ok(config)
    }

    /// Validate configuration values
    pub fn validate_config(config: &Config) -> Result<()> {
        let validator = &config.validator;

        let url = Url::parse(&validator.base_url).map_err(|e| {
            ConfigError::Validation(format!("Invalid base URL '{}': {}", validator.base_url, e))
        })?;
        if url.scheme() != "http" && url.scheme() != "https" {
            return Err(ConfigError::Validation(format!(
                "Base URL must use http or https, got '{}'",
                url.scheme()
            )));
        }

        if !validator.path().starts_with('/') {
            return Err(ConfigError::Validation(format!(
                "Request path must start with '/', got '{}'",
                validator.path()
            )));
        }

        if validator.credential_param().trim().is_empty() {
            return Err(ConfigError::Validation(
                "Credential parameter name must not be empty".to_string(),
            ));
        }

        if validator.timeout_seconds == Some(0) {
            return Err(ConfigError::Validation(
                "Timeout must be greater than 0".to_string(),
            ));
        }

        if config.output.verbose && config.output.quiet {
            return Err(ConfigError::Validation(
                "Verbose and quiet output are mutually exclusive".to_string(),
            ));
        }

        Ok(())
    }
}
