use crate::errors::{GeminiError, GeminiResult};
use crate::executor::CodeDelivery;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_API_BASE_URL: &str = "https://generativelanguage.googleapis.com";
pub const DEFAULT_API_KEY_ENV: &str = "GOOGLE_AI_STUDIO_API_KEY";
pub const DEFAULT_MODEL: &str = "gemini-1.5-flash";
pub const DEFAULT_PROGRAM: &str = "python3";
/// Roughly 100k tokens at four characters per token
pub const DEFAULT_HISTORY_WARN_CHARS: usize = 400_000;

/// Models offered for selection
pub const AVAILABLE_MODELS: &[&str] = &[
    "gemini-2.0-flash-thinking-exp-1219",
    "gemini-2.0-flash-exp",
    "gemini-exp-1206",
    "learnlm-1.5-pro-experimental",
    "gemini-1.5-flash",
    "gemini-1.5-flash-8b",
    "gemini-1.5-pro",
];

pub fn is_available_model(model: &str) -> bool {
    AVAILABLE_MODELS.contains(&model)
}

/// How generated scripts are run
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq, Eq)]
pub struct ExecutorConfig {
    pub program: Option<String>,
    pub args: Option<Vec<String>>,
    pub delivery: Option<CodeDelivery>,
    pub working_dir: Option<PathBuf>,
}

impl ExecutorConfig {
    pub fn merge(&self, other: &Self) -> Self {
        Self {
            program: other.program.clone().or_else(|| self.program.clone()),
            args: other.args.clone().or_else(|| self.args.clone()),
            delivery: other.delivery.or(self.delivery),
            working_dir: other
                .working_dir
                .clone()
                .or_else(|| self.working_dir.clone()),
        }
    }
}

/// Configuration struct for the studio pipeline
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct StudioConfig {
    pub api_key: Option<String>,
    pub api_key_env: Option<String>,
    pub model_name: Option<String>,
    pub api_base_url: Option<String>,
    /// No timeout unless set: a stalled request blocks the invocation
    pub request_timeout_secs: Option<u64>,
    pub history_warn_chars: Option<usize>,
    pub echo_code: Option<bool>,
    pub directive: Option<String>,
    pub executor: ExecutorConfig,
}

impl Default for StudioConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            api_key_env: Some(DEFAULT_API_KEY_ENV.to_string()),
            model_name: Some(DEFAULT_MODEL.to_string()),
            api_base_url: Some(DEFAULT_API_BASE_URL.to_string()),
            request_timeout_secs: None,
            history_warn_chars: Some(DEFAULT_HISTORY_WARN_CHARS),
            echo_code: Some(true),
            directive: None,
            executor: ExecutorConfig {
                program: Some(DEFAULT_PROGRAM.to_string()),
                args: Some(Vec::new()),
                delivery: Some(CodeDelivery::Stdin),
                working_dir: None,
            },
        }
    }
}

impl StudioConfig {
    /// A config with every field unset, used to carry overrides into `merge`
    pub fn overrides() -> Self {
        Self {
            api_key: None,
            api_key_env: None,
            model_name: None,
            api_base_url: None,
            request_timeout_secs: None,
            history_warn_chars: None,
            echo_code: None,
            directive: None,
            executor: ExecutorConfig::default(),
        }
    }

    /// Loads configuration from a file if it exists, otherwise returns the default config
    pub fn load_from_file(path: &Path) -> GeminiResult<Self> {
        if path.exists() {
            let content = fs::read_to_string(path).map_err(|e| {
                GeminiError::ConfigError(format!("Failed to read config file: {}", e))
            })?;

            let config: Self = toml::from_str(&content).map_err(|e| {
                GeminiError::ConfigError(format!("Failed to parse config file: {}", e))
            })?;

            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    /// Saves configuration to a file
    pub fn save_to_file(&self, path: &Path) -> GeminiResult<()> {
        let content = toml::to_string(self).map_err(|e| {
            GeminiError::ConfigError(format!("Failed to serialize config: {}", e))
        })?;

        // Ensure the directory exists
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                GeminiError::ConfigError(format!("Failed to create config directory: {}", e))
            })?;
        }

        fs::write(path, content).map_err(|e| {
            GeminiError::ConfigError(format!("Failed to write config file: {}", e))
        })?;

        Ok(())
    }

    /// Merges this config with another config, preferring values from the other config if present
    pub fn merge(&self, other: &Self) -> Self {
        Self {
            api_key: other.api_key.clone().or_else(|| self.api_key.clone()),
            api_key_env: other
                .api_key_env
                .clone()
                .or_else(|| self.api_key_env.clone()),
            model_name: other.model_name.clone().or_else(|| self.model_name.clone()),
            api_base_url: other
                .api_base_url
                .clone()
                .or_else(|| self.api_base_url.clone()),
            request_timeout_secs: other.request_timeout_secs.or(self.request_timeout_secs),
            history_warn_chars: other.history_warn_chars.or(self.history_warn_chars),
            echo_code: other.echo_code.or(self.echo_code),
            directive: other.directive.clone().or_else(|| self.directive.clone()),
            executor: self.executor.merge(&other.executor),
        }
    }

    pub fn model_name(&self) -> &str {
        self.model_name.as_deref().unwrap_or(DEFAULT_MODEL)
    }

    pub fn api_key_env(&self) -> &str {
        self.api_key_env.as_deref().unwrap_or(DEFAULT_API_KEY_ENV)
    }

    pub fn api_base_url(&self) -> &str {
        self.api_base_url.as_deref().unwrap_or(DEFAULT_API_BASE_URL)
    }

    pub fn history_warn_chars(&self) -> usize {
        self.history_warn_chars
            .unwrap_or(DEFAULT_HISTORY_WARN_CHARS)
    }

    pub fn echo_code(&self) -> bool {
        self.echo_code.unwrap_or(true)
    }
}

/// Picks the explicit key if it is not blank, else the named environment variable if it is not blank
pub fn resolve_api_key(explicit: Option<&str>, env_var: &str) -> Option<String> {
    explicit
        .map(str::trim)
        .filter(|key| !key.is_empty())
        .map(str::to_string)
        .or_else(|| {
            env::var(env_var)
                .ok()
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        })
}

/// Helper function to get default config directory
pub fn get_default_config_dir(app_name: &str) -> GeminiResult<PathBuf> {
    let home_dir = dirs::home_dir().ok_or_else(|| {
        GeminiError::ConfigError("Could not determine home directory".to_string())
    })?;

    let config_dir = home_dir.join(".config").join(app_name);

    Ok(config_dir)
}

/// Helper function to get default config file path
pub fn get_default_config_file(app_name: &str) -> GeminiResult<PathBuf> {
    let config_dir = get_default_config_dir(app_name)?;
    Ok(config_dir.join("config.toml"))
}
