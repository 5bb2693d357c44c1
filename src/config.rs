use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use thiserror::Error;

use crate::review::prompt::{RuleBook, RuleSet};

pub const GITHUB_TOKEN_VAR: &str = "GITHUB_TOKEN";
pub const GENAI_API_KEY_VAR: &str = "GENAI_API_KEY";

const DEFAULT_CONFIG_FILE: &str = ".pr-reviewer.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("{0} environment variable not set.")]
    MissingEnv(&'static str),
}

/// Run configuration, built once at startup and handed to every client.
///
/// Everything except the two credentials can come from `.pr-reviewer.toml`.
/// Credentials are only ever read from the environment.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub github: GitHubConfig,

    #[serde(default)]
    pub genai: GenAiConfig,

    #[serde(default)]
    pub http: HttpConfig,

    /// Extra repository names mapped to a built-in rule set key
    /// (e.g. `"billing-api" = "laravel-api"`).
    #[serde(default)]
    pub repositories: BTreeMap<String, RuleSet>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GitHubConfig {
    /// Filled from GITHUB_TOKEN.
    #[serde(skip)]
    pub token: String,
    pub api_url: String,
}

impl Default for GitHubConfig {
    fn default() -> Self {
        Self {
            token: String::new(),
            api_url: "https://api.github.com".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GenAiConfig {
    /// Filled from GENAI_API_KEY.
    #[serde(skip)]
    pub api_key: String,
    pub model: String,
    pub api_url: String,
}

impl Default for GenAiConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            model: "gemini-2.0-flash-001".to_string(),
            api_url: "https://generativelanguage.googleapis.com".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    /// Per-request timeout applied to every outgoing call.
    pub timeout_secs: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self { timeout_secs: 120 }
    }
}

impl Config {
    /// Load configuration from `path`, or from `.pr-reviewer.toml` in the
    /// current directory when no path is given, then read the credentials
    /// from the process environment.
    ///
    /// A missing default file yields the default config; an explicitly
    /// requested file must exist.
    pub fn load(path: Option<&Path>) -> Result<Config, ConfigError> {
        let config = match path {
            Some(path) => Self::load_from(path)?,
            None => {
                let default_path = Path::new(DEFAULT_CONFIG_FILE);
                if default_path.exists() {
                    Self::load_from(default_path)?
                } else {
                    Config::default()
                }
            }
        };

        config.with_env(|name| std::env::var(name).ok())
    }

    /// Load from a specific path (useful for testing).
    pub fn load_from(path: &Path) -> Result<Config, ConfigError> {
        let contents = fs::read_to_string(path)?;
        let config = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Fill in the credentials using `lookup` to resolve variable names.
    /// GITHUB_TOKEN is checked before GENAI_API_KEY; empty values count as unset.
    pub fn with_env<F>(mut self, lookup: F) -> Result<Config, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        self.github.token = required_var(&lookup, GITHUB_TOKEN_VAR)?;
        self.genai.api_key = required_var(&lookup, GENAI_API_KEY_VAR)?;
        Ok(self)
    }

    pub fn rule_book(&self) -> RuleBook {
        RuleBook::new(self.repositories.clone())
    }
}

fn required_var<F>(lookup: &F, name: &'static str) -> Result<String, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(name)
        .filter(|value| !value.is_empty())
        .ok_or(ConfigError::MissingEnv(name))
}
