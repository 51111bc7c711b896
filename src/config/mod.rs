use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::consts;
use crate::errors::AssistantError;

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: consts::SERVER_HOST.to_string(),
            port: consts::SERVER_PORT,
        }
    }
}

/// Secret fields (`api_key`) name an environment variable until
/// [`resolve_secrets`] swaps in its value.
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct OpenAIConfig {
    pub api_url: String,
    pub api_key: String,
    pub model: String,
}

impl Default for OpenAIConfig {
    fn default() -> Self {
        Self {
            api_url: consts::OPENAI_API_URL.to_string(),
            api_key: "OPENAI_API_KEY".to_string(),
            model: consts::OPENAI_MODEL.to_string(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct AnthropicConfig {
    pub api_url: String,
    pub api_key: String,
    pub model: String,
    pub max_tokens: u32,
    pub temperature: f32,
}

impl Default for AnthropicConfig {
    fn default() -> Self {
        Self {
            api_url: consts::ANTHROPIC_API_URL.to_string(),
            api_key: "ANTHROPIC_API_KEY".to_string(),
            model: consts::ANTHROPIC_MODEL.to_string(),
            max_tokens: consts::ANTHROPIC_MAX_TOKENS,
            temperature: 0.0,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct SearchConfig {
    pub api_url: String,
    pub api_key: String,
    pub engine: String,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            api_url: consts::SEARCH_API_URL.to_string(),
            api_key: "SEARCH_API_KEY".to_string(),
            engine: consts::SEARCH_ENGINE.to_string(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct PubMedConfig {
    pub eutils_url: String,
    pub api_key: String,
    pub search_batch_size: usize,
    pub fetch_batch_size: usize,
    pub delay_ms: u64,
    pub retries: u32,
    pub backoff_secs: f64,
}

impl Default for PubMedConfig {
    fn default() -> Self {
        Self {
            eutils_url: consts::EUTILS_URL.to_string(),
            api_key: "PUBMED_API_KEY".to_string(),
            search_batch_size: consts::PUBMED_SEARCH_BATCH,
            fetch_batch_size: consts::PUBMED_FETCH_BATCH,
            delay_ms: consts::PUBMED_DELAY_MS,
            retries: consts::PUBMED_RETRIES,
            backoff_secs: consts::PUBMED_BACKOFF_SECS,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct PmcConfig {
    pub articles_url: String,
    pub oa_list_url: String,
    pub delay_ms: u64,
}

impl Default for PmcConfig {
    fn default() -> Self {
        Self {
            articles_url: consts::PMC_ARTICLES_URL.to_string(),
            oa_list_url: consts::PMC_OA_LIST_URL.to_string(),
            delay_ms: consts::PMC_DELAY_MS,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct AssistantConfig {
    pub max_tool_rounds: u32,
}

impl Default for AssistantConfig {
    fn default() -> Self {
        Self {
            max_tool_rounds: consts::DEFAULT_MAX_TOOL_ROUNDS,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Default)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub openai: OpenAIConfig,
    pub anthropic: AnthropicConfig,
    pub search: SearchConfig,
    pub pubmed: PubMedConfig,
    pub pmc: PmcConfig,
    pub assistant: AssistantConfig,
}

impl Config {
    pub fn from_json_str(json: &str) -> Result<Config, AssistantError> {
        Ok(serde_json::from_str(json)?)
    }

    /// The chat server cannot run without both provider keys.
    pub fn require_chat_keys(&self) -> Result<(), AssistantError> {
        let mut missing = vec![];
        if self.openai.api_key.is_empty() {
            missing.push("OPENAI_API_KEY");
        }
        if self.anthropic.api_key.is_empty() {
            missing.push("ANTHROPIC_API_KEY");
        }
        if missing.is_empty() {
            Ok(())
        } else {
            Err(AssistantError::ConfigError(format!(
                "{} not found in environment variables",
                missing.join(", ")
            )))
        }
    }

    pub fn require_pubmed_key(&self) -> Result<&str, AssistantError> {
        if self.pubmed.api_key.is_empty() {
            return Err(AssistantError::ConfigError(
                "PUBMED_API_KEY not found in environment variables".to_string(),
            ));
        }
        Ok(&self.pubmed.api_key)
    }
}

/// Replaces every env-var name held in a secret field with that variable's
/// value, or an empty string when it is unset.
pub fn resolve_secrets<F>(config: &mut Config, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    for key in [
        &mut config.openai.api_key,
        &mut config.anthropic.api_key,
        &mut config.search.api_key,
        &mut config.pubmed.api_key,
    ] {
        *key = lookup(key.as_str()).unwrap_or_default();
    }
}

pub trait ConfigLoader: Send + Sync {
    fn load_config(&self) -> Result<Config, AssistantError>;
}

pub struct FileConfigLoader {
    path: PathBuf,
}

impl FileConfigLoader {
    pub fn new() -> Self {
        let path = std::env::var(consts::CONFIG_FILE_ENV)
            .unwrap_or(consts::DEFAULT_CONFIG_FILE.to_string());
        Self::with_path(path)
    }

    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl Default for FileConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigLoader for FileConfigLoader {
    fn load_config(&self) -> Result<Config, AssistantError> {
        let mut config = if self.path.exists() {
            log::info!("loading config from {}", self.path.display());
            let config_str = std::fs::read_to_string(&self.path)?;
            Config::from_json_str(&config_str)?
        } else {
            log::debug!("no config file at {}, using defaults", self.path.display());
            Config::default()
        };

        resolve_secrets(&mut config, |name| std::env::var(name).ok());

        Ok(config)
    }
}

pub fn load_config() -> Result<Config, AssistantError> {
    let loader = FileConfigLoader::new();
    loader.load_config()
}
