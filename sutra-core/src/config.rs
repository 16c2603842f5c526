use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    Parse(#[from] serde_yaml::Error),
}

pub type Result<T> = std::result::Result<T, ConfigError>;

/// Configuration for a question-answering session.
///
/// Everything here is fixed for the lifetime of a session: the completion
/// parameters are never tuned per request.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub llm: LlmConfig,
    pub document: DocumentConfig,
    pub retrieval: RetrievalConfig,
    pub persona: PersonaConfig,
}

/// Configuration for the hosted completion service.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    pub model: String,
    /// OpenAI-compatible API root, without the `/chat/completions` suffix
    pub base_url: String,
    /// Name of the environment variable holding the bearer credential
    pub api_key_env: String,
    pub temperature: f64,
    pub max_tokens: u32,
    /// Nucleus-sampling threshold
    pub top_p: f64,
}

/// Location of the reference document.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DocumentConfig {
    /// PDF, or plain text with form-feed page breaks
    pub path: String,
}

/// Configuration for page retrieval.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrievalConfig {
    /// Number of pages handed to the model as context
    pub top_n: usize,
}

/// How the assistant presents itself in prompts and in the transcript.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PersonaConfig {
    /// Speaker label for assistant turns, also used in the prompt
    pub name: String,
    /// One-line self description following the name in the prompt
    pub description: String,
    /// Title used for the context heading
    pub source_title: String,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            model: "deepseek-r1-distill-llama-70b".to_string(),
            base_url: "https://api.groq.com/openai/v1".to_string(),
            api_key_env: "GROQ_API_KEY".to_string(),
            temperature: 0.6,
            max_tokens: 4096,
            top_p: 0.95,
        }
    }
}

impl Default for DocumentConfig {
    fn default() -> Self {
        Self {
            path: "project/Bhagavad-GitaAsItis.pdf".to_string(),
        }
    }
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            top_n: crate::rag::DEFAULT_TOP_N,
        }
    }
}

impl Default for PersonaConfig {
    fn default() -> Self {
        Self {
            name: "Bhagavad Gita".to_string(),
            description: "the divine scripture".to_string(),
            source_title: "Bhagavad Gita".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from a YAML file.
    ///
    /// Missing sections and keys fall back to their defaults.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        let config: Config = serde_yaml::from_str(&contents)?;
        Ok(config)
    }

    /// Load configuration from `config.yaml` if it exists, otherwise use defaults.
    pub fn load_or_default() -> Self {
        Self::load("config.yaml").unwrap_or_default()
    }

    /// Reads the completion-service credential from the configured variable.
    pub fn api_key(&self) -> Option<String> {
        std::env::var(&self.llm.api_key_env)
            .ok()
            .filter(|key| !key.trim().is_empty())
    }
}
