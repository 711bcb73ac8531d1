use std::{
    fs,
    path::{Path, PathBuf},
    str::FromStr,
};

use anyhow::{Context, Result, anyhow, bail};
use serde::Deserialize;

pub(crate) const ENV_CONFIG_FILE: &str = "TASK_COACH_CONFIG";
pub(crate) const DEFAULT_CONFIG_FILENAME: &str = "task-coach.toml";
const ENV_DATA_FILE: &str = "TASK_COACH_DATA";
const ENV_LOG_FILE: &str = "TASK_COACH_LOG";
const ENV_PROVIDER: &str = "TASK_COACH_PROVIDER";
const ENV_MODEL: &str = "TASK_COACH_MODEL";
const ENV_BASE_URL: &str = "TASK_COACH_BASE_URL";
const ENV_MAX_RETRIES: &str = "TASK_COACH_MAX_RETRIES";

pub(crate) const DEFAULT_MAX_RETRIES: u32 = 3;
pub(crate) const DEFAULT_MAX_REGENERATIONS: u32 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApiStyle {
    Anthropic,
    OpenAi,
    #[default]
    Gemini,
}

impl ApiStyle {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Anthropic => "anthropic",
            Self::OpenAi => "openai",
            Self::Gemini => "gemini",
        }
    }

    fn default_model(self) -> &'static str {
        match self {
            Self::Anthropic => "claude-3-5-haiku-latest",
            Self::OpenAi => "gpt-4o-mini",
            Self::Gemini => "gemini-2.5-flash",
        }
    }

    fn default_base_url(self) -> &'static str {
        match self {
            Self::Anthropic => "https://api.anthropic.com",
            Self::OpenAi => "https://api.openai.com/v1",
            Self::Gemini => "https://generativelanguage.googleapis.com",
        }
    }

    fn default_key_env(self) -> &'static str {
        match self {
            Self::Anthropic => "ANTHROPIC_AUTH_TOKEN",
            Self::OpenAi => "OPENAI_API_KEY",
            Self::Gemini => "GEMINI_API_KEY",
        }
    }
}

impl FromStr for ApiStyle {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "anthropic" | "claude" => Ok(Self::Anthropic),
            "openai" | "glm" | "kimi" => Ok(Self::OpenAi),
            "gemini" | "google" => Ok(Self::Gemini),
            other => bail!("unknown provider `{other}`: expected anthropic, openai or gemini"),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    pub provider: ApiStyle,
    pub model: Option<String>,
    pub base_url: Option<String>,
    /// Name of the environment variable holding the API key.
    pub api_key_env: Option<String>,
    pub max_tokens: u32,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: ApiStyle::default(),
            model: None,
            base_url: None,
            api_key_env: None,
            max_tokens: 1024,
        }
    }
}

impl LlmConfig {
    pub fn model(&self) -> &str {
        self.model
            .as_deref()
            .unwrap_or_else(|| self.provider.default_model())
    }

    pub fn base_url(&self) -> &str {
        self.base_url
            .as_deref()
            .unwrap_or_else(|| self.provider.default_base_url())
    }

    pub fn api_key_env(&self) -> &str {
        self.api_key_env
            .as_deref()
            .unwrap_or_else(|| self.provider.default_key_env())
    }

    pub fn resolve_api_key(&self) -> Result<String> {
        let key_name = self.api_key_env();
        let raw = std::env::var(key_name)
            .with_context(|| format!("{key_name} is required. Please set it in the .env file."))?;
        normalize_api_key_value(&raw)
            .ok_or_else(|| anyhow!("{key_name} looks like a placeholder, set a real API key"))
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CoachConfig {
    pub data_file: PathBuf,
    pub log_file: PathBuf,
    pub max_retries: u32,
    pub max_regenerations: u32,
    pub llm: LlmConfig,
}

impl Default for CoachConfig {
    fn default() -> Self {
        Self {
            data_file: PathBuf::from("data").join("sessions.json"),
            log_file: PathBuf::from("data").join("task-coach.log"),
            max_retries: DEFAULT_MAX_RETRIES,
            max_regenerations: DEFAULT_MAX_REGENERATIONS,
            llm: LlmConfig::default(),
        }
    }
}

impl CoachConfig {
    /// Load `task-coach.toml` (or `$TASK_COACH_CONFIG`) and apply environment overrides.
    pub fn load() -> Result<Self> {
        let path = std::env::var(ENV_CONFIG_FILE)
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_CONFIG_FILENAME));
        let mut config = Self::from_file(&path)?;
        config.apply_env(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    fn from_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let text = fs::read_to_string(path)
            .with_context(|| format!("failed to read `{}`", path.display()))?;
        Self::parse(&text).with_context(|| format!("invalid config `{}`", path.display()))
    }

    pub(crate) fn parse(text: &str) -> Result<Self> {
        toml::from_str(text).map_err(|e| anyhow!("not valid TOML: {e}"))
    }

    pub(crate) fn apply_env<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(path) = get(ENV_DATA_FILE) {
            self.data_file = PathBuf::from(path);
        }
        if let Some(path) = get(ENV_LOG_FILE) {
            self.log_file = PathBuf::from(path);
        }
        if let Some(provider) = get(ENV_PROVIDER) {
            self.llm.provider = provider.parse()?;
        }
        if let Some(model) = get(ENV_MODEL) {
            self.llm.model = Some(model.trim().to_string());
        }
        if let Some(url) = get(ENV_BASE_URL) {
            self.llm.base_url = Some(url.trim().to_string());
        }
        if let Some(raw) = get(ENV_MAX_RETRIES) {
            self.max_retries = raw
                .trim()
                .parse()
                .with_context(|| format!("{ENV_MAX_RETRIES} must be a whole number"))?;
        }
        Ok(())
    }
}

fn normalize_api_key_value(raw: &str) -> Option<String> {
    let trimmed = raw.trim().trim_matches('"').trim_matches('\'').trim();
    if trimmed.is_empty() || is_placeholder_api_key(trimmed) {
        None
    } else {
        Some(trimmed.to_string())
    }
}

fn is_placeholder_api_key(value: &str) -> bool {
    let lower = value.to_ascii_lowercase();
    matches!(
        lower.as_str(),
        "changeme" | "replace_me" | "your_api_key_here"
    ) || (lower.starts_with("your_") && lower.ends_with("_here"))
}
