use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::{ApiStyle, LlmConfig};

/// Text generation backend used by the planner.
///
/// `Ok(None)` means the collaborator answered but produced no usable text.
pub(crate) trait Generator {
    async fn generate(&self, prompt: &str) -> Result<Option<String>>;
}

// ── Anthropic-compatible wire types ───────────────────────────────────────────

#[derive(Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    messages: Vec<ApiMessage<'a>>,
}

#[derive(Serialize)]
struct ApiMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Deserialize)]
struct MessagesResponse {
    #[serde(default)]
    content: Vec<ContentBlock>,
}

#[derive(Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    kind: String,
    text: Option<String>,
}

// ── OpenAI-compatible wire types ──────────────────────────────────────────────

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ApiMessage<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Deserialize)]
struct ChatChoiceMessage {
    content: Option<String>,
}

// ── Gemini wire types ─────────────────────────────────────────────────────────

#[derive(Serialize)]
struct GenerateRequest<'a> {
    contents: Vec<GeminiContent<'a>>,
}

#[derive(Serialize)]
struct GeminiContent<'a> {
    parts: Vec<GeminiPartOut<'a>>,
}

#[derive(Serialize)]
struct GeminiPartOut<'a> {
    text: &'a str,
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
}

#[derive(Deserialize)]
struct GeminiCandidate {
    content: Option<GeminiCandidateContent>,
}

#[derive(Deserialize)]
struct GeminiCandidateContent {
    #[serde(default)]
    parts: Vec<GeminiPartIn>,
}

#[derive(Deserialize)]
struct GeminiPartIn {
    text: Option<String>,
}

// ── HTTP client builder ───────────────────────────────────────────────────────

pub fn build_http_client() -> Result<reqwest::Client> {
    let mut builder = reqwest::Client::builder();

    if let Ok(proxy_url) = std::env::var("HTTP_PROXY") {
        builder = builder.proxy(reqwest::Proxy::all(&proxy_url)?);
    }

    if let Ok(ms) = std::env::var("API_TIMEOUT_MS") {
        if let Ok(ms) = ms.parse::<u64>() {
            builder = builder
                .timeout(Duration::from_millis(ms))
                .connect_timeout(Duration::from_secs(10));
        }
    }

    builder.build().map_err(Into::into)
}

// ── Provider ──────────────────────────────────────────────────────────────────

pub(crate) struct LlmProvider {
    client: reqwest::Client,
    config: LlmConfig,
    api_key: String,
}

impl LlmProvider {
    pub(crate) fn new(client: reqwest::Client, config: LlmConfig) -> Result<Self> {
        let api_key = config.resolve_api_key()?;
        Ok(Self {
            client,
            config,
            api_key,
        })
    }

    fn request(&self, prompt: &str) -> reqwest::RequestBuilder {
        let base_url = self.config.base_url().trim_end_matches('/').to_string();
        let model = self.config.model();
        match self.config.provider {
            ApiStyle::Anthropic => self
                .client
                .post(format!("{base_url}/v1/messages"))
                .header("x-api-key", &self.api_key)
                .header("anthropic-version", "2023-06-01")
                .json(&MessagesRequest {
                    model,
                    max_tokens: self.config.max_tokens,
                    messages: vec![ApiMessage {
                        role: "user",
                        content: prompt,
                    }],
                }),
            ApiStyle::OpenAi => self
                .client
                .post(format!("{base_url}/chat/completions"))
                .header("Authorization", format!("Bearer {}", self.api_key))
                .json(&ChatRequest {
                    model,
                    messages: vec![ApiMessage {
                        role: "user",
                        content: prompt,
                    }],
                    max_tokens: Some(self.config.max_tokens),
                }),
            ApiStyle::Gemini => self
                .client
                .post(format!("{base_url}/v1beta/models/{model}:generateContent"))
                .header("x-goog-api-key", &self.api_key)
                .json(&GenerateRequest {
                    contents: vec![GeminiContent {
                        parts: vec![GeminiPartOut { text: prompt }],
                    }],
                }),
        }
    }
}

impl Generator for LlmProvider {
    async fn generate(&self, prompt: &str) -> Result<Option<String>> {
        let resp = self
            .request(prompt)
            .send()
            .await
            .context("HTTP request failed")?;

        let status = resp.status();
        let body = resp.text().await.context("failed to read API response")?;
        if !status.is_success() {
            return Err(anyhow!("API error {status}: {body}"));
        }
        debug!(provider = self.config.provider.as_str(), bytes = body.len(), "LLM reply received");
        extract_text(self.config.provider, &body)
    }
}

/// Pull the reply text out of a provider response body.
fn extract_text(style: ApiStyle, body: &str) -> Result<Option<String>> {
    let text: String = match style {
        ApiStyle::Anthropic => {
            let parsed: MessagesResponse =
                serde_json::from_str(body).context("failed to parse API response")?;
            parsed
                .content
                .into_iter()
                .filter(|b| b.kind == "text")
                .filter_map(|b| b.text)
                .collect()
        }
        ApiStyle::OpenAi => {
            let parsed: ChatResponse =
                serde_json::from_str(body).context("failed to parse API response")?;
            parsed
                .choices
                .into_iter()
                .next()
                .and_then(|c| c.message.content)
                .unwrap_or_default()
        }
        ApiStyle::Gemini => {
            let parsed: GenerateResponse =
                serde_json::from_str(body).context("failed to parse API response")?;
            parsed
                .candidates
                .into_iter()
                .next()
                .and_then(|c| c.content)
                .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
                .unwrap_or_default()
        }
    };

    if text.trim().is_empty() {
        Ok(None)
    } else {
        Ok(Some(text))
    }
}
