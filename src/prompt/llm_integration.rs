use anyhow::Result;
use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);
const DEFAULT_MAX_RETRIES: u32 = 3;
const DEFAULT_OLLAMA_HOST: &str = "http://localhost:11434";

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("Unknown LLM provider: {0}")]
    UnknownProvider(String),

    #[error("Missing API key: set {0}")]
    MissingApiKey(&'static str),

    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("HTTP error {status}: {body}")]
    Http { status: u16, body: String },

    #[error("API error: {0}")]
    Api(String),

    #[error("Invalid response format from LLM API")]
    InvalidResponse,
}

/// A text-in, text-out language model
#[async_trait]
pub trait LanguageModel: Send + Sync {
    async fn invoke(&self, prompt: &str) -> Result<String>;
}

/// Supported model back ends
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LlmProvider {
    OpenAI,
    OpenRouter,
    Ollama,
    /// Offline stand-in that never names a site
    Mock,
}

impl FromStr for LlmProvider {
    type Err = LlmError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "openai" => Ok(LlmProvider::OpenAI),
            "openrouter" => Ok(LlmProvider::OpenRouter),
            "ollama" => Ok(LlmProvider::Ollama),
            "mock" => Ok(LlmProvider::Mock),
            _ => Err(LlmError::UnknownProvider(s.to_string())),
        }
    }
}

impl LlmProvider {
    fn default_model(&self) -> &'static str {
        match self {
            LlmProvider::OpenAI => "gpt-4o-mini",
            LlmProvider::OpenRouter => "meta-llama/llama-3.1-8b-instruct",
            LlmProvider::Ollama => "llama3.1",
            LlmProvider::Mock => "mock",
        }
    }

    fn api_key_var(&self) -> Option<&'static str> {
        match self {
            LlmProvider::OpenAI => Some("OPENAI_API_KEY"),
            LlmProvider::OpenRouter => Some("OPENROUTER_API_KEY"),
            LlmProvider::Ollama | LlmProvider::Mock => None,
        }
    }

    fn default_endpoint(&self) -> String {
        match self {
            LlmProvider::OpenAI => "https://api.openai.com/v1/chat/completions".to_string(),
            LlmProvider::OpenRouter => "https://openrouter.ai/api/v1/chat/completions".to_string(),
            LlmProvider::Ollama => {
                let host = std::env::var("OLLAMA_HOST")
                    .unwrap_or_else(|_| DEFAULT_OLLAMA_HOST.to_string());
                format!("{}/api/generate", host.trim_end_matches('/'))
            }
            LlmProvider::Mock => String::new(),
        }
    }
}

/// Connection and sampling settings for one provider
#[derive(Debug, Clone)]
pub struct LlmConfig {
    pub provider: LlmProvider,
    pub model: String,
    pub api_key: String,
    pub temperature: f32,
    pub max_tokens: u32,
    pub endpoint_url: Option<String>,
    pub timeout: Duration,
    pub max_retries: u32,
}

impl LlmConfig {
    pub fn mock() -> Self {
        Self {
            provider: LlmProvider::Mock,
            model: LlmProvider::Mock.default_model().to_string(),
            api_key: String::new(),
            temperature: 0.0,
            max_tokens: 64,
            endpoint_url: None,
            timeout: DEFAULT_TIMEOUT,
            max_retries: 1,
        }
    }

    fn endpoint(&self) -> String {
        self.endpoint_url
            .clone()
            .unwrap_or_else(|| self.provider.default_endpoint())
    }
}

/// Build a config from explicit choices, falling back to `LLM_PROVIDER`,
/// `LLM_MODEL`, `LLM_ENDPOINT` and the provider's API key variable
pub fn get_llm_config(provider: Option<&str>, model: Option<&str>) -> Result<LlmConfig> {
    let provider_name = provider
        .map(str::to_string)
        .or_else(|| std::env::var("LLM_PROVIDER").ok())
        .unwrap_or_else(|| "ollama".to_string());
    let provider: LlmProvider = provider_name.parse()?;

    let model = model
        .map(str::to_string)
        .or_else(|| std::env::var("LLM_MODEL").ok())
        .unwrap_or_else(|| provider.default_model().to_string());

    let api_key = match provider.api_key_var() {
        Some(var) => std::env::var(var).map_err(|_| LlmError::MissingApiKey(var))?,
        None => String::new(),
    };

    Ok(LlmConfig {
        provider,
        model,
        api_key,
        temperature: 0.8,
        max_tokens: 64,
        endpoint_url: std::env::var("LLM_ENDPOINT").ok(),
        timeout: DEFAULT_TIMEOUT,
        max_retries: DEFAULT_MAX_RETRIES,
    })
}

/// HTTP client for the configured provider, with timeout and retries
#[derive(Debug, Clone)]
pub struct LlmClient {
    config: LlmConfig,
    client: Client,
}

impl LlmClient {
    pub fn new(config: LlmConfig) -> Result<Self> {
        let client = Client::builder().timeout(config.timeout).build()?;
        Ok(Self { config, client })
    }

    pub fn config(&self) -> &LlmConfig {
        &self.config
    }

    async fn try_query(&self, prompt: &str) -> Result<String, LlmError> {
        let request = self.client.post(self.config.endpoint());

        let request = match self.config.provider {
            LlmProvider::Ollama => request.json(&ollama_body(prompt, &self.config)),
            _ => request
                .bearer_auth(&self.config.api_key)
                .json(&chat_body(prompt, &self.config)),
        };

        let res = request.send().await?;

        if !res.status().is_success() {
            let status = res.status().as_u16();
            let body = res
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(LlmError::Http { status, body });
        }

        let json: Value = res.json().await?;
        match self.config.provider {
            LlmProvider::Ollama => extract_ollama_content(&json),
            _ => extract_chat_content(&json),
        }
    }
}

#[async_trait]
impl LanguageModel for LlmClient {
    async fn invoke(&self, prompt: &str) -> Result<String> {
        if self.config.provider == LlmProvider::Mock {
            tracing::warn!("Mock LLM provider in use; no heritage name will be resolved");
            return Ok(String::new());
        }

        let max_retries = self.config.max_retries.max(1);
        let mut attempt = 0;

        loop {
            attempt += 1;
            tracing::debug!(
                "LLM API call attempt {}/{} ({:?}, {})",
                attempt,
                max_retries,
                self.config.provider,
                self.config.model
            );

            match self.try_query(prompt).await {
                Ok(result) => return Ok(result),
                Err(e) => {
                    if attempt >= max_retries {
                        return Err(anyhow::anyhow!(
                            "Failed after {} attempts: {}",
                            max_retries,
                            e
                        ));
                    }
                    // Exponential backoff
                    let backoff = Duration::from_millis(500 * 2u64.pow(attempt - 1));
                    tracing::warn!("LLM API call failed: {}. Retrying in {:?}...", e, backoff);
                    tokio::time::sleep(backoff).await;
                }
            }
        }
    }
}

/// One-shot helper: send `prompt` with a fresh client
pub async fn query_llm(prompt: &str, config: &LlmConfig) -> Result<String> {
    LlmClient::new(config.clone())?.invoke(prompt).await
}

fn chat_body(prompt: &str, config: &LlmConfig) -> Value {
    json!({
        "model": config.model,
        "messages": [
            {"role": "user", "content": prompt}
        ],
        "temperature": config.temperature,
        "max_tokens": config.max_tokens
    })
}

fn ollama_body(prompt: &str, config: &LlmConfig) -> Value {
    json!({
        "model": config.model,
        "prompt": prompt,
        "stream": false,
        "options": {
            "temperature": config.temperature,
            "num_predict": config.max_tokens
        }
    })
}

/// Pull the reply out of an OpenAI-style chat completion
fn extract_chat_content(json: &Value) -> Result<String, LlmError> {
    if let Some(choice) = json["choices"].as_array().and_then(|arr| arr.first()) {
        if let Some(msg) = choice["message"]["content"].as_str() {
            return Ok(msg.to_string());
        }
    }

    if let Some(message) = json["error"]["message"].as_str() {
        return Err(LlmError::Api(message.to_string()));
    }

    Err(LlmError::InvalidResponse)
}

/// Pull the reply out of an Ollama `/api/generate` response
fn extract_ollama_content(json: &Value) -> Result<String, LlmError> {
    if let Some(text) = json["response"].as_str() {
        return Ok(text.to_string());
    }

    if let Some(message) = json["error"].as_str() {
        return Err(LlmError::Api(message.to_string()));
    }

    Err(LlmError::InvalidResponse)
}
