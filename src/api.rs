use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::config::AiConfig;
use crate::error::ApiError;

pub const DEFAULT_TEMPERATURE: f32 = 0.7;
pub const DEFAULT_MAX_TOKENS: u32 = 4096;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

/// Role-tagged message in the wire format sent to the provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    pub fn system(content: impl Into<String>) -> Self {
        Self { role: Role::System, content: content.into() }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self { role: Role::User, content: content.into() }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CompletionRequest {
    pub model: String,
    pub messages: Vec<Message>,
    pub temperature: f32,
    pub max_tokens: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CompletionChoice {
    pub message: Message,
    #[serde(default)]
    pub finish_reason: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CompletionResponse {
    pub choices: Vec<CompletionChoice>,
    #[serde(default)]
    pub usage: Option<Usage>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Usage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeminiPart {
    pub text: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeminiContent {
    pub parts: Vec<GeminiPart>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GeminiGenerationConfig {
    pub temperature: f32,
    pub max_output_tokens: u32,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GeminiRequest {
    pub contents: Vec<GeminiContent>,
    pub generation_config: GeminiGenerationConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GeminiCandidate {
    pub content: GeminiContent,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GeminiResponse {
    #[serde(default)]
    pub candidates: Vec<GeminiCandidate>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AIProvider {
    /// Any OpenAI-compatible `/chat/completions` endpoint.
    Groq,
    Gemini,
}

impl AIProvider {
    pub fn parse(name: &str) -> Self {
        match name.to_lowercase().as_str() {
            "gemini" | "google" => AIProvider::Gemini,
            _ => AIProvider::Groq,
        }
    }

    pub fn default_endpoint(&self) -> &'static str {
        match self {
            AIProvider::Groq => "https://api.groq.com/openai/v1",
            AIProvider::Gemini => "https://generativelanguage.googleapis.com/v1beta/models",
        }
    }
}

/// One request/response round trip to a hosted model.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CompletionClient: Send + Sync {
    async fn complete(&self, model: &str, messages: Vec<Message>) -> Result<String, ApiError>;
}

#[derive(Debug, Clone)]
pub struct ApiClient {
    client: Client,
    pub provider: AIProvider,
    endpoint: String,
    api_key: String,
    temperature: f32,
    max_tokens: u32,
}

impl ApiClient {
    pub fn new(provider: AIProvider, endpoint: String, api_key: String) -> Result<Self, ApiError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(120))
            .user_agent("elemental/0.1")
            .build()?;

        let endpoint = if endpoint.is_empty() {
            provider.default_endpoint().to_string()
        } else {
            endpoint.trim_end_matches('/').to_string()
        };

        Ok(Self {
            client,
            provider,
            endpoint,
            api_key,
            temperature: DEFAULT_TEMPERATURE,
            max_tokens: DEFAULT_MAX_TOKENS,
        })
    }

    pub fn from_config(config: &AiConfig) -> Result<Self, ApiError> {
        let client = Self::new(
            AIProvider::parse(&config.provider),
            config.api_url.clone(),
            config.api_key.clone(),
        )?;
        Ok(client.with_sampling(config.temperature, config.max_tokens))
    }

    pub fn with_sampling(mut self, temperature: f32, max_tokens: u32) -> Self {
        self.temperature = temperature;
        self.max_tokens = max_tokens;
        self
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn send_openai_request(&self, model: &str, messages: Vec<Message>) -> Result<String, ApiError> {
        let request = CompletionRequest {
            model: model.to_string(),
            messages,
            temperature: self.temperature,
            max_tokens: self.max_tokens,
        };

        let mut request_builder = self
            .client
            .post(format!("{}/chat/completions", self.endpoint))
            .json(&request);

        if !self.api_key.is_empty() {
            request_builder = request_builder.header("Authorization", format!("Bearer {}", self.api_key));
        }

        let response = ensure_success(request_builder.send().await?).await?;
        let completion: CompletionResponse = response
            .json()
            .await
            .map_err(|e| ApiError::Decode(e.to_string()))?;

        if let Some(usage) = &completion.usage {
            log::debug!(
                "completion used {} prompt + {} completion tokens",
                usage.prompt_tokens,
                usage.completion_tokens
            );
        }

        completion
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .ok_or_else(|| ApiError::EmptyResponse("No choices in response".to_string()))
    }

    async fn send_gemini_request(&self, model: &str, messages: Vec<Message>) -> Result<String, ApiError> {
        let request = GeminiRequest {
            contents: messages
                .into_iter()
                .map(|msg| GeminiContent { parts: vec![GeminiPart { text: msg.content }] })
                .collect(),
            generation_config: GeminiGenerationConfig {
                temperature: self.temperature,
                max_output_tokens: self.max_tokens,
            },
        };

        let response = self
            .client
            .post(format!("{}/{}:generateContent", self.endpoint, model))
            .query(&[("key", self.api_key.as_str())])
            .json(&request)
            .send()
            .await?;

        let response = ensure_success(response).await?;
        let gemini: GeminiResponse = response
            .json()
            .await
            .map_err(|e| ApiError::Decode(e.to_string()))?;

        gemini
            .candidates
            .into_iter()
            .next()
            .and_then(|candidate| candidate.content.parts.into_iter().next())
            .map(|part| part.text)
            .ok_or_else(|| ApiError::EmptyResponse("No candidates returned from Gemini API".to_string()))
    }
}

#[async_trait]
impl CompletionClient for ApiClient {
    async fn complete(&self, model: &str, messages: Vec<Message>) -> Result<String, ApiError> {
        log::info!(
            "requesting completion from {:?} model {} ({} messages)",
            self.provider,
            model,
            messages.len()
        );
        let result = match self.provider {
            AIProvider::Groq => self.send_openai_request(model, messages).await,
            AIProvider::Gemini => self.send_gemini_request(model, messages).await,
        };
        if let Err(e) = &result {
            log::error!("completion request failed: {}", e);
        }
        result
    }
}

/// Turn a non-2xx response into `ApiError::Status`, preferring the payload's
/// `error.message` over the bare status text.
async fn ensure_success(response: Response) -> Result<Response, ApiError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<Value>(&body)
        .ok()
        .and_then(|v| v["error"]["message"].as_str().map(str::to_string))
        .unwrap_or_else(|| {
            status
                .canonical_reason()
                .unwrap_or("Failed to generate completion")
                .to_string()
        });

    Err(ApiError::Status { status: status.as_u16(), message })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_names() {
        assert_eq!(AIProvider::parse("Gemini"), AIProvider::Gemini);
        assert_eq!(AIProvider::parse("groq"), AIProvider::Groq);
        assert_eq!(AIProvider::parse("something-else"), AIProvider::Groq);
    }

    #[test]
    fn empty_endpoint_uses_provider_default() {
        let client = ApiClient::new(AIProvider::Gemini, String::new(), "k".into()).unwrap();
        assert_eq!(client.endpoint(), AIProvider::Gemini.default_endpoint());

        let client = ApiClient::new(AIProvider::Groq, "http://localhost:9/v1/".into(), "k".into()).unwrap();
        assert_eq!(client.endpoint(), "http://localhost:9/v1");
    }

    #[test]
    fn gemini_request_uses_camel_case() {
        let request = GeminiRequest {
            contents: vec![GeminiContent { parts: vec![GeminiPart { text: "hi".into() }] }],
            generation_config: GeminiGenerationConfig { temperature: 0.5, max_output_tokens: 10 },
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["generationConfig"]["maxOutputTokens"], 10);
        assert_eq!(json["contents"][0]["parts"][0]["text"], "hi");
    }
}
