//! Cohere REST client (`/v1/chat` and `/v1/generate`).

use super::{post_json, ReplyProvider, NO_REPLY};
use crate::core::config::ProvidersConfig;
use crate::core::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Which Cohere endpoint `ReplyProvider::reply` goes through.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CohereEndpoint {
    Chat,
    Generate,
}

#[derive(Debug, Clone)]
pub struct CohereClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    chat_model: String,
    generate_model: String,
    endpoint: CohereEndpoint,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    message: &'a str,
    model: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    text: Option<String>,
}

/// Body of a `/v1/generate` call.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GenerateRequest {
    pub model: String,
    pub prompt: String,
    pub max_tokens: u32,
    pub temperature: f32,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub stop_sequences: Vec<String>,
}

impl GenerateRequest {
    /// Continues a `User:`/`Bot:` transcript, stopping before the next turn.
    pub fn conversation(model: &str, prompt: &str) -> Self {
        Self {
            model: model.to_string(),
            prompt: prompt.to_string(),
            max_tokens: 150,
            temperature: 0.7,
            stop_sequences: vec!["\nUser:".into(), "\nBot:".into()],
        }
    }

    /// Longer completion used for the wellness guide JSON.
    pub fn guide(model: &str, prompt: &str) -> Self {
        Self {
            model: model.to_string(),
            prompt: prompt.to_string(),
            max_tokens: 300,
            temperature: 0.7,
            stop_sequences: Vec::new(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    generations: Vec<Generation>,
}

#[derive(Debug, Deserialize)]
struct Generation {
    text: Option<String>,
}

impl CohereClient {
    pub fn new(http: reqwest::Client, settings: &ProvidersConfig, api_key: String) -> Self {
        Self {
            http,
            base_url: settings.cohere_base_url.trim_end_matches('/').to_string(),
            api_key,
            chat_model: settings.cohere_chat_model.clone(),
            generate_model: settings.cohere_generate_model.clone(),
            endpoint: CohereEndpoint::Chat,
        }
    }

    pub fn with_endpoint(mut self, endpoint: CohereEndpoint) -> Self {
        self.endpoint = endpoint;
        self
    }

    pub fn generate_model(&self) -> &str {
        &self.generate_model
    }

    /// `POST /v1/chat`; the reply is the `text` field.
    pub async fn chat(&self, message: &str) -> Result<String> {
        let url = format!("{}/v1/chat", self.base_url);
        let body = ChatRequest {
            message,
            model: &self.chat_model,
        };
        let response: ChatResponse = post_json(&self.http, "cohere", &url, &self.api_key, &body).await?;
        Ok(response.text.unwrap_or_else(|| NO_REPLY.to_string()))
    }

    /// `POST /v1/generate`; the reply is the first generation, trimmed.
    pub async fn generate(&self, request: &GenerateRequest) -> Result<String> {
        let url = format!("{}/v1/generate", self.base_url);
        let response: GenerateResponse =
            post_json(&self.http, "cohere", &url, &self.api_key, request).await?;
        Ok(response
            .generations
            .into_iter()
            .next()
            .and_then(|g| g.text)
            .map(|text| text.trim().to_string())
            .unwrap_or_else(|| NO_REPLY.to_string()))
    }
}

#[async_trait]
impl ReplyProvider for CohereClient {
    fn name(&self) -> &'static str {
        "cohere"
    }

    async fn reply(&self, prompt: &str) -> Result<String> {
        match self.endpoint {
            CohereEndpoint::Chat => self.chat(prompt).await,
            CohereEndpoint::Generate => {
                let request = GenerateRequest::conversation(&self.generate_model, prompt);
                self.generate(&request).await
            }
        }
    }
}
