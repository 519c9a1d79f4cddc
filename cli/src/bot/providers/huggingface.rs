//! Hugging Face inference API client.

use super::{post_json, ReplyProvider, NO_REPLY};
use crate::core::config::ProvidersConfig;
use crate::core::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone)]
pub struct HuggingFaceClient {
    http: reqwest::Client,
    url: String,
    api_key: String,
}

#[derive(Debug, Serialize)]
struct InferenceRequest<'a> {
    inputs: &'a str,
}

/// The API answers either `{generated_text}` or `[{generated_text}]` depending on the model.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum InferenceResponse {
    Single(Generated),
    Batch(Vec<Generated>),
}

#[derive(Debug, Deserialize)]
struct Generated {
    generated_text: Option<String>,
}

impl InferenceResponse {
    fn into_text(self) -> Option<String> {
        match self {
            InferenceResponse::Single(g) => g.generated_text,
            InferenceResponse::Batch(items) => items.into_iter().find_map(|g| g.generated_text),
        }
    }
}

impl HuggingFaceClient {
    pub fn new(http: reqwest::Client, settings: &ProvidersConfig, api_key: String) -> Self {
        let url = format!(
            "{}/models/{}",
            settings.huggingface_base_url.trim_end_matches('/'),
            settings.huggingface_model
        );
        Self { http, url, api_key }
    }
}

#[async_trait]
impl ReplyProvider for HuggingFaceClient {
    fn name(&self) -> &'static str {
        "huggingface"
    }

    async fn reply(&self, prompt: &str) -> Result<String> {
        let body = InferenceRequest { inputs: prompt };
        let response: InferenceResponse =
            post_json(&self.http, "huggingface", &self.url, &self.api_key, &body).await?;
        Ok(response.into_text().unwrap_or_else(|| NO_REPLY.to_string()))
    }
}
