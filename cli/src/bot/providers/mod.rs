//! # SnoRelax Remote Reply Providers
//!
//! File: cli/src/bot/providers/mod.rs
//!
//! ## Overview
//!
//! Thin HTTP clients for the hosted chat models SnoRelax can fall back to:
//! - **Cohere** (`cohere.rs`): `/v1/chat` for free-form prompts and `/v1/generate`
//!   for history-shaped prompts and guide generation.
//! - **Hugging Face** (`huggingface.rs`): the inference API for a conversational model.
//!
//! Every request carries `Authorization: Bearer <key>` and a JSON body. Keys come only
//! from the environment (`COHERE_API_KEY`, `HF_API_KEY`); a `.env` file is loaded by
//! `main` before anything reads them. A non-2xx status becomes
//! `SnorelaxError::Provider` with the status code and response body.
//!
//! ## Remote prompt routing
//!
//! `remote_reply` implements the prefix-routed mode of `snorelax ask --engine remote`:
//! `cohere:` selects Cohere chat, `hf:` selects Hugging Face, anything else gets a usage
//! hint. Failures are rendered inline (`[Cohere error: 401]`) instead of aborting.
//!
use crate::core::config::ProvidersConfig;
use crate::core::error::{Result, SnorelaxError};
use anyhow::Context;
use async_trait::async_trait;
use serde::{de::DeserializeOwned, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

pub mod cohere;
pub mod huggingface;

pub use cohere::{CohereClient, CohereEndpoint, GenerateRequest};
pub use huggingface::HuggingFaceClient;

pub const COHERE_KEY_VAR: &str = "COHERE_API_KEY";
pub const HF_KEY_VAR: &str = "HF_API_KEY";

/// Reply used when a provider answers 2xx without any text.
pub const NO_REPLY: &str = "[No reply]";

pub const REMOTE_USAGE_HINT: &str = "Please start your message with 'cohere:' or 'hf:'";

/// A remote model that turns one prompt into one reply.
#[async_trait]
pub trait ReplyProvider: Send + Sync {
    /// Short identifier used in logs and reply sources.
    fn name(&self) -> &'static str;

    async fn reply(&self, prompt: &str) -> Result<String>;
}

/// Reads an API key, treating unset and blank values the same.
pub fn api_key_from_env(var: &str) -> Option<String> {
    std::env::var(var)
        .ok()
        .map(|key| key.trim().to_string())
        .filter(|key| !key.is_empty())
}

/// Builds the shared `reqwest` client with the configured timeout.
pub fn http_client(settings: &ProvidersConfig) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(settings.timeout_secs))
        .user_agent(concat!("snorelax/", env!("CARGO_PKG_VERSION")))
        .build()
        .context("Failed to build HTTP client")
}

/// POSTs `body` as JSON with bearer auth and decodes a JSON response.
pub(crate) async fn post_json<B, R>(
    http: &reqwest::Client,
    provider: &str,
    url: &str,
    api_key: &str,
    body: &B,
) -> Result<R>
where
    B: Serialize + ?Sized,
    R: DeserializeOwned,
{
    debug!("POST {} ({})", url, provider);
    let response = http
        .post(url)
        .bearer_auth(api_key)
        .json(body)
        .send()
        .await
        .map_err(SnorelaxError::from)?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        warn!("{} returned {}", provider, status);
        anyhow::bail!(SnorelaxError::Provider {
            provider: provider.to_string(),
            status: status.as_u16(),
            body,
        });
    }

    response
        .json::<R>()
        .await
        .with_context(|| format!("Failed to decode {} response", provider))
}

/// The providers that have keys in the current environment.
#[derive(Clone, Default)]
pub struct Providers {
    pub cohere: Option<CohereClient>,
    pub huggingface: Option<HuggingFaceClient>,
}

impl Providers {
    /// Configures every provider whose API key is present in the environment.
    pub fn from_env(settings: &ProvidersConfig) -> Result<Self> {
        Self::with_keys(
            settings,
            api_key_from_env(COHERE_KEY_VAR),
            api_key_from_env(HF_KEY_VAR),
        )
    }

    pub fn with_keys(
        settings: &ProvidersConfig,
        cohere_key: Option<String>,
        hf_key: Option<String>,
    ) -> Result<Self> {
        let http = http_client(settings)?;
        let cohere = cohere_key.map(|key| CohereClient::new(http.clone(), settings, key));
        let huggingface = hf_key.map(|key| HuggingFaceClient::new(http, settings, key));
        debug!(
            "Providers configured: cohere={}, huggingface={}",
            cohere.is_some(),
            huggingface.is_some()
        );
        Ok(Self {
            cohere,
            huggingface,
        })
    }

    pub fn is_empty(&self) -> bool {
        self.cohere.is_none() && self.huggingface.is_none()
    }

    /// Cohere in `/v1/generate` mode, as the reply pipeline uses it.
    pub fn cohere_generate(&self) -> Option<Arc<dyn ReplyProvider>> {
        self.cohere.clone().map(|client| {
            Arc::new(client.with_endpoint(CohereEndpoint::Generate)) as Arc<dyn ReplyProvider>
        })
    }

    pub fn huggingface(&self) -> Option<Arc<dyn ReplyProvider>> {
        self.huggingface
            .clone()
            .map(|client| Arc::new(client) as Arc<dyn ReplyProvider>)
    }
}

/// Which provider a prefixed remote prompt targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoteTarget<'a> {
    Cohere(&'a str),
    HuggingFace(&'a str),
}

/// Splits `cohere:` / `hf:` off the input. The prefix is case-sensitive.
pub fn route_remote(input: &str) -> Option<RemoteTarget<'_>> {
    if let Some(rest) = input.strip_prefix("cohere:") {
        Some(RemoteTarget::Cohere(rest.trim()))
    } else {
        input
            .strip_prefix("hf:")
            .map(|rest| RemoteTarget::HuggingFace(rest.trim()))
    }
}

/// Answers a prefixed prompt, rendering provider failures inline.
pub async fn remote_reply(providers: &Providers, input: &str) -> String {
    let (label, outcome) = match route_remote(input.trim_start()) {
        Some(RemoteTarget::Cohere(prompt)) => (
            "Cohere",
            match &providers.cohere {
                Some(client) => client.chat(prompt).await,
                None => Err(SnorelaxError::ProviderNotConfigured("cohere".into()).into()),
            },
        ),
        Some(RemoteTarget::HuggingFace(prompt)) => (
            "HF",
            match &providers.huggingface {
                Some(client) => client.reply(prompt).await,
                None => Err(SnorelaxError::ProviderNotConfigured("huggingface".into()).into()),
            },
        ),
        None => return REMOTE_USAGE_HINT.to_string(),
    };

    outcome.unwrap_or_else(|err| inline_error(label, &err))
}

fn inline_error(label: &str, err: &anyhow::Error) -> String {
    warn!("{} request failed: {:#}", label, err);
    match err.downcast_ref::<SnorelaxError>() {
        Some(SnorelaxError::Provider { status, .. }) => format!("[{} error: {}]", label, status),
        Some(SnorelaxError::ProviderNotConfigured(_)) => {
            let var = if label == "Cohere" { COHERE_KEY_VAR } else { HF_KEY_VAR };
            format!("[{} error: {} not set]", label, var)
        }
        _ => format!("[{} error: {}]", label, err),
    }
}
