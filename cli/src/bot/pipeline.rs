//! Reply pipeline: rule bot, then Cohere, then Hugging Face, then a placeholder.
//!
//! Provider failures never surface as errors. Each stage maps a failure to a fixed
//! apology and tags the reply with where it came from.

use crate::bot::providers::{Providers, ReplyProvider};
use crate::bot::rules::{RuleBot, RuleOutcome};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, warn};

pub const COHERE_FAILURE_REPLY: &str = "I'm still learning. Could you rephrase or ask another way?";
pub const HUGGINGFACE_FAILURE_REPLY: &str = "Bot unavailable. Please try again later.";
pub const PLACEHOLDER_REPLY: &str = "(No bot API key configured) Hi, this is a placeholder bot. \
                                     Install COHERE_API_KEY or HF_API_KEY to enable the real bot.";

/// Which stage produced a reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ReplySource {
    Rules,
    Cohere,
    CohereError,
    Huggingface,
    HuggingfaceError,
    Placeholder,
}

impl ReplySource {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReplySource::Rules => "rules",
            ReplySource::Cohere => "cohere",
            ReplySource::CohereError => "cohere-error",
            ReplySource::Huggingface => "huggingface",
            ReplySource::HuggingfaceError => "huggingface-error",
            ReplySource::Placeholder => "placeholder",
        }
    }
}

impl fmt::Display for ReplySource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Reply {
    pub text: String,
    pub source: ReplySource,
}

impl Reply {
    fn new(text: impl Into<String>, source: ReplySource) -> Self {
        Self {
            text: text.into(),
            source,
        }
    }
}

/// Earlier turns included in a Cohere prompt.
pub const PROMPT_TURNS: usize = 20;

/// Transcript of earlier `(user, bot)` turns followed by the new message, ready for
/// `/v1/generate`.
pub fn build_prompt<'a, I>(turns: I, message: &str) -> String
where
    I: IntoIterator<Item = (&'a str, &'a str)>,
{
    let mut prompt = turns
        .into_iter()
        .map(|(user, bot)| format!("User: {}\nBot: {}", user, bot))
        .collect::<Vec<_>>()
        .join("\n");
    if !prompt.is_empty() {
        prompt.push('\n');
    }
    prompt.push_str(&format!("User: {}\nBot:", message));
    prompt
}

pub struct ReplyPipeline {
    rules: RuleBot,
    cohere: Option<Arc<dyn ReplyProvider>>,
    huggingface: Option<Arc<dyn ReplyProvider>>,
}

impl ReplyPipeline {
    pub fn new(
        rules: RuleBot,
        cohere: Option<Arc<dyn ReplyProvider>>,
        huggingface: Option<Arc<dyn ReplyProvider>>,
    ) -> Self {
        Self {
            rules,
            cohere,
            huggingface,
        }
    }

    pub fn from_providers(rules: RuleBot, providers: &Providers) -> Self {
        Self::new(rules, providers.cohere_generate(), providers.huggingface())
    }

    /// Answers `message`. `prompt` is the history transcript sent to Cohere;
    /// Hugging Face only ever sees the bare message.
    pub async fn reply(&self, message: &str, prompt: &str) -> Reply {
        if let RuleOutcome::Matched { rule, reply } = self.rules.classify(message) {
            debug!("Rule '{}' matched", rule);
            return Reply::new(reply, ReplySource::Rules);
        }

        if let Some(cohere) = &self.cohere {
            return match cohere.reply(prompt).await {
                Ok(text) => Reply::new(text, ReplySource::Cohere),
                Err(e) => {
                    warn!("{} failed: {:#}", cohere.name(), e);
                    Reply::new(COHERE_FAILURE_REPLY, ReplySource::CohereError)
                }
            };
        }

        if let Some(huggingface) = &self.huggingface {
            return match huggingface.reply(message).await {
                Ok(text) => Reply::new(text, ReplySource::Huggingface),
                Err(e) => {
                    warn!("{} failed: {:#}", huggingface.name(), e);
                    Reply::new(HUGGINGFACE_FAILURE_REPLY, ReplySource::HuggingfaceError)
                }
            };
        }

        Reply::new(PLACEHOLDER_REPLY, ReplySource::Placeholder)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error::Result;
    use crate::store::records::Conversation;
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// Echoes the prompt it was given, or fails.
    struct Scripted {
        name: &'static str,
        fail: bool,
        seen: Mutex<Vec<String>>,
    }

    impl Scripted {
        fn arc(name: &'static str, fail: bool) -> Arc<Self> {
            Arc::new(Self {
                name,
                fail,
                seen: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl ReplyProvider for Scripted {
        fn name(&self) -> &'static str {
            self.name
        }

        async fn reply(&self, prompt: &str) -> Result<String> {
            self.seen.lock().unwrap().push(prompt.to_string());
            if self.fail {
                anyhow::bail!("boom");
            }
            Ok(format!("{} says hi", self.name))
        }
    }

    #[tokio::test]
    async fn test_rule_match_short_circuits() {
        let cohere = Scripted::arc("cohere", false);
        let pipeline = ReplyPipeline::new(RuleBot::default(), Some(cohere.clone()), None);
        let reply = pipeline.reply("hello", "User: hello\nBot:").await;
        assert_eq!(reply, Reply::new("Hello! How can I help you today?", ReplySource::Rules));
        assert!(cohere.seen.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_cohere_gets_history_prompt() {
        let cohere = Scripted::arc("cohere", false);
        let hf = Scripted::arc("huggingface", false);
        let pipeline =
            ReplyPipeline::new(RuleBot::default(), Some(cohere.clone()), Some(hf.clone()));
        let reply = pipeline.reply("tell me a story", "PROMPT").await;
        assert_eq!(reply, Reply::new("cohere says hi", ReplySource::Cohere));
        assert_eq!(*cohere.seen.lock().unwrap(), vec!["PROMPT".to_string()]);
        assert!(hf.seen.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_cohere_failure_does_not_fall_through() {
        let hf = Scripted::arc("huggingface", false);
        let pipeline = ReplyPipeline::new(
            RuleBot::default(),
            Some(Scripted::arc("cohere", true)),
            Some(hf.clone()),
        );
        let reply = pipeline.reply("tell me a story", "PROMPT").await;
        assert_eq!(reply, Reply::new(COHERE_FAILURE_REPLY, ReplySource::CohereError));
        assert!(hf.seen.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_huggingface_gets_bare_message() {
        let hf = Scripted::arc("huggingface", false);
        let pipeline = ReplyPipeline::new(RuleBot::default(), None, Some(hf.clone()));
        let reply = pipeline.reply("tell me a story", "PROMPT").await;
        assert_eq!(reply.source, ReplySource::Huggingface);
        assert_eq!(*hf.seen.lock().unwrap(), vec!["tell me a story".to_string()]);

        let failing = ReplyPipeline::new(RuleBot::default(), None, Some(Scripted::arc("hf", true)));
        let reply = failing.reply("tell me a story", "PROMPT").await;
        assert_eq!(reply, Reply::new(HUGGINGFACE_FAILURE_REPLY, ReplySource::HuggingfaceError));
    }

    #[tokio::test]
    async fn test_placeholder_without_providers() {
        let pipeline = ReplyPipeline::new(RuleBot::default(), None, None);
        let reply = pipeline.reply("tell me a story", "PROMPT").await;
        assert_eq!(reply, Reply::new(PLACEHOLDER_REPLY, ReplySource::Placeholder));
    }

    #[test]
    fn test_build_prompt() {
        assert_eq!(build_prompt(std::iter::empty(), "hi"), "User: hi\nBot:");

        let history = vec![
            Conversation::new("u1", "hello", "Hi!", "en"),
            Conversation::new("u1", "how are you", "Fine.", "en"),
        ];
        let turns = history
            .iter()
            .map(|c| (c.user_message.as_str(), c.bot_reply.as_str()));
        assert_eq!(
            build_prompt(turns, "bye"),
            "User: hello\nBot: Hi!\nUser: how are you\nBot: Fine.\nUser: bye\nBot:"
        );
    }

    #[test]
    fn test_source_labels() {
        assert_eq!(
            serde_json::to_value(ReplySource::HuggingfaceError).unwrap(),
            "huggingface-error"
        );
        assert_eq!(ReplySource::CohereError.to_string(), "cohere-error");
    }
}
