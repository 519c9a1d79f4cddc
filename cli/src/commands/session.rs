//! # Chat Session
//!
//! File: cli/src/commands/session.rs
//!
//! Shared state behind `snorelax ask` and `snorelax repl`: the selected reply engine,
//! loaded once, plus the optional `chat_memory.json` log every exchange is appended to.
//!
use crate::bot::classifier::IntentModel;
use crate::bot::intents::IntentsTable;
use crate::bot::pipeline::{build_prompt, ReplyPipeline, PROMPT_TURNS};
use crate::bot::providers::{self, Providers};
use crate::bot::rules::RuleBot;
use crate::core::config::Config;
use crate::core::error::Result;
use crate::store::{ChatRecord, JsonLog};
use clap::ValueEnum;
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{debug, info};

/// Which engine answers messages.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Engine {
    /// Hardcoded rule table only.
    Rules,
    /// Trained intent classifier (`snorelax intents train`).
    Intents,
    /// Cohere or Hugging Face, selected per message with a `cohere:` / `hf:` prefix.
    Remote,
    /// Rule bot, then Cohere, then Hugging Face, then a placeholder.
    #[default]
    Auto,
}

enum EngineState {
    Rules(RuleBot),
    Intents {
        table: IntentsTable,
        model: IntentModel,
        threshold: f32,
        rng: StdRng,
    },
    Remote(Providers),
    Auto(ReplyPipeline),
}

pub struct ChatSession {
    bot_name: String,
    engine: EngineState,
    history: Option<JsonLog<ChatRecord>>,
}

impl ChatSession {
    /// Loads whatever `engine` needs; intents mode fails here if no model was trained.
    pub fn open(cfg: &Config, engine: Engine, record_history: bool) -> Result<Self> {
        let rules = RuleBot::new(cfg.bot.name.clone());
        let state = match engine {
            Engine::Rules => EngineState::Rules(rules),
            Engine::Intents => EngineState::Intents {
                table: IntentsTable::load(&cfg.intents_path())?,
                model: IntentModel::load(&cfg.model_path())?,
                threshold: cfg.classifier.error_threshold,
                rng: StdRng::from_entropy(),
            },
            Engine::Remote => EngineState::Remote(Providers::from_env(&cfg.providers)?),
            Engine::Auto => {
                let providers = Providers::from_env(&cfg.providers)?;
                EngineState::Auto(ReplyPipeline::from_providers(rules, &providers))
            }
        };
        info!("Chat session using {:?} engine", engine);

        Ok(Self {
            bot_name: cfg.bot.name.clone(),
            engine: state,
            history: record_history.then(|| JsonLog::new(cfg.history_path())),
        })
    }

    pub fn banner(&self) -> String {
        format!("{} is ready. Type 'exit' to quit.", self.bot_name)
    }

    /// Extra usage line printed under the banner.
    pub fn hint(&self) -> Option<&'static str> {
        match self.engine {
            EngineState::Remote(_) => {
                Some("Type 'cohere:' or 'hf:' before your message to select the API.")
            }
            _ => None,
        }
    }

    /// Answers one message and records the exchange when history is enabled.
    pub async fn reply(&mut self, message: &str) -> Result<String> {
        let reply = match &mut self.engine {
            EngineState::Rules(bot) => bot.reply(message),
            EngineState::Intents {
                table,
                model,
                threshold,
                rng,
            } => {
                let predictions = model.predict(message, *threshold);
                debug!("Intent predictions: {:?}", predictions);
                table.respond(&predictions, rng)
            }
            EngineState::Remote(providers) => providers::remote_reply(providers, message).await,
            EngineState::Auto(pipeline) => {
                let earlier = match &self.history {
                    Some(log) => log.load()?,
                    None => Vec::new(),
                };
                let skip = earlier.len().saturating_sub(PROMPT_TURNS);
                let prompt = build_prompt(
                    earlier[skip..]
                        .iter()
                        .map(|r| (r.user.as_str(), r.bot.as_str())),
                    message,
                );
                let reply = pipeline.reply(message, &prompt).await;
                debug!("Reply source: {}", reply.source);
                reply.text
            }
        };

        if let Some(log) = &self.history {
            log.append(ChatRecord::now(message, reply.as_str()))?;
        }
        Ok(reply)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use tempfile::TempDir;

    /// Default config rooted in a fresh temp data dir.
    pub(crate) fn config_in(dir: &TempDir) -> Config {
        let mut cfg = Config::default();
        cfg.storage.data_dir = dir.path().to_string_lossy().into_owned();
        cfg
    }

    #[tokio::test]
    async fn test_rules_session_records_history() -> Result<()> {
        let dir = TempDir::new()?;
        let cfg = config_in(&dir);
        let mut session = ChatSession::open(&cfg, Engine::Rules, true)?;

        assert_eq!(session.reply("hello").await?, "Hello! How can I help you today?");
        assert_eq!(session.reply("bye now").await?, "Goodbye! Have a great day!");

        let records = JsonLog::<ChatRecord>::new(cfg.history_path()).load()?;
        assert_eq!(records.len(), 2);
        assert_eq!(records[1].user, "bye now");
        assert_eq!(records[1].bot, "Goodbye! Have a great day!");
        Ok(())
    }

    #[tokio::test]
    async fn test_no_history_writes_nothing() -> Result<()> {
        let dir = TempDir::new()?;
        let cfg = config_in(&dir);
        let mut session = ChatSession::open(&cfg, Engine::Rules, false)?;
        session.reply("hello").await?;
        assert!(!cfg.history_path().exists());
        Ok(())
    }

    #[test]
    fn test_intents_session_requires_model() {
        let dir = TempDir::new().unwrap();
        let cfg = config_in(&dir);
        let err = ChatSession::open(&cfg, Engine::Intents, false).err().unwrap();
        assert!(err.to_string().contains("snorelax intents init"));
    }

    #[test]
    fn test_banner_uses_bot_name() {
        let dir = TempDir::new().unwrap();
        let mut cfg = config_in(&dir);
        cfg.bot.name = "Night Owl".into();
        let session = ChatSession::open(&cfg, Engine::Rules, false).unwrap();
        assert_eq!(session.banner(), "Night Owl is ready. Type 'exit' to quit.");
        assert!(session.hint().is_none());
    }
}
