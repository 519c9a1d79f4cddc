//! # SnoRelax Configuration System
//!
//! File: cli/src/core/config.rs
//!
//! ## Overview
//!
//! This module implements the configuration system for SnoRelax, handling loading,
//! merging, validation, and access to configuration data. It supports a multi-level
//! configuration approach that combines defaults, user settings, and project-specific
//! overrides.
//!
//! ## Architecture
//!
//! Configuration sources (in order of precedence):
//! 1. Project-specific `.snorelax.toml` in current directory or ancestors
//! 2. User-specific `config.toml` in the platform config directory
//! 3. Default values defined in the code
//!
//! The `--data-dir` flag (or `SNORELAX_DATA_DIR`) overrides `storage.data_dir` after
//! merging. Relative file names in `[storage]` and `[classifier]` resolve against
//! the data directory.
//!
//! API keys are deliberately absent: providers read them from the environment.
//!
//! ## Examples
//!
//! ```rust
//! let cfg = config::load_config(None)?;
//! let history = cfg.history_path();
//! let threshold = cfg.classifier.error_threshold;
//! ```
//!
use crate::core::error::{Result, SnorelaxError};
use anyhow::{anyhow, Context};
use directories::ProjectDirs;
use serde::Deserialize;
use std::{
    fs,
    net::IpAddr,
    path::{Path, PathBuf},
};
use tracing::{debug, info, warn};

/// Represents the main configuration structure, loaded from TOML files.
#[derive(Deserialize, Debug, Default, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub bot: BotConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub classifier: ClassifierConfig,
    #[serde(default)]
    pub providers: ProvidersConfig,
    #[serde(default)]
    pub server: ServerSettings,
}

/// Identity of the bot as shown to users.
#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct BotConfig {
    /// Display name used in the REPL banner and the "your name" reply.
    #[serde(default = "default_bot_name")]
    pub name: String,
}

/// Where history, mood and training data live.
#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct StorageConfig {
    /// Base directory for all data files (can use ~). Will be expanded.
    #[serde(default = "default_data_dir")]
    pub data_dir: String,
    /// JSON array of `{user, bot, timestamp}` records.
    #[serde(default = "default_history_file")]
    pub history_file: String,
    /// JSON array of training entries written by the reply pipeline.
    #[serde(default = "default_training_file")]
    pub training_file: String,
    /// JSON array of mood entries.
    #[serde(default = "default_moods_file")]
    pub moods_file: String,
    /// SQLite file backing the per-user conversation collection.
    #[serde(default = "default_database_file")]
    pub database_file: String,
}

/// Intent classifier inputs, outputs and training parameters.
#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ClassifierConfig {
    #[serde(default = "default_intents_file")]
    pub intents_file: String,
    #[serde(default = "default_model_file")]
    pub model_file: String,
    /// Predictions at or below this probability are discarded.
    #[serde(default = "default_error_threshold")]
    pub error_threshold: f32,
    #[serde(default = "default_epochs")]
    pub epochs: usize,
    #[serde(default = "default_learning_rate")]
    pub learning_rate: f32,
    /// Seed for example shuffling, so training is reproducible.
    #[serde(default = "default_seed")]
    pub seed: u64,
}

/// Endpoints and models for the remote reply providers.
#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ProvidersConfig {
    #[serde(default = "default_cohere_base_url")]
    pub cohere_base_url: String,
    #[serde(default = "default_cohere_chat_model")]
    pub cohere_chat_model: String,
    #[serde(default = "default_cohere_generate_model")]
    pub cohere_generate_model: String,
    #[serde(default = "default_huggingface_base_url")]
    pub huggingface_base_url: String,
    #[serde(default = "default_huggingface_model")]
    pub huggingface_model: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

/// Bind address of `snorelax serve`.
#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ServerSettings {
    #[serde(default = "default_server_host")]
    pub host: IpAddr,
    #[serde(default = "default_server_port")]
    pub port: u16,
}

fn default_bot_name() -> String {
    "SnoRelax Bot".to_string()
}
fn default_data_dir() -> String {
    match ProjectDirs::from("com", "SnoRelax", "snorelax") {
        Some(dirs) => dirs.data_dir().to_string_lossy().into_owned(),
        None => "~/.snorelax".to_string(),
    }
}
fn default_history_file() -> String {
    "chat_memory.json".to_string()
}
fn default_training_file() -> String {
    "training_data.json".to_string()
}
fn default_moods_file() -> String {
    "moods.json".to_string()
}
fn default_database_file() -> String {
    "conversations.sqlite".to_string()
}
fn default_intents_file() -> String {
    "intents.json".to_string()
}
fn default_model_file() -> String {
    "intent_model.json".to_string()
}
fn default_error_threshold() -> f32 {
    0.25
}
fn default_epochs() -> usize {
    200
}
fn default_learning_rate() -> f32 {
    0.1
}
fn default_seed() -> u64 {
    42
}
fn default_cohere_base_url() -> String {
    "https://api.cohere.ai".to_string()
}
fn default_cohere_chat_model() -> String {
    "command-r-plus".to_string()
}
fn default_cohere_generate_model() -> String {
    "xlarge".to_string()
}
fn default_huggingface_base_url() -> String {
    "https://api-inference.huggingface.co".to_string()
}
fn default_huggingface_model() -> String {
    "facebook/blenderbot-3B".to_string()
}
fn default_timeout_secs() -> u64 {
    30
}
fn default_server_host() -> IpAddr {
    IpAddr::from([127, 0, 0, 1])
}
fn default_server_port() -> u16 {
    5000
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            name: default_bot_name(),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            history_file: default_history_file(),
            training_file: default_training_file(),
            moods_file: default_moods_file(),
            database_file: default_database_file(),
        }
    }
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            intents_file: default_intents_file(),
            model_file: default_model_file(),
            error_threshold: default_error_threshold(),
            epochs: default_epochs(),
            learning_rate: default_learning_rate(),
            seed: default_seed(),
        }
    }
}

impl Default for ProvidersConfig {
    fn default() -> Self {
        Self {
            cohere_base_url: default_cohere_base_url(),
            cohere_chat_model: default_cohere_chat_model(),
            cohere_generate_model: default_cohere_generate_model(),
            huggingface_base_url: default_huggingface_base_url(),
            huggingface_model: default_huggingface_model(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: default_server_host(),
            port: default_server_port(),
        }
    }
}

impl Config {
    /// Resolves a configured file name against the data directory.
    /// Absolute paths are returned unchanged.
    pub fn resolve(&self, file: &str) -> PathBuf {
        let path = Path::new(file);
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            Path::new(&self.storage.data_dir).join(path)
        }
    }

    pub fn history_path(&self) -> PathBuf {
        self.resolve(&self.storage.history_file)
    }

    pub fn training_path(&self) -> PathBuf {
        self.resolve(&self.storage.training_file)
    }

    pub fn moods_path(&self) -> PathBuf {
        self.resolve(&self.storage.moods_file)
    }

    pub fn database_path(&self) -> PathBuf {
        self.resolve(&self.storage.database_file)
    }

    pub fn intents_path(&self) -> PathBuf {
        self.resolve(&self.classifier.intents_file)
    }

    pub fn model_path(&self) -> PathBuf {
        self.resolve(&self.classifier.model_file)
    }
}

const PROJECT_CONFIG_FILENAME: &str = ".snorelax.toml";

/// Loads, merges, expands and validates the configuration.
///
/// `data_dir_override` comes from `--data-dir` / `SNORELAX_DATA_DIR` and wins over
/// every file-based setting.
pub fn load_config(data_dir_override: Option<&Path>) -> Result<Config> {
    let user_config = load_user_config()?;
    let project_config = load_project_config()?;
    let mut merged_config = merge_configs(user_config.unwrap_or_default(), project_config);
    if let Some(dir) = data_dir_override {
        debug!("Data directory overridden to {}", dir.display());
        merged_config.storage.data_dir = dir.to_string_lossy().into_owned();
    }
    expand_config_paths(&mut merged_config).context("Failed to expand paths in configuration")?;
    validate_config(&merged_config).context("Configuration validation failed")?;
    debug!("Final loaded configuration: {:?}", merged_config);
    Ok(merged_config)
}

fn load_user_config() -> Result<Option<Config>> {
    if let Some(proj_dirs) = ProjectDirs::from("com", "SnoRelax", "snorelax") {
        let config_path = proj_dirs.config_dir().join("config.toml");
        if config_path.exists() {
            info!("Loading user configuration from: {}", config_path.display());
            load_config_from_path(&config_path).map(Some)
        } else {
            debug!(
                "User configuration file not found at {}",
                config_path.display()
            );
            Ok(None)
        }
    } else {
        warn!("Could not determine user config directory.");
        Ok(None)
    }
}

fn load_project_config() -> Result<Option<Config>> {
    if let Some(project_config_path) = find_project_config_path()? {
        info!(
            "Loading project configuration from: {}",
            project_config_path.display()
        );
        load_config_from_path(&project_config_path).map(Some)
    } else {
        debug!("No project configuration file (.snorelax.toml) found in current directory or ancestors.");
        Ok(None)
    }
}

fn find_project_config_path() -> Result<Option<PathBuf>> {
    let current_dir = std::env::current_dir().context("Failed to get current directory")?;
    find_project_config_from(&current_dir)
}

fn find_project_config_from(start: &Path) -> Result<Option<PathBuf>> {
    let mut path: &Path = start;
    loop {
        let project_config = path.join(PROJECT_CONFIG_FILENAME);
        if project_config.is_file() {
            return Ok(Some(project_config));
        }
        if path.join(".git").is_dir() {
            debug!(
                "Found .git directory at {}, stopping project config search.",
                path.display()
            );
            return Ok(None);
        }
        match path.parent() {
            Some(parent) => path = parent,
            None => break,
        }
    }
    Ok(None)
}

fn load_config_from_path(path: &Path) -> Result<Config> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read configuration file: {}", path.display()))?;
    toml::from_str(&content)
        .with_context(|| format!("Failed to parse TOML from file: {}", path.display()))
}

/// Picks the project value when it differs from the built-in default.
fn prefer<T: PartialEq>(project: T, user: T, default: T) -> T {
    if project != default {
        project
    } else {
        user
    }
}

fn merge_configs(user: Config, project: Option<Config>) -> Config {
    let project = match project {
        Some(p) => p,
        None => return user,
    };
    let defaults = Config::default();
    Config {
        bot: BotConfig {
            name: prefer(project.bot.name, user.bot.name, defaults.bot.name),
        },
        storage: StorageConfig {
            data_dir: prefer(
                project.storage.data_dir,
                user.storage.data_dir,
                defaults.storage.data_dir,
            ),
            history_file: prefer(
                project.storage.history_file,
                user.storage.history_file,
                defaults.storage.history_file,
            ),
            training_file: prefer(
                project.storage.training_file,
                user.storage.training_file,
                defaults.storage.training_file,
            ),
            moods_file: prefer(
                project.storage.moods_file,
                user.storage.moods_file,
                defaults.storage.moods_file,
            ),
            database_file: prefer(
                project.storage.database_file,
                user.storage.database_file,
                defaults.storage.database_file,
            ),
        },
        classifier: ClassifierConfig {
            intents_file: prefer(
                project.classifier.intents_file,
                user.classifier.intents_file,
                defaults.classifier.intents_file,
            ),
            model_file: prefer(
                project.classifier.model_file,
                user.classifier.model_file,
                defaults.classifier.model_file,
            ),
            error_threshold: prefer(
                project.classifier.error_threshold,
                user.classifier.error_threshold,
                defaults.classifier.error_threshold,
            ),
            epochs: prefer(
                project.classifier.epochs,
                user.classifier.epochs,
                defaults.classifier.epochs,
            ),
            learning_rate: prefer(
                project.classifier.learning_rate,
                user.classifier.learning_rate,
                defaults.classifier.learning_rate,
            ),
            seed: prefer(
                project.classifier.seed,
                user.classifier.seed,
                defaults.classifier.seed,
            ),
        },
        providers: ProvidersConfig {
            cohere_base_url: prefer(
                project.providers.cohere_base_url,
                user.providers.cohere_base_url,
                defaults.providers.cohere_base_url,
            ),
            cohere_chat_model: prefer(
                project.providers.cohere_chat_model,
                user.providers.cohere_chat_model,
                defaults.providers.cohere_chat_model,
            ),
            cohere_generate_model: prefer(
                project.providers.cohere_generate_model,
                user.providers.cohere_generate_model,
                defaults.providers.cohere_generate_model,
            ),
            huggingface_base_url: prefer(
                project.providers.huggingface_base_url,
                user.providers.huggingface_base_url,
                defaults.providers.huggingface_base_url,
            ),
            huggingface_model: prefer(
                project.providers.huggingface_model,
                user.providers.huggingface_model,
                defaults.providers.huggingface_model,
            ),
            timeout_secs: prefer(
                project.providers.timeout_secs,
                user.providers.timeout_secs,
                defaults.providers.timeout_secs,
            ),
        },
        server: ServerSettings {
            host: prefer(project.server.host, user.server.host, defaults.server.host),
            port: prefer(project.server.port, user.server.port, defaults.server.port),
        },
    }
}

fn expand_config_paths(config: &mut Config) -> Result<()> {
    debug!("Expanding paths in configuration...");
    config.storage.data_dir = shellexpand::tilde(&config.storage.data_dir).into_owned();
    debug!("Expanded data directory: {}", config.storage.data_dir);
    for file in [
        &mut config.storage.history_file,
        &mut config.storage.training_file,
        &mut config.storage.moods_file,
        &mut config.storage.database_file,
        &mut config.classifier.intents_file,
        &mut config.classifier.model_file,
    ] {
        *file = shellexpand::tilde(file.as_str()).into_owned();
    }
    Ok(())
}

fn validate_config(config: &Config) -> Result<()> {
    info!("Validating final configuration...");
    let data_dir = PathBuf::from(&config.storage.data_dir);
    if data_dir.exists() && !data_dir.is_dir() {
        return Err(anyhow!(SnorelaxError::Config(format!(
            "Configured data directory '{}' exists but is not a directory.",
            data_dir.display()
        ))));
    }
    let files = [
        ("storage.history_file", &config.storage.history_file),
        ("storage.training_file", &config.storage.training_file),
        ("storage.moods_file", &config.storage.moods_file),
        ("storage.database_file", &config.storage.database_file),
        ("classifier.intents_file", &config.classifier.intents_file),
        ("classifier.model_file", &config.classifier.model_file),
    ];
    for (key, value) in files {
        if value.trim().is_empty() {
            return Err(anyhow!(SnorelaxError::Config(format!(
                "'{}' cannot be empty.",
                key
            ))));
        }
    }
    let threshold = config.classifier.error_threshold;
    if !(threshold > 0.0 && threshold < 1.0) {
        return Err(anyhow!(SnorelaxError::Config(format!(
            "classifier.error_threshold must be between 0 and 1 (exclusive), got {}.",
            threshold
        ))));
    }
    if config.classifier.epochs == 0 {
        return Err(anyhow!(SnorelaxError::Config(
            "classifier.epochs must be greater than zero.".to_string()
        )));
    }
    if !(config.classifier.learning_rate > 0.0) {
        return Err(anyhow!(SnorelaxError::Config(format!(
            "classifier.learning_rate must be positive, got {}.",
            config.classifier.learning_rate
        ))));
    }
    if config.providers.timeout_secs == 0 {
        return Err(anyhow!(SnorelaxError::Config(
            "providers.timeout_secs must be greater than zero.".to_string()
        )));
    }
    info!("Configuration validation successful.");
    Ok(())
}
