//! # Chat API Routes
//!
//! File: cli/src/commands/serve/routes.rs
//!
//! ## Overview
//!
//! Handlers and shared state for `snorelax serve`. JSON bodies use camelCase keys.
//! Missing required fields answer 400 with `{"error": ...}`; unknown paths or methods answer
//! 404 `{"error": "Endpoint not found"}`; unexpected failures answer 500.
//!
//! Writes to the JSON logs go through one async mutex so concurrent requests never
//! interleave a read-modify-write of the same file. Failing to store a chat
//! exchange is logged and does not fail the request.
//!
use crate::bot::guide::{build_guide, Guide, GuideInput, HISTORY_WINDOW};
use crate::bot::pipeline::{build_prompt, Reply, ReplyPipeline, ReplySource, PROMPT_TURNS};
use crate::bot::providers::{CohereClient, Providers};
use crate::bot::rules::RuleBot;
use crate::core::config::Config;
use crate::core::error::Result;
use crate::store::records::iso_now;
use crate::store::{ChatCollection, Conversation, JsonLog, MoodEntry, TrainingEntry};
use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};

/// Everything the handlers share. Cheap to clone.
#[derive(Clone)]
pub struct AppState {
    pipeline: Arc<ReplyPipeline>,
    cohere: Option<CohereClient>,
    collection: ChatCollection,
    training: JsonLog<TrainingEntry>,
    moods: JsonLog<MoodEntry>,
    log_lock: Arc<Mutex<()>>,
}

impl AppState {
    pub fn new(
        pipeline: ReplyPipeline,
        cohere: Option<CohereClient>,
        collection: ChatCollection,
        training: JsonLog<TrainingEntry>,
        moods: JsonLog<MoodEntry>,
    ) -> Self {
        Self {
            pipeline: Arc::new(pipeline),
            cohere,
            collection,
            training,
            moods,
            log_lock: Arc::new(Mutex::new(())),
        }
    }

    pub async fn from_config(cfg: &Config) -> Result<Self> {
        let providers = Providers::from_env(&cfg.providers)?;
        if providers.is_empty() {
            warn!("No COHERE_API_KEY or HF_API_KEY set; unmatched messages get the placeholder reply");
        }
        let collection = ChatCollection::open(&cfg.database_path()).await?;
        info!(
            "Conversation store {} holds {} documents",
            cfg.database_path().display(),
            collection.count().await?
        );
        let pipeline = ReplyPipeline::from_providers(RuleBot::new(cfg.bot.name.clone()), &providers);
        Ok(Self::new(
            pipeline,
            providers.cohere.clone(),
            collection,
            JsonLog::new(cfg.training_path()),
            JsonLog::new(cfg.moods_path()),
        ))
    }
}

/// JSON error body with a status code.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    fn bad_request(message: &str) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "error": self.message }))).into_response()
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        error!("Request failed: {:#}", err);
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, err.to_string())
    }
}

type ApiResult<T> = std::result::Result<T, ApiError>;

/// A body that is not JSON is treated like an empty object, so field validation
/// produces the route's own 400 message.
fn body_or_default<T: Default>(payload: std::result::Result<Json<T>, JsonRejection>) -> T {
    match payload {
        Ok(Json(body)) => body,
        Err(rejection) => {
            debug!("Ignoring unreadable JSON body: {}", rejection.body_text());
            T::default()
        }
    }
}

fn present(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/api/chat", post(chat))
        .route("/api/chat/history", get(chat_history))
        .route("/api/moods/{user_id}", post(add_mood).get(list_moods))
        .route("/api/ai/guide", post(guide))
        .fallback(not_found)
        .method_not_allowed_fallback(not_found)
        .with_state(state)
}

async fn root() -> &'static str {
    "SnoRelax API is running"
}

async fn not_found() -> ApiError {
    ApiError::new(StatusCode::NOT_FOUND, "Endpoint not found")
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ChatRequest {
    user_id: Option<String>,
    message: Option<String>,
    lang: Option<String>,
}

#[derive(Debug, Serialize)]
struct ChatResponse {
    sender: &'static str,
    text: String,
    source: ReplySource,
}

async fn chat(
    State(state): State<AppState>,
    payload: std::result::Result<Json<ChatRequest>, JsonRejection>,
) -> ApiResult<Json<ChatResponse>> {
    let request = body_or_default(payload);
    let (Some(user_id), Some(message)) = (present(request.user_id), present(request.message)) else {
        return Err(ApiError::bad_request("Message and userId required"));
    };
    let language = present(request.lang).unwrap_or_else(|| "auto".to_string());

    let history = state
        .collection
        .recent_by_user(&user_id, PROMPT_TURNS as i64)
        .await
        .unwrap_or_else(|e| {
            warn!("Could not load history for {}: {:#}", user_id, e);
            Vec::new()
        });
    let prompt = build_prompt(
        history
            .iter()
            .map(|c| (c.user_message.as_str(), c.bot_reply.as_str())),
        &message,
    );

    let reply = state.pipeline.reply(&message, &prompt).await;
    info!("Replied to {} via {}", user_id, reply.source);
    store_exchange(&state, &user_id, &message, &reply, &language).await;

    Ok(Json(ChatResponse {
        sender: "bot",
        text: reply.text,
        source: reply.source,
    }))
}

async fn store_exchange(state: &AppState, user_id: &str, message: &str, reply: &Reply, language: &str) {
    let conversation = Conversation::new(user_id, message, reply.text.as_str(), language);
    if let Err(e) = state.collection.insert_if_new(&conversation).await {
        error!("Failed to store conversation: {:#}", e);
    }

    let entry = TrainingEntry {
        user_id: user_id.to_string(),
        user_message: message.to_string(),
        bot_reply: reply.text.clone(),
        language: language.to_string(),
        source: reply.source.to_string(),
        timestamp: iso_now(),
    };
    let _guard = state.log_lock.lock().await;
    if let Err(e) = state.training.append(entry) {
        error!("Failed to save training entry: {:#}", e);
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct HistoryQuery {
    user_id: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct HistoryItem {
    user_message: String,
    bot_reply: String,
}

async fn chat_history(
    State(state): State<AppState>,
    Query(query): Query<HistoryQuery>,
) -> ApiResult<Json<Vec<HistoryItem>>> {
    let Some(user_id) = present(query.user_id) else {
        return Err(ApiError::bad_request("UserId required"));
    };
    let items = state
        .collection
        .find_by_user(&user_id)
        .await?
        .into_iter()
        .map(|c| HistoryItem {
            user_message: c.user_message,
            bot_reply: c.bot_reply,
        })
        .collect();
    Ok(Json(items))
}

#[derive(Debug, Default, Deserialize)]
struct MoodRequest {
    mood: Option<serde_json::Value>,
}

/// Strings are kept as sent; any other JSON value is stored in its JSON text.
/// `null` counts as missing.
fn mood_label(value: Option<serde_json::Value>) -> Option<String> {
    match value? {
        serde_json::Value::Null => None,
        serde_json::Value::String(label) => Some(label),
        other => Some(other.to_string()),
    }
}

#[derive(Debug, Serialize)]
struct MoodCreated {
    ok: bool,
    entry: MoodEntry,
}

#[derive(Debug, Serialize)]
struct MoodList {
    ok: bool,
    moods: Vec<MoodEntry>,
}

async fn add_mood(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    payload: std::result::Result<Json<MoodRequest>, JsonRejection>,
) -> ApiResult<Json<MoodCreated>> {
    let (Some(user_id), Some(mood)) = (present(Some(user_id)), mood_label(body_or_default(payload).mood)) else {
        return Err(ApiError::bad_request("userId & mood required"));
    };

    let entry = MoodEntry::new(user_id, mood);
    let _guard = state.log_lock.lock().await;
    state.moods.append(entry.clone())?;
    Ok(Json(MoodCreated { ok: true, entry }))
}

async fn list_moods(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> ApiResult<Json<MoodList>> {
    let moods = state
        .moods
        .load()?
        .into_iter()
        .filter(|m| m.user_id == user_id)
        .collect();
    Ok(Json(MoodList { ok: true, moods }))
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GuideRequest {
    user_id: Option<String>,
}

#[derive(Debug, Serialize)]
struct GuideResponse {
    ok: bool,
    guide: Guide,
}

async fn guide(
    State(state): State<AppState>,
    payload: std::result::Result<Json<GuideRequest>, JsonRejection>,
) -> ApiResult<Json<GuideResponse>> {
    let Some(user_id) = present(body_or_default(payload).user_id) else {
        return Err(ApiError::bad_request("userId required"));
    };
    let history = state.collection.recent_by_user(&user_id, HISTORY_WINDOW).await?;
    let moods = state.moods.load()?;
    let input = GuideInput::new(history, &moods, &user_id);
    let guide = build_guide(state.cohere.as_ref(), &input).await;
    Ok(Json(GuideResponse { ok: true, guide }))
}
