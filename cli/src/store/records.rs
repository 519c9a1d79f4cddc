//! Records persisted by the JSON logs and the conversation collection.

use crate::bot::mood::{detect_mood, Mood};
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One exchange in the flat `chat_memory.json` history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatRecord {
    pub user: String,
    pub bot: String,
    /// ISO-8601, kept as written.
    pub timestamp: String,
}

impl ChatRecord {
    pub fn now(user: impl Into<String>, bot: impl Into<String>) -> Self {
        Self {
            user: user.into(),
            bot: bot.into(),
            timestamp: iso_now(),
        }
    }
}

/// A document in the per-user conversation collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Conversation {
    pub id: Uuid,
    pub user_id: String,
    pub user_message: String,
    pub bot_reply: String,
    pub mood: Mood,
    pub language: String,
    pub created_at: DateTime<Utc>,
}

impl Conversation {
    /// New document with a fresh id; `mood` is derived from the user's message.
    pub fn new(
        user_id: impl Into<String>,
        user_message: impl Into<String>,
        bot_reply: impl Into<String>,
        language: impl Into<String>,
    ) -> Self {
        let user_message = user_message.into();
        Self {
            id: Uuid::new_v4(),
            user_id: user_id.into(),
            mood: detect_mood(&user_message).mood,
            user_message,
            bot_reply: bot_reply.into(),
            language: language.into(),
            created_at: Utc::now(),
        }
    }
}

/// One line of `training_data.json`, recorded for every API reply.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrainingEntry {
    pub user_id: String,
    pub user_message: String,
    pub bot_reply: String,
    pub language: String,
    pub source: String,
    pub timestamp: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoodEntry {
    pub id: Uuid,
    pub user_id: String,
    /// Free-form label as submitted; not restricted to the analyzer's moods.
    pub mood: String,
    pub date: String,
}

impl MoodEntry {
    pub fn new(user_id: impl Into<String>, mood: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id: user_id.into(),
            mood: mood.into(),
            date: iso_now(),
        }
    }
}

/// Current UTC time as ISO-8601 with millisecond precision.
pub fn iso_now() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_conversation_derives_mood() {
        let conv = Conversation::new("u1", "I am so stressed and overwhelmed", "Breathe.", "en");
        assert_eq!(conv.mood, Mood::Stressed);
        assert_eq!(conv.id.get_version_num(), 4);
    }

    #[test]
    fn test_conversation_json_is_camel_case() {
        let conv = Conversation::new("u1", "hello", "hi", "auto");
        let value = serde_json::to_value(&conv).unwrap();
        assert_eq!(value["userId"], "u1");
        assert_eq!(value["userMessage"], "hello");
        assert_eq!(value["botReply"], "hi");
        assert_eq!(value["mood"], "neutral");
        assert!(value.get("createdAt").is_some());
    }

    #[test]
    fn test_mood_entry_shape() {
        let entry = MoodEntry::new("u1", "calm");
        let value = serde_json::to_value(&entry).unwrap();
        assert_eq!(value["userId"], "u1");
        assert_eq!(value["mood"], "calm");
        assert!(value["date"].as_str().unwrap().ends_with('Z'));
    }
}
