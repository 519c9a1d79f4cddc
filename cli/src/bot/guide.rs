//! Wellness guide built from a user's recent conversations and moods.
//!
//! With a Cohere key the guide is generated remotely as JSON; otherwise, or when
//! Cohere fails, a local keyword heuristic picks from a fixed set of routines.

use crate::bot::providers::{CohereClient, GenerateRequest};
use crate::core::error::Result;
use crate::store::records::{Conversation, MoodEntry};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use tracing::{debug, warn};

/// Conversations considered per guide.
pub const HISTORY_WINDOW: i64 = 20;
/// Mood entries considered per guide, most recent first.
pub const MOOD_WINDOW: usize = 7;

const SUMMARY_MESSAGES: usize = 10;
const SUMMARY_CHARS: usize = 300;
const NO_HISTORY_SUMMARY: &str = "No significant chat history available.";

const STRESS_MARKERS: &[&str] = &["stress", "anx", "panic", "overwhelm", "overwhelmed", "worry"];
const FATIGUE_MARKERS: &[&str] = &["tired", "fatigue", "sleep", "insomnia", "sleeping"];

const GUIDE_PROMPT: &str = "You are SnoBot, a compassionate mental health assistant. Given the user's \
concise history and mood data, produce a short JSON object with keys: summary (one short paragraph), \
urgent (true/false), recommendations (array of objects with title, type(\"yoga\"|\"exercise\"|\"breathing\"|\"lifestyle\"), \
durationMinutes, intensity(\"low\"|\"moderate\"|\"high\"), steps (array of short step instructions)). \
Keep responses safe and do not provide medical diagnoses. User data:\n";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recommendation {
    #[serde(default)]
    pub title: String,
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub duration_minutes: u32,
    #[serde(default)]
    pub intensity: String,
    #[serde(default)]
    pub steps: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Guide {
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub urgent: bool,
    #[serde(default)]
    pub recommendations: Vec<Recommendation>,
}

/// What a guide is built from.
#[derive(Debug, Clone, Default)]
pub struct GuideInput {
    /// Oldest first.
    pub history: Vec<Conversation>,
    /// Most recent first.
    pub moods: Vec<MoodEntry>,
}

impl GuideInput {
    /// Keeps the last `MOOD_WINDOW` entries of `user_id` from an append-ordered log.
    pub fn new(history: Vec<Conversation>, mood_log: &[MoodEntry], user_id: &str) -> Self {
        let moods = mood_log
            .iter()
            .rev()
            .filter(|m| m.user_id == user_id)
            .take(MOOD_WINDOW)
            .cloned()
            .collect();
        Self { history, moods }
    }

    fn compact_json(&self) -> String {
        let history: Vec<_> = self
            .history
            .iter()
            .map(|c| json!({"userMessage": c.user_message, "botReply": c.bot_reply}))
            .collect();
        let moods: Vec<_> = self
            .moods
            .iter()
            .map(|m| json!({"mood": m.mood, "date": m.date}))
            .collect();
        json!({"history": history, "moods": moods}).to_string()
    }
}

fn routine(title: &str, kind: &str, minutes: u32, intensity: &str, steps: &[&str]) -> Recommendation {
    Recommendation {
        title: title.to_string(),
        kind: kind.to_string(),
        duration_minutes: minutes,
        intensity: intensity.to_string(),
        steps: steps.iter().map(|s| s.to_string()).collect(),
    }
}

/// Keyword heuristic over the last messages and mood labels.
pub fn local_guide(input: &GuideInput) -> Guide {
    let skip = input.history.len().saturating_sub(SUMMARY_MESSAGES);
    let recent = input.history[skip..]
        .iter()
        .map(|c| c.user_message.as_str())
        .collect::<Vec<_>>()
        .join(" \n ");
    let mood_text = input
        .moods
        .iter()
        .map(|m| m.mood.as_str())
        .collect::<Vec<_>>()
        .join(" ");
    let blob = format!("{} {}", recent, mood_text).to_lowercase();
    let mentions = |markers: &[&str]| markers.iter().any(|m| blob.contains(m));

    let mut recommendations = Vec::new();
    if mentions(STRESS_MARKERS) {
        recommendations.push(routine(
            "4-7-8 Breathing",
            "breathing",
            5,
            "low",
            &[
                "Sit comfortably",
                "Inhale for 4 seconds",
                "Hold for 7 seconds",
                "Exhale slowly for 8 seconds",
                "Repeat 4 cycles",
            ],
        ));
        recommendations.push(routine(
            "Gentle Yoga Flow",
            "yoga",
            10,
            "low",
            &[
                "Child pose - 1 min",
                "Cat-Cow - 1 min",
                "Downward dog - 1 min",
                "Low lunge each side - 1 min",
                "Savasana - 3 min",
            ],
        ));
    }
    if mentions(FATIGUE_MARKERS) {
        recommendations.push(routine(
            "Evening Stretch & Wind-down",
            "lifestyle",
            12,
            "low",
            &[
                "Gentle neck rolls - 1 min",
                "Seated forward fold - 2 min",
                "Legs up the wall - 5 min",
                "Deep breathing - 4 min",
            ],
        ));
    }
    if recommendations.is_empty() {
        recommendations.push(routine(
            "Quick Bodyweight Circuit",
            "exercise",
            12,
            "moderate",
            &[
                "Jumping jacks - 1 min",
                "Bodyweight squats - 1 min",
                "Push-ups (knees ok) - 1 min",
                "Plank - 45s",
                "Rest 30s and repeat 2x",
            ],
        ));
        recommendations.push(routine(
            "Morning Mobility",
            "yoga",
            8,
            "low",
            &[
                "Neck circles - 30s",
                "Shoulder rolls - 30s",
                "Hip circles - 1 min",
                "Sun salutations x3 - 5 min",
            ],
        ));
    }

    let summary = if recent.is_empty() {
        NO_HISTORY_SUMMARY.to_string()
    } else {
        recent.chars().take(SUMMARY_CHARS).collect()
    };

    Guide {
        summary,
        urgent: false,
        recommendations,
    }
}

/// Reads a guide out of free model output.
///
/// Parsing starts at the first `{` and stops after one JSON value. Fields are read
/// leniently: numeric strings and fractional durations are accepted, unknown keys
/// ignored. Text that is not a JSON object becomes a guide whose summary is its
/// first line.
pub fn parse_guide(text: &str) -> Guide {
    let start = text.find('{').unwrap_or(0);
    let mut values = serde_json::Deserializer::from_str(&text[start..]).into_iter::<Value>();
    match values.next() {
        Some(Ok(Value::Object(fields))) => guide_from_fields(&fields),
        _ => {
            debug!("Model output is not a JSON object; using its first line");
            Guide {
                summary: text.trim().lines().next().unwrap_or_default().to_string(),
                urgent: false,
                recommendations: Vec::new(),
            }
        }
    }
}

fn guide_from_fields(fields: &Map<String, Value>) -> Guide {
    let recommendations = fields
        .get("recommendations")
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(Value::as_object)
                .map(recommendation_from_fields)
                .collect()
        })
        .unwrap_or_default();
    Guide {
        summary: text_of(fields.get("summary")),
        urgent: flag_of(fields.get("urgent")),
        recommendations,
    }
}

fn recommendation_from_fields(fields: &Map<String, Value>) -> Recommendation {
    let steps = match fields.get("steps") {
        Some(Value::Array(items)) => items.iter().map(|item| text_of(Some(item))).collect(),
        Some(Value::String(step)) => vec![step.clone()],
        _ => Vec::new(),
    };
    Recommendation {
        title: text_of(fields.get("title")),
        kind: text_of(fields.get("type")),
        duration_minutes: minutes_of(fields.get("durationMinutes")),
        intensity: text_of(fields.get("intensity")),
        steps,
    }
}

fn text_of(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(text)) => text.clone(),
        Some(other) => other.to_string(),
    }
}

fn flag_of(value: Option<&Value>) -> bool {
    match value {
        Some(Value::Bool(flag)) => *flag,
        Some(Value::String(text)) => text.trim().eq_ignore_ascii_case("true"),
        _ => false,
    }
}

/// Rounded whole minutes from `12`, `7.5`, `"10"` or `"10 minutes"`; 0 otherwise.
fn minutes_of(value: Option<&Value>) -> u32 {
    let minutes = match value {
        Some(Value::Number(number)) => number.as_f64(),
        Some(Value::String(text)) => text
            .split_whitespace()
            .next()
            .and_then(|word| word.parse::<f64>().ok()),
        _ => None,
    };
    minutes
        .filter(|m| m.is_finite() && *m > 0.0)
        .map(|m| m.round().min(f64::from(u32::MAX)) as u32)
        .unwrap_or(0)
}

pub async fn cohere_guide(cohere: &CohereClient, input: &GuideInput) -> Result<Guide> {
    let prompt = format!(
        "{}{}\nRespond ONLY with valid JSON.",
        GUIDE_PROMPT,
        input.compact_json()
    );
    let request = GenerateRequest::guide(cohere.generate_model(), &prompt);
    let text = cohere.generate(&request).await?;
    Ok(parse_guide(&text))
}

/// Cohere when configured, the local heuristic otherwise or on any Cohere failure.
pub async fn build_guide(cohere: Option<&CohereClient>, input: &GuideInput) -> Guide {
    if let Some(client) = cohere {
        match cohere_guide(client, input).await {
            Ok(guide) => return guide,
            Err(e) => warn!("Cohere guide failed, using local generator: {:#}", e),
        }
    }
    local_guide(input)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bot::providers::test_support::settings_for;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn input(messages: &[&str], moods: &[&str]) -> GuideInput {
        let history = messages
            .iter()
            .map(|m| Conversation::new("u1", *m, "ok", "en"))
            .collect();
        let log: Vec<_> = moods.iter().map(|m| MoodEntry::new("u1", *m)).collect();
        GuideInput::new(history, &log, "u1")
    }

    fn titles(guide: &Guide) -> Vec<&str> {
        guide.recommendations.iter().map(|r| r.title.as_str()).collect()
    }

    #[test]
    fn test_stress_and_fatigue_markers() {
        let guide = local_guide(&input(&["work is so much pressure, I panic"], &["tired"]));
        assert_eq!(
            titles(&guide),
            vec!["4-7-8 Breathing", "Gentle Yoga Flow", "Evening Stretch & Wind-down"]
        );
        assert!(!guide.urgent);
        assert!(guide.summary.starts_with("work is so much pressure"));
    }

    #[test]
    fn test_default_routines_and_empty_summary() {
        let guide = local_guide(&GuideInput::default());
        assert_eq!(titles(&guide), vec!["Quick Bodyweight Circuit", "Morning Mobility"]);
        assert_eq!(guide.summary, NO_HISTORY_SUMMARY);
    }

    #[test]
    fn test_summary_uses_last_ten_messages_and_is_capped() {
        let messages: Vec<String> = (0..12).map(|i| format!("message {:02} {}", i, "x".repeat(40))).collect();
        let refs: Vec<&str> = messages.iter().map(String::as_str).collect();
        let guide = local_guide(&input(&refs, &[]));
        assert!(guide.summary.starts_with("message 02"));
        assert_eq!(guide.summary.chars().count(), SUMMARY_CHARS);
    }

    #[test]
    fn test_moods_are_most_recent_first_and_per_user() {
        let mut log: Vec<_> = (0..9).map(|i| MoodEntry::new("u1", format!("m{}", i))).collect();
        log.push(MoodEntry::new("u2", "other"));
        let input = GuideInput::new(Vec::new(), &log, "u1");
        let moods: Vec<_> = input.moods.iter().map(|m| m.mood.as_str()).collect();
        assert_eq!(moods, vec!["m8", "m7", "m6", "m5", "m4", "m3", "m2"]);
    }

    #[test]
    fn test_parse_guide_from_noisy_output() {
        let text = "Sure! Here it is:\n{\"summary\": \"Rest more.\", \"urgent\": true, \
                    \"recommendations\": [{\"title\": \"Walk\", \"type\": \"exercise\", \
                    \"durationMinutes\": 15, \"intensity\": \"low\", \"steps\": [\"Go outside\"]}]}\nHope it helps";
        let guide = parse_guide(text);
        assert_eq!(guide.summary, "Rest more.");
        assert!(guide.urgent);
        assert_eq!(guide.recommendations[0].kind, "exercise");
        assert_eq!(guide.recommendations[0].duration_minutes, 15);
    }

    #[test]
    fn test_parse_guide_accepts_loose_fields() {
        let text = "{\"summary\": \"Rest more.\", \"urgent\": \"yes\", \"mood\": \"low\", \
                    \"recommendations\": [{\"title\": \"Box Breathing\", \"type\": \"breathing\", \
                    \"durationMinutes\": 7.5, \"steps\": [\"Inhale 4s\", 4]}, \
                    {\"title\": \"Walk\", \"durationMinutes\": \"10 minutes\", \"steps\": \"Go outside\"}, \
                    \"stretch\"]}";
        let guide = parse_guide(text);
        assert_eq!(guide.summary, "Rest more.");
        assert!(!guide.urgent);
        assert_eq!(titles(&guide), vec!["Box Breathing", "Walk"]);
        assert_eq!(guide.recommendations[0].duration_minutes, 8);
        assert_eq!(guide.recommendations[0].steps, vec!["Inhale 4s", "4"]);
        assert_eq!(guide.recommendations[1].duration_minutes, 10);
        assert_eq!(guide.recommendations[1].kind, "");
        assert_eq!(guide.recommendations[1].steps, vec!["Go outside"]);
    }

    #[test]
    fn test_parse_guide_string_flags() {
        let guide = parse_guide("{\"summary\": 3, \"urgent\": \"TRUE\"}");
        assert_eq!(guide.summary, "3");
        assert!(guide.urgent);
        assert!(guide.recommendations.is_empty());
    }

    #[test]
    fn test_parse_guide_fallback_structure() {
        let guide = parse_guide("  Take a short walk today.\nAnd drink water.");
        assert_eq!(guide.summary, "Take a short walk today.");
        assert!(!guide.urgent);
        assert!(guide.recommendations.is_empty());
    }

    #[tokio::test]
    async fn test_build_guide_falls_back_on_cohere_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/generate"))
            .respond_with(ResponseTemplate::new(500))
            .expect(1)
            .mount(&server)
            .await;
        let client = CohereClient::new(reqwest::Client::new(), &settings_for(&server.uri()), "k".into());

        let guide = build_guide(Some(&client), &GuideInput::default()).await;
        assert_eq!(guide, local_guide(&GuideInput::default()));
    }

    #[tokio::test]
    async fn test_build_guide_uses_cohere_json() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/generate"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "generations": [{"text": "{\"summary\": \"Sleep early.\", \"urgent\": false, \"recommendations\": []}"}]
            })))
            .mount(&server)
            .await;
        let client = CohereClient::new(reqwest::Client::new(), &settings_for(&server.uri()), "k".into());

        let guide = build_guide(Some(&client), &input(&["hi"], &[])).await;
        assert_eq!(guide.summary, "Sleep early.");
        assert!(guide.recommendations.is_empty());
    }
}
