//! Keyword-based mood detection.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mood {
    Happy,
    Sad,
    Angry,
    Stressed,
    Anxiety,
    Emotional,
    Neutral,
}

impl Mood {
    pub fn label(&self) -> &'static str {
        match self {
            Mood::Happy => "happy",
            Mood::Sad => "sad",
            Mood::Angry => "angry",
            Mood::Stressed => "stressed",
            Mood::Anxiety => "anxiety",
            Mood::Emotional => "emotional",
            Mood::Neutral => "neutral",
        }
    }
}

impl fmt::Display for Mood {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Mood {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        MOOD_KEYWORDS
            .iter()
            .map(|(mood, _)| *mood)
            .chain(std::iter::once(Mood::Neutral))
            .find(|mood| mood.label() == wanted)
            .ok_or_else(|| format!("unknown mood '{}'", s))
    }
}

/// Table order decides ties: the earlier mood wins.
pub const MOOD_KEYWORDS: &[(Mood, &[&str])] = &[
    (Mood::Happy, &["happy", "joy", "excited", "good", "smile", "glad"]),
    (Mood::Sad, &["sad", "down", "depressed", "unhappy", "cry"]),
    (Mood::Angry, &["angry", "mad", "furious", "annoyed"]),
    (Mood::Stressed, &["stressed", "overwhelmed", "pressure"]),
    (Mood::Anxiety, &["anxious", "nervous", "worried", "panic"]),
    (Mood::Emotional, &["emotional", "tears", "sensitive"]),
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoodReading {
    pub mood: Mood,
    pub score: usize,
    /// Every word that hit the table, in input order, duplicates kept.
    pub keywords: Vec<String>,
}

/// Scores each mood by exact word hits and returns the strictly highest.
pub fn detect_mood(text: &str) -> MoodReading {
    let lowered = text.to_lowercase();
    let words: Vec<&str> = lowered
        .split(|c: char| !(c.is_alphanumeric() || c == '_'))
        .filter(|w| !w.is_empty())
        .collect();

    let mut best = Mood::Neutral;
    let mut best_score = 0;
    for (mood, keywords) in MOOD_KEYWORDS {
        let score = words.iter().filter(|w| keywords.contains(*w)).count();
        if score > best_score {
            best = *mood;
            best_score = score;
        }
    }

    let keywords = words
        .iter()
        .filter(|w| MOOD_KEYWORDS.iter().any(|(_, kws)| kws.contains(*w)))
        .map(|w| w.to_string())
        .collect();

    MoodReading {
        mood: best,
        score: best_score,
        keywords,
    }
}
