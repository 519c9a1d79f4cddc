//! Hardcoded rule bot.
//!
//! A fixed decision table evaluated top to bottom against the normalized
//! message. The first matching rule wins; nothing matching yields the fallback.

use crate::bot::text::normalize;

/// Reply when no rule matches.
pub const FALLBACK_REPLY: &str = "Sorry, I don't understand. Can you rephrase?";

/// How a rule tests the normalized message.
#[derive(Debug, Clone, Copy)]
enum Trigger {
    /// The whole message equals one of these words.
    Exactly(&'static [&'static str]),
    /// The message contains this phrase anywhere.
    Contains(&'static str),
}

/// What a matching rule answers.
#[derive(Debug, Clone, Copy)]
enum Answer {
    Fixed(&'static str),
    /// "I'm <bot name>."
    Introduce,
}

#[derive(Debug, Clone, Copy)]
struct Rule {
    name: &'static str,
    trigger: Trigger,
    answer: Answer,
}

/// Priority order matters: "help me say bye" is a help request.
const RULES: &[Rule] = &[
    Rule {
        name: "greeting",
        trigger: Trigger::Exactly(&["hi", "hello", "hey"]),
        answer: Answer::Fixed("Hello! How can I help you today?"),
    },
    Rule {
        name: "wellbeing",
        trigger: Trigger::Contains("how are you"),
        answer: Answer::Fixed("I'm just a bot, but I'm here to help!"),
    },
    Rule {
        name: "help",
        trigger: Trigger::Contains("help"),
        answer: Answer::Fixed("Sure, let me know what you need help with."),
    },
    Rule {
        name: "farewell",
        trigger: Trigger::Contains("bye"),
        answer: Answer::Fixed("Goodbye! Have a great day!"),
    },
    Rule {
        name: "name",
        trigger: Trigger::Contains("your name"),
        answer: Answer::Introduce,
    },
];

/// Result of running the decision table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuleOutcome {
    Matched { rule: &'static str, reply: String },
    Fallback,
}

impl RuleOutcome {
    /// The text to show the user, fallback included.
    pub fn reply(&self) -> &str {
        match self {
            RuleOutcome::Matched { reply, .. } => reply,
            RuleOutcome::Fallback => FALLBACK_REPLY,
        }
    }
}

#[derive(Debug, Clone)]
pub struct RuleBot {
    name: String,
}

impl RuleBot {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    pub fn classify(&self, message: &str) -> RuleOutcome {
        let msg = normalize(message);
        for rule in RULES {
            let hit = match rule.trigger {
                Trigger::Exactly(words) => words.contains(&msg.as_str()),
                Trigger::Contains(phrase) => msg.contains(phrase),
            };
            if hit {
                let reply = match rule.answer {
                    Answer::Fixed(text) => text.to_string(),
                    Answer::Introduce => format!("I'm {}.", self.name),
                };
                return RuleOutcome::Matched {
                    rule: rule.name,
                    reply,
                };
            }
        }
        RuleOutcome::Fallback
    }

    /// Convenience for callers that only want the text.
    pub fn reply(&self, message: &str) -> String {
        self.classify(message).reply().to_string()
    }
}

impl Default for RuleBot {
    fn default() -> Self {
        Self::new("SnoRelax Bot")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bot() -> RuleBot {
        RuleBot::default()
    }

    #[test]
    fn test_greetings_match_exactly() {
        for msg in ["hi", "Hello", "HEY!", "  hey  "] {
            assert_eq!(bot().reply(msg), "Hello! How can I help you today?", "{msg}");
        }
        // Not an exact greeting, and no other rule applies.
        assert_eq!(bot().reply("hi there"), FALLBACK_REPLY);
    }

    #[test]
    fn test_each_keyword_maps_to_its_reply() {
        assert_eq!(bot().reply("How are you?"), "I'm just a bot, but I'm here to help!");
        assert_eq!(bot().reply("I need help"), "Sure, let me know what you need help with.");
        assert_eq!(bot().reply("ok bye"), "Goodbye! Have a great day!");
        assert_eq!(bot().reply("What's your name?"), "I'm SnoRelax Bot.");
    }

    #[test]
    fn test_priority_order() {
        // "how are you" outranks "help" and "bye".
        assert_eq!(
            bot().reply("how are you, can you help before I say bye"),
            "I'm just a bot, but I'm here to help!"
        );
        // "help" outranks "bye" and "your name".
        assert_eq!(
            bot().reply("help me say bye to your name"),
            "Sure, let me know what you need help with."
        );
        // "bye" outranks "your name".
        assert_eq!(bot().reply("bye, what was your name"), "Goodbye! Have a great day!");
    }

    #[test]
    fn test_fallback_is_reported() {
        let outcome = bot().classify("the weather is nice");
        assert_eq!(outcome, RuleOutcome::Fallback);
        assert_eq!(outcome.reply(), FALLBACK_REPLY);
    }

    #[test]
    fn test_configured_name() {
        let outcome = RuleBot::new("Night Owl").classify("your name?");
        assert_eq!(
            outcome,
            RuleOutcome::Matched {
                rule: "name",
                reply: "I'm Night Owl.".into()
            }
        );
    }
}
