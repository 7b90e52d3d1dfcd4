use std::collections::HashMap;

use serde::Deserialize;

use super::de::null_as_default;
use super::response::{Entity, Intent, Sentiment};

/// A bot action attached to a conversation turn.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Action {
    pub slug: String,
    #[serde(default)]
    pub done: bool,
    #[serde(default)]
    pub reply: String,
}

/// One remembered slot value in the conversation memory.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct MemoryEntity {
    #[serde(default)]
    pub raw: String,
    #[serde(default)]
    pub value: String,
    #[serde(default)]
    pub confidence: f64,
}

/// Conversation memory: slot name → remembered entity. Slots the bot has
/// not filled yet arrive as `null`.
#[derive(Debug, Clone, PartialEq, Deserialize, Default)]
pub struct Memory {
    #[serde(flatten)]
    slots: HashMap<String, Option<MemoryEntity>>,
}

impl Memory {
    /// The remembered entity for `name`, if the slot is filled.
    pub fn entity(&self, name: &str) -> Option<&MemoryEntity> {
        self.slots.get(name).and_then(Option::as_ref)
    }

    /// Iterate over the filled slots.
    pub fn entities(&self) -> impl Iterator<Item = (&str, &MemoryEntity)> {
        self.slots
            .iter()
            .filter_map(|(name, slot)| slot.as_ref().map(|entity| (name.as_str(), entity)))
    }
}

/// One turn of a dialogue with the converse endpoint: the bot's replies,
/// the matched action, and the running conversation state.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Conversation {
    pub source: String,
    pub uuid: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub replies: Vec<String>,
    #[serde(default)]
    pub action: Option<Action>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub next_actions: Vec<Action>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub memory: Memory,
    #[serde(default, deserialize_with = "null_as_default")]
    pub entities: HashMap<String, Vec<Entity>>,
    pub intents: Vec<Intent>,
    pub conversation_token: String,
    pub sentiment: Sentiment,
    pub language: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub processing_language: String,
    pub version: String,
    pub timestamp: String,
    pub status: u16,
}

#[derive(Deserialize)]
struct Envelope {
    results: Conversation,
}

impl Conversation {
    /// Decode a raw converse payload.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let envelope: Envelope = serde_json::from_str(json)?;
        Ok(envelope.results)
    }

    /// The first reply, if the bot produced any.
    pub fn reply(&self) -> Option<&str> {
        self.replies.first().map(String::as_str)
    }

    /// All replies concatenated in order.
    pub fn joined_replies(&self) -> String {
        self.replies.concat()
    }

    /// The next expected action, if any.
    pub fn next_action(&self) -> Option<&Action> {
        self.next_actions.first()
    }

    pub fn is_positive(&self) -> bool {
        self.sentiment == Sentiment::Positive
    }

    pub fn is_very_positive(&self) -> bool {
        self.sentiment == Sentiment::VeryPositive
    }

    pub fn is_neutral(&self) -> bool {
        self.sentiment == Sentiment::Neutral
    }

    pub fn is_negative(&self) -> bool {
        self.sentiment == Sentiment::Negative
    }

    pub fn is_very_negative(&self) -> bool {
        self.sentiment == Sentiment::VeryNegative
    }
}
