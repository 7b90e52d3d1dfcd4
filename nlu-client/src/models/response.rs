use std::collections::HashMap;

use serde::Deserialize;

use super::de::null_as_default;

/// Sentence-type prefixes used by the service's question taxonomy.
pub const TYPE_ABBREVIATION: &str = "abbr:";
pub const TYPE_ENTITY: &str = "enty:";
pub const TYPE_DESCRIPTION: &str = "desc:";
pub const TYPE_HUMAN: &str = "hum:";
pub const TYPE_LOCATION: &str = "loc:";
pub const TYPE_NUMBER: &str = "num:";

/// An intent matched against the input, with its confidence score.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Intent {
    pub name: String,
    pub confidence: f64,
}

/// An entity found in the input.
///
/// The service returns an open set of fields per entity kind (a datetime
/// entity carries different fields than a location), so the payload is kept
/// as a raw field map with typed accessors for the common ones.
#[derive(Debug, Clone, PartialEq, Deserialize, Default)]
pub struct Entity {
    #[serde(flatten)]
    fields: serde_json::Map<String, serde_json::Value>,
}

impl Entity {
    /// The entity's raw value, as it appeared in the input.
    pub fn raw(&self) -> Option<&str> {
        self.fields.get("raw").and_then(|v| v.as_str())
    }

    pub fn confidence(&self) -> Option<f64> {
        self.fields.get("confidence").and_then(|v| v.as_f64())
    }

    /// Any field of the entity payload, by name.
    pub fn field(&self, name: &str) -> Option<&serde_json::Value> {
        self.fields.get(name)
    }
}

/// Overall sentiment of the input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sentiment {
    Positive,
    #[serde(rename = "vpositive")]
    VeryPositive,
    Neutral,
    Negative,
    #[serde(rename = "vnegative")]
    VeryNegative,
    #[serde(other)]
    Unknown,
}

/// Dialogue act of the input sentence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DialogueAct {
    Assert,
    Command,
    #[serde(rename = "wh-query")]
    WhQuery,
    #[serde(rename = "yn-query")]
    YnQuery,
    #[serde(other)]
    Unknown,
}

/// Structured annotations for one processed input, decoded from the
/// service's `{"results": {...}}` envelope.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Response {
    /// The user input as the service received it.
    pub source: String,
    pub uuid: String,
    /// All matched intents, ordered by probability.
    pub intents: Vec<Intent>,
    /// Entities grouped by name, e.g. `"location" → [Entity, ...]`.
    #[serde(default, deserialize_with = "null_as_default")]
    pub entities: HashMap<String, Vec<Entity>>,
    pub sentiment: Sentiment,
    pub act: DialogueAct,
    /// Sentence type, e.g. `"hum:ind"`. See the `TYPE_*` prefix constants.
    #[serde(rename = "type", default, deserialize_with = "null_as_default")]
    pub sentence_type: String,
    pub language: String,
    pub version: String,
    pub timestamp: String,
    pub status: u16,
}

#[derive(Deserialize)]
struct Envelope {
    results: Response,
}

impl Response {
    /// Decode a raw service payload.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let envelope: Envelope = serde_json::from_str(json)?;
        Ok(envelope.results)
    }

    /// The best-matching intent, if any.
    pub fn intent(&self) -> Option<&Intent> {
        self.intents.first()
    }

    /// The first entity registered under `name`, if any.
    pub fn entity(&self, name: &str) -> Option<&Entity> {
        self.entities.get(name).and_then(|values| values.first())
    }

    /// All entities registered under `name`.
    pub fn entities(&self, name: &str) -> Option<&[Entity]> {
        self.entities.get(name).map(Vec::as_slice)
    }

    /// The sentence-type prefix up to and including the colon, or the whole
    /// type when it has no colon (e.g. `"hum:ind"` → `"hum:"`).
    pub fn subtype(&self) -> &str {
        match self.sentence_type.find(':') {
            Some(idx) => &self.sentence_type[..=idx],
            None => &self.sentence_type,
        }
    }

    pub fn is_assert(&self) -> bool {
        self.act == DialogueAct::Assert
    }

    pub fn is_command(&self) -> bool {
        self.act == DialogueAct::Command
    }

    pub fn is_wh_query(&self) -> bool {
        self.act == DialogueAct::WhQuery
    }

    pub fn is_yes_no_query(&self) -> bool {
        self.act == DialogueAct::YnQuery
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

    pub fn is_abbreviation(&self) -> bool {
        self.subtype() == TYPE_ABBREVIATION
    }

    pub fn is_entity(&self) -> bool {
        self.subtype() == TYPE_ENTITY
    }

    pub fn is_description(&self) -> bool {
        self.subtype() == TYPE_DESCRIPTION
    }

    pub fn is_human(&self) -> bool {
        self.subtype() == TYPE_HUMAN
    }

    pub fn is_location(&self) -> bool {
        self.subtype() == TYPE_LOCATION
    }

    pub fn is_number(&self) -> bool {
        self.subtype() == TYPE_NUMBER
    }
}
