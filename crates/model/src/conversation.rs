use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::message::Message;

/// Metadata of a past conversation. It carries no messages.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ConversationSummary {
    /// Identifier of the conversation.
    pub id: String,
    /// Human-readable summary.
    pub summary: String,
    /// Time of the last activity.
    #[serde(with = "crate::timestamp")]
    pub timestamp: DateTime<Utc>,
    /// The intent tag assigned by the backend, e.g. `DYNAMIC-MENTORSHIP`.
    #[serde(default)]
    pub intent: String,
}

/// The full message log of a past conversation, for read-only display.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ConversationTranscript {
    /// Identifier of the conversation.
    pub id: String,
    /// Messages in chronological order.
    pub messages: Vec<Message>,
    /// Human-readable summary.
    #[serde(default)]
    pub summary: String,
    /// The intent tag assigned by the backend.
    #[serde(default)]
    pub intent: String,
}
