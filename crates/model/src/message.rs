use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::turn::ReplyDetails;

/// Who wrote a message.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// The signed-in user.
    User,
    /// The career assistant.
    Assistant,
}

/// A single message in a conversation.
///
/// Messages are immutable once created. The content may contain embedded
/// newlines and is meant to be displayed preformatted.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Message {
    /// Author of the message.
    pub role: Role,
    /// Text of the message.
    pub content: String,
    /// When the message was created.
    #[serde(with = "crate::timestamp")]
    pub timestamp: DateTime<Utc>,
    /// Structured metadata of an assistant reply, if the message was built
    /// from one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<ReplyDetails>,
}

impl Message {
    /// Creates a message written by the user.
    #[inline]
    pub fn user<S: Into<String>>(content: S, timestamp: DateTime<Utc>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
            timestamp,
            details: None,
        }
    }

    /// Creates a message written by the assistant.
    #[inline]
    pub fn assistant<S: Into<String>>(
        content: S,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
            timestamp,
            details: None,
        }
    }

    /// Attaches reply metadata to the message.
    #[inline]
    pub fn with_details(mut self, details: ReplyDetails) -> Self {
        self.details = Some(details);
        self
    }
}
