use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A chat turn to be sent to the backend.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize)]
pub struct TurnRequest {
    /// The user on whose behalf the turn is sent.
    pub user_id: String,
    /// The user's query.
    pub query: String,
    /// The backend-assigned session identifier, absent on the first turn.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
}

/// The assistant's answer to a chat turn.
#[derive(Clone, Debug, PartialEq)]
pub struct TurnReply {
    /// The reply text to show to the user.
    pub reply_text: String,
    /// The identifier of a newly created conversation, only present when
    /// the turn started one.
    pub new_conversation_id: Option<String>,
    /// Structured metadata about the reply.
    pub details: ReplyDetails,
}

/// Structured metadata that the backend attaches to each reply.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ReplyDetails {
    /// A short summary of the query, e.g. `Job search: tech`.
    #[serde(default)]
    pub query_summary: String,
    /// The classified intent, e.g. `DYNAMIC-JOB_LISTINGS`.
    #[serde(default)]
    pub intent: String,
    /// The detected sentiment of the query.
    #[serde(default)]
    pub sentiment: String,
    /// When the backend produced the reply.
    #[serde(rename = "time", with = "crate::timestamp")]
    pub replied_at: DateTime<Utc>,
    /// Raw job listings backing the reply, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub job_data: Option<Value>,
    /// Raw events backing the reply, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event_data: Option<Value>,
    /// Raw mentorship programs backing the reply, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mentorship_data: Option<Value>,
}
