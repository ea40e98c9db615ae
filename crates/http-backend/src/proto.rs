use career_chat_model::{PerformanceMetrics, ReplyDetails, TurnReply, User};
use serde::Deserialize;
use serde_json::Value;

// ------------------------------
// Types received from the server
// ------------------------------

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct AuthResponse {
    pub user: User,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct ChatResponse {
    pub response: ReplyPayload,
    #[serde(default)]
    pub conversation_id: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct ReplyPayload {
    #[allow(dead_code)]
    #[serde(default)]
    pub user_id: String,
    #[allow(dead_code)]
    #[serde(default)]
    pub user_query: String,
    pub bot_reply: String,
    #[serde(flatten)]
    pub details: ReplyDetails,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct PerformanceResponse {
    #[allow(dead_code)]
    pub user_id: String,
    pub metrics: PerformanceMetrics,
}

/// The error body of the backend, `{"detail": ...}`.
///
/// `detail` is a plain string for application errors, and a list of
/// `{"loc": [...], "msg": "...", "type": "..."}` items for request
/// validation errors.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub detail: Value,
}

// -----------
// Conversions
// -----------

impl From<ChatResponse> for TurnReply {
    #[inline]
    fn from(resp: ChatResponse) -> Self {
        TurnReply {
            reply_text: resp.response.bot_reply,
            new_conversation_id: resp
                .conversation_id
                .filter(|id| !id.is_empty()),
            details: resp.response.details,
        }
    }
}

/// Extracts a human-readable reason from an error body, if it has one.
pub fn error_reason(body: &[u8]) -> Option<String> {
    let body = serde_json::from_slice::<ErrorBody>(body).ok()?;
    let reason = match body.detail {
        Value::String(detail) => detail,
        Value::Array(items) => items
            .iter()
            .filter_map(|item| item.get("msg").and_then(Value::as_str))
            .collect::<Vec<_>>()
            .join("; "),
        _ => return None,
    };
    let reason = reason.trim();
    if reason.is_empty() {
        None
    } else {
        Some(reason.to_owned())
    }
}
