use serde::{Deserialize, Serialize};

/// A canned assistant reply.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PresetReply {
    /// The reply text.
    pub text: String,
    /// The intent tag to report.
    pub intent: String,
    /// The query summary to report.
    pub query_summary: String,
    /// The sentiment to report.
    pub sentiment: String,
    /// If set, this id is returned as the conversation id, whether or not
    /// the turn starts a new conversation.
    #[serde(default)]
    pub conversation_id: Option<String>,
}

impl PresetReply {
    /// Creates a `PresetReply` with the specified text, classified as a
    /// normal conversation.
    #[inline]
    pub fn with_text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            intent: "DEFAULT-NORMAL".to_owned(),
            query_summary: "General conversation".to_owned(),
            sentiment: "neutral".to_owned(),
            conversation_id: None,
        }
    }

    /// Sets the intent tag and the query summary.
    #[inline]
    pub fn with_intent(
        mut self,
        intent: impl Into<String>,
        query_summary: impl Into<String>,
    ) -> Self {
        self.intent = intent.into();
        self.query_summary = query_summary.into();
        self
    }

    /// Forces the conversation id returned with this reply.
    #[inline]
    pub fn with_conversation_id(mut self, id: impl Into<String>) -> Self {
        self.conversation_id = Some(id.into());
        self
    }
}

/// One step of the turn script.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum ScriptedTurn {
    /// The turn succeeds with this reply.
    #[serde(rename = "reply")]
    Reply(PresetReply),
    /// The turn fails with this reason.
    #[serde(rename = "failure")]
    Failure(String),
    /// The backend reports that the session does not exist.
    #[serde(rename = "not_found")]
    NotFound,
}
