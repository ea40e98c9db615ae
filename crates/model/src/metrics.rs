use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Engagement metrics of a user, computed by the backend over all of the
/// user's conversations.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PerformanceMetrics {
    /// Number of stored conversations.
    pub conversation_count: u64,
    /// Number of conversations per intent tag.
    #[serde(default)]
    pub intent_distribution: BTreeMap<String, u64>,
    /// Average length of the user's queries, in characters.
    #[serde(default)]
    pub average_query_length: f64,
    /// Share of conversations per sentiment, summing up to about `1.0`.
    #[serde(default)]
    pub sentiment_distribution: BTreeMap<String, f64>,
    /// A free-form analysis written by the backend.
    #[serde(default)]
    pub analysis: String,
}
