//! Plain-text rendering of the dashboard models.
//!
//! Every function here is a pure function of the model it renders. Message
//! content is always kept verbatim, line breaks included, since replies
//! often carry lists that must not be reflowed.

use std::fmt::Write as _;

use career_chat_core::{
    ConversationList, ListDisplay, ListState, PerformanceState, PerformanceView,
    TranscriptState, TranscriptView,
};
use career_chat_model::{ConversationSummary, Message, Role};

/// Shown in place of the list when there is nothing to show.
pub const EMPTY_LIST_TEXT: &str =
    "No conversations yet. Start chatting to see your history here.";

/// Shown when the opened conversation does not exist.
pub const TRANSCRIPT_NOT_FOUND_TEXT: &str =
    "This conversation could not be found. It may have been removed.";

/// Shown when the opened conversation failed to load.
pub const TRANSCRIPT_FAILED_TEXT: &str =
    "Something went wrong while loading this conversation. Please try again \
     later.";

/// The way back from a transcript.
pub const BACK_TO_LIST_TEXT: &str =
    "Type /history to go back to your conversations.";

const TIME_FORMAT: &str = "%Y-%m-%d %H:%M";

/// Returns the name shown for the author of a message.
#[inline]
pub fn author(role: Role) -> &'static str {
    match role {
        Role::User => "You",
        Role::Assistant => "Asha",
    }
}

/// Returns a readable label for a backend intent tag.
///
/// Unknown tags are returned as they are.
pub fn intent_label(intent: &str) -> &str {
    match intent {
        "DYNAMIC-JOB_LISTINGS" => "Jobs",
        "DYNAMIC-EVENTS" => "Events",
        "DYNAMIC-MENTORSHIP" => "Mentorship",
        "DEFAULT-NORMAL" => "General",
        "DEFAULT-GENDER_BIASED" => "Guidance",
        "ERROR" => "Error",
        other => other,
    }
}

/// Renders a message as a header line followed by its content, verbatim.
pub fn message(msg: &Message) -> String {
    format!(
        "{} [{}]\n{}",
        author(msg.role),
        msg.timestamp.format(TIME_FORMAT),
        msg.content
    )
}

/// Renders a conversation summary as one line.
pub fn summary(summary: &ConversationSummary) -> String {
    format!(
        "{}  {}  {:<10}  {}",
        summary.id,
        summary.timestamp.format(TIME_FORMAT),
        intent_label(&summary.intent),
        summary.summary
    )
}

/// Renders the conversation list.
///
/// A failed refresh is never rendered as an error, the list falls back to
/// whatever it has shown before, or to [`EMPTY_LIST_TEXT`].
pub fn conversation_list(list: &ConversationList) -> String {
    match list.display() {
        ListDisplay::Summaries(summaries) => summaries
            .iter()
            .map(summary)
            .collect::<Vec<_>>()
            .join("\n"),
        ListDisplay::Empty if list.state() == ListState::Loading => {
            "Loading conversations...".to_owned()
        }
        ListDisplay::Empty => EMPTY_LIST_TEXT.to_owned(),
    }
}

/// Renders an opened transcript.
pub fn transcript(view: &TranscriptView) -> String {
    match view.state() {
        TranscriptState::Loading => "Loading conversation...".to_owned(),
        TranscriptState::Loaded(transcript) => {
            let mut out = String::new();
            if !transcript.summary.is_empty() {
                writeln!(
                    out,
                    "{} ({})\n",
                    transcript.summary,
                    intent_label(&transcript.intent)
                )
                .ok();
            }
            for msg in &transcript.messages {
                writeln!(out, "{}\n", message(msg)).ok();
            }
            out.push_str(BACK_TO_LIST_TEXT);
            out
        }
        TranscriptState::NotFound => {
            format!("{TRANSCRIPT_NOT_FOUND_TEXT}\n{BACK_TO_LIST_TEXT}")
        }
        TranscriptState::Failed(_) => {
            format!("{TRANSCRIPT_FAILED_TEXT}\n{BACK_TO_LIST_TEXT}")
        }
    }
}

/// Renders the metrics page.
pub fn performance(view: &PerformanceView) -> String {
    let metrics = match view.state() {
        PerformanceState::Loading => return "Loading metrics...".to_owned(),
        PerformanceState::Failed(_) => {
            return "Metrics are not available right now.".to_owned();
        }
        PerformanceState::Loaded(metrics) => metrics,
    };

    let mut out = String::new();
    writeln!(out, "Conversations: {}", metrics.conversation_count).ok();
    writeln!(
        out,
        "Average query length: {:.1} characters",
        metrics.average_query_length
    )
    .ok();
    if !metrics.intent_distribution.is_empty() {
        out.push_str("Topics:\n");
        for (intent, count) in &metrics.intent_distribution {
            writeln!(out, "  {:<10} {count}", intent_label(intent)).ok();
        }
    }
    if !metrics.sentiment_distribution.is_empty() {
        out.push_str("Sentiment:\n");
        for (sentiment, share) in &metrics.sentiment_distribution {
            writeln!(out, "  {sentiment:<10} {:.0}%", share * 100.0).ok();
        }
    }
    out.push_str(&metrics.analysis);
    out
}
