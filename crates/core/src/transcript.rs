//! Read-only replay of a past conversation.

use career_chat_model::ConversationTranscript;

use crate::backend_client::BackendClient;
use crate::error::{Error, ErrorKind};

/// Outcome of opening a transcript.
#[derive(Clone, Debug, PartialEq)]
pub enum TranscriptState {
    /// The fetch is in flight.
    Loading,
    /// The transcript has been fetched.
    Loaded(ConversationTranscript),
    /// The backend has no conversation with this id.
    NotFound,
    /// The fetch failed for another reason.
    Failed(String),
}

/// A transcript opened from the conversation list.
///
/// Both `NotFound` and `Failed` are dead ends: the only way on is back to
/// the list, which is why neither is retried.
#[derive(Clone, Debug)]
pub struct TranscriptView {
    id: String,
    state: TranscriptState,
}

impl TranscriptView {
    /// Creates a view for the conversation that is still loading.
    #[inline]
    pub fn new<S: Into<String>>(id: S) -> Self {
        Self {
            id: id.into(),
            state: TranscriptState::Loading,
        }
    }

    /// Opens the conversation with exactly one fetch.
    pub async fn open(client: &BackendClient, id: &str) -> Self {
        let mut view = Self::new(id);
        view.load(client).await;
        view
    }

    /// Returns the id of the conversation.
    #[inline]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Returns the state of the view.
    #[inline]
    pub fn state(&self) -> &TranscriptState {
        &self.state
    }

    /// Returns the transcript, once loaded.
    #[inline]
    pub fn transcript(&self) -> Option<&ConversationTranscript> {
        match &self.state {
            TranscriptState::Loaded(transcript) => Some(transcript),
            _ => None,
        }
    }

    /// Fetches the transcript, unless the view has left `Loading` already.
    pub async fn load(&mut self, client: &BackendClient) {
        if self.state != TranscriptState::Loading {
            return;
        }
        let outcome = if self.id.trim().is_empty() {
            Err(Error::not_found().with_reason("empty conversation id"))
        } else {
            client.fetch_transcript(&self.id).await
        };
        self.finish(outcome);
    }

    /// Moves the view out of `Loading` with the outcome of the fetch.
    pub fn finish(&mut self, outcome: Result<ConversationTranscript, Error>) {
        if self.state != TranscriptState::Loading {
            warn!("transcript {} is not loading, dropping the outcome", self.id);
            return;
        }
        self.state = match outcome {
            Ok(transcript) => TranscriptState::Loaded(transcript),
            Err(err) if err.kind() == ErrorKind::NotFound => {
                debug!("transcript {} not found", self.id);
                TranscriptState::NotFound
            }
            Err(err) => {
                warn!("failed to fetch transcript {}: {err}", self.id);
                TranscriptState::Failed(err.reason().into_owned())
            }
        };
    }
}
