use std::error::Error;

use crate::conversation::{ConversationSummary, ConversationTranscript};
use crate::error::ErrorKind;
use crate::metrics::PerformanceMetrics;
use crate::turn::{TurnReply, TurnRequest};
use crate::user::{Credentials, Registration, User};

/// The error type for a backend.
///
/// The `Display` output is the human-readable reason, and it should be
/// suitable for showing to the user as is.
pub trait BackendError: Error + Send + Sync + 'static {
    /// Returns the kind of this error.
    fn kind(&self) -> ErrorKind;
}

/// A type that represents the assistant backend.
///
/// Every operation performs at most one round trip and never retries on its
/// own, the retry policy belongs to the caller. Returned futures are fully
/// independent of `self`, so that callers may spawn them.
///
/// Once the backend is created, it should behave like a stateless object.
/// It can still have internal state (connection pools, fixtures), but callers
/// should not rely on it.
pub trait Backend: Send + Sync {
    /// The error type that may be returned by the backend.
    type Error: BackendError;

    /// Signs in an existing user.
    fn login(
        &self,
        credentials: &Credentials,
    ) -> impl Future<Output = Result<User, Self::Error>> + Send + 'static;

    /// Creates a new account and signs it in.
    fn register(
        &self,
        registration: &Registration,
    ) -> impl Future<Output = Result<User, Self::Error>> + Send + 'static;

    /// Sends one chat turn and waits for the assistant's reply.
    fn submit_turn(
        &self,
        req: &TurnRequest,
    ) -> impl Future<Output = Result<TurnReply, Self::Error>> + Send + 'static;

    /// Lists the past conversations of a user, most recent first.
    fn list_conversations(
        &self,
        user_id: &str,
    ) -> impl Future<Output = Result<Vec<ConversationSummary>, Self::Error>>
    + Send
    + 'static;

    /// Fetches the complete message log of a past conversation.
    fn fetch_transcript(
        &self,
        conversation_id: &str,
    ) -> impl Future<Output = Result<ConversationTranscript, Self::Error>>
    + Send
    + 'static;

    /// Fetches the engagement metrics of a user.
    fn fetch_performance(
        &self,
        user_id: &str,
    ) -> impl Future<Output = Result<PerformanceMetrics, Self::Error>>
    + Send
    + 'static;
}
