use std::pin::Pin;
use std::sync::Arc;

use career_chat_model::{
    Backend, BackendError, ConversationSummary, ConversationTranscript,
    Credentials, PerformanceMetrics, Registration, TurnReply, TurnRequest,
    User,
};
use tracing::Instrument;

use crate::error::Error;

type BoxedFuture<T> = Pin<Box<dyn Future<Output = Result<T, Error>> + Send>>;

/// A wrapper around a backend that provides a type-erased interface for the
/// other modules, and converts backend errors into [`Error`].
///
/// Cloning the client is cheap, all clones share the same backend.
#[derive(Clone)]
pub struct BackendClient {
    backend: Arc<dyn BackendObject>,
}

impl BackendClient {
    /// Creates a client over the given backend.
    #[inline]
    pub fn new<B: Backend + 'static>(backend: B) -> Self {
        // We have to erase the type `B`, since `BackendClient` doesn't have
        // a generic parameter and we don't want it either.
        Self {
            backend: Arc::new(AnyBackend(backend)),
        }
    }

    /// Signs in an existing user.
    #[inline]
    pub fn login(
        &self,
        credentials: &Credentials,
    ) -> impl Future<Output = Result<User, Error>> + Send + 'static {
        self.backend
            .login(credentials)
            .instrument(debug_span!("login", email = %credentials.email))
    }

    /// Creates an account and signs it in.
    #[inline]
    pub fn register(
        &self,
        registration: &Registration,
    ) -> impl Future<Output = Result<User, Error>> + Send + 'static {
        self.backend
            .register(registration)
            .instrument(debug_span!("register", email = %registration.email))
    }

    /// Sends one chat turn.
    ///
    /// # Cancel safety
    ///
    /// Dropping the future does not cancel the turn on the backend side, the
    /// reply is simply lost.
    #[inline]
    pub fn submit_turn(
        &self,
        req: &TurnRequest,
    ) -> impl Future<Output = Result<TurnReply, Error>> + Send + 'static {
        self.backend.submit_turn(req).instrument(debug_span!(
            "submit turn",
            session_id = req.session_id.as_deref().unwrap_or("<new>")
        ))
    }

    /// Lists the past conversations of a user.
    #[inline]
    pub fn list_conversations(
        &self,
        user_id: &str,
    ) -> impl Future<Output = Result<Vec<ConversationSummary>, Error>>
    + Send
    + 'static {
        self.backend
            .list_conversations(user_id)
            .instrument(debug_span!("list conversations", user_id))
    }

    /// Fetches the message log of a past conversation.
    #[inline]
    pub fn fetch_transcript(
        &self,
        conversation_id: &str,
    ) -> impl Future<Output = Result<ConversationTranscript, Error>>
    + Send
    + 'static {
        self.backend
            .fetch_transcript(conversation_id)
            .instrument(debug_span!("fetch transcript", conversation_id))
    }

    /// Fetches the engagement metrics of a user.
    #[inline]
    pub fn fetch_performance(
        &self,
        user_id: &str,
    ) -> impl Future<Output = Result<PerformanceMetrics, Error>> + Send + 'static
    {
        self.backend
            .fetch_performance(user_id)
            .instrument(debug_span!("fetch performance", user_id))
    }
}

trait BackendObject: Send + Sync + 'static {
    fn login(&self, credentials: &Credentials) -> BoxedFuture<User>;

    fn register(&self, registration: &Registration) -> BoxedFuture<User>;

    fn submit_turn(&self, req: &TurnRequest) -> BoxedFuture<TurnReply>;

    fn list_conversations(
        &self,
        user_id: &str,
    ) -> BoxedFuture<Vec<ConversationSummary>>;

    fn fetch_transcript(
        &self,
        conversation_id: &str,
    ) -> BoxedFuture<ConversationTranscript>;

    fn fetch_performance(&self, user_id: &str)
    -> BoxedFuture<PerformanceMetrics>;
}

struct AnyBackend<B: Backend>(B);

impl<B: Backend + 'static> BackendObject for AnyBackend<B> {
    #[inline]
    fn login(&self, credentials: &Credentials) -> BoxedFuture<User> {
        boxed(self.0.login(credentials))
    }

    #[inline]
    fn register(&self, registration: &Registration) -> BoxedFuture<User> {
        boxed(self.0.register(registration))
    }

    #[inline]
    fn submit_turn(&self, req: &TurnRequest) -> BoxedFuture<TurnReply> {
        trace!("got a turn request: {req:?}");
        boxed(self.0.submit_turn(req))
    }

    #[inline]
    fn list_conversations(
        &self,
        user_id: &str,
    ) -> BoxedFuture<Vec<ConversationSummary>> {
        boxed(self.0.list_conversations(user_id))
    }

    #[inline]
    fn fetch_transcript(
        &self,
        conversation_id: &str,
    ) -> BoxedFuture<ConversationTranscript> {
        boxed(self.0.fetch_transcript(conversation_id))
    }

    #[inline]
    fn fetch_performance(
        &self,
        user_id: &str,
    ) -> BoxedFuture<PerformanceMetrics> {
        boxed(self.0.fetch_performance(user_id))
    }
}

fn boxed<T, E, F>(fut: F) -> BoxedFuture<T>
where
    T: 'static,
    E: BackendError,
    F: Future<Output = Result<T, E>> + Send + 'static,
{
    Box::pin(async move {
        match fut.await {
            Ok(value) => Ok(value),
            Err(err) => {
                warn!("got an error: {err}");
                Err(Error::from_backend(&err))
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use career_chat_test_backend::FakeBackend;

    use super::*;
    use crate::ErrorKind;

    #[tokio::test]
    async fn test_submit_turn() {
        let backend = FakeBackend::default();
        let client = BackendClient::new(backend.clone());

        for query in ["Hi", "Any events?", "Thanks"] {
            let reply = client
                .submit_turn(&TurnRequest {
                    user_id: "u-1".to_owned(),
                    query: query.to_owned(),
                    session_id: None,
                })
                .await
                .unwrap();
            assert_eq!(reply.reply_text, format!("You asked: {query}"));
        }
        assert_eq!(backend.calls().submit_turn, 3);
    }

    #[tokio::test]
    async fn test_error_conversion() {
        let backend = FakeBackend::default();
        backend.add_failure("Service unavailable");
        let client = BackendClient::new(backend);

        let err = client
            .submit_turn(&TurnRequest {
                user_id: "u-1".to_owned(),
                query: "Hi".to_owned(),
                session_id: None,
            })
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::TransportFailure);
        assert_eq!(err.reason(), "Service unavailable");

        let err = client.fetch_transcript("missing").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }
}
