use career_chat_model::Message;

use super::ChatSession;
use crate::backend_client::BackendClient;
use crate::user::UserContext;

/// [`ChatSession`] builder.
pub struct ChatSessionBuilder {
    pub(crate) client: BackendClient,
    pub(crate) user: UserContext,
    pub(crate) on_message: Option<Box<dyn Fn(&Message) + Send + Sync>>,
    pub(crate) on_idle: Option<Box<dyn Fn() + Send + Sync>>,
}

impl ChatSessionBuilder {
    /// Creates a new builder for a session of the given user.
    #[inline]
    pub fn new(client: BackendClient, user: UserContext) -> Self {
        Self {
            client,
            user,
            on_message: None,
            on_idle: None,
        }
    }

    /// Attaches a callback to be invoked for every appended message, the
    /// user's own messages included.
    #[inline]
    pub fn on_message(
        mut self,
        on_message: impl Fn(&Message) + Send + Sync + 'static,
    ) -> Self {
        self.on_message = Some(Box::new(on_message));
        self
    }

    /// Attaches a callback to be invoked when a turn has finished, whether
    /// it succeeded or not.
    #[inline]
    pub fn on_idle(
        mut self,
        on_idle: impl Fn() + Send + Sync + 'static,
    ) -> Self {
        self.on_idle = Some(Box::new(on_idle));
        self
    }

    /// Builds the session.
    ///
    /// This must be called within a tokio runtime.
    #[inline]
    pub fn build(self) -> ChatSession {
        ChatSession::spawn_from_builder(self)
    }
}
