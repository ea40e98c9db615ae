use career_chat_core::{
    BackendClient, ChatSession, ChatSessionBuilder, ConversationList, Error,
    PerformanceView, TranscriptView, UserContext,
};
use career_chat_model::{Backend, Credentials, Message, Registration, User};

/// A dashboard builder.
///
/// See [`Dashboard`].
pub struct DashboardBuilder {
    client: BackendClient,
    on_message: Option<Box<dyn Fn(&Message) + Send + Sync>>,
    on_idle: Option<Box<dyn Fn() + Send + Sync>>,
}

impl DashboardBuilder {
    /// Creates a dashboard builder with a specified backend.
    pub fn with_backend<B: Backend + 'static>(backend: B) -> Self {
        Self {
            client: BackendClient::new(backend),
            on_message: None,
            on_idle: None,
        }
    }

    /// Attaches a callback to be invoked for every message appended to the
    /// chat.
    #[inline]
    pub fn on_message(
        mut self,
        on_message: impl Fn(&Message) + Send + Sync + 'static,
    ) -> Self {
        self.on_message = Some(Box::new(on_message));
        self
    }

    /// Attaches a callback to be invoked when a chat turn has finished.
    #[inline]
    pub fn on_idle(
        mut self,
        on_idle: impl Fn() + Send + Sync + 'static,
    ) -> Self {
        self.on_idle = Some(Box::new(on_idle));
        self
    }

    /// Signs in with the credentials and opens the dashboard.
    ///
    /// Blank fields are rejected before reaching the backend.
    pub async fn sign_in(
        self,
        credentials: &Credentials,
    ) -> Result<Dashboard, Error> {
        if credentials.email.trim().is_empty() || credentials.password.is_empty()
        {
            return Err(Error::validation_rejected()
                .with_reason("email and password are required"));
        }
        let user = self.client.login(credentials).await?;
        info!("signed in as {}", user.id);
        Ok(self.build(user))
    }

    /// Creates an account and opens the dashboard for it.
    ///
    /// Blank fields are rejected before reaching the backend.
    pub async fn register(
        self,
        registration: &Registration,
    ) -> Result<Dashboard, Error> {
        if registration.name.trim().is_empty()
            || registration.email.trim().is_empty()
            || registration.password.is_empty()
        {
            return Err(Error::validation_rejected()
                .with_reason("name, email and password are required"));
        }
        let user = self.client.register(registration).await?;
        info!("registered as {}", user.id);
        Ok(self.build(user))
    }

    /// Opens the dashboard for a user that has signed in elsewhere.
    ///
    /// This must be called within a tokio runtime.
    pub fn build(self, user: User) -> Dashboard {
        let user = UserContext::signed_in(user);

        let mut chat_builder =
            ChatSessionBuilder::new(self.client.clone(), user.clone());
        if let Some(on_message) = self.on_message {
            chat_builder = chat_builder.on_message(on_message);
        }
        if let Some(on_idle) = self.on_idle {
            chat_builder = chat_builder.on_idle(on_idle);
        }

        Dashboard {
            client: self.client,
            user,
            chat: chat_builder.build(),
            conversations: ConversationList::new(),
        }
    }
}

/// The signed-in view: one chat session next to the list of past
/// conversations.
///
/// The chat and the list are independent, a failing list never blocks the
/// chat. Transcripts and metrics are opened on demand and are owned by the
/// caller, so navigating away from them simply drops them. Dropping the
/// dashboard discards the chat session.
pub struct Dashboard {
    client: BackendClient,
    user: UserContext,
    chat: ChatSession,
    conversations: ConversationList,
}

impl Dashboard {
    /// Returns the signed-in user.
    #[inline]
    pub fn user(&self) -> &UserContext {
        &self.user
    }

    /// Returns the active chat session.
    #[inline]
    pub fn chat(&self) -> &ChatSession {
        &self.chat
    }

    /// Sends a message to the chat, see [`ChatSession::submit`].
    #[inline]
    pub async fn send_message(&self, text: &str) -> Result<(), Error> {
        self.chat.submit(text).await
    }

    /// Returns the list of past conversations.
    #[inline]
    pub fn conversations(&self) -> &ConversationList {
        &self.conversations
    }

    /// Refreshes the list of past conversations.
    #[inline]
    pub async fn refresh_conversations(&mut self) -> Result<(), Error> {
        self.conversations.refresh(&self.client, &self.user).await
    }

    /// Opens a past conversation for replay.
    #[inline]
    pub async fn open_transcript(&self, id: &str) -> TranscriptView {
        TranscriptView::open(&self.client, id).await
    }

    /// Opens the engagement metrics of the user.
    #[inline]
    pub async fn open_performance(&self) -> Result<PerformanceView, Error> {
        PerformanceView::open(&self.client, &self.user).await
    }
}
