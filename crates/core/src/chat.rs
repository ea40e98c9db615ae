mod builder;
mod state;
#[cfg(test)]
mod tests;

use career_chat_model::Message;
use tokio::sync::oneshot;

use crate::error::Error;
use crate::event_loop::Handle;
use crate::session::Stage;
pub use builder::ChatSessionBuilder;
use state::{ChatState, Submit, TakeSnapshot};

/// A point-in-time copy of the chat session.
#[derive(Clone, Debug, PartialEq)]
pub struct SessionSnapshot {
    /// The messages, oldest first.
    pub messages: Vec<Message>,
    /// The backend-assigned session id, once bound.
    pub session_id: Option<String>,
    /// Whether a turn is in flight.
    pub stage: Stage,
}

/// The chat session of a dashboard view.
///
/// The session state is owned by a background task, and every submission
/// and every reply is applied there in arrival order, so submissions made
/// while a turn is in flight are rejected instead of racing with it. The
/// backend call itself runs in a separate task, which keeps the session
/// responsive (snapshots can be taken while a turn is in flight).
///
/// Dropping every clone of the session discards it. A reply that arrives
/// afterwards is dropped as well.
#[derive(Clone)]
pub struct ChatSession {
    handle: Handle<ChatState>,
}

impl ChatSession {
    /// Submits a chat turn.
    ///
    /// Resolves as soon as the turn has been accepted and the user message
    /// has been appended, without waiting for the reply. Use
    /// [`ChatSessionBuilder::on_idle`] to learn when the reply arrives.
    ///
    /// Returns a `ValidationRejected` error if the text is blank, if no user
    /// is signed in, or if a turn is already in flight.
    pub async fn submit<S: Into<String>>(&self, text: S) -> Result<(), Error> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.handle
            .send(Submit {
                text: text.into(),
                reply_tx,
            })
            .map_err(|_| closed())?;
        reply_rx.await.map_err(|_| closed())?
    }

    /// Takes a snapshot of the session.
    pub async fn snapshot(&self) -> Result<SessionSnapshot, Error> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.handle
            .send(TakeSnapshot(reply_tx))
            .map_err(|_| closed())?;
        reply_rx.await.map_err(|_| closed())
    }

    fn spawn_from_builder(builder: ChatSessionBuilder) -> Self {
        let ChatSessionBuilder {
            client,
            user,
            on_message,
            on_idle,
        } = builder;

        let state = ChatState {
            session: Default::default(),
            client,
            user,
            on_message,
            on_idle,
        };
        Self {
            handle: Handle::spawn(state, "chat session"),
        }
    }
}

#[inline]
fn closed() -> Error {
    Error::validation_rejected().with_reason("the chat session has been closed")
}
