//! The in-memory state of the active chat.

use career_chat_model::{Message, TurnReply, TurnRequest};
use chrono::{DateTime, Utc};

use crate::error::Error;
use crate::user::UserContext;

/// The synthetic message every session starts with.
pub const WELCOME_MESSAGE: &str = "Hello! I'm Asha, your career assistant. \
    I can help you find job openings, upcoming events and mentorship \
    programs. What would you like to explore today?";

/// The message shown in place of a reply when a turn fails.
pub const TURN_FAILED_MESSAGE: &str = "I'm sorry, I encountered an issue \
    processing your request. Please try again in a moment.";

/// Whether a turn is in flight.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Stage {
    /// No turn in flight, a new one can be submitted.
    #[default]
    Idle,
    /// One turn is in flight.
    Sending,
}

/// The active conversation between the user and the assistant.
///
/// A session only moves between two stages. Submitting a turn appends the
/// user message right away and enters [`Stage::Sending`]. Finishing the turn
/// appends exactly one assistant message (the reply, or an apology if the
/// turn failed) and goes back to [`Stage::Idle`].
///
/// The message log is append-only, and the session id is bound at most once,
/// from the first reply that carries one.
#[derive(Clone, Debug)]
pub struct Session {
    messages: Vec<Message>,
    session_id: Option<String>,
    stage: Stage,
    input: String,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    /// Creates a session seeded with the welcome message.
    pub fn new() -> Self {
        Self {
            messages: vec![Message::assistant(WELCOME_MESSAGE, Utc::now())],
            session_id: None,
            stage: Stage::Idle,
            input: String::new(),
        }
    }

    /// Returns the messages, oldest first.
    #[inline]
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// Returns the backend-assigned session id, once bound.
    #[inline]
    pub fn session_id(&self) -> Option<&str> {
        self.session_id.as_deref()
    }

    /// Returns the current stage.
    #[inline]
    pub fn stage(&self) -> Stage {
        self.stage
    }

    /// Returns the pending input buffer.
    #[inline]
    pub fn input(&self) -> &str {
        &self.input
    }

    /// Replaces the pending input buffer.
    #[inline]
    pub fn set_input<S: Into<String>>(&mut self, input: S) {
        self.input = input.into();
    }

    /// Submits the pending input buffer, see [`Session::begin_turn`].
    pub fn submit_input(
        &mut self,
        user: &UserContext,
    ) -> Result<TurnRequest, Error> {
        let input = self.input.clone();
        self.begin_turn(user, &input)
    }

    /// Starts a turn with the given text.
    ///
    /// On success, the user message is appended, the input buffer is
    /// cleared, and the returned request must be sent to the backend. Its
    /// outcome must be passed to [`Session::finish_turn`].
    ///
    /// The turn is rejected without touching the session when a turn is
    /// already in flight, when the text is blank, or when nobody is signed
    /// in.
    pub fn begin_turn(
        &mut self,
        user: &UserContext,
        text: &str,
    ) -> Result<TurnRequest, Error> {
        if self.stage == Stage::Sending {
            return Err(Error::validation_rejected()
                .with_reason("a turn is already in flight"));
        }
        let query = text.trim();
        if query.is_empty() {
            return Err(
                Error::validation_rejected().with_reason("the query is empty")
            );
        }
        let Some(user_id) = user.user_id() else {
            return Err(
                Error::validation_rejected().with_reason("no user is signed in")
            );
        };

        let timestamp = self.next_timestamp();
        self.messages.push(Message::user(query, timestamp));
        self.input.clear();
        self.stage = Stage::Sending;

        Ok(TurnRequest {
            user_id: user_id.to_owned(),
            query: query.to_owned(),
            session_id: self.session_id.clone(),
        })
    }

    /// Finishes the turn in flight and returns the appended assistant
    /// message.
    ///
    /// Returns `None` and changes nothing if no turn is in flight.
    pub fn finish_turn(
        &mut self,
        outcome: Result<TurnReply, Error>,
    ) -> Option<&Message> {
        if self.stage != Stage::Sending {
            warn!("no turn in flight, dropping the outcome: {outcome:?}");
            return None;
        }

        let timestamp = self.next_timestamp();
        let msg = match outcome {
            Ok(reply) => {
                self.bind_session_id(reply.new_conversation_id);
                Message::assistant(reply.reply_text, timestamp)
                    .with_details(reply.details)
            }
            Err(err) => {
                warn!("turn failed: {err}");
                Message::assistant(TURN_FAILED_MESSAGE, timestamp)
            }
        };
        self.messages.push(msg);
        self.stage = Stage::Idle;
        self.messages.last()
    }

    fn bind_session_id(&mut self, id: Option<String>) {
        let Some(id) = id else {
            return;
        };
        match &self.session_id {
            None => {
                debug!("bound session id: {id}");
                self.session_id = Some(id);
            }
            Some(bound) if *bound != id => {
                debug!("ignoring session id {id}, already bound to {bound}");
            }
            Some(_) => {}
        }
    }

    /// Returns the current time, but never earlier than the last message,
    /// so that insertion order stays chronological.
    fn next_timestamp(&self) -> DateTime<Utc> {
        let now = Utc::now();
        match self.messages.last() {
            Some(last) if last.timestamp > now => last.timestamp,
            _ => now,
        }
    }
}
