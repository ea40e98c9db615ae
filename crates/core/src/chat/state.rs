use std::fmt::{self, Debug};

use career_chat_model::{Message, TurnReply};
use tokio::sync::oneshot;

use super::SessionSnapshot;
use crate::backend_client::BackendClient;
use crate::error::Error;
use crate::event_loop::{Event, Handle};
use crate::session::Session;
use crate::user::UserContext;

pub struct ChatState {
    pub session: Session,
    pub client: BackendClient,
    pub user: UserContext,
    pub on_message: Option<Box<dyn Fn(&Message) + Send + Sync>>,
    pub on_idle: Option<Box<dyn Fn() + Send + Sync>>,
}

impl ChatState {
    fn submit(
        &mut self,
        text: String,
        handle: &Handle<Self>,
    ) -> Result<(), Error> {
        let req = self.session.begin_turn(&self.user, &text)?;
        self.notify_last_message();

        let resp_fut = self.client.submit_turn(&req);
        let handle = handle.clone();
        tokio::spawn(async move {
            let outcome = resp_fut.await;
            // The session may have been discarded in the meantime.
            handle.send(TurnFinished(outcome)).ok();
        });
        Ok(())
    }

    fn finish(&mut self, outcome: Result<TurnReply, Error>) {
        if self.session.finish_turn(outcome).is_none() {
            return;
        }
        self.notify_last_message();
        if let Some(on_idle) = &self.on_idle {
            on_idle();
        }
    }

    fn notify_last_message(&self) {
        if let (Some(on_message), Some(msg)) =
            (&self.on_message, self.session.messages().last())
        {
            on_message(msg);
        }
    }

    fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            messages: self.session.messages().to_vec(),
            session_id: self.session.session_id().map(ToOwned::to_owned),
            stage: self.session.stage(),
        }
    }
}

#[derive(Debug)]
pub struct Submit {
    pub text: String,
    pub reply_tx: oneshot::Sender<Result<(), Error>>,
}

impl Event<ChatState> for Submit {
    fn apply(self: Box<Self>, state: &mut ChatState, handle: &Handle<ChatState>) {
        let result = state.submit(self.text, handle);
        if let Err(err) = &result {
            debug!("rejected a submission: {err}");
        }
        self.reply_tx.send(result).ok();
    }
}

#[derive(Debug)]
pub struct TakeSnapshot(pub oneshot::Sender<SessionSnapshot>);

impl Event<ChatState> for TakeSnapshot {
    #[inline]
    fn apply(self: Box<Self>, state: &mut ChatState, _handle: &Handle<ChatState>) {
        self.0.send(state.snapshot()).ok();
    }
}

struct TurnFinished(Result<TurnReply, Error>);

impl Debug for TurnFinished {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("TurnFinished")
            .field(&self.0.as_ref().map(|reply| &reply.new_conversation_id))
            .finish()
    }
}

impl Event<ChatState> for TurnFinished {
    #[inline]
    fn apply(self: Box<Self>, state: &mut ChatState, _handle: &Handle<ChatState>) {
        state.finish(self.0);
    }
}
