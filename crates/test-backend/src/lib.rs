//! A local fake backend for testing purpose.

mod preset;

use std::collections::{BTreeMap, HashMap, VecDeque};
use std::error::Error as StdError;
use std::fmt::{self, Display, Formatter};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use career_chat_model::{
    Backend, BackendError, ConversationSummary, ConversationTranscript,
    Credentials, ErrorKind, Message, PerformanceMetrics, Registration,
    ReplyDetails, TurnReply, TurnRequest, User,
};
use chrono::Utc;
use tokio::sync::watch;
use tokio::time::sleep;

pub use preset::*;

#[derive(Debug)]
pub struct Error {
    message: String,
    kind: ErrorKind,
}

impl Error {
    fn new(message: impl Into<String>, kind: ErrorKind) -> Self {
        Self {
            message: message.into(),
            kind,
        }
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl StdError for Error {}

impl BackendError for Error {
    #[inline]
    fn kind(&self) -> ErrorKind {
        self.kind
    }
}

/// Number of calls received, per operation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct CallCounts {
    pub login: usize,
    pub register: usize,
    pub submit_turn: usize,
    pub list_conversations: usize,
    pub fetch_transcript: usize,
    pub fetch_performance: usize,
}

/// Holds turn replies back until released, see [`FakeBackend::hold_turns`].
///
/// Dropping the gate releases the turns as well.
pub struct TurnGate {
    tx: watch::Sender<bool>,
}

impl TurnGate {
    /// Lets every held turn, and every turn after it, complete.
    #[inline]
    pub fn release(self) {
        self.tx.send(true).ok();
    }
}

#[derive(Default)]
struct State {
    script: VecDeque<ScriptedTurn>,
    users: Vec<(User, String)>,
    conversations: Vec<(String, ConversationSummary)>,
    transcripts: HashMap<String, ConversationTranscript>,
    listing_failure: Option<String>,
    transcript_failure: Option<String>,
    turn_requests: Vec<TurnRequest>,
    calls: CallCounts,
    delay: Option<Duration>,
    gate: Option<watch::Receiver<bool>>,
}

/// A local fake backend for testing purpose.
///
/// Turn replies follow a script: every submitted turn consumes the next
/// [`ScriptedTurn`], and once the script runs out, the backend answers with
/// a canned reply that echoes the query. Successful turns are recorded as
/// conversations, just like the real backend does, so they show up in the
/// listing and can be reopened as transcripts.
///
/// Clones share the same state, so a test can keep a clone around to
/// inspect what the code under test has sent.
///
/// # Note
///
/// This type is not optimized for production use. You should only use it
/// for testing and demos.
#[derive(Clone, Default)]
pub struct FakeBackend {
    state: Arc<Mutex<State>>,
}

impl FakeBackend {
    #[inline]
    fn state(&self) -> MutexGuard<'_, State> {
        // A panicking test thread must not take the other tests down.
        self.state.lock().unwrap_or_else(|err| err.into_inner())
    }

    /// Appends a successful reply to the turn script.
    #[inline]
    pub fn add_reply(&self, reply: PresetReply) {
        self.state().script.push_back(ScriptedTurn::Reply(reply));
    }

    /// Appends a failed turn to the turn script.
    #[inline]
    pub fn add_failure(&self, reason: impl Into<String>) {
        self.state()
            .script
            .push_back(ScriptedTurn::Failure(reason.into()));
    }

    /// Appends an arbitrary step to the turn script.
    #[inline]
    pub fn add_scripted_turn(&self, turn: ScriptedTurn) {
        self.state().script.push_back(turn);
    }

    /// Registers an account that can sign in.
    #[inline]
    pub fn add_user(&self, user: User, password: impl Into<String>) {
        self.state().users.push((user, password.into()));
    }

    /// Adds a past conversation of a user. Conversations are listed in the
    /// order they are added.
    pub fn add_conversation(
        &self,
        user_id: impl Into<String>,
        summary: ConversationSummary,
    ) {
        self.state().conversations.push((user_id.into(), summary));
    }

    /// Adds a transcript that can be fetched by its id.
    #[inline]
    pub fn add_transcript(&self, transcript: ConversationTranscript) {
        self.state()
            .transcripts
            .insert(transcript.id.clone(), transcript);
    }

    /// Makes every listing request fail with the reason, or succeed again
    /// with `None`.
    #[inline]
    pub fn set_listing_failure(&self, reason: Option<&str>) {
        self.state().listing_failure = reason.map(ToOwned::to_owned);
    }

    /// Makes every transcript request fail with the reason, or succeed
    /// again with `None`. Unknown ids still fail with `NotFound` otherwise.
    #[inline]
    pub fn set_transcript_failure(&self, reason: Option<&str>) {
        self.state().transcript_failure = reason.map(ToOwned::to_owned);
    }

    /// Delays every response, emulating network latency.
    #[inline]
    pub fn set_delay(&self, duration: Duration) {
        self.state().delay = Some(duration);
    }

    /// Holds every turn reply back until the returned gate is released.
    pub fn hold_turns(&self) -> TurnGate {
        let (tx, rx) = watch::channel(false);
        self.state().gate = Some(rx);
        TurnGate { tx }
    }

    /// Returns the number of calls received so far.
    #[inline]
    pub fn calls(&self) -> CallCounts {
        self.state().calls
    }

    /// Returns every turn request received so far.
    #[inline]
    pub fn turn_requests(&self) -> Vec<TurnRequest> {
        self.state().turn_requests.clone()
    }

    fn respond<T: Send + 'static>(
        &self,
        result: Result<T, Error>,
        gate: Option<watch::Receiver<bool>>,
    ) -> impl Future<Output = Result<T, Error>> + Send + 'static {
        let delay = self.state().delay;
        async move {
            if let Some(delay) = delay {
                sleep(delay).await;
            }
            if let Some(mut gate) = gate {
                // A dropped gate counts as released.
                gate.wait_for(|open| *open).await.ok();
            }
            result
        }
    }
}

impl State {
    fn run_turn(&mut self, req: &TurnRequest) -> Result<TurnReply, Error> {
        let step = self.script.pop_front().unwrap_or_else(|| {
            ScriptedTurn::Reply(PresetReply::with_text(format!(
                "You asked: {}",
                req.query
            )))
        });
        let preset = match step {
            ScriptedTurn::Reply(preset) => preset,
            ScriptedTurn::Failure(reason) => {
                return Err(Error::new(reason, ErrorKind::TransportFailure));
            }
            ScriptedTurn::NotFound => {
                return Err(Error::new(
                    "Conversation not found",
                    ErrorKind::NotFound,
                ));
            }
        };

        let now = Utc::now();
        let details = ReplyDetails {
            query_summary: preset.query_summary.clone(),
            intent: preset.intent.clone(),
            sentiment: preset.sentiment.clone(),
            replied_at: now,
            job_data: None,
            event_data: None,
            mentorship_data: None,
        };

        let new_conversation_id = match (&preset.conversation_id, &req.session_id)
        {
            (Some(id), _) => Some(id.clone()),
            (None, None) => Some(uuid::Uuid::new_v4().to_string()),
            (None, Some(_)) => None,
        };

        // Record the turn the way the real backend stores conversations.
        let stored_id = req
            .session_id
            .clone()
            .or_else(|| new_conversation_id.clone());
        if let Some(id) = stored_id {
            let transcript =
                self.transcripts.entry(id.clone()).or_insert_with(|| {
                    ConversationTranscript {
                        id: id.clone(),
                        messages: vec![],
                        summary: preset.query_summary.clone(),
                        intent: preset.intent.clone(),
                    }
                });
            transcript.messages.push(Message::user(&req.query, now));
            transcript.messages.push(
                Message::assistant(&preset.text, now).with_details(details.clone()),
            );

            self.conversations.retain(|(_, summary)| summary.id != id);
            self.conversations.insert(
                0,
                (
                    req.user_id.clone(),
                    ConversationSummary {
                        id,
                        summary: preset.query_summary.clone(),
                        timestamp: now,
                        intent: preset.intent.clone(),
                    },
                ),
            );
        }

        Ok(TurnReply {
            reply_text: preset.text,
            new_conversation_id,
            details,
        })
    }

    fn performance(&self, user_id: &str) -> PerformanceMetrics {
        let mut intent_distribution = BTreeMap::new();
        let mut conversation_count = 0;
        for (owner, summary) in &self.conversations {
            if owner == user_id {
                conversation_count += 1;
                *intent_distribution.entry(summary.intent.clone()).or_insert(0) +=
                    1;
            }
        }

        let queries: Vec<_> = self
            .turn_requests
            .iter()
            .filter(|req| req.user_id == user_id)
            .map(|req| req.query.chars().count())
            .collect();
        let average_query_length =
            queries.iter().sum::<usize>() as f64 / queries.len().max(1) as f64;

        PerformanceMetrics {
            conversation_count,
            intent_distribution,
            average_query_length,
            sentiment_distribution: BTreeMap::from([
                ("negative".to_owned(), 0.1),
                ("neutral".to_owned(), 0.5),
                ("positive".to_owned(), 0.4),
            ]),
            analysis: "User engagement is steady with a focus on job-related \
                       queries."
                .to_owned(),
        }
    }
}

impl Backend for FakeBackend {
    type Error = crate::Error;

    fn login(
        &self,
        credentials: &Credentials,
    ) -> impl Future<Output = Result<User, Self::Error>> + Send + 'static {
        let result = {
            let mut state = self.state();
            state.calls.login += 1;
            state
                .users
                .iter()
                .find(|(user, password)| {
                    user.email.eq_ignore_ascii_case(&credentials.email)
                        && *password == credentials.password
                })
                .map(|(user, _)| user.clone())
                .ok_or_else(|| {
                    Error::new(
                        "Invalid email or password",
                        ErrorKind::TransportFailure,
                    )
                })
        };
        self.respond(result, None)
    }

    fn register(
        &self,
        registration: &Registration,
    ) -> impl Future<Output = Result<User, Self::Error>> + Send + 'static {
        let result = {
            let mut state = self.state();
            state.calls.register += 1;
            let taken = state.users.iter().any(|(user, _)| {
                user.email.eq_ignore_ascii_case(&registration.email)
            });
            if taken {
                Err(Error::new(
                    "Email already registered",
                    ErrorKind::TransportFailure,
                ))
            } else {
                let user = User {
                    id: uuid::Uuid::new_v4().to_string(),
                    email: registration.email.clone(),
                    name: Some(registration.name.clone()),
                };
                state
                    .users
                    .push((user.clone(), registration.password.clone()));
                Ok(user)
            }
        };
        self.respond(result, None)
    }

    fn submit_turn(
        &self,
        req: &TurnRequest,
    ) -> impl Future<Output = Result<TurnReply, Self::Error>> + Send + 'static
    {
        let (result, gate) = {
            let mut state = self.state();
            state.calls.submit_turn += 1;
            state.turn_requests.push(req.clone());
            (state.run_turn(req), state.gate.clone())
        };
        self.respond(result, gate)
    }

    fn list_conversations(
        &self,
        user_id: &str,
    ) -> impl Future<Output = Result<Vec<ConversationSummary>, Self::Error>>
    + Send
    + 'static {
        let result = {
            let mut state = self.state();
            state.calls.list_conversations += 1;
            match &state.listing_failure {
                Some(reason) => {
                    Err(Error::new(reason.clone(), ErrorKind::TransportFailure))
                }
                None => Ok(state
                    .conversations
                    .iter()
                    .filter(|(owner, _)| owner == user_id)
                    .map(|(_, summary)| summary.clone())
                    .collect()),
            }
        };
        self.respond(result, None)
    }

    fn fetch_transcript(
        &self,
        conversation_id: &str,
    ) -> impl Future<Output = Result<ConversationTranscript, Self::Error>>
    + Send
    + 'static {
        let result = {
            let mut state = self.state();
            state.calls.fetch_transcript += 1;
            match &state.transcript_failure {
                Some(reason) => {
                    Err(Error::new(reason.clone(), ErrorKind::TransportFailure))
                }
                None => state
                    .transcripts
                    .get(conversation_id)
                    .cloned()
                    .ok_or_else(|| {
                        Error::new("Conversation not found", ErrorKind::NotFound)
                    }),
            }
        };
        self.respond(result, None)
    }

    fn fetch_performance(
        &self,
        user_id: &str,
    ) -> impl Future<Output = Result<PerformanceMetrics, Self::Error>>
    + Send
    + 'static {
        let result = {
            let mut state = self.state();
            state.calls.fetch_performance += 1;
            Ok(state.performance(user_id))
        };
        self.respond(result, None)
    }
}
