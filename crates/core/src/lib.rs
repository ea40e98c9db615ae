//! Client-side models of the career assistant: the active chat session, the
//! conversation list, transcripts and metrics.

#![deny(missing_docs)]
#![deny(clippy::missing_safety_doc)]

#[macro_use]
extern crate tracing;

mod backend_client;
mod chat;
mod conversation_list;
mod error;
mod event_loop;
mod performance;
mod session;
mod transcript;
mod user;

pub use backend_client::BackendClient;
pub use chat::{ChatSession, ChatSessionBuilder, SessionSnapshot};
pub use conversation_list::{ConversationList, ListDisplay, ListState};
pub use error::{Error, ErrorKind};
pub use performance::{PerformanceState, PerformanceView};
pub use session::{Session, Stage, TURN_FAILED_MESSAGE, WELCOME_MESSAGE};
pub use transcript::{TranscriptState, TranscriptView};
pub use user::UserContext;
