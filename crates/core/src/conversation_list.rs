//! The past conversations of the signed-in user.

use std::collections::HashSet;

use career_chat_model::ConversationSummary;

use crate::backend_client::BackendClient;
use crate::error::Error;
use crate::user::UserContext;

/// Lifecycle of the conversation list.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum ListState {
    /// Nothing has been requested yet.
    #[default]
    Unloaded,
    /// A refresh is in flight.
    Loading,
    /// The last refresh succeeded.
    Loaded,
    /// The last refresh failed.
    Failed,
}

/// What the list shows, see [`ConversationList::display`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ListDisplay<'a> {
    /// Summaries in backend order, most recent first.
    Summaries(&'a [ConversationSummary]),
    /// There is nothing to show.
    Empty,
}

/// The conversation list model.
///
/// Every successful refresh replaces the summaries wholesale. A failed
/// refresh keeps the last-known-good summaries around, so a transient
/// listing failure never hides what has been shown before, nor turns into
/// an error banner.
#[derive(Clone, Debug, Default)]
pub struct ConversationList {
    state: ListState,
    summaries: Option<Vec<ConversationSummary>>,
    last_error: Option<Error>,
}

impl ConversationList {
    /// Creates an unloaded list.
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the lifecycle state.
    #[inline]
    pub fn state(&self) -> ListState {
        self.state
    }

    /// Returns the summaries of the last successful refresh.
    #[inline]
    pub fn summaries(&self) -> Option<&[ConversationSummary]> {
        self.summaries.as_deref()
    }

    /// Returns the error of the last refresh, if it failed.
    #[inline]
    pub fn last_error(&self) -> Option<&Error> {
        self.last_error.as_ref()
    }

    /// Returns what the list should show.
    ///
    /// This never yields an error: without any summaries to fall back on,
    /// the list is simply empty.
    pub fn display(&self) -> ListDisplay<'_> {
        match self.summaries.as_deref() {
            Some(summaries) if !summaries.is_empty() => {
                ListDisplay::Summaries(summaries)
            }
            _ => ListDisplay::Empty,
        }
    }

    /// Starts a refresh for the user and returns the id to list for.
    ///
    /// Rejected without a state change when nobody is signed in, or when a
    /// refresh is already in flight.
    pub fn begin_refresh(&mut self, user: &UserContext) -> Result<String, Error> {
        if self.state == ListState::Loading {
            return Err(Error::validation_rejected()
                .with_reason("a refresh is already in flight"));
        }
        let Some(user_id) = user.user_id() else {
            return Err(
                Error::validation_rejected().with_reason("no user is signed in")
            );
        };
        self.state = ListState::Loading;
        Ok(user_id.to_owned())
    }

    /// Finishes the refresh in flight.
    pub fn finish_refresh(
        &mut self,
        outcome: Result<Vec<ConversationSummary>, Error>,
    ) {
        if self.state != ListState::Loading {
            warn!("no refresh in flight, dropping the outcome");
            return;
        }
        match outcome {
            Ok(mut summaries) => {
                dedup_by_id(&mut summaries);
                debug!("loaded {} conversations", summaries.len());
                self.summaries = Some(summaries);
                self.last_error = None;
                self.state = ListState::Loaded;
            }
            Err(err) => {
                warn!("failed to list conversations: {err}");
                self.last_error = Some(err);
                self.state = ListState::Failed;
            }
        }
    }

    /// Refreshes the list with one listing request.
    ///
    /// Only a rejected refresh is returned as an error, a failed listing is
    /// recorded in the list itself.
    pub async fn refresh(
        &mut self,
        client: &BackendClient,
        user: &UserContext,
    ) -> Result<(), Error> {
        let user_id = self.begin_refresh(user)?;
        let outcome = client.list_conversations(&user_id).await;
        self.finish_refresh(outcome);
        Ok(())
    }
}

/// Drops every summary whose id has been seen before, keeping the order.
fn dedup_by_id(summaries: &mut Vec<ConversationSummary>) {
    let mut seen = HashSet::new();
    summaries.retain(|summary| {
        let first = seen.insert(summary.id.clone());
        if !first {
            warn!("dropping duplicate conversation {}", summary.id);
        }
        first
    });
}
