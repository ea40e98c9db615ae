//! Engagement metrics of the signed-in user.

use career_chat_model::PerformanceMetrics;

use crate::backend_client::BackendClient;
use crate::error::Error;
use crate::user::UserContext;

/// State of a [`PerformanceView`].
#[derive(Clone, Debug, PartialEq)]
pub enum PerformanceState {
    /// The fetch is in flight.
    Loading,
    /// The metrics have been fetched.
    Loaded(PerformanceMetrics),
    /// The fetch failed.
    Failed(String),
}

/// The metrics page.
#[derive(Clone, Debug)]
pub struct PerformanceView {
    state: PerformanceState,
}

impl PerformanceView {
    /// Fetches the metrics of the signed-in user.
    ///
    /// Only a signed-out context is returned as an error.
    pub async fn open(
        client: &BackendClient,
        user: &UserContext,
    ) -> Result<Self, Error> {
        let Some(user_id) = user.user_id() else {
            return Err(
                Error::validation_rejected().with_reason("no user is signed in")
            );
        };

        let mut view = Self {
            state: PerformanceState::Loading,
        };
        view.state = match client.fetch_performance(user_id).await {
            Ok(metrics) => PerformanceState::Loaded(metrics),
            Err(err) => {
                warn!("failed to fetch metrics: {err}");
                PerformanceState::Failed(err.reason().into_owned())
            }
        };
        Ok(view)
    }

    /// Returns the state of the view.
    #[inline]
    pub fn state(&self) -> &PerformanceState {
        &self.state
    }

    /// Returns the metrics, once loaded.
    #[inline]
    pub fn metrics(&self) -> Option<&PerformanceMetrics> {
        match &self.state {
            PerformanceState::Loaded(metrics) => Some(metrics),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use career_chat_model::User;
    use career_chat_test_backend::{FakeBackend, PresetReply};

    use super::*;
    use crate::{ErrorKind, Session};

    #[tokio::test]
    async fn test_open() {
        let backend = FakeBackend::default();
        backend.add_reply(
            PresetReply::with_text("Here are some jobs.")
                .with_intent("DYNAMIC-JOB_LISTINGS", "Job search: tech"),
        );
        let client = BackendClient::new(backend.clone());
        let user = UserContext::signed_in(User {
            id: "u-1".to_owned(),
            email: "priya@example.com".to_owned(),
            name: None,
        });

        let mut session = Session::new();
        let req = session.begin_turn(&user, "jobs").unwrap();
        session.finish_turn(client.submit_turn(&req).await);

        let view = PerformanceView::open(&client, &user).await.unwrap();
        let metrics = view.metrics().unwrap();
        assert_eq!(metrics.conversation_count, 1);
        assert_eq!(metrics.intent_distribution["DYNAMIC-JOB_LISTINGS"], 1);
    }

    #[tokio::test]
    async fn test_signed_out() {
        let backend = FakeBackend::default();
        let client = BackendClient::new(backend.clone());
        let err = PerformanceView::open(&client, &UserContext::signed_out())
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ValidationRejected);
        assert_eq!(backend.calls().fetch_performance, 0);
    }
}
