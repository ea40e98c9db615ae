//! The explicit authentication context.

use career_chat_model::User;

/// The user every model operation acts on behalf of.
///
/// Models never look the current user up on their own, it is always passed
/// in, so a signed-out context can be handed to any of them.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct UserContext {
    user: Option<User>,
}

impl UserContext {
    /// Creates a context without any signed-in user.
    #[inline]
    pub fn signed_out() -> Self {
        Self { user: None }
    }

    /// Creates a context for the signed-in user.
    #[inline]
    pub fn signed_in(user: User) -> Self {
        Self { user: Some(user) }
    }

    /// Returns the signed-in user.
    #[inline]
    pub fn user(&self) -> Option<&User> {
        self.user.as_ref()
    }

    /// Returns the identifier of the signed-in user.
    #[inline]
    pub fn user_id(&self) -> Option<&str> {
        self.user.as_ref().map(|user| user.id.as_str())
    }
}
