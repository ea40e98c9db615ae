use serde::{Deserialize, Serialize};

/// A signed-in user, as returned by the authentication endpoints.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct User {
    /// Identifier used to key every request made on behalf of the user.
    pub id: String,
    /// Email address of the account.
    pub email: String,
    /// Optional display name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl User {
    /// Returns the name to greet the user with.
    #[inline]
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.email)
    }
}

/// Credentials for signing in.
#[derive(Clone, PartialEq, Eq, Serialize)]
pub struct Credentials {
    /// Email address of the account.
    pub email: String,
    /// Plain-text password, only ever sent over the wire.
    pub password: String,
}

/// Details for creating an account.
#[derive(Clone, PartialEq, Eq, Serialize)]
pub struct Registration {
    /// Display name of the new user.
    pub name: String,
    /// Email address of the account.
    pub email: String,
    /// Plain-text password, only ever sent over the wire.
    pub password: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"<deducted>")
            .finish()
    }
}

impl std::fmt::Debug for Registration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registration")
            .field("name", &self.name)
            .field("email", &self.email)
            .field("password", &"<deducted>")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_password_is_not_printed() {
        let credentials = Credentials {
            email: "priya@example.com".to_owned(),
            password: "hunter2".to_owned(),
        };
        let printed = format!("{credentials:?}");
        assert!(printed.contains("priya@example.com"));
        assert!(!printed.contains("hunter2"));
    }

    #[test]
    fn test_display_name_falls_back_to_email() {
        let mut user: User = serde_json::from_str(
            r#"{"id": "u-1", "email": "priya@example.com"}"#,
        )
        .unwrap();
        assert_eq!(user.display_name(), "priya@example.com");

        user.name = Some("Priya".to_owned());
        assert_eq!(user.display_name(), "Priya");
    }
}
