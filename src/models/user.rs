//! User model.
//!
//! A user exists only as part of an account: it is created with the account
//! and has no lifecycle of its own.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::services::error::LedgerError;

/// local part, `@`, a domain with at least one dot, no whitespace anywhere
static EMAIL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("email pattern is a valid regex")
});

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, sqlx::Type,
)]
#[serde(transparent)]
#[sqlx(transparent)]
pub struct UserId(pub Uuid);

impl UserId {
    pub fn new_v4() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// The user owning an account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: UserId,

    /// Display name
    pub username: String,

    /// Contact email, syntactically valid but not unique
    pub email: String,
}

/// A user that has not been persisted yet.
///
/// Only obtainable through [`NewUser::new`], so anything the store receives
/// has already been validated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    username: String,
    email: String,
}

impl NewUser {
    /// Validate and build a new user.
    ///
    /// # Errors
    ///
    /// - `InvalidArgument` if the email is malformed
    /// - `InvalidArgument` if the username is blank
    pub fn new(email: &str, username: &str) -> Result<Self, LedgerError> {
        let email = email.trim();
        if !EMAIL_PATTERN.is_match(email) {
            return Err(LedgerError::InvalidArgument(format!(
                "Invalid email address: {email}"
            )));
        }

        let username = username.trim();
        if username.is_empty() {
            return Err(LedgerError::InvalidArgument(
                "Username must not be empty".to_string(),
            ));
        }

        Ok(Self {
            username: username.to_string(),
            email: email.to_string(),
        })
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn email(&self) -> &str {
        &self.email
    }
}

/// User part of an account response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub user_id: UserId,
    pub username: String,
    pub email: String,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            user_id: user.id,
            username: user.username,
            email: user.email,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("test@mail.com")]
    #[case("first.last+tag@sub.example.org")]
    #[case("  padded@mail.com  ")]
    fn accepts_well_formed_emails(#[case] email: &str) {
        let user = NewUser::new(email, "testUser").unwrap();
        assert_eq!(user.email(), email.trim());
    }

    #[rstest]
    #[case("")]
    #[case("plainaddress")]
    #[case("missing-domain@")]
    #[case("@missing-local.com")]
    #[case("no-dot@localhost")]
    #[case("two@@mail.com")]
    #[case("with space@mail.com")]
    fn rejects_malformed_emails(#[case] email: &str) {
        let err = NewUser::new(email, "testUser").unwrap_err();
        assert!(matches!(err, LedgerError::InvalidArgument(_)));
    }

    #[rstest]
    #[case("")]
    #[case("   ")]
    fn rejects_blank_usernames(#[case] username: &str) {
        let err = NewUser::new("test@mail.com", username).unwrap_err();
        assert!(matches!(err, LedgerError::InvalidArgument(msg) if msg.contains("Username")));
    }
}
