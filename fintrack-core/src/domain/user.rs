//! User domain model

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::result::{Error, Result};

/// A registered user, as persisted
///
/// Identity (id, username) never changes after registration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub created_at: NaiveDate,
}

impl User {
    /// Public view of this user (no password hash)
    pub fn view(&self) -> UserView {
        UserView {
            id: self.id,
            username: self.username.clone(),
            email: self.email.clone(),
            created_at: self.created_at,
        }
    }
}

/// Public view of a user returned by registration and `whoami`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserView {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub created_at: NaiveDate,
}

/// Registration input
#[derive(Debug, Clone, Deserialize)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password: String,
}

impl NewUser {
    pub fn new(
        username: impl Into<String>,
        email: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            username: username.into(),
            email: email.into(),
            password: password.into(),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.username.trim().is_empty() {
            return Err(Error::validation("username must not be empty"));
        }
        if self.password.is_empty() {
            return Err(Error::validation("password must not be empty"));
        }
        if !self.email.contains('@') {
            return Err(Error::validation("email is not a valid address"));
        }
        Ok(())
    }
}
