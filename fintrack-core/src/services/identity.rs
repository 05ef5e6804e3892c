//! Identity resolver - maps a validated token subject to a persisted user

use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::domain::result::{Error, Result};
use crate::domain::User;
use crate::ports::Repository;

use super::TokenService;

pub struct IdentityResolver {
    repository: Arc<dyn Repository>,
    tokens: Arc<TokenService>,
}

impl IdentityResolver {
    pub fn new(repository: Arc<dyn Repository>, tokens: Arc<TokenService>) -> Self {
        Self { repository, tokens }
    }

    /// Load the user named by a token subject
    ///
    /// A subject with no matching user is reported exactly like a bad token.
    pub async fn resolve(&self, username: &str) -> Result<User> {
        self.repository
            .get_user_by_username(username)
            .await?
            .ok_or(Error::Unauthorized)
    }

    /// Validate a bearer token and resolve its user
    pub async fn authenticate(&self, token: &str) -> Result<User> {
        let subject = self.tokens.validate(token)?;
        self.resolve(&subject).await
    }

    /// Same as [`authenticate`](Self::authenticate) with an explicit clock
    pub async fn authenticate_at(&self, token: &str, now: DateTime<Utc>) -> Result<User> {
        let subject = self.tokens.validate_at(token, now)?;
        self.resolve(&subject).await
    }
}
