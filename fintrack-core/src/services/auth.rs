//! Auth service - registration, login and current-user lookup

use std::sync::Arc;

use chrono::Local;

use crate::domain::result::{Error, Result};
use crate::domain::{AccessToken, NewUser, User, UserView};
use crate::ports::Repository;

use super::{CredentialStore, IdentityResolver, TokenService};

pub struct AuthService {
    repository: Arc<dyn Repository>,
    credentials: Arc<CredentialStore>,
    tokens: Arc<TokenService>,
    identity: Arc<IdentityResolver>,
}

impl AuthService {
    pub fn new(
        repository: Arc<dyn Repository>,
        credentials: Arc<CredentialStore>,
        tokens: Arc<TokenService>,
        identity: Arc<IdentityResolver>,
    ) -> Self {
        Self {
            repository,
            credentials,
            tokens,
            identity,
        }
    }

    /// Register a new user and return its public view
    pub async fn register(&self, new_user: &NewUser) -> Result<UserView> {
        new_user.validate()?;

        let username = new_user.username.trim();
        if self.repository.get_user_by_username(username).await?.is_some() {
            return Err(Error::validation(format!("username '{}' is already taken", username)));
        }

        let password_hash = self.credentials.hash(&new_user.password)?;
        let user = self
            .repository
            .create_user(
                username,
                new_user.email.trim(),
                &password_hash,
                Local::now().date_naive(),
            )
            .await?;

        Ok(user.view())
    }

    /// Check a username/password pair
    ///
    /// Returns `None` for an unknown user and for a wrong password alike.
    /// The username is trimmed the same way registration trims it.
    pub async fn authenticate(&self, username: &str, password: &str) -> Result<Option<User>> {
        let Some(user) = self.repository.get_user_by_username(username.trim()).await? else {
            return Ok(None);
        };

        if self.credentials.verify(password, &user.password_hash) {
            Ok(Some(user))
        } else {
            Ok(None)
        }
    }

    /// Exchange credentials for a bearer token
    pub async fn login(&self, username: &str, password: &str) -> Result<AccessToken> {
        let user = self
            .authenticate(username, password)
            .await?
            .ok_or(Error::Unauthorized)?;

        Ok(AccessToken::bearer(self.tokens.issue(&user.username)?))
    }

    /// Public view of the user a token belongs to
    pub async fn current_user(&self, token: &str) -> Result<UserView> {
        Ok(self.identity.authenticate(token).await?.view())
    }
}
