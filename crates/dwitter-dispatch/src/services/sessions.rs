use rand::RngCore;
use serde_json::Value;
use std::sync::Arc;

use dwitter_persist::PersistenceClient;
use dwitter_types::{Action, Caller, Resource, Session, SessionToken, Target};

use crate::dispatcher::ActionDispatcher;
use crate::error::{DispatchError, Result};
use crate::hasher::PasswordHasher;
use crate::services::blocking;

/// Random bytes per token; hex encoding doubles the length
const TOKEN_BYTES: usize = 20;

#[derive(Clone)]
pub struct SessionService {
    store: Arc<dyn PersistenceClient>,
    dispatcher: Arc<ActionDispatcher>,
    hasher: Arc<dyn PasswordHasher>,
}

impl SessionService {
    pub(crate) fn new(
        store: Arc<dyn PersistenceClient>,
        dispatcher: Arc<ActionDispatcher>,
        hasher: Arc<dyn PasswordHasher>,
    ) -> Self {
        Self {
            store,
            dispatcher,
            hasher,
        }
    }

    /// Check credentials and issue a fresh token, replacing any active one
    pub async fn authenticate(&self, caller: &Caller, payload: &Value) -> Result<Session> {
        let credentials = self
            .dispatcher
            .dispatch(Resource::Account, Action::Authenticate, caller, &Target::None, payload)?
            .into_credentials()?;

        let Some(account) = self.store.get_account(&credentials.username).await? else {
            tracing::warn!(username = %credentials.username, "Login for unknown account");
            return Err(DispatchError::InvalidCredentials);
        };

        let hasher = Arc::clone(&self.hasher);
        let password = credentials.password;
        let password_hash = account.password_hash.clone();
        let matches = blocking(move || hasher.verify(&password, &password_hash)).await?;

        if !matches || !account.is_active {
            tracing::warn!(
                username = %account.username,
                active = account.is_active,
                "Login rejected"
            );
            return Err(DispatchError::InvalidCredentials);
        }

        let session = Session::new(generate_token(), account.username.clone());
        if self.store.issue_session(session.clone()).await?.is_some() {
            tracing::debug!(username = %account.username, "Previous session replaced");
        }

        tracing::info!(username = %account.username, "Logged in");
        Ok(session)
    }

    /// Revoke the caller's active token
    pub async fn deauthenticate(&self, caller: &Caller) -> Result<()> {
        self.dispatcher
            .check(Resource::Account, Action::Deauthenticate, caller, &Target::None)?;

        let username = caller.username().ok_or(DispatchError::Forbidden)?;
        match self.store.revoke_session(username).await? {
            Some(_) => {
                tracing::info!(username, "Logged out");
                Ok(())
            }
            None => Err(DispatchError::NoActiveSession),
        }
    }

    /// Identity behind a token presented by a client
    pub async fn resolve(&self, token: &str) -> Result<Caller> {
        let Some(session) = self.store.find_session(token).await? else {
            return Err(DispatchError::InvalidCredentials);
        };

        match self.store.get_account(&session.username).await? {
            Some(account) if account.is_active => Ok(Caller::Authenticated {
                username: account.username,
                is_admin: account.is_admin,
            }),
            _ => {
                tracing::warn!(username = %session.username, "Token for missing or inactive account");
                Err(DispatchError::InvalidCredentials)
            }
        }
    }
}

fn generate_token() -> SessionToken {
    let mut bytes = [0u8; TOKEN_BYTES];
    rand::thread_rng().fill_bytes(&mut bytes);
    SessionToken::new(hex::encode(bytes))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_is_forty_hex_chars() {
        let token = generate_token();
        assert_eq!(token.as_str().len(), 40);
        assert!(token.as_str().chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_tokens_are_unique() {
        assert_ne!(generate_token(), generate_token());
    }
}
