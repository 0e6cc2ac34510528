use serde_json::{json, Value};
use std::sync::Arc;

use dwitter_persist::{PersistError, PersistenceClient};
use dwitter_types::{Account, Action, Caller, Resource, Target};

use crate::dispatcher::ActionDispatcher;
use crate::error::{DispatchError, FieldErrors, Result};
use crate::hasher::PasswordHasher;
use crate::representation::AccountView;
use crate::services::blocking;
use crate::validators::{read_only_error, AccountChanges};

const USERNAME_TAKEN: &str = "A user with that username already exists.";

#[derive(Clone)]
pub struct AccountService {
    store: Arc<dyn PersistenceClient>,
    dispatcher: Arc<ActionDispatcher>,
    hasher: Arc<dyn PasswordHasher>,
}

impl AccountService {
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

    /// Register a new account
    pub async fn signup(&self, caller: &Caller, payload: &Value) -> Result<Account> {
        let data = self
            .dispatcher
            .dispatch(Resource::Account, Action::Create, caller, &Target::None, payload)?
            .into_signup()?;

        if self.store.get_account(&data.username).await?.is_some() {
            return Err(FieldErrors::single("username", USERNAME_TAKEN).into());
        }

        let password_hash = self.hash_password(data.password).await?;
        let account = Account::new(data.username, password_hash)
            .with_names(data.first_name, data.last_name)
            .with_email(data.email);

        match self.store.insert_account(account.clone()).await {
            Ok(()) => {
                tracing::info!(username = %account.username, "Account created");
                Ok(account)
            }
            Err(PersistError::Duplicate(_)) => {
                Err(FieldErrors::single("username", USERNAME_TAKEN).into())
            }
            Err(e) => Err(e.into()),
        }
    }

    pub async fn retrieve(&self, caller: &Caller, username: &str) -> Result<AccountView> {
        self.dispatcher.check(
            Resource::Account,
            Action::Retrieve,
            caller,
            &Target::Account(username.to_string()),
        )?;

        let account = self
            .store
            .get_account(username)
            .await?
            .ok_or(DispatchError::NotFound)?;

        Ok(AccountView::select(caller, &account))
    }

    /// Apply a partial profile update. The username itself cannot change.
    pub async fn update(&self, caller: &Caller, username: &str, payload: &Value) -> Result<Account> {
        let mut account = self
            .store
            .get_account(username)
            .await?
            .ok_or(DispatchError::NotFound)?;

        let changes = self
            .dispatcher
            .dispatch(
                Resource::Account,
                Action::Update,
                caller,
                &Target::Account(account.username.clone()),
                payload,
            )?
            .into_account_changes()?;

        apply_changes(&mut account, changes)?;
        self.store.save_account(account.clone()).await?;

        tracing::info!(
            username = %account.username,
            by = caller.username().unwrap_or("<anonymous>"),
            "Account updated"
        );
        Ok(account)
    }

    /// Create the administrator account if it does not exist yet, or grant
    /// admin rights to an existing account with that name.
    pub async fn ensure_admin(&self, username: &str, password: &str) -> Result<Account> {
        if let Some(mut account) = self.store.get_account(username).await? {
            if !account.is_admin {
                account.is_admin = true;
                self.store.save_account(account.clone()).await?;
                tracing::info!(username, "Existing account promoted to admin");
            } else {
                tracing::debug!(username, "Admin account already present");
            }
            return Ok(account);
        }

        let payload = json!({
            "username": username,
            "password": password,
            "password2": password,
        });
        let data = self
            .dispatcher
            .clean(Resource::Account, Action::Create, &payload)?
            .into_signup()?;

        let password_hash = self.hash_password(data.password).await?;
        let account = Account::new(data.username, password_hash).with_admin(true);

        match self.store.insert_account(account.clone()).await {
            Ok(()) => {
                tracing::info!(username = %account.username, "Admin account created");
                Ok(account)
            }
            // Created concurrently by another instance
            Err(PersistError::Duplicate(_)) => self
                .store
                .get_account(username)
                .await?
                .ok_or(DispatchError::NotFound),
            Err(e) => Err(e.into()),
        }
    }

    async fn hash_password(&self, password: String) -> Result<String> {
        let hasher = Arc::clone(&self.hasher);
        blocking(move || hasher.hash(&password)).await
    }
}

fn apply_changes(account: &mut Account, changes: AccountChanges) -> Result<()> {
    if let Some(username) = changes.username {
        if username != account.username {
            return Err(read_only_error("username").into());
        }
    }
    if let Some(first_name) = changes.first_name {
        account.first_name = first_name;
    }
    if let Some(last_name) = changes.last_name {
        account.last_name = last_name;
    }
    if let Some(email) = changes.email {
        account.email = email;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_apply_changes_keeps_absent_fields() {
        let mut account = Account::new("alice", "hash")
            .with_names(Some("Alice".to_string()), Some("Smith".to_string()))
            .with_email(Some("a@example.com".to_string()));

        let changes = AccountChanges {
            last_name: Some(None),
            email: Some(Some("alice@example.com".to_string())),
            ..AccountChanges::default()
        };
        apply_changes(&mut account, changes).unwrap();

        assert_eq!(account.first_name.as_deref(), Some("Alice"));
        assert_eq!(account.last_name, None);
        assert_eq!(account.email.as_deref(), Some("alice@example.com"));
    }

    #[test]
    fn test_apply_changes_rejects_rename() {
        let mut account = Account::new("alice", "hash");
        let same = AccountChanges {
            username: Some("alice".to_string()),
            ..AccountChanges::default()
        };
        assert!(apply_changes(&mut account, same).is_ok());

        let rename = AccountChanges {
            username: Some("mallory".to_string()),
            ..AccountChanges::default()
        };
        let err = apply_changes(&mut account, rename).unwrap_err();
        assert!(matches!(err, DispatchError::ValidationFailed(ref f) if f.contains("username")));
        assert_eq!(account.username, "alice");
    }
}
