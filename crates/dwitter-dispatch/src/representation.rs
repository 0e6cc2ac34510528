use chrono::{DateTime, Utc};
use serde::Serialize;

use dwitter_types::{Account, Caller};

/// Account as shown to a particular caller.
///
/// Admins and the account owner see everything; other callers get the
/// read-only public profile without the admin flag or join date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum AccountView {
    Full {
        username: String,
        first_name: Option<String>,
        last_name: Option<String>,
        email: Option<String>,
        is_admin: bool,
        date_joined: DateTime<Utc>,
    },
    Restricted {
        username: String,
        first_name: Option<String>,
        last_name: Option<String>,
        email: Option<String>,
    },
}

impl AccountView {
    pub fn select(caller: &Caller, account: &Account) -> Self {
        if caller.is_admin() || caller.is(&account.username) {
            Self::full(account)
        } else {
            Self::restricted(account)
        }
    }

    pub fn full(account: &Account) -> Self {
        AccountView::Full {
            username: account.username.clone(),
            first_name: account.first_name.clone(),
            last_name: account.last_name.clone(),
            email: account.email.clone(),
            is_admin: account.is_admin,
            date_joined: account.date_joined,
        }
    }

    pub fn restricted(account: &Account) -> Self {
        AccountView::Restricted {
            username: account.username.clone(),
            first_name: account.first_name.clone(),
            last_name: account.last_name.clone(),
            email: account.email.clone(),
        }
    }

    pub fn username(&self) -> &str {
        match self {
            AccountView::Full { username, .. } | AccountView::Restricted { username, .. } => {
                username
            }
        }
    }

    pub fn is_full(&self) -> bool {
        matches!(self, AccountView::Full { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn alice() -> Account {
        Account::new("alice", "hash")
            .with_email(Some("alice@example.com".to_string()))
            .with_names(Some("Alice".to_string()), None)
    }

    #[test]
    fn test_owner_and_admin_see_full_view() {
        assert!(AccountView::select(&Caller::user("alice"), &alice()).is_full());
        assert!(AccountView::select(&Caller::admin("root"), &alice()).is_full());
    }

    #[test]
    fn test_others_see_restricted_view() {
        let view = AccountView::select(&Caller::user("bob"), &alice());
        assert!(!view.is_full());
        assert_eq!(view.username(), "alice");

        let json = serde_json::to_value(&view).unwrap();
        assert_eq!(json["email"], "alice@example.com");
        assert!(json.get("is_admin").is_none());
        assert!(json.get("date_joined").is_none());
        assert_eq!(json["first_name"], "Alice");
    }

    #[test]
    fn test_full_view_never_leaks_password_hash() {
        let json = serde_json::to_value(AccountView::full(&alice())).unwrap();
        assert_eq!(json["email"], "alice@example.com");
        assert!(json.get("password_hash").is_none());
    }
}
