use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A registered user identity.
///
/// `username` is the unique key. The password hash is write-only: it is
/// accepted on deserialization but never serialized back out.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    pub username: String,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default, skip_serializing)]
    pub password_hash: String,
    #[serde(default)]
    pub is_admin: bool,
    #[serde(default = "default_active")]
    pub is_active: bool,
    pub date_joined: DateTime<Utc>,
}

fn default_active() -> bool {
    true
}

impl Account {
    pub fn new(username: impl Into<String>, password_hash: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            first_name: None,
            last_name: None,
            email: None,
            password_hash: password_hash.into(),
            is_admin: false,
            is_active: true,
            date_joined: Utc::now(),
        }
    }

    pub fn with_names(mut self, first_name: Option<String>, last_name: Option<String>) -> Self {
        self.first_name = first_name;
        self.last_name = last_name;
        self
    }

    pub fn with_email(mut self, email: Option<String>) -> Self {
        self.email = email;
        self
    }

    pub fn with_admin(mut self, is_admin: bool) -> Self {
        self.is_admin = is_admin;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_password_hash_is_never_serialized() {
        let account = Account::new("alice", "$argon2id$v=19$secret");
        let json = serde_json::to_value(&account).unwrap();

        assert_eq!(json["username"], "alice");
        assert!(json.get("password_hash").is_none());
    }

    #[test]
    fn test_new_account_defaults() {
        let account = Account::new("bob", "hash");

        assert!(account.is_active);
        assert!(!account.is_admin);
        assert_eq!(account.email, None);
    }
}
