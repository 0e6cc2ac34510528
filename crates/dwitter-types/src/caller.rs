use serde::{Deserialize, Serialize};

use crate::post::PostId;

/// Identity of whoever issued the current request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Caller {
    Anonymous,
    Authenticated { username: String, is_admin: bool },
}

impl Caller {
    pub fn user(username: impl Into<String>) -> Self {
        Self::Authenticated {
            username: username.into(),
            is_admin: false,
        }
    }

    pub fn admin(username: impl Into<String>) -> Self {
        Self::Authenticated {
            username: username.into(),
            is_admin: true,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(self, Caller::Authenticated { .. })
    }

    pub fn is_admin(&self) -> bool {
        matches!(self, Caller::Authenticated { is_admin: true, .. })
    }

    pub fn username(&self) -> Option<&str> {
        match self {
            Caller::Anonymous => None,
            Caller::Authenticated { username, .. } => Some(username),
        }
    }

    /// True when the caller is the account named `username`
    pub fn is(&self, username: &str) -> bool {
        self.username() == Some(username)
    }
}

/// Resource a request acts on, with the identity that owns it
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    None,
    Account(String),
    Post { id: PostId, owner: String },
}

impl Target {
    /// Owning account. An account owns itself.
    pub fn owner(&self) -> Option<&str> {
        match self {
            Target::None => None,
            Target::Account(username) => Some(username),
            Target::Post { owner, .. } => Some(owner),
        }
    }
}
