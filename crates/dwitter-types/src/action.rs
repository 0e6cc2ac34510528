use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Operation kind carried by an inbound request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    Create,
    Retrieve,
    Update,
    List,
    Authenticate,
    Deauthenticate,
}

impl Action {
    pub const ALL: [Action; 6] = [
        Action::Create,
        Action::Retrieve,
        Action::Update,
        Action::List,
        Action::Authenticate,
        Action::Deauthenticate,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Action::Create => "create",
            Action::Retrieve => "retrieve",
            Action::Update => "update",
            Action::List => "list",
            Action::Authenticate => "authenticate",
            Action::Deauthenticate => "deauthenticate",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown action: {0}")]
pub struct ParseActionError(pub String);

impl FromStr for Action {
    type Err = ParseActionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "create" => Ok(Action::Create),
            "retrieve" => Ok(Action::Retrieve),
            // PATCH shares the update rules
            "update" | "partial_update" => Ok(Action::Update),
            "list" => Ok(Action::List),
            "authenticate" | "login" => Ok(Action::Authenticate),
            "deauthenticate" | "logout" => Ok(Action::Deauthenticate),
            other => Err(ParseActionError(other.to_string())),
        }
    }
}

/// Kind of resource an action is applied to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Resource {
    Account,
    Post,
}

impl Resource {
    pub const ALL: [Resource; 2] = [Resource::Account, Resource::Post];
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Resource::Account => f.write_str("account"),
            Resource::Post => f.write_str("post"),
        }
    }
}
