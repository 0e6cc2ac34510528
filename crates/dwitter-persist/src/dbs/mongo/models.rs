use bson::serde_helpers::chrono_datetime_as_bson_datetime;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use dwitter_types::{Account, Post, Session, SessionToken};

use crate::error::PersistError;

/// MongoDB-specific Account model (username as `_id`)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MongoAccount {
    #[serde(rename = "_id")]
    pub username: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub password_hash: String,
    pub is_admin: bool,
    pub is_active: bool,
    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub date_joined: DateTime<Utc>,
}

/// MongoDB-specific Post model (UUIDs stored as strings)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MongoPost {
    #[serde(rename = "_id")]
    pub id: String,
    pub owner: String,
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reply_to: Option<String>,
    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
}

/// MongoDB-specific Session model (one document per account)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MongoSession {
    #[serde(rename = "_id")]
    pub username: String,
    pub token: String,
    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
}

// Conversions between database-agnostic and MongoDB-specific models

impl From<Account> for MongoAccount {
    fn from(account: Account) -> Self {
        Self {
            username: account.username,
            first_name: account.first_name,
            last_name: account.last_name,
            email: account.email,
            password_hash: account.password_hash,
            is_admin: account.is_admin,
            is_active: account.is_active,
            date_joined: account.date_joined,
        }
    }
}

impl From<MongoAccount> for Account {
    fn from(account: MongoAccount) -> Self {
        Self {
            username: account.username,
            first_name: account.first_name,
            last_name: account.last_name,
            email: account.email,
            password_hash: account.password_hash,
            is_admin: account.is_admin,
            is_active: account.is_active,
            date_joined: account.date_joined,
        }
    }
}

impl From<Post> for MongoPost {
    fn from(post: Post) -> Self {
        Self {
            id: post.id.to_string(),
            owner: post.owner,
            text: post.text,
            reply_to: post.reply_to.map(|id| id.to_string()),
            created_at: post.created_at,
        }
    }
}

impl TryFrom<MongoPost> for Post {
    type Error = PersistError;

    fn try_from(post: MongoPost) -> Result<Self, Self::Error> {
        let id = parse_post_id(&post.id)?;
        let reply_to = post.reply_to.as_deref().map(parse_post_id).transpose()?;
        Ok(Self {
            id,
            owner: post.owner,
            text: post.text,
            reply_to,
            created_at: post.created_at,
        })
    }
}

fn parse_post_id(raw: &str) -> Result<Uuid, PersistError> {
    Uuid::parse_str(raw).map_err(|e| PersistError::Internal(format!("Corrupt post id {}: {}", raw, e)))
}

impl From<Session> for MongoSession {
    fn from(session: Session) -> Self {
        Self {
            username: session.username,
            token: session.token.into_inner(),
            created_at: session.created_at,
        }
    }
}

impl From<MongoSession> for Session {
    fn from(session: MongoSession) -> Self {
        Self {
            token: SessionToken::new(session.token),
            username: session.username,
            created_at: session.created_at,
        }
    }
}
