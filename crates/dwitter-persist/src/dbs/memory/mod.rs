use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;

use dwitter_types::{Account, Post, PostId, Session, SessionToken};

use crate::error::{PersistError, Result};
use crate::trait_client::{AccountStore, PersistenceClient, PostStore, SessionStore};

/// Process-local backend
///
/// Each table sits behind its own lock, so every trait method is atomic with
/// respect to concurrent callers. Data is lost when the process exits.
#[derive(Default)]
pub struct MemoryPersistenceClient {
    accounts: RwLock<HashMap<String, Account>>,
    posts: RwLock<PostTable>,
    sessions: RwLock<SessionTable>,
}

/// Posts in insertion order, which is also creation order
#[derive(Default)]
struct PostTable {
    rows: Vec<Post>,
    index: HashMap<PostId, usize>,
}

impl PostTable {
    fn get(&self, id: &PostId) -> Option<&Post> {
        self.index.get(id).map(|&i| &self.rows[i])
    }
}

#[derive(Default)]
struct SessionTable {
    by_token: HashMap<String, Session>,
    by_account: HashMap<String, SessionToken>,
}

impl MemoryPersistenceClient {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AccountStore for MemoryPersistenceClient {
    async fn insert_account(&self, account: Account) -> Result<()> {
        let mut accounts = self.accounts.write().await;
        if accounts.contains_key(&account.username) {
            return Err(PersistError::Duplicate(account.username));
        }
        accounts.insert(account.username.clone(), account);
        Ok(())
    }

    async fn get_account(&self, username: &str) -> Result<Option<Account>> {
        Ok(self.accounts.read().await.get(username).cloned())
    }

    async fn save_account(&self, account: Account) -> Result<()> {
        let mut accounts = self.accounts.write().await;
        match accounts.get_mut(&account.username) {
            Some(existing) => {
                *existing = account;
                Ok(())
            }
            None => Err(PersistError::NotFound(account.username)),
        }
    }

    async fn count_accounts(&self) -> Result<u64> {
        Ok(self.accounts.read().await.len() as u64)
    }
}

#[async_trait]
impl PostStore for MemoryPersistenceClient {
    async fn insert_post(&self, post: Post) -> Result<()> {
        let mut posts = self.posts.write().await;
        if let Some(parent) = post.reply_to {
            if !posts.index.contains_key(&parent) {
                return Err(PersistError::NotFound(parent.to_string()));
            }
        }
        if posts.index.contains_key(&post.id) {
            return Err(PersistError::Duplicate(post.id.to_string()));
        }
        let position = posts.rows.len();
        posts.index.insert(post.id, position);
        posts.rows.push(post);
        Ok(())
    }

    async fn get_post(&self, id: PostId) -> Result<Option<Post>> {
        Ok(self.posts.read().await.get(&id).cloned())
    }

    async fn update_post_text(&self, id: PostId, text: String) -> Result<Post> {
        let mut posts = self.posts.write().await;
        let position = *posts
            .index
            .get(&id)
            .ok_or_else(|| PersistError::NotFound(id.to_string()))?;
        let post = &mut posts.rows[position];
        post.text = text;
        Ok(post.clone())
    }

    async fn list_posts(&self, limit: usize, skip: usize) -> Result<Vec<Post>> {
        let posts = self.posts.read().await;
        Ok(posts.rows.iter().rev().skip(skip).take(limit).cloned().collect())
    }

    async fn list_replies(&self, parent: PostId) -> Result<Vec<Post>> {
        let posts = self.posts.read().await;
        Ok(posts
            .rows
            .iter()
            .filter(|post| post.reply_to == Some(parent))
            .cloned()
            .collect())
    }
}

#[async_trait]
impl SessionStore for MemoryPersistenceClient {
    async fn issue_session(&self, session: Session) -> Result<Option<SessionToken>> {
        let mut sessions = self.sessions.write().await;
        let replaced = sessions
            .by_account
            .insert(session.username.clone(), session.token.clone());
        if let Some(old) = &replaced {
            sessions.by_token.remove(old.as_str());
        }
        sessions
            .by_token
            .insert(session.token.as_str().to_string(), session);
        Ok(replaced)
    }

    async fn find_session(&self, token: &str) -> Result<Option<Session>> {
        Ok(self.sessions.read().await.by_token.get(token).cloned())
    }

    async fn revoke_session(&self, username: &str) -> Result<Option<Session>> {
        let mut sessions = self.sessions.write().await;
        let Some(token) = sessions.by_account.remove(username) else {
            return Ok(None);
        };
        Ok(sessions.by_token.remove(token.as_str()))
    }
}

#[async_trait]
impl PersistenceClient for MemoryPersistenceClient {
    fn backend_name(&self) -> &'static str {
        "memory"
    }

    async fn ping(&self) -> Result<()> {
        Ok(())
    }
}
