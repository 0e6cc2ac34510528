use async_trait::async_trait;
use dwitter_types::{Account, Post, PostId, Session, SessionToken};

use crate::error::Result;

/// Account records, keyed by username
#[async_trait]
pub trait AccountStore: Send + Sync {
    /// Insert a new account. Fails with `PersistError::Duplicate` if the
    /// username is taken; the check and the insert are atomic.
    async fn insert_account(&self, account: Account) -> Result<()>;

    /// Get an account by username
    async fn get_account(&self, username: &str) -> Result<Option<Account>>;

    /// Overwrite an existing account. Fails with `PersistError::NotFound`
    /// if no account has that username.
    async fn save_account(&self, account: Account) -> Result<()>;

    async fn count_accounts(&self) -> Result<u64>;
}

/// Post records
#[async_trait]
pub trait PostStore: Send + Sync {
    /// Insert a new post. If `reply_to` is set and does not resolve, fails
    /// with `PersistError::NotFound` and nothing is written.
    async fn insert_post(&self, post: Post) -> Result<()>;

    /// Get a post by ID
    async fn get_post(&self, id: PostId) -> Result<Option<Post>>;

    /// Replace the text of a post and return the updated record
    async fn update_post_text(&self, id: PostId, text: String) -> Result<Post>;

    /// List posts, newest first
    async fn list_posts(&self, limit: usize, skip: usize) -> Result<Vec<Post>>;

    /// Direct replies to a post, oldest first
    async fn list_replies(&self, parent: PostId) -> Result<Vec<Post>>;
}

/// Session credentials, at most one active per account
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Make `session` the account's active session. Returns the token it
    /// replaced, which no longer resolves.
    async fn issue_session(&self, session: Session) -> Result<Option<SessionToken>>;

    /// Look up the session a token belongs to
    async fn find_session(&self, token: &str) -> Result<Option<Session>>;

    /// Remove the account's active session. Returns `None` if there was none.
    async fn revoke_session(&self, username: &str) -> Result<Option<Session>>;
}

/// Everything the services need from a storage backend
///
/// Implementations provide database-specific operations behind the three
/// store traits.
#[async_trait]
pub trait PersistenceClient: AccountStore + PostStore + SessionStore {
    /// Short backend name for health reporting
    fn backend_name(&self) -> &'static str;

    /// Cheap round-trip to check the backend is reachable
    async fn ping(&self) -> Result<()>;
}
