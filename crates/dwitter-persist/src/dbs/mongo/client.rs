use async_trait::async_trait;
use mongodb::{bson::doc, Client, Database};

use dwitter_types::{Account, Post, PostId, Session, SessionToken};

use crate::dbs::mongo::models::{MongoPost, MongoSession};
use crate::dbs::mongo::repositories::{
    MongoAccountRepository, MongoPostRepository, MongoSessionRepository,
};
use crate::error::{PersistError, Result};
use crate::trait_client::{AccountStore, PersistenceClient, PostStore, SessionStore};

pub struct MongoPersistenceClient {
    database: Database,
    account_repo: MongoAccountRepository,
    post_repo: MongoPostRepository,
    session_repo: MongoSessionRepository,
}

impl MongoPersistenceClient {
    /// Connect to MongoDB, create client and make sure indexes exist
    pub async fn connect(mongodb_uri: &str, database: &str) -> Result<Self> {
        let client = Client::with_uri_str(mongodb_uri)
            .await
            .map_err(|e| PersistError::Connection(e.to_string()))?;

        let persist = Self {
            database: client.database(database),
            account_repo: MongoAccountRepository::new(&client, database),
            post_repo: MongoPostRepository::new(&client, database),
            session_repo: MongoSessionRepository::new(&client, database),
        };

        persist.post_repo.ensure_indexes().await?;
        persist.session_repo.ensure_indexes().await?;
        tracing::debug!(database, "MongoDB indexes ensured");

        Ok(persist)
    }
}

#[async_trait]
impl AccountStore for MongoPersistenceClient {
    async fn insert_account(&self, account: Account) -> Result<()> {
        self.account_repo.insert_account(account.into()).await
    }

    async fn get_account(&self, username: &str) -> Result<Option<Account>> {
        let account = self.account_repo.get_account(username).await?;
        Ok(account.map(Account::from))
    }

    async fn save_account(&self, account: Account) -> Result<()> {
        self.account_repo.replace_account(account.into()).await
    }

    async fn count_accounts(&self) -> Result<u64> {
        self.account_repo.count_accounts().await
    }
}

#[async_trait]
impl PostStore for MongoPersistenceClient {
    async fn insert_post(&self, post: Post) -> Result<()> {
        self.post_repo.insert_post(MongoPost::from(post)).await
    }

    async fn get_post(&self, id: PostId) -> Result<Option<Post>> {
        self.post_repo
            .get_post(&id.to_string())
            .await?
            .map(Post::try_from)
            .transpose()
    }

    async fn update_post_text(&self, id: PostId, text: String) -> Result<Post> {
        let updated = self.post_repo.update_text(&id.to_string(), &text).await?;
        Post::try_from(updated)
    }

    async fn list_posts(&self, limit: usize, skip: usize) -> Result<Vec<Post>> {
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        let posts = self.post_repo.list_posts(limit, skip as u64).await?;
        posts.into_iter().map(Post::try_from).collect()
    }

    async fn list_replies(&self, parent: PostId) -> Result<Vec<Post>> {
        let posts = self.post_repo.list_replies(&parent.to_string()).await?;
        posts.into_iter().map(Post::try_from).collect()
    }
}

#[async_trait]
impl SessionStore for MongoPersistenceClient {
    async fn issue_session(&self, session: Session) -> Result<Option<SessionToken>> {
        let replaced = self
            .session_repo
            .replace_session(MongoSession::from(session))
            .await?;
        Ok(replaced.map(|old| SessionToken::new(old.token)))
    }

    async fn find_session(&self, token: &str) -> Result<Option<Session>> {
        let session = self.session_repo.find_by_token(token).await?;
        Ok(session.map(Session::from))
    }

    async fn revoke_session(&self, username: &str) -> Result<Option<Session>> {
        let session = self.session_repo.delete_session(username).await?;
        Ok(session.map(Session::from))
    }
}

#[async_trait]
impl PersistenceClient for MongoPersistenceClient {
    fn backend_name(&self) -> &'static str {
        "mongodb"
    }

    async fn ping(&self) -> Result<()> {
        self.database.run_command(doc! { "ping": 1 }).await?;
        Ok(())
    }
}
