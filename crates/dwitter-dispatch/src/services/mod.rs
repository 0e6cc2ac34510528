mod accounts;
mod posts;
mod sessions;

pub use accounts::AccountService;
pub use posts::PostService;
pub use sessions::SessionService;

use serde::Serialize;
use std::sync::Arc;

use dwitter_persist::PersistenceClient;

use crate::config::ServiceConfig;
use crate::dispatcher::ActionDispatcher;
use crate::error::{DispatchError, Result};
use crate::hasher::{Argon2Hasher, PasswordHasher};

/// One page of a listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub offset: usize,
    pub limit: usize,
    pub has_more: bool,
}

/// Account, post and session operations sharing one store and dispatcher
#[derive(Clone)]
pub struct Services {
    accounts: AccountService,
    posts: PostService,
    sessions: SessionService,
    store: Arc<dyn PersistenceClient>,
    dispatcher: Arc<ActionDispatcher>,
}

impl Services {
    pub fn new(store: Arc<dyn PersistenceClient>, config: ServiceConfig) -> Self {
        Self::with_hasher(store, config, Arc::new(Argon2Hasher::new()))
    }

    pub fn with_hasher(
        store: Arc<dyn PersistenceClient>,
        config: ServiceConfig,
        hasher: Arc<dyn PasswordHasher>,
    ) -> Self {
        let dispatcher = Arc::new(ActionDispatcher::new(config.limits));

        Self {
            accounts: AccountService::new(
                Arc::clone(&store),
                Arc::clone(&dispatcher),
                Arc::clone(&hasher),
            ),
            posts: PostService::new(Arc::clone(&store), Arc::clone(&dispatcher), config),
            sessions: SessionService::new(Arc::clone(&store), Arc::clone(&dispatcher), hasher),
            store,
            dispatcher,
        }
    }

    pub fn accounts(&self) -> &AccountService {
        &self.accounts
    }

    pub fn posts(&self) -> &PostService {
        &self.posts
    }

    pub fn sessions(&self) -> &SessionService {
        &self.sessions
    }

    pub fn store(&self) -> &Arc<dyn PersistenceClient> {
        &self.store
    }

    pub fn dispatcher(&self) -> &ActionDispatcher {
        &self.dispatcher
    }
}

/// Run a CPU-heavy closure off the async workers
async fn blocking<T, F>(task: F) -> Result<T>
where
    F: FnOnce() -> Result<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(task)
        .await
        .map_err(|e| DispatchError::Internal(format!("blocking task failed: {}", e)))?
}
