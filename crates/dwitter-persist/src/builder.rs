use serde::Deserialize;
use std::sync::Arc;

use crate::dbs::memory::MemoryPersistenceClient;
use crate::error::{PersistError, Result};
use crate::trait_client::PersistenceClient;

/// Storage backend selection
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    #[default]
    Memory,
    Mongodb,
}

pub struct PersistClientBuilder {
    backend: Backend,
    mongodb_uri: Option<String>,
    database: Option<String>,
}

impl PersistClientBuilder {
    pub fn new() -> Self {
        Self {
            backend: Backend::Memory,
            mongodb_uri: None,
            database: None,
        }
    }

    pub fn backend(mut self, backend: Backend) -> Self {
        self.backend = backend;
        self
    }

    pub fn mongodb_uri(mut self, uri: impl Into<String>) -> Self {
        self.mongodb_uri = Some(uri.into());
        self
    }

    pub fn database(mut self, db: impl Into<String>) -> Self {
        self.database = Some(db.into());
        self
    }

    pub async fn build(self) -> Result<Arc<dyn PersistenceClient>> {
        match self.backend {
            Backend::Memory => Ok(Arc::new(MemoryPersistenceClient::new())),
            Backend::Mongodb => self.build_mongodb().await,
        }
    }

    #[cfg(feature = "mongodb")]
    async fn build_mongodb(self) -> Result<Arc<dyn PersistenceClient>> {
        let mongodb_uri = self
            .mongodb_uri
            .filter(|uri| !uri.is_empty())
            .ok_or_else(|| PersistError::Internal("mongodb_uri is required".to_string()))?;
        let database = self
            .database
            .ok_or_else(|| PersistError::Internal("database is required".to_string()))?;

        let client = crate::dbs::mongo::MongoPersistenceClient::connect(&mongodb_uri, &database).await?;
        Ok(Arc::new(client))
    }

    #[cfg(not(feature = "mongodb"))]
    async fn build_mongodb(self) -> Result<Arc<dyn PersistenceClient>> {
        Err(PersistError::Internal(
            "mongodb backend requested but the `mongodb` feature is not enabled".to_string(),
        ))
    }
}

impl Default for PersistClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}
