//! High-level builder wiring storage, validation limits and services

use anyhow::{Context, Result};

use crate::dispatch::{ServiceConfig, Services, ValidationLimits};
use crate::persist::{Backend, PersistClientBuilder};

/// Builds a ready-to-use [`Services`] bundle
///
/// # Example
///
/// ```rust,no_run
/// use dwitter::prelude::*;
///
/// # #[tokio::main]
/// # async fn main() -> Result<()> {
/// let services = DwitterBuilder::new()
///     .post_max_length(280)
///     .admin("root", "change-me-please")
///     .build()
///     .await?;
/// # Ok(())
/// # }
/// ```
pub struct DwitterBuilder {
    backend: Backend,
    mongodb_uri: Option<String>,
    database: String,
    limits: ValidationLimits,
    default_page_size: usize,
    max_page_size: usize,
    admin: Option<(String, String)>,
}

impl Default for DwitterBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl DwitterBuilder {
    /// In-memory storage and default limits
    pub fn new() -> Self {
        let service = ServiceConfig::default();
        Self {
            backend: Backend::Memory,
            mongodb_uri: None,
            database: "dwitter".to_string(),
            limits: service.limits,
            default_page_size: service.default_page_size,
            max_page_size: service.max_page_size,
            admin: None,
        }
    }

    /// Store data in MongoDB (requires the `mongodb` feature)
    pub fn mongodb(mut self, uri: impl Into<String>, database: impl Into<String>) -> Self {
        self.backend = Backend::Mongodb;
        self.mongodb_uri = Some(uri.into());
        self.database = database.into();
        self
    }

    pub fn password_min_length(mut self, length: usize) -> Self {
        self.limits = self.limits.with_password_min_length(length);
        self
    }

    pub fn post_max_length(mut self, length: usize) -> Self {
        self.limits = self.limits.with_post_max_length(length);
        self
    }

    pub fn page_sizes(mut self, default_page_size: usize, max_page_size: usize) -> Self {
        self.default_page_size = default_page_size;
        self.max_page_size = max_page_size;
        self
    }

    /// Bootstrap administrator created (or promoted) during `build`
    pub fn admin(mut self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.admin = Some((username.into(), password.into()));
        self
    }

    pub async fn build(self) -> Result<Services> {
        let mut persist = PersistClientBuilder::new()
            .backend(self.backend)
            .database(&self.database);
        if let Some(uri) = &self.mongodb_uri {
            persist = persist.mongodb_uri(uri);
        }
        let store = persist
            .build()
            .await
            .context("Failed to initialize storage")?;

        let config = ServiceConfig::new()
            .with_limits(self.limits)
            .with_page_sizes(self.default_page_size, self.max_page_size);
        let services = Services::new(store, config);

        if let Some((username, password)) = &self.admin {
            services
                .accounts()
                .ensure_admin(username, password)
                .await
                .context("Failed to create admin account")?;
            tracing::info!(username = %username, "Admin account ready");
        }

        Ok(services)
    }
}
