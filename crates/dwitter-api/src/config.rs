use config::{Config as ConfigLoader, ConfigError, Environment, File};
use serde::Deserialize;

use dwitter_dispatch::{ServiceConfig, ValidationLimits};
use dwitter_persist::Backend;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub cors: CorsConfig,
    pub storage: StorageConfig,
    pub accounts: AccountsConfig,
    pub posts: PostsConfig,
    pub logging: LoggingConfig,

    // Secrets (from ENV only)
    #[serde(skip)]
    pub mongodb_uri: String,
    #[serde(skip)]
    pub admin: Option<AdminCredentials>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub request_timeout_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8000,
            request_timeout_secs: 30,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CorsConfig {
    pub enabled: bool,
    pub origins: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub backend: Backend,
    pub database: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: Backend::Memory,
            database: "dwitter".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AccountsConfig {
    pub password_min_length: usize,
}

impl Default for AccountsConfig {
    fn default() -> Self {
        Self {
            password_min_length: ValidationLimits::DEFAULT.password_min_length,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PostsConfig {
    pub max_length: usize,
    pub default_page_size: usize,
    pub max_page_size: usize,
}

impl Default for PostsConfig {
    fn default() -> Self {
        let service = ServiceConfig::default();
        Self {
            max_length: service.limits.post_max_length,
            default_page_size: service.default_page_size,
            max_page_size: service.max_page_size,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}

/// Bootstrap administrator, created at startup if missing
#[derive(Clone)]
pub struct AdminCredentials {
    pub username: String,
    pub password: String,
}

impl std::fmt::Debug for AdminCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdminCredentials")
            .field("username", &self.username)
            .finish_non_exhaustive()
    }
}

impl Config {
    /// Load configuration from TOML files and environment variables
    ///
    /// Hierarchy (weakest to strongest):
    /// 1. config/default.toml
    /// 2. config/{ENV}.toml (if ENV is set)
    /// 3. Environment variables prefixed `DWITTER_`, sections split by `__`
    ///    (e.g. `DWITTER_SERVER__PORT=9000`)
    pub fn load() -> Result<Self, ConfigError> {
        let env = std::env::var("ENV").unwrap_or_else(|_| "dev".to_string());

        let builder = ConfigLoader::builder()
            // 1. Load default config
            .add_source(File::with_name("config/default").required(false))
            // 2. Load environment-specific config
            .add_source(File::with_name(&format!("config/{}", env)).required(false))
            // 3. Environment variables override everything
            .add_source(
                Environment::with_prefix("DWITTER")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true)
                    .list_separator(",")
                    .with_list_parse_key("cors.origins"),
            );

        let mut cfg: Config = builder.build()?.try_deserialize()?;
        cfg.load_secrets()?;
        cfg.validate()?;

        Ok(cfg)
    }

    // Secrets never come from TOML
    fn load_secrets(&mut self) -> Result<(), ConfigError> {
        self.mongodb_uri = std::env::var("MONGODB_URI").unwrap_or_default();
        if self.storage.backend == Backend::Mongodb && self.mongodb_uri.is_empty() {
            return Err(ConfigError::Message(
                "MONGODB_URI environment variable is required for the mongodb backend".to_string(),
            ));
        }

        let username = std::env::var("ADMIN_USERNAME").ok().filter(|v| !v.is_empty());
        let password = std::env::var("ADMIN_PASSWORD").ok().filter(|v| !v.is_empty());
        self.admin = match (username, password) {
            (Some(username), Some(password)) => Some(AdminCredentials { username, password }),
            (None, None) => None,
            _ => {
                return Err(ConfigError::Message(
                    "ADMIN_USERNAME and ADMIN_PASSWORD must be set together".to_string(),
                ))
            }
        };

        Ok(())
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.posts.max_length == 0 {
            return Err(ConfigError::Message("posts.max_length must be positive".to_string()));
        }
        if self.posts.default_page_size == 0 || self.posts.max_page_size == 0 {
            return Err(ConfigError::Message("page sizes must be positive".to_string()));
        }
        match self.logging.format.as_str() {
            "json" | "pretty" => Ok(()),
            other => Err(ConfigError::Message(format!(
                "logging.format must be \"json\" or \"pretty\", got \"{}\"",
                other
            ))),
        }
    }

    pub fn service_config(&self) -> ServiceConfig {
        let limits = ValidationLimits::DEFAULT
            .with_password_min_length(self.accounts.password_min_length)
            .with_post_max_length(self.posts.max_length);

        ServiceConfig::new()
            .with_limits(limits)
            .with_page_sizes(self.posts.default_page_size, self.posts.max_page_size)
    }
}
