pub mod builder;
pub mod dbs;
pub mod error;
pub mod trait_client;

pub use builder::{Backend, PersistClientBuilder};
pub use dbs::memory::MemoryPersistenceClient;
pub use error::{PersistError, Result};
pub use trait_client::{AccountStore, PersistenceClient, PostStore, SessionStore};

#[cfg(feature = "mongodb")]
pub use dbs::mongo::MongoPersistenceClient;
