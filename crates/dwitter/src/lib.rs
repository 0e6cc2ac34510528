//! # Dwitter
//!
//! A small microblogging core: accounts with token sessions, posts with
//! threaded replies, and one action dispatcher deciding for every
//! (resource, action) pair which payload validator runs and who may act.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use dwitter::prelude::*;
//! use serde_json::json;
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let services = DwitterBuilder::new().build().await?;
//!
//!     services
//!         .accounts()
//!         .signup(&Caller::Anonymous, &json!({
//!             "username": "alice",
//!             "password": "correct-horse",
//!             "password2": "correct-horse",
//!         }))
//!         .await?;
//!
//!     let session = services
//!         .sessions()
//!         .authenticate(&Caller::Anonymous, &json!({
//!             "username": "alice",
//!             "password": "correct-horse",
//!         }))
//!         .await?;
//!
//!     let alice = services.sessions().resolve(session.token.as_str()).await?;
//!     let post = services.posts().create(&alice, &json!({ "text": "hello" })).await?;
//!     println!("posted {}", post.id);
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! - **dwitter-types**: Account, Post, Session, Action, Resource, Caller
//! - **dwitter-persist**: storage traits with in-memory and MongoDB backends
//! - **dwitter-dispatch**: validators, authorization rules and services
//!
//! The HTTP server lives in the `dwitter-api` crate.
//!
//! ## Features
//!
//! - `mongodb`: enable the MongoDB storage backend

// Re-export all public APIs
pub use dwitter_dispatch as dispatch;
pub use dwitter_persist as persist;
pub use dwitter_types as types;

// Re-export commonly used types
pub use dwitter_dispatch::{
    authorize, select_validator, AccountView, ActionDispatcher, DispatchError, FieldErrors,
    Services,
};
pub use dwitter_persist::PersistenceClient;
pub use dwitter_types::{Account, Action, Caller, Post, PostThread, Resource, Target};

pub mod builder;

/// Convenient prelude with commonly used types
pub mod prelude {
    pub use crate::builder::DwitterBuilder;
    pub use crate::dispatch::{AccountView, DispatchError, Services};
    pub use crate::types::{Action, Caller, Resource, Target};
    pub use anyhow::Result;
}
