//! Request handling core for Dwitter.
//!
//! [`ActionDispatcher`] picks the payload validator for each
//! (resource, action) pair and decides whether a caller may act on a
//! target. The services in [`services`] combine it with a
//! [`PersistenceClient`](dwitter_persist::PersistenceClient) to carry out
//! account, post and session operations.

pub mod config;
pub mod dispatcher;
pub mod error;
pub mod hasher;
pub mod permissions;
pub mod representation;
pub mod services;
pub mod validators;

pub use config::{ServiceConfig, ValidationLimits};
pub use dispatcher::{authorize, select_validator, ActionDispatcher};
pub use error::{DispatchError, FieldErrors, Result};
pub use hasher::{Argon2Hasher, PasswordHasher};
pub use permissions::Permission;
pub use representation::AccountView;
pub use services::{AccountService, Page, PostService, Services, SessionService};
pub use validators::{
    AccountChanges, CleanData, Credentials, NewAccount, NewPost, PostChanges, Validator,
};
