pub mod account;
pub mod action;
pub mod caller;
pub mod post;
pub mod session;

pub use account::Account;
pub use action::{Action, ParseActionError, Resource};
pub use caller::{Caller, Target};
pub use post::{Post, PostId, PostThread};
pub use session::{Session, SessionToken};
