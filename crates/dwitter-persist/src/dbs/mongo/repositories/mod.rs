pub mod account;
pub mod post;
pub mod session;

pub use account::MongoAccountRepository;
pub use post::MongoPostRepository;
pub use session::MongoSessionRepository;

use mongodb::error::{Error, ErrorKind, WriteFailure};

const DUPLICATE_KEY: i32 = 11000;

pub(crate) fn is_duplicate_key(err: &Error) -> bool {
    match err.kind.as_ref() {
        ErrorKind::Write(WriteFailure::WriteError(write_error)) => write_error.code == DUPLICATE_KEY,
        _ => false,
    }
}
