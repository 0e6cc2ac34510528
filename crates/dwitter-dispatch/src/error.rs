use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;

use dwitter_persist::PersistError;

/// Per-field validation messages, ordered by field name
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<String, Vec<String>>);

impl FieldErrors {
    /// Key for errors that belong to no single field
    pub const NON_FIELD: &'static str = "non_field_errors";

    pub fn new() -> Self {
        Self::default()
    }

    pub fn single(field: impl Into<String>, message: impl Into<String>) -> Self {
        let mut errors = Self::new();
        errors.add(field, message);
        errors
    }

    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.0.entry(field.into()).or_default().push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    pub fn get(&self, field: &str) -> Option<&[String]> {
        self.0.get(field).map(Vec::as_slice)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Vec<String>)> {
        self.0.iter()
    }

    /// `Ok(value)` when no errors were recorded
    pub fn into_result<T>(self, value: T) -> std::result::Result<T, FieldErrors> {
        if self.is_empty() {
            Ok(value)
        } else {
            Err(self)
        }
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (field, messages) in &self.0 {
            for message in messages {
                if !first {
                    f.write_str("; ")?;
                }
                write!(f, "{}: {}", field, message)?;
                first = false;
            }
        }
        Ok(())
    }
}

impl std::error::Error for FieldErrors {}

#[derive(Error, Debug)]
pub enum DispatchError {
    #[error("Validation failed: {0}")]
    ValidationFailed(FieldErrors),

    #[error("Forbidden")]
    Forbidden,

    #[error("Not found")]
    NotFound,

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("No active session")]
    NoActiveSession,

    #[error("Storage error: {0}")]
    Store(#[from] PersistError),

    #[error("Password hashing error: {0}")]
    Hashing(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<FieldErrors> for DispatchError {
    fn from(errors: FieldErrors) -> Self {
        DispatchError::ValidationFailed(errors)
    }
}

pub type Result<T> = std::result::Result<T, DispatchError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_errors_collect_per_field() {
        let mut errors = FieldErrors::new();
        errors.add("password", "too short");
        errors.add("password", "entirely numeric");
        errors.add("email", "invalid");

        assert_eq!(errors.get("password").map(<[String]>::len), Some(2));
        assert_eq!(errors.to_string(), "email: invalid; password: too short; password: entirely numeric");
    }

    #[test]
    fn test_into_result() {
        assert_eq!(FieldErrors::new().into_result(7), Ok(7));
        assert!(FieldErrors::single("text", "blank").into_result(7).is_err());
    }

    #[test]
    fn test_serializes_as_plain_map() {
        let errors = FieldErrors::single("username", "taken");
        let json = serde_json::to_value(&errors).unwrap();
        assert_eq!(json, serde_json::json!({ "username": ["taken"] }));
    }
}
