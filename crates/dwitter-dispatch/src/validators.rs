//! Payload validators.
//!
//! Each validator takes the raw JSON body of a request and either returns
//! cleaned, typed data or a map of per-field messages. Unknown keys are
//! ignored. Text fields are trimmed; passwords are taken verbatim.

use serde_json::{Map, Value};
use std::fmt;
use uuid::Uuid;
use validator::ValidateEmail;

use dwitter_types::PostId;

use crate::config::ValidationLimits;
use crate::error::{DispatchError, FieldErrors};

pub const USERNAME_MAX_LENGTH: usize = 150;
pub const NAME_MAX_LENGTH: usize = 150;
pub const EMAIL_MAX_LENGTH: usize = 254;

const REQUIRED: &str = "This field is required.";
const BLANK: &str = "This field may not be blank.";
const NULL: &str = "This field may not be null.";
const NOT_A_STRING: &str = "Not a valid string.";
const READ_ONLY: &str = "This field cannot be changed.";
const INVALID_USERNAME: &str =
    "Enter a valid username. This value may contain only letters, numbers, and @/./+/-/_ characters.";
const INVALID_EMAIL: &str = "Enter a valid email address.";
const INVALID_UUID: &str = "Must be a valid UUID.";
const PASSWORD_MISMATCH: &str = "The two password fields didn't match.";
const PASSWORD_NUMERIC: &str = "This password is entirely numeric.";

pub trait Validator: Send + Sync {
    fn validate(&self, payload: &Value) -> Result<CleanData, FieldErrors>;
}

/// Output of a successful validation, one variant per validator
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CleanData {
    Signup(NewAccount),
    AccountUpdate(AccountChanges),
    Credentials(Credentials),
    NewPost(NewPost),
    PostUpdate(PostChanges),
    Empty,
}

impl CleanData {
    pub fn kind(&self) -> &'static str {
        match self {
            CleanData::Signup(_) => "signup",
            CleanData::AccountUpdate(_) => "account_update",
            CleanData::Credentials(_) => "credentials",
            CleanData::NewPost(_) => "new_post",
            CleanData::PostUpdate(_) => "post_update",
            CleanData::Empty => "empty",
        }
    }

    fn mismatch(self, expected: &str) -> DispatchError {
        DispatchError::Internal(format!(
            "expected {} data, validator produced {}",
            expected,
            self.kind()
        ))
    }

    pub fn into_signup(self) -> Result<NewAccount, DispatchError> {
        match self {
            CleanData::Signup(data) => Ok(data),
            other => Err(other.mismatch("signup")),
        }
    }

    pub fn into_account_changes(self) -> Result<AccountChanges, DispatchError> {
        match self {
            CleanData::AccountUpdate(data) => Ok(data),
            other => Err(other.mismatch("account_update")),
        }
    }

    pub fn into_credentials(self) -> Result<Credentials, DispatchError> {
        match self {
            CleanData::Credentials(data) => Ok(data),
            other => Err(other.mismatch("credentials")),
        }
    }

    pub fn into_new_post(self) -> Result<NewPost, DispatchError> {
        match self {
            CleanData::NewPost(data) => Ok(data),
            other => Err(other.mismatch("new_post")),
        }
    }

    pub fn into_post_changes(self) -> Result<PostChanges, DispatchError> {
        match self {
            CleanData::PostUpdate(data) => Ok(data),
            other => Err(other.mismatch("post_update")),
        }
    }
}

#[derive(Clone, PartialEq, Eq)]
pub struct NewAccount {
    pub username: String,
    pub password: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
}

impl fmt::Debug for NewAccount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NewAccount")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("first_name", &self.first_name)
            .field("last_name", &self.last_name)
            .field("email", &self.email)
            .finish()
    }
}

/// Partial account update. The outer `Option` records whether the key was
/// sent at all; an inner `None` clears the stored value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AccountChanges {
    pub username: Option<String>,
    pub first_name: Option<Option<String>>,
    pub last_name: Option<Option<String>>,
    pub email: Option<Option<String>>,
}

impl AccountChanges {
    pub fn is_empty(&self) -> bool {
        self.username.is_none()
            && self.first_name.is_none()
            && self.last_name.is_none()
            && self.email.is_none()
    }
}

#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPost {
    pub text: String,
    pub reply_to: Option<PostId>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PostChanges {
    pub text: Option<String>,
    /// Echo of the parent id if the client sent one; it must match the stored value
    pub reply_to: Option<Option<PostId>>,
}

/// Validates account registration
#[derive(Debug, Clone, Copy)]
pub struct SignupValidator {
    limits: ValidationLimits,
}

impl SignupValidator {
    pub const fn new(limits: ValidationLimits) -> Self {
        Self { limits }
    }
}

impl Validator for SignupValidator {
    fn validate(&self, payload: &Value) -> Result<CleanData, FieldErrors> {
        let mut fields = Fields::new(payload)?;

        let username = fields.required_text("username");
        if let Some(username) = &username {
            check_username(username, fields.errors());
        }
        let first_name = fields.optional_name("first_name").flatten();
        let last_name = fields.optional_name("last_name").flatten();
        let email = fields.optional_email("email").flatten();

        let password = fields.required_secret("password");
        let confirmation = fields.required_secret("password2");
        if let (Some(password), Some(confirmation)) = (&password, &confirmation) {
            if password != confirmation {
                fields.errors().add("password2", PASSWORD_MISMATCH);
            } else {
                check_password_strength(password, &self.limits, fields.errors());
            }
        }

        let errors = fields.finish();
        match (username, password) {
            (Some(username), Some(password)) => errors.into_result(CleanData::Signup(NewAccount {
                username,
                password,
                first_name,
                last_name,
                email,
            })),
            _ => Err(errors),
        }
    }
}

/// Validates profile edits; every key is optional
#[derive(Debug, Clone, Copy, Default)]
pub struct AccountUpdateValidator;

impl AccountUpdateValidator {
    pub const fn new() -> Self {
        Self
    }
}

impl Validator for AccountUpdateValidator {
    fn validate(&self, payload: &Value) -> Result<CleanData, FieldErrors> {
        let mut fields = Fields::new(payload)?;

        let username = fields.optional_text("username").flatten();
        let changes = AccountChanges {
            username,
            first_name: fields.optional_name("first_name"),
            last_name: fields.optional_name("last_name"),
            email: fields.optional_email("email"),
        };

        fields.finish().into_result(CleanData::AccountUpdate(changes))
    }
}

/// Validates a username/password pair for login
#[derive(Debug, Clone, Copy, Default)]
pub struct CredentialsValidator;

impl CredentialsValidator {
    pub const fn new() -> Self {
        Self
    }
}

impl Validator for CredentialsValidator {
    fn validate(&self, payload: &Value) -> Result<CleanData, FieldErrors> {
        let mut fields = Fields::new(payload)?;
        let username = fields.required_text("username");
        let password = fields.required_secret("password");
        let errors = fields.finish();

        match (username, password) {
            (Some(username), Some(password)) => {
                errors.into_result(CleanData::Credentials(Credentials { username, password }))
            }
            _ => Err(errors),
        }
    }
}

/// Validates a new post or reply
#[derive(Debug, Clone, Copy)]
pub struct PostCreateValidator {
    limits: ValidationLimits,
}

impl PostCreateValidator {
    pub const fn new(limits: ValidationLimits) -> Self {
        Self { limits }
    }
}

impl Validator for PostCreateValidator {
    fn validate(&self, payload: &Value) -> Result<CleanData, FieldErrors> {
        let mut fields = Fields::new(payload)?;

        let text = fields.required_text("text");
        if let Some(text) = &text {
            check_max_length("text", text, self.limits.post_max_length, fields.errors());
        }
        let reply_to = fields.optional_uuid("reply_to").flatten();

        let errors = fields.finish();
        match text {
            Some(text) => errors.into_result(CleanData::NewPost(NewPost { text, reply_to })),
            None => Err(errors),
        }
    }
}

/// Validates edits to a post; only the text may change
#[derive(Debug, Clone, Copy)]
pub struct PostUpdateValidator {
    limits: ValidationLimits,
}

impl PostUpdateValidator {
    pub const fn new(limits: ValidationLimits) -> Self {
        Self { limits }
    }
}

impl Validator for PostUpdateValidator {
    fn validate(&self, payload: &Value) -> Result<CleanData, FieldErrors> {
        let mut fields = Fields::new(payload)?;

        let text = fields.present_text("text");
        if let Some(text) = &text {
            check_max_length("text", text, self.limits.post_max_length, fields.errors());
        }
        let reply_to = fields.optional_uuid("reply_to");

        fields
            .finish()
            .into_result(CleanData::PostUpdate(PostChanges { text, reply_to }))
    }
}

/// Accepts anything; used by actions that carry no body
#[derive(Debug, Clone, Copy, Default)]
pub struct EmptyValidator;

impl EmptyValidator {
    pub const fn new() -> Self {
        Self
    }
}

impl Validator for EmptyValidator {
    fn validate(&self, _payload: &Value) -> Result<CleanData, FieldErrors> {
        Ok(CleanData::Empty)
    }
}

/// Message reported when a provided field differs from the stored value
pub fn read_only_error(field: &str) -> FieldErrors {
    FieldErrors::single(field, READ_ONLY)
}

struct Fields<'a> {
    map: &'a Map<String, Value>,
    errors: FieldErrors,
}

impl<'a> Fields<'a> {
    fn new(payload: &'a Value) -> Result<Self, FieldErrors> {
        match payload {
            Value::Object(map) => Ok(Self {
                map,
                errors: FieldErrors::new(),
            }),
            other => Err(FieldErrors::single(
                FieldErrors::NON_FIELD,
                format!(
                    "Invalid data. Expected a dictionary, but got {}.",
                    json_kind(other)
                ),
            )),
        }
    }

    fn errors(&mut self) -> &mut FieldErrors {
        &mut self.errors
    }

    fn finish(self) -> FieldErrors {
        self.errors
    }

    fn string(&mut self, name: &str, value: &Value) -> Option<String> {
        match value {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            Value::Bool(b) => Some(b.to_string()),
            _ => {
                self.errors.add(name, NOT_A_STRING);
                None
            }
        }
    }

    /// Trimmed, non-blank string that must be present
    fn required_text(&mut self, name: &str) -> Option<String> {
        let map = self.map;
        let value = match map.get(name) {
            None => {
                self.errors.add(name, REQUIRED);
                return None;
            }
            Some(Value::Null) => {
                self.errors.add(name, NULL);
                return None;
            }
            Some(value) => value,
        };
        let text = self.string(name, value)?.trim().to_string();
        if text.is_empty() {
            self.errors.add(name, BLANK);
            return None;
        }
        Some(text)
    }

    /// Like `required_text` but without trimming
    fn required_secret(&mut self, name: &str) -> Option<String> {
        let map = self.map;
        match map.get(name) {
            None => {
                self.errors.add(name, REQUIRED);
                None
            }
            Some(Value::String(s)) if s.is_empty() => {
                self.errors.add(name, BLANK);
                None
            }
            Some(Value::String(s)) => Some(s.clone()),
            Some(Value::Null) => {
                self.errors.add(name, NULL);
                None
            }
            Some(_) => {
                self.errors.add(name, NOT_A_STRING);
                None
            }
        }
    }

    /// `None` when absent, `Some(None)` when null or blank
    /// `required_text` rules, but only when the key is present
    fn present_text(&mut self, name: &str) -> Option<String> {
        if self.map.contains_key(name) {
            self.required_text(name)
        } else {
            None
        }
    }

    fn optional_text(&mut self, name: &str) -> Option<Option<String>> {
        let map = self.map;
        match map.get(name)? {
            Value::Null => Some(None),
            value => {
                let text = self.string(name, value)?.trim().to_string();
                Some((!text.is_empty()).then_some(text))
            }
        }
    }

    fn optional_name(&mut self, name: &str) -> Option<Option<String>> {
        let value = self.optional_text(name)?;
        if let Some(text) = &value {
            check_max_length(name, text, NAME_MAX_LENGTH, &mut self.errors);
        }
        Some(value)
    }

    fn optional_email(&mut self, name: &str) -> Option<Option<String>> {
        let value = self.optional_text(name)?;
        if let Some(email) = &value {
            if email.chars().count() > EMAIL_MAX_LENGTH || !email.validate_email() {
                self.errors.add(name, INVALID_EMAIL);
            }
        }
        Some(value)
    }

    fn optional_uuid(&mut self, name: &str) -> Option<Option<Uuid>> {
        let map = self.map;
        match map.get(name)? {
            Value::Null => Some(None),
            Value::String(s) if s.trim().is_empty() => Some(None),
            Value::String(s) => match Uuid::parse_str(s.trim()) {
                Ok(id) => Some(Some(id)),
                Err(_) => {
                    self.errors.add(name, INVALID_UUID);
                    None
                }
            },
            _ => {
                self.errors.add(name, INVALID_UUID);
                None
            }
        }
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "str",
        Value::Array(_) => "list",
        Value::Object(_) => "dict",
    }
}

fn check_max_length(field: &str, value: &str, max: usize, errors: &mut FieldErrors) {
    if value.chars().count() > max {
        errors.add(
            field,
            format!("Ensure this field has no more than {} characters.", max),
        );
    }
}

fn check_username(username: &str, errors: &mut FieldErrors) {
    check_max_length("username", username, USERNAME_MAX_LENGTH, errors);
    let valid = username
        .chars()
        .all(|c| c.is_alphanumeric() || matches!(c, '@' | '.' | '+' | '-' | '_'));
    if !valid {
        errors.add("username", INVALID_USERNAME);
    }
}

fn check_password_strength(password: &str, limits: &ValidationLimits, errors: &mut FieldErrors) {
    if password.chars().count() < limits.password_min_length {
        errors.add(
            "password",
            format!(
                "This password is too short. It must contain at least {} characters.",
                limits.password_min_length
            ),
        );
    }
    if password.chars().all(|c| c.is_ascii_digit()) {
        errors.add("password", PASSWORD_NUMERIC);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn signup() -> SignupValidator {
        SignupValidator::new(ValidationLimits::DEFAULT)
    }

    #[test]
    fn test_signup_accepts_complete_payload() {
        let data = signup()
            .validate(&json!({
                "username": "alice",
                "password": "s3cret-pass",
                "password2": "s3cret-pass",
                "first_name": " Alice ",
                "email": "alice@example.com"
            }))
            .unwrap()
            .into_signup()
            .unwrap();

        assert_eq!(data.username, "alice");
        assert_eq!(data.first_name.as_deref(), Some("Alice"));
        assert_eq!(data.last_name, None);
        assert_eq!(data.email.as_deref(), Some("alice@example.com"));
    }

    #[test]
    fn test_signup_reports_every_missing_field() {
        let errors = signup().validate(&json!({})).unwrap_err();
        assert!(errors.contains("username"));
        assert!(errors.contains("password"));
        assert!(errors.contains("password2"));
        assert!(!errors.contains("email"));
    }

    #[test]
    fn test_signup_password_rules() {
        let errors = signup()
            .validate(&json!({ "username": "bob", "password": "123", "password2": "123" }))
            .unwrap_err();
        let messages = errors.get("password").unwrap();
        assert_eq!(messages.len(), 2);
        assert!(messages[0].contains("at least 8 characters"));
        assert_eq!(messages[1], PASSWORD_NUMERIC);

        let errors = signup()
            .validate(&json!({ "username": "bob", "password": "longenough", "password2": "different" }))
            .unwrap_err();
        assert_eq!(errors.get("password2").unwrap(), [PASSWORD_MISMATCH]);
    }

    #[test]
    fn test_signup_username_charset_and_length() {
        let errors = signup()
            .validate(&json!({ "username": "bad name!", "password": "longenough", "password2": "longenough" }))
            .unwrap_err();
        assert_eq!(errors.get("username").unwrap(), [INVALID_USERNAME]);

        let long = "a".repeat(USERNAME_MAX_LENGTH + 1);
        let errors = signup()
            .validate(&json!({ "username": long, "password": "longenough", "password2": "longenough" }))
            .unwrap_err();
        assert!(errors.get("username").unwrap()[0].contains("150"));
    }

    #[test]
    fn test_signup_rejects_bad_email() {
        let errors = signup()
            .validate(&json!({
                "username": "carol",
                "password": "longenough",
                "password2": "longenough",
                "email": "not-an-email"
            }))
            .unwrap_err();
        assert_eq!(errors.get("email").unwrap(), [INVALID_EMAIL]);
    }

    #[test]
    fn test_non_object_payload() {
        let errors = signup().validate(&json!([1, 2])).unwrap_err();
        assert_eq!(
            errors.get(FieldErrors::NON_FIELD).unwrap(),
            ["Invalid data. Expected a dictionary, but got list."]
        );
    }

    #[test]
    fn test_account_update_distinguishes_absent_and_cleared() {
        let changes = AccountUpdateValidator::new()
            .validate(&json!({ "first_name": "Al", "email": "" }))
            .unwrap()
            .into_account_changes()
            .unwrap();

        assert_eq!(changes.first_name, Some(Some("Al".to_string())));
        assert_eq!(changes.last_name, None);
        assert_eq!(changes.email, Some(None));
        assert_eq!(changes.username, None);
    }

    #[test]
    fn test_credentials_require_both_fields() {
        let errors = CredentialsValidator::new()
            .validate(&json!({ "username": "alice", "password": "" }))
            .unwrap_err();
        assert_eq!(errors.get("password").unwrap(), [BLANK]);
    }

    #[test]
    fn test_password_is_not_trimmed() {
        let creds = CredentialsValidator::new()
            .validate(&json!({ "username": " alice ", "password": " pass " }))
            .unwrap()
            .into_credentials()
            .unwrap();
        assert_eq!(creds.username, "alice");
        assert_eq!(creds.password, " pass ");
    }

    #[test]
    fn test_post_create_text_rules() {
        let validator = PostCreateValidator::new(ValidationLimits::DEFAULT);

        let errors = validator.validate(&json!({ "text": "   " })).unwrap_err();
        assert_eq!(errors.get("text").unwrap(), [BLANK]);

        let errors = validator
            .validate(&json!({ "text": "x".repeat(281) }))
            .unwrap_err();
        assert_eq!(
            errors.get("text").unwrap(),
            ["Ensure this field has no more than 280 characters."]
        );

        let post = validator
            .validate(&json!({ "text": "x".repeat(280) }))
            .unwrap()
            .into_new_post()
            .unwrap();
        assert_eq!(post.text.len(), 280);
    }

    #[test]
    fn test_post_create_reply_to_must_be_uuid() {
        let validator = PostCreateValidator::new(ValidationLimits::DEFAULT);
        let errors = validator
            .validate(&json!({ "text": "hi", "reply_to": "nope" }))
            .unwrap_err();
        assert_eq!(errors.get("reply_to").unwrap(), [INVALID_UUID]);

        let parent = Uuid::new_v4();
        let post = validator
            .validate(&json!({ "text": "hi", "reply_to": parent.to_string() }))
            .unwrap()
            .into_new_post()
            .unwrap();
        assert_eq!(post.reply_to, Some(parent));
    }

    #[test]
    fn test_post_update_carries_reply_to_echo() {
        let changes = PostUpdateValidator::new(ValidationLimits::DEFAULT)
            .validate(&json!({ "text": "edited", "reply_to": null }))
            .unwrap()
            .into_post_changes()
            .unwrap();
        assert_eq!(changes.text.as_deref(), Some("edited"));
        assert_eq!(changes.reply_to, Some(None));
    }

    #[test]
    fn test_post_update_rejects_blank_text() {
        let validator = PostUpdateValidator::new(ValidationLimits::DEFAULT);

        for text in [json!(""), json!("   ")] {
            let errors = validator.validate(&json!({ "text": text })).unwrap_err();
            assert_eq!(errors.get("text").unwrap(), [BLANK]);
        }
        let errors = validator.validate(&json!({ "text": null })).unwrap_err();
        assert_eq!(errors.get("text").unwrap(), [NULL]);

        let changes = validator
            .validate(&json!({}))
            .unwrap()
            .into_post_changes()
            .unwrap();
        assert_eq!(changes.text, None);
    }

    #[test]
    fn test_empty_validator_accepts_anything() {
        assert_eq!(EmptyValidator.validate(&Value::Null).unwrap(), CleanData::Empty);
        assert_eq!(EmptyValidator.validate(&json!([1])).unwrap(), CleanData::Empty);
    }

    #[test]
    fn test_wrong_clean_data_is_internal_error() {
        let result = CleanData::Empty.into_signup();
        assert!(matches!(result, Err(DispatchError::Internal(_))));
    }
}
