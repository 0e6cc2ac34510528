use serde_json::Value;

use dwitter_types::{Action, Caller, Resource, Target};

use crate::config::ValidationLimits;
use crate::error::{DispatchError, Result};
use crate::permissions;
use crate::validators::{
    AccountUpdateValidator, CleanData, CredentialsValidator, EmptyValidator,
    PostCreateValidator, PostUpdateValidator, SignupValidator, Validator,
};

/// Routes each (resource, action) pair to its validator and access rule
#[derive(Debug, Clone, Copy)]
pub struct ActionDispatcher {
    signup: SignupValidator,
    account_update: AccountUpdateValidator,
    credentials: CredentialsValidator,
    post_create: PostCreateValidator,
    post_update: PostUpdateValidator,
    empty: EmptyValidator,
}

static DEFAULT_DISPATCHER: ActionDispatcher = ActionDispatcher::new(ValidationLimits::DEFAULT);

impl ActionDispatcher {
    pub const fn new(limits: ValidationLimits) -> Self {
        Self {
            signup: SignupValidator::new(limits),
            account_update: AccountUpdateValidator::new(),
            credentials: CredentialsValidator::new(),
            post_create: PostCreateValidator::new(limits),
            post_update: PostUpdateValidator::new(limits),
            empty: EmptyValidator::new(),
        }
    }

    pub fn select_validator(&self, resource: Resource, action: Action) -> &dyn Validator {
        match (resource, action) {
            (Resource::Account, Action::Create) => &self.signup,
            (Resource::Account, Action::Update) => &self.account_update,
            (Resource::Account | Resource::Post, Action::Authenticate) => &self.credentials,
            (Resource::Post, Action::Create) => &self.post_create,
            (Resource::Post, Action::Update) => &self.post_update,
            (
                Resource::Account | Resource::Post,
                Action::Retrieve | Action::List | Action::Deauthenticate,
            ) => &self.empty,
        }
    }

    pub fn authorize(
        &self,
        resource: Resource,
        action: Action,
        caller: &Caller,
        target: &Target,
    ) -> bool {
        permissions::authorize(resource, action, caller, target)
    }

    /// `authorize` as a `Result`, logging denials
    pub fn check(
        &self,
        resource: Resource,
        action: Action,
        caller: &Caller,
        target: &Target,
    ) -> Result<()> {
        if self.authorize(resource, action, caller, target) {
            Ok(())
        } else {
            tracing::warn!(
                resource = %resource,
                action = %action,
                caller = caller.username().unwrap_or("<anonymous>"),
                target = target.owner().unwrap_or("-"),
                "Permission denied"
            );
            Err(DispatchError::Forbidden)
        }
    }

    /// Run the validator selected for the pair over `payload`
    pub fn clean(&self, resource: Resource, action: Action, payload: &Value) -> Result<CleanData> {
        self.select_validator(resource, action)
            .validate(payload)
            .map_err(|errors| {
                tracing::debug!(
                    resource = %resource,
                    action = %action,
                    errors = %errors,
                    "Payload rejected"
                );
                DispatchError::ValidationFailed(errors)
            })
    }

    /// Authorize, then validate
    pub fn dispatch(
        &self,
        resource: Resource,
        action: Action,
        caller: &Caller,
        target: &Target,
        payload: &Value,
    ) -> Result<CleanData> {
        self.check(resource, action, caller, target)?;
        self.clean(resource, action, payload)
    }
}

impl Default for ActionDispatcher {
    fn default() -> Self {
        DEFAULT_DISPATCHER
    }
}

/// Validator for the pair under default limits
pub fn select_validator(resource: Resource, action: Action) -> &'static dyn Validator {
    DEFAULT_DISPATCHER.select_validator(resource, action)
}

/// Same as [`permissions::authorize`]
pub fn authorize(resource: Resource, action: Action, caller: &Caller, target: &Target) -> bool {
    DEFAULT_DISPATCHER.authorize(resource, action, caller, target)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_every_pair_selects_expected_validator() {
        let dispatcher = ActionDispatcher::default();
        for resource in Resource::ALL {
            for action in Action::ALL {
                let (payload, expected) = match (resource, action) {
                    (Resource::Account, Action::Create) => (
                        json!({
                            "username": "alice",
                            "password": "correct-horse",
                            "password2": "correct-horse",
                        }),
                        "signup",
                    ),
                    (Resource::Account, Action::Update) => {
                        (json!({ "first_name": "Alice" }), "account_update")
                    }
                    (_, Action::Authenticate) => (
                        json!({ "username": "alice", "password": "correct-horse" }),
                        "credentials",
                    ),
                    (Resource::Post, Action::Create) => (json!({ "text": "hello" }), "new_post"),
                    (Resource::Post, Action::Update) => {
                        (json!({ "text": "hello" }), "post_update")
                    }
                    _ => (Value::Null, "empty"),
                };

                let data = dispatcher
                    .select_validator(resource, action)
                    .validate(&payload)
                    .unwrap();
                assert_eq!(data.kind(), expected, "{} {}", resource, action);
            }
        }
    }

    #[test]
    fn test_validator_selection() {
        let body = json!({ "username": "alice", "password": "hunter22" });
        let data = select_validator(Resource::Account, Action::Authenticate)
            .validate(&body)
            .unwrap();
        assert!(matches!(data, CleanData::Credentials(_)));

        let data = select_validator(Resource::Post, Action::List)
            .validate(&Value::Null)
            .unwrap();
        assert_eq!(data, CleanData::Empty);

        let data = select_validator(Resource::Post, Action::Create)
            .validate(&json!({ "text": "hello" }))
            .unwrap();
        assert!(matches!(data, CleanData::NewPost(_)));
    }

    #[test]
    fn test_custom_limits_reach_validators() {
        let dispatcher = ActionDispatcher::new(ValidationLimits::DEFAULT.with_post_max_length(5));
        let result = dispatcher.clean(Resource::Post, Action::Create, &json!({ "text": "too long" }));
        assert!(matches!(result, Err(DispatchError::ValidationFailed(_))));
    }

    #[test]
    fn test_dispatch_checks_permission_before_payload() {
        let dispatcher = ActionDispatcher::default();
        let target = Target::Account("alice".to_string());
        let result = dispatcher.dispatch(
            Resource::Account,
            Action::Update,
            &Caller::user("bob"),
            &target,
            &json!("not an object"),
        );
        assert!(matches!(result, Err(DispatchError::Forbidden)));
    }

    #[test]
    fn test_authorize_is_deterministic() {
        let caller = Caller::user("alice");
        let target = Target::Account("alice".to_string());
        let first = authorize(Resource::Account, Action::Update, &caller, &target);
        for _ in 0..10 {
            assert_eq!(authorize(Resource::Account, Action::Update, &caller, &target), first);
        }
    }
}
