use dwitter_types::{Action, Caller, Resource, Target};

/// Access rule attached to a (resource, action) pair
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Permission {
    AllowAny,
    IsAuthenticated,
    IsAdmin,
    /// Admins, or the authenticated caller owning the target
    IsOwnerOrAdmin,
}

impl Permission {
    /// Rule table. Every pair is listed so a new action or resource fails to
    /// compile until it is given a rule.
    pub const fn for_action(resource: Resource, action: Action) -> Self {
        match (resource, action) {
            (Resource::Account | Resource::Post, Action::Create) => Permission::AllowAny,
            (Resource::Account | Resource::Post, Action::Authenticate) => Permission::AllowAny,
            (Resource::Account | Resource::Post, Action::Deauthenticate) => {
                Permission::IsAuthenticated
            }
            (Resource::Account, Action::Update) => Permission::IsOwnerOrAdmin,
            (Resource::Account, Action::Retrieve) => Permission::IsAuthenticated,
            (Resource::Account, Action::List) => Permission::IsAdmin,
            (Resource::Post, Action::Update | Action::Retrieve) => Permission::IsOwnerOrAdmin,
            (Resource::Post, Action::List) => Permission::AllowAny,
        }
    }

    pub fn has_permission(&self, caller: &Caller, target: &Target) -> bool {
        match self {
            Permission::AllowAny => true,
            Permission::IsAuthenticated => caller.is_authenticated(),
            Permission::IsAdmin => caller.is_admin(),
            Permission::IsOwnerOrAdmin => {
                caller.is_admin() || target.owner().is_some_and(|owner| caller.is(owner))
            }
        }
    }
}

/// Whether `caller` may perform `action` on `resource` for `target`.
///
/// Pure and deterministic; no I/O.
pub fn authorize(resource: Resource, action: Action, caller: &Caller, target: &Target) -> bool {
    Permission::for_action(resource, action).has_permission(caller, target)
}
