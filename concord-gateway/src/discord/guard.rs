//! Centralized access checks run before any intent handler.
//!
//! Each intent declares an [`AccessPolicy`]; the router evaluates it once,
//! so handlers never repeat identity or permission checks themselves.

use serenity::model::id::UserId;
use serenity::model::permissions::Permissions;

/// Platform-level permission required by an intent
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    None,
    ManageRoles,
    ManageChannels,
    Administrator,
}

impl Capability {
    fn granted_by(self, permissions: Permissions) -> bool {
        if permissions.administrator() {
            return true;
        }
        match self {
            Capability::None => true,
            Capability::ManageRoles => permissions.manage_roles(),
            Capability::ManageChannels => permissions.manage_channels(),
            Capability::Administrator => false,
        }
    }
}

/// Declarative access requirements for one intent
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AccessPolicy {
    /// The wizard opener this element is bound to, if any
    pub owner: Option<UserId>,
    /// Permission the actor must hold
    pub capability: Capability,
}

impl AccessPolicy {
    pub fn open() -> Self {
        Self { owner: None, capability: Capability::None }
    }

    pub fn owned(owner: UserId) -> Self {
        Self { owner: Some(owner), capability: Capability::None }
    }

    pub fn capability(capability: Capability) -> Self {
        Self { owner: None, capability }
    }

    pub fn with_capability(mut self, capability: Capability) -> Self {
        self.capability = capability;
        self
    }
}

/// Why an actor was turned away
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Denial {
    NotOwner,
    MissingCapability(Capability),
}

impl Denial {
    /// Actor-facing denial text (always delivered ephemerally)
    pub fn message(&self) -> &'static str {
        match self {
            Denial::NotOwner => "You are not authorized to use this menu.",
            Denial::MissingCapability(Capability::ManageRoles) => {
                "You need the Manage Roles permission to do that."
            }
            Denial::MissingCapability(Capability::ManageChannels) => {
                "You need the Manage Channels permission to do that."
            }
            Denial::MissingCapability(Capability::Administrator) => {
                "You need the Administrator permission to do that."
            }
            Denial::MissingCapability(Capability::None) => "You cannot do that.",
        }
    }
}

/// Evaluate a policy against the acting user.
///
/// `permissions` is the resolved permission set from the interaction's
/// member payload; `None` (DM context) carries no permissions.
pub fn evaluate(
    policy: AccessPolicy,
    actor: UserId,
    permissions: Option<Permissions>,
) -> Result<(), Denial> {
    if let Some(owner) = policy.owner {
        if owner != actor {
            return Err(Denial::NotOwner);
        }
    }

    if policy.capability != Capability::None
        && !policy.capability.granted_by(permissions.unwrap_or_default())
    {
        return Err(Denial::MissingCapability(policy.capability));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn owner_binding_rejects_other_actors() {
        let policy = AccessPolicy::owned(UserId::new(1));
        assert_eq!(evaluate(policy, UserId::new(1), None), Ok(()));
        assert_eq!(evaluate(policy, UserId::new(2), None), Err(Denial::NotOwner));
    }

    #[test]
    fn capability_checks_respect_admin_override() {
        let policy = AccessPolicy::capability(Capability::ManageRoles);

        assert_eq!(
            evaluate(policy, UserId::new(1), Some(Permissions::MANAGE_ROLES)),
            Ok(())
        );
        assert_eq!(
            evaluate(policy, UserId::new(1), Some(Permissions::ADMINISTRATOR)),
            Ok(())
        );
        assert_eq!(
            evaluate(policy, UserId::new(1), Some(Permissions::empty())),
            Err(Denial::MissingCapability(Capability::ManageRoles))
        );
        // No member payload at all (DM context) carries no permissions
        assert_eq!(
            evaluate(policy, UserId::new(1), None),
            Err(Denial::MissingCapability(Capability::ManageRoles))
        );
    }

    #[test]
    fn owner_check_runs_before_capability_check() {
        let policy =
            AccessPolicy::owned(UserId::new(1)).with_capability(Capability::Administrator);
        assert_eq!(
            evaluate(policy, UserId::new(2), Some(Permissions::ADMINISTRATOR)),
            Err(Denial::NotOwner)
        );
        assert_eq!(
            evaluate(policy, UserId::new(1), Some(Permissions::ADMINISTRATOR)),
            Ok(())
        );
    }

    #[test]
    fn administrator_capability_requires_the_admin_bit() {
        let policy = AccessPolicy::capability(Capability::Administrator);
        assert_eq!(
            evaluate(
                policy,
                UserId::new(1),
                Some(Permissions::MANAGE_ROLES | Permissions::MANAGE_CHANNELS)
            ),
            Err(Denial::MissingCapability(Capability::Administrator))
        );
    }
}
