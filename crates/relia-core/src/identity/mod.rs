//! Authenticated identity, passed explicitly into every persistence call.
//!
//! Sign-in itself lives outside this crate. The store only asks "who is the
//! current owner?" right before talking to the persistence collaborator, so
//! a sign-out between two operations is observed by the second one.

use std::sync::{PoisonError, RwLock};

use crate::projects::OwnerId;

/// Source of the currently authenticated user.
pub trait IdentityProvider: Send + Sync {
    /// The signed-in owner, or `None` when nobody is authenticated.
    fn current_owner(&self) -> Option<OwnerId>;
}

/// Identity held in memory and swappable at runtime (sign-in / sign-out).
#[derive(Debug, Default)]
pub struct SessionIdentity {
    owner: RwLock<Option<OwnerId>>,
}

impl SessionIdentity {
    pub fn new(owner: Option<OwnerId>) -> Self {
        Self {
            owner: RwLock::new(owner),
        }
    }

    pub fn signed_in(owner: impl Into<String>) -> Self {
        Self::new(Some(OwnerId::new(owner)))
    }

    pub fn sign_in(&self, owner: OwnerId) {
        tracing::info!(event = "core.identity.signed_in", owner = %owner);
        *self.owner.write().unwrap_or_else(PoisonError::into_inner) = Some(owner);
    }

    pub fn sign_out(&self) {
        tracing::info!(event = "core.identity.signed_out");
        *self.owner.write().unwrap_or_else(PoisonError::into_inner) = None;
    }
}

impl IdentityProvider for SessionIdentity {
    fn current_owner(&self) -> Option<OwnerId> {
        self.owner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_identity_is_anonymous() {
        let identity = SessionIdentity::default();
        assert!(identity.current_owner().is_none());
    }

    #[test]
    fn test_sign_in_and_out() {
        let identity = SessionIdentity::default();

        identity.sign_in(OwnerId::new("user-1"));
        assert_eq!(identity.current_owner(), Some(OwnerId::new("user-1")));

        identity.sign_out();
        assert!(identity.current_owner().is_none());
    }

    #[test]
    fn test_signed_in_constructor() {
        let identity = SessionIdentity::signed_in("user-2");
        assert_eq!(identity.current_owner(), Some(OwnerId::new("user-2")));
    }
}
