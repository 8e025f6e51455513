//! Identity provider seam
//!
//! The hosted identity provider is opaque to this crate: all it must do is
//! hand over a stable user id, or say nobody is signed in.

use wdrb_common::UserId;

/// Source of the signed-in user
pub trait IdentityProvider: Send + Sync {
    /// Current user, `None` when nobody is signed in or the session expired
    fn current_user(&self) -> Option<UserId>;
}

/// Identity fixed at startup (command line, environment or config file)
#[derive(Debug, Clone, Default)]
pub struct StaticIdentity {
    user: Option<UserId>,
}

impl StaticIdentity {
    /// Blank ids count as signed out
    pub fn new(user_id: Option<&str>) -> Self {
        Self {
            user: user_id.and_then(UserId::new),
        }
    }

    pub fn signed_out() -> Self {
        Self::default()
    }
}

impl IdentityProvider for StaticIdentity {
    fn current_user(&self) -> Option<UserId> {
        self.user.clone()
    }
}
