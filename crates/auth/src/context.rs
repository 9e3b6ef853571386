//! Authorization context handed to guards and views

use crate::state::{LoadingState, SessionLifecycle, SessionPhase};
use crate::types::{Identity, Role};

/// Immutable snapshot of the session store
#[derive(Debug, Clone, PartialEq)]
pub struct AuthContext {
    pub identity: Option<Identity>,
    pub phase: SessionPhase,
}

impl AuthContext {
    pub fn new(identity: Option<Identity>, phase: SessionPhase) -> Self {
        Self { identity, phase }
    }

    pub fn loading_state(&self) -> LoadingState {
        self.phase.loading_state()
    }

    /// True until bootstrap has resolved
    pub fn loading(&self) -> bool {
        self.loading_state().is_loading()
    }

    pub fn lifecycle(&self) -> SessionLifecycle {
        self.phase.lifecycle()
    }

    pub fn is_authenticated(&self) -> bool {
        self.identity.is_some()
    }

    pub fn role(&self) -> Option<Role> {
        self.identity.as_ref().map(|i| i.role)
    }

    pub fn has_role(&self, role: Role) -> bool {
        self.role() == Some(role)
    }

    #[mutants::skip] // Delegates to has_role()
    pub fn is_admin(&self) -> bool {
        self.has_role(Role::Admin)
    }
}
