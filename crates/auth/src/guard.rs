//! Route guard for protected views

use crate::context::AuthContext;
use crate::types::{Identity, Role};

/// Where unauthenticated or unauthorized visitors are sent
pub const LANDING_PATH: &str = "/";

/// Outcome of guarding a view
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardDecision {
    /// Bootstrap has not resolved; show "Loading..." and decide later
    Placeholder,
    Redirect(&'static str),
    Render,
}

/// Decide whether a protected view may render.
///
/// A wrong role redirects silently; there is no access-denied page.
pub fn guard(identity: Option<&Identity>, loading: bool, required: Option<Role>) -> GuardDecision {
    if loading {
        return GuardDecision::Placeholder;
    }
    let Some(identity) = identity else {
        return GuardDecision::Redirect(LANDING_PATH);
    };
    match required {
        Some(role) if identity.role != role => GuardDecision::Redirect(LANDING_PATH),
        _ => GuardDecision::Render,
    }
}

/// A guard bound to the role a view requires
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RouteGuard {
    pub required: Option<Role>,
}

impl RouteGuard {
    /// Any signed-in user
    pub fn authenticated() -> Self {
        Self { required: None }
    }

    pub fn role(role: Role) -> Self {
        Self {
            required: Some(role),
        }
    }

    pub fn check(&self, ctx: &AuthContext) -> GuardDecision {
        guard(ctx.identity.as_ref(), ctx.loading(), self.required)
    }
}
