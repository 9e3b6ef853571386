//! Session lifecycle state machine
//!
//! Phases and the events that move between them:
//! - `Uninitialized --fetch--> Loading --> Authenticated | Anonymous`
//! - `sign_in` / `sign_out` move between `Anonymous` and `Authenticated`
//!   directly, without passing through `Loading`
//! - `destroy` ends the lifecycle from any live phase

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur during state transitions
#[derive(Debug, Error, Clone, PartialEq)]
pub enum StateError {
    #[error("Invalid transition: cannot transition from {from} via {event}")]
    InvalidTransition { from: String, event: String },

    #[error("Terminal state: {0} is a terminal state and cannot transition")]
    TerminalState(String),
}

/// Tri-state gate that keeps the route guard from deciding too early
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoadingState {
    NotChecked,
    Checking,
    Resolved,
}

impl LoadingState {
    /// The boolean `loading` flag views and the persisted blob use
    pub fn is_loading(&self) -> bool {
        !matches!(self, LoadingState::Resolved)
    }
}

/// Coarse lifecycle exposed to views
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionLifecycle {
    Bootstrap,
    Authenticated,
    Anonymous,
    Destroyed,
}

/// Session store phases
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionPhase {
    Uninitialized,
    Loading,
    Authenticated,
    Anonymous,
    Destroyed,
}

impl SessionPhase {
    /// Check if this is a terminal state
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Destroyed)
    }

    pub fn loading_state(&self) -> LoadingState {
        match self {
            Self::Uninitialized => LoadingState::NotChecked,
            Self::Loading => LoadingState::Checking,
            Self::Authenticated | Self::Anonymous | Self::Destroyed => LoadingState::Resolved,
        }
    }

    pub fn lifecycle(&self) -> SessionLifecycle {
        match self {
            Self::Uninitialized | Self::Loading => SessionLifecycle::Bootstrap,
            Self::Authenticated => SessionLifecycle::Authenticated,
            Self::Anonymous => SessionLifecycle::Anonymous,
            Self::Destroyed => SessionLifecycle::Destroyed,
        }
    }

    /// Get all valid next states from current state
    pub fn valid_transitions(&self) -> &'static [SessionPhase] {
        match self {
            Self::Uninitialized => &[
                Self::Loading,
                Self::Authenticated,
                Self::Anonymous,
                Self::Destroyed,
            ],
            Self::Loading => &[Self::Authenticated, Self::Anonymous, Self::Destroyed],
            Self::Authenticated | Self::Anonymous => &[
                Self::Loading,
                Self::Authenticated,
                Self::Anonymous,
                Self::Destroyed,
            ],
            Self::Destroyed => &[],
        }
    }
}

impl std::fmt::Display for SessionPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Uninitialized => write!(f, "uninitialized"),
            Self::Loading => write!(f, "loading"),
            Self::Authenticated => write!(f, "authenticated"),
            Self::Anonymous => write!(f, "anonymous"),
            Self::Destroyed => write!(f, "destroyed"),
        }
    }
}

/// Events that trigger session phase transitions
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SessionEvent {
    /// Bootstrap started (`fetch_user`)
    Fetch,
    /// Bootstrap found a backend session and resolved a role
    SessionFound,
    /// Bootstrap found no backend session
    NoSession,
    /// Bootstrap found a session but the profile lookup failed
    LookupFailed,
    /// Password sign-in succeeded, or an identity was set directly
    SignIn,
    /// Identity cleared
    SignOut,
    /// Store torn down
    Destroy,
}

impl std::fmt::Display for SessionEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Fetch => write!(f, "fetch"),
            Self::SessionFound => write!(f, "session_found"),
            Self::NoSession => write!(f, "no_session"),
            Self::LookupFailed => write!(f, "lookup_failed"),
            Self::SignIn => write!(f, "sign_in"),
            Self::SignOut => write!(f, "sign_out"),
            Self::Destroy => write!(f, "destroy"),
        }
    }
}

/// Guard context for session transitions
#[derive(Debug, Clone)]
pub struct SessionGuardContext {
    /// Whether an identity is currently held (kept on a failed lookup)
    pub has_identity: bool,
}

/// Session state machine
pub struct SessionStateMachine;

impl SessionStateMachine {
    /// Attempt a state transition with guard conditions
    pub fn transition(
        current: SessionPhase,
        event: SessionEvent,
        context: Option<&SessionGuardContext>,
    ) -> Result<SessionPhase, StateError> {
        if current.is_terminal() {
            return Err(StateError::TerminalState(current.to_string()));
        }

        let next = match (current, event) {
            (_, SessionEvent::Destroy) => SessionPhase::Destroyed,
            (_, SessionEvent::SignIn) => SessionPhase::Authenticated,
            (_, SessionEvent::SignOut) => SessionPhase::Anonymous,

            (SessionPhase::Loading, SessionEvent::Fetch) => {
                return Err(invalid(current, event));
            }
            (_, SessionEvent::Fetch) => SessionPhase::Loading,

            (SessionPhase::Loading, SessionEvent::SessionFound) => SessionPhase::Authenticated,
            (SessionPhase::Loading, SessionEvent::NoSession) => SessionPhase::Anonymous,
            (SessionPhase::Loading, SessionEvent::LookupFailed) => {
                // Identity is left as it was; the phase follows it.
                match context {
                    Some(ctx) if ctx.has_identity => SessionPhase::Authenticated,
                    _ => SessionPhase::Anonymous,
                }
            }

            _ => return Err(invalid(current, event)),
        };

        Ok(next)
    }

    /// Check if a transition is valid without performing it
    pub fn can_transition(
        current: SessionPhase,
        event: &SessionEvent,
        context: Option<&SessionGuardContext>,
    ) -> bool {
        Self::transition(current, *event, context).is_ok()
    }
}

fn invalid(from: SessionPhase, event: SessionEvent) -> StateError {
    StateError::InvalidTransition {
        from: from.to_string(),
        event: event.to_string(),
    }
}
