//! Client-side authentication for SiteDesk
//!
//! Owns the session lifecycle of a dashboard client: bootstrap from an
//! existing backend session, password sign-in with lazy profile creation,
//! sign-out, and the route guard that gates protected views on the
//! resulting identity and role.

mod context;
mod error;
mod guard;
mod profiles;
mod state;
mod storage;
mod store;
mod types;

pub use context::AuthContext;
pub use error::AuthError;
pub use guard::{guard, GuardDecision, RouteGuard, LANDING_PATH};
pub use profiles::ProfileRepository;
pub use state::{
    LoadingState, SessionEvent, SessionGuardContext, SessionLifecycle, SessionPhase,
    SessionStateMachine, StateError,
};
pub use storage::{
    FileStorage, LocalStorage, MemoryStorage, PersistedAuthState, StorageError, AUTH_STORAGE_KEY,
};
pub use store::SessionStore;
pub use types::{Identity, Role};
