//! Session store
//!
//! Holds the signed-in [`Identity`] and the bootstrap phase for one client.
//! Every change goes through [`SessionStateMachine`] and is written through
//! to local storage. Storage failures are logged and never fail an operation.
//!
//! No lock is held across a backend call. Storage writes happen under the
//! state lock, so the persisted blob follows transition order.
//!
//! A bootstrap result that arrives
//! after a sign-in or sign-out has already moved the store out of `Loading`
//! is discarded.

use std::sync::Arc;

use sitedesk_backend::{Backend, Session};
use tokio::sync::RwLock;

use crate::context::AuthContext;
use crate::error::AuthError;
use crate::profiles::ProfileRepository;
use crate::state::{SessionEvent, SessionGuardContext, SessionPhase, SessionStateMachine};
use crate::storage::{LocalStorage, PersistedAuthState, AUTH_STORAGE_KEY};
use crate::types::{Identity, Role};

#[derive(Debug)]
struct Inner {
    identity: Option<Identity>,
    phase: SessionPhase,
}

/// Client-side session state with explicit lifecycle
pub struct SessionStore {
    backend: Arc<dyn Backend>,
    profiles: ProfileRepository,
    storage: Arc<dyn LocalStorage>,
    inner: RwLock<Inner>,
}

impl SessionStore {
    /// Create a store, rehydrating the last known identity from `storage`.
    ///
    /// The store starts `Uninitialized` whatever the blob says, so guards
    /// show a placeholder until [`SessionStore::fetch_user`] resolves.
    pub async fn new(backend: Arc<dyn Backend>, storage: Arc<dyn LocalStorage>) -> Self {
        let identity = rehydrate(storage.as_ref()).await;
        if let Some(identity) = &identity {
            tracing::debug!(user_id = %identity.id, "Rehydrated identity from local storage");
        }

        Self {
            profiles: ProfileRepository::new(backend.clone()),
            backend,
            storage,
            inner: RwLock::new(Inner {
                identity,
                phase: SessionPhase::Uninitialized,
            }),
        }
    }

    pub async fn snapshot(&self) -> AuthContext {
        let inner = self.inner.read().await;
        AuthContext::new(inner.identity.clone(), inner.phase)
    }

    pub async fn identity(&self) -> Option<Identity> {
        self.inner.read().await.identity.clone()
    }

    pub async fn phase(&self) -> SessionPhase {
        self.inner.read().await.phase
    }

    /// Replace the identity directly; `None` signs out locally only
    pub async fn set_user(&self, identity: Option<Identity>) -> Result<AuthContext, AuthError> {
        let event = match identity {
            Some(_) => SessionEvent::SignIn,
            None => SessionEvent::SignOut,
        };
        self.apply(event, |current| *current = identity).await
    }

    /// Password sign-in.
    ///
    /// Looks up the profile role and creates a `user` profile when none
    /// exists. A bootstrap still in flight is superseded.
    pub async fn sign_in(&self, email: &str, password: &str) -> Result<Identity, AuthError> {
        self.ensure_live().await?;

        let session = self
            .backend
            .sign_in_with_password(email, password)
            .await
            .map_err(|e| {
                tracing::warn!(error = %e, "Sign-in rejected");
                AuthError::from(e)
            })?;

        let user_id = session.user.id;
        let email = session.user.email.clone().ok_or(AuthError::MissingEmail)?;

        let role = match self
            .profiles
            .find_role(user_id)
            .await
            .map_err(AuthError::ProfileLoad)?
        {
            Some(role) => role,
            None => self
                .profiles
                .create(user_id, Role::User)
                .await
                .map_err(AuthError::ProfileCreate)?,
        };

        let identity = Identity::new(user_id, email, role);
        let signed_in = identity.clone();
        self.apply(SessionEvent::SignIn, |current| *current = Some(signed_in))
            .await?;

        tracing::info!(user_id = %identity.id, role = %identity.role, "User signed in");
        Ok(identity)
    }

    /// Sign out.
    ///
    /// The identity is cleared even when the backend call fails; that
    /// failure is returned afterwards.
    pub async fn sign_out(&self) -> Result<(), AuthError> {
        self.ensure_live().await?;

        let result = self.backend.sign_out().await;
        self.apply(SessionEvent::SignOut, |current| *current = None)
            .await?;

        match result {
            Ok(()) => {
                tracing::info!("User signed out");
                Ok(())
            }
            Err(e) => {
                tracing::warn!(error = %e, "Backend sign-out failed; identity cleared locally");
                Err(AuthError::SignOut(e))
            }
        }
    }

    /// Bootstrap from an existing backend session.
    ///
    /// A missing profile defaults the role to `user` without creating one.
    /// A failed profile lookup resolves loading, keeps the identity, and is
    /// returned as `ProfileLoad`.
    pub async fn fetch_user(&self) -> Result<Option<Identity>, AuthError> {
        {
            let mut inner = self.inner.write().await;
            if inner.phase == SessionPhase::Loading {
                tracing::debug!("Session bootstrap already in progress");
                return Ok(inner.identity.clone());
            }
            let snapshot = transition(&mut inner, SessionEvent::Fetch, |_| {})?;
            self.persist(&snapshot).await;
        }

        let session = match self.backend.get_session().await {
            Ok(session) => session,
            Err(e) => {
                tracing::warn!(error = %e, "Session lookup failed; treating as no session");
                None
            }
        };

        let Some(session) = session else {
            self.resolve(SessionEvent::NoSession, |current| *current = None)
                .await?;
            tracing::debug!("No active session");
            return Ok(None);
        };

        match self.lookup_identity(&session).await {
            Ok(identity) => {
                let found = identity.clone();
                let applied = self
                    .resolve(SessionEvent::SessionFound, |current| *current = Some(found))
                    .await?;
                if applied {
                    tracing::info!(
                        user_id = %identity.id,
                        role = %identity.role,
                        "Session restored"
                    );
                }
                Ok(self.identity().await)
            }
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    user_id = %session.user.id,
                    "Profile lookup failed during bootstrap"
                );
                self.resolve(SessionEvent::LookupFailed, |_| {}).await?;
                Err(e)
            }
        }
    }

    /// Terminal teardown: clears memory and removes the persisted blob
    pub async fn destroy(&self) -> Result<(), AuthError> {
        let mut inner = self.inner.write().await;
        if inner.phase.is_terminal() {
            return Ok(());
        }
        inner.phase =
            SessionStateMachine::transition(inner.phase, SessionEvent::Destroy, None)?;
        inner.identity = None;

        if let Err(e) = self.storage.remove(AUTH_STORAGE_KEY).await {
            tracing::warn!(error = %e, "Failed to remove persisted auth state");
        }
        drop(inner);
        tracing::debug!("Session store destroyed");
        Ok(())
    }

    async fn lookup_identity(&self, session: &Session) -> Result<Identity, AuthError> {
        let email = session.user.email.clone().ok_or(AuthError::MissingEmail)?;
        let role = self
            .profiles
            .find_role(session.user.id)
            .await
            .map_err(AuthError::ProfileLoad)?
            .unwrap_or_default();
        Ok(Identity::new(session.user.id, email, role))
    }

    async fn ensure_live(&self) -> Result<(), AuthError> {
        if self.phase().await.is_terminal() {
            return Err(AuthError::SessionDestroyed);
        }
        Ok(())
    }

    async fn apply(
        &self,
        event: SessionEvent,
        update: impl FnOnce(&mut Option<Identity>),
    ) -> Result<AuthContext, AuthError> {
        let mut inner = self.inner.write().await;
        let snapshot = transition(&mut inner, event, update)?;
        self.persist(&snapshot).await;
        Ok(snapshot)
    }

    /// Apply a bootstrap result if the store is still `Loading`.
    /// Returns false when the result was superseded.
    async fn resolve(
        &self,
        event: SessionEvent,
        update: impl FnOnce(&mut Option<Identity>),
    ) -> Result<bool, AuthError> {
        let mut inner = self.inner.write().await;
        if inner.phase.is_terminal() {
            return Err(AuthError::SessionDestroyed);
        }
        if inner.phase != SessionPhase::Loading {
            tracing::debug!(phase = %inner.phase, event = %event, "Bootstrap result superseded");
            return Ok(false);
        }
        let snapshot = transition(&mut inner, event, update)?;
        self.persist(&snapshot).await;
        Ok(true)
    }

    /// Write `snapshot` through to storage; callers hold the state lock
    async fn persist(&self, snapshot: &AuthContext) {
        let blob = PersistedAuthState::new(snapshot.identity.clone(), snapshot.loading());
        let result = match blob.to_json() {
            Ok(json) => self.storage.set(AUTH_STORAGE_KEY, &json).await,
            Err(e) => Err(e),
        };
        if let Err(e) = result {
            tracing::warn!(error = %e, "Failed to persist auth state");
        }
    }
}

fn transition(
    inner: &mut Inner,
    event: SessionEvent,
    update: impl FnOnce(&mut Option<Identity>),
) -> Result<AuthContext, AuthError> {
    let context = SessionGuardContext {
        has_identity: inner.identity.is_some(),
    };
    let next = SessionStateMachine::transition(inner.phase, event, Some(&context))?;
    update(&mut inner.identity);
    tracing::trace!(from = %inner.phase, to = %next, event = %event, "Session transition");
    inner.phase = next;
    Ok(AuthContext::new(inner.identity.clone(), next))
}

async fn rehydrate(storage: &dyn LocalStorage) -> Option<Identity> {
    let raw = match storage.get(AUTH_STORAGE_KEY).await {
        Ok(raw) => raw?,
        Err(e) => {
            tracing::warn!(error = %e, "Failed to read persisted auth state");
            return None;
        }
    };
    match PersistedAuthState::from_json(&raw) {
        Ok(blob) => blob.and_then(|b| b.state.user),
        Err(e) => {
            tracing::warn!(error = %e, "Ignoring corrupt persisted auth state");
            None
        }
    }
}
