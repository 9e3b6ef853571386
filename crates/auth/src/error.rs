//! Authentication errors

use sitedesk_backend::BackendError;

use crate::state::StateError;

/// Authentication error
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum AuthError {
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Session user has no email address")]
    MissingEmail,

    #[error("Failed to load profile: {0}")]
    ProfileLoad(BackendError),

    #[error("Failed to create profile: {0}")]
    ProfileCreate(BackendError),

    #[error("Authentication backend error: {0}")]
    Backend(BackendError),

    #[error("Backend sign-out failed: {0}")]
    SignOut(BackendError),

    #[error("Session store has been destroyed")]
    SessionDestroyed,

    #[error("Session state error: {0}")]
    State(StateError),
}

impl AuthError {
    /// Message safe to show the user; backend detail stays in the logs
    pub fn user_message(&self) -> &'static str {
        match self {
            AuthError::InvalidCredentials => "Invalid credentials",
            AuthError::SessionDestroyed => "Your session has ended",
            AuthError::SignOut(_) => "Signed out locally, but the server could not be reached",
            AuthError::MissingEmail
            | AuthError::ProfileLoad(_)
            | AuthError::ProfileCreate(_)
            | AuthError::Backend(_)
            | AuthError::State(_) => "Something went wrong. Please try again.",
        }
    }
}

impl From<BackendError> for AuthError {
    fn from(err: BackendError) -> Self {
        match err {
            BackendError::InvalidCredentials => AuthError::InvalidCredentials,
            other => AuthError::Backend(other),
        }
    }
}

impl From<StateError> for AuthError {
    fn from(err: StateError) -> Self {
        match err {
            StateError::TerminalState(_) => AuthError::SessionDestroyed,
            other => AuthError::State(other),
        }
    }
}

impl From<AuthError> for sitedesk_common::Error {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::InvalidCredentials => {
                sitedesk_common::Error::Authentication(err.to_string())
            }
            AuthError::SessionDestroyed | AuthError::MissingEmail | AuthError::State(_) => {
                sitedesk_common::Error::Internal(err.to_string())
            }
            other => sitedesk_common::Error::Query(other.to_string()),
        }
    }
}
