//! Access-token claims

use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};

use crate::BackendError;

/// JWT claims carried by a Supabase access token
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SupabaseClaims {
    /// Subject (user ID)
    pub sub: String,
    /// Email
    pub email: Option<String>,
    /// Issued at
    #[serde(default)]
    pub iat: Option<u64>,
    /// Expires at
    pub exp: u64,
    /// Audience
    pub aud: String,
    /// Role (authenticated user)
    pub role: String,
}

/// Read the claims of an access token without verifying its signature.
///
/// The client never holds the project's JWT secret; the token was issued to
/// us over TLS and is only inspected for its expiry.
pub(crate) fn read_unverified_claims(token: &str) -> Result<SupabaseClaims, BackendError> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.insecure_disable_signature_validation();
    validation.validate_aud = false;
    validation.validate_exp = false;
    validation.required_spec_claims.clear();

    let token_data = decode::<SupabaseClaims>(token, &DecodingKey::from_secret(&[]), &validation)
        .map_err(|e| {
            tracing::debug!(error = %e, "Access token claims unreadable");
            BackendError::Decode(format!("access token: {}", e))
        })?;

    Ok(token_data.claims)
}
