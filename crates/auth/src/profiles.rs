//! Profile lookups against the `profiles` relation

use std::sync::Arc;

use serde::Deserialize;
use sitedesk_backend::query::{decode_row, maybe_single, row, single};
use sitedesk_backend::{Backend, BackendError, Relation, Select};
use uuid::Uuid;

use crate::types::Role;

#[derive(Debug, Deserialize)]
struct RoleRow {
    role: Role,
}

#[derive(Debug, Deserialize)]
struct TokenRow {
    fcm_token: Option<String>,
}

/// Reads and creates profile records
#[derive(Clone)]
pub struct ProfileRepository {
    backend: Arc<dyn Backend>,
}

impl ProfileRepository {
    pub fn new(backend: Arc<dyn Backend>) -> Self {
        Self { backend }
    }

    /// Stored role for `user_id`, or `None` when no profile exists
    pub async fn find_role(&self, user_id: Uuid) -> Result<Option<Role>, BackendError> {
        let rows = self
            .backend
            .select(
                Select::from(Relation::Profiles)
                    .columns("role")
                    .eq("id", user_id.to_string()),
            )
            .await?;

        match maybe_single(Relation::Profiles, rows)? {
            Some(found) => {
                let decoded: RoleRow = decode_row(Relation::Profiles, found)?;
                Ok(Some(decoded.role))
            }
            None => Ok(None),
        }
    }

    /// Insert a profile and return the role the backend stored
    pub async fn create(&self, user_id: Uuid, role: Role) -> Result<Role, BackendError> {
        let rows = self
            .backend
            .insert(
                Relation::Profiles,
                vec![row(serde_json::json!({
                    "id": user_id.to_string(),
                    "role": role.as_str(),
                }))],
                "role",
            )
            .await?;

        let created: RoleRow = decode_row(Relation::Profiles, single(Relation::Profiles, rows)?)?;
        tracing::info!(user_id = %user_id, role = %created.role, "Created profile");
        Ok(created.role)
    }

    /// Push tokens of every profile holding `role`; null and empty tokens
    /// are skipped, anything else is passed to the push service as stored
    pub async fn push_tokens_for_role(&self, role: Role) -> Result<Vec<String>, BackendError> {
        let rows = self
            .backend
            .select(
                Select::from(Relation::Profiles)
                    .columns("fcm_token")
                    .eq("role", role.as_str()),
            )
            .await?;

        let mut tokens = Vec::with_capacity(rows.len());
        for found in rows {
            let decoded: TokenRow = decode_row(Relation::Profiles, found)?;
            if let Some(token) = decoded.fcm_token.filter(|t| !t.is_empty()) {
                tokens.push(token);
            }
        }
        Ok(tokens)
    }
}
