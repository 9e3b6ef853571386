//! Site repository

use std::sync::Arc;

use sitedesk_backend::query::maybe_single;
use sitedesk_backend::{Backend, Filter, Relation, Select};
use sitedesk_common::{Error, Result};
use uuid::Uuid;
use validator::Validate;

use super::{decode_one, decode_valid};
use crate::domain::entities::{Site, SitePatch};

#[derive(Clone)]
pub struct SiteRepository {
    backend: Arc<dyn Backend>,
}

impl SiteRepository {
    pub fn new(backend: Arc<dyn Backend>) -> Self {
        Self { backend }
    }

    /// List every site
    pub async fn list(&self) -> Result<Vec<Site>> {
        let rows = self.backend.select(Select::from(Relation::Sites)).await?;
        decode_valid(Relation::Sites, rows)
    }

    /// Sites that can be placed on the map
    pub async fn list_with_coordinates(&self) -> Result<Vec<Site>> {
        let rows = self
            .backend
            .select(Select::from(Relation::Sites).columns("id,name,location,latitude,longitude"))
            .await?;
        let sites: Vec<Site> = decode_valid(Relation::Sites, rows)?;
        Ok(sites
            .into_iter()
            .filter(|s| s.coordinates().is_some())
            .collect())
    }

    /// Find site by ID
    pub async fn get(&self, site_id: Uuid) -> Result<Site> {
        let rows = self
            .backend
            .select(Select::from(Relation::Sites).eq("id", site_id.to_string()))
            .await?;
        match maybe_single(Relation::Sites, rows)? {
            Some(found) => decode_one(Relation::Sites, found),
            None => Err(Error::NotFound(format!("Site {} not found", site_id))),
        }
    }

    /// Apply a partial update and return the stored site
    pub async fn update(&self, site_id: Uuid, patch: &SitePatch) -> Result<Site> {
        patch
            .validate()
            .map_err(|e| Error::Validation(format!("Invalid site update: {}", e)))?;
        if patch.is_empty() {
            return self.get(site_id).await;
        }

        let values = match serde_json::to_value(patch)? {
            serde_json::Value::Object(map) => map,
            _ => return Err(Error::Internal("site patch is not an object".to_string())),
        };
        let rows = self
            .backend
            .update(
                Relation::Sites,
                values,
                vec![Filter::eq("id", site_id.to_string())],
            )
            .await?;

        match maybe_single(Relation::Sites, rows)? {
            Some(updated) => {
                tracing::info!(site_id = %site_id, "Site updated");
                decode_one(Relation::Sites, updated)
            }
            None => Err(Error::NotFound(format!("Site {} not found", site_id))),
        }
    }

    pub async fn delete(&self, site_id: Uuid) -> Result<()> {
        self.backend
            .delete(Relation::Sites, vec![Filter::eq("id", site_id.to_string())])
            .await?;
        tracing::info!(site_id = %site_id, "Site deleted");
        Ok(())
    }
}
