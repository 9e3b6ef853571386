//! Fiber route repository

use std::sync::Arc;

use sitedesk_backend::{Backend, Relation, Select};
use sitedesk_common::Result;
use uuid::Uuid;

use super::decode_valid;
use crate::domain::entities::FiberRoute;

#[derive(Clone)]
pub struct FiberRouteRepository {
    backend: Arc<dyn Backend>,
}

impl FiberRouteRepository {
    pub fn new(backend: Arc<dyn Backend>) -> Self {
        Self { backend }
    }

    pub async fn list_for_site(&self, site_id: Uuid) -> Result<Vec<FiberRoute>> {
        let rows = self
            .backend
            .select(Select::from(Relation::FiberRoutes).eq("site_id", site_id.to_string()))
            .await?;
        decode_valid(Relation::FiberRoutes, rows)
    }
}
