//! Network device repository

use std::sync::Arc;

use sitedesk_backend::{Backend, Relation, Select};
use sitedesk_common::Result;
use uuid::Uuid;

use super::decode_valid;
use crate::domain::entities::NetworkDevice;

#[derive(Clone)]
pub struct NetworkDeviceRepository {
    backend: Arc<dyn Backend>,
}

impl NetworkDeviceRepository {
    pub fn new(backend: Arc<dyn Backend>) -> Self {
        Self { backend }
    }

    /// Devices installed at a site
    pub async fn list_for_site(&self, site_id: Uuid) -> Result<Vec<NetworkDevice>> {
        let rows = self
            .backend
            .select(Select::from(Relation::NetworkDevices).eq("site_id", site_id.to_string()))
            .await?;
        decode_valid(Relation::NetworkDevices, rows)
    }
}
