//! Repository implementations for the Sites domain

pub mod devices;
pub mod fiber_routes;
pub mod notifications;
pub mod sites;
pub mod tasks;

use std::sync::Arc;

use serde::de::DeserializeOwned;
use sitedesk_backend::query::decode_rows;
use sitedesk_backend::{Backend, Relation, Row};
use sitedesk_common::{Error, Result};
use validator::Validate;

pub use devices::NetworkDeviceRepository;
pub use fiber_routes::FiberRouteRepository;
pub use notifications::NotificationRepository;
pub use sites::SiteRepository;
pub use tasks::TaskRepository;

/// Combined repository access for the Sites domain
#[derive(Clone)]
pub struct SitesRepositories {
    pub sites: SiteRepository,
    pub devices: NetworkDeviceRepository,
    pub fiber_routes: FiberRouteRepository,
    pub tasks: TaskRepository,
    pub notifications: NotificationRepository,
}

impl SitesRepositories {
    pub fn new(backend: Arc<dyn Backend>) -> Self {
        Self {
            sites: SiteRepository::new(backend.clone()),
            devices: NetworkDeviceRepository::new(backend.clone()),
            fiber_routes: FiberRouteRepository::new(backend.clone()),
            tasks: TaskRepository::new(backend.clone()),
            notifications: NotificationRepository::new(backend),
        }
    }
}

/// Decode rows and validate each record; either failure is a query error
pub(crate) fn decode_valid<T>(relation: Relation, rows: Vec<Row>) -> Result<Vec<T>>
where
    T: DeserializeOwned + Validate,
{
    let records: Vec<T> = decode_rows(relation, rows)?;
    for record in &records {
        record.validate().map_err(|e| {
            tracing::warn!(error = %e, relation = %relation, "Invalid row from backend");
            Error::Query(format!("Invalid {} row: {}", relation, e))
        })?;
    }
    Ok(records)
}

pub(crate) fn decode_one<T>(relation: Relation, row: Row) -> Result<T>
where
    T: DeserializeOwned + Validate,
{
    let mut records = decode_valid(relation, vec![row])?;
    records
        .pop()
        .ok_or_else(|| Error::Internal(format!("decoded no {} row", relation)))
}
