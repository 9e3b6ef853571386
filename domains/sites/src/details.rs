//! Site details view: a site with its devices and fiber routes

use serde::Serialize;
use sitedesk_common::Error;
use thiserror::Error;
use uuid::Uuid;

use crate::domain::entities::{FiberRoute, NetworkDevice, Site};
use crate::repository::SitesRepositories;

/// The first load step that failed; `Display` is the user-facing notice
#[derive(Debug, Error)]
pub enum SiteDetailsError {
    #[error("Failed to load site details")]
    Site(#[source] Error),

    #[error("Failed to load network devices")]
    Devices(#[source] Error),

    #[error("Failed to load fiber routes")]
    FiberRoutes(#[source] Error),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SiteDetails {
    pub site: Site,
    pub devices: Vec<NetworkDevice>,
    pub fiber_routes: Vec<FiberRoute>,
}

impl SitesRepositories {
    /// Load a site, then its devices, then its fiber routes; stop at the
    /// first failure
    pub async fn load_details(&self, site_id: Uuid) -> Result<SiteDetails, SiteDetailsError> {
        let site = self.sites.get(site_id).await.map_err(|e| {
            tracing::warn!(error = %e, site_id = %site_id, "Site lookup failed");
            SiteDetailsError::Site(e)
        })?;

        let devices = self.devices.list_for_site(site_id).await.map_err(|e| {
            tracing::warn!(error = %e, site_id = %site_id, "Device lookup failed");
            SiteDetailsError::Devices(e)
        })?;

        let fiber_routes = self.fiber_routes.list_for_site(site_id).await.map_err(|e| {
            tracing::warn!(error = %e, site_id = %site_id, "Fiber route lookup failed");
            SiteDetailsError::FiberRoutes(e)
        })?;

        Ok(SiteDetails {
            site,
            devices,
            fiber_routes,
        })
    }
}
