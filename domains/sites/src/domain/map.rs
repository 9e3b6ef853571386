//! Site map view model

use serde::Serialize;
use uuid::Uuid;

use super::entities::Site;

/// Map center used when no site has coordinates (Kathmandu)
pub const DEFAULT_CENTER: (f64, f64) = (27.7172, 85.3240);

pub const DEFAULT_ZOOM: u8 = 10;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SiteMarker {
    pub site_id: Uuid,
    pub name: String,
    pub location: String,
    pub latitude: f64,
    pub longitude: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SiteMap {
    pub markers: Vec<SiteMarker>,
    pub center: (f64, f64),
    pub zoom: u8,
}

impl SiteMap {
    /// One marker per site with both coordinates, centered on the first
    pub fn from_sites(sites: &[Site]) -> Self {
        let markers: Vec<SiteMarker> = sites
            .iter()
            .filter_map(|site| {
                let (latitude, longitude) = site.coordinates()?;
                Some(SiteMarker {
                    site_id: site.id,
                    name: site.name.clone(),
                    location: site.location.clone(),
                    latitude,
                    longitude,
                })
            })
            .collect();

        let center = markers
            .first()
            .map(|m| (m.latitude, m.longitude))
            .unwrap_or(DEFAULT_CENTER);

        Self {
            markers,
            center,
            zoom: DEFAULT_ZOOM,
        }
    }
}
