//! Sites domain: sites, network devices, fiber routes, tasks, notifications

pub mod details;
pub mod domain;
pub mod notify;
pub mod repository;

// Re-export domain types at the crate root for convenience
pub use details::{SiteDetails, SiteDetailsError};
pub use domain::entities::*;
pub use domain::map::{SiteMap, SiteMarker, DEFAULT_CENTER, DEFAULT_ZOOM};
pub use notify::notify_admins;
pub use repository::tasks::TaskUpdate;
pub use repository::{
    FiberRouteRepository, NetworkDeviceRepository, NotificationRepository, SiteRepository,
    SitesRepositories, TaskRepository,
};
