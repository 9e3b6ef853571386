//! SiteDesk application composition root
//!
//! Wires the backend, session store, site repositories and push service
//! into an [`App`] that the command-line client and the integration tests
//! drive. Every view operation is checked against the route it belongs to
//! before any data is loaded.

pub mod cli;
pub mod login;
pub mod notice;
pub mod routes;

use std::sync::Arc;

use sitedesk_auth::{AuthContext, FileStorage, LocalStorage, ProfileRepository, SessionStore};
use sitedesk_backend::{Backend, BackendConfig, BackendFactory, ChangeEvent, Relation};
use sitedesk_common::Config;
use sitedesk_push::{PushConfig, PushService, PushServiceFactory};
use sitedesk_sites::{
    notify_admins, Notification, Site, SiteDetails, SiteMap, SitePatch, SitesRepositories, Task,
};
use tokio::sync::broadcast;
use uuid::Uuid;

pub use login::{LoginPortal, LOGIN_FAILED_MESSAGE};
pub use notice::{Notice, NoticeLevel};
pub use routes::{navigate, Navigation, Route};

/// File the Supabase client keeps its session in, under the storage dir
const SESSION_FILE: &str = "supabase-session.json";

/// Create the application from configuration
pub async fn create_app(config: &Config) -> Result<App, anyhow::Error> {
    let mut backend_config = BackendConfig::from_env()?;
    if backend_config.session_path.is_none() {
        backend_config.session_path = Some(config.storage_dir.join(SESSION_FILE));
    }
    let backend = BackendFactory::create(backend_config)?;

    let push_config = PushConfig::from_env()?;
    let push: Arc<dyn PushService> = Arc::from(PushServiceFactory::create(push_config)?);

    let storage: Arc<dyn LocalStorage> = Arc::new(FileStorage::new(config.storage_dir.clone()));

    Ok(App::new(backend, storage, push).await)
}

pub struct App {
    backend: Arc<dyn Backend>,
    session: SessionStore,
    repos: SitesRepositories,
    profiles: ProfileRepository,
    push: Arc<dyn PushService>,
}

impl App {
    pub async fn new(
        backend: Arc<dyn Backend>,
        storage: Arc<dyn LocalStorage>,
        push: Arc<dyn PushService>,
    ) -> Self {
        Self {
            session: SessionStore::new(backend.clone(), storage).await,
            repos: SitesRepositories::new(backend.clone()),
            profiles: ProfileRepository::new(backend.clone()),
            push,
            backend,
        }
    }

    pub fn session(&self) -> &SessionStore {
        &self.session
    }

    /// Change events for `relation`; views refetch when one arrives
    pub fn subscribe(&self, relation: Relation) -> broadcast::Receiver<ChangeEvent> {
        self.backend.subscribe(relation)
    }

    /// Run session bootstrap. Failures are logged; the store always ends
    /// resolved.
    pub async fn bootstrap(&self) -> AuthContext {
        if let Err(e) = self.session.fetch_user().await {
            tracing::warn!(error = %e, "Session bootstrap finished with an error");
        }
        self.session.snapshot().await
    }

    pub async fn open(&self, path: &str) -> Navigation {
        navigate(&self.session.snapshot().await, path)
    }

    /// Sign in through a portal and navigate to its landing page
    pub async fn login(
        &self,
        portal: LoginPortal,
        email: &str,
        password: &str,
    ) -> Result<Navigation, Notice> {
        match self.session.sign_in(email, password).await {
            Ok(identity) => {
                tracing::info!(user_id = %identity.id, portal = ?portal, "Login succeeded");
                Ok(self.open(portal.landing_path()).await)
            }
            Err(e) => {
                tracing::warn!(error = %e, portal = ?portal, "Login failed");
                Err(Notice::error(LOGIN_FAILED_MESSAGE))
            }
        }
    }

    /// Sign out and return to the user login
    pub async fn logout(&self) -> Navigation {
        if let Err(e) = self.session.sign_out().await {
            tracing::warn!(error = %e, "Sign-out reported an error");
        }
        self.open(routes::USER_LOGIN_PATH).await
    }

    async fn authorize(&self, route: Route) -> Result<(), Notice> {
        let path = route.path();
        match self.open(&path).await {
            Navigation::Render { route: landed } if landed == route => Ok(()),
            Navigation::Placeholder { .. } => Err(Notice::error("Loading...")),
            Navigation::Render { .. } => {
                tracing::debug!(path = %path, "Not authorized for view");
                Err(Notice::error("Please sign in to continue"))
            }
        }
    }

    pub async fn sites(&self) -> Result<Vec<Site>, Notice> {
        self.authorize(Route::AdminDashboard).await?;
        self.repos.sites.list().await.map_err(|e| {
            tracing::error!(error = %e, "Error loading sites");
            Notice::error("Failed to load sites")
        })
    }

    pub async fn site_map(&self) -> Result<SiteMap, Notice> {
        self.authorize(Route::SiteMap).await?;
        let sites = self.repos.sites.list_with_coordinates().await.map_err(|e| {
            tracing::error!(error = %e, "Error loading sites");
            Notice::error("Failed to load sites")
        })?;
        Ok(SiteMap::from_sites(&sites))
    }

    pub async fn site_details(&self, site_id: &str) -> Result<SiteDetails, Notice> {
        self.authorize(Route::SiteDetails {
            site_id: site_id.to_string(),
        })
        .await?;

        let site_id = Uuid::parse_str(site_id).map_err(|e| {
            tracing::warn!(error = %e, site_id, "Malformed site id");
            Notice::error("Failed to load site details")
        })?;
        self.repos
            .load_details(site_id)
            .await
            .map_err(|e| Notice::error(e.to_string()))
    }

    pub async fn update_site(&self, site_id: Uuid, patch: &SitePatch) -> Result<Site, Notice> {
        self.authorize(Route::SiteDetails {
            site_id: site_id.to_string(),
        })
        .await?;
        self.repos.sites.update(site_id, patch).await.map_err(|e| {
            tracing::error!(error = %e, site_id = %site_id, "Error updating site");
            match e {
                sitedesk_common::Error::Validation(_) => Notice::from(e),
                _ => Notice::error("Failed to update site"),
            }
        })
    }

    pub async fn delete_site(&self, site_id: Uuid) -> Result<Notice, Notice> {
        self.authorize(Route::SiteDetails {
            site_id: site_id.to_string(),
        })
        .await?;
        match self.repos.sites.delete(site_id).await {
            Ok(()) => Ok(Notice::success("Site deleted successfully")),
            Err(e) => {
                tracing::error!(error = %e, site_id = %site_id, "Error deleting site");
                Err(Notice::error("Failed to delete site"))
            }
        }
    }

    pub async fn tasks(&self) -> Result<Vec<Task>, Notice> {
        self.authorize(Route::UserDashboard).await?;
        self.repos.tasks.list_with_site().await.map_err(|e| {
            tracing::error!(error = %e, "Error loading tasks");
            Notice::error("Failed to load tasks")
        })
    }

    /// Toggle a task and return the reloaded list. Completing a task also
    /// pushes the completion notice to admins.
    pub async fn set_task_completed(
        &self,
        task_id: Uuid,
        completed: bool,
    ) -> Result<Vec<Task>, Notice> {
        self.authorize(Route::UserDashboard).await?;
        let update = self
            .repos
            .tasks
            .set_completed(task_id, completed)
            .await
            .map_err(|e| {
                tracing::error!(error = %e, task_id = %task_id, "Error updating task");
                Notice::error("Failed to update task")
            })?;

        if let Some(notice) = &update.notice {
            notify_admins(
                &self.profiles,
                self.push.as_ref(),
                &notice.title,
                &notice.message,
            )
            .await;
        }
        Ok(update.tasks)
    }

    pub async fn notifications(&self) -> Result<Vec<Notification>, Notice> {
        self.authorize(Route::AdminDashboard).await?;
        self.repos.notifications.list().await.map_err(|e| {
            tracing::error!(error = %e, "Error loading notifications");
            Notice::error("Failed to load notifications")
        })
    }
}
