//! Route table and navigation
//!
//! Paths resolve to a [`Route`]; protected routes are checked with the
//! session's [`AuthContext`]. Redirects are followed until a route renders
//! or the guard asks for a placeholder.

use serde::Serialize;
use sitedesk_auth::{AuthContext, GuardDecision, Role, RouteGuard};

pub const ADMIN_LOGIN_PATH: &str = "/admin/login";
pub const USER_LOGIN_PATH: &str = "/user/login";
pub const ADMIN_DASHBOARD_PATH: &str = "/admin";
pub const USER_DASHBOARD_PATH: &str = "/dashboard";
pub const SITE_IMAGES_PATH: &str = "/site-images";
pub const SITE_MAP_PATH: &str = "/site-map";

const SITE_DETAILS_PREFIX: &str = "/admin/sites/";

/// Redirect hops followed before giving up
const MAX_REDIRECTS: usize = 4;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "view", rename_all = "snake_case")]
pub enum Route {
    /// `/`, always redirects to the user login
    Landing,
    AdminLogin,
    UserLogin,
    AdminDashboard,
    UserDashboard,
    SiteImages,
    SiteMap,
    SiteDetails { site_id: String },
    NotFound { path: String },
}

impl Route {
    pub fn resolve(path: &str) -> Self {
        let trimmed = path.split(['?', '#']).next().unwrap_or_default();
        let normalized = match trimmed.trim_end_matches('/') {
            "" => "/",
            p => p,
        };

        match normalized {
            "/" => Route::Landing,
            ADMIN_LOGIN_PATH => Route::AdminLogin,
            USER_LOGIN_PATH => Route::UserLogin,
            ADMIN_DASHBOARD_PATH => Route::AdminDashboard,
            USER_DASHBOARD_PATH => Route::UserDashboard,
            SITE_IMAGES_PATH => Route::SiteImages,
            SITE_MAP_PATH => Route::SiteMap,
            p => match p.strip_prefix(SITE_DETAILS_PREFIX) {
                Some(id) if !id.is_empty() && !id.contains('/') => Route::SiteDetails {
                    site_id: id.to_string(),
                },
                _ => Route::NotFound {
                    path: path.to_string(),
                },
            },
        }
    }

    pub fn path(&self) -> String {
        match self {
            Route::Landing => "/".to_string(),
            Route::AdminLogin => ADMIN_LOGIN_PATH.to_string(),
            Route::UserLogin => USER_LOGIN_PATH.to_string(),
            Route::AdminDashboard => ADMIN_DASHBOARD_PATH.to_string(),
            Route::UserDashboard => USER_DASHBOARD_PATH.to_string(),
            Route::SiteImages => SITE_IMAGES_PATH.to_string(),
            Route::SiteMap => SITE_MAP_PATH.to_string(),
            Route::SiteDetails { site_id } => format!("{}{}", SITE_DETAILS_PREFIX, site_id),
            Route::NotFound { path } => path.clone(),
        }
    }

    /// Guard for protected routes; `None` for public ones
    pub fn guard(&self) -> Option<RouteGuard> {
        match self {
            Route::AdminDashboard | Route::SiteDetails { .. } => {
                Some(RouteGuard::role(Role::Admin))
            }
            Route::UserDashboard => Some(RouteGuard::role(Role::User)),
            Route::SiteImages | Route::SiteMap => Some(RouteGuard::authenticated()),
            Route::Landing | Route::AdminLogin | Route::UserLogin | Route::NotFound { .. } => None,
        }
    }
}

/// Where navigation ended up
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum Navigation {
    Render { route: Route },
    /// Session bootstrap has not resolved; show "Loading..."
    Placeholder { route: Route },
}

impl Navigation {
    pub fn route(&self) -> &Route {
        match self {
            Navigation::Render { route } | Navigation::Placeholder { route } => route,
        }
    }

    pub fn is_render(&self) -> bool {
        matches!(self, Navigation::Render { .. })
    }
}

/// Resolve `path` against the route table, following redirects
pub fn navigate(ctx: &AuthContext, path: &str) -> Navigation {
    let mut route = Route::resolve(path);

    for _ in 0..MAX_REDIRECTS {
        let next = match &route {
            Route::Landing => USER_LOGIN_PATH,
            other => match other.guard().map(|g| g.check(ctx)) {
                None | Some(GuardDecision::Render) => return Navigation::Render { route },
                Some(GuardDecision::Placeholder) => return Navigation::Placeholder { route },
                Some(GuardDecision::Redirect(to)) => to,
            },
        };
        tracing::debug!(from = %route.path(), to = next, "Redirect");
        route = Route::resolve(next);
    }

    // Every redirect chain in the table ends at a public login route
    Navigation::Render { route }
}
