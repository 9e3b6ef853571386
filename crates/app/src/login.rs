//! Login portals

use serde::Serialize;

use crate::routes::{ADMIN_DASHBOARD_PATH, ADMIN_LOGIN_PATH, USER_DASHBOARD_PATH, USER_LOGIN_PATH};

/// Shown for every failed login, whatever the cause
pub const LOGIN_FAILED_MESSAGE: &str = "Invalid credentials";

/// Which login form was used. The portal only picks the landing page; the
/// role check happens when that page is guarded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LoginPortal {
    Admin,
    User,
}

impl LoginPortal {
    pub fn login_path(&self) -> &'static str {
        match self {
            LoginPortal::Admin => ADMIN_LOGIN_PATH,
            LoginPortal::User => USER_LOGIN_PATH,
        }
    }

    /// Where a successful login navigates
    pub fn landing_path(&self) -> &'static str {
        match self {
            LoginPortal::Admin => ADMIN_DASHBOARD_PATH,
            LoginPortal::User => USER_DASHBOARD_PATH,
        }
    }
}
