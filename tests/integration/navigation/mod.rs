//! Route guarding across the session lifecycle

use sitedesk_app::{LoginPortal, Navigation, Route};

use crate::common::{TestApp, PASSWORD};

#[tokio::test]
async fn test_protected_routes_wait_for_bootstrap() {
    let t = TestApp::new().await;
    t.user("field@x.com");
    t.app.session().sign_in("field@x.com", PASSWORD).await.unwrap();

    // A restarted client has the user rehydrated but has not checked the
    // backend yet: nothing redirects, whatever the role
    let restarted = t.restart().await;
    assert!(restarted.session().identity().await.is_some());
    for (path, route) in [
        ("/admin", Route::AdminDashboard),
        ("/dashboard", Route::UserDashboard),
        ("/site-map", Route::SiteMap),
    ] {
        assert_eq!(
            restarted.open(path).await,
            Navigation::Placeholder { route },
            "path {}",
            path
        );
    }
}

#[tokio::test]
async fn test_user_role_on_admin_route_redirects_to_landing() {
    let t = TestApp::new().await;
    t.user("field@x.com");
    t.app
        .login(LoginPortal::User, "field@x.com", PASSWORD)
        .await
        .unwrap();

    // `/admin` redirects to `/`, which forwards to the user login
    assert_eq!(t.app.open("/admin").await.route(), &Route::UserLogin);
    assert_eq!(
        t.app.open("/admin/sites/abc").await.route(),
        &Route::UserLogin
    );
    assert_eq!(t.app.open("/dashboard").await.route(), &Route::UserDashboard);
}

#[tokio::test]
async fn test_admin_routes() {
    let t = TestApp::new().await;
    t.admin("ops@x.com", None);

    let nav = t
        .app
        .login(LoginPortal::Admin, "ops@x.com", PASSWORD)
        .await
        .unwrap();

    assert_eq!(
        nav,
        Navigation::Render {
            route: Route::AdminDashboard
        }
    );
    assert_eq!(
        t.app.open("/admin/sites/s-1").await.route(),
        &Route::SiteDetails {
            site_id: "s-1".to_string()
        }
    );
    assert_eq!(t.app.open("/site-images").await.route(), &Route::SiteImages);
    // Dashboards are role-exact
    assert_eq!(t.app.open("/dashboard").await.route(), &Route::UserLogin);
}

#[tokio::test]
async fn test_anonymous_after_bootstrap_is_sent_to_login() {
    let t = TestApp::new().await;
    t.app.bootstrap().await;

    assert_eq!(t.app.open("/site-map").await.route(), &Route::UserLogin);
    assert_eq!(t.app.open("/").await.route(), &Route::UserLogin);
    assert_eq!(
        t.app.open("/admin/login").await.route(),
        &Route::AdminLogin
    );
}

#[tokio::test]
async fn test_unknown_path_renders_not_found() {
    let t = TestApp::new().await;
    t.app.bootstrap().await;

    assert_eq!(
        t.app.open("/reports").await,
        Navigation::Render {
            route: Route::NotFound {
                path: "/reports".to_string()
            }
        }
    );
}
