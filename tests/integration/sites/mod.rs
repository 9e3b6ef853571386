//! Admin site management

use sitedesk_app::{LoginPortal, Notice};
use sitedesk_backend::Relation;
use sitedesk_sites::{SitePatch, DEFAULT_CENTER};
use uuid::Uuid;

use crate::common::{TestApp, PASSWORD};

async fn signed_in_admin() -> TestApp {
    let t = TestApp::new().await;
    t.admin("ops@x.com", None);
    t.app
        .login(LoginPortal::Admin, "ops@x.com", PASSWORD)
        .await
        .unwrap();
    t
}

#[tokio::test]
async fn test_admin_lists_sites() {
    let t = signed_in_admin().await;
    t.site("Alpha", Some((27.7, 85.3)));
    t.site("Beta", None);

    let sites = t.app.sites().await.unwrap();

    let mut names: Vec<_> = sites.iter().map(|s| s.name.as_str()).collect();
    names.sort();
    assert_eq!(names, vec!["Alpha", "Beta"]);
}

#[tokio::test]
async fn test_user_cannot_list_sites() {
    let t = TestApp::new().await;
    t.user("field@x.com");
    t.site("Alpha", None);
    t.app
        .login(LoginPortal::User, "field@x.com", PASSWORD)
        .await
        .unwrap();

    assert!(t.app.sites().await.unwrap_err().is_error());
    assert!(t.app.notifications().await.is_err());
}

#[tokio::test]
async fn test_site_details_loads_devices_and_routes() {
    let t = signed_in_admin().await;
    let alpha = t.site("Alpha", Some((27.7, 85.3)));
    let beta = t.site("Beta", None);
    t.device(alpha, "core-rtr", "10.0.0.1");
    t.device(beta, "edge-rtr", "10.0.1.1");
    t.fiber_route(alpha, "Alpha to Beta");

    let details = t.app.site_details(&alpha.to_string()).await.unwrap();

    assert_eq!(details.site.name, "Alpha");
    assert_eq!(details.devices.len(), 1);
    assert_eq!(details.devices[0].name, "core-rtr");
    assert_eq!(details.fiber_routes.len(), 1);
    assert_eq!(details.fiber_routes[0].description, "Alpha to Beta");
}

#[tokio::test]
async fn test_site_details_failures_name_the_part_that_failed() {
    let t = signed_in_admin().await;
    let alpha = t.site("Alpha", None);

    t.backend.fail_relation(Relation::FiberRoutes, "timeout");
    let err = t.app.site_details(&alpha.to_string()).await.unwrap_err();
    assert_eq!(err, Notice::error("Failed to load fiber routes"));

    t.backend.fail_relation(Relation::NetworkDevices, "timeout");
    let err = t.app.site_details(&alpha.to_string()).await.unwrap_err();
    assert_eq!(err.message, "Failed to load network devices");

    t.backend.clear_failures();
    let err = t
        .app
        .site_details(&Uuid::new_v4().to_string())
        .await
        .unwrap_err();
    assert_eq!(err.message, "Failed to load site details");

    let err = t.app.site_details("not-a-uuid").await.unwrap_err();
    assert_eq!(err.message, "Failed to load site details");
}

#[tokio::test]
async fn test_update_and_delete_site() {
    let t = signed_in_admin().await;
    let alpha = t.site("Alpha", None);

    let patch = SitePatch {
        latitude: Some(26.45),
        longitude: Some(87.27),
        ..Default::default()
    };
    let updated = t.app.update_site(alpha, &patch).await.unwrap();
    assert_eq!(updated.coordinates(), Some((26.45, 87.27)));

    let notice = t.app.delete_site(alpha).await.unwrap();
    assert_eq!(notice, Notice::success("Site deleted successfully"));
    assert!(t.app.sites().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_failed_delete_keeps_site() {
    let t = signed_in_admin().await;
    let alpha = t.site("Alpha", None);
    t.backend.fail_relation(Relation::Sites, "permission denied");

    let err = t.app.delete_site(alpha).await.unwrap_err();
    assert_eq!(err, Notice::error("Failed to delete site"));

    t.backend.clear_failures();
    assert_eq!(t.app.sites().await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_site_map_for_any_signed_in_user() {
    let t = TestApp::new().await;
    t.user("field@x.com");
    t.app
        .login(LoginPortal::User, "field@x.com", PASSWORD)
        .await
        .unwrap();

    let empty = t.app.site_map().await.unwrap();
    assert!(empty.markers.is_empty());
    assert_eq!(empty.center, DEFAULT_CENTER);
    assert_eq!(empty.zoom, 10);

    t.site("Dharan", Some((26.81, 87.28)));
    t.site("No GPS", None);

    let map = t.app.site_map().await.unwrap();
    assert_eq!(map.markers.len(), 1);
    assert_eq!(map.center, (26.81, 87.28));
}
