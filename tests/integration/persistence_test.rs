//! Persisted session state across client restarts
//!
//! Uses the file-backed storage the CLI uses, in a temporary directory.

use std::path::Path;
use std::sync::Arc;

use sitedesk_app::{App, LoginPortal, Navigation, Route};
use sitedesk_auth::{FileStorage, Role, SessionPhase, AUTH_STORAGE_KEY};
use sitedesk_backend::mock::MockBackend;
use sitedesk_push::mock::MockPushService;

async fn app_in(dir: &Path, backend: &MockBackend) -> App {
    App::new(
        Arc::new(backend.clone()),
        Arc::new(FileStorage::new(dir.to_path_buf())),
        Arc::new(MockPushService::new()),
    )
    .await
}

fn stored_blob(dir: &Path) -> serde_json::Value {
    let raw = std::fs::read_to_string(dir.join(format!("{}.json", AUTH_STORAGE_KEY))).unwrap();
    serde_json::from_str(&raw).unwrap()
}

#[test_log::test(tokio::test)]
async fn test_sign_in_is_written_through() {
    let dir = tempfile::tempdir().unwrap();
    let backend = MockBackend::new();
    let id = backend.add_user("admin@x.com", "pw");
    let app = app_in(dir.path(), &backend).await;

    app.login(LoginPortal::User, "admin@x.com", "pw")
        .await
        .unwrap();

    let blob = stored_blob(dir.path());
    assert_eq!(blob["version"], 0);
    assert_eq!(blob["state"]["loading"], false);
    assert_eq!(blob["state"]["user"]["id"], id.to_string());
    assert_eq!(blob["state"]["user"]["email"], "admin@x.com");
    assert_eq!(blob["state"]["user"]["role"], "user");
}

#[test_log::test(tokio::test)]
async fn test_restart_rehydrates_then_revalidates() {
    let dir = tempfile::tempdir().unwrap();
    let backend = MockBackend::new();
    backend.add_user("field@x.com", "pw");
    let first = app_in(dir.path(), &backend).await;
    first
        .login(LoginPortal::User, "field@x.com", "pw")
        .await
        .unwrap();
    drop(first);

    let second = app_in(dir.path(), &backend).await;
    let rehydrated = second.session().snapshot().await;
    assert_eq!(rehydrated.role(), Some(Role::User));
    assert_eq!(rehydrated.phase, SessionPhase::Uninitialized);
    assert!(rehydrated.loading());

    let ctx = second.bootstrap().await;
    assert_eq!(ctx.phase, SessionPhase::Authenticated);
    assert_eq!(
        second.open("/dashboard").await,
        Navigation::Render {
            route: Route::UserDashboard
        }
    );
}

#[test_log::test(tokio::test)]
async fn test_expired_backend_session_clears_rehydrated_user() {
    let dir = tempfile::tempdir().unwrap();
    let backend = MockBackend::new();
    backend.add_user("field@x.com", "pw");
    let first = app_in(dir.path(), &backend).await;
    first
        .login(LoginPortal::User, "field@x.com", "pw")
        .await
        .unwrap();

    // The backend forgot the session while the client was away
    backend.set_session(None);
    let second = app_in(dir.path(), &backend).await;
    let ctx = second.bootstrap().await;

    assert_eq!(ctx.identity, None);
    assert_eq!(stored_blob(dir.path())["state"]["user"], serde_json::Value::Null);
    assert_eq!(second.open("/dashboard").await.route(), &Route::UserLogin);
}

#[test_log::test(tokio::test)]
async fn test_corrupt_blob_starts_signed_out() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join(format!("{}.json", AUTH_STORAGE_KEY)),
        "{not json",
    )
    .unwrap();
    let backend = MockBackend::new();

    let app = app_in(dir.path(), &backend).await;

    assert_eq!(app.session().identity().await, None);
    assert!(!app.bootstrap().await.is_authenticated());
}

#[test_log::test(tokio::test)]
async fn test_destroy_removes_blob() {
    let dir = tempfile::tempdir().unwrap();
    let backend = MockBackend::new();
    backend.add_user("field@x.com", "pw");
    let app = app_in(dir.path(), &backend).await;
    app.login(LoginPortal::User, "field@x.com", "pw")
        .await
        .unwrap();

    app.session().destroy().await.unwrap();

    assert!(!dir
        .path()
        .join(format!("{}.json", AUTH_STORAGE_KEY))
        .exists());
}
