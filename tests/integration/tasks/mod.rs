//! Field task workflow and the admin notifications it produces

use sitedesk_app::LoginPortal;
use sitedesk_backend::{ChangeKind, Relation};
use sitedesk_sites::NotificationKind;

use crate::common::{TestApp, PASSWORD};

async fn signed_in_field_user() -> TestApp {
    let t = TestApp::new().await;
    t.user("field@x.com");
    t.app
        .login(LoginPortal::User, "field@x.com", PASSWORD)
        .await
        .unwrap();
    t
}

#[tokio::test]
async fn test_tasks_come_with_their_site() {
    let t = signed_in_field_user().await;
    let site = t.site("Itahari", None);
    t.task(site, "Replace rectifier module");

    let tasks = t.app.tasks().await.unwrap();

    assert_eq!(tasks.len(), 1);
    assert_eq!(tasks[0].site_name(), "Itahari");
    assert!(!tasks[0].completed);
}

#[test_log::test(tokio::test)]
async fn test_completing_a_task_notifies_admins() {
    let t = signed_in_field_user().await;
    t.admin("ops@x.com", Some("tok-ops"));
    t.admin("night@x.com", Some(""));
    let site = t.site("Itahari", None);
    let task = t.task(site, "Replace rectifier module");

    let tasks = t.app.set_task_completed(task, true).await.unwrap();

    assert!(tasks[0].completed);

    let stored = t.backend.rows(Relation::Notifications);
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0]["title"], "Task Completed");
    assert_eq!(
        stored[0]["message"],
        "Task for site Itahari has been completed"
    );
    assert_eq!(stored[0]["type"], "task_completion");

    let sent = t.push.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].tokens, vec!["tok-ops".to_string()]);
    assert_eq!(sent[0].notification.title, "Task Completed");
}

#[tokio::test]
async fn test_reopening_a_task_is_silent() {
    let t = signed_in_field_user().await;
    t.admin("ops@x.com", Some("tok-ops"));
    let site = t.site("Itahari", None);
    let task = t.task(site, "Replace rectifier module");

    let tasks = t.app.set_task_completed(task, false).await.unwrap();

    assert!(!tasks[0].completed);
    assert!(t.backend.rows(Relation::Notifications).is_empty());
    assert!(t.push.sent().is_empty());
}

#[tokio::test]
async fn test_push_failure_does_not_fail_the_update() {
    let t = signed_in_field_user().await;
    t.admin("ops@x.com", Some("tok-ops"));
    let site = t.site("Itahari", None);
    let task = t.task(site, "Replace rectifier module");
    t.push.fail_with("quota exceeded");

    let tasks = t.app.set_task_completed(task, true).await.unwrap();

    assert!(tasks[0].completed);
    assert_eq!(t.backend.rows(Relation::Notifications).len(), 1);
}

#[tokio::test]
async fn test_no_admin_tokens_sends_nothing() {
    let t = signed_in_field_user().await;
    t.admin("ops@x.com", None);
    let site = t.site("Itahari", None);
    let task = t.task(site, "Replace rectifier module");

    t.app.set_task_completed(task, true).await.unwrap();

    assert!(t.push.sent().is_empty());
}

#[tokio::test]
async fn test_failed_update_keeps_prior_list() {
    let t = signed_in_field_user().await;
    let site = t.site("Itahari", None);
    let task = t.task(site, "Replace rectifier module");
    t.backend.fail_relation(Relation::Tasks, "statement timeout");

    let err = t.app.set_task_completed(task, true).await.unwrap_err();
    assert_eq!(err.message, "Failed to update task");

    t.backend.clear_failures();
    let tasks = t.app.tasks().await.unwrap();
    assert!(!tasks[0].completed);
}

#[tokio::test]
async fn test_views_see_changes_on_their_relations() {
    let t = signed_in_field_user().await;
    let site = t.site("Itahari", None);
    let task = t.task(site, "Replace rectifier module");
    let mut task_changes = t.app.subscribe(Relation::Tasks);
    let mut notification_changes = t.app.subscribe(Relation::Notifications);

    t.app.set_task_completed(task, true).await.unwrap();

    let event = task_changes.try_recv().unwrap();
    assert_eq!(event.relation, Relation::Tasks);
    assert_eq!(event.kind, ChangeKind::Update);
    let event = notification_changes.try_recv().unwrap();
    assert_eq!(event.kind, ChangeKind::Insert);
}

#[tokio::test]
async fn test_admin_sees_completion_notification() {
    let t = signed_in_field_user().await;
    t.admin("ops@x.com", None);
    let site = t.site("Itahari", None);
    let task = t.task(site, "Replace rectifier module");
    t.app.set_task_completed(task, true).await.unwrap();

    t.app
        .login(LoginPortal::Admin, "ops@x.com", PASSWORD)
        .await
        .unwrap();
    let notifications = t.app.notifications().await.unwrap();

    assert_eq!(notifications.len(), 1);
    assert_eq!(notifications[0].kind, NotificationKind::TaskCompletion);
    assert!(!notifications[0].read);
}
