//! Session lifecycle: sign-in, bootstrap, sign-out and teardown

use sitedesk_app::{LoginPortal, Notice};
use sitedesk_auth::{AuthError, Role, SessionLifecycle, SessionPhase};

use crate::common::{TestApp, PASSWORD};

mod test_sign_in {
    use super::*;

    #[test_log::test(tokio::test)]
    async fn test_first_sign_in_creates_user_profile() {
        let t = TestApp::new().await;
        let id = t.user("field@x.com");

        let identity = t
            .app
            .session()
            .sign_in("field@x.com", PASSWORD)
            .await
            .unwrap();

        assert_eq!(identity.id, id);
        assert_eq!(identity.role, Role::User);
        let profiles = t.profiles_for(id);
        assert_eq!(profiles.len(), 1);
        assert_eq!(profiles[0]["role"], "user");
    }

    #[test_log::test(tokio::test)]
    async fn test_existing_profile_role_is_used() {
        let t = TestApp::new().await;
        let id = t.admin("ops@x.com", None);

        let identity = t.app.session().sign_in("ops@x.com", PASSWORD).await.unwrap();

        assert_eq!(identity.role, Role::Admin);
        assert_eq!(t.profiles_for(id).len(), 1);
    }

    #[test_log::test(tokio::test)]
    async fn test_admin_email_without_profile_signs_in_as_user() {
        let t = TestApp::new().await;
        let id = t.user("admin@x.com");

        let identity = t.app.session().sign_in("admin@x.com", "pw").await.unwrap();

        assert_eq!(identity.id, id);
        assert_eq!(identity.email, "admin@x.com");
        assert_eq!(identity.role, Role::User);

        // The admin portal accepts the login, then the admin guard sends the
        // user back out
        let nav = t
            .app
            .login(LoginPortal::Admin, "admin@x.com", "pw")
            .await
            .unwrap();
        assert_eq!(nav.route(), &sitedesk_app::Route::UserLogin);
    }

    #[test_log::test(tokio::test)]
    async fn test_bad_credentials_leak_no_detail() {
        let t = TestApp::new().await;
        t.user("field@x.com");

        let err = t
            .app
            .login(LoginPortal::User, "field@x.com", "wrong")
            .await
            .unwrap_err();
        assert_eq!(err, Notice::error("Invalid credentials"));

        let err = t
            .app
            .login(LoginPortal::User, "nobody@x.com", PASSWORD)
            .await
            .unwrap_err();
        assert_eq!(err, Notice::error("Invalid credentials"));

        assert_eq!(t.app.session().identity().await, None);
    }

    #[test_log::test(tokio::test)]
    async fn test_profile_insert_failure_keeps_prior_state() {
        let t = TestApp::new().await;
        let id = t.user("field@x.com");
        t.backend
            .fail_insert(sitedesk_backend::Relation::Profiles, "duplicate key value");

        let err = t
            .app
            .session()
            .sign_in("field@x.com", PASSWORD)
            .await
            .unwrap_err();

        assert!(matches!(err, AuthError::ProfileCreate(_)));
        assert_eq!(t.app.session().identity().await, None);
        assert!(t.profiles_for(id).is_empty());
    }
}

mod test_bootstrap {
    use super::*;

    #[test_log::test(tokio::test)]
    async fn test_no_session_is_anonymous_and_resolved() {
        let t = TestApp::new().await;

        let ctx = t.app.bootstrap().await;

        assert_eq!(ctx.identity, None);
        assert!(!ctx.loading());
        assert_eq!(ctx.lifecycle(), SessionLifecycle::Anonymous);
    }

    #[test_log::test(tokio::test)]
    async fn test_session_without_profile_defaults_to_user_without_creating_one() {
        let t = TestApp::new().await;
        let id = t.user("field@x.com");
        t.backend.start_session("field@x.com").unwrap();

        let ctx = t.app.bootstrap().await;

        let identity = ctx.identity.as_ref().unwrap();
        assert_eq!(identity.id, id);
        assert_eq!(identity.role, Role::User);
        assert!(!ctx.loading());
        assert!(t.profiles_for(id).is_empty());
    }

    #[test_log::test(tokio::test)]
    async fn test_session_with_admin_profile() {
        let t = TestApp::new().await;
        t.admin("ops@x.com", Some("tok"));
        t.backend.start_session("ops@x.com").unwrap();

        let ctx = t.app.bootstrap().await;

        assert!(ctx.is_admin());
        assert_eq!(ctx.phase, SessionPhase::Authenticated);
    }

    #[test_log::test(tokio::test)]
    async fn test_session_lookup_failure_resolves_anonymous() {
        let t = TestApp::new().await;
        t.backend.fail_get_session("auth service down");

        let ctx = t.app.bootstrap().await;

        assert_eq!(ctx.identity, None);
        assert!(!ctx.loading());
    }
}

mod test_sign_out {
    use super::*;

    #[test_log::test(tokio::test)]
    async fn test_logout_clears_identity_and_backend_session() {
        let t = TestApp::new().await;
        t.user("field@x.com");
        t.app
            .login(LoginPortal::User, "field@x.com", PASSWORD)
            .await
            .unwrap();

        let nav = t.app.logout().await;

        assert_eq!(nav.route(), &sitedesk_app::Route::UserLogin);
        assert_eq!(t.app.session().identity().await, None);
        assert_eq!(t.backend.current_session(), None);
        assert_eq!(t.backend.sign_out_calls(), 1);
    }

    #[test_log::test(tokio::test)]
    async fn test_sign_out_failure_still_clears_identity() {
        let t = TestApp::new().await;
        t.user("field@x.com");
        t.app.session().sign_in("field@x.com", PASSWORD).await.unwrap();
        t.backend.fail_sign_out("network unreachable");

        let result = t.app.session().sign_out().await;

        assert!(matches!(result, Err(AuthError::SignOut(_))));
        assert_eq!(t.app.session().identity().await, None);
        assert_eq!(
            t.app.session().phase().await,
            SessionPhase::Anonymous
        );
    }
}

mod test_teardown {
    use super::*;

    #[test_log::test(tokio::test)]
    async fn test_destroyed_store_rejects_everything() {
        let t = TestApp::new().await;
        t.user("field@x.com");
        t.app.session().sign_in("field@x.com", PASSWORD).await.unwrap();

        t.app.session().destroy().await.unwrap();

        let ctx = t.app.session().snapshot().await;
        assert_eq!(ctx.identity, None);
        assert_eq!(ctx.lifecycle(), SessionLifecycle::Destroyed);
        assert!(matches!(
            t.app.session().sign_in("field@x.com", PASSWORD).await,
            Err(AuthError::SessionDestroyed)
        ));
        assert!(matches!(
            t.app.session().fetch_user().await,
            Err(AuthError::SessionDestroyed)
        ));
        assert!(t.app.session().destroy().await.is_ok());
    }
}
