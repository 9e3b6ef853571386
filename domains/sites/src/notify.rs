//! Push notifications to administrators

use sitedesk_auth::{ProfileRepository, Role};
use sitedesk_push::{MulticastReceipt, PushNotification, PushService};

/// Send one multicast to every admin with a push token.
///
/// Returns `None` when nothing was sent. Failures are logged, never returned.
pub async fn notify_admins(
    profiles: &ProfileRepository,
    push: &dyn PushService,
    title: &str,
    body: &str,
) -> Option<MulticastReceipt> {
    let tokens = match profiles.push_tokens_for_role(Role::Admin).await {
        Ok(tokens) => tokens,
        Err(e) => {
            tracing::error!(error = %e, "Error loading admin push tokens");
            return None;
        }
    };

    if tokens.is_empty() {
        tracing::debug!("No admin push tokens; skipping notification");
        return None;
    }

    let count = tokens.len();
    match push
        .send_multicast(PushNotification::new(title, body), tokens)
        .await
    {
        Ok(receipt) => {
            tracing::info!(
                recipients = count,
                delivered = receipt.success_count,
                failed = receipt.failure_count,
                "Admin notification sent"
            );
            Some(receipt)
        }
        Err(e) => {
            tracing::error!(error = %e, "Error sending notification");
            None
        }
    }
}
