//! Notification repository

use std::sync::Arc;

use sitedesk_backend::query::single;
use sitedesk_backend::{Backend, Relation, Select};
use sitedesk_common::{Error, Result};
use validator::Validate;

use super::{decode_one, decode_valid};
use crate::domain::entities::{NewNotification, Notification};

#[derive(Clone)]
pub struct NotificationRepository {
    backend: Arc<dyn Backend>,
}

impl NotificationRepository {
    pub fn new(backend: Arc<dyn Backend>) -> Self {
        Self { backend }
    }

    pub async fn create(&self, notification: &NewNotification) -> Result<Notification> {
        notification
            .validate()
            .map_err(|e| Error::Validation(format!("Invalid notification: {}", e)))?;

        let values = match serde_json::to_value(notification)? {
            serde_json::Value::Object(map) => map,
            _ => return Err(Error::Internal("notification is not an object".to_string())),
        };
        let rows = self
            .backend
            .insert(Relation::Notifications, vec![values], "*")
            .await?;
        let created: Notification =
            decode_one(Relation::Notifications, single(Relation::Notifications, rows)?)?;

        tracing::info!(
            notification_id = %created.id,
            title = %created.title,
            "Notification created"
        );
        Ok(created)
    }

    /// Newest first
    pub async fn list(&self) -> Result<Vec<Notification>> {
        let rows = self
            .backend
            .select(Select::from(Relation::Notifications))
            .await?;
        let mut notifications: Vec<Notification> = decode_valid(Relation::Notifications, rows)?;
        notifications.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(notifications)
    }
}
