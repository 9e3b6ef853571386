//! Task repository

use std::sync::Arc;

use sitedesk_backend::query::{maybe_single, row};
use sitedesk_backend::{Backend, Filter, Relation, Select};
use sitedesk_common::{Error, Result};
use uuid::Uuid;

use super::notifications::NotificationRepository;
use super::{decode_one, decode_valid};
use crate::domain::entities::{NewNotification, Task, TASK_WITH_SITE_COLUMNS};

/// Result of toggling a task
#[derive(Debug, Clone, PartialEq)]
pub struct TaskUpdate {
    /// Task list reloaded after the change
    pub tasks: Vec<Task>,
    /// Completion notice, present when the task was marked completed
    pub notice: Option<NewNotification>,
}

#[derive(Clone)]
pub struct TaskRepository {
    backend: Arc<dyn Backend>,
    notifications: NotificationRepository,
}

impl TaskRepository {
    pub fn new(backend: Arc<dyn Backend>) -> Self {
        Self {
            notifications: NotificationRepository::new(backend.clone()),
            backend,
        }
    }

    /// Every task with its site embedded
    pub async fn list_with_site(&self) -> Result<Vec<Task>> {
        let rows = self
            .backend
            .select(Select::from(Relation::Tasks).columns(TASK_WITH_SITE_COLUMNS))
            .await?;
        decode_valid(Relation::Tasks, rows)
    }

    pub async fn get_with_site(&self, task_id: Uuid) -> Result<Task> {
        let rows = self
            .backend
            .select(
                Select::from(Relation::Tasks)
                    .columns(TASK_WITH_SITE_COLUMNS)
                    .eq("id", task_id.to_string()),
            )
            .await?;
        match maybe_single(Relation::Tasks, rows)? {
            Some(found) => decode_one(Relation::Tasks, found),
            None => Err(Error::NotFound(format!("Task {} not found", task_id))),
        }
    }

    /// Mark a task completed or open again, then reload the list.
    ///
    /// Completing a task also inserts a `task_completion` notification. A
    /// failed insert is logged and does not fail the update.
    pub async fn set_completed(&self, task_id: Uuid, completed: bool) -> Result<TaskUpdate> {
        let task = self.get_with_site(task_id).await?;

        self.backend
            .update(
                Relation::Tasks,
                row(serde_json::json!({ "completed": completed })),
                vec![Filter::eq("id", task_id.to_string())],
            )
            .await?;
        tracing::info!(task_id = %task_id, completed, "Task updated");

        let notice = if completed {
            let notice = NewNotification::task_completed(task.site_name());
            if let Err(e) = self.notifications.create(&notice).await {
                tracing::warn!(
                    error = %e,
                    task_id = %task_id,
                    "Failed to record task completion notice"
                );
            }
            Some(notice)
        } else {
            None
        };

        let tasks = self.list_with_site().await?;
        Ok(TaskUpdate { tasks, notice })
    }
}
