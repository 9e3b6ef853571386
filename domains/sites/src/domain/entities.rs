//! Site domain entities
//!
//! Rows arrive as loose JSON from the backend and are decoded and validated
//! here. A row that fails either step is a query error, not a panic.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;
use validator::Validate;

/// `null` and a missing field both become `T::default()`
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Landlord agreement on a site
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
pub struct LandlordDetails {
    pub name: Option<String>,
    pub contact: Option<String>,
    pub agreement_date: Option<String>,
}

/// Electricity authority approval on a site
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
pub struct NeaDetails {
    pub approval_number: Option<String>,
    pub approval_date: Option<String>,
}

/// A telecom site
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct Site {
    pub id: Uuid,

    #[validate(length(min = 1, max = 200))]
    pub name: String,

    #[serde(default, deserialize_with = "null_as_default")]
    pub location: String,

    #[validate(range(min = -90.0, max = 90.0))]
    #[serde(default)]
    pub latitude: Option<f64>,

    #[validate(range(min = -180.0, max = 180.0))]
    #[serde(default)]
    pub longitude: Option<f64>,

    #[serde(default)]
    pub power_details: Option<String>,

    #[serde(default)]
    pub transmission_details: Option<String>,

    #[validate(nested)]
    #[serde(default, deserialize_with = "null_as_default")]
    pub landlord_details: LandlordDetails,

    #[validate(nested)]
    #[serde(default, deserialize_with = "null_as_default")]
    pub nea_details: NeaDetails,

    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl Site {
    /// Both coordinates, when the site has them
    pub fn coordinates(&self) -> Option<(f64, f64)> {
        Some((self.latitude?, self.longitude?))
    }
}

/// Partial update of a site; `None` fields are left untouched
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
pub struct SitePatch {
    #[validate(length(min = 1, max = 200))]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,

    #[validate(range(min = -90.0, max = 90.0))]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latitude: Option<f64>,

    #[validate(range(min = -180.0, max = 180.0))]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub longitude: Option<f64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub power_details: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub transmission_details: Option<String>,

    #[validate(nested)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub landlord_details: Option<LandlordDetails>,

    #[validate(nested)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nea_details: Option<NeaDetails>,
}

impl SitePatch {
    pub fn is_empty(&self) -> bool {
        *self == SitePatch::default()
    }
}

/// Network equipment installed at a site
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct NetworkDevice {
    pub id: Uuid,
    pub site_id: Uuid,

    #[validate(length(min = 1))]
    pub name: String,

    pub device_type: String,

    #[validate(ip)]
    pub ip_address: String,

    pub status: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct FiberRoute {
    pub id: Uuid,
    pub site_id: Uuid,
    #[serde(default, deserialize_with = "null_as_default")]
    pub description: String,
    pub created_at: DateTime<Utc>,
}

/// Site columns embedded in a task listing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct TaskSite {
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub location: String,
    #[serde(default)]
    pub power_details: Option<String>,
    #[serde(default)]
    pub transmission_details: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub landlord_details: LandlordDetails,
    #[serde(default, deserialize_with = "null_as_default")]
    pub nea_details: NeaDetails,
}

/// Column list selecting a task with its site embedded
pub const TASK_WITH_SITE_COLUMNS: &str = concat!(
    "*,site:sites(",
    "name,location,power_details,transmission_details,landlord_details,nea_details",
    ")"
);

/// A field task with the site it belongs to
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct Task {
    pub id: Uuid,
    pub site_id: Uuid,
    #[serde(default, deserialize_with = "null_as_default")]
    pub description: String,
    #[serde(default)]
    pub completed: bool,
    /// `None` when the referenced site no longer exists
    #[serde(default)]
    pub site: Option<TaskSite>,
}

impl Task {
    pub fn site_name(&self) -> &str {
        self.site.as_ref().map(|s| s.name.as_str()).unwrap_or("unknown")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    TaskCompletion,
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct Notification {
    pub id: Uuid,
    #[validate(length(min = 1))]
    pub title: String,
    pub message: String,
    #[serde(rename = "type")]
    pub kind: NotificationKind,
    #[serde(default)]
    pub read: bool,
    pub created_at: DateTime<Utc>,
}

/// A notification about to be inserted
#[derive(Debug, Clone, PartialEq, Serialize, Validate)]
pub struct NewNotification {
    #[validate(length(min = 1))]
    pub title: String,
    pub message: String,
    #[serde(rename = "type")]
    pub kind: NotificationKind,
}

impl NewNotification {
    pub const TASK_COMPLETED_TITLE: &'static str = "Task Completed";

    /// Notice inserted when a field user completes a task
    pub fn task_completed(site_name: &str) -> Self {
        Self {
            title: Self::TASK_COMPLETED_TITLE.to_string(),
            message: format!("Task for site {} has been completed", site_name),
            kind: NotificationKind::TaskCompletion,
        }
    }
}
