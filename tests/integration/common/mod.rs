//! Shared fixtures for integration tests
//!
//! Every test drives a real [`App`] over the in-memory mock backend and the
//! mock push service. Tests keep their own handles to both so they can seed
//! rows, inject faults and inspect what was sent.

use std::sync::Arc;

use serde_json::json;
use sitedesk_app::App;
use sitedesk_auth::{LocalStorage, MemoryStorage};
use sitedesk_backend::mock::MockBackend;
use sitedesk_backend::Relation;
use sitedesk_push::mock::MockPushService;
use uuid::Uuid;

pub const PASSWORD: &str = "pw";

pub struct TestApp {
    pub app: App,
    pub backend: MockBackend,
    pub push: MockPushService,
    pub storage: MemoryStorage,
}

impl TestApp {
    pub async fn new() -> Self {
        Self::with_backend(MockBackend::new()).await
    }

    pub async fn with_backend(backend: MockBackend) -> Self {
        let push = MockPushService::new();
        let storage = MemoryStorage::new();
        let app = App::new(
            Arc::new(backend.clone()),
            Arc::new(storage.clone()) as Arc<dyn LocalStorage>,
            Arc::new(push.clone()),
        )
        .await;

        Self {
            app,
            backend,
            push,
            storage,
        }
    }

    /// Build a second app over the same backend and storage, as if the
    /// client were restarted
    pub async fn restart(&self) -> App {
        App::new(
            Arc::new(self.backend.clone()),
            Arc::new(self.storage.clone()) as Arc<dyn LocalStorage>,
            Arc::new(self.push.clone()),
        )
        .await
    }

    /// Registered account with no profile row
    pub fn user(&self, email: &str) -> Uuid {
        self.backend.add_user(email, PASSWORD)
    }

    /// Registered account with an admin profile and a push token
    pub fn admin(&self, email: &str, fcm_token: Option<&str>) -> Uuid {
        let id = self.backend.add_user(email, PASSWORD);
        self.backend.seed(
            Relation::Profiles,
            json!({"id": id.to_string(), "role": "admin", "fcm_token": fcm_token}),
        );
        id
    }

    pub fn site(&self, name: &str, coordinates: Option<(f64, f64)>) -> Uuid {
        let id = Uuid::new_v4();
        self.backend.seed(
            Relation::Sites,
            json!({
                "id": id.to_string(),
                "name": name,
                "location": "Kathmandu",
                "latitude": coordinates.map(|c| c.0),
                "longitude": coordinates.map(|c| c.1),
                "power_details": "Grid + DG",
                "transmission_details": "Microwave",
                "landlord_details": {"name": "Hari", "contact": "9800000000"},
                "nea_details": {"approval_number": "NEA-1"}
            }),
        );
        id
    }

    pub fn device(&self, site_id: Uuid, name: &str, ip: &str) -> Uuid {
        let id = Uuid::new_v4();
        self.backend.seed(
            Relation::NetworkDevices,
            json!({
                "id": id.to_string(),
                "site_id": site_id.to_string(),
                "name": name,
                "device_type": "router",
                "ip_address": ip,
                "status": "online"
            }),
        );
        id
    }

    pub fn fiber_route(&self, site_id: Uuid, description: &str) -> Uuid {
        let id = Uuid::new_v4();
        self.backend.seed(
            Relation::FiberRoutes,
            json!({
                "id": id.to_string(),
                "site_id": site_id.to_string(),
                "description": description,
                "created_at": "2024-03-01T10:00:00Z"
            }),
        );
        id
    }

    pub fn task(&self, site_id: Uuid, description: &str) -> Uuid {
        let id = Uuid::new_v4();
        self.backend.seed(
            Relation::Tasks,
            json!({
                "id": id.to_string(),
                "site_id": site_id.to_string(),
                "description": description,
                "completed": false
            }),
        );
        id
    }

    /// Profile rows currently stored for `user_id`
    pub fn profiles_for(&self, user_id: Uuid) -> Vec<serde_json::Value> {
        self.backend
            .rows(Relation::Profiles)
            .into_iter()
            .filter(|row| row.get("id") == Some(&json!(user_id.to_string())))
            .map(serde_json::Value::Object)
            .collect()
    }
}
