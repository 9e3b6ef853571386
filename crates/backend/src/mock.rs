//! Mock Backend Implementation
//!
//! In-memory users, tables and session for tests and offline development.
//! Thread-safe via `Arc<Mutex<>>`; clones share state, so a test can keep a
//! handle while the code under test owns another.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use chrono::Utc;
use serde_json::Value;
use tokio::sync::broadcast;
use uuid::Uuid;

use crate::query::{parse_columns, Column, Filter, Relation, Row, Select};
use crate::realtime::{ChangeEvent, ChangeHub, ChangeKind};
use crate::session::{Session, SessionUser};
use crate::{AuthApi, BackendError, ChangeFeed, TableApi};

#[derive(Debug, Clone)]
struct MockUser {
    id: Uuid,
    email: String,
    password: String,
}

#[derive(Debug, Default)]
struct MockState {
    users: HashMap<String, MockUser>,
    tables: HashMap<Relation, Vec<Row>>,
    session: Option<Session>,
    relation_failures: HashMap<Relation, String>,
    insert_failures: HashMap<Relation, String>,
    auth_failure: Option<String>,
    sign_out_failure: Option<String>,
    session_failure: Option<String>,
    sign_out_calls: usize,
}

/// Mock backend that keeps everything in memory
#[derive(Debug, Clone)]
pub struct MockBackend {
    state: Arc<Mutex<MockState>>,
    changes: ChangeHub,
}

impl MockBackend {
    /// Create an empty mock backend
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(MockState::default())),
            changes: ChangeHub::new(),
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, MockState>, BackendError> {
        self.state
            .lock()
            .map_err(|e| BackendError::Request(format!("mock state lock poisoned: {e}")))
    }

    fn lock_for_test(&self) -> MutexGuard<'_, MockState> {
        self.state
            .lock()
            .expect("mock state lock poisoned: prior test panicked")
    }

    /// Register a user that can sign in with `password`
    pub fn add_user(&self, email: &str, password: &str) -> Uuid {
        let id = Uuid::new_v4();
        self.lock_for_test().users.insert(
            email.to_string(),
            MockUser {
                id,
                email: email.to_string(),
                password: password.to_string(),
            },
        );
        id
    }

    /// Insert a row directly, bypassing change notifications
    pub fn seed(&self, relation: Relation, row: Value) {
        if let Value::Object(row) = row {
            self.lock_for_test()
                .tables
                .entry(relation)
                .or_default()
                .push(row);
        }
    }

    /// All rows currently stored in `relation`
    pub fn rows(&self, relation: Relation) -> Vec<Row> {
        self.lock_for_test()
            .tables
            .get(&relation)
            .cloned()
            .unwrap_or_default()
    }

    /// Start a session for a registered user without going through sign-in
    pub fn start_session(&self, email: &str) -> Option<Session> {
        let mut state = self.lock_for_test();
        let user = state.users.get(email)?.clone();
        let session = issue_session(&user);
        state.session = Some(session.clone());
        Some(session)
    }

    /// Install an arbitrary session (e.g. one for a user the mock does not know)
    pub fn set_session(&self, session: Option<Session>) {
        self.lock_for_test().session = session;
    }

    /// The current session as the backend sees it
    pub fn current_session(&self) -> Option<Session> {
        self.lock_for_test().session.clone()
    }

    /// Every operation on `relation` fails with `message` until cleared
    pub fn fail_relation(&self, relation: Relation, message: &str) {
        self.lock_for_test()
            .relation_failures
            .insert(relation, message.to_string());
    }

    /// Inserts into `relation` fail with `message` until cleared; reads
    /// and other writes are unaffected
    pub fn fail_insert(&self, relation: Relation, message: &str) {
        self.lock_for_test()
            .insert_failures
            .insert(relation, message.to_string());
    }

    /// Password sign-in fails with a server error until cleared
    pub fn fail_auth(&self, message: &str) {
        self.lock_for_test().auth_failure = Some(message.to_string());
    }

    /// Sign-out fails with a server error until cleared
    pub fn fail_sign_out(&self, message: &str) {
        self.lock_for_test().sign_out_failure = Some(message.to_string());
    }

    /// Session lookup fails with a server error until cleared
    pub fn fail_get_session(&self, message: &str) {
        self.lock_for_test().session_failure = Some(message.to_string());
    }

    pub fn clear_failures(&self) {
        let mut state = self.lock_for_test();
        state.relation_failures.clear();
        state.insert_failures.clear();
        state.auth_failure = None;
        state.sign_out_failure = None;
        state.session_failure = None;
    }

    /// Number of sign-out requests received
    pub fn sign_out_calls(&self) -> usize {
        self.lock_for_test().sign_out_calls
    }
}

impl Default for MockBackend {
    #[mutants::skip] // Delegates to new()
    fn default() -> Self {
        Self::new()
    }
}

fn issue_session(user: &MockUser) -> Session {
    Session {
        access_token: format!("mock-access-{}", Uuid::new_v4()),
        refresh_token: format!("mock-refresh-{}", Uuid::new_v4()),
        expires_at: Some(Utc::now().timestamp() + 3600),
        user: SessionUser {
            id: user.id,
            email: Some(user.email.clone()),
        },
    }
}

fn server_error(message: &str) -> BackendError {
    BackendError::Response {
        status: 500,
        message: message.to_string(),
    }
}

fn check_relation(state: &MockState, relation: Relation) -> Result<(), BackendError> {
    match state.relation_failures.get(&relation) {
        Some(message) => Err(server_error(message)),
        None => Ok(()),
    }
}

fn matches_all(row: &Row, filters: &[Filter]) -> bool {
    filters.iter().all(|f| f.matches(row))
}

/// Apply a parsed column list to `row`, resolving embeds as many-to-one
/// joins through the `<alias>_id` foreign key.
fn project(state: &MockState, row: &Row, columns: &[Column]) -> Result<Row, BackendError> {
    let mut out = Row::new();
    for column in columns {
        match column {
            Column::Star => out.extend(row.iter().map(|(k, v)| (k.clone(), v.clone()))),
            Column::Field(name) => {
                out.insert(name.clone(), row.get(name).cloned().unwrap_or(Value::Null));
            }
            Column::Embed {
                alias,
                relation,
                columns,
            } => {
                let target: Relation = relation.parse()?;
                check_relation(state, target)?;
                let fk = row.get(&format!("{}_id", alias)).cloned();
                let joined = match fk {
                    Some(fk) if !fk.is_null() => state
                        .tables
                        .get(&target)
                        .and_then(|rows| {
                            rows.iter()
                                .find(|r| Filter::eq("id", fk.clone()).matches(r))
                        })
                        .map(|r| project(state, r, columns).map(Value::Object))
                        .transpose()?
                        .unwrap_or(Value::Null),
                    _ => Value::Null,
                };
                out.insert(alias.clone(), joined);
            }
        }
    }
    Ok(out)
}

#[async_trait::async_trait]
impl AuthApi for MockBackend {
    async fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Session, BackendError> {
        let mut state = self.lock()?;
        if let Some(message) = &state.auth_failure {
            return Err(server_error(message));
        }
        let user = match state.users.get(email) {
            Some(user) if user.password == password => user.clone(),
            _ => return Err(BackendError::InvalidCredentials),
        };
        let session = issue_session(&user);
        state.session = Some(session.clone());
        tracing::debug!(user_id = %user.id, "Mock backend: signed in");
        Ok(session)
    }

    async fn sign_out(&self) -> Result<(), BackendError> {
        let mut state = self.lock()?;
        state.sign_out_calls += 1;
        if let Some(message) = &state.sign_out_failure {
            return Err(server_error(message));
        }
        state.session = None;
        Ok(())
    }

    async fn get_session(&self) -> Result<Option<Session>, BackendError> {
        let state = self.lock()?;
        if let Some(message) = &state.session_failure {
            return Err(server_error(message));
        }
        Ok(state.session.clone().filter(|s| !s.is_expired()))
    }
}

#[async_trait::async_trait]
impl TableApi for MockBackend {
    async fn select(&self, query: Select) -> Result<Vec<Row>, BackendError> {
        let columns = parse_columns(&query.columns)?;
        let state = self.lock()?;
        check_relation(&state, query.relation)?;

        state
            .tables
            .get(&query.relation)
            .map(|rows| rows.as_slice())
            .unwrap_or_default()
            .iter()
            .filter(|row| matches_all(row, &query.filters))
            .map(|row| project(&state, row, &columns))
            .collect()
    }

    async fn insert(
        &self,
        relation: Relation,
        rows: Vec<Row>,
        returning: &str,
    ) -> Result<Vec<Row>, BackendError> {
        let columns = parse_columns(returning)?;
        let inserted = {
            let mut state = self.lock()?;
            check_relation(&state, relation)?;
            if let Some(message) = state.insert_failures.get(&relation) {
                return Err(server_error(message));
            }

            let mut stored = Vec::with_capacity(rows.len());
            for mut row in rows {
                row.entry("id")
                    .or_insert_with(|| Value::String(Uuid::new_v4().to_string()));
                row.entry("created_at")
                    .or_insert_with(|| Value::String(Utc::now().to_rfc3339()));
                stored.push(row);
            }
            state
                .tables
                .entry(relation)
                .or_default()
                .extend(stored.iter().cloned());

            stored
                .iter()
                .map(|row| project(&state, row, &columns))
                .collect::<Result<Vec<_>, _>>()?
        };

        self.changes.publish(relation, ChangeKind::Insert);
        Ok(inserted)
    }

    async fn update(
        &self,
        relation: Relation,
        values: Row,
        filters: Vec<Filter>,
    ) -> Result<Vec<Row>, BackendError> {
        let updated = {
            let mut state = self.lock()?;
            check_relation(&state, relation)?;

            let mut updated = Vec::new();
            if let Some(rows) = state.tables.get_mut(&relation) {
                for row in rows.iter_mut().filter(|row| matches_all(row, &filters)) {
                    row.extend(values.iter().map(|(k, v)| (k.clone(), v.clone())));
                    updated.push(row.clone());
                }
            }
            updated
        };

        self.changes.publish(relation, ChangeKind::Update);
        Ok(updated)
    }

    async fn delete(&self, relation: Relation, filters: Vec<Filter>) -> Result<(), BackendError> {
        {
            let mut state = self.lock()?;
            check_relation(&state, relation)?;
            if let Some(rows) = state.tables.get_mut(&relation) {
                rows.retain(|row| !matches_all(row, &filters));
            }
        }

        self.changes.publish(relation, ChangeKind::Delete);
        Ok(())
    }
}

impl ChangeFeed for MockBackend {
    fn subscribe(&self, relation: Relation) -> broadcast::Receiver<ChangeEvent> {
        self.changes.subscribe(relation)
    }
}
