//! Per-relation change notifications
//!
//! Views subscribe to a relation and refetch whenever a change event
//! arrives. Events carry no row payload.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use crate::query::Relation;

const CHANNEL_CAPACITY: usize = 64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ChangeKind {
    Insert,
    Update,
    Delete,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeEvent {
    pub relation: Relation,
    pub kind: ChangeKind,
}

/// Fan-out hub with one broadcast channel per relation.
///
/// Clones share the same channels.
#[derive(Debug, Clone)]
pub struct ChangeHub {
    channels: HashMap<Relation, broadcast::Sender<ChangeEvent>>,
}

impl ChangeHub {
    pub fn new() -> Self {
        let channels = Relation::ALL
            .into_iter()
            .map(|relation| (relation, broadcast::channel(CHANNEL_CAPACITY).0))
            .collect();
        Self { channels }
    }

    pub fn subscribe(&self, relation: Relation) -> broadcast::Receiver<ChangeEvent> {
        match self.channels.get(&relation) {
            Some(sender) => sender.subscribe(),
            // Every relation gets a channel in `new`; a fresh closed one is the fallback.
            None => broadcast::channel(1).1,
        }
    }

    pub fn publish(&self, relation: Relation, kind: ChangeKind) {
        if let Some(sender) = self.channels.get(&relation) {
            // No subscribers is not an error.
            let delivered = sender.send(ChangeEvent { relation, kind }).unwrap_or(0);
            tracing::trace!(relation = %relation, ?kind, delivered, "Change published");
        }
    }
}

impl Default for ChangeHub {
    fn default() -> Self {
        Self::new()
    }
}
