//! Session: a coarse-grained durable checkpoint, written at swarm creation
//! and whenever a swarm reaches a terminal status, so a restarted process can
//! resume inspection. Not required for correctness of a single run.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub id: Uuid,
    pub swarm_id: Uuid,
    pub data: serde_json::Value,
    pub timestamp: DateTime<Utc>,
}

impl Session {
    pub fn new(swarm_id: Uuid, data: serde_json::Value) -> Self {
        Self {
            id: Uuid::new_v4(),
            swarm_id,
            data,
            timestamp: Utc::now(),
        }
    }
}
