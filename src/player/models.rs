use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Platform player record. Created on first appearance, never deleted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerModel {
    pub id: String,
    pub name: String,
    /// Only changed by the external rating collaborator after settlement
    pub rating: i32,
    pub created_at: DateTime<Utc>,
}

impl PlayerModel {
    pub fn new(id: String, name: String) -> Self {
        Self {
            id,
            name,
            rating: 0,
            created_at: Utc::now(),
        }
    }
}
