//! Category - Node of the product category tree

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Category {
    pub id: Uuid,
    pub name: String,
    pub parent_id: Option<Uuid>,
    /// Depth in the tree, 0 for roots
    pub level: i32,
    pub created_at: DateTime<Utc>,
}

impl Category {
    pub fn new(name: String, parent: Option<&Category>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name,
            parent_id: parent.map(|p| p.id),
            level: parent.map(|p| p.level + 1).unwrap_or(0),
            created_at: Utc::now(),
        }
    }
}

/// Category with its children resolved
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryTreeNode {
    pub id: Uuid,
    pub name: String,
    pub parent_id: Option<Uuid>,
    pub level: i32,
    pub children: Vec<CategoryTreeNode>,
}
