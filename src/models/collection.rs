use chrono::Utc;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Named, user-managed grouping of items for batch label runs. No per-owner
/// ACL: any authenticated user may rename or delete any collection.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct PrintCollection {
    pub id: String,
    pub name: String,
    pub created_by: String,
    pub created_at: String,
    pub updated_at: String,
}

impl PrintCollection {
    pub fn new(name: String, created_by: String) -> Self {
        let now = Utc::now().to_rfc3339();
        Self {
            id: Uuid::new_v4().to_string(),
            name,
            created_by,
            created_at: now.clone(),
            updated_at: now,
        }
    }
}

/// Membership row. The (collection_id, item_id) primary key makes inserts
/// naturally idempotent via INSERT OR IGNORE.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct CollectionItem {
    pub collection_id: String,
    pub item_id: String,
    pub added_at: String,
}

impl CollectionItem {
    pub fn new(collection_id: String, item_id: String) -> Self {
        Self {
            collection_id,
            item_id,
            added_at: Utc::now().to_rfc3339(),
        }
    }
}
