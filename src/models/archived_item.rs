use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::models::{Item, ItemCategory, ItemStatus};

/// Days an archived item is held before it becomes eligible for permanent
/// purge. `auto_delete_at` is stamped once at archive time and never
/// recomputed.
pub const RETENTION_DAYS: i64 = 30;

/// Shadow copy of an item taken at archive time. Carries the full field set
/// rather than a reference so it survives the active row being removed.
/// Keeps the original row id: an item id lives in `items` or in
/// `archived_items`, never both.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ArchivedItem {
    pub id: String,
    pub unique_id: String,
    pub name: String,
    pub description: Option<String>,
    pub serial_number: Option<String>,
    pub property_number: Option<String>,
    pub acquisition_date: Option<String>,
    pub acquisition_cost: Option<f64>,
    pub location: Option<String>,
    pub end_user: Option<String>,
    pub status: ItemStatus,
    pub category: ItemCategory,
    pub quantity: i64,
    pub unit: Option<String>,
    pub image_url: Option<String>,
    pub remarks: Option<String>,
    pub created_at: String,
    pub updated_at: String,
    pub archived_at: String,
    pub archived_by: String,
    pub auto_delete_at: String,
}

impl ArchivedItem {
    pub fn from_item(item: &Item, archived_by: &str, now: DateTime<Utc>) -> Self {
        let auto_delete_at = now + Duration::days(RETENTION_DAYS);
        Self {
            id: item.id.clone(),
            unique_id: item.unique_id.clone(),
            name: item.name.clone(),
            description: item.description.clone(),
            serial_number: item.serial_number.clone(),
            property_number: item.property_number.clone(),
            acquisition_date: item.acquisition_date.clone(),
            acquisition_cost: item.acquisition_cost,
            location: item.location.clone(),
            end_user: item.end_user.clone(),
            status: item.status,
            category: item.category,
            quantity: item.quantity,
            unit: item.unit.clone(),
            image_url: item.image_url.clone(),
            remarks: item.remarks.clone(),
            created_at: item.created_at.clone(),
            updated_at: item.updated_at.clone(),
            archived_at: now.to_rfc3339(),
            archived_by: archived_by.to_string(),
            auto_delete_at: auto_delete_at.to_rfc3339(),
        }
    }
}
