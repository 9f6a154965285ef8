use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Physical condition of an asset. Orthogonal to archival state: archiving an
/// item never rewrites its status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "TEXT")]
pub enum ItemStatus {
    #[serde(rename = "Brand New")]
    #[sqlx(rename = "Brand New")]
    BrandNew,
    #[serde(rename = "Good")]
    #[sqlx(rename = "Good")]
    Good,
    #[serde(rename = "Repair Needed")]
    #[sqlx(rename = "Repair Needed")]
    RepairNeeded,
    #[serde(rename = "Unserviceable")]
    #[sqlx(rename = "Unserviceable")]
    Unserviceable,
    #[serde(rename = "Disposed")]
    #[sqlx(rename = "Disposed")]
    Disposed,
}

impl ItemStatus {
    pub const ALL: [ItemStatus; 5] = [
        ItemStatus::BrandNew,
        ItemStatus::Good,
        ItemStatus::RepairNeeded,
        ItemStatus::Unserviceable,
        ItemStatus::Disposed,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ItemStatus::BrandNew => "Brand New",
            ItemStatus::Good => "Good",
            ItemStatus::RepairNeeded => "Repair Needed",
            ItemStatus::Unserviceable => "Unserviceable",
            ItemStatus::Disposed => "Disposed",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|v| v.as_str() == s)
    }
}

impl std::fmt::Display for ItemStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "TEXT")]
pub enum ItemCategory {
    #[serde(rename = "Electronics")]
    #[sqlx(rename = "Electronics")]
    Electronics,
    #[serde(rename = "Furniture")]
    #[sqlx(rename = "Furniture")]
    Furniture,
    #[serde(rename = "Appliance")]
    #[sqlx(rename = "Appliance")]
    Appliance,
    #[serde(rename = "Vehicle")]
    #[sqlx(rename = "Vehicle")]
    Vehicle,
    #[serde(rename = "Supplies")]
    #[sqlx(rename = "Supplies")]
    Supplies,
    #[serde(rename = "Other")]
    #[sqlx(rename = "Other")]
    Other,
}

impl ItemCategory {
    pub const ALL: [ItemCategory; 6] = [
        ItemCategory::Electronics,
        ItemCategory::Furniture,
        ItemCategory::Appliance,
        ItemCategory::Vehicle,
        ItemCategory::Supplies,
        ItemCategory::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ItemCategory::Electronics => "Electronics",
            ItemCategory::Furniture => "Furniture",
            ItemCategory::Appliance => "Appliance",
            ItemCategory::Vehicle => "Vehicle",
            ItemCategory::Supplies => "Supplies",
            ItemCategory::Other => "Other",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|v| v.as_str() == s)
    }
}

impl std::fmt::Display for ItemCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One inventory asset. `unique_id` is the durable scannable identifier: it is
/// immutable once created and survives archive/restore, since printed labels
/// in the field reference it.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Item {
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
}
