use serde::Deserialize;
use sqlx::SqlitePool;
use std::fs;
use uuid::Uuid;

use crate::archive;
use crate::models::{ItemCategory, ItemStatus, User};

#[derive(Deserialize)]
struct ImportItem {
    unique_id: String,
    name: String,
    description: Option<String>,
    serial_number: Option<String>,
    property_number: Option<String>,
    acquisition_date: Option<String>,
    acquisition_cost: Option<f64>,
    location: Option<String>,
    end_user: Option<String>,
    status: Option<String>,
    category: Option<String>,
    quantity: Option<i64>,
    unit: Option<String>,
    image_url: Option<String>,
    remarks: Option<String>,
    #[serde(rename = "createdAt", alias = "created_at")]
    created_at: Option<String>,
    #[serde(rename = "updatedAt", alias = "updated_at")]
    updated_at: Option<String>,
}

/// Imports items from a JSON array dump. The whole file lands in one
/// transaction; a duplicate `unique_id` aborts the import.
pub async fn import_items(
    pool: &SqlitePool,
    file_path: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let content = fs::read_to_string(file_path)?;
    let items: Vec<ImportItem> = serde_json::from_str(&content)?;

    let now = chrono::Utc::now().to_rfc3339();
    let mut imported = 0;
    let mut tx = pool.begin().await?;

    for item in items {
        let id = Uuid::new_v4().to_string();
        let created_at = item.created_at.unwrap_or_else(|| now.clone());
        let updated_at = item.updated_at.unwrap_or_else(|| now.clone());

        let status = match item.status.as_deref() {
            None => ItemStatus::Good,
            Some(raw) => ItemStatus::parse(raw).unwrap_or_else(|| {
                eprintln!("Unknown status: {raw}, defaulting to Good");
                ItemStatus::Good
            }),
        };
        let category = match item.category.as_deref() {
            None => ItemCategory::Other,
            Some(raw) => ItemCategory::parse(raw).unwrap_or_else(|| {
                eprintln!("Unknown category: {raw}, defaulting to Other");
                ItemCategory::Other
            }),
        };

        sqlx::query(
            r#"
            INSERT INTO items (
                id, unique_id, name, description, serial_number, property_number,
                acquisition_date, acquisition_cost, location, end_user, status,
                category, quantity, unit, image_url, remarks, created_at, updated_at
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&id)
        .bind(&item.unique_id)
        .bind(&item.name)
        .bind(&item.description)
        .bind(&item.serial_number)
        .bind(&item.property_number)
        .bind(&item.acquisition_date)
        .bind(item.acquisition_cost)
        .bind(&item.location)
        .bind(&item.end_user)
        .bind(status)
        .bind(category)
        .bind(item.quantity.unwrap_or(1).max(1))
        .bind(&item.unit)
        .bind(&item.image_url)
        .bind(&item.remarks)
        .bind(&created_at)
        .bind(&updated_at)
        .execute(&mut *tx)
        .await?;

        imported += 1;
    }

    tx.commit().await?;
    println!("Imported {} items", imported);
    Ok(())
}

pub async fn create_user(
    pool: &SqlitePool,
    name: &str,
    email: Option<&str>,
) -> Result<(), Box<dyn std::error::Error>> {
    let user = User::new(name.to_string(), email.map(String::from));

    sqlx::query(
        "INSERT INTO users (id, name, email, invite_code, created_at, updated_at) VALUES (?, ?, ?, ?, ?, ?)",
    )
    .bind(&user.id)
    .bind(&user.name)
    .bind(&user.email)
    .bind(&user.invite_code)
    .bind(&user.created_at)
    .bind(&user.updated_at)
    .execute(pool)
    .await?;

    println!("Created user:");
    println!("  ID: {}", user.id);
    println!("  Name: {}", user.name);
    println!("  Invite Code: {}", user.invite_code);

    Ok(())
}

/// Deletes archived items whose retention deadline has passed.
pub async fn sweep_archive(pool: &SqlitePool) -> Result<(), Box<dyn std::error::Error>> {
    let purged = archive::sweep_expired(pool)
        .await
        .map_err(|e| format!("sweep failed: {e:?}"))?;
    println!("Purged {} expired archived item(s)", purged);
    Ok(())
}
