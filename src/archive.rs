//! Soft-delete lifecycle for items: Active -> Archived -> restored or purged.
//!
//! Archive and restore move a row between `items` and `archived_items` inside
//! a single transaction, so an item id is never in both sets and never in
//! neither. Purge is gated on the retention deadline.

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::error::AppError;
use crate::models::{ArchivedItem, Item};

/// Archives an active item on behalf of `actor_id`. Valid only from the
/// active state; the archived copy carries the full field set plus the
/// archive stamps, with `auto_delete_at` fixed at now + 30 days.
pub async fn archive_item(
    pool: &SqlitePool,
    item_id: &str,
    actor_id: &str,
) -> Result<ArchivedItem, AppError> {
    let mut tx = pool.begin().await?;

    let item: Option<Item> = sqlx::query_as("SELECT * FROM items WHERE id = ?")
        .bind(item_id)
        .fetch_optional(&mut *tx)
        .await?;
    let Some(item) = item else {
        return Err(AppError::Conflict(
            "Item is not in the active set".to_string(),
        ));
    };

    let archived = ArchivedItem::from_item(&item, actor_id, Utc::now());

    sqlx::query(
        r#"
        INSERT INTO archived_items (
            id, unique_id, name, description, serial_number, property_number,
            acquisition_date, acquisition_cost, location, end_user, status,
            category, quantity, unit, image_url, remarks, created_at,
            updated_at, archived_at, archived_by, auto_delete_at
        )
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&archived.id)
    .bind(&archived.unique_id)
    .bind(&archived.name)
    .bind(&archived.description)
    .bind(&archived.serial_number)
    .bind(&archived.property_number)
    .bind(&archived.acquisition_date)
    .bind(archived.acquisition_cost)
    .bind(&archived.location)
    .bind(&archived.end_user)
    .bind(archived.status)
    .bind(archived.category)
    .bind(archived.quantity)
    .bind(&archived.unit)
    .bind(&archived.image_url)
    .bind(&archived.remarks)
    .bind(&archived.created_at)
    .bind(&archived.updated_at)
    .bind(&archived.archived_at)
    .bind(&archived.archived_by)
    .bind(&archived.auto_delete_at)
    .execute(&mut *tx)
    .await?;

    sqlx::query("DELETE FROM items WHERE id = ?")
        .bind(item_id)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;
    Ok(archived)
}

/// Moves an archived item back into the active set. The restored row gets a
/// fresh storage id and timestamps but keeps the same `unique_id`: labels
/// already printed and stuck to the asset must keep scanning.
pub async fn restore_item(pool: &SqlitePool, archived_id: &str) -> Result<Item, AppError> {
    let mut tx = pool.begin().await?;

    let archived: Option<ArchivedItem> =
        sqlx::query_as("SELECT * FROM archived_items WHERE id = ?")
            .bind(archived_id)
            .fetch_optional(&mut *tx)
            .await?;
    let Some(archived) = archived else {
        return Err(AppError::Conflict("Item is not in the archive".to_string()));
    };

    let now = Utc::now().to_rfc3339();
    let item = Item {
        id: Uuid::new_v4().to_string(),
        unique_id: archived.unique_id.clone(),
        name: archived.name.clone(),
        description: archived.description.clone(),
        serial_number: archived.serial_number.clone(),
        property_number: archived.property_number.clone(),
        acquisition_date: archived.acquisition_date.clone(),
        acquisition_cost: archived.acquisition_cost,
        location: archived.location.clone(),
        end_user: archived.end_user.clone(),
        status: archived.status,
        category: archived.category,
        quantity: archived.quantity,
        unit: archived.unit.clone(),
        image_url: archived.image_url.clone(),
        remarks: archived.remarks.clone(),
        created_at: now.clone(),
        updated_at: now,
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
    .bind(&item.id)
    .bind(&item.unique_id)
    .bind(&item.name)
    .bind(&item.description)
    .bind(&item.serial_number)
    .bind(&item.property_number)
    .bind(&item.acquisition_date)
    .bind(item.acquisition_cost)
    .bind(&item.location)
    .bind(&item.end_user)
    .bind(item.status)
    .bind(item.category)
    .bind(item.quantity)
    .bind(&item.unit)
    .bind(&item.image_url)
    .bind(&item.remarks)
    .bind(&item.created_at)
    .bind(&item.updated_at)
    .execute(&mut *tx)
    .await?;

    sqlx::query("DELETE FROM archived_items WHERE id = ?")
        .bind(archived_id)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;
    Ok(item)
}

/// Permanently removes an archived item. Valid only once the retention
/// deadline has passed; there is no recovery path afterwards.
pub async fn purge_item(pool: &SqlitePool, archived_id: &str) -> Result<(), AppError> {
    let row: Option<(String,)> =
        sqlx::query_as("SELECT auto_delete_at FROM archived_items WHERE id = ?")
            .bind(archived_id)
            .fetch_optional(pool)
            .await?;
    let Some((auto_delete_at,)) = row else {
        return Err(AppError::Conflict("Item is not in the archive".to_string()));
    };

    if !purge_eligible(&auto_delete_at, Utc::now()) {
        return Err(AppError::Conflict(
            "Retention window has not elapsed".to_string(),
        ));
    }

    sqlx::query("DELETE FROM archived_items WHERE id = ?")
        .bind(archived_id)
        .execute(pool)
        .await?;
    Ok(())
}

/// Deletes every purge-eligible archived item and returns how many went.
/// Invoked from the operator CLI; scheduling is up to the host.
pub async fn sweep_expired(pool: &SqlitePool) -> Result<u64, AppError> {
    let rows: Vec<(String, String)> =
        sqlx::query_as("SELECT id, auto_delete_at FROM archived_items")
            .fetch_all(pool)
            .await?;

    let now = Utc::now();
    let mut purged = 0u64;
    for (id, auto_delete_at) in rows {
        if purge_eligible(&auto_delete_at, now) {
            sqlx::query("DELETE FROM archived_items WHERE id = ?")
                .bind(&id)
                .execute(pool)
                .await?;
            purged += 1;
        }
    }
    Ok(purged)
}

/// Strictly past the deadline. An unparseable stamp is treated as expired
/// rather than held forever.
pub fn purge_eligible(auto_delete_at: &str, now: DateTime<Utc>) -> bool {
    match auto_delete_at.parse::<DateTime<Utc>>() {
        Ok(deadline) => now > deadline,
        Err(_) => true,
    }
}

/// Whole days until the purge deadline, rounded up and clamped to >= 0, so a
/// remainder of 6.1 days reads as 7. Exactly at the deadline this is 0.
pub fn days_until_deletion(auto_delete_at: &str, now: DateTime<Utc>) -> i64 {
    let Ok(deadline) = auto_delete_at.parse::<DateTime<Utc>>() else {
        return 0;
    };
    let secs = (deadline - now).num_seconds();
    if secs <= 0 { 0 } else { (secs + 86_399) / 86_400 }
}
