use askama::Template;
use axum::{
    extract::{Path, State},
    response::{Html, IntoResponse, Redirect},
    routing::{delete, get, post},
    Form, Router,
};
use serde::Deserialize;
use sqlx::{FromRow, SqlitePool};
use std::collections::HashMap;
use tower_sessions::Session;

use crate::auth::AuthUser;
use crate::copies;
use crate::error::AppError;
use crate::models::{CollectionItem, Item, PrintCollection, User};
use crate::AppState;

#[derive(Template)]
#[template(path = "collections/list.html")]
struct CollectionListTemplate {
    collections: Vec<CollectionView>,

    user: Option<User>,
}

#[derive(Template)]
#[template(path = "collections/form.html")]
struct CollectionFormTemplate {
    collection: Option<PrintCollection>,
    errors: HashMap<String, String>,

    user: Option<User>,
}

#[derive(Template)]
#[template(path = "collections/show.html")]
struct CollectionShowTemplate {
    collection: PrintCollection,
    members: Vec<MemberView>,
    available: Vec<Item>,

    user: Option<User>,
}

struct CollectionView {
    id: String,
    name: String,
    item_count: i64,
}

struct MemberView {
    item: Item,
    copies: u32,
}

/// Collection with member count for queries that join with collection_items
#[derive(FromRow)]
struct CollectionWithCount {
    // Collection fields
    id: String,
    name: String,
    created_by: String,
    created_at: String,
    updated_at: String,
    // Extra field
    item_count: i64,
}

impl CollectionWithCount {
    fn into_collection_and_count(self) -> (PrintCollection, i64) {
        let collection = PrintCollection {
            id: self.id,
            name: self.name,
            created_by: self.created_by,
            created_at: self.created_at,
            updated_at: self.updated_at,
        };
        (collection, self.item_count)
    }
}

#[derive(Deserialize)]
pub struct CollectionForm {
    name: String,
}

#[derive(Deserialize)]
pub struct MembersForm {
    item_ids: String,
}

#[derive(Deserialize)]
pub struct CopiesForm {
    item_id: String,
    copies: String,
}

fn validate_collection_form(form: &CollectionForm) -> HashMap<String, String> {
    let mut errors = HashMap::new();

    if form.name.trim().is_empty() {
        errors.insert("name".to_string(), "Name is required".to_string());
    }

    if form.name.len() > 100 {
        errors.insert("name".to_string(), "Name must be under 100 characters".to_string());
    }

    errors
}

/// Splits a comma-separated id list, dropping empties.
fn parse_item_ids(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

/// Resolves a collection's membership into concrete item records. Rows whose
/// item no longer exists (deleted or archived out of the active set) are
/// dropped silently rather than erroring.
pub async fn resolve_members(
    db: &SqlitePool,
    collection_id: &str,
) -> Result<Vec<Item>, sqlx::Error> {
    sqlx::query_as(
        r#"
        SELECT i.* FROM items i
        JOIN collection_items ci ON ci.item_id = i.id
        WHERE ci.collection_id = ?
        ORDER BY ci.added_at, i.unique_id
        "#,
    )
    .bind(collection_id)
    .fetch_all(db)
    .await
}

pub async fn find_collection(
    db: &SqlitePool,
    collection_id: &str,
) -> Result<Option<PrintCollection>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM print_collections WHERE id = ?")
        .bind(collection_id)
        .fetch_optional(db)
        .await
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/collections", get(list_collections))
        .route("/collections/new", get(new_collection_form))
        .route("/collections", post(create_collection))
        .route("/collections/{id}", get(show_collection))
        .route("/collections/{id}", post(rename_collection))
        .route("/collections/{id}", delete(delete_collection))
        .route("/collections/{id}/items", post(add_items))
        .route("/collections/{id}/items/remove", post(remove_items))
        .route("/collections/{id}/copies", post(set_copy_count))
}

async fn list_collections(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
) -> Result<impl IntoResponse, AppError> {
    let collections: Vec<CollectionWithCount> = sqlx::query_as(
        r#"
        SELECT c.*, COUNT(ci.item_id) as item_count
        FROM print_collections c
        LEFT JOIN collection_items ci ON ci.collection_id = c.id
        GROUP BY c.id
        ORDER BY c.updated_at DESC
        "#,
    )
    .fetch_all(&state.db)
    .await
    .unwrap_or_default();

    let views: Vec<CollectionView> = collections
        .into_iter()
        .map(|cwc| {
            let (c, count) = cwc.into_collection_and_count();
            CollectionView {
                id: c.id,
                name: c.name,
                item_count: count,
            }
        })
        .collect();

    let template = CollectionListTemplate {
        collections: views,

        user: Some(user),
    };
    Ok(Html(template.render()?))
}

async fn new_collection_form(AuthUser(user): AuthUser) -> Result<impl IntoResponse, AppError> {
    let template = CollectionFormTemplate {
        collection: None,
        errors: HashMap::new(),

        user: Some(user),
    };
    Ok(Html(template.render()?))
}

async fn create_collection(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Form(form): Form<CollectionForm>,
) -> Result<impl IntoResponse, AppError> {
    let errors = validate_collection_form(&form);
    if !errors.is_empty() {
        let template = CollectionFormTemplate {
            collection: None,
            errors,
            user: Some(user),
        };
        return Ok(Html(template.render()?).into_response());
    }

    let collection = PrintCollection::new(form.name.trim().to_string(), user.id);

    sqlx::query(
        "INSERT INTO print_collections (id, name, created_by, created_at, updated_at) VALUES (?, ?, ?, ?, ?)",
    )
    .bind(&collection.id)
    .bind(&collection.name)
    .bind(&collection.created_by)
    .bind(&collection.created_at)
    .bind(&collection.updated_at)
    .execute(&state.db)
    .await?;

    Ok(Redirect::to(&format!("/collections/{}", collection.id)).into_response())
}

async fn show_collection(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    session: Session,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let Some(collection) = find_collection(&state.db, &id).await? else {
        return Ok(Redirect::to("/collections").into_response());
    };

    let items = resolve_members(&state.db, &id).await?;
    let copy_counts = copies::load(&session).await?;
    let members: Vec<MemberView> = items
        .into_iter()
        .map(|item| {
            let copies = copy_counts.get(&item.id).copied().unwrap_or(1);
            MemberView { item, copies }
        })
        .collect();

    let available: Vec<Item> = sqlx::query_as(
        r#"
        SELECT * FROM items
        WHERE id NOT IN (SELECT item_id FROM collection_items WHERE collection_id = ?)
        ORDER BY unique_id
        "#,
    )
    .bind(&id)
    .fetch_all(&state.db)
    .await
    .unwrap_or_default();

    let template = CollectionShowTemplate {
        collection,
        members,
        available,

        user: Some(user),
    };
    Ok(Html(template.render()?).into_response())
}

async fn rename_collection(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(id): Path<String>,
    Form(form): Form<CollectionForm>,
) -> Result<impl IntoResponse, AppError> {
    let errors = validate_collection_form(&form);
    if !errors.is_empty() {
        let collection = find_collection(&state.db, &id).await?;
        let template = CollectionFormTemplate {
            collection,
            errors,
            user: Some(user),
        };
        return Ok(Html(template.render()?).into_response());
    }

    let now = chrono::Utc::now().to_rfc3339();

    let result = sqlx::query("UPDATE print_collections SET name = ?, updated_at = ? WHERE id = ?")
        .bind(form.name.trim())
        .bind(&now)
        .bind(&id)
        .execute(&state.db)
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound);
    }

    Ok(Redirect::to(&format!("/collections/{}", id)).into_response())
}

async fn delete_collection(
    State(state): State<AppState>,
    AuthUser(_user): AuthUser,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    // Membership rows go with the collection; the items themselves are never
    // touched.
    let mut tx = state.db.begin().await?;
    sqlx::query("DELETE FROM collection_items WHERE collection_id = ?")
        .bind(&id)
        .execute(&mut *tx)
        .await?;
    sqlx::query("DELETE FROM print_collections WHERE id = ?")
        .bind(&id)
        .execute(&mut *tx)
        .await?;
    tx.commit().await?;

    Ok(([("HX-Redirect", "/collections")], ""))
}

async fn add_items(
    State(state): State<AppState>,
    AuthUser(_user): AuthUser,
    Path(id): Path<String>,
    Form(form): Form<MembersForm>,
) -> Result<impl IntoResponse, AppError> {
    if find_collection(&state.db, &id).await?.is_none() {
        return Err(AppError::NotFound);
    }

    let item_ids = parse_item_ids(&form.item_ids);
    if item_ids.is_empty() {
        return Err(AppError::Validation("No items selected".to_string()));
    }

    // Idempotent per pair: an item already in the collection is skipped
    // without failing the rest of the batch.
    for item_id in item_ids {
        let member = CollectionItem::new(id.clone(), item_id);
        sqlx::query(
            "INSERT OR IGNORE INTO collection_items (collection_id, item_id, added_at) VALUES (?, ?, ?)",
        )
        .bind(&member.collection_id)
        .bind(&member.item_id)
        .bind(&member.added_at)
        .execute(&state.db)
        .await?;
    }

    Ok(Redirect::to(&format!("/collections/{}", id)).into_response())
}

async fn remove_items(
    State(state): State<AppState>,
    AuthUser(_user): AuthUser,
    Path(id): Path<String>,
    Form(form): Form<MembersForm>,
) -> Result<impl IntoResponse, AppError> {
    let item_ids = parse_item_ids(&form.item_ids);
    if item_ids.is_empty() {
        return Err(AppError::Validation("No items selected".to_string()));
    }

    // Absent rows are a no-op.
    for item_id in item_ids {
        sqlx::query("DELETE FROM collection_items WHERE collection_id = ? AND item_id = ?")
            .bind(&id)
            .bind(&item_id)
            .execute(&state.db)
            .await?;
    }

    Ok(Redirect::to(&format!("/collections/{}", id)))
}

async fn set_copy_count(
    AuthUser(_user): AuthUser,
    session: Session,
    Path(id): Path<String>,
    Form(form): Form<CopiesForm>,
) -> Result<impl IntoResponse, AppError> {
    let Ok(count) = form.copies.trim().parse::<i64>() else {
        return Err(AppError::Validation("Copies must be a number".to_string()));
    };

    copies::set(&session, &form.item_id, count).await?;

    Ok(Redirect::to(&format!("/collections/{}", id)))
}
