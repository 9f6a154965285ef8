use askama::Template;
use axum::{
    extract::{Path, State},
    response::{Html, IntoResponse, Redirect},
    routing::{get, post},
    Form, Router,
};
use chrono::NaiveDate;
use serde::Deserialize;
use std::collections::HashMap;

use crate::archive;
use crate::auth::AuthUser;
use crate::error::AppError;
use crate::models::{Item, ItemCategory, ItemStatus, User};
use crate::AppState;

#[derive(Template)]
#[template(path = "items/list.html")]
struct ItemListTemplate {
    items: Vec<Item>,

    user: Option<User>,
}

#[derive(Template)]
#[template(path = "items/form.html")]
struct ItemFormTemplate {
    item: Option<Item>,
    statuses: &'static [ItemStatus],
    categories: &'static [ItemCategory],
    errors: HashMap<String, String>,

    user: Option<User>,
}

#[derive(Deserialize)]
pub struct ItemForm {
    unique_id: String,
    name: String,
    description: Option<String>,
    serial_number: Option<String>,
    property_number: Option<String>,
    acquisition_date: Option<String>,
    acquisition_cost: Option<String>,
    location: Option<String>,
    end_user: Option<String>,
    status: String,
    category: String,
    quantity: Option<String>,
    unit: Option<String>,
    image_url: Option<String>,
    remarks: Option<String>,
}

/// Typed field values extracted from a validated form.
struct ItemFields {
    status: ItemStatus,
    category: ItemCategory,
    quantity: i64,
    acquisition_cost: Option<f64>,
}

fn validate_item_form(form: &ItemForm) -> (HashMap<String, String>, ItemFields) {
    let mut errors = HashMap::new();

    if form.name.trim().is_empty() {
        errors.insert("name".to_string(), "Name is required".to_string());
    }

    if form.unique_id.trim().is_empty() {
        errors.insert("unique_id".to_string(), "Unique ID is required".to_string());
    }

    let status = ItemStatus::parse(&form.status).unwrap_or_else(|| {
        errors.insert("status".to_string(), "Unknown status".to_string());
        ItemStatus::Good
    });

    let category = ItemCategory::parse(&form.category).unwrap_or_else(|| {
        errors.insert("category".to_string(), "Unknown category".to_string());
        ItemCategory::Other
    });

    let quantity = match form.quantity.as_deref().filter(|s| !s.is_empty()) {
        None => 1,
        Some(raw) => match raw.parse::<i64>() {
            Ok(n) if n >= 1 => n,
            _ => {
                errors.insert("quantity".to_string(), "Quantity must be at least 1".to_string());
                1
            }
        },
    };

    let acquisition_cost = match form.acquisition_cost.as_deref().filter(|s| !s.is_empty()) {
        None => None,
        Some(raw) => match raw.parse::<f64>() {
            Ok(v) if v >= 0.0 => Some(v),
            _ => {
                errors.insert(
                    "acquisition_cost".to_string(),
                    "Cost must be a non-negative number".to_string(),
                );
                None
            }
        },
    };

    if let Some(raw) = form.acquisition_date.as_deref().filter(|s| !s.is_empty()) {
        if NaiveDate::parse_from_str(raw, "%Y-%m-%d").is_err() {
            errors.insert(
                "acquisition_date".to_string(),
                "Date must be YYYY-MM-DD".to_string(),
            );
        }
    }

    (
        errors,
        ItemFields {
            status,
            category,
            quantity,
            acquisition_cost,
        },
    )
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_items))
        .route("/items/new", get(new_item_form))
        .route("/items", post(create_item))
        .route("/items/{id}/edit", get(edit_item_form))
        .route("/items/{id}", post(update_item))
        .route("/items/{id}/archive", post(archive_item))
}

async fn list_items(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
) -> Result<impl IntoResponse, AppError> {
    let items: Vec<Item> = sqlx::query_as("SELECT * FROM items ORDER BY updated_at DESC")
        .fetch_all(&state.db)
        .await
        .unwrap_or_default();

    let template = ItemListTemplate {
        items,

        user: Some(user),
    };
    Ok(Html(template.render()?))
}

async fn new_item_form(AuthUser(user): AuthUser) -> Result<impl IntoResponse, AppError> {
    let template = ItemFormTemplate {
        item: None,
        statuses: &ItemStatus::ALL,
        categories: &ItemCategory::ALL,
        errors: HashMap::new(),

        user: Some(user),
    };
    Ok(Html(template.render()?))
}

async fn create_item(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Form(form): Form<ItemForm>,
) -> Result<impl IntoResponse, AppError> {
    let (mut errors, fields) = validate_item_form(&form);

    if errors.is_empty() {
        let taken: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM items WHERE unique_id = ?")
            .bind(form.unique_id.trim())
            .fetch_one(&state.db)
            .await?;
        if taken.0 > 0 {
            errors.insert(
                "unique_id".to_string(),
                "Unique ID is already in use".to_string(),
            );
        }
    }

    if !errors.is_empty() {
        let template = ItemFormTemplate {
            item: None,
            statuses: &ItemStatus::ALL,
            categories: &ItemCategory::ALL,
            errors,
            user: Some(user),
        };
        return Ok(Html(template.render()?).into_response());
    }

    let now = chrono::Utc::now().to_rfc3339();
    let id = uuid::Uuid::new_v4().to_string();

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
    .bind(form.unique_id.trim())
    .bind(form.name.trim())
    .bind(form.description.filter(|s| !s.is_empty()))
    .bind(form.serial_number.filter(|s| !s.is_empty()))
    .bind(form.property_number.filter(|s| !s.is_empty()))
    .bind(form.acquisition_date.filter(|s| !s.is_empty()))
    .bind(fields.acquisition_cost)
    .bind(form.location.filter(|s| !s.is_empty()))
    .bind(form.end_user.filter(|s| !s.is_empty()))
    .bind(fields.status)
    .bind(fields.category)
    .bind(fields.quantity)
    .bind(form.unit.filter(|s| !s.is_empty()))
    .bind(form.image_url.filter(|s| !s.is_empty()))
    .bind(form.remarks.filter(|s| !s.is_empty()))
    .bind(&now)
    .bind(&now)
    .execute(&state.db)
    .await?;

    Ok(Redirect::to("/").into_response())
}

async fn edit_item_form(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let item: Option<Item> = sqlx::query_as("SELECT * FROM items WHERE id = ?")
        .bind(&id)
        .fetch_optional(&state.db)
        .await?;

    let Some(item) = item else {
        return Err(AppError::NotFound);
    };

    let template = ItemFormTemplate {
        item: Some(item),
        statuses: &ItemStatus::ALL,
        categories: &ItemCategory::ALL,
        errors: HashMap::new(),

        user: Some(user),
    };
    Ok(Html(template.render()?))
}

async fn update_item(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(id): Path<String>,
    Form(form): Form<ItemForm>,
) -> Result<impl IntoResponse, AppError> {
    let item: Option<Item> = sqlx::query_as("SELECT * FROM items WHERE id = ?")
        .bind(&id)
        .fetch_optional(&state.db)
        .await?;

    let Some(item) = item else {
        return Err(AppError::NotFound);
    };

    let (errors, fields) = validate_item_form(&form);
    if !errors.is_empty() {
        let template = ItemFormTemplate {
            item: Some(item),
            statuses: &ItemStatus::ALL,
            categories: &ItemCategory::ALL,
            errors,
            user: Some(user),
        };
        return Ok(Html(template.render()?).into_response());
    }

    let now = chrono::Utc::now().to_rfc3339();

    // unique_id is immutable once created: printed labels reference it.
    sqlx::query(
        r#"
        UPDATE items
        SET name = ?, description = ?, serial_number = ?, property_number = ?,
            acquisition_date = ?, acquisition_cost = ?, location = ?,
            end_user = ?, status = ?, category = ?, quantity = ?, unit = ?,
            image_url = ?, remarks = ?, updated_at = ?
        WHERE id = ?
        "#,
    )
    .bind(form.name.trim())
    .bind(form.description.filter(|s| !s.is_empty()))
    .bind(form.serial_number.filter(|s| !s.is_empty()))
    .bind(form.property_number.filter(|s| !s.is_empty()))
    .bind(form.acquisition_date.filter(|s| !s.is_empty()))
    .bind(fields.acquisition_cost)
    .bind(form.location.filter(|s| !s.is_empty()))
    .bind(form.end_user.filter(|s| !s.is_empty()))
    .bind(fields.status)
    .bind(fields.category)
    .bind(fields.quantity)
    .bind(form.unit.filter(|s| !s.is_empty()))
    .bind(form.image_url.filter(|s| !s.is_empty()))
    .bind(form.remarks.filter(|s| !s.is_empty()))
    .bind(&now)
    .bind(&id)
    .execute(&state.db)
    .await?;

    Ok(Redirect::to("/").into_response())
}

async fn archive_item(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    archive::archive_item(&state.db, &id, &user.id).await?;
    Ok(Redirect::to("/"))
}
