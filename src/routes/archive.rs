use askama::Template;
use axum::{
    extract::{Path, Query, State},
    response::{Html, IntoResponse, Redirect},
    routing::{delete, get, post},
    Router,
};
use chrono::Utc;
use serde::Deserialize;

use crate::archive;
use crate::auth::AuthUser;
use crate::error::AppError;
use crate::models::{ArchivedItem, User};
use crate::AppState;

#[derive(Template)]
#[template(path = "archive/list.html")]
struct ArchiveListTemplate {
    entries: Vec<ArchivedView>,
    total: usize,
    expiring_soon: usize,
    expiring_today: usize,
    query: String,

    user: Option<User>,
}

struct ArchivedView {
    item: ArchivedItem,
    days_left: i64,
}

#[derive(Deserialize)]
pub struct ArchiveQuery {
    q: Option<String>,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/archive", get(list_archived))
        .route("/archive/{id}/restore", post(restore_item))
        .route("/archive/{id}", delete(purge_item))
}

async fn list_archived(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Query(params): Query<ArchiveQuery>,
) -> Result<impl IntoResponse, AppError> {
    let archived: Vec<ArchivedItem> =
        sqlx::query_as("SELECT * FROM archived_items ORDER BY archived_at DESC")
            .fetch_all(&state.db)
            .await
            .unwrap_or_default();

    let now = Utc::now();
    let entries: Vec<ArchivedView> = archived
        .into_iter()
        .map(|item| ArchivedView {
            days_left: archive::days_until_deletion(&item.auto_delete_at, now),
            item,
        })
        .collect();

    // The expiry counters always reflect the whole archive, not the filtered
    // view.
    let total = entries.len();
    let expiring_soon = entries.iter().filter(|e| e.days_left <= 7).count();
    let expiring_today = entries.iter().filter(|e| e.days_left == 0).count();

    let query = params.q.unwrap_or_default();
    let entries = if query.is_empty() {
        entries
    } else {
        let needle = query.to_lowercase();
        entries
            .into_iter()
            .filter(|e| {
                e.item.name.to_lowercase().contains(&needle)
                    || e.item.unique_id.to_lowercase().contains(&needle)
            })
            .collect()
    };

    let template = ArchiveListTemplate {
        entries,
        total,
        expiring_soon,
        expiring_today,
        query,

        user: Some(user),
    };
    Ok(Html(template.render()?))
}

async fn restore_item(
    State(state): State<AppState>,
    AuthUser(_user): AuthUser,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    archive::restore_item(&state.db, &id).await?;
    Ok(Redirect::to("/archive"))
}

async fn purge_item(
    State(state): State<AppState>,
    AuthUser(_user): AuthUser,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    archive::purge_item(&state.db, &id).await?;
    Ok(([("HX-Redirect", "/archive")], ""))
}
