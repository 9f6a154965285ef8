use askama::Template;
use axum::{
    extract::{Path, State},
    http::{header, HeaderMap, HeaderValue},
    response::{Html, IntoResponse},
    routing::get,
    Router,
};
use tower_sessions::Session;

use crate::auth::AuthUser;
use crate::copies;
use crate::error::AppError;
use crate::labels::{
    exporter, renderer, CancelToken, ExportOptions, ExportSession, PngRasterizer, Rasterizer,
    RenderedLabel,
};
use crate::models::{Item, User};
use crate::routes::collections::{find_collection, resolve_members};
use crate::AppState;

#[derive(Template)]
#[template(path = "labels/print.html")]
struct PrintTemplate {
    title: String,
    pages: Vec<Vec<RenderedLabel>>,
}

#[derive(Template)]
#[template(path = "items/sticker.html")]
struct StickerTemplate {
    item: Item,
    label: RenderedLabel,
    static_hash: &'static str,

    user: Option<User>,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/items/{id}/sticker", get(sticker_preview))
        .route("/items/{id}/sticker/print", get(sticker_print))
        .route("/items/{id}/sticker.png", get(sticker_png))
        .route("/collections/{id}/labels/print", get(print_collection))
        .route("/collections/{id}/labels/download", get(download_collection))
}

async fn load_item(state: &AppState, id: &str) -> Result<Item, AppError> {
    let item: Option<Item> = sqlx::query_as("SELECT * FROM items WHERE id = ?")
        .bind(id)
        .fetch_optional(&state.db)
        .await?;
    item.ok_or(AppError::NotFound)
}

fn rendered_label(item: &Item) -> Result<RenderedLabel, AppError> {
    let doc = renderer::render(item)?;
    let qr_data_uri = renderer::qr_data_uri(&doc)?;
    Ok(RenderedLabel { doc, qr_data_uri })
}

async fn sticker_preview(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let item = load_item(&state, &id).await?;
    let label = rendered_label(&item)?;

    let template = StickerTemplate {
        item,
        label,
        static_hash: crate::STATIC_HASH,

        user: Some(user),
    };
    Ok(Html(template.render()?))
}

async fn sticker_print(
    State(state): State<AppState>,
    AuthUser(_user): AuthUser,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let item = load_item(&state, &id).await?;
    let label = rendered_label(&item)?;

    let template = PrintTemplate {
        title: format!("Property Sticker - {}", item.name),
        pages: vec![vec![label]],
    };
    Ok(Html(template.render()?))
}

async fn sticker_png(
    State(state): State<AppState>,
    AuthUser(_user): AuthUser,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let item = load_item(&state, &id).await?;
    let doc = renderer::render(&item)?;
    let png = PngRasterizer::default().capture(&doc)?;

    let content_disposition =
        format!("attachment; filename=\"{}\"", exporter::sticker_file_name(&item));

    let mut headers = HeaderMap::new();
    headers.insert(header::CONTENT_TYPE, HeaderValue::from_static("image/png"));
    headers.insert(
        header::CONTENT_DISPOSITION,
        HeaderValue::from_str(&content_disposition).unwrap(),
    );

    Ok((headers, png))
}

/// Print the whole collection: membership resolved to items, expanded by the
/// session's per-item copy counts, laid out 10 to a page. The response is the
/// print document itself; the browser opens the print dialog on load and the
/// server is done.
async fn print_collection(
    State(state): State<AppState>,
    AuthUser(_user): AuthUser,
    session: Session,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let Some(collection) = find_collection(&state.db, &id).await? else {
        return Err(AppError::NotFound);
    };

    let items = resolve_members(&state.db, &id).await?;
    let copy_counts = copies::load(&session).await?;
    let export = ExportSession::from_items(items, &copy_counts);

    let job = exporter::build_print_job(&export);
    if job.skipped > 0 {
        tracing::warn!(
            "Print job for collection {} skipped {} of {} labels",
            collection.name,
            job.skipped,
            job.attempted
        );
    }

    let template = PrintTemplate {
        title: format!("Property Stickers - {}", collection.name),
        pages: job.pages,
    };
    Ok(Html(template.render()?))
}

/// Download the collection as a ZIP of individually rasterized sticker PNGs.
/// Copy counts do not apply here; failed items are skipped and the rest of
/// the batch continues.
async fn download_collection(
    State(state): State<AppState>,
    AuthUser(_user): AuthUser,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    if find_collection(&state.db, &id).await?.is_none() {
        return Err(AppError::NotFound);
    }

    let items = resolve_members(&state.db, &id).await?;
    let export = ExportSession::new(items.into_iter().map(|item| (item, 1)).collect());

    let rasterizer = PngRasterizer::default();
    let report = exporter::export_zip(
        &export,
        &rasterizer,
        &ExportOptions::default(),
        &CancelToken::new(),
        |p| tracing::debug!("sticker export progress: {p}%"),
    )?;

    tracing::info!(
        "Sticker export finished: {} of {} succeeded",
        report.succeeded,
        report.attempted
    );

    let content_disposition = format!("attachment; filename=\"{}\"", report.file_name);

    let mut headers = HeaderMap::new();
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("application/zip"),
    );
    headers.insert(
        header::CONTENT_DISPOSITION,
        HeaderValue::from_str(&content_disposition).unwrap(),
    );

    Ok((headers, report.archive.unwrap_or_default()))
}
