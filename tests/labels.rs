mod common;

use axum::http::StatusCode;
use common::{body_bytes, body_string, TestApp};

fn sticker_count(html: &str) -> usize {
    html.matches("<div class=\"sticker\">").count()
}

fn page_count(html: &str) -> usize {
    html.matches("<div class=\"page\">").count()
}

// --- Single-item sticker ---

#[tokio::test]
async fn sticker_preview_shows_label_fields() {
    let app = TestApp::new().await;
    let (_user_id, invite_code) = app.create_user("Custodian").await;
    let cookie = app.login(&invite_code).await;

    let item_id = app.create_item("INV-500", "Laptop").await;

    let resp = app
        .get(&format!("/items/{}/sticker", item_id), Some(&cookie))
        .await;
    assert_eq!(resp.status(), StatusCode::OK);
    let html = body_string(resp).await;
    assert!(html.contains("INV-500"));
    assert!(html.contains("DO NOT REMOVE"));
    assert!(html.contains("data:image/png;base64,"));
}

#[tokio::test]
async fn sticker_png_downloads_as_attachment() {
    let app = TestApp::new().await;
    let (_user_id, invite_code) = app.create_user("Custodian").await;
    let cookie = app.login(&invite_code).await;

    let item_id = app.create_item("INV-501", "Monitor").await;

    let resp = app
        .get(&format!("/items/{}/sticker.png", item_id), Some(&cookie))
        .await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(
        resp.headers().get("content-type").unwrap().to_str().unwrap(),
        "image/png"
    );
    let disposition = resp
        .headers()
        .get("content-disposition")
        .unwrap()
        .to_str()
        .unwrap()
        .to_string();
    assert!(disposition.contains("sticker-INV-501.png"));

    let bytes = body_bytes(resp).await;
    assert_eq!(&bytes[..8], b"\x89PNG\r\n\x1a\n");
}

#[tokio::test]
async fn single_sticker_print_is_one_page() {
    let app = TestApp::new().await;
    let (_user_id, invite_code) = app.create_user("Custodian").await;
    let cookie = app.login(&invite_code).await;

    let item_id = app.create_item("INV-502", "Tablet").await;

    let resp = app
        .get(&format!("/items/{}/sticker/print", item_id), Some(&cookie))
        .await;
    assert_eq!(resp.status(), StatusCode::OK);
    let html = body_string(resp).await;
    assert_eq!(page_count(&html), 1);
    assert_eq!(sticker_count(&html), 1);
    assert!(html.contains("window.print()"));
}

// --- Batch print ---

#[tokio::test]
async fn print_paginates_ten_labels_per_page() {
    let app = TestApp::new().await;
    let (user_id, invite_code) = app.create_user("Admin").await;
    let cookie = app.login(&invite_code).await;

    let col_id = app.create_collection("Big Batch", &user_id).await;
    for i in 0..23 {
        let item_id = app.create_item(&format!("INV-6{:02}", i), "Asset").await;
        app.add_member(&col_id, &item_id).await;
    }

    let resp = app
        .get(&format!("/collections/{}/labels/print", col_id), Some(&cookie))
        .await;
    assert_eq!(resp.status(), StatusCode::OK);
    let html = body_string(resp).await;
    assert_eq!(page_count(&html), 3);
    assert_eq!(sticker_count(&html), 23);
}

#[tokio::test]
async fn print_expands_session_copy_counts() {
    let app = TestApp::new().await;
    let (user_id, invite_code) = app.create_user("Admin").await;
    let cookie = app.login(&invite_code).await;

    let col_id = app.create_collection("Copies", &user_id).await;
    let a = app.create_item("INV-700", "Projector").await;
    let b = app.create_item("INV-701", "Screen").await;
    app.add_member(&col_id, &a).await;
    app.add_member(&col_id, &b).await;

    let resp = app
        .post_form(
            &format!("/collections/{}/copies", col_id),
            &format!("item_id={}&copies=3", a),
            Some(&cookie),
        )
        .await;
    assert!(resp.status().is_redirection());

    let resp = app
        .get(&format!("/collections/{}/labels/print", col_id), Some(&cookie))
        .await;
    let html = body_string(resp).await;
    assert_eq!(sticker_count(&html), 4);
    assert_eq!(html.matches("INV-700").count(), 3);
    assert_eq!(html.matches("INV-701").count(), 1);
}

#[tokio::test]
async fn copy_counts_clamp_and_reset() {
    let app = TestApp::new().await;
    let (user_id, invite_code) = app.create_user("Admin").await;
    let cookie = app.login(&invite_code).await;

    let col_id = app.create_collection("Clamped", &user_id).await;
    let item_id = app.create_item("INV-702", "Podium").await;
    app.add_member(&col_id, &item_id).await;

    app.post_form(
        &format!("/collections/{}/copies", col_id),
        &format!("item_id={}&copies=150", item_id),
        Some(&cookie),
    )
    .await;
    let html = body_string(
        app.get(&format!("/collections/{}", col_id), Some(&cookie)).await,
    )
    .await;
    assert!(html.contains("value=\"99\""));

    // Zero removes the override and reverts to the default of 1.
    app.post_form(
        &format!("/collections/{}/copies", col_id),
        &format!("item_id={}&copies=0", item_id),
        Some(&cookie),
    )
    .await;
    let html = body_string(
        app.get(&format!("/collections/{}", col_id), Some(&cookie)).await,
    )
    .await;
    assert!(html.contains("value=\"1\""));
}

#[tokio::test]
async fn print_unknown_collection_is_not_found() {
    let app = TestApp::new().await;
    let (_user_id, invite_code) = app.create_user("Admin").await;
    let cookie = app.login(&invite_code).await;

    let resp = app
        .get("/collections/nope/labels/print", Some(&cookie))
        .await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

// --- ZIP download ---

#[tokio::test]
async fn zip_download_contains_one_entry_per_item() {
    let app = TestApp::new().await;
    let (user_id, invite_code) = app.create_user("Admin").await;
    let cookie = app.login(&invite_code).await;

    let col_id = app.create_collection("Zipped", &user_id).await;
    for uid in ["INV-800", "INV-801", "INV-802"] {
        let item_id = app.create_item(uid, "Asset").await;
        app.add_member(&col_id, &item_id).await;
    }

    let resp = app
        .get(&format!("/collections/{}/labels/download", col_id), Some(&cookie))
        .await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(
        resp.headers().get("content-type").unwrap().to_str().unwrap(),
        "application/zip"
    );
    let disposition = resp
        .headers()
        .get("content-disposition")
        .unwrap()
        .to_str()
        .unwrap()
        .to_string();
    assert!(disposition.contains("property-stickers-"));
    assert!(disposition.ends_with(".zip\""));

    let bytes = body_bytes(resp).await;
    let mut archive = zip::ZipArchive::new(std::io::Cursor::new(bytes)).unwrap();
    assert_eq!(archive.len(), 3);
    let names: Vec<String> = (0..archive.len())
        .map(|i| archive.by_index(i).unwrap().name().to_string())
        .collect();
    assert!(names.contains(&"sticker-INV-800.png".to_string()));
    assert!(names.contains(&"sticker-INV-801.png".to_string()));
    assert!(names.contains(&"sticker-INV-802.png".to_string()));
}

#[tokio::test]
async fn zip_download_skips_unrenderable_item() {
    let app = TestApp::new().await;
    let (user_id, invite_code) = app.create_user("Admin").await;
    let cookie = app.login(&invite_code).await;

    let col_id = app.create_collection("Lossy", &user_id).await;
    let good_a = app.create_item("INV-900", "Asset").await;
    let good_b = app.create_item("INV-901", "Asset").await;
    // Too long to fit a QR symbol even at version 40; its render fails and
    // the batch must carry on.
    let unrenderable = app.create_item(&"X".repeat(3000), "Oversized").await;
    app.add_member(&col_id, &good_a).await;
    app.add_member(&col_id, &unrenderable).await;
    app.add_member(&col_id, &good_b).await;

    let resp = app
        .get(&format!("/collections/{}/labels/download", col_id), Some(&cookie))
        .await;
    assert_eq!(resp.status(), StatusCode::OK);

    let bytes = body_bytes(resp).await;
    let archive = zip::ZipArchive::new(std::io::Cursor::new(bytes)).unwrap();
    assert_eq!(archive.len(), 2);
}

#[tokio::test]
async fn zip_download_of_empty_collection_is_empty_archive() {
    let app = TestApp::new().await;
    let (user_id, invite_code) = app.create_user("Admin").await;
    let cookie = app.login(&invite_code).await;

    let col_id = app.create_collection("Hollow", &user_id).await;

    let resp = app
        .get(&format!("/collections/{}/labels/download", col_id), Some(&cookie))
        .await;
    assert_eq!(resp.status(), StatusCode::OK);

    let bytes = body_bytes(resp).await;
    let archive = zip::ZipArchive::new(std::io::Cursor::new(bytes)).unwrap();
    assert_eq!(archive.len(), 0);
}
