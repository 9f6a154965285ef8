mod common;

use axum::http::StatusCode;
use common::{assert_redirect, body_string, TestApp};

#[tokio::test]
async fn create_item_via_form() {
    let app = TestApp::new().await;
    let (_user_id, invite_code) = app.create_user("Custodian").await;
    let cookie = app.login(&invite_code).await;

    let resp = app
        .post_form(
            "/items",
            "unique_id=INV-1000&name=New+Laptop&status=Brand+New&category=Electronics&quantity=2&acquisition_cost=1500.50",
            Some(&cookie),
        )
        .await;
    assert_redirect(&resp, "/");

    let row: (String, String, i64, f64) = sqlx::query_as(
        "SELECT name, status, quantity, acquisition_cost FROM items WHERE unique_id = ?",
    )
    .bind("INV-1000")
    .fetch_one(&app.db)
    .await
    .unwrap();
    assert_eq!(row.0, "New Laptop");
    assert_eq!(row.1, "Brand New");
    assert_eq!(row.2, 2);
    assert_eq!(row.3, 1500.50);
}

#[tokio::test]
async fn create_item_requires_name_and_unique_id() {
    let app = TestApp::new().await;
    let (_user_id, invite_code) = app.create_user("Custodian").await;
    let cookie = app.login(&invite_code).await;

    let resp = app
        .post_form(
            "/items",
            "unique_id=&name=&status=Good&category=Other",
            Some(&cookie),
        )
        .await;
    assert_eq!(resp.status(), StatusCode::OK);
    let html = body_string(resp).await;
    assert!(html.contains("Name is required"));
    assert!(html.contains("Unique ID is required"));

    let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM items")
        .fetch_one(&app.db)
        .await
        .unwrap();
    assert_eq!(count.0, 0);
}

#[tokio::test]
async fn duplicate_unique_id_is_rejected() {
    let app = TestApp::new().await;
    let (_user_id, invite_code) = app.create_user("Custodian").await;
    let cookie = app.login(&invite_code).await;

    app.create_item("INV-1001", "Original").await;

    let resp = app
        .post_form(
            "/items",
            "unique_id=INV-1001&name=Copycat&status=Good&category=Other",
            Some(&cookie),
        )
        .await;
    assert_eq!(resp.status(), StatusCode::OK);
    let html = body_string(resp).await;
    assert!(html.contains("Unique ID is already in use"));

    let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM items WHERE unique_id = ?")
        .bind("INV-1001")
        .fetch_one(&app.db)
        .await
        .unwrap();
    assert_eq!(count.0, 1);
}

#[tokio::test]
async fn update_item_never_touches_unique_id() {
    let app = TestApp::new().await;
    let (_user_id, invite_code) = app.create_user("Custodian").await;
    let cookie = app.login(&invite_code).await;

    let item_id = app.create_item("INV-1002", "Before").await;

    let resp = app
        .post_form(
            &format!("/items/{}", item_id),
            "unique_id=INV-HACKED&name=After&status=Repair+Needed&category=Furniture",
            Some(&cookie),
        )
        .await;
    assert_redirect(&resp, "/");

    let row: (String, String, String) =
        sqlx::query_as("SELECT unique_id, name, status FROM items WHERE id = ?")
            .bind(&item_id)
            .fetch_one(&app.db)
            .await
            .unwrap();
    assert_eq!(row.0, "INV-1002");
    assert_eq!(row.1, "After");
    assert_eq!(row.2, "Repair Needed");
}

#[tokio::test]
async fn invalid_quantity_redisplays_form() {
    let app = TestApp::new().await;
    let (_user_id, invite_code) = app.create_user("Custodian").await;
    let cookie = app.login(&invite_code).await;

    let resp = app
        .post_form(
            "/items",
            "unique_id=INV-1003&name=Thing&status=Good&category=Other&quantity=0",
            Some(&cookie),
        )
        .await;
    assert_eq!(resp.status(), StatusCode::OK);
    let html = body_string(resp).await;
    assert!(html.contains("Quantity must be at least 1"));
}

#[tokio::test]
async fn item_list_shows_inventory() {
    let app = TestApp::new().await;
    let (_user_id, invite_code) = app.create_user("Custodian").await;
    let cookie = app.login(&invite_code).await;

    app.create_item("INV-1004", "Visible Asset").await;

    let resp = app.get("/", Some(&cookie)).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let html = body_string(resp).await;
    assert!(html.contains("INV-1004"));
    assert!(html.contains("Visible Asset"));
}
