//! Profile upsert and lookup.

#![allow(clippy::unwrap_used)]

use axum::http::StatusCode;
use serde_json::json;

use helpdesk_integration_tests::TestApp;

#[tokio::test]
async fn upsert_creates_then_updates_given_fields() {
    let app = TestApp::new();

    let created = app
        .post(
            "/profile/updateProfile",
            json!({
                "uid": "emp-7",
                "name": "Ravi",
                "phone": "+919800000007",
                "department": "IT"
            }),
        )
        .await;
    assert_eq!(created.status, StatusCode::OK);
    assert_eq!(created.message(), "Profile updated successfully");
    assert_eq!(created.body["profile"]["phone"], "+919800000007");

    let updated = app
        .post(
            "/profile/updateProfile",
            json!({ "uid": "emp-7", "department": "Load Dispatch" }),
        )
        .await;
    assert_eq!(updated.status, StatusCode::OK);

    let shown = app.get("/profile/getProfile/emp-7", None).await;
    assert_eq!(shown.status, StatusCode::OK);
    assert_eq!(shown.body["uid"], "emp-7");
    assert_eq!(shown.body["department"], "Load Dispatch");
    assert_eq!(shown.body["name"], "Ravi");
    assert_eq!(shown.body["phone"], "+919800000007");
    assert!(shown.body["role"].is_null());
}

#[tokio::test]
async fn upsert_requires_uid() {
    let app = TestApp::new();
    let response = app
        .post("/profile/updateProfile", json!({ "name": "Nobody" }))
        .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.message(), "UID is required");
}

#[tokio::test]
async fn missing_profile_is_not_found() {
    let app = TestApp::new();
    let response = app.get("/profile/getProfile/ghost", None).await;

    assert_eq!(response.status, StatusCode::NOT_FOUND);
    assert_eq!(response.message(), "Profile not found");
}
