//! Integration tests for taxonomy and catalog administration, plus health.

mod common;

use axum::http::StatusCode;
use common::{unique, TestHarness};
use serde_json::json;
use test_context::test_context;

#[test_context(TestHarness)]
#[tokio::test]
async fn health_reports_database(ctx: &TestHarness) {
    let res = ctx.api().get("/health").await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.json()["status"], "healthy");
    assert_eq!(res.json()["database"]["status"], "ok");
}

#[test_context(TestHarness)]
#[tokio::test]
async fn category_crud_derives_slug(ctx: &TestHarness) {
    let name = unique("Data Science");
    let res = ctx.api().post("/api/categories", json!({ "name": name })).await;
    assert_eq!(res.status, StatusCode::CREATED, "{}", res.text);
    let category = res.json();
    assert!(category["slug"].as_str().unwrap().starts_with("data-science-"));

    let id = category["id"].as_str().unwrap();
    let dup = ctx
        .api()
        .post(
            "/api/categories",
            json!({ "name": "Other", "slug": category["slug"] }),
        )
        .await;
    assert_eq!(dup.status, StatusCode::BAD_REQUEST);

    let updated = ctx
        .api()
        .put(
            &format!("/api/categories/{}", id),
            json!({ "name": name, "description": "Numbers" }),
        )
        .await;
    assert_eq!(updated.status, StatusCode::OK, "{}", updated.text);
    assert_eq!(updated.json()["description"], "Numbers");

    assert_eq!(
        ctx.api().delete(&format!("/api/categories/{}", id)).await.status,
        StatusCode::NO_CONTENT
    );
    assert_eq!(
        ctx.api().get(&format!("/api/categories/{}", id)).await.status,
        StatusCode::NOT_FOUND
    );
}

#[test_context(TestHarness)]
#[tokio::test]
async fn select_field_requires_options(ctx: &TestHarness) {
    let res = ctx
        .api()
        .post(
            "/api/custom-fields",
            json!({ "name": "Level", "field_type": "select", "applies_to": "job" }),
        )
        .await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);

    let wrong_target = ctx
        .api()
        .post(
            "/api/custom-fields",
            json!({ "name": "Level", "field_type": "text", "applies_to": "company" }),
        )
        .await;
    assert_eq!(wrong_target.status, StatusCode::BAD_REQUEST);
}

#[test_context(TestHarness)]
#[tokio::test]
async fn product_validation_and_active_filter(ctx: &TestHarness) {
    let negative = ctx
        .api()
        .post("/api/products", json!({ "name": "Broken", "price": -1 }))
        .await;
    assert_eq!(negative.status, StatusCode::BAD_REQUEST);

    let name = unique("Retired");
    let res = ctx
        .api()
        .post(
            "/api/products",
            json!({ "name": name, "price": "49.00", "active": false }),
        )
        .await;
    assert_eq!(res.status, StatusCode::CREATED, "{}", res.text);
    assert_eq!(res.json()["currency"], "USD");
    assert_eq!(res.json()["duration_days"], 30);

    let active = ctx.api().get("/api/products?active_only=true").await.json();
    assert!(!active
        .as_array()
        .unwrap()
        .iter()
        .any(|p| p["name"] == name.as_str()));

    let all = ctx.api().get("/api/products").await.json();
    assert!(all.as_array().unwrap().iter().any(|p| p["name"] == name.as_str()));
}

#[test_context(TestHarness)]
#[tokio::test]
async fn discount_percentage_over_100_is_rejected(ctx: &TestHarness) {
    let res = ctx
        .api()
        .post(
            "/api/discounts",
            json!({
                "code": unique("TOO").replace('-', ""),
                "discount_type": "percentage",
                "amount": 150,
            }),
        )
        .await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);

    let unknown = ctx.api().get("/api/discounts/validate/NOPE-NOT-A-CODE").await;
    assert_eq!(unknown.status, StatusCode::NOT_FOUND);
}
