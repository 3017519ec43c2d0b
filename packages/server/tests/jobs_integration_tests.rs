//! Integration tests for job listings: CRUD, validation, search and custom fields.

mod common;

use axum::http::StatusCode;
use common::{create_employer, create_job, job_input, unique, TestHarness};
use rust_decimal::Decimal;
use serde_json::{json, Value};
use server_core::common::EmployerId;
use server_core::domains::jobs::{CreateJobInput, Job};
use server_core::domains::taxonomy::{Category, CategoryInput};
use test_context::test_context;

fn job_body(employer_id: &str, title: &str) -> Value {
    json!({
        "employer_id": employer_id,
        "title": title,
        "description": "Build the listing engine",
        "location": "Remote, EU",
        "remote": true,
        "salary_min": 70000,
        "salary_max": "95000.50",
    })
}

fn custom_values(key: &str, value: &str) -> Value {
    let mut values = serde_json::Map::new();
    values.insert(key.to_string(), json!(value));
    Value::Object(values)
}

fn titles(body: &Value) -> Vec<String> {
    body["items"]
        .as_array()
        .unwrap()
        .iter()
        .map(|job| job["title"].as_str().unwrap().to_string())
        .collect()
}

async fn insert_job(
    ctx: &TestHarness,
    employer_id: EmployerId,
    title: &str,
    tweak: impl FnOnce(&mut CreateJobInput),
) -> Job {
    let mut input = job_input(employer_id, title, "active");
    tweak(&mut input);
    Job::create(&input, &ctx.db_pool).await.unwrap()
}

#[test_context(TestHarness)]
#[tokio::test]
async fn create_job_defaults_to_draft(ctx: &TestHarness) {
    let employer = create_employer(&ctx.db_pool).await.unwrap();
    let title = unique("Platform Engineer");

    let res = ctx
        .api()
        .post("/api/jobs", job_body(&employer.id.to_string(), &title))
        .await;

    assert_eq!(res.status, StatusCode::CREATED, "{}", res.text);
    let job = res.json();
    assert_eq!(job["status"], "draft");
    assert_eq!(job["salary_currency"], "USD");
    assert_eq!(job["salary_period"], "year");
    assert_eq!(job["salary_max"], json!(95000.5));

    let slug = job["slug"].as_str().unwrap();
    let by_slug = ctx.api().get(&format!("/api/jobs/slug/{}", slug)).await;
    assert_eq!(by_slug.status, StatusCode::OK);
    assert_eq!(by_slug.json()["id"], job["id"]);
}

#[test_context(TestHarness)]
#[tokio::test]
async fn missing_required_field_is_bad_request(ctx: &TestHarness) {
    let employer = create_employer(&ctx.db_pool).await.unwrap();

    let res = ctx
        .api()
        .post(
            "/api/jobs",
            json!({ "employer_id": employer.id.to_string(), "description": "No title" }),
        )
        .await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert!(res.error().contains("title"), "{}", res.text);

    let blank = ctx
        .api()
        .post(
            "/api/jobs",
            json!({ "employer_id": employer.id.to_string(), "title": " ", "description": "x" }),
        )
        .await;
    assert_eq!(blank.status, StatusCode::BAD_REQUEST);
}

#[test_context(TestHarness)]
#[tokio::test]
async fn inverted_salary_range_is_rejected(ctx: &TestHarness) {
    let employer = create_employer(&ctx.db_pool).await.unwrap();
    let mut body = job_body(&employer.id.to_string(), "Backwards");
    body["salary_min"] = json!(120000);
    body["salary_max"] = json!(90000);

    let res = ctx.api().post("/api/jobs", body).await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert!(res.error().contains("salary_min"));
}

#[test_context(TestHarness)]
#[tokio::test]
async fn unknown_employer_is_rejected(ctx: &TestHarness) {
    let res = ctx
        .api()
        .post(
            "/api/jobs",
            job_body(&uuid::Uuid::new_v4().to_string(), "Orphan"),
        )
        .await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
}

#[test_context(TestHarness)]
#[tokio::test]
async fn patch_checks_salary_against_stored_values(ctx: &TestHarness) {
    let employer = create_employer(&ctx.db_pool).await.unwrap();
    let job = create_job(&ctx.db_pool, employer.id, "draft").await.unwrap();

    // Stored max is 100000
    let res = ctx
        .api()
        .patch(
            &format!("/api/jobs/{}", job.id),
            json!({ "salary_min": 150000 }),
        )
        .await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);

    let ok = ctx
        .api()
        .patch(
            &format!("/api/jobs/{}", job.id),
            json!({ "title": "Senior Rust Engineer", "status": "filled" }),
        )
        .await;
    assert_eq!(ok.status, StatusCode::OK, "{}", ok.text);
    assert_eq!(ok.json()["title"], "Senior Rust Engineer");
    assert_eq!(ok.json()["status"], "filled");
    assert_eq!(ok.json()["location"], "Berlin");
}

#[test_context(TestHarness)]
#[tokio::test]
async fn delete_job_then_not_found(ctx: &TestHarness) {
    let employer = create_employer(&ctx.db_pool).await.unwrap();
    let job = create_job(&ctx.db_pool, employer.id, "draft").await.unwrap();

    let res = ctx.api().delete(&format!("/api/jobs/{}", job.id)).await;
    assert_eq!(res.status, StatusCode::NO_CONTENT);

    let again = ctx.api().delete(&format!("/api/jobs/{}", job.id)).await;
    assert_eq!(again.status, StatusCode::NOT_FOUND);
    let get = ctx.api().get(&format!("/api/jobs/{}", job.id)).await;
    assert_eq!(get.status, StatusCode::NOT_FOUND);
}

#[test_context(TestHarness)]
#[tokio::test]
async fn search_filters_and_paginates(ctx: &TestHarness) {
    let employer = create_employer(&ctx.db_pool).await.unwrap();
    for _ in 0..3 {
        create_job(&ctx.db_pool, employer.id, "active").await.unwrap();
    }
    create_job(&ctx.db_pool, employer.id, "draft").await.unwrap();

    let all = ctx
        .api()
        .get(&format!("/api/jobs?employer_id={}", employer.id))
        .await;
    assert_eq!(all.status, StatusCode::OK);
    assert_eq!(all.json()["total"], 4);

    let active = ctx
        .api()
        .get(&format!(
            "/api/jobs?employer_id={}&status=active&per_page=2&page=2",
            employer.id
        ))
        .await;
    let body = active.json();
    assert_eq!(body["total"], 3);
    assert_eq!(body["page"], 2);
    assert_eq!(body["items"].as_array().unwrap().len(), 1);
}

#[test_context(TestHarness)]
#[tokio::test]
async fn search_text_matches_literally(ctx: &TestHarness) {
    let employer = create_employer(&ctx.db_pool).await.unwrap();
    let marker = unique("zq");
    let title = format!("100% {} Engineer", marker);
    let res = ctx
        .api()
        .post("/api/jobs", job_body(&employer.id.to_string(), &title))
        .await;
    assert_eq!(res.status, StatusCode::CREATED);

    let hit = ctx
        .api()
        .get(&format!("/api/jobs?q=100%25%20{}", marker))
        .await;
    assert_eq!(hit.json()["total"], 1);

    let wildcard = ctx
        .api()
        .get(&format!("/api/jobs?q=%25&employer_id={}", employer.id))
        .await;
    assert_eq!(wildcard.json()["total"], 1);
}

#[test_context(TestHarness)]
#[tokio::test]
async fn bad_sort_is_bad_request(ctx: &TestHarness) {
    let res = ctx.api().get("/api/jobs?sort=sideways").await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
}

#[test_context(TestHarness)]
#[tokio::test]
async fn custom_field_values_are_validated(ctx: &TestHarness) {
    let employer = create_employer(&ctx.db_pool).await.unwrap();
    let key = unique("seniority").replace('-', "_");

    let field = ctx
        .api()
        .post(
            "/api/custom-fields",
            json!({
                "name": "Seniority",
                "key": key,
                "field_type": "select",
                "options": ["junior", "senior"],
                "applies_to": "job",
            }),
        )
        .await;
    assert_eq!(field.status, StatusCode::CREATED, "{}", field.text);

    let mut body = job_body(&employer.id.to_string(), "Custom");
    body["custom_fields"] = custom_values(&key, "principal");
    let bad = ctx.api().post("/api/jobs", body.clone()).await;
    assert_eq!(bad.status, StatusCode::BAD_REQUEST);
    assert!(bad.error().contains(&key));

    body["custom_fields"] = custom_values(&key, "senior");
    let good = ctx.api().post("/api/jobs", body.clone()).await;
    assert_eq!(good.status, StatusCode::CREATED, "{}", good.text);
    assert_eq!(good.json()["custom_fields"][&key], "senior");

    body["custom_fields"] = json!({ "no_such_field_here": 1 });
    let unknown = ctx.api().post("/api/jobs", body).await;
    assert_eq!(unknown.status, StatusCode::BAD_REQUEST);

    let id = field.json()["id"].as_str().unwrap().to_string();
    let deleted = ctx.api().delete(&format!("/api/custom-fields/{}", id)).await;
    assert_eq!(deleted.status, StatusCode::NO_CONTENT);
}

#[test_context(TestHarness)]
#[tokio::test]
async fn json_ld_for_single_job(ctx: &TestHarness) {
    let employer = create_employer(&ctx.db_pool).await.unwrap();
    let job = create_job(&ctx.db_pool, employer.id, "active").await.unwrap();

    let res = ctx.api().get(&format!("/api/jobs/{}/json-ld", job.id)).await;
    assert_eq!(res.status, StatusCode::OK);
    let doc = res.json();
    assert_eq!(doc["@context"], "https://schema.org");
    assert_eq!(doc["@type"], "JobPosting");
    assert_eq!(doc["title"], job.title);
    assert_eq!(doc["hiringOrganization"]["name"], employer.company_name);
    assert_eq!(doc["baseSalary"]["currency"], "EUR");
}

#[test_context(TestHarness)]
#[tokio::test]
async fn each_sort_orders_listings(ctx: &TestHarness) {
    let employer = create_employer(&ctx.db_pool).await.unwrap();
    insert_job(ctx, employer.id, "Alpha", |j| {
        j.salary_min = Some(Decimal::new(50_000, 0));
        j.salary_max = Some(Decimal::new(60_000, 0));
    })
    .await;
    insert_job(ctx, employer.id, "Charlie", |j| {
        j.salary_min = Some(Decimal::new(90_000, 0));
        j.salary_max = Some(Decimal::new(120_000, 0));
    })
    .await;
    insert_job(ctx, employer.id, "Bravo", |j| {
        j.salary_min = None;
        j.salary_max = None;
    })
    .await;

    let cases = [
        ("newest", ["Bravo", "Charlie", "Alpha"]),
        ("oldest", ["Alpha", "Charlie", "Bravo"]),
        ("salary_desc", ["Charlie", "Alpha", "Bravo"]),
        ("salary_asc", ["Alpha", "Charlie", "Bravo"]),
        ("title", ["Alpha", "Bravo", "Charlie"]),
    ];
    for (sort, expected) in cases {
        let res = ctx
            .api()
            .get(&format!("/api/jobs?employer_id={}&sort={}", employer.id, sort))
            .await;
        assert_eq!(res.status, StatusCode::OK, "{}", res.text);
        assert_eq!(titles(&res.json()), expected, "sort={}", sort);
    }
}

#[test_context(TestHarness)]
#[tokio::test]
async fn newest_puts_featured_first(ctx: &TestHarness) {
    let employer = create_employer(&ctx.db_pool).await.unwrap();
    insert_job(ctx, employer.id, "Spotlight", |j| j.featured = true).await;
    insert_job(ctx, employer.id, "Older", |_| {}).await;
    insert_job(ctx, employer.id, "Newer", |_| {}).await;

    let res = ctx
        .api()
        .get(&format!("/api/jobs?employer_id={}", employer.id))
        .await;
    assert_eq!(titles(&res.json()), ["Spotlight", "Newer", "Older"]);
}

#[test_context(TestHarness)]
#[tokio::test]
async fn search_filters_narrow_results(ctx: &TestHarness) {
    let employer = create_employer(&ctx.db_pool).await.unwrap();
    let category = Category::create(
        &CategoryInput {
            name: unique("Infrastructure"),
            slug: None,
            description: None,
        },
        &ctx.db_pool,
    )
    .await
    .unwrap();
    let marker = unique("kubeops");

    let remote = insert_job(ctx, employer.id, "Platform", |j| {
        j.remote = true;
        j.location = Some("Lisbon, Portugal".to_string());
        j.category_id = Some(category.id);
        j.description = format!("Operate {} clusters", marker);
    })
    .await;
    let featured = insert_job(ctx, employer.id, "Backend", |j| j.featured = true).await;
    insert_job(ctx, employer.id, "Frontend", |_| {}).await;

    let scoped = |query: &str| format!("/api/jobs?employer_id={}&{}", employer.id, query);

    let res = ctx.api().get(&scoped("remote=true")).await.json();
    assert_eq!(res["total"], 1);
    assert_eq!(res["items"][0]["id"], remote.id.to_string());

    let res = ctx.api().get(&scoped("remote=false")).await.json();
    assert_eq!(res["total"], 2);

    let res = ctx.api().get(&scoped("location=lisbon")).await.json();
    assert_eq!(res["total"], 1);
    assert_eq!(res["items"][0]["id"], remote.id.to_string());

    let res = ctx.api().get(&scoped("featured=true")).await.json();
    assert_eq!(res["total"], 1);
    assert_eq!(res["items"][0]["id"], featured.id.to_string());

    let res = ctx
        .api()
        .get(&format!("/api/jobs?category_id={}", category.id))
        .await
        .json();
    assert_eq!(res["total"], 1);
    assert_eq!(res["items"][0]["id"], remote.id.to_string());

    // Only the description mentions the marker
    let res = ctx.api().get(&format!("/api/jobs?q={}", marker)).await.json();
    assert_eq!(res["total"], 1);
    assert_eq!(res["items"][0]["id"], remote.id.to_string());
}

#[test_context(TestHarness)]
#[tokio::test]
async fn huge_page_number_returns_empty_page(ctx: &TestHarness) {
    let employer = create_employer(&ctx.db_pool).await.unwrap();
    create_job(&ctx.db_pool, employer.id, "active").await.unwrap();

    let res = ctx
        .api()
        .get(&format!(
            "/api/jobs?employer_id={}&page={}",
            employer.id,
            i64::MAX
        ))
        .await;
    assert_eq!(res.status, StatusCode::OK, "{}", res.text);
    let body = res.json();
    assert_eq!(body["total"], 1);
    assert_eq!(body["items"].as_array().unwrap().len(), 0);
}
