//! Listing routes: CRUD, search and per-listing structured data

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::{Map, Value};

use super::models::{CreateJobInput, FeedJob, Job, JobFilters, JobSort, UpdateJobInput};
use crate::common::{CategoryId, EmployerId, JobId, JobTypeId, Page, PaginationArgs};
use crate::domains::feeds::{render_job_posting, FeedChannel};
use crate::domains::taxonomy::models::{validate_custom_values, CustomField};
use crate::server::app::AppState;
use crate::server::error::ApiError;
use crate::server::extract::{JsonBody, QueryParams};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/jobs", get(search_jobs).post(create_job))
        .route("/api/jobs/slug/:slug", get(get_job_by_slug))
        .route(
            "/api/jobs/:id",
            get(get_job).patch(update_job).delete(delete_job),
        )
        .route("/api/jobs/:id/json-ld", get(get_job_json_ld))
}

/// Query string for `GET /api/jobs`
#[derive(Debug, Default, Deserialize)]
pub struct JobSearchQuery {
    pub q: Option<String>,
    pub category_id: Option<CategoryId>,
    pub job_type_id: Option<JobTypeId>,
    pub employer_id: Option<EmployerId>,
    pub status: Option<String>,
    pub remote: Option<bool>,
    pub location: Option<String>,
    pub featured: Option<bool>,
    pub sort: Option<JobSort>,
    pub page: Option<i64>,
    pub per_page: Option<i64>,
}

impl JobSearchQuery {
    fn into_parts(self) -> (JobFilters, PaginationArgs) {
        let filters = JobFilters {
            q: self.q,
            category_id: self.category_id,
            job_type_id: self.job_type_id,
            employer_id: self.employer_id,
            status: self.status,
            remote: self.remote,
            location: self.location,
            featured: self.featured,
            sort: self.sort.unwrap_or_default(),
        };
        let pagination = PaginationArgs {
            page: self.page,
            per_page: self.per_page,
        };
        (filters, pagination)
    }
}

async fn search_jobs(
    State(state): State<AppState>,
    QueryParams(query): QueryParams<JobSearchQuery>,
) -> Result<Json<Page<Job>>, ApiError> {
    let (filters, args) = query.into_parts();
    let page = args.validate();
    let (jobs, total) = Job::search(&filters, &page, state.db()).await?;
    Ok(Json(Page::new(jobs, total, &page)))
}

async fn get_job(
    State(state): State<AppState>,
    Path(id): Path<JobId>,
) -> Result<Json<Job>, ApiError> {
    Job::find_by_id(id, state.db())
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found("Job"))
}

async fn get_job_by_slug(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<Job>, ApiError> {
    Job::find_by_slug(&slug, state.db())
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found("Job"))
}

async fn check_job_custom_fields(
    state: &AppState,
    values: &Map<String, Value>,
) -> Result<(), ApiError> {
    let fields = CustomField::find_all(Some("job"), state.db()).await?;
    validate_custom_values(&fields, values).map_err(ApiError::Validation)
}

async fn create_job(
    State(state): State<AppState>,
    JsonBody(input): JsonBody<CreateJobInput>,
) -> Result<(StatusCode, Json<Job>), ApiError> {
    input.validate().map_err(ApiError::Validation)?;
    check_job_custom_fields(&state, &input.custom_fields).await?;

    let job = Job::create(&input, state.db()).await?;
    tracing::info!(job_id = %job.id, employer_id = %job.employer_id, "Job created");
    Ok((StatusCode::CREATED, Json(job)))
}

async fn update_job(
    State(state): State<AppState>,
    Path(id): Path<JobId>,
    JsonBody(input): JsonBody<UpdateJobInput>,
) -> Result<Json<Job>, ApiError> {
    let current = Job::find_by_id(id, state.db())
        .await?
        .ok_or_else(|| ApiError::not_found("Job"))?;
    input
        .validate_against(&current)
        .map_err(ApiError::Validation)?;
    if let Some(values) = &input.custom_fields {
        check_job_custom_fields(&state, values).await?;
    }

    Job::update(id, &input, state.db())
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found("Job"))
}

async fn delete_job(
    State(state): State<AppState>,
    Path(id): Path<JobId>,
) -> Result<StatusCode, ApiError> {
    if Job::delete(id, state.db()).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::not_found("Job"))
    }
}

async fn get_job_json_ld(
    State(state): State<AppState>,
    Path(id): Path<JobId>,
) -> Result<Json<Value>, ApiError> {
    let job = FeedJob::find_by_job_id(id, state.db())
        .await?
        .ok_or_else(|| ApiError::not_found("Job"))?;
    let channel = FeedChannel::from_site(&state.deps.site);
    Ok(Json(render_job_posting(&channel, &job)))
}
