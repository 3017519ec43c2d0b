//! Catalog routes for categories, job types and custom fields

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;

use super::models::{Category, CategoryInput, CustomField, CustomFieldInput, JobType, JobTypeInput};
use crate::common::{CategoryId, CustomFieldId, JobTypeId};
use crate::server::app::AppState;
use crate::server::error::ApiError;
use crate::server::extract::{JsonBody, QueryParams};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/categories", get(list_categories).post(create_category))
        .route(
            "/api/categories/:id",
            get(get_category).put(update_category).delete(delete_category),
        )
        .route("/api/job-types", get(list_job_types).post(create_job_type))
        .route(
            "/api/job-types/:id",
            get(get_job_type).put(update_job_type).delete(delete_job_type),
        )
        .route(
            "/api/custom-fields",
            get(list_custom_fields).post(create_custom_field),
        )
        .route(
            "/api/custom-fields/:id",
            get(get_custom_field)
                .put(update_custom_field)
                .delete(delete_custom_field),
        )
}

// =============================================================================
// Categories
// =============================================================================

async fn list_categories(State(state): State<AppState>) -> Result<Json<Vec<Category>>, ApiError> {
    Ok(Json(Category::find_all(state.db()).await?))
}

async fn get_category(
    State(state): State<AppState>,
    Path(id): Path<CategoryId>,
) -> Result<Json<Category>, ApiError> {
    Category::find_by_id(id, state.db())
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found("Category"))
}

async fn create_category(
    State(state): State<AppState>,
    JsonBody(input): JsonBody<CategoryInput>,
) -> Result<(StatusCode, Json<Category>), ApiError> {
    input.validate().map_err(ApiError::Validation)?;
    let category = Category::create(&input, state.db()).await?;
    Ok((StatusCode::CREATED, Json(category)))
}

async fn update_category(
    State(state): State<AppState>,
    Path(id): Path<CategoryId>,
    JsonBody(input): JsonBody<CategoryInput>,
) -> Result<Json<Category>, ApiError> {
    input.validate().map_err(ApiError::Validation)?;
    Category::update(id, &input, state.db())
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found("Category"))
}

async fn delete_category(
    State(state): State<AppState>,
    Path(id): Path<CategoryId>,
) -> Result<StatusCode, ApiError> {
    if Category::delete(id, state.db()).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::not_found("Category"))
    }
}

// =============================================================================
// Job types
// =============================================================================

async fn list_job_types(State(state): State<AppState>) -> Result<Json<Vec<JobType>>, ApiError> {
    Ok(Json(JobType::find_all(state.db()).await?))
}

async fn get_job_type(
    State(state): State<AppState>,
    Path(id): Path<JobTypeId>,
) -> Result<Json<JobType>, ApiError> {
    JobType::find_by_id(id, state.db())
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found("Job type"))
}

async fn create_job_type(
    State(state): State<AppState>,
    JsonBody(input): JsonBody<JobTypeInput>,
) -> Result<(StatusCode, Json<JobType>), ApiError> {
    input.validate().map_err(ApiError::Validation)?;
    let job_type = JobType::create(&input, state.db()).await?;
    Ok((StatusCode::CREATED, Json(job_type)))
}

async fn update_job_type(
    State(state): State<AppState>,
    Path(id): Path<JobTypeId>,
    JsonBody(input): JsonBody<JobTypeInput>,
) -> Result<Json<JobType>, ApiError> {
    input.validate().map_err(ApiError::Validation)?;
    JobType::update(id, &input, state.db())
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found("Job type"))
}

async fn delete_job_type(
    State(state): State<AppState>,
    Path(id): Path<JobTypeId>,
) -> Result<StatusCode, ApiError> {
    if JobType::delete(id, state.db()).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::not_found("Job type"))
    }
}

// =============================================================================
// Custom fields
// =============================================================================

#[derive(Debug, Deserialize)]
struct CustomFieldQuery {
    applies_to: Option<String>,
}

async fn list_custom_fields(
    State(state): State<AppState>,
    QueryParams(query): QueryParams<CustomFieldQuery>,
) -> Result<Json<Vec<CustomField>>, ApiError> {
    let fields = CustomField::find_all(query.applies_to.as_deref(), state.db()).await?;
    Ok(Json(fields))
}

async fn get_custom_field(
    State(state): State<AppState>,
    Path(id): Path<CustomFieldId>,
) -> Result<Json<CustomField>, ApiError> {
    CustomField::find_by_id(id, state.db())
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found("Custom field"))
}

async fn create_custom_field(
    State(state): State<AppState>,
    JsonBody(input): JsonBody<CustomFieldInput>,
) -> Result<(StatusCode, Json<CustomField>), ApiError> {
    input.validate().map_err(ApiError::Validation)?;
    let field = CustomField::create(&input, state.db()).await?;
    Ok((StatusCode::CREATED, Json(field)))
}

async fn update_custom_field(
    State(state): State<AppState>,
    Path(id): Path<CustomFieldId>,
    JsonBody(input): JsonBody<CustomFieldInput>,
) -> Result<Json<CustomField>, ApiError> {
    input.validate().map_err(ApiError::Validation)?;
    CustomField::update(id, &input, state.db())
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found("Custom field"))
}

async fn delete_custom_field(
    State(state): State<AppState>,
    Path(id): Path<CustomFieldId>,
) -> Result<StatusCode, ApiError> {
    if CustomField::delete(id, state.db()).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::not_found("Custom field"))
    }
}
