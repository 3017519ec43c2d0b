//! Account routes: employers, job seekers and their resumes

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use tracing::info;

use super::models::{
    CreateResumeInput, Employer, JobSeeker, RegisterEmployerInput, RegisterJobSeekerInput, Resume,
    ResumeFilters, UpdateEmployerInput, UpdateJobSeekerInput, UpdateResumeInput,
};
use crate::common::{EmployerId, JobSeekerId, Page, PaginationArgs, ResumeId};
use crate::domains::auth::{
    hash_password_blocking, verify_password_blocking, AccountKind, LoginInput, LoginResponse,
};
use crate::domains::taxonomy::models::{validate_custom_values, CustomField};
use crate::server::app::AppState;
use crate::server::error::ApiError;
use crate::server::extract::{JsonBody, QueryParams};

/// Same message for unknown email and wrong password
const INVALID_CREDENTIALS: &str = "Invalid email or password";

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/employers", get(list_employers).post(register_employer))
        .route("/api/employers/login", post(login_employer))
        .route(
            "/api/employers/:id",
            get(get_employer).patch(update_employer).delete(delete_employer),
        )
        .route(
            "/api/job-seekers",
            get(list_job_seekers).post(register_job_seeker),
        )
        .route("/api/job-seekers/login", post(login_job_seeker))
        .route(
            "/api/job-seekers/:id",
            get(get_job_seeker)
                .patch(update_job_seeker)
                .delete(delete_job_seeker),
        )
        .route("/api/resumes", get(list_resumes).post(create_resume))
        .route(
            "/api/resumes/:id",
            get(get_resume).patch(update_resume).delete(delete_resume),
        )
}

async fn hash_if_present(password: Option<&String>) -> Result<Option<String>, ApiError> {
    match password {
        Some(password) => Ok(Some(hash_password_blocking(password.clone()).await?)),
        None => Ok(None),
    }
}

/// 401 with the generic message unless the password matches the stored hash
async fn check_password(input: &LoginInput, password_hash: &str) -> Result<(), ApiError> {
    if verify_password_blocking(input.password.clone(), password_hash.to_string()).await? {
        Ok(())
    } else {
        Err(ApiError::unauthorized(INVALID_CREDENTIALS))
    }
}

// =============================================================================
// Employers
// =============================================================================

async fn list_employers(
    State(state): State<AppState>,
    QueryParams(args): QueryParams<PaginationArgs>,
) -> Result<Json<Page<Employer>>, ApiError> {
    let page = args.validate();
    let (employers, total) = Employer::find_all(&page, state.db()).await?;
    Ok(Json(Page::new(employers, total, &page)))
}

async fn register_employer(
    State(state): State<AppState>,
    JsonBody(input): JsonBody<RegisterEmployerInput>,
) -> Result<(StatusCode, Json<Employer>), ApiError> {
    input.validate().map_err(ApiError::Validation)?;

    let password_hash = hash_password_blocking(input.password.clone()).await?;
    let employer = Employer::create(&input, &password_hash, state.db()).await?;

    info!(employer_id = %employer.id, "Employer registered");
    Ok((StatusCode::CREATED, Json(employer)))
}

async fn login_employer(
    State(state): State<AppState>,
    JsonBody(input): JsonBody<LoginInput>,
) -> Result<Json<LoginResponse<Employer>>, ApiError> {
    let employer = Employer::find_by_email(&input.email, state.db())
        .await?
        .ok_or_else(|| ApiError::unauthorized(INVALID_CREDENTIALS))?;
    check_password(&input, &employer.password_hash).await?;

    let token = state.deps.jwt_service.create_token(
        employer.id.into_uuid(),
        AccountKind::Employer,
        employer.email.clone(),
    )?;
    info!(employer_id = %employer.id, "Employer logged in");

    Ok(Json(LoginResponse {
        token,
        account_kind: AccountKind::Employer,
        account: employer,
    }))
}

async fn get_employer(
    State(state): State<AppState>,
    Path(id): Path<EmployerId>,
) -> Result<Json<Employer>, ApiError> {
    Employer::find_by_id(id, state.db())
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found("Employer"))
}

async fn update_employer(
    State(state): State<AppState>,
    Path(id): Path<EmployerId>,
    JsonBody(input): JsonBody<UpdateEmployerInput>,
) -> Result<Json<Employer>, ApiError> {
    input.validate().map_err(ApiError::Validation)?;

    let password_hash = hash_if_present(input.password.as_ref()).await?;
    Employer::update(id, &input, password_hash.as_deref(), state.db())
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found("Employer"))
}

async fn delete_employer(
    State(state): State<AppState>,
    Path(id): Path<EmployerId>,
) -> Result<StatusCode, ApiError> {
    if Employer::delete(id, state.db()).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::not_found("Employer"))
    }
}

// =============================================================================
// Job seekers
// =============================================================================

async fn list_job_seekers(
    State(state): State<AppState>,
    QueryParams(args): QueryParams<PaginationArgs>,
) -> Result<Json<Page<JobSeeker>>, ApiError> {
    let page = args.validate();
    let (seekers, total) = JobSeeker::find_all(&page, state.db()).await?;
    Ok(Json(Page::new(seekers, total, &page)))
}

async fn register_job_seeker(
    State(state): State<AppState>,
    JsonBody(input): JsonBody<RegisterJobSeekerInput>,
) -> Result<(StatusCode, Json<JobSeeker>), ApiError> {
    input.validate().map_err(ApiError::Validation)?;

    let password_hash = hash_password_blocking(input.password.clone()).await?;
    let seeker = JobSeeker::create(&input, &password_hash, state.db()).await?;

    info!(job_seeker_id = %seeker.id, "Job seeker registered");
    Ok((StatusCode::CREATED, Json(seeker)))
}

async fn login_job_seeker(
    State(state): State<AppState>,
    JsonBody(input): JsonBody<LoginInput>,
) -> Result<Json<LoginResponse<JobSeeker>>, ApiError> {
    let seeker = JobSeeker::find_by_email(&input.email, state.db())
        .await?
        .ok_or_else(|| ApiError::unauthorized(INVALID_CREDENTIALS))?;
    check_password(&input, &seeker.password_hash).await?;

    let token = state.deps.jwt_service.create_token(
        seeker.id.into_uuid(),
        AccountKind::JobSeeker,
        seeker.email.clone(),
    )?;
    info!(job_seeker_id = %seeker.id, "Job seeker logged in");

    Ok(Json(LoginResponse {
        token,
        account_kind: AccountKind::JobSeeker,
        account: seeker,
    }))
}

async fn get_job_seeker(
    State(state): State<AppState>,
    Path(id): Path<JobSeekerId>,
) -> Result<Json<JobSeeker>, ApiError> {
    JobSeeker::find_by_id(id, state.db())
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found("Job seeker"))
}

async fn update_job_seeker(
    State(state): State<AppState>,
    Path(id): Path<JobSeekerId>,
    JsonBody(input): JsonBody<UpdateJobSeekerInput>,
) -> Result<Json<JobSeeker>, ApiError> {
    input.validate().map_err(ApiError::Validation)?;

    let password_hash = hash_if_present(input.password.as_ref()).await?;
    JobSeeker::update(id, &input, password_hash.as_deref(), state.db())
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found("Job seeker"))
}

async fn delete_job_seeker(
    State(state): State<AppState>,
    Path(id): Path<JobSeekerId>,
) -> Result<StatusCode, ApiError> {
    if JobSeeker::delete(id, state.db()).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::not_found("Job seeker"))
    }
}

// =============================================================================
// Resumes
// =============================================================================

#[derive(Debug, Deserialize)]
struct ResumeQuery {
    job_seeker_id: Option<JobSeekerId>,
    public_only: Option<bool>,
}

async fn list_resumes(
    State(state): State<AppState>,
    QueryParams(query): QueryParams<ResumeQuery>,
) -> Result<Json<Vec<Resume>>, ApiError> {
    let filters = ResumeFilters {
        job_seeker_id: query.job_seeker_id,
        public_only: query.public_only.unwrap_or(false),
    };
    Ok(Json(Resume::find_all(&filters, state.db()).await?))
}

async fn get_resume(
    State(state): State<AppState>,
    Path(id): Path<ResumeId>,
) -> Result<Json<Resume>, ApiError> {
    Resume::find_by_id(id, state.db())
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found("Resume"))
}

async fn check_resume_custom_fields(
    state: &AppState,
    values: &serde_json::Map<String, serde_json::Value>,
) -> Result<(), ApiError> {
    let fields = CustomField::find_all(Some("resume"), state.db()).await?;
    validate_custom_values(&fields, values).map_err(ApiError::Validation)
}

async fn create_resume(
    State(state): State<AppState>,
    JsonBody(input): JsonBody<CreateResumeInput>,
) -> Result<(StatusCode, Json<Resume>), ApiError> {
    input.validate().map_err(ApiError::Validation)?;
    check_resume_custom_fields(&state, &input.custom_fields).await?;

    let resume = Resume::create(&input, state.db()).await?;
    Ok((StatusCode::CREATED, Json(resume)))
}

async fn update_resume(
    State(state): State<AppState>,
    Path(id): Path<ResumeId>,
    JsonBody(input): JsonBody<UpdateResumeInput>,
) -> Result<Json<Resume>, ApiError> {
    input.validate().map_err(ApiError::Validation)?;
    if let Some(values) = &input.custom_fields {
        check_resume_custom_fields(&state, values).await?;
    }

    Resume::update(id, &input, state.db())
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found("Resume"))
}

async fn delete_resume(
    State(state): State<AppState>,
    Path(id): Path<ResumeId>,
) -> Result<StatusCode, ApiError> {
    if Resume::delete(id, state.db()).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::not_found("Resume"))
    }
}
