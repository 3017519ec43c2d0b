use anyhow::Result;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use sqlx::types::Json;
use sqlx::{PgExecutor, PgPool};

use crate::common::utils::{unique_slug, Validator};
use crate::common::{
    CategoryId, EmployerId, JobId, JobTypeId, ValidatedPagination,
};

pub const JOB_STATUSES: &[&str] = &["draft", "pending_payment", "active", "filled", "expired"];
pub const SALARY_PERIODS: &[&str] = &["hour", "day", "week", "month", "year"];

/// A job listing
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Job {
    pub id: JobId,
    pub employer_id: EmployerId,
    pub category_id: Option<CategoryId>,
    pub job_type_id: Option<JobTypeId>,
    pub title: String,
    pub slug: String,
    pub description: String,
    pub location: Option<String>,
    pub remote: bool,
    #[serde(with = "rust_decimal::serde::float_option")]
    pub salary_min: Option<Decimal>,
    #[serde(with = "rust_decimal::serde::float_option")]
    pub salary_max: Option<Decimal>,
    pub salary_currency: String,
    pub salary_period: String,
    pub apply_url: Option<String>,
    pub apply_email: Option<String>,
    pub status: String,
    pub featured: bool,
    pub expires_at: Option<DateTime<Utc>>,
    pub custom_fields: Json<Map<String, Value>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

fn default_currency() -> String {
    "USD".to_string()
}

fn default_period() -> String {
    "year".to_string()
}

fn default_status() -> String {
    "draft".to_string()
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateJobInput {
    pub employer_id: EmployerId,
    pub category_id: Option<CategoryId>,
    pub job_type_id: Option<JobTypeId>,
    pub title: String,
    pub description: String,
    pub location: Option<String>,
    #[serde(default)]
    pub remote: bool,
    pub salary_min: Option<Decimal>,
    pub salary_max: Option<Decimal>,
    #[serde(default = "default_currency")]
    pub salary_currency: String,
    #[serde(default = "default_period")]
    pub salary_period: String,
    pub apply_url: Option<String>,
    pub apply_email: Option<String>,
    #[serde(default = "default_status")]
    pub status: String,
    #[serde(default)]
    pub featured: bool,
    pub expires_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub custom_fields: Map<String, Value>,
}

fn check_salary(v: &mut Validator, min: Option<Decimal>, max: Option<Decimal>) {
    v.non_negative("salary_min", min)
        .non_negative("salary_max", max);
    if let (Some(min), Some(max)) = (min, max) {
        v.check(min <= max, "salary_min must not exceed salary_max");
    }
}

impl CreateJobInput {
    pub fn validate(&self) -> Result<(), String> {
        let mut v = Validator::new();
        v.required("title", &self.title)
            .required("description", &self.description)
            .currency("salary_currency", &self.salary_currency)
            .one_of("salary_period", &self.salary_period, SALARY_PERIODS)
            .one_of("status", &self.status, JOB_STATUSES);
        if let Some(email) = &self.apply_email {
            v.email("apply_email", email);
        }
        check_salary(&mut v, self.salary_min, self.salary_max);
        v.finish()
    }
}

/// Partial update; absent fields keep their stored value
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateJobInput {
    pub category_id: Option<CategoryId>,
    pub job_type_id: Option<JobTypeId>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub location: Option<String>,
    pub remote: Option<bool>,
    pub salary_min: Option<Decimal>,
    pub salary_max: Option<Decimal>,
    pub salary_currency: Option<String>,
    pub salary_period: Option<String>,
    pub apply_url: Option<String>,
    pub apply_email: Option<String>,
    pub status: Option<String>,
    pub featured: Option<bool>,
    pub expires_at: Option<DateTime<Utc>>,
    pub custom_fields: Option<Map<String, Value>>,
}

impl UpdateJobInput {
    /// Validate the update as it would apply on top of `current`
    pub fn validate_against(&self, current: &Job) -> Result<(), String> {
        let mut v = Validator::new();
        if let Some(title) = &self.title {
            v.required("title", title);
        }
        if let Some(description) = &self.description {
            v.required("description", description);
        }
        if let Some(currency) = &self.salary_currency {
            v.currency("salary_currency", currency);
        }
        if let Some(period) = &self.salary_period {
            v.one_of("salary_period", period, SALARY_PERIODS);
        }
        if let Some(status) = &self.status {
            v.one_of("status", status, JOB_STATUSES);
        }
        if let Some(email) = &self.apply_email {
            v.email("apply_email", email);
        }
        check_salary(
            &mut v,
            self.salary_min.or(current.salary_min),
            self.salary_max.or(current.salary_max),
        );
        v.finish()
    }
}

/// Listing sort orders accepted by search
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobSort {
    #[default]
    Newest,
    Oldest,
    SalaryDesc,
    SalaryAsc,
    Title,
}

impl JobSort {
    fn order_by(self) -> &'static str {
        match self {
            // Featured listings lead the default view
            JobSort::Newest => "featured DESC, created_at DESC, id DESC",
            JobSort::Oldest => "created_at ASC, id ASC",
            JobSort::SalaryDesc => {
                "COALESCE(salary_max, salary_min) DESC NULLS LAST, created_at DESC, id DESC"
            }
            JobSort::SalaryAsc => {
                "COALESCE(salary_min, salary_max) ASC NULLS LAST, created_at DESC, id DESC"
            }
            JobSort::Title => "title ASC, id ASC",
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct JobFilters {
    pub q: Option<String>,
    pub category_id: Option<CategoryId>,
    pub job_type_id: Option<JobTypeId>,
    pub employer_id: Option<EmployerId>,
    pub status: Option<String>,
    pub remote: Option<bool>,
    pub location: Option<String>,
    pub featured: Option<bool>,
    pub sort: JobSort,
}

/// Escape LIKE wildcards so user text matches literally
fn like_pattern(text: &str) -> String {
    let escaped = text
        .trim()
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{}%", escaped)
}

const SEARCH_WHERE: &str = r#"
    WHERE ($1::TEXT IS NULL OR title ILIKE $1 OR description ILIKE $1)
      AND ($2::UUID IS NULL OR category_id = $2)
      AND ($3::UUID IS NULL OR job_type_id = $3)
      AND ($4::UUID IS NULL OR employer_id = $4)
      AND ($5::TEXT IS NULL OR status = $5)
      AND ($6::BOOLEAN IS NULL OR remote = $6)
      AND ($7::TEXT IS NULL OR location ILIKE $7)
      AND ($8::BOOLEAN IS NULL OR featured = $8)
"#;

// =============================================================================
// SQL Queries - ALL queries must be in models/
// =============================================================================

impl Job {
    pub async fn find_by_id(id: JobId, pool: &PgPool) -> Result<Option<Self>> {
        let job = sqlx::query_as::<_, Job>("SELECT * FROM jobs WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await?;
        Ok(job)
    }

    pub async fn find_by_slug(slug: &str, pool: &PgPool) -> Result<Option<Self>> {
        let job = sqlx::query_as::<_, Job>("SELECT * FROM jobs WHERE slug = $1")
            .bind(slug)
            .fetch_optional(pool)
            .await?;
        Ok(job)
    }

    /// Filtered, sorted page of listings plus the unpaginated match count
    pub async fn search(
        filters: &JobFilters,
        page: &ValidatedPagination,
        pool: &PgPool,
    ) -> Result<(Vec<Self>, i64)> {
        let q = filters.q.as_deref().filter(|s| !s.trim().is_empty()).map(like_pattern);
        let location = filters
            .location
            .as_deref()
            .filter(|s| !s.trim().is_empty())
            .map(like_pattern);

        let select = format!(
            "SELECT * FROM jobs {} ORDER BY {} LIMIT $9 OFFSET $10",
            SEARCH_WHERE,
            filters.sort.order_by()
        );
        let jobs = sqlx::query_as::<_, Job>(&select)
            .bind(&q)
            .bind(filters.category_id)
            .bind(filters.job_type_id)
            .bind(filters.employer_id)
            .bind(&filters.status)
            .bind(filters.remote)
            .bind(&location)
            .bind(filters.featured)
            .bind(page.limit())
            .bind(page.offset())
            .fetch_all(pool)
            .await?;

        let count = format!("SELECT COUNT(*) FROM jobs {}", SEARCH_WHERE);
        let total: i64 = sqlx::query_scalar(&count)
            .bind(&q)
            .bind(filters.category_id)
            .bind(filters.job_type_id)
            .bind(filters.employer_id)
            .bind(&filters.status)
            .bind(filters.remote)
            .bind(&location)
            .bind(filters.featured)
            .fetch_one(pool)
            .await?;

        Ok((jobs, total))
    }

    pub async fn create(input: &CreateJobInput, pool: &PgPool) -> Result<Self> {
        let job = sqlx::query_as::<_, Job>(
            r#"
            INSERT INTO jobs (
                id, employer_id, category_id, job_type_id, title, slug, description,
                location, remote, salary_min, salary_max, salary_currency, salary_period,
                apply_url, apply_email, status, featured, expires_at, custom_fields
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, $18, $19)
            RETURNING *
            "#,
        )
        .bind(JobId::new())
        .bind(input.employer_id)
        .bind(input.category_id)
        .bind(input.job_type_id)
        .bind(input.title.trim())
        .bind(unique_slug(&input.title))
        .bind(&input.description)
        .bind(&input.location)
        .bind(input.remote)
        .bind(input.salary_min)
        .bind(input.salary_max)
        .bind(input.salary_currency.to_uppercase())
        .bind(&input.salary_period)
        .bind(&input.apply_url)
        .bind(&input.apply_email)
        .bind(&input.status)
        .bind(input.featured)
        .bind(input.expires_at)
        .bind(Json(&input.custom_fields))
        .fetch_one(pool)
        .await?;
        Ok(job)
    }

    pub async fn update(id: JobId, input: &UpdateJobInput, pool: &PgPool) -> Result<Option<Self>> {
        let job = sqlx::query_as::<_, Job>(
            r#"
            UPDATE jobs
            SET category_id = COALESCE($2, category_id),
                job_type_id = COALESCE($3, job_type_id),
                title = COALESCE($4, title),
                description = COALESCE($5, description),
                location = COALESCE($6, location),
                remote = COALESCE($7, remote),
                salary_min = COALESCE($8, salary_min),
                salary_max = COALESCE($9, salary_max),
                salary_currency = COALESCE($10, salary_currency),
                salary_period = COALESCE($11, salary_period),
                apply_url = COALESCE($12, apply_url),
                apply_email = COALESCE($13, apply_email),
                status = COALESCE($14, status),
                featured = COALESCE($15, featured),
                expires_at = COALESCE($16, expires_at),
                custom_fields = COALESCE($17, custom_fields),
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(input.category_id)
        .bind(input.job_type_id)
        .bind(input.title.as_deref().map(str::trim))
        .bind(&input.description)
        .bind(&input.location)
        .bind(input.remote)
        .bind(input.salary_min)
        .bind(input.salary_max)
        .bind(input.salary_currency.as_deref().map(str::to_uppercase))
        .bind(&input.salary_period)
        .bind(&input.apply_url)
        .bind(&input.apply_email)
        .bind(&input.status)
        .bind(input.featured)
        .bind(input.expires_at)
        .bind(input.custom_fields.as_ref().map(Json))
        .fetch_optional(pool)
        .await?;
        Ok(job)
    }

    pub async fn delete(id: JobId, pool: &PgPool) -> Result<bool> {
        let result = sqlx::query("DELETE FROM jobs WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    // =========================================================================
    // Lifecycle transitions driven by orders
    // =========================================================================

    /// Hold an unpublished listing while its order is being paid
    ///
    /// Active listings stay live; their order extends them on payment.
    pub async fn mark_pending_payment<'e>(
        id: JobId,
        executor: impl PgExecutor<'e>,
    ) -> Result<bool> {
        let result = sqlx::query(
            r#"
            UPDATE jobs SET status = 'pending_payment', updated_at = NOW()
            WHERE id = $1 AND status IN ('draft', 'expired')
            "#,
        )
        .bind(id)
        .execute(executor)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Publish a paid listing until `expires_at`
    pub async fn activate<'e>(
        id: JobId,
        featured: bool,
        expires_at: DateTime<Utc>,
        executor: impl PgExecutor<'e>,
    ) -> Result<Option<Self>> {
        let job = sqlx::query_as::<_, Job>(
            r#"
            UPDATE jobs
            SET status = 'active',
                featured = featured OR $2,
                expires_at = $3,
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(featured)
        .bind(expires_at)
        .fetch_optional(executor)
        .await?;
        Ok(job)
    }

    /// Return a listing held for an abandoned order to draft
    pub async fn release_pending_payment<'e>(
        id: JobId,
        executor: impl PgExecutor<'e>,
    ) -> Result<bool> {
        let result = sqlx::query(
            r#"
            UPDATE jobs SET status = 'draft', updated_at = NOW()
            WHERE id = $1 AND status = 'pending_payment'
            "#,
        )
        .bind(id)
        .execute(executor)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Mark active listings past their expiry as expired; returns how many
    pub async fn expire_past_due(pool: &PgPool) -> Result<u64> {
        let result = sqlx::query(
            r#"
            UPDATE jobs SET status = 'expired', updated_at = NOW()
            WHERE status = 'active' AND expires_at IS NOT NULL AND expires_at <= NOW()
            "#,
        )
        .execute(pool)
        .await?;
        Ok(result.rows_affected())
    }
}
