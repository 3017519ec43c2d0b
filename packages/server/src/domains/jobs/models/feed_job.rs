use anyhow::Result;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;

use crate::common::JobId;

/// An active listing joined with the names feeds display
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct FeedJob {
    pub id: JobId,
    pub title: String,
    pub slug: String,
    pub description: String,
    pub location: Option<String>,
    pub remote: bool,
    pub salary_min: Option<Decimal>,
    pub salary_max: Option<Decimal>,
    pub salary_currency: String,
    pub salary_period: String,
    pub apply_url: Option<String>,
    pub featured: bool,
    pub expires_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub company_name: String,
    pub company_website: Option<String>,
    pub company_logo_url: Option<String>,
    pub category_name: Option<String>,
    pub job_type_name: Option<String>,
    pub job_type_slug: Option<String>,
}

const FEED_SELECT: &str = r#"
    SELECT j.id, j.title, j.slug, j.description, j.location, j.remote,
           j.salary_min, j.salary_max, j.salary_currency, j.salary_period,
           j.apply_url, j.featured, j.expires_at, j.created_at,
           e.company_name, e.website AS company_website, e.logo_url AS company_logo_url,
           c.name AS category_name, t.name AS job_type_name, t.slug AS job_type_slug
    FROM jobs j
    JOIN employers e ON e.id = j.employer_id
    LEFT JOIN categories c ON c.id = j.category_id
    LEFT JOIN job_types t ON t.id = j.job_type_id
"#;

impl FeedJob {
    /// Live listings, newest first: active and not past `expires_at`
    pub async fn find_active_for_feed(limit: i64, pool: &PgPool) -> Result<Vec<Self>> {
        let sql = format!(
            r#"{}
            WHERE j.status = 'active'
              AND (j.expires_at IS NULL OR j.expires_at > NOW())
            ORDER BY j.created_at DESC, j.id DESC
            LIMIT $1
            "#,
            FEED_SELECT
        );
        let jobs = sqlx::query_as::<_, FeedJob>(&sql)
            .bind(limit)
            .fetch_all(pool)
            .await?;
        Ok(jobs)
    }

    /// One listing in feed shape, regardless of status
    pub async fn find_by_job_id(id: JobId, pool: &PgPool) -> Result<Option<Self>> {
        let sql = format!("{} WHERE j.id = $1", FEED_SELECT);
        let job = sqlx::query_as::<_, FeedJob>(&sql)
            .bind(id)
            .fetch_optional(pool)
            .await?;
        Ok(job)
    }
}
