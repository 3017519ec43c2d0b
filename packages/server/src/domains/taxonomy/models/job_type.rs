use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use crate::common::utils::{slug_or_derive, Validator};
use crate::common::JobTypeId;

/// Employment type (full-time, contract, ...)
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct JobType {
    pub id: JobTypeId,
    pub name: String,
    pub slug: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct JobTypeInput {
    pub name: String,
    pub slug: Option<String>,
}

impl JobTypeInput {
    pub fn validate(&self) -> Result<(), String> {
        let mut v = Validator::new();
        v.required("name", &self.name);
        v.check(
            !slug_or_derive(self.slug.as_deref(), &self.name).is_empty(),
            "slug must contain at least one letter or digit",
        );
        v.finish()
    }

    fn slug(&self) -> String {
        slug_or_derive(self.slug.as_deref(), &self.name)
    }
}

/// Schema.org `employmentType` for a job type slug
pub fn schema_org_employment_type(slug: &str) -> &'static str {
    match slug {
        "full-time" | "fulltime" => "FULL_TIME",
        "part-time" | "parttime" => "PART_TIME",
        "contract" | "contractor" | "freelance" => "CONTRACTOR",
        "temporary" | "temp" => "TEMPORARY",
        "internship" | "intern" => "INTERN",
        "volunteer" => "VOLUNTEER",
        "per-diem" => "PER_DIEM",
        _ => "OTHER",
    }
}

impl JobType {
    pub async fn find_all(pool: &PgPool) -> Result<Vec<Self>> {
        let job_types = sqlx::query_as::<_, JobType>("SELECT * FROM job_types ORDER BY name ASC")
            .fetch_all(pool)
            .await?;
        Ok(job_types)
    }

    pub async fn find_by_id(id: JobTypeId, pool: &PgPool) -> Result<Option<Self>> {
        let job_type = sqlx::query_as::<_, JobType>("SELECT * FROM job_types WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await?;
        Ok(job_type)
    }

    pub async fn create(input: &JobTypeInput, pool: &PgPool) -> Result<Self> {
        let job_type = sqlx::query_as::<_, JobType>(
            "INSERT INTO job_types (id, name, slug) VALUES ($1, $2, $3) RETURNING *",
        )
        .bind(JobTypeId::new())
        .bind(input.name.trim())
        .bind(input.slug())
        .fetch_one(pool)
        .await?;
        Ok(job_type)
    }

    pub async fn update(
        id: JobTypeId,
        input: &JobTypeInput,
        pool: &PgPool,
    ) -> Result<Option<Self>> {
        let job_type = sqlx::query_as::<_, JobType>(
            r#"
            UPDATE job_types
            SET name = $2, slug = $3, updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(input.name.trim())
        .bind(input.slug())
        .fetch_optional(pool)
        .await?;
        Ok(job_type)
    }

    pub async fn delete(id: JobTypeId, pool: &PgPool) -> Result<bool> {
        let result = sqlx::query("DELETE FROM job_types WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_org_employment_type() {
        assert_eq!(schema_org_employment_type("full-time"), "FULL_TIME");
        assert_eq!(schema_org_employment_type("freelance"), "CONTRACTOR");
        assert_eq!(schema_org_employment_type("internship"), "INTERN");
        assert_eq!(schema_org_employment_type("gig"), "OTHER");
    }
}
