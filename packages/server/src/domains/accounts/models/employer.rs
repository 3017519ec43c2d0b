use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use crate::common::utils::{slug_or_derive, slugify, Validator};
use crate::common::{EmployerId, ValidatedPagination};

/// A company account that posts and pays for job listings
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Employer {
    pub id: EmployerId,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub company_name: String,
    pub company_slug: String,
    pub website: Option<String>,
    pub logo_url: Option<String>,
    pub description: Option<String>,
    pub location: Option<String>,
    pub phone: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RegisterEmployerInput {
    pub email: String,
    pub password: String,
    pub company_name: String,
    pub company_slug: Option<String>,
    pub website: Option<String>,
    pub logo_url: Option<String>,
    pub description: Option<String>,
    pub location: Option<String>,
    pub phone: Option<String>,
}

impl RegisterEmployerInput {
    pub fn validate(&self) -> Result<(), String> {
        let mut v = Validator::new();
        v.required("email", &self.email)
            .email("email", &self.email)
            .password("password", &self.password)
            .required("company_name", &self.company_name)
            .check(
                self.company_name.trim().is_empty() || !self.company_slug().is_empty(),
                "company_slug must contain at least one letter or digit",
            );
        v.finish()
    }

    pub fn company_slug(&self) -> String {
        slug_or_derive(self.company_slug.as_deref(), &self.company_name)
    }
}

/// Partial profile update; absent fields keep their stored value
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateEmployerInput {
    pub email: Option<String>,
    pub password: Option<String>,
    pub company_name: Option<String>,
    pub company_slug: Option<String>,
    pub website: Option<String>,
    pub logo_url: Option<String>,
    pub description: Option<String>,
    pub location: Option<String>,
    pub phone: Option<String>,
}

impl UpdateEmployerInput {
    pub fn validate(&self) -> Result<(), String> {
        let mut v = Validator::new();
        if let Some(email) = &self.email {
            v.required("email", email).email("email", email);
        }
        if let Some(password) = &self.password {
            v.password("password", password);
        }
        if let Some(name) = &self.company_name {
            v.required("company_name", name);
        }
        if let Some(slug) = &self.company_slug {
            v.check(
                !slugify(slug).is_empty(),
                "company_slug must contain at least one letter or digit",
            );
        }
        v.finish()
    }
}

// =============================================================================
// SQL Queries - ALL queries must be in models/
// =============================================================================

impl Employer {
    pub async fn find_all(
        page: &ValidatedPagination,
        pool: &PgPool,
    ) -> Result<(Vec<Self>, i64)> {
        let employers = sqlx::query_as::<_, Employer>(
            "SELECT * FROM employers ORDER BY company_name ASC LIMIT $1 OFFSET $2",
        )
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(pool)
        .await?;

        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM employers")
            .fetch_one(pool)
            .await?;

        Ok((employers, total))
    }

    pub async fn find_by_id(id: EmployerId, pool: &PgPool) -> Result<Option<Self>> {
        let employer = sqlx::query_as::<_, Employer>("SELECT * FROM employers WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await?;
        Ok(employer)
    }

    /// Emails are unique case-insensitively
    pub async fn find_by_email(email: &str, pool: &PgPool) -> Result<Option<Self>> {
        let employer = sqlx::query_as::<_, Employer>(
            "SELECT * FROM employers WHERE LOWER(email) = LOWER($1)",
        )
        .bind(email.trim())
        .fetch_optional(pool)
        .await?;
        Ok(employer)
    }

    pub async fn create(
        input: &RegisterEmployerInput,
        password_hash: &str,
        pool: &PgPool,
    ) -> Result<Self> {
        let employer = sqlx::query_as::<_, Employer>(
            r#"
            INSERT INTO employers (
                id, email, password_hash, company_name, company_slug,
                website, logo_url, description, location, phone
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING *
            "#,
        )
        .bind(EmployerId::new())
        .bind(input.email.trim())
        .bind(password_hash)
        .bind(input.company_name.trim())
        .bind(input.company_slug())
        .bind(&input.website)
        .bind(&input.logo_url)
        .bind(&input.description)
        .bind(&input.location)
        .bind(&input.phone)
        .fetch_one(pool)
        .await?;
        Ok(employer)
    }

    pub async fn update(
        id: EmployerId,
        input: &UpdateEmployerInput,
        password_hash: Option<&str>,
        pool: &PgPool,
    ) -> Result<Option<Self>> {
        let company_slug = input.company_slug.as_deref().map(slugify);

        let employer = sqlx::query_as::<_, Employer>(
            r#"
            UPDATE employers
            SET email = COALESCE($2, email),
                password_hash = COALESCE($3, password_hash),
                company_name = COALESCE($4, company_name),
                company_slug = COALESCE($5, company_slug),
                website = COALESCE($6, website),
                logo_url = COALESCE($7, logo_url),
                description = COALESCE($8, description),
                location = COALESCE($9, location),
                phone = COALESCE($10, phone),
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(input.email.as_deref().map(str::trim))
        .bind(password_hash)
        .bind(input.company_name.as_deref().map(str::trim))
        .bind(company_slug)
        .bind(&input.website)
        .bind(&input.logo_url)
        .bind(&input.description)
        .bind(&input.location)
        .bind(&input.phone)
        .fetch_optional(pool)
        .await?;
        Ok(employer)
    }

    pub async fn delete(id: EmployerId, pool: &PgPool) -> Result<bool> {
        let result = sqlx::query("DELETE FROM employers WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
