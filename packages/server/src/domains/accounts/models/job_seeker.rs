use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use crate::common::utils::Validator;
use crate::common::{JobSeekerId, ValidatedPagination};

/// A candidate account that owns resumes
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct JobSeeker {
    pub id: JobSeekerId,
    pub email: String,
    pub username: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub first_name: String,
    pub last_name: String,
    pub phone: Option<String>,
    pub location: Option<String>,
    pub headline: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RegisterJobSeekerInput {
    pub email: String,
    pub username: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
    pub phone: Option<String>,
    pub location: Option<String>,
    pub headline: Option<String>,
}

fn is_valid_username(username: &str) -> bool {
    let len = username.chars().count();
    (3..=30).contains(&len)
        && username
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '.')
}

impl RegisterJobSeekerInput {
    pub fn validate(&self) -> Result<(), String> {
        let mut v = Validator::new();
        v.required("email", &self.email)
            .email("email", &self.email)
            .required("username", &self.username)
            .check(
                self.username.trim().is_empty() || is_valid_username(self.username.trim()),
                "username must be 3-30 letters, digits, dots or underscores",
            )
            .password("password", &self.password)
            .required("first_name", &self.first_name)
            .required("last_name", &self.last_name);
        v.finish()
    }
}

/// Partial profile update; absent fields keep their stored value
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateJobSeekerInput {
    pub email: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone: Option<String>,
    pub location: Option<String>,
    pub headline: Option<String>,
}

impl UpdateJobSeekerInput {
    pub fn validate(&self) -> Result<(), String> {
        let mut v = Validator::new();
        if let Some(email) = &self.email {
            v.required("email", email).email("email", email);
        }
        if let Some(username) = &self.username {
            v.check(
                is_valid_username(username.trim()),
                "username must be 3-30 letters, digits, dots or underscores",
            );
        }
        if let Some(password) = &self.password {
            v.password("password", password);
        }
        if let Some(first_name) = &self.first_name {
            v.required("first_name", first_name);
        }
        if let Some(last_name) = &self.last_name {
            v.required("last_name", last_name);
        }
        v.finish()
    }
}

// =============================================================================
// SQL Queries - ALL queries must be in models/
// =============================================================================

impl JobSeeker {
    pub async fn find_all(
        page: &ValidatedPagination,
        pool: &PgPool,
    ) -> Result<(Vec<Self>, i64)> {
        let seekers = sqlx::query_as::<_, JobSeeker>(
            "SELECT * FROM job_seekers ORDER BY created_at DESC LIMIT $1 OFFSET $2",
        )
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(pool)
        .await?;

        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM job_seekers")
            .fetch_one(pool)
            .await?;

        Ok((seekers, total))
    }

    pub async fn find_by_id(id: JobSeekerId, pool: &PgPool) -> Result<Option<Self>> {
        let seeker = sqlx::query_as::<_, JobSeeker>("SELECT * FROM job_seekers WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await?;
        Ok(seeker)
    }

    pub async fn find_by_email(email: &str, pool: &PgPool) -> Result<Option<Self>> {
        let seeker = sqlx::query_as::<_, JobSeeker>(
            "SELECT * FROM job_seekers WHERE LOWER(email) = LOWER($1)",
        )
        .bind(email.trim())
        .fetch_optional(pool)
        .await?;
        Ok(seeker)
    }

    pub async fn create(
        input: &RegisterJobSeekerInput,
        password_hash: &str,
        pool: &PgPool,
    ) -> Result<Self> {
        let seeker = sqlx::query_as::<_, JobSeeker>(
            r#"
            INSERT INTO job_seekers (
                id, email, username, password_hash, first_name, last_name,
                phone, location, headline
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING *
            "#,
        )
        .bind(JobSeekerId::new())
        .bind(input.email.trim())
        .bind(input.username.trim())
        .bind(password_hash)
        .bind(input.first_name.trim())
        .bind(input.last_name.trim())
        .bind(&input.phone)
        .bind(&input.location)
        .bind(&input.headline)
        .fetch_one(pool)
        .await?;
        Ok(seeker)
    }

    pub async fn update(
        id: JobSeekerId,
        input: &UpdateJobSeekerInput,
        password_hash: Option<&str>,
        pool: &PgPool,
    ) -> Result<Option<Self>> {
        let seeker = sqlx::query_as::<_, JobSeeker>(
            r#"
            UPDATE job_seekers
            SET email = COALESCE($2, email),
                username = COALESCE($3, username),
                password_hash = COALESCE($4, password_hash),
                first_name = COALESCE($5, first_name),
                last_name = COALESCE($6, last_name),
                phone = COALESCE($7, phone),
                location = COALESCE($8, location),
                headline = COALESCE($9, headline),
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(input.email.as_deref().map(str::trim))
        .bind(input.username.as_deref().map(str::trim))
        .bind(password_hash)
        .bind(input.first_name.as_deref().map(str::trim))
        .bind(input.last_name.as_deref().map(str::trim))
        .bind(&input.phone)
        .bind(&input.location)
        .bind(&input.headline)
        .fetch_optional(pool)
        .await?;
        Ok(seeker)
    }

    pub async fn delete(id: JobSeekerId, pool: &PgPool) -> Result<bool> {
        let result = sqlx::query("DELETE FROM job_seekers WHERE id = $1")
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
    fn test_username_rules() {
        assert!(is_valid_username("dev_rustacean"));
        assert!(is_valid_username("j.doe"));
        assert!(!is_valid_username("jd"));
        assert!(!is_valid_username("has space"));
        assert!(!is_valid_username(&"x".repeat(31)));
    }

    #[test]
    fn test_register_requires_names() {
        let input = RegisterJobSeekerInput {
            email: "dev@mail.com".to_string(),
            username: "dev".to_string(),
            password: "long enough".to_string(),
            first_name: "".to_string(),
            last_name: "Doe".to_string(),
            phone: None,
            location: None,
            headline: None,
        };
        let err = input.validate().unwrap_err();
        assert_eq!(err, "first_name is required");
    }
}
