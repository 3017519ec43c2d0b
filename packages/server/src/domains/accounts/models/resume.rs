use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use sqlx::types::Json;
use sqlx::PgPool;

use crate::common::utils::Validator;
use crate::common::{JobSeekerId, ResumeId};

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Resume {
    pub id: ResumeId,
    pub job_seeker_id: JobSeekerId,
    pub title: String,
    pub summary: Option<String>,
    pub skills: Vec<String>,
    pub experience: Json<Value>,
    pub education: Json<Value>,
    pub file_url: Option<String>,
    pub is_public: bool,
    pub custom_fields: Json<Map<String, Value>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateResumeInput {
    pub job_seeker_id: JobSeekerId,
    pub title: String,
    pub summary: Option<String>,
    #[serde(default)]
    pub skills: Vec<String>,
    #[serde(default = "empty_array")]
    pub experience: Value,
    #[serde(default = "empty_array")]
    pub education: Value,
    pub file_url: Option<String>,
    #[serde(default)]
    pub is_public: bool,
    #[serde(default)]
    pub custom_fields: Map<String, Value>,
}

fn empty_array() -> Value {
    Value::Array(Vec::new())
}

impl CreateResumeInput {
    pub fn validate(&self) -> Result<(), String> {
        let mut v = Validator::new();
        v.required("title", &self.title)
            .check(self.experience.is_array(), "experience must be a list")
            .check(self.education.is_array(), "education must be a list");
        v.finish()
    }
}

/// Partial update; absent fields keep their stored value
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateResumeInput {
    pub title: Option<String>,
    pub summary: Option<String>,
    pub skills: Option<Vec<String>>,
    pub experience: Option<Value>,
    pub education: Option<Value>,
    pub file_url: Option<String>,
    pub is_public: Option<bool>,
    pub custom_fields: Option<Map<String, Value>>,
}

impl UpdateResumeInput {
    pub fn validate(&self) -> Result<(), String> {
        let mut v = Validator::new();
        if let Some(title) = &self.title {
            v.required("title", title);
        }
        if let Some(experience) = &self.experience {
            v.check(experience.is_array(), "experience must be a list");
        }
        if let Some(education) = &self.education {
            v.check(education.is_array(), "education must be a list");
        }
        v.finish()
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ResumeFilters {
    pub job_seeker_id: Option<JobSeekerId>,
    #[serde(default)]
    pub public_only: bool,
}

// =============================================================================
// SQL Queries - ALL queries must be in models/
// =============================================================================

impl Resume {
    pub async fn find_all(filters: &ResumeFilters, pool: &PgPool) -> Result<Vec<Self>> {
        let resumes = sqlx::query_as::<_, Resume>(
            r#"
            SELECT * FROM resumes
            WHERE ($1::UUID IS NULL OR job_seeker_id = $1)
              AND (NOT $2 OR is_public)
            ORDER BY updated_at DESC
            "#,
        )
        .bind(filters.job_seeker_id)
        .bind(filters.public_only)
        .fetch_all(pool)
        .await?;
        Ok(resumes)
    }

    pub async fn find_by_id(id: ResumeId, pool: &PgPool) -> Result<Option<Self>> {
        let resume = sqlx::query_as::<_, Resume>("SELECT * FROM resumes WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await?;
        Ok(resume)
    }

    pub async fn create(input: &CreateResumeInput, pool: &PgPool) -> Result<Self> {
        let resume = sqlx::query_as::<_, Resume>(
            r#"
            INSERT INTO resumes (
                id, job_seeker_id, title, summary, skills, experience, education,
                file_url, is_public, custom_fields
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING *
            "#,
        )
        .bind(ResumeId::new())
        .bind(input.job_seeker_id)
        .bind(input.title.trim())
        .bind(&input.summary)
        .bind(&input.skills)
        .bind(Json(&input.experience))
        .bind(Json(&input.education))
        .bind(&input.file_url)
        .bind(input.is_public)
        .bind(Json(&input.custom_fields))
        .fetch_one(pool)
        .await?;
        Ok(resume)
    }

    pub async fn update(
        id: ResumeId,
        input: &UpdateResumeInput,
        pool: &PgPool,
    ) -> Result<Option<Self>> {
        let resume = sqlx::query_as::<_, Resume>(
            r#"
            UPDATE resumes
            SET title = COALESCE($2, title),
                summary = COALESCE($3, summary),
                skills = COALESCE($4, skills),
                experience = COALESCE($5, experience),
                education = COALESCE($6, education),
                file_url = COALESCE($7, file_url),
                is_public = COALESCE($8, is_public),
                custom_fields = COALESCE($9, custom_fields),
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(input.title.as_deref().map(str::trim))
        .bind(&input.summary)
        .bind(&input.skills)
        .bind(input.experience.as_ref().map(Json))
        .bind(input.education.as_ref().map(Json))
        .bind(&input.file_url)
        .bind(input.is_public)
        .bind(input.custom_fields.as_ref().map(Json))
        .fetch_optional(pool)
        .await?;
        Ok(resume)
    }

    pub async fn delete(id: ResumeId, pool: &PgPool) -> Result<bool> {
        let result = sqlx::query("DELETE FROM resumes WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_create_input_defaults() {
        let input: CreateResumeInput = serde_json::from_value(json!({
            "job_seeker_id": "01890a5d-ac96-774b-bcce-b302099a8057",
            "title": "Backend Engineer"
        }))
        .unwrap();

        assert!(input.validate().is_ok());
        assert!(input.skills.is_empty());
        assert_eq!(input.experience, json!([]));
        assert!(!input.is_public);
    }

    #[test]
    fn test_experience_must_be_a_list() {
        let input: CreateResumeInput = serde_json::from_value(json!({
            "job_seeker_id": "01890a5d-ac96-774b-bcce-b302099a8057",
            "title": "Backend Engineer",
            "experience": {"company": "Acme"}
        }))
        .unwrap();

        assert_eq!(input.validate().unwrap_err(), "experience must be a list");
    }
}
