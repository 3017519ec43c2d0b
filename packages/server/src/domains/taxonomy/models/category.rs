use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use crate::common::utils::{slug_or_derive, Validator};
use crate::common::CategoryId;

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CategoryInput {
    pub name: String,
    pub slug: Option<String>,
    pub description: Option<String>,
}

impl CategoryInput {
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

// =============================================================================
// SQL Queries - ALL queries must be in models/
// =============================================================================

impl Category {
    pub async fn find_all(pool: &PgPool) -> Result<Vec<Self>> {
        let categories =
            sqlx::query_as::<_, Category>("SELECT * FROM categories ORDER BY name ASC")
                .fetch_all(pool)
                .await?;
        Ok(categories)
    }

    pub async fn find_by_id(id: CategoryId, pool: &PgPool) -> Result<Option<Self>> {
        let category = sqlx::query_as::<_, Category>("SELECT * FROM categories WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await?;
        Ok(category)
    }

    pub async fn find_by_slug(slug: &str, pool: &PgPool) -> Result<Option<Self>> {
        let category = sqlx::query_as::<_, Category>("SELECT * FROM categories WHERE slug = $1")
            .bind(slug)
            .fetch_optional(pool)
            .await?;
        Ok(category)
    }

    pub async fn create(input: &CategoryInput, pool: &PgPool) -> Result<Self> {
        let category = sqlx::query_as::<_, Category>(
            r#"
            INSERT INTO categories (id, name, slug, description)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(CategoryId::new())
        .bind(input.name.trim())
        .bind(input.slug())
        .bind(&input.description)
        .fetch_one(pool)
        .await?;
        Ok(category)
    }

    pub async fn update(
        id: CategoryId,
        input: &CategoryInput,
        pool: &PgPool,
    ) -> Result<Option<Self>> {
        let category = sqlx::query_as::<_, Category>(
            r#"
            UPDATE categories
            SET name = $2, slug = $3, description = $4, updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(input.name.trim())
        .bind(input.slug())
        .bind(&input.description)
        .fetch_optional(pool)
        .await?;
        Ok(category)
    }

    pub async fn delete(id: CategoryId, pool: &PgPool) -> Result<bool> {
        let result = sqlx::query("DELETE FROM categories WHERE id = $1")
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
    fn test_slug_derived_from_name() {
        let input = CategoryInput {
            name: "Software Engineering".to_string(),
            slug: None,
            description: None,
        };
        assert!(input.validate().is_ok());
        assert_eq!(input.slug(), "software-engineering");
    }

    #[test]
    fn test_name_required() {
        let input = CategoryInput {
            name: "   ".to_string(),
            slug: None,
            description: None,
        };
        let err = input.validate().unwrap_err();
        assert!(err.contains("name is required"));
    }
}
