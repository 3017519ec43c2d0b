use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use crate::common::utils::{slug_or_derive, Validator};
use crate::common::PaymentMethodId;

pub const PROVIDERS: &[&str] = &["stripe", "manual"];

/// How an order is paid: through the hosted gateway or settled by hand
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct PaymentMethod {
    pub id: PaymentMethodId,
    pub name: String,
    pub slug: String,
    pub provider: String,
    pub description: Option<String>,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl PaymentMethod {
    pub fn is_manual(&self) -> bool {
        self.provider == "manual"
    }
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Deserialize)]
pub struct PaymentMethodInput {
    pub name: String,
    pub slug: Option<String>,
    pub provider: String,
    pub description: Option<String>,
    #[serde(default = "default_true")]
    pub active: bool,
}

impl PaymentMethodInput {
    pub fn validate(&self) -> Result<(), String> {
        let mut v = Validator::new();
        v.required("name", &self.name)
            .one_of("provider", &self.provider, PROVIDERS)
            .check(
                !self.slug().is_empty(),
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

impl PaymentMethod {
    pub async fn find_all(active_only: bool, pool: &PgPool) -> Result<Vec<Self>> {
        let methods = sqlx::query_as::<_, PaymentMethod>(
            "SELECT * FROM payment_methods WHERE (NOT $1 OR active) ORDER BY name ASC",
        )
        .bind(active_only)
        .fetch_all(pool)
        .await?;
        Ok(methods)
    }

    pub async fn find_by_id(id: PaymentMethodId, pool: &PgPool) -> Result<Option<Self>> {
        let method =
            sqlx::query_as::<_, PaymentMethod>("SELECT * FROM payment_methods WHERE id = $1")
                .bind(id)
                .fetch_optional(pool)
                .await?;
        Ok(method)
    }

    pub async fn create(input: &PaymentMethodInput, pool: &PgPool) -> Result<Self> {
        let method = sqlx::query_as::<_, PaymentMethod>(
            r#"
            INSERT INTO payment_methods (id, name, slug, provider, description, active)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(PaymentMethodId::new())
        .bind(input.name.trim())
        .bind(input.slug())
        .bind(&input.provider)
        .bind(&input.description)
        .bind(input.active)
        .fetch_one(pool)
        .await?;
        Ok(method)
    }

    pub async fn update(
        id: PaymentMethodId,
        input: &PaymentMethodInput,
        pool: &PgPool,
    ) -> Result<Option<Self>> {
        let method = sqlx::query_as::<_, PaymentMethod>(
            r#"
            UPDATE payment_methods
            SET name = $2, slug = $3, provider = $4, description = $5, active = $6,
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(input.name.trim())
        .bind(input.slug())
        .bind(&input.provider)
        .bind(&input.description)
        .bind(input.active)
        .fetch_optional(pool)
        .await?;
        Ok(method)
    }

    pub async fn delete(id: PaymentMethodId, pool: &PgPool) -> Result<bool> {
        let result = sqlx::query("DELETE FROM payment_methods WHERE id = $1")
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
    fn test_provider_validated() {
        let input = PaymentMethodInput {
            name: "Card".to_string(),
            slug: None,
            provider: "paypal".to_string(),
            description: None,
            active: true,
        };
        assert!(input.validate().unwrap_err().contains("provider must be one of: stripe, manual"));
    }

    #[test]
    fn test_slug_derived_from_name() {
        let input = PaymentMethodInput {
            name: "Bank Transfer".to_string(),
            slug: None,
            provider: "manual".to_string(),
            description: None,
            active: true,
        };
        assert!(input.validate().is_ok());
        assert_eq!(input.slug(), "bank-transfer");
    }
}
