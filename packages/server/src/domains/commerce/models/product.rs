use anyhow::Result;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use crate::common::utils::Validator;
use crate::common::ProductId;

/// A purchasable listing package (price, duration, featured placement)
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub description: Option<String>,
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    pub currency: String,
    pub duration_days: i32,
    pub featured: bool,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

fn default_currency() -> String {
    "USD".to_string()
}

fn default_duration() -> i32 {
    30
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProductInput {
    pub name: String,
    pub description: Option<String>,
    pub price: Decimal,
    #[serde(default = "default_currency")]
    pub currency: String,
    #[serde(default = "default_duration")]
    pub duration_days: i32,
    #[serde(default)]
    pub featured: bool,
    #[serde(default = "default_true")]
    pub active: bool,
}

impl ProductInput {
    pub fn validate(&self) -> Result<(), String> {
        let mut v = Validator::new();
        v.required("name", &self.name)
            .non_negative("price", Some(self.price))
            .currency("currency", &self.currency)
            .check(self.duration_days > 0, "duration_days must be positive");
        v.finish()
    }
}

// =============================================================================
// SQL Queries - ALL queries must be in models/
// =============================================================================

impl Product {
    pub async fn find_all(active_only: bool, pool: &PgPool) -> Result<Vec<Self>> {
        let products = sqlx::query_as::<_, Product>(
            "SELECT * FROM products WHERE (NOT $1 OR active) ORDER BY price ASC, name ASC",
        )
        .bind(active_only)
        .fetch_all(pool)
        .await?;
        Ok(products)
    }

    pub async fn find_by_id(id: ProductId, pool: &PgPool) -> Result<Option<Self>> {
        let product = sqlx::query_as::<_, Product>("SELECT * FROM products WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await?;
        Ok(product)
    }

    pub async fn create(input: &ProductInput, pool: &PgPool) -> Result<Self> {
        let product = sqlx::query_as::<_, Product>(
            r#"
            INSERT INTO products (id, name, description, price, currency, duration_days, featured, active)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING *
            "#,
        )
        .bind(ProductId::new())
        .bind(input.name.trim())
        .bind(&input.description)
        .bind(input.price.round_dp(2))
        .bind(input.currency.to_uppercase())
        .bind(input.duration_days)
        .bind(input.featured)
        .bind(input.active)
        .fetch_one(pool)
        .await?;
        Ok(product)
    }

    pub async fn update(id: ProductId, input: &ProductInput, pool: &PgPool) -> Result<Option<Self>> {
        let product = sqlx::query_as::<_, Product>(
            r#"
            UPDATE products
            SET name = $2, description = $3, price = $4, currency = $5,
                duration_days = $6, featured = $7, active = $8, updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(input.name.trim())
        .bind(&input.description)
        .bind(input.price.round_dp(2))
        .bind(input.currency.to_uppercase())
        .bind(input.duration_days)
        .bind(input.featured)
        .bind(input.active)
        .fetch_optional(pool)
        .await?;
        Ok(product)
    }

    pub async fn delete(id: ProductId, pool: &PgPool) -> Result<bool> {
        let result = sqlx::query("DELETE FROM products WHERE id = $1")
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
    fn test_input_defaults_and_decimal_parsing() {
        let input: ProductInput =
            serde_json::from_value(json!({"name": "Standard listing", "price": 99.5})).unwrap();
        assert!(input.validate().is_ok());
        assert_eq!(input.price, Decimal::new(995, 1));
        assert_eq!(input.currency, "USD");
        assert_eq!(input.duration_days, 30);
        assert!(input.active);
        assert!(!input.featured);
    }

    #[test]
    fn test_input_rejects_negative_price_and_zero_duration() {
        let input: ProductInput = serde_json::from_value(json!({
            "name": "Broken",
            "price": -5,
            "currency": "dollars",
            "duration_days": 0
        }))
        .unwrap();
        let err = input.validate().unwrap_err();
        assert!(err.contains("price must not be negative"));
        assert!(err.contains("currency must be a three-letter currency code"));
        assert!(err.contains("duration_days must be positive"));
    }

    #[test]
    fn test_price_serializes_as_number() {
        let product = Product {
            id: ProductId::new(),
            name: "Featured".to_string(),
            description: None,
            price: Decimal::new(14900, 2),
            currency: "USD".to_string(),
            duration_days: 60,
            featured: true,
            active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        let json = serde_json::to_value(&product).unwrap();
        assert_eq!(json["price"], 149.0);
    }
}
