use anyhow::Result;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::{PgExecutor, PgPool};

use crate::common::utils::Validator;
use crate::common::DiscountId;

pub const DISCOUNT_TYPES: &[&str] = &["percentage", "fixed"];

/// A promo code redeemable at checkout
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Discount {
    pub id: DiscountId,
    pub code: String,
    pub description: Option<String>,
    pub discount_type: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Decimal,
    pub max_uses: Option<i32>,
    pub used_count: i32,
    pub starts_at: Option<DateTime<Utc>>,
    pub expires_at: Option<DateTime<Utc>>,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Why a code cannot be redeemed right now
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NotRedeemable {
    Inactive,
    NotStarted,
    Expired,
    UsageLimitReached,
}

impl std::fmt::Display for NotRedeemable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let message = match self {
            NotRedeemable::Inactive => "Discount code is not active",
            NotRedeemable::NotStarted => "Discount code is not valid yet",
            NotRedeemable::Expired => "Discount code has expired",
            NotRedeemable::UsageLimitReached => "Discount code has reached its usage limit",
        };
        f.write_str(message)
    }
}

impl Discount {
    /// Active, inside its time window and under `max_uses`
    pub fn check_redeemable(&self, now: DateTime<Utc>) -> Result<(), NotRedeemable> {
        if !self.active {
            return Err(NotRedeemable::Inactive);
        }
        if matches!(self.starts_at, Some(starts_at) if now < starts_at) {
            return Err(NotRedeemable::NotStarted);
        }
        if matches!(self.expires_at, Some(expires_at) if now >= expires_at) {
            return Err(NotRedeemable::Expired);
        }
        if matches!(self.max_uses, Some(max) if self.used_count >= max) {
            return Err(NotRedeemable::UsageLimitReached);
        }
        Ok(())
    }
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Deserialize)]
pub struct DiscountInput {
    pub code: String,
    pub description: Option<String>,
    pub discount_type: String,
    pub amount: Decimal,
    pub max_uses: Option<i32>,
    pub starts_at: Option<DateTime<Utc>>,
    pub expires_at: Option<DateTime<Utc>>,
    #[serde(default = "default_true")]
    pub active: bool,
}

impl DiscountInput {
    pub fn validate(&self) -> Result<(), String> {
        let mut v = Validator::new();
        v.required("code", &self.code)
            .check(
                !self.code.trim().contains(char::is_whitespace),
                "code must not contain spaces",
            )
            .one_of("discount_type", &self.discount_type, DISCOUNT_TYPES)
            .non_negative("amount", Some(self.amount))
            .check(
                self.discount_type != "percentage" || self.amount <= Decimal::ONE_HUNDRED,
                "amount must be at most 100 for percentage discounts",
            )
            .check(
                self.max_uses.map_or(true, |m| m > 0),
                "max_uses must be positive",
            );
        if let (Some(starts_at), Some(expires_at)) = (self.starts_at, self.expires_at) {
            v.check(starts_at < expires_at, "starts_at must be before expires_at");
        }
        v.finish()
    }

    /// Codes are stored upper-case and matched case-insensitively
    fn code(&self) -> String {
        self.code.trim().to_uppercase()
    }
}

// =============================================================================
// SQL Queries - ALL queries must be in models/
// =============================================================================

impl Discount {
    pub async fn find_all(pool: &PgPool) -> Result<Vec<Self>> {
        let discounts =
            sqlx::query_as::<_, Discount>("SELECT * FROM discounts ORDER BY created_at DESC")
                .fetch_all(pool)
                .await?;
        Ok(discounts)
    }

    pub async fn find_by_id(id: DiscountId, pool: &PgPool) -> Result<Option<Self>> {
        let discount = sqlx::query_as::<_, Discount>("SELECT * FROM discounts WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await?;
        Ok(discount)
    }

    pub async fn find_by_code(code: &str, pool: &PgPool) -> Result<Option<Self>> {
        let discount =
            sqlx::query_as::<_, Discount>("SELECT * FROM discounts WHERE code = UPPER($1)")
                .bind(code.trim())
                .fetch_optional(pool)
                .await?;
        Ok(discount)
    }

    pub async fn create(input: &DiscountInput, pool: &PgPool) -> Result<Self> {
        let discount = sqlx::query_as::<_, Discount>(
            r#"
            INSERT INTO discounts (
                id, code, description, discount_type, amount, max_uses,
                starts_at, expires_at, active
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING *
            "#,
        )
        .bind(DiscountId::new())
        .bind(input.code())
        .bind(&input.description)
        .bind(&input.discount_type)
        .bind(input.amount.round_dp(2))
        .bind(input.max_uses)
        .bind(input.starts_at)
        .bind(input.expires_at)
        .bind(input.active)
        .fetch_one(pool)
        .await?;
        Ok(discount)
    }

    pub async fn update(
        id: DiscountId,
        input: &DiscountInput,
        pool: &PgPool,
    ) -> Result<Option<Self>> {
        let discount = sqlx::query_as::<_, Discount>(
            r#"
            UPDATE discounts
            SET code = $2, description = $3, discount_type = $4, amount = $5,
                max_uses = $6, starts_at = $7, expires_at = $8, active = $9,
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(input.code())
        .bind(&input.description)
        .bind(&input.discount_type)
        .bind(input.amount.round_dp(2))
        .bind(input.max_uses)
        .bind(input.starts_at)
        .bind(input.expires_at)
        .bind(input.active)
        .fetch_optional(pool)
        .await?;
        Ok(discount)
    }

    pub async fn delete(id: DiscountId, pool: &PgPool) -> Result<bool> {
        let result = sqlx::query("DELETE FROM discounts WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Count one redemption; called when an order using the code is paid
    pub async fn increment_usage<'e>(id: DiscountId, executor: impl PgExecutor<'e>) -> Result<()> {
        sqlx::query(
            "UPDATE discounts SET used_count = used_count + 1, updated_at = NOW() WHERE id = $1",
        )
        .bind(id)
        .execute(executor)
        .await?;
        Ok(())
    }
}
