use anyhow::Result;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::{PgExecutor, PgPool};

use crate::common::{
    DiscountId, EmployerId, JobId, OrderId, PaymentMethodId, ProductId, ValidatedPagination,
};

pub const ORDER_STATUSES: &[&str] = &["pending", "paid", "failed", "cancelled"];

/// A purchase of one product by one employer
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Order {
    pub id: OrderId,
    pub employer_id: EmployerId,
    pub product_id: ProductId,
    pub payment_method_id: PaymentMethodId,
    pub discount_id: Option<DiscountId>,
    pub job_id: Option<JobId>,
    #[serde(with = "rust_decimal::serde::float")]
    pub subtotal: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub discount_amount: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub total: Decimal,
    pub currency: String,
    pub status: String,
    pub checkout_session_id: Option<String>,
    pub payment_intent_id: Option<String>,
    pub paid_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Order {
    pub fn is_pending(&self) -> bool {
        self.status == "pending"
    }
}

/// Terminal states an unpaid order can be closed into
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClosedStatus {
    Failed,
    Cancelled,
}

impl ClosedStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            ClosedStatus::Failed => "failed",
            ClosedStatus::Cancelled => "cancelled",
        }
    }
}

/// Priced order ready to insert
#[derive(Debug, Clone)]
pub struct NewOrder {
    pub employer_id: EmployerId,
    pub product_id: ProductId,
    pub payment_method_id: PaymentMethodId,
    pub discount_id: Option<DiscountId>,
    pub job_id: Option<JobId>,
    pub subtotal: Decimal,
    pub discount_amount: Decimal,
    pub total: Decimal,
    pub currency: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct OrderFilters {
    pub employer_id: Option<EmployerId>,
    pub status: Option<String>,
}

// =============================================================================
// SQL Queries - ALL queries must be in models/
// =============================================================================

impl Order {
    pub async fn find_all(
        filters: &OrderFilters,
        page: &ValidatedPagination,
        pool: &PgPool,
    ) -> Result<(Vec<Self>, i64)> {
        let orders = sqlx::query_as::<_, Order>(
            r#"
            SELECT * FROM orders
            WHERE ($1::UUID IS NULL OR employer_id = $1)
              AND ($2::TEXT IS NULL OR status = $2)
            ORDER BY created_at DESC, id DESC
            LIMIT $3 OFFSET $4
            "#,
        )
        .bind(filters.employer_id)
        .bind(&filters.status)
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(pool)
        .await?;

        let total: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*) FROM orders
            WHERE ($1::UUID IS NULL OR employer_id = $1)
              AND ($2::TEXT IS NULL OR status = $2)
            "#,
        )
        .bind(filters.employer_id)
        .bind(&filters.status)
        .fetch_one(pool)
        .await?;

        Ok((orders, total))
    }

    pub async fn find_by_id(id: OrderId, pool: &PgPool) -> Result<Option<Self>> {
        let order = sqlx::query_as::<_, Order>("SELECT * FROM orders WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await?;
        Ok(order)
    }

    pub async fn find_by_checkout_session(session_id: &str, pool: &PgPool) -> Result<Option<Self>> {
        let order =
            sqlx::query_as::<_, Order>("SELECT * FROM orders WHERE checkout_session_id = $1")
                .bind(session_id)
                .fetch_optional(pool)
                .await?;
        Ok(order)
    }

    pub async fn create(new: &NewOrder, pool: &PgPool) -> Result<Self> {
        let order = sqlx::query_as::<_, Order>(
            r#"
            INSERT INTO orders (
                id, employer_id, product_id, payment_method_id, discount_id, job_id,
                subtotal, discount_amount, total, currency, status
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, 'pending')
            RETURNING *
            "#,
        )
        .bind(OrderId::new())
        .bind(new.employer_id)
        .bind(new.product_id)
        .bind(new.payment_method_id)
        .bind(new.discount_id)
        .bind(new.job_id)
        .bind(new.subtotal)
        .bind(new.discount_amount)
        .bind(new.total)
        .bind(&new.currency)
        .fetch_one(pool)
        .await?;
        Ok(order)
    }

    pub async fn set_checkout_session(
        id: OrderId,
        session_id: &str,
        pool: &PgPool,
    ) -> Result<Self> {
        let order = sqlx::query_as::<_, Order>(
            r#"
            UPDATE orders SET checkout_session_id = $2, updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(session_id)
        .fetch_one(pool)
        .await?;
        Ok(order)
    }

    /// `pending → paid`; `None` when the order was not pending
    ///
    /// The status predicate is the only guard against double fulfilment.
    pub async fn mark_paid<'e>(
        id: OrderId,
        payment_intent_id: Option<&str>,
        executor: impl PgExecutor<'e>,
    ) -> Result<Option<Self>> {
        let order = sqlx::query_as::<_, Order>(
            r#"
            UPDATE orders
            SET status = 'paid',
                paid_at = NOW(),
                payment_intent_id = COALESCE($2, payment_intent_id),
                updated_at = NOW()
            WHERE id = $1 AND status = 'pending'
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(payment_intent_id)
        .fetch_optional(executor)
        .await?;
        Ok(order)
    }

    /// `pending → failed | cancelled`; `None` when the order was not pending
    pub async fn close<'e>(
        id: OrderId,
        status: ClosedStatus,
        executor: impl PgExecutor<'e>,
    ) -> Result<Option<Self>> {
        let order = sqlx::query_as::<_, Order>(
            r#"
            UPDATE orders SET status = $2, updated_at = NOW()
            WHERE id = $1 AND status = 'pending'
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(status.as_str())
        .fetch_optional(executor)
        .await?;
        Ok(order)
    }
}
