use anyhow::{Context, Result};
use chrono::{Duration, Utc};
use tracing::info;

use crate::common::OrderId;
use crate::domains::commerce::models::{Discount, Order, Product};
use crate::domains::jobs::models::Job;
use crate::kernel::ServerDeps;

/// Mark a pending order paid and apply its side effects
///
/// Returns the paid order, or `None` when the order was not pending (already
/// fulfilled, failed or cancelled), in which case nothing changes. The order
/// update, discount redemption and listing activation commit together.
pub async fn fulfil_order(
    order_id: OrderId,
    payment_intent_id: Option<&str>,
    deps: &ServerDeps,
) -> Result<Option<Order>> {
    let mut tx = deps.db_pool.begin().await?;

    let Some(order) = Order::mark_paid(order_id, payment_intent_id, &mut *tx).await? else {
        info!(order_id = %order_id, "Order not pending, fulfilment skipped");
        return Ok(None);
    };

    if let Some(discount_id) = order.discount_id {
        Discount::increment_usage(discount_id, &mut *tx).await?;
    }

    if let Some(job_id) = order.job_id {
        let product = Product::find_by_id(order.product_id, &deps.db_pool)
            .await?
            .context("Order references a missing product")?;
        let expires_at = Utc::now() + Duration::days(i64::from(product.duration_days));
        Job::activate(job_id, product.featured, expires_at, &mut *tx).await?;
        info!(order_id = %order.id, job_id = %job_id, %expires_at, "Job activated");
    }

    tx.commit().await?;

    info!(order_id = %order.id, total = %order.total, "Order fulfilled");
    Ok(Some(order))
}
