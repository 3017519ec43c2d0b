use anyhow::Context;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{error, info};

use super::fulfil::fulfil_order;
use super::CommerceError;
use crate::common::{EmployerId, JobId, PaymentMethodId, ProductId};
use crate::domains::accounts::models::Employer;
use crate::domains::commerce::models::{
    ClosedStatus, Discount, NewOrder, Order, PaymentMethod, Product,
};
use crate::domains::commerce::pricing::{amount_minor, quote};
use crate::domains::jobs::models::Job;
use crate::kernel::{CheckoutRequest, ServerDeps};

#[derive(Debug, Clone, Deserialize)]
pub struct CheckoutInput {
    pub employer_id: EmployerId,
    pub product_id: ProductId,
    pub payment_method_id: PaymentMethodId,
    pub discount_code: Option<String>,
    pub job_id: Option<JobId>,
    pub success_url: Option<String>,
    pub cancel_url: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CheckoutResult {
    pub order: Order,
    /// Hosted payment page; `None` for manual payment or free orders
    pub checkout_url: Option<String>,
    pub session_id: Option<String>,
}

/// Price and record a pending order, then open a gateway checkout for it
///
/// Manual payment methods leave the order pending for an operator to settle.
/// Orders that total zero are fulfilled immediately without the gateway.
pub async fn checkout(
    input: &CheckoutInput,
    deps: &ServerDeps,
) -> Result<CheckoutResult, CommerceError> {
    let pool = &deps.db_pool;

    let employer = Employer::find_by_id(input.employer_id, pool)
        .await?
        .ok_or_else(|| CommerceError::invalid("Employer does not exist"))?;

    let product = Product::find_by_id(input.product_id, pool)
        .await?
        .filter(|p| p.active)
        .ok_or_else(|| CommerceError::invalid("Product is not available"))?;

    let payment_method = PaymentMethod::find_by_id(input.payment_method_id, pool)
        .await?
        .filter(|m| m.active)
        .ok_or_else(|| CommerceError::invalid("Payment method is not available"))?;

    let discount = match input.discount_code.as_deref().map(str::trim) {
        Some(code) if !code.is_empty() => {
            let discount = Discount::find_by_code(code, pool)
                .await?
                .ok_or_else(|| CommerceError::invalid("Discount code is not valid"))?;
            discount
                .check_redeemable(Utc::now())
                .map_err(|reason| CommerceError::invalid(reason.to_string()))?;
            Some(discount)
        }
        _ => None,
    };

    if let Some(job_id) = input.job_id {
        let job = Job::find_by_id(job_id, pool)
            .await?
            .ok_or_else(|| CommerceError::invalid("Job does not exist"))?;
        if job.employer_id != employer.id {
            return Err(CommerceError::invalid("Job belongs to another employer"));
        }
    }

    let priced = quote(&product, discount.as_ref());
    let order = Order::create(
        &NewOrder {
            employer_id: employer.id,
            product_id: product.id,
            payment_method_id: payment_method.id,
            discount_id: discount.as_ref().map(|d| d.id),
            job_id: input.job_id,
            subtotal: priced.subtotal,
            discount_amount: priced.discount_amount,
            total: priced.total,
            currency: priced.currency.clone(),
        },
        pool,
    )
    .await?;

    info!(
        order_id = %order.id,
        employer_id = %employer.id,
        total = %order.total,
        currency = %order.currency,
        "Order created"
    );

    if let Some(job_id) = order.job_id {
        Job::mark_pending_payment(job_id, pool).await?;
    }

    if order.total.is_zero() {
        let order = fulfil_order(order.id, None, deps)
            .await?
            .unwrap_or(order);
        return Ok(CheckoutResult {
            order,
            checkout_url: None,
            session_id: None,
        });
    }

    if payment_method.is_manual() {
        return Ok(CheckoutResult {
            order,
            checkout_url: None,
            session_id: None,
        });
    }

    let request = CheckoutRequest {
        order_id: order.id.into_uuid(),
        amount_minor: amount_minor(order.total, &order.currency)?,
        currency: order.currency.clone(),
        product_name: product.name.clone(),
        success_url: input.success_url.clone().unwrap_or_else(|| {
            deps.site
                .link(&format!("orders/{}/success?session_id={{CHECKOUT_SESSION_ID}}", order.id))
        }),
        cancel_url: input
            .cancel_url
            .clone()
            .unwrap_or_else(|| deps.site.link(&format!("orders/{}/cancel", order.id))),
        customer_email: Some(employer.email.clone()),
    };

    let session = match deps.payments.create_checkout_session(&request).await {
        Ok(session) => session,
        Err(e) => {
            error!(order_id = %order.id, error = %e, "Checkout session creation failed");
            Order::close(order.id, ClosedStatus::Failed, pool).await?;
            if let Some(job_id) = order.job_id {
                Job::release_pending_payment(job_id, pool).await?;
            }
            return Err(CommerceError::Internal(
                e.context("Payment gateway rejected checkout"),
            ));
        }
    };

    let order = Order::set_checkout_session(order.id, &session.id, pool)
        .await
        .context("Failed to store checkout session")?;

    info!(order_id = %order.id, session_id = %session.id, "Checkout session created");

    Ok(CheckoutResult {
        order,
        checkout_url: session.url,
        session_id: Some(session.id),
    })
}
