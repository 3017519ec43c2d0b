//! Bringing orders in line with the gateway: webhooks, polling, cancellation.

use anyhow::Result;
use tracing::{debug, info, warn};

use super::fulfil::fulfil_order;
use super::CommerceError;
use crate::common::OrderId;
use crate::domains::commerce::models::{ClosedStatus, Order, PaymentMethod};
use crate::domains::jobs::models::Job;
use crate::kernel::{GatewayEvent, GatewayEventKind, GatewaySession, ServerDeps};

/// Find the order a gateway session belongs to
async fn order_for_session(session: &GatewaySession, deps: &ServerDeps) -> Result<Option<Order>> {
    if let Some(id) = session
        .order_reference
        .as_deref()
        .and_then(|r| OrderId::parse(r).ok())
    {
        if let Some(order) = Order::find_by_id(id, &deps.db_pool).await? {
            return Ok(Some(order));
        }
    }
    Order::find_by_checkout_session(&session.id, &deps.db_pool).await
}

/// Close an unpaid order and hand its listing back to draft
async fn close_order(
    order: &Order,
    status: ClosedStatus,
    deps: &ServerDeps,
) -> Result<Option<Order>> {
    let closed = Order::close(order.id, status, &deps.db_pool).await?;
    if let Some(closed) = &closed {
        if let Some(job_id) = closed.job_id {
            Job::release_pending_payment(job_id, &deps.db_pool).await?;
        }
        info!(order_id = %closed.id, status = status.as_str(), "Order closed");
    }
    Ok(closed)
}

/// Apply one verified webhook event
///
/// Events for unknown orders and event types we do not act on are
/// acknowledged without changes so the gateway stops redelivering them.
pub async fn handle_gateway_event(event: &GatewayEvent, deps: &ServerDeps) -> Result<()> {
    let Some(session) = &event.session else {
        debug!(event_id = %event.id, kind = ?event.kind, "Ignoring gateway event");
        return Ok(());
    };

    let Some(order) = order_for_session(session, deps).await? else {
        warn!(
            event_id = %event.id,
            session_id = %session.id,
            "Gateway event for unknown order"
        );
        return Ok(());
    };

    match &event.kind {
        GatewayEventKind::CheckoutCompleted if session.paid => {
            fulfil_order(order.id, session.payment_intent.as_deref(), deps).await?;
        }
        GatewayEventKind::CheckoutCompleted => {
            info!(order_id = %order.id, "Checkout completed, awaiting asynchronous payment");
        }
        GatewayEventKind::AsyncPaymentSucceeded => {
            fulfil_order(order.id, session.payment_intent.as_deref(), deps).await?;
        }
        GatewayEventKind::AsyncPaymentFailed => {
            close_order(&order, ClosedStatus::Failed, deps).await?;
        }
        GatewayEventKind::CheckoutExpired => {
            close_order(&order, ClosedStatus::Cancelled, deps).await?;
        }
        GatewayEventKind::Other(kind) => {
            debug!(event_id = %event.id, kind = %kind, "Ignoring gateway event");
        }
    }

    Ok(())
}

/// Poll the gateway for a pending order and apply what it reports
pub async fn verify_order(order_id: OrderId, deps: &ServerDeps) -> Result<Order, CommerceError> {
    let order = Order::find_by_id(order_id, &deps.db_pool)
        .await?
        .ok_or(CommerceError::NotFound("Order"))?;

    let Some(session_id) = order.checkout_session_id.clone() else {
        return Ok(order);
    };
    if !order.is_pending() {
        return Ok(order);
    }

    let session = deps.payments.retrieve_checkout_session(&session_id).await?;
    if session.paid {
        fulfil_order(order.id, session.payment_intent.as_deref(), deps).await?;
    } else if session.expired {
        close_order(&order, ClosedStatus::Cancelled, deps).await?;
    } else {
        debug!(order_id = %order.id, "Checkout still open");
        return Ok(order);
    }

    Order::find_by_id(order_id, &deps.db_pool)
        .await?
        .ok_or(CommerceError::NotFound("Order"))
}

/// Cancel an order the buyer abandoned; only pending orders can be cancelled
pub async fn cancel_order(order_id: OrderId, deps: &ServerDeps) -> Result<Order, CommerceError> {
    let order = Order::find_by_id(order_id, &deps.db_pool)
        .await?
        .ok_or(CommerceError::NotFound("Order"))?;

    close_order(&order, ClosedStatus::Cancelled, deps)
        .await?
        .ok_or_else(|| CommerceError::invalid("Only pending orders can be cancelled"))
}

/// Settle a pending order paid outside the gateway (bank transfer, invoice)
pub async fn confirm_manual_payment(
    order_id: OrderId,
    deps: &ServerDeps,
) -> Result<Order, CommerceError> {
    let order = Order::find_by_id(order_id, &deps.db_pool)
        .await?
        .ok_or(CommerceError::NotFound("Order"))?;

    let method = PaymentMethod::find_by_id(order.payment_method_id, &deps.db_pool).await?;
    if !method.map_or(false, |m| m.is_manual()) {
        return Err(CommerceError::invalid(
            "Only orders with a manual payment method can be confirmed by hand",
        ));
    }

    fulfil_order(order.id, None, deps)
        .await?
        .ok_or_else(|| CommerceError::invalid("Only pending orders can be confirmed"))
}
