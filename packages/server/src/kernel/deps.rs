//! Server dependencies (using traits for testability)
//!
//! This module provides the central dependency container used by all route handlers.
//! External services use trait abstractions to enable testing.

use anyhow::Result;
use async_trait::async_trait;
use sqlx::PgPool;
use std::sync::Arc;
use stripe::{CheckoutSession, CreateCheckoutSession, Event, StripeService};

use crate::config::SiteConfig;
use crate::domains::auth::JwtService;
use crate::kernel::{
    BasePaymentGateway, CheckoutRequest, GatewayEvent, GatewayEventKind, GatewaySession,
    WebhookVerificationError,
};

// =============================================================================
// StripeService Adapter (implements BasePaymentGateway trait)
// =============================================================================

/// Wrapper around StripeService that implements BasePaymentGateway trait
pub struct StripeAdapter(pub Arc<StripeService>);

impl StripeAdapter {
    pub fn new(service: Arc<StripeService>) -> Self {
        Self(service)
    }
}

impl From<CheckoutSession> for GatewaySession {
    fn from(session: CheckoutSession) -> Self {
        let paid = session.is_paid();
        let expired = session.is_expired();
        let order_reference = session
            .metadata
            .get("order_id")
            .cloned()
            .or(session.client_reference_id);

        GatewaySession {
            id: session.id,
            url: session.url,
            paid,
            expired,
            payment_intent: session.payment_intent,
            order_reference,
        }
    }
}

/// Map a verified gateway event onto the kinds the commerce flow handles
pub fn gateway_event_from_stripe(event: Event) -> GatewayEvent {
    let kind = match event.event_type.as_str() {
        "checkout.session.completed" => GatewayEventKind::CheckoutCompleted,
        "checkout.session.async_payment_succeeded" => GatewayEventKind::AsyncPaymentSucceeded,
        "checkout.session.async_payment_failed" => GatewayEventKind::AsyncPaymentFailed,
        "checkout.session.expired" => GatewayEventKind::CheckoutExpired,
        other => GatewayEventKind::Other(other.to_string()),
    };

    let session = match kind {
        GatewayEventKind::Other(_) => None,
        _ => event.checkout_session().ok().map(GatewaySession::from),
    };

    GatewayEvent {
        id: event.id,
        kind,
        session,
    }
}

#[async_trait]
impl BasePaymentGateway for StripeAdapter {
    async fn create_checkout_session(&self, request: &CheckoutRequest) -> Result<GatewaySession> {
        let order_id = request.order_id.to_string();
        let params = CreateCheckoutSession {
            unit_amount: request.amount_minor,
            currency: request.currency.clone(),
            product_name: request.product_name.clone(),
            success_url: request.success_url.clone(),
            cancel_url: request.cancel_url.clone(),
            client_reference_id: Some(order_id.clone()),
            customer_email: request.customer_email.clone(),
            metadata: vec![("order_id".to_string(), order_id)],
        };

        self.0
            .create_checkout_session(&params)
            .await
            .map(GatewaySession::from)
            .map_err(Into::into)
    }

    async fn retrieve_checkout_session(&self, session_id: &str) -> Result<GatewaySession> {
        self.0
            .retrieve_checkout_session(session_id)
            .await
            .map(GatewaySession::from)
            .map_err(Into::into)
    }

    fn construct_event(
        &self,
        payload: &str,
        signature_header: &str,
    ) -> std::result::Result<GatewayEvent, WebhookVerificationError> {
        let now = chrono::Utc::now().timestamp();
        self.0
            .construct_event(payload, signature_header, now)
            .map(gateway_event_from_stripe)
            .map_err(|e| WebhookVerificationError(e.to_string()))
    }
}

// =============================================================================
// ServerDeps
// =============================================================================

/// Server dependencies accessible to route handlers
#[derive(Clone)]
pub struct ServerDeps {
    pub db_pool: PgPool,
    pub payments: Arc<dyn BasePaymentGateway>,
    pub jwt_service: Arc<JwtService>,
    /// Public site identity for links and feeds
    pub site: SiteConfig,
    /// Maximum number of listings in a syndication feed
    pub feed_limit: i64,
}

impl ServerDeps {
    pub fn new(
        db_pool: PgPool,
        payments: Arc<dyn BasePaymentGateway>,
        jwt_service: Arc<JwtService>,
        site: SiteConfig,
        feed_limit: i64,
    ) -> Self {
        Self {
            db_pool,
            payments,
            jwt_service,
            site,
            feed_limit,
        }
    }
}
