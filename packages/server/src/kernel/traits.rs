// Trait definitions for dependency injection
//
// These are INFRASTRUCTURE traits only - no business logic.
// Business logic (like "fulfil an order") lives in domain functions that use these traits.
//
// Naming convention: Base* for trait names (e.g., BasePaymentGateway)

use anyhow::Result;
use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

// =============================================================================
// Payment Gateway Trait (Infrastructure - hosted checkout)
// =============================================================================

/// What the commerce flow asks the gateway to charge
#[derive(Debug, Clone, PartialEq)]
pub struct CheckoutRequest {
    pub order_id: Uuid,
    /// Amount in the currency's minor unit (cents)
    pub amount_minor: i64,
    pub currency: String,
    pub product_name: String,
    pub success_url: String,
    pub cancel_url: String,
    pub customer_email: Option<String>,
}

/// Gateway-neutral view of a hosted checkout session
#[derive(Debug, Clone, PartialEq)]
pub struct GatewaySession {
    pub id: String,
    pub url: Option<String>,
    pub paid: bool,
    pub expired: bool,
    pub payment_intent: Option<String>,
    /// Our order id, echoed back by the gateway
    pub order_reference: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GatewayEventKind {
    CheckoutCompleted,
    AsyncPaymentSucceeded,
    AsyncPaymentFailed,
    CheckoutExpired,
    Other(String),
}

/// A verified webhook delivery
#[derive(Debug, Clone)]
pub struct GatewayEvent {
    pub id: String,
    pub kind: GatewayEventKind,
    pub session: Option<GatewaySession>,
}

#[derive(Debug, Error)]
#[error("Webhook verification failed: {0}")]
pub struct WebhookVerificationError(pub String);

#[async_trait]
pub trait BasePaymentGateway: Send + Sync {
    /// Create a hosted checkout session for one order
    async fn create_checkout_session(&self, request: &CheckoutRequest) -> Result<GatewaySession>;

    /// Fetch the current state of a checkout session (polling verification)
    async fn retrieve_checkout_session(&self, session_id: &str) -> Result<GatewaySession>;

    /// Verify a webhook signature and decode the event
    fn construct_event(
        &self,
        payload: &str,
        signature_header: &str,
    ) -> std::result::Result<GatewayEvent, WebhookVerificationError>;
}
