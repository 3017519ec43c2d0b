// TestDependencies - mock implementations for testing
//
// Provides mock services that can be injected into ServerDeps for tests.

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use super::deps::gateway_event_from_stripe;
use super::{
    BasePaymentGateway, CheckoutRequest, GatewayEvent, GatewaySession, WebhookVerificationError,
};

/// Webhook signing secret the mock gateway verifies against
pub const MOCK_WEBHOOK_SECRET: &str = "whsec_mock";

// =============================================================================
// Mock Payment Gateway
// =============================================================================

/// In-memory gateway: sessions are created unpaid and flipped by the test
pub struct MockPaymentGateway {
    sessions: Arc<Mutex<HashMap<String, GatewaySession>>>,
    create_calls: Arc<Mutex<Vec<CheckoutRequest>>>,
    fail_create: AtomicBool,
    counter: AtomicUsize,
}

impl MockPaymentGateway {
    pub fn new() -> Self {
        Self {
            sessions: Arc::new(Mutex::new(HashMap::new())),
            create_calls: Arc::new(Mutex::new(Vec::new())),
            fail_create: AtomicBool::new(false),
            counter: AtomicUsize::new(0),
        }
    }

    /// Every create_checkout_session call fails
    pub fn failing() -> Self {
        let mock = Self::new();
        mock.fail_create.store(true, Ordering::SeqCst);
        mock
    }

    pub fn create_calls(&self) -> Vec<CheckoutRequest> {
        self.create_calls.lock().unwrap().clone()
    }

    pub fn mark_paid(&self, session_id: &str, payment_intent: &str) {
        if let Some(session) = self.sessions.lock().unwrap().get_mut(session_id) {
            session.paid = true;
            session.payment_intent = Some(payment_intent.to_string());
        }
    }

    pub fn mark_expired(&self, session_id: &str) {
        if let Some(session) = self.sessions.lock().unwrap().get_mut(session_id) {
            session.expired = true;
        }
    }

    /// Signature header for a payload, valid right now
    pub fn sign(&self, payload: &str) -> String {
        stripe::webhook::signature_header(
            MOCK_WEBHOOK_SECRET,
            chrono::Utc::now().timestamp(),
            payload,
        )
    }
}

impl Default for MockPaymentGateway {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BasePaymentGateway for MockPaymentGateway {
    async fn create_checkout_session(&self, request: &CheckoutRequest) -> Result<GatewaySession> {
        self.create_calls.lock().unwrap().push(request.clone());

        if self.fail_create.load(Ordering::SeqCst) {
            return Err(anyhow!("Mock gateway unavailable"));
        }

        let n = self.counter.fetch_add(1, Ordering::SeqCst) + 1;
        let id = format!("cs_mock_{}", n);
        let session = GatewaySession {
            id: id.clone(),
            url: Some(format!("https://checkout.mock/{}", id)),
            paid: false,
            expired: false,
            payment_intent: None,
            order_reference: Some(request.order_id.to_string()),
        };

        self.sessions.lock().unwrap().insert(id, session.clone());
        Ok(session)
    }

    async fn retrieve_checkout_session(&self, session_id: &str) -> Result<GatewaySession> {
        self.sessions
            .lock()
            .unwrap()
            .get(session_id)
            .cloned()
            .ok_or_else(|| anyhow!("No such checkout session: {}", session_id))
    }

    fn construct_event(
        &self,
        payload: &str,
        signature_header: &str,
    ) -> std::result::Result<GatewayEvent, WebhookVerificationError> {
        let now = chrono::Utc::now().timestamp();
        stripe::webhook::construct_event(payload, signature_header, MOCK_WEBHOOK_SECRET, now)
            .map(gateway_event_from_stripe)
            .map_err(|e| WebhookVerificationError(e.to_string()))
    }
}
