// Minimal client for the Stripe Checkout API: hosted checkout sessions and
// webhook signature verification.

pub mod error;
pub mod models;
pub mod webhook;

use reqwest::Client;

pub use crate::error::StripeError;
pub use crate::models::{CheckoutSession, CreateCheckoutSession, Event};
use crate::models::ApiErrorBody;

pub const DEFAULT_API_BASE: &str = "https://api.stripe.com";

#[derive(Debug, Clone)]
pub struct StripeOptions {
    pub secret_key: String,
    pub webhook_secret: String,
    pub api_base: String,
}

impl StripeOptions {
    pub fn new(secret_key: impl Into<String>, webhook_secret: impl Into<String>) -> Self {
        Self {
            secret_key: secret_key.into(),
            webhook_secret: webhook_secret.into(),
            api_base: DEFAULT_API_BASE.to_string(),
        }
    }

    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into();
        self
    }
}

#[derive(Debug, Clone)]
pub struct StripeService {
    options: StripeOptions,
    client: Client,
}

impl StripeService {
    pub fn new(options: StripeOptions) -> Self {
        Self {
            options,
            client: Client::new(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.options.api_base.trim_end_matches('/'), path)
    }

    async fn parse_response<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, StripeError> {
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            let message = serde_json::from_str::<ApiErrorBody>(&body)
                .ok()
                .and_then(|b| b.error.message)
                .unwrap_or(body);
            tracing::warn!(status = status.as_u16(), message = %message, "Payment gateway error");
            return Err(StripeError::Api {
                status: status.as_u16(),
                message,
            });
        }

        Ok(serde_json::from_str(&body)?)
    }

    pub async fn create_checkout_session(
        &self,
        params: &CreateCheckoutSession,
    ) -> Result<CheckoutSession, StripeError> {
        let response = self
            .client
            .post(self.url("/v1/checkout/sessions"))
            .basic_auth(&self.options.secret_key, None::<&str>)
            .form(&params.to_form())
            .send()
            .await?;

        Self::parse_response(response).await
    }

    pub async fn retrieve_checkout_session(
        &self,
        session_id: &str,
    ) -> Result<CheckoutSession, StripeError> {
        let response = self
            .client
            .get(self.url(&format!("/v1/checkout/sessions/{}", session_id)))
            .basic_auth(&self.options.secret_key, None::<&str>)
            .send()
            .await?;

        Self::parse_response(response).await
    }

    /// Verify a webhook delivery with the configured signing secret
    pub fn construct_event(
        &self,
        payload: &str,
        signature_header: &str,
        now: i64,
    ) -> Result<Event, StripeError> {
        webhook::construct_event(payload, signature_header, &self.options.webhook_secret, now)
    }
}
