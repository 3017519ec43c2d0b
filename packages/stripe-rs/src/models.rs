use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Parameters for a single-item hosted checkout session
#[derive(Debug, Clone)]
pub struct CreateCheckoutSession {
    /// Amount in the currency's minor unit (cents)
    pub unit_amount: i64,
    pub currency: String,
    pub product_name: String,
    pub success_url: String,
    pub cancel_url: String,
    pub client_reference_id: Option<String>,
    pub customer_email: Option<String>,
    pub metadata: Vec<(String, String)>,
}

impl CreateCheckoutSession {
    /// Flatten into the bracketed form encoding the Checkout API expects
    pub fn to_form(&self) -> Vec<(String, String)> {
        let mut form = vec![
            ("mode".to_string(), "payment".to_string()),
            ("success_url".to_string(), self.success_url.clone()),
            ("cancel_url".to_string(), self.cancel_url.clone()),
            ("line_items[0][quantity]".to_string(), "1".to_string()),
            (
                "line_items[0][price_data][currency]".to_string(),
                self.currency.to_lowercase(),
            ),
            (
                "line_items[0][price_data][unit_amount]".to_string(),
                self.unit_amount.to_string(),
            ),
            (
                "line_items[0][price_data][product_data][name]".to_string(),
                self.product_name.clone(),
            ),
        ];

        if let Some(reference) = &self.client_reference_id {
            form.push(("client_reference_id".to_string(), reference.clone()));
        }
        if let Some(email) = &self.customer_email {
            form.push(("customer_email".to_string(), email.clone()));
        }
        for (key, value) in &self.metadata {
            form.push((format!("metadata[{}]", key), value.clone()));
        }

        form
    }
}

/// Hosted checkout session as returned by the gateway
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CheckoutSession {
    pub id: String,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    pub payment_status: String,
    #[serde(default)]
    pub payment_intent: Option<String>,
    #[serde(default)]
    pub client_reference_id: Option<String>,
    #[serde(default)]
    pub amount_total: Option<i64>,
    #[serde(default)]
    pub currency: Option<String>,
    #[serde(default)]
    pub metadata: HashMap<String, String>,
}

impl CheckoutSession {
    pub fn is_paid(&self) -> bool {
        self.payment_status == "paid" || self.payment_status == "no_payment_required"
    }

    pub fn is_expired(&self) -> bool {
        self.status.as_deref() == Some("expired")
    }
}

/// Webhook event envelope
#[derive(Debug, Clone, Deserialize)]
pub struct Event {
    pub id: String,
    #[serde(rename = "type")]
    pub event_type: String,
    #[serde(default)]
    pub created: i64,
    pub data: EventData,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EventData {
    pub object: serde_json::Value,
}

impl Event {
    /// Interpret the event payload as a checkout session
    pub fn checkout_session(&self) -> Result<CheckoutSession, serde_json::Error> {
        serde_json::from_value(self.data.object.clone())
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct ApiErrorBody {
    pub error: ApiErrorDetail,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ApiErrorDetail {
    #[serde(default)]
    pub message: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_form_encoding_includes_line_item_and_metadata() {
        let params = CreateCheckoutSession {
            unit_amount: 4900,
            currency: "USD".to_string(),
            product_name: "Featured listing".to_string(),
            success_url: "https://jobs.example/success".to_string(),
            cancel_url: "https://jobs.example/cancel".to_string(),
            client_reference_id: Some("order-1".to_string()),
            customer_email: None,
            metadata: vec![("order_id".to_string(), "order-1".to_string())],
        };

        let form = params.to_form();
        let get = |key: &str| {
            form.iter()
                .find(|(k, _)| k == key)
                .map(|(_, v)| v.as_str())
        };

        assert_eq!(get("mode"), Some("payment"));
        assert_eq!(get("line_items[0][price_data][currency]"), Some("usd"));
        assert_eq!(get("line_items[0][price_data][unit_amount]"), Some("4900"));
        assert_eq!(get("metadata[order_id]"), Some("order-1"));
        assert_eq!(get("client_reference_id"), Some("order-1"));
        assert_eq!(get("customer_email"), None);
    }

    #[test]
    fn test_event_checkout_session_payload() {
        let event: Event = serde_json::from_str(
            r#"{
                "id": "evt_1",
                "type": "checkout.session.completed",
                "created": 1700000000,
                "data": {"object": {
                    "id": "cs_test_1",
                    "payment_status": "paid",
                    "status": "complete",
                    "payment_intent": "pi_1",
                    "metadata": {"order_id": "abc"}
                }}
            }"#,
        )
        .unwrap();

        let session = event.checkout_session().unwrap();
        assert_eq!(event.event_type, "checkout.session.completed");
        assert_eq!(session.id, "cs_test_1");
        assert!(session.is_paid());
        assert!(!session.is_expired());
        assert_eq!(session.metadata.get("order_id").map(String::as_str), Some("abc"));
    }
}
