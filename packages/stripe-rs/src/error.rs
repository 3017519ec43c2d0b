use thiserror::Error;

/// Errors returned by the payment gateway client
#[derive(Error, Debug)]
pub enum StripeError {
    #[error("Request to payment gateway failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Payment gateway returned {status}: {message}")]
    Api { status: u16, message: String },

    #[error("Failed to parse payment gateway payload: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Malformed signature header")]
    MalformedHeader,

    #[error("Webhook signature does not match payload")]
    InvalidSignature,

    #[error("Webhook timestamp outside tolerance")]
    TimestampOutsideTolerance,
}
