//! Commerce actions - entry-point business logic for orders
//!
//! Called from the route handlers and the gateway webhook. Actions take
//! `ServerDeps` so tests can swap in the mock payment gateway.

pub mod checkout;
pub mod fulfil;
pub mod reconcile;

pub use checkout::{checkout, CheckoutInput, CheckoutResult};
pub use fulfil::fulfil_order;
pub use reconcile::{cancel_order, confirm_manual_payment, handle_gateway_event, verify_order};

use thiserror::Error;

use crate::server::error::ApiError;

#[derive(Debug, Error)]
pub enum CommerceError {
    #[error("{0}")]
    Invalid(String),

    #[error("{0} not found")]
    NotFound(&'static str),

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl CommerceError {
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::Invalid(message.into())
    }
}

impl From<sqlx::Error> for CommerceError {
    fn from(err: sqlx::Error) -> Self {
        Self::Internal(err.into())
    }
}

impl From<CommerceError> for ApiError {
    fn from(err: CommerceError) -> Self {
        match err {
            CommerceError::Invalid(message) => ApiError::Validation(message),
            CommerceError::NotFound(what) => ApiError::not_found(what),
            CommerceError::Internal(err) => ApiError::from(err),
        }
    }
}
