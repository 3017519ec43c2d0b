//! Commerce domain - catalog for sale, orders and payment reconciliation
//!
//! Flow: checkout creates a pending order and a hosted gateway session;
//! the webhook or a verify poll fulfils it (`pending → paid`) exactly once.

pub mod actions;
pub mod models;
pub mod pricing;
pub mod routes;

pub use models::*;
