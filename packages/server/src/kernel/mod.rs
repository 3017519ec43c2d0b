//! Kernel module - server infrastructure and dependencies.

pub mod deps;
pub mod test_dependencies;
pub mod traits;

pub use deps::{ServerDeps, StripeAdapter};
pub use test_dependencies::MockPaymentGateway;
pub use traits::*;
