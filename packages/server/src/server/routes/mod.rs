// Cross-domain HTTP routes; domain routes live in domains/*/routes.rs
pub mod health;

pub use health::*;
