//! Jobs domain - the listing store

pub mod models;
pub mod routes;

pub use models::*;
