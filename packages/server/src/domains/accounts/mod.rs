//! Accounts domain - employers, job seekers and resumes

pub mod models;
pub mod routes;

pub use models::*;
