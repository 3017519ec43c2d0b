//! Auth domain - password credentials and bearer tokens
//!
//! Responsibilities:
//! - Argon2id password hashing for employers and job seekers
//! - JWT issuance on login and verification in the request middleware
//! - `GET /api/auth/me` for the current principal

pub mod jwt;
pub mod password;
pub mod routes;
pub mod types;

pub use jwt::{Claims, JwtService};
pub use password::{
    hash_password, hash_password_blocking, verify_password, verify_password_blocking,
};
pub use types::{AccountKind, LoginInput, LoginResponse};
