// Job Board - API Core
//
// Backend for a job board: employer and job seeker accounts, job listings
// with search, paid postings via hosted checkout, and syndication feeds.
//
// Domains live in domains/*; each owns its models and HTTP routes.

pub mod common;
pub mod config;
pub mod domains;
pub mod kernel;
pub mod seed;
pub mod server;

pub use config::*;
