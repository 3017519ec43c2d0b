// Business domains
pub mod accounts;
pub mod auth;
pub mod commerce;
pub mod feeds;
pub mod jobs;
pub mod taxonomy;
