//! Feeds domain - syndication documents built from active listings
//!
//! Renderers are pure functions of a [`FeedChannel`] and the listings;
//! routes load the listings and pick the content type.

pub mod channel;
pub mod escape;
pub mod json_ld;
pub mod routes;
pub mod rss;
pub mod xml;

pub use channel::FeedChannel;
pub use escape::escape_xml;
pub use json_ld::{job_posting, render_job_posting, render_json_ld};
pub use rss::render_rss;
pub use xml::render_xml;
