use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use crate::config::{join_url, SiteConfig};
use crate::domains::jobs::models::FeedJob;

/// Feed-level metadata shared by every output format
#[derive(Debug, Clone)]
pub struct FeedChannel {
    pub title: String,
    pub site_url: String,
    pub description: String,
}

impl FeedChannel {
    pub fn from_site(site: &SiteConfig) -> Self {
        Self {
            title: site.name.clone(),
            site_url: site.url.trim_end_matches('/').to_string(),
            description: site.description.clone(),
        }
    }

    /// Absolute URL of a path on the site
    pub fn link(&self, path: &str) -> String {
        join_url(&self.site_url, path)
    }

    /// Public page of one listing
    pub fn job_url(&self, job: &FeedJob) -> String {
        self.link(&format!("jobs/{}", job.slug))
    }
}

/// Newest `created_at` among the listings, for last-build timestamps
pub(crate) fn newest(jobs: &[FeedJob]) -> Option<DateTime<Utc>> {
    jobs.iter().map(|j| j.created_at).max()
}

/// Decimal without trailing zeros (`120000.00` → `120000`)
pub(crate) fn plain_amount(amount: Decimal) -> String {
    amount.normalize().to_string()
}
