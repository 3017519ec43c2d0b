use anyhow::{bail, Context, Result};
use dotenvy::dotenv;
use std::env;

/// Public-facing site identity, used for links and feed channel metadata
#[derive(Debug, Clone)]
pub struct SiteConfig {
    pub name: String,
    pub url: String,
    pub description: String,
}

impl SiteConfig {
    /// Absolute URL for a path on the public site
    pub fn link(&self, path: &str) -> String {
        join_url(&self.url, path)
    }
}

/// Join a base URL and a path with exactly one slash between them
pub fn join_url(base: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

/// Application configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub port: u16,
    /// `APP_ENV=development` exposes error details in 500 responses
    pub expose_error_details: bool,
    pub jwt_secret: String,
    pub jwt_issuer: String,
    pub site: SiteConfig,
    pub feed_limit: i64,
    pub stripe_secret_key: String,
    pub stripe_webhook_secret: String,
    pub stripe_api_base: String,
    pub allowed_origins: Vec<String>,
    pub rate_limit_enabled: bool,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        // Load .env file if present (development)
        let _ = dotenv();

        let app_env = env::var("APP_ENV").unwrap_or_else(|_| "production".to_string());

        Ok(Self {
            database_url: env::var("DATABASE_URL").context("DATABASE_URL must be set")?,
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .context("PORT must be a valid number")?,
            expose_error_details: app_env.eq_ignore_ascii_case("development"),
            jwt_secret: env::var("JWT_SECRET").context("JWT_SECRET must be set")?,
            jwt_issuer: env::var("JWT_ISSUER").unwrap_or_else(|_| "jobboard".to_string()),
            site: SiteConfig {
                name: env::var("SITE_NAME").unwrap_or_else(|_| "Job Board".to_string()),
                url: env::var("SITE_URL")
                    .unwrap_or_else(|_| "http://localhost:8080".to_string()),
                description: env::var("SITE_DESCRIPTION")
                    .unwrap_or_else(|_| "Latest job listings".to_string()),
            },
            feed_limit: parse_feed_limit(env::var("FEED_LIMIT").ok().as_deref())?,
            stripe_secret_key: env::var("STRIPE_SECRET_KEY")
                .context("STRIPE_SECRET_KEY must be set")?,
            stripe_webhook_secret: env::var("STRIPE_WEBHOOK_SECRET")
                .context("STRIPE_WEBHOOK_SECRET must be set")?,
            stripe_api_base: env::var("STRIPE_API_BASE")
                .unwrap_or_else(|_| stripe::DEFAULT_API_BASE.to_string()),
            allowed_origins: env::var("ALLOWED_ORIGINS")
                .unwrap_or_default()
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect(),
            rate_limit_enabled: env::var("RATE_LIMIT_ENABLED")
                .unwrap_or_else(|_| "true".to_string())
                .parse::<bool>()
                .unwrap_or(true),
        })
    }
}

/// `FEED_LIMIT` ends up in a SQL `LIMIT`, so only positive values are accepted
fn parse_feed_limit(raw: Option<&str>) -> Result<i64> {
    let limit: i64 = raw
        .unwrap_or("100")
        .trim()
        .parse()
        .context("FEED_LIMIT must be a valid number")?;
    if limit <= 0 {
        bail!("FEED_LIMIT must be greater than zero, got {}", limit);
    }
    Ok(limit)
}
