//! Default catalog rows for a fresh database.
//!
//! Rows are matched by slug (or product name) before inserting, so running
//! the seed again only fills in whatever is missing.

use anyhow::Result;
use rust_decimal::Decimal;
use sqlx::PgPool;

use crate::common::utils::slugify;
use crate::domains::commerce::{PaymentMethod, PaymentMethodInput, Product, ProductInput};
use crate::domains::taxonomy::{Category, CategoryInput, JobType, JobTypeInput};

pub const DEFAULT_CATEGORIES: &[&str] = &[
    "Engineering",
    "Design",
    "Product",
    "Marketing",
    "Sales",
    "Customer Support",
    "Operations",
];

pub const DEFAULT_JOB_TYPES: &[&str] = &["Full Time", "Part Time", "Contract", "Internship", "Temporary"];

// (name, provider, description)
const DEFAULT_PAYMENT_METHODS: &[(&str, &str, &str)] = &[
    ("Card", "stripe", "Pay online by card"),
    ("Invoice", "manual", "Pay by bank transfer after invoicing"),
];

// (name, price in cents, duration days, featured)
const DEFAULT_PRODUCTS: &[(&str, i64, i32, bool)] = &[
    ("Standard Listing", 9900, 30, false),
    ("Featured Listing", 19900, 30, true),
];

/// Insert missing defaults; returns how many rows were created
pub async fn seed_defaults(pool: &PgPool) -> Result<u64> {
    let mut created = 0u64;

    for name in DEFAULT_CATEGORIES {
        if Category::find_by_slug(&slugify(name), pool).await?.is_none() {
            Category::create(
                &CategoryInput {
                    name: name.to_string(),
                    slug: None,
                    description: None,
                },
                pool,
            )
            .await?;
            created += 1;
        }
    }

    let job_types = JobType::find_all(pool).await?;
    for name in DEFAULT_JOB_TYPES {
        let slug = slugify(name);
        if !job_types.iter().any(|t| t.slug == slug) {
            JobType::create(
                &JobTypeInput {
                    name: name.to_string(),
                    slug: None,
                },
                pool,
            )
            .await?;
            created += 1;
        }
    }

    let methods = PaymentMethod::find_all(false, pool).await?;
    for (name, provider, description) in DEFAULT_PAYMENT_METHODS {
        if !methods.iter().any(|m| m.slug == slugify(name)) {
            PaymentMethod::create(
                &PaymentMethodInput {
                    name: name.to_string(),
                    slug: None,
                    provider: provider.to_string(),
                    description: Some(description.to_string()),
                    active: true,
                },
                pool,
            )
            .await?;
            created += 1;
        }
    }

    let products = Product::find_all(false, pool).await?;
    for &(name, price_cents, duration_days, featured) in DEFAULT_PRODUCTS {
        if !products.iter().any(|p| p.name == name) {
            Product::create(
                &ProductInput {
                    name: name.to_string(),
                    description: None,
                    price: Decimal::new(price_cents, 2),
                    currency: "USD".to_string(),
                    duration_days,
                    featured,
                    active: true,
                },
                pool,
            )
            .await?;
            created += 1;
        }
    }

    tracing::info!(created, "Seed complete");
    Ok(created)
}
