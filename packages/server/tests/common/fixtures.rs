//! Test fixtures for creating test data.
//!
//! These fixtures use the model methods directly. The database is shared
//! between tests, so every fixture gets a unique email, slug or code.

use anyhow::Result;
use rust_decimal::Decimal;
use serde_json::Map;
use server_core::common::EmployerId;
use server_core::domains::accounts::{Employer, RegisterEmployerInput};
use server_core::domains::auth::hash_password;
use server_core::domains::commerce::{
    Discount, DiscountInput, PaymentMethod, PaymentMethodInput, Product, ProductInput,
};
use server_core::domains::jobs::{CreateJobInput, Job};
use sqlx::PgPool;
use uuid::Uuid;

pub const TEST_PASSWORD: &str = "correct horse battery";

/// Short random suffix for names that must be unique
pub fn unique(prefix: &str) -> String {
    format!("{}-{}", prefix, &Uuid::new_v4().simple().to_string()[..10])
}

pub async fn create_employer(pool: &PgPool) -> Result<Employer> {
    let name = unique("Acme");
    let input = RegisterEmployerInput {
        email: format!("{}@example.com", name.to_lowercase()),
        password: TEST_PASSWORD.to_string(),
        company_name: name,
        company_slug: None,
        website: Some("https://acme.example".to_string()),
        logo_url: None,
        description: None,
        location: Some("Berlin".to_string()),
        phone: None,
    };
    Employer::create(&input, &hash_password(TEST_PASSWORD)?, pool).await
}

pub fn job_input(employer_id: EmployerId, title: &str, status: &str) -> CreateJobInput {
    CreateJobInput {
        employer_id,
        category_id: None,
        job_type_id: None,
        title: title.to_string(),
        description: format!("{} wanted", title),
        location: Some("Berlin".to_string()),
        remote: false,
        salary_min: Some(Decimal::new(80_000, 0)),
        salary_max: Some(Decimal::new(100_000, 0)),
        salary_currency: "EUR".to_string(),
        salary_period: "year".to_string(),
        apply_url: Some("https://acme.example/apply".to_string()),
        apply_email: None,
        status: status.to_string(),
        featured: false,
        expires_at: None,
        custom_fields: Map::new(),
    }
}

pub async fn create_job(pool: &PgPool, employer_id: EmployerId, status: &str) -> Result<Job> {
    Job::create(&job_input(employer_id, &unique("Rust Engineer"), status), pool).await
}

pub async fn create_product(pool: &PgPool, price: Decimal, featured: bool) -> Result<Product> {
    let input = ProductInput {
        name: unique("Listing"),
        description: None,
        price,
        currency: "USD".to_string(),
        duration_days: 30,
        featured,
        active: true,
    };
    Product::create(&input, pool).await
}

pub async fn create_payment_method(pool: &PgPool, provider: &str) -> Result<PaymentMethod> {
    let input = PaymentMethodInput {
        name: unique(provider),
        slug: None,
        provider: provider.to_string(),
        description: None,
        active: true,
    };
    PaymentMethod::create(&input, pool).await
}

pub async fn create_discount(
    pool: &PgPool,
    discount_type: &str,
    amount: Decimal,
    max_uses: Option<i32>,
) -> Result<Discount> {
    let input = DiscountInput {
        code: unique("SAVE").replace('-', "").to_uppercase(),
        description: None,
        discount_type: discount_type.to_string(),
        amount,
        max_uses,
        starts_at: None,
        expires_at: None,
        active: true,
    };
    Discount::create(&input, pool).await
}
