//! Test harness with testcontainers for integration testing.
//!
//! Uses one shared Postgres container across all tests. The container and
//! migrations are initialized on the first test, then reused. Tests share the
//! database, so fixtures use unique emails and slugs.

use anyhow::{Context, Result};
use axum::Router;
use server_core::config::SiteConfig;
use server_core::domains::auth::JwtService;
use server_core::kernel::{MockPaymentGateway, ServerDeps};
use server_core::server::{build_app, AppOptions};
use sqlx::PgPool;
use std::sync::Arc;
use test_context::AsyncTestContext;
use testcontainers::runners::AsyncRunner;
use testcontainers::{ContainerAsync, ImageExt};
use testcontainers_modules::postgres::Postgres;
use tokio::sync::OnceCell;

use super::ApiClient;

pub const TEST_SITE_URL: &str = "https://jobs.test";

/// Shared test infrastructure that persists across all tests.
struct SharedTestInfra {
    db_url: String,
    // Keep the container alive for the entire test run
    _postgres: ContainerAsync<Postgres>,
}

static SHARED_INFRA: OnceCell<SharedTestInfra> = OnceCell::const_new();

impl SharedTestInfra {
    async fn init() -> Result<Self> {
        // Run tests with: RUST_LOG=debug cargo test -- --nocapture
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();

        let postgres = Postgres::default()
            .with_tag("16")
            .with_cmd(["-c", "max_connections=200"])
            .start()
            .await
            .context("Failed to start Postgres container")?;

        let pg_host = postgres.get_host().await?;
        let pg_port = postgres.get_host_port_ipv4(5432).await?;
        let db_url = format!(
            "postgresql://postgres:postgres@{}:{}/postgres",
            pg_host, pg_port
        );

        let pool = PgPool::connect(&db_url)
            .await
            .context("Failed to connect to Postgres for migrations")?;

        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .context("Failed to run migrations")?;

        Ok(Self {
            db_url,
            _postgres: postgres,
        })
    }

    async fn get() -> &'static Self {
        SHARED_INFRA
            .get_or_init(|| async {
                Self::init()
                    .await
                    .expect("Failed to initialize shared test infrastructure")
            })
            .await
    }
}

/// Per-test context: a fresh pool, a mock gateway, and the full router.
///
/// ```ignore
/// #[test_context(TestHarness)]
/// #[tokio::test]
/// async fn my_test(ctx: &TestHarness) {
///     let res = ctx.api().get("/health").await;
/// }
/// ```
pub struct TestHarness {
    pub db_pool: PgPool,
    pub payments: Arc<MockPaymentGateway>,
    pub jwt_service: Arc<JwtService>,
    app: Router,
}

impl AsyncTestContext for TestHarness {
    async fn setup() -> Self {
        Self::new().await.expect("Failed to create test harness")
    }

    async fn teardown(self) {}
}

impl TestHarness {
    pub async fn new() -> Result<Self> {
        Self::build(MockPaymentGateway::new(), true).await
    }

    /// Harness whose gateway refuses to create checkout sessions
    pub async fn with_failing_gateway() -> Result<Self> {
        Self::build(MockPaymentGateway::failing(), true).await
    }

    /// Failing gateway, with 500 bodies rendered as in production
    pub async fn production_errors() -> Result<Self> {
        Self::build(MockPaymentGateway::failing(), false).await
    }

    async fn build(gateway: MockPaymentGateway, expose_error_details: bool) -> Result<Self> {
        let infra = SharedTestInfra::get().await;

        let db_pool = PgPool::connect(&infra.db_url)
            .await
            .context("Failed to connect to test database")?;

        let payments = Arc::new(gateway);
        let jwt_service = Arc::new(JwtService::new(
            "test_secret_key",
            "test_issuer".to_string(),
        ));

        let deps = ServerDeps::new(
            db_pool.clone(),
            payments.clone(),
            jwt_service.clone(),
            SiteConfig {
                name: "Test Jobs".to_string(),
                url: TEST_SITE_URL.to_string(),
                description: "Jobs for testing".to_string(),
            },
            500,
        );

        let app = build_app(
            deps,
            &AppOptions {
                allowed_origins: Vec::new(),
                rate_limit_enabled: false,
                expose_error_details,
            },
        );

        Ok(Self {
            db_pool,
            payments,
            jwt_service,
            app,
        })
    }

    pub fn api(&self) -> ApiClient {
        ApiClient::new(self.app.clone())
    }
}
