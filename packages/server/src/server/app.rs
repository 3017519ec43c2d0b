//! Application setup and server configuration.

use std::sync::Arc;

use axum::{
    http::{
        header::{AUTHORIZATION, CONTENT_TYPE},
        HeaderValue, Method,
    },
    middleware,
    routing::get,
    Router,
};
use sqlx::PgPool;
use tower_governor::{
    governor::GovernorConfigBuilder, key_extractor::SmartIpKeyExtractor, GovernorLayer,
};
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::domains::{accounts, auth, commerce, feeds, jobs, taxonomy};
use crate::kernel::ServerDeps;
use crate::server::error::attach_error_detail;
use crate::server::middleware::jwt_auth_middleware;
use crate::server::routes::health_handler;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub deps: Arc<ServerDeps>,
}

impl AppState {
    pub fn new(deps: ServerDeps) -> Self {
        Self {
            deps: Arc::new(deps),
        }
    }

    pub fn db(&self) -> &PgPool {
        &self.deps.db_pool
    }
}

/// HTTP-layer settings that do not belong in `ServerDeps`
#[derive(Debug, Clone, Default)]
pub struct AppOptions {
    /// Empty means any origin
    pub allowed_origins: Vec<String>,
    pub rate_limit_enabled: bool,
    pub expose_error_details: bool,
}

fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    let allow_origin = if origins.is_empty() {
        AllowOrigin::any()
    } else {
        AllowOrigin::list(origins)
    };

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
        ])
        .allow_headers([AUTHORIZATION, CONTENT_TYPE])
}

/// Build the Axum application router
pub fn build_app(deps: ServerDeps, options: &AppOptions) -> Router {
    let jwt_service = deps.jwt_service.clone();
    let state = AppState::new(deps);

    let router = Router::new()
        .route("/health", get(health_handler))
        .merge(taxonomy::routes::router())
        .merge(accounts::routes::router())
        .merge(auth::routes::router())
        .merge(jobs::routes::router())
        .merge(feeds::routes::router())
        .merge(commerce::routes::router())
        .with_state(state)
        // Middleware layers (applied in reverse order - last added runs first)
        .layer(middleware::from_fn(move |req, next| {
            jwt_auth_middleware(jwt_service.clone(), req, next)
        }));

    // 10 requests per second per client IP, bursts up to 30
    let router = if options.rate_limit_enabled {
        let governor = GovernorConfigBuilder::default()
            .key_extractor(SmartIpKeyExtractor)
            .per_second(10)
            .burst_size(30)
            .use_headers()
            .finish();
        match governor {
            Some(config) => router.layer(GovernorLayer {
                config: Arc::new(config),
            }),
            None => {
                tracing::warn!("Invalid rate limit configuration, rate limiting disabled");
                router
            }
        }
    } else {
        router
    };

    let router = if options.expose_error_details {
        router.layer(middleware::map_response(attach_error_detail))
    } else {
        router
    };

    router
        .layer(cors_layer(&options.allowed_origins))
        .layer(TraceLayer::new_for_http())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cors_layer_accepts_valid_and_skips_invalid_origins() {
        let _: CorsLayer = cors_layer(&[
            "https://jobs.example".to_string(),
            "bad\norigin".to_string(),
        ]);
        let _: CorsLayer = cors_layer(&[]);
    }
}
