//! Commerce routes: products, payment methods, discounts, orders and the
//! payment gateway webhook

use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{info, warn};

use super::actions::{self, CheckoutInput, CheckoutResult};
use super::models::{
    Discount, DiscountInput, NotRedeemable, Order, OrderFilters, PaymentMethod,
    PaymentMethodInput, Product, ProductInput, ORDER_STATUSES,
};
use crate::common::{
    DiscountId, EmployerId, OrderId, Page, PaginationArgs, PaymentMethodId, ProductId,
};
use crate::server::app::AppState;
use crate::server::error::ApiError;
use crate::server::extract::{JsonBody, QueryParams};

/// Header carrying the gateway's `t=…,v1=…` webhook signature
pub const SIGNATURE_HEADER: &str = "stripe-signature";

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/products", get(list_products).post(create_product))
        .route(
            "/api/products/:id",
            get(get_product).put(update_product).delete(delete_product),
        )
        .route(
            "/api/payment-methods",
            get(list_payment_methods).post(create_payment_method),
        )
        .route(
            "/api/payment-methods/:id",
            get(get_payment_method)
                .put(update_payment_method)
                .delete(delete_payment_method),
        )
        .route("/api/discounts", get(list_discounts).post(create_discount))
        .route("/api/discounts/validate/:code", get(validate_discount))
        .route(
            "/api/discounts/:id",
            get(get_discount).put(update_discount).delete(delete_discount),
        )
        .route("/api/orders", get(list_orders))
        .route("/api/orders/checkout", post(checkout))
        .route("/api/orders/:id", get(get_order))
        .route("/api/orders/:id/verify", post(verify_order))
        .route("/api/orders/:id/cancel", post(cancel_order))
        .route("/api/orders/:id/confirm", post(confirm_order))
        .route("/api/webhooks/payments", post(payment_webhook))
}

#[derive(Debug, Default, Deserialize)]
struct ActiveQuery {
    active_only: Option<bool>,
}

// =============================================================================
// Products
// =============================================================================

async fn list_products(
    State(state): State<AppState>,
    QueryParams(query): QueryParams<ActiveQuery>,
) -> Result<Json<Vec<Product>>, ApiError> {
    let products = Product::find_all(query.active_only.unwrap_or(false), state.db()).await?;
    Ok(Json(products))
}

async fn get_product(
    State(state): State<AppState>,
    Path(id): Path<ProductId>,
) -> Result<Json<Product>, ApiError> {
    Product::find_by_id(id, state.db())
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found("Product"))
}

async fn create_product(
    State(state): State<AppState>,
    JsonBody(input): JsonBody<ProductInput>,
) -> Result<(StatusCode, Json<Product>), ApiError> {
    input.validate().map_err(ApiError::Validation)?;
    let product = Product::create(&input, state.db()).await?;
    Ok((StatusCode::CREATED, Json(product)))
}

async fn update_product(
    State(state): State<AppState>,
    Path(id): Path<ProductId>,
    JsonBody(input): JsonBody<ProductInput>,
) -> Result<Json<Product>, ApiError> {
    input.validate().map_err(ApiError::Validation)?;
    Product::update(id, &input, state.db())
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found("Product"))
}

async fn delete_product(
    State(state): State<AppState>,
    Path(id): Path<ProductId>,
) -> Result<StatusCode, ApiError> {
    if Product::delete(id, state.db()).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::not_found("Product"))
    }
}

// =============================================================================
// Payment methods
// =============================================================================

async fn list_payment_methods(
    State(state): State<AppState>,
    QueryParams(query): QueryParams<ActiveQuery>,
) -> Result<Json<Vec<PaymentMethod>>, ApiError> {
    let methods = PaymentMethod::find_all(query.active_only.unwrap_or(false), state.db()).await?;
    Ok(Json(methods))
}

async fn get_payment_method(
    State(state): State<AppState>,
    Path(id): Path<PaymentMethodId>,
) -> Result<Json<PaymentMethod>, ApiError> {
    PaymentMethod::find_by_id(id, state.db())
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found("Payment method"))
}

async fn create_payment_method(
    State(state): State<AppState>,
    JsonBody(input): JsonBody<PaymentMethodInput>,
) -> Result<(StatusCode, Json<PaymentMethod>), ApiError> {
    input.validate().map_err(ApiError::Validation)?;
    let method = PaymentMethod::create(&input, state.db()).await?;
    Ok((StatusCode::CREATED, Json(method)))
}

async fn update_payment_method(
    State(state): State<AppState>,
    Path(id): Path<PaymentMethodId>,
    JsonBody(input): JsonBody<PaymentMethodInput>,
) -> Result<Json<PaymentMethod>, ApiError> {
    input.validate().map_err(ApiError::Validation)?;
    PaymentMethod::update(id, &input, state.db())
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found("Payment method"))
}

async fn delete_payment_method(
    State(state): State<AppState>,
    Path(id): Path<PaymentMethodId>,
) -> Result<StatusCode, ApiError> {
    if PaymentMethod::delete(id, state.db()).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::not_found("Payment method"))
    }
}

// =============================================================================
// Discounts
// =============================================================================

async fn list_discounts(State(state): State<AppState>) -> Result<Json<Vec<Discount>>, ApiError> {
    Ok(Json(Discount::find_all(state.db()).await?))
}

async fn get_discount(
    State(state): State<AppState>,
    Path(id): Path<DiscountId>,
) -> Result<Json<Discount>, ApiError> {
    Discount::find_by_id(id, state.db())
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found("Discount"))
}

async fn create_discount(
    State(state): State<AppState>,
    JsonBody(input): JsonBody<DiscountInput>,
) -> Result<(StatusCode, Json<Discount>), ApiError> {
    input.validate().map_err(ApiError::Validation)?;
    let discount = Discount::create(&input, state.db()).await?;
    Ok((StatusCode::CREATED, Json(discount)))
}

async fn update_discount(
    State(state): State<AppState>,
    Path(id): Path<DiscountId>,
    JsonBody(input): JsonBody<DiscountInput>,
) -> Result<Json<Discount>, ApiError> {
    input.validate().map_err(ApiError::Validation)?;
    Discount::update(id, &input, state.db())
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found("Discount"))
}

async fn delete_discount(
    State(state): State<AppState>,
    Path(id): Path<DiscountId>,
) -> Result<StatusCode, ApiError> {
    if Discount::delete(id, state.db()).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::not_found("Discount"))
    }
}

#[derive(Debug, Serialize)]
struct DiscountValidation {
    discount: Discount,
    redeemable: bool,
    reason: Option<NotRedeemable>,
    message: Option<String>,
}

async fn validate_discount(
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> Result<Json<DiscountValidation>, ApiError> {
    let discount = Discount::find_by_code(&code, state.db())
        .await?
        .ok_or_else(|| ApiError::not_found("Discount"))?;

    let reason = discount.check_redeemable(chrono::Utc::now()).err();
    Ok(Json(DiscountValidation {
        redeemable: reason.is_none(),
        message: reason.map(|r| r.to_string()),
        reason,
        discount,
    }))
}

// =============================================================================
// Orders
// =============================================================================

#[derive(Debug, Default, Deserialize)]
struct OrderQuery {
    employer_id: Option<EmployerId>,
    status: Option<String>,
    page: Option<i64>,
    per_page: Option<i64>,
}

async fn list_orders(
    State(state): State<AppState>,
    QueryParams(query): QueryParams<OrderQuery>,
) -> Result<Json<Page<Order>>, ApiError> {
    if let Some(status) = &query.status {
        if !ORDER_STATUSES.contains(&status.as_str()) {
            return Err(ApiError::validation(format!(
                "status must be one of: {}",
                ORDER_STATUSES.join(", ")
            )));
        }
    }

    let filters = OrderFilters {
        employer_id: query.employer_id,
        status: query.status,
    };
    let page = PaginationArgs {
        page: query.page,
        per_page: query.per_page,
    }
    .validate();

    let (orders, total) = Order::find_all(&filters, &page, state.db()).await?;
    Ok(Json(Page::new(orders, total, &page)))
}

async fn get_order(
    State(state): State<AppState>,
    Path(id): Path<OrderId>,
) -> Result<Json<Order>, ApiError> {
    Order::find_by_id(id, state.db())
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found("Order"))
}

async fn checkout(
    State(state): State<AppState>,
    JsonBody(input): JsonBody<CheckoutInput>,
) -> Result<(StatusCode, Json<CheckoutResult>), ApiError> {
    let result = actions::checkout(&input, &state.deps).await?;
    Ok((StatusCode::CREATED, Json(result)))
}

async fn verify_order(
    State(state): State<AppState>,
    Path(id): Path<OrderId>,
) -> Result<Json<Order>, ApiError> {
    Ok(Json(actions::verify_order(id, &state.deps).await?))
}

async fn cancel_order(
    State(state): State<AppState>,
    Path(id): Path<OrderId>,
) -> Result<Json<Order>, ApiError> {
    Ok(Json(actions::cancel_order(id, &state.deps).await?))
}

async fn confirm_order(
    State(state): State<AppState>,
    Path(id): Path<OrderId>,
) -> Result<Json<Order>, ApiError> {
    Ok(Json(actions::confirm_manual_payment(id, &state.deps).await?))
}

// =============================================================================
// Gateway webhook
// =============================================================================

/// Gateway event delivery; a bad signature is 400, ignored events are 200
async fn payment_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: String,
) -> Result<Json<serde_json::Value>, ApiError> {
    let signature = headers
        .get(SIGNATURE_HEADER)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| ApiError::validation("Missing webhook signature"))?;

    let event = state
        .deps
        .payments
        .construct_event(&body, signature)
        .map_err(|e| {
            warn!(error = %e, "Rejected webhook delivery");
            ApiError::validation("Invalid webhook signature")
        })?;

    info!(event_id = %event.id, kind = ?event.kind, "Webhook received");
    actions::handle_gateway_event(&event, &state.deps).await?;

    Ok(Json(json!({ "received": true })))
}
