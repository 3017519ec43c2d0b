use axum::routing::get;
use axum::{Json, Router};
use serde::Serialize;
use uuid::Uuid;

use super::AccountKind;
use crate::server::app::AppState;
use crate::server::middleware::AuthUser;

#[derive(Debug, Serialize)]
pub struct CurrentAccount {
    pub account_id: Uuid,
    pub account_kind: AccountKind,
    pub email: String,
}

pub fn router() -> Router<AppState> {
    Router::new().route("/api/auth/me", get(me))
}

/// The principal decoded from the bearer token; 401 without one
async fn me(user: AuthUser) -> Json<CurrentAccount> {
    Json(CurrentAccount {
        account_id: user.account_id,
        account_kind: user.account_kind,
        email: user.email,
    })
}
