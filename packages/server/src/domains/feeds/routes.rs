use axum::extract::State;
use axum::http::header;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::Router;

use super::{render_json_ld, render_rss, render_xml, FeedChannel};
use crate::domains::jobs::models::FeedJob;
use crate::server::app::AppState;
use crate::server::error::ApiError;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/feeds/jobs.rss", get(rss_feed))
        .route("/feeds/jobs.xml", get(xml_feed))
        .route("/feeds/jobs.json", get(json_ld_feed))
}

async fn load(state: &AppState) -> Result<(FeedChannel, Vec<FeedJob>), ApiError> {
    let jobs = FeedJob::find_active_for_feed(state.deps.feed_limit, state.db()).await?;
    Ok((FeedChannel::from_site(&state.deps.site), jobs))
}

async fn rss_feed(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let (channel, jobs) = load(&state).await?;
    Ok((
        [(header::CONTENT_TYPE, "application/rss+xml; charset=utf-8")],
        render_rss(&channel, &jobs),
    ))
}

async fn xml_feed(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let (channel, jobs) = load(&state).await?;
    Ok((
        [(header::CONTENT_TYPE, "application/xml; charset=utf-8")],
        render_xml(&channel, &jobs),
    ))
}

async fn json_ld_feed(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let (channel, jobs) = load(&state).await?;
    Ok((
        [(header::CONTENT_TYPE, "application/ld+json")],
        render_json_ld(&channel, &jobs).to_string(),
    ))
}
