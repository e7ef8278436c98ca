//! Chart-feed routes. Each request reloads the stored records and recomputes
//! the analysis it serves.

use std::sync::Arc;

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use esgsense_analyze::aggregate::*;
use esgsense_analyze::{recommendations, summarize, TOP_THEMES};
use esgsense_core::CleanedRecord;
use esgsense_store::schema::RECORDS_TABLE;
use esgsense_store::TOP_SOURCES_LIMIT;
use serde::Deserialize;

use crate::state::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/summary", get(get_summary))
        .route("/daily", get(get_daily))
        .route("/monthly", get(get_monthly))
        .route("/sources", get(get_sources))
        .route("/themes", get(get_themes))
        .route("/categories", get(get_categories))
        .route("/sentiment-distribution", get(get_sentiment_distribution))
}

pub(crate) type ApiError = (StatusCode, Json<serde_json::Value>);
type ApiResult = Result<Json<serde_json::Value>, ApiError>;

#[derive(Deserialize)]
struct LimitQuery {
    limit: Option<usize>,
}

pub(crate) fn internal_error(e: esgsense_core::Error) -> ApiError {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(serde_json::json!({ "error": e.to_string() })),
    )
}

/// Stored records, or 404 when no run has written the tables yet.
pub(crate) fn stored_records(state: &AppState) -> Result<Vec<CleanedRecord>, ApiError> {
    match state.store.table_exists(RECORDS_TABLE) {
        Ok(true) => state.store.load_records().map_err(internal_error),
        Ok(false) => Err((
            StatusCode::NOT_FOUND,
            Json(serde_json::json!({ "error": "No data stored; run the pipeline first" })),
        )),
        Err(e) => Err(internal_error(e)),
    }
}

/// GET /api/summary: executive summary.
async fn get_summary(State(state): State<Arc<AppState>>) -> ApiResult {
    let records = stored_records(&state)?;
    let daily = daily_aggregates(&records);
    let totals = category_totals(&records);
    let summary = summarize(&records, &daily, &totals);
    Ok(Json(serde_json::json!(summary)))
}

/// GET /api/daily: daily rollup plus 7/30-row rolling averages.
async fn get_daily(State(state): State<Arc<AppState>>) -> ApiResult {
    let records = stored_records(&state)?;
    Ok(Json(serde_json::json!({
        "daily": daily_aggregates(&records),
        "rolling": rolling_averages(&records),
    })))
}

/// GET /api/monthly: monthly trends and volatility.
async fn get_monthly(State(state): State<Arc<AppState>>) -> ApiResult {
    let records = stored_records(&state)?;
    Ok(Json(serde_json::json!({
        "monthly": monthly_trends(&records),
        "volatility": volatility(&records),
    })))
}

/// GET /api/sources?limit=N
async fn get_sources(
    State(state): State<Arc<AppState>>,
    Query(params): Query<LimitQuery>,
) -> ApiResult {
    let records = stored_records(&state)?;
    let all = source_breakdown(&records);
    let total = all.len();
    let sources: Vec<_> = all
        .into_iter()
        .take(params.limit.unwrap_or(TOP_SOURCES_LIMIT))
        .collect();
    Ok(Json(serde_json::json!({
        "sources": sources,
        "total": total,
    })))
}

/// GET /api/themes?limit=N
async fn get_themes(
    State(state): State<Arc<AppState>>,
    Query(params): Query<LimitQuery>,
) -> ApiResult {
    let records = stored_records(&state)?;
    let limit = params.limit.unwrap_or(TOP_THEMES);
    Ok(Json(serde_json::json!({
        "themes": theme_counts(&records, limit),
        "limit": limit,
    })))
}

/// GET /api/categories: ESG theme totals and the advice they trigger.
async fn get_categories(State(state): State<Arc<AppState>>) -> ApiResult {
    let records = stored_records(&state)?;
    let totals = category_totals(&records);
    let ranked: Vec<serde_json::Value> = totals
        .ranked()
        .into_iter()
        .map(|(category, count)| serde_json::json!({ "category": category, "count": count }))
        .collect();
    Ok(Json(serde_json::json!({
        "totals": totals,
        "ranked": ranked,
        "recommendations": recommendations(&totals),
    })))
}

/// GET /api/sentiment-distribution: article count per sentiment bucket.
async fn get_sentiment_distribution(State(state): State<Arc<AppState>>) -> ApiResult {
    let records = stored_records(&state)?;
    Ok(Json(serde_json::json!({
        "distribution": sentiment_distribution(&records),
        "total": records.len(),
    })))
}
