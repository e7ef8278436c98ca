//! Store statistics and the headline metrics table.

use std::sync::Arc;

use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use esgsense_analyze::aggregate::{daily_aggregates, most_negative_articles, weekday_aggregates};
use esgsense_analyze::{sentiment_correlation, summary_statistics, TOP_NEGATIVE};

use super::analysis::{internal_error, stored_records, ApiError};
use crate::state::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/stats", get(get_stats))
}

/// GET /api/stats: storage statistics plus descriptive metrics.
async fn get_stats(
    State(state): State<Arc<AppState>>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let store_stats = state.store.get_stats().map_err(internal_error)?;
    let records = if store_stats.total_records > 0 {
        stored_records(&state)?
    } else {
        Vec::new()
    };
    let daily = daily_aggregates(&records);

    Ok(Json(serde_json::json!({
        "entity": state.config.entity,
        "records": store_stats.total_records,
        "daily_rows": store_stats.daily_rows,
        "first_date": store_stats.first_date,
        "last_date": store_stats.last_date,
        "db_size_mb": store_stats.db_size_mb,
        "summary_statistics": summary_statistics(&records, &daily),
        "weekdays": weekday_aggregates(&records),
        "correlation": sentiment_correlation(&records),
        "most_negative": most_negative_articles(&records, TOP_NEGATIVE),
    })))
}
