//! HTTP handlers for advisory stock reports

use axum::{
    extract::{Query, State},
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::error::AppResult;
use crate::handlers::stock::StockRecordResponse;
use crate::AppState;

/// Optional branch scope for report queries
#[derive(Debug, Default, Deserialize)]
pub struct ReportQuery {
    pub branch_id: Option<Uuid>,
}

/// Records at or below their reorder point
pub async fn list_low_stock(
    State(state): State<AppState>,
    Query(query): Query<ReportQuery>,
) -> AppResult<Json<Vec<StockRecordResponse>>> {
    let records = state.low_stock().list_low_stock(query.branch_id).await?;
    Ok(Json(records.into_iter().map(Into::into).collect()))
}

/// Records with zero physical quantity
pub async fn list_out_of_stock(
    State(state): State<AppState>,
    Query(query): Query<ReportQuery>,
) -> AppResult<Json<Vec<StockRecordResponse>>> {
    let records = state.low_stock().list_out_of_stock(query.branch_id).await?;
    Ok(Json(records.into_iter().map(Into::into).collect()))
}
