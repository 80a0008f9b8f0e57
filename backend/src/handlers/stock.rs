//! HTTP handlers for stock level and reservation endpoints

use axum::{
    extract::{Path, State},
    Json,
};
use serde::Serialize;
use uuid::Uuid;

use crate::error::AppResult;
use crate::services::adjustment::{AdjustInput, ReorderLevelsInput, RestockInput};
use crate::services::reservation::{CommitInput, ReservationInput, RestoreInput};
use crate::services::stock::StockRecord;
use crate::AppState;

/// Stock record with the derived available quantity included
#[derive(Serialize)]
pub struct StockRecordResponse {
    #[serde(flatten)]
    pub record: StockRecord,
    pub available: i64,
}

impl From<StockRecord> for StockRecordResponse {
    fn from(record: StockRecord) -> Self {
        let available = record.available();
        Self { record, available }
    }
}

/// Reserve quantity for a pending order
pub async fn reserve_stock(
    State(state): State<AppState>,
    Json(input): Json<ReservationInput>,
) -> AppResult<Json<StockRecordResponse>> {
    let service = state.reservations();
    let record = service
        .reserve(input.product_id, input.branch_id, input.quantity)
        .await?;
    Ok(Json(record.into()))
}

/// Release a reservation without consuming stock
pub async fn release_stock(
    State(state): State<AppState>,
    Json(input): Json<ReservationInput>,
) -> AppResult<Json<StockRecordResponse>> {
    let service = state.reservations();
    let record = service
        .release(input.product_id, input.branch_id, input.quantity)
        .await?;
    Ok(Json(record.into()))
}

/// Commit a reservation on order completion
pub async fn commit_stock(
    State(state): State<AppState>,
    Json(input): Json<CommitInput>,
) -> AppResult<Json<StockRecordResponse>> {
    let service = state.reservations();
    let record = service.commit(input).await?;
    Ok(Json(record.into()))
}

/// Restore committed quantity after an order cancellation
pub async fn restore_stock(
    State(state): State<AppState>,
    Json(input): Json<RestoreInput>,
) -> AppResult<Json<StockRecordResponse>> {
    let service = state.reservations();
    let record = service.restore(input).await?;
    Ok(Json(record.into()))
}

/// Restock a (product, branch) pair
pub async fn restock(
    State(state): State<AppState>,
    Json(input): Json<RestockInput>,
) -> AppResult<Json<StockRecordResponse>> {
    let service = state.adjustments();
    let record = service.restock(input).await?;
    Ok(Json(record.into()))
}

/// Apply a signed stock correction
pub async fn adjust_stock(
    State(state): State<AppState>,
    Json(input): Json<AdjustInput>,
) -> AppResult<Json<StockRecordResponse>> {
    let service = state.adjustments();
    let record = service.adjust(input).await?;
    Ok(Json(record.into()))
}

/// Update reorder thresholds for a stock record
pub async fn set_reorder_levels(
    State(state): State<AppState>,
    Path((branch_id, product_id)): Path<(Uuid, Uuid)>,
    Json(input): Json<ReorderLevelsInput>,
) -> AppResult<Json<StockRecordResponse>> {
    let service = state.adjustments();
    let record = service
        .set_reorder_levels(product_id, branch_id, input)
        .await?;
    Ok(Json(record.into()))
}

/// Get the stock record for one (product, branch) pair
pub async fn get_stock_record(
    State(state): State<AppState>,
    Path((branch_id, product_id)): Path<(Uuid, Uuid)>,
) -> AppResult<Json<StockRecordResponse>> {
    let record = state.store().get(product_id, branch_id).await?;
    Ok(Json(record.into()))
}

/// List all stock records for a branch
pub async fn list_branch_stock(
    State(state): State<AppState>,
    Path(branch_id): Path<Uuid>,
) -> AppResult<Json<Vec<StockRecordResponse>>> {
    let records = state.store().list_by_branch(branch_id).await?;
    Ok(Json(records.into_iter().map(Into::into).collect()))
}
