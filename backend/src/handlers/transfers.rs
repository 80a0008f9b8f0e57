//! HTTP handlers for inter-branch transfer endpoints

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::error::AppResult;
use crate::services::transfer::{CreateTransferInput, StockTransfer, TransferFilter};
use crate::AppState;

/// Actor performing a transfer transition
#[derive(Debug, Deserialize)]
pub struct TransferActionInput {
    pub actor_id: Uuid,
}

/// Create a transfer, reserving quantity at the source branch
pub async fn create_transfer(
    State(state): State<AppState>,
    Json(input): Json<CreateTransferInput>,
) -> AppResult<Json<StockTransfer>> {
    let transfer = state.transfers().create(input).await?;
    Ok(Json(transfer))
}

/// List transfers, optionally filtered by status or branch
pub async fn list_transfers(
    State(state): State<AppState>,
    Query(filter): Query<TransferFilter>,
) -> AppResult<Json<Vec<StockTransfer>>> {
    let transfers = state.transfers().list(filter).await?;
    Ok(Json(transfers))
}

/// Get a transfer by id
pub async fn get_transfer(
    State(state): State<AppState>,
    Path(transfer_id): Path<Uuid>,
) -> AppResult<Json<StockTransfer>> {
    let transfer = state.transfers().get(transfer_id).await?;
    Ok(Json(transfer))
}

/// Ship a pending transfer, debiting the source branch
pub async fn ship_transfer(
    State(state): State<AppState>,
    Path(transfer_id): Path<Uuid>,
    Json(input): Json<TransferActionInput>,
) -> AppResult<Json<StockTransfer>> {
    let transfer = state.transfers().ship(transfer_id, input.actor_id).await?;
    Ok(Json(transfer))
}

/// Complete an in-transit transfer, crediting the destination branch
pub async fn complete_transfer(
    State(state): State<AppState>,
    Path(transfer_id): Path<Uuid>,
    Json(input): Json<TransferActionInput>,
) -> AppResult<Json<StockTransfer>> {
    let transfer = state
        .transfers()
        .complete(transfer_id, input.actor_id)
        .await?;
    Ok(Json(transfer))
}

/// Cancel a pending or in-transit transfer
pub async fn cancel_transfer(
    State(state): State<AppState>,
    Path(transfer_id): Path<Uuid>,
    Json(input): Json<TransferActionInput>,
) -> AppResult<Json<StockTransfer>> {
    let transfer = state.transfers().cancel(transfer_id, input.actor_id).await?;
    Ok(Json(transfer))
}
