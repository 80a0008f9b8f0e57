//! HTTP handlers for movement ledger queries
//!
//! The ledger is read-only over HTTP; movements are only written as a side
//! effect of stock operations.

use axum::{
    extract::{Path, Query, State},
    Json,
};
use chrono::NaiveDate;
use serde::Deserialize;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::services::movement::Movement;
use crate::AppState;
use shared::{DateRange, PaginatedResponse, Pagination};

/// Query parameters for movement listings
#[derive(Debug, Default, Deserialize)]
pub struct MovementListQuery {
    pub page: Option<u32>,
    pub per_page: Option<u32>,
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

impl MovementListQuery {
    fn pagination(&self) -> Pagination {
        let default = Pagination::default();
        Pagination {
            page: self.page.unwrap_or(default.page),
            per_page: self.per_page.unwrap_or(default.per_page),
        }
    }

    fn date_range(&self) -> AppResult<Option<DateRange>> {
        match (self.start, self.end) {
            (Some(start), Some(end)) if start > end => Err(AppError::validation(
                "start",
                "Range start must not be after range end",
            )),
            (Some(start), Some(end)) => Ok(Some(DateRange { start, end })),
            (Some(start), None) => Ok(Some(DateRange {
                start,
                end: NaiveDate::MAX,
            })),
            (None, Some(end)) => Ok(Some(DateRange {
                start: NaiveDate::MIN,
                end,
            })),
            (None, None) => Ok(None),
        }
    }
}

/// List movements for one stock record, oldest first
pub async fn list_stock_movements(
    State(state): State<AppState>,
    Path((branch_id, product_id)): Path<(Uuid, Uuid)>,
    Query(query): Query<MovementListQuery>,
) -> AppResult<Json<PaginatedResponse<Movement>>> {
    let record = state.store().get(product_id, branch_id).await?;
    let movements = state
        .movements()
        .list_by_stock(record.id, query.pagination())
        .await?;
    Ok(Json(movements))
}

/// List movements for a product across all branches
pub async fn list_product_movements(
    State(state): State<AppState>,
    Path(product_id): Path<Uuid>,
    Query(query): Query<MovementListQuery>,
) -> AppResult<Json<PaginatedResponse<Movement>>> {
    let movements = state
        .movements()
        .list_by_product(product_id, query.pagination())
        .await?;
    Ok(Json(movements))
}

/// List movements for a branch, optionally bounded by date
pub async fn list_branch_movements(
    State(state): State<AppState>,
    Path(branch_id): Path<Uuid>,
    Query(query): Query<MovementListQuery>,
) -> AppResult<Json<PaginatedResponse<Movement>>> {
    let range = query.date_range()?;
    let movements = state
        .movements()
        .list_by_branch(branch_id, range, query.pagination())
        .await?;
    Ok(Json(movements))
}
