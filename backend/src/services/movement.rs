//! Movement ledger: append-only audit trail of quantity changes
//!
//! The ledger only records deltas and before/after snapshots; it never
//! computes stock quantity. Appends happen inside the store's mutation
//! transaction so a movement can never exist without its stock update.

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::{FromRow, PgPool, Postgres, Transaction};
use uuid::Uuid;

use crate::error::AppResult;
use crate::services::stock::StockRecord;
use shared::{DateRange, MovementReference, MovementType, PaginatedResponse, Pagination, PaginationMeta};

const MOVEMENT_COLUMNS: &str = "id, code, stock_record_id, product_id, branch_id, movement_type, \
     quantity_delta, quantity_before, quantity_after, reason, reference_type, reference_id, \
     performed_by, created_at";

/// Movement ledger over the append-only stock_movements table
#[derive(Clone)]
pub struct MovementLedger {
    db: PgPool,
}

/// One immutable ledger entry
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Movement {
    pub id: Uuid,
    /// Human-referenceable code, e.g. MV-00000042
    pub code: String,
    pub stock_record_id: Uuid,
    pub product_id: Uuid,
    pub branch_id: Uuid,
    pub movement_type: String,
    pub quantity_delta: i64,
    pub quantity_before: i64,
    pub quantity_after: i64,
    pub reason: Option<String>,
    pub reference_type: Option<String>,
    pub reference_id: Option<Uuid>,
    pub performed_by: Uuid,
    pub created_at: DateTime<Utc>,
}

impl Movement {
    /// Originating entity, when the movement was driven by one
    pub fn reference(&self) -> Option<MovementReference> {
        match (&self.reference_type, self.reference_id) {
            (Some(kind), Some(id)) => MovementReference::from_parts(kind, id),
            _ => None,
        }
    }
}

/// Movement to append alongside a stock mutation.
/// The delta is derived from the before/after records, not supplied here,
/// so the snapshot triple can never disagree.
#[derive(Debug, Clone)]
pub struct NewMovement {
    pub movement_type: MovementType,
    pub reason: Option<String>,
    pub reference: Option<MovementReference>,
    pub performed_by: Uuid,
}

impl MovementLedger {
    /// Create a new MovementLedger instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Append a movement within the store's mutation transaction.
    /// Write-once: nothing in the application updates or deletes ledger rows.
    pub(crate) async fn append_in_tx(
        tx: &mut Transaction<'_, Postgres>,
        before: &StockRecord,
        after: &StockRecord,
        new: NewMovement,
    ) -> AppResult<Movement> {
        let movement = sqlx::query_as::<_, Movement>(&format!(
            r#"
            INSERT INTO stock_movements (
                stock_record_id, product_id, branch_id, movement_type,
                quantity_delta, quantity_before, quantity_after,
                reason, reference_type, reference_id, performed_by
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            RETURNING {MOVEMENT_COLUMNS}
            "#
        ))
        .bind(before.id)
        .bind(before.product_id)
        .bind(before.branch_id)
        .bind(new.movement_type.as_str())
        .bind(after.quantity - before.quantity)
        .bind(before.quantity)
        .bind(after.quantity)
        .bind(&new.reason)
        .bind(new.reference.map(|r| r.kind()))
        .bind(new.reference.map(|r| r.id()))
        .bind(new.performed_by)
        .fetch_one(&mut **tx)
        .await?;

        Ok(movement)
    }

    /// List movements for one stock record in append order (oldest first)
    pub async fn list_by_stock(
        &self,
        stock_record_id: Uuid,
        pagination: Pagination,
    ) -> AppResult<PaginatedResponse<Movement>> {
        let total: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM stock_movements WHERE stock_record_id = $1")
                .bind(stock_record_id)
                .fetch_one(&self.db)
                .await?;

        let movements = sqlx::query_as::<_, Movement>(&format!(
            r#"
            SELECT {MOVEMENT_COLUMNS}
            FROM stock_movements
            WHERE stock_record_id = $1
            ORDER BY created_at ASC, code ASC
            LIMIT $2 OFFSET $3
            "#
        ))
        .bind(stock_record_id)
        .bind(pagination.limit())
        .bind(pagination.offset())
        .fetch_all(&self.db)
        .await?;

        Ok(PaginatedResponse {
            data: movements,
            pagination: PaginationMeta::new(pagination, total as u64),
        })
    }

    /// List movements for a product across all branches (audit index)
    pub async fn list_by_product(
        &self,
        product_id: Uuid,
        pagination: Pagination,
    ) -> AppResult<PaginatedResponse<Movement>> {
        let total: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM stock_movements WHERE product_id = $1")
                .bind(product_id)
                .fetch_one(&self.db)
                .await?;

        let movements = sqlx::query_as::<_, Movement>(&format!(
            r#"
            SELECT {MOVEMENT_COLUMNS}
            FROM stock_movements
            WHERE product_id = $1
            ORDER BY created_at ASC, code ASC
            LIMIT $2 OFFSET $3
            "#
        ))
        .bind(product_id)
        .bind(pagination.limit())
        .bind(pagination.offset())
        .fetch_all(&self.db)
        .await?;

        Ok(PaginatedResponse {
            data: movements,
            pagination: PaginationMeta::new(pagination, total as u64),
        })
    }

    /// List movements for a branch, optionally bounded to a date range
    pub async fn list_by_branch(
        &self,
        branch_id: Uuid,
        range: Option<DateRange>,
        pagination: Pagination,
    ) -> AppResult<PaginatedResponse<Movement>> {
        let (start, end) = match range {
            Some(r) => (Some(r.start), Some(r.end)),
            None => (None, None),
        };

        let total: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*) FROM stock_movements
            WHERE branch_id = $1
              AND ($2::DATE IS NULL OR created_at::DATE >= $2)
              AND ($3::DATE IS NULL OR created_at::DATE <= $3)
            "#,
        )
        .bind(branch_id)
        .bind(start)
        .bind(end)
        .fetch_one(&self.db)
        .await?;

        let movements = sqlx::query_as::<_, Movement>(&format!(
            r#"
            SELECT {MOVEMENT_COLUMNS}
            FROM stock_movements
            WHERE branch_id = $1
              AND ($2::DATE IS NULL OR created_at::DATE >= $2)
              AND ($3::DATE IS NULL OR created_at::DATE <= $3)
            ORDER BY created_at ASC, code ASC
            LIMIT $4 OFFSET $5
            "#
        ))
        .bind(branch_id)
        .bind(start)
        .bind(end)
        .bind(pagination.limit())
        .bind(pagination.offset())
        .fetch_all(&self.db)
        .await?;

        Ok(PaginatedResponse {
            data: movements,
            pagination: PaginationMeta::new(pagination, total as u64),
        })
    }
}
