//! Stock record store: the single mutation choke point for stock state
//!
//! All quantity and reservation changes go through [`StockStore::mutate`],
//! which re-validates the stock invariants, applies the update under an
//! optimistic version check, and appends the accompanying ledger movement in
//! the same transaction. No other code writes stock fields.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::{FromRow, PgPool, Postgres, Transaction};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::services::movement::{MovementLedger, NewMovement};
use shared::StockLevels;

pub(crate) const STOCK_RECORD_COLUMNS: &str = "id, product_id, branch_id, quantity, reserved_quantity, \
     reorder_point, reorder_quantity, cost_price, selling_price, supplier_id, version, \
     created_at, updated_at";

/// Stock record store with per-record optimistic locking
#[derive(Clone)]
pub struct StockStore {
    db: PgPool,
    mutate_retries: u32,
}

/// One (product, branch) stock aggregate
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct StockRecord {
    pub id: Uuid,
    pub product_id: Uuid,
    pub branch_id: Uuid,
    pub quantity: i64,
    pub reserved_quantity: i64,
    pub reorder_point: i64,
    pub reorder_quantity: i64,
    pub cost_price: Option<Decimal>,
    pub selling_price: Option<Decimal>,
    pub supplier_id: Option<Uuid>,
    pub version: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl StockRecord {
    /// Sellable/transferable amount; always derived, never stored
    pub fn available(&self) -> i64 {
        self.quantity - self.reserved_quantity
    }

    /// Current levels as the pure domain pair
    pub fn levels(&self) -> StockLevels {
        StockLevels {
            quantity: self.quantity,
            reserved: self.reserved_quantity,
        }
    }
}

/// Result of a mutation closure: the new levels, optional pricing and
/// threshold updates, and the ledger movement accompanying the change (if any)
#[derive(Debug)]
pub struct StockMutation {
    pub quantity: i64,
    pub reserved_quantity: i64,
    pub cost_price: Option<Decimal>,
    pub selling_price: Option<Decimal>,
    pub supplier_id: Option<Uuid>,
    pub reorder_point: Option<i64>,
    pub reorder_quantity: Option<i64>,
    pub movement: Option<NewMovement>,
}

impl StockMutation {
    pub fn levels(levels: StockLevels) -> Self {
        Self {
            quantity: levels.quantity,
            reserved_quantity: levels.reserved,
            cost_price: None,
            selling_price: None,
            supplier_id: None,
            reorder_point: None,
            reorder_quantity: None,
            movement: None,
        }
    }

    pub fn with_movement(mut self, movement: NewMovement) -> Self {
        self.movement = Some(movement);
        self
    }

    pub fn with_pricing(
        mut self,
        cost_price: Option<Decimal>,
        selling_price: Option<Decimal>,
        supplier_id: Option<Uuid>,
    ) -> Self {
        self.cost_price = cost_price;
        self.selling_price = selling_price;
        self.supplier_id = supplier_id;
        self
    }

    pub fn with_reorder_levels(mut self, reorder_point: i64, reorder_quantity: i64) -> Self {
        self.reorder_point = Some(reorder_point);
        self.reorder_quantity = Some(reorder_quantity);
        self
    }
}

impl StockStore {
    /// Create a new StockStore instance
    pub fn new(db: PgPool, mutate_retries: u32) -> Self {
        Self { db, mutate_retries }
    }

    /// Get a stock record by its (product, branch) identity
    pub async fn get(&self, product_id: Uuid, branch_id: Uuid) -> AppResult<StockRecord> {
        let record = sqlx::query_as::<_, StockRecord>(&format!(
            "SELECT {STOCK_RECORD_COLUMNS} FROM stock_records WHERE product_id = $1 AND branch_id = $2"
        ))
        .bind(product_id)
        .bind(branch_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Stock record".to_string()))?;

        Ok(record)
    }

    /// Get a record, creating a zero-quantity row on first touch.
    /// Records are never hard-deleted afterwards.
    pub async fn get_or_create(&self, product_id: Uuid, branch_id: Uuid) -> AppResult<StockRecord> {
        sqlx::query(
            "INSERT INTO stock_records (product_id, branch_id) VALUES ($1, $2)
             ON CONFLICT (product_id, branch_id) DO NOTHING",
        )
        .bind(product_id)
        .bind(branch_id)
        .execute(&self.db)
        .await?;

        self.get(product_id, branch_id).await
    }

    /// List all stock records for a branch
    pub async fn list_by_branch(&self, branch_id: Uuid) -> AppResult<Vec<StockRecord>> {
        let records = sqlx::query_as::<_, StockRecord>(&format!(
            "SELECT {STOCK_RECORD_COLUMNS} FROM stock_records WHERE branch_id = $1 ORDER BY created_at DESC"
        ))
        .bind(branch_id)
        .fetch_all(&self.db)
        .await?;

        Ok(records)
    }

    /// Apply a mutation to one stock record.
    ///
    /// Reads the current record, runs `f` to compute the new state, re-checks
    /// the invariants, then writes guarded by the record version, appending
    /// the movement in the same transaction. On a version conflict the whole
    /// read-modify-write is retried with fresh state up to the configured
    /// bound; business failures from `f` are surfaced immediately and never
    /// retried.
    pub async fn mutate<F>(&self, product_id: Uuid, branch_id: Uuid, f: F) -> AppResult<StockRecord>
    where
        F: Fn(&StockRecord) -> AppResult<StockMutation>,
    {
        for _ in 0..self.mutate_retries.max(1) {
            let current = self.get(product_id, branch_id).await?;
            let mutation = f(&current)?;

            // Choke-point invariant check, independent of what the closure did
            StockLevels::new(mutation.quantity, mutation.reserved_quantity)?;

            let mut tx = self.db.begin().await?;

            let updated = sqlx::query_as::<_, StockRecord>(&format!(
                r#"
                UPDATE stock_records
                SET quantity = $1,
                    reserved_quantity = $2,
                    cost_price = COALESCE($3, cost_price),
                    selling_price = COALESCE($4, selling_price),
                    supplier_id = COALESCE($5, supplier_id),
                    reorder_point = COALESCE($6, reorder_point),
                    reorder_quantity = COALESCE($7, reorder_quantity),
                    version = version + 1,
                    updated_at = now()
                WHERE id = $8 AND version = $9
                RETURNING {STOCK_RECORD_COLUMNS}
                "#
            ))
            .bind(mutation.quantity)
            .bind(mutation.reserved_quantity)
            .bind(mutation.cost_price)
            .bind(mutation.selling_price)
            .bind(mutation.supplier_id)
            .bind(mutation.reorder_point)
            .bind(mutation.reorder_quantity)
            .bind(current.id)
            .bind(current.version)
            .fetch_optional(&mut *tx)
            .await?;

            let Some(updated) = updated else {
                // Another writer won the version race; retry with fresh state
                tx.rollback().await?;
                continue;
            };

            if let Some(movement) = mutation.movement {
                MovementLedger::append_in_tx(&mut tx, &current, &updated, movement).await?;
            }

            tx.commit().await?;
            return Ok(updated);
        }

        tracing::warn!(
            %product_id,
            %branch_id,
            retries = self.mutate_retries,
            "stock mutation retries exhausted"
        );
        Err(AppError::Conflict("Stock record".to_string()))
    }

    /// Update the advisory reorder thresholds for a record.
    /// Goes through `mutate` so the write gets the same version bump and
    /// bounded retry as every other stock change.
    pub async fn set_reorder_levels(
        &self,
        product_id: Uuid,
        branch_id: Uuid,
        reorder_point: i64,
        reorder_quantity: i64,
    ) -> AppResult<StockRecord> {
        self.mutate(product_id, branch_id, |record| {
            Ok(StockMutation::levels(record.levels())
                .with_reorder_levels(reorder_point, reorder_quantity))
        })
        .await
    }

    /// Insert a zero-quantity row for the pair if none exists, within a
    /// caller-owned transaction
    pub(crate) async fn ensure_exists_in_tx(
        tx: &mut Transaction<'_, Postgres>,
        product_id: Uuid,
        branch_id: Uuid,
    ) -> AppResult<()> {
        sqlx::query(
            "INSERT INTO stock_records (product_id, branch_id) VALUES ($1, $2)
             ON CONFLICT (product_id, branch_id) DO NOTHING",
        )
        .bind(product_id)
        .bind(branch_id)
        .execute(&mut **tx)
        .await?;

        Ok(())
    }

    /// Apply a mutation within a caller-owned transaction.
    ///
    /// Used by the transfer workflow, which must change a transfer row and a
    /// stock record atomically. The record is read `FOR UPDATE`, so the row
    /// lock serializes concurrent writers for the life of the transaction and
    /// no version retry is needed; the version still bumps so interleaved
    /// optimistic writers observe the change. Errors from `f` roll the whole
    /// transaction back in the caller.
    pub(crate) async fn mutate_in_tx<F>(
        tx: &mut Transaction<'_, Postgres>,
        product_id: Uuid,
        branch_id: Uuid,
        f: F,
    ) -> AppResult<StockRecord>
    where
        F: FnOnce(&StockRecord) -> AppResult<StockMutation>,
    {
        let current = sqlx::query_as::<_, StockRecord>(&format!(
            "SELECT {STOCK_RECORD_COLUMNS} FROM stock_records
             WHERE product_id = $1 AND branch_id = $2 FOR UPDATE"
        ))
        .bind(product_id)
        .bind(branch_id)
        .fetch_optional(&mut **tx)
        .await?
        .ok_or_else(|| AppError::NotFound("Stock record".to_string()))?;

        let mutation = f(&current)?;

        // Choke-point invariant check, independent of what the closure did
        StockLevels::new(mutation.quantity, mutation.reserved_quantity)?;

        let updated = sqlx::query_as::<_, StockRecord>(&format!(
            r#"
            UPDATE stock_records
            SET quantity = $1,
                reserved_quantity = $2,
                cost_price = COALESCE($3, cost_price),
                selling_price = COALESCE($4, selling_price),
                supplier_id = COALESCE($5, supplier_id),
                reorder_point = COALESCE($6, reorder_point),
                reorder_quantity = COALESCE($7, reorder_quantity),
                version = version + 1,
                updated_at = now()
            WHERE id = $8
            RETURNING {STOCK_RECORD_COLUMNS}
            "#
        ))
        .bind(mutation.quantity)
        .bind(mutation.reserved_quantity)
        .bind(mutation.cost_price)
        .bind(mutation.selling_price)
        .bind(mutation.supplier_id)
        .bind(mutation.reorder_point)
        .bind(mutation.reorder_quantity)
        .bind(current.id)
        .fetch_one(&mut **tx)
        .await?;

        if let Some(movement) = mutation.movement {
            MovementLedger::append_in_tx(tx, &current, &updated, movement).await?;
        }

        Ok(updated)
    }
}
