//! Transfer workflow: two-sided stock movement between branches
//!
//! A transfer reserves quantity at the source on creation, debits the source
//! when shipped, and credits the destination when completed. Each transition
//! runs in one database transaction: the status-guarded update on the
//! transfer row and the stock mutation (with its ledger movement) commit
//! together or not at all, so a transition can never leave the transfer row
//! and the stock record disagreeing. Between ship and complete the quantity
//! is in flight, owned by neither branch.

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::{FromRow, PgPool, Postgres, Transaction};
use uuid::Uuid;
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::services::movement::NewMovement;
use crate::services::stock::{StockMutation, StockStore};
use shared::{validate_distinct_branches, MovementReference, MovementType, TransferStatus};

const TRANSFER_COLUMNS: &str = "id, code, product_id, from_branch_id, to_branch_id, quantity, \
     status, notes, requested_by, requested_at, shipped_by, shipped_at, completed_by, \
     completed_at, cancelled_by, cancelled_at, updated_at";

/// Reason recorded on the compensating movement when an in-transit transfer
/// is cancelled and the debit is credited back to the source
const CANCEL_REASON: &str = "transfer cancelled";

/// Transfer workflow service
#[derive(Clone)]
pub struct TransferService {
    db: PgPool,
}

/// One inter-branch transfer
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct StockTransfer {
    pub id: Uuid,
    /// Human-referenceable code, e.g. TR-00000007
    pub code: String,
    pub product_id: Uuid,
    pub from_branch_id: Uuid,
    pub to_branch_id: Uuid,
    pub quantity: i64,
    pub status: String,
    pub notes: Option<String>,
    pub requested_by: Uuid,
    pub requested_at: DateTime<Utc>,
    pub shipped_by: Option<Uuid>,
    pub shipped_at: Option<DateTime<Utc>>,
    pub completed_by: Option<Uuid>,
    pub completed_at: Option<DateTime<Utc>>,
    pub cancelled_by: Option<Uuid>,
    pub cancelled_at: Option<DateTime<Utc>>,
    pub updated_at: DateTime<Utc>,
}

impl StockTransfer {
    /// Parsed status; a row with an unknown status is unreachable through
    /// the workflow and the check constraint
    pub fn transfer_status(&self) -> AppResult<TransferStatus> {
        TransferStatus::from_str(&self.status).ok_or_else(|| {
            AppError::InternalError(anyhow::anyhow!(
                "transfer {} has unknown status {}",
                self.id,
                self.status
            ))
        })
    }
}

/// Input for creating a transfer
#[derive(Debug, serde::Deserialize, Validate)]
pub struct CreateTransferInput {
    pub product_id: Uuid,
    pub from_branch_id: Uuid,
    pub to_branch_id: Uuid,
    #[validate(range(min = 1, message = "Quantity must be positive"))]
    pub quantity: i64,
    pub notes: Option<String>,
    pub requested_by: Uuid,
}

/// Queue-style listing filter
#[derive(Debug, Default, serde::Deserialize)]
pub struct TransferFilter {
    pub status: Option<String>,
    pub branch_id: Option<Uuid>,
}

impl TransferService {
    /// Create a new TransferService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Create a transfer in `pending`, earmarking the quantity at the source
    /// so concurrent transfers and sales cannot overcommit it. The
    /// reservation and the transfer row commit in one transaction.
    pub async fn create(&self, input: CreateTransferInput) -> AppResult<StockTransfer> {
        input.validate()?;
        validate_distinct_branches(input.from_branch_id, input.to_branch_id)
            .map_err(|msg| AppError::validation("to_branch_id", msg))?;

        let mut tx = self.db.begin().await?;

        StockStore::mutate_in_tx(&mut tx, input.product_id, input.from_branch_id, |record| {
            let levels = record.levels().reserve(input.quantity)?;
            Ok(StockMutation::levels(levels))
        })
        .await?;

        let transfer = sqlx::query_as::<_, StockTransfer>(&format!(
            r#"
            INSERT INTO stock_transfers (product_id, from_branch_id, to_branch_id, quantity, notes, requested_by)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {TRANSFER_COLUMNS}
            "#
        ))
        .bind(input.product_id)
        .bind(input.from_branch_id)
        .bind(input.to_branch_id)
        .bind(input.quantity)
        .bind(&input.notes)
        .bind(input.requested_by)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(transfer)
    }

    /// Ship a pending transfer: release the source reservation and debit the
    /// source quantity, emitting `transfer_out`. Claim and debit share one
    /// transaction, so a shipped transfer always has its debit on record.
    pub async fn ship(&self, transfer_id: Uuid, actor_id: Uuid) -> AppResult<StockTransfer> {
        let mut tx = self.db.begin().await?;

        let claimed = self
            .claim(
                &mut tx,
                transfer_id,
                TransferStatus::Pending,
                "SET status = 'in_transit', shipped_by = $1, shipped_at = now(), updated_at = now()",
                actor_id,
            )
            .await?;

        let Some(claimed) = claimed else {
            tx.rollback().await?;
            return self.lost_claim(transfer_id, TransferStatus::InTransit).await;
        };

        // The reservation guarantees this holds, but the debit is re-checked
        // under the row lock all the same
        StockStore::mutate_in_tx(&mut tx, claimed.product_id, claimed.from_branch_id, |record| {
            let levels = record.levels().commit(claimed.quantity)?;
            Ok(StockMutation::levels(levels).with_movement(NewMovement {
                movement_type: MovementType::TransferOut,
                reason: None,
                reference: Some(MovementReference::StockTransfer(claimed.id)),
                performed_by: actor_id,
            }))
        })
        .await?;

        tx.commit().await?;
        Ok(claimed)
    }

    /// Complete an in-transit transfer: credit the destination, creating its
    /// stock record if absent, emitting `transfer_in`
    pub async fn complete(&self, transfer_id: Uuid, actor_id: Uuid) -> AppResult<StockTransfer> {
        let mut tx = self.db.begin().await?;

        let claimed = self
            .claim(
                &mut tx,
                transfer_id,
                TransferStatus::InTransit,
                "SET status = 'completed', completed_by = $1, completed_at = now(), updated_at = now()",
                actor_id,
            )
            .await?;

        let Some(claimed) = claimed else {
            tx.rollback().await?;
            return self.lost_claim(transfer_id, TransferStatus::Completed).await;
        };

        StockStore::ensure_exists_in_tx(&mut tx, claimed.product_id, claimed.to_branch_id).await?;

        StockStore::mutate_in_tx(&mut tx, claimed.product_id, claimed.to_branch_id, |record| {
            let levels = record.levels().restock(claimed.quantity)?;
            Ok(StockMutation::levels(levels).with_movement(NewMovement {
                movement_type: MovementType::TransferIn,
                reason: None,
                reference: Some(MovementReference::StockTransfer(claimed.id)),
                performed_by: actor_id,
            }))
        })
        .await?;

        tx.commit().await?;
        Ok(claimed)
    }

    /// Cancel a pending or in-transit transfer.
    /// From `pending` only the reservation is released (nothing was debited,
    /// so no movement). From `in_transit` the source is credited back with a
    /// compensating movement. The claim pins the prior status, so the
    /// compensation always matches what actually happened to the stock.
    pub async fn cancel(&self, transfer_id: Uuid, actor_id: Uuid) -> AppResult<StockTransfer> {
        let current = self.get(transfer_id).await?.transfer_status()?;
        current.validate_transition(TransferStatus::Cancelled)?;

        let mut tx = self.db.begin().await?;

        let claimed = self
            .claim(
                &mut tx,
                transfer_id,
                current,
                "SET status = 'cancelled', cancelled_by = $1, cancelled_at = now(), updated_at = now()",
                actor_id,
            )
            .await?;

        let Some(claimed) = claimed else {
            tx.rollback().await?;
            return self.lost_claim(transfer_id, TransferStatus::Cancelled).await;
        };

        match current {
            TransferStatus::Pending => {
                StockStore::mutate_in_tx(
                    &mut tx,
                    claimed.product_id,
                    claimed.from_branch_id,
                    |record| {
                        let levels = record.levels().release(claimed.quantity)?;
                        Ok(StockMutation::levels(levels))
                    },
                )
                .await?;
            }
            TransferStatus::InTransit => {
                StockStore::mutate_in_tx(
                    &mut tx,
                    claimed.product_id,
                    claimed.from_branch_id,
                    |record| {
                        let levels = record.levels().restock(claimed.quantity)?;
                        Ok(StockMutation::levels(levels).with_movement(NewMovement {
                            movement_type: MovementType::AdjustmentAdd,
                            reason: Some(CANCEL_REASON.to_string()),
                            reference: Some(MovementReference::StockTransfer(claimed.id)),
                            performed_by: actor_id,
                        }))
                    },
                )
                .await?;
            }
            _ => unreachable!("transition validated above"),
        }

        tx.commit().await?;
        Ok(claimed)
    }

    /// Get a transfer by id
    pub async fn get(&self, transfer_id: Uuid) -> AppResult<StockTransfer> {
        let transfer = sqlx::query_as::<_, StockTransfer>(&format!(
            "SELECT {TRANSFER_COLUMNS} FROM stock_transfers WHERE id = $1"
        ))
        .bind(transfer_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Stock transfer".to_string()))?;

        Ok(transfer)
    }

    /// Queue-style listing, newest first, optionally filtered by status
    /// and/or by a branch appearing on either side
    pub async fn list(&self, filter: TransferFilter) -> AppResult<Vec<StockTransfer>> {
        let status = match &filter.status {
            Some(s) => Some(
                TransferStatus::from_str(s)
                    .ok_or_else(|| AppError::validation("status", "Unknown transfer status"))?,
            ),
            None => None,
        };

        let transfers = sqlx::query_as::<_, StockTransfer>(&format!(
            r#"
            SELECT {TRANSFER_COLUMNS}
            FROM stock_transfers
            WHERE ($1::TEXT IS NULL OR status = $1)
              AND ($2::UUID IS NULL OR from_branch_id = $2 OR to_branch_id = $2)
            ORDER BY requested_at DESC
            "#
        ))
        .bind(status.map(|s| s.as_str()))
        .bind(filter.branch_id)
        .fetch_all(&self.db)
        .await?;

        Ok(transfers)
    }

    /// Status-guarded transition claim inside the caller's transaction.
    /// Matches only while the transfer still holds `expected`, so exactly one
    /// of any set of racing transitions wins.
    async fn claim(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        transfer_id: Uuid,
        expected: TransferStatus,
        set_clause: &str,
        actor_id: Uuid,
    ) -> AppResult<Option<StockTransfer>> {
        let claimed = sqlx::query_as::<_, StockTransfer>(&format!(
            r#"
            UPDATE stock_transfers
            {set_clause}
            WHERE id = $2 AND status = $3
            RETURNING {TRANSFER_COLUMNS}
            "#
        ))
        .bind(actor_id)
        .bind(transfer_id)
        .bind(expected.as_str())
        .fetch_optional(&mut **tx)
        .await?;

        Ok(claimed)
    }

    /// A status-guarded claim found no row: another caller transitioned the
    /// transfer between our read and the update. Report against fresh state.
    async fn lost_claim(
        &self,
        transfer_id: Uuid,
        requested: TransferStatus,
    ) -> AppResult<StockTransfer> {
        let fresh = self.get(transfer_id).await?;
        fresh.transfer_status()?.validate_transition(requested)?;
        Err(AppError::Conflict("Stock transfer".to_string()))
    }
}
