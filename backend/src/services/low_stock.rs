//! Low stock reporting
//!
//! Advisory views over the stock records. Thresholds never block
//! operations; they only surface what a branch should reorder.

use sqlx::PgPool;
use uuid::Uuid;

use crate::error::AppResult;
use crate::services::stock::{StockRecord, STOCK_RECORD_COLUMNS};

/// Low stock report service
#[derive(Clone)]
pub struct LowStockService {
    db: PgPool,
}

impl LowStockService {
    /// Create a new LowStockService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Records whose available quantity has fallen to or below the reorder
    /// point. Available is computed on unreserved stock so units already
    /// promised to orders do not mask a shortage. A zero reorder point still
    /// matches once nothing is left to sell.
    pub async fn list_low_stock(&self, branch_id: Option<Uuid>) -> AppResult<Vec<StockRecord>> {
        let records = sqlx::query_as::<_, StockRecord>(&format!(
            r#"
            SELECT {STOCK_RECORD_COLUMNS}
            FROM stock_records
            WHERE quantity - reserved_quantity <= reorder_point
              AND ($1::UUID IS NULL OR branch_id = $1)
            ORDER BY quantity - reserved_quantity ASC
            "#
        ))
        .bind(branch_id)
        .fetch_all(&self.db)
        .await?;

        Ok(records)
    }

    /// Records with no physical stock at all
    pub async fn list_out_of_stock(&self, branch_id: Option<Uuid>) -> AppResult<Vec<StockRecord>> {
        let records = sqlx::query_as::<_, StockRecord>(&format!(
            r#"
            SELECT {STOCK_RECORD_COLUMNS}
            FROM stock_records
            WHERE quantity = 0
              AND ($1::UUID IS NULL OR branch_id = $1)
            ORDER BY updated_at DESC
            "#
        ))
        .bind(branch_id)
        .fetch_all(&self.db)
        .await?;

        Ok(records)
    }
}
