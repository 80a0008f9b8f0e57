//! Adjustment service: operator-initiated stock changes
//!
//! Restocks and corrections that are not tied to an order or transfer.
//! Adjustments never touch reserved quantity; a removal that would undercut
//! outstanding reservations is rejected.

use rust_decimal::Decimal;
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::services::movement::NewMovement;
use crate::services::stock::{StockMutation, StockRecord, StockStore};
use shared::{
    validate_adjustment_delta, validate_price, validate_reason, validate_reorder_thresholds,
    MovementType,
};

/// Adjustment service over the stock record store
#[derive(Clone)]
pub struct AdjustmentService {
    store: StockStore,
}

/// Input for restocking a (product, branch) pair
#[derive(Debug, Deserialize, Validate)]
pub struct RestockInput {
    pub product_id: Uuid,
    pub branch_id: Uuid,
    #[validate(range(min = 1, message = "Quantity must be positive"))]
    pub quantity: i64,
    pub cost_price: Option<Decimal>,
    pub selling_price: Option<Decimal>,
    pub supplier_id: Option<Uuid>,
    pub notes: Option<String>,
    pub performed_by: Uuid,
}

/// Input for a signed stock correction
#[derive(Debug, Deserialize)]
pub struct AdjustInput {
    pub product_id: Uuid,
    pub branch_id: Uuid,
    pub delta: i64,
    pub reason: String,
    pub performed_by: Uuid,
}

/// Input for updating advisory reorder thresholds
#[derive(Debug, Deserialize)]
pub struct ReorderLevelsInput {
    pub reorder_point: i64,
    pub reorder_quantity: i64,
}

impl AdjustmentService {
    /// Create a new AdjustmentService instance
    pub fn new(store: StockStore) -> Self {
        Self { store }
    }

    /// Add physical stock, creating the record on first restock.
    /// Pricing fields are updated when supplied and left untouched otherwise.
    pub async fn restock(&self, input: RestockInput) -> AppResult<StockRecord> {
        input.validate()?;
        validate_price(input.cost_price).map_err(|msg| AppError::validation("cost_price", msg))?;
        validate_price(input.selling_price)
            .map_err(|msg| AppError::validation("selling_price", msg))?;

        self.store
            .get_or_create(input.product_id, input.branch_id)
            .await?;

        self.store
            .mutate(input.product_id, input.branch_id, |record| {
                let levels = record.levels().restock(input.quantity)?;
                Ok(StockMutation::levels(levels)
                    .with_pricing(input.cost_price, input.selling_price, input.supplier_id)
                    .with_movement(NewMovement {
                        movement_type: MovementType::Restock,
                        reason: input.notes.clone(),
                        reference: None,
                        performed_by: input.performed_by,
                    }))
            })
            .await
    }

    /// Apply a signed correction (damage, recount) with a mandatory reason
    pub async fn adjust(&self, input: AdjustInput) -> AppResult<StockRecord> {
        validate_adjustment_delta(input.delta).map_err(|msg| AppError::validation("delta", msg))?;
        validate_reason(&input.reason).map_err(|msg| AppError::validation("reason", msg))?;

        let movement_type = if input.delta > 0 {
            MovementType::AdjustmentAdd
        } else {
            MovementType::AdjustmentRemove
        };

        self.store
            .mutate(input.product_id, input.branch_id, |record| {
                let levels = record.levels().adjust(input.delta).map_err(|_| {
                    AppError::InvariantViolation(format!(
                        "Adjustment of {} rejected: quantity {} with {} reserved would leave {}",
                        input.delta,
                        record.quantity,
                        record.reserved_quantity,
                        record.quantity + input.delta,
                    ))
                })?;
                Ok(StockMutation::levels(levels).with_movement(NewMovement {
                    movement_type,
                    reason: Some(input.reason.clone()),
                    reference: None,
                    performed_by: input.performed_by,
                }))
            })
            .await
    }

    /// Update advisory reorder thresholds for an existing record
    pub async fn set_reorder_levels(
        &self,
        product_id: Uuid,
        branch_id: Uuid,
        input: ReorderLevelsInput,
    ) -> AppResult<StockRecord> {
        validate_reorder_thresholds(input.reorder_point, input.reorder_quantity)
            .map_err(|msg| AppError::validation("reorder_point", msg))?;

        self.store
            .set_reorder_levels(
                product_id,
                branch_id,
                input.reorder_point,
                input.reorder_quantity,
            )
            .await
    }
}
