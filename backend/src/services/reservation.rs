//! Reservation manager: claims against future consumption
//!
//! A reservation holds quantity for an order without changing physical
//! stock, so reserving and releasing emit no ledger movement. Only `commit`
//! converts a claim into a permanent deduction, and only `restore` gives a
//! committed deduction back.

use serde::Deserialize;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::services::movement::NewMovement;
use crate::services::stock::{StockMutation, StockRecord, StockStore};
use shared::{validate_quantity, MovementReference, MovementType};

/// Reservation manager over the stock record store
#[derive(Clone)]
pub struct ReservationService {
    store: StockStore,
}

/// Input for reserving or releasing quantity
#[derive(Debug, Deserialize)]
pub struct ReservationInput {
    pub product_id: Uuid,
    pub branch_id: Uuid,
    pub quantity: i64,
}

/// Input for committing a reservation on order completion
#[derive(Debug, Deserialize)]
pub struct CommitInput {
    pub product_id: Uuid,
    pub branch_id: Uuid,
    pub quantity: i64,
    pub reference: MovementReference,
    pub performed_by: Uuid,
}

/// Input for restoring committed quantity after an order is cancelled
#[derive(Debug, Deserialize)]
pub struct RestoreInput {
    pub product_id: Uuid,
    pub branch_id: Uuid,
    pub quantity: i64,
    pub reference: MovementReference,
    pub performed_by: Uuid,
}

impl ReservationService {
    /// Create a new ReservationService instance
    pub fn new(store: StockStore) -> Self {
        Self { store }
    }

    /// Reserve quantity against a stock record.
    /// Availability is checked inside the locked mutation, not as a separate
    /// read, so concurrent reservations cannot overcommit.
    pub async fn reserve(
        &self,
        product_id: Uuid,
        branch_id: Uuid,
        quantity: i64,
    ) -> AppResult<StockRecord> {
        validate_quantity(quantity).map_err(|msg| AppError::validation("quantity", msg))?;

        self.store
            .mutate(product_id, branch_id, |record| {
                let levels = record.levels().reserve(quantity)?;
                Ok(StockMutation::levels(levels))
            })
            .await
    }

    /// Give a reservation back, e.g. when an order is cancelled before
    /// fulfillment. No movement: nothing was ever deducted.
    pub async fn release(
        &self,
        product_id: Uuid,
        branch_id: Uuid,
        quantity: i64,
    ) -> AppResult<StockRecord> {
        validate_quantity(quantity).map_err(|msg| AppError::validation("quantity", msg))?;

        self.store
            .mutate(product_id, branch_id, |record| {
                let levels = record.levels().release(quantity)?;
                Ok(StockMutation::levels(levels))
            })
            .await
    }

    /// Convert a reservation into a permanent deduction on order completion.
    /// Emits `sale` for sales-order references and `service_use` for
    /// service-order references. Commit quantity may not exceed the
    /// outstanding reserved quantity.
    pub async fn commit(&self, input: CommitInput) -> AppResult<StockRecord> {
        validate_quantity(input.quantity).map_err(|msg| AppError::validation("quantity", msg))?;
        let movement_type = Self::consumption_type(&input.reference)?;

        self.store
            .mutate(input.product_id, input.branch_id, |record| {
                let levels = record.levels().commit(input.quantity)?;
                Ok(StockMutation::levels(levels).with_movement(NewMovement {
                    movement_type,
                    reason: None,
                    reference: Some(input.reference),
                    performed_by: input.performed_by,
                }))
            })
            .await
    }

    /// Re-credit quantity after a committed order is cancelled or refunded,
    /// emitting a `sale_cancel` movement
    pub async fn restore(&self, input: RestoreInput) -> AppResult<StockRecord> {
        validate_quantity(input.quantity).map_err(|msg| AppError::validation("quantity", msg))?;
        // Restore only applies to order-driven deductions
        Self::consumption_type(&input.reference)?;

        self.store
            .mutate(input.product_id, input.branch_id, |record| {
                let levels = record.levels().restock(input.quantity)?;
                Ok(StockMutation::levels(levels).with_movement(NewMovement {
                    movement_type: MovementType::SaleCancel,
                    reason: None,
                    reference: Some(input.reference),
                    performed_by: input.performed_by,
                }))
            })
            .await
    }

    fn consumption_type(reference: &MovementReference) -> AppResult<MovementType> {
        match reference {
            MovementReference::SalesOrder(_) => Ok(MovementType::Sale),
            MovementReference::ServiceOrder(_) => Ok(MovementType::ServiceUse),
            MovementReference::StockTransfer(_) => Err(AppError::validation(
                "reference",
                "Transfers move stock through the transfer workflow, not reservations",
            )),
        }
    }
}
