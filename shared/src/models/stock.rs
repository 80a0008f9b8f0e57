//! Stock level arithmetic and invariants
//!
//! `StockLevels` is the pure core of a stock record: on-hand quantity plus
//! reserved quantity for one (product, branch) pair. Every ledger operation
//! is expressed as a transition on this pair, and every transition re-checks
//! the invariants `quantity >= 0` and `0 <= reserved <= quantity`.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Failures raised by stock level transitions
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StockError {
    #[error("insufficient available stock: requested {requested}, available {available}")]
    InsufficientAvailable { requested: i64, available: i64 },

    #[error("stock invariants violated: quantity {quantity}, reserved {reserved}")]
    InvariantViolation { quantity: i64, reserved: i64 },
}

/// On-hand and reserved quantity for a single stock record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockLevels {
    pub quantity: i64,
    pub reserved: i64,
}

impl StockLevels {
    /// Build levels, rejecting out-of-bounds values
    pub fn new(quantity: i64, reserved: i64) -> Result<Self, StockError> {
        let levels = Self { quantity, reserved };
        levels.check()?;
        Ok(levels)
    }

    /// Empty record levels, used when a (product, branch) pair is first touched
    pub fn empty() -> Self {
        Self {
            quantity: 0,
            reserved: 0,
        }
    }

    /// Sellable/transferable amount: quantity minus reserved.
    /// Always recomputed, never stored.
    pub fn available(&self) -> i64 {
        self.quantity - self.reserved
    }

    /// Verify `quantity >= 0` and `0 <= reserved <= quantity`
    pub fn check(&self) -> Result<(), StockError> {
        if self.quantity < 0 || self.reserved < 0 || self.reserved > self.quantity {
            return Err(StockError::InvariantViolation {
                quantity: self.quantity,
                reserved: self.reserved,
            });
        }
        Ok(())
    }

    /// Claim quantity against future consumption without moving stock
    pub fn reserve(&self, qty: i64) -> Result<Self, StockError> {
        if self.available() < qty {
            return Err(StockError::InsufficientAvailable {
                requested: qty,
                available: self.available(),
            });
        }
        Self::new(self.quantity, self.reserved + qty)
    }

    /// Give a claim back, e.g. when an order is cancelled before fulfillment
    pub fn release(&self, qty: i64) -> Result<Self, StockError> {
        Self::new(self.quantity, self.reserved - qty)
    }

    /// Convert a claim into a permanent deduction
    pub fn commit(&self, qty: i64) -> Result<Self, StockError> {
        Self::new(self.quantity - qty, self.reserved - qty)
    }

    /// Add physical stock
    pub fn restock(&self, qty: i64) -> Result<Self, StockError> {
        Self::new(self.quantity + qty, self.reserved)
    }

    /// Apply a signed correction to on-hand quantity.
    /// Never touches reserved, so a removal that would undercut outstanding
    /// reservations is rejected by the `reserved <= quantity` check.
    pub fn adjust(&self, delta: i64) -> Result<Self, StockError> {
        Self::new(self.quantity + delta, self.reserved)
    }

    /// Whether available stock has fallen to or below the advisory reorder
    /// point. A zero threshold still matches once nothing is left to sell.
    pub fn needs_reorder(&self, reorder_point: i64) -> bool {
        self.available() <= reorder_point
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn available_is_quantity_minus_reserved() {
        let levels = StockLevels::new(50, 10).unwrap();
        assert_eq!(levels.available(), 40);
    }

    #[test]
    fn reserve_fails_beyond_available() {
        let levels = StockLevels::new(50, 10).unwrap();
        let err = levels.reserve(45).unwrap_err();
        assert_eq!(
            err,
            StockError::InsufficientAvailable {
                requested: 45,
                available: 40
            }
        );
    }

    #[test]
    fn release_below_zero_is_invariant_violation() {
        let levels = StockLevels::new(10, 2).unwrap();
        assert!(matches!(
            levels.release(3),
            Err(StockError::InvariantViolation { .. })
        ));
    }

    #[test]
    fn adjust_cannot_undercut_reservations() {
        let levels = StockLevels::new(10, 6).unwrap();
        // quantity would drop to 5 while 6 units are still reserved
        assert!(levels.adjust(-5).is_err());
        assert!(levels.adjust(-4).is_ok());
    }

    #[test]
    fn reorder_threshold_counts_reserved_stock() {
        let levels = StockLevels::new(10, 8).unwrap();
        assert!(levels.needs_reorder(2));
        assert!(!levels.needs_reorder(1));
    }

    #[test]
    fn zero_reorder_point_matches_when_sold_out() {
        assert!(StockLevels::empty().needs_reorder(0));
        assert!(StockLevels::new(5, 5).unwrap().needs_reorder(0));
        assert!(!StockLevels::new(5, 4).unwrap().needs_reorder(0));
    }

    proptest! {
        /// Any sequence of successful transitions keeps the invariants
        #[test]
        fn prop_transitions_preserve_invariants(
            start in 0i64..1000,
            ops in prop::collection::vec((0u8..5, 1i64..100), 1..40)
        ) {
            let mut levels = StockLevels::new(start, 0).unwrap();
            for (op, qty) in ops {
                let next = match op {
                    0 => levels.reserve(qty),
                    1 => levels.release(qty),
                    2 => levels.commit(qty),
                    3 => levels.restock(qty),
                    _ => levels.adjust(-qty),
                };
                if let Ok(next) = next {
                    levels = next;
                }
                prop_assert!(levels.check().is_ok());
                prop_assert_eq!(levels.available(), levels.quantity - levels.reserved);
            }
        }
    }
}
