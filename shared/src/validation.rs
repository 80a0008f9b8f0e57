//! Validation utilities for the Branch Stock Platform
//!
//! Malformed-input checks shared by the ledger services. Stock invariants
//! (non-negative quantity, reservation bounds) live with `StockLevels`;
//! these helpers only reject requests that are ill-formed before any stock
//! state is consulted.

use rust_decimal::Decimal;
use uuid::Uuid;

/// Validate a requested quantity is strictly positive
pub fn validate_quantity(qty: i64) -> Result<(), &'static str> {
    if qty <= 0 {
        return Err("Quantity must be positive");
    }
    Ok(())
}

/// Validate a signed adjustment delta is non-zero
pub fn validate_adjustment_delta(delta: i64) -> Result<(), &'static str> {
    if delta == 0 {
        return Err("Adjustment delta must be non-zero");
    }
    Ok(())
}

/// Validate an adjustment reason is present
pub fn validate_reason(reason: &str) -> Result<(), &'static str> {
    if reason.trim().is_empty() {
        return Err("Reason cannot be empty");
    }
    Ok(())
}

/// Validate an optional price is non-negative
pub fn validate_price(price: Option<Decimal>) -> Result<(), &'static str> {
    if let Some(p) = price {
        if p < Decimal::ZERO {
            return Err("Price cannot be negative");
        }
    }
    Ok(())
}

/// Validate transfer endpoints are different branches
pub fn validate_distinct_branches(from: Uuid, to: Uuid) -> Result<(), &'static str> {
    if from == to {
        return Err("Source and destination branches must differ");
    }
    Ok(())
}

/// Validate advisory reorder thresholds
pub fn validate_reorder_thresholds(point: i64, quantity: i64) -> Result<(), &'static str> {
    if point < 0 || quantity < 0 {
        return Err("Reorder thresholds cannot be negative");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quantity_must_be_positive() {
        assert!(validate_quantity(1).is_ok());
        assert!(validate_quantity(0).is_err());
        assert!(validate_quantity(-5).is_err());
    }

    #[test]
    fn delta_must_be_non_zero() {
        assert!(validate_adjustment_delta(-3).is_ok());
        assert!(validate_adjustment_delta(0).is_err());
    }

    #[test]
    fn reason_must_be_present() {
        assert!(validate_reason("damaged in storage").is_ok());
        assert!(validate_reason("   ").is_err());
    }

    #[test]
    fn branches_must_differ() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        assert!(validate_distinct_branches(a, b).is_ok());
        assert!(validate_distinct_branches(a, a).is_err());
    }

    #[test]
    fn prices_cannot_be_negative() {
        assert!(validate_price(None).is_ok());
        assert!(validate_price(Some(Decimal::from(10))).is_ok());
        assert!(validate_price(Some(Decimal::from(-1))).is_err());
    }
}
