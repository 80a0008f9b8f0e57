//! Stock level tests
//!
//! Tests for stock records and reservations including:
//! - Non-negative quantity and reservation bounds
//! - Reservation lifecycle (reserve, release, commit, restore)
//! - Adjustment guard against outstanding reservations

use proptest::prelude::*;
use shared::{StockError, StockLevels};

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod unit_tests {
    use super::*;

    /// Test the full sale flow: reserve at order placement, commit at
    /// completion
    #[test]
    fn test_sale_flow() {
        let stocked = StockLevels::new(50, 0).unwrap();

        let reserved = stocked.reserve(3).unwrap();
        assert_eq!(reserved.quantity, 50);
        assert_eq!(reserved.reserved, 3);
        assert_eq!(reserved.available(), 47);

        let committed = reserved.commit(3).unwrap();
        assert_eq!(committed.quantity, 47);
        assert_eq!(committed.reserved, 0);
        assert_eq!(committed.available(), 47);
    }

    /// Test that a cancelled order releases its claim without moving stock
    #[test]
    fn test_release_restores_availability() {
        let reserved = StockLevels::new(50, 3).unwrap();
        let released = reserved.release(3).unwrap();

        assert_eq!(released.quantity, 50);
        assert_eq!(released.available(), 50);
    }

    /// Test restore after a committed sale is cancelled
    #[test]
    fn test_restore_after_committed_sale() {
        let after_sale = StockLevels::new(47, 0).unwrap();
        let restored = after_sale.restock(3).unwrap();

        assert_eq!(restored.quantity, 50);
        assert_eq!(restored.reserved, 0);
    }

    /// Test reservation rejection when available is too low
    #[test]
    fn test_insufficient_available() {
        let levels = StockLevels::new(10, 8).unwrap();

        let err = levels.reserve(3).unwrap_err();
        assert_eq!(
            err,
            StockError::InsufficientAvailable {
                requested: 3,
                available: 2
            }
        );

        // The boundary case still succeeds
        assert!(levels.reserve(2).is_ok());
    }

    /// Test that reserved stock is not sellable twice
    #[test]
    fn test_reserved_blocks_further_claims() {
        let levels = StockLevels::new(5, 0).unwrap();
        let first = levels.reserve(5).unwrap();

        assert_eq!(first.available(), 0);
        assert!(first.reserve(1).is_err());
    }

    /// Test that a negative adjustment cannot undercut reservations
    #[test]
    fn test_adjustment_respects_reservations() {
        let levels = StockLevels::new(10, 6).unwrap();

        // Removing 5 would leave quantity 5 below the 6 reserved
        assert!(matches!(
            levels.adjust(-5),
            Err(StockError::InvariantViolation { .. })
        ));

        let corrected = levels.adjust(-4).unwrap();
        assert_eq!(corrected.quantity, 6);
        assert_eq!(corrected.reserved, 6);
        assert_eq!(corrected.available(), 0);
    }

    /// Test that quantity can never go negative
    #[test]
    fn test_quantity_floor() {
        let levels = StockLevels::new(3, 0).unwrap();
        assert!(levels.adjust(-4).is_err());
        assert!(levels.adjust(-3).is_ok());
    }

    /// Test construction bounds
    #[test]
    fn test_construction_bounds() {
        assert!(StockLevels::new(-1, 0).is_err());
        assert!(StockLevels::new(5, -1).is_err());
        assert!(StockLevels::new(5, 6).is_err());
        assert!(StockLevels::new(0, 0).is_ok());
        assert!(StockLevels::new(5, 5).is_ok());
    }

    /// Test that a fresh record starts empty
    #[test]
    fn test_empty_record() {
        let levels = StockLevels::empty();
        assert_eq!(levels.quantity, 0);
        assert_eq!(levels.reserved, 0);
        assert_eq!(levels.available(), 0);
    }

    /// Test commit beyond outstanding reservations
    #[test]
    fn test_commit_bounded_by_reserved() {
        let levels = StockLevels::new(10, 2).unwrap();
        // Committing 3 would drive reserved to -1
        assert!(levels.commit(3).is_err());
        assert!(levels.commit(2).is_ok());
    }
}

// ============================================================================
// Property-Based Tests
// ============================================================================

#[cfg(test)]
mod property_tests {
    use super::*;

    /// Strategy for an operation tag and quantity
    fn op_strategy() -> impl Strategy<Value = (u8, i64)> {
        (0u8..5, 1i64..200)
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(200))]

        /// Property: no sequence of operations can break the level invariants
        #[test]
        fn prop_invariants_hold_under_any_sequence(
            start in 0i64..500,
            ops in prop::collection::vec(op_strategy(), 1..60)
        ) {
            let mut levels = StockLevels::new(start, 0).unwrap();
            for (op, qty) in ops {
                let attempted = match op {
                    0 => levels.reserve(qty),
                    1 => levels.release(qty),
                    2 => levels.commit(qty),
                    3 => levels.restock(qty),
                    _ => levels.adjust(if qty % 2 == 0 { qty } else { -qty }),
                };
                if let Ok(next) = attempted {
                    levels = next;
                }
                prop_assert!(levels.quantity >= 0);
                prop_assert!(levels.reserved >= 0);
                prop_assert!(levels.reserved <= levels.quantity);
            }
        }

        /// Property: reserve then release is an identity on the levels
        #[test]
        fn prop_reserve_release_roundtrip(
            quantity in 0i64..1000,
            reserved in 0i64..1000,
            qty in 1i64..100
        ) {
            prop_assume!(reserved <= quantity);
            let levels = StockLevels::new(quantity, reserved).unwrap();
            if let Ok(held) = levels.reserve(qty) {
                prop_assert_eq!(held.release(qty).unwrap(), levels);
            }
        }

        /// Property: reservations never change physical quantity
        #[test]
        fn prop_reservations_do_not_move_stock(
            quantity in 0i64..1000,
            qty in 1i64..100
        ) {
            let levels = StockLevels::new(quantity, 0).unwrap();
            if let Ok(held) = levels.reserve(qty) {
                prop_assert_eq!(held.quantity, quantity);
            }
        }

        /// Property: a failed transition leaves nothing behind (transitions
        /// return new values, the original is untouched)
        #[test]
        fn prop_failure_is_total(
            quantity in 0i64..50,
            reserved in 0i64..50,
            qty in 1i64..100
        ) {
            prop_assume!(reserved <= quantity);
            let levels = StockLevels::new(quantity, reserved).unwrap();
            let snapshot = levels;
            let _ = levels.reserve(qty);
            let _ = levels.commit(qty);
            let _ = levels.adjust(-qty);
            prop_assert_eq!(levels, snapshot);
        }
    }
}
