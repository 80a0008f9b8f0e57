//! Inter-branch transfer tests
//!
//! Tests for the transfer workflow including:
//! - State machine transitions and terminal states
//! - Quantity conservation across the source, destination and in-flight leg
//! - Cancellation from both non-terminal states

use proptest::prelude::*;
use shared::{StockLevels, TransferStatus};

/// Two branches plus the in-flight leg of one transfer, driven through the
/// same level transitions the services use
#[derive(Debug, Clone, Copy)]
struct TransferSim {
    source: StockLevels,
    destination: StockLevels,
    in_flight: i64,
    status: TransferStatus,
    quantity: i64,
}

impl TransferSim {
    fn create(source: StockLevels, destination: StockLevels, quantity: i64) -> Option<Self> {
        let source = source.reserve(quantity).ok()?;
        Some(Self {
            source,
            destination,
            in_flight: 0,
            status: TransferStatus::Pending,
            quantity,
        })
    }

    fn ship(mut self) -> Option<Self> {
        self.status.validate_transition(TransferStatus::InTransit).ok()?;
        self.source = self.source.commit(self.quantity).ok()?;
        self.in_flight = self.quantity;
        self.status = TransferStatus::InTransit;
        Some(self)
    }

    fn complete(mut self) -> Option<Self> {
        self.status.validate_transition(TransferStatus::Completed).ok()?;
        self.destination = self.destination.restock(self.quantity).ok()?;
        self.in_flight = 0;
        self.status = TransferStatus::Completed;
        Some(self)
    }

    fn cancel(mut self) -> Option<Self> {
        self.status.validate_transition(TransferStatus::Cancelled).ok()?;
        match self.status {
            TransferStatus::Pending => {
                self.source = self.source.release(self.quantity).ok()?;
            }
            TransferStatus::InTransit => {
                self.source = self.source.restock(self.quantity).ok()?;
                self.in_flight = 0;
            }
            _ => return None,
        }
        self.status = TransferStatus::Cancelled;
        Some(self)
    }

    fn total(&self) -> i64 {
        self.source.quantity + self.destination.quantity + self.in_flight
    }
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod unit_tests {
    use super::*;

    /// Test the happy path: create, ship, complete
    #[test]
    fn test_full_transfer_flow() {
        let source = StockLevels::new(20, 0).unwrap();
        let destination = StockLevels::empty();

        let sim = TransferSim::create(source, destination, 5).unwrap();
        assert_eq!(sim.status, TransferStatus::Pending);
        assert_eq!(sim.source.available(), 15);
        assert_eq!(sim.source.quantity, 20);

        let sim = sim.ship().unwrap();
        assert_eq!(sim.status, TransferStatus::InTransit);
        assert_eq!(sim.source.quantity, 15);
        assert_eq!(sim.in_flight, 5);
        assert_eq!(sim.destination.quantity, 0);

        let sim = sim.complete().unwrap();
        assert_eq!(sim.status, TransferStatus::Completed);
        assert_eq!(sim.destination.quantity, 5);
        assert_eq!(sim.in_flight, 0);
        assert_eq!(sim.total(), 20);
    }

    /// Test that creation fails without enough available quantity
    #[test]
    fn test_create_requires_available() {
        let source = StockLevels::new(10, 8).unwrap();
        assert!(TransferSim::create(source, StockLevels::empty(), 3).is_none());
        assert!(TransferSim::create(source, StockLevels::empty(), 2).is_some());
    }

    /// Test cancelling before shipment: the reservation comes back, no
    /// quantity moved
    #[test]
    fn test_cancel_pending() {
        let source = StockLevels::new(20, 0).unwrap();
        let sim = TransferSim::create(source, StockLevels::empty(), 5).unwrap();

        let sim = sim.cancel().unwrap();
        assert_eq!(sim.status, TransferStatus::Cancelled);
        assert_eq!(sim.source, source);
        assert_eq!(sim.total(), 20);
    }

    /// Test cancelling in transit: the source is credited back
    #[test]
    fn test_cancel_in_transit() {
        let source = StockLevels::new(20, 0).unwrap();
        let sim = TransferSim::create(source, StockLevels::empty(), 5)
            .unwrap()
            .ship()
            .unwrap();

        let sim = sim.cancel().unwrap();
        assert_eq!(sim.status, TransferStatus::Cancelled);
        assert_eq!(sim.source.quantity, 20);
        assert_eq!(sim.in_flight, 0);
        assert_eq!(sim.total(), 20);
    }

    /// Test that completed transfers accept no further transitions
    #[test]
    fn test_completed_is_terminal() {
        let source = StockLevels::new(20, 0).unwrap();
        let sim = TransferSim::create(source, StockLevels::empty(), 5)
            .unwrap()
            .ship()
            .unwrap()
            .complete()
            .unwrap();

        assert!(sim.cancel().is_none());
        assert!(sim.ship().is_none());
        assert!(sim.complete().is_none());
    }

    /// Test that a pending transfer cannot skip straight to completed
    #[test]
    fn test_no_skipping_in_transit() {
        let source = StockLevels::new(20, 0).unwrap();
        let sim = TransferSim::create(source, StockLevels::empty(), 5).unwrap();
        assert!(sim.complete().is_none());
    }

    /// Test that racing transitions have a single winner: once cancel claims
    /// a pending transfer, ship finds no pending row and changes nothing
    #[test]
    fn test_cancel_wins_race_blocks_ship() {
        let source = StockLevels::new(20, 0).unwrap();
        let sim = TransferSim::create(source, StockLevels::empty(), 5).unwrap();

        let cancelled = sim.cancel().unwrap();
        assert!(cancelled.ship().is_none());

        // The losing ship never debited, so no compensation was owed and
        // the source holds exactly its original quantity
        assert_eq!(cancelled.source, source);
        assert_eq!(cancelled.total(), 20);
    }

    /// Test that compensation is pinned to the claimed prior status: a
    /// cancel that won from pending releases only the reservation, while a
    /// cancel that won from in_transit credits back exactly the debit
    #[test]
    fn test_compensation_matches_claimed_status() {
        let source = StockLevels::new(20, 0).unwrap();

        let pending = TransferSim::create(source, StockLevels::empty(), 5).unwrap();
        let from_pending = pending.cancel().unwrap();
        assert_eq!(from_pending.source.quantity, 20);
        assert_eq!(from_pending.source.reserved, 0);

        let shipped = pending.ship().unwrap();
        assert_eq!(shipped.source.quantity, 15);
        let from_in_transit = shipped.cancel().unwrap();
        assert_eq!(from_in_transit.source.quantity, 20);
        assert_eq!(from_in_transit.total(), 20);

        // Cancelling twice cannot credit twice
        assert!(from_in_transit.cancel().is_none());
    }

    /// Test that in-flight quantity is owned by neither branch
    #[test]
    fn test_in_flight_ownership_gap() {
        let source = StockLevels::new(20, 0).unwrap();
        let sim = TransferSim::create(source, StockLevels::empty(), 5)
            .unwrap()
            .ship()
            .unwrap();

        assert_eq!(sim.source.quantity + sim.destination.quantity, 15);
        assert_eq!(sim.total(), 20);
    }
}

// ============================================================================
// Property-Based Tests
// ============================================================================

#[cfg(test)]
mod property_tests {
    use super::*;

    /// Strategy for a sequence of transition attempts
    fn transition_strategy() -> impl Strategy<Value = Vec<u8>> {
        prop::collection::vec(0u8..3, 1..8)
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(200))]

        /// Property: total quantity across source, destination and the
        /// in-flight leg is conserved by every permitted transition
        #[test]
        fn prop_transfer_conserves_quantity(
            source_qty in 1i64..500,
            dest_qty in 0i64..500,
            transfer_qty in 1i64..500,
            transitions in transition_strategy()
        ) {
            let source = StockLevels::new(source_qty, 0).unwrap();
            let destination = StockLevels::new(dest_qty, 0).unwrap();

            let Some(mut sim) = TransferSim::create(source, destination, transfer_qty) else {
                prop_assert!(transfer_qty > source_qty);
                return Ok(());
            };
            let total = sim.total();
            prop_assert_eq!(total, source_qty + dest_qty);

            for t in transitions {
                let attempted = match t {
                    0 => sim.ship(),
                    1 => sim.complete(),
                    _ => sim.cancel(),
                };
                if let Some(next) = attempted {
                    sim = next;
                }
                prop_assert_eq!(sim.total(), total);
                prop_assert!(sim.source.check().is_ok());
                prop_assert!(sim.destination.check().is_ok());
            }
        }

        /// Property: once terminal, the simulation state never changes again
        #[test]
        fn prop_terminal_states_are_absorbing(
            source_qty in 1i64..100,
            transitions in transition_strategy()
        ) {
            let source = StockLevels::new(source_qty, 0).unwrap();
            let Some(mut sim) = TransferSim::create(source, StockLevels::empty(), source_qty) else {
                return Ok(());
            };

            for t in transitions {
                if sim.status.is_terminal() {
                    let attempted = match t {
                        0 => sim.ship(),
                        1 => sim.complete(),
                        _ => sim.cancel(),
                    };
                    prop_assert!(attempted.is_none());
                } else if let Some(next) = match t {
                    0 => sim.ship(),
                    1 => sim.complete(),
                    _ => sim.cancel(),
                } {
                    sim = next;
                }
            }
        }
    }
}
