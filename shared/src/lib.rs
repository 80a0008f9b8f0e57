//! Shared domain core for the Branch Stock Platform
//!
//! Contains the pure inventory-ledger domain: stock level arithmetic and
//! invariants, movement types, the transfer state machine, and input
//! validation. No database or transport dependencies, so every rule here
//! is testable in isolation.

pub mod models;
pub mod types;
pub mod validation;

pub use models::*;
pub use types::*;
pub use validation::*;
