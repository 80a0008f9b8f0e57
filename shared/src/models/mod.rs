//! Domain models for the Branch Stock Platform

mod movement;
mod stock;
mod transfer;

pub use movement::*;
pub use stock::*;
pub use transfer::*;
