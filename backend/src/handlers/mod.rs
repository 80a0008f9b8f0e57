pub mod health;
pub mod movements;
pub mod reports;
pub mod stock;
pub mod transfers;

pub use health::*;
pub use movements::*;
pub use reports::*;
pub use stock::*;
pub use transfers::*;
