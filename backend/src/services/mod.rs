pub mod adjustment;
pub mod low_stock;
pub mod movement;
pub mod reservation;
pub mod stock;
pub mod transfer;

pub use adjustment::AdjustmentService;
pub use low_stock::LowStockService;
pub use movement::MovementLedger;
pub use reservation::ReservationService;
pub use stock::StockStore;
pub use transfer::TransferService;
