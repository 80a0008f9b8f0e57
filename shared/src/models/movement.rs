//! Movement types for the append-only stock ledger

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Kinds of quantity changes recorded in the ledger
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MovementType {
    Restock,
    AdjustmentAdd,
    AdjustmentRemove,
    Sale,
    SaleCancel,
    ServiceUse,
    TransferOut,
    TransferIn,
    /// Opening balance from data imports; never emitted by ledger operations
    Initial,
}

impl MovementType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MovementType::Restock => "restock",
            MovementType::AdjustmentAdd => "adjustment_add",
            MovementType::AdjustmentRemove => "adjustment_remove",
            MovementType::Sale => "sale",
            MovementType::SaleCancel => "sale_cancel",
            MovementType::ServiceUse => "service_use",
            MovementType::TransferOut => "transfer_out",
            MovementType::TransferIn => "transfer_in",
            MovementType::Initial => "initial",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "restock" => Some(MovementType::Restock),
            "adjustment_add" => Some(MovementType::AdjustmentAdd),
            "adjustment_remove" => Some(MovementType::AdjustmentRemove),
            "sale" => Some(MovementType::Sale),
            "sale_cancel" => Some(MovementType::SaleCancel),
            "service_use" => Some(MovementType::ServiceUse),
            "transfer_out" => Some(MovementType::TransferOut),
            "transfer_in" => Some(MovementType::TransferIn),
            "initial" => Some(MovementType::Initial),
            _ => None,
        }
    }
}

/// Originating entity of a movement, e.g. the sales order that consumed stock
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "id", rename_all = "snake_case")]
pub enum MovementReference {
    SalesOrder(Uuid),
    ServiceOrder(Uuid),
    StockTransfer(Uuid),
}

impl MovementReference {
    pub fn kind(&self) -> &'static str {
        match self {
            MovementReference::SalesOrder(_) => "sales_order",
            MovementReference::ServiceOrder(_) => "service_order",
            MovementReference::StockTransfer(_) => "stock_transfer",
        }
    }

    pub fn id(&self) -> Uuid {
        match self {
            MovementReference::SalesOrder(id)
            | MovementReference::ServiceOrder(id)
            | MovementReference::StockTransfer(id) => *id,
        }
    }

    pub fn from_parts(kind: &str, id: Uuid) -> Option<Self> {
        match kind {
            "sales_order" => Some(MovementReference::SalesOrder(id)),
            "service_order" => Some(MovementReference::ServiceOrder(id)),
            "stock_transfer" => Some(MovementReference::StockTransfer(id)),
            _ => None,
        }
    }
}
