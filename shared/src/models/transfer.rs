//! Inter-branch transfer state machine

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Status of an inter-branch stock transfer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransferStatus {
    Pending,
    InTransit,
    Completed,
    Cancelled,
}

/// Attempted status change not permitted from the current state
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid transfer transition: {current} -> {requested}")]
pub struct InvalidTransition {
    pub current: TransferStatus,
    pub requested: TransferStatus,
}

impl TransferStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransferStatus::Pending => "pending",
            TransferStatus::InTransit => "in_transit",
            TransferStatus::Completed => "completed",
            TransferStatus::Cancelled => "cancelled",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(TransferStatus::Pending),
            "in_transit" => Some(TransferStatus::InTransit),
            "completed" => Some(TransferStatus::Completed),
            "cancelled" => Some(TransferStatus::Cancelled),
            _ => None,
        }
    }

    /// Completed and cancelled transfers accept no further transitions
    pub fn is_terminal(&self) -> bool {
        matches!(self, TransferStatus::Completed | TransferStatus::Cancelled)
    }

    /// Whether the state machine permits `self -> requested`
    pub fn can_transition_to(&self, requested: TransferStatus) -> bool {
        matches!(
            (self, requested),
            (TransferStatus::Pending, TransferStatus::InTransit)
                | (TransferStatus::Pending, TransferStatus::Cancelled)
                | (TransferStatus::InTransit, TransferStatus::Completed)
                | (TransferStatus::InTransit, TransferStatus::Cancelled)
        )
    }

    /// Validate a transition, returning both states on failure so callers can
    /// render a precise error
    pub fn validate_transition(&self, requested: TransferStatus) -> Result<(), InvalidTransition> {
        if self.can_transition_to(requested) {
            Ok(())
        } else {
            Err(InvalidTransition {
                current: *self,
                requested,
            })
        }
    }
}

impl std::fmt::Display for TransferStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [TransferStatus; 4] = [
        TransferStatus::Pending,
        TransferStatus::InTransit,
        TransferStatus::Completed,
        TransferStatus::Cancelled,
    ];

    #[test]
    fn pending_can_ship_or_cancel() {
        assert!(TransferStatus::Pending.can_transition_to(TransferStatus::InTransit));
        assert!(TransferStatus::Pending.can_transition_to(TransferStatus::Cancelled));
        assert!(!TransferStatus::Pending.can_transition_to(TransferStatus::Completed));
    }

    #[test]
    fn in_transit_can_complete_or_cancel() {
        assert!(TransferStatus::InTransit.can_transition_to(TransferStatus::Completed));
        assert!(TransferStatus::InTransit.can_transition_to(TransferStatus::Cancelled));
        assert!(!TransferStatus::InTransit.can_transition_to(TransferStatus::Pending));
    }

    #[test]
    fn terminal_states_accept_nothing() {
        for terminal in [TransferStatus::Completed, TransferStatus::Cancelled] {
            assert!(terminal.is_terminal());
            for requested in ALL {
                let err = terminal.validate_transition(requested).unwrap_err();
                assert_eq!(err.current, terminal);
                assert_eq!(err.requested, requested);
            }
        }
    }

    #[test]
    fn status_string_mapping_is_stable() {
        for s in ALL {
            assert_eq!(TransferStatus::from_str(s.as_str()), Some(s));
        }
        assert_eq!(TransferStatus::from_str("shipped"), None);
    }
}
