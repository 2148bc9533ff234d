//! Owner-onboarding orders.
//!
//! An order is a user's request to become a facility owner. The four
//! sensitive fields (`venue_name`, `description`, `cnpj`, `phone`) hold
//! AES-GCM ciphertext at rest; `cnpj_digest` holds the deterministic
//! fingerprint of the plaintext tax id that uniqueness is enforced on.

use std::str::FromStr;

use common::{OrderId, UserId};
use serde::{Deserialize, Serialize};

use crate::error::StoreError;

/// Order review states.
///
/// An order starts `Pending` and is moved by an elevated actor. `Approved`
/// and `Rejected` are terminal: a user whose order reached either may file
/// a fresh one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    Pending,
    Approved,
    Rejected,
}

impl OrderStatus {
    /// Returns the string representation used for persistence.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
        }
    }

    /// Returns true if no further review happens in this status.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Approved | Self::Rejected)
    }

    /// Returns whether a status change from `self` to `to` is permitted.
    ///
    /// Every pairing is currently permitted. All status writes route
    /// through this check, so restricting the lifecycle (e.g. pending-only
    /// review, immutable terminal states) is a one-function change.
    #[must_use]
    pub const fn transition_allowed(&self, to: Self) -> bool {
        let _ = to;
        true
    }
}

impl FromStr for OrderStatus {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "approved" => Ok(Self::Approved),
            "rejected" => Ok(Self::Rejected),
            _ => Err(StoreError::Decode {
                what: "order status",
                value: s.to_string(),
            }),
        }
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A persisted owner-onboarding order.
///
/// The four string fields carry ciphertext as stored; reads that need
/// plaintext decrypt explicitly (see the domain order service).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub user_id: UserId,
    pub venue_name: String,
    pub description: String,
    pub cnpj: String,
    pub phone: String,
    pub cnpj_digest: String,
    pub status: OrderStatus,
}

/// An order not yet persisted; storage assigns the id.
#[derive(Debug, Clone)]
pub struct NewOrder {
    pub user_id: UserId,
    pub venue_name: String,
    pub description: String,
    pub cnpj: String,
    pub phone: String,
    pub cnpj_digest: String,
    pub status: OrderStatus,
}

/// The slice of an order answering "is this tax id already claimed, and by
/// whom" without materialising the encrypted record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaxIdClaim {
    pub cnpj_digest: String,
    pub user_id: UserId,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_string_roundtrip() {
        for status in [
            OrderStatus::Pending,
            OrderStatus::Approved,
            OrderStatus::Rejected,
        ] {
            assert_eq!(status.as_str().parse::<OrderStatus>().unwrap(), status);
        }
    }

    #[test]
    fn unknown_status_fails_to_parse() {
        assert!("archived".parse::<OrderStatus>().is_err());
    }

    #[test]
    fn terminal_statuses() {
        assert!(!OrderStatus::Pending.is_terminal());
        assert!(OrderStatus::Approved.is_terminal());
        assert!(OrderStatus::Rejected.is_terminal());
    }

    #[test]
    fn all_transitions_currently_permitted() {
        let all = [
            OrderStatus::Pending,
            OrderStatus::Approved,
            OrderStatus::Rejected,
        ];
        for from in all {
            for to in all {
                assert!(from.transition_allowed(to));
            }
        }
    }
}
