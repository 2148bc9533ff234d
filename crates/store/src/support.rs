//! Support tickets.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use common::{TicketId, UserId};
use serde::{Deserialize, Serialize};

use crate::error::StoreError;

/// Ticket workflow states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TicketStatus {
    Open,
    InProgress,
    Closed,
}

impl TicketStatus {
    /// Returns the string representation used for persistence.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::InProgress => "in_progress",
            Self::Closed => "closed",
        }
    }

    /// Returns whether a status change from `self` to `to` is permitted.
    ///
    /// Every pairing is currently permitted, reopening closed tickets
    /// included. All status writes route through this check, so a stricter
    /// workflow (open → in-progress → closed) is a one-function change.
    #[must_use]
    pub const fn transition_allowed(&self, to: Self) -> bool {
        let _ = to;
        true
    }
}

impl FromStr for TicketStatus {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "open" => Ok(Self::Open),
            "in_progress" => Ok(Self::InProgress),
            "closed" => Ok(Self::Closed),
            _ => Err(StoreError::Decode {
                what: "ticket status",
                value: s.to_string(),
            }),
        }
    }
}

impl std::fmt::Display for TicketStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A persisted support ticket.
///
/// `user_email` is captured once at creation from the resolved user, not
/// re-derived on later reads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Support {
    pub id: TicketId,
    pub user_id: UserId,
    pub user_email: String,
    pub subject: String,
    pub message: String,
    pub status: TicketStatus,
    pub created_at: DateTime<Utc>,
}

/// A ticket not yet persisted; storage assigns the id and `created_at`.
#[derive(Debug, Clone)]
pub struct NewTicket {
    pub user_id: UserId,
    pub user_email: String,
    pub subject: String,
    pub message: String,
    pub status: TicketStatus,
}
