//! Domain error taxonomy.
//!
//! Every failure here is a semantic invariant violation, not a transient
//! fault: nothing is retried or recovered internally, and the transport
//! layer maps each variant to its response verbatim.

use common::{OrderId, UserId};
use crypto::CryptoError;
use store::StoreError;
use thiserror::Error;

/// Errors raised by the lifecycle services and the reservation policy.
#[derive(Debug, Error)]
pub enum DomainError {
    /// The acting or subject user does not exist.
    #[error("user not found: {0}")]
    UserNotFound(UserId),

    /// The acting user lacks the elevated role the operation requires.
    #[error("access denied for user {0}")]
    AccessDenied(UserId),

    /// The tax id is already claimed by an existing order.
    #[error("an order already exists for this tax id")]
    DuplicateTaxId,

    /// The user already has an order under review.
    #[error("user {0} already has an order in progress")]
    DuplicateOrder(UserId),

    /// The order does not exist.
    #[error("order not found: {0}")]
    OrderNotFound(OrderId),

    /// No orders have been recorded at all.
    #[error("no orders recorded")]
    NoOrdersFound,

    /// The user has no prior tickets to inspect.
    #[error("user {0} has no ticket history")]
    NoTicketHistory(UserId),

    /// The user already has an open ticket.
    #[error("user {0} already has an open ticket")]
    OpenTicketExists(UserId),

    /// No ticket matches the lookup, whether by id or by user.
    #[error("ticket not found")]
    TicketNotFound,

    /// The user already holds an unexpired, paid reservation.
    #[error("user {0} already holds an active confirmed reservation")]
    ActiveReservationExists(UserId),

    /// The requested window runs past the facility closing boundary.
    #[error("requested window ends at {requested_end}, past the closing boundary {boundary}")]
    ReservationExceedsClosingTime {
        requested_end: chrono::DateTime<chrono::Utc>,
        boundary: chrono::DateTime<chrono::Utc>,
    },

    /// The requested status change is not permitted by the lifecycle rules.
    #[error("status change from {from} to {to} is not allowed")]
    InvalidStatusTransition {
        from: &'static str,
        to: &'static str,
    },

    /// The persistence layer failed, uniqueness violations included.
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// Field encryption or decryption failed.
    #[error("crypto error: {0}")]
    Crypto(#[from] CryptoError),
}

/// Result type for domain operations.
pub type Result<T> = std::result::Result<T, DomainError>;
