//! Repository traits consumed by the domain services.
//!
//! Implementations must be thread-safe (`Send + Sync`) and hold no business
//! rules: they look up, insert, and update records. The one semantic they
//! do own is the authoritative uniqueness constraints (tax-id digest, one
//! pending order per user), surfaced as
//! [`StoreError::UniqueViolation`](crate::StoreError::UniqueViolation).

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use common::{OrderId, TicketId, UserId};

use crate::Result;
use crate::order::{NewOrder, Order, OrderStatus, TaxIdClaim};
use crate::reservation::{NewReservation, Reservation};
use crate::support::{NewTicket, Support, TicketStatus};
use crate::user::{NewUser, User};

/// Lookup of platform users as resolved by the identity layer.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Persists a user, assigning its id.
    async fn create(&self, user: NewUser) -> Result<User>;

    /// Finds a user by id.
    async fn find_by_id(&self, id: UserId) -> Result<Option<User>>;

    /// Finds a user by email address.
    async fn find_by_email(&self, email: &str) -> Result<Option<User>>;
}

/// Persistence for owner-onboarding orders.
#[async_trait]
pub trait OrderStore: Send + Sync {
    /// Persists an order, assigning its id.
    ///
    /// Fails with a unique violation if the tax-id digest is already
    /// claimed or the user already has a pending order.
    async fn create(&self, order: NewOrder) -> Result<Order>;

    /// Answers whether the given plaintext tax id is already claimed.
    ///
    /// Implementations fingerprint the input and match on the stored
    /// digest; the caller-supplied value is never encrypted for this
    /// lookup.
    async fn find_by_cnpj(&self, cnpj: &str) -> Result<Option<TaxIdClaim>>;

    /// Finds the user's most recent order, if any.
    async fn find_by_user(&self, user_id: UserId) -> Result<Option<Order>>;

    /// Finds an order by id.
    async fn find_by_id(&self, id: OrderId) -> Result<Option<Order>>;

    /// Returns every order.
    async fn find_all(&self) -> Result<Vec<Order>>;

    /// Updates an order's status; no other field is touched.
    async fn update_status(&self, id: OrderId, status: OrderStatus) -> Result<()>;
}

/// Persistence for support tickets.
#[async_trait]
pub trait SupportStore: Send + Sync {
    /// Persists a ticket, assigning its id and creation timestamp.
    async fn create(&self, ticket: NewTicket) -> Result<Support>;

    /// Finds the user's most recent ticket, if any.
    async fn find_latest_by_user(&self, user_id: UserId) -> Result<Option<Support>>;

    /// Returns all of the user's tickets, newest first.
    async fn find_by_user(&self, user_id: UserId) -> Result<Vec<Support>>;

    /// Finds a ticket by id.
    async fn find_by_id(&self, id: TicketId) -> Result<Option<Support>>;

    /// Returns every ticket, newest first.
    async fn find_all(&self) -> Result<Vec<Support>>;

    /// Updates a ticket's status; no other field is touched.
    async fn update_status(&self, id: TicketId, status: TicketStatus) -> Result<()>;
}

/// Read access to reservation history for admissibility checks.
#[async_trait]
pub trait ReservationStore: Send + Sync {
    /// Persists a reservation, assigning its id.
    ///
    /// Used by the external booking flow and by test seeding; the
    /// reservation policy itself never writes.
    async fn create(&self, reservation: NewReservation) -> Result<Reservation>;

    /// Returns true if the user holds a confirmed reservation whose end
    /// time is still in the future.
    async fn has_active_confirmed(&self, user_id: UserId) -> Result<bool>;

    /// Returns the end time of the user's most recent confirmed reservation
    /// that has already elapsed, if any.
    async fn last_confirmed_elapsed_end(&self, user_id: UserId) -> Result<Option<DateTime<Utc>>>;
}
