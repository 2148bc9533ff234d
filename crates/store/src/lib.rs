//! Persistence layer for the booking core.
//!
//! Defines the entity records, the repository traits consumed by the domain
//! services, and two interchangeable implementations: an in-memory store for
//! tests and a PostgreSQL store for production. The repositories hold no
//! business semantics; invariants the domain pre-checks optimistically are
//! enforced authoritatively here through uniqueness constraints.

pub mod error;
pub mod memory;
pub mod order;
pub mod postgres;
pub mod reservation;
pub mod store;
pub mod support;
pub mod user;

pub use error::{Result, StoreError};
pub use memory::{
    InMemoryOrderStore, InMemoryReservationStore, InMemorySupportStore, InMemoryUserStore,
};
pub use order::{NewOrder, Order, OrderStatus, TaxIdClaim};
pub use postgres::PostgresStore;
pub use reservation::{NewReservation, PaymentStatus, Reservation};
pub use store::{OrderStore, ReservationStore, SupportStore, UserStore};
pub use support::{NewTicket, Support, TicketStatus};
pub use user::{NewUser, Role, User};
