//! Business rules for the booking core.
//!
//! Three services own every rule that goes beyond storage pass-through:
//!
//! - [`OrderService`]: owner-onboarding orders, with uniqueness pre-checks,
//!   field encryption, and role-gated listing and review.
//! - [`SupportService`]: support tickets, with creation guards and
//!   role-gated status updates.
//! - [`ReservationPolicy`]: whether a requested reservation window is
//!   admissible given the user's history and facility hours.
//!
//! Each service composes repository lookups and issues at most one mutating
//! call per operation. The pre-checks are an optimistic fast-path; the
//! store's uniqueness constraints stay the authoritative arbiter under
//! concurrent callers.

pub mod error;
pub mod order;
pub mod reservation;
pub mod support;

pub use error::{DomainError, Result};
pub use order::{CreateOrder, OrderService, UpdateOrderStatus};
pub use reservation::{FacilityHours, ReservationPolicy};
pub use support::{OpenTicket, SupportService, UpdateTicketStatus};
