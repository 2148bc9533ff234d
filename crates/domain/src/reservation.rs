//! Reservation admissibility policy.
//!
//! The booking flow that actually creates reservations lives elsewhere; it
//! asks this policy whether a requested window may be created. The policy
//! composes two deliberately separate history lookups: "is the user
//! currently occupying a slot" and "given operating hours, is a new slot
//! still fittable". One active reservation per user, not a general
//! interval-overlap calendar.

use chrono::{DateTime, NaiveTime, Utc};
use common::UserId;
use store::ReservationStore;

use crate::error::{DomainError, Result};

/// Environment variable holding the facility closing time (`HH:MM`).
pub const CLOSING_TIME_ENV_VAR: &str = "FACILITY_CLOSING_TIME";

const DEFAULT_CLOSING: NaiveTime = match NaiveTime::from_hms_opt(22, 0, 0) {
    Some(t) => t,
    None => panic!("invalid default closing time"),
};

/// Facility operating-hours boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FacilityHours {
    /// Daily closing time (UTC).
    pub closing: NaiveTime,
}

impl FacilityHours {
    /// Creates a boundary with an explicit closing time.
    pub fn new(closing: NaiveTime) -> Self {
        Self { closing }
    }

    /// Loads the closing time from `FACILITY_CLOSING_TIME` (`HH:MM`),
    /// falling back to 22:00.
    pub fn from_env() -> Self {
        let closing = std::env::var(CLOSING_TIME_ENV_VAR)
            .ok()
            .and_then(|raw| NaiveTime::parse_from_str(raw.trim(), "%H:%M").ok())
            .unwrap_or(DEFAULT_CLOSING);
        Self { closing }
    }

    /// The closing boundary on the calendar day of `anchor` (UTC).
    pub fn closing_boundary(&self, anchor: DateTime<Utc>) -> DateTime<Utc> {
        anchor.date_naive().and_time(self.closing).and_utc()
    }
}

impl Default for FacilityHours {
    fn default() -> Self {
        Self {
            closing: DEFAULT_CLOSING,
        }
    }
}

/// Decides whether a requested reservation window may be created.
pub struct ReservationPolicy<R> {
    reservations: R,
    hours: FacilityHours,
}

impl<R: ReservationStore> ReservationPolicy<R> {
    /// Creates a policy over the reservation history.
    pub fn new(reservations: R, hours: FacilityHours) -> Self {
        Self {
            reservations,
            hours,
        }
    }

    /// Checks whether the user may create a reservation for the requested
    /// window.
    ///
    /// Any confirmed reservation whose end time is still in the future
    /// blocks the request outright, whatever the requested range. Otherwise
    /// the window must not run past the facility closing boundary anchored
    /// to the user's most recent elapsed confirmed reservation; a user with
    /// no elapsed history has no boundary applied.
    #[tracing::instrument(skip(self))]
    pub async fn can_create(
        &self,
        user_id: UserId,
        requested_start: DateTime<Utc>,
        requested_end: DateTime<Utc>,
    ) -> Result<()> {
        if self.reservations.has_active_confirmed(user_id).await? {
            tracing::debug!("request blocked by an active reservation");
            return Err(DomainError::ActiveReservationExists(user_id));
        }

        if let Some(last_end) = self.reservations.last_confirmed_elapsed_end(user_id).await? {
            let boundary = self.hours.closing_boundary(last_end);
            if requested_end > boundary {
                return Err(DomainError::ReservationExceedsClosingTime {
                    requested_end,
                    boundary,
                });
            }
        }

        Ok(())
    }
}
