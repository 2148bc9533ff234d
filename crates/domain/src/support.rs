//! Support-ticket lifecycle.

use common::{TicketId, UserId};
use store::{NewTicket, Support, SupportStore, TicketStatus, UserStore};

use crate::error::{DomainError, Result};

/// Command to raise a support ticket.
#[derive(Debug, Clone)]
pub struct OpenTicket {
    /// The user raising the ticket.
    pub user_id: UserId,

    /// Short summary of the issue.
    pub subject: String,

    /// Full description of the issue.
    pub message: String,
}

/// Command to move a ticket through its workflow.
#[derive(Debug, Clone)]
pub struct UpdateTicketStatus {
    /// The elevated actor working the ticket.
    pub user_id: UserId,

    /// The ticket being worked.
    pub ticket_id: TicketId,

    /// The status to move to.
    pub new_status: TicketStatus,
}

/// Service for the support-ticket lifecycle.
pub struct SupportService<U, S> {
    users: U,
    tickets: S,
}

impl<U: UserStore, S: SupportStore> SupportService<U, S> {
    /// Creates a new support service.
    pub fn new(users: U, tickets: S) -> Self {
        Self { users, tickets }
    }

    /// Raises a new ticket for the user.
    ///
    /// The user must exist and must have prior tickets, none of them still
    /// open. Requiring prior history means a user's very first request is
    /// refused with [`DomainError::NoTicketHistory`]; that guard is kept
    /// deliberately as-is and lives in this one place pending a product
    /// decision. The stored ticket opens as [`TicketStatus::Open`] with the
    /// email captured from the resolved user.
    #[tracing::instrument(skip(self, cmd), fields(user_id = %cmd.user_id))]
    pub async fn open_ticket(&self, cmd: OpenTicket) -> Result<Support> {
        let user = self
            .users
            .find_by_id(cmd.user_id)
            .await?
            .ok_or(DomainError::UserNotFound(cmd.user_id))?;

        let history = self.tickets.find_by_user(cmd.user_id).await?;
        if history.is_empty() {
            return Err(DomainError::NoTicketHistory(cmd.user_id));
        }
        if history.iter().any(|t| t.status == TicketStatus::Open) {
            return Err(DomainError::OpenTicketExists(cmd.user_id));
        }

        let ticket = NewTicket {
            user_id: cmd.user_id,
            user_email: user.email,
            subject: cmd.subject,
            message: cmd.message,
            status: TicketStatus::Open,
        };

        let stored = self.tickets.create(ticket).await?;
        metrics::counter!("tickets_opened_total").increment(1);
        tracing::debug!(ticket_id = %stored.id, "ticket opened");
        Ok(stored)
    }

    /// Returns the user's most recent ticket.
    #[tracing::instrument(skip(self))]
    pub async fn own_ticket(&self, user_id: UserId) -> Result<Support> {
        self.users
            .find_by_id(user_id)
            .await?
            .ok_or(DomainError::UserNotFound(user_id))?;

        self.tickets
            .find_latest_by_user(user_id)
            .await?
            .ok_or(DomainError::TicketNotFound)
    }

    /// Returns every ticket, newest first. An empty collection is a valid
    /// result here, unlike the per-user fetch.
    #[tracing::instrument(skip(self))]
    pub async fn list_tickets(&self, user_id: UserId) -> Result<Vec<Support>> {
        let actor = self
            .users
            .find_by_id(user_id)
            .await?
            .ok_or(DomainError::UserNotFound(user_id))?;
        if !actor.role.is_elevated() {
            return Err(DomainError::AccessDenied(user_id));
        }

        self.tickets.find_all().await.map_err(Into::into)
    }

    /// Moves a ticket to a new status. Only the status is written; subject,
    /// message, and captured email stay untouched.
    #[tracing::instrument(skip(self, cmd), fields(ticket_id = %cmd.ticket_id))]
    pub async fn update_status(&self, cmd: UpdateTicketStatus) -> Result<()> {
        let actor = self
            .users
            .find_by_id(cmd.user_id)
            .await?
            .ok_or(DomainError::UserNotFound(cmd.user_id))?;
        if !actor.role.is_elevated() {
            return Err(DomainError::AccessDenied(cmd.user_id));
        }

        let ticket = self
            .tickets
            .find_by_id(cmd.ticket_id)
            .await?
            .ok_or(DomainError::TicketNotFound)?;

        if !ticket.status.transition_allowed(cmd.new_status) {
            return Err(DomainError::InvalidStatusTransition {
                from: ticket.status.as_str(),
                to: cmd.new_status.as_str(),
            });
        }

        self.tickets
            .update_status(cmd.ticket_id, cmd.new_status)
            .await?;
        metrics::counter!("ticket_status_updates_total").increment(1);
        Ok(())
    }
}
